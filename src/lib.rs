// Library modules for the building ownership pipeline

pub mod corp_owners;
pub mod geo;
pub mod parcel_owners;
