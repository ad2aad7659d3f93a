//! Parcel ownership module - functional pipeline joining assessor records,
//! parcel geometry and the corporate registry

pub mod enrich;
pub mod fetch;
pub mod parse;
pub mod types;
pub mod utils;
pub mod write;

pub use types::*;
