//! Parcel geometry module - GeoJSON parcel handling and spatial lookup

pub mod index;
pub mod parcel;

pub use index::ParcelIndex;
pub use parcel::{centroid, parse_parcels, to_feature_collection, Parcel};
