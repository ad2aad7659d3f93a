//! Parcel loading - decode King County parcel GeoJSON into geometry records

use anyhow::Result;
use geo::{Centroid, Geometry, MultiPolygon, Point};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::{json, Map};
use std::collections::HashMap;
use tracing::{info, warn};

/// A cadastral parcel keyed by King County PIN (6-digit major + 4-digit minor)
#[derive(Debug, Clone)]
pub struct Parcel {
    pub pin: String,
    pub address: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

/// Parse a parcel GeoJSON FeatureCollection into Parcel structs
///
/// Features without a PIN property or with non-areal geometry are skipped,
/// not fatal - the county extract routinely carries a handful of degenerate
/// features.
pub fn parse_parcels(raw: &str) -> Result<Vec<Parcel>> {
    let geojson: GeoJson = raw.parse()?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow::anyhow!("Expected a FeatureCollection document")),
    };

    let mut parcels = Vec::new();
    let mut skipped = 0;

    for feature in collection.features {
        match parse_feature(feature) {
            Some(parcel) => parcels.push(parcel),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} features (missing PIN or non-areal geometry)", skipped);
    }
    info!("Parsed {} parcels from GeoJSON", parcels.len());

    Ok(parcels)
}

fn parse_feature(feature: Feature) -> Option<Parcel> {
    let properties = feature.properties?;

    let pin = properties
        .get("PIN")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let address = properties
        .get("SITEADDR")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let geometry = Geometry::try_from(feature.geometry?.value).ok()?;

    let multi = match geometry {
        Geometry::Polygon(p) => MultiPolygon(vec![p]),
        Geometry::MultiPolygon(mp) => mp,
        _ => return None, // points/lines are not parcels
    };

    Some(Parcel {
        pin,
        address,
        geometry: multi,
    })
}

/// Representative coordinate for a parcel (lon, lat)
pub fn centroid(parcel: &Parcel) -> Option<Point<f64>> {
    parcel.geometry.centroid()
}

/// Export parcels back to GeoJSON, annotated with resolved ownership
/// where available (keyed by PIN). Used for map rendering downstream.
pub fn to_feature_collection(
    parcels: &[Parcel],
    resolved: &HashMap<String, String>,
) -> FeatureCollection {
    let features = parcels
        .iter()
        .map(|parcel| {
            let mut properties = Map::new();
            properties.insert("pin".to_string(), json!(parcel.pin));
            if let Some(ref address) = parcel.address {
                properties.insert("address".to_string(), json!(address));
            }
            if let Some(owner) = resolved.get(&parcel.pin) {
                properties.insert("beneficial_owner".to_string(), json!(owner));
            }

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &parcel.geometry,
                ))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
