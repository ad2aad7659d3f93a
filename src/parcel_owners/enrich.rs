//! Enrichment functions - join geometry and registry data onto ownership records

use crate::corp_owners::{resolve_beneficial, CorpDirectory};
use crate::geo::ParcelIndex;
use crate::parcel_owners::types::{OwnershipRecord, SourceMetadata};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Attach parcel geometry by PIN - sets lat/lon from the parcel centroid
/// Pure function - no side effects
pub fn attach_geometry(record: OwnershipRecord, index: &ParcelIndex) -> OwnershipRecord {
    let parcel = match index.get(&record.pin) {
        Some(parcel) => parcel,
        None => {
            debug!("No parcel geometry for PIN {}", record.pin);
            return record;
        }
    };

    let center = match crate::geo::centroid(parcel) {
        Some(center) => center,
        None => return record,
    };

    let latitude = Decimal::try_from(center.y()).ok();
    let longitude = Decimal::try_from(center.x()).ok();

    debug!(
        "Attached centroid for PIN {}: ({:?}, {:?})",
        record.pin, latitude, longitude
    );

    OwnershipRecord {
        latitude,
        longitude,
        // parcel site address fills in when the account extract had none
        address: record.address.or_else(|| parcel.address.clone()),
        ..record
    }
}

/// Match a corporate owner-of-record into the registry directory, setting
/// the UBI when found
/// Pure function - no side effects
pub fn match_registry(record: OwnershipRecord, directory: &CorpDirectory) -> OwnershipRecord {
    if !record.owner_kind.is_registrable() || record.ubi.is_some() {
        return record;
    }

    match directory.get(&record.taxpayer_name) {
        Some(corp) => {
            debug!(
                "Matched {} to UBI {} ({})",
                record.taxpayer_name, corp.ubi, corp.status
            );
            OwnershipRecord {
                ubi: Some(corp.ubi.clone()),
                ..record
            }
        }
        None => {
            debug!("No registry match for {}", record.taxpayer_name);
            record
        }
    }
}

/// Resolve the beneficial owner behind a corporate owner-of-record
/// by following the governor chain through the directory
pub fn resolve_owner(record: OwnershipRecord, directory: &CorpDirectory) -> OwnershipRecord {
    if !record.owner_kind.is_registrable() {
        return record;
    }

    let resolved = match resolve_beneficial(&record.taxpayer_name, directory) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("Could not resolve owner for {}: {}", record.taxpayer_name, e);
            return record;
        }
    };

    if resolved.depth == 0 {
        // nothing behind the entity that we know of
        return record;
    }

    debug!(
        "Resolved {} -> {} ({} hops)",
        record.taxpayer_name, resolved.name, resolved.depth
    );

    OwnershipRecord {
        beneficial_owner: Some(resolved.name),
        chain_depth: Some(resolved.depth as i32),
        source_metadata: SourceMetadata {
            is_owner_resolved: true,
            confidence_score: record.source_metadata.confidence_score * resolved.confidence,
            ..record.source_metadata
        },
        ..record
    }
}

/// Run all enrichment functions in sequence
/// This is a convenience function that composes the enrichers
pub fn enrich_all(
    records: Vec<OwnershipRecord>,
    index: &ParcelIndex,
    directory: &CorpDirectory,
) -> Vec<OwnershipRecord> {
    info!("Enriching {} records", records.len());

    let enriched: Vec<OwnershipRecord> = records
        .into_iter()
        .map(|record| {
            // Step 1: Attach parcel geometry
            let record = attach_geometry(record, index);

            // Step 2: Match the corporate registry
            let record = match_registry(record, directory);

            // Step 3: Resolve the beneficial owner
            resolve_owner(record, directory)
        })
        .collect();

    info!("Enrichment complete: {} records", enriched.len());

    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corp_owners::{CorpRecord, CorpStatus};
    use crate::geo::Parcel;
    use crate::parcel_owners::types::{DataQuality, OwnerKind};
    use chrono::Utc;
    use geo::{LineString, MultiPolygon, Polygon};

    fn mock_record() -> OwnershipRecord {
        OwnershipRecord {
            pin: "1234560010".to_string(),
            address: None,
            city: Some("SEATTLE".to_string()),
            taxpayer_name: "ACME PROPERTIES LLC".to_string(),
            owner_kind: OwnerKind::Llc,
            ubi: None,
            beneficial_owner: None,
            chain_depth: None,
            latitude: None,
            longitude: None,
            assessed_value: Some(1_750_000),
            source_metadata: SourceMetadata {
                source_id: "assessor".to_string(),
                data_quality: DataQuality::Assessor,
                fetched_at: Utc::now(),
                is_owner_resolved: false,
                confidence_score: 0.9,
            },
        }
    }

    fn mock_index() -> ParcelIndex {
        let ring = LineString::from(vec![
            (-122.34, 47.61),
            (-122.33, 47.61),
            (-122.33, 47.62),
            (-122.34, 47.62),
            (-122.34, 47.61),
        ]);
        ParcelIndex::build(vec![Parcel {
            pin: "1234560010".to_string(),
            address: Some("400 PINE ST".to_string()),
            geometry: MultiPolygon(vec![Polygon::new(ring, vec![])]),
        }])
    }

    fn mock_directory() -> CorpDirectory {
        CorpDirectory::from_records(vec![CorpRecord {
            ubi: "601234567".to_string(),
            name: "ACME PROPERTIES LLC".to_string(),
            status: CorpStatus::Active,
            registered_agent: None,
            governors: vec!["JANE DOE".to_string()],
        }])
    }

    #[test]
    fn test_attach_geometry() {
        let enriched = attach_geometry(mock_record(), &mock_index());

        assert!(enriched.latitude.is_some());
        assert!(enriched.longitude.is_some());
        // fills in the parcel site address
        assert_eq!(enriched.address, Some("400 PINE ST".to_string()));
    }

    #[test]
    fn test_attach_geometry_unknown_pin() {
        let mut record = mock_record();
        record.pin = "9999990000".to_string();

        let enriched = attach_geometry(record, &mock_index());

        assert!(enriched.latitude.is_none());
        assert!(enriched.address.is_none());
    }

    #[test]
    fn test_match_registry() {
        let enriched = match_registry(mock_record(), &mock_directory());

        assert_eq!(enriched.ubi, Some("601234567".to_string()));
    }

    #[test]
    fn test_match_registry_skips_individuals() {
        let mut record = mock_record();
        record.taxpayer_name = "DOE JANE M".to_string();
        record.owner_kind = OwnerKind::Individual;

        let enriched = match_registry(record, &mock_directory());

        assert!(enriched.ubi.is_none());
    }

    #[test]
    fn test_resolve_owner() {
        let enriched = resolve_owner(mock_record(), &mock_directory());

        assert_eq!(enriched.beneficial_owner, Some("JANE DOE".to_string()));
        assert_eq!(enriched.chain_depth, Some(1));
        assert!(enriched.source_metadata.is_owner_resolved);
        // Confidence reduced per hop
        assert!(enriched.source_metadata.confidence_score < 0.9);
    }

    #[test]
    fn test_resolve_owner_unknown_entity() {
        let enriched = resolve_owner(mock_record(), &CorpDirectory::new());

        assert!(enriched.beneficial_owner.is_none());
        assert!(!enriched.source_metadata.is_owner_resolved);
    }

    #[test]
    fn test_enrich_all() {
        let enriched = enrich_all(vec![mock_record()], &mock_index(), &mock_directory());

        assert_eq!(enriched.len(), 1);
        let record = &enriched[0];
        assert!(record.latitude.is_some());
        assert_eq!(record.ubi, Some("601234567".to_string()));
        assert_eq!(record.beneficial_owner, Some("JANE DOE".to_string()));
    }
}
