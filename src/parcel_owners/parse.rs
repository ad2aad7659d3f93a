//! Parse functions - transform raw data into OwnershipRecord structs

use crate::parcel_owners::types::{DataQuality, OwnershipRecord, RawData, SourceMetadata};
use crate::parcel_owners::utils::{classify_owner, format_pin, format_site_address, parse_city};
use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

/// Assessor account extract CSV row structure
#[derive(Debug, Deserialize)]
struct AccountRow {
    #[serde(rename = "Major")]
    major: String,

    #[serde(rename = "Minor")]
    minor: String,

    #[serde(rename = "TaxpayerName")]
    taxpayer_name: String,

    #[serde(rename = "AddrLine")]
    addr_line: Option<String>,

    #[serde(rename = "CityState")]
    city_state: Option<String>,

    #[serde(rename = "ApprLandVal")]
    appr_land_val: Option<String>,

    #[serde(rename = "ApprImpsVal")]
    appr_imps_val: Option<String>,
}

/// Parse the assessor account CSV into OwnershipRecord structs
pub async fn parse_assessor_accounts(
    raw: RawData,
    source_id: String,
) -> Result<Vec<OwnershipRecord>> {
    let csv_path = raw.as_file_path()?;
    info!("Parsing assessor account CSV from {:?}", csv_path);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(csv_path)?;

    let mut records = Vec::new();
    let mut parse_errors = 0;

    for (idx, result) in reader.deserialize::<AccountRow>().enumerate() {
        match result {
            Ok(row) => match parse_account_row(row, &source_id) {
                Ok(record) => records.push(record),
                Err(e) => {
                    parse_errors += 1;
                    if parse_errors <= 10 {
                        // Only log first 10 errors
                        warn!("Failed to parse row {}: {}", idx, e);
                    }
                }
            },
            Err(e) => {
                parse_errors += 1;
                if parse_errors <= 10 {
                    warn!("Failed to deserialize row {}: {}", idx, e);
                }
            }
        }
    }

    info!(
        "Parsed {} records from assessor CSV ({} errors)",
        records.len(),
        parse_errors
    );

    Ok(records)
}

fn parse_account_row(row: AccountRow, source_id: &str) -> Result<OwnershipRecord> {
    let pin = format_pin(&row.major, &row.minor)
        .ok_or_else(|| anyhow::anyhow!("Invalid major/minor: {}/{}", row.major, row.minor))?;

    let taxpayer_name = row.taxpayer_name.trim().to_string();
    if taxpayer_name.is_empty() {
        return Err(anyhow::anyhow!("Empty taxpayer name for PIN {}", pin));
    }

    let owner_kind = classify_owner(&taxpayer_name);

    let address = format_site_address(row.addr_line.as_deref(), row.city_state.as_deref());
    let city = row.city_state.as_deref().and_then(parse_city);

    // Assessed value = land + improvements (values carry $ and commas)
    let land = parse_money(row.appr_land_val.as_deref());
    let imps = parse_money(row.appr_imps_val.as_deref());
    let assessed_value = match (land, imps) {
        (None, None) => None,
        (l, i) => Some(l.unwrap_or(0) + i.unwrap_or(0)),
    };

    Ok(OwnershipRecord {
        pin,
        address,
        city,
        taxpayer_name,
        owner_kind,
        ubi: None,              // Will be matched in enrichment
        beneficial_owner: None, // Will be resolved in enrichment
        chain_depth: None,
        latitude: None,
        longitude: None,
        assessed_value,
        source_metadata: SourceMetadata {
            source_id: source_id.to_string(),
            data_quality: DataQuality::Assessor,
            fetched_at: Utc::now(),
            is_owner_resolved: false,
            confidence_score: 0.9, // High confidence for government data
        },
    })
}

/// Parse a money string like "$1,234,500" into cents-free dollars
fn parse_money(raw: Option<&str>) -> Option<i64> {
    let cleaned = raw?.replace(['$', ','], "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel_owners::types::OwnerKind;

    fn sample_row() -> AccountRow {
        AccountRow {
            major: "123456".to_string(),
            minor: "10".to_string(),
            taxpayer_name: "ACME PROPERTIES LLC".to_string(),
            addr_line: Some("400 PINE ST".to_string()),
            city_state: Some("SEATTLE WA".to_string()),
            appr_land_val: Some("$500,000".to_string()),
            appr_imps_val: Some("$1,250,000".to_string()),
        }
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money(Some("$1,234,500")), Some(1_234_500));
        assert_eq!(parse_money(Some("0")), Some(0));
        assert_eq!(parse_money(Some("")), None);
        assert_eq!(parse_money(Some("n/a")), None);
        assert_eq!(parse_money(None), None);
    }

    #[test]
    fn test_parse_account_row() {
        let record = parse_account_row(sample_row(), "assessor").unwrap();

        assert_eq!(record.pin, "1234560010");
        assert_eq!(record.taxpayer_name, "ACME PROPERTIES LLC");
        assert_eq!(record.owner_kind, OwnerKind::Llc);
        assert_eq!(
            record.address,
            Some("400 PINE ST, SEATTLE WA".to_string())
        );
        assert_eq!(record.city, Some("SEATTLE".to_string()));
        assert_eq!(record.assessed_value, Some(1_750_000));
        assert!(record.ubi.is_none());
        assert!(record.beneficial_owner.is_none());
    }

    #[test]
    fn test_parse_account_row_rejects_bad_pin() {
        let mut row = sample_row();
        row.major = "12A456".to_string();

        assert!(parse_account_row(row, "assessor").is_err());
    }

    #[test]
    fn test_parse_account_row_rejects_empty_taxpayer() {
        let mut row = sample_row();
        row.taxpayer_name = "   ".to_string();

        assert!(parse_account_row(row, "assessor").is_err());
    }

    #[tokio::test]
    async fn test_parse_assessor_accounts_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.csv");
        std::fs::write(
            &path,
            "Major,Minor,TaxpayerName,AddrLine,CityState,ApprLandVal,ApprImpsVal\n\
             123456,0010,ACME PROPERTIES LLC,400 PINE ST,SEATTLE WA,\"$500,000\",\"$1,250,000\"\n\
             654321,0020,DOE JANE M,12 OAK AVE,SEATTLE WA,\"$300,000\",\"$450,000\"\n\
             bad,pin,NOBODY,,,,\n",
        )
        .unwrap();

        let records = parse_assessor_accounts(RawData::File(path), "assessor".to_string())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pin, "1234560010");
        assert_eq!(records[1].owner_kind, OwnerKind::Individual);
    }
}
