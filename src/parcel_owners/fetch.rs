//! Fetch functions - retrieve raw data from various sources

use crate::parcel_owners::types::RawData;
use crate::parcel_owners::utils::{extract_csv_from_zip, http_get};
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::info;

/// Fetch the King County assessor real-property account extract
/// (ZIP containing CSV)
pub async fn fetch_assessor_accounts(url: &str, temp_dir: &Path) -> Result<RawData> {
    info!("Fetching assessor account extract from {}", url);

    // Download ZIP file
    let zip_bytes = http_get(url).await?;

    // Save to temp directory
    let zip_path = temp_dir.join("assessor_accounts.zip");
    fs::write(&zip_path, zip_bytes)?;
    info!("Saved ZIP to {:?}", zip_path);

    // Extract CSV from ZIP
    let csv_path = extract_csv_from_zip(&zip_path)?;

    Ok(RawData::File(csv_path))
}

/// Fetch the parcel shapes GeoJSON
pub async fn fetch_parcel_shapes(url: &str) -> Result<RawData> {
    info!("Fetching parcel shapes from {}", url);

    let bytes = http_get(url).await?;

    Ok(RawData::Bytes(bytes))
}
