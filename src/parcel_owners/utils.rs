//! Utility functions for common operations

use crate::corp_owners::{is_corporate_entity, normalize_entity_name};
use crate::parcel_owners::types::OwnerKind;
use anyhow::Result;
use reqwest::Client;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Download a file via HTTP
pub async fn http_get(url: &str) -> Result<Vec<u8>> {
    info!("Downloading from {}", url);
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(300)) // 5 min timeout
        .build()?;

    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(anyhow::anyhow!("HTTP request failed: {}", status));
    }

    let bytes = response.bytes().await?;
    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Extract the first CSV file from a ZIP archive
pub fn extract_csv_from_zip(zip_path: &Path) -> Result<PathBuf> {
    info!("Extracting CSV from {:?}", zip_path);

    let file = fs::File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    // Find first CSV file
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let filename = file.name().to_string();

        if !filename.to_lowercase().ends_with(".csv") {
            continue;
        }

        // enclosed_name rejects entry names that would escape the
        // extraction directory ("../evil.csv" and friends)
        let safe_name = match file.enclosed_name().and_then(|p| p.file_name()) {
            Some(name) => name.to_owned(),
            None => {
                warn!("Skipping unsafe ZIP entry name: {}", filename);
                continue;
            }
        };

        info!("Found CSV file: {}", filename);

        // Extract to same directory as ZIP
        let output_dir = zip_path.parent().unwrap_or(Path::new("."));
        let output_path = output_dir.join(safe_name);

        let mut output_file = fs::File::create(&output_path)?;
        io::copy(&mut file, &mut output_file)?;

        info!("Extracted to {:?}", output_path);
        return Ok(output_path);
    }

    Err(anyhow::anyhow!("No CSV file found in ZIP archive"))
}

/// Format a King County PIN from major/minor account numbers
/// (6-digit major, 4-digit minor, zero-padded)
pub fn format_pin(major: &str, minor: &str) -> Option<String> {
    let major = major.trim();
    let minor = minor.trim();

    if major.is_empty()
        || minor.is_empty()
        || major.len() > 6
        || minor.len() > 4
        || !major.chars().all(|c| c.is_ascii_digit())
        || !minor.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    Some(format!("{:0>6}{:0>4}", major, minor))
}

// "STATE OF" must stay a prefix check: "ESTATE OF ..." contains it
const GOVERNMENT_PREFIXES: &[&str] = &[
    "CITY OF",
    "COUNTY OF",
    "STATE OF",
    "PORT OF",
    "KING COUNTY",
    "UNITED STATES",
];

const GOVERNMENT_MARKERS: &[&str] = &["HOUSING AUTHORITY", "SCHOOL DISTRICT", "SOUND TRANSIT"];

/// Classify an owner-of-record from the taxpayer name
pub fn classify_owner(taxpayer_name: &str) -> OwnerKind {
    let normalized = normalize_entity_name(taxpayer_name);

    if normalized.is_empty() {
        return OwnerKind::Other;
    }

    if GOVERNMENT_PREFIXES.iter().any(|p| normalized.starts_with(p))
        || GOVERNMENT_MARKERS.iter().any(|m| normalized.contains(m))
    {
        return OwnerKind::Government;
    }

    if normalized.ends_with(" TRUST")
        || normalized == "TRUST"
        || normalized.contains("TRUSTEE")
        || normalized.contains("LIVING TRUST")
    {
        return OwnerKind::Trust;
    }

    if normalized.ends_with(" LLC") || normalized.ends_with(" PLLC") {
        return OwnerKind::Llc;
    }

    if is_corporate_entity(&normalized) {
        return OwnerKind::Corporation;
    }

    // Taxpayer names for people are "LAST FIRST [MIDDLE]"
    let tokens: Vec<&str> = normalized.split(' ').collect();
    if (2..=4).contains(&tokens.len())
        && tokens.iter().all(|t| t.chars().all(|c| c.is_alphabetic()))
    {
        OwnerKind::Individual
    } else {
        OwnerKind::Other
    }
}

/// Format a site address from the assessor's address line and city/state
pub fn format_site_address(addr_line: Option<&str>, city_state: Option<&str>) -> Option<String> {
    let addr = addr_line.map(str::trim).filter(|s| !s.is_empty())?;

    match city_state.map(str::trim).filter(|s| !s.is_empty()) {
        Some(cs) => Some(format!("{}, {}", addr, cs)),
        None => Some(addr.to_string()),
    }
}

/// Pull the city name out of the assessor's combined "CITY WA" column
pub fn parse_city(city_state: &str) -> Option<String> {
    let trimmed = city_state.trim();
    if trimmed.is_empty() {
        return None;
    }

    let city = trimmed
        .strip_suffix(" WA")
        .or_else(|| trimmed.strip_suffix(" WASHINGTON"))
        .unwrap_or(trimmed)
        .trim();

    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_csv_from_zip_rejects_traversal() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("accounts.zip");
        let file = fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();

        writer.start_file("../escape.csv", options).unwrap();
        writer.write_all(b"should never land outside").unwrap();
        writer.start_file("accounts.csv", options).unwrap();
        writer.write_all(b"Major,Minor\n").unwrap();
        writer.finish().unwrap();

        let extracted = extract_csv_from_zip(&zip_path).unwrap();

        // the traversal entry is skipped, the honest one extracted in place
        assert_eq!(extracted, dir.path().join("accounts.csv"));
        assert!(!dir.path().parent().unwrap().join("escape.csv").exists());
        assert_eq!(fs::read_to_string(&extracted).unwrap(), "Major,Minor\n");
    }

    #[test]
    fn test_format_pin() {
        assert_eq!(format_pin("123456", "0010"), Some("1234560010".to_string()));
        assert_eq!(format_pin("1234", "10"), Some("0012340010".to_string()));
        assert_eq!(format_pin("", "0010"), None);
        assert_eq!(format_pin("123456", ""), None);
        assert_eq!(format_pin("12A456", "0010"), None);
        assert_eq!(format_pin("1234567", "0010"), None);
    }

    #[test]
    fn test_classify_owner() {
        assert_eq!(classify_owner("ACME PROPERTIES LLC"), OwnerKind::Llc);
        assert_eq!(classify_owner("Pine St. Holdings, L.L.C."), OwnerKind::Llc);
        assert_eq!(classify_owner("EVERGREEN TOWERS INC"), OwnerKind::Corporation);
        assert_eq!(classify_owner("SMITH FAMILY LIVING TRUST"), OwnerKind::Trust);
        assert_eq!(classify_owner("CITY OF SEATTLE"), OwnerKind::Government);
        assert_eq!(
            classify_owner("SEATTLE HOUSING AUTHORITY"),
            OwnerKind::Government
        );
        assert_eq!(classify_owner("DOE JANE M"), OwnerKind::Individual);
        assert_eq!(classify_owner(""), OwnerKind::Other);
        assert_eq!(classify_owner("12345"), OwnerKind::Other);
    }

    #[test]
    fn test_format_site_address() {
        assert_eq!(
            format_site_address(Some("400 PINE ST"), Some("SEATTLE WA")),
            Some("400 PINE ST, SEATTLE WA".to_string())
        );
        assert_eq!(
            format_site_address(Some("400 PINE ST"), None),
            Some("400 PINE ST".to_string())
        );
        assert_eq!(format_site_address(None, Some("SEATTLE WA")), None);
        assert_eq!(format_site_address(Some("   "), None), None);
    }

    #[test]
    fn test_parse_city() {
        assert_eq!(parse_city("SEATTLE WA"), Some("SEATTLE".to_string()));
        assert_eq!(parse_city("BELLEVUE"), Some("BELLEVUE".to_string()));
        assert_eq!(parse_city("  "), None);
    }
}
