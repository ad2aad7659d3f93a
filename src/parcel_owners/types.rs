//! Core data types for the ownership pipeline
//! Pure data structures with no behavior

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::path::PathBuf;

/// Raw data from various sources - tagged unions
#[derive(Debug)]
pub enum RawData {
    File(PathBuf),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Csv(String),
}

impl RawData {
    pub fn as_file_path(&self) -> anyhow::Result<&PathBuf> {
        match self {
            RawData::File(path) => Ok(path),
            _ => Err(anyhow::anyhow!("Expected File, got {:?}", self)),
        }
    }

    pub fn as_bytes(&self) -> anyhow::Result<&[u8]> {
        match self {
            RawData::Bytes(bytes) => Ok(bytes),
            _ => Err(anyhow::anyhow!("Expected Bytes, got {:?}", self)),
        }
    }

    pub fn as_csv(&self) -> anyhow::Result<&str> {
        match self {
            RawData::Csv(text) => Ok(text),
            _ => Err(anyhow::anyhow!("Expected Csv, got {:?}", self)),
        }
    }
}

/// Owner-of-record classification, derived from the taxpayer name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "owner_kind_enum", rename_all = "snake_case")]
pub enum OwnerKind {
    Individual,
    Llc,
    Corporation,
    Trust,
    Government,
    Other,
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerKind::Individual => write!(f, "individual"),
            OwnerKind::Llc => write!(f, "llc"),
            OwnerKind::Corporation => write!(f, "corporation"),
            OwnerKind::Trust => write!(f, "trust"),
            OwnerKind::Government => write!(f, "government"),
            OwnerKind::Other => write!(f, "other"),
        }
    }
}

impl OwnerKind {
    /// Kinds that can be looked up in the corporate registry
    pub fn is_registrable(&self) -> bool {
        matches!(self, OwnerKind::Llc | OwnerKind::Corporation)
    }
}

/// Data quality levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "data_quality_enum", rename_all = "snake_case")]
pub enum DataQuality {
    Assessor,   // County assessor account records
    Registry,   // Secretary of State registrations
    Scraped,    // Web-sourced records
    Estimated,  // Calculated/derived data
}

impl DataQuality {
    /// Quality score for conflict resolution (higher = better)
    pub fn score(&self) -> i32 {
        match self {
            DataQuality::Assessor => 100,
            DataQuality::Registry => 90,
            DataQuality::Scraped => 50,
            DataQuality::Estimated => 25,
        }
    }
}

/// Building ownership record - pure data, no behavior
#[derive(Debug, Clone)]
pub struct OwnershipRecord {
    // Core identification
    pub pin: String,
    pub address: Option<String>,
    pub city: Option<String>,

    // Owner of record
    pub taxpayer_name: String,
    pub owner_kind: OwnerKind,
    pub ubi: Option<String>,

    // Resolved ownership
    pub beneficial_owner: Option<String>,
    pub chain_depth: Option<i32>,

    // Geolocation
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,

    // Valuation
    pub assessed_value: Option<i64>,

    // Data provenance
    pub source_metadata: SourceMetadata,
}

/// Metadata about where this record came from
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub source_id: String,
    pub data_quality: DataQuality,
    pub fetched_at: DateTime<Utc>,
    pub is_owner_resolved: bool,
    pub confidence_score: f32, // 0.0-1.0
}

/// Database row from the buildings table
#[derive(Debug, sqlx::FromRow)]
pub struct BuildingRow {
    pub id: i32,
    pub pin: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub taxpayer_name: String,
    pub owner_kind: Option<OwnerKind>,
    pub ubi: Option<String>,
    pub beneficial_owner: Option<String>,
    pub data_source: Option<String>,
    pub data_quality: Option<DataQuality>,
    pub confidence_score: Option<Decimal>,
}

impl BuildingRow {
    /// Calculate quality score for conflict resolution
    pub fn quality_score(&self) -> f32 {
        let base_score = self
            .data_quality
            .map(|q| q.score() as f32)
            .unwrap_or(0.0);

        let confidence = self
            .confidence_score
            .map(|c| c.to_string().parse::<f32>().unwrap_or(1.0))
            .unwrap_or(1.0);

        base_score * confidence
    }
}

/// Outcome of writing a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Updated,
    Skipped,
}

/// Write operation statistics
#[derive(Debug, Default, Clone)]
pub struct WriteStats {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl WriteStats {
    pub fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Inserted => self.inserted += 1,
            WriteOutcome::Updated => self.updated += 1,
            WriteOutcome::Skipped => self.skipped += 1,
        }
    }
}

impl std::fmt::Display for WriteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inserted: {}, updated: {}, skipped: {}, errors: {}",
            self.inserted, self.updated, self.skipped, self.errors
        )
    }
}
