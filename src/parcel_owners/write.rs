//! Write functions - persist data to PostgreSQL with conflict resolution

use crate::corp_owners::{CorpDirectory, CorpRecord, CorpStatus};
use crate::parcel_owners::types::{BuildingRow, OwnershipRecord, WriteOutcome, WriteStats};
use anyhow::Result;
use sqlx::PgPool;
use tracing::{debug, info, warn};

/// Write ownership records to database with intelligent conflict resolution
pub async fn write_buildings(db: &PgPool, records: Vec<OwnershipRecord>) -> Result<WriteStats> {
    info!("Writing {} ownership records to database", records.len());

    let mut stats = WriteStats::default();

    for record in records {
        match write_single_building(db, &record).await {
            Ok(outcome) => stats.record(outcome),
            Err(e) => {
                warn!("Failed to write building {}: {}", record.pin, e);
                stats.errors += 1;
            }
        }
    }

    info!("Write complete: {}", stats);

    Ok(stats)
}

/// Write a single ownership record with conflict resolution
async fn write_single_building(db: &PgPool, record: &OwnershipRecord) -> Result<WriteOutcome> {
    // PIN is the natural key for a building
    let existing = find_existing_building(db, &record.pin).await?;

    match existing {
        None => {
            insert_building(db, record).await?;
            debug!("Inserted new building: {}", record.pin);
            Ok(WriteOutcome::Inserted)
        }
        Some(existing) => {
            // Decide if we should update based on data quality
            if should_replace(&existing, record) {
                update_building(db, existing.id, record).await?;
                debug!("Updated building: {} (id: {})", record.pin, existing.id);
                Ok(WriteOutcome::Updated)
            } else {
                debug!(
                    "Skipped building: {} (existing data is better quality)",
                    record.pin
                );
                Ok(WriteOutcome::Skipped)
            }
        }
    }
}

async fn find_existing_building(db: &PgPool, pin: &str) -> Result<Option<BuildingRow>> {
    let result = sqlx::query_as::<_, BuildingRow>(
        r#"
        SELECT id, pin, address, city, taxpayer_name, owner_kind, ubi,
               beneficial_owner, data_source, data_quality, confidence_score
        FROM buildings
        WHERE pin = $1
        "#,
    )
    .bind(pin)
    .fetch_optional(db)
    .await?;

    Ok(result)
}

/// Determine if new record should replace existing one
fn should_replace(existing: &BuildingRow, new: &OwnershipRecord) -> bool {
    let existing_score = existing.quality_score();
    let new_score = new.source_metadata.data_quality.score() as f32
        * new.source_metadata.confidence_score;

    // Replace if new data is significantly better (10% threshold to avoid churn)
    new_score > existing_score * 1.1
}

/// Insert a new building record
async fn insert_building(db: &PgPool, record: &OwnershipRecord) -> Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO buildings (
            pin, address, city, taxpayer_name, owner_kind, ubi,
            beneficial_owner, chain_depth, latitude, longitude, assessed_value,
            data_source, data_quality, is_owner_resolved, confidence_score,
            last_updated
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
            NOW()
        )
        RETURNING id
        "#,
    )
    .bind(&record.pin)
    .bind(&record.address)
    .bind(&record.city)
    .bind(&record.taxpayer_name)
    .bind(record.owner_kind)
    .bind(&record.ubi)
    .bind(&record.beneficial_owner)
    .bind(record.chain_depth)
    .bind(record.latitude)
    .bind(record.longitude)
    .bind(record.assessed_value)
    .bind(&record.source_metadata.source_id)
    .bind(record.source_metadata.data_quality)
    .bind(record.source_metadata.is_owner_resolved)
    .bind(record.source_metadata.confidence_score)
    .fetch_one(db)
    .await?;

    insert_ownership_history(db, id, record).await?;

    Ok(id)
}

/// Update an existing building record
async fn update_building(db: &PgPool, id: i32, record: &OwnershipRecord) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE buildings SET
            pin = $1, address = $2, city = $3, taxpayer_name = $4,
            owner_kind = $5, ubi = $6, beneficial_owner = $7, chain_depth = $8,
            latitude = $9, longitude = $10, assessed_value = $11,
            data_source = $12, data_quality = $13, is_owner_resolved = $14,
            confidence_score = $15, last_updated = NOW()
        WHERE id = $16
        "#,
    )
    .bind(&record.pin)
    .bind(&record.address)
    .bind(&record.city)
    .bind(&record.taxpayer_name)
    .bind(record.owner_kind)
    .bind(&record.ubi)
    .bind(&record.beneficial_owner)
    .bind(record.chain_depth)
    .bind(record.latitude)
    .bind(record.longitude)
    .bind(record.assessed_value)
    .bind(&record.source_metadata.source_id)
    .bind(record.source_metadata.data_quality)
    .bind(record.source_metadata.is_owner_resolved)
    .bind(record.source_metadata.confidence_score)
    .bind(id)
    .execute(db)
    .await?;

    insert_ownership_history(db, id, record).await?;

    Ok(())
}

/// Append to ownership history if this owner-of-record is new for the building
async fn insert_ownership_history(
    db: &PgPool,
    building_id: i32,
    record: &OwnershipRecord,
) -> Result<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM ownership_history
            WHERE building_id = $1 AND taxpayer_name = $2
        )
        "#,
    )
    .bind(building_id)
    .bind(&record.taxpayer_name)
    .fetch_one(db)
    .await?;

    if !exists {
        sqlx::query(
            r#"
            INSERT INTO ownership_history (building_id, taxpayer_name, data_source, observed_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(building_id)
        .bind(&record.taxpayer_name)
        .bind(&record.source_metadata.source_id)
        .execute(db)
        .await?;

        debug!(
            "Recorded ownership transfer: building_id={}, taxpayer={}",
            building_id, record.taxpayer_name
        );
    }

    Ok(())
}

/// Write corporate registry records to database
pub async fn write_corp_records(db: &PgPool, records: Vec<CorpRecord>) -> Result<WriteStats> {
    info!("Writing {} corp records to database", records.len());

    let mut stats = WriteStats::default();

    for record in records {
        match insert_corp_record(db, &record).await {
            Ok(inserted) => {
                if inserted {
                    stats.inserted += 1;
                } else {
                    stats.skipped += 1; // Already exists
                }
            }
            Err(e) => {
                warn!("Failed to write corp record {} ({}): {}", record.name, record.ubi, e);
                stats.errors += 1;
            }
        }
    }

    info!("Corp records write complete: {}", stats);

    Ok(stats)
}

/// Insert a corp record (with conflict handling via UNIQUE constraint on UBI)
async fn insert_corp_record(db: &PgPool, record: &CorpRecord) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO corp_records (ubi, name, status, registered_agent, governors, fetched_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (ubi) DO NOTHING
        "#,
    )
    .bind(&record.ubi)
    .bind(&record.name)
    .bind(record.status.to_string())
    .bind(&record.registered_agent)
    .bind(&record.governors)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(Debug, sqlx::FromRow)]
struct CorpRow {
    ubi: String,
    name: String,
    status: String,
    registered_agent: Option<String>,
    governors: Vec<String>,
}

/// Load all corp records into an in-memory directory for enrichment
pub async fn load_corp_directory(db: &PgPool) -> Result<CorpDirectory> {
    let rows = sqlx::query_as::<_, CorpRow>(
        "SELECT ubi, name, status, registered_agent, governors FROM corp_records",
    )
    .fetch_all(db)
    .await?;

    let records = rows
        .into_iter()
        .map(|row| CorpRecord {
            ubi: row.ubi,
            name: row.name,
            status: CorpStatus::parse(&row.status),
            registered_agent: row.registered_agent,
            governors: row.governors,
        })
        .collect::<Vec<_>>();

    info!("Loaded {} corp records into directory", records.len());

    Ok(CorpDirectory::from_records(records))
}

/// Corporate taxpayer names still missing a registry match, for the
/// registry pipeline to look up
pub async fn select_unmatched_corporate_taxpayers(
    db: &PgPool,
    limit: i64,
) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT taxpayer_name
        FROM buildings
        WHERE owner_kind IN ('llc', 'corporation') AND ubi IS NULL
        ORDER BY taxpayer_name
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(names)
}
