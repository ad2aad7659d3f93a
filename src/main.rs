use axum::{
    routing::get,
    http::StatusCode,
    Json, Router,
    extract::State,
};
use seattle_building_ownership::parcel_owners::{DataQuality, OwnerKind};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
struct AppState {
    db: PgPool,
}

#[derive(Serialize, Deserialize)]
struct ApiResponse {
    message: String,
    status: String,
}

#[tokio::main]
async fn main() {
    println!("🏢 Starting Building Ownership API server...");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Get database URL from environment
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in .env file");

    // Create database connection pool
    println!("📦 Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("✅ Database connected successfully");

    let state = AppState { db: pool };

    let app = Router::new()
        .route("/", get(health_check))
        .route("/api/health", get(health_check))
        .route("/api/buildings", get(get_buildings))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
    println!("🚀 Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Building Ownership API is running!".to_string(),
        status: "ok".to_string(),
    })
}

async fn get_buildings(State(state): State<AppState>) -> Result<Json<Vec<Building>>, StatusCode> {
    let buildings = sqlx::query_as::<_, BuildingApiRow>(
        r#"
        SELECT
            id,
            pin,
            address,
            city,
            taxpayer_name,
            owner_kind,
            ubi,
            beneficial_owner,
            chain_depth,
            latitude,
            longitude,
            assessed_value,
            data_quality
        FROM buildings
        ORDER BY id
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        eprintln!("Database error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // Convert to response format; the owner shown is the beneficial owner
    // when a chain was resolved, otherwise the owner of record
    let response: Vec<Building> = buildings
        .into_iter()
        .map(|b| {
            let resolved_owner = b
                .beneficial_owner
                .clone()
                .unwrap_or_else(|| b.taxpayer_name.clone());

            Building {
                id: b.id,
                pin: b.pin,
                address: b.address,
                city: b.city,
                taxpayer_name: b.taxpayer_name,
                owner_kind: b.owner_kind.map(|k| k.to_string()),
                ubi: b.ubi,
                beneficial_owner: b.beneficial_owner,
                resolved_owner,
                chain_depth: b.chain_depth,
                latitude: b.latitude,
                longitude: b.longitude,
                assessed_value: b.assessed_value,
                data_quality: b.data_quality.map(|q| format!("{:?}", q)),
            }
        })
        .collect();

    Ok(Json(response))
}

#[derive(sqlx::FromRow)]
struct BuildingApiRow {
    id: i32,
    pin: String,
    address: Option<String>,
    city: Option<String>,
    taxpayer_name: String,
    owner_kind: Option<OwnerKind>,
    ubi: Option<String>,
    beneficial_owner: Option<String>,
    chain_depth: Option<i32>,
    latitude: Option<rust_decimal::Decimal>,
    longitude: Option<rust_decimal::Decimal>,
    assessed_value: Option<i64>,
    data_quality: Option<DataQuality>,
}

#[derive(Serialize, Deserialize)]
struct Building {
    id: i32,
    pin: String,
    address: Option<String>,
    city: Option<String>,
    taxpayer_name: String,
    owner_kind: Option<String>,
    ubi: Option<String>,
    beneficial_owner: Option<String>,
    resolved_owner: String,
    chain_depth: Option<i32>,
    latitude: Option<rust_decimal::Decimal>,
    longitude: Option<rust_decimal::Decimal>,
    assessed_value: Option<i64>,
    data_quality: Option<String>,
}
