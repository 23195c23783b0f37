use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use precinct::notify::Webhook;
use precinct::render::{renderer_for, MapOverlay, RendererKind};
use precinct::{BoundarySource, GeoPoint, JurisdictionService, LoadOptions, ResolveError, ResolvedJurisdiction};

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<JurisdictionService>,
    pub source: BoundarySource,
    pub options: LoadOptions,
    pub renderer: RendererKind,
    pub webhook: Option<Webhook>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/jurisdiction", get(jurisdiction_handler))
        .route("/v1/jurisdictions", get(jurisdictions_handler))
        .route("/v1/overlay", get(overlay_handler))
        .route("/v1/reload", post(reload_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PointParams {
    lat: f64,
    lon: f64,
    accuracy: Option<f64>,
    renderer: Option<RendererKind>,
}

impl PointParams {
    fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.lat,
            longitude: self.lon,
            accuracy_meters: self.accuracy,
        }
    }
}

fn bad_request(e: ResolveError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    boundaries: usize,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.service.snapshot();

    Json(HealthResponse {
        status: if snapshot.index.is_empty() { "empty" } else { "ok" },
        boundaries: snapshot.index.len(),
        generation: snapshot.generation,
        loaded_at: snapshot.loaded_at,
    })
}

#[derive(Serialize)]
struct JurisdictionResponse {
    jurisdiction: Option<ResolvedJurisdiction>,
}

/// Primary jurisdiction at a point
async fn jurisdiction_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointParams>,
) -> Result<Json<JurisdictionResponse>, (StatusCode, String)> {
    let jurisdiction = state
        .service
        .resolve(params.point())
        .map_err(bad_request)?
        .into_iter()
        .next();

    Ok(Json(JurisdictionResponse { jurisdiction }))
}

#[derive(Serialize)]
struct JurisdictionsResponse {
    jurisdictions: Vec<ResolvedJurisdiction>,
}

/// Every jurisdiction at a point, in precedence order
async fn jurisdictions_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointParams>,
) -> Result<Json<JurisdictionsResponse>, (StatusCode, String)> {
    let jurisdictions = state
        .service
        .resolve(params.point())
        .map_err(bad_request)?;

    Ok(Json(JurisdictionsResponse { jurisdictions }))
}

/// Marker plus jurisdiction polygons for the requested map implementation
async fn overlay_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointParams>,
) -> Result<Json<MapOverlay>, (StatusCode, String)> {
    let point = params.point();
    let jurisdictions = state.service.resolve(point).map_err(bad_request)?;
    let renderer = renderer_for(params.renderer.unwrap_or(state.renderer));

    Ok(Json(renderer.render_overlay(&point, &jurisdictions)))
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub generation: u64,
    pub boundaries: usize,
    pub rejected: usize,
}

async fn reload_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    reload(&state).await.map(Json).map_err(|e| {
        error!("Reload failed: {:#}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
    })
}

/// Fetch the configured source and swap in a new snapshot. On failure the
/// current snapshot keeps serving.
pub async fn reload(state: &AppState) -> Result<ReloadResponse> {
    let source = state.source.to_string();

    let store = match state
        .source
        .load(&state.options)
        .await
        .with_context(|| format!("Failed to load boundaries from {}", source))
    {
        Ok(store) => store,
        Err(e) => {
            if let Some(webhook) = &state.webhook {
                webhook.report_failure(&source, &e);
            }
            return Err(e);
        }
    };

    // Sent in the background; the swap below does not wait for it
    if let Some(webhook) = &state.webhook {
        webhook.report_rejections(&source, &store);
    }

    let boundaries = store.len();
    let rejected = store.rejected().len();
    let service = Arc::clone(&state.service);
    let generation = tokio::task::spawn_blocking(move || service.reload(store))
        .await
        .context("Index rebuild task failed")?;

    Ok(ReloadResponse {
        generation,
        boundaries,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use precinct::pip::JurisdictionIndex;
    use precinct::BoundaryStore;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use tower::ServiceExt;

    const DATASET: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"id": "Q", "name": "Queen County", "jurisdiction_type": "county",
                               "agency_name": "Queen County Sheriff", "phone": "555-0199"},
                "geometry": {"type": "Polygon", "coordinates": [[[-10,-10],[-10,10],[10,10],[10,-10],[-10,-10]]]}
            },
            {
                "type": "Feature",
                "properties": {"id": "C", "name": "Capital City", "jurisdiction_type": "city"},
                "geometry": {"type": "Polygon", "coordinates": [[[-1,-1],[-1,1],[1,1],[1,-1],[-1,-1]]]}
            },
            {
                "type": "Feature",
                "properties": {"id": "broken", "jurisdiction_type": "fire"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,1],[0,0]]]}
            }
        ]
    }"#;

    fn state(source: BoundarySource, store: BoundaryStore) -> Arc<AppState> {
        with_webhook(source, store, None)
    }

    fn with_webhook(
        source: BoundarySource,
        store: BoundaryStore,
        webhook: Option<Webhook>,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            service: Arc::new(JurisdictionService::from_store(store)),
            source,
            options: LoadOptions::default(),
            renderer: RendererKind::Web,
            webhook,
        })
    }

    /// Webhook pointed at an address nothing answers on
    fn unreachable_webhook() -> Option<Webhook> {
        Some(Webhook::new("http://10.255.255.1:9/hook".to_string()).unwrap())
    }

    fn loaded_app() -> Router {
        let store = BoundaryStore::from_geojson_str(DATASET, &LoadOptions::default()).unwrap();
        build_router(state(BoundarySource::parse("unused.geojson"), store))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = get_json(loaded_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["boundaries"], 2);
        assert_eq!(json["generation"], 1);
    }

    #[tokio::test]
    async fn test_primary_jurisdiction() {
        let (status, json) = get_json(loaded_app(), "/v1/jurisdiction?lat=0.5&lon=0.5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["jurisdiction"]["id"], "C");
        assert_eq!(json["jurisdiction"]["type"], "municipal");
        assert_eq!(json["jurisdiction"]["nonEmergencyNumber"], "");

        let (_, json) = get_json(loaded_app(), "/v1/jurisdiction?lat=50&lon=50").await;
        assert!(json["jurisdiction"].is_null());
    }

    #[tokio::test]
    async fn test_ranked_jurisdictions() {
        let (status, json) = get_json(loaded_app(), "/v1/jurisdictions?lat=0.5&lon=0.5").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = json["jurisdictions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["C", "Q"]);
        assert_eq!(json["jurisdictions"][1]["nonEmergencyNumber"], "555-0199");
    }

    #[tokio::test]
    async fn test_invalid_point_is_bad_request() {
        let (status, _) = get_json(loaded_app(), "/v1/jurisdiction?lat=95&lon=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(loaded_app(), "/v1/jurisdictions?lat=0&lon=0&accuracy=-5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overlay_renderers() {
        let (status, json) = get_json(loaded_app(), "/v1/overlay?lat=0.5&lon=0.25").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["renderer"], "web");
        assert_eq!(json["marker"], serde_json::json!([0.5, 0.25]));
        assert_eq!(json["polygons"].as_array().unwrap().len(), 2);

        let (_, json) =
            get_json(loaded_app(), "/v1/overlay?lat=0.5&lon=0.25&renderer=native").await;
        assert_eq!(json["renderer"], "native");
        assert_eq!(json["marker"]["latitude"], 0.5);
    }

    #[tokio::test]
    async fn test_reload_from_source() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();

        let state = state(
            BoundarySource::File(file.path().to_path_buf()),
            BoundaryStore::default(),
        );
        let app = build_router(Arc::clone(&state));

        let (_, json) = get_json(app.clone(), "/v1/jurisdiction?lat=0&lon=0").await;
        assert!(json["jurisdiction"].is_null());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["generation"], 2);
        assert_eq!(json["boundaries"], 2);
        assert_eq!(json["rejected"], 1);

        let (_, json) = get_json(app, "/v1/jurisdiction?lat=0&lon=0").await;
        assert_eq!(json["jurisdiction"]["id"], "C");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_snapshot() {
        let store = BoundaryStore::from_geojson_str(DATASET, &LoadOptions::default()).unwrap();
        let state = state(BoundarySource::parse("/nonexistent/boundaries.geojson"), store);

        assert!(reload(&state).await.is_err());
        assert_eq!(state.service.snapshot().generation, 1);
        assert_eq!(state.service.snapshot().index.len(), 2);

        state.service.replace(JurisdictionIndex::build(vec![]));
        assert_eq!(state.service.snapshot().generation, 2);
    }

    #[tokio::test]
    async fn test_reload_does_not_wait_for_webhook() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();

        let state = with_webhook(
            BoundarySource::File(file.path().to_path_buf()),
            BoundaryStore::default(),
            unreachable_webhook(),
        );

        // The dataset has a rejected record, so a report goes out
        let summary = tokio::time::timeout(Duration::from_secs(2), reload(&state))
            .await
            .expect("reload finishes before the webhook times out")
            .unwrap();
        assert_eq!(summary.generation, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(state.service.snapshot().index.len(), 2);

        let state = with_webhook(
            BoundarySource::parse("/nonexistent/boundaries.geojson"),
            BoundaryStore::default(),
            unreachable_webhook(),
        );
        let failed = tokio::time::timeout(Duration::from_secs(2), reload(&state))
            .await
            .expect("failed reload returns before the webhook times out");
        assert!(failed.is_err());
        assert_eq!(state.service.snapshot().generation, 1);
    }
}
