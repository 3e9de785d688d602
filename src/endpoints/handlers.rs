use crate::endpoints::map::INDEX_HTML;
use crate::endpoints::server::AppState;
use crate::layers::{OverlayToggle, VectorStyle};
use crate::models::raster::LayerGeometry;
use crate::risk::{RiskCategory, classify};
use crate::traits::RiskSource;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Serialize)]
struct OverlayResponse {
    name: String,
    kind: &'static str,
    url: String,
    z_index: u32,
    default_on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<VectorStyle>,
    /// Raster only: extent keyed by EPSG code, for fitting the view.
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<HashMap<i32, LayerGeometry>>,
}

pub async fn webmap_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}

pub async fn list_overlays(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut overlays: Vec<OverlayResponse> = state
        .manifest
        .overlays
        .iter()
        .map(|o| {
            let (kind, url, geometry) = if o.is_raster() {
                (
                    "raster",
                    "/tiles/{z}/{x}/{y}".to_string(),
                    Some(state.reader.raster().cached_geometry.clone()),
                )
            } else {
                ("vector", format!("/data/{}", o.file()), None)
            };
            OverlayResponse {
                name: o.name.clone(),
                kind,
                url,
                z_index: o.z_index,
                default_on: o.default_on,
                style: o.style.clone(),
                geometry,
            }
        })
        .collect();

    // bottom pane first, so the viewer can create panes in draw order
    overlays.sort_by_key(|o| o.z_index);

    (StatusCode::OK, Json(overlays))
}

pub async fn overlay_event(
    State(state): State<Arc<AppState>>,
    Json(toggle): Json<OverlayToggle>,
) -> impl IntoResponse {
    state
        .active
        .write()
        .expect("visibility lock poisoned")
        .apply(&toggle);
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
pub struct QueryParams {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub value: Option<f32>,
    pub category: RiskCategory,
}

/// Classify the risk raster at a point. Suppressed entirely (no sampling,
/// no classification) while the raster overlay is toggled off, so the map
/// never reports a class for data the user cannot see.
pub async fn query_risk(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> impl IntoResponse {
    let visible = state
        .active
        .read()
        .expect("visibility lock poisoned")
        .is_visible(&state.raster_overlay);
    if !visible {
        return StatusCode::NO_CONTENT.into_response();
    }

    match state.reader.sample(params.lon, params.lat).await {
        Ok(value) => Json(QueryResponse {
            value,
            category: classify(value),
        })
        .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e).into_response(),
    }
}

pub async fn tile_handler(
    Path((z, x, y)): Path<(u8, u32, u32)>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.reader.render_tile(z, x, y).await {
        Ok(tile) => axum::http::Response::builder()
            .header("Content-Type", tile.content_type)
            .body(axum::body::Body::from(tile.bytes))
            .unwrap()
            .into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e).into_response(),
    }
}
