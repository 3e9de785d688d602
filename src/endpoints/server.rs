use crate::config::Config;
use crate::endpoints::handlers::{
    list_overlays, overlay_event, query_risk, tile_handler, webmap_handler,
};
use crate::layers::{ActiveLayers, Manifest};
use crate::reader::local::LocalRiskReader;
use crate::traits::RiskSource;
use crate::utils::status::print_overlay_summary;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tower_http::services::ServeDir;

pub struct AppState {
    pub reader: Arc<dyn RiskSource>,
    pub manifest: Manifest,
    pub active: RwLock<ActiveLayers>,
    /// Name of the raster overlay point queries are gated on.
    pub raster_overlay: String,
}

pub struct MapServer {
    config: Config,
    state: AppState,
}

impl MapServer {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let manifest = Manifest::load(&config.data_folder)?;
        let cache_bytes = config.cache_size_gb * 1024 * 1024 * 1024;
        let reader = LocalRiskReader::open(
            &config.data_folder,
            &manifest,
            config.tile_size,
            cache_bytes,
        )?;
        print_overlay_summary(&manifest, reader.raster());

        let active = RwLock::new(ActiveLayers::with_defaults(manifest.default_visible()));
        let raster_overlay = manifest.raster().name.clone();
        let state = AppState {
            reader: Arc::new(reader),
            manifest,
            active,
            raster_overlay,
        };

        Ok(Self { config, state })
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let state = Arc::new(self.state);
        let app = Router::new()
            .route("/", get(webmap_handler))
            .route("/map", get(webmap_handler))
            .route("/layers", get(list_overlays))
            .route("/layers/events", post(overlay_event))
            .route("/query", get(query_risk))
            .route("/tiles/{z}/{x}/{y}", get(tile_handler))
            .nest_service("/data", ServeDir::new(&self.config.data_folder))
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        println!(
            r#"
    🚀 Firesight serving on {}

    🌍 Browse the wildfire risk map
       → http://{}/map

    📚 Query the overlay manifest (JSON)
       → http://{}/layers

    🎯 Classify the risk at a point
       → http://{}/query?lon=-122.91&lat=38.50

    🗺️ QGIS XYZ-tiles path for the risk raster
       → http://{}/tiles/{{z}}/{{x}}/{{y}}
            "#,
            addr, addr, addr, addr, addr
        );

        axum::serve(listener, app).await?;

        Ok(())
    }
}
