use crate::models::{raster::RiskRaster, responses::TileResponse};
use async_trait::async_trait;

/// The raster-query seam between the HTTP surface and the dataset backend.
#[async_trait]
pub trait RiskSource: Send + Sync {
    /// Metadata for the loaded risk raster.
    fn raster(&self) -> &RiskRaster;

    /// Read the raster value at a geographic coordinate. `None` for
    /// off-raster coordinates and no-data pixels.
    async fn sample(&self, lon: f64, lat: f64) -> Result<Option<f32>, String>;

    /// Render one slippy-map tile of the risk raster as a colorized PNG.
    async fn render_tile(&self, z: u8, x: u32, y: u32) -> Result<TileResponse, String>;
}
