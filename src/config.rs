use clap::Parser;
use std::path::PathBuf;

/// Command line options for the map server.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "firesight",
    about = "Serve a county wildfire-risk map: classified raster tiles, point queries and a browser viewer"
)]
pub struct Config {
    /// Folder containing the risk GeoTIFF, the overlay GeoJSON files and
    /// (optionally) an overlays.json manifest
    #[arg(long, default_value = "data")]
    pub data_folder: PathBuf,

    /// Port to serve on
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Rendered-tile cache budget in gigabytes
    #[arg(long, default_value_t = 1)]
    pub cache_size_gb: u64,

    /// Tile edge length in pixels
    #[arg(long, default_value_t = 256)]
    pub tile_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_folder: PathBuf::from("data"),
            port: 8000,
            cache_size_gb: 1,
            tile_size: 256,
        }
    }
}
