use crate::geometry::projection::tile_bounds;
use crate::layers::Manifest;
use crate::models::{
    geometry::GeometryExtent,
    raster::{LayerGeometry, RiskRaster},
    responses::TileResponse,
};
use crate::reader::metadata::{self, RasterMetadata};
use crate::risk::colorize;
use crate::traits::RiskSource;
use anyhow::{Context, bail};
use async_trait::async_trait;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, Metadata};
use image::{ColorType, ImageEncoder, Rgba, RgbaImage, codecs::png::PngEncoder};
use indicatif::{ProgressBar, ProgressStyle};
use moka::future::Cache;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task;

/// CSV cache of raster statistics, written next to the data.
pub const METADATA_CACHE_FILE: &str = ".firesight_metadata.csv";

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct TileKey {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// Dataset backend reading the risk GeoTIFF from a local folder.
pub struct LocalRiskReader {
    raster: RiskRaster,
    tile_size: usize,
    pub tile_cache: Arc<Cache<TileKey, Arc<Vec<u8>>>>,
}

impl LocalRiskReader {
    pub fn open(
        data_dir: &Path,
        manifest: &Manifest,
        tile_size: u32,
        cache_bytes: u64,
    ) -> anyhow::Result<Self> {
        let overlay = manifest.raster();
        let raster_path = data_dir.join(overlay.file());
        if !raster_path.is_file() {
            bail!(
                "risk raster '{}' not found at {}",
                overlay.name,
                raster_path.display()
            );
        }

        let pb = ProgressBar::new(manifest.overlays.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n[{bar:40.cyan/blue}] {pos}/{len} {percent}%")
                .unwrap()
                .progress_chars("█▇▆▅▄▃▂▁  "),
        );

        // Vector overlays are served verbatim; a missing file would
        // otherwise only surface as a 404 in the viewer, so flag it now.
        for o in &manifest.overlays {
            pb.set_message(format!("Checking {:<30}", o.name));
            if !o.is_raster() && !data_dir.join(o.file()).is_file() {
                eprintln!(
                    "⚠️ Overlay '{}' is missing its file: {}",
                    o.name,
                    data_dir.join(o.file()).display()
                );
            }
            pb.inc(1);
        }

        let fs_meta = std::fs::metadata(&raster_path)
            .with_context(|| format!("failed to stat {}", raster_path.display()))?;
        let size_bytes = fs_meta.len();
        let modified = fs_meta.modified().unwrap_or(UNIX_EPOCH);
        let modified_secs = modified
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let cache_path = data_dir.join(METADATA_CACHE_FILE);
        let mut meta_cache = metadata::load_cache(&cache_path);
        let key = metadata::key_for(&raster_path);

        let raster = match meta_cache.get(&key) {
            Some(meta) if meta.size_bytes == size_bytes && meta.last_modified == modified_secs => {
                pb.set_message(format!("Reusing cached statistics for {}", overlay.name));
                let mut raster = meta.to_raster(&raster_path)?;
                raster.name = overlay.name.clone();
                raster
            }
            _ => {
                pb.set_message(format!("Scanning {}", overlay.name));
                let raster =
                    inspect_raster(&raster_path, &overlay.name, size_bytes, modified)?;
                meta_cache.insert(key, RasterMetadata::from_raster(&raster));
                metadata::save_cache(&cache_path, &meta_cache);
                raster
            }
        };
        pb.finish_with_message("✅ Fire data loaded");

        let tile_cache = Cache::builder()
            .weigher(|_key, png: &Arc<Vec<u8>>| png.len().try_into().unwrap_or(u32::MAX))
            .max_capacity(cache_bytes)
            .build();

        Ok(LocalRiskReader {
            raster,
            tile_size: tile_size as usize,
            tile_cache: Arc::new(tile_cache),
        })
    }
}

/// Read CRS, extent, band statistics and COG layout from the GeoTIFF.
fn inspect_raster(
    path: &Path,
    name: &str,
    size_bytes: u64,
    last_modified: SystemTime,
) -> anyhow::Result<RiskRaster> {
    let ds = Dataset::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let sref = ds
        .spatial_ref()
        .with_context(|| format!("CRS missing for '{}'", name))?;
    let crs_code = sref.auth_code().unwrap_or(0);
    if crs_code != 4326 {
        bail!(
            "risk raster '{}' must be EPSG:4326 so point queries can index it directly, found EPSG:{}",
            name,
            crs_code
        );
    }

    let gt = ds
        .geo_transform()
        .with_context(|| format!("geotransform missing for '{}'", name))?;
    if gt[2] != 0.0 || gt[4] != 0.0 {
        bail!("risk raster '{}' is rotated, which is not supported", name);
    }
    let (width, height) = ds.raster_size();
    let x0 = gt[0];
    let x1 = gt[0] + gt[1] * width as f64;
    let y0 = gt[3];
    let y1 = gt[3] + gt[5] * height as f64;
    let extent = GeometryExtent::from((x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)));

    let is_cog = ds
        .metadata_item("LAYOUT", "IMAGE_STRUCTURE")
        .as_deref()
        .map(|v| v.eq_ignore_ascii_case("COG"))
        .unwrap_or(false);

    let band = ds
        .rasterband(1)
        .with_context(|| format!("failed to get raster band for '{}'", name))?;
    let (min_value, max_value) = band
        .compute_raster_min_max(false)
        .map(|stats| (stats.min as f32, stats.max as f32))
        .with_context(|| format!("failed to get min/max for '{}'", name))?;
    let nodata = band.no_data_value().map(|v| v as f32);

    let source_geometry = LayerGeometry { crs_code, extent };
    let cached_geometry = source_geometry.projected_set()?;

    Ok(RiskRaster {
        name: name.to_string(),
        path: path.to_path_buf(),
        size_bytes,
        source_geometry,
        cached_geometry,
        min_value,
        max_value,
        nodata,
        is_cog,
        last_modified,
    })
}

#[async_trait]
impl RiskSource for LocalRiskReader {
    fn raster(&self) -> &RiskRaster {
        &self.raster
    }

    async fn sample(&self, lon: f64, lat: f64) -> Result<Option<f32>, String> {
        if !self.raster.source_geometry.extent.contains(lon, lat) {
            return Ok(None);
        }

        let path = self.raster.path.clone();
        let nodata = self.raster.nodata;
        task::spawn_blocking(move || {
            let ds = Dataset::open(&path).map_err(|e| e.to_string())?;
            let gt = ds.geo_transform().map_err(|e| e.to_string())?;

            // invert the north-up affine; rotation was rejected at load
            let col = ((lon - gt[0]) / gt[1]).floor() as isize;
            let row = ((lat - gt[3]) / gt[5]).floor() as isize;
            let (width, height) = ds.raster_size();
            if col < 0 || row < 0 || col >= width as isize || row >= height as isize {
                return Ok(None);
            }

            let band = ds.rasterband(1).map_err(|e| e.to_string())?;
            let buffer = band
                .read_as::<f32>((col, row), (1, 1), (1, 1), None)
                .map_err(|e| e.to_string())?;
            let raw = buffer.data()[0];
            if raw.is_nan() || nodata.map(|nd| raw == nd).unwrap_or(false) {
                Ok(None)
            } else {
                Ok(Some(raw))
            }
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn render_tile(&self, z: u8, x: u32, y: u32) -> Result<TileResponse, String> {
        let key = TileKey { z, x, y };
        if let Some(png) = self.tile_cache.get(&key).await {
            return Ok(TileResponse {
                bytes: png.as_ref().clone(),
                content_type: "image/png".into(),
            });
        }

        let path = self.raster.path.clone();
        let nodata = self.raster.nodata;
        let tile_size = self.tile_size;
        let png = task::spawn_blocking(move || render_png(&path, nodata, tile_size, z, x, y))
            .await
            .map_err(|e| e.to_string())??;

        let png = Arc::new(png);
        self.tile_cache.insert(key, png.clone()).await;
        Ok(TileResponse {
            bytes: png.as_ref().clone(),
            content_type: "image/png".into(),
        })
    }
}

/// Warp the raster into one WebMercator tile window and paint it with the
/// risk symbology.
fn render_png(
    path: &Path,
    nodata: Option<f32>,
    tile_size: usize,
    z: u8,
    x: u32,
    y: u32,
) -> Result<Vec<u8>, String> {
    let (minx, miny, maxx, maxy) = tile_bounds(z, x, y, tile_size as u32);

    let src_ds = Dataset::open(path).map_err(|e| e.to_string())?;
    let dst_srs = SpatialRef::from_epsg(3857).map_err(|e| e.to_string())?;
    let mem_driver = DriverManager::get_driver_by_name("MEM").map_err(|e| e.to_string())?;
    let mut dst_ds = mem_driver
        .create_with_band_type::<f32, _>("", tile_size, tile_size, 1)
        .map_err(|e| e.to_string())?;
    dst_ds
        .set_projection(&dst_srs.to_wkt().map_err(|e| e.to_string())?)
        .map_err(|e| e.to_string())?;
    dst_ds
        .set_geo_transform(&[
            minx,
            (maxx - minx) / tile_size as f64,
            0.0,
            maxy,
            0.0,
            (miny - maxy) / tile_size as f64,
        ])
        .map_err(|e| e.to_string())?;

    // gdalwarp is not exposed by the gdal crate, so call the C entry point
    unsafe {
        gdal_sys::GDALReprojectImage(
            src_ds.c_dataset(),
            std::ptr::null(),
            dst_ds.c_dataset(),
            std::ptr::null(),
            gdal_sys::GDALResampleAlg::GRA_NearestNeighbour,
            0.0,
            0.0,
            None,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    };

    let band = dst_ds.rasterband(1).map_err(|e| e.to_string())?;
    let buffer = band
        .read_as::<f32>((0, 0), (tile_size, tile_size), (tile_size, tile_size), None)
        .map_err(|e| e.to_string())?
        .data()
        .to_vec();

    let is_nodata = |raw: f32| raw.is_nan() || nodata.map(|nd| raw == nd).unwrap_or(false);

    let mut img = RgbaImage::new(tile_size as u32, tile_size as u32);
    for (i, &raw) in buffer.iter().enumerate() {
        let px = if is_nodata(raw) {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba(colorize(Some(raw)).to_rgba8())
        };
        img.put_pixel((i % tile_size) as u32, (i / tile_size) as u32, px);
    }

    let mut png_data = Vec::new();
    PngEncoder::new(Cursor::new(&mut png_data))
        .write_image(
            img.as_raw(),
            tile_size as u32,
            tile_size as u32,
            ColorType::Rgba8.into(),
        )
        .map_err(|e| e.to_string())?;

    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::projection::{MERCATOR_BOUND, lon_lat_to_mercator};
    use gdal::raster::Buffer;
    use std::path::PathBuf;

    // 4×4 EPSG:4326 raster over lon [-123, -122], lat [38, 39].
    // Mostly Moderate-band values, one Very High pixel, one suppressed-Low
    // pixel and one nodata pixel.
    fn write_test_raster(dir: &Path) -> PathBuf {
        let path = dir.join("fire_risk_index.tif");
        let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
        let mut ds = driver
            .create_with_band_type::<f32, _>(&path, 4, 4, 1)
            .unwrap();
        ds.set_projection(&SpatialRef::from_epsg(4326).unwrap().to_wkt().unwrap())
            .unwrap();
        ds.set_geo_transform(&[-123.0, 0.25, 0.0, 39.0, 0.0, -0.25])
            .unwrap();

        let mut band = ds.rasterband(1).unwrap();
        band.set_no_data_value(Some(-9999.0)).unwrap();
        let mut data = vec![200.0f32; 16];
        data[0] = 250.0; // top-left: Very High
        data[5] = 160.0; // row 1, col 1: Low, suppressed by symbology
        data[15] = -9999.0; // bottom-right: nodata
        let mut buffer = Buffer::new((4, 4), data);
        band.write((0, 0), (4, 4), &mut buffer).unwrap();
        drop(band);
        drop(ds);
        path
    }

    fn open_reader(dir: &Path) -> LocalRiskReader {
        LocalRiskReader::open(dir, &Manifest::default(), 256, 8 * 1024 * 1024).unwrap()
    }

    #[test]
    fn open_reads_geometry_and_statistics() {
        let dir = tempfile::tempdir().unwrap();
        write_test_raster(dir.path());

        let reader = open_reader(dir.path());
        let raster = reader.raster();
        assert_eq!(raster.name, "Fire Risk Index");
        assert_eq!(raster.source_geometry.crs_code, 4326);
        let e = raster.source_geometry.extent;
        assert_eq!((e.minx, e.miny, e.maxx, e.maxy), (-123.0, 38.0, -122.0, 39.0));
        // nodata is excluded from the band statistics
        assert_eq!(raster.min_value, 160.0);
        assert_eq!(raster.max_value, 250.0);
        assert_eq!(raster.nodata, Some(-9999.0));
        assert!(raster.cached_geometry.contains_key(&3857));

        // a second open reuses the on-disk statistics cache
        assert!(dir.path().join(METADATA_CACHE_FILE).is_file());
        let reader2 = open_reader(dir.path());
        assert_eq!(reader2.raster().min_value, 160.0);
        let e2 = reader2.raster().source_geometry.extent;
        assert_eq!(e2.maxy, 39.0);
    }

    #[test]
    fn open_fails_without_the_raster_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            LocalRiskReader::open(dir.path(), &Manifest::default(), 256, 1024).is_err()
        );
    }

    #[tokio::test]
    async fn sample_reads_pixel_values() {
        let dir = tempfile::tempdir().unwrap();
        write_test_raster(dir.path());
        let reader = open_reader(dir.path());

        // centre of the top-left pixel
        assert_eq!(reader.sample(-122.875, 38.875).await.unwrap(), Some(250.0));
        // centre of pixel (1, 1)
        assert_eq!(reader.sample(-122.625, 38.625).await.unwrap(), Some(160.0));
        // anywhere else in the grid is 200
        assert_eq!(reader.sample(-122.125, 38.875).await.unwrap(), Some(200.0));
    }

    #[tokio::test]
    async fn sample_maps_nodata_and_off_raster_to_none() {
        let dir = tempfile::tempdir().unwrap();
        write_test_raster(dir.path());
        let reader = open_reader(dir.path());

        // the nodata pixel at (3, 3)
        assert_eq!(reader.sample(-122.125, 38.125).await.unwrap(), None);
        // far off the raster
        assert_eq!(reader.sample(0.0, 0.0).await.unwrap(), None);
        // just past the western edge
        assert_eq!(reader.sample(-123.001, 38.5).await.unwrap(), None);
    }

    // slippy-map tile containing a lon/lat at a zoom level
    fn tile_for(lon: f64, lat: f64, z: u8) -> (u32, u32) {
        let (mx, my) = lon_lat_to_mercator(lon, lat);
        let n = 2f64.powi(z as i32);
        let x = ((mx + MERCATOR_BOUND) / (2.0 * MERCATOR_BOUND) * n).floor() as u32;
        let y = ((MERCATOR_BOUND - my) / (2.0 * MERCATOR_BOUND) * n).floor() as u32;
        (x, y)
    }

    #[tokio::test]
    async fn render_tile_paints_the_risk_bands() {
        let dir = tempfile::tempdir().unwrap();
        write_test_raster(dir.path());
        let reader = open_reader(dir.path());

        let (x, y) = tile_for(-122.5, 38.5, 8);
        let tile = reader.render_tile(8, x, y).await.unwrap();
        assert_eq!(tile.content_type, "image/png");

        let img = image::load_from_memory(&tile.bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (256, 256));

        let pixels: Vec<_> = img.pixels().collect();
        // the dominant 200-valued pixels paint Moderate yellow at 0.8 alpha
        assert!(pixels.iter().any(|p| p.0 == [255, 255, 0, 204]));
        // something in the tile is outside the raster and transparent
        assert!(pixels.iter().any(|p| p.0[3] == 0));

        // a second request is served from the tile cache with identical bytes
        let again = reader.render_tile(8, x, y).await.unwrap();
        assert_eq!(again.bytes, tile.bytes);
    }
}
