use crate::models::{geometry::GeometryExtent, raster::LayerGeometry, raster::RiskRaster};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    path::Path,
    time::{Duration, UNIX_EPOCH},
};

/// The raster statistics we cache on disk so restarts skip the GDAL
/// min/max scan. Invalidation is by file size + mtime.
#[derive(Serialize, Deserialize, Clone)]
pub struct RasterMetadata {
    pub name: String,
    pub size_bytes: u64,
    pub last_modified: u64,
    pub crs_code: i32,
    pub min_value: f32,
    pub max_value: f32,
    pub nodata: Option<f32>,
    pub is_cog: bool,

    // extent split into four CSV columns
    pub extent_minx: f64,
    pub extent_miny: f64,
    pub extent_maxx: f64,
    pub extent_maxy: f64,
}

impl RasterMetadata {
    pub fn from_raster(raster: &RiskRaster) -> Self {
        let last_modified = raster
            .last_modified
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        RasterMetadata {
            // keyed by file stem, not display name, so the cache row is
            // found again whatever the manifest calls the overlay
            name: key_for(&raster.path),
            size_bytes: raster.size_bytes,
            last_modified,
            crs_code: raster.source_geometry.crs_code,
            min_value: raster.min_value,
            max_value: raster.max_value,
            nodata: raster.nodata,
            is_cog: raster.is_cog,
            extent_minx: raster.source_geometry.extent.minx,
            extent_miny: raster.source_geometry.extent.miny,
            extent_maxx: raster.source_geometry.extent.maxx,
            extent_maxy: raster.source_geometry.extent.maxy,
        }
    }

    /// Rebuild the raster metadata from a cache row. The projected extents
    /// are recomputed rather than cached; they are cheap.
    pub fn to_raster(&self, path: &Path) -> anyhow::Result<RiskRaster> {
        let source_geometry = LayerGeometry {
            crs_code: self.crs_code,
            extent: GeometryExtent {
                minx: self.extent_minx,
                miny: self.extent_miny,
                maxx: self.extent_maxx,
                maxy: self.extent_maxy,
            },
        };
        let cached_geometry = source_geometry.projected_set()?;

        Ok(RiskRaster {
            name: self.name.clone(),
            path: path.to_path_buf(),
            size_bytes: self.size_bytes,
            source_geometry,
            cached_geometry,
            min_value: self.min_value,
            max_value: self.max_value,
            nodata: self.nodata,
            is_cog: self.is_cog,
            last_modified: UNIX_EPOCH + Duration::from_secs(self.last_modified),
        })
    }
}

pub type MetadataCache = HashMap<String, RasterMetadata>;

/// Load the metadata cache from disk (or return empty on any error)
pub fn load_cache(cache_path: &Path) -> MetadataCache {
    let mut cache = MetadataCache::new();
    if let Ok(mut rdr) = ReaderBuilder::new().has_headers(true).from_path(cache_path) {
        for meta in rdr.deserialize::<RasterMetadata>().flatten() {
            cache.insert(meta.name.clone(), meta);
        }
    }
    cache
}

/// Save the metadata cache back to disk (ignore errors)
pub fn save_cache(cache_path: &Path, cache: &MetadataCache) {
    if let Ok(mut wtr) = WriterBuilder::new().has_headers(true).from_path(cache_path) {
        for meta in cache.values() {
            let _ = wtr.serialize(meta);
        }
        let _ = wtr.flush();
    }
}

/// Cache key for a raster file (file stem only)
pub fn key_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn sample_raster() -> RiskRaster {
        let source_geometry = LayerGeometry {
            crs_code: 4326,
            extent: GeometryExtent::from((-123.0, 38.0, -122.0, 39.0)),
        };
        RiskRaster {
            name: "fire_risk_index".to_string(),
            path: PathBuf::from("data/fire_risk_index.tif"),
            size_bytes: 1234,
            cached_geometry: source_geometry.projected_set().unwrap(),
            source_geometry,
            min_value: 0.0,
            max_value: 255.0,
            nodata: Some(-9999.0),
            is_cog: false,
            last_modified: SystemTime::now(),
        }
    }

    #[test]
    fn roundtrips_through_the_csv_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("metadata.csv");

        let raster = sample_raster();
        let mut cache = MetadataCache::new();
        cache.insert(raster.name.clone(), RasterMetadata::from_raster(&raster));
        save_cache(&cache_path, &cache);

        let loaded = load_cache(&cache_path);
        let meta = loaded.get("fire_risk_index").expect("missing cache row");
        assert_eq!(meta.size_bytes, 1234);
        assert_eq!(meta.nodata, Some(-9999.0));
        assert_eq!(meta.extent_maxy, 39.0);

        let rebuilt = meta.to_raster(&raster.path).unwrap();
        assert_eq!(rebuilt.min_value, raster.min_value);
        assert!(rebuilt.cached_geometry.contains_key(&3857));
    }

    #[test]
    fn unreadable_cache_is_empty() {
        let loaded = load_cache(Path::new("/nonexistent/metadata.csv"));
        assert!(loaded.is_empty());
    }

    #[test]
    fn key_is_the_file_stem() {
        assert_eq!(
            key_for(Path::new("data/fire_risk_index.tif")),
            "fire_risk_index"
        );
    }
}
