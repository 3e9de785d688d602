use crate::geometry::projection::{lon_lat_to_mercator, mercator_to_lon_lat};
use crate::models::geometry::GeometryExtent;
use serde::Serialize;
use std::{collections::HashMap, path::PathBuf, time::SystemTime};

/// Metadata for the loaded fire-risk raster.
#[derive(Debug, Clone)]
pub struct RiskRaster {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub source_geometry: LayerGeometry,
    /// Projected extents precomputed at load for the /layers endpoint.
    pub cached_geometry: HashMap<i32, LayerGeometry>,
    pub min_value: f32,
    pub max_value: f32,
    pub nodata: Option<f32>,
    pub is_cog: bool,
    pub last_modified: SystemTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerGeometry {
    pub crs_code: i32,
    pub extent: GeometryExtent,
}

impl LayerGeometry {
    /// Project the extent into another CRS: closed-form between 4326 and
    /// 3857, PROJ for anything else.
    pub fn project(&self, target_crs: i32) -> anyhow::Result<Self> {
        if self.crs_code == target_crs {
            return Ok(self.clone());
        }

        let extent = match (self.crs_code, target_crs) {
            (4326, 3857) => {
                let (minx, miny) = lon_lat_to_mercator(self.extent.minx, self.extent.miny);
                let (maxx, maxy) = lon_lat_to_mercator(self.extent.maxx, self.extent.maxy);
                GeometryExtent::from((minx, miny, maxx, maxy))
            }
            (3857, 4326) => {
                let (minx, miny) = mercator_to_lon_lat(self.extent.minx, self.extent.miny);
                let (maxx, maxy) = mercator_to_lon_lat(self.extent.maxx, self.extent.maxy);
                GeometryExtent::from((minx, miny, maxx, maxy))
            }
            _ => {
                let proj = proj::Proj::new_known_crs(
                    &format!("EPSG:{}", self.crs_code),
                    &format!("EPSG:{}", target_crs),
                    None,
                )
                .map_err(anyhow::Error::from)?;
                let (minx, miny) = proj
                    .convert((self.extent.minx, self.extent.miny))
                    .map_err(anyhow::Error::from)?;
                let (maxx, maxy) = proj
                    .convert((self.extent.maxx, self.extent.maxy))
                    .map_err(anyhow::Error::from)?;
                GeometryExtent::from((minx, miny, maxx, maxy))
            }
        };

        Ok(LayerGeometry {
            crs_code: target_crs,
            extent,
        })
    }

    /// Source extent plus the 4326 and 3857 variants the viewer asks for.
    pub fn projected_set(&self) -> anyhow::Result<HashMap<i32, LayerGeometry>> {
        let mut cache = HashMap::new();
        cache.insert(self.crs_code, self.clone());
        for target in [4326, 3857] {
            if !cache.contains_key(&target) {
                cache.insert(target, self.project(target)?);
            }
        }
        Ok(cache)
    }
}
