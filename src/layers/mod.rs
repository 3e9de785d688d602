pub mod visibility;

pub use visibility::{ActiveLayers, OverlayToggle, ToggleKind};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// File name of the optional per-deployment manifest inside the data folder.
pub const MANIFEST_FILE: &str = "overlays.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OverlayKind {
    /// A vector overlay served as a static file and drawn by the viewer.
    GeoJson { file: String },
    /// The risk raster, served as colorized XYZ tiles.
    Raster { file: String },
}

/// Leaflet paint options for a vector overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStyle {
    pub color: String,
    pub weight: f32,
    pub fill_opacity: f32,
    /// Point overlays are drawn as circle markers of this radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub name: String,
    #[serde(flatten)]
    pub kind: OverlayKind,
    /// Pane z-index in the viewer; higher draws on top.
    pub z_index: u32,
    /// Whether the overlay starts switched on.
    #[serde(default)]
    pub default_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<VectorStyle>,
}

impl Overlay {
    pub fn file(&self) -> &str {
        match &self.kind {
            OverlayKind::GeoJson { file } | OverlayKind::Raster { file } => file,
        }
    }

    pub fn is_raster(&self) -> bool {
        matches!(self.kind, OverlayKind::Raster { .. })
    }
}

/// The deployment's overlay set.
///
/// The three near-identical iterations of the original viewer differed only
/// in which overlays they wired up, so the overlay list is configuration
/// here: drop an `overlays.json` next to the data to change it, otherwise
/// the stock county set applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub overlays: Vec<Overlay>,
}

impl Manifest {
    /// Load `overlays.json` from the data folder, falling back to the
    /// built-in county set when the file is absent. A present but malformed
    /// manifest is an error rather than a silent fallback.
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let path = data_dir.join(MANIFEST_FILE);
        let manifest = if path.is_file() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid manifest {}", path.display()))?
        } else {
            Manifest::default()
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for overlay in &self.overlays {
            if !seen.insert(overlay.name.as_str()) {
                bail!("duplicate overlay name '{}' in manifest", overlay.name);
            }
        }
        match self.overlays.iter().filter(|o| o.is_raster()).count() {
            1 => Ok(()),
            0 => bail!("manifest defines no raster overlay"),
            n => bail!("manifest defines {} raster overlays, expected exactly one", n),
        }
    }

    /// The single risk raster overlay.
    pub fn raster(&self) -> &Overlay {
        // validate() guarantees exactly one
        self.overlays
            .iter()
            .find(|o| o.is_raster())
            .unwrap_or_else(|| unreachable!("manifest validated without a raster overlay"))
    }

    pub fn default_visible(&self) -> impl Iterator<Item = &str> {
        self.overlays
            .iter()
            .filter(|o| o.default_on)
            .map(|o| o.name.as_str())
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest {
            overlays: vec![
                Overlay {
                    name: "Fire Stations".to_string(),
                    kind: OverlayKind::GeoJson {
                        file: "fire_stations.geojson".to_string(),
                    },
                    z_index: 500,
                    default_on: false,
                    style: Some(VectorStyle {
                        color: "#000".to_string(),
                        weight: 1.0,
                        fill_opacity: 0.8,
                        radius: Some(6.0),
                        fill_color: Some("red".to_string()),
                    }),
                },
                Overlay {
                    name: "Historic Fire Perimeters".to_string(),
                    kind: OverlayKind::GeoJson {
                        file: "fire_perimeters.geojson".to_string(),
                    },
                    z_index: 450,
                    default_on: false,
                    style: Some(VectorStyle {
                        color: "red".to_string(),
                        weight: 0.5,
                        fill_opacity: 0.5,
                        radius: None,
                        fill_color: None,
                    }),
                },
                Overlay {
                    name: "Fire Risk Index".to_string(),
                    kind: OverlayKind::Raster {
                        file: "fire_risk_index.tif".to_string(),
                    },
                    z_index: 400,
                    default_on: false,
                    style: None,
                },
                Overlay {
                    name: "County Boundary".to_string(),
                    kind: OverlayKind::GeoJson {
                        file: "county_boundary.geojson".to_string(),
                    },
                    z_index: 350,
                    default_on: true,
                    style: Some(VectorStyle {
                        color: "black".to_string(),
                        weight: 0.8,
                        fill_opacity: 0.0,
                        radius: None,
                        fill_color: None,
                    }),
                },
            ],
        }
    }
}
