use serde::Deserialize;
use std::collections::HashSet;

/// One toggle event from the viewer's layer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleKind {
    Added,
    Removed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayToggle {
    pub event: ToggleKind,
    pub layer: String,
}

/// The set of overlays the user currently has switched on.
///
/// Consulted before answering a point query so we never report a risk class
/// for a layer the user cannot see. Never persisted; rebuilt from the
/// manifest defaults on every server start.
#[derive(Debug, Default)]
pub struct ActiveLayers {
    visible: HashSet<String>,
}

impl ActiveLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        ActiveLayers {
            visible: names.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn apply(&mut self, toggle: &OverlayToggle) {
        match toggle.event {
            ToggleKind::Added => {
                self.visible.insert(toggle.layer.clone());
            }
            ToggleKind::Removed => {
                self.visible.remove(&toggle.layer);
            }
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.visible.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(layer: &str) -> OverlayToggle {
        OverlayToggle {
            event: ToggleKind::Added,
            layer: layer.to_string(),
        }
    }

    fn removed(layer: &str) -> OverlayToggle {
        OverlayToggle {
            event: ToggleKind::Removed,
            layer: layer.to_string(),
        }
    }

    #[test]
    fn starts_empty_except_defaults() {
        let active = ActiveLayers::new();
        assert!(!active.is_visible("Fire Risk Index"));

        let active = ActiveLayers::with_defaults(["County Boundary"]);
        assert!(active.is_visible("County Boundary"));
        assert!(!active.is_visible("Fire Risk Index"));
    }

    #[test]
    fn toggle_on_then_off_ends_hidden() {
        let mut active = ActiveLayers::new();
        active.apply(&added("Fire Risk Index"));
        assert!(active.is_visible("Fire Risk Index"));
        active.apply(&removed("Fire Risk Index"));
        assert!(!active.is_visible("Fire Risk Index"));
    }

    #[test]
    fn toggles_are_idempotent_and_independent() {
        let mut active = ActiveLayers::new();
        active.apply(&added("Fire Stations"));
        active.apply(&added("Fire Stations"));
        active.apply(&added("Historic Fire Perimeters"));
        active.apply(&removed("Fire Stations"));
        assert!(!active.is_visible("Fire Stations"));
        assert!(active.is_visible("Historic Fire Perimeters"));

        // removing an overlay that was never added is a no-op
        active.apply(&removed("Fire Risk Index"));
        assert!(!active.is_visible("Fire Risk Index"));
    }

    #[test]
    fn toggle_events_deserialize_from_the_viewer_payload() {
        let t: OverlayToggle =
            serde_json::from_str(r#"{"event":"added","layer":"Fire Risk Index"}"#).unwrap();
        assert_eq!(t.event, ToggleKind::Added);
        assert_eq!(t.layer, "Fire Risk Index");
    }
}
