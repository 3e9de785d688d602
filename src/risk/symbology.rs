/// Display scale of the risk raster. Everything below `SCALE_MIN` is
/// background in the source dataset and never painted.
pub const SCALE_MIN: f32 = 152.0;
pub const SCALE_MAX: f32 = 255.0;

// Normalised-ratio thresholds for the visual classes. These were tuned
// separately from the classifier's raw cut points (172/205/237 normalise to
// ~0.19/0.52/0.83) and are kept distinct so tiles keep the colours the
// original map shipped with. See DESIGN.md.
const RATIO_LOW: f32 = 0.15;
const RATIO_MODERATE: f32 = 0.55;
const RATIO_HIGH: f32 = 0.90;

/// RGB channels plus an alpha in [0, 1]. Alpha 0 means "do not render".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSpec {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

impl ColorSpec {
    pub const TRANSPARENT: ColorSpec = ColorSpec {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 0.0,
    };

    pub fn is_transparent(&self) -> bool {
        self.alpha == 0.0
    }

    /// Pack into the RGBA byte layout the PNG encoder wants.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            self.red,
            self.green,
            self.blue,
            (self.alpha * 255.0).round() as u8,
        ]
    }

    /// CSS `rgba(...)` string, as used by the viewer's legend swatches.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({},{},{},{:.2})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

/// Map one raster sample to its display colour.
///
/// The sample is normalised onto [`SCALE_MIN`, `SCALE_MAX`] (clamped) and
/// bucketed: the Low band is suppressed so the basemap shows through, the
/// upper three bands get progressively hotter, more opaque colours.
pub fn colorize(value: Option<f32>) -> ColorSpec {
    let v = match value {
        Some(v) if !v.is_nan() => v,
        _ => return ColorSpec::TRANSPARENT,
    };

    let ratio = ((v - SCALE_MIN) / (SCALE_MAX - SCALE_MIN)).clamp(0.0, 1.0);

    if ratio < RATIO_LOW {
        ColorSpec::TRANSPARENT
    } else if ratio < RATIO_MODERATE {
        // Moderate
        ColorSpec {
            red: 255,
            green: 255,
            blue: 0,
            alpha: 0.8,
        }
    } else if ratio < RATIO_HIGH {
        // High
        ColorSpec {
            red: 255,
            green: 165,
            blue: 0,
            alpha: 0.6,
        }
    } else {
        // Very High
        ColorSpec {
            red: 255,
            green: 0,
            blue: 0,
            alpha: 0.5,
        }
    }
}

/// The painted bands in ascending order, for legends and the startup
/// colourbar. Low is absent because it is never painted.
pub fn legend() -> [(&'static str, ColorSpec); 3] {
    [
        ("Moderate", colorize(Some(200.0))),
        ("High", colorize(Some(220.0))),
        ("Very High", colorize(Some(250.0))),
    ]
}
