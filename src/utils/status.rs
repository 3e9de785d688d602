use crate::layers::{Manifest, OverlayKind};
use crate::models::raster::RiskRaster;
use crate::risk::symbology::{SCALE_MAX, SCALE_MIN};
use crate::risk::{colorize, legend};
use comfy_table::{Attribute, Cell, CellAlignment, Table};

/// Print the startup summary: one row per overlay, the risk ramp as an
/// ANSI colourbar, and any warnings worth acting on.
pub fn print_overlay_summary(manifest: &Manifest, raster: &RiskRaster) {
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Overlay")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Kind")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Pane")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Default")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Detail").add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    let mut warnings = Vec::new();
    let mut cog_warning = false;

    for overlay in &manifest.overlays {
        let (kind, detail) = match &overlay.kind {
            OverlayKind::GeoJson { file } => ("vector", file.clone()),
            OverlayKind::Raster { .. } => (
                "raster",
                format!(
                    "[{:.0}…{:.0}] {}",
                    raster.min_value,
                    raster.max_value,
                    colourbar()
                ),
            ),
        };

        let mut row = vec![
            Cell::new("✅").set_alignment(CellAlignment::Center),
            Cell::new(&overlay.name),
            Cell::new(kind).set_alignment(CellAlignment::Center),
            Cell::new(overlay.z_index).set_alignment(CellAlignment::Center),
            Cell::new(if overlay.default_on { "on" } else { "off" })
                .set_alignment(CellAlignment::Center),
            Cell::new(detail),
        ];

        if overlay.is_raster() {
            if !raster.is_cog {
                warnings.push(format!(
                    "  ⚠️{}: not a COG, every tile rereads the full file",
                    overlay.name
                ));
                row[0] = Cell::new("⚠️");
                cog_warning = true;
            }
            if raster.max_value < SCALE_MIN {
                warnings.push(format!(
                    "  ⚠️{}: data range [{:.0}…{:.0}] sits below the {:.0}–{:.0} display scale, nothing will be painted",
                    overlay.name, raster.min_value, raster.max_value, SCALE_MIN, SCALE_MAX
                ));
                row[0] = Cell::new("⚠️");
            }
        }

        table.add_row(row);
    }

    println!("\nOverlay summary:\n{}", table);

    let labels = legend()
        .iter()
        .map(|(label, c)| format!("\x1b[38;2;{};{};{}m█\x1b[0m {}", c.red, c.green, c.blue, label))
        .collect::<Vec<_>>()
        .join("  ");
    println!("Risk classes: {}", labels);

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in warnings {
            println!("{}", warning);
        }
    }

    if cog_warning {
        println!("\nTips:");
        println!("  How to generate COGs: https://cogeo.org/developers-guide.html");
    }

    println!();
}

/// The display scale sampled left to right; suppressed values render as
/// blanks so the bar shows where painting starts.
fn colourbar() -> String {
    let mut bar = String::new();
    let n = 12;
    for i in 0..n {
        let v = SCALE_MIN + (SCALE_MAX - SCALE_MIN) * i as f32 / (n - 1) as f32;
        let c = colorize(Some(v));
        if c.is_transparent() {
            bar.push(' ');
        } else {
            bar.push_str(&format!("\x1b[38;2;{};{};{}m█\x1b[0m", c.red, c.green, c.blue));
        }
    }
    bar
}
