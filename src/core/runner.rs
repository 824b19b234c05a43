//! Application runner logic
//!
//! Dispatches the parsed command line to the library: set up logging, load
//! the font and print what was asked for.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::cli::{CliArgs, Command};
use crate::core::config_file::ConfigFile;
use crate::font_source::{Font, FontMetrics, FontStats, Glyph, GlyphInstance};
use crate::io::{LoadOptions, SubglyphRef};
use crate::layout::{layout_str, LayoutOptions, TextLayout};
use crate::logging;

/// Per-font summary printed by `inspect`
#[derive(Debug, Serialize)]
pub struct FontReport {
    pub metrics: FontMetrics,
    pub stats: FontStats,
}

/// Per-glyph summary printed by `inspect --glyph`
#[derive(Debug, Serialize)]
pub struct GlyphReport {
    pub glyph: u16,
    pub kind: &'static str,
    pub advance_width: u16,
    pub lsb: i16,
    pub points: usize,
    pub generated_points: usize,
    pub curve_triangles: usize,
    pub solid_triangles: usize,
    pub components: Vec<SubglyphRef>,
    pub instances: Vec<GlyphInstance>,
}

/// Create and run the application with the given CLI arguments.
/// Handles special CLI flags and delegates to the subcommands.
pub fn run_app(cli_args: CliArgs) -> Result<()> {
    if cli_args.new_config {
        return ConfigFile::initialize_config_directory()
            .context("Failed to initialize config directory");
    }

    let config = ConfigFile::load();
    let log_to_file = config.as_ref().is_some_and(ConfigFile::log_to_file);
    let _guard = logging::init(cli_args.verbose, log_to_file)?;

    let Some(command) = &cli_args.command else {
        bail!("No command given. Use `gpufont inspect <FONT>` or `gpufont layout <FONT> <TEXT>`.");
    };

    let load_options = cli_args.load_options(config.as_ref());
    match command {
        Command::Inspect { font, glyph, json } => {
            let font = load_font(font, &load_options)?;
            match glyph {
                Some(index) => print_report(&glyph_report(&font, *index)?, *json),
                None => print_report(&font_report(&font), *json),
            }
        }
        Command::Layout {
            font, text, json, ..
        } => {
            let layout_options = cli_args.layout_options(config.as_ref());
            let font = load_font(font, &load_options)?;
            let layout = run_layout(&font, text, &layout_options);
            print_report(&layout, *json)
        }
    }
}

fn load_font(path: &Path, options: &LoadOptions) -> Result<Font> {
    debug!("Loading {} with {:?}", path.display(), options);
    let font =
        Font::load(path, options).with_context(|| format!("Failed to load {}", path.display()))?;
    info!("Loaded {} glyphs from {}", font.num_glyphs(), path.display());
    Ok(font)
}

pub fn font_report(font: &Font) -> FontReport {
    FontReport {
        metrics: *font.metrics(),
        stats: font.stats(),
    }
}

pub fn glyph_report(font: &Font, index: u16) -> Result<GlyphReport> {
    if index as usize >= font.num_glyphs() {
        bail!(
            "Glyph {index} is out of range; the font has {} glyphs",
            font.num_glyphs()
        );
    }

    let metric = font.h_metrics().get(index);
    let mut report = GlyphReport {
        glyph: index,
        kind: "empty",
        advance_width: metric.advance_width,
        lsb: metric.lsb,
        points: 0,
        generated_points: 0,
        curve_triangles: 0,
        solid_triangles: 0,
        components: Vec::new(),
        instances: font.resolve_glyph(index),
    };

    match font.glyph(index) {
        Some(Glyph::Simple(_)) => {
            report.kind = "simple";
            if let Some(mesh) = font.glyph_mesh(index) {
                report.points = mesh.points.len();
                report.generated_points = mesh.points.len() - mesh.num_points_orig;
                report.curve_triangles = mesh.curve_indices().len() / 3;
                report.solid_triangles = mesh.solid_indices().len() / 3;
            }
        }
        Some(Glyph::Composite(components)) => {
            report.kind = "composite";
            report.components = components.clone();
        }
        None => {}
    }
    Ok(report)
}

pub fn run_layout(font: &Font, text: &str, options: &LayoutOptions) -> TextLayout {
    let layout = layout_str(font, text, options);
    debug!(
        "Laid out {} glyphs in {} batches over {} lines",
        layout.num_glyphs(),
        layout.batches.len(),
        layout.line_count
    );
    layout
}

fn print_report<T: Serialize + std::fmt::Debug>(report: &T, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("Failed to serialize output")?;
        println!("{text}");
    } else {
        println!("{report:#?}");
    }
    Ok(())
}
