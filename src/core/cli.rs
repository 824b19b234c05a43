//! Command line interface for gpufont
//!
//! Handles parsing command line arguments and provides validation for user
//! inputs. Options that also exist in the config file are resolved here:
//! a CLI flag wins over `settings.json`, which wins over the built-in default.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::core::config_file::ConfigFile;
use crate::io::LoadOptions;
use crate::layout::LayoutOptions;

/// gpufont CLI arguments
///
/// Examples:
///   gpufont inspect MyFont.ttf                 # Load statistics
///   gpufont inspect MyFont.ttf --glyph 36      # One glyph's mesh
///   gpufont layout MyFont.ttf "Hello"          # Glyph batches for a string
///   gpufont layout MyFont.ttf "Hello" --json   # Same, as JSON
///   gpufont --new-config                       # Write ~/.config/gpufont/settings.json
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "gpufont",
    version,
    about = "Triangulate TrueType glyphs for GPU text rendering",
    long_about = "gpufont loads a TrueType font, turns every glyph outline into curve and solid triangles for analytic quadratic-curve rendering, and lays out text as per-glyph instance batches."
)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Initialize the user configuration directory
    ///
    /// This creates ~/.config/gpufont with a settings.json holding the
    /// default values, and the logs/ directory.
    #[clap(
        long = "new-config",
        help = "Initialize user config directory with default settings",
        long_help = "Initialize the ~/.config/gpufont directory with a settings.json file containing every setting at its default value, plus a logs/ directory."
    )]
    pub new_config: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Triangulate glyphs on all cores
    #[clap(long, global = true)]
    pub parallel: bool,

    /// Point capacity per glyph, generated points included
    #[clap(long = "max-glyph-points", global = true)]
    pub max_glyph_points: Option<usize>,

    /// Triangle index capacity per glyph
    #[clap(long = "max-glyph-indices", global = true)]
    pub max_glyph_indices: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a font and report glyph and mesh statistics
    Inspect {
        /// TrueType font (.ttf) or collection (.ttc)
        font: PathBuf,

        /// Show one glyph instead of the whole font
        #[clap(long, short = 'g')]
        glyph: Option<u16>,

        /// Print JSON instead of text
        #[clap(long)]
        json: bool,
    },

    /// Lay out a string and print the per-glyph batches
    Layout {
        /// TrueType font (.ttf) or collection (.ttc)
        font: PathBuf,

        /// Text to lay out; "\n" breaks lines
        text: String,

        /// Wrap after this many glyphs per line
        #[clap(long = "max-line-len")]
        max_line_len: Option<usize>,

        /// Multiplier on the font's line height
        #[clap(long = "line-height-scale")]
        line_height_scale: Option<f32>,

        /// Print JSON instead of text
        #[clap(long)]
        json: bool,
    },
}

impl Command {
    pub fn font(&self) -> &PathBuf {
        match self {
            Command::Inspect { font, .. } | Command::Layout { font, .. } => font,
        }
    }
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    ///
    /// This ensures that the font path exists before anything is loaded,
    /// providing clear error messages for common mistakes.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(command) = &self.command {
            let path = command.font();
            if !path.exists() {
                return Err(format!(
                    "Font file does not exist: {}\nMake sure the path is correct and the file exists.",
                    path.display()
                ));
            }
            if !path.is_file() {
                return Err(format!(
                    "Not a file: {}\nExpected a .ttf or .ttc font file.",
                    path.display()
                ));
            }
        }

        if self.max_glyph_points == Some(0) {
            return Err("--max-glyph-points must be at least 1".to_string());
        }
        if let Some(Command::Layout {
            line_height_scale: Some(scale),
            ..
        }) = &self.command
        {
            if !scale.is_finite() {
                return Err(format!("Invalid line height scale: {scale}"));
            }
        }
        Ok(())
    }

    /// Loader limits from CLI args, config file, or defaults
    ///
    /// Priority order:
    /// 1. CLI argument
    /// 2. Config file setting (~/.config/gpufont/settings.json)
    /// 3. Built-in default
    pub fn load_options(&self, config: Option<&ConfigFile>) -> LoadOptions {
        let mut options = LoadOptions::default();
        if let Some(config) = config {
            config.apply_to_load_options(&mut options);
        }

        if let Some(points) = self.max_glyph_points {
            debug!("Using max glyph points from CLI: {points}");
            options.max_glyph_points = points;
        }
        if let Some(indices) = self.max_glyph_indices {
            debug!("Using max glyph indices from CLI: {indices}");
            options.max_glyph_indices = indices;
        }
        if self.parallel {
            options.parallel = true;
        }
        options
    }

    /// Layout options from CLI args, config file, or defaults
    pub fn layout_options(&self, config: Option<&ConfigFile>) -> LayoutOptions {
        let mut options = LayoutOptions::default();
        if let Some(config) = config {
            config.apply_to_layout_options(&mut options);
        }

        if let Some(Command::Layout {
            max_line_len,
            line_height_scale,
            ..
        }) = &self.command
        {
            if max_line_len.is_some() {
                options.max_line_len = *max_line_len;
            }
            if let Some(scale) = line_height_scale {
                options.line_height_scale = *scale;
            }
        }
        options
    }
}
