//! Command line interface for inkfont
//!
//! Handles parsing command line arguments and provides
//! validation for user inputs.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::core::config_file::ConfigFile;

/// inkfont CLI arguments
///
/// Examples:
///   inkfont scans/                          # Build Handwriting.ufo from scans/
///   inkfont scans/ -o build/Notes.ufo       # Choose the output UFO
///   inkfont scans/ --compile                # Also compile build/Notes.ttf with fontc
///   inkfont scans/ --tables my-tables.json  # Use edited policy tables
///   inkfont --dump-tables tables.json       # Write the built-in tables for editing
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "inkfont",
    version,
    about = "Build a UFO font from scanned handwriting samples",
    long_about = "inkfont reads a directory of per-glyph outline samples cut from handwriting scans, calibrates each written line, normalizes every glyph onto the em, composes accents, marks and digraphs, kerns the result and writes a UFO 3 font project."
)]
pub struct CliArgs {
    /// Directory of outline samples
    ///
    /// File names follow char_L<line>_P<pos>_x<x0>_y<y0>_x<x1>_y<y1>_<payload>.svg
    #[clap(help = "Directory of outline samples")]
    pub input: Option<PathBuf>,

    /// Output UFO path
    #[clap(
        long = "output",
        short = 'o',
        help = "Output UFO path (default: <family>.ufo)"
    )]
    pub output: Option<PathBuf>,

    /// Policy tables replacing the built-in ones
    #[clap(long = "tables", help = "JSON policy tables to use instead of the built-in ones")]
    pub tables: Option<PathBuf>,

    /// Write the built-in policy tables and exit
    #[clap(long = "dump-tables", help = "Write the built-in policy tables as JSON and exit")]
    pub dump_tables: Option<PathBuf>,

    /// Run report path
    #[clap(
        long = "report",
        help = "Where to write the JSON run report (default: report.json next to the UFO)"
    )]
    pub report: Option<PathBuf>,

    /// Compile the UFO to TrueType with fontc after saving
    #[clap(long = "compile", help = "Compile the UFO to .ttf with fontc")]
    pub compile: bool,

    /// Debug-level logging
    #[clap(long = "verbose", short = 'v', help = "Log at debug level")]
    pub verbose: bool,

    /// Initialize ~/.config/inkfont with settings and editable tables
    #[clap(
        long = "new-config",
        help = "Initialize user config directory with settings and policy tables"
    )]
    pub new_config: bool,
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    ///
    /// This ensures that all paths exist and are valid before the pipeline starts,
    /// providing clear error messages for common mistakes.
    pub fn validate(&self) -> Result<(), String> {
        if self.new_config || self.dump_tables.is_some() {
            return Ok(());
        }

        let Some(input) = &self.input else {
            return Err("No input directory given.\nUsage: inkfont <INPUT> [--output <UFO>]".to_string());
        };
        if !input.is_dir() {
            return Err(format!(
                "Input is not a directory: {}\nPass the directory holding the outline samples.",
                input.display()
            ));
        }

        if let Some(tables) = &self.tables {
            if !tables.is_file() {
                return Err(format!("Policy tables not found: {}", tables.display()));
            }
        }

        if let Some(output) = &self.output {
            if output.extension().map_or(true, |ext| ext != "ufo") {
                return Err(format!(
                    "Output must be a .ufo path: {}",
                    output.display()
                ));
            }
        }

        Ok(())
    }

    /// Policy tables path from CLI args or the config file
    pub fn tables_path(&self, config: Option<&ConfigFile>) -> Option<PathBuf> {
        self.tables
            .clone()
            .or_else(|| config.and_then(|c| c.tables.clone()))
    }

    /// Output UFO path from CLI args, the config file, or `<family>.ufo`
    pub fn output_path(&self, config: Option<&ConfigFile>, family: &str) -> PathBuf {
        self.output
            .clone()
            .or_else(|| config.and_then(|c| c.output.clone()))
            .unwrap_or_else(|| PathBuf::from(format!("{}.ufo", family.replace(' ', ""))))
    }

    /// Report path from CLI args, or report.json next to the UFO
    pub fn report_path(&self, ufo: &Path) -> PathBuf {
        self.report.clone().unwrap_or_else(|| {
            ufo.parent()
                .unwrap_or_else(|| Path::new("."))
                .join("report.json")
        })
    }

    pub fn should_compile(&self, config: Option<&ConfigFile>) -> bool {
        self.compile || config.and_then(|c| c.compile).unwrap_or(false)
    }
}
