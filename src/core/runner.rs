//! Application runner logic
//!
//! Resolves settings, runs the pipeline, and writes the font and report.

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::core::cli::CliArgs;
use crate::core::config_file::ConfigFile;
use crate::data::{compiler, save_ufo, FontCompiler};
use crate::geometry::KurboEngine;
use crate::logging;
use crate::pipeline::{Pipeline, PipelineContext};

/// Run inkfont with the given CLI arguments.
pub fn run_app(cli_args: CliArgs) -> Result<()> {
    if cli_args.new_config {
        return ConfigFile::initialize_config_directory()
            .context("Failed to initialize config directory");
    }

    if let Some(path) = &cli_args.dump_tables {
        PipelineConfig::default().save(path)?;
        println!("Wrote built-in policy tables to {}", path.display());
        return Ok(());
    }

    cli_args.validate().map_err(|e| anyhow!(e))?;
    let settings = ConfigFile::load();
    let _log_guard = logging::init(
        cli_args.verbose,
        settings.as_ref().and_then(|s| s.log_filter.as_deref()),
    );

    let config = load_config(&cli_args, settings.as_ref())?;
    let input = cli_args
        .input
        .clone()
        .ok_or_else(|| anyhow!("No input directory given"))?;
    let output = cli_args.output_path(settings.as_ref(), &config.font.family_name);
    let font_info = config.font.clone();

    info!("Building {} from {}", font_info.get_display_name(), input.display());
    let mut context = PipelineContext::new(config, Box::new(KurboEngine::default()), input);
    Pipeline::standard()
        .run(&mut context)
        .context("Pipeline aborted")?;

    save_ufo(&context.repository, &font_info, &output)?;
    let report_path = cli_args.report_path(&output);
    context.report.save(&report_path)?;

    if context.report.is_clean_success() {
        info!(
            "Clean run: {} glyphs, {} kerning pairs",
            context.report.glyph_count, context.report.kerning_pair_count
        );
    } else {
        warn!(
            "{} glyphs skipped, {} lines without statistics; see {}",
            context.report.failures.len(),
            context.report.lines_without_statistics.len(),
            report_path.display()
        );
    }

    if cli_args.should_compile(settings.as_ref()) {
        compile(&output)?;
    }
    Ok(())
}

/// `--tables`, then the settings file's tables, then the built-in ones.
pub fn load_config(cli_args: &CliArgs, settings: Option<&ConfigFile>) -> Result<PipelineConfig> {
    let mut config = match cli_args.tables_path(settings) {
        Some(path) => PipelineConfig::load(&path)?,
        None => PipelineConfig::default(),
    };
    if let Some(family) = settings.and_then(|s| s.family_name.clone()) {
        config.font.family_name = family;
    }
    Ok(config)
}

fn compile(ufo: &std::path::Path) -> Result<()> {
    let ttf = ufo.with_extension("ttf");
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async {
        let compiler = FontCompiler::new();
        compiler.compile(ufo, &ttf).await?;
        if let Err(e) = compiler.cleanup_old_cache(compiler::CACHE_LIMIT).await {
            warn!("Failed to clean compiled font cache: {}", e);
        }
        Ok::<_, anyhow::Error>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn settings_file_can_rename_the_family() {
        let settings = ConfigFile {
            family_name: Some("Notes".into()),
            ..ConfigFile::default()
        };
        let config = load_config(&CliArgs::default(), Some(&settings)).expect("config");
        assert_eq!(config.font.family_name, "Notes");
    }

    #[test]
    fn tables_flag_loads_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tables.json");
        std::fs::write(&path, r#"{ "space_width": 300.0 }"#).expect("write");
        let args = CliArgs {
            tables: Some(path),
            ..CliArgs::default()
        };
        let config = load_config(&args, None).expect("config");
        assert_eq!(config.space_width, 300.0);

        let args = CliArgs {
            tables: Some(PathBuf::from("/nonexistent/tables.json")),
            ..CliArgs::default()
        };
        assert!(load_config(&args, None).is_err());
    }
}
