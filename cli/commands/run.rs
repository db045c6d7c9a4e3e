use crate::cli_args::{RunArgs, VizKind};
use crate::output;
use crate::visualize::HtmlVisualization;
use anyhow::{Context, Result};
use codepack_core::{self as core, AppError, JsonVisualization, SourceConfig, VisualizationRenderer};
use log;
use std::env;

pub fn handle_run_command(args: RunArgs, quiet: bool) -> Result<()> {
    let base_dir = env::current_dir().context("Failed to determine current directory")?;
    let config_path = base_dir.join(&args.config_file.config);

    let configs = core::load_source_configs(&config_path)
        .with_context(|| format!("Failed to load configurations from {}", config_path.display()))?;
    let mut config = select_config(configs, args.id.as_deref())?;

    if let Some(format) = args.format {
        log::debug!("Overriding output format: {} -> {}", config.output_format, format);
        config.output_format = format;
    }
    if let Some(dir) = &args.output_dir {
        log::debug!("Overriding output directory: {}", dir.display());
        config.output_dir = dir.to_string_lossy().into_owned();
    }

    let renderer: Box<dyn VisualizationRenderer> = match args.viz {
        VizKind::Html => Box::new(HtmlVisualization),
        VizKind::Json => Box::new(JsonVisualization),
    };

    let report = core::run(&config, &base_dir, renderer.as_ref())
        .with_context(|| format!("Failed to process configuration '{}'", config.id))?;

    if !quiet {
        output::print_run_report(&report);
    }
    Ok(())
}

/// Picks the configuration named by `id`, or the only one when no id is given.
pub fn select_config(mut configs: Vec<SourceConfig>, id: Option<&str>) -> Result<SourceConfig> {
    let position = match id {
        Some(id) => configs.iter().position(|c| c.id == id),
        None if configs.len() == 1 => Some(0),
        None => None,
    };
    if let Some(index) = position {
        return Ok(configs.swap_remove(index));
    }

    let available = configs
        .iter()
        .map(|c| c.id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let message = match id {
        Some(id) => format!("configuration '{}' not found (available: {})", id, available),
        None => format!(
            "several configurations defined, choose one with --id (available: {})",
            available
        ),
    };
    Err(AppError::ConfigInvalid(message).into())
}
