use crate::bundle::PackageBundle;
use crate::collect::collect_sources;
use crate::config::SourceConfig;
use crate::encode::{OutputFormat, encode};
use crate::error::{AppError, Result};
use crate::size_tree::{VisualizationData, build_size_tree};
use crate::stats::ProcessingStats;
use log;
use std::fs;
use std::path::{Path, PathBuf};

/// Produces the companion artifact from the visualization payload.
pub trait VisualizationRenderer {
    /// File extension of the rendered artifact, dot included.
    fn extension(&self) -> &str;
    fn render(&self, data: &VisualizationData) -> Result<String>;
}

/// Writes the raw `{tree, stats}` payload as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonVisualization;

impl VisualizationRenderer for JsonVisualization {
    fn extension(&self) -> &str {
        ".json"
    }

    fn render(&self, data: &VisualizationData) -> Result<String> {
        serde_json::to_string_pretty(data).map_err(AppError::JsonSerialize)
    }
}

#[derive(Debug, Clone)]
pub struct EmitReport {
    pub output_path: PathBuf,
    pub visualization_path: PathBuf,
    pub format: OutputFormat,
    pub stats: ProcessingStats,
    pub missing_roots: Vec<PathBuf>,
}

/// Replaces every character outside `[A-Za-z0-9.]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<basename>.<ext>` for a single root, `<id>-codebase.<ext>` otherwise.
pub fn output_file_name(config: &SourceConfig, roots: &[PathBuf], format: OutputFormat) -> String {
    let single_root_name = match roots {
        [only] => only.file_name().map(|n| n.to_string_lossy().into_owned()),
        _ => None,
    };
    match single_root_name {
        Some(name) => format!("{}{}", sanitize_file_name(&name), format.extension()),
        None => format!(
            "{}-codebase{}",
            sanitize_file_name(&config.id),
            format.extension()
        ),
    }
}

/// `<output_dir>/<sanitized package name>`.
pub fn project_output_dir(config: &SourceConfig, base_dir: &Path) -> PathBuf {
    config
        .resolve_output_dir(base_dir)
        .join(sanitize_file_name(&config.package_name))
}

/// Encodes the bundle, writes it, then writes the companion visualization.
/// Either both files exist afterwards or neither does. On failure the
/// renderer's companion path is cleared as well, so a stale companion from an
/// earlier run is not left beside a missing artifact. Companions written by a
/// different renderer are not touched.
pub fn emit(
    config: &SourceConfig,
    bundle: &PackageBundle,
    roots: &[PathBuf],
    base_dir: &Path,
    renderer: &dyn VisualizationRenderer,
) -> Result<EmitReport> {
    let format = config.output_format;
    let encoded = encode(bundle, format)?;

    let output_dir = project_output_dir(config, base_dir);
    fs::create_dir_all(&output_dir).map_err(|e| AppError::DirCreation {
        path: output_dir.clone(),
        source: e,
    })?;

    let output_name = output_file_name(config, roots, format);
    let output_path = output_dir.join(&output_name);
    let stem = output_name
        .strip_suffix(format.extension())
        .unwrap_or(&output_name);
    let visualization_path =
        output_dir.join(format!("{}-visualization{}", stem, renderer.extension()));

    fs::write(&output_path, &encoded).map_err(|e| AppError::FileWrite {
        path: output_path.clone(),
        source: e,
    })?;
    log::info!("Wrote {} output to {}", format, output_path.display());

    match write_visualization(bundle, &encoded, &output_path, &visualization_path, renderer) {
        Ok(stats) => Ok(EmitReport {
            output_path,
            visualization_path,
            format,
            stats,
            missing_roots: Vec::new(),
        }),
        Err(e) => {
            // A companion left by an earlier run must not outlive its artifact.
            for path in [&output_path, &visualization_path] {
                remove_if_present(path);
            }
            Err(e)
        }
    }
}

fn remove_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

fn write_visualization(
    bundle: &PackageBundle,
    encoded: &str,
    output_path: &Path,
    visualization_path: &Path,
    renderer: &dyn VisualizationRenderer,
) -> Result<ProcessingStats> {
    let output_file_size = fs::metadata(output_path)
        .map_err(|e| AppError::FileRead {
            path: output_path.to_path_buf(),
            source: e,
        })?
        .len();
    let stats = ProcessingStats::compute(bundle, encoded, output_file_size);
    let data = VisualizationData {
        tree: build_size_tree(bundle),
        stats,
    };

    let rendered = renderer.render(&data)?;
    fs::write(visualization_path, rendered).map_err(|e| AppError::FileWrite {
        path: visualization_path.to_path_buf(),
        source: e,
    })?;
    log::info!("Wrote visualization to {}", visualization_path.display());
    Ok(stats)
}

/// Full run for one config: resolve roots against `base_dir`, collect, emit.
pub fn run(
    config: &SourceConfig,
    base_dir: &Path,
    renderer: &dyn VisualizationRenderer,
) -> Result<EmitReport> {
    log::info!("Running configuration '{}' ({})", config.id, config.name);
    let roots = config.resolve_paths(base_dir);
    let outcome = collect_sources(config, &roots)?;
    let mut report = emit(config, &outcome.bundle, &roots, base_dir, renderer)?;
    report.missing_roots = outcome.missing_roots;
    Ok(report)
}
