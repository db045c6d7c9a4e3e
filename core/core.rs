pub mod bundle;
pub mod collect;
pub mod config;
pub mod emit;
pub mod encode;
pub mod error;
pub mod ignore_rules;
pub mod size_tree;
pub mod stats;
pub mod toon;

pub use bundle::{PackageBundle, PackageFiles};
pub use collect::{CollectOutcome, add_file, collect_root, collect_sources};
pub use config::{SourceConfig, load_source_configs, parse_source_configs};
pub use emit::{
    EmitReport, JsonVisualization, VisualizationRenderer, emit, output_file_name,
    project_output_dir, run, sanitize_file_name,
};
pub use encode::{OutputFormat, decode, encode};
pub use error::{AppError, Result};
pub use ignore_rules::{IgnoreMatcher, should_ignore};
pub use size_tree::{SizeTreeNode, VisualizationData, build_size_tree};
pub use stats::{ProcessingStats, estimate_tokens};
