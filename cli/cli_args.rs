use clap::{Args, Parser, Subcommand, ValueEnum};
use codepack_core::OutputFormat;
use codepack_core::config::DEFAULT_CONFIG_FILENAME;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ConfigFileOpts {
    #[arg(
        short = 'c',
        long,
        help = "Path of the file holding the source configurations (.toml, .json, .yaml).",
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILENAME,
        help_heading = "Configuration"
    )]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Bundle selected project sources into a single JSON, YAML or TOON file.",
    long_about = "codepack walks the paths of a source configuration, keeps files whose extension is \nallowed and that no ignore rule excludes, and writes their contents as one structured \nbundle next to a size visualization.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  codepack list\n  codepack run --id web -f yaml\n  codepack run -c configs/sources.toml --id api -o ./bundles",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "r",
        visible_alias = "gen",
        about = "Collect sources for one configuration and write the bundle."
    )]
    Run(RunArgs),

    #[command(visible_alias = "ls", about = "List the configurations in the config file.")]
    List(ListArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[clap(flatten)]
    pub config_file: ConfigFileOpts,

    #[arg(
        long,
        value_name = "ID",
        help = "Configuration to run (required when the file defines more than one).",
        help_heading = "Configuration"
    )]
    pub id: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_name = "FORMAT",
        value_parser = parse_format,
        help = "Override the configured output format (json, yaml, toon).",
        help_heading = "Output"
    )]
    pub format: Option<OutputFormat>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Override the configured output directory.",
        help_heading = "Output"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        value_enum,
        default_value_t = VizKind::Html,
        help = "Kind of companion visualization to write.",
        help_heading = "Output"
    )]
    pub viz: VizKind,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    pub config_file: ConfigFileOpts,

    #[arg(long, help = "Print the configurations as JSON instead of a table.")]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VizKind {
    /// Interactive treemap page
    Html,
    /// Raw {tree, stats} payload
    Json,
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}
