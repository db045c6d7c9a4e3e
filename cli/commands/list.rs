use crate::cli_args::ListArgs;
use crate::output;
use anyhow::{Context, Result};
use codepack_core as core;
use std::env;

pub fn handle_list_command(args: ListArgs) -> Result<()> {
    let base_dir = env::current_dir().context("Failed to determine current directory")?;
    let config_path = base_dir.join(&args.config_file.config);

    let configs = core::load_source_configs(&config_path)
        .with_context(|| format!("Failed to load configurations from {}", config_path.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&configs)
            .context("Failed to serialize configurations")?;
        println!("{json}");
    } else {
        output::print_config_table(&configs);
    }
    Ok(())
}
