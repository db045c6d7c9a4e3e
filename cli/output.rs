use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use codepack_core::{EmitReport, SourceConfig};

pub fn print_run_report(report: &EmitReport) {
    let stats = &report.stats;
    println!();
    println!("{}", " Bundle Written ".green().bold().underline());
    println!(
        "{:<20} {}",
        "Output:".green(),
        report.output_path.display().to_string().blue()
    );
    println!(
        "{:<20} {}",
        "Visualization:".green(),
        report.visualization_path.display().to_string().blue()
    );
    println!(
        "{:<20} {}",
        "Format:".green(),
        report.format.as_str().cyan()
    );
    println!(
        "{:<20} {}",
        "Files:".green(),
        format_thousands(stats.total_files as u64).cyan()
    );
    println!(
        "{:<20} {}",
        "Source Size:".green(),
        readable_size(stats.total_source_size).cyan()
    );
    println!(
        "{:<20} {}",
        "Output Size:".green(),
        readable_size(stats.output_file_size).cyan()
    );
    println!(
        "{:<20} {}",
        "Est. Tokens:".green(),
        format_thousands(stats.estimated_tokens as u64).cyan()
    );

    if !report.missing_roots.is_empty() {
        println!("\n{}", "Skipped missing paths:".yellow());
        for root in &report.missing_roots {
            println!("  {}", root.display().to_string().dimmed());
        }
    }
    println!();
}

pub fn print_config_table(configs: &[SourceConfig]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::Green),
        Cell::new("Name").fg(Color::Green),
        Cell::new("Package").fg(Color::Green),
        Cell::new("Format").fg(Color::Green),
        Cell::new("Paths").fg(Color::Green),
        Cell::new("Description").fg(Color::Green),
    ]);
    for config in configs {
        table.add_row(vec![
            Cell::new(&config.id).fg(Color::Cyan),
            Cell::new(&config.name),
            Cell::new(&config.package_name),
            Cell::new(config.output_format.as_str()).fg(Color::DarkGrey),
            Cell::new(config.paths.join("\n")),
            Cell::new(&config.description).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
}

fn readable_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
