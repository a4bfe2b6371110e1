//! `botes color` command - Inspect the code to color table

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::escape_csv;
use crate::cli::table::CellValue;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::color::{normalize_code, ColorHex};
use crate::core::project::Project;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ColorCommands {
    /// List every known code and its color
    List,

    /// Show the color a code resolves to
    Resolve(ResolveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Manufacturer code (case and surrounding spaces are ignored)
    pub code: String,
}

#[derive(Debug, Serialize)]
struct ColorEntry {
    code: String,
    color: ColorHex,
    source: &'static str,
}

pub fn run(cmd: ColorCommands, global: &GlobalOpts) -> Result<()> {
    // The table works outside a project too; it then only sees global config
    let project = Project::locate(global.project.as_deref()).ok();
    let config = Config::load(project.as_ref())?;

    match cmd {
        ColorCommands::List => run_list(&config, global),
        ColorCommands::Resolve(args) => run_resolve(args, &config, global),
    }
}

fn entries(config: &Config) -> Vec<ColorEntry> {
    let configured: Vec<String> = config.colors.keys().map(|k| normalize_code(k)).collect();
    config
        .resolver()
        .entries()
        .map(|(code, color)| ColorEntry {
            code: code.to_string(),
            color,
            source: if configured.iter().any(|c| c == code) {
                "config"
            } else {
                "built-in"
            },
        })
        .collect()
}

fn run_list(config: &Config, global: &GlobalOpts) -> Result<()> {
    let entries = entries(config);
    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&entries).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("code,color,source");
            for entry in &entries {
                println!("{},{},{}", escape_csv(&entry.code), entry.color, entry.source);
            }
        }
        OutputFormat::Id | OutputFormat::ShortId => {
            for entry in &entries {
                println!("{}", entry.code);
            }
        }
        OutputFormat::Md => {
            println!("| Code | Color | Source |");
            println!("|---|---|---|");
            for entry in &entries {
                println!(
                    "| {} | {} | {} |",
                    CellValue::Text(entry.code.clone()).format_md(),
                    CellValue::Swatch(entry.color).format_md(),
                    entry.source
                );
            }
        }
        _ => print_color_table(&entries, global.quiet),
    }

    Ok(())
}

fn print_color_table(entries: &[ColorEntry], quiet: bool) {
    let code_width = entries
        .iter()
        .map(|e| e.code.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    println!(
        "{:<cw$} {:<9} {}",
        style("CODE").bold(),
        style("COLOR").bold(),
        style("SOURCE").bold(),
        cw = code_width
    );
    println!("{}", "-".repeat(code_width + 20));
    for entry in entries {
        println!(
            "{:<cw$} {} {}",
            entry.code,
            CellValue::Swatch(entry.color).format_tsv(9),
            style(entry.source).dim(),
            cw = code_width
        );
    }

    if !quiet {
        println!();
        println!(
            "{} code(s). Unknown codes show as {}.",
            style(entries.len()).cyan(),
            style(ColorHex::NEUTRAL).cyan()
        );
    }
}

fn run_resolve(args: ResolveArgs, config: &Config, global: &GlobalOpts) -> Result<()> {
    let resolver = config.resolver();
    let color = resolver.resolve(&args.code);
    let known = resolver.lookup(&args.code).is_some();
    tracing::debug!(code = %args.code, %color, known, "resolved color");

    match global.format {
        OutputFormat::Json => {
            let entry = serde_json::json!({
                "code": normalize_code(&args.code),
                "color": color,
                "known": known,
            });
            println!("{}", serde_json::to_string_pretty(&entry).into_diagnostic()?);
        }
        _ => {
            println!("{}", color);
            if !known && !global.quiet {
                eprintln!(
                    "{} Unknown code '{}', using the neutral color",
                    style("!").yellow(),
                    args.code.trim()
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_mark_config_overrides() {
        let config: Config =
            serde_yml::from_str("colors:\n  blanco: '#FAFAFA'\n  azulete: '#1F4E9C'\n").unwrap();
        let entries = entries(&config);

        assert_eq!(entries.len(), 5);
        let blanco = entries.iter().find(|e| e.code == "BLANCO").unwrap();
        assert_eq!(blanco.source, "config");
        assert_eq!(blanco.color.to_string(), "#FAFAFA");
        let negro = entries.iter().find(|e| e.code == "NEGRO").unwrap();
        assert_eq!(negro.source, "built-in");
    }
}
