//! `botes config` command - Inspect configuration
//!
//! Values come from, lowest priority first: built-in defaults, the global
//! config file, the project config file, then `BOTES_*` environment variables.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show(ShowArgs),

    /// Show paths to configuration files
    Path,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value (store, color_mode, default_format, colors)
    pub key: Option<String>,
}

/// Effective values, with defaults filled in
#[derive(Debug, Serialize)]
struct EffectiveConfig {
    store: String,
    color_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_format: Option<String>,
    colors: BTreeMap<String, String>,
}

impl EffectiveConfig {
    fn from_config(config: &Config) -> Self {
        Self {
            store: config.store_backend().to_string(),
            color_mode: config.color_mode().to_string(),
            default_format: config.default_format.clone(),
            colors: config
                .colors
                .iter()
                .map(|(code, color)| (code.clone(), color.to_string()))
                .collect(),
        }
    }
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Path => run_path(global),
    }
}

fn load(global: &GlobalOpts) -> Result<Config> {
    let project = Project::locate(global.project.as_deref()).ok();
    Ok(Config::load(project.as_ref())?)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load(global)?;
    let effective = EffectiveConfig::from_config(&config);

    if let Some(key) = &args.key {
        match key.as_str() {
            "store" => println!("{}", effective.store),
            "color_mode" => println!("{}", effective.color_mode),
            "default_format" => match &effective.default_format {
                Some(v) => println!("{}", v),
                None => return Err(miette::miette!("Key '{}' is not set", key)),
            },
            "colors" => {
                for (code, color) in &effective.colors {
                    println!("{}\t{}", code, color);
                }
            }
            _ => {
                return Err(miette::miette!(
                    "Unknown configuration key '{}'. Valid keys: store, color_mode, default_format, colors",
                    key
                ))
            }
        }
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&effective).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&effective).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            println!("{}", style("Effective Configuration").bold().underlined());
            println!();
            print_config_value("store", Some(&effective.store));
            print_config_value("color_mode", Some(&effective.color_mode));
            print_config_value("default_format", effective.default_format.as_deref());
            if effective.colors.is_empty() {
                print_config_value("colors", None);
            } else {
                println!("  {}:", style("colors").cyan());
                for (code, color) in &effective.colors {
                    println!("    {}: {}", code, style(color).yellow());
                }
            }

            if !global.quiet {
                println!();
                println!("{}", style("Config Sources (in priority order):").dim());
                println!("  1. Environment variables (BOTES_STORE, BOTES_COLOR_MODE)");
                println!("  2. Project config (.botes/config.yaml)");
                println!("  3. Global config (~/.config/botes/config.yaml)");
            }
        }
    }

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let global_path = get_global_config_path()?;
    let project = Project::locate(global.project.as_deref()).ok();

    println!("{}", style("Configuration file paths:").bold());
    println!();
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    if global_path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }

    println!();
    match project {
        Some(project) => {
            let path = project.config_path();
            println!("  {} {}", style("Project:").cyan(), path.display());
            if path.exists() {
                println!("          {}", style("(exists)").green());
            } else {
                println!("          {}", style("(not created)").dim());
            }
        }
        None => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a botes project)").dim()
        ),
    }

    Ok(())
}

fn get_global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}
