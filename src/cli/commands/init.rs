//! `botes init` command - Initialize a new botes project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError};
use crate::core::store::PAINTS_DIR;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .botes/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            tracing::info!(root = %project.root().display(), "project initialized");
            println!(
                "{} Initialized botes project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            if global.quiet {
                return Ok(());
            }
            println!();
            println!("Created project structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Add your first can",
                style("botes paint new -i").yellow()
            );
            println!(
                "  {} List all cans",
                style("botes paint list").yellow()
            );
            println!(
                "  {} See which codes have a known color",
                style("botes color list").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} botes project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reset the project configuration",
                style("botes init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    println!("  {}/", style(name).bold());
    println!("  ├── .botes/");
    println!("  │   └── config.yaml");
    println!("  └── {}/", PAINTS_DIR);
}
