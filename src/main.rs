use botes::cli::{Cli, Commands};
use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Restore default SIGPIPE so piping into `head` ends quietly instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => botes::cli::commands::init::run(args, &global),
        Commands::Paint(cmd) => botes::cli::commands::paint::run(cmd, &global),
        Commands::Color(cmd) => botes::cli::commands::color::run(cmd, &global),
        Commands::Config(cmd) => botes::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => botes::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `BOTES_LOG` takes an EnvFilter directive, `--verbose` means debug
fn init_tracing(verbose: bool) {
    let default = if verbose { "botes=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BOTES_LOG").unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
