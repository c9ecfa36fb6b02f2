use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autodoc::cli::commands::{export::ExportOptions, generate::GenerateOptions};
use autodoc::cli::ui::Output;
use autodoc::AutodocError;
use autodoc::cli::util::resumable_save_dir;

#[derive(Parser)]
#[command(name = "autodoc")]
#[command(
    version,
    about = "Resumable LLM-driven documentation generator for source repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Config file (TOML or JSON)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConfigFormat {
    Toml,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Document a repository, resuming from saved progress
    Generate {
        #[arg(default_value = ".", help = "Repository root")]
        path: PathBuf,
        #[arg(long, help = "Directory for saved progress")]
        save_dir: Option<PathBuf>,
        #[arg(long, help = "LLM provider (ollama, openai, claude-code)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
    },

    /// Show saved progress
    Status {
        #[arg(long, help = "Directory for saved progress")]
        save_dir: Option<PathBuf>,
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: StatusFormat,
    },

    /// Export saved documentation as markdown
    Export {
        #[arg(long, help = "Directory for saved progress")]
        save_dir: Option<PathBuf>,
        #[arg(short, long, help = "Output file (default: output.md)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Omit units without documentation")]
        skip_empty: bool,
        #[arg(long, help = "Prepend the project overview")]
        with_summary: bool,
    },

    /// Check configuration, model backend and embedder
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Delete saved progress
    Clean {
        #[arg(long, help = "Directory for saved progress")]
        save_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (merged from all sources)
    Show {
        #[arg(short = 'f', long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
    /// Show configuration file paths
    Path,
    /// Write a starter project configuration
    Init {
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mautodoc encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!("\x1b[33mSaved progress is intact; rerun to resume.\x1b[0m");
        eprintln!();

        // Backtrace with RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config_path = cli.config.clone();
    let save_dir = save_dir_override(&cli.command);
    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, config_path.as_deref(), save_dir);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// `--save-dir` given to the command, if any
fn save_dir_override(command: &Commands) -> Option<PathBuf> {
    match command {
        Commands::Generate { save_dir, .. }
        | Commands::Status { save_dir, .. }
        | Commands::Export { save_dir, .. }
        | Commands::Clean { save_dir } => save_dir.clone(),
        Commands::Doctor | Commands::Config { .. } => None,
    }
}

fn report_error(
    err: &anyhow::Error,
    config_path: Option<&std::path::Path>,
    save_dir: Option<PathBuf>,
) {
    let output = Output::new();
    output.error(&format!("{:#}", err));

    let Some(autodoc_err) = err.downcast_ref::<AutodocError>() else {
        return;
    };

    let category = autodoc_err.llm_category();
    if let Some(category) = category {
        output.info(category.hint());
    }

    // Point at the saved state when a run stopped partway
    if let Some(dir) = resumable_save_dir(config_path, save_dir) {
        let advice = category.map_or("run 'autodoc generate' again to resume", |c| {
            c.resume_advice()
        });
        output.info(&format!(
            "Progress up to the last documented unit is saved in {}; {}",
            dir.display(),
            advice
        ));
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    use autodoc::cli::commands;

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Generate {
            path,
            save_dir,
            provider,
            model,
        } => {
            commands::generate::run(
                config,
                GenerateOptions {
                    path,
                    save_dir,
                    provider,
                    model,
                },
            )?;
        }
        Commands::Status { save_dir, format } => {
            let format = match format {
                StatusFormat::Text => "text",
                StatusFormat::Json => "json",
            };
            commands::status::run(config, save_dir, format)?;
        }
        Commands::Export {
            save_dir,
            output,
            skip_empty,
            with_summary,
        } => {
            commands::export::run(
                config,
                ExportOptions {
                    save_dir,
                    output,
                    skip_empty,
                    with_summary,
                },
            )?;
        }
        Commands::Doctor => {
            commands::doctor::run(config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(config, matches!(format, ConfigFormat::Json))?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { force } => {
                commands::config::init(force)?;
            }
        },
        Commands::Clean { save_dir } => {
            commands::clean::run(config, save_dir)?;
        }
    }

    Ok(())
}
