use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use innovateeasy::cli::ConfigOverrides;
use innovateeasy::cli::commands::analyze::AnalyzeOptions;
use innovateeasy::config::GatePolicy;
use innovateeasy::pipeline::Stage;

#[derive(Parser)]
#[command(name = "innovateeasy")]
#[command(
    version,
    about = "AI solutions explorer: company research, AI use cases and resources"
)]
struct Cli {
    /// Defaults to `analyze` for the configured default company
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

/// Overrides shared by the pipeline-running commands
#[derive(Args, Default)]
struct PipelineArgs {
    #[arg(long, short, help = "Directory for the markdown artifacts")]
    output_dir: Option<PathBuf>,
    #[arg(long, help = "Model to use")]
    model: Option<String>,
    #[arg(long, help = "Gate between stages: tagged, error-substring")]
    gate: Option<GatePolicy>,
}

impl PipelineArgs {
    fn overrides(self, bind: Option<String>) -> ConfigOverrides {
        ConfigOverrides {
            output_dir: self.output_dir,
            model: self.model,
            gate: self.gate,
            bind,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Research a company, generate AI use cases and collect resources
    Analyze {
        #[arg(help = "Company name (default: pipeline.default_company)")]
        company: Option<String>,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Serve the browser UI
    Serve {
        #[arg(long, short, help = "Listen address (default: server.bind)")]
        bind: Option<String>,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print artifacts from the last run
    Show {
        #[arg(help = "Stage: research, use-cases, resources (default: all)")]
        stage: Option<Stage>,
        #[arg(long, short, help = "Directory holding the artifacts")]
        output_dir: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
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
        eprintln!("\x1b[31mInnovateEasy encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env is optional
    let dotenv = dotenvy::dotenv().ok();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let command = cli.command.unwrap_or(Commands::Analyze {
        company: None,
        pipeline: PipelineArgs::default(),
    });

    match command {
        Commands::Analyze { company, pipeline } => {
            let rt = Runtime::new()?;
            rt.block_on(innovateeasy::cli::commands::analyze::run(AnalyzeOptions {
                company,
                overrides: pipeline.overrides(None),
                quiet: cli.quiet,
            }))?;
        }
        Commands::Serve { bind, pipeline } => {
            let rt = Runtime::new()?;
            rt.block_on(innovateeasy::cli::commands::serve::run(
                pipeline.overrides(bind),
            ))?;
        }
        Commands::Show { stage, output_dir } => {
            let overrides = ConfigOverrides {
                output_dir,
                ..ConfigOverrides::default()
            };
            let rt = Runtime::new()?;
            rt.block_on(innovateeasy::cli::commands::show::run(stage, overrides))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                innovateeasy::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                innovateeasy::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                innovateeasy::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
