use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use collaborator::{load_image, HttpCollaborator};
use pagesmith_lifecycle::{PositionHint, Relation};
use pagesmith_orchestrator::{EngineConfig, Orchestrator, StyleRequest};
use pagesmith_protocol::{Collaborator, OfflineCollaborator, Outcome};
use pagesmith_styles::{Slot, StyleAxis};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod collaborator;

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "Apply free-text changes to generated page components", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (overrides PAGESMITH_CONFIG and ./pagesmith.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and carry out a free-text request
    Request {
        text: String,

        /// Attach an image (makes CREATE requests visual)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    /// Show how a request would be classified
    Classify { text: String },

    /// Apply edit instruction JSON directly
    Edit(EditArgs),

    /// Create a component and register it in the page manifest
    Create {
        name: String,

        /// Place the new component after this one
        #[arg(long, conflicts_with = "above")]
        below: Option<String>,

        /// Place the new component before this one
        #[arg(long)]
        above: Option<String>,

        /// Component body (default: built-in template or generated)
        #[arg(long)]
        body: Option<PathBuf>,
    },

    /// Delete a component and its manifest entry
    Delete { name: String },

    /// Colour reference commands
    Styles {
        #[command(subcommand)]
        command: StylesCommand,
    },

    /// List component files and manifest entries
    Components,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct EditArgs {
    /// File containing instruction JSON
    #[arg(long)]
    instruction: Option<PathBuf>,

    /// Instruction JSON given inline
    #[arg(long)]
    json: Option<String>,
}

#[derive(Subcommand)]
enum StylesCommand {
    /// Point every heading at a palette family
    Headline { family: String },

    /// Replace an explicit colour value everywhere
    Literal {
        from: String,
        to: String,

        /// Value for the matching dark: variants
        #[arg(long)]
        dark: Option<String>,
    },

    /// List colour references on one axis
    Scan {
        #[arg(value_enum)]
        axis: ScanAxis,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScanAxis {
    Literal,
    Headline,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = EngineConfig::load(cli.config.as_deref())?;
    let engine = Orchestrator::new(config.clone(), collaborator(&config)?);

    match cli.command {
        Commands::Request { text, images } => {
            let images = images
                .iter()
                .map(|path| load_image(path))
                .collect::<Result<Vec<_>>>()?;
            report(&engine.handle(&text, &images).await)
        }
        Commands::Classify { text } => {
            print_json(&engine.classify(&text).await)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Edit(args) => {
            let json = match (args.instruction, args.json) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, Some(json)) => json,
                (None, None) => bail!("either --instruction or --json is required"),
            };
            report(&engine.apply_instruction(&json).await)
        }
        Commands::Create {
            name,
            below,
            above,
            body,
        } => {
            let hint = below
                .map(|anchor| PositionHint::new(Relation::After, anchor))
                .or_else(|| above.map(|anchor| PositionHint::new(Relation::Before, anchor)));
            let body = body
                .map(|path| {
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))
                })
                .transpose()?;
            report(
                &engine
                    .create_component(&name, body.as_deref(), hint.as_ref())
                    .await,
            )
        }
        Commands::Delete { name } => report(&engine.delete_component(&name).await),
        Commands::Styles { command } => match command {
            StylesCommand::Headline { family } => report(
                &engine
                    .update_styles(&StyleRequest::Slot {
                        slot: Slot::HeadingText,
                        family,
                    })
                    .await,
            ),
            StylesCommand::Literal { from, to, dark } => {
                report(&engine.update_styles(&StyleRequest::Literal { from, to, dark }).await)
            }
            StylesCommand::Scan { axis } => {
                let axis = match axis {
                    ScanAxis::Literal => StyleAxis::LiteralColor,
                    ScanAxis::Headline => StyleAxis::SemanticSlot(Slot::HeadingText),
                };
                let references = engine
                    .scan_styles(axis)
                    .await
                    .context("Style scan failed")?;
                print_json(&references)?;
                Ok(ExitCode::SUCCESS)
            }
        },
        Commands::Components => {
            let listing = engine
                .list_components()
                .await
                .context("Failed to list components")?;
            print_json(&listing)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn collaborator(config: &EngineConfig) -> Result<Arc<dyn Collaborator>> {
    if config.collaborator.is_configured() {
        let http = HttpCollaborator::from_settings(&config.collaborator)?;
        log::debug!("using collaborator at {:?}", config.collaborator.base_url);
        Ok(Arc::new(http))
    } else {
        log::debug!("no collaborator configured; running offline");
        Ok(Arc::new(OfflineCollaborator))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(outcome: &Outcome) -> Result<ExitCode> {
    print_json(outcome)?;
    if outcome.success {
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(error) = &outcome.error {
            eprintln!("Error: {error}");
        }
        Ok(ExitCode::FAILURE)
    }
}
