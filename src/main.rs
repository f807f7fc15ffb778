use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use setdiagram::commands::{self, DiagramContext};
use setdiagram::error_fmt::AppError;

#[derive(Parser)]
#[command(name = "setdiagram")]
#[command(about = "Lay out diagrams of nested and partitioned sets")]
struct Cli {
    /// Catalogue file (YAML); the built-in number sets when omitted
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Drawing options file (YAML); defaults are used when it does not exist
    #[arg(long, global = true, default_value = OPTIONS_FILE)]
    options: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

/// Which categories to draw
#[derive(Args, Clone)]
struct Selection {
    /// Categories to show (all categories when none are given)
    categories: Vec<String>,
    /// Categories to hide (comma-separated or repeat flag)
    #[arg(long, value_delimiter = ',')]
    hide: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the text rendering of a layout
    Text {
        #[command(flatten)]
        selection: Selection,
    },
    /// Print rectangle and label geometry as YAML
    Geometry {
        #[command(flatten)]
        selection: Selection,
    },
    /// List categories, widest first
    List,
    /// Validate the catalogue and drawing options
    Check,
}

const OPTIONS_FILE: &str = "setdiagram.yml";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let ctx = DiagramContext::load(cli.catalog.as_deref(), &cli.options)?;

    let output = match cli.command {
        Commands::Text { selection } => {
            commands::text(&ctx, &selection.categories, &selection.hide)?
        }
        Commands::Geometry { selection } => {
            commands::geometry(&ctx, &selection.categories, &selection.hide)?
        }
        Commands::List => commands::list(&ctx),
        Commands::Check => commands::check(&ctx)?,
    };

    print!("{}", output);
    Ok(())
}
