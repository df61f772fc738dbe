//! OpenAPI Validator CLI
//!
//! Validates OpenAPI 3.1 documents and converts them between JSON and YAML.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use openapi_model::{Document, Error, Format, Settings};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "openapi-validate")]
#[command(about = "Validate OpenAPI 3.1 documents")]
struct Cli {
    /// Settings file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate documents (files or directories)
    Validate {
        /// Documents or directories of .json/.yaml/.yml files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Re-encode a document as JSON or YAML
    Convert {
        /// Input document
        input: PathBuf,
        /// Target format (defaults to the configured output format)
        #[arg(long)]
        to: Option<Format>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load_from(cli.config.as_deref()).context("failed to load settings")?;
    debug!(?settings, "settings loaded");

    match cli.command {
        Commands::Validate { paths } => {
            let files = collect_documents(&paths)?;
            if files.is_empty() {
                bail!("no .json, .yaml or .yml documents found");
            }
            info!(count = files.len(), "validating documents");

            let mut failed = 0;
            for file in &files {
                let document = load(file)?;
                match document.validate(settings.validation.clone()) {
                    Ok(()) => println!("✅ {}", file.display()),
                    Err(Error::Validation(errors)) => {
                        failed += 1;
                        println!("❌ {}", file.display());
                        for line in errors.format_all().lines() {
                            println!("   {}", line);
                        }
                    }
                    Err(e) => return Err(e).with_context(|| format!("validating {}", file.display())),
                }
            }

            println!();
            if failed > 0 {
                println!("❌ {} of {} document(s) invalid", failed, files.len());
                std::process::exit(1);
            }
            println!("✅ {} document(s) valid", files.len());
            Ok(())
        }

        Commands::Convert { input, to, output } => {
            let document = load(&input)?;
            let format = to.unwrap_or(settings.output.format);
            let text = format.encode(&document)?;

            if let Some(path) = output {
                std::fs::write(&path, &text).with_context(|| format!("writing {}", path.display()))?;
                println!("✅ Written to {}", path.display());
            } else {
                print!("{}", text);
            }
            Ok(())
        }
    }
}

/// Expand directories into the documents they contain
fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && Format::from_path(entry.path()).is_some() {
                    files.push(entry.into_path());
                }
            }
        } else if path.exists() {
            files.push(path.clone());
        } else {
            bail!("{} does not exist", path.display());
        }
    }
    Ok(files)
}

fn load(path: &Path) -> Result<Document> {
    let format = Format::from_path(path)
        .with_context(|| format!("cannot tell the format of {} from its extension", path.display()))?;
    let src = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let document: Document = format
        .decode(&src)
        .with_context(|| format!("decoding {}", path.display()))?;
    Ok(document)
}
