use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tally_finance::export::{write_csv, write_json};
use tally_finance::{process_statement, Categorizer, OpenAiClassifier};
use tally_ingest::{layout_by_name, TextFileSource, LAYOUT_NAMES};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod auth;
mod config;
mod report;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Extract and categorize transactions from bank statement text"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement's extracted text (pages separated by form feeds)
    Parse {
        file: PathBuf,

        /// Refine keyword categories with the external classifier
        #[arg(long)]
        ai: bool,

        /// Most external classifier calls for this statement
        #[arg(long)]
        ai_cap: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write output here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Year to use when the statement has no period header
        #[arg(long)]
        year: Option<i32>,

        /// Statement layout (see `tally layouts`)
        #[arg(long)]
        layout: Option<String>,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// List supported statement layouts
    Layouts,

    /// Store credentials in ~/.tally/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste an OpenAI API key
    PasteOpenaiApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

struct ParseArgs {
    file: PathBuf,
    ai: bool,
    ai_cap: Option<usize>,
    format: OutputFormat,
    out: Option<PathBuf>,
    year: Option<i32>,
    layout: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > info
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false).compact())
        .init();

    match cli.command {
        Command::Parse {
            file,
            ai,
            ai_cap,
            format,
            out,
            year,
            layout,
        } => {
            parse(ParseArgs {
                file,
                ai,
                ai_cap,
                format,
                out,
                year,
                layout,
            })
            .await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Layouts => {
            for name in LAYOUT_NAMES {
                println!("{name}");
            }
        }

        Command::Auth { command } => match command {
            AuthCommand::PasteOpenaiApiKey => auth::openai_paste_api_key()?,
        },
    }

    Ok(())
}

async fn parse(args: ParseArgs) -> Result<()> {
    if !args.file.exists() {
        bail!("statement not found: {}", args.file.display());
    }

    let cfg = config::load_config()?;
    let layout_name = args.layout.unwrap_or_else(|| cfg.parser.layout.clone());
    let layout = layout_by_name(&layout_name)?;
    let fallback_year = match args.year {
        Some(year) => year,
        None => tally_core::time::current_year(&cfg.parser.timezone)
            .with_context(|| format!("timezone {}", cfg.parser.timezone))?,
    };

    let classifier = if args.ai || cfg.classifier.enabled {
        build_classifier(&cfg.classifier)?
    } else {
        None
    };
    let categorizer = match &classifier {
        Some(c) => {
            Categorizer::with_classifier(c, cfg.classifier.categorizer_config(true, args.ai_cap))
        }
        None => Categorizer::keyword_only(),
    };

    let source = TextFileSource::new(&args.file);
    let processed = process_statement(&source, layout.as_ref(), fallback_year, &categorizer)
        .await
        .with_context(|| format!("processing {}", args.file.display()))?;

    let mut writer = open_output(args.out.as_deref())?;
    match args.format {
        OutputFormat::Table => writer.write_all(report::render_table(&processed).as_bytes())?,
        OutputFormat::Json => {
            write_json(&mut writer, &processed.transactions)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => write_csv(&mut writer, &processed.transactions)?,
    }
    writer.flush()?;

    if let Some(path) = &args.out {
        info!(
            path = %path.display(),
            transactions = processed.transactions.len(),
            "wrote output"
        );
    }
    Ok(())
}

fn build_classifier(section: &config::ClassifierSection) -> Result<Option<OpenAiClassifier>> {
    if section.provider != "openai" {
        bail!(
            "unsupported classifier provider {:?} (expected \"openai\")",
            section.provider
        );
    }
    match auth::resolve_api_key(&section.api_key_env)? {
        Some(key) => Ok(Some(
            OpenAiClassifier::new(key)
                .with_model(section.model.clone())
                .with_base_url(section.base_url.clone())
                .with_temperature(section.temperature),
        )),
        None => {
            warn!(
                env = %section.api_key_env,
                "no OpenAI API key found; using keyword categories only (run: tally auth paste-openai-api-key)"
            );
            Ok(None)
        }
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) => {
            let file = File::create(p).with_context(|| format!("create {}", p.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
