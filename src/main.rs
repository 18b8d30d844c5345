use anyhow::{Context, Result};
use citation_count::config::{find_config_file, get_config, load_config, Config};
use citation_count::extension::memory::MemoryPreferences;
use citation_count::extension::{
    CitationCountExtension, HostContext, Locale, SelectionBus, SlotPayload, UiSurface,
};
use citation_count::lookup::{build_query, CitationLookup, ProfileKind};
use citation_count::models::PaperIdentity;
use citation_count::utils::HttpClient;
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use serde::Deserialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Citation Count - look up how often the selected paper has been cited
#[derive(Parser, Debug)]
#[command(name = "citation-count")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look up citation counts for a paper by DOI, arXiv id or title", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Citation service to query
    #[arg(long, value_enum, global = true)]
    profile: Option<Profile>,

    /// Override the service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Label language (e.g. "en-US", "zh-CN")
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for slot payloads
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Text on a terminal, JSON otherwise
    Auto,
    /// Human-readable text
    Text,
    /// One JSON slot value per line
    Json,
}

/// Available citation services
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Profile {
    #[value(name = "paperlib")]
    Paperlib,
    #[value(name = "semantic")]
    Semantic,
}

impl From<Profile> for ProfileKind {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Paperlib => ProfileKind::Paperlib,
            Profile::Semantic => ProfileKind::SemanticScholar,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up the citation count of a single paper
    #[command(alias = "l")]
    Lookup {
        /// Paper title
        #[arg(long, short)]
        title: String,

        /// DOI (takes priority over arXiv id and title)
        #[arg(long, default_value = "")]
        doi: String,

        /// arXiv id (used when there is no DOI)
        #[arg(long, default_value = "")]
        arxiv: String,

        /// Print the request URL without fetching
        #[arg(long)]
        dry_run: bool,
    },

    /// Read selections as JSON lines from stdin and show citation counts
    ///
    /// Each line is a paper object or an array of paper objects, e.g.
    /// `[{"title": "Attention Is All You Need", "arxiv": "1706.03762v7"}]`.
    #[command(alias = "w")]
    Watch,

    /// Print the effective configuration as TOML
    Config {
        /// Write the configuration to this file instead of printing it
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

/// A selection line on stdin
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionLine {
    Many(Vec<PaperIdentity>),
    One(PaperIdentity),
}

impl From<SelectionLine> for Vec<PaperIdentity> {
    fn from(line: SelectionLine) -> Self {
        match line {
            SelectionLine::Many(papers) => papers,
            SelectionLine::One(paper) => vec![paper],
        }
    }
}

/// Prints slot writes to stdout
#[derive(Debug)]
struct TerminalSurface {
    json: bool,
}

impl UiSurface for TerminalSurface {
    fn update_slot(&self, slot: &str, widget_id: &str, payload: SlotPayload) {
        if self.json {
            println!("{}", serde_json::json!({ "slot": slot, "value": payload.to_slot_value(widget_id) }));
        } else {
            println!("{}: {}", payload.title.bold(), payload.content.cyan());
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        load_config(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?
    } else {
        get_config()?
    };

    if let Some(profile) = cli.profile {
        config.endpoint.profile = profile.into();
    }
    if let Some(base_url) = &cli.base_url {
        config.endpoint.base_url = Some(base_url.clone());
    }
    if let Some(locale) = &cli.locale {
        config.extension.locale = Locale::from_tag(locale);
    }
    if let Some(timeout) = cli.timeout {
        config.network.timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

fn http_client(config: &Config) -> Arc<HttpClient> {
    Arc::new(HttpClient::for_endpoint(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("citation_count={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let json = match cli.output {
        OutputFormat::Auto => !std::io::stdout().is_terminal(),
        OutputFormat::Text => false,
        OutputFormat::Json => true,
    };
    let surface = Arc::new(TerminalSurface { json });

    match cli.command {
        Commands::Lookup {
            title,
            doi,
            arxiv,
            dry_run,
        } => {
            let paper = PaperIdentity::new(title).with_doi(doi).with_arxiv(arxiv);
            let lookup = CitationLookup::new(config.endpoint.endpoint_profile(), http_client(&config));

            if dry_run {
                let query = build_query(&paper);
                println!("{} {}", query.kind(), lookup.query_url(&paper));
                return Ok(());
            }

            let locale = config.extension.locale;
            match lookup.lookup(&paper).await {
                Ok(result) => surface.update_slot(
                    &config.extension.ui_slot,
                    &config.extension.widget_id,
                    SlotPayload::for_result(locale, &result),
                ),
                Err(e) if e.is_not_found() => {
                    if !cli.quiet {
                        eprintln!("Citation count not found.");
                    }
                }
                Err(e) => return Err(e).context("Failed to get citation count"),
            }
        }

        Commands::Watch => {
            let selection = SelectionBus::new();
            let context = HostContext {
                selection: selection.clone(),
                fetcher: http_client(&config),
                surface,
                preferences: Arc::new(MemoryPreferences::new(config.extension.locale)),
            };
            let handle = CitationCountExtension::from_config(&config).start(context);

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                tokio::select! {
                    line = lines.next_line() => match line? {
                        Some(line) if line.trim().is_empty() => continue,
                        Some(line) => match serde_json::from_str::<SelectionLine>(&line) {
                            Ok(selected) => {
                                selection.publish(selected.into());
                            }
                            Err(e) => tracing::warn!("Ignoring malformed selection: {}", e),
                        },
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            handle.stop().await;
        }

        Commands::Config { write: Some(path) } => {
            config
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet {
                eprintln!("Wrote {}", path.display());
            }
        }

        Commands::Config { write: None } => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
