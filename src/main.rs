//! ksk CLI - page through web search results from the terminal.

use std::io::Write;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ksk::{Backend, BackendConfig, Page, Registry, SearchError};

/// ksk - search the web without leaving the terminal
#[derive(Parser)]
#[command(name = "ksk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search with one engine and page through the results
    Search(SearchArgs),

    /// List available search engines
    Engines,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query (words are joined with spaces)
    query: Vec<String>,

    /// Search engine to use (duckduckgo, ddg, brave, b)
    #[arg(short, long, default_value = "duckduckgo")]
    engine: String,

    /// Region/country code (e.g. jp, us, de)
    #[arg(short, long, default_value = "")]
    region: String,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(short, long, default_value = "10")]
    timeout: u64,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Number of pages to fetch before exiting
    #[arg(short, long, default_value = "1")]
    pages: u32,

    /// Read paging commands from stdin (n, p, /query, q)
    #[arg(short, long)]
    interactive: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Engines => list_engines(),
    }
}

fn list_engines() -> Result<()> {
    println!("Available search engines:\n");
    for entry in Registry::with_defaults().entries() {
        let aliases = if entry.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", entry.aliases.join(", "))
        };
        println!("  {:<11} - {}{}", entry.name, entry.description, aliases);
    }
    println!();
    println!("Usage: ksk search -e brave -r jp \"query\"");
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let registry = Registry::with_defaults();
    let config = BackendConfig::new()
        .with_region(args.region.trim())
        .with_timeout(args.timeout);

    let backend = registry
        .create(&args.engine, config)
        .map_err(|e| match e {
            SearchError::UnknownBackend(name) => anyhow!(
                "Unknown engine: {} (use {})",
                name,
                registry.names().join(" or ")
            ),
            other => other.into(),
        })?;

    let query = args.query.join(" ").trim().to_string();

    if args.interactive {
        return run_pager(backend.as_ref(), query, args.format).await;
    }

    if query.is_empty() {
        anyhow::bail!("Query cannot be empty");
    }

    let mut page = backend.search(&query).await?;
    print_page(&page, backend.name(), args.format)?;

    for _ in 1..args.pages {
        if !page.has_more {
            break;
        }
        page = backend.next_page(&page, &query).await?;
        print_page(&page, backend.name(), args.format)?;
    }

    Ok(())
}

/// What a pager command produced.
enum PagerEvent {
    /// The user asked to leave.
    Quit,
    /// A new page is current.
    Page,
    /// The backend call failed; the previous page and query stay current.
    Failed(SearchError),
    /// The command was refused without calling the backend.
    Notice(&'static str),
    /// Unrecognized command.
    Help,
    /// Blank line.
    Idle,
}

/// Line-driven pager state.
///
/// `query` is always the query `current` was fetched with, so paging never
/// mixes one query's continuation with another query's text.
#[derive(Default)]
struct Pager {
    query: String,
    current: Option<Page>,
}

impl Pager {
    /// Runs one command line against `backend`.
    async fn handle(&mut self, backend: &dyn Backend, line: &str) -> PagerEvent {
        let line = line.trim();

        let (query, outcome) = match line {
            "q" | "quit" => return PagerEvent::Quit,
            "" => return PagerEvent::Idle,
            "n" | "l" => match &self.current {
                Some(page) if page.has_more => (
                    self.query.clone(),
                    backend.next_page(page, &self.query).await,
                ),
                _ => return PagerEvent::Notice("No more pages"),
            },
            "p" | "h" => match &self.current {
                Some(page) if page.page_num > 1 => (
                    self.query.clone(),
                    backend.prev_page(&self.query, page.page_num - 1).await,
                ),
                _ => return PagerEvent::Notice("Already on the first page"),
            },
            _ => match line.strip_prefix('/').map(str::trim) {
                Some("") => return PagerEvent::Notice("Query cannot be empty"),
                Some(text) => (text.to_string(), backend.search(text).await),
                None => return PagerEvent::Help,
            },
        };

        match outcome {
            Ok(page) => {
                self.query = query;
                self.current = Some(page);
                PagerEvent::Page
            }
            Err(e) => PagerEvent::Failed(e),
        }
    }
}

/// Reads pager commands from stdin, one per line.
async fn run_pager(backend: &dyn Backend, query: String, format: OutputFormat) -> Result<()> {
    let mut pager = Pager::default();

    if !query.is_empty() {
        let event = pager.handle(backend, &format!("/{query}")).await;
        show_event(event, &pager, backend.name(), format)?;
    }
    print_pager_help();
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = pager.handle(backend, &line).await;
        if matches!(event, PagerEvent::Quit) {
            break;
        }
        show_event(event, &pager, backend.name(), format)?;
        prompt()?;
    }

    Ok(())
}

fn show_event(event: PagerEvent, pager: &Pager, engine: &str, format: OutputFormat) -> Result<()> {
    match event {
        PagerEvent::Page => {
            if let Some(page) = &pager.current {
                print_page(page, engine, format)?;
            }
        }
        PagerEvent::Failed(e) if e.is_retryable() => {
            eprintln!("Error: {e} (wait a moment and retry)")
        }
        PagerEvent::Failed(e) => eprintln!("Error: {e}"),
        PagerEvent::Notice(message) => eprintln!("{message}"),
        PagerEvent::Help => print_pager_help(),
        PagerEvent::Quit | PagerEvent::Idle => {}
    }
    Ok(())
}

fn print_pager_help() {
    eprintln!("Commands: n = next page, p = previous page, /<query> = new search, q = quit");
}

fn prompt() -> Result<()> {
    print!("ksk> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_page(page: &Page, engine: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "\n{} results from {} (page {}{}):\n",
                page.len(),
                engine,
                page.page_num,
                if page.has_more { ", more available" } else { "" }
            );

            for (i, result) in page.items().iter().enumerate() {
                println!("{}. {}", i + 1, result.title);
                println!("   {}", result.url);
                if !result.snippet.is_empty() {
                    println!("   {}", truncate(&result.snippet, 150));
                }
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(page)?);
        }
        OutputFormat::Compact => {
            for result in page.items() {
                println!("{}\t{}", result.title, result.url);
            }
        }
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
