//! CLI entry point for `loreshell`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use loreshell::client::ArchiveClient;
use loreshell::config::{self, Config};
use loreshell::export::diff::DiffStore;
use loreshell::export::text;
use loreshell::model::feed::SearchFilters;
use loreshell::search::query::SearchQuery;
use loreshell::store::reader::MboxArchive;

#[derive(Parser)]
#[command(
    name = "loreshell",
    version,
    about = "Read kernel mailing list threads, patch series and search results from public-inbox archives"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Archive root URL (default: https://lore.kernel.org)
    #[arg(long, global = true, env = "LORESHELL_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Inbox name; required for archives without a universal /r/ redirect
    #[arg(long, global = true, env = "LORESHELL_INBOX", value_name = "NAME")]
    inbox: Option<String>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a thread and show each message's reduced context
    Thread {
        /// Message id of any message in the thread (angle brackets optional)
        message_id: String,
        /// Keep messages from CI robots and other automated senders
        #[arg(long)]
        include_bots: bool,
        /// Trailing lines kept from each quote block
        #[arg(long, value_name = "N")]
        max_quote_lines: Option<usize>,
        /// Directory that receives patch diffs
        #[arg(long, value_name = "DIR")]
        diff_dir: Option<PathBuf>,
        /// Read the thread from a local .mbox or .mbox.gz file instead
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Fetch one message verbatim
    Raw {
        message_id: String,
        #[arg(long)]
        json: bool,
    },
    /// List recent patch series sent from an address
    Series {
        email: String,
        /// Feed entries considered
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=200))]
        max_results: Option<u16>,
        #[arg(long)]
        json: bool,
    },
    /// Search patches and discussions
    Search {
        query: String,
        /// Subject filter (s:)
        #[arg(long)]
        subsystem: Option<String>,
        /// Sender filter (f:)
        #[arg(long)]
        author: Option<String>,
        /// Only messages since this date (YYYYMMDD)
        #[arg(long, value_name = "YYYYMMDD")]
        since: Option<String>,
        /// Hits returned
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=100))]
        max_results: Option<u16>,
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration, then let global flags override the archive.
    let mut config = config::load_config();
    if let Some(base_url) = cli.base_url {
        config.archive.base_url = base_url;
    }
    if let Some(inbox) = cli.inbox {
        config.archive.inbox = Some(inbox);
    }

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Thread {
            message_id,
            include_bots,
            max_quote_lines,
            diff_dir,
            file,
            json,
        } => {
            if include_bots {
                config.thread.include_bots = true;
            }
            if let Some(n) = max_quote_lines {
                config.thread.max_quote_lines = n;
            }
            if diff_dir.is_some() {
                config.thread.diff_dir = diff_dir;
            }
            cmd_thread(&config, &message_id, file.as_deref(), json)
        }
        Commands::Raw { message_id, json } => cmd_raw(&config, &message_id, json),
        Commands::Series {
            email,
            max_results,
            json,
        } => {
            let max_results = max_results.map_or(config.search.series_max_results, usize::from);
            cmd_series(&config, &email, max_results, json)
        }
        Commands::Search {
            query,
            subsystem,
            author,
            since,
            max_results,
            json,
        } => {
            let filters = SearchFilters {
                subsystem,
                author,
                since_date: since,
            };
            let max_results = max_results.map_or(config.search.max_results, usize::from);
            cmd_search(&config, &query, filters, max_results, json)
        }
        Commands::Config { save } => cmd_config(&config, save),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_path = config::log_file_path(config);
    let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let log_name = log_path.file_name().unwrap_or_default();
    if std::fs::create_dir_all(log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(log_dir, log_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Spinner on stderr while a request is in flight.
fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Fetch (or read) a thread and print it.
fn cmd_thread(
    config: &Config,
    message_id: &str,
    file: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let options = config.thread.options();
    let diffs = DiffStore::new(config::diff_dir(config));

    let thread = match file {
        Some(path) => MboxArchive::open(path)?.thread(message_id, &options, Some(&diffs))?,
        None => {
            let client = ArchiveClient::new(&config.archive)?;
            let pb = spinner(format!("Fetching thread {message_id}"));
            let result = client.get_thread(message_id, &options, Some(&diffs));
            pb.finish_and_clear();
            result?
        }
    };

    if json {
        print_json(&thread)
    } else {
        print!("{}", text::render_thread(&thread));
        Ok(())
    }
}

/// Fetch one message and print it verbatim.
fn cmd_raw(config: &Config, message_id: &str, json: bool) -> anyhow::Result<()> {
    let client = ArchiveClient::new(&config.archive)?;
    let pb = spinner(format!("Fetching message {message_id}"));
    let result = client.get_raw(message_id);
    pb.finish_and_clear();
    let raw = result?;

    if json {
        print_json(&raw)
    } else {
        print!("{}", text::render_raw(&raw));
        Ok(())
    }
}

/// List an author's recent series.
fn cmd_series(config: &Config, email: &str, max_results: usize, json: bool) -> anyhow::Result<()> {
    let client = ArchiveClient::new(&config.archive)?;
    let pb = spinner(format!("Searching series from {email}"));
    let result = client.get_user_series(email, max_results);
    pb.finish_and_clear();
    let series = result?;

    if json {
        print_json(&series)
    } else {
        print!("{}", text::render_series(&series));
        Ok(())
    }
}

/// Search the archive.
fn cmd_search(
    config: &Config,
    query: &str,
    filters: SearchFilters,
    max_results: usize,
    json: bool,
) -> anyhow::Result<()> {
    let query = SearchQuery::new(query, filters)?;
    let client = ArchiveClient::new(&config.archive)?;
    let pb = spinner(format!("Searching for {}", query.to_query_string()));
    let result = client.search_patches(&query, max_results);
    pb.finish_and_clear();
    let result = result?;

    if json {
        print_json(&result)
    } else {
        print!("{}", text::render_search(&result));
        Ok(())
    }
}

/// Print the effective configuration, optionally saving it.
fn cmd_config(config: &Config, save: bool) -> anyhow::Result<()> {
    if save {
        let path = config::save_config(config)?;
        eprintln!("Saved configuration to {}", path.display());
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "loreshell", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
