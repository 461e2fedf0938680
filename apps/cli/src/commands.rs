//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use instructgen_core::{Generated, Generator, ProgressReporter, write_document};
use instructgen_shared::{
    AppConfig, CatalogOptions, cache_db_path, filter_templates, init_config, is_expired,
    load_config,
};
use instructgen_storage::Storage;
use tracing::info;
use url::Url;

use crate::format::{format_file_size, plural};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// instructgen: merge Copilot instruction templates into one file.
#[derive(Parser)]
#[command(
    name = "instructgen",
    version,
    about = "Browse remote Copilot instruction templates and merge a selection into copilot-instructions.md.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the catalog listing URL.
    #[arg(long, env = "INSTRUCTGEN_CATALOG_URL", global = true)]
    pub catalog_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List available templates.
    List {
        /// Only show templates whose name contains this term (case-insensitive).
        #[arg(short, long)]
        search: Option<String>,

        /// Ignore the cached listing and fetch a fresh one.
        #[arg(long)]
        refresh: bool,

        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Merge the named templates, in the given order, into one document.
    Generate {
        /// Template names (see `instructgen list`).
        #[arg(required = true)]
        names: Vec<String>,

        /// Output directory (defaults to `[output] dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the document to stdout instead of writing a file.
        #[arg(long)]
        stdout: bool,

        /// Print merge statistics as JSON.
        #[arg(long)]
        json_stats: bool,
    },

    /// Persisted template-list cache management.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Cache subcommands.
#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// Show the age and size of the cached template list.
    Show,
    /// Delete the cached template list.
    Clear,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "instructgen=info",
        1 => "instructgen=debug",
        _ => "instructgen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let catalog_url = cli.catalog_url.as_deref();
    match cli.command {
        Command::List {
            search,
            refresh,
            json,
        } => cmd_list(catalog_url, search.as_deref(), refresh, json).await,
        Command::Generate {
            names,
            out,
            stdout,
            json_stats,
        } => cmd_generate(catalog_url, &names, out, stdout, json_stats).await,
        Command::Cache { action } => match action {
            CacheAction::Show => cmd_cache_show(catalog_url).await,
            CacheAction::Clear => cmd_cache_clear(catalog_url).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Build the generator from the loaded config plus flag overrides.
async fn open_generator(config: &AppConfig, catalog_url: Option<&str>) -> Result<Generator<Storage>> {
    let mut options = CatalogOptions::from(config);
    if let Some(url) = catalog_url {
        Url::parse(url).map_err(|e| eyre!("invalid catalog URL '{url}': {e}"))?;
        options.base_url = url.to_string();
    }

    let db_path = cache_db_path(config)?;
    let generator = Generator::open(options, &db_path).await?;
    Ok(generator)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_list(
    catalog_url: Option<&str>,
    search: Option<&str>,
    refresh: bool,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let generator = open_generator(&config, catalog_url).await?;

    if refresh {
        generator.catalog().clear_cached_listing().await?;
    }

    let templates = generator.list_templates().await?;
    let shown = filter_templates(&templates, search.unwrap_or_default());

    info!(total = templates.len(), shown = shown.len(), "listing templates");

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No templates match.");
        return Ok(());
    }

    let width = shown.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for template in &shown {
        println!(
            "  {:<width$}  {:>8}",
            template.name,
            format_file_size(template.size)
        );
    }
    println!();
    println!("  {} of {}", plural(shown.len(), "template"), templates.len());

    Ok(())
}

async fn cmd_generate(
    catalog_url: Option<&str>,
    names: &[String],
    out: Option<PathBuf>,
    stdout: bool,
    json_stats: bool,
) -> Result<()> {
    let config = load_config()?;
    let generator = open_generator(&config, catalog_url).await?;

    let selection = generator.resolve(names).await?;

    let reporter = CliProgress::new();
    let generated = generator.generate(&selection, &reporter).await?;

    if stdout {
        print!("{}", generated.merged_content);
        if json_stats {
            eprintln!("{}", serde_json::to_string_pretty(&generated.stats)?);
        }
        return Ok(());
    }

    let dir = out.unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let meta = write_document(&dir, &config.output.file_name, &generated.merged_content)?;

    if json_stats {
        println!("{}", serde_json::to_string_pretty(&generated.stats)?);
        return Ok(());
    }

    let output = &generated.stats.output_stats;
    println!();
    println!("  Instructions generated!");
    println!("  Templates: {}", generated.stats.templates.join(", "));
    println!("  Lines:     {}", output.lines);
    println!("  Words:     {}", output.words);
    println!(
        "  Reading:   ~{}",
        plural(output.estimated_reading_time, "minute")
    );
    println!("  Size:      {}", format_file_size(meta.size_bytes as u64));
    println!("  Path:      {}", meta.path.display());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|s| s.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &Generated) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Failed runs never reach `done`
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

async fn cmd_cache_show(catalog_url: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let generator = open_generator(&config, catalog_url).await?;

    let Some(entry) = generator.catalog().cached_listing().await? else {
        println!("No cached template list.");
        return Ok(());
    };

    let now = Utc::now();
    let age = now - entry.timestamp;
    let state = if is_expired(&entry, now, generator.catalog().options().list_ttl) {
        "expired"
    } else {
        "fresh"
    };

    println!();
    println!("  Templates: {}", entry.value.len());
    println!("  Cached at: {}", entry.timestamp.to_rfc3339());
    println!("  Age:       {} ({state})", plural(age.num_minutes().max(0) as usize, "minute"));
    println!("  Database:  {}", cache_db_path(&config)?.display());
    println!();

    Ok(())
}

async fn cmd_cache_clear(catalog_url: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let generator = open_generator(&config, catalog_url).await?;
    generator.catalog().clear_cached_listing().await?;
    println!("Template list cache cleared.");
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
