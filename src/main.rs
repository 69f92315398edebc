//! StyleSense CLI
//!
//! Interactive terminal UI plus one-shot commands for scripting.

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stylesense::{
    AppConfig, Completion, GenderFilter, HttpRecommender, RecommendRequest, Recommender,
    SearchView, StyleSenseError,
};

/// StyleSense - AI-powered fashion search
///
/// Describe what you're looking for in plain words and browse the
/// products the recommendation service returns.
#[derive(Parser)]
#[command(name = "stylesense")]
#[command(author = "StyleSense Contributors")]
#[command(version)]
#[command(about = "AI-powered fashion search in the terminal", long_about = None)]
struct Cli {
    /// Extra config file (TOML), merged over the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Recommendation service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// More log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive search view (default)
    Tui {
        /// Start with AI re-rank enabled
        #[arg(long)]
        rerank: bool,
    },

    /// Run one search and print the results
    Search {
        /// What you're looking for (use -- before a query starting with -)
        #[arg(allow_hyphen_values = true, required_unless_present = "image", num_args = 1..)]
        query: Vec<String>,

        /// Search by a photo instead of (or alongside) text
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,

        /// Ask the service to re-rank results with the LLM
        #[arg(long)]
        rerank: bool,

        /// Number of results (default follows the terminal width)
        #[arg(short = 'k', long)]
        top_k: Option<u32>,

        /// Restrict to men's or women's products
        #[arg(short, long)]
        gender: Option<GenderFilter>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List the example queries
    Examples,

    /// Check that the service is reachable
    Health,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!(target: "main", error = %e, "exiting with error");
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> stylesense::Result<()> {
    if let Some(path) = cli.config.as_deref().filter(|p| !p.exists()) {
        return Err(StyleSenseError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
        config = config.validated()?;
    }

    let level = match cli.verbose {
        0 => config.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    stylesense::logging::init(&level);
    stylesense::logging::separator("startup");
    tracing::info!(
        target: "main",
        version = stylesense::VERSION,
        base_url = %config.base_url,
        "StyleSense starting up"
    );

    let timeout = config.request_timeout_secs.map(Duration::from_secs);

    match cli.command.unwrap_or(Commands::Tui { rerank: false }) {
        Commands::Tui { rerank } => {
            config.rerank |= rerank;
            let client = HttpRecommender::new(&config.base_url, timeout)?;
            stylesense::tui::run(&config, Arc::new(client))
        }

        Commands::Search {
            query,
            image,
            rerank,
            top_k,
            gender,
            output,
        } => {
            config.rerank |= rerank;
            if gender.is_some() {
                config.gender_filter = gender;
            }
            let client = HttpRecommender::new(&config.base_url, timeout)?;
            cmd_search(&config, &client, &query.join(" "), image.as_deref(), top_k, output)
        }

        Commands::Examples => cmd_examples(&config),

        Commands::Health => {
            let client = HttpRecommender::new(&config.base_url, timeout)?;
            cmd_health(&client)
        }
    }
}

/// Search command implementation
fn cmd_search(
    config: &AppConfig,
    client: &dyn Recommender,
    query: &str,
    image: Option<&Path>,
    top_k: Option<u32>,
    output: OutputFormat,
) -> stylesense::Result<()> {
    if top_k == Some(0) {
        return Err(StyleSenseError::InvalidInput("--top-k must be positive".into()));
    }

    let term = Term::stdout();
    let (_, width) = term.size();
    let mut view = SearchView::new(config, width);
    view.set_query(query);

    let mut ticket = match image {
        Some(path) => {
            let bytes = fs::read(path).map_err(|e| {
                StyleSenseError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
            })?;
            tracing::debug!(target: "main", path = %path.display(), bytes = bytes.len(), "image query");
            view.submit_image(RecommendRequest::encode_image(&bytes))
        }
        None => view
            .submit()
            .ok_or_else(|| StyleSenseError::InvalidInput("query is empty".into()))?,
    };
    if let Some(k) = top_k {
        ticket.request.top_k = k;
    }

    let text = output == OutputFormat::Text;
    if text {
        let subject = match image {
            Some(path) => format!("image {}", style(path.display()).yellow()),
            None => format!("'{}'", style(&ticket.request.q).yellow()),
        };
        println!(
            "{} Searching for {}{}",
            style("→").cyan().bold(),
            subject,
            if ticket.request.rerank {
                style(" with AI re-rank").magenta().to_string()
            } else {
                String::new()
            }
        );
    }

    let spinner = text.then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message("Asking the stylist...");
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    });

    let outcome = client.recommend(&ticket.request);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let response = outcome?;
    let echoed = response.query.clone();
    if view.complete(ticket.id, Ok(response)) != Completion::Replaced {
        return Err(StyleSenseError::InvalidInput("search was superseded".into()));
    }

    if !text {
        let json = serde_json::json!({
            "query": echoed.unwrap_or_else(|| ticket.request.q.clone()),
            "top_k": ticket.request.top_k,
            "rerank": ticket.request.rerank,
            "gender_filter": ticket.request.gender_filter,
            "elapsed_ms": view.search_time_ms(),
            "results": view.results(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let cards = view.cards();
    println!();
    println!(
        "Found {} products in {}ms:",
        style(cards.len()).green(),
        view.search_time_ms().unwrap_or_default()
    );
    println!();

    if cards.is_empty() {
        println!("  {}", style("No products matched. Try one of these:").dim());
        for example in view.examples() {
            println!("    {} {}", example.emoji, example.text);
        }
        return Ok(());
    }

    for (i, card) in cards.iter().enumerate() {
        println!(
            "  {} {}",
            style(format!("{:3}.", card.rank.map(|r| r as usize).unwrap_or(i + 1))).dim(),
            style(&card.title).bold()
        );

        let mut meta = Vec::new();
        if let Some(price) = &card.price {
            meta.push(style(price).green().bold().to_string());
        }
        if let Some(rating) = &card.rating {
            meta.push(format!("⭐ {}", style(rating).yellow()));
        }
        if let Some(badge) = &card.match_badge {
            meta.push(format!("🎯 {}", style(badge).cyan()));
        }
        if let Some(score) = card.rerank_score {
            meta.push(style(format!("LLM {:.2}", score)).magenta().to_string());
        }
        if !meta.is_empty() {
            println!("      {}", meta.join("  "));
        }
        if let Some(description) = &card.description {
            println!("      {}", style(description).dim());
        }
        if let Some(url) = &card.image_url {
            println!("      {} {}", style("Image:").dim(), style(url).cyan());
        }
        if let Some(explanation) = &card.explanation {
            println!("      {}", style(explanation).italic());
        }
    }

    Ok(())
}

/// Examples command implementation
fn cmd_examples(config: &AppConfig) -> stylesense::Result<()> {
    println!("{} Example queries:", style("→").cyan().bold());
    println!();
    for (i, example) in config.examples.iter().enumerate() {
        println!(
            "  {} {} {}",
            style(format!("{}.", i + 1)).dim(),
            example.emoji,
            example.text
        );
    }
    println!();
    println!(
        "  Run one with {}",
        style("stylesense search \"<query>\"").yellow()
    );
    Ok(())
}

/// Health command implementation
fn cmd_health(client: &HttpRecommender) -> stylesense::Result<()> {
    let health = client.health()?;
    if health.is_ok() {
        println!(
            "{} {} is {}",
            style("✓").green().bold(),
            client.base_url(),
            style(&health.status).green()
        );
    } else {
        println!(
            "{} {} reported {}",
            style("!").yellow().bold(),
            client.base_url(),
            style(&health.status).yellow()
        );
    }
    Ok(())
}
