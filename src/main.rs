//! SculptuurRadar command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sculptuur_radar::catalog::Catalog;
use sculptuur_radar::curator::{Backend, CuratorClient, CuratorError, GenerativeBackend};
use sculptuur_radar::discovery::{DiscoveryEngine, SearchOutcome};
use sculptuur_radar::session::{SearchSession, VisibleList};
use sculptuur_radar::storage::config::{self, AppConfig};

#[derive(Debug, Parser)]
#[command(name = "sculptuur", version, about = "Find sculpture parks near a place")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "SCULPTUUR_CONFIG")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search around a named place
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Search around a coordinate
    Near {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Show catalog highlights
    Spotlight,
    /// Ask the curator a question
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Background story for a location
    DeepDive { name: String, place: String },
    /// Write a default configuration file
    InitConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Command::InitConfig = cli.command {
        let config_path = cli.config.clone().unwrap_or_else(config::get_config_path);
        config::save_config(&AppConfig::default(), &config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let app_config = match &cli.config {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => config::load_config().with_context(|| {
            format!("loading {}", config::get_config_path().display())
        })?,
    };
    tracing::info!("Starting SculptuurRadar v{}", env!("CARGO_PKG_VERSION"));

    let session = build_session(&app_config)?;

    match cli.command {
        Command::Search { query } => {
            let result = session.search_text(&query.join(" ")).await;
            report_search(result, cli.json)
        }
        Command::Near { lat, lng } => {
            let result = session.locate(lat, lng).await;
            report_search(result, cli.json)
        }
        Command::Spotlight => {
            if let VisibleList::Spotlight(records) = session.visible().await {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    for record in &records {
                        println!("{} ({})", record.name, record.place);
                        println!("    {}", record.description);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Ask { question } => {
            let answer = match session
                .engine()
                .curator()
                .answer_question(&question.join(" "))
                .await
            {
                Ok(answer) => answer,
                Err(e) => return Ok(report_curator_failure("question", &e)),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", answer.answer);
                if !answer.citations.is_empty() {
                    println!();
                    println!("Sources:");
                    for citation in &answer.citations {
                        println!("  {} <{}>", citation.title, citation.uri);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::DeepDive { name, place } => {
            let story = match session.engine().curator().elaborate(&name, &place).await {
                Ok(story) => story,
                Err(e) => return Ok(report_curator_failure("deep dive", &e)),
            };
            if cli.json {
                println!("{}", serde_json::json!({ "name": name, "place": place, "story": story }));
            } else {
                println!("{}", story);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::InitConfig => Ok(ExitCode::SUCCESS),
    }
}

fn build_session(app_config: &AppConfig) -> anyhow::Result<SearchSession<Backend>> {
    let catalog = match &app_config.discovery.catalog_path {
        Some(path) => Catalog::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Catalog::bundled().context("loading bundled catalog")?,
    };

    let curator_settings = &app_config.curator;
    let api_key = curator_settings.api_key_from_env();
    if api_key.is_none() {
        tracing::warn!(
            "{} is not set; curator calls will fail",
            curator_settings.api_key_env
        );
    }

    let backend = Backend::from_settings(curator_settings, api_key);
    tracing::info!("Using {} curator backend", backend.name());
    let curator = CuratorClient::new(backend, curator_settings.retry_policy())
        .with_search_radius(app_config.discovery.search_radius_km);
    let engine = DiscoveryEngine::new(curator, catalog, app_config.discovery.clone());

    Ok(SearchSession::new(engine))
}

/// Log the detail, show only the fixed message.
fn report_curator_failure(action: &str, err: &CuratorError) -> ExitCode {
    tracing::warn!("Curator {} failed: {}", action, err);
    eprintln!("{}", err.user_message());
    ExitCode::FAILURE
}

fn report_search(
    result: Result<SearchOutcome, sculptuur_radar::SearchError>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Near {} ({})", outcome.display_name, outcome.origin);
    if let Some(degradation) = outcome.degradation {
        println!("{}", degradation.notice());
    }
    if let Some(note) = &outcome.curator_note {
        println!();
        println!("{}", note);
    }
    println!();

    if outcome.results.is_empty() {
        println!("Nothing found within range.");
    }
    for (i, ranked) in outcome.results.iter().enumerate() {
        let record = &ranked.record;
        println!(
            "{:>2}. {} ({}) {:.1} km [{}]",
            i + 1,
            record.name,
            record.place,
            ranked.distance_km,
            record.source
        );
        if !record.tags.is_empty() {
            let tags: Vec<String> = record.tags.iter().map(|t| t.to_string()).collect();
            println!("    {}", tags.join(", "));
        }
        if let Some(website) = &record.website {
            println!("    {}", website);
        }
        if let Ok(route) = ranked.route_url() {
            println!("    {}", route);
        }
    }
    Ok(ExitCode::SUCCESS)
}
