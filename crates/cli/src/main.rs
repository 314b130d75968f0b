use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{GameIndex, GameRecord};
use pipeline::{InMemoryMetadataStore, MetadataQuery, MetadataStore};
use server::{AssistantConfig, RecommendationService};
use sources::{KeywordRetriever, SemanticRetriever};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Game recommendation assistant
#[derive(Parser)]
#[command(name = "game-recs")]
#[command(about = "Natural-language game recommendations over a Steam catalog", long_about = None)]
struct Cli {
    /// Path to the Steam games.json catalog
    #[arg(short, long, default_value = "data/games.json", env = "GAME_RECS_DATA_FILE")]
    data_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the answer
    Ask {
        /// The question, e.g. "2만원 이하 퍼즐 게임"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Continue an existing session
        #[arg(long)]
        session: Option<String>,
    },

    /// Interactive conversation in one session
    Chat,

    /// Filter the catalog by attributes (no model calls)
    Filter {
        /// Only consider these app ids (comma separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,

        /// Maximum price in USD
        #[arg(long)]
        max_price: Option<f64>,

        /// Minimum price in USD
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum price in Korean won, converted at the configured rate
        #[arg(long, conflicts_with = "max_price")]
        max_krw: Option<f64>,

        /// Required genre (repeatable; all must match)
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Only multiplayer games
        #[arg(long)]
        multiplayer: bool,

        /// Number of results
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one game by app id
    Game {
        #[arg(long)]
        id: String,
    },

    /// Keyword retrieval over the catalog
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show the execution plan the orchestrator picks for a question
    Plan {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let index = Arc::new(
        GameIndex::load_from_file(&cli.data_file)
            .with_context(|| format!("Failed to load game catalog from {}", cli.data_file.display()))?,
    );
    info!("Loaded {} games in {:?}", index.len(), start.elapsed());

    match cli.command {
        Commands::Ask { query, session } => handle_ask(index, query.join(" "), session).await?,
        Commands::Chat => handle_chat(index).await?,
        Commands::Filter {
            ids,
            max_price,
            min_price,
            max_krw,
            genres,
            multiplayer,
            limit,
            json,
        } => {
            let mut query = MetadataQuery::new().with_limit(limit);
            if !ids.is_empty() {
                query = query.with_candidate_ids(ids);
            }
            if let Some(max_krw) = max_krw {
                let rate = AssistantConfig::from_env()?.krw_per_usd;
                query = query.with_max_price(((max_krw / rate) * 100.0).round() / 100.0);
            }
            query.max_price = query.max_price.or(max_price);
            query.min_price = min_price;
            query.genres = genres;
            if multiplayer {
                query = query.with_multiplayer(true);
            }
            handle_filter(index, &query, json)?
        }
        Commands::Game { id } => handle_game(index, &id)?,
        Commands::Search { query, limit } => handle_search(index, &query.join(" "), limit)?,
        Commands::Plan { query } => handle_plan(index, &query.join(" ")).await?,
    }

    Ok(())
}

fn build_service(index: Arc<GameIndex>) -> Result<RecommendationService> {
    let config = AssistantConfig::from_env().context("Invalid configuration")?;
    let service = RecommendationService::from_config(&config, index)
        .context("Failed to set up the recommendation service")?;
    service.start_session_sweeper(config.session_ttl);
    Ok(service)
}

/// Handle the 'ask' command
async fn handle_ask(index: Arc<GameIndex>, query: String, session: Option<String>) -> Result<()> {
    let service = build_service(index)?;

    let start = Instant::now();
    let response = service.recommend(&query, session.as_deref()).await?;

    println!("{}", response.answer);
    println!();
    println!(
        "{} session {} ({:.1?})",
        "•".dimmed(),
        response.session_id.cyan(),
        start.elapsed()
    );
    Ok(())
}

const EXIT_WORDS: [&str; 4] = ["exit", "quit", "q", "종료"];

/// Handle the 'chat' command
async fn handle_chat(index: Arc<GameIndex>) -> Result<()> {
    let service = build_service(index)?;
    let mut session: Option<String> = None;

    println!(
        "{}",
        "Game recommendation assistant. Type 'exit' or '종료' to leave.".bold().blue()
    );
    println!("{}", "Commands: :sessions  :new  :forget".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "질문>".green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let input = line.trim();

        if EXIT_WORDS.contains(&input.to_lowercase().as_str()) {
            break;
        }
        match input {
            "" => {
                println!("질문을 입력해주세요.");
                continue;
            }
            ":sessions" => {
                let listing = service.list_sessions();
                println!("{} active: {}", listing.total, listing.session_ids.join(", "));
                continue;
            }
            ":new" => {
                session = None;
                println!("Started a new conversation.");
                continue;
            }
            ":forget" => {
                match session.take().map(|id| forget_session(&service, &id)) {
                    Some(message) => println!("{}", message),
                    None => println!("No active session."),
                }
                continue;
            }
            _ => {}
        }

        match service.recommend(input, session.as_deref()).await {
            Ok(response) => {
                println!("\n{}\n", response.answer);
                session = Some(response.session_id);
            }
            Err(e) => println!("{} {}\n", "오류가 발생했습니다:".red(), e),
        }
    }

    println!("Bye!");
    Ok(())
}

/// Delete a chat session; an already-evicted session is reported, not fatal
fn forget_session(service: &RecommendationService, id: &str) -> String {
    match service.delete_session(id) {
        Ok(()) => format!("Forgot session {}.", id),
        Err(e) => format!("{} {}", "오류가 발생했습니다:".red(), e),
    }
}

/// Handle the 'filter' command
fn handle_filter(index: Arc<GameIndex>, query: &MetadataQuery, json: bool) -> Result<()> {
    let store = InMemoryMetadataStore::new(index);
    let games = store.filter_by_attributes(query)?;

    if json {
        let views: Vec<_> = games.iter().map(|g| g.view()).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!("{}", format!("{} matching games:", games.len()).bold().blue());
    for (rank, game) in games.iter().enumerate() {
        print_game_line(rank + 1, game);
    }
    Ok(())
}

/// Handle the 'game' command
fn handle_game(index: Arc<GameIndex>, id: &str) -> Result<()> {
    let store = InMemoryMetadataStore::new(index);
    let Some(game) = store.get_by_id(id) else {
        println!("{} game {} not found", "✗".red(), id);
        return Ok(());
    };

    println!("{}", format!("{} ({})", game.name, game.id).bold().blue());
    println!("{}Price: {}", "• ".green(), format_price(&game));
    println!("{}Genres: {}", "• ".green(), game.genres.join(", "));
    println!("{}Categories: {}", "• ".green(), game.categories.join(", "));
    println!(
        "{}Reviews: {} positive / {} negative{}",
        "• ".cyan(),
        game.positive_reviews,
        game.negative_reviews,
        game.review_ratio()
            .map(|r| format!(" ({:.0}% positive)", r * 100.0))
            .unwrap_or_default()
    );
    if !game.tags.is_empty() {
        println!("{}Tags: {}", "• ".cyan(), game.tags.join(", "));
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(index: Arc<GameIndex>, query: &str, limit: usize) -> Result<()> {
    if query.trim().is_empty() {
        bail!("search query must not be empty");
    }
    let retriever = KeywordRetriever::new(index);
    let hits = retriever.retrieve(query, limit)?;

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if hits.is_empty() {
        println!("  (no matches)");
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. [{}] {} {}",
            (rank + 1).to_string().green(),
            hit.game_id,
            hit.snippet,
            format!("score {:.2}", hit.score).dimmed()
        );
    }
    Ok(())
}

/// Handle the 'plan' command
async fn handle_plan(index: Arc<GameIndex>, query: &str) -> Result<()> {
    let service = build_service(index)?;
    let plan = service.system().orchestrator().plan(query, &[]).await;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn format_price(game: &GameRecord) -> String {
    match game.price() {
        Some(p) if p == 0.0 => "Free".to_string(),
        Some(p) => format!("${:.2}", p),
        None => "unknown".to_string(),
    }
}

fn print_game_line(rank: usize, game: &GameRecord) {
    println!(
        "{}. {} [{}] {} - {}{}",
        rank.to_string().green(),
        game.name,
        game.id,
        format_price(game).yellow(),
        game.genres.join(", "),
        if game.is_multiplayer() { " (multiplayer)" } else { "" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::StaticLlmClient;
    use server::{Orchestrator, OrchestratorWorkersSystem, SessionStore, Synthesizer, WorkerRegistry};

    fn create_test_service() -> RecommendationService {
        let llm = Arc::new(StaticLlmClient::new("ok"));
        let system = OrchestratorWorkersSystem::new(
            Orchestrator::new(llm.clone()),
            WorkerRegistry::new(),
            Synthesizer::new(llm),
        );
        RecommendationService::new(Arc::new(system), Arc::new(SessionStore::default()))
    }

    #[test]
    fn test_forget_session_survives_evicted_session() {
        let service = create_test_service();
        let message = forget_session(&service, "already-gone");
        assert!(message.contains("already-gone"));
        assert!(!message.starts_with("Forgot"));
    }

    #[test]
    fn test_forget_session_deletes_live_session() {
        let service = create_test_service();
        let id = service.sessions().get_or_create(None);

        assert_eq!(forget_session(&service, &id), format!("Forgot session {}.", id));
        assert!(!service.sessions().contains(&id));
    }
}
