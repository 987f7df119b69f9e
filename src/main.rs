use crate::{
    cache::{
        FileCache,
        MemoryCache,
    },
    match_table::GameLinksTable,
    prelude::*,
    results::{
        IsForfeit,
        MatchGames,
    },
};

mod cache;
mod config;
mod game_result;
mod lichess;
mod link;
mod match_table;
mod prelude;
mod resolve;
mod results;
mod scoring;
mod sheets;
mod time;

#[derive(clap::Subcommand)]
enum Subcommand {
    /// Looks up a match in the Game Links sheet and prints both players' score rows
    Match {
        /// `Final`, `Match W<n>`, or `Match L<n>`
        match_id: String,
    },
    /// Prints both players' score rows for the given Lichess game links
    Games {
        #[clap(long)]
        player1: String,
        #[clap(long)]
        player2: String,
        #[clap(long)]
        forfeit_p1: bool,
        #[clap(long)]
        forfeit_p2: bool,
        /// Defaults to the configured value
        #[clap(long)]
        games_before_tiebreaks: Option<usize>,
        /// Regular games first, then tiebreaks. Pass an empty string for a game that hasn't been played.
        links: Vec<String>,
    },
    /// Prints the player with the higher match score
    Winner {
        player1: String,
        player2: String,
        score1: String,
        score2: String,
    },
    /// Prints the player with the lower match score
    Loser {
        player1: String,
        player2: String,
        score1: String,
        score2: String,
    },
    /// Removes the given game IDs from the result cache, or all entries if none are given
    ClearCache {
        game_ids: Vec<String>,
    },
}

#[derive(clap::Parser)]
#[clap(version)]
struct Args {
    /// Print results as a JSON array of rows instead of tab-separated values
    #[clap(long, global = true)]
    json: bool,
    /// Keep game results in memory for this run only instead of using the cache file
    #[clap(long, global = true)]
    memory_cache: bool,
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)] Cache(#[from] cache::Error),
    #[error(transparent)] Config(#[from] config::Error),
    #[error(transparent)] Json(#[from] serde_json::Error),
    #[error(transparent)] MatchTable(#[from] match_table::Error),
    #[error(transparent)] Reqwest(#[from] reqwest::Error),
    #[error(transparent)] Results(#[from] results::Error),
    #[error(transparent)] Scoring(#[from] scoring::Error),
    #[error(transparent)] Sheets(#[from] sheets::Error),
    #[error("no Google sheet ID configured, add `googleSheetId` to the config file")]
    MissingSheetId,
}

impl IsNetworkError for Error {
    fn is_network_error(&self) -> bool {
        match self {
            Self::Cache(_) => false,
            Self::Config(_) => false,
            Self::Json(_) => false,
            Self::MatchTable(_) => false,
            Self::Reqwest(e) => e.is_network_error(),
            Self::Results(e) => e.is_network_error(),
            Self::Scoring(_) => false,
            Self::Sheets(e) => e.is_network_error(),
            Self::MissingSheetId => false,
        }
    }
}

fn print_rows(rows: &[Vec<String>], json: bool) -> Result<(), Error> {
    if json {
        println!("{}", serde_json::to_string(rows)?);
    } else {
        for row in rows {
            println!("{}", row.join("\t"));
        }
    }
    Ok(())
}

fn result_cache(config: &Config, memory_cache: bool) -> Result<Box<dyn ResultCache>, Error> {
    if memory_cache { return Ok(Box::new(MemoryCache::default())) }
    let path = match config.cache_path {
        Some(ref path) => path.clone(),
        None => FileCache::default_path()?,
    };
    log::debug!("using game result cache at {}", path.display());
    Ok(Box::new(FileCache::new(path)))
}

#[wheel::main]
async fn main(Args { json, memory_cache, subcommand }: Args) -> Result<(), Error> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let config = Config::load_or_default().await?;
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("chess-bracket/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .use_rustls_tls()
        .hickory_dns(true)
        .https_only(true)
        .build()?;
    let fetcher = lichess::Client::new(http_client.clone(), config.lichess_base_url.clone());
    match subcommand {
        Subcommand::Match { match_id } => {
            let sheet_id = config.google_sheet_id.as_deref().ok_or(Error::MissingSheetId)?;
            let values = time::logged("reading Game Links sheet", sheets::values(&http_client, sheet_id, &format!("'{}'", config.game_links_sheet))).await?;
            let table = GameLinksTable::from_values(&values)?;
            let cache = result_cache(&config, memory_cache)?;
            let rows = results::match_results(&*cache, &fetcher, &table, &match_id, config.games_before_tiebreaks).await?;
            print_rows(&rows, json)?;
        }
        Subcommand::Games { player1, player2, forfeit_p1, forfeit_p2, games_before_tiebreaks, links } => {
            let cache = result_cache(&config, memory_cache)?;
            let rows = results::game_results_rows(&*cache, &fetcher, MatchGames {
                is_forfeit: IsForfeit { for_p1: forfeit_p1, for_p2: forfeit_p2 },
                games_before_tiebreaks: games_before_tiebreaks.unwrap_or(config.games_before_tiebreaks),
                ..MatchGames::new(&player1, &player2, &links)
            }).await?;
            print_rows(&rows, json)?;
        }
        Subcommand::Winner { player1, player2, score1, score2 } => {
            let winner = scoring::winner([player1.as_str(), player2.as_str()], [score1.as_str(), score2.as_str()])?;
            print_rows(&[vec![winner.to_owned()]], json)?;
        }
        Subcommand::Loser { player1, player2, score1, score2 } => {
            let loser = scoring::loser([player1.as_str(), player2.as_str()], [score1.as_str(), score2.as_str()])?;
            print_rows(&[vec![loser.to_owned()]], json)?;
        }
        Subcommand::ClearCache { game_ids } => {
            let cache = result_cache(&config, memory_cache)?;
            if game_ids.is_empty() {
                cache.clear().await?;
                log::info!("cleared all cached game results");
            } else {
                let game_ids = game_ids.into_iter().map(GameId::from).collect_vec();
                cache.remove_all(&game_ids).await?;
                log::info!("removed {} game results from the cache", game_ids.len());
            }
        }
    }
    Ok(())
}
