//! Fetching game results from the Lichess API.

use crate::prelude::*;

/// Lichess accepts up to 300 IDs per export request.
const MAX_IDS_PER_REQUEST: usize = 300;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Reqwest(#[from] reqwest::Error),
    #[error(transparent)] Wheel(#[from] wheel::Error),
    #[error("requested {0} games in one batch, Lichess allows at most {MAX_IDS_PER_REQUEST}")]
    TooManyIds(usize),
}

impl IsNetworkError for Error {
    fn is_network_error(&self) -> bool {
        match self {
            Self::Reqwest(e) => e.is_network_error(),
            Self::Wheel(e) => e.is_network_error(),
            Self::TooManyIds(_) => false,
        }
    }
}

#[async_trait]
pub(crate) trait ResultFetcher: Send + Sync {
    /// Fetches the results of the given games in one request. Games the source doesn't return are absent from the map.
    async fn fetch_batch(&self, ids: &[GameId]) -> Result<HashMap<GameId, GameResult>, Error>;
}

pub(crate) struct Client {
    http_client: reqwest::Client,
    base_url: String,
}

impl Client {
    pub(crate) fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http_client, base_url: base_url.into() }
    }
}

#[async_trait]
impl ResultFetcher for Client {
    async fn fetch_batch(&self, ids: &[GameId]) -> Result<HashMap<GameId, GameResult>, Error> {
        if ids.is_empty() { return Ok(HashMap::default()) }
        if ids.len() > MAX_IDS_PER_REQUEST { return Err(Error::TooManyIds(ids.len())) }
        let body = self.http_client.post(format!("{}/api/games/export/_ids", self.base_url.trim_end_matches('/')))
            .query(&[
                ("moves", "false"),
                ("pgnInJson", "true"),
                ("tags", "false"),
            ])
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .header(reqwest::header::ACCEPT, "application/x-ndjson")
            .body(ids.iter().join(","))
            .send().await?
            .detailed_error_for_status().await?
            .text().await?;
        Ok(parse_export(&body))
    }
}

#[derive(Deserialize)]
struct ExportGame {
    id: GameId,
    players: ExportPlayers,
    winner: Option<Winner>,
}

#[derive(Deserialize)]
struct ExportPlayers {
    white: ExportPlayer,
    black: ExportPlayer,
}

#[derive(Deserialize)]
struct ExportPlayer {
    user: ExportUser,
}

#[derive(Deserialize)]
struct ExportUser {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Winner {
    White,
    Black,
}

impl From<ExportGame> for GameResult {
    fn from(ExportGame { id, players, winner }: ExportGame) -> Self {
        let outcome = match winner {
            Some(Winner::White) => Outcome::White,
            Some(Winner::Black) => Outcome::Black,
            None => Outcome::Draw,
        };
        Self::new(id, players.white.user.name, players.black.user.name, outcome)
    }
}

/// Parses a newline-delimited JSON export. Each line stands on its own, so a line that fails to parse is skipped.
pub(crate) fn parse_export(body: &str) -> HashMap<GameId, GameResult> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<ExportGame>(line) {
            Ok(game) => Some((game.id.clone(), GameResult::from(game))),
            Err(e) => {
                log::warn!("skipping unparseable Lichess export line: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_winners_and_draws() {
        let body = concat!(
            r#"{"id":"aaaaaaaa","rated":true,"players":{"white":{"user":{"name":"Alice","id":"alice"},"rating":1500},"black":{"user":{"name":"Bob","id":"bob"},"rating":1600}},"winner":"white","status":"mate"}"#, "\n",
            r#"{"id":"bbbbbbbb","players":{"white":{"user":{"name":"Bob"}},"black":{"user":{"name":"Alice"}}},"status":"draw"}"#, "\n",
            r#"{"id":"cccccccc","players":{"white":{"user":{"name":"Bob"}},"black":{"user":{"name":"Alice"}}},"winner":"black"}"#, "\n",
        );
        let results = parse_export(body);
        assert_eq!(results.len(), 3);
        assert_eq!(results[&GameId("aaaaaaaa".to_owned())], GameResult::new(GameId("aaaaaaaa".to_owned()), "Alice", "Bob", Outcome::White));
        assert_eq!(results[&GameId("bbbbbbbb".to_owned())].outcome(), Outcome::Draw);
        let black_win = &results[&GameId("cccccccc".to_owned())];
        assert_eq!(black_win.white_name(), "Bob");
        assert_eq!(black_win.black_score(), 1.0);
    }

    #[test]
    fn skips_malformed_lines() {
        let body = concat!(
            "not json\n",
            "\n",
            r#"{"id":"aaaaaaaa","players":{"white":{"aiLevel":3},"black":{"user":{"name":"Bob"}}}}"#, "\n",
            r#"{"id":"bbbbbbbb","players":{"white":{"user":{"name":"Alice"}},"black":{"user":{"name":"Bob"}}},"winner":"white"}"#, "\n",
            r#"{"id":"cccccccc","players":{"white":{"user":{"name":"Alice"}},"black":{"user":{"name":"Bob"}}},"winner":"nobody"}"#,
        );
        let results = parse_export(body);
        assert_eq!(results.keys().collect::<Vec<_>>(), vec![&GameId("bbbbbbbb".to_owned())]);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_request() {
        // an unroutable base URL would fail if a request were attempted
        let client = Client::new(reqwest::Client::new(), "http://invalid.invalid");
        assert!(client.fetch_batch(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_oversized_batches() {
        let client = Client::new(reqwest::Client::new(), "http://invalid.invalid");
        let ids = (0..=MAX_IDS_PER_REQUEST).map(|i| GameId(format!("{i:08}"))).collect_vec();
        assert!(matches!(client.fetch_batch(&ids).await, Err(Error::TooManyIds(301))));
    }
}
