//! Building the score rows shown next to a match in the bracket sheet.
//!
//! Each match produces two rows, one per player:
//!
//! | Player 1 | Game 1 | … | Game n | Tiebreaks | Total |
//! | Player 2 | Game 1 | … | Game n | Tiebreaks | Total |

use crate::{
    lichess::{
        self,
        ResultFetcher,
    },
    match_table::{
        self,
        Forfeit,
        GameLinksTable,
        MatchId,
    },
    prelude::*,
    resolve::resolve,
    scoring::{
        score_range,
        score_sum,
    },
    time,
};

pub(crate) const DEFAULT_GAMES_BEFORE_TIEBREAKS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Lichess(#[from] lichess::Error),
    #[error(transparent)] MatchTable(#[from] match_table::Error),
    #[error("Both players cannot be forfeited")]
    BothForfeited,
}

impl IsNetworkError for Error {
    fn is_network_error(&self) -> bool {
        match self {
            Self::Lichess(e) => e.is_network_error(),
            Self::MatchTable(_) => false,
            Self::BothForfeited => false,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IsForfeit {
    pub(crate) for_p1: bool,
    pub(crate) for_p2: bool,
}

impl From<Forfeit> for IsForfeit {
    fn from(forfeit: Forfeit) -> Self {
        Self {
            for_p1: forfeit == Forfeit::ForP1,
            for_p2: forfeit == Forfeit::ForP2,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MatchGames<'a> {
    pub(crate) player1: &'a str,
    pub(crate) player2: &'a str,
    pub(crate) game_links: &'a [String],
    pub(crate) is_forfeit: IsForfeit,
    /// Games after this many are tiebreaks, which are only shown as a sum.
    pub(crate) games_before_tiebreaks: usize,
}

impl<'a> MatchGames<'a> {
    pub(crate) fn new(player1: &'a str, player2: &'a str, game_links: &'a [String]) -> Self {
        Self {
            player1,
            player2,
            game_links,
            is_forfeit: IsForfeit::default(),
            games_before_tiebreaks: DEFAULT_GAMES_BEFORE_TIEBREAKS,
        }
    }
}

/// Returns one row per player: name, one cell per regular game, tiebreak total, match total.
pub(crate) async fn game_results_rows(cache: &dyn ResultCache, fetcher: &dyn ResultFetcher, games: MatchGames<'_>) -> Result<[Vec<String>; 2], Error> {
    let MatchGames { player1, player2, game_links, is_forfeit, games_before_tiebreaks } = games;
    match (is_forfeit.for_p1, is_forfeit.for_p2) {
        (true, true) => return Err(Error::BothForfeited),
        (false, false) => {}
        (for_p1, _) => {
            let winner_score = format!("{}X", games_before_tiebreaks as f64 / 2.0 + 0.5);
            let (p1_total, p2_total) = if for_p1 { (format!("0F"), winner_score) } else { (winner_score, format!("0F")) };
            let row = |player: &str, total| {
                let mut row = Vec::with_capacity(games_before_tiebreaks + 2);
                row.push(player.to_owned());
                row.resize(games_before_tiebreaks + 1, String::default());
                row.push(total);
                row
            };
            return Ok([row(player1, p1_total), row(player2, p2_total)])
        }
    }
    let results = time::logged("resolving game results", resolve(cache, fetcher, game_links)).await?;
    let (main_games, tiebreaks) = results.split_at(games_before_tiebreaks.min(results.len()));
    let columns = itertools::chain!(
        [(player1.to_owned(), player2.to_owned())],
        score_range(player1, player2, main_games),
        [score_sum(player1, player2, tiebreaks), score_sum(player1, player2, &results)],
    );
    let (p1_row, p2_row): (Vec<_>, Vec<_>) = columns.unzip();
    Ok([p1_row, p2_row])
}

/// Looks up a match in the registry and returns its score rows.
///
/// A match which isn't in the registry yet produces blank rows.
pub(crate) async fn match_results(cache: &dyn ResultCache, fetcher: &dyn ResultFetcher, table: &GameLinksTable, match_id: &str, games_before_tiebreaks: usize) -> Result<[Vec<String>; 2], Error> {
    let match_id = match_id.parse::<MatchId>()?;
    let Some(row) = table.find(&match_id)? else {
        return game_results_rows(cache, fetcher, MatchGames::new("", "", &[])).await
    };
    game_results_rows(cache, fetcher, MatchGames {
        is_forfeit: row.forfeit.into(),
        games_before_tiebreaks,
        ..MatchGames::new(&row.player1, &row.player2, &row.game_links)
    }).await
}
