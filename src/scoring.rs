//! Turning game results into score cells.

use crate::{
    game_result::INVALID_PLAYERS_ERROR,
    prelude::*,
};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Scores cannot be empty")]
    EmptyScore,
    #[error("Invalid result format")]
    InvalidScore,
}

/// Formats a score the way it's written on a crosstable: `1`, `½`, `2½`.
pub(crate) fn score_to_string(score: f64) -> String {
    if score % 1.0 == 0.0 {
        format!("{score}")
    } else if score == 0.5 {
        "½".to_owned()
    } else {
        format!("{}½", score.floor())
    }
}

fn error_pair(text: &str) -> (String, String) {
    (text.to_owned(), text.to_owned())
}

/// One pair of score cells per game, independent of each other.
pub(crate) fn score_range(player1: &str, player2: &str, results: &[ResolvedResult]) -> Vec<(String, String)> {
    results.iter().map(|result| match result {
        ResolvedResult::Error(e) => error_pair(e.cell_text()),
        ResolvedResult::Game(game) if !game.has_players(player1, player2) => error_pair(INVALID_PLAYERS_ERROR),
        ResolvedResult::Game(game) => {
            let p1_score = if game.white_name() == player1 { game.white_score() } else { game.black_score() };
            let p2_score = if game.black_name() == player2 { game.black_score() } else { game.white_score() };
            (score_to_string(p1_score), score_to_string(p2_score))
        }
    }).collect()
}

/// The total score of each player over the given games, or an error pair if any game can't be scored.
///
/// Empty links are ignored. If only empty links remain, both cells are empty.
pub(crate) fn score_sum(player1: &str, player2: &str, results: &[ResolvedResult]) -> (String, String) {
    let non_empty = results.iter().filter(|result| **result != ResolvedResult::Error(GameResultError::EmptyLink)).collect_vec();
    if non_empty.is_empty() { return (String::default(), String::default()) }
    let mut games = Vec::with_capacity(non_empty.len());
    for result in non_empty {
        match result {
            ResolvedResult::Game(game) => games.push(game),
            ResolvedResult::Error(e) => return error_pair(e.cell_text()),
        }
    }
    if games.iter().any(|game| !game.has_players(player1, player2)) { return error_pair(INVALID_PLAYERS_ERROR) }
    let (p1_total, p2_total) = games.into_iter().fold((0.0, 0.0), |(p1_total, p2_total), game| (
        p1_total + if game.white_name() == player1 { game.white_score() } else { game.black_score() },
        p2_total + if game.white_name() == player2 { game.white_score() } else { game.black_score() },
    ));
    (score_to_string(p1_total), score_to_string(p2_total))
}

/// Parses a pair of match totals such as `2.5`, each optionally suffixed with `F` (forfeited) or `X` (awarded by forfeit).
pub(crate) fn parse_scores([p1_score, p2_score]: [&str; 2]) -> Result<[f64; 2], Error> {
    if p1_score.is_empty() || p2_score.is_empty() { return Err(Error::EmptyScore) }
    let parse = |score: &str| {
        let (_, number) = regex_captures!(r"^([0-9]+(?:\.[0-9]+)?)(?:F|X)?$", score).ok_or(Error::InvalidScore)?;
        number.parse::<f64>().map_err(|_| Error::InvalidScore)
    };
    Ok([parse(p1_score)?, parse(p2_score)?])
}

/// The player with the higher score, or an empty string on a tie.
pub(crate) fn winner<'a>([p1, p2]: [&'a str; 2], scores: [&str; 2]) -> Result<&'a str, Error> {
    let [p1_score, p2_score] = parse_scores(scores)?;
    Ok(if p1_score > p2_score {
        p1
    } else if p1_score < p2_score {
        p2
    } else {
        ""
    })
}

/// The player with the lower score, or an empty string on a tie.
pub(crate) fn loser<'a>([p1, p2]: [&'a str; 2], scores: [&str; 2]) -> Result<&'a str, Error> {
    let [p1_score, p2_score] = parse_scores(scores)?;
    Ok(if p1_score > p2_score {
        p2
    } else if p1_score < p2_score {
        p1
    } else {
        ""
    })
}
