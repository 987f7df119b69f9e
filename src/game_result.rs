use crate::prelude::*;

pub(crate) const INVALID_PLAYERS_ERROR: &str = "#VALUE! Players do not match game link";
pub(crate) const INVALID_GAME_LINK_ERROR: &str = "#VALUE! Invalid game link";
pub(crate) const MISSING_GAME_RESULT_ERROR: &str = "#N/A Game result not found";

/// The 8-character Lichess game ID, as found in a game link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Deserialize, Serialize)]
#[serde(transparent)]
pub(crate) struct GameId(pub(crate) String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Outcome {
    White,
    Black,
    Draw,
}

impl Outcome {
    /// Score of the white player. Black gets the complement.
    fn white_score(&self) -> f64 {
        match self {
            Self::White => 1.0,
            Self::Black => 0.0,
            Self::Draw => 0.5,
        }
    }
}

/// A finished game. Scores are derived from the outcome so they always add up to 1.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameResult {
    game_id: GameId,
    white_name: String,
    black_name: String,
    outcome: Outcome,
}

impl GameResult {
    pub(crate) fn new(game_id: GameId, white_name: impl Into<String>, black_name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            game_id,
            white_name: white_name.into(),
            black_name: black_name.into(),
            outcome,
        }
    }

    #[cfg(test)] pub(crate) fn game_id(&self) -> &GameId { &self.game_id }
    pub(crate) fn white_name(&self) -> &str { &self.white_name }
    pub(crate) fn black_name(&self) -> &str { &self.black_name }
    #[cfg(test)] pub(crate) fn outcome(&self) -> Outcome { self.outcome }
    pub(crate) fn white_score(&self) -> f64 { self.outcome.white_score() }
    pub(crate) fn black_score(&self) -> f64 { 1.0 - self.outcome.white_score() }

    /// Whether the game was played between exactly these two players, in either colour assignment.
    pub(crate) fn has_players(&self, p1: &str, p2: &str) -> bool {
        (self.white_name == p1 && self.black_name == p2)
        || (self.white_name == p2 && self.black_name == p1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GameResultError {
    InvalidLink,
    EmptyLink,
    MissingResult,
}

impl GameResultError {
    /// The text shown in both players' cells for this error.
    pub(crate) fn cell_text(&self) -> &'static str {
        match self {
            Self::InvalidLink => INVALID_GAME_LINK_ERROR,
            Self::EmptyLink => "",
            Self::MissingResult => MISSING_GAME_RESULT_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResolvedResult {
    Game(GameResult),
    Error(GameResultError),
}
