//! The match registry: one row per bracket match, with the players and their game links.

use crate::prelude::*;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("More than one row with the same Match ID. Check the Game Links table")]
    DuplicateMatch,
    #[error("Game Links table is empty")]
    EmptyTable,
    #[error("Match ID is in an incorrect format")]
    MatchIdFormat,
    #[error("Incorrect table format")]
    TableFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
pub(crate) enum Bracket {
    Upper,
    Lower,
}

impl Bracket {
    fn label(&self) -> &'static str {
        match self {
            Self::Upper => "Upper",
            Self::Lower => "Lower",
        }
    }
}

impl FromStr for Bracket {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        all::<Self>().find(|bracket| bracket.label() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
pub(crate) enum Forfeit {
    No,
    ForP1,
    ForP2,
}

impl Forfeit {
    fn label(&self) -> &'static str {
        match self {
            Self::No => "No",
            Self::ForP1 => "For P1",
            Self::ForP2 => "For P2",
        }
    }
}

impl FromStr for Forfeit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        all::<Self>().find(|forfeit| forfeit.label() == s).ok_or(())
    }
}

/// Identifies a match in the bracket, written as `Final`, `Match W3`, or `Match L12`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchId {
    pub(crate) bracket: Bracket,
    pub(crate) match_num: String,
}

impl FromStr for MatchId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s == "Final" {
            return Ok(Self { bracket: Bracket::Upper, match_num: format!("Final") })
        }
        let (_, bracket, match_num) = regex_captures!("^Match (W|L)([0-9]+)$", s).ok_or(Error::MatchIdFormat)?;
        let bracket = match bracket {
            "W" => Bracket::Upper,
            "L" => Bracket::Lower,
            _ => return Err(Error::MatchIdFormat),
        };
        Ok(Self { bracket, match_num: match_num.to_owned() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchRow {
    pub(crate) bracket: Bracket,
    pub(crate) match_num: String,
    pub(crate) player1: String,
    pub(crate) player2: String,
    pub(crate) forfeit: Forfeit,
    /// The `Gamelink n` and `Tiebreak n` cells, in column order.
    pub(crate) game_links: Vec<String>,
}

impl MatchRow {
    fn parse(headers: &[String], cells: &[String]) -> Result<Self, Error> {
        let cell = |header: &str| headers.iter()
            .position(|col| col == header)
            .map(|idx| cells.get(idx).map_or("", String::as_str))
            .ok_or(Error::TableFormat);
        // required even if empty
        cell("Gamelink 1")?;
        cell("Tiebreak 1")?;
        Ok(Self {
            bracket: cell("Bracket")?.parse::<Bracket>().map_err(|()| Error::TableFormat)?,
            match_num: cell("Match #")?.to_owned(),
            player1: cell("Player 1")?.to_owned(),
            player2: cell("Player 2")?.to_owned(),
            forfeit: cell("Forfeit?")?.parse::<Forfeit>().map_err(|()| Error::TableFormat)?,
            game_links: headers.iter()
                .enumerate()
                .filter(|(_, header)| regex_is_match!("^(?:Gamelink|Tiebreak) [0-9]+$", header))
                .map(|(idx, _)| cells.get(idx).cloned().unwrap_or_default())
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GameLinksTable {
    pub(crate) rows: Vec<MatchRow>,
}

impl GameLinksTable {
    /// Parses sheet values where the first row holds the column headers.
    ///
    /// Rows may be shorter than the header row, since the Sheets API omits trailing empty cells.
    pub(crate) fn from_values(values: &[Vec<String>]) -> Result<Self, Error> {
        let (headers, cells) = values.split_first().ok_or(Error::EmptyTable)?;
        Ok(Self {
            rows: cells.iter().map(|row| MatchRow::parse(headers, row)).collect::<Result<_, _>>()?,
        })
    }

    /// Returns `None` if the match isn't in the table yet.
    pub(crate) fn find(&self, match_id: &MatchId) -> Result<Option<&MatchRow>, Error> {
        let mut matching = self.rows.iter().filter(|row| row.bracket == match_id.bracket && row.match_num == match_id.match_num);
        let row = matching.next();
        if matching.next().is_some() { return Err(Error::DuplicateMatch) }
        Ok(row)
    }
}
