//! Parsing Lichess game links.

use crate::prelude::*;

/// Extracts the game ID from a Lichess game link.
///
/// Links may point at the game from either side (`/white`, `/black`) and may use the 12-character
/// player-specific form; only the first 8 characters identify the game.
pub(crate) fn extract_game_id(link: &str) -> Result<GameId, GameResultError> {
    if link.trim().is_empty() { return Err(GameResultError::EmptyLink) }
    if let Some((_, id)) = regex_captures!("^https://lichess\\.org/([0-9A-Za-z_]{8})(?:[0-9A-Za-z_]{4})?(?:/(?:white|black))?/?$", link) {
        Ok(GameId(id.to_owned()))
    } else {
        log::warn!("invalid game link: {link:?}");
        Err(GameResultError::InvalidLink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_first_eight_characters() {
        for link in [
            "https://lichess.org/AbCd1234",
            "https://lichess.org/AbCd1234/",
            "https://lichess.org/AbCd1234wxyz",
            "https://lichess.org/AbCd1234/white",
            "https://lichess.org/AbCd1234wxyz/black/",
        ] {
            assert_eq!(extract_game_id(link), Ok(GameId("AbCd1234".to_owned())), "{link}");
        }
    }

    #[test]
    fn round_trips_through_the_link_template() {
        for id in ["AbCd1234", "q7ZvbWxs", "00000000", "a_b_c_d_"] {
            let link = format!("https://lichess.org/{id}");
            let extracted = extract_game_id(&link).unwrap();
            assert_eq!(extracted.0, id);
            assert_eq!(extract_game_id(&format!("https://lichess.org/{extracted}/black")).unwrap(), extracted);
        }
    }

    #[test]
    fn blank_links_are_empty() {
        assert_eq!(extract_game_id(""), Err(GameResultError::EmptyLink));
        assert_eq!(extract_game_id("  \t"), Err(GameResultError::EmptyLink));
    }

    #[test]
    fn rejects_other_links() {
        for link in [
            "http://lichess.org/AbCd1234",
            "https://lichess.org/AbCd123",
            "https://lichess.org/AbCd12345",
            "https://lichess.org/AbCd1234/spectator",
            "https://chess.com/game/live/12345678",
            " https://lichess.org/AbCd1234",
            "not a link",
        ] {
            assert_eq!(extract_game_id(link), Err(GameResultError::InvalidLink), "{link}");
        }
    }
}
