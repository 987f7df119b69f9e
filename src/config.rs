use crate::{
    prelude::*,
    results::DEFAULT_GAMES_BEFORE_TIEBREAKS,
};
#[cfg(unix)] use xdg::BaseDirectories;

#[cfg(unix)] const CONFIG_FILE_NAME: &str = "chess-bracket.json";
#[cfg(windows)] const CONFIG_PATH: &str = "cfg/chess-bracket.json";

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Wheel(#[from] wheel::Error),
    #[error("lichessBaseUrl must be an https:// URL, got {0:?}")]
    InsecureLichessUrl(String),
    #[error("missing config file")]
    Missing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Config {
    /// The spreadsheet holding the match registry. Only needed for looking up matches by ID.
    #[serde(default)]
    pub(crate) google_sheet_id: Option<String>,
    #[serde(default = "default_game_links_sheet")]
    pub(crate) game_links_sheet: String,
    #[serde(default = "default_games_before_tiebreaks")]
    pub(crate) games_before_tiebreaks: usize,
    #[serde(default = "default_lichess_base_url")]
    pub(crate) lichess_base_url: String,
    /// Overrides the location of the game result cache file.
    #[serde(default)]
    pub(crate) cache_path: Option<PathBuf>,
}

fn default_game_links_sheet() -> String { format!("Game Links") }
fn default_games_before_tiebreaks() -> usize { DEFAULT_GAMES_BEFORE_TIEBREAKS }
fn default_lichess_base_url() -> String { format!("https://lichess.org") }

impl Default for Config {
    fn default() -> Self {
        Self {
            google_sheet_id: None,
            game_links_sheet: default_game_links_sheet(),
            games_before_tiebreaks: default_games_before_tiebreaks(),
            lichess_base_url: default_lichess_base_url(),
            cache_path: None,
        }
    }
}

impl Config {
    pub(crate) async fn load() -> Result<Self, Error> {
        #[cfg(unix)] let config = if let Some(config_path) = BaseDirectories::new().find_config_file(CONFIG_FILE_NAME) {
            fs::read_json::<Self>(config_path).await?
        } else {
            return Err(Error::Missing)
        };
        #[cfg(windows)] let config = if Path::new(CONFIG_PATH).exists() {
            fs::read_json::<Self>(CONFIG_PATH).await?
        } else {
            return Err(Error::Missing)
        };
        config.validate()
    }

    /// The HTTP client only speaks https, so any other Lichess URL would fail on every request.
    fn validate(self) -> Result<Self, Error> {
        if !self.lichess_base_url.starts_with("https://") {
            return Err(Error::InsecureLichessUrl(self.lichess_base_url))
        }
        Ok(self)
    }

    /// Like [`Config::load`], but uses the defaults if there is no config file.
    pub(crate) async fn load_or_default() -> Result<Self, Error> {
        match Self::load().await {
            Ok(config) => Ok(config),
            Err(Error::Missing) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }
}
