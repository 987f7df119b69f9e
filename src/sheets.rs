//! Reading the match registry from Google Sheets.

use {
    yup_oauth2::{
        ServiceAccountAuthenticator,
        read_service_account_key,
    },
    crate::prelude::*,
};

const SERVICE_ACCOUNT_KEY_PATH: &str = "assets/google-client-secret.json";

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] OAuth(#[from] yup_oauth2::Error),
    #[error(transparent)] Reqwest(#[from] reqwest::Error),
    #[error(transparent)] Wheel(#[from] wheel::Error),
    #[error("empty token is not valid")]
    EmptyToken,
    #[error("OAuth token is expired")]
    TokenExpired,
}

impl IsNetworkError for Error {
    fn is_network_error(&self) -> bool {
        match self {
            Self::OAuth(_) => false,
            Self::Reqwest(e) => e.is_network_error(),
            Self::Wheel(e) => e.is_network_error(),
            Self::EmptyToken => false,
            Self::TokenExpired => false,
        }
    }
}

async fn auth_token() -> Result<String, Error> {
    let gsuite_secret = read_service_account_key(SERVICE_ACCOUNT_KEY_PATH).await.at(SERVICE_ACCOUNT_KEY_PATH)?;
    let auth = ServiceAccountAuthenticator::builder(gsuite_secret)
        .build().await.at_unknown()?;
    let token = auth.token(&["https://www.googleapis.com/auth/spreadsheets.readonly"]).await?;
    if token.is_expired() { return Err(Error::TokenExpired) }
    let Some(token) = token.token() else { return Err(Error::EmptyToken) };
    if token.is_empty() { return Err(Error::EmptyToken) }
    Ok(token.to_owned())
}

fn values_url(sheet_id: &str, range: &str) -> String {
    format!("https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}", urlencoding::encode(sheet_id), urlencoding::encode(range))
}

/// Reads the formatted cell values of a range, row by row. A sheet name on its own selects the whole sheet.
pub(crate) async fn values(http_client: &reqwest::Client, sheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, Error> {
    #[derive(Deserialize)]
    struct ValueRange {
        #[serde(default)]
        values: Vec<Vec<String>>,
    }

    let token = auth_token().await?;
    let ValueRange { values } = http_client.get(&values_url(sheet_id, range))
        .bearer_auth(token)
        .query(&[
            ("valueRenderOption", "FORMATTED_VALUE"),
            ("dateTimeRenderOption", "FORMATTED_STRING"),
            ("majorDimension", "ROWS"),
        ])
        .send().await?
        .detailed_error_for_status().await?
        .json_with_text_in_error::<ValueRange>().await?;
    Ok(values)
}
