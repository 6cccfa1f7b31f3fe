use crate::model::Loose;
use serde::Deserialize;

/// Token-bearing fields; decoded only once the envelope reported success.
#[derive(Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /* numeric string in practice, plain number tolerated */
    #[serde(default)]
    pub expires_in: Option<Loose>,
}

impl TokenResponse {
    pub fn expires_in_seconds(&self) -> Option<i64> {
        match self.expires_in.as_ref()? {
            Loose::Text(s) => s.trim().parse().ok(),
            Loose::Structured(v) => v.as_i64(),
        }
    }
}
