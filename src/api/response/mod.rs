pub mod get_current_data;
pub mod get_station_devices;
pub mod get_station_list;
pub mod token;

use crate::api::Error;
use crate::model::Loose;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/* Generic `{success, msg}` wrapper shared by every endpoint */
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub code: Option<Loose>,
    #[serde(default)]
    pub msg: Option<Loose>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl Envelope {
    /// Absent `success` counts as failure.
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(false)
    }

    pub fn check(&self) -> Result<(), Error> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::ApiError {
                code: self.code.clone(),
                msg: self.msg.clone().unwrap_or_default(),
            })
        }
    }
}

/// Upstream timestamps are epoch seconds, sometimes with a fractional part.
pub(crate) fn epoch(seconds: Option<f64>) -> Option<DateTime<Utc>> {
    let seconds = seconds?;
    if !seconds.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt((seconds * 1000.0).round() as i64).single()
}
