use chrono::{DateTime, Utc};
use num::{FromPrimitive, ToPrimitive};
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

type Watt = f64;
type KWp = f64;

/// JSON value whose type the upstream API does not pin down (`msg`, `code`, `unit`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Text(String),
    Structured(Value),
}

impl Loose {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Loose::Text(s) => Some(s),
            Loose::Structured(Value::String(s)) => Some(s),
            Loose::Structured(_) => None,
        }
    }
}

impl fmt::Display for Loose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loose::Text(s) => f.write_str(s),
            Loose::Structured(v) => write!(f, "{}", v),
        }
    }
}

impl Default for Loose {
    fn default() -> Self {
        Loose::Structured(Value::Null)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub email: String,
    /// Plain text; only its SHA-256 digest is ever sent.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Whether `current_data` requires `success: true` on the returned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessCheck {
    /// Missing or false `success` is an error.
    Strict,
    /// The record is returned whatever its `success` says.
    Lenient,
}

impl Default for SuccessCheck {
    fn default() -> Self {
        SuccessCheck::Strict
    }
}

#[derive(Debug, Clone)]
pub struct Api {
    pub api_url: String,
    pub credentials: Credentials,
    pub timeout: Option<Duration>,
    pub success_check: SuccessCheck,
}

impl Api {
    /// Deadline applied to every request of the client built by `api::login`,
    /// the token request included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_success_check(mut self, success_check: SuccessCheck) -> Self {
        self.success_check = success_check;
        self
    }
}

/// Authenticated client. Built once by `api::login`; the token is never refreshed.
#[derive(Clone)]
pub struct LoggedInApi {
    pub(crate) api_url: String,
    pub(crate) app_id: String,
    pub(crate) token: String,
    pub(crate) token_type: Option<String>,
    pub(crate) refresh_token: Option<String>,
    pub(crate) expires_at: Option<DateTime<Utc>>,
    pub(crate) success_check: SuccessCheck,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) client: reqwest::Client,
}

impl LoggedInApi {
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Informational only; an expired token is still used as-is.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn success_check(&self) -> SuccessCheck {
        self.success_check
    }

    /// Deadline for each query made through this value, overriding `Api::with_timeout`.
    /// Cloning is cheap, so a single call can get its own deadline with
    /// `client.clone().with_timeout(..)`. Dropping a query's future cancels it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

impl fmt::Debug for LoggedInApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggedInApi")
            .field("api_url", &self.api_url)
            .field("app_id", &self.app_id)
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("success_check", &self.success_check)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum ConnectStatus {
    Offline = 0,
    Online = 1,
    Alarm = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum DeviceState {
    Online = 1,
    Alarm = 2,
    Offline = 3,
}

/// Numeric status code; codes outside `T` are kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status<T> {
    Known(T),
    Unknown(u64),
}

impl<T: FromPrimitive + ToPrimitive + Copy> Status<T> {
    pub fn from_code(code: u64) -> Self {
        match T::from_u64(code) {
            Some(known) => Status::Known(known),
            None => Status::Unknown(code),
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            Status::Known(known) => known.to_u64().unwrap_or_default(),
            Status::Unknown(code) => *code,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: u64,
    pub name: String,
    pub generation_power: Option<Watt>,
    pub installed_capacity: Option<KWp>,
    pub network_status: Option<String>,
    pub location_address: Option<String>,
    pub grid_interconnection_type: Option<String>,
    pub last_update_time: Option<DateTime<Utc>>,
    pub start_operating_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: u64,
    pub sn: String,
    pub device_type: String,
    pub connect_status: Option<Status<ConnectStatus>>,
    pub collection_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub key: String,
    pub value: Option<Loose>,
    pub unit: Option<Loose>,
    pub name: String,
}

impl DataPoint {
    /// Numeric reading, whether sent as a number or a numeric string.
    pub fn as_f64(&self) -> Option<f64> {
        match self.value.as_ref()? {
            Loose::Text(s) => s.trim().parse().ok(),
            Loose::Structured(v) => v.as_f64(),
        }
    }

    pub fn unit_str(&self) -> Option<&str> {
        self.unit.as_ref().and_then(Loose::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentData {
    pub code: Option<Loose>,
    pub msg: Option<Loose>,
    pub success: Option<bool>,
    pub request_id: Option<String>,
    pub device_sn: String,
    pub device_id: u64,
    pub device_type: String,
    pub device_state: Option<Status<DeviceState>>,
    pub collection_time: Option<DateTime<Utc>>,
    pub data_list: Vec<DataPoint>,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_keeps_strings_and_structures_apart() {
        let text: Loose = serde_json::from_value(json!("kW")).unwrap();
        assert_eq!(Loose::Text("kW".to_string()), text);
        assert_eq!("kW", text.to_string());

        let structured: Loose = serde_json::from_value(json!({"zh": "千瓦"})).unwrap();
        assert_eq!(Loose::Structured(json!({"zh": "千瓦"})), structured);
        assert_eq!(None, structured.as_str());

        let absent: Option<Loose> = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(None, absent);
    }

    #[test]
    fn status_keeps_unknown_codes() {
        assert_eq!(
            Status::Known(ConnectStatus::Online),
            Status::<ConnectStatus>::from_code(1)
        );
        assert_eq!(Status::Unknown(7), Status::<DeviceState>::from_code(7));
        assert_eq!(3, Status::<DeviceState>::from_code(3).code());
        assert_eq!(7, Status::<ConnectStatus>::from_code(7).code());
    }

    #[test]
    fn data_point_numeric_value() {
        let point = DataPoint {
            key: "APo_t1".to_string(),
            value: Some(Loose::Text(" 1234.5".to_string())),
            unit: Some(Loose::Text("W".to_string())),
            name: "Total AC Output Power".to_string(),
        };
        assert_eq!(Some(1234.5), point.as_f64());
        assert_eq!(Some("W"), point.unit_str());

        let point = DataPoint {
            value: Some(Loose::Structured(json!(12))),
            ..point
        };
        assert_eq!(Some(12.0), point.as_f64());

        let point = DataPoint {
            value: Some(Loose::Text("Grid connected".to_string())),
            ..point
        };
        assert_eq!(None, point.as_f64());
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let credentials = Credentials {
            app_id: "app".to_string(),
            app_secret: "topsecret".to_string(),
            email: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn logged_in_debug_shows_app_id_only() {
        let client = LoggedInApi {
            api_url: "https://globalapi.solarmanpv.com".to_string(),
            app_id: "app".to_string(),
            token: "tok123".to_string(),
            token_type: Some("bearer".to_string()),
            refresh_token: Some("ref456".to_string()),
            expires_at: None,
            success_check: SuccessCheck::Strict,
            request_timeout: None,
            client: reqwest::Client::new(),
        }
        .with_timeout(Duration::from_secs(5));

        let debug = format!("{:?}", client);
        assert!(debug.contains("app"));
        assert!(!debug.contains("tok123"));
        assert!(!debug.contains("ref456"));
        assert_eq!(Some(Duration::from_secs(5)), client.request_timeout());
    }
}
