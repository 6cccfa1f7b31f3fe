#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use config::Config;
use rocket::{Build, Rocket, State};
use solarman_rs::api;
use solarman_rs::model::{Api, Credentials, SuccessCheck};
use std::sync::Mutex;
use std::time::{Duration, Instant};

mod metrics;

#[derive(Clone, serde::Deserialize)]
pub struct SolarmanConfig {
    api_url: String,
    app_id: String,
    app_secret: String,
    email: String,
    password: String,
    interval: u64,
    timeout: u64,
    strict: bool,
}

/// Structure containing state for API handlers.
pub struct StateData {
    api: Api,
    interval: u64,
    /// Timestamp of last successful metric collection via `metrics::collect()`
    timestamp: Mutex<Option<Instant>>,
}

impl StateData {
    /// Updates `timestamp` to `now()`.
    fn touch(&self) {
        if let Ok(mut ts) = self.timestamp.lock() {
            *ts = Some(Instant::now());
        } else {
            log::trace!("Unable to lock timestamp mutex, will refresh again")
        }
    }

    /// Checks whether `interval_secs` elapsed since last `touch()`
    fn interval_elapsed(&self, interval_secs: u64) -> bool {
        let elapsed_opt = self
            .timestamp
            .lock()
            .ok()
            .and_then(|a| a.map(|b| b.elapsed().as_secs()));

        match elapsed_opt {
            Some(elapsed) => elapsed > interval_secs,
            /* Never collected yet */
            None => true,
        }
    }
}

/// Read `SOLARMAN_*` environment variables.
pub fn read_settings() -> Result<SolarmanConfig, config::ConfigError> {
    let mut settings = Config::default();
    settings
        .set_default("api_url", api::endpoint::DEFAULT_API_URL)?
        .set_default("interval", 300_i64)?
        .set_default("timeout", 30_i64)?
        .set_default("strict", true)?
        .merge(config::Environment::with_prefix("SOLARMAN"))?;

    settings.try_into()
}

fn api_from_settings(settings: SolarmanConfig) -> Api {
    let success_check = if settings.strict {
        SuccessCheck::Strict
    } else {
        SuccessCheck::Lenient
    };

    api::api(
        settings.api_url,
        Credentials {
            app_id: settings.app_id,
            app_secret: settings.app_secret,
            email: settings.email,
            password: settings.password,
        },
    )
    .with_timeout(Duration::from_secs(settings.timeout))
    .with_success_check(success_check)
}

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, api::Error> {
    if state.interval_elapsed(state.interval) {
        metrics::collect(&state.api).await?;
        state.touch();
    } else {
        log::info!("interval time not yet elapsed since last run; returning cached result")
    }
    metrics::read()
}

#[get("/dump-devices")]
async fn dump_devices_route(state: &State<StateData>) -> Result<String, api::Error> {
    let logged_in_api = api::login(&state.api).await?;
    let dump = api::dump_devices(&logged_in_api).await?;

    serde_json::to_string_pretty(&dump).or(Err(api::Error::FormatError))
}

#[launch]
fn rocket() -> Rocket<Build> {
    env_logger::init();

    let settings = match read_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let interval = settings.interval;
    let state = StateData {
        api: api_from_settings(settings),
        interval,
        timestamp: Mutex::new(None),
    };

    rocket::build()
        .manage(state)
        .mount("/", routes![metrics_route, dump_devices_route])
}
