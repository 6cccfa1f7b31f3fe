//! Client for the Solarman cloud API.
//!
//! ```no_run
//! # async fn run() -> Result<(), solarman_rs::Error> {
//! use solarman_rs::model::Credentials;
//!
//! let api = solarman_rs::api(
//!     solarman_rs::endpoint::DEFAULT_API_URL.to_string(),
//!     Credentials {
//!         app_id: "app-id".to_string(),
//!         app_secret: "app-secret".to_string(),
//!         email: "owner@example.com".to_string(),
//!         password: "password".to_string(),
//!     },
//! );
//! let client = solarman_rs::login(&api).await?;
//! for station in solarman_rs::stations(&client).await? {
//!     for device in solarman_rs::station_devices(&client, station.id).await? {
//!         let data = solarman_rs::current_data(&client, device.id).await?;
//!         println!("{} {}: {} data points", station.name, device.sn, data.data_list.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod model;

pub use api::{
    api, current_data, dump_devices, endpoint, hash_password, login, station_devices, stations,
    Error,
};
