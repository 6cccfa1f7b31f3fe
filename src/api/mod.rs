pub mod endpoint;
pub mod error;
pub mod response;

use crate::model::{self, Credentials, SuccessCheck};
use chrono::Utc;
pub use error::Error;
use reqwest::RequestBuilder;
use response::get_current_data::GetCurrentData;
use response::get_station_devices::GetStationDevices;
use response::get_station_list::GetStationList;
use response::token::TokenResponse;
use response::Envelope;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use std::collections::HashMap;
use std::time::Duration;

pub fn api(api_url: String, credentials: Credentials) -> model::Api {
    model::Api {
        api_url,
        credentials,
        timeout: None,
        success_check: SuccessCheck::default(),
    }
}

/// Lowercase hex SHA-256 of `password`, the only form in which it is sent.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Map transport-level reqwest failure to Error
fn map_api_err(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout(error.to_string())
    } else {
        Error::Transport(error.to_string())
    }
}

fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, Error> {
    let builder = reqwest::ClientBuilder::new();
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder
        .build()
        .map_err(|e| Error::InternalError(format!("Failed to build HTTP client: {}", e)))
}

/// Send `request` and read the whole body. Anything but 200 is returned as
/// `Error::HttpStatus` without looking at the body's contents.
async fn read_body(request: RequestBuilder) -> Result<Vec<u8>, Error> {
    let response = request.send().await.map_err(map_api_err)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_api_err)?;

    if status != http::StatusCode::OK {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    Ok(body.to_vec())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| {
        Error::InvalidResponse(String::from_utf8_lossy(body).into_owned(), e.to_string())
    })
}

/// Authenticate with the password grant. This is the only place a token is
/// obtained; the returned client keeps it for its whole lifetime.
pub async fn login(api: &model::Api) -> Result<model::LoggedInApi, Error> {
    let client = build_client(api.timeout)?;
    let credentials = &api.credentials;
    let url = format!("{}{}", api.api_url, endpoint::TOKEN);

    let request_body = HashMap::from([
        ("appSecret", credentials.app_secret.to_owned()),
        ("email", credentials.email.to_owned()),
        ("password", hash_password(&credentials.password)),
    ]);

    log::debug!("POST {} (appId {})", url, credentials.app_id);

    let body = read_body(
        client
            .post(url)
            .query(&[
                ("appId", credentials.app_id.as_str()),
                ("language", endpoint::LANGUAGE),
            ])
            .json(&request_body),
    )
    .await?;

    /* The payload only tells whether it carries a token once `success` is read */
    let envelope: Envelope = decode(&body)?;
    if !envelope.is_success() {
        return Err(Error::LoginError(envelope.msg.unwrap_or_default()));
    }

    let token: TokenResponse = decode(&body)?;
    let expires_at = token
        .expires_in_seconds()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
    let access_token = token.access_token.ok_or_else(|| {
        Error::InvalidResponse(
            String::from_utf8_lossy(&body).into_owned(),
            String::from("missing access_token"),
        )
    })?;

    log::debug!(
        "Logged in with appId {}, token expires at {:?}",
        credentials.app_id,
        expires_at
    );

    Ok(model::LoggedInApi {
        api_url: api.api_url.to_owned(),
        app_id: credentials.app_id.to_owned(),
        token: access_token,
        token_type: token.token_type,
        refresh_token: token.refresh_token,
        expires_at,
        success_check: api.success_check,
        request_timeout: None,
        client,
    })
}

async fn post<B: Serialize + ?Sized>(
    api: &model::LoggedInApi,
    endpoint: &endpoint::Endpoint,
    query: &[(&str, &str)],
    data: &B,
) -> Result<Vec<u8>, Error> {
    let url = format!("{}{}", api.api_url, endpoint);
    log::debug!("POST {}", url);

    let mut request = api.client.post(url).bearer_auth(&api.token).json(data);
    if !query.is_empty() {
        request = request.query(query);
    }
    if let Some(timeout) = api.request_timeout {
        request = request.timeout(timeout);
    }

    let body = read_body(request).await?;
    log::trace!(
        "endpoint: {}, response_text: {}",
        endpoint,
        String::from_utf8_lossy(&body)
    );
    Ok(body)
}

async fn post_current_data(api: &model::LoggedInApi, device_id: u64) -> Result<Vec<u8>, Error> {
    let request_body = HashMap::from([("deviceId", device_id)]);
    post(
        api,
        endpoint::CURRENT_DATA,
        &[("appId", api.app_id.as_str()), ("language", endpoint::LANGUAGE)],
        &request_body,
    )
    .await
}

/// List every station visible to the account.
pub async fn stations(api: &model::LoggedInApi) -> Result<Vec<model::Station>, Error> {
    let body = post(api, endpoint::STATIONS, &[], &serde_json::json!({})).await?;
    let response: GetStationList = decode(&body)?;
    response.envelope.check()?;

    Ok(response.station_list.into_iter().map(Into::into).collect())
}

/// List devices of station `station_id`, in the order the API returns them.
pub async fn station_devices(
    api: &model::LoggedInApi,
    station_id: u64,
) -> Result<Vec<model::Device>, Error> {
    let request_body = HashMap::from([("stationId", station_id)]);

    let body = post(api, endpoint::STATION_DEVICES, &[], &request_body).await?;
    let response: GetStationDevices = decode(&body)?;
    response.envelope.check()?;

    Ok(response
        .device_list_items
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Read the latest telemetry of `device_id`.
///
/// The record carries its own `success`/`msg`. Under `SuccessCheck::Strict` a
/// record without `success: true` is returned as `Error::ApiError`; under
/// `SuccessCheck::Lenient` it is handed back untouched.
pub async fn current_data(
    api: &model::LoggedInApi,
    device_id: u64,
) -> Result<model::CurrentData, Error> {
    let body = post_current_data(api, device_id).await?;
    let response: GetCurrentData = decode(&body)?;

    if api.success_check == SuccessCheck::Strict {
        response.envelope.check()?;
    }

    Ok(response.into())
}

/// Dump devices' current data
///
/// Iterate through all stations and all devices within those stations. Collect raw JSON output
/// of current data, keyed by device id, for reporting data points the typed model does not
/// cover. Devices whose data cannot be read are logged and skipped.
pub async fn dump_devices(api: &model::LoggedInApi) -> Result<HashMap<u64, Value>, Error> {
    let stations = stations(api).await?;
    let mut dump: HashMap<u64, Value> = HashMap::new();

    for station in stations {
        let devices = station_devices(api, station.id).await?;
        for device in devices {
            let value = post_current_data(api, device.id)
                .await
                .and_then(|body| decode::<Value>(&body));
            match value {
                Ok(value) => {
                    dump.insert(device.id, value);
                }
                Err(e) => {
                    log::warn!(
                        "No current data for device {} ({}) of station {}: {}",
                        device.id,
                        device.sn,
                        station.id,
                        e
                    );
                }
            }
        }
    }

    Ok(dump)
}
