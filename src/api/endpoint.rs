pub type Endpoint = str;

pub const DEFAULT_API_URL: &str = "https://globalapi.solarmanpv.com";
pub const LANGUAGE: &str = "en";

pub const TOKEN: &Endpoint = "/account/v1.0/token";
pub const STATIONS: &Endpoint = "/station/v1.0/list";
pub const STATION_DEVICES: &Endpoint = "/station/v1.0/device";
pub const CURRENT_DATA: &Endpoint = "/device/v1.0/currentData";
