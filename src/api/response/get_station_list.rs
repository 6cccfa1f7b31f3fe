use super::{epoch, Envelope};
use crate::model;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub generation_power: Option<f64>,
    pub installed_capacity: Option<f64>,
    pub network_status: Option<String>,
    pub location_address: Option<String>,
    pub grid_interconnection_type: Option<String>,
    pub last_update_time: Option<f64>,
    pub start_operating_time: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStationList {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub station_list: Vec<Data>,
}

impl From<Data> for model::Station {
    fn from(data: Data) -> Self {
        model::Station {
            id: data.id,
            name: data.name,
            generation_power: data.generation_power,
            installed_capacity: data.installed_capacity,
            network_status: data.network_status,
            location_address: data.location_address,
            grid_interconnection_type: data.grid_interconnection_type,
            last_update_time: epoch(data.last_update_time),
            start_operating_time: epoch(data.start_operating_time),
        }
    }
}
