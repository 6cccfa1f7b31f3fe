use super::{epoch, Envelope};
use crate::model::{self, Status};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    pub device_id: u64,
    #[serde(default)]
    pub device_sn: String,
    #[serde(default)]
    pub device_type: String,
    pub connect_status: Option<u64>,
    pub collection_time: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStationDevices {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub device_list_items: Vec<Data>,
}

impl From<Data> for model::Device {
    fn from(data: Data) -> Self {
        model::Device {
            id: data.device_id,
            sn: data.device_sn,
            device_type: data.device_type,
            connect_status: data.connect_status.map(Status::from_code),
            collection_time: epoch(data.collection_time),
        }
    }
}
