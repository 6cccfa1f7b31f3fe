use super::{epoch, Envelope};
use crate::model::{self, Loose, Status};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct DataItem {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<Loose>,
    #[serde(default)]
    pub unit: Option<Loose>,
    #[serde(default)]
    pub name: String,
}

/* Flat record: the envelope fields sit next to the telemetry */
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCurrentData {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub device_sn: String,
    #[serde(default)]
    pub device_id: u64,
    #[serde(default)]
    pub device_type: String,
    pub device_state: Option<u64>,
    pub collection_time: Option<f64>,
    #[serde(default)]
    pub data_list: Vec<DataItem>,
}

impl From<DataItem> for model::DataPoint {
    fn from(item: DataItem) -> Self {
        model::DataPoint {
            key: item.key,
            value: item.value,
            unit: item.unit,
            name: item.name,
        }
    }
}

impl From<GetCurrentData> for model::CurrentData {
    fn from(response: GetCurrentData) -> Self {
        model::CurrentData {
            code: response.envelope.code,
            msg: response.envelope.msg,
            success: response.envelope.success,
            request_id: response.envelope.request_id,
            device_sn: response.device_sn,
            device_id: response.device_id,
            device_type: response.device_type,
            device_state: response.device_state.map(Status::from_code),
            collection_time: epoch(response.collection_time),
            data_list: response.data_list.into_iter().map(Into::into).collect(),
        }
    }
}
