use prometheus::{Encoder, GaugeVec, TextEncoder};
use solarman_rs::model::{Api, CurrentData, Device, LoggedInApi, Station};

lazy_static! {
    static ref STATION_GENERATION_POWER_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "station_generation_power",
            "current generation power of station (in W)",
        ),
        &["station_id", "station_name"],
    )
    .unwrap();
    static ref STATION_INSTALLED_CAPACITY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "station_installed_capacity",
            "installed capacity of station (in kWp)",
        ),
        &["station_id", "station_name"],
    )
    .unwrap();
    static ref DEVICE_CONNECT_STATUS_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "device_connect_status",
            "connection status code reported for device",
        ),
        &["station_id", "device_id", "device_sn", "device_type"],
    )
    .unwrap();
    static ref DEVICE_CURRENT_VALUE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "device_current_value",
            "latest numeric data point reported by device",
        ),
        &["station_id", "device_id", "device_sn", "key", "name", "unit"],
    )
    .unwrap();
}

fn process_station(station: &Station) {
    let station_id = station.id.to_string();
    let labels = [station_id.as_str(), station.name.as_str()];

    if let Some(power) = station.generation_power {
        STATION_GENERATION_POWER_GAUGE
            .with_label_values(&labels)
            .set(power);
    }
    if let Some(capacity) = station.installed_capacity {
        STATION_INSTALLED_CAPACITY_GAUGE
            .with_label_values(&labels)
            .set(capacity);
    }
}

/// Feed numeric data points of `data` to Prometheus. Textual readings (inverter state
/// names and the like) are skipped.
fn process_current_data(data: &CurrentData, station: &Station, device: &Device) {
    let station_id = station.id.to_string();
    let device_id = device.id.to_string();

    for point in &data.data_list {
        match point.as_f64() {
            Some(value) => {
                DEVICE_CURRENT_VALUE_GAUGE
                    .with_label_values(&[
                        &station_id,
                        &device_id,
                        &device.sn,
                        &point.key,
                        &point.name,
                        point.unit_str().unwrap_or(""),
                    ])
                    .set(value);
            }
            None => log::debug!(
                "Skipping non-numeric data point {} of device {}",
                point.key,
                device.id
            ),
        }
    }
}

/// Iterate through all devices within station and collect their current data.
async fn collect_station_devices(
    api: &LoggedInApi,
    station: &Station,
) -> Result<(), solarman_rs::Error> {
    let devices = solarman_rs::station_devices(api, station.id).await?;

    for device in devices {
        if let Some(status) = device.connect_status {
            DEVICE_CONNECT_STATUS_GAUGE
                .with_label_values(&[
                    &station.id.to_string(),
                    &device.id.to_string(),
                    &device.sn,
                    &device.device_type,
                ])
                .set(status.code() as f64);
        }

        match solarman_rs::current_data(api, device.id).await {
            Ok(data) => process_current_data(&data, station, &device),
            Err(e) => log::error!(
                "No current data returned for device {} of station {}: {}",
                device.id,
                station.id,
                e
            ),
        }
    }
    Ok(())
}

/// Drop every series of the previous collection, so that devices or data points that
/// went missing stop being reported.
fn reset() {
    STATION_GENERATION_POWER_GAUGE.reset();
    STATION_INSTALLED_CAPACITY_GAUGE.reset();
    DEVICE_CONNECT_STATUS_GAUGE.reset();
    DEVICE_CURRENT_VALUE_GAUGE.reset();
}

/// Collect all supported metrics from `api`, updating Prometheus exporter registry.
pub async fn collect(api: &Api) -> Result<(), solarman_rs::Error> {
    let logged_in_api = solarman_rs::login(api).await?;
    let stations = solarman_rs::stations(&logged_in_api).await?;

    reset();
    for station in stations {
        process_station(&station);
        collect_station_devices(&logged_in_api, &station).await?;
    }

    Ok(())
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> Result<String, solarman_rs::Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode(&metric_families, &mut buffer)
        .or(Err(solarman_rs::Error::FormatError))?;
    String::from_utf8(buffer).or(Err(solarman_rs::Error::FormatError))
}
