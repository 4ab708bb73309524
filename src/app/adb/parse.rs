use crate::app::models::DeviceSummary;

pub fn parse_adb_devices(output: &str) -> Vec<DeviceSummary> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim_start().starts_with('*'))
        .filter(|line| !line.to_lowercase().contains("list of devices"))
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 {
                return None;
            }
            let serial = tokens[0].to_string();
            let state = tokens[1].to_string();
            let mut model = None;
            let mut product = None;
            let mut device = None;
            let mut transport_id = None;
            for token in tokens.iter().skip(2) {
                if let Some(value) = token.strip_prefix("model:") {
                    model = Some(value.to_string());
                } else if let Some(value) = token.strip_prefix("product:") {
                    product = Some(value.to_string());
                } else if let Some(value) = token.strip_prefix("device:") {
                    device = Some(value.to_string());
                } else if let Some(value) = token.strip_prefix("transport_id:") {
                    transport_id = Some(value.to_string());
                }
            }
            Some(DeviceSummary {
                serial,
                state,
                model,
                product,
                device,
                transport_id,
            })
        })
        .collect()
}

/// The device a keyless send lands on. Only `device` counts: `unauthorized`,
/// `offline`, and `recovery` entries show up in listings but cannot take
/// input.
pub fn first_ready_device(devices: &[DeviceSummary]) -> Option<&DeviceSummary> {
    devices.iter().find(|summary| summary.state == "device")
}
