use crate::convert::{HostValue, ToHost};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// One engine stats report flattened to string pairs. Always has a `"type"` key.
pub type StatsReport = BTreeMap<String, String>;

/// Stats as handed to the legacy stats callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsResponse {
    pub timestamp: f64,
    pub reports: Vec<StatsReport>,
}

impl StatsResponse {
    /// Takes the newest report timestamp as the response timestamp.
    pub fn from_timed_reports(reports: Vec<(f64, StatsReport)>) -> Self {
        let timestamp = reports
            .iter()
            .map(|(timestamp, _)| *timestamp)
            .fold(0.0, f64::max);
        Self {
            timestamp,
            reports: reports.into_iter().map(|(_, report)| report).collect(),
        }
    }

    pub fn report_types(&self) -> impl Iterator<Item = &str> {
        self.reports
            .iter()
            .filter_map(|report| report.get("type").map(String::as_str))
    }
}

impl ToHost for StatsResponse {
    fn to_host(&self) -> HostValue {
        let result: Vec<Value> = self
            .reports
            .iter()
            .map(|report| {
                let mut object: Map<String, Value> = report
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                    .collect();
                object
                    .entry("timestamp")
                    .or_insert_with(|| json!(self.timestamp));
                Value::Object(object)
            })
            .collect();

        json!({ "timestamp": self.timestamp, "result": result })
    }
}
