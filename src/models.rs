use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Envelope of every row-based feed. A body without `data` is a decode error.
#[derive(Debug, Deserialize)]
pub struct Feed<T> {
    pub data: Vec<T>,
}

/// Envelope of `top-traffic-sources-30-days.json`.
#[derive(Debug, Deserialize)]
pub struct TotalsFeed {
    #[serde(default)]
    pub totals: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RealtimeRow {
    #[serde(deserialize_with = "count")]
    pub active_visitors: u64,
}

#[derive(Debug, Deserialize)]
pub struct TodayRow {
    pub hour: String,
    #[serde(deserialize_with = "count")]
    pub visits: u64,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRow {
    pub page_title: String,
    #[serde(deserialize_with = "count")]
    pub total_events: u64,
}

#[derive(Debug, Deserialize)]
pub struct DomainRow {
    pub domain: String,
    #[serde(deserialize_with = "count")]
    pub visits: u64,
}

#[derive(Debug, Deserialize)]
pub struct PageRow {
    pub page_title: String,
    #[serde(deserialize_with = "count")]
    pub active_visitors: u64,
}

#[derive(Debug, Deserialize)]
pub struct CityRow {
    pub city: String,
    #[serde(deserialize_with = "count")]
    pub active_visitors: u64,
}

/// Aligned chart labels and values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPair {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl SeriesPair {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn push(&mut self, label: String, value: u64) {
        self.labels.push(label);
        self.values.push(value);
    }
}

impl FromIterator<(String, u64)> for SeriesPair {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut series = SeriesPair::default();
        for (label, value) in iter {
            series.push(label, value);
        }
        series
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardResponse {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub visitors: u64,
    pub size: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoSeries {
    pub name: String,
    pub points: Vec<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFigure {
    pub series: Vec<GeoSeries>,
}

impl GeoFigure {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|series| series.points.len()).sum()
    }
}

/// One dashboard panel: either its data or the reason it could not be loaded.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Panel<T> {
    Ok { data: T },
    Error { message: String },
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Panel<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Panel::Ok { data },
            Err(err) => Panel::Error {
                message: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub department: String,
    pub active_users: Panel<CardResponse>,
    pub monthly_visits: Panel<CardResponse>,
    pub visits_today: Panel<SeriesPair>,
    pub top_downloads: Panel<SeriesPair>,
    pub top_domains_7_days: Panel<SeriesPair>,
    pub top_domains_30_days: Panel<SeriesPair>,
    pub top_pages: Panel<SeriesPair>,
    pub visitor_locations: Panel<GeoFigure>,
}

/// Accepts counts sent either as JSON numbers or numeric strings.
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    count_from_value(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a count, got {value}")))
}

pub fn count_from_value(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64)),
        serde_json::Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().filter(|n| *n >= 0.0).map(|n| n as u64))
        }
        _ => None,
    }
}
