use crate::models::{CityRow, GeoFigure, GeoPoint, GeoSeries};
use serde::Deserialize;
use std::{collections::HashMap, path::Path};
use tokio::fs;

/// US cities ordered by population.
const BUNDLED_CITIES: &str = include_str!("../data/us_cities.csv");

/// Positional slices over the joined rows, one marker series each.
/// The last slice runs to the end of the joined rows.
pub const BUCKETS: [(usize, usize); 5] = [(0, 30), (30, 100), (100, 200), (200, 500), (500, 1000)];

const MARKER_SCALE: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub pop: u64,
    pub lat: f64,
    pub lon: f64,
}

/// Static city reference dataset, in file order.
#[derive(Debug, Clone, Default)]
pub struct CityTable {
    records: Vec<CityRecord>,
}

impl CityTable {
    pub fn bundled() -> Result<Self, csv::Error> {
        Self::from_csv(BUNDLED_CITIES.as_bytes())
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::None).from_reader(bytes);
        let mut records = Vec::new();
        for row in reader.deserialize::<CityRecord>() {
            let mut record = row?;
            record.name = record.name.trim().to_string();
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<CityRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CityTableError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse city table: {0}")]
    Parse(#[from] csv::Error),
}

pub async fn load_cities(path: Option<&Path>) -> Result<CityTable, CityTableError> {
    match path {
        Some(path) => {
            let bytes = fs::read(path).await.map_err(|source| CityTableError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Ok(CityTable::from_csv(&bytes)?)
        }
        None => Ok(CityTable::bundled()?),
    }
}

/// Inner-joins the reference table with the realtime city feed and slices the
/// result into the five marker series.
pub fn build_figure(table: &CityTable, feed: &[CityRow]) -> GeoFigure {
    let visitors: HashMap<&str, u64> = feed
        .iter()
        .map(|row| (row.city.trim(), row.active_visitors))
        .collect();

    let joined: Vec<GeoPoint> = table
        .records()
        .iter()
        .filter_map(|city| {
            let name = city.name.trim();
            visitors.get(name).map(|&count| GeoPoint {
                name: name.to_string(),
                lat: city.lat,
                lon: city.lon,
                visitors: count,
                size: count as f64 / MARKER_SCALE,
                text: hover_text(name, count, city.pop),
            })
        })
        .collect();

    GeoFigure {
        series: bucket(joined),
    }
}

fn bucket(rows: Vec<GeoPoint>) -> Vec<GeoSeries> {
    let len = rows.len();
    let mut rows = rows.into_iter();
    BUCKETS
        .iter()
        .enumerate()
        .map(|(i, &(lo, hi))| {
            let end = if i == BUCKETS.len() - 1 { len } else { hi.min(len) };
            let take = end.saturating_sub(lo.min(len));
            GeoSeries {
                name: format!("{} - {}", lo * 10, hi * 10),
                points: rows.by_ref().take(take).collect(),
            }
        })
        .collect()
}

fn hover_text(name: &str, visitors: u64, pop: u64) -> String {
    format!(
        "{name}<br> Visitors: {visitors}<br>Population {} million",
        pop as f64 / 1e6
    )
}
