//! Fetch-and-shape operations behind each dashboard panel.
//!
//! Every operation issues exactly one upstream request for the given
//! department and turns the body into a formatted scalar, a [`SeriesPair`]
//! or a [`GeoFigure`]. Failures are returned to the caller untouched.

use crate::client::{AnalyticsClient, Endpoint};
use crate::departments::Department;
use crate::errors::FetchError;
use crate::geo::{self, CityTable};
use crate::models::{
    count_from_value, CityRow, DomainRow, DownloadRow, Feed, GeoFigure, PageRow, RealtimeRow,
    SeriesPair, TodayRow, TotalsFeed,
};
use chrono::NaiveTime;
use std::{fmt, str::FromStr};

pub const TOP_N: usize = 20;
pub const TITLE_LIMIT: usize = 30;

/// Rejected route parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("stat must be 'visits' or 'users', got '{0}'")]
    Stat(String),
    #[error("days must be 7 or 30, got '{0}'")]
    Days(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficStat {
    Visits,
    Users,
}

impl TrafficStat {
    pub fn key(&self) -> &'static str {
        match self {
            TrafficStat::Visits => "visits",
            TrafficStat::Users => "users",
        }
    }
}

impl fmt::Display for TrafficStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TrafficStat {
    type Err = ParamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "visits" => Ok(TrafficStat::Visits),
            "users" => Ok(TrafficStat::Users),
            other => Err(ParamError::Stat(other.to_string())),
        }
    }
}

/// Referring-domain window. The feed only publishes these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainWindow {
    Week,
    Month,
}

impl DomainWindow {
    fn endpoint(&self) -> Endpoint {
        match self {
            DomainWindow::Week => Endpoint::Domains7Days,
            DomainWindow::Month => Endpoint::Domains30Days,
        }
    }
}

impl FromStr for DomainWindow {
    type Err = ParamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "7" => Ok(DomainWindow::Week),
            "30" => Ok(DomainWindow::Month),
            other => Err(ParamError::Days(other.to_string())),
        }
    }
}

pub async fn get_active_users(client: &AnalyticsClient, dept: Department) -> Result<String, FetchError> {
    let (url, feed) = client.fetch::<Feed<RealtimeRow>>(dept, Endpoint::Realtime).await?;
    let row = feed.data.first().ok_or(FetchError::Missing {
        url,
        field: "data[0].active_visitors",
    })?;
    Ok(format_thousands(row.active_visitors))
}

pub async fn get_monthly_traffic(
    client: &AnalyticsClient,
    dept: Department,
    stat: TrafficStat,
) -> Result<String, FetchError> {
    let (url, feed) = client
        .fetch::<TotalsFeed>(dept, Endpoint::TrafficSources30Days)
        .await?;
    let field = match stat {
        TrafficStat::Visits => "totals.visits",
        TrafficStat::Users => "totals.users",
    };
    let total = feed
        .totals
        .get(stat.key())
        .and_then(count_from_value)
        .ok_or(FetchError::Missing { url, field })?;
    Ok(format_thousands(total))
}

/// Full hourly series for today. Panels call [`drop_partial_hour`] on it.
pub async fn get_visits_today(client: &AnalyticsClient, dept: Department) -> Result<SeriesPair, FetchError> {
    let (_, feed) = client.fetch::<Feed<TodayRow>>(dept, Endpoint::Today).await?;
    Ok(visits_series(feed.data))
}

pub async fn get_top_downloads(client: &AnalyticsClient, dept: Department) -> Result<SeriesPair, FetchError> {
    let (_, feed) = client
        .fetch::<Feed<DownloadRow>>(dept, Endpoint::DownloadsYesterday)
        .await?;
    Ok(top_series(
        feed.data
            .into_iter()
            .map(|row| (truncate_title(&row.page_title), row.total_events)),
    ))
}

pub async fn get_top_domains(
    client: &AnalyticsClient,
    dept: Department,
    window: DomainWindow,
) -> Result<SeriesPair, FetchError> {
    let (_, feed) = client.fetch::<Feed<DomainRow>>(dept, window.endpoint()).await?;
    Ok(top_series(feed.data.into_iter().map(|row| (row.domain, row.visits))))
}

pub async fn get_top_pages(client: &AnalyticsClient, dept: Department) -> Result<SeriesPair, FetchError> {
    let (_, feed) = client.fetch::<Feed<PageRow>>(dept, Endpoint::PagesRealtime).await?;
    Ok(top_series(
        feed.data
            .into_iter()
            .map(|row| (truncate_title(&row.page_title), row.active_visitors)),
    ))
}

pub async fn get_visitor_geo_figure(
    client: &AnalyticsClient,
    cities: &CityTable,
    dept: Department,
) -> Result<GeoFigure, FetchError> {
    let (_, feed) = client.fetch::<Feed<CityRow>>(dept, Endpoint::CitiesRealtime).await?;
    Ok(geo::build_figure(cities, &feed.data))
}

/// Drops index 0, the hour still in progress.
pub fn drop_partial_hour(mut series: SeriesPair) -> SeriesPair {
    if !series.is_empty() {
        series.labels.remove(0);
        series.values.remove(0);
    }
    series
}

pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_LIMIT {
        let head: String = title.chars().take(TITLE_LIMIT).collect();
        format!("{head}...")
    } else {
        title.to_string()
    }
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// "00" -> "12 AM", "13" -> "1 PM". Unparseable hours pass through unchanged.
pub fn format_hour(hour: &str) -> String {
    match NaiveTime::parse_from_str(&format!("{}:00", hour.trim()), "%H:%M") {
        Ok(time) => time.format("%-I %p").to_string(),
        Err(_) => hour.to_string(),
    }
}

fn visits_series(rows: Vec<TodayRow>) -> SeriesPair {
    rows.into_iter()
        .map(|row| (format_hour(&row.hour), row.visits))
        .collect()
}

fn top_series(rows: impl Iterator<Item = (String, u64)>) -> SeriesPair {
    rows.take(TOP_N).collect()
}
