use crate::data::{self, DomainWindow, TrafficStat};
use crate::departments::{self, Department, DepartmentOption};
use crate::errors::{AppError, FetchError};
use crate::models::{CardResponse, DashboardResponse, GeoFigure, SeriesPair};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use tracing::info;

pub async fn index() -> Html<String> {
    Html(render_index(&departments::options()))
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn get_departments() -> Json<Vec<DepartmentOption>> {
    Json(departments::options())
}

pub async fn get_active_users(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> Result<Json<CardResponse>, AppError> {
    let dept: Department = dept.parse()?;
    Ok(Json(active_users_card(&state, dept).await?))
}

pub async fn get_monthly_traffic(
    State(state): State<AppState>,
    Path((dept, stat)): Path<(String, String)>,
) -> Result<Json<CardResponse>, AppError> {
    let dept: Department = dept.parse()?;
    let stat: TrafficStat = stat.parse()?;
    Ok(Json(monthly_card(&state, dept, stat).await?))
}

pub async fn get_visits_today(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> Result<Json<SeriesPair>, AppError> {
    let dept: Department = dept.parse()?;
    Ok(Json(visits_today_panel(&state, dept).await?))
}

pub async fn get_top_downloads(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> Result<Json<SeriesPair>, AppError> {
    let dept: Department = dept.parse()?;
    Ok(Json(data::get_top_downloads(&state.client, dept).await?))
}

pub async fn get_top_domains(
    State(state): State<AppState>,
    Path((dept, days)): Path<(String, String)>,
) -> Result<Json<SeriesPair>, AppError> {
    let dept: Department = dept.parse()?;
    let window: DomainWindow = days.parse()?;
    Ok(Json(data::get_top_domains(&state.client, dept, window).await?))
}

pub async fn get_top_pages(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> Result<Json<SeriesPair>, AppError> {
    let dept: Department = dept.parse()?;
    Ok(Json(data::get_top_pages(&state.client, dept).await?))
}

pub async fn get_visitor_locations(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> Result<Json<GeoFigure>, AppError> {
    let dept: Department = dept.parse()?;
    Ok(Json(
        data::get_visitor_geo_figure(&state.client, &state.cities, dept).await?,
    ))
}

/// Every panel for one department. Upstream failures stay inside their panel.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    let dept: Department = dept.parse()?;
    info!(%dept, "refreshing dashboard");

    let client = &state.client;
    let (
        active_users,
        monthly_visits,
        visits_today,
        top_downloads,
        top_domains_7_days,
        top_domains_30_days,
        top_pages,
        visitor_locations,
    ) = tokio::join!(
        active_users_card(&state, dept),
        monthly_card(&state, dept, TrafficStat::Visits),
        visits_today_panel(&state, dept),
        data::get_top_downloads(client, dept),
        data::get_top_domains(client, dept, DomainWindow::Week),
        data::get_top_domains(client, dept, DomainWindow::Month),
        data::get_top_pages(client, dept),
        data::get_visitor_geo_figure(client, &state.cities, dept),
    );

    Ok(Json(DashboardResponse {
        department: dept.slug().to_string(),
        active_users: active_users.into(),
        monthly_visits: monthly_visits.into(),
        visits_today: visits_today.into(),
        top_downloads: top_downloads.into(),
        top_domains_7_days: top_domains_7_days.into(),
        top_domains_30_days: top_domains_30_days.into(),
        top_pages: top_pages.into(),
        visitor_locations: visitor_locations.into(),
    }))
}

async fn active_users_card(state: &AppState, dept: Department) -> Result<CardResponse, FetchError> {
    let value = data::get_active_users(&state.client, dept).await?;
    Ok(CardResponse {
        label: format!("people on {} sites right now", dept.card_label()),
        value,
    })
}

async fn monthly_card(
    state: &AppState,
    dept: Department,
    stat: TrafficStat,
) -> Result<CardResponse, FetchError> {
    let value = data::get_monthly_traffic(&state.client, dept, stat).await?;
    Ok(CardResponse {
        label: format!("total {stat} (past month)"),
        value,
    })
}

async fn visits_today_panel(state: &AppState, dept: Department) -> Result<SeriesPair, FetchError> {
    let series = data::get_visits_today(&state.client, dept).await?;
    Ok(data::drop_partial_hour(series))
}
