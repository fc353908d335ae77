pub mod app;
pub mod client;
pub mod config;
pub mod data;
pub mod departments;
pub mod errors;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod state;
pub mod ui;

pub use app::router;
pub use client::AnalyticsClient;
pub use config::Config;
pub use departments::Department;
pub use geo::{load_cities, CityTable};
pub use state::AppState;
