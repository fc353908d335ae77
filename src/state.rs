use crate::client::AnalyticsClient;
use crate::geo::CityTable;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub client: AnalyticsClient,
    pub cities: Arc<CityTable>,
}

impl AppState {
    pub fn new(client: AnalyticsClient, cities: CityTable) -> Self {
        Self {
            client,
            cities: Arc::new(cities),
        }
    }
}
