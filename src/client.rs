use crate::config::Config;
use crate::departments::Department;
use crate::errors::FetchError;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, warn};

/// Feeds published under each department directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Realtime,
    Today,
    TrafficSources30Days,
    DownloadsYesterday,
    Domains7Days,
    Domains30Days,
    PagesRealtime,
    CitiesRealtime,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::Realtime,
        Endpoint::Today,
        Endpoint::TrafficSources30Days,
        Endpoint::DownloadsYesterday,
        Endpoint::Domains7Days,
        Endpoint::Domains30Days,
        Endpoint::PagesRealtime,
        Endpoint::CitiesRealtime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Realtime => "realtime",
            Endpoint::Today => "today",
            Endpoint::TrafficSources30Days => "top-traffic-sources-30-days",
            Endpoint::DownloadsYesterday => "top-downloads-yesterday",
            Endpoint::Domains7Days => "top-domains-7-days",
            Endpoint::Domains30Days => "top-domains-30-days",
            Endpoint::PagesRealtime => "top-pages-realtime",
            Endpoint::CitiesRealtime => "top-cities-realtime",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn feed_url(base_url: &str, dept: Department, endpoint: Endpoint) -> String {
    format!("{}/{}/{}.json", base_url.trim_end_matches('/'), dept.slug(), endpoint.name())
}

/// Thin wrapper over one shared `reqwest::Client`; one GET per call, no retry.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalyticsClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        dept: Department,
        endpoint: Endpoint,
    ) -> Result<(String, T), FetchError> {
        let url = feed_url(&self.base_url, dept, endpoint);
        debug!(%dept, %endpoint, "fetching feed");

        let response = self.http.get(&url).send().await.map_err(|source| {
            warn!(%dept, %endpoint, "feed request failed: {source}");
            FetchError::Request {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%dept, %endpoint, %status, "feed returned error status");
            return Err(FetchError::Status { url, status });
        }

        match response.json::<T>().await {
            Ok(body) => Ok((url, body)),
            Err(source) => {
                warn!(%dept, %endpoint, "feed body did not decode: {source}");
                Err(FetchError::Decode { url, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_substitutes_department_and_endpoint() {
        let dept: Department = "commerce".parse().unwrap();
        assert_eq!(
            feed_url("https://analytics.usa.gov/data/", dept, Endpoint::Domains7Days),
            "https://analytics.usa.gov/data/commerce/top-domains-7-days.json"
        );
    }

    #[test]
    fn every_department_and_endpoint_forms_a_feed_url() {
        for dept in Department::all() {
            for endpoint in Endpoint::ALL {
                let url = feed_url("http://upstream", dept, endpoint);
                assert_eq!(url, format!("http://upstream/{}/{}.json", dept.slug(), endpoint.name()));
            }
        }
    }
}
