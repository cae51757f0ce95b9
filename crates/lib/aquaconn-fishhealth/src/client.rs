use std::env;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use aquaconn_core::site::SiteId;

use crate::error::{FishHealthError, Result};
use crate::models::{
    LiceSeries, LocalityWeek, LocalityWeekList, TemperatureSeries, TemperatureWeek, TokenResponse,
};

pub const TOKEN_URL: &str = "https://id.barentswatch.no/connect/token";
pub const API_URL: &str = "https://www.barentswatch.no/bwapi";
pub const CLIENT_ID: &str = "BW_CLIENT_ID";
pub const CLIENT_SECRET: &str = "BW_CLIENT_SECRET";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let get = |name: &'static str| {
            env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .ok_or(FishHealthError::MissingEnv(name))
        };
        Ok(Self {
            client_id: get(CLIENT_ID)?,
            client_secret: get(CLIENT_SECRET)?,
        })
    }
}

/// Read-only client for the fish-health part of the BarentsWatch API.
#[derive(Debug, Clone)]
pub struct FishHealthClient {
    http: Client,
    api_url: String,
    token: String,
}

impl FishHealthClient {
    /// Fetches a client-credentials token and returns a client that uses it.
    pub fn connect(credentials: &Credentials) -> Result<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        let token = fetch_token(&http, TOKEN_URL, credentials)?;
        info!("Got an access token for the fish-health API");
        Ok(Self::with_token(http, API_URL, token))
    }

    pub fn with_token(http: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn temperature_url(&self, site_id: SiteId, year: i32) -> String {
        format!(
            "{}/v1/geodata/fishhealth/locality/{}/seatemperature/{}",
            self.api_url, site_id, year
        )
    }

    pub fn lice_url(&self, site_id: SiteId, year: i32) -> String {
        format!(
            "{}/v1/geodata/fishhealth/locality/{}/avgfemalelice/{}",
            self.api_url, site_id, year
        )
    }

    pub fn localities_url(&self, year: i32, week: u32) -> String {
        format!(
            "{}/v1/geodata/fishhealth/locality/{}/{}",
            self.api_url, year, week
        )
    }

    /// Weekly sea temperatures. A rejected request gives an empty series.
    pub fn sea_temperature(&self, site_id: SiteId, year: i32) -> Result<Vec<TemperatureWeek>> {
        let series: Option<TemperatureSeries> = self.get_json(&self.temperature_url(site_id, year))?;
        Ok(series.map(|series| series.data).unwrap_or_default())
    }

    /// Weekly average adult female lice. A rejected request gives an empty series.
    pub fn female_lice(&self, site_id: SiteId, year: i32) -> Result<LiceSeries> {
        let series: Option<LiceSeries> = self.get_json(&self.lice_url(site_id, year))?;
        Ok(series.unwrap_or_default())
    }

    /// All localities reported for the week, sorted by name. A rejected request gives an
    /// empty list.
    pub fn localities(&self, year: i32, week: u32) -> Result<Vec<LocalityWeek>> {
        let list: Option<LocalityWeekList> = self.get_json(&self.localities_url(year, week))?;
        let mut localities = list.map(|list| list.localities).unwrap_or_default();
        localities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(localities)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        debug!("GET {}", url);
        let response = self.http.get(url).bearer_auth(&self.token).send()?;
        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}, treating it as no data", url, status);
            return Ok(None);
        }
        let body = response.text()?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}

pub fn fetch_token(http: &Client, token_url: &str, credentials: &Credentials) -> Result<String> {
    let form = [
        ("client_id", credentials.client_id.as_str()),
        ("scope", "api"),
        ("client_secret", credentials.client_secret.as_str()),
        ("grant_type", "client_credentials"),
    ];
    let response = http.post(token_url).form(&form).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FishHealthError::TokenRejected {
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        });
    }
    let token: TokenResponse = response.json()?;
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let client = FishHealthClient::with_token(Client::new(), "https://api.example.org/bw/", "t");
        assert_eq!(
            client.temperature_url(SiteId::from(30560), 2023),
            "https://api.example.org/bw/v1/geodata/fishhealth/locality/30560/seatemperature/2023"
        );
        assert_eq!(
            client.lice_url(SiteId::from(30560), 2023),
            "https://api.example.org/bw/v1/geodata/fishhealth/locality/30560/avgfemalelice/2023"
        );
        assert_eq!(
            client.localities_url(2024, 18),
            "https://api.example.org/bw/v1/geodata/fishhealth/locality/2024/18"
        );
    }
}
