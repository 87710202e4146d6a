use log::info;
use serde::Deserialize;

use crate::error::FetchError;

const DRAWS_API_BASE: &str = "https://api.www.svenskaspel.se/external/1/draw";

/// Which draw series to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    Stryktipset,
    Europatipset,
}

impl GameType {
    pub fn as_path(self) -> &'static str {
        match self {
            GameType::Stryktipset => "stryktipset",
            GameType::Europatipset => "europatipset",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrawsResponse {
    pub draws: Vec<Draw>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draw {
    pub draw_number: i64,
    pub reg_close_time: Option<String>,
    pub events: Vec<DrawEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawEvent {
    pub event_number: u32,
    pub event_description: String,
}

/// Client for the upstream draws API. One request per call, no retry,
/// no caching; latency is whatever the transport gives us.
pub struct DrawsClient {
    http: reqwest::Client,
    access_key: String,
}

impl DrawsClient {
    pub fn new(access_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_key,
        }
    }

    /// Fetch the current draws for a series.
    pub async fn get_draws(&self, game: GameType) -> Result<DrawsResponse, FetchError> {
        let url = format!("{}/{}/draws", DRAWS_API_BASE, game.as_path());
        info!("Fetching draws from {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("accesskey", self.access_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(FetchError::Decode)
    }
}
