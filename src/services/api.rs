use crate::config::Config;
use crate::error::ApiError;
use crate::models::types::{Account, LeagueEntry, MatchDto, RiotId, Server, Summoner};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(5);

/// The slice of the Riot API this tool reads from.
#[async_trait]
pub trait RiotApi: Send + Sync {
    async fn account_by_riot_id(&self, riot_id: &RiotId) -> Result<Account, ApiError>;

    async fn summoner_by_puuid(&self, puuid: &str) -> Result<Summoner, ApiError>;

    async fn league_entries(&self, summoner_id: &str) -> Result<Vec<LeagueEntry>, ApiError>;

    async fn match_ids(&self, puuid: &str) -> Result<Vec<String>, ApiError>;

    async fn match_details(&self, match_id: &str) -> Result<MatchDto, ApiError>;
}

#[derive(Debug, Clone)]
pub struct RiotClient {
    http: Client,
    api_key: String,
    server: Server,
    base_url: Option<String>,
    since: DateTime<Utc>,
    match_count: u32,
    max_retries: u32,
}

impl RiotClient {
    pub fn new(config: &Config, server: Server) -> Self {
        Self {
            http: Client::new(),
            api_key: config.riot_api_key.clone(),
            server,
            base_url: config.base_url.clone(),
            since: config.since,
            match_count: config.match_count,
            max_retries: config.max_rate_limit_retries,
        }
    }

    fn regional(&self, segments: &[&str]) -> Result<Url, ApiError> {
        self.build_url(self.server.region(), segments)
    }

    fn platform(&self, segments: &[&str]) -> Result<Url, ApiError> {
        self.build_url(self.server.platform(), segments)
    }

    /// Every segment is pushed individually so names with spaces or
    /// non-ascii characters get percent-encoded.
    fn build_url(&self, host: &str, segments: &[&str]) -> Result<Url, ApiError> {
        let base = match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{}.api.riotgames.com", host),
        };
        let mut url = Url::parse(&base).map_err(|e| ApiError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(format!("{} cannot be a base", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(%url, attempts, "GET");
            let response = self
                .http
                .get(url.clone())
                .header("X-Riot-Token", &self.api_key)
                .send()
                .await
                .map_err(ApiError::Transport)?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts > self.max_retries {
                    warn!(%url, attempts, "rate limit retries exhausted");
                    return Err(ApiError::RateLimited { attempts });
                }
                let wait = rate_limit_wait(response.headers());
                info!("Rate limit exceeded. Waiting {} seconds...", wait.as_secs());
                sleep(wait).await;
                continue;
            }
            if !status.is_success() {
                warn!(%url, status = status.as_u16(), "request failed");
                return Err(ApiError::Status(status.as_u16()));
            }
            return response.json().await.map_err(|source| ApiError::Decode {
                status: status.as_u16(),
                source,
            });
        }
    }
}

fn rate_limit_wait(headers: &HeaderMap) -> Duration {
    retry_after(headers).unwrap_or(RATE_LIMIT_BACKOFF)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl RiotApi for RiotClient {
    async fn account_by_riot_id(&self, riot_id: &RiotId) -> Result<Account, ApiError> {
        info!("Looking up player: {}", riot_id);
        let url = self.regional(&[
            "riot",
            "account",
            "v1",
            "accounts",
            "by-riot-id",
            &riot_id.game_name,
            &riot_id.tag_line,
        ])?;
        self.get_json(url).await
    }

    async fn summoner_by_puuid(&self, puuid: &str) -> Result<Summoner, ApiError> {
        info!("Looking up summoner data...");
        let url = self.platform(&["tft", "summoner", "v1", "summoners", "by-puuid", puuid])?;
        self.get_json(url).await
    }

    async fn league_entries(&self, summoner_id: &str) -> Result<Vec<LeagueEntry>, ApiError> {
        info!("Looking up TFT league data...");
        let url = self.platform(&["tft", "league", "v1", "entries", "by-summoner", summoner_id])?;
        self.get_json(url).await
    }

    async fn match_ids(&self, puuid: &str) -> Result<Vec<String>, ApiError> {
        info!("Fetching TFT match history since {}...", self.since.format("%Y-%m-%d"));
        let mut url = self.regional(&["tft", "match", "v1", "matches", "by-puuid", puuid, "ids"])?;
        url.query_pairs_mut()
            .append_pair("start", "0")
            .append_pair("count", &self.match_count.to_string())
            .append_pair("startTime", &self.since.timestamp().to_string());
        self.get_json(url).await
    }

    async fn match_details(&self, match_id: &str) -> Result<MatchDto, ApiError> {
        debug!("Fetching TFT match details for {}...", match_id);
        let url = self.regional(&["tft", "match", "v1", "matches", match_id])?;
        self.get_json(url).await
    }
}
