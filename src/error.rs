use crate::models::types::{RiotId, Server};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("invalid response body (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid url: {0}")]
    Url(String),
}

impl ApiError {
    /// HTTP status behind the failure, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status(code) => Some(*code),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Decode { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Url(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404) | Some(400))
    }

    pub fn status_label(&self) -> String {
        match self.status() {
            Some(code) => code.to_string(),
            None => "network".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("{riot_id} on {server} not found")]
    PlayerNotFound { riot_id: RiotId, server: Server },

    #[error("Expired/Invalid API key.")]
    InvalidApiKey,

    #[error("{}: Err getting acc info for player {player}", .source.status_label())]
    Account {
        player: u8,
        #[source]
        source: ApiError,
    },

    #[error("{}: Err getting smnr data for player {player}", .source.status_label())]
    Summoner {
        player: u8,
        #[source]
        source: ApiError,
    },

    #[error("{}: Err getting match history", .source.status_label())]
    MatchHistory {
        #[source]
        source: ApiError,
    },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set. Add it to your environment or .env file")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_errors_carry_the_status_code() {
        let err = StatsError::Account {
            player: 2,
            source: ApiError::Status(500),
        };
        assert_eq!(err.to_string(), "500: Err getting acc info for player 2");

        let err = StatsError::MatchHistory {
            source: ApiError::RateLimited { attempts: 3 },
        };
        assert_eq!(err.to_string(), "429: Err getting match history");
    }

    #[test]
    fn not_found_covers_bad_request() {
        assert!(ApiError::Status(404).is_not_found());
        assert!(ApiError::Status(400).is_not_found());
        assert!(!ApiError::Status(403).is_not_found());
        assert_eq!(ApiError::Url("x".into()).status_label(), "network");
    }

    #[test]
    fn player_not_found_message() {
        let err = StatsError::PlayerNotFound {
            riot_id: RiotId::new("Alpha", "NA1"),
            server: Server::NA,
        };
        assert_eq!(err.to_string(), "Alpha#NA1 on NA not found");
    }
}
