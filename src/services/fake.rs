//! In-memory `RiotApi` for tests. Anything not registered answers 404.

use crate::error::ApiError;
use crate::models::types::{
    Account, LeagueEntry, MatchDto, MatchInfo, MatchMetadata, Participant, RiotId, Summoner,
    TraitDto, DOUBLE_UP_QUEUE,
};
use crate::services::api::RiotApi;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct FakeApi {
    accounts: HashMap<String, Result<String, u16>>,
    summoners: HashMap<String, Result<String, u16>>,
    leagues: HashMap<String, Vec<LeagueEntry>>,
    histories: HashMap<String, Result<Vec<String>, u16>>,
    matches: HashMap<String, MatchDto>,
    calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_player(mut self, riot_id: &str, puuid: &str, summoner_id: &str) -> Self {
        self.accounts
            .insert(riot_id.to_string(), Ok(puuid.to_string()));
        self.summoners
            .insert(puuid.to_string(), Ok(summoner_id.to_string()));
        self
    }

    /// Resolves the account but fails the summoner lookup.
    pub fn with_summoner_error(mut self, riot_id: &str, puuid: &str, status: u16) -> Self {
        self.accounts
            .insert(riot_id.to_string(), Ok(puuid.to_string()));
        self.summoners.insert(puuid.to_string(), Err(status));
        self
    }

    pub fn with_account_error(mut self, riot_id: &str, status: u16) -> Self {
        self.accounts.insert(riot_id.to_string(), Err(status));
        self
    }

    pub fn with_rank(mut self, summoner_id: &str, entries: Vec<LeagueEntry>) -> Self {
        self.leagues.insert(summoner_id.to_string(), entries);
        self
    }

    pub fn with_history(mut self, puuid: &str, match_ids: &[&str]) -> Self {
        let ids = match_ids.iter().map(|id| id.to_string()).collect();
        self.histories.insert(puuid.to_string(), Ok(ids));
        self
    }

    pub fn with_history_error(mut self, puuid: &str, status: u16) -> Self {
        self.histories.insert(puuid.to_string(), Err(status));
        self
    }

    pub fn with_match(mut self, match_id: &str, details: MatchDto) -> Self {
        self.matches.insert(match_id.to_string(), details);
        self
    }

    /// Total requests served, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RiotApi for FakeApi {
    async fn account_by_riot_id(&self, riot_id: &RiotId) -> Result<Account, ApiError> {
        self.hit();
        match self.accounts.get(&riot_id.to_string()) {
            Some(Ok(puuid)) => Ok(Account {
                puuid: puuid.clone(),
            }),
            Some(Err(status)) => Err(ApiError::Status(*status)),
            None => Err(ApiError::Status(404)),
        }
    }

    async fn summoner_by_puuid(&self, puuid: &str) -> Result<Summoner, ApiError> {
        self.hit();
        match self.summoners.get(puuid) {
            Some(Ok(id)) => Ok(Summoner { id: id.clone() }),
            Some(Err(status)) => Err(ApiError::Status(*status)),
            None => Err(ApiError::Status(404)),
        }
    }

    async fn league_entries(&self, summoner_id: &str) -> Result<Vec<LeagueEntry>, ApiError> {
        self.hit();
        self.leagues
            .get(summoner_id)
            .cloned()
            .ok_or(ApiError::Status(404))
    }

    async fn match_ids(&self, puuid: &str) -> Result<Vec<String>, ApiError> {
        self.hit();
        match self.histories.get(puuid) {
            Some(Ok(ids)) => Ok(ids.clone()),
            Some(Err(status)) => Err(ApiError::Status(*status)),
            None => Err(ApiError::Status(404)),
        }
    }

    async fn match_details(&self, match_id: &str) -> Result<MatchDto, ApiError> {
        self.hit();
        self.matches
            .get(match_id)
            .cloned()
            .ok_or(ApiError::Status(404))
    }
}

pub fn player(puuid: &str, placement: u8, traits: &[(&str, u32, u32)]) -> Participant {
    Participant {
        puuid: puuid.to_string(),
        placement,
        traits: traits
            .iter()
            .map(|(name, num_units, tier_current)| TraitDto {
                name: name.to_string(),
                num_units: *num_units,
                tier_current: *tier_current,
            })
            .collect(),
    }
}

pub fn match_dto(queue_id: i64, game_datetime: i64, players: Vec<Participant>) -> MatchDto {
    MatchDto {
        metadata: MatchMetadata {
            participants: players.iter().map(|p| p.puuid.clone()).collect(),
        },
        info: MatchInfo {
            queue_id,
            game_datetime,
            participants: players,
        },
    }
}

pub fn double_up(game_datetime: i64, players: Vec<Participant>) -> MatchDto {
    match_dto(DOUBLE_UP_QUEUE, game_datetime, players)
}
