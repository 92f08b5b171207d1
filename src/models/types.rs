use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub const DOUBLE_UP_QUEUE: i64 = 1160;
pub const DOUBLE_UP_RANKED_QUEUE: &str = "RANKED_TFT_DOUBLE_UP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Server {
    NA,
    BR,
    LAN,
    LAS,
    EUW,
    EUNE,
    TR,
    KR,
    JP,
}

impl Server {
    /// Routing host used by the account and match endpoints.
    pub fn region(&self) -> &'static str {
        match self {
            Server::NA | Server::BR | Server::LAN | Server::LAS => "americas",
            Server::EUW | Server::EUNE | Server::TR => "europe",
            Server::KR | Server::JP => "asia",
        }
    }

    /// Platform host used by the summoner and league endpoints.
    pub fn platform(&self) -> &'static str {
        match self {
            Server::NA => "na1",
            Server::BR => "br1",
            Server::LAN => "la1",
            Server::LAS => "la2",
            Server::EUW => "euw1",
            Server::EUNE => "eun1",
            Server::TR => "tr1",
            Server::KR => "kr",
            Server::JP => "jp1",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Server::NA => "NA",
            Server::BR => "BR",
            Server::LAN => "LAN",
            Server::LAS => "LAS",
            Server::EUW => "EUW",
            Server::EUNE => "EUNE",
            Server::TR => "TR",
            Server::KR => "KR",
            Server::JP => "JP",
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Server {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NA" => Ok(Server::NA),
            "BR" => Ok(Server::BR),
            "LAN" => Ok(Server::LAN),
            "LAS" => Ok(Server::LAS),
            "EUW" => Ok(Server::EUW),
            "EUNE" => Ok(Server::EUNE),
            "TR" => Ok(Server::TR),
            "KR" => Ok(Server::KR),
            "JP" => Ok(Server::JP),
            _ => Err(format!("Invalid server: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RiotId {
    pub game_name: String,
    pub tag_line: String,
}

impl RiotId {
    pub fn new(game_name: impl Into<String>, tag_line: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            tag_line: tag_line.into(),
        }
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

impl FromStr for RiotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, tag) = s
            .rsplit_once('#')
            .ok_or_else(|| format!("Riot ID must look like name#tag, got '{}'", s))?;
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            return Err(format!("Riot ID must look like name#tag, got '{}'", s));
        }
        Ok(RiotId::new(name, tag))
    }
}

/// Two players and the server they play on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuoRequest {
    pub player1: RiotId,
    pub player2: RiotId,
    pub server: Server,
}

#[derive(Debug, PartialEq, Eq)]
pub enum QueueId {
    DoubleUp,
    NotInterested,
}

impl From<i64> for QueueId {
    fn from(id: i64) -> Self {
        match id {
            DOUBLE_UP_QUEUE => QueueId::DoubleUp,
            _ => QueueId::NotInterested,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub puuid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Summoner {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntry {
    pub queue_type: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub league_points: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchDto {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchMetadata {
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchInfo {
    #[serde(default)]
    pub queue_id: i64,
    pub game_datetime: i64,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl MatchInfo {
    pub fn queue(&self) -> QueueId {
        QueueId::from(self.queue_id)
    }

    pub fn participant(&self, puuid: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.puuid == puuid)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    pub puuid: String,
    pub placement: u8,
    #[serde(default)]
    pub traits: Vec<TraitDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraitDto {
    pub name: String,
    pub num_units: u32,
    #[serde(default)]
    pub tier_current: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_parses_case_insensitively() {
        let server: Server = "euw".parse().unwrap();
        assert_eq!(server, Server::EUW);
        assert_eq!(server.region(), "europe");
        assert_eq!(server.platform(), "euw1");
        assert_eq!(Server::LAS.platform(), "la2");
        assert_eq!(Server::JP.region(), "asia");
    }

    #[test]
    fn unknown_server_is_rejected() {
        let err = "OCE".parse::<Server>().unwrap_err();
        assert_eq!(err, "Invalid server: OCE");
    }

    #[test]
    fn riot_id_splits_on_last_hash() {
        let id: RiotId = "Some#Name#EUW".parse().unwrap();
        assert_eq!(id.game_name, "Some#Name");
        assert_eq!(id.tag_line, "EUW");
        assert_eq!(id.to_string(), "Some#Name#EUW");

        assert!("NoTag".parse::<RiotId>().is_err());
        assert!("Name#".parse::<RiotId>().is_err());
    }

    #[test]
    fn match_payload_ignores_unknown_fields() {
        let raw = r#"{
            "metadata": {"match_id": "NA1_1", "participants": ["a", "b"]},
            "info": {
                "queue_id": 1160,
                "game_datetime": 1733000000000,
                "tft_set_number": 13,
                "participants": [
                    {"puuid": "a", "placement": 3, "level": 8,
                     "traits": [{"name": "TFT13_Sentinel", "num_units": 4, "tier_current": 2, "style": 2}]}
                ]
            }
        }"#;
        let parsed: MatchDto = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.info.queue(), QueueId::DoubleUp);
        assert_eq!(parsed.info.participant("a").unwrap().placement, 3);
        assert!(parsed.info.participant("b").is_none());
    }
}
