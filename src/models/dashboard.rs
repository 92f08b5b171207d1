use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BUILT_DIFFERENT: &str = "Built Different";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTrait {
    pub name: String,
    pub num_units: u32,
    pub tier: u32,
}

/// The traits a player leaned on in one game, strongest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopTraits(pub Vec<ActiveTrait>);

impl TopTraits {
    pub fn iter(&self) -> impl Iterator<Item = &ActiveTrait> {
        self.0.iter()
    }
}

impl fmt::Display for TopTraits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(BUILT_DIFFERENT);
        }
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", t.num_units, t.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuoGame {
    pub match_id: String,
    pub played_at: DateTime<Utc>,
    /// Team placement, 1 through 4.
    pub placement: u8,
    pub player1_traits: TopTraits,
    pub player2_traits: TopTraits,
}

impl DuoGame {
    pub fn is_win(&self) -> bool {
        self.placement <= 2
    }

    pub fn local_datetime(&self) -> String {
        self.played_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCount {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub tag: String,
    pub rank: Option<String>,
    pub favorite_traits: Option<Vec<TraitCount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuoStats {
    pub player1: PlayerSummary,
    pub player2: PlayerSummary,
    pub total_games: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub best_streak: u32,
    pub match_history: Vec<DuoGame>,
}

impl DuoStats {
    /// Shown before anything has ever been fetched.
    pub fn placeholder() -> Self {
        let empty = |name: &str| PlayerSummary {
            name: name.to_string(),
            tag: String::new(),
            rank: None,
            favorite_traits: None,
        };
        Self {
            player1: empty("Player 1"),
            player2: empty("Player 2"),
            total_games: 0,
            wins: 0,
            win_rate: 0.0,
            best_streak: 0,
            match_history: Vec::new(),
        }
    }
}
