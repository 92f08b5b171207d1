//! Double Up filtering and the numbers shown on the dashboard.

use crate::error::{ApiError, StatsError};
use crate::models::dashboard::{
    ActiveTrait, DuoGame, DuoStats, PlayerSummary, TopTraits, TraitCount, BUILT_DIFFERENT,
};
use crate::models::types::{
    DuoRequest, LeagueEntry, MatchDto, Participant, QueueId, RiotId, Server,
    DOUBLE_UP_RANKED_QUEUE,
};
use crate::services::api::RiotApi;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, error, info};

const UNRANKED: &str = "Unranked";
const FAVORITE_TRAITS_SHOWN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

impl Player {
    fn traits<'a>(&self, game: &'a DuoGame) -> &'a TopTraits {
        match self {
            Player::One => &game.player1_traits,
            Player::Two => &game.player2_traits,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WinSummary {
    pub total_games: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub best_streak: u32,
}

/// Drops the `TFT<set>_` prefix the API keeps on trait names.
pub fn strip_set_prefix(name: &str) -> &str {
    if let Some((prefix, rest)) = name.split_once('_') {
        if let Some(set) = prefix.strip_prefix("TFT") {
            let is_set = set.chars().next().is_some_and(|c| c.is_ascii_digit())
                && set.chars().all(|c| c.is_ascii_alphanumeric());
            if is_set && !rest.is_empty() {
                return rest;
            }
        }
    }
    name
}

pub fn extract_active_traits(participant: &Participant) -> Vec<ActiveTrait> {
    let mut traits: Vec<ActiveTrait> = participant
        .traits
        .iter()
        .filter(|t| t.tier_current > 0)
        .map(|t| ActiveTrait {
            name: strip_set_prefix(&t.name).to_string(),
            num_units: t.num_units,
            tier: t.tier_current,
        })
        .collect();
    traits.sort_by(|a, b| b.num_units.cmp(&a.num_units));
    traits
}

/// Traits with three or more units, falling back to pairs.
pub fn top_traits(active: &[ActiveTrait]) -> TopTraits {
    let pick = |min: u32| -> Vec<ActiveTrait> {
        active.iter().filter(|t| t.num_units >= min).cloned().collect()
    };
    let mut top = pick(3);
    if top.is_empty() {
        top = pick(2);
    }
    TopTraits(top)
}

/// Two players share a team, so individual places 1-2 are team 1st, etc.
pub fn team_placement(individual: u8) -> u8 {
    individual.saturating_add(1) / 2
}

pub fn format_rank(entries: &[LeagueEntry]) -> String {
    match entries.iter().find(|e| e.queue_type == DOUBLE_UP_RANKED_QUEUE) {
        Some(entry) => format!(
            "{} {} ({} LP)",
            title_case(&entry.tier),
            entry.rank,
            entry.league_points
        ),
        None => UNRANKED.to_string(),
    }
}

pub fn rank_label(lookup: Result<Vec<LeagueEntry>, ApiError>) -> String {
    match lookup {
        Ok(entries) => format_rank(&entries),
        Err(e) if e.status() == Some(404) => UNRANKED.to_string(),
        Err(e) => format!("{}: Error getting information about rank", e.status_label()),
    }
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn duo_game(match_id: &str, details: &MatchDto, puuid1: &str, puuid2: &str) -> Option<DuoGame> {
    if details.info.queue() != QueueId::DoubleUp {
        debug!("Match {} is not a Double Up game", match_id);
        return None;
    }
    if !details.metadata.participants.iter().any(|p| p == puuid2) {
        debug!("Match {} did not feature player 2", match_id);
        return None;
    }
    let (Some(player1), Some(player2)) = (
        details.info.participant(puuid1),
        details.info.participant(puuid2),
    ) else {
        error!("Match {} is missing participant data", match_id);
        return None;
    };
    let Some(played_at) = DateTime::<Utc>::from_timestamp_millis(details.info.game_datetime) else {
        error!("Match {} has an invalid game_datetime", match_id);
        return None;
    };

    Some(DuoGame {
        match_id: match_id.to_string(),
        played_at,
        placement: team_placement(player1.placement),
        player1_traits: top_traits(&extract_active_traits(player1)),
        player2_traits: top_traits(&extract_active_traits(player2)),
    })
}

/// All Double Up games in player 1's history that player 2 was part of,
/// newest first. An empty history is not an error.
pub async fn filter_double_up_games_together<A>(
    api: &A,
    puuid1: &str,
    puuid2: &str,
    concurrency: usize,
) -> Result<Vec<DuoGame>, ApiError>
where
    A: RiotApi + ?Sized,
{
    let match_ids = match api.match_ids(puuid1).await {
        Ok(ids) => ids,
        Err(e) if e.status() == Some(404) => Vec::new(),
        Err(e) => {
            error!("{}: Failed to get match history for player 1", e.status_label());
            return Err(e);
        }
    };
    if match_ids.is_empty() {
        info!("Player 1 has no TFT matches");
        return Ok(Vec::new());
    }

    info!("Analyzing {} matches for Double Up games...", match_ids.len());
    let fetched: Vec<(String, Result<MatchDto, ApiError>)> = stream::iter(match_ids)
        .map(|match_id| async move {
            let details = api.match_details(&match_id).await;
            (match_id, details)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut games: Vec<DuoGame> = fetched
        .into_iter()
        .filter_map(|(match_id, details)| match details {
            Ok(details) => duo_game(&match_id, &details, puuid1, puuid2),
            Err(e) => {
                error!("{}: Match details fetch err: {}", e.status_label(), match_id);
                None
            }
        })
        .collect();

    games.sort_by(|a, b| b.played_at.cmp(&a.played_at));
    info!("{} Double Up games with partner found", games.len());
    Ok(games)
}

/// Per game, every trait tied for the most units counts once. The three
/// most frequent win, ties broken alphabetically.
pub fn favorite_traits(games: &[DuoGame], player: Player) -> Vec<TraitCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for game in games {
        let traits = player.traits(game);
        let Some(max_units) = traits.iter().map(|t| t.num_units).max() else {
            *counts.entry(BUILT_DIFFERENT).or_default() += 1;
            continue;
        };
        for t in traits.iter().filter(|t| t.num_units == max_units) {
            *counts.entry(t.name.as_str()).or_default() += 1;
        }
    }

    let mut sorted: Vec<(&str, u32)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
        .into_iter()
        .take(FAVORITE_TRAITS_SHOWN)
        .map(|(name, count)| TraitCount {
            name: name.to_string(),
            count,
        })
        .collect()
}

/// `part / whole` as a percentage with one decimal. Exact halves round to
/// the even digit, so 1/16 is 6.2.
fn percent_one_decimal(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let scaled = u64::from(part) * 1000;
    let whole = u64::from(whole);
    let (mut tenths, rem) = (scaled / whole, scaled % whole);
    match (2 * rem).cmp(&whole) {
        Ordering::Greater => tenths += 1,
        Ordering::Equal if tenths % 2 == 1 => tenths += 1,
        _ => {}
    }
    tenths as f64 / 10.0
}

/// Expects `games` newest first, as returned by
/// [`filter_double_up_games_together`].
pub fn win_summary(games: &[DuoGame]) -> WinSummary {
    let total_games = games.len() as u32;
    let wins = games.iter().filter(|g| g.is_win()).count() as u32;
    let win_rate = percent_one_decimal(wins, total_games);

    let mut best_streak = 0;
    let mut current = 0;
    for game in games {
        if game.is_win() {
            current += 1;
            best_streak = best_streak.max(current);
        } else {
            current = 0;
        }
    }

    WinSummary {
        total_games,
        wins,
        win_rate,
        best_streak,
    }
}

fn account_error(err: ApiError, player: u8, riot_id: &RiotId, server: Server) -> StatsError {
    if err.is_not_found() {
        StatsError::PlayerNotFound {
            riot_id: riot_id.clone(),
            server,
        }
    } else if err.status() == Some(403) {
        StatsError::InvalidApiKey
    } else {
        StatsError::Account { player, source: err }
    }
}

fn summoner_error(err: ApiError, player: u8, riot_id: &RiotId, server: Server) -> StatsError {
    if err.is_not_found() {
        StatsError::PlayerNotFound {
            riot_id: riot_id.clone(),
            server,
        }
    } else {
        StatsError::Summoner { player, source: err }
    }
}

/// Everything the dashboard shows for two players and their Double Up
/// games together.
pub async fn get_stats<A>(
    api: &A,
    request: &DuoRequest,
    concurrency: usize,
) -> Result<DuoStats, StatsError>
where
    A: RiotApi + ?Sized,
{
    let DuoRequest {
        player1,
        player2,
        server,
    } = request;

    let (account1, account2) = futures::join!(
        api.account_by_riot_id(player1),
        api.account_by_riot_id(player2)
    );
    let puuid1 = account1
        .map_err(|e| account_error(e, 1, player1, *server))?
        .puuid;
    let puuid2 = account2
        .map_err(|e| account_error(e, 2, player2, *server))?
        .puuid;

    let (summoner1, summoner2) = futures::join!(
        api.summoner_by_puuid(&puuid1),
        api.summoner_by_puuid(&puuid2)
    );
    let summoner1 = summoner1.map_err(|e| summoner_error(e, 1, player1, *server))?;
    let summoner2 = summoner2.map_err(|e| summoner_error(e, 2, player2, *server))?;

    let (rank1, rank2) = futures::join!(
        api.league_entries(&summoner1.id),
        api.league_entries(&summoner2.id)
    );

    let games = filter_double_up_games_together(api, &puuid1, &puuid2, concurrency)
        .await
        .map_err(|source| StatsError::MatchHistory { source })?;

    let summary = win_summary(&games);
    let (favorites1, favorites2) = if games.is_empty() {
        info!("No Double Up games together found");
        (None, None)
    } else {
        (
            Some(favorite_traits(&games, Player::One)),
            Some(favorite_traits(&games, Player::Two)),
        )
    };

    Ok(DuoStats {
        player1: PlayerSummary {
            name: player1.game_name.clone(),
            tag: player1.tag_line.clone(),
            rank: Some(rank_label(rank1)),
            favorite_traits: favorites1,
        },
        player2: PlayerSummary {
            name: player2.game_name.clone(),
            tag: player2.tag_line.clone(),
            rank: Some(rank_label(rank2)),
            favorite_traits: favorites2,
        },
        total_games: summary.total_games,
        wins: summary.wins,
        win_rate: summary.win_rate,
        best_streak: summary.best_streak,
        match_history: games,
    })
}
