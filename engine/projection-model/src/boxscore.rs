use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Provider-specific game identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(pub String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Game status as reported by the schedule endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Scheduled,
    Live,
    Final,
    Unknown,
}

impl GameStatus {
    /// Only games that have started carry usable box-score data
    pub fn is_in_scope(&self) -> bool {
        matches!(self, GameStatus::Live | GameStatus::Final)
    }
}

/// One entry of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub status: GameStatus,
}

/// One player's raw stat line within a box score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLine {
    /// Canonical name as reported by the provider
    pub name: String,

    /// Raw provider stat keys (e.g., "hits", "totReb") to values
    pub stats: HashMap<String, f64>,
}

impl PlayerLine {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), stats: HashMap::new() }
    }

    /// Builder-style helper for assembling a stat line
    pub fn with_stat(mut self, key: impl Into<String>, value: f64) -> Self {
        self.stats.insert(key.into(), value);
        self
    }

    /// Raw stat value, with missing keys counting as zero
    pub fn stat(&self, key: &str) -> f64 {
        self.stats.get(key).copied().unwrap_or(0.0)
    }
}

/// Per-game box score, players kept in provider order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScoreRecord {
    pub game_id: GameId,
    pub players: Vec<PlayerLine>,
}

impl BoxScoreRecord {
    pub fn new(game_id: GameId) -> Self {
        Self { game_id, players: Vec::new() }
    }

    /// Append a player line, keeping the first line if the name repeats
    pub fn push(&mut self, line: PlayerLine) {
        if self.player(&line.name).is_none() {
            self.players.push(line);
        }
    }

    /// Player names in provider order
    pub fn player_names(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(|line| line.name.as_str())
    }

    /// Look up a stat line by exact canonical name
    pub fn player(&self, name: &str) -> Option<&PlayerLine> {
        self.players.iter().find(|line| line.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }
}
