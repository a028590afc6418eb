use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const STATUS_POLL_INTERVAL_MS: u64 = 2000;
pub const TICK_INTERVAL_MS: u64 = 250;
pub const RECORDED_FLASH_MS: u64 = 1000;
pub const MIN_PLAYERS_TO_LAUNCH: u32 = 2;

// ── Bracket document types ─────────────────────────────────────────────

/// Raw `/bracket_data` payload. `stages` and `participants` are carried
/// opaquely; only `matches` is consumed by rendering, and it stays a
/// `Value` so an absent or non-array field is an invalid document rather
/// than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BracketDocument {
    #[serde(default)]
    pub stages: Value,
    #[serde(default)]
    pub participants: Value,
    #[serde(default)]
    pub matches: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BracketMatch {
    pub id: Option<u64>,
    pub round: Option<i64>,
    pub opponent1: Option<Opponent>,
    pub opponent2: Option<Opponent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Opponent {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub result: Option<String>,
}

// ── Server payload types ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub started: bool,
    pub started_at: Option<String>,
    #[serde(default)]
    pub player_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerEntry {
    pub username: String,
    pub joined: Option<String>,
    pub ip: Option<String>,
    pub port: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoresHistoryPayload {
    #[serde(default)]
    pub scores: Vec<(String, i64)>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub player1: String,
    #[serde(default)]
    pub player2: String,
    pub timestamp: Option<String>,
    pub winner: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub losses: i64,
    #[serde(rename = "avgTime", default)]
    pub avg_time: Value,
    #[serde(default)]
    pub history: Vec<ProfileHistoryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileHistoryEntry {
    #[serde(default)]
    pub opponent: String,
    #[serde(default)]
    pub result: String,
}

// ── Config types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub server_url: String,
    pub status_poll_ms: u64,
    pub request_log: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            status_poll_ms: STATUS_POLL_INTERVAL_MS,
            request_log: true,
        }
    }
}
