//! Debug protocol - JSON command/response definitions

use serde::{Deserialize, Serialize};

/// Commands accepted by the debug server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum DebugCommand {
    /// Ping (health check)
    Ping,
    /// Counters and timing of the latest pass
    GetStats,
    /// World positions of spawn candidates (at most `limit`)
    GetSpawnNodes {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    /// World positions of reachable cells (at most `limit`)
    GetReachableNodes {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    /// Active sensor configuration
    GetConfig,
}

/// Responses from debug server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum DebugResponse {
    #[serde(rename = "ok")]
    Ok { data: ResponseData },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Response data variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Pong { message: String },
    Stats(StatsInfo),
    Nodes {
        origin: [f32; 3],
        total: usize,
        positions: Vec<[f32; 3]>,
    },
    Config(ConfigInfo),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsInfo {
    pub passes: u64,
    pub skipped: u64,
    pub has_field: bool,
    pub origin: [f32; 3],
    pub reachable: usize,
    pub spawn_candidates: usize,
    pub los_queries: usize,
    pub last_pass_ms: f32,
    pub avg_pass_ms: f32,
    pub min_pass_ms: f32,
    pub max_pass_ms: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub resolution: f32,
    pub max_distance: f32,
    pub min_spawn_dist: f32,
    pub dead_zone: f32,
    pub refresh_delay: f32,
    pub refresh_interval_ms: u64,
}

impl DebugResponse {
    pub fn ok(data: ResponseData) -> Self {
        Self::Ok { data }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error {
            message: msg.into(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(ResponseData::Pong {
            message: "pong".into(),
        })
    }
}
