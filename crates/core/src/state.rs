//! The derived session snapshot consumed by the render layer.

use crate::resolver::ResolvedMap;
use crate::settings::Settings;
use radar_protocol::{BombState, PlayerRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Radar projection metadata fetched from `<map>/data.json`, tagged with
/// the canonical map it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    /// Canonical map this data belongs to. Not part of `data.json`; set
    /// by the fetcher from the resolved id.
    #[serde(default)]
    pub name: String,
    /// World-space x of the radar image origin.
    pub pos_x: f64,
    /// World-space y of the radar image origin.
    pub pos_y: f64,
    /// World units per radar pixel.
    pub scale: f64,
    /// Remaining metadata, passed through to the render layer.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Latest derived snapshot of the telemetry plus user settings.
///
/// Created empty at session start; player/team/bomb/map fields are
/// replaced wholesale on each decoded frame, settings incrementally on
/// edits. The session publishes clones of this value; the render layer
/// never mutates it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub players: Vec<PlayerRecord>,
    pub local_team: Option<i32>,
    pub bomb: Option<BombState>,
    /// `None` until the first frame arrives.
    pub map: Option<ResolvedMap>,
    /// Raw/path-form identifier from the last frame.
    pub map_raw: Option<String>,
    pub map_data: Option<MapData>,
    /// Average network latency in milliseconds.
    pub latency_ms: f64,
    pub settings: Settings,
}

impl SessionState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Fallback status message for the radar area when no map is drawn.
    pub fn status_line(&self) -> String {
        match &self.map {
            Some(ResolvedMap::Invalid) => match &self.map_raw {
                Some(raw) => format!("unknown map: {raw}"),
                None => "unknown map".to_string(),
            },
            _ => "connected, waiting for data".to_string(),
        }
    }
}
