//! Telemetry frame types.
//!
//! One [`Frame`] arrives per socket message. Player records carry a small
//! set of fields the session logic cares about (`m_idx`, `m_team`);
//! everything else (position, rotation, health, name, ...) is presentation
//! data that flows through untouched via the flattened `extra` map.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Faction derived from the wire team code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    /// Team code 2.
    Terrorists,
    /// Team code 3.
    CounterTerrorists,
    /// Any other code (spectator, unassigned).
    None,
}

impl Team {
    /// Maps the numeric wire code to a faction.
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Team::Terrorists,
            3 => Team::CounterTerrorists,
            _ => Team::None,
        }
    }
}

/// One player as delivered on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Unique index within a frame.
    #[serde(rename = "m_idx")]
    pub idx: u32,
    /// Numeric team code (2 = T, 3 = CT, anything else = neither).
    #[serde(rename = "m_team")]
    pub team: i32,
    /// Presentation fields (position, name, health, ...) passed through
    /// opaquely to the render layer.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PlayerRecord {
    /// Faction of this player.
    pub fn faction(&self) -> Team {
        Team::from_code(self.team)
    }
}

/// Outcome of a running defuse against the bomb timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefuseOutcome {
    /// The defuse finishes before the bomb detonates.
    Safe,
    /// The defuse cannot finish in time.
    TooLate,
}

/// Bomb state as delivered on the wire. Absent when no bomb is planted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BombState {
    /// Seconds until detonation.
    #[serde(rename = "m_blow_time")]
    pub blow_time: f32,
    /// Seconds remaining on the running defuse.
    #[serde(rename = "m_defuse_time")]
    pub defuse_time: f32,
    #[serde(rename = "m_is_defusing")]
    pub is_defusing: bool,
    #[serde(rename = "m_is_defused")]
    pub is_defused: bool,
}

impl BombState {
    /// True while the bomb is live: planted, ticking, and not yet defused.
    pub fn is_planted(&self) -> bool {
        self.blow_time > 0.0 && !self.is_defused
    }

    /// Whether the running defuse beats the detonation timer.
    /// `None` when nobody is defusing.
    pub fn defuse_outcome(&self) -> Option<DefuseOutcome> {
        if !self.is_defusing {
            return None;
        }
        if self.blow_time - self.defuse_time > 0.0 {
            Some(DefuseOutcome::Safe)
        } else {
            Some(DefuseOutcome::TooLate)
        }
    }
}

/// One decoded telemetry message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "m_players")]
    pub players: Vec<PlayerRecord>,
    /// Team code of the local (observing) player.
    #[serde(rename = "m_local_team")]
    pub local_team: i32,
    #[serde(rename = "m_bomb", default, skip_serializing_if = "Option::is_none")]
    pub bomb: Option<BombState>,
    /// Display-form map identifier.
    #[serde(rename = "m_map")]
    pub map: String,
    /// Path/raw-form map identifier; falls back to `m_map` when absent.
    #[serde(rename = "m_map_raw", default, skip_serializing_if = "Option::is_none")]
    pub map_raw: Option<String>,
}

impl Frame {
    /// Raw map identifier, defaulting to the display identifier.
    pub fn raw_map(&self) -> &str {
        self.map_raw.as_deref().unwrap_or(&self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame_json() -> &'static str {
        r#"{
            "m_players": [
                {"m_idx": 0, "m_team": 2, "m_name": "alice", "m_position": {"x": 1.0, "y": 2.0}},
                {"m_idx": 1, "m_team": 3, "m_name": "bob", "m_health": 87}
            ],
            "m_local_team": 3,
            "m_bomb": {
                "m_blow_time": 32.5,
                "m_defuse_time": 10.0,
                "m_is_defusing": true,
                "m_is_defused": false
            },
            "m_map": "de_mirage",
            "m_map_raw": "maps/de_mirage.vpk"
        }"#
    }

    #[test]
    fn decodes_full_frame() {
        let frame: Frame = serde_json::from_str(sample_frame_json()).unwrap();

        assert_eq!(frame.players.len(), 2);
        assert_eq!(frame.players[0].idx, 0);
        assert_eq!(frame.players[0].faction(), Team::Terrorists);
        assert_eq!(frame.players[1].faction(), Team::CounterTerrorists);
        assert_eq!(frame.local_team, 3);
        assert_eq!(frame.map, "de_mirage");
        assert_eq!(frame.raw_map(), "maps/de_mirage.vpk");

        let bomb = frame.bomb.unwrap();
        assert!(bomb.is_planted());
        assert_eq!(bomb.defuse_outcome(), Some(DefuseOutcome::Safe));
    }

    #[test]
    fn preserves_unknown_player_fields() {
        let frame: Frame = serde_json::from_str(sample_frame_json()).unwrap();

        assert_eq!(frame.players[0].extra["m_name"], "alice");
        assert_eq!(frame.players[0].extra["m_position"]["x"], 1.0);
        assert_eq!(frame.players[1].extra["m_health"], 87);
    }

    #[test]
    fn bomb_and_raw_map_are_optional() {
        let frame: Frame = serde_json::from_str(
            r#"{"m_players": [], "m_local_team": 2, "m_map": "de_dust2"}"#,
        )
        .unwrap();

        assert!(frame.bomb.is_none());
        assert!(frame.map_raw.is_none());
        assert_eq!(frame.raw_map(), "de_dust2");
    }

    #[test]
    fn team_codes_outside_factions_map_to_none() {
        assert_eq!(Team::from_code(0), Team::None);
        assert_eq!(Team::from_code(1), Team::None);
        assert_eq!(Team::from_code(5), Team::None);
    }

    #[test]
    fn defuse_outcome_too_late_when_timer_behind() {
        let bomb = BombState {
            blow_time: 4.0,
            defuse_time: 6.0,
            is_defusing: true,
            is_defused: false,
        };
        assert_eq!(bomb.defuse_outcome(), Some(DefuseOutcome::TooLate));

        let idle = BombState {
            is_defusing: false,
            ..bomb
        };
        assert_eq!(idle.defuse_outcome(), None);
    }

    #[test]
    fn defused_bomb_is_not_planted() {
        let bomb = BombState {
            blow_time: 12.0,
            defuse_time: 0.0,
            is_defusing: false,
            is_defused: true,
        };
        assert!(!bomb.is_planted());
    }
}
