use serde::{Deserialize, Serialize, Serializer};

use crate::domain::{Phase, SiteId};

/// Lobby status, polled until the game begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbySnapshot {
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub players: Vec<String>,
}

/// One drilled site with its economics breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellRecord {
    pub site: SiteId,
    #[serde(default)]
    pub depth: i64,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub tax: i64,
    #[serde(default)]
    pub income: i64,
    #[serde(default)]
    pub pnl: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold: Option<bool>,
}

/// The server-authoritative game state, replaced wholesale on every sync.
///
/// `name` is always present and drives phase reconciliation. Every other
/// field is phase-dependent; the server omits what the current screen does
/// not need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub name: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(default)]
    pub week: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteId>,
    #[serde(default)]
    pub prob: Vec<i64>,
    #[serde(default)]
    pub cost: Vec<i64>,
    #[serde(default)]
    pub tax: Vec<i64>,
    #[serde(default)]
    pub oil: Vec<i64>,
    #[serde(default)]
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wells: Option<Vec<WellRecord>>,
}

impl GameState {
    /// The per-site data layers carried by this state, by wire name.
    /// Absent layers are empty slices.
    pub fn site_arrays(&self) -> [(&'static str, &[i64]); 4] {
        [
            ("prob", self.prob.as_slice()),
            ("cost", self.cost.as_slice()),
            ("tax", self.tax.as_slice()),
            ("oil", self.oil.as_slice()),
        ]
    }
}

/// A move the player submits to the server.
///
/// The wire format is a bare integer: `-1` is the no-op sentinel (advance,
/// quit, start), `0`/`1` answer no/yes, and any other value is a site
/// index. The meaning of each integer depends on the server-side phase, so
/// this type exists to keep the ambiguity out of everything above the
/// serializer. Deliberately not `Deserialize`: the integer form cannot be
/// decoded back into a variant without knowing the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    NoOp,
    SiteChoice(SiteId),
    Answer(bool),
}

pub const WIRE_NO_OP: i64 = -1;
pub const WIRE_ANSWER_NO: i64 = 0;
pub const WIRE_ANSWER_YES: i64 = 1;

impl PlayerAction {
    pub fn wire_value(self) -> i64 {
        match self {
            PlayerAction::NoOp => WIRE_NO_OP,
            PlayerAction::SiteChoice(site) => site.0,
            PlayerAction::Answer(false) => WIRE_ANSWER_NO,
            PlayerAction::Answer(true) => WIRE_ANSWER_YES,
        }
    }
}

impl Serialize for PlayerAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.wire_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_action_serializes_to_bare_integers() {
        assert_eq!(serde_json::to_string(&PlayerAction::NoOp).unwrap(), "-1");
        assert_eq!(
            serde_json::to_string(&PlayerAction::Answer(false)).unwrap(),
            "0"
        );
        assert_eq!(
            serde_json::to_string(&PlayerAction::Answer(true)).unwrap(),
            "1"
        );
        assert_eq!(
            serde_json::to_string(&PlayerAction::SiteChoice(SiteId(1840))).unwrap(),
            "1840"
        );
    }

    #[test]
    fn phase_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Phase::Lobby).unwrap(), "\"lobby\"");
        assert_eq!(serde_json::to_string(&Phase::Score).unwrap(), "\"score\"");
        let phase: Phase = serde_json::from_str("\"drill\"").unwrap();
        assert_eq!(phase, Phase::Drill);
    }

    #[test]
    fn decodes_survey_state_with_omitted_fields() {
        let raw = r#"{
            "name": "survey",
            "week": 3,
            "price": 97,
            "prob": [50, 50],
            "cost": [10, 10],
            "tax": [100, 100],
            "oil": [0, 0],
            "fact": "The Corsicana oilfield peaked in 1900."
        }"#;
        let state: GameState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.name, Phase::Survey);
        assert_eq!(state.week, 3);
        assert_eq!(state.site, None);
        assert!(state.wells.is_none());
        assert!(state.site_arrays().iter().all(|(_, a)| a.len() == 2));
    }

    #[test]
    fn decodes_wells_state_with_deed_records() {
        let raw = r#"{
            "name": "wells",
            "player": "bob",
            "week": 2,
            "price": 101,
            "wells": [
                {"site": 120, "depth": 300, "cost": 30, "tax": 250, "income": 4040, "pnl": 3760, "week": 1, "sold": false}
            ]
        }"#;
        let state: GameState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.name, Phase::Wells);
        let wells = state.wells.expect("wells");
        assert_eq!(wells.len(), 1);
        assert_eq!(wells[0].site, SiteId(120));
        assert_eq!(wells[0].pnl, 3760);
        assert_eq!(wells[0].sold, Some(false));
    }
}
