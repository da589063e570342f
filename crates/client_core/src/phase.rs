//! Phase sequencing rules: the declared transition table and the
//! reconciliation of locally-intended transitions against the phase the
//! server actually reported.
//!
//! The table expresses which edges are legal and which screen the client
//! *expects* next; it never overrides the server. After every sync the
//! session resolves the transition purely from the
//! `(current phase, reported phase)` pair, so an event name reused on two
//! edges from the same state can never pick the wrong one.

use shared::domain::Phase;

/// A locally-originated trigger that can end the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// Lobby poll observed the game start.
    EnterSurvey,
    /// The single forward action of the current screen (confirm a site,
    /// answer no, stop drilling, leave wells or score).
    Advance,
    /// Report answered yes: proceed to drilling.
    ConfirmYes,
    /// Resume entry into an in-progress game, straight to the phase the
    /// server reports.
    DirectJump(Phase),
}

/// The declared transition table. `None` means the event is not legal in
/// `from`.
pub fn expected_next(from: Phase, event: PhaseEvent) -> Option<Phase> {
    match (from, event) {
        (Phase::Lobby, PhaseEvent::EnterSurvey) => Some(Phase::Survey),
        (Phase::Lobby, PhaseEvent::DirectJump(to)) => Some(to),
        (Phase::Survey, PhaseEvent::Advance) => Some(Phase::Report),
        (Phase::Report, PhaseEvent::ConfirmYes) => Some(Phase::Drill),
        (Phase::Report, PhaseEvent::Advance) => Some(Phase::Wells),
        (Phase::Drill, PhaseEvent::Advance) => Some(Phase::Wells),
        (Phase::Wells, PhaseEvent::Advance) => Some(Phase::Score),
        (Phase::Score, PhaseEvent::Advance) => Some(Phase::Survey),
        _ => None,
    }
}

/// Whether `from -> to` appears in the declared table.
pub fn declared_edge(from: Phase, to: Phase) -> bool {
    match from {
        Phase::Lobby => to != Phase::Lobby,
        Phase::Survey => to == Phase::Report,
        Phase::Report => to == Phase::Drill || to == Phase::Wells,
        Phase::Drill => to == Phase::Wells,
        Phase::Wells => to == Phase::Score,
        Phase::Score => to == Phase::Survey,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server kept us on the current screen; state is replaced, no
    /// transition fires.
    Stay,
    /// Exit the current phase and enter the reported one.
    Transition(Phase),
}

/// Verdict of comparing the client's expectation against the server's
/// reported phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub outcome: Outcome,
    /// The server chose a different phase than the client intended.
    pub divergent: bool,
    /// The reported phase is not a declared edge from the current one.
    /// Logged as an anomaly by the caller; the server is trusted anyway.
    pub undeclared: bool,
}

/// The reconciliation rule: the reported phase always wins.
pub fn reconcile(current: Phase, expected: Phase, reported: Phase) -> Reconciled {
    let outcome = if reported == current {
        Outcome::Stay
    } else {
        Outcome::Transition(reported)
    };
    Reconciled {
        outcome,
        divergent: reported != expected,
        undeclared: reported != current && !declared_edge(current, reported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_events_reach_declared_targets() {
        let table = [
            (Phase::Lobby, PhaseEvent::EnterSurvey, Phase::Survey),
            (Phase::Survey, PhaseEvent::Advance, Phase::Report),
            (Phase::Report, PhaseEvent::ConfirmYes, Phase::Drill),
            (Phase::Report, PhaseEvent::Advance, Phase::Wells),
            (Phase::Drill, PhaseEvent::Advance, Phase::Wells),
            (Phase::Wells, PhaseEvent::Advance, Phase::Score),
            (Phase::Score, PhaseEvent::Advance, Phase::Survey),
        ];
        for (from, event, to) in table {
            assert_eq!(expected_next(from, event), Some(to), "{from:?} {event:?}");
            assert!(declared_edge(from, to), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn direct_jump_resumes_into_any_phase() {
        for to in [
            Phase::Survey,
            Phase::Report,
            Phase::Drill,
            Phase::Wells,
            Phase::Score,
        ] {
            assert_eq!(
                expected_next(Phase::Lobby, PhaseEvent::DirectJump(to)),
                Some(to)
            );
            assert!(declared_edge(Phase::Lobby, to));
        }
    }

    #[test]
    fn undeclared_events_have_no_target() {
        assert_eq!(expected_next(Phase::Survey, PhaseEvent::ConfirmYes), None);
        assert_eq!(expected_next(Phase::Drill, PhaseEvent::EnterSurvey), None);
        assert_eq!(
            expected_next(Phase::Score, PhaseEvent::DirectJump(Phase::Drill)),
            None
        );
    }

    #[test]
    fn matching_report_fires_the_intended_transition() {
        let verdict = reconcile(Phase::Survey, Phase::Report, Phase::Report);
        assert_eq!(verdict.outcome, Outcome::Transition(Phase::Report));
        assert!(!verdict.divergent);
        assert!(!verdict.undeclared);
    }

    #[test]
    fn server_reported_phase_wins_over_local_intent() {
        // a drill attempt the server decided to end early
        let verdict = reconcile(Phase::Drill, Phase::Drill, Phase::Wells);
        assert_eq!(verdict.outcome, Outcome::Transition(Phase::Wells));
        assert!(verdict.divergent);
        assert!(!verdict.undeclared);
    }

    #[test]
    fn unreachable_reported_phase_is_flagged_but_followed() {
        let verdict = reconcile(Phase::Survey, Phase::Report, Phase::Score);
        assert_eq!(verdict.outcome, Outcome::Transition(Phase::Score));
        assert!(verdict.divergent);
        assert!(verdict.undeclared);
    }

    #[test]
    fn unchanged_phase_stays_without_transition() {
        let verdict = reconcile(Phase::Drill, Phase::Drill, Phase::Drill);
        assert_eq!(verdict.outcome, Outcome::Stay);
        assert!(!verdict.divergent);
    }
}
