//! Phase-scoped input routing: maps device-independent keys to the
//! semantic actions of the active screen. The binding set is replaced
//! wholesale on every phase transition so a stale binding from a previous
//! screen can never fire.

use std::collections::HashMap;

use shared::domain::Phase;

use crate::grid::JUMP_STEP;

/// A key press, already lifted out of whatever input library produced it.
/// The application layer owns the mapping from raw device events to this
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    ShiftUp,
    ShiftDown,
    ShiftLeft,
    ShiftRight,
    Tab,
    BackTab,
    Enter,
    Space,
    Char(char),
}

/// A semantic action of the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveCursor { dy: i64, dx: i64 },
    CycleView(i64),
    Confirm,
    AnswerYes,
    AnswerNo,
    Advance,
    Quit,
}

impl Action {
    /// Navigation actions mutate client-local state only; everything else
    /// issues a sync round trip.
    pub fn issues_sync(self) -> bool {
        !matches!(self, Action::MoveCursor { .. } | Action::CycleView(_))
    }
}

#[derive(Debug, Default)]
pub struct InputRouter {
    bindings: HashMap<Key, Action>,
    suspended: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs exactly the binding set of `phase`, discarding whatever
    /// the previous screen had bound, and re-arms the router.
    pub fn rebind(&mut self, phase: Phase) {
        self.bindings = bindings_for(phase);
        self.suspended = false;
    }

    /// Unbinds everything. Called from every exit hook before the next
    /// enter hook installs its own set.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.suspended = false;
    }

    /// Resolves a key press to the bound action, if any. While a sync is
    /// in flight the router is suspended and sync-issuing bindings resolve
    /// to nothing; the triggering action must be re-pressed once the
    /// response settles.
    pub fn resolve(&self, key: Key) -> Option<Action> {
        let action = self.bindings.get(&key).copied()?;
        if self.suspended && action.issues_sync() {
            return None;
        }
        Some(action)
    }

    /// Disarms sync-issuing bindings for the duration of an in-flight
    /// request.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Whether the host input layer should swallow the device's default
    /// behavior for this key (page scroll on arrows, focus moves on tab).
    pub fn suppresses_default(&self, key: Key) -> bool {
        matches!(
            self.bindings.get(&key),
            Some(Action::MoveCursor { .. } | Action::CycleView(_))
        )
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}

fn bindings_for(phase: Phase) -> HashMap<Key, Action> {
    let mut bindings = HashMap::new();
    match phase {
        Phase::Lobby => {
            // the game owner starts the game; everyone else's press is
            // ignored server-side
            bindings.insert(Key::Space, Action::Advance);
        }
        Phase::Survey => {
            bindings.insert(Key::Up, Action::MoveCursor { dy: -1, dx: 0 });
            bindings.insert(Key::Down, Action::MoveCursor { dy: 1, dx: 0 });
            bindings.insert(Key::Left, Action::MoveCursor { dy: 0, dx: -1 });
            bindings.insert(Key::Right, Action::MoveCursor { dy: 0, dx: 1 });
            bindings.insert(
                Key::ShiftUp,
                Action::MoveCursor {
                    dy: -JUMP_STEP,
                    dx: 0,
                },
            );
            bindings.insert(
                Key::ShiftDown,
                Action::MoveCursor {
                    dy: JUMP_STEP,
                    dx: 0,
                },
            );
            bindings.insert(
                Key::ShiftLeft,
                Action::MoveCursor {
                    dy: 0,
                    dx: -JUMP_STEP,
                },
            );
            bindings.insert(
                Key::ShiftRight,
                Action::MoveCursor {
                    dy: 0,
                    dx: JUMP_STEP,
                },
            );
            bindings.insert(Key::Tab, Action::CycleView(1));
            bindings.insert(Key::BackTab, Action::CycleView(-1));
            bindings.insert(Key::Enter, Action::Confirm);
        }
        Phase::Report => {
            bindings.insert(Key::Char('y'), Action::AnswerYes);
            bindings.insert(Key::Char('n'), Action::AnswerNo);
        }
        Phase::Drill => {
            bindings.insert(Key::Space, Action::Advance);
            bindings.insert(Key::Char('q'), Action::Quit);
        }
        Phase::Wells | Phase::Score => {
            bindings.insert(Key::Space, Action::Advance);
        }
    }
    bindings
}
