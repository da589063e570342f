//! The session controller: owns the authoritative state, the cursor and
//! view fields, and the input router, and threads every player action
//! through sync and reconciliation. One controller per player per game;
//! no state lives outside it.

use std::time::Duration;

use shared::{
    domain::{Phase, SiteId},
    protocol::{GameState, PlayerAction},
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    grid::{self, ViewLayer},
    input::{Action, InputRouter, Key},
    phase::{self, Outcome, PhaseEvent},
    SyncApi, SyncError,
};

/// How often the lobby status endpoint is polled until the game starts.
pub const LOBBY_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Rendering surface. The controller calls exactly one `show_*` per screen
/// refresh; everything about layout, color, and chart projection is the
/// implementor's business.
pub trait Presenter: Send {
    fn show_lobby(&mut self, players: &[String]);
    fn show_survey(&mut self, state: &GameState, cursor: SiteId, layer: ViewLayer);
    fn show_report(&mut self, state: &GameState);
    fn show_drill(&mut self, state: &GameState);
    fn show_wells(&mut self, state: &GameState);
    fn show_score(&mut self, state: &GameState);
    fn hide(&mut self, phase: Phase);
    fn notice(&mut self, message: &str);
}

/// An entry hook's immediate data fetch: issued right after the phase is
/// entered, reconciled like any other sync.
struct EntrySync {
    expected: Phase,
    action: PlayerAction,
}

pub struct GameSession<S, P> {
    sync: S,
    presenter: P,
    router: InputRouter,
    phase: Phase,
    /// Bumped on every transition; a resolved sync whose issue-time epoch
    /// no longer matches is stale and discarded unapplied.
    epoch: u64,
    state: Option<GameState>,
    cursor: SiteId,
    view: ViewLayer,
    /// The site confirmed in Survey; carried into Report and Drill syncs.
    selected_site: SiteId,
}

impl<S: SyncApi, P: Presenter> GameSession<S, P> {
    pub fn new(sync: S, presenter: P) -> Self {
        Self {
            sync,
            presenter,
            router: InputRouter::new(),
            phase: Phase::Lobby,
            epoch: 0,
            state: None,
            cursor: SiteId(0),
            view: ViewLayer::Probability,
            selected_site: SiteId(0),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> SiteId {
        self.cursor
    }

    pub fn view(&self) -> ViewLayer {
        self.view
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Runs the whole session: lobby poll until start, then key dispatch
    /// until the key source closes.
    pub async fn run(&mut self, mut keys: mpsc::Receiver<Key>) -> Result<(), SyncError> {
        self.run_lobby(&mut keys).await?;
        while let Some(key) = keys.recv().await {
            self.handle_key(key).await;
        }
        Ok(())
    }

    /// Polls the lobby endpoint every second until the game has started,
    /// then fetches the authoritative state once and enters the phase it
    /// names. Key presses during the wait are routed normally, which lets
    /// the game owner fire the start request.
    pub async fn run_lobby(&mut self, keys: &mut mpsc::Receiver<Key>) -> Result<(), SyncError> {
        self.router.rebind(Phase::Lobby);
        self.presenter.show_lobby(&[]);

        let mut ticker = tokio::time::interval(LOBBY_POLL_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sync.poll_lobby().await {
                        Ok(snapshot) => {
                            debug!(started = snapshot.started, players = snapshot.players.len(), "lobby poll");
                            self.presenter.show_lobby(&snapshot.players);
                            if snapshot.started {
                                info!("game started with {} players", snapshot.players.len());
                                break;
                            }
                        }
                        // the next tick is the retry; the poll itself never gives up
                        Err(err) => {
                            warn!("lobby poll failed: {err}");
                            self.presenter.notice(&format!("lobby poll failed: {err}"));
                        }
                    }
                }
                Some(key) = keys.recv() => {
                    self.handle_key(key).await;
                }
            }
        }
        // polling is cancelled by falling out of the loop the instant the
        // started flag is observed

        let state = self.sync.fetch_current_state().await?;
        let expected = self.intent(PhaseEvent::EnterSurvey);
        self.settle(expected, state).await
    }

    /// Routes one key press through the active binding set.
    pub async fn handle_key(&mut self, key: Key) {
        let Some(action) = self.router.resolve(key) else {
            return;
        };
        self.dispatch(action).await;
    }

    /// Executes one semantic action. Transport failures end here: surfaced
    /// as a notice, logged, the action abandoned, the router re-armed.
    pub async fn dispatch(&mut self, action: Action) {
        if let Err(err) = self.run_action(action).await {
            error!("action {action:?} abandoned: {err}");
            self.presenter.notice(&format!("request failed: {err}"));
            self.router.resume();
        }
    }

    async fn run_action(&mut self, action: Action) -> Result<(), SyncError> {
        match (action, self.phase) {
            (Action::MoveCursor { dy, dx }, Phase::Survey) => {
                self.cursor = grid::move_cursor(self.cursor, dy, dx);
                self.render_current();
                Ok(())
            }
            (Action::CycleView(delta), Phase::Survey) => {
                self.view = self.view.cycle(delta);
                self.render_current();
                Ok(())
            }
            (Action::Confirm, Phase::Survey) => {
                self.selected_site = self.cursor;
                let expected = self.intent(PhaseEvent::Advance);
                self.issue(expected, PlayerAction::SiteChoice(self.cursor))
                    .await
            }
            (Action::AnswerYes, Phase::Report) => {
                let expected = self.intent(PhaseEvent::ConfirmYes);
                self.issue(expected, PlayerAction::Answer(true)).await
            }
            (Action::AnswerNo, Phase::Report) => {
                let expected = self.intent(PhaseEvent::Advance);
                self.issue(expected, PlayerAction::Answer(false)).await
            }
            // one drill stroke; locally the hole keeps going, only the
            // server ends it
            (Action::Advance, Phase::Drill) => {
                self.issue(self.phase, PlayerAction::SiteChoice(self.selected_site))
                    .await
            }
            (Action::Quit, Phase::Drill) => {
                let expected = self.intent(PhaseEvent::Advance);
                self.issue(expected, PlayerAction::NoOp).await
            }
            (Action::Advance, Phase::Wells) => {
                let expected = self.intent(PhaseEvent::Advance);
                self.issue(expected, PlayerAction::NoOp).await
            }
            (Action::Advance, Phase::Score) => {
                let expected = self.intent(PhaseEvent::Advance);
                self.issue(expected, PlayerAction::NoOp).await
            }
            // the owner's start request; the lobby poll, not this
            // response, drives the transition out of the lobby
            (Action::Advance, Phase::Lobby) => {
                self.sync.sync(PlayerAction::NoOp).await.map(|_| ())
            }
            (action, phase) => {
                debug!("action {action:?} has no meaning in phase {phase:?}");
                Ok(())
            }
        }
    }

    /// The phase the declared table expects `event` to reach from here.
    /// Falls back to the current phase for events the table does not
    /// declare, which reads as "no transition intended".
    fn intent(&self, event: PhaseEvent) -> Phase {
        phase::expected_next(self.phase, event).unwrap_or(self.phase)
    }

    /// One guarded sync round trip: the router stays disarmed while the
    /// request is in flight, and a response that outlived its phase epoch
    /// is dropped without touching state.
    async fn issue(&mut self, expected: Phase, action: PlayerAction) -> Result<(), SyncError> {
        self.router.suspend();
        let issued_epoch = self.epoch;
        let result = self.sync.sync(action).await;
        if issued_epoch != self.epoch {
            debug!(issued_epoch, current_epoch = self.epoch, "stale sync response discarded");
            return Ok(());
        }
        let state = result?;
        self.router.resume();
        self.settle(expected, state).await
    }

    /// Reconciles a response and runs the transition it dictates,
    /// including any immediate data fetch the entered phase wants.
    async fn settle(&mut self, expected: Phase, state: GameState) -> Result<(), SyncError> {
        let mut entry = self.apply(expected, state);
        while let Some(EntrySync { expected, action }) = entry {
            let state = self.sync.sync(action).await?;
            entry = self.apply(expected, state);
        }
        Ok(())
    }

    /// Adopts the authoritative state and resolves the transition purely
    /// from the (current, reported) phase pair. The reported phase always
    /// wins over local intent.
    fn apply(&mut self, expected: Phase, state: GameState) -> Option<EntrySync> {
        let reported = state.name;
        let verdict = phase::reconcile(self.phase, expected, reported);
        if verdict.undeclared {
            warn!(
                "server reported phase {reported:?}, unreachable from {:?} by any declared edge; trusting it",
                self.phase
            );
        } else if verdict.divergent {
            info!(
                "server chose {reported:?} where the client intended {expected:?}"
            );
        }

        if let Some(site) = state.site {
            self.selected_site = site;
        }
        self.state = Some(state);

        match verdict.outcome {
            Outcome::Stay => {
                self.render_current();
                None
            }
            Outcome::Transition(to) => {
                self.exit(self.phase);
                self.phase = to;
                self.epoch += 1;
                info!("entering phase {to:?} (week {})", self.week());
                self.enter(to)
            }
        }
    }

    /// Exit hook: hide the screen, drop every binding, release phase-local
    /// transient state. Always completes before the next enter hook runs.
    fn exit(&mut self, phase: Phase) {
        self.router.clear();
        self.presenter.hide(phase);
        if phase == Phase::Survey {
            self.cursor = SiteId(0);
            self.view = ViewLayer::Probability;
        }
    }

    /// Enter hook: bind the phase's action set, render, and for phases
    /// that need immediate data return the sync to issue.
    fn enter(&mut self, phase: Phase) -> Option<EntrySync> {
        self.router.rebind(phase);
        match phase {
            Phase::Lobby => {
                self.presenter.show_lobby(&[]);
                None
            }
            Phase::Survey => {
                self.cursor = SiteId(0);
                self.view = ViewLayer::Probability;
                self.render_current();
                None
            }
            Phase::Report => {
                self.render_current();
                Some(EntrySync {
                    expected: Phase::Report,
                    action: PlayerAction::SiteChoice(self.selected_site),
                })
            }
            Phase::Drill => {
                self.render_current();
                // the first stroke happens on entry
                Some(EntrySync {
                    expected: Phase::Drill,
                    action: PlayerAction::SiteChoice(self.selected_site),
                })
            }
            Phase::Wells | Phase::Score => {
                self.render_current();
                None
            }
        }
    }

    fn render_current(&mut self) {
        let Some(state) = &self.state else {
            return;
        };
        match self.phase {
            Phase::Lobby => self.presenter.show_lobby(&[]),
            Phase::Survey => self.presenter.show_survey(state, self.cursor, self.view),
            Phase::Report => self.presenter.show_report(state),
            Phase::Drill => self.presenter.show_drill(state),
            Phase::Wells => self.presenter.show_wells(state),
            Phase::Score => self.presenter.show_score(state),
        }
    }

    fn week(&self) -> i64 {
        self.state.as_ref().map(|state| state.week).unwrap_or(0)
    }
}
