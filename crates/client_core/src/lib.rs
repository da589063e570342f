//! Client control layer for the oil-prospecting game: the HTTP sync
//! client, the phase state machine, toroidal grid navigation, and the
//! phase-scoped input router. Rendering stays behind the
//! [`session::Presenter`] trait; raw key handling stays behind
//! [`input::Key`].

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{GameId, PlayerId, FIELD_SITES},
    protocol::{GameState, LobbySnapshot, PlayerAction},
};
use tracing::debug;

pub mod error;
pub mod grid;
pub mod input;
pub mod phase;
pub mod session;

pub use error::SyncError;

/// The narrow surface the session controller talks to the server through.
/// Implemented by [`HttpGameClient`] for real use and by scripted fakes in
/// tests.
#[async_trait]
pub trait SyncApi: Send + Sync {
    /// One request/response round trip carrying a player action; returns
    /// the new authoritative state.
    async fn sync(&self, action: PlayerAction) -> Result<GameState, SyncError>;

    /// One-shot fetch of the current authoritative state, used when
    /// entering an in-progress game.
    async fn fetch_current_state(&self) -> Result<GameState, SyncError>;

    /// Lobby status snapshot; repeated by the caller until the game starts.
    async fn poll_lobby(&self) -> Result<LobbySnapshot, SyncError>;
}

/// HTTP JSON client for one player slot of one game.
pub struct HttpGameClient {
    http: Client,
    server_url: String,
    game_id: GameId,
    player_id: PlayerId,
}

impl HttpGameClient {
    pub fn new(server_url: impl Into<String>, game_id: GameId, player_id: PlayerId) -> Self {
        Self {
            http: Client::new(),
            server_url: normalize_url(server_url.into()),
            game_id,
            player_id,
        }
    }

    /// Joins `name` into the game and returns a client bound to the player
    /// slot the server assigned.
    pub async fn join(
        server_url: impl Into<String>,
        game_id: GameId,
        name: &str,
    ) -> Result<Self, SyncError> {
        let server_url = normalize_url(server_url.into());
        let http = Client::new();
        let player_id: i64 = http
            .post(format!("{server_url}/game/{}/", game_id.0))
            .json(&name)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(player_id, "joined game {}", game_id.0);
        Ok(Self {
            http,
            server_url,
            game_id,
            player_id: PlayerId(player_id),
        })
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn game_url(&self) -> String {
        format!("{}/game/{}/", self.server_url, self.game_id.0)
    }

    fn player_url(&self) -> String {
        format!(
            "{}/game/{}/player/{}/",
            self.server_url, self.game_id.0, self.player_id.0
        )
    }
}

fn normalize_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Rejects a payload whose per-site arrays do not all cover the field.
/// Arrays the server omitted for the current phase are exempt.
fn check_site_arrays(state: &GameState) -> Result<(), SyncError> {
    let expected = FIELD_SITES as usize;
    for (layer, values) in state.site_arrays() {
        if !values.is_empty() && values.len() != expected {
            return Err(SyncError::FieldSizeMismatch {
                layer,
                got: values.len(),
                expected,
            });
        }
    }
    Ok(())
}

#[async_trait]
impl SyncApi for HttpGameClient {
    async fn sync(&self, action: PlayerAction) -> Result<GameState, SyncError> {
        debug!(wire = action.wire_value(), "posting move");
        let state: GameState = self
            .http
            .post(self.player_url())
            .json(&action)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check_site_arrays(&state)?;
        Ok(state)
    }

    async fn fetch_current_state(&self) -> Result<GameState, SyncError> {
        let state: GameState = self
            .http
            .get(self.player_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check_site_arrays(&state)?;
        Ok(state)
    }

    async fn poll_lobby(&self) -> Result<LobbySnapshot, SyncError> {
        let snapshot: LobbySnapshot = self
            .http
            .get(self.game_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(snapshot)
    }
}
