use anyhow::Result;
use clap::Parser;
use client_core::{input::Key, session::GameSession, HttpGameClient};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal,
};
use shared::domain::{GameId, PlayerId};
use tokio::sync::mpsc;
use tracing::debug;

mod presenter;

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the game server.
    #[arg(long, default_value = "http://127.0.0.1:8888")]
    server_url: String,
    /// Game id to play in.
    #[arg(long, default_value_t = 0)]
    game: i64,
    /// Join the game as a new player under this name.
    #[arg(long, conflicts_with = "player")]
    name: Option<String>,
    /// Resume an already-joined player slot.
    #[arg(long)]
    player: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let client = match (args.player, args.name) {
        (Some(player), _) => {
            HttpGameClient::new(&args.server_url, GameId(args.game), PlayerId(player))
        }
        (None, Some(name)) => {
            HttpGameClient::join(&args.server_url, GameId(args.game), &name).await?
        }
        (None, None) => anyhow::bail!("pass --name to join or --player to resume a slot"),
    };

    let (tx, rx) = mpsc::channel(32);
    terminal::enable_raw_mode()?;
    let input = std::thread::spawn(move || read_keys(tx));

    let mut session = GameSession::new(client, presenter::TextPresenter::new());
    let result = session.run(rx).await;

    terminal::disable_raw_mode()?;
    // the reader thread is detached; it ends with escape or process exit
    drop(input);
    result?;
    Ok(())
}

/// Blocking crossterm read loop; ends on escape, which drops the sender
/// and lets the session run to completion.
fn read_keys(tx: mpsc::Sender<Key>) {
    loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(err) => {
                debug!("input read failed: {err}");
                return;
            }
        };
        let Event::Key(key) = event else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.code == KeyCode::Esc {
            return;
        }
        let Some(mapped) = map_key(key.code, key.modifiers) else {
            continue;
        };
        if tx.blocking_send(mapped).is_err() {
            return;
        }
    }
}

/// Lifts crossterm key events into the router's device-independent keys.
fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    let shifted = modifiers.contains(KeyModifiers::SHIFT);
    match code {
        KeyCode::Up if shifted => Some(Key::ShiftUp),
        KeyCode::Down if shifted => Some(Key::ShiftDown),
        KeyCode::Left if shifted => Some(Key::ShiftLeft),
        KeyCode::Right if shifted => Some(Key::ShiftRight),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::BackTab => Some(Key::BackTab),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c.to_ascii_lowercase())),
        _ => None,
    }
}
