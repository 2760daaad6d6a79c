//! Terminal front end for the chess session client
//!
//! Joins one or more games and reads commands from stdin. The first
//! `--game` is active until `board <game>` or `join <game>` switches it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use chess_session::core::{config_path, load_config, ClientConfig, CoreError};
use chess_session::game::resources::format_clock;
use chess_session::game::{MoveOutcome, PieceColor, Square};
use chess_session::networking::{connect_and_run, SessionEvent};
use chess_session::{GameClient, SessionRegistry};

#[derive(Parser, Debug)]
#[command(name = "chess-session", about = "Play online chess sessions from a terminal")]
struct Cli {
    /// Game server WebSocket URL
    #[arg(long, env = "CHESS_SERVER_URL")]
    server: Option<Url>,

    /// Identity sent with moves
    #[arg(long, env = "CHESS_ACTOR")]
    actor: Option<String>,

    /// Game id to join; repeat for several games
    #[arg(long = "game", required = true)]
    games: Vec<String>,

    /// Path to config.json
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `chess_session=trace`
    #[arg(long)]
    log: Option<String>,
}

/// Config file outcome, logged once the subscriber is installed
enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    Invalid(PathBuf, CoreError),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("[CONFIG] Loaded config from {:?}", path),
            ConfigSource::Missing(path) => {
                info!("[CONFIG] No config file found at {:?}. Using defaults.", path);
            }
            ConfigSource::Invalid(path, e) => warn!(
                "[CONFIG] Failed to load config at {:?}: {}. Using defaults.",
                path, e
            ),
        }
    }
}

impl Cli {
    fn resolve_config(&self) -> Result<(ClientConfig, ConfigSource)> {
        let path = self.config.clone().unwrap_or_else(config_path);
        let (mut config, source) = match load_config(&path) {
            Ok(Some(config)) => (config, ConfigSource::File(path)),
            Ok(None) => (ClientConfig::default(), ConfigSource::Missing(path)),
            Err(e) => (ClientConfig::default(), ConfigSource::Invalid(path, e)),
        };
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(actor) = &self.actor {
            config.actor = actor.clone();
        }
        if let Some(log) = &self.log {
            config.log_filter = log.clone();
        }
        config.validate()?;
        Ok((config, source))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let (config, source) = cli.resolve_config()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    source.log();

    info!(
        "[CONFIG] server={} actor={} tick={}ms",
        config.server_url, config.actor, config.tick_interval_ms
    );

    let registry = Arc::new(SessionRegistry::new());
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let client = Arc::new(GameClient::new(
        registry,
        Arc::new(outbound_tx),
        config.actor.clone(),
        config.tick_period(),
    ));

    for game_id in &cli.games {
        client.subscribe(game_id);
    }

    let mut connection = {
        let client = Arc::clone(&client);
        let url = config.server_url.clone();
        tokio::spawn(async move { connect_and_run(&url, client, outbound_rx).await })
    };

    let mut events = client.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::Updated { game_id, revision } => {
                    info!("[SESSION] {} updated (revision {})", game_id, revision);
                }
                SessionEvent::ProtocolError { game_id, message } => {
                    warn!("[SESSION] {:?} rejected broadcast: {}", game_id, message);
                }
            }
        }
    });

    let mut active = cli.games[0].clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match run_command(&client, &mut active, line.trim()) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("error: {e}"),
                }
            }
            result = &mut connection => {
                match result {
                    Ok(Ok(())) => info!("[NETWORK] Connection closed"),
                    Ok(Err(e)) => error!("[NETWORK] Connection ended: {}", e),
                    Err(e) => error!("[NETWORK] Connection task failed: {}", e),
                }
                break;
            }
        }
    }

    for game_id in client.listening() {
        client.unsubscribe(&game_id);
    }
    client.clocks().stop_all();
    Ok(())
}

/// Run one stdin command; `Ok(false)` ends the loop
fn run_command(client: &GameClient, active: &mut String, line: &str) -> Result<bool> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(true);
    };
    let arg = parts.next();

    match command {
        "quit" | "exit" => return Ok(false),
        "join" => {
            let game_id = required(arg, "join <game>")?;
            client.subscribe(game_id);
            *active = game_id.to_string();
        }
        "leave" => {
            let game_id = arg.unwrap_or(active.as_str()).to_string();
            client.unsubscribe(&game_id);
        }
        "board" => {
            if let Some(game_id) = arg {
                *active = game_id.to_string();
            }
            render(client, active)?;
        }
        "pick" => {
            let square: Square = required(arg, "pick <square>")?.parse()?;
            let targets = client.pick_up(active, square)?;
            let targets: Vec<String> = targets.iter().map(Square::to_string).collect();
            println!("targets: {}", targets.join(" "));
        }
        "drop" => {
            let square: Square = required(arg, "drop <square>")?.parse()?;
            match client.drop_on(active, square) {
                MoveOutcome::Rejected => println!("no legal move to {square}"),
                MoveOutcome::Submitted(_) => println!("move sent"),
                MoveOutcome::PromotionPending(choices) => {
                    let literals: Vec<&str> =
                        choices.iter().map(|c| c.literal.as_str()).collect();
                    println!("promote with: {}", literals.join(" "));
                }
            }
        }
        "promote" => {
            let literal = required(arg, "promote <move>")?;
            client.choose_promotion(active, literal)?;
            println!("move sent");
        }
        "forfeit" => client.forfeit(active),
        "tie" => client.suggest_tie(active),
        "accept" => client.accept_tie(active),
        "rematch" => client.rematch(active),
        other => bail!("unknown command: {other}"),
    }
    Ok(true)
}

fn required<'a>(arg: Option<&'a str>, usage: &str) -> Result<&'a str> {
    match arg {
        Some(value) => Ok(value),
        None => bail!("usage: {usage}"),
    }
}

fn render(client: &GameClient, game_id: &str) -> Result<()> {
    let Some(session) = client.registry().get(game_id) else {
        bail!("not subscribed to {game_id}");
    };
    let session = session.read();
    let clock = session.clock();

    println!("{} ({} vs {})", game_id, session.player_white(), session.player_black());
    println!("{}", session.board().to_grid());
    println!(
        "white {}  black {}  to move: {:?}",
        format_clock(clock.remaining(PieceColor::White)),
        format_clock(clock.remaining(PieceColor::Black)),
        clock.active_side(),
    );
    println!(
        "{} {}{}",
        session.status(),
        session.position_status().message().unwrap_or(""),
        if session.board_view().is_provisional() {
            " (pending)"
        } else {
            ""
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_config_is_kept_for_logging() {
        //! A broken config file falls back to defaults but keeps the error
        let dir = std::env::temp_dir().join(format!("chess-session-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").expect("write");

        let cli = Cli::try_parse_from([
            "chess-session",
            "--game",
            "g1",
            "--actor",
            "dana",
            "--config",
            path.to_str().expect("utf-8 path"),
        ])
        .expect("valid args");
        let (config, source) = cli.resolve_config().expect("defaults are valid");

        assert!(matches!(source, ConfigSource::Invalid(_, CoreError::ConfigSerialization(_))));
        assert_eq!(config.actor, "dana");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
