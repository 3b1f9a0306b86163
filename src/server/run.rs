//! TCP bootstrap: bind, admit the configured number of players, then hand
//! the table to the round engine.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::game::RoundEngine;
use crate::pretty;
use crate::protocol::ClientMsg;
use crate::server::{session, Coordinator, Session};

/// Bind the configured address and run one full game.
pub async fn run_server(cfg: Config) -> Result<()> {
    let addr = format!("{}:{}", cfg.address, cfg.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding listener on {}", addr))?;
    pretty::log_game(&format!("server listening on {}", listener.local_addr()?));
    serve(listener, cfg).await
}

/// Admission phase followed by the game driver. Split from [`run_server`]
/// so tests can bind their own listener.
pub async fn serve(listener: TcpListener, cfg: Config) -> Result<()> {
    let coord = Arc::new(Coordinator::new(cfg.max_players));

    while !coord.is_full().await {
        let (stream, peer) = listener.accept().await.context("accepting connection")?;
        let (read_half, write_half) = stream.into_split();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let mut lines = BufReader::new(read_half).lines();

        // Handshake: the first recognized line must declare the player
        // name; anything else is ignored until it arrives. A connection
        // that closes before handshaking does not consume a slot.
        let name = loop {
            match lines.next_line().await {
                Ok(Some(line)) => match ClientMsg::parse(&line) {
                    Some(ClientMsg::Name(name)) => break Some(name),
                    _ => continue,
                },
                Ok(None) | Err(_) => break None,
            }
        };
        let Some(name) = name else {
            pretty::log_session(&format!("{} dropped before handshake", peer));
            continue;
        };

        let index = coord.count().await;
        let session = Arc::new(Session::new(index, name, out_tx));
        coord.register(Arc::clone(&session)).await;
        pretty::log_session(&format!(
            "{} connected from {} (slot {})",
            session.name(),
            peer,
            index
        ));

        tokio::spawn(session::run_writer(out_rx, write_half));
        tokio::spawn(session::run_reader(
            Arc::clone(&session),
            Arc::clone(&coord),
            lines,
        ));
    }

    let mut engine = RoundEngine::new(cfg.rounds, cfg.pacing);
    engine.run(&coord).await
}
