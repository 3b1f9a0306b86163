//! The coordinator: fixed-capacity session registry, readiness barrier and
//! the broadcast primitive.
//!
//! Slots are pushed once during admission and never removed; registry order
//! is the canonical order for every iteration, broadcast and report. A
//! departed session stays in its slot with its readiness flag down.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::pretty;
use crate::protocol::{self, ServerMsg};
use crate::server::Session;

pub struct Coordinator {
    registry: RwLock<Vec<Arc<Session>>>,
    max_players: usize,
}

impl Coordinator {
    pub fn new(max_players: usize) -> Self {
        Coordinator {
            registry: RwLock::new(Vec::with_capacity(max_players)),
            max_players,
        }
    }

    /// Configured capacity (the `MaxPlayers` query).
    pub fn max_players(&self) -> usize {
        self.max_players
    }

    /// Admitted session count (the `Connection` query).
    pub async fn count(&self) -> usize {
        self.registry.read().await.len()
    }

    pub async fn is_full(&self) -> bool {
        self.count().await >= self.max_players
    }

    /// Place a session in the next slot. Admission is sequential, so the
    /// slot index the caller computed via [`Coordinator::count`] holds.
    pub async fn register(&self, session: Arc<Session>) {
        self.registry.write().await.push(session);
    }

    /// Snapshot of the registry in slot order.
    pub async fn sessions(&self) -> Vec<Arc<Session>> {
        self.registry.read().await.clone()
    }

    /// Space-joined names of every admitted player (the `Names` query).
    pub async fn names_line(&self) -> String {
        let registry = self.registry.read().await;
        registry
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Deliver one message to every ready session in registry order,
    /// wrapped in the `Broadcast` envelope. Fire-and-forget: no retry, no
    /// acknowledgment, a dead connection just misses it.
    pub async fn broadcast(&self, msg: &ServerMsg) {
        let line = format!("{} {}", protocol::BROADCAST, msg);
        pretty::log_broadcast(&line);
        let registry = self.registry.read().await;
        for session in registry.iter() {
            if !session.is_ready() {
                continue;
            }
            session.send(line.clone());
        }
    }

    /// The readiness barrier: resolve once every populated slot reports
    /// ready. There is deliberately no timeout; a session that never
    /// readies up blocks the game indefinitely.
    pub async fn wait_all_ready(&self) {
        let sessions = self.sessions().await;
        for session in sessions {
            let mut ready = session.watch_ready();
            while !*ready.borrow_and_update() {
                if ready.changed().await.is_err() {
                    break;
                }
            }
        }
    }
}
