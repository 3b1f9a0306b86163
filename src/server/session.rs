//! One connected participant: its protocol-facing state plus the read and
//! write loops that own its socket halves.
//!
//! The session task is the only writer of its own readiness and intent
//! state; the round driver only reads them. Score fields live in the engine
//! and are never touched from here, which keeps the whole design race-free
//! without fine-grained locking.

use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, watch, Mutex};

use crate::pretty;
use crate::protocol::{ClientMsg, ServerMsg};
use crate::server::Coordinator;

/// A decision pulled off a session's socket during an ask-loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Deal,
    Hold,
}

/// Per-connection state. Created after the `Name` handshake, registered in
/// the coordinator's slot it was admitted into, never removed.
pub struct Session {
    index: usize,
    name: String,
    ready: watch::Sender<bool>,
    intent_tx: mpsc::UnboundedSender<Intent>,
    intent_rx: Mutex<mpsc::UnboundedReceiver<Intent>>,
    outgoing: mpsc::UnboundedSender<String>,
}

impl Session {
    pub fn new(index: usize, name: String, outgoing: mpsc::UnboundedSender<String>) -> Self {
        let (ready, _) = watch::channel(false);
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        Session {
            index,
            name,
            ready,
            intent_tx,
            intent_rx: Mutex::new(intent_rx),
            outgoing,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-blocking readiness check; doubles as the slot's liveness flag.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn mark_unready(&self) {
        self.ready.send_replace(false);
    }

    /// A receiver the driver can await readiness transitions on.
    pub fn watch_ready(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    pub fn submit(&self, intent: Intent) {
        let _ = self.intent_tx.send(intent);
    }

    /// Drop any intent the client sent while nobody was asking. Called by
    /// the driver once before every prompt so each ask consumes at most one
    /// fresh decision.
    pub async fn clear_intent(&self) {
        let mut rx = self.intent_rx.lock().await;
        while rx.try_recv().is_ok() {}
    }

    /// Await the next decision from this session. Resolves to `None` if the
    /// session goes unready (disconnect) while being waited on, which the
    /// driver treats as a forced hold.
    pub async fn next_intent(&self) -> Option<Intent> {
        let mut rx = self.intent_rx.lock().await;
        let mut ready = self.watch_ready();
        tokio::select! {
            intent = rx.recv() => intent,
            _ = wait_unready(&mut ready) => None,
        }
    }

    /// Queue one line for the writer task. Fire-and-forget: a closed
    /// connection just drops the line.
    pub fn send(&self, line: impl Into<String>) {
        let _ = self.outgoing.send(line.into());
    }

    /// Apply a parsed client line. Queries return a bare value line to send
    /// straight back; everything else mutates this session's own state.
    pub async fn apply(&self, msg: &ClientMsg, coord: &Coordinator) -> Option<String> {
        match msg {
            ClientMsg::Ready => {
                self.mark_ready();
                None
            }
            ClientMsg::Deal => {
                self.submit(Intent::Deal);
                None
            }
            ClientMsg::Hold => {
                self.submit(Intent::Hold);
                None
            }
            ClientMsg::Names => Some(coord.names_line().await),
            ClientMsg::Connection => Some(coord.count().await.to_string()),
            ClientMsg::MaxPlayers => Some(coord.max_players().to_string()),
            // Handshake already happened; a repeated Name is a no-op.
            ClientMsg::Name(_) => None,
            // Quit terminates the read loop before apply is reached.
            ClientMsg::Quit => None,
        }
    }
}

async fn wait_unready(rx: &mut watch::Receiver<bool>) {
    while *rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Read loop for one session. `Quit`, EOF and read errors all end the loop
/// the same way: mark unready, announce the departure, stop. The driver is
/// never told directly; it sees the slot go inactive on its next look.
pub async fn run_reader(
    session: Arc<Session>,
    coord: Arc<Coordinator>,
    mut lines: Lines<BufReader<OwnedReadHalf>>,
) {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(msg) = ClientMsg::parse(&line) else {
                    // Unrecognized input is dropped without a response.
                    continue;
                };
                if msg == ClientMsg::Quit {
                    break;
                }
                if let Some(reply) = session.apply(&msg, &coord).await {
                    session.send(reply);
                }
            }
            Ok(None) | Err(_) => break,
        }
    }

    pretty::log_session(&format!("{} (slot {}) left", session.name(), session.index()));
    session.mark_unready();
    coord
        .broadcast(&ServerMsg::Message(format!(
            "{} has left the game.",
            session.name()
        )))
        .await;
}

/// Writer loop: drains the outgoing queue onto the socket, flushing each
/// line. Exits on write failure or once every sender is gone.
pub async fn run_writer(mut rx: mpsc::UnboundedReceiver<String>, mut writer: OwnedWriteHalf) {
    while let Some(line) = rx.recv().await {
        if writer.write_all(line.as_bytes()).await.is_err() {
            break;
        }
        if writer.write_all(b"\n").await.is_err() {
            break;
        }
        if writer.flush().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(0, "Ann".to_string(), tx), rx)
    }

    #[tokio::test]
    async fn ready_flag_starts_clear_and_sticks() {
        let (s, _rx) = session();
        assert!(!s.is_ready());
        s.mark_ready();
        assert!(s.is_ready());
        s.mark_unready();
        assert!(!s.is_ready());
    }

    #[tokio::test]
    async fn one_intent_consumed_per_ask() {
        let (s, _rx) = session();
        s.mark_ready();
        s.submit(Intent::Deal);
        s.submit(Intent::Hold);
        assert_eq!(s.next_intent().await, Some(Intent::Deal));
        assert_eq!(s.next_intent().await, Some(Intent::Hold));
    }

    #[tokio::test]
    async fn clear_intent_drains_stale_decisions() {
        let (s, _rx) = session();
        s.mark_ready();
        s.submit(Intent::Deal);
        s.submit(Intent::Deal);
        s.clear_intent().await;
        s.submit(Intent::Hold);
        assert_eq!(s.next_intent().await, Some(Intent::Hold));
    }

    #[tokio::test]
    async fn unready_session_resolves_to_forced_hold() {
        let (s, _rx) = session();
        // Never readied: an awaited ask must resolve immediately.
        assert_eq!(s.next_intent().await, None);

        // Readied, then disconnects mid-ask.
        let s = Arc::new(session().0);
        s.mark_ready();
        let waiter = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.next_intent().await })
        };
        tokio::task::yield_now().await;
        s.mark_unready();
        assert_eq!(waiter.await.unwrap(), None);
    }

    #[tokio::test]
    async fn queued_lines_reach_the_writer() {
        let (s, mut rx) = session();
        s.send("Ask");
        assert_eq!(rx.recv().await.unwrap(), "Ask");
    }
}
