//! Networked side of the table: sessions, the coordinator and the TCP
//! bootstrap.

pub mod run;
pub mod session;
pub mod state;

pub use run::{run_server, serve};
pub use session::{Intent, Session};
pub use state::Coordinator;
