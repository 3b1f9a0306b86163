//! Game logic: players, the dealer and the round engine.

pub mod dealer;
pub mod engine;
pub mod player;

pub use dealer::{Dealer, DeckExhausted};
pub use engine::{resolve_round, RoundEngine, RoundOutcome};
pub use player::Player;
