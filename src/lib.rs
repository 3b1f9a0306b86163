//! Pirates Pontoon server: a fixed-size table of TCP clients playing a
//! dealer-vs-players card round over a line-oriented text protocol.

pub mod cards;
pub mod config;
pub mod game;
pub mod pretty;
pub mod protocol;
pub mod server;
