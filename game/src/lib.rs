#![warn(rust_2018_idioms)]

//! Card assignment and odds bookkeeping for a poker odds board.
//!
//! `TableState` tracks which card sits in which slot and which slot is
//! active. `OddsController` wraps a table, decides when the odds need to be
//! recomputed, and matches service replies back to the table they were asked
//! for.

pub mod coalescer;
pub mod controller;
pub mod error;
pub mod fingerprint;
pub mod model;
pub mod odds;
pub mod protocol;
pub mod registry;
pub mod rotation;
pub mod table;

pub use controller::OddsController;
pub use error::{Error, Result};
