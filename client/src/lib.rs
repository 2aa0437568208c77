#![warn(rust_2018_idioms)]

pub mod command;
pub mod session;
pub mod settings;
pub mod transport;

pub use session::{run, Session};
pub use transport::OddsClient;
