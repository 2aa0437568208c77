//! The contract with the remote odds service.
//!
//! The service receives the holes of every complete seat plus the community
//! cards, and answers with outcome counts per hole. How it computes them is
//! its own business.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::model::{join_cards, CardName, Game};

/// One odds calculation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OddsRequest {
    /// Selects the service method, see `Game::method`.
    pub game: Game,

    /// One entry per seat, in seat order, e.g. `"As,Kd"`; Omaha holes carry
    /// four cards.
    pub holes: Vec<String>,

    /// Zero, three, four or five cards, e.g. `["Qs", "Jh", "Tc"]`.
    pub community: Vec<String>,
}

impl OddsRequest {
    pub fn new(game: Game, fingerprint: &Fingerprint) -> Self {
        OddsRequest {
            game,
            holes: fingerprint
                .seats()
                .iter()
                .map(|(_, hole)| join_cards(hole))
                .collect(),
            community: fingerprint
                .community()
                .iter()
                .map(|&c| CardName(c).to_string())
                .collect(),
        }
    }
}

/// Outcome counts for each hole of a request, in request order.
///
/// Each entry is `[losses, wins, splits...]`; the entry's sum is the number of
/// outcomes sampled.
pub type Counts = Vec<Vec<u64>>;

/// The failure payload of the odds service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RemoteError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    pub msg: String,
}

impl RemoteError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        RemoteError {
            code: None,
            msg: msg.into(),
        }
    }
}

pub type OddsResult = Result<Counts, RemoteError>;

/// Anything that can compute odds for a request.
///
/// Each call yields exactly one result. Calls are never cancelled: a caller
/// that loses interest simply drops or ignores the result.
pub trait OddsService {
    fn calculate_odds(&self, request: OddsRequest) -> BoxFuture<'static, OddsResult>;
}

impl<S: OddsService + ?Sized> OddsService for std::sync::Arc<S> {
    fn calculate_odds(&self, request: OddsRequest) -> BoxFuture<'static, OddsResult> {
        (**self).calculate_odds(request)
    }
}
