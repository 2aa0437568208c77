//! Deciding when to ask for odds, and which answers to believe.
//!
//! Every table change is summarized as a `Fingerprint`. A request goes out
//! only when the fingerprint differs from the last one seen, and the new
//! fingerprint is recorded before the request leaves. A reply is rendered
//! only if its ticket still carries the current fingerprint; anything older
//! is dropped on arrival.

use futures::future::{BoxFuture, FutureExt};
use log::debug;
use snafu::ensure;

use crate::error::{RemoteComputationSnafu, Result, StaleResponseSnafu};
use crate::fingerprint::Fingerprint;
use crate::model::{Game, SeatId};
use crate::odds::SeatOdds;
use crate::protocol::{OddsRequest, OddsResult};
use crate::table::TableState;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum State {
    Idle,
    AwaitingResponse,
}

/// Identifies the table a request was made for.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Ticket {
    fingerprint: Fingerprint,
}

impl Ticket {
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// The seats the reply's entries belong to, in order.
    pub fn seats(&self) -> Vec<SeatId> {
        self.fingerprint.seat_ids()
    }
}

/// What an evaluation decided.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Dispatch {
    /// Nothing relevant changed.
    Unchanged,
    /// Too few complete seats; odds are hidden.
    Hidden,
    /// Send this request, and resolve its reply with the ticket.
    Request(Ticket, OddsRequest),
}

/// Odds on display, with the table they were computed for.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Displayed {
    pub fingerprint: Fingerprint,
    pub odds: Vec<SeatOdds>,
}

#[derive(Debug, Clone)]
pub struct Coalescer {
    current: Option<Fingerprint>,
    state: State,
    displayed: Option<Displayed>,
}

impl Default for Coalescer {
    fn default() -> Self {
        Coalescer::new()
    }
}

impl Coalescer {
    pub fn new() -> Self {
        Coalescer {
            current: None,
            state: State::Idle,
            displayed: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The fingerprint of the latest evaluated table.
    pub fn current(&self) -> Option<&Fingerprint> {
        self.current.as_ref()
    }

    pub fn displayed(&self) -> Option<&Displayed> {
        self.displayed.as_ref()
    }

    /// Whether the odds on display belong to the current table.
    pub fn is_display_current(&self) -> bool {
        match (&self.displayed, &self.current) {
            (Some(d), Some(c)) => &d.fingerprint == c,
            _ => false,
        }
    }

    /// Compare the table against the last evaluation and decide whether odds
    /// need to be requested.
    pub fn evaluate(&mut self, game: Game, table: &TableState) -> Dispatch {
        let fingerprint = Fingerprint::of(table);
        if self.current.as_ref() == Some(&fingerprint) {
            return Dispatch::Unchanged;
        }
        self.current = Some(fingerprint.clone());

        if !fingerprint.is_priceable() {
            debug!("hiding odds for {}", fingerprint);
            self.displayed = None;
            self.state = State::Idle;
            return Dispatch::Hidden;
        }

        debug!("requesting odds for {}", fingerprint);
        self.state = State::AwaitingResponse;
        let request = OddsRequest::new(game, &fingerprint);
        Dispatch::Request(Ticket { fingerprint }, request)
    }

    /// Apply a reply to the display.
    ///
    /// Replies for anything but the current fingerprint fail with
    /// `StaleResponse` and change nothing. A failed or malformed reply for the
    /// current fingerprint clears the display.
    pub fn resolve(&mut self, ticket: Ticket, result: OddsResult) -> Result<Vec<SeatOdds>> {
        ensure!(
            self.current.as_ref() == Some(&ticket.fingerprint),
            StaleResponseSnafu {
                fingerprint: ticket.fingerprint.clone(),
            }
        );
        self.state = State::Idle;
        match result
            .map_err(|e| e.msg)
            .and_then(|counts| seat_odds(&ticket, &counts))
        {
            Ok(odds) => {
                self.displayed = Some(Displayed {
                    fingerprint: ticket.fingerprint,
                    odds: odds.clone(),
                });
                Ok(odds)
            }
            Err(message) => {
                self.displayed = None;
                RemoteComputationSnafu { message }.fail()
            }
        }
    }

    /// Forget everything, e.g. because the table was reset.
    pub fn reset(&mut self) {
        *self = Coalescer::new();
    }
}

fn seat_odds(ticket: &Ticket, counts: &[Vec<u64>]) -> std::result::Result<Vec<SeatOdds>, String> {
    let seats = ticket.seats();
    if counts.len() != seats.len() {
        return Err(format!(
            "expected odds for {} seats, got {}",
            seats.len(),
            counts.len()
        ));
    }
    seats
        .into_iter()
        .zip(counts)
        .map(|(seat, counts)| {
            SeatOdds::from_counts(seat, counts).map_err(|e| format!("{}: {}", seat, e))
        })
        .collect()
}

/// A request in flight, paired with the ticket to resolve it with.
pub struct PendingOdds {
    ticket: Ticket,
    response: BoxFuture<'static, OddsResult>,
}

/// A finished request, ready to be resolved by the coalescer.
#[derive(Debug, Clone)]
pub struct Reply {
    pub ticket: Ticket,
    pub result: OddsResult,
}

impl PendingOdds {
    pub fn new(ticket: Ticket, response: BoxFuture<'static, OddsResult>) -> Self {
        PendingOdds { ticket, response }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.ticket.fingerprint
    }

    /// Wait for the service to answer.
    pub fn wait(self) -> BoxFuture<'static, Reply> {
        let ticket = self.ticket;
        self.response
            .map(move |result| Reply { ticket, result })
            .boxed()
    }
}

impl std::fmt::Debug for PendingOdds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingOdds")
            .field("ticket", &self.ticket)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{parse_card, Slot, Variant};
    use crate::odds::Percent;
    use crate::protocol::RemoteError;

    fn heads_up(deals: &[&str]) -> TableState {
        let mut table = TableState::new(Variant::HEADS_UP);
        for c in deals {
            table.deal(parse_card(c).unwrap()).unwrap();
        }
        table
    }

    fn request(dispatch: Dispatch) -> (Ticket, OddsRequest) {
        match dispatch {
            Dispatch::Request(ticket, request) => (ticket, request),
            other => panic!("expected a request, got {:?}", other),
        }
    }

    #[test]
    fn two_complete_seats_issue_one_request() {
        let mut coalescer = Coalescer::new();
        let table = heads_up(&["As", "Kd", "2h", "3c"]);
        let (_, req) = request(coalescer.evaluate(Game::Holdem, &table));
        assert_eq!(req.holes, vec!["As,Kd", "2h,3c"]);
        assert!(req.community.is_empty());
        assert_eq!(coalescer.state(), State::AwaitingResponse);
        assert_eq!(coalescer.evaluate(Game::Holdem, &table), Dispatch::Unchanged);
    }

    #[test]
    fn fewer_than_two_seats_hide_odds() {
        let mut coalescer = Coalescer::new();
        let table = heads_up(&["As", "Kd", "2h"]);
        assert_eq!(coalescer.evaluate(Game::Holdem, &table), Dispatch::Hidden);
        assert_eq!(coalescer.evaluate(Game::Holdem, &table), Dispatch::Unchanged);
        assert_eq!(coalescer.state(), State::Idle);
    }

    #[test]
    fn current_reply_is_rendered() {
        let mut coalescer = Coalescer::new();
        let table = heads_up(&["As", "Kd", "2h", "3c"]);
        let (ticket, _) = request(coalescer.evaluate(Game::Holdem, &table));
        let odds = coalescer
            .resolve(ticket, Ok(vec![vec![3000, 7000], vec![7000, 3000]]))
            .unwrap();
        assert_eq!(odds[0].win, Percent::from_hundredths(7000));
        assert_eq!(odds[1].seat, SeatId(2));
        assert_eq!(odds[1].loss, Percent::from_hundredths(7000));
        assert_eq!(coalescer.state(), State::Idle);
        assert!(coalescer.is_display_current());
    }

    #[test]
    fn stale_reply_is_discarded() {
        let mut coalescer = Coalescer::new();
        let mut table = heads_up(&["As", "Kd", "2h", "3c"]);
        let (old, _) = request(coalescer.evaluate(Game::Holdem, &table));
        for c in &["Qs", "Jh", "Tc"] {
            table.deal(parse_card(c).unwrap()).unwrap();
        }
        let (fresh, _) = request(coalescer.evaluate(Game::Holdem, &table));

        let err = coalescer
            .resolve(old.clone(), Ok(vec![vec![1, 1], vec![1, 1]]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::StaleResponse {
                fingerprint: old.fingerprint().clone()
            }
        );
        assert_eq!(coalescer.state(), State::AwaitingResponse);
        assert!(coalescer.displayed().is_none());

        coalescer
            .resolve(fresh, Ok(vec![vec![1, 3], vec![3, 1]]))
            .unwrap();
        assert_eq!(coalescer.displayed().unwrap().odds[0].win.to_string(), "75%");
    }

    #[test]
    fn remote_error_clears_current_odds() {
        let mut coalescer = Coalescer::new();
        let mut table = heads_up(&["As", "Kd", "2h", "3c"]);
        let (ticket, _) = request(coalescer.evaluate(Game::Holdem, &table));
        coalescer
            .resolve(ticket, Ok(vec![vec![3000, 7000], vec![7000, 3000]]))
            .unwrap();

        for c in &["Qs", "Jh", "Tc"] {
            table.deal(parse_card(c).unwrap()).unwrap();
        }
        let (ticket, _) = request(coalescer.evaluate(Game::Holdem, &table));
        // Previous odds stay up while the new request is out.
        assert!(coalescer.displayed().is_some());
        assert!(!coalescer.is_display_current());

        let err = coalescer
            .resolve(ticket, Err(RemoteError::new("service unavailable")))
            .unwrap_err();
        assert_eq!(
            err,
            Error::RemoteComputation {
                message: "service unavailable".into()
            }
        );
        assert!(coalescer.displayed().is_none());
        assert_eq!(coalescer.state(), State::Idle);
    }

    #[test]
    fn stale_error_leaves_display_alone() {
        let mut coalescer = Coalescer::new();
        let mut table = heads_up(&["As", "Kd", "2h", "3c"]);
        let (first, _) = request(coalescer.evaluate(Game::Holdem, &table));
        coalescer
            .resolve(first.clone(), Ok(vec![vec![3000, 7000], vec![7000, 3000]]))
            .unwrap();
        table.release(Slot::hole(2, 1)).unwrap();
        table.deal(parse_card("4c").unwrap()).unwrap();
        let _ = request(coalescer.evaluate(Game::Holdem, &table));

        let err = coalescer
            .resolve(first, Err(RemoteError::new("late failure")))
            .unwrap_err();
        assert!(matches!(err, Error::StaleResponse { .. }));
        assert!(coalescer.displayed().is_some());
    }

    #[test]
    fn malformed_reply_is_a_remote_error() {
        let mut coalescer = Coalescer::new();
        let table = heads_up(&["As", "Kd", "2h", "3c"]);
        let (ticket, _) = request(coalescer.evaluate(Game::Holdem, &table));
        let err = coalescer
            .resolve(ticket, Ok(vec![vec![3000, 7000]]))
            .unwrap_err();
        assert!(matches!(err, Error::RemoteComputation { .. }));
    }

    #[test]
    fn overflowing_counts_are_a_remote_error() {
        let mut coalescer = Coalescer::new();
        let table = heads_up(&["As", "Kd", "2h", "3c"]);
        let (ticket, _) = request(coalescer.evaluate(Game::Holdem, &table));
        let err = coalescer
            .resolve(ticket, Ok(vec![vec![u64::MAX, 1], vec![1, 1]]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::RemoteComputation {
                message: "p1: outcome counts are too large to add up".into()
            }
        );
        assert!(coalescer.displayed().is_none());
    }

    #[test]
    fn reply_after_hiding_is_stale() {
        let mut coalescer = Coalescer::new();
        let mut table = heads_up(&["As", "Kd", "2h", "3c"]);
        let (ticket, _) = request(coalescer.evaluate(Game::Holdem, &table));
        table.release(Slot::hole(1, 0)).unwrap();
        assert_eq!(coalescer.evaluate(Game::Holdem, &table), Dispatch::Hidden);
        assert!(matches!(
            coalescer.resolve(ticket, Ok(vec![vec![1, 1], vec![1, 1]])),
            Err(Error::StaleResponse { .. })
        ));
        assert!(coalescer.displayed().is_none());
    }
}
