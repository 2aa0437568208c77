//! Summarizing a table down to what the odds depend on.

use std::fmt;

use crate::model::{join_cards, Card, SeatId};
use crate::table::TableState;

/// A summary of everything that matters for odds: which seats are complete,
/// their hole cards, and the community cards of a meaningful stage.
///
/// Two tables with equal fingerprints show the same odds. The text form is
/// `seats|holes|community`, e.g. `p1,p2|As,Kd,2h,3c|`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Fingerprint {
    seats: Vec<(SeatId, Vec<Card>)>,
    community: Vec<Card>,
}

impl Fingerprint {
    pub fn of(table: &TableState) -> Self {
        let seats = table
            .seats()
            .filter_map(|seat| table.hole(seat).map(|hole| (seat, hole)))
            .collect();
        Fingerprint {
            seats,
            community: table.community(),
        }
    }

    /// Complete seats in seat order, with their hole cards.
    pub fn seats(&self) -> &[(SeatId, Vec<Card>)] {
        &self.seats
    }

    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.seats.iter().map(|(seat, _)| *seat).collect()
    }

    pub fn community(&self) -> &[Card] {
        &self.community
    }

    /// Whether enough seats are complete to compare hands.
    pub fn is_priceable(&self) -> bool {
        self.seats.len() >= 2
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seats: Vec<String> = self.seats.iter().map(|(seat, _)| seat.to_string()).collect();
        let holes: Vec<String> = self.seats.iter().map(|(_, hole)| join_cards(hole)).collect();
        write!(
            f,
            "{}|{}|{}",
            seats.join(","),
            holes.join(","),
            join_cards(&self.community)
        )
    }
}
