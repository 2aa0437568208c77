use snafu::Snafu;

use crate::fingerprint::Fingerprint;
use crate::model::{CardName, ParseVariantError, Slot};

/// Everything that can go wrong while working a table.
///
/// None of these are fatal: the table is left valid and usable after each.
#[derive(Debug, Snafu, Clone, Eq, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{card} is already dealt to {slot}"))]
    DuplicateCard { card: CardName, slot: Slot },

    #[snafu(display("no slot is selected; reset the table to deal again"))]
    NoActiveSlot,

    #[snafu(display("{slot} cannot be selected right now"))]
    SlotUnavailable { slot: Slot },

    #[snafu(display("{slot} is not part of this table"))]
    UnknownSlot { slot: Slot },

    #[snafu(display("discarded odds for superseded table {fingerprint}"))]
    StaleResponse { fingerprint: Fingerprint },

    #[snafu(display("odds calculation failed: {message}"))]
    RemoteComputation { message: String },

    #[snafu(display("invalid game variant: {source}"))]
    InvalidVariant { source: ParseVariantError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
