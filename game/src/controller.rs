//! The odds board: a table wired to an odds service.
//!
//! Every mutating operation re-evaluates the table and hands back the request
//! it caused, if any. Callers drive the returned `PendingOdds` to completion
//! and feed the `Reply` back through `resolve`, in whatever order replies
//! arrive.

use log::{debug, info, warn};
use snafu::ResultExt;

use crate::coalescer::{Coalescer, Dispatch, Displayed, PendingOdds, Reply, State};
use crate::error::{DuplicateCardSnafu, Error, InvalidVariantSnafu, Result};
use crate::model::{Card, CardName, Slot, Variant};
use crate::odds::SeatOdds;
use crate::protocol::OddsService;
use crate::table::TableState;

pub struct OddsController<S> {
    table: TableState,
    coalescer: Coalescer,
    service: S,
}

impl<S: OddsService> OddsController<S> {
    /// Build a board for `variant`, which must have a supported seat count.
    pub fn new(variant: Variant, service: S) -> Result<Self> {
        Ok(OddsController {
            table: TableState::new(checked(variant)?),
            coalescer: Coalescer::new(),
            service,
        })
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn variant(&self) -> Variant {
        self.table.variant()
    }

    pub fn displayed(&self) -> Option<&Displayed> {
        self.coalescer.displayed()
    }

    pub fn state(&self) -> State {
        self.coalescer.state()
    }

    /// Whether the odds on display were computed for the table as it is now.
    pub fn is_display_current(&self) -> bool {
        self.coalescer.is_display_current()
    }

    /// Whether there is anything to reset.
    pub fn can_reset(&self) -> bool {
        self.table.has_cards()
    }

    /// Deal `card` into the active slot.
    pub fn deal(&mut self, card: Card) -> Result<Option<PendingOdds>> {
        self.table.deal(card)?;
        Ok(self.refresh())
    }

    /// Select `slot` and deal `card` into it. Nothing changes if either step
    /// would fail.
    pub fn deal_to(&mut self, slot: Slot, card: Card) -> Result<Option<PendingOdds>> {
        if let Some(bound) = self.table.registry().slot_of(card) {
            return DuplicateCardSnafu {
                card: CardName(card),
                slot: bound,
            }
            .fail();
        }
        self.table.select(slot)?;
        self.deal(card)
    }

    /// Empty `slot`; it becomes the active slot.
    pub fn release(&mut self, slot: Slot) -> Result<Option<PendingOdds>> {
        if self.table.release(slot)?.is_none() {
            return Ok(None);
        }
        Ok(self.refresh())
    }

    /// Take `card` off the table, if it is on it.
    pub fn release_card(&mut self, card: Card) -> Result<Option<PendingOdds>> {
        if self.table.release_card(card).is_none() {
            return Ok(None);
        }
        Ok(self.refresh())
    }

    /// Deal `card` if it is in the deck, or take it back if it is dealt.
    pub fn toggle(&mut self, card: Card) -> Result<Option<PendingOdds>> {
        if self.table.registry().is_available(card) {
            self.deal(card)
        } else {
            self.release_card(card)
        }
    }

    /// Make `slot` the active slot.
    pub fn select(&mut self, slot: Slot) -> Result<Option<PendingOdds>> {
        self.table.select(slot)?;
        Ok(None)
    }

    /// Clear the table and the odds.
    pub fn reset(&mut self) -> Result<Option<PendingOdds>> {
        info!("resetting {} table", self.variant());
        self.table.reset();
        self.coalescer.reset();
        Ok(self.refresh())
    }

    /// Switch variants. The table and the odds are cleared.
    pub fn configure(&mut self, variant: Variant) -> Result<Option<PendingOdds>> {
        let variant = checked(variant)?;
        info!("switching table to {}", variant);
        self.table.reconfigure(variant);
        self.coalescer.reset();
        Ok(self.refresh())
    }

    /// Apply a finished request to the display.
    ///
    /// Stale replies are reported as `Error::StaleResponse` and otherwise
    /// ignored.
    pub fn resolve(&mut self, reply: Reply) -> Result<Vec<SeatOdds>> {
        let result = self.coalescer.resolve(reply.ticket, reply.result);
        match &result {
            Ok(odds) => debug!("showing odds for {} seats", odds.len()),
            Err(e @ Error::StaleResponse { .. }) => debug!("{}", e),
            Err(e) => warn!("{}", e),
        }
        result
    }

    fn refresh(&mut self) -> Option<PendingOdds> {
        match self.coalescer.evaluate(self.table.variant().game(), &self.table) {
            Dispatch::Request(ticket, request) => {
                let response = self.service.calculate_odds(request);
                Some(PendingOdds::new(ticket, response))
            }
            Dispatch::Hidden | Dispatch::Unchanged => None,
        }
    }
}

fn checked(variant: Variant) -> Result<Variant> {
    Variant::new(variant.game(), variant.seats()).context(InvalidVariantSnafu)
}

impl<S> std::fmt::Debug for OddsController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OddsController")
            .field("table", &self.table)
            .field("coalescer", &self.coalescer)
            .finish()
    }
}
