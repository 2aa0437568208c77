//! The dealt state of one table: its layout, the dealt cards and the active
//! slot.

use log::debug;
use snafu::{ensure, OptionExt};

use crate::error::{NoActiveSlotSnafu, Result, SlotUnavailableSnafu, UnknownSlotSnafu};
use crate::model::{Card, CardName, Group, SeatId, Slot, Variant, COMMUNITY_SLOTS, FLOP_SLOTS};
use crate::registry::Registry;
use crate::rotation;

/// Everything known about the cards on a table.
///
/// Slots are fixed by the variant; only their contents and the active slot
/// change between reconfigurations.
#[derive(Debug, Clone)]
pub struct TableState {
    variant: Variant,
    registry: Registry,
    active: Option<Slot>,
}

impl TableState {
    /// Create an empty table, with the first hole card of `p1` active.
    pub fn new(variant: Variant) -> Self {
        let mut table = TableState {
            variant,
            registry: Registry::new(),
            active: None,
        };
        table.reset();
        table
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The slot that receives the next dealt card, if any.
    pub fn active(&self) -> Option<Slot> {
        self.active
    }

    pub fn seats(&self) -> impl Iterator<Item = SeatId> {
        self.variant.seat_ids()
    }

    /// The hole slots of `seat`, in hole order.
    pub fn hole_slots(&self, seat: SeatId) -> impl Iterator<Item = Slot> {
        (0..self.variant.hole_cards()).map(move |index| Slot::Hole { seat, index })
    }

    pub fn community_slots(&self) -> impl Iterator<Item = Slot> {
        (0..COMMUNITY_SLOTS).map(Slot::Community)
    }

    /// Every slot of the table, seats first.
    pub fn slots(&self) -> Vec<Slot> {
        self.seats()
            .flat_map(|seat| self.hole_slots(seat))
            .chain(self.community_slots())
            .collect()
    }

    /// The slots of one group, in ordinal order.
    pub fn group_slots(&self, group: Group) -> Vec<Slot> {
        match group {
            Group::Seat(seat) => self.hole_slots(seat).collect(),
            Group::Community => self.community_slots().collect(),
        }
    }

    pub fn contains(&self, slot: Slot) -> bool {
        match slot {
            Slot::Hole { seat, index } => {
                seat.0 >= 1 && seat.0 <= self.variant.seats() && index < self.variant.hole_cards()
            }
            Slot::Community(ordinal) => ordinal < COMMUNITY_SLOTS,
        }
    }

    pub fn card_at(&self, slot: Slot) -> Option<Card> {
        self.registry.card_at(slot)
    }

    pub fn is_empty(&self, slot: Slot) -> bool {
        self.card_at(slot).is_none()
    }

    /// The hole cards of `seat`, or `None` unless every hole slot is dealt.
    pub fn hole(&self, seat: SeatId) -> Option<Vec<Card>> {
        self.hole_slots(seat).map(|slot| self.card_at(slot)).collect()
    }

    pub fn is_complete(&self, seat: SeatId) -> bool {
        self.hole_slots(seat).all(|slot| !self.is_empty(slot))
    }

    pub fn all_seats_complete(&self) -> bool {
        self.seats().all(|seat| self.is_complete(seat))
    }

    /// Seats with every hole card dealt, in seat order.
    pub fn complete_seats(&self) -> Vec<SeatId> {
        self.seats().filter(|&seat| self.is_complete(seat)).collect()
    }

    /// The community cards that count: the filled prefix of the community
    /// when it is a flop, turn or river, and nothing otherwise.
    pub fn community(&self) -> Vec<Card> {
        let prefix: Vec<Card> = self
            .community_slots()
            .map_while(|slot| self.card_at(slot))
            .collect();
        if prefix.len() < FLOP_SLOTS as usize {
            Vec::new()
        } else {
            prefix
        }
    }

    /// Whether the rotation may hand out `slot` as the active slot.
    ///
    /// Hole slots only need to be empty. Community slots additionally wait
    /// until every seat is complete, and the turn and river until every
    /// community slot before them is dealt.
    pub fn is_offerable(&self, slot: Slot) -> bool {
        if !self.contains(slot) || !self.is_empty(slot) {
            return false;
        }
        match slot {
            Slot::Hole { .. } => true,
            Slot::Community(ordinal) => {
                self.all_seats_complete()
                    && (ordinal < FLOP_SLOTS
                        || (0..ordinal).all(|earlier| !self.is_empty(Slot::Community(earlier))))
            }
        }
    }

    /// Whether any card is on the table.
    pub fn has_cards(&self) -> bool {
        self.registry.assigned_count() > 0
    }

    /// Deal `card` into the active slot and advance the active slot.
    ///
    /// Returns the slot the card went to.
    pub fn deal(&mut self, card: Card) -> Result<Slot> {
        let slot = self.active.context(NoActiveSlotSnafu)?;
        self.registry.assign(card, slot)?;
        self.active = rotation::next_active_slot(self, Some(slot));
        debug!("dealt {} to {}; next {:?}", CardName(card), slot, self.active);
        Ok(slot)
    }

    /// Take the card out of `slot`, making the freed slot active.
    pub fn release(&mut self, slot: Slot) -> Result<Option<Card>> {
        ensure!(self.contains(slot), UnknownSlotSnafu { slot });
        let card = self.registry.release(slot);
        if card.is_some() {
            self.active = Some(slot);
        }
        Ok(card)
    }

    /// Take `card` off the table, making its former slot active.
    pub fn release_card(&mut self, card: Card) -> Option<Slot> {
        let slot = self.registry.release_card(card)?;
        self.active = Some(slot);
        Some(slot)
    }

    /// Make an empty slot the active one.
    pub fn select(&mut self, slot: Slot) -> Result<()> {
        ensure!(self.contains(slot), UnknownSlotSnafu { slot });
        ensure!(self.is_offerable(slot), SlotUnavailableSnafu { slot });
        self.active = Some(slot);
        Ok(())
    }

    /// Return every card to the deck and start over at `p1`.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.active = rotation::next_active_slot(self, None);
    }

    /// Switch to another variant; this resets the table.
    pub fn reconfigure(&mut self, variant: Variant) {
        self.variant = variant;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::parse_card;

    fn card(s: &str) -> Card {
        parse_card(s).expect("valid card")
    }

    fn deal_all(table: &mut TableState, cards: &[&str]) {
        for c in cards {
            table.deal(card(c)).expect("deal to succeed");
        }
    }

    #[test]
    fn new_table_starts_at_first_seat() {
        let table = TableState::new(Variant::HEADS_UP);
        assert_eq!(table.active(), Some(Slot::hole(1, 0)));
        assert_eq!(table.slots().len(), 2 * 2 + 5);
        assert!(!table.has_cards());
    }

    #[test]
    fn seats_complete_when_every_hole_card_is_dealt() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As"]);
        assert!(!table.is_complete(SeatId(1)));
        assert_eq!(table.hole(SeatId(1)), None);
        deal_all(&mut table, &["Kd"]);
        assert!(table.is_complete(SeatId(1)));
        assert_eq!(table.hole(SeatId(1)), Some(vec![card("As"), card("Kd")]));
        assert_eq!(table.complete_seats(), vec![SeatId(1)]);
    }

    #[test]
    fn partial_flop_does_not_count_as_community() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As", "Kd", "2h", "3c", "Qs", "Jh"]);
        assert!(table.community().is_empty());
        deal_all(&mut table, &["Tc"]);
        assert_eq!(table.community().len(), 3);
        deal_all(&mut table, &["9d"]);
        assert_eq!(table.community().len(), 4);
    }

    #[test]
    fn community_counts_only_the_filled_prefix() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As", "Kd", "2h", "3c", "Qs", "Jh", "Tc", "9d", "8s"]);
        assert_eq!(table.community().len(), 5);
        table.release(Slot::TURN).unwrap();
        assert_eq!(
            table.community(),
            vec![card("Qs"), card("Jh"), card("Tc")]
        );
        table.release(Slot::FLOP_2).unwrap();
        assert!(table.community().is_empty());
    }

    #[test]
    fn deal_without_active_slot_is_rejected() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As", "Kd", "2h", "3c", "Qs", "Jh", "Tc", "9d", "8s"]);
        assert_eq!(table.active(), None);
        assert_eq!(table.deal(card("7s")), Err(Error::NoActiveSlot));
        assert!(table.registry().is_available(card("7s")));
    }

    #[test]
    fn duplicate_deal_keeps_the_active_slot() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As"]);
        assert!(matches!(table.deal(card("As")), Err(Error::DuplicateCard { .. })));
        assert_eq!(table.active(), Some(Slot::hole(1, 1)));
        assert!(table.is_empty(Slot::hole(1, 1)));
    }

    #[test]
    fn release_activates_the_freed_slot() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As", "Kd", "2h"]);
        assert_eq!(table.active(), Some(Slot::hole(2, 1)));
        assert_eq!(table.release(Slot::hole(1, 0)), Ok(Some(card("As"))));
        assert_eq!(table.active(), Some(Slot::hole(1, 0)));
        assert_eq!(table.release_card(card("2h")), Some(Slot::hole(2, 0)));
        assert_eq!(table.active(), Some(Slot::hole(2, 0)));
    }

    #[test]
    fn releasing_an_empty_slot_changes_nothing() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As"]);
        assert_eq!(table.release(Slot::RIVER), Ok(None));
        assert_eq!(table.active(), Some(Slot::hole(1, 1)));
        assert_eq!(
            table.release(Slot::hole(3, 0)),
            Err(Error::UnknownSlot {
                slot: Slot::hole(3, 0)
            })
        );
    }

    #[test]
    fn select_refuses_filled_and_gated_slots() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As"]);
        assert_eq!(
            table.select(Slot::hole(1, 0)),
            Err(Error::SlotUnavailable {
                slot: Slot::hole(1, 0)
            })
        );
        assert!(table.select(Slot::FLOP_1).is_err());
        assert_eq!(table.select(Slot::hole(2, 1)), Ok(()));
        assert_eq!(table.active(), Some(Slot::hole(2, 1)));
    }

    #[test]
    fn reconfigure_returns_every_card() {
        let mut table = TableState::new(Variant::HEADS_UP);
        deal_all(&mut table, &["As", "Kd", "2h"]);
        table.reconfigure(Variant::Omaha { seats: 3 });
        assert!(!table.has_cards());
        assert_eq!(table.registry().available().len(), 52);
        assert_eq!(table.active(), Some(Slot::hole(1, 0)));
        assert_eq!(table.slots().len(), 3 * 4 + 5);
    }
}
