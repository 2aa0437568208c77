//! Which cards are still in the deck, and which slot holds each dealt card.

use std::collections::{BTreeMap, HashMap};

use snafu::ensure;

use crate::error::{DuplicateCardSnafu, Result};
use crate::model::{deck, Card, CardName, Slot};

/// Binds cards to slots.
///
/// Both directions of the binding are kept so that neither a card nor a slot
/// can ever appear twice: the card-to-slot mapping is injective at all times.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    slots: HashMap<Card, Slot>,
    cards: BTreeMap<Slot, Card>,
}

impl Registry {
    /// Create a registry with every card in the deck.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Deal `card` into `slot`.
    ///
    /// Fails without touching anything if the card already sits in another
    /// slot. Otherwise any card previously in `slot` goes back to the deck
    /// and is returned.
    pub fn assign(&mut self, card: Card, slot: Slot) -> Result<Option<Card>> {
        if let Some(&bound) = self.slots.get(&card) {
            ensure!(
                bound == slot,
                DuplicateCardSnafu {
                    card: CardName(card),
                    slot: bound,
                }
            );
            return Ok(None);
        }
        let previous = self.release(slot);
        self.slots.insert(card, slot);
        self.cards.insert(slot, card);
        Ok(previous)
    }

    /// Return the card in `slot`, if any, to the deck.
    pub fn release(&mut self, slot: Slot) -> Option<Card> {
        let card = self.cards.remove(&slot)?;
        self.slots.remove(&card);
        Some(card)
    }

    /// Return `card` to the deck wherever it is dealt, yielding its old slot.
    pub fn release_card(&mut self, card: Card) -> Option<Slot> {
        let slot = self.slots.remove(&card)?;
        self.cards.remove(&slot);
        Some(slot)
    }

    /// Return every card to the deck.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.cards.clear();
    }

    pub fn is_available(&self, card: Card) -> bool {
        !self.slots.contains_key(&card)
    }

    pub fn slot_of(&self, card: Card) -> Option<Slot> {
        self.slots.get(&card).copied()
    }

    pub fn card_at(&self, slot: Slot) -> Option<Card> {
        self.cards.get(&slot).copied()
    }

    pub fn assigned_count(&self) -> usize {
        self.cards.len()
    }

    /// The cards still in the deck, in deck order.
    pub fn available(&self) -> Vec<Card> {
        deck().into_iter().filter(|&c| self.is_available(c)).collect()
    }

    /// Dealt cards in slot order.
    pub fn assigned(&self) -> impl Iterator<Item = (Slot, Card)> + '_ {
        self.cards.iter().map(|(&slot, &card)| (slot, card))
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

    fn assert_injective(registry: &Registry) {
        assert_eq!(registry.slots.len(), registry.cards.len());
        for (slot, card) in registry.assigned() {
            assert_eq!(registry.slot_of(card), Some(slot));
        }
    }

    #[test]
    fn assigning_takes_the_card_out_of_the_deck() {
        let mut registry = Registry::new();
        assert_eq!(registry.available().len(), 52);
        assert_eq!(registry.assign(card("As"), Slot::hole(1, 0)), Ok(None));
        assert!(!registry.is_available(card("As")));
        assert_eq!(registry.card_at(Slot::hole(1, 0)), Some(card("As")));
        assert_eq!(registry.available().len(), 51);
    }

    #[test]
    fn duplicate_assignment_fails_without_mutation() {
        let mut registry = Registry::new();
        registry.assign(card("As"), Slot::hole(1, 0)).unwrap();
        registry.assign(card("Kd"), Slot::hole(2, 0)).unwrap();

        let err = registry.assign(card("As"), Slot::hole(2, 0)).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateCard {
                card: CardName(card("As")),
                slot: Slot::hole(1, 0),
            }
        );
        assert_eq!(registry.card_at(Slot::hole(1, 0)), Some(card("As")));
        assert_eq!(registry.card_at(Slot::hole(2, 0)), Some(card("Kd")));
        assert_injective(&registry);
    }

    #[test]
    fn reassigning_a_slot_returns_the_previous_card() {
        let mut registry = Registry::new();
        registry.assign(card("As"), Slot::FLOP_1).unwrap();
        assert_eq!(registry.assign(card("Qh"), Slot::FLOP_1), Ok(Some(card("As"))));
        assert!(registry.is_available(card("As")));
        assert_injective(&registry);
    }

    #[test]
    fn assigning_a_card_to_its_own_slot_is_a_no_op() {
        let mut registry = Registry::new();
        registry.assign(card("7c"), Slot::TURN).unwrap();
        assert_eq!(registry.assign(card("7c"), Slot::TURN), Ok(None));
        assert_eq!(registry.assigned_count(), 1);
    }

    #[test]
    fn release_is_a_no_op_on_empty_slots() {
        let mut registry = Registry::new();
        assert_eq!(registry.release(Slot::RIVER), None);
        registry.assign(card("2h"), Slot::RIVER).unwrap();
        assert_eq!(registry.release(Slot::RIVER), Some(card("2h")));
        assert!(registry.is_available(card("2h")));
        assert_eq!(registry.release_card(card("2h")), None);
    }

    #[test]
    fn stays_injective_under_mixed_operations() {
        let mut registry = Registry::new();
        let cards = deck();
        let slots: Vec<Slot> = (1..=4)
            .flat_map(|seat| (0..2).map(move |i| Slot::hole(seat, i)))
            .chain((0..5).map(Slot::Community))
            .collect();
        for step in 0..400usize {
            let card = cards[(step * 7) % 13];
            let slot = slots[(step * 5) % slots.len()];
            match step % 3 {
                0 | 1 => {
                    let _ = registry.assign(card, slot);
                }
                _ => {
                    registry.release(slot);
                }
            }
            assert_injective(&registry);
        }
    }
}
