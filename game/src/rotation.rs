//! Choosing the next active slot after a card is dealt.
//!
//! Seats are filled one at a time: the rest of the current group first, then
//! the next incomplete seat clockwise, and the community only once every seat
//! holds all of its hole cards. The community sits after the last seat, so
//! rotating away from it starts again at `p1`.

use crate::model::{Group, SeatId, Slot};
use crate::table::TableState;

/// The slot that should become active after `just_filled` was dealt, or
/// after a reset when `just_filled` is `None`.
///
/// Returns `None` once no slot can be offered, which only happens when the
/// table is full.
pub fn next_active_slot(table: &TableState, just_filled: Option<Slot>) -> Option<Slot> {
    let current = just_filled.map(|slot| slot.group());

    // Keep filling the current group.
    if let Some(slot) = current.and_then(|group| first_open(table, group)) {
        return Some(slot);
    }

    // Move on to the next incomplete seat.
    let seats: Vec<SeatId> = table.seats().collect();
    let start = match current {
        Some(Group::Seat(seat)) => seats
            .iter()
            .position(|&s| s == seat)
            .map_or(0, |i| (i + 1) % seats.len()),
        Some(Group::Community) | None => 0,
    };
    let rotated = seats[start..].iter().chain(seats[..start].iter());
    for &seat in rotated {
        if let Some(slot) = first_open(table, Group::Seat(seat)) {
            return Some(slot);
        }
    }

    // Every seat is complete: deal the board.
    first_open(table, Group::Community)
}

// The lowest-ordinal empty slot of `group`, if the gating rules allow it to
// be offered.
fn first_open(table: &TableState, group: Group) -> Option<Slot> {
    table
        .group_slots(group)
        .into_iter()
        .find(|&slot| table.is_empty(slot))
        .filter(|&slot| table.is_offerable(slot))
}
