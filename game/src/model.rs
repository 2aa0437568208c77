use std::fmt;
use std::str::FromStr;

pub use rs_poker::core::{Card, Suit, Value};
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, Snafu};

/// Number of community slots: flop, turn and river.
pub const COMMUNITY_SLOTS: u8 = 5;

/// Number of community slots that make up the flop.
pub const FLOP_SLOTS: u8 = 3;

/// The two-character form of a card, e.g. `As`, `Td` or `2c`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CardName(pub Card);

impl From<Card> for CardName {
    fn from(card: Card) -> Self {
        CardName(card)
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0.value.to_char(), self.0.suit.to_char())
    }
}

#[derive(Debug, Snafu, Clone, Eq, PartialEq)]
pub enum ParseCardError {
    #[snafu(display("card {text:?} should be a rank followed by a suit"))]
    CardLength { text: String },
    #[snafu(display("unknown rank {rank:?}"))]
    UnknownRank { rank: char },
    #[snafu(display("unknown suit {suit:?}"))]
    UnknownSuit { suit: char },
}

/// Parse a card from its two-character form.
pub fn parse_card(text: &str) -> Result<Card, ParseCardError> {
    let mut chars = text.trim().chars();
    let (rank, suit) = match (chars.next(), chars.next(), chars.next()) {
        (Some(rank), Some(suit), None) => (rank, suit),
        _ => return CardLengthSnafu { text }.fail(),
    };
    let value = Value::from_char(rank).context(UnknownRankSnafu { rank })?;
    let suit = Suit::from_char(suit).context(UnknownSuitSnafu { suit })?;
    Ok(Card::new(value, suit))
}

/// Every card of the 52-card deck, grouped by suit and ordered by value.
pub fn deck() -> Vec<Card> {
    let values = Value::values();
    let mut cards = Vec::with_capacity(52);
    for &suit in Suit::suits().iter() {
        cards.extend(values.iter().map(|&value| Card::new(value, suit)));
    }
    cards
}

/// Join cards into the comma-separated wire form, e.g. `As,Kd`.
pub fn join_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|&c| CardName(c).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// A seat at the table. Seats are numbered from one and shown as `p1`, `p2`...
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct SeatId(pub u8);

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// An addressable destination for a single card.
///
/// Hole slots come first in the ordering, seat by seat, followed by the
/// community slots in dealing order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Slot {
    Hole { seat: SeatId, index: u8 },
    Community(u8),
}

/// The group a slot belongs to; rotation fills one group before moving on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Group {
    Seat(SeatId),
    Community,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SlotKind {
    Hole,
    Community,
}

impl Slot {
    pub const FLOP_1: Slot = Slot::Community(0);
    pub const FLOP_2: Slot = Slot::Community(1);
    pub const FLOP_3: Slot = Slot::Community(2);
    pub const TURN: Slot = Slot::Community(3);
    pub const RIVER: Slot = Slot::Community(4);

    pub fn hole(seat: u8, index: u8) -> Slot {
        Slot::Hole {
            seat: SeatId(seat),
            index,
        }
    }

    pub fn kind(&self) -> SlotKind {
        match self {
            Slot::Hole { .. } => SlotKind::Hole,
            Slot::Community(_) => SlotKind::Community,
        }
    }

    /// Position of the slot within its group.
    pub fn ordinal(&self) -> u8 {
        match *self {
            Slot::Hole { index, .. } => index,
            Slot::Community(ordinal) => ordinal,
        }
    }

    pub fn group(&self) -> Group {
        match *self {
            Slot::Hole { seat, .. } => Group::Seat(seat),
            Slot::Community(_) => Group::Community,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Slot::Hole { seat, index } => write!(f, "{}:{}", seat, index),
            Slot::Community(n @ 0..=2) => write!(f, "flop{}", n + 1),
            Slot::Community(3) => f.write_str("turn"),
            Slot::Community(4) => f.write_str("river"),
            Slot::Community(n) => write!(f, "community{}", n),
        }
    }
}

#[derive(Debug, Snafu, Clone, Eq, PartialEq)]
#[snafu(display("{text:?} is not a slot; expected e.g. p1:0, flop2, turn or river"))]
pub struct ParseSlotError {
    text: String,
}

impl FromStr for Slot {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let slot = match text.as_str() {
            "flop1" => Some(Slot::FLOP_1),
            "flop2" => Some(Slot::FLOP_2),
            "flop3" => Some(Slot::FLOP_3),
            "turn" => Some(Slot::TURN),
            "river" => Some(Slot::RIVER),
            hole => hole
                .strip_prefix('p')
                .and_then(|rest| rest.split_once(':'))
                .and_then(|(seat, index)| Some(Slot::hole(seat.parse().ok()?, index.parse().ok()?))),
        };
        slot.context(ParseSlotSnafu { text })
    }
}

/// Which odds service method a table is priced with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Game {
    Holdem,
    Omaha,
}

impl Game {
    pub fn hole_cards(self) -> u8 {
        match self {
            Game::Holdem => 2,
            Game::Omaha => 4,
        }
    }

    pub fn max_seats(self) -> u8 {
        match self {
            Game::Holdem => 10,
            Game::Omaha => 6,
        }
    }

    /// Remote method name computing odds for this game.
    pub fn method(self) -> &'static str {
        match self {
            Game::Holdem => "holdem.calculateOdds",
            Game::Omaha => "omaha.calculateOdds",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Game::Holdem => "holdem",
            Game::Omaha => "omaha",
        })
    }
}

/// A game variant: the game plus how many seats the table has.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Variant {
    Holdem { seats: u8 },
    Omaha { seats: u8 },
}

#[derive(Debug, Snafu, Clone, Eq, PartialEq)]
pub enum ParseVariantError {
    #[snafu(display("unknown game {name:?}; expected holdem, holdem-hu or omaha"))]
    UnknownGame { name: String },
    #[snafu(display("seat count {text:?} is not a number"))]
    SeatCount { text: String },
    #[snafu(display("{game} supports 2 to {max} seats, not {seats}"))]
    SeatRange { game: Game, seats: u8, max: u8 },
}

impl Variant {
    /// Heads-up hold'em.
    pub const HEADS_UP: Variant = Variant::Holdem { seats: 2 };

    pub fn new(game: Game, seats: u8) -> Result<Self, ParseVariantError> {
        let max = game.max_seats();
        ensure!(seats >= 2 && seats <= max, SeatRangeSnafu { game, seats, max });
        Ok(match game {
            Game::Holdem => Variant::Holdem { seats },
            Game::Omaha => Variant::Omaha { seats },
        })
    }

    pub fn game(&self) -> Game {
        match self {
            Variant::Holdem { .. } => Game::Holdem,
            Variant::Omaha { .. } => Game::Omaha,
        }
    }

    pub fn seats(&self) -> u8 {
        match *self {
            Variant::Holdem { seats } | Variant::Omaha { seats } => seats,
        }
    }

    pub fn hole_cards(&self) -> u8 {
        self.game().hole_cards()
    }

    pub fn seat_ids(&self) -> impl Iterator<Item = SeatId> {
        (1..=self.seats()).map(SeatId)
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Holdem { seats: 10 }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.game(), self.seats())
    }
}

impl FromStr for Variant {
    type Err = ParseVariantError;

    /// Accepts the preset names `holdem-hu`, `holdem` and `omaha`, optionally
    /// followed by an explicit seat count, e.g. `holdem:6`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let (name, seats) = match text.split_once(':') {
            Some((name, seats)) => (name, Some(seats)),
            None => (text.as_str(), None),
        };
        let (game, default_seats) = match name {
            "holdem-hu" => (Game::Holdem, 2),
            "holdem" => (Game::Holdem, 10),
            "omaha" => (Game::Omaha, 6),
            _ => return UnknownGameSnafu { name }.fail(),
        };
        let seats: u8 = match seats {
            Some(text) => text.parse().ok().context(SeatCountSnafu { text })?,
            None => default_seats,
        };
        Variant::new(game, seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_parse_and_print_in_short_form() {
        let card = parse_card("Td").expect("valid card");
        assert_eq!(card, Card::new(Value::Ten, Suit::Diamond));
        assert_eq!(CardName(card).to_string(), "Td");
        assert_eq!(CardName(parse_card("2c").unwrap()).to_string(), "2c");
    }

    #[test]
    fn malformed_cards_are_rejected() {
        assert!(matches!(parse_card("A"), Err(ParseCardError::CardLength { .. })));
        assert!(matches!(parse_card("Asd"), Err(ParseCardError::CardLength { .. })));
        assert_eq!(parse_card("1s"), Err(ParseCardError::UnknownRank { rank: '1' }));
        assert_eq!(parse_card("Ax"), Err(ParseCardError::UnknownSuit { suit: 'x' }));
    }

    #[test]
    fn deck_has_52_distinct_cards() {
        let deck = deck();
        assert_eq!(deck.len(), 52);
        let unique: std::collections::HashSet<_> = deck.iter().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn slots_round_trip_through_text() {
        for slot in &[Slot::hole(1, 0), Slot::hole(10, 3), Slot::FLOP_2, Slot::TURN, Slot::RIVER] {
            assert_eq!(slot.to_string().parse::<Slot>().as_ref(), Ok(slot));
        }
        assert!("p1".parse::<Slot>().is_err());
        assert!("board".parse::<Slot>().is_err());
    }

    #[test]
    fn seats_order_numerically() {
        assert!(SeatId(2) < SeatId(10));
        assert!(Slot::hole(10, 1) < Slot::FLOP_1);
    }

    #[test]
    fn variant_presets() {
        assert_eq!("holdem-hu".parse::<Variant>(), Ok(Variant::HEADS_UP));
        assert_eq!("holdem".parse::<Variant>(), Ok(Variant::Holdem { seats: 10 }));
        assert_eq!("omaha".parse::<Variant>(), Ok(Variant::Omaha { seats: 6 }));
        assert_eq!("Holdem:6".parse::<Variant>(), Ok(Variant::Holdem { seats: 6 }));
        assert_eq!(Variant::Omaha { seats: 4 }.hole_cards(), 4);
    }

    #[test]
    fn variant_seat_counts_are_bounded() {
        assert!(matches!(
            "omaha:7".parse::<Variant>(),
            Err(ParseVariantError::SeatRange { seats: 7, .. })
        ));
        assert!(Variant::new(Game::Holdem, 1).is_err());
        assert!(matches!(
            "holdem:x".parse::<Variant>(),
            Err(ParseVariantError::SeatCount { .. })
        ));
        assert!(matches!(
            "stud".parse::<Variant>(),
            Err(ParseVariantError::UnknownGame { .. })
        ));
    }
}
