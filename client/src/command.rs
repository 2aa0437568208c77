//! The line-oriented command language of the terminal board.

use std::str::FromStr;

use snafu::{ensure, OptionExt, ResultExt, Snafu};

use oddsboard_game::model::{
    parse_card, Card, ParseCardError, ParseSlotError, ParseVariantError, Slot, Variant,
};

pub const HELP: &str = "\
commands:
    deal <card>...      deal cards into the active slot, e.g. deal As Kd
    toggle <card>       deal a card, or take it back if it is dealt
    clear <slot|card>   empty a slot, e.g. clear p1:0, clear flop2, clear As
    select <slot>       choose the slot that receives the next card
    reset               return every card to the deck
    variant <name>      switch games: holdem-hu, holdem, omaha, holdem:6...
    show                print the table and the odds
    help                print this text
    quit                leave";

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    Deal(Vec<Card>),
    Toggle(Card),
    Release(Slot),
    ReleaseCard(Card),
    Select(Slot),
    Reset,
    Variant(Variant),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Snafu, Clone, Eq, PartialEq)]
pub enum CommandError {
    #[snafu(display("unknown command {name:?}; try help"))]
    UnknownCommand { name: String },

    #[snafu(display("{command} needs an argument"))]
    MissingArgument { command: &'static str },

    #[snafu(display("{command} takes a single argument"))]
    ExtraArguments { command: &'static str },

    #[snafu(display("{source}"))]
    BadCard { source: ParseCardError },

    #[snafu(display("{source}"))]
    BadSlot { source: ParseSlotError },

    #[snafu(display("{source}"))]
    BadVariant { source: ParseVariantError },
}

impl FromStr for Command {
    type Err = CommandError;

    /// Parse one input line. Blank lines are not commands; callers skip them.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();
        Ok(match name.as_str() {
            "deal" | "d" => {
                ensure!(!args.is_empty(), MissingArgumentSnafu { command: "deal" });
                let cards: Vec<Card> = args
                    .iter()
                    .map(|a| parse_card(a))
                    .collect::<Result<_, _>>()
                    .context(BadCardSnafu)?;
                Command::Deal(cards)
            }
            "toggle" | "t" => {
                let arg = single("toggle", &args)?;
                Command::Toggle(parse_card(arg).context(BadCardSnafu)?)
            }
            "clear" | "c" => {
                let arg = single("clear", &args)?;
                match arg.parse::<Slot>() {
                    Ok(slot) => Command::Release(slot),
                    Err(_) => Command::ReleaseCard(parse_card(arg).context(BadCardSnafu)?),
                }
            }
            "select" | "s" => {
                let arg = single("select", &args)?;
                Command::Select(arg.parse::<Slot>().context(BadSlotSnafu)?)
            }
            "reset" => Command::Reset,
            "variant" => {
                let arg = single("variant", &args)?;
                Command::Variant(arg.parse::<Variant>().context(BadVariantSnafu)?)
            }
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return UnknownCommandSnafu { name }.fail(),
        })
    }
}

fn single<'a>(command: &'static str, args: &[&'a str]) -> Result<&'a str, CommandError> {
    ensure!(args.len() <= 1, ExtraArgumentsSnafu { command });
    args.first().copied().context(MissingArgumentSnafu { command })
}
