//! The interactive loop: commands in, table and odds out.

use futures::future::BoxFuture;
use futures::stream::futures_unordered::FuturesUnordered;
use futures::{Future, StreamExt};
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use oddsboard_game::coalescer::{PendingOdds, Reply, State};
use oddsboard_game::model::{CardName, Group, Slot};
use oddsboard_game::protocol::OddsService;
use oddsboard_game::{Error, OddsController};

use crate::command::{Command, HELP};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

/// An odds board together with the requests it has in flight.
pub struct Session<S> {
    board: OddsController<S>,
    pending: FuturesUnordered<BoxFuture<'static, Reply>>,
}

impl<S: OddsService> Session<S> {
    pub fn new(board: OddsController<S>) -> Self {
        Session {
            board,
            pending: FuturesUnordered::new(),
        }
    }

    pub fn board(&self) -> &OddsController<S> {
        &self.board
    }

    /// Number of odds requests still waiting for a reply.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Run one line of input. Returns the text to show the user.
    pub fn handle_line(&mut self, line: &str) -> (Flow, String) {
        let line = line.trim();
        if line.is_empty() {
            return (Flow::Continue, String::new());
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => return (Flow::Continue, format!("error: {}\n", e)),
        };
        debug!("executing {:?}", command);
        match self.execute(command) {
            Ok(step) => step,
            Err(e) => (Flow::Continue, format!("error: {}\n", e)),
        }
    }

    /// Apply a finished odds request. Stale replies print nothing.
    pub fn handle_reply(&mut self, reply: Reply) -> String {
        match self.board.resolve(reply) {
            Ok(_) => render_odds(&self.board),
            Err(Error::StaleResponse { .. }) => String::new(),
            Err(e) => format!("error: {}\n", e),
        }
    }

    fn execute(&mut self, command: Command) -> Result<(Flow, String), Error> {
        match command {
            Command::Deal(cards) => {
                for card in cards {
                    let pending = self.board.deal(card)?;
                    self.track(pending);
                }
            }
            Command::Toggle(card) => {
                let pending = self.board.toggle(card)?;
                self.track(pending);
            }
            Command::Release(slot) => {
                let pending = self.board.release(slot)?;
                self.track(pending);
            }
            Command::ReleaseCard(card) => {
                let pending = self.board.release_card(card)?;
                self.track(pending);
            }
            Command::Select(slot) => {
                let pending = self.board.select(slot)?;
                self.track(pending);
            }
            Command::Reset => {
                let pending = self.board.reset()?;
                self.track(pending);
            }
            Command::Variant(variant) => {
                let pending = self.board.configure(variant)?;
                self.track(pending);
            }
            Command::Show => return Ok((Flow::Continue, render(&self.board))),
            Command::Help => return Ok((Flow::Continue, format!("{}\n", HELP))),
            Command::Quit => return Ok((Flow::Quit, String::new())),
        }
        Ok((Flow::Continue, self.status()))
    }

    fn track(&mut self, pending: Option<PendingOdds>) {
        if let Some(pending) = pending {
            debug!("awaiting odds for {}", pending.fingerprint());
            self.pending.push(pending.wait());
        }
    }

    fn status(&self) -> String {
        let table = self.board.table();
        let mut status = match table.active() {
            Some(slot) => format!("next: {}", slot),
            None => "next: none".to_string(),
        };
        if self.board.state() == State::AwaitingResponse {
            status.push_str(" (calculating odds)");
        } else if self.board.displayed().is_none() {
            status.push_str(" (no odds)");
        }
        status.push('\n');
        status
    }
}

/// Print the table, one group per line, with the active slot in brackets.
pub fn render<S: OddsService>(board: &OddsController<S>) -> String {
    let table = board.table();
    let show = |slot: Slot| {
        let text = table
            .card_at(slot)
            .map_or_else(|| "__".to_string(), |c| CardName(c).to_string());
        if table.active() == Some(slot) {
            format!("[{}]", text)
        } else {
            text
        }
    };
    let mut out = format!("{} table\n", board.variant());
    for seat in table.seats() {
        let cards: Vec<String> = table
            .group_slots(Group::Seat(seat))
            .into_iter()
            .map(show)
            .collect();
        out.push_str(&format!("{}: {}\n", seat, cards.join(" ")));
    }
    let board_cards: Vec<String> = table.community_slots().map(show).collect();
    out.push_str(&format!("board: {}\n", board_cards.join(" ")));
    out.push_str(&render_odds(board));
    out
}

/// The odds on display, one seat per line, flagged when they belong to an
/// earlier table.
pub fn render_odds<S: OddsService>(board: &OddsController<S>) -> String {
    let displayed = match board.displayed() {
        Some(displayed) => displayed,
        None => return "odds: none\n".to_string(),
    };
    let mut out = String::new();
    if !board.is_display_current() {
        out.push_str(&format!("odds for earlier table {}:\n", displayed.fingerprint));
    }
    for odds in &displayed.odds {
        out.push_str(&format!("{}\n", odds));
    }
    out
}

/// Drive `session` from `input` until end of input, `quit` or `shutdown`.
///
/// At end of input the session keeps running until every outstanding request
/// has been answered, so the last odds are always shown.
pub async fn run<S, R, W, F>(
    mut session: Session<S>,
    input: R,
    mut output: W,
    shutdown: F,
) -> anyhow::Result<()>
where
    S: OddsService,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();
    let mut input_done = false;

    write(
        &mut output,
        &format!("{} table; type help for commands\n", session.board.variant()),
    )
    .await?;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("received shutdown signal");
                break;
            },
            line = lines.next_line(), if !input_done => match line? {
                Some(line) => {
                    let (flow, text) = session.handle_line(&line);
                    write(&mut output, &text).await?;
                    if flow == Flow::Quit {
                        break;
                    }
                }
                None => {
                    debug!("end of input; {} requests in flight", session.in_flight());
                    input_done = true;
                    if session.pending.is_empty() {
                        break;
                    }
                }
            },
            Some(reply) = session.pending.next(), if !session.pending.is_empty() => {
                let text = session.handle_reply(reply);
                write(&mut output, &text).await?;
                if input_done && session.pending.is_empty() {
                    break;
                }
            },
        }
    }

    info!("leaving {} requests unanswered", session.in_flight());
    Ok(())
}

async fn write<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    if !text.is_empty() {
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}
