//! Client-side display core for a two-role quiz duel.
//!
//! Consumes typed events pushed by the game server over one websocket per
//! session and turns them into deterministic render transitions for two
//! cooperating screens: the game-master control panel and the public game
//! display. The embedding page supplies a [`RenderSink`] and gets back a
//! [`Session`] that owns the connection. Everything else is reactive: the
//! state machine only runs in response to an inbound event or a reveal
//! timer firing.

mod error;
mod game;
mod model;
mod render;
mod session;
mod types;

pub use error::Error;
pub use game::{RevealControl, Screen, ScreenRole, HOLD_MS, PERIOD_MS};
pub use model::{
    AnswerSlot, AnswerState, CategorySlot, CategoryState, Pane, Phase, RankingResult,
    RenderModel, ScreenConfig,
};
pub use render::{NullSink, RenderSink};
pub use session::Session;
pub use types::{ClientCommand, Scoreboard, ServerEvent, SlotKey, TeamScore};
