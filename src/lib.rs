#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod bitboard;
mod board;
mod common;
mod config;
mod game;
mod ship;
mod snapshot;
#[cfg(feature = "std")]
pub mod bot;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod peer;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod registry;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use ship::*;
pub use snapshot::*;
#[cfg(feature = "std")]
pub use bot::{BotReport, RandomBot};
#[cfg(feature = "std")]
pub use logging::{init_logging, level_from, LOG_ENV};
#[cfg(feature = "std")]
pub use protocol::{Message, ProtocolError};
#[cfg(feature = "std")]
pub use registry::{ConnectionId, SessionId, SessionRegistry, SessionTicket};
#[cfg(feature = "std")]
pub use session::{Session, SessionEnd, SessionOutcome};
#[cfg(feature = "std")]
pub use transport::stream::TcpTransport;
