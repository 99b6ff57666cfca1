#![cfg(feature = "std")]
//! Messages exchanged between a peer and its session.

pub mod codec;

use serde::{Deserialize, Serialize};

use crate::common::{ShipId, ShotOutcome};
use crate::game::{PlayerId, ShotReport};
use crate::ship::Orientation;
use crate::snapshot::BoardSnapshot;

pub use crate::config::PROTOCOL_VERSION;
pub use codec::{decode_frame, encode_frame, read_message, write_message, ProtocolError};

/// The closed message catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Peer → session: opening handshake with a display name.
    Connect { name: String, version: u16 },
    /// Session → peer: seat assigned to this connection.
    PlayerId { id: PlayerId },
    /// Peer → session: one placement attempt.
    PlaceShip {
        ship: ShipId,
        x: i32,
        y: i32,
        orientation: Orientation,
    },
    /// Session → peer: outcome of the last placement attempt.
    PlaceResult {
        ship: ShipId,
        accepted: bool,
        reason: Option<String>,
    },
    /// Session → both: `player` has placed the whole fleet.
    FleetReady { player: PlayerId },
    /// Session → peer: it is your move.
    YourTurn,
    /// Session → peer: waiting on the named opponent.
    OpponentTurn { opponent: String },
    /// Peer → session: fire at (x, y) on the opponent's board.
    Shoot { x: i32, y: i32 },
    /// Session → peer(s): outcome of a shot.
    ShotResult {
        shooter: PlayerId,
        x: i32,
        y: i32,
        accepted: bool,
        hit: bool,
        sunk: Option<ShipId>,
    },
    /// Session → peer: own board in full, opponent board masked.
    Snapshot {
        own: BoardSnapshot,
        opponent: BoardSnapshot,
    },
    /// Session → both: the match is over.
    GameOver { winner: PlayerId },
    /// Session → peer: a protocol or validation violation.
    Error { message: String },
    /// Either direction: the connection is being closed.
    Disconnect { reason: String },
}

impl Message {
    /// Short variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Connect { .. } => "connect",
            Message::PlayerId { .. } => "player-id",
            Message::PlaceShip { .. } => "place-ship",
            Message::PlaceResult { .. } => "place-result",
            Message::FleetReady { .. } => "fleet-ready",
            Message::YourTurn => "your-turn",
            Message::OpponentTurn { .. } => "opponent-turn",
            Message::Shoot { .. } => "shoot",
            Message::ShotResult { .. } => "shot-result",
            Message::Snapshot { .. } => "state-snapshot",
            Message::GameOver { .. } => "game-over",
            Message::Error { .. } => "error",
            Message::Disconnect { .. } => "disconnect",
        }
    }

    /// `ShotResult` for a shot the match accepted.
    pub fn shot_accepted(report: &ShotReport) -> Self {
        Message::ShotResult {
            shooter: report.shooter,
            x: report.x,
            y: report.y,
            accepted: true,
            hit: report.outcome.is_hit(),
            sunk: report.outcome.sunk_ship(),
        }
    }

    /// `ShotResult` for a shot the match refused.
    pub fn shot_rejected(shooter: PlayerId, x: i32, y: i32) -> Self {
        Message::ShotResult {
            shooter,
            x,
            y,
            accepted: false,
            hit: false,
            sunk: None,
        }
    }

    /// Rebuild the board-level outcome carried by an accepted `ShotResult`.
    pub fn shot_outcome(&self) -> Option<ShotOutcome> {
        match *self {
            Message::ShotResult {
                accepted: true,
                hit,
                sunk,
                ..
            } => Some(match (hit, sunk) {
                (_, Some(id)) => ShotOutcome::Sunk(id),
                (true, None) => ShotOutcome::Hit,
                (false, None) => ShotOutcome::Miss,
            }),
            _ => None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Message::Error {
            message: message.into(),
        }
    }

    pub fn disconnect(reason: impl Into<String>) -> Self {
        Message::Disconnect {
            reason: reason.into(),
        }
    }
}
