//! Turn state machine for one two-player match.
//!
//! A `Match` owns both players' boards and moves strictly forward through
//! `Setup → Playing → Finished`. Every operation validates first and mutates
//! second, so a rejected call leaves the match exactly as it was.
//!
//! Turn rule: the turn passes to the other player after every accepted shot,
//! hit or miss. Player one always shoots first.

use core::fmt;
use rand::Rng;

use crate::board::Board;
use crate::common::{BoardError, ShipId, ShotOutcome};
use crate::ship::Orientation;
use crate::snapshot::{BoardSnapshot, SnapshotView};

/// One of the two seats in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "std",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "u8", try_from = "u8")
)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    /// Both seats, in turn order.
    pub const BOTH: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// The other seat.
    pub fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Numeric id used in logs and on the wire (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    fn index(self) -> usize {
        self.number() as usize - 1
    }
}

impl From<PlayerId> for u8 {
    fn from(player: PlayerId) -> u8 {
        player.number()
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = MatchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerId::One),
            2 => Ok(PlayerId::Two),
            other => Err(MatchError::UnknownPlayer(other)),
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

/// Coarse match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Setup,
    Playing,
    Finished,
}

/// Reasons a match operation is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The operation is not allowed in the current phase.
    WrongPhase { expected: Phase, actual: Phase },
    /// A shot from the player who is not on turn.
    NotYourTurn(PlayerId),
    /// A numeric player id other than 1 or 2.
    UnknownPlayer(u8),
    /// The board rejected the placement or shot.
    Board(BoardError),
}

impl From<BoardError> for MatchError {
    fn from(err: BoardError) -> Self {
        MatchError::Board(err)
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::WrongPhase { expected, actual } => {
                write!(f, "not allowed during {:?} (requires {:?})", actual, expected)
            }
            MatchError::NotYourTurn(p) => write!(f, "it is not {}'s turn", p),
            MatchError::UnknownPlayer(n) => write!(f, "unknown player id {}", n),
            MatchError::Board(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MatchError {}

/// Result of an accepted placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementReport {
    pub player: PlayerId,
    pub ship: ShipId,
    /// This placement completed the player's fleet.
    pub fleet_complete: bool,
    /// Both fleets are complete and the match is now playing.
    pub started: bool,
}

/// Result of an accepted shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotReport {
    pub shooter: PlayerId,
    pub x: i32,
    pub y: i32,
    pub outcome: ShotOutcome,
    /// Set when this shot sank the defender's last ship.
    pub winner: Option<PlayerId>,
}

/// Two boards, a phase, a turn and eventually a winner.
#[derive(Debug, Clone)]
pub struct Match {
    boards: [Board; 2],
    phase: Phase,
    turn: PlayerId,
    winner: Option<PlayerId>,
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    /// A fresh match in `Setup` with empty boards.
    pub fn new() -> Self {
        Self {
            boards: [Board::new(), Board::new()],
            phase: Phase::Setup,
            turn: PlayerId::One,
            winner: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Player on turn. Meaningful while `Playing`.
    pub fn turn(&self) -> PlayerId {
        self.turn
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// The board owned by `player`.
    pub fn board(&self, player: PlayerId) -> &Board {
        &self.boards[player.index()]
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), MatchError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(MatchError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    /// Place one of `player`'s ships. Starts play once both fleets are complete.
    pub fn place_ship(
        &mut self,
        player: PlayerId,
        ship: ShipId,
        x: i32,
        y: i32,
        orientation: Orientation,
    ) -> Result<PlacementReport, MatchError> {
        self.expect_phase(Phase::Setup)?;
        let board = &mut self.boards[player.index()];
        board.place(ship, x, y, orientation)?;
        let fleet_complete = board.is_fleet_complete();
        let started = self.try_start();
        Ok(PlacementReport {
            player,
            ship,
            fleet_complete,
            started,
        })
    }

    /// Fill the rest of `player`'s fleet with random placements.
    pub fn place_random_fleet<R: Rng>(
        &mut self,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<bool, MatchError> {
        self.expect_phase(Phase::Setup)?;
        self.boards[player.index()].place_random_fleet(rng)?;
        Ok(self.try_start())
    }

    fn try_start(&mut self) -> bool {
        if self.boards.iter().all(Board::is_fleet_complete) {
            self.phase = Phase::Playing;
            self.turn = PlayerId::One;
            true
        } else {
            false
        }
    }

    /// Fire at the opponent of `player`.
    ///
    /// The win check runs before the turn flips, so the shooter of the
    /// sinking shot is the winner and the turn stays put once finished.
    pub fn shoot(&mut self, player: PlayerId, x: i32, y: i32) -> Result<ShotReport, MatchError> {
        self.expect_phase(Phase::Playing)?;
        if player != self.turn {
            return Err(MatchError::NotYourTurn(player));
        }
        let defender = &mut self.boards[player.opponent().index()];
        let outcome = defender.shoot(x, y)?;
        let winner = if defender.all_ships_sunk() {
            self.phase = Phase::Finished;
            self.winner = Some(player);
            Some(player)
        } else {
            self.turn = player.opponent();
            None
        };
        Ok(ShotReport {
            shooter: player,
            x,
            y,
            outcome,
            winner,
        })
    }

    /// End the match early in favour of `player`'s opponent.
    pub fn forfeit(&mut self, player: PlayerId) -> Result<PlayerId, MatchError> {
        if self.phase == Phase::Finished {
            return Err(MatchError::WrongPhase {
                expected: Phase::Playing,
                actual: Phase::Finished,
            });
        }
        let winner = player.opponent();
        self.phase = Phase::Finished;
        self.winner = Some(winner);
        Ok(winner)
    }

    /// `player`'s own board in full and the opponent's board masked.
    pub fn snapshot_for(&self, player: PlayerId) -> (BoardSnapshot, BoardSnapshot) {
        (
            self.board(player).snapshot(SnapshotView::Owner),
            self.board(player.opponent()).snapshot(SnapshotView::Opponent),
        )
    }
}
