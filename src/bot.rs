#![cfg(feature = "std")]
//! A protocol client that places a random fleet and fires at random cells.
//!
//! Used by the `bot` and `local` subcommands and by the end-to-end tests.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::board::{Board, Placement};
use crate::config::{BOARD_HEIGHT, BOARD_WIDTH, NUM_SHIPS};
use crate::common::ShipId;
use crate::game::PlayerId;
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::Transport;

/// What a bot saw of its match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotReport {
    pub name: String,
    /// Seat assigned by the session.
    pub player: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    /// Accepted shots fired by this bot.
    pub shots: u32,
    pub hits: u32,
    pub sunk: Vec<ShipId>,
    /// Reason given in the session's final `Disconnect`.
    pub reason: Option<String>,
}

impl BotReport {
    pub fn won(&self) -> bool {
        self.player.is_some() && self.player == self.winner
    }
}

pub struct RandomBot<R> {
    name: String,
    rng: R,
    fleet: Board,
    /// Untried target cells; the next shot is popped off the end.
    targets: Vec<(i32, i32)>,
}

impl<R: Rng + Send> RandomBot<R> {
    pub fn new(name: impl Into<String>, mut rng: R) -> Self {
        let mut targets: Vec<(i32, i32)> = (0..BOARD_HEIGHT as i32)
            .flat_map(|y| (0..BOARD_WIDTH as i32).map(move |x| (x, y)))
            .collect();
        targets.shuffle(&mut rng);
        Self {
            name: name.into(),
            rng,
            fleet: Board::new(),
            targets,
        }
    }

    /// The board this bot placed, once `play` has sent its fleet.
    pub fn fleet(&self) -> &Board {
        &self.fleet
    }

    fn plan_fleet(&mut self) -> anyhow::Result<Vec<Placement>> {
        let mut board = Board::new();
        let mut placements = Vec::with_capacity(NUM_SHIPS);
        for ship in 0..NUM_SHIPS as ShipId {
            let p = board
                .random_placement(&mut self.rng, ship)
                .map_err(|e| anyhow::anyhow!("planning fleet: {}", e))?;
            board
                .place(p.ship, p.x, p.y, p.orientation)
                .map_err(|e| anyhow::anyhow!("planning fleet: {}", e))?;
            placements.push(p);
        }
        self.fleet = board;
        Ok(placements)
    }

    /// Play one match over `transport` until the session disconnects.
    pub async fn play<T>(&mut self, transport: &mut T) -> anyhow::Result<BotReport>
    where
        T: Transport + ?Sized,
    {
        let mut report = BotReport {
            name: self.name.clone(),
            player: None,
            winner: None,
            shots: 0,
            hits: 0,
            sunk: Vec::new(),
            reason: None,
        };

        transport
            .send(Message::Connect {
                name: self.name.clone(),
                version: PROTOCOL_VERSION,
            })
            .await?;

        loop {
            let msg = match transport.recv().await {
                Ok(msg) => msg,
                // The session may close the stream right after its last message.
                Err(e) if report.winner.is_some() => {
                    debug!("{}: connection ended after game over: {}", self.name, e);
                    return Ok(report);
                }
                Err(e) => return Err(e),
            };
            match msg {
                Message::PlayerId { id } => {
                    debug!("{} seated as {}", self.name, id);
                    report.player = Some(id);
                    for p in self.plan_fleet()? {
                        transport
                            .send(Message::PlaceShip {
                                ship: p.ship,
                                x: p.x,
                                y: p.y,
                                orientation: p.orientation,
                            })
                            .await?;
                    }
                }
                Message::PlaceResult {
                    ship,
                    accepted: false,
                    reason,
                } => {
                    anyhow::bail!(
                        "placement of ship {} rejected: {}",
                        ship,
                        reason.unwrap_or_default()
                    );
                }
                Message::YourTurn => {
                    let (x, y) = self
                        .targets
                        .pop()
                        .ok_or_else(|| anyhow::anyhow!("no untried cells left"))?;
                    transport.send(Message::Shoot { x, y }).await?;
                }
                Message::ShotResult {
                    shooter,
                    accepted: true,
                    hit,
                    sunk,
                    ..
                } if Some(shooter) == report.player => {
                    report.shots += 1;
                    if hit {
                        report.hits += 1;
                    }
                    report.sunk.extend(sunk);
                }
                Message::GameOver { winner } => {
                    debug!("{}: game over, {} wins", self.name, winner);
                    report.winner = Some(winner);
                }
                Message::Error { message } => {
                    warn!("{}: session reported an error: {}", self.name, message);
                }
                Message::Disconnect { reason } => {
                    report.reason = Some(reason);
                    return Ok(report);
                }
                _ => {}
            }
        }
    }
}
