#![cfg(feature = "std")]
//! One match between two connected peers.
//!
//! The session task is the only owner of its `Match`. Peers talk to it
//! through their [`PeerLink`]s; every wait goes through `tokio::select!` over
//! both inbound channels so a peer that drops while it is not on turn is
//! noticed straight away.
//!
//! Lifecycle: handshake → setup → play → teardown. A peer that leaves (or
//! runs out its turn clock) after the handshake forfeits; one that never
//! completes the handshake aborts the session without a winner.

use log::{debug, info, warn};
use serde::Serialize;
use tokio::time::{timeout_at, Duration, Instant};

use crate::config::SessionConfig;
use crate::game::{Match, MatchError, Phase, PlayerId};
use crate::peer::{PeerEvent, PeerLink};
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::registry::SessionId;

/// How a session came to an end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionEnd {
    /// A player sank the whole opposing fleet.
    Completed,
    /// `loser` disconnected or timed out after joining.
    Forfeit { loser: PlayerId, cause: String },
    /// `player` never finished the handshake; nobody wins.
    Aborted { player: PlayerId, cause: String },
}

/// Summary returned by [`Session::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub id: SessionId,
    /// Display names in seat order.
    pub players: [String; 2],
    pub winner: Option<PlayerId>,
    pub end: SessionEnd,
    /// Accepted shots over the whole match.
    pub shots: u32,
}

/// A peer that can no longer take part.
#[derive(Debug)]
struct Dropout {
    player: PlayerId,
    cause: String,
}

/// What a message did to the current turn.
enum Turn {
    /// Nothing changed; keep waiting.
    Pending,
    /// The shooter must try again.
    Retry,
    /// A shot was accepted.
    Taken,
}

struct Seat {
    player: PlayerId,
    name: String,
    link: PeerLink,
}

impl Seat {
    fn new(player: PlayerId, link: PeerLink) -> Self {
        Self {
            player,
            name: player.to_string(),
            link,
        }
    }

    fn dropout(&self, cause: impl Into<String>) -> Dropout {
        Dropout {
            player: self.player,
            cause: cause.into(),
        }
    }

    async fn send(&self, msg: Message) -> Result<(), Dropout> {
        self.link
            .send(msg)
            .await
            .map_err(|e| self.dropout(e.to_string()))
    }

    /// Next well-formed message from this peer.
    ///
    /// Malformed frames are answered with `Error` and skipped. A closed
    /// connection or a `Disconnect` from the peer ends its participation.
    async fn recv(&mut self) -> Result<Message, Dropout> {
        loop {
            let event = self.link.recv().await;
            if let Some(msg) = self.accept(event).await? {
                return Ok(msg);
            }
        }
    }

    /// Turn one inbound event into a message, answering malformed frames.
    async fn accept(&self, event: PeerEvent) -> Result<Option<Message>, Dropout> {
        match event {
            PeerEvent::Message(Message::Disconnect { reason }) => {
                Err(self.dropout(format!("left: {}", reason)))
            }
            PeerEvent::Message(msg) => Ok(Some(msg)),
            PeerEvent::Malformed(e) => {
                warn!("{} sent a malformed frame: {}", self.player, e);
                self.send(Message::error(format!("malformed frame: {}", e)))
                    .await?;
                Ok(None)
            }
            PeerEvent::Closed(cause) => Err(self.dropout(cause)),
        }
    }

    async fn handshake(&mut self, limit: Duration) -> Result<(), Dropout> {
        let deadline = Instant::now() + limit;
        loop {
            let msg = match timeout_at(deadline, self.recv()).await {
                Ok(msg) => msg?,
                Err(_) => return Err(self.dropout("handshake timed out")),
            };
            match msg {
                Message::Connect { name, version } if version == PROTOCOL_VERSION => {
                    debug!("{} is {:?}", self.player, name);
                    self.name = name;
                    return self.send(Message::PlayerId { id: self.player }).await;
                }
                Message::Connect { version, .. } => {
                    self.send(Message::error(format!(
                        "unsupported protocol version {} (expected {})",
                        version, PROTOCOL_VERSION
                    )))
                    .await?;
                    return Err(self.dropout(format!("protocol version {} rejected", version)));
                }
                other => {
                    warn!("{} sent {} before connecting", self.player, other.kind());
                    self.send(Message::error(format!(
                        "expected connect, got {}",
                        other.kind()
                    )))
                    .await?;
                }
            }
        }
    }
}

/// Wait for the next message from whichever peer speaks first.
///
/// Only the channel reads race; replies to malformed frames are sent after
/// the race is decided so a losing branch never drops one.
async fn recv_any(seats: &mut [Seat; 2]) -> Result<(PlayerId, Message), Dropout> {
    loop {
        let [one, two] = &mut *seats;
        let (seat, event) = tokio::select! {
            e = one.link.recv() => (&*one, e),
            e = two.link.recv() => (&*two, e),
        };
        if let Some(msg) = seat.accept(event).await? {
            return Ok((seat.player, msg));
        }
    }
}

pub struct Session {
    id: SessionId,
    config: SessionConfig,
    game: Match,
    seats: [Seat; 2],
    shots: u32,
}

impl Session {
    /// `peer_one` sits as player one and moves first.
    pub fn new(id: SessionId, peer_one: PeerLink, peer_two: PeerLink, config: SessionConfig) -> Self {
        Self {
            id,
            config,
            game: Match::new(),
            seats: [
                Seat::new(PlayerId::One, peer_one),
                Seat::new(PlayerId::Two, peer_two),
            ],
            shots: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    fn seat(&self, player: PlayerId) -> &Seat {
        match player {
            PlayerId::One => &self.seats[0],
            PlayerId::Two => &self.seats[1],
        }
    }

    async fn send(&self, player: PlayerId, msg: Message) -> Result<(), Dropout> {
        self.seat(player).send(msg).await
    }

    async fn broadcast(&self, msg: Message) -> Result<(), Dropout> {
        for seat in &self.seats {
            seat.send(msg.clone()).await?;
        }
        Ok(())
    }

    /// Best-effort delivery during teardown; peers that are gone are skipped.
    async fn announce(&self, msg: Message) {
        for seat in &self.seats {
            if seat.send(msg.clone()).await.is_err() {
                debug!("{}: {} not reachable for {}", self.id, seat.player, msg.kind());
            }
        }
    }

    /// Drive the session to completion and release both connections.
    pub async fn run(mut self) -> SessionOutcome {
        info!("{} started", self.id);
        let end = match self.handshake().await {
            Err(d) => {
                warn!("{}: {} failed to join: {}", self.id, d.player, d.cause);
                SessionEnd::Aborted {
                    player: d.player,
                    cause: d.cause,
                }
            }
            Ok(()) => {
                info!(
                    "{}: {:?} vs {:?}",
                    self.id, self.seats[0].name, self.seats[1].name
                );
                match self.setup_and_play().await {
                    Ok(()) => SessionEnd::Completed,
                    Err(d) => self.forfeit(d).await,
                }
            }
        };

        let reason = match &end {
            SessionEnd::Completed => match self.game.winner() {
                Some(w) => format!("game over, {} wins", w),
                None => "game over".to_string(),
            },
            SessionEnd::Forfeit { loser, cause } => format!("{} forfeited: {}", loser, cause),
            SessionEnd::Aborted { player, cause } => {
                format!("session aborted, {} did not join: {}", player, cause)
            }
        };
        self.announce(Message::disconnect(reason.clone())).await;
        for seat in &mut self.seats {
            seat.link.close();
        }

        let winner = self.game.winner();
        info!(
            "{} ended after {} shots ({}); winner: {:?}",
            self.id, self.shots, reason, winner
        );
        let [one, two] = self.seats;
        SessionOutcome {
            id: self.id,
            players: [one.name, two.name],
            winner,
            end,
            shots: self.shots,
        }
    }

    async fn handshake(&mut self) -> Result<(), Dropout> {
        let limit = self.config.handshake_timeout;
        let [one, two] = &mut self.seats;
        tokio::try_join!(one.handshake(limit), two.handshake(limit))?;
        Ok(())
    }

    async fn setup_and_play(&mut self) -> Result<(), Dropout> {
        self.setup().await?;
        self.play().await
    }

    async fn forfeit(&mut self, d: Dropout) -> SessionEnd {
        warn!("{}: {} forfeits: {}", self.id, d.player, d.cause);
        match self.game.forfeit(d.player) {
            Ok(winner) => self.announce(Message::GameOver { winner }).await,
            Err(e) => debug!("{}: forfeit ignored: {}", self.id, e),
        }
        SessionEnd::Forfeit {
            loser: d.player,
            cause: d.cause,
        }
    }

    async fn setup(&mut self) -> Result<(), Dropout> {
        while self.game.phase() == Phase::Setup {
            let (player, msg) = recv_any(&mut self.seats).await?;
            match msg {
                Message::PlaceShip {
                    ship,
                    x,
                    y,
                    orientation,
                } => match self.game.place_ship(player, ship, x, y, orientation) {
                    Ok(report) => {
                        self.send(
                            player,
                            Message::PlaceResult {
                                ship,
                                accepted: true,
                                reason: None,
                            },
                        )
                        .await?;
                        if report.fleet_complete {
                            info!("{}: {} fleet ready", self.id, player);
                            self.broadcast(Message::FleetReady { player }).await?;
                        }
                    }
                    Err(e) => {
                        debug!("{}: {} placement of ship {} rejected: {}", self.id, player, ship, e);
                        self.send(
                            player,
                            Message::PlaceResult {
                                ship,
                                accepted: false,
                                reason: Some(e.to_string()),
                            },
                        )
                        .await?;
                    }
                },
                Message::Shoot { .. } => {
                    warn!("{}: {} fired during setup", self.id, player);
                    self.send(
                        player,
                        Message::error("shots are not allowed until both fleets are placed"),
                    )
                    .await?;
                }
                other => self.unexpected(player, &other).await?,
            }
        }
        Ok(())
    }

    async fn play(&mut self) -> Result<(), Dropout> {
        while self.game.phase() == Phase::Playing {
            let current = self.game.turn();
            let name = self.seat(current).name.clone();
            self.send(current, Message::YourTurn).await?;
            self.send(current.opponent(), Message::OpponentTurn { opponent: name })
                .await?;

            let deadline = self.config.turn_timeout.map(|t| Instant::now() + t);
            loop {
                let (player, msg) = match deadline {
                    Some(at) => timeout_at(at, recv_any(&mut self.seats))
                        .await
                        .map_err(|_| Dropout {
                            player: current,
                            cause: "turn timed out".into(),
                        })??,
                    None => recv_any(&mut self.seats).await?,
                };
                match self.on_play_message(player, msg).await? {
                    Turn::Pending => {}
                    Turn::Retry => self.send(current, Message::YourTurn).await?,
                    Turn::Taken => break,
                }
            }
        }
        Ok(())
    }

    async fn on_play_message(&mut self, player: PlayerId, msg: Message) -> Result<Turn, Dropout> {
        match msg {
            Message::Shoot { x, y } => match self.game.shoot(player, x, y) {
                Ok(report) => {
                    self.shots += 1;
                    debug!("{}: {} fired at ({}, {}): {:?}", self.id, player, x, y, report.outcome);
                    self.broadcast(Message::shot_accepted(&report)).await?;
                    for p in PlayerId::BOTH {
                        let (own, opponent) = self.game.snapshot_for(p);
                        self.send(p, Message::Snapshot { own, opponent }).await?;
                    }
                    if let Some(winner) = report.winner {
                        info!("{}: {} sank the last ship", self.id, winner);
                        self.broadcast(Message::GameOver { winner }).await?;
                    }
                    Ok(Turn::Taken)
                }
                Err(e @ MatchError::NotYourTurn(_)) => {
                    warn!("{}: {}", self.id, e);
                    self.send(player, Message::error(e.to_string())).await?;
                    Ok(Turn::Pending)
                }
                Err(e) => {
                    debug!("{}: {} shot at ({}, {}) rejected: {}", self.id, player, x, y, e);
                    self.send(player, Message::shot_rejected(player, x, y)).await?;
                    Ok(Turn::Retry)
                }
            },
            Message::PlaceShip { ship, .. } => {
                self.send(
                    player,
                    Message::PlaceResult {
                        ship,
                        accepted: false,
                        reason: Some("placement is closed once play has started".into()),
                    },
                )
                .await?;
                Ok(Turn::Pending)
            }
            other => {
                self.unexpected(player, &other).await?;
                Ok(Turn::Pending)
            }
        }
    }

    async fn unexpected(&self, player: PlayerId, msg: &Message) -> Result<(), Dropout> {
        warn!("{}: unexpected {} from {}", self.id, msg.kind(), player);
        self.send(
            player,
            Message::error(format!("unexpected {} during {:?}", msg.kind(), self.game.phase())),
        )
        .await
    }
}
