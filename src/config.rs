use core::time::Duration;

use crate::ship::ShipType;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 10;
pub const NUM_SHIPS: usize = 5;
pub const SHIPS: [ShipType; NUM_SHIPS] = [
    ShipType::new("Carrier", 5),
    ShipType::new("Battleship", 4),
    ShipType::new("Cruiser", 3),
    ShipType::new("Submarine", 3),
    ShipType::new("Destroyer", 2),
];

/// Total number of ship segments in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Version exchanged in the `Connect` handshake.
pub const PROTOCOL_VERSION: u16 = 1;

/// Default cap on a single frame's payload (1 MiB).
pub const MAX_FRAME_SIZE: u32 = 1 << 20;

/// Catalog entry for a ship id, if it exists.
pub fn ship_type(id: usize) -> Option<ShipType> {
    SHIPS.get(id).copied()
}

/// Look up a catalog id by ship name.
pub fn ship_id_by_name(name: &str) -> Option<usize> {
    SHIPS.iter().position(|def| def.name() == name)
}

/// Runtime knobs for one session and its peer connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Largest frame payload accepted from or sent to a peer.
    pub max_frame_size: u32,
    /// How long each peer has to send `Connect`.
    pub handshake_timeout: Duration,
    /// How long the current player has to shoot; `None` waits forever.
    pub turn_timeout: Option<Duration>,
    /// Capacity of each peer's inbound and outbound channel.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_frame_size: MAX_FRAME_SIZE,
            handshake_timeout: Duration::from_secs(30),
            turn_timeout: None,
            channel_capacity: 64,
        }
    }
}
