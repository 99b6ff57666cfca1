#![cfg(feature = "std")]
//! TCP front end: accept connections and pair them into sessions.

use log::{error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::config::SessionConfig;
use crate::peer::PeerLink;
use crate::registry::{ConnectionId, RegistryError, SessionRegistry};
use crate::session::{Session, SessionOutcome};

/// Register a session for two connected streams and run it on its own task.
///
/// The first stream plays as player one. The session is removed from
/// `registry` when the task finishes, however it finishes.
pub fn spawn_session<S>(
    registry: &SessionRegistry,
    config: &SessionConfig,
    one: (ConnectionId, S),
    two: (ConnectionId, S),
) -> Result<JoinHandle<SessionOutcome>, RegistryError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let ticket = registry.begin(one.0, two.0)?;
    let peer_one = PeerLink::spawn(one.0, one.1, config);
    let peer_two = PeerLink::spawn(two.0, two.1, config);
    let session = Session::new(ticket.id(), peer_one, peer_two, config.clone());
    Ok(tokio::spawn(async move {
        let _ticket = ticket;
        session.run().await
    }))
}

/// `true` when the peer has already hung up. Pending bytes stay unread.
async fn has_hung_up(stream: &TcpStream) -> bool {
    let mut buf = [0u8; 1];
    match timeout(Duration::ZERO, stream.peek(&mut buf)).await {
        Ok(Ok(0)) | Ok(Err(_)) => true,
        Ok(Ok(_)) | Err(_) => false,
    }
}

/// Accept connections forever, starting a session for every two of them.
///
/// Connections are paired in arrival order. A waiting connection that has
/// closed before its partner arrives is dropped and the newcomer waits in
/// its place. Only a failing listener ends the loop; errors on individual
/// connections are logged and skipped.
pub async fn serve(
    listener: TcpListener,
    config: SessionConfig,
    registry: SessionRegistry,
) -> anyhow::Result<()> {
    info!("listening on {}", listener.local_addr()?);
    let mut waiting: Option<(ConnectionId, TcpStream)> = None;
    loop {
        let (stream, addr) = listener.accept().await?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("could not set TCP_NODELAY for {}: {}", addr, e);
        }
        let id = registry.next_connection_id();
        info!("{} connected from {}", id, addr);

        let gone = match &waiting {
            Some((_, held)) => has_hung_up(held).await,
            None => false,
        };
        if gone {
            if let Some((first, _)) = waiting.take() {
                info!("{} left before a partner arrived", first);
            }
        }
        match waiting.take() {
            None => waiting = Some((id, stream)),
            Some(first) => match spawn_session(&registry, &config, first, (id, stream)) {
                Ok(handle) => {
                    tokio::spawn(async move {
                        match handle.await {
                            Ok(outcome) => info!(
                                "{} finished: {:?}, winner {:?}",
                                outcome.id, outcome.end, outcome.winner
                            ),
                            Err(e) => error!("session task failed: {}", e),
                        }
                    });
                }
                Err(e) => warn!("could not start session: {}", e),
            },
        }
    }
}
