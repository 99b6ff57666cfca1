use battleship_server::peer::{PeerEvent, PeerLink};
use battleship_server::transport::in_memory::{pipe, InMemoryTransport};
use battleship_server::transport::Transport;
use battleship_server::{ConnectionId, Message, PlayerId, SessionConfig};
use tokio::io::AsyncWriteExt;

#[tokio::test(flavor = "multi_thread")]
async fn test_link_forwards_both_directions() -> anyhow::Result<()> {
    let (server, mut client) = pipe();
    let mut link = PeerLink::spawn(ConnectionId(1), server, &SessionConfig::default());
    assert_eq!(link.id(), ConnectionId(1));

    client.send(Message::Shoot { x: 4, y: 2 }).await?;
    match link.recv().await {
        PeerEvent::Message(msg) => assert_eq!(msg, Message::Shoot { x: 4, y: 2 }),
        other => panic!("unexpected event {:?}", other),
    }

    link.send(Message::PlayerId { id: PlayerId::Two }).await?;
    link.send(Message::YourTurn).await?;
    assert_eq!(client.recv().await?, Message::PlayerId { id: PlayerId::Two });
    assert_eq!(client.recv().await?, Message::YourTurn);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_frame_keeps_link_open() -> anyhow::Result<()> {
    let (server, client) = pipe();
    let mut link = PeerLink::spawn(ConnectionId(2), server, &SessionConfig::default());

    let mut raw = client.into_inner();
    raw.write_all(&[0, 0, 0, 1, 250]).await?;
    let mut client = InMemoryTransport::new(raw);
    client.send(Message::YourTurn).await?;

    assert!(matches!(link.recv().await, PeerEvent::Malformed(_)));
    assert!(matches!(
        link.recv().await,
        PeerEvent::Message(Message::YourTurn)
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_frame_closes_link() -> anyhow::Result<()> {
    let (server, client) = pipe();
    let config = SessionConfig {
        max_frame_size: 64,
        ..SessionConfig::default()
    };
    let mut link = PeerLink::spawn(ConnectionId(3), server, &config);

    let mut raw = client.into_inner();
    raw.write_all(&1024u32.to_be_bytes()).await?;

    match link.recv().await {
        PeerEvent::Closed(reason) => assert!(reason.contains("too large"), "{}", reason),
        other => panic!("unexpected event {:?}", other),
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_peer_drop_reports_closed() -> anyhow::Result<()> {
    let (server, client) = pipe();
    let mut link = PeerLink::spawn(ConnectionId(4), server, &SessionConfig::default());
    drop(client);
    assert!(matches!(link.recv().await, PeerEvent::Closed(_)));
    // the reader is gone; later reads stay closed
    assert!(matches!(link.recv().await, PeerEvent::Closed(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_shuts_down_stream() -> anyhow::Result<()> {
    let (server, mut client) = pipe();
    let mut link = PeerLink::spawn(ConnectionId(5), server, &SessionConfig::default());
    link.send(Message::disconnect("bye")).await?;
    link.close();
    assert!(link.is_closed());
    assert!(link.send(Message::YourTurn).await.is_err());

    assert_eq!(client.recv().await?, Message::disconnect("bye"));
    assert!(client.recv().await.is_err());
    Ok(())
}

/// Write to the client side until the server end of the pipe is released.
async fn wait_for_release(client: InMemoryTransport) -> std::io::Error {
    let mut raw = client.into_inner();
    for _ in 0..100 {
        if let Err(e) = raw.write_all(&[0]).await {
            return e;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("server end of the pipe is still held");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_releases_silent_peer() -> anyhow::Result<()> {
    let (server, client) = pipe();
    let mut link = PeerLink::spawn(ConnectionId(6), server, &SessionConfig::default());
    link.close();

    let err = wait_for_release(client).await;
    assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_drop_releases_silent_peer() -> anyhow::Result<()> {
    let (server, client) = pipe();
    let link = PeerLink::spawn(ConnectionId(7), server, &SessionConfig::default());
    drop(link);

    let err = wait_for_release(client).await;
    assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    Ok(())
}
