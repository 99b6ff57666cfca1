use battleship_server::protocol::codec::{decode_payload, encode_payload, HEADER_LEN};
use battleship_server::protocol::{
    decode_frame, encode_frame, read_message, write_message, Message, ProtocolError,
};
use battleship_server::{Orientation, PlayerId, MAX_FRAME_SIZE};
use tokio::io::{duplex, AsyncWriteExt};

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = (payload.len() as u32).to_be_bytes().to_vec();
    buf.extend_from_slice(payload);
    buf
}

#[test]
fn test_frame_layout() {
    let msg = Message::Shoot { x: 3, y: 7 };
    let buf = encode_frame(&msg, MAX_FRAME_SIZE).unwrap();
    let len = u32::from_be_bytes(buf[..HEADER_LEN].try_into().unwrap());
    assert_eq!(len as usize, buf.len() - HEADER_LEN);
    assert_eq!(decode_frame(&buf, MAX_FRAME_SIZE).unwrap(), msg);
}

#[test]
fn test_unknown_discriminator_is_recoverable() {
    let err = decode_frame(&frame(&[99]), MAX_FRAME_SIZE).unwrap_err();
    assert!(matches!(err, ProtocolError::Decode(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_zero_length_frame() {
    let err = decode_frame(&frame(&[]), MAX_FRAME_SIZE).unwrap_err();
    assert!(err.is_recoverable(), "unexpected error: {}", err);
}

#[test]
fn test_trailing_bytes_rejected() {
    let mut payload = encode_payload(&Message::YourTurn, MAX_FRAME_SIZE).unwrap();
    assert_eq!(decode_payload(&payload, MAX_FRAME_SIZE).unwrap(), Message::YourTurn);
    payload.push(0);
    let err = decode_frame(&frame(&payload), MAX_FRAME_SIZE).unwrap_err();
    assert!(matches!(err, ProtocolError::Decode(_)));
}

#[test]
fn test_length_mismatch() {
    let mut buf = frame(&[1, 2, 3]);
    buf[3] = 10;
    let err = decode_frame(&buf, MAX_FRAME_SIZE).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::LengthMismatch {
            declared: 10,
            available: 3
        }
    ));
    assert!(!err.is_recoverable());

    let err = decode_frame(&[0, 0], MAX_FRAME_SIZE).unwrap_err();
    assert!(matches!(err, ProtocolError::LengthMismatch { .. }));
}

#[test]
fn test_oversized_frame() {
    let err = decode_frame(&[0xFF, 0xFF, 0xFF, 0xFF], MAX_FRAME_SIZE).unwrap_err();
    assert!(matches!(err, ProtocolError::FrameTooLarge { .. }));
    assert!(!err.is_recoverable());
    assert!(err.to_string().contains("too large"));

    let big = Message::error("x".repeat(64));
    let err = encode_frame(&big, 16).unwrap_err();
    assert!(matches!(err, ProtocolError::FrameTooLarge { max: 16, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stream_recovers_after_bad_payload() -> anyhow::Result<()> {
    let (mut client, mut server) = duplex(1024);

    client.write_all(&frame(&[200, 1])).await?;
    let good = Message::PlaceShip {
        ship: 2,
        x: 1,
        y: 1,
        orientation: Orientation::Vertical,
    };
    write_message(&mut client, &good, MAX_FRAME_SIZE).await?;

    let err = read_message(&mut server, MAX_FRAME_SIZE).await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(read_message(&mut server, MAX_FRAME_SIZE).await?, good);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_length_prefix_on_stream() -> anyhow::Result<()> {
    let (mut client, mut server) = duplex(1024);
    client.write_all(&[0x7F, 0xFF, 0xFF, 0xFF]).await?;
    let err = read_message(&mut server, MAX_FRAME_SIZE).await.unwrap_err();
    assert!(matches!(err, ProtocolError::FrameTooLarge { .. }));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_truncated_frame_reads_as_closed() -> anyhow::Result<()> {
    let (mut client, mut server) = duplex(1024);
    let buf = encode_frame(&Message::GameOver { winner: PlayerId::Two }, MAX_FRAME_SIZE)?;
    client.write_all(&buf[..buf.len() - 1]).await?;
    drop(client);
    let err = read_message(&mut server, MAX_FRAME_SIZE).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Closed));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clean_close_between_frames() -> anyhow::Result<()> {
    let (mut client, mut server) = duplex(1024);
    write_message(&mut client, &Message::YourTurn, MAX_FRAME_SIZE).await?;
    drop(client);
    assert_eq!(read_message(&mut server, MAX_FRAME_SIZE).await?, Message::YourTurn);
    assert!(matches!(
        read_message(&mut server, MAX_FRAME_SIZE).await,
        Err(ProtocolError::Closed)
    ));
    Ok(())
}

#[test]
fn test_player_ids_travel_as_numbers() {
    // variant 1 of the catalog, then the seat number
    let payload = encode_payload(&Message::PlayerId { id: PlayerId::Two }, MAX_FRAME_SIZE).unwrap();
    assert_eq!(payload, vec![1, 2]);
    assert_eq!(
        decode_payload(&[1, 1], MAX_FRAME_SIZE).unwrap(),
        Message::PlayerId { id: PlayerId::One }
    );

    for bad in [0u8, 3] {
        let err = decode_payload(&[1, bad], MAX_FRAME_SIZE).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)), "{}", err);
    }
    assert_eq!(serde_json::to_string(&PlayerId::One).unwrap(), "1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_frame_stream_recovers_after_bad_player_id() -> anyhow::Result<()> {
    let (mut client, mut server) = duplex(1024);
    client.write_all(&frame(&[10, 7])).await?;
    write_message(&mut client, &Message::GameOver { winner: PlayerId::One }, MAX_FRAME_SIZE).await?;

    let err = read_message(&mut server, MAX_FRAME_SIZE).await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(
        read_message(&mut server, MAX_FRAME_SIZE).await?,
        Message::GameOver { winner: PlayerId::One }
    );
    Ok(())
}
