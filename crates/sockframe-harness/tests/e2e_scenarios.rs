//! Whole-stack scenarios: a real `sockframe-server` accepting real
//! `sockframe-client` connections over TCP loopback.

use sockframe_core::Config;
use sockframe_proto::Packet;
use sockframe_server::{Server, ServerConfig};
use tokio::time::{timeout, Duration};

async fn spawn_server(session: Config) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let config = ServerConfig { bind_address: "127.0.0.1:0".to_string(), session, ..ServerConfig::default() };
    let server = Server::bind(config).await.expect("bind should succeed on an ephemeral port");
    let addr = server.local_addr().expect("bound listener has a local address");

    let handle = tokio::spawn(async move {
        let _ = server
            .run(|mut session| {
                tokio::spawn(async move {
                    while let Some(packet) = session.inbound.recv().await {
                        if session.outbound.send(packet).await.is_err() {
                            break;
                        }
                    }
                });
            })
            .await;
    });

    (addr, handle)
}

#[tokio::test]
async fn text_echo_round_trips() {
    let (addr, _server) = spawn_server(Config::default()).await;

    let mut client =
        sockframe_client::connect(&addr.to_string(), Config::default(), false, Some("alice".to_string()))
            .await
            .expect("client should connect");

    let sent = Packet::message("hello sockframe").unwrap();
    client.outbound.send(sent.clone()).await.unwrap();

    let received = timeout(Duration::from_secs(5), client.inbound.recv())
        .await
        .expect("echo should arrive before the timeout")
        .expect("inbound channel should still be open");

    assert_eq!(received.payload(), sent.payload());
    assert_eq!(received.kind(), sent.kind());
}

#[tokio::test]
async fn wrong_passphrase_never_delivers_the_packet() {
    let preshared = b"shared-secret".to_vec();

    let server_session = Config {
        preshared_key: Some(preshared.clone()),
        encryption_passphrase: Some("correct horse".to_string()),
        ..Config::default()
    };
    let (addr, _server) = spawn_server(server_session).await;

    let client_config = Config {
        preshared_key: Some(preshared),
        encryption_passphrase: Some("wrong passphrase".to_string()),
        ..Config::default()
    };

    let mut client = sockframe_client::connect(&addr.to_string(), client_config, false, None)
        .await
        .expect("transport-level connect succeeds regardless of passphrase");

    let sent = Packet::bytes(b"top secret payload".to_vec()).unwrap();
    client.outbound.send(sent).await.unwrap();

    let result = timeout(Duration::from_millis(500), client.inbound.recv()).await;
    assert!(result.is_err(), "no packet should be delivered when the passphrase is wrong");

    // The session itself stays open: a bad passphrase drops the one
    // packet, it does not tear down the connection.
    assert!(!client.join.is_finished());
}

#[tokio::test]
async fn compressed_directory_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"contents of a").unwrap();
    std::fs::write(dir.path().join("b.txt"), b"contents of b").unwrap();

    let archive = sockframe_codec::compress_tree(dir.path()).expect("tree should archive");

    let (addr, _server) = spawn_server(Config::default()).await;
    let mut client =
        sockframe_client::connect(&addr.to_string(), Config::default(), false, None).await.unwrap();

    let sent = Packet::directory("workspace", archive.clone()).unwrap();
    client.outbound.send(sent).await.unwrap();

    let received = timeout(Duration::from_secs(5), client.inbound.recv())
        .await
        .expect("echo should arrive")
        .expect("inbound channel open");

    assert_eq!(received.payload(), archive.as_slice());

    let extract_dir = tempfile::tempdir().unwrap();
    sockframe_codec::extract(received.payload(), extract_dir.path()).expect("archive should extract");
    assert_eq!(std::fs::read(extract_dir.path().join("a.txt")).unwrap(), b"contents of a");
    assert_eq!(std::fs::read(extract_dir.path().join("b.txt")).unwrap(), b"contents of b");
}

#[tokio::test]
async fn sequential_sends_preserve_order() {
    let (addr, _server) = spawn_server(Config::default()).await;
    let mut client =
        sockframe_client::connect(&addr.to_string(), Config::default(), false, None).await.unwrap();

    let messages: Vec<String> = (0..20).map(|i| format!("message-{i}")).collect();
    for text in &messages {
        client.outbound.send(Packet::message(text).unwrap()).await.unwrap();
    }

    for expected in &messages {
        let received = timeout(Duration::from_secs(5), client.inbound.recv())
            .await
            .expect("each echo should arrive before the timeout")
            .expect("inbound channel open");
        assert_eq!(received.payload(), expected.as_bytes());
    }
}
