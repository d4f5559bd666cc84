//! End-to-end tests for the share protocol against a real listener.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rouilleshare::config::Config;
use rouilleshare::core_auth::helper::parse_passwd;
use rouilleshare::core_client::shell::{login, run_commands};
use rouilleshare::core_command::list::FileEntry;
use rouilleshare::core_client::ShareClient;
use rouilleshare::core_network::{network, LineChannel};
use rouilleshare::server::ServerContext;
use rouilleshare::ShareError;
use tempfile::TempDir;
use tokio::io::AsyncBufReadExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// ============================================================================
// Helper Functions
// ============================================================================

struct TestServer {
    addr: SocketAddr,
    share: PathBuf,
    _root: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

/// Starts a server sharing a directory that holds `a.txt` ("hello").
async fn start_server() -> TestServer {
    let root = TempDir::new().expect("Failed to create temp dir");
    let share = root.path().join("share");
    std::fs::create_dir(&share).unwrap();
    std::fs::write(share.join("a.txt"), b"hello").unwrap();
    let share = share.canonicalize().unwrap();

    let credentials = parse_passwd("# test users\nalice:wonderland\n");
    let context = Arc::new(ServerContext::new(
        Config::default(),
        share.clone(),
        credentials,
    ));

    let listener = network::bind("127.0.0.1", 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(network::serve(listener, context, async {
        let _ = rx.await;
    }));

    TestServer {
        addr,
        share,
        _root: root,
        shutdown: Some(tx),
        handle,
    }
}

async fn connect(server: &TestServer) -> LineChannel {
    let stream = TcpStream::connect(server.addr).await.unwrap();
    LineChannel::new(stream)
}

async fn request(channel: &mut LineChannel, line: &str) -> String {
    channel.send_line(line).await.unwrap();
    channel.expect_line().await.unwrap()
}

async fn authed(server: &TestServer) -> LineChannel {
    let mut channel = connect(server).await;
    assert_eq!(request(&mut channel, "AUTH alice wonderland").await, "OK");
    channel
}

async fn read_listing(channel: &mut LineChannel) -> Vec<String> {
    channel.send_line("LIST").await.unwrap();
    let mut lines = Vec::new();
    loop {
        let line = channel.expect_line().await.unwrap();
        if line == "END" {
            return lines;
        }
        lines.push(line);
    }
}

/// In-progress upload files left in `dir`.
fn part_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.to_string_lossy().ends_with(".part"))
        .collect()
}

/// Waits until no upload is in progress in `dir`, giving the server time to clean up.
async fn wait_until_no_part_files(dir: &Path) -> bool {
    for _ in 0..100 {
        if part_files(dir).is_empty() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

// ============================================================================
// Protocol Tests
// ============================================================================

#[tokio::test]
async fn test_list_get_put_scenario() {
    let server = start_server().await;
    let mut channel = authed(&server).await;

    assert_eq!(read_listing(&mut channel).await, vec!["F a.txt 5"]);

    assert_eq!(request(&mut channel, "GET a.txt").await, "OK 5");
    let mut content = Vec::new();
    channel.receive_bytes(&mut content, 5).await.unwrap();
    assert_eq!(content, b"hello");

    assert_eq!(request(&mut channel, "PUT b.txt 3").await, "OK");
    let mut payload: &[u8] = b"xyz";
    channel.send_bytes(&mut payload, 3).await.unwrap();
    assert_eq!(channel.expect_line().await.unwrap(), "OK");

    assert_eq!(
        read_listing(&mut channel).await,
        vec!["F a.txt 5", "F b.txt 3"]
    );
    assert_eq!(std::fs::read(server.share.join("b.txt")).unwrap(), b"xyz");
}

#[tokio::test]
async fn test_gated_commands_require_auth() {
    let server = start_server().await;
    let mut channel = connect(&server).await;

    assert_eq!(request(&mut channel, "LIST").await, "ERR not authed");
    assert_eq!(request(&mut channel, "GET a.txt").await, "ERR not authed");
    assert_eq!(request(&mut channel, "PUT b.txt 3").await, "ERR not authed");
    assert_eq!(request(&mut channel, "GET ../secret").await, "ERR not authed");
    assert_eq!(request(&mut channel, "PUT").await, "ERR not authed");
    assert!(!server.share.join("b.txt").exists());

    assert_eq!(
        request(&mut channel, "AUTH alice wrong").await,
        "ERR auth failed"
    );
    assert_eq!(request(&mut channel, "AUTH mallory wonderland").await, "ERR auth failed");
    assert_eq!(request(&mut channel, "AUTH alice").await, "ERR auth failed");
    assert_eq!(request(&mut channel, "LIST").await, "ERR not authed");

    assert_eq!(request(&mut channel, "AUTH alice wonderland").await, "OK");
    assert_eq!(read_listing(&mut channel).await, vec!["F a.txt 5"]);

    // A later failed AUTH does not de-authenticate.
    assert_eq!(request(&mut channel, "AUTH alice nope").await, "ERR auth failed");
    assert_eq!(read_listing(&mut channel).await, vec!["F a.txt 5"]);
}

#[tokio::test]
async fn test_traversal_filenames_are_rejected() {
    let server = start_server().await;
    let mut channel = authed(&server).await;
    let outside = server.share.parent().unwrap().to_path_buf();
    std::fs::write(outside.join("secret.txt"), b"top secret").unwrap();

    for line in [
        "GET ../secret.txt",
        "GET sub/a.txt",
        "GET /etc/passwd",
        "GET ..",
        "PUT ../evil.txt 3",
        "PUT sub/evil.txt 3",
    ] {
        assert_eq!(request(&mut channel, line).await, "ERR invalid filename", "{}", line);
    }

    assert!(!outside.join("evil.txt").exists());
    // The connection is still in sync after the refusals.
    assert_eq!(read_listing(&mut channel).await, vec!["F a.txt 5"]);
}

#[tokio::test]
async fn test_list_reports_only_regular_files() {
    let server = start_server().await;
    std::fs::create_dir(server.share.join("subdir")).unwrap();
    std::fs::write(server.share.join("subdir").join("nested.txt"), b"n").unwrap();
    let mut channel = authed(&server).await;

    channel.send_line("LIST").await.unwrap();
    assert_eq!(channel.expect_line().await.unwrap(), "F a.txt 5");
    assert_eq!(channel.expect_line().await.unwrap(), "END");

    // Nothing trails the END line.
    assert_eq!(request(&mut channel, "FOO").await, "ERR unknown cmd");
}

#[tokio::test]
async fn test_get_missing_and_non_regular_files() {
    let server = start_server().await;
    std::fs::create_dir(server.share.join("subdir")).unwrap();
    let mut channel = authed(&server).await;

    assert_eq!(request(&mut channel, "GET nope.txt").await, "ERR file not found");
    assert_eq!(request(&mut channel, "GET subdir").await, "ERR file not found");
    assert_eq!(request(&mut channel, "GET").await, "ERR invalid filename");
}

#[tokio::test]
async fn test_put_argument_validation() {
    let server = start_server().await;
    let mut channel = authed(&server).await;

    assert_eq!(request(&mut channel, "PUT").await, "ERR invalid args");
    assert_eq!(request(&mut channel, "PUT b.txt").await, "ERR invalid args");
    assert_eq!(request(&mut channel, "PUT b.txt 0").await, "ERR invalid args");
    assert_eq!(request(&mut channel, "PUT b.txt -3").await, "ERR invalid args");
    assert!(!server.share.join("b.txt").exists());
}

#[tokio::test]
async fn test_unknown_and_empty_commands() {
    let server = start_server().await;
    let mut channel = connect(&server).await;

    assert_eq!(request(&mut channel, "FOO").await, "ERR unknown cmd");
    assert_eq!(request(&mut channel, "list").await, "ERR unknown cmd");
    assert_eq!(request(&mut channel, "").await, "ERR unknown cmd");
    assert_eq!(request(&mut channel, "AUTH alice wonderland\r").await, "OK");
}

#[tokio::test]
async fn test_quit_closes_connection() {
    let server = start_server().await;
    let mut channel = connect(&server).await;

    channel.send_line("QUIT").await.unwrap();
    assert_eq!(channel.read_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_interrupted_put_leaves_no_file() {
    let server = start_server().await;
    let mut channel = authed(&server).await;

    assert_eq!(request(&mut channel, "PUT c.txt 10").await, "OK");
    let mut payload: &[u8] = b"part";
    channel.send_bytes(&mut payload, 4).await.unwrap();
    drop(channel);

    assert!(wait_until_no_part_files(&server.share).await);
    assert!(!server.share.join("c.txt").exists());
}

#[tokio::test]
async fn test_interrupted_put_keeps_previous_version() {
    let server = start_server().await;
    let mut channel = authed(&server).await;

    assert_eq!(request(&mut channel, "PUT a.txt 10").await, "OK");
    let mut payload: &[u8] = b"new";
    channel.send_bytes(&mut payload, 3).await.unwrap();
    drop(channel);

    assert!(wait_until_no_part_files(&server.share).await);
    assert_eq!(std::fs::read(server.share.join("a.txt")).unwrap(), b"hello");
}

#[tokio::test]
async fn test_overlapping_puts_to_same_name() {
    let server = start_server().await;
    let mut first = authed(&server).await;
    let mut second = authed(&server).await;

    assert_eq!(request(&mut first, "PUT b.txt 10").await, "OK");
    assert_eq!(request(&mut second, "PUT b.txt 10").await, "OK");

    let mut complete: &[u8] = b"AAAAAAAAAA";
    first.send_bytes(&mut complete, 10).await.unwrap();
    assert_eq!(first.expect_line().await.unwrap(), "OK");

    let mut partial: &[u8] = b"BBB";
    second.send_bytes(&mut partial, 3).await.unwrap();
    drop(second);

    assert!(wait_until_no_part_files(&server.share).await);
    assert_eq!(std::fs::read(server.share.join("b.txt")).unwrap(), b"AAAAAAAAAA");
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let mut server = start_server().await;
    let mut channel = authed(&server).await;
    channel.send_line("QUIT").await.unwrap();

    server.shutdown.take().unwrap().send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(10), &mut server.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

// ============================================================================
// Client Tests
// ============================================================================

#[tokio::test]
async fn test_client_round_trip() {
    let server = start_server().await;
    let local = TempDir::new().unwrap();
    let upload = local.path().join("report.bin");
    let content: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&upload, &content).unwrap();

    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut client = ShareClient::from_stream(stream);
    client.auth("alice", "wonderland").await.unwrap();

    assert_eq!(client.put(upload.to_str().unwrap()).await.unwrap(), "OK");
    let listing = client.list().await.unwrap();
    assert!(listing.contains(&FileEntry {
        name: "report.bin".to_string(),
        size: content.len() as u64,
    }));

    let downloads = TempDir::new().unwrap();
    let size = client.get("report.bin", downloads.path()).await.unwrap();
    assert_eq!(size, content.len() as u64);
    assert_eq!(std::fs::read(downloads.path().join("report.bin")).unwrap(), content);

    client.quit().await.unwrap();
}

#[tokio::test]
async fn test_client_reports_refusals() {
    let server = start_server().await;
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut client = ShareClient::from_stream(stream);

    match client.list().await {
        Err(ShareError::ServerRefused(response)) => assert_eq!(response, "ERR not authed"),
        other => panic!("unexpected LIST result: {:?}", other),
    }
    client.auth("alice", "wonderland").await.unwrap();

    let downloads = TempDir::new().unwrap();
    match client.get("missing.txt", downloads.path()).await {
        Err(ShareError::ServerRefused(response)) => assert_eq!(response, "ERR file not found"),
        other => panic!("unexpected GET result: {:?}", other),
    }
    assert!(matches!(
        client.put("/nonexistent/file.txt").await,
        Err(ShareError::LocalFileNotFound(_))
    ));

    let empty = downloads.path().join("empty.txt");
    std::fs::write(&empty, b"").unwrap();
    match client.put(empty.to_str().unwrap()).await {
        Err(ShareError::ServerRefused(response)) => assert_eq!(response, "ERR invalid args"),
        other => panic!("unexpected PUT result: {:?}", other),
    }
}

#[tokio::test]
async fn test_shell_session() {
    let server = start_server().await;
    let downloads = TempDir::new().unwrap();
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut client = ShareClient::from_stream(stream);

    let input: &[u8] = b"alice\nwonderland\nLIST\nGET a.txt\nGET nope.txt\nHELP\nQUIT\n";
    let mut lines = input.lines();
    let mut out = Vec::new();
    login(&mut client, &mut lines, &mut out).await.unwrap();
    run_commands(client, &mut lines, &mut out, downloads.path())
        .await
        .unwrap();

    let out = String::from_utf8_lossy(&out);
    assert!(out.contains("Authenticated"));
    assert!(out.contains("F a.txt 5"));
    assert!(out.contains("Saved a.txt"));
    assert!(out.contains("ERR file not found"));
    assert!(out.contains("Commands: LIST"));
    assert_eq!(std::fs::read(downloads.path().join("a.txt")).unwrap(), b"hello");
}

#[tokio::test]
async fn test_shell_aborts_on_failed_auth() {
    let server = start_server().await;
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut client = ShareClient::from_stream(stream);

    let input: &[u8] = b"alice\nwrong\nLIST\n";
    let mut lines = input.lines();
    let mut out = Vec::new();
    let err = login(&mut client, &mut lines, &mut out).await.unwrap_err();
    assert_eq!(err.to_wire_response(), "ERR auth failed");
    assert!(!String::from_utf8_lossy(&out).contains("Authenticated"));
}

#[tokio::test]
async fn test_login_fails_when_server_hangs_up() {
    let (local, remote) = tokio::io::duplex(1024);
    drop(remote);
    let mut client = ShareClient::from_stream(local);

    let input: &[u8] = b"alice\nwonderland\n";
    let mut lines = input.lines();
    let mut out = Vec::new();
    let err = login(&mut client, &mut lines, &mut out).await.unwrap_err();
    assert!(err.is_fatal());
}
