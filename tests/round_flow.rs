//! End-to-end round over loopback sockets: two scripted clients join,
//! ready up, hold on every ask and play a single round to completion.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};

use pontoon_server::config::{Config, Pacing};
use pontoon_server::server::serve;

fn test_config() -> Config {
    Config {
        address: "127.0.0.1".to_string(),
        port: 0,
        max_players: 2,
        rounds: 1,
        pacing: Pacing {
            deal_ms: 0,
            summary_ms: 0,
            resolve_ms: 0,
            round_ms: 0,
        },
    }
}

/// Connect, handshake, ready up, answer every ask with Hold, and collect
/// every received line until the server says Quit.
async fn holding_client(addr: std::net::SocketAddr, name: &str) -> Vec<String> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    write_half
        .write_all(format!("Name {}\nReady\n", name).as_bytes())
        .await
        .unwrap();

    let mut lines = BufReader::new(read_half).lines();
    let mut seen = Vec::new();
    while let Ok(Some(line)) = lines.next_line().await {
        if line == "Ask" {
            write_half.write_all(b"Hold\n").await.unwrap();
        }
        let done = line == "Broadcast Quit";
        seen.push(line);
        if done {
            break;
        }
    }
    seen
}

#[tokio::test(flavor = "multi_thread")]
async fn two_players_play_a_full_round() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, test_config()));

    // Stagger the connects so registry order is Ann, then Bo.
    let ann = tokio::spawn(holding_client(addr, "Ann"));
    sleep(Duration::from_millis(200)).await;
    let bo = tokio::spawn(holding_client(addr, "Bo"));

    let ann = timeout(Duration::from_secs(30), ann).await.unwrap().unwrap();
    let bo = timeout(Duration::from_secs(30), bo).await.unwrap().unwrap();
    timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert!(ann.contains(&"Broadcast StartRound".to_string()));
    assert!(ann.contains(&"Broadcast Message Welcome to Pirates Pontoon".to_string()));

    // Everyone held, so exactly the two initial cards per player.
    let dealt = |transcript: &[String], name: &str| {
        transcript
            .iter()
            .filter(|l| l.starts_with(&format!("Broadcast DealCard {} ", name)))
            .count()
    };
    assert_eq!(dealt(&ann, "Ann"), 2);
    assert_eq!(dealt(&ann, "Bo"), 2);

    assert!(ann.contains(
        &"Broadcast Ask Ann was asked by the dealer whether to Deal or Hold".to_string()
    ));
    assert!(ann.contains(&"Broadcast Ask Ann chose to Hold".to_string()));
    assert!(ann.contains(&"Broadcast Ask Bo chose to Hold".to_string()));

    assert!(ann.iter().any(|l| l.starts_with("Broadcast DealerScore ")));

    // A Win line, unless the round was a draw (both held equal scores).
    let resolved = ann.iter().any(|l| l.starts_with("Broadcast Win "))
        || ann.contains(&"Broadcast Message Draw! Nobody wins this round".to_string());
    assert!(resolved, "round must resolve: {:#?}", ann);

    assert!(ann.contains(&"Broadcast EndRound".to_string()));
    assert!(
        ann.iter()
            .any(|l| l.starts_with("Broadcast HighScores Ann ") && l.contains(" Bo ")),
        "high scores must list both players in registry order"
    );
    assert!(ann.contains(&"Broadcast GameOver".to_string()));
    assert_eq!(ann.last().unwrap(), "Broadcast Quit");

    // The second player sees the same game-over handoff.
    assert!(bo.contains(&"Broadcast GameOver".to_string()));
    assert_eq!(bo.last().unwrap(), "Broadcast Quit");
}

#[tokio::test(flavor = "multi_thread")]
async fn queries_answer_during_admission() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut cfg = test_config();
    cfg.max_players = 2;
    let _server = tokio::spawn(serve(listener, cfg));

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    write_half
        .write_all(b"Name Ann\nMaxPlayers\nConnection\nNames\n")
        .await
        .unwrap();

    let mut lines = BufReader::new(read_half).lines();
    assert_eq!(next_line(&mut lines).await, "2");
    assert_eq!(next_line(&mut lines).await, "1");
    assert_eq!(next_line(&mut lines).await, "Ann");
}

async fn next_line(
    lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
) -> String {
    timeout(Duration::from_secs(5), lines.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap()
}
