mod common;

use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use gmao_console::config::ReconnectPolicy;
use gmao_console::sync_client::{LinkEvent, ServerEndpoint, SyncClient};
use gmao_sync::{Command, EntityId, StateStore};
use serde_json::{json, Value};

use common::{snapshot_text, StubServer};

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        base_delay: Duration::from_millis(1),
        cap_delay: Duration::from_millis(5),
        max_attempts: 3,
    }
}

fn connect_client(server: &StubServer) -> SyncClient {
    let endpoint = ServerEndpoint::parse(server.url()).expect("parse stub server url");
    let mut client = SyncClient::new(endpoint, fast_policy(), Duration::from_millis(25));
    client.connect();
    assert!(client.is_connected(), "client failed to reach the stub server");
    client
}

fn pump_until(
    client: &mut SyncClient,
    store: &mut StateStore,
    what: &str,
    timeout: Duration,
    mut done: impl FnMut(&[LinkEvent], &StateStore) -> bool,
) -> Vec<LinkEvent> {
    let deadline = Instant::now() + timeout;
    let mut events = Vec::new();
    loop {
        events.extend(client.pump(store));
        if done(&events, store) {
            return events;
        }
        assert!(
            Instant::now() < deadline,
            "timed out waiting for {what}; events so far: {events:?}"
        );
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn connect_receives_the_initial_snapshot_push() {
    let server = StubServer::start(vec![snapshot_text(None)]);
    let mut client = connect_client(&server);
    let mut store = StateStore::new();

    let events = pump_until(
        &mut client,
        &mut store,
        "initial snapshot",
        Duration::from_secs(3),
        |events, store| {
            events.contains(&LinkEvent::Connected) && !store.snapshot().machines.is_empty()
        },
    );
    assert_eq!(events.first(), Some(&LinkEvent::Connected));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.chains.len(), 2);
    assert_eq!(snapshot.chains[0].name_chain, "Ligne A");
    assert_eq!(snapshot.machines.len(), 2);
    assert_eq!(snapshot.machines[0].name_machine, "Presse");
    assert_eq!(snapshot.equipment.len(), 1);
    assert_eq!(snapshot.maintenance[0].technician, "Alice");
    assert_eq!(snapshot.stock.len(), 1);
    assert_eq!(snapshot.seq, None);
}

#[test]
fn sent_commands_arrive_unaltered_and_the_answering_push_lands_in_the_store() {
    let server = StubServer::start(vec![snapshot_text(None)]);
    let mut client = connect_client(&server);
    let mut store = StateStore::new();
    pump_until(
        &mut client,
        &mut store,
        "initial snapshot",
        Duration::from_secs(3),
        |_, store| !store.snapshot().machines.is_empty(),
    );

    assert!(client.send(&Command::AddMachine {
        id_machine: EntityId::new("M3"),
        name_machine: "Fraiseuse".to_string(),
        status_machine: "En fonctionnement".to_string(),
        id_chain: EntityId::new("2"),
    }));
    let frame = server.recv_inbound(Duration::from_secs(3));
    assert_eq!(
        frame,
        json!({
            "action": "add_machine",
            "id_machine": "M3",
            "name_machine": "Fraiseuse",
            "status_machine": "En fonctionnement",
            "id_chain": "2"
        })
    );

    assert!(client.send(&Command::AddMaintenance {
        id_maintenance: EntityId::new("R2"),
        id_machine: EntityId::new("M3"),
        kind: "Corrective".to_string(),
        description: "Courroie cassée".to_string(),
        date: "2026-03-02".to_string(),
        status_maintenance: "En cours".to_string(),
        technician: "Bob".to_string(),
    }));
    let frame = server.recv_inbound(Duration::from_secs(3));
    assert_eq!(frame["action"], "add_maintenance");
    assert_eq!(frame["type"], "Corrective");
    assert!(frame.get("kind").is_none());

    // The server never acknowledges; it answers with authoritative state.
    let mut updated: Value = serde_json::from_str(&snapshot_text(None)).expect("snapshot json");
    updated["machines"]
        .as_array_mut()
        .expect("machines array")
        .push(json!({
            "id_machine": "M3",
            "name_machine": "Fraiseuse",
            "status_machine": "En fonctionnement",
            "id_chain": 2
        }));
    server.push(updated.to_string());
    pump_until(
        &mut client,
        &mut store,
        "answering push",
        Duration::from_secs(3),
        |_, store| store.snapshot().machines.len() == 3,
    );
    assert_eq!(store.snapshot().machines[2].id_machine, EntityId::new("M3"));
}

#[test]
fn delete_and_refresh_frames_stay_minimal_on_the_wire() {
    let server = StubServer::start(vec![snapshot_text(None)]);
    let mut client = connect_client(&server);

    assert!(client.send(&Command::DeleteMaintenance {
        id_maintenance: EntityId::new("R1"),
    }));
    let frame = server.recv_inbound(Duration::from_secs(3));
    assert_eq!(
        frame,
        json!({"action": "delete_maintenance", "id_maintenance": "R1"})
    );

    assert!(client.send(&Command::Lister));
    let frame = server.recv_inbound(Duration::from_secs(3));
    assert_eq!(frame, json!({"action": "lister"}));
}

#[test]
fn malformed_pushes_keep_prior_state_until_a_valid_one_arrives() {
    let server = StubServer::start(vec![snapshot_text(None)]);
    let mut client = connect_client(&server);
    let mut store = StateStore::new();
    pump_until(
        &mut client,
        &mut store,
        "initial snapshot",
        Duration::from_secs(3),
        |_, store| !store.snapshot().machines.is_empty(),
    );
    let before = store.snapshot().clone();

    server.push("surprise, not json");
    server.push(r#"{"chains": [], "machines": [], "equipment": [], "maintenance": []}"#);
    let events = pump_until(
        &mut client,
        &mut store,
        "two discard events",
        Duration::from_secs(3),
        |events, _| {
            events
                .iter()
                .filter(|event| matches!(event, LinkEvent::SnapshotDiscarded { .. }))
                .count()
                == 2
        },
    );
    assert_eq!(store.snapshot(), &before);
    assert!(client.is_connected(), "a bad frame must not drop the link");
    assert!(events.iter().any(|event| matches!(
        event,
        LinkEvent::SnapshotDiscarded { reason } if reason.contains("stock")
    )));

    let mut updated: Value = serde_json::from_str(&snapshot_text(None)).expect("snapshot json");
    updated["chains"]
        .as_array_mut()
        .expect("chains array")
        .push(json!({"id_chain": 3, "name_chain": "Ligne C"}));
    server.push(updated.to_string());
    pump_until(
        &mut client,
        &mut store,
        "valid snapshot after discards",
        Duration::from_secs(3),
        |_, store| store.snapshot().chains.len() == 3,
    );
}

#[test]
fn stale_sequence_is_discarded_over_a_live_link() {
    let server = StubServer::start(vec![snapshot_text(Some(5))]);
    let mut client = connect_client(&server);
    let mut store = StateStore::new();
    pump_until(
        &mut client,
        &mut store,
        "sequenced snapshot",
        Duration::from_secs(3),
        |_, store| store.snapshot().seq == Some(5),
    );

    server.push(snapshot_text(Some(4)));
    let events = pump_until(
        &mut client,
        &mut store,
        "stale discard",
        Duration::from_secs(3),
        |events, _| {
            events
                .iter()
                .any(|event| matches!(event, LinkEvent::SnapshotDiscarded { .. }))
        },
    );
    assert_eq!(store.snapshot().seq, Some(5));
    assert!(events.iter().any(|event| matches!(
        event,
        LinkEvent::SnapshotDiscarded { reason } if reason.contains("stale snapshot")
    )));

    server.push(snapshot_text(Some(6)));
    pump_until(
        &mut client,
        &mut store,
        "newer snapshot",
        Duration::from_secs(3),
        |_, store| store.snapshot().seq == Some(6),
    );

    // The guard is per connection: after a reconnect the replacement
    // session's greeting carries seq 5 again and must be accepted.
    server.close_session();
    pump_until(
        &mut client,
        &mut store,
        "reconnect with a reset guard",
        Duration::from_secs(3),
        |_, store| store.snapshot().seq == Some(5),
    );
    assert!(client.is_connected());
}

#[test]
fn server_close_surfaces_a_disconnect_and_the_retry_schedule_reconnects() {
    let server = StubServer::start(vec![snapshot_text(None)]);
    let mut client = connect_client(&server);
    let mut store = StateStore::new();
    pump_until(
        &mut client,
        &mut store,
        "initial snapshot",
        Duration::from_secs(3),
        |events, store| {
            events.contains(&LinkEvent::Connected) && !store.snapshot().machines.is_empty()
        },
    );

    // The reconnect can land in the same pump as the disconnect, so one
    // wait watches for both in order.
    server.close_session();
    pump_until(
        &mut client,
        &mut store,
        "disconnect followed by automatic reconnect",
        Duration::from_secs(3),
        |events, _| {
            let lost = events
                .iter()
                .position(|event| matches!(event, LinkEvent::Disconnected { .. }));
            let back = events
                .iter()
                .rposition(|event| matches!(event, LinkEvent::Connected));
            matches!((lost, back), (Some(lost), Some(back)) if lost < back)
        },
    );
    assert!(client.is_connected());

    // The replacement session carries traffic both ways.
    assert!(client.send(&Command::Lister));
    let frame = server.recv_inbound(Duration::from_secs(3));
    assert_eq!(frame, json!({"action": "lister"}));
}

#[test]
fn retries_give_up_then_a_manual_reconnect_restores_the_feed() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let port = listener.local_addr().expect("read local addr").port();
    drop(listener);

    let endpoint =
        ServerEndpoint::parse(&format!("ws://127.0.0.1:{port}")).expect("parse endpoint");
    let mut client = SyncClient::new(endpoint, fast_policy(), Duration::from_millis(25));
    let mut store = StateStore::new();
    client.connect();
    assert!(!client.is_connected());

    let events = pump_until(
        &mut client,
        &mut store,
        "retries exhausted",
        Duration::from_secs(5),
        |events, _| {
            events
                .iter()
                .any(|event| matches!(event, LinkEvent::RetriesExhausted { .. }))
        },
    );
    assert!(events.iter().any(|event| matches!(
        event,
        LinkEvent::RetriesExhausted { attempts } if *attempts == 3
    )));
    // Gave up: the schedule stays idle until asked again.
    assert!(client.pump(&mut store).is_empty());
    assert!(store.snapshot().chains.is_empty());

    let _server = StubServer::start_on(port, vec![snapshot_text(None)]);
    client.request_reconnect();
    pump_until(
        &mut client,
        &mut store,
        "manual reconnect",
        Duration::from_secs(3),
        |events, store| {
            events.contains(&LinkEvent::Connected) && !store.snapshot().chains.is_empty()
        },
    );
    assert!(client.is_connected());
}
