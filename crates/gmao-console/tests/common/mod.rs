use std::io::ErrorKind;
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};
use tungstenite::{Message, WebSocket};

enum Directive {
    Push(String),
    CloseSession,
}

/// Scripted stand-in for the maintenance server.
///
/// Accepts one websocket client at a time, pushes the greeting frames right
/// after each handshake the way the real server pushes its state, and records
/// every inbound text frame. After a session ends the listener keeps
/// accepting, so reconnecting clients land on a fresh session.
pub struct StubServer {
    url: String,
    inbound: Receiver<Value>,
    directives: Sender<Directive>,
}

impl StubServer {
    pub fn start(greeting: Vec<String>) -> Self {
        Self::start_on(0, greeting)
    }

    /// Binds a specific port so a test can bring the server up at an address
    /// the client is already retrying against. Port 0 picks a free one.
    pub fn start_on(port: u16, greeting: Vec<String>) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", port)).expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let (inbound_tx, inbound) = mpsc::channel();
        let (directives, directive_rx) = mpsc::channel();
        thread::spawn(move || serve(&listener, &greeting, &inbound_tx, &directive_rx));
        Self {
            url: format!("ws://{addr}"),
            inbound,
            directives,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Queues a text frame for the connected client.
    pub fn push(&self, text: impl Into<String>) {
        self.directives
            .send(Directive::Push(text.into()))
            .expect("stub server thread alive");
    }

    /// Closes the current session; the listener keeps accepting.
    pub fn close_session(&self) {
        self.directives
            .send(Directive::CloseSession)
            .expect("stub server thread alive");
    }

    /// Next recorded inbound frame, decoded as JSON.
    pub fn recv_inbound(&self, timeout: Duration) -> Value {
        self.inbound
            .recv_timeout(timeout)
            .expect("inbound frame before timeout")
    }
}

fn serve(
    listener: &TcpListener,
    greeting: &[String],
    inbound: &Sender<Value>,
    directives: &Receiver<Directive>,
) {
    loop {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let Ok(mut socket) = tungstenite::accept(stream) else {
            continue;
        };
        socket
            .get_ref()
            .set_read_timeout(Some(Duration::from_millis(25)))
            .expect("stub server read timeout");
        for text in greeting {
            if socket.send(text.clone().into()).is_err() {
                break;
            }
        }
        if !run_session(&mut socket, inbound, directives) {
            return;
        }
    }
}

/// Runs one accepted session. Returns `false` once the test is done with the
/// server and the thread should exit.
fn run_session(
    socket: &mut WebSocket<TcpStream>,
    inbound: &Sender<Value>,
    directives: &Receiver<Directive>,
) -> bool {
    loop {
        match directives.try_recv() {
            Ok(Directive::Push(text)) => {
                if socket.send(text.into()).is_err() {
                    return true;
                }
            }
            Ok(Directive::CloseSession) => {
                let _ = socket.close(None);
                let _ = socket.flush();
                return true;
            }
            Err(TryRecvError::Disconnected) => {
                let _ = socket.close(None);
                return false;
            }
            Err(TryRecvError::Empty) => {}
        }
        match socket.read() {
            Ok(Message::Text(text)) => {
                let frame: Value =
                    serde_json::from_str(text.as_str()).expect("inbound frame is JSON");
                if inbound.send(frame).is_err() {
                    return false;
                }
            }
            Ok(Message::Close(_)) => return true,
            Ok(_) => {}
            Err(tungstenite::Error::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(_) => return true,
        }
    }
}

/// A full five-collection snapshot the way the maintenance server pushes it.
pub fn snapshot_text(seq: Option<u64>) -> String {
    let mut payload = json!({
        "chains": [
            {"id_chain": 1, "name_chain": "Ligne A"},
            {"id_chain": 2, "name_chain": "Ligne B"}
        ],
        "machines": [
            {"id_machine": "M1", "name_machine": "Presse", "status_machine": "En fonctionnement", "id_chain": 1},
            {"id_machine": "M2", "name_machine": "Four", "status_machine": "En panne", "id_chain": 2}
        ],
        "equipment": [
            {"id_equipment": 7, "name_equipment": "Convoyeur"}
        ],
        "maintenance": [
            {"id_maintenance": "R1", "id_machine": "M1", "type": "Préventive",
             "description": "Graissage", "date": "2026-03-01",
             "status_maintenance": "En cours", "technician": "Alice"}
        ],
        "stock": [
            {"id_stock": 4, "name_article": "Courroie", "quantity": 12}
        ]
    });
    if let Some(seq) = seq {
        payload["seq"] = json!(seq);
    }
    payload.to_string()
}
