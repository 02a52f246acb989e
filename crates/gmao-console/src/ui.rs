//! Interactive terminal loop.
//!
//! Raw mode and the alternate screen are entered once and restored on every
//! exit path. Each iteration pumps the socket, rebuilds the view models when
//! the store changed, draws, then polls the keyboard with a short timeout so
//! inbound snapshots keep flowing while the operator is idle.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use gmao_sync::{Command, Snapshot, StateStore};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;

use crate::config::ConsoleConfig;
use crate::dialog::{self, DialogOutcome, DialogState};
use crate::router::{Route, Router};
use crate::sync_client::{LinkEvent, SyncClient};
use crate::views::{
    build_dashboard, build_maintenance, build_stock, header_style, link_chip, muted_style,
    render_dashboard, render_maintenance, render_not_found, render_sidebar, render_stock,
    COLOR_AMBER, COLOR_GREEN, COLOR_RED, DashboardModel, MaintenanceModel, StockModel,
};

const SIDEBAR_WIDTH: u16 = 20;
const ALERT_LINES: u16 = 2;

struct AlertLine {
    text: String,
    style: Style,
}

struct UiState {
    router: Router,
    endpoint: String,
    dashboard: DashboardModel,
    maintenance: MaintenanceModel,
    stock: StockModel,
    dashboard_index: usize,
    maintenance_index: usize,
    stock_index: usize,
    alerts: VecDeque<AlertLine>,
    dialog: Option<DialogState>,
    connected: bool,
}

impl UiState {
    fn new(endpoint: String) -> Self {
        Self {
            router: Router::default(),
            endpoint,
            dashboard: DashboardModel::default(),
            maintenance: MaintenanceModel::default(),
            stock: StockModel::default(),
            dashboard_index: 0,
            maintenance_index: 0,
            stock_index: 0,
            alerts: VecDeque::with_capacity(6),
            dialog: None,
            connected: false,
        }
    }
}

/// Runs the interactive console until the operator quits.
pub fn run_ui(config: &ConsoleConfig) -> anyhow::Result<()> {
    let mut client = SyncClient::from_config(config).context("resolving server endpoint")?;
    let mut store = StateStore::new();
    let dirty = Rc::new(Cell::new(true));
    let observer = {
        let dirty = Rc::clone(&dirty);
        store.subscribe(move |_| dirty.set(true))
    };

    let mut state = UiState::new(client.endpoint().url.to_string());
    let connecting = format!("CONNECTING {}.", state.endpoint);
    push_alert(&mut state, &connecting, muted_style());
    client.connect();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = (|| {
        loop {
            for link_event in client.pump(&mut store) {
                apply_link_event(&mut state, &link_event);
            }
            state.connected = client.is_connected();
            if dirty.take() {
                rebuild_models(&mut state, store.snapshot());
            }

            terminal.draw(|frame| render_ui(frame.area(), frame, &state))?;

            if event::poll(config.poll_interval)? {
                if let Event::Key(key) = event::read()? {
                    if handle_key(key, &mut client, store.snapshot(), &mut state) {
                        break;
                    }
                }
            }
        }
        Ok(())
    })();

    store.unsubscribe(observer);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn apply_link_event(state: &mut UiState, link_event: &LinkEvent) {
    match link_event {
        LinkEvent::Connected => push_alert(
            state,
            "CONNECTED Snapshot feed live.",
            Style::default().fg(COLOR_GREEN),
        ),
        LinkEvent::Disconnected { reason } => push_alert(
            state,
            &format!("DISCONNECTED {reason}."),
            Style::default().fg(COLOR_AMBER),
        ),
        LinkEvent::RetriesExhausted { attempts } => push_alert(
            state,
            &format!("OFFLINE Gave up after {attempts} attempts. Press R to reconnect."),
            Style::default().fg(COLOR_RED),
        ),
        LinkEvent::SnapshotDiscarded { reason } => push_alert(
            state,
            &format!("DISCARDED {reason}."),
            Style::default().fg(COLOR_AMBER),
        ),
    }
}

fn rebuild_models(state: &mut UiState, snapshot: &Snapshot) {
    state.dashboard = build_dashboard(snapshot);
    state.maintenance = build_maintenance(snapshot);
    state.stock = build_stock(snapshot);
    state.dashboard_index = clamp_index(state.dashboard_index, state.dashboard.row_count());
    state.maintenance_index = clamp_index(state.maintenance_index, state.maintenance.rows.len());
    state.stock_index = clamp_index(state.stock_index, state.stock.rows.len());
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

/// Returns `true` when the operator asked to quit.
fn handle_key(
    key: KeyEvent,
    client: &mut SyncClient,
    snapshot: &Snapshot,
    state: &mut UiState,
) -> bool {
    if state.dialog.is_some() {
        handle_dialog_key(key, client, state);
        return false;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            state.router.next_tab();
        }
        KeyCode::BackTab => {
            state.router.prev_tab();
        }
        KeyCode::Char('1') => state.router.set(Route::Dashboard),
        KeyCode::Char('2') => state.router.set(Route::Maintenance),
        KeyCode::Char('3') => state.router.set(Route::Stock),
        KeyCode::Up => move_selection(state, -1),
        KeyCode::Down => move_selection(state, 1),
        KeyCode::Char('a') => open_add_dialog(state, snapshot),
        KeyCode::Char('e') => open_edit_dialog(state, snapshot),
        KeyCode::Char('d') => open_delete_dialog(state),
        KeyCode::Char('r') => request_refresh(client, state),
        KeyCode::Char('R') => {
            client.request_reconnect();
            push_alert(state, "RECONNECT Requested.", muted_style());
        }
        _ => {}
    }
    false
}

fn handle_dialog_key(key: KeyEvent, client: &mut SyncClient, state: &mut UiState) {
    let Some(open_dialog) = state.dialog.as_mut() else {
        return;
    };
    match open_dialog.handle_key(key) {
        DialogOutcome::Open => {}
        DialogOutcome::Cancelled => state.dialog = None,
        DialogOutcome::Submit(command) => {
            if client.send(&command) {
                push_alert(state, &format!("SENT {}.", command.action()), muted_style());
            } else {
                push_alert(state, "WebSocket not ready", Style::default().fg(COLOR_RED));
            }
            state.dialog = None;
        }
    }
}

fn move_selection(state: &mut UiState, delta: isize) {
    let (index, len) = match state.router.active() {
        Route::Dashboard => (&mut state.dashboard_index, state.dashboard.row_count()),
        Route::Maintenance => (&mut state.maintenance_index, state.maintenance.rows.len()),
        Route::Stock => (&mut state.stock_index, state.stock.rows.len()),
        Route::NotFound => return,
    };
    if len == 0 {
        *index = 0;
        return;
    }
    *index = (*index as isize + delta).clamp(0, len as isize - 1) as usize;
}

fn open_add_dialog(state: &mut UiState, snapshot: &Snapshot) {
    match state.router.active() {
        Route::Dashboard => {
            if snapshot.chains.is_empty() {
                push_alert(
                    state,
                    "No production chains to attach a machine to.",
                    muted_style(),
                );
                return;
            }
            let target = state.dashboard.add_target(state.dashboard_index).cloned();
            state.dialog = Some(DialogState::add_machine(&snapshot.chains, target.as_ref()));
        }
        Route::Maintenance => {
            state.dialog = Some(DialogState::add_maintenance(
                snapshot.technicians(),
                dialog::today_iso(),
            ));
        }
        Route::Stock | Route::NotFound => {}
    }
}

fn open_edit_dialog(state: &mut UiState, snapshot: &Snapshot) {
    match state.router.active() {
        Route::Dashboard => {
            if let Some(row) = state.dashboard.row(state.dashboard_index) {
                state.dialog = Some(DialogState::modify_machine(row, &snapshot.chains));
            }
        }
        Route::Maintenance => {
            if let Some(row) = state.maintenance.row(state.maintenance_index) {
                state.dialog = Some(DialogState::modify_maintenance(
                    row,
                    snapshot.technicians(),
                ));
            }
        }
        Route::Stock | Route::NotFound => {}
    }
}

fn open_delete_dialog(state: &mut UiState) {
    match state.router.active() {
        Route::Dashboard => {
            if let Some(row) = state.dashboard.row(state.dashboard_index) {
                state.dialog = Some(DialogState::delete_machine(row));
            }
        }
        Route::Maintenance => {
            if let Some(row) = state.maintenance.row(state.maintenance_index) {
                state.dialog = Some(DialogState::delete_maintenance(row));
            }
        }
        Route::Stock | Route::NotFound => {}
    }
}

fn request_refresh(client: &mut SyncClient, state: &mut UiState) {
    if client.send(&Command::Lister) {
        push_alert(state, "SENT lister.", muted_style());
    } else {
        push_alert(state, "WebSocket not ready", Style::default().fg(COLOR_RED));
    }
}

fn push_alert(state: &mut UiState, text: &str, style: Style) {
    state.alerts.push_back(AlertLine {
        text: text.to_string(),
        style,
    });
    if state.alerts.len() > 4 {
        state.alerts.pop_front();
    }
}

fn render_ui(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);
    render_sidebar(columns[0], frame, state.router.active());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(ALERT_LINES),
            Constraint::Length(1),
        ])
        .split(columns[1]);
    render_header(rows[0], frame, state);
    let focused = state.dialog.is_none();
    match state.router.active() {
        Route::Dashboard => render_dashboard(
            rows[1],
            frame,
            &state.dashboard,
            state.dashboard_index,
            focused,
        ),
        Route::Maintenance => render_maintenance(
            rows[1],
            frame,
            &state.maintenance,
            state.maintenance_index,
            focused,
        ),
        Route::Stock => render_stock(rows[1], frame, &state.stock, state.stock_index, focused),
        Route::NotFound => render_not_found(rows[1], frame),
    }
    render_alerts(rows[2], frame, state);
    render_keybar(rows[3], frame);

    if let Some(open_dialog) = &state.dialog {
        dialog::render_dialog(frame, open_dialog);
    }
}

fn render_header(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let (chip, chip_style) = link_chip(state.connected);
    let line = Line::from(vec![
        Span::styled(chip, chip_style),
        Span::raw(" "),
        Span::styled("GMAO Floor Console", header_style()),
        Span::raw("  "),
        Span::styled(state.endpoint.clone(), muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_alerts(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let skip = state.alerts.len().saturating_sub(area.height as usize);
    let lines: Vec<Line> = state
        .alerts
        .iter()
        .skip(skip)
        .map(|alert| Line::from(Span::styled(alert.text.clone(), alert.style)))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_keybar(area: Rect, frame: &mut ratatui::Frame<'_>) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "q quit. Tab/1-3 views. ↑/↓ select. a add. e edit. d delete. r refresh. R reconnect.",
            muted_style(),
        ))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gmao_sync::{Chain, Machine, MaintenanceRecord};

    use crate::config::ReconnectPolicy;
    use crate::dialog::DialogKind;
    use crate::sync_client::ServerEndpoint;

    use super::*;

    fn offline_client() -> SyncClient {
        let endpoint = ServerEndpoint::parse("ws://127.0.0.1:1").expect("endpoint");
        SyncClient::new(
            endpoint,
            ReconnectPolicy::default(),
            Duration::from_millis(5),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn floor_snapshot() -> Snapshot {
        Snapshot {
            chains: vec![
                Chain {
                    id_chain: "1".into(),
                    name_chain: "A".to_string(),
                },
                Chain {
                    id_chain: "2".into(),
                    name_chain: "B".to_string(),
                },
            ],
            machines: vec![
                Machine {
                    id_machine: "M1".into(),
                    name_machine: "Press".to_string(),
                    status_machine: "En panne".to_string(),
                    id_chain: "1".into(),
                },
                Machine {
                    id_machine: "M2".into(),
                    name_machine: "Lathe".to_string(),
                    status_machine: "En fonctionnement".to_string(),
                    id_chain: "2".into(),
                },
            ],
            maintenance: vec![MaintenanceRecord {
                id_maintenance: "7".into(),
                id_machine: "M1".into(),
                kind: "curative".to_string(),
                description: "Vidange".to_string(),
                date: "2024-02-12".to_string(),
                status_maintenance: "En cours".to_string(),
                technician: "Alice".to_string(),
            }],
            ..Snapshot::default()
        }
    }

    fn populated_state() -> UiState {
        let mut state = UiState::new("ws://localhost:9001".to_string());
        rebuild_models(&mut state, &floor_snapshot());
        state
    }

    #[test]
    fn quit_keys_end_the_loop() {
        let mut client = offline_client();
        let snapshot = Snapshot::default();
        let mut state = populated_state();
        assert!(handle_key(
            key(KeyCode::Char('q')),
            &mut client,
            &snapshot,
            &mut state
        ));
        assert!(handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut client,
            &snapshot,
            &mut state
        ));
    }

    #[test]
    fn tab_and_number_keys_change_the_route() {
        let mut client = offline_client();
        let snapshot = Snapshot::default();
        let mut state = populated_state();
        handle_key(key(KeyCode::Tab), &mut client, &snapshot, &mut state);
        assert_eq!(state.router.active(), Route::Maintenance);
        handle_key(key(KeyCode::Char('3')), &mut client, &snapshot, &mut state);
        assert_eq!(state.router.active(), Route::Stock);
        handle_key(key(KeyCode::Char('1')), &mut client, &snapshot, &mut state);
        assert_eq!(state.router.active(), Route::Dashboard);
    }

    #[test]
    fn selection_clamps_to_the_model() {
        let mut client = offline_client();
        let snapshot = floor_snapshot();
        let mut state = populated_state();
        for _ in 0..5 {
            handle_key(key(KeyCode::Down), &mut client, &snapshot, &mut state);
        }
        assert_eq!(state.dashboard_index, 1);
        for _ in 0..5 {
            handle_key(key(KeyCode::Up), &mut client, &snapshot, &mut state);
        }
        assert_eq!(state.dashboard_index, 0);
    }

    #[test]
    fn add_on_dashboard_preselects_the_selected_rows_chain() {
        let mut client = offline_client();
        let snapshot = floor_snapshot();
        let mut state = populated_state();
        handle_key(key(KeyCode::Down), &mut client, &snapshot, &mut state);
        handle_key(key(KeyCode::Char('a')), &mut client, &snapshot, &mut state);
        let open_dialog = state.dialog.as_ref().expect("dialog open");
        assert_eq!(open_dialog.kind, DialogKind::AddMachine);
        let chain = open_dialog
            .fields
            .iter()
            .find(|field| field.label == "Chaîne")
            .expect("chain field");
        assert_eq!(chain.value, "2");
    }

    #[test]
    fn offline_submit_alerts_websocket_not_ready_and_closes() {
        let mut client = offline_client();
        let snapshot = floor_snapshot();
        let mut state = populated_state();
        handle_key(key(KeyCode::Char('d')), &mut client, &snapshot, &mut state);
        assert!(state.dialog.is_some());
        handle_key(key(KeyCode::Enter), &mut client, &snapshot, &mut state);
        assert!(state.dialog.is_none());
        let last = state.alerts.back().expect("alert");
        assert_eq!(last.text, "WebSocket not ready");
    }

    #[test]
    fn stock_view_exposes_no_edit_actions() {
        let mut client = offline_client();
        let snapshot = floor_snapshot();
        let mut state = populated_state();
        handle_key(key(KeyCode::Char('3')), &mut client, &snapshot, &mut state);
        handle_key(key(KeyCode::Char('e')), &mut client, &snapshot, &mut state);
        handle_key(key(KeyCode::Char('d')), &mut client, &snapshot, &mut state);
        assert!(state.dialog.is_none());
    }

    #[test]
    fn alerts_keep_only_the_latest_four() {
        let mut state = populated_state();
        for index in 0..6 {
            push_alert(&mut state, &format!("alert {index}"), muted_style());
        }
        assert_eq!(state.alerts.len(), 4);
        assert_eq!(state.alerts.front().expect("front").text, "alert 2");
    }

    #[test]
    fn rebuild_clamps_stale_selection() {
        let mut state = populated_state();
        state.dashboard_index = 5;
        rebuild_models(&mut state, &Snapshot::default());
        assert_eq!(state.dashboard_index, 0);
        assert!(state.dashboard.blocks.is_empty());
    }

    #[test]
    fn link_events_surface_as_alerts() {
        let mut state = populated_state();
        apply_link_event(
            &mut state,
            &LinkEvent::RetriesExhausted { attempts: 10 },
        );
        let last = state.alerts.back().expect("alert");
        assert!(last.text.contains("10 attempts"));
        assert!(last.text.contains("Press R"));
    }
}
