#![no_main]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gmao_console::dialog::{render_dialog, DialogOutcome, DialogState};
use gmao_console::views::{MachineRow, MaintenanceRow};
use gmao_sync::{Chain, EntityId, StatusTone};
use libfuzzer_sys::fuzz_target;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

const MAX_KEYS: usize = 512;

fn key_for(byte: u8) -> KeyEvent {
    let code = match byte % 12 {
        0 => KeyCode::Tab,
        1 => KeyCode::BackTab,
        2 => KeyCode::Up,
        3 => KeyCode::Down,
        4 => KeyCode::Left,
        5 => KeyCode::Right,
        6 => KeyCode::Enter,
        7 => KeyCode::Backspace,
        8 => KeyCode::Esc,
        _ => KeyCode::Char(char::from(b' ' + byte % 95)),
    };
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn chains_of(count: u8) -> Vec<Chain> {
    (0..usize::from(count % 5))
        .map(|index| Chain {
            id_chain: EntityId::new((index + 1).to_string()),
            name_chain: format!("Ligne {index}"),
        })
        .collect()
}

fn machine_row() -> MachineRow {
    MachineRow {
        id: EntityId::new("M1"),
        name: "Presse".to_string(),
        status: "En panne".to_string(),
        tone: StatusTone::Failure,
        chain_id: EntityId::new("1"),
    }
}

fn maintenance_row() -> MaintenanceRow {
    MaintenanceRow {
        id: EntityId::new("R1"),
        machine_id: EntityId::new("M1"),
        kind: "Préventive".to_string(),
        description: "Graissage".to_string(),
        date: "2026-03-01".to_string(),
        status: "En cours".to_string(),
        technician: "Alice".to_string(),
    }
}

fn render_once(state: &DialogState, width: u16, height: u16) {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("test terminal");
    terminal
        .draw(|frame| render_dialog(frame, state))
        .expect("draw dialog");
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let chains = chains_of(data[1]);
    let technicians = vec!["Alice".to_string(), "Bob".to_string()];
    let preselect = chains.last().map(|chain| chain.id_chain.clone());
    let mut dialog = match data[0] % 6 {
        0 => DialogState::add_machine(&chains, preselect.as_ref()),
        1 => DialogState::modify_machine(&machine_row(), &chains),
        2 => DialogState::delete_machine(&machine_row()),
        3 => DialogState::add_maintenance(technicians.clone(), "2026-03-01".to_string()),
        4 => DialogState::modify_maintenance(&maintenance_row(), technicians),
        _ => DialogState::delete_maintenance(&maintenance_row()),
    };

    let width = u16::from(data[2]) % 100;
    let height = u16::from(data[3]) % 50;

    for &byte in data[4..].iter().take(MAX_KEYS) {
        match dialog.handle_key(key_for(byte)) {
            DialogOutcome::Open => {}
            DialogOutcome::Cancelled => return,
            DialogOutcome::Submit(command) => {
                // Whatever the keys produced, an accepted form must encode.
                command.encode().expect("submitted command encodes");
                return;
            }
        }
    }
    render_once(&dialog, width, height);
});
