//! Modal dialogs for machine and maintenance edits.
//!
//! One dialog at most is open. Submission validates required fields, builds
//! the outgoing command, and closes the dialog immediately; the next server
//! snapshot is the only acknowledgment. Cancel closes without side effects.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent};
use gmao_sync::{Chain, Command, EntityId, MACHINE_STATUSES};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::views::{
    label_style, muted_style, screen_block, selected_style, value_style, COLOR_RED, MachineRow,
    MaintenanceRow,
};

const REQUIRED_MESSAGE: &str = "All fields required.";
const LABEL_WIDTH: usize = 12;

/// Today's date as `YYYY-MM-DD`, prefilled into Add Maintenance.
#[must_use]
pub fn today_iso() -> String {
    let date = time::OffsetDateTime::now_utc().date();
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Which edit flow the dialog drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    AddMachine,
    ModifyMachine,
    DeleteMachine,
    AddMaintenance,
    ModifyMaintenance,
    DeleteMaintenance,
}

/// Field behavior under keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Carried into the command but not editable.
    Fixed,
    /// One of a fixed set; Left/Right cycles. `value` holds the submitted
    /// option value, the paired label is what gets displayed.
    Select {
        options: Vec<(String, String)>,
        index: usize,
    },
    /// Free text with Left/Right cycling through prior values.
    Suggest {
        options: Vec<String>,
        index: Option<usize>,
    },
}

/// One dialog field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl Field {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            kind: FieldKind::Text,
        }
    }

    fn fixed(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            kind: FieldKind::Fixed,
        }
    }

    fn select(label: &'static str, options: Vec<(String, String)>, index: usize) -> Self {
        let value = options
            .get(index)
            .map(|(value, _)| value.clone())
            .unwrap_or_default();
        Self {
            label,
            value,
            kind: FieldKind::Select { options, index },
        }
    }

    fn suggest(label: &'static str, value: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            label,
            value: value.into(),
            kind: FieldKind::Suggest {
                options,
                index: None,
            },
        }
    }

    fn display_text(&self) -> &str {
        match &self.kind {
            FieldKind::Select { options, index } => options
                .get(*index)
                .map(|(_, label)| label.as_str())
                .unwrap_or_default(),
            _ => self.value.as_str(),
        }
    }
}

/// Target of a delete confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub id: EntityId,
    pub label: String,
}

/// What a key press did to the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Key consumed; dialog stays open.
    Open,
    /// Closed without sending.
    Cancelled,
    /// Closed; send this command.
    Submit(Command),
}

/// Modal dialog state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogState {
    pub kind: DialogKind,
    pub title: &'static str,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub error: Option<&'static str>,
    pub confirm: Option<DeleteTarget>,
}

fn status_options() -> Vec<(String, String)> {
    MACHINE_STATUSES
        .iter()
        .map(|status| ((*status).to_string(), (*status).to_string()))
        .collect()
}

fn chain_options(chains: &[Chain]) -> Vec<(String, String)> {
    chains
        .iter()
        .map(|chain| (chain.id_chain.to_string(), chain.name_chain.clone()))
        .collect()
}

impl DialogState {
    fn new(kind: DialogKind, title: &'static str, fields: Vec<Field>) -> Self {
        let mut state = Self {
            kind,
            title,
            fields,
            focus: 0,
            error: None,
            confirm: None,
        };
        if matches!(
            state.fields.first().map(|field| &field.kind),
            Some(FieldKind::Fixed)
        ) {
            state.move_focus(1);
        }
        state
    }

    /// Add Machine, chain select pre-set to the block it was opened from.
    #[must_use]
    pub fn add_machine(chains: &[Chain], preselect: Option<&EntityId>) -> Self {
        let options = chain_options(chains);
        let index = preselect
            .and_then(|id| options.iter().position(|(value, _)| value == id.as_str()))
            .unwrap_or(0);
        Self::new(
            DialogKind::AddMachine,
            "Add Machine",
            vec![
                Field::text("ID", ""),
                Field::text("Nom", ""),
                Field::select("Statut", status_options(), 0),
                Field::select("Chaîne", options, index),
            ],
        )
    }

    /// Modify Machine with the row's values, ID read-only.
    #[must_use]
    pub fn modify_machine(row: &MachineRow, chains: &[Chain]) -> Self {
        let statuses = status_options();
        let status_index = statuses
            .iter()
            .position(|(value, _)| *value == row.status)
            .unwrap_or(0);
        let options = chain_options(chains);
        let chain_index = options
            .iter()
            .position(|(value, _)| value == row.chain_id.as_str())
            .unwrap_or(0);
        Self::new(
            DialogKind::ModifyMachine,
            "Modify Machine",
            vec![
                Field::fixed("ID", row.id.to_string()),
                Field::text("Nom", row.name.clone()),
                Field::select("Statut", statuses, status_index),
                Field::select("Chaîne", options, chain_index),
            ],
        )
    }

    /// Delete Machine confirmation, showing the machine's name.
    #[must_use]
    pub fn delete_machine(row: &MachineRow) -> Self {
        let mut state = Self::new(DialogKind::DeleteMachine, "Delete Machine", Vec::new());
        state.confirm = Some(DeleteTarget {
            id: row.id.clone(),
            label: format!("{} ({})", row.name, row.id),
        });
        state
    }

    /// Add Maintenance, date prefilled and technician suggestions attached.
    #[must_use]
    pub fn add_maintenance(technicians: Vec<String>, today: String) -> Self {
        Self::new(
            DialogKind::AddMaintenance,
            "Add Maintenance",
            vec![
                Field::text("ID", ""),
                Field::text("Machine ID", ""),
                Field::text("Type", ""),
                Field::text("Description", ""),
                Field::text("Date", today),
                Field::text("Status", ""),
                Field::suggest("Technician", "", technicians),
            ],
        )
    }

    /// Modify Maintenance with the row's values, ID read-only.
    #[must_use]
    pub fn modify_maintenance(row: &MaintenanceRow, technicians: Vec<String>) -> Self {
        Self::new(
            DialogKind::ModifyMaintenance,
            "Modify Maintenance",
            vec![
                Field::fixed("ID", row.id.to_string()),
                Field::text("Machine ID", row.machine_id.to_string()),
                Field::text("Type", row.kind.clone()),
                Field::text("Description", row.description.clone()),
                Field::text("Date", row.date.clone()),
                Field::text("Status", row.status.clone()),
                Field::suggest("Technician", row.technician.clone(), technicians),
            ],
        )
    }

    /// Delete Maintenance confirmation.
    #[must_use]
    pub fn delete_maintenance(row: &MaintenanceRow) -> Self {
        let mut state = Self::new(
            DialogKind::DeleteMaintenance,
            "Delete Maintenance",
            Vec::new(),
        );
        state.confirm = Some(DeleteTarget {
            id: row.id.clone(),
            label: format!("record {} (machine {})", row.id, row.machine_id),
        });
        state
    }

    /// Applies one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> DialogOutcome {
        if key.code == KeyCode::Esc {
            return DialogOutcome::Cancelled;
        }
        if self.confirm.is_some() {
            if key.code == KeyCode::Enter {
                return DialogOutcome::Submit(self.command());
            }
            return DialogOutcome::Open;
        }
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(1);
                DialogOutcome::Open
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(-1);
                DialogOutcome::Open
            }
            KeyCode::Left => {
                self.cycle(-1);
                DialogOutcome::Open
            }
            KeyCode::Right => {
                self.cycle(1);
                DialogOutcome::Open
            }
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    match &mut field.kind {
                        FieldKind::Text => {
                            field.value.pop();
                        }
                        FieldKind::Suggest { index, .. } => {
                            field.value.pop();
                            *index = None;
                        }
                        _ => {}
                    }
                }
                DialogOutcome::Open
            }
            KeyCode::Char(ch) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    match &mut field.kind {
                        FieldKind::Text => field.value.push(ch),
                        FieldKind::Suggest { index, .. } => {
                            field.value.push(ch);
                            *index = None;
                        }
                        _ => {}
                    }
                }
                DialogOutcome::Open
            }
            _ => DialogOutcome::Open,
        }
    }

    fn submit(&mut self) -> DialogOutcome {
        let complete = self
            .fields
            .iter()
            .all(|field| !field.value.trim().is_empty());
        if !complete {
            self.error = Some(REQUIRED_MESSAGE);
            return DialogOutcome::Open;
        }
        DialogOutcome::Submit(self.command())
    }

    fn command(&self) -> Command {
        match self.kind {
            DialogKind::AddMachine => Command::AddMachine {
                id_machine: EntityId::new(&self.value("ID")),
                name_machine: self.value("Nom"),
                status_machine: self.value("Statut"),
                id_chain: EntityId::new(&self.value("Chaîne")),
            },
            DialogKind::ModifyMachine => Command::ModifyMachine {
                id_machine: EntityId::new(&self.value("ID")),
                name_machine: self.value("Nom"),
                status_machine: self.value("Statut"),
                id_chain: EntityId::new(&self.value("Chaîne")),
            },
            DialogKind::DeleteMachine => Command::DeleteMachine {
                id_machine: self.confirm_id(),
            },
            DialogKind::AddMaintenance => Command::AddMaintenance {
                id_maintenance: EntityId::new(&self.value("ID")),
                id_machine: EntityId::new(&self.value("Machine ID")),
                kind: self.value("Type"),
                description: self.value("Description"),
                date: self.value("Date"),
                status_maintenance: self.value("Status"),
                technician: self.value("Technician"),
            },
            DialogKind::ModifyMaintenance => Command::ModifyMaintenance {
                id_maintenance: EntityId::new(&self.value("ID")),
                id_machine: EntityId::new(&self.value("Machine ID")),
                kind: self.value("Type"),
                description: self.value("Description"),
                date: self.value("Date"),
                status_maintenance: self.value("Status"),
                technician: self.value("Technician"),
            },
            DialogKind::DeleteMaintenance => Command::DeleteMaintenance {
                id_maintenance: self.confirm_id(),
            },
        }
    }

    fn value(&self, label: &str) -> String {
        self.fields
            .iter()
            .find(|field| field.label == label)
            .map(|field| field.value.trim().to_string())
            .unwrap_or_default()
    }

    fn confirm_id(&self) -> EntityId {
        self.confirm
            .as_ref()
            .map(|target| target.id.clone())
            .unwrap_or_default()
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.fields.len();
        if len == 0 {
            return;
        }
        let mut index = self.focus;
        for _ in 0..len {
            index = (index as isize + delta).rem_euclid(len as isize) as usize;
            if !matches!(self.fields[index].kind, FieldKind::Fixed) {
                break;
            }
        }
        self.focus = index;
    }

    fn cycle(&mut self, delta: isize) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        match &mut field.kind {
            FieldKind::Select { options, index } => {
                if options.is_empty() {
                    return;
                }
                let len = options.len() as isize;
                *index = (*index as isize + delta).rem_euclid(len) as usize;
                field.value = options[*index].0.clone();
            }
            FieldKind::Suggest { options, index } => {
                if options.is_empty() {
                    return;
                }
                let len = options.len() as isize;
                let next = match *index {
                    Some(current) => (current as isize + delta).rem_euclid(len) as usize,
                    None => {
                        if delta >= 0 {
                            0
                        } else {
                            options.len() - 1
                        }
                    }
                };
                *index = Some(next);
                field.value = options[next].clone();
            }
            _ => {}
        }
    }
}

/// Draws the dialog centered over the active screen.
pub fn render_dialog(frame: &mut ratatui::Frame<'_>, state: &DialogState) {
    let screen = frame.area();
    let width = screen.width.min(58);
    let body_lines = if state.confirm.is_some() {
        2
    } else {
        state.fields.len() as u16 + 2
    };
    let height = (body_lines + 3).min(screen.height);
    let rect = Rect {
        x: screen.width.saturating_sub(width) / 2,
        y: screen.height.saturating_sub(height) / 2,
        width,
        height,
    };

    let mut lines = Vec::new();
    if let Some(target) = &state.confirm {
        lines.push(Line::from(Span::styled(
            format!("Delete {} ?", target.label),
            value_style(),
        )));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Enter to confirm. Esc to cancel.",
            muted_style(),
        )));
    } else {
        for (index, field) in state.fields.iter().enumerate() {
            let label = format!("{:<LABEL_WIDTH$}", field.label);
            let value_span = if index == state.focus {
                Span::styled(format!("{} ", field.display_text()), selected_style())
            } else if matches!(field.kind, FieldKind::Fixed) {
                Span::styled(field.display_text().to_string(), muted_style())
            } else {
                Span::styled(field.display_text().to_string(), value_style())
            };
            lines.push(Line::from(vec![
                Span::styled(label, label_style()),
                Span::raw(" "),
                value_span,
            ]));
        }
        lines.push(Line::default());
        if let Some(error) = state.error {
            lines.push(Line::from(Span::styled(
                error,
                Style::default().fg(COLOR_RED),
            )));
        } else if let Some(hint) = suggestion_hint(state) {
            lines.push(Line::from(Span::styled(hint, muted_style())));
        } else {
            lines.push(Line::from(Span::styled(
                "Tab/↓ next field. ←/→ cycle. Enter to send. Esc to cancel.",
                muted_style(),
            )));
        }
    }

    let block = screen_block(state.title, true);
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn suggestion_hint(state: &DialogState) -> Option<String> {
    let field = state.fields.get(state.focus)?;
    match &field.kind {
        FieldKind::Suggest { options, .. } if !options.is_empty() => {
            Some(format!("←/→ suggestions: {}", options.join(", ")))
        }
        _ => None,
    }
}
