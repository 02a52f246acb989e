//! Flat table of maintenance records.

use gmao_sync::{EntityId, Snapshot};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{
    cell, header_style, label_style, muted_style, screen_block, selected_style, value_style,
};

const ID_WIDTH: usize = 6;
const MACHINE_WIDTH: usize = 10;
const TYPE_WIDTH: usize = 12;
const DESC_WIDTH: usize = 24;
const DATE_WIDTH: usize = 10;
const STATUS_WIDTH: usize = 12;

/// One maintenance row plus everything its bound actions need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceRow {
    pub id: EntityId,
    pub machine_id: EntityId,
    pub kind: String,
    pub description: String,
    pub date: String,
    pub status: String,
    pub technician: String,
}

/// Maintenance screen contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaintenanceModel {
    pub rows: Vec<MaintenanceRow>,
}

impl MaintenanceModel {
    /// Row at the selection index.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&MaintenanceRow> {
        self.rows.get(index)
    }
}

/// Maps records to rows, keeping server order.
#[must_use]
pub fn build_maintenance(snapshot: &Snapshot) -> MaintenanceModel {
    let rows = snapshot
        .maintenance
        .iter()
        .map(|record| MaintenanceRow {
            id: record.id_maintenance.clone(),
            machine_id: record.id_machine.clone(),
            kind: record.kind.clone(),
            description: record.description.clone(),
            date: record.date.clone(),
            status: record.status_maintenance.clone(),
            technician: record.technician.clone(),
        })
        .collect();
    MaintenanceModel { rows }
}

/// Draws the maintenance table with the selected row highlighted.
pub fn render_maintenance(
    area: Rect,
    frame: &mut ratatui::Frame<'_>,
    model: &MaintenanceModel,
    selected: usize,
    focused: bool,
) {
    let mut lines = Vec::new();
    let mut selected_line = 0usize;
    lines.push(Line::from(Span::styled("Ajouter", label_style())));
    if model.rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "No maintenance records available.",
            muted_style(),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled(cell("ID", ID_WIDTH), header_style()),
            Span::raw(" "),
            Span::styled(cell("Machine ID", MACHINE_WIDTH), header_style()),
            Span::raw(" "),
            Span::styled(cell("Type", TYPE_WIDTH), header_style()),
            Span::raw(" "),
            Span::styled(cell("Description", DESC_WIDTH), header_style()),
            Span::raw(" "),
            Span::styled(cell("Date", DATE_WIDTH), header_style()),
            Span::raw(" "),
            Span::styled(cell("Status", STATUS_WIDTH), header_style()),
            Span::raw(" "),
            Span::styled("Technician", header_style()),
        ]));
        for (index, row) in model.rows.iter().enumerate() {
            let columns = format!(
                "{} {} {} {} {} {} {}",
                cell(row.id.as_str(), ID_WIDTH),
                cell(row.machine_id.as_str(), MACHINE_WIDTH),
                cell(&row.kind, TYPE_WIDTH),
                cell(&row.description, DESC_WIDTH),
                cell(&row.date, DATE_WIDTH),
                cell(&row.status, STATUS_WIDTH),
                row.technician
            );
            if focused && index == selected {
                selected_line = lines.len();
                lines.push(Line::from(Span::styled(columns, selected_style())));
            } else {
                lines.push(Line::from(Span::styled(columns, value_style())));
            }
        }
    }
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = selected_line.saturating_sub(visible.saturating_sub(1)) as u16;
    let block = screen_block("Maintenance View", focused);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

#[cfg(test)]
mod tests {
    use gmao_sync::decode_snapshot;
    use serde_json::json;

    use super::*;

    #[test]
    fn rows_follow_server_order() {
        let snapshot = decode_snapshot(
            &json!({
                "chains": [],
                "machines": [],
                "equipment": [],
                "maintenance": [
                    {
                        "id_maintenance": 2,
                        "id_machine": "M1",
                        "type": "préventive",
                        "description": "Vidange",
                        "date": "2024-03-01",
                        "status_maintenance": "En cours",
                        "technician": "Alice"
                    },
                    {
                        "id_maintenance": 1,
                        "id_machine": "M2",
                        "type": "curative",
                        "description": "Remplacement courroie",
                        "date": "2024-02-12",
                        "status_maintenance": "Planifiée",
                        "technician": "Bob"
                    }
                ],
                "stock": []
            })
            .to_string(),
        )
        .expect("snapshot");
        let model = build_maintenance(&snapshot);
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.rows[0].id, EntityId::from("2"));
        assert_eq!(model.rows[0].kind, "préventive");
        assert_eq!(model.rows[1].technician, "Bob");
        assert!(model.row(2).is_none());
    }

    #[test]
    fn empty_collection_builds_empty_model() {
        let snapshot = decode_snapshot(
            &json!({
                "chains": [],
                "machines": [],
                "equipment": [],
                "maintenance": [],
                "stock": []
            })
            .to_string(),
        )
        .expect("snapshot");
        let model = build_maintenance(&snapshot);
        assert!(model.rows.is_empty());
        assert_eq!(model, MaintenanceModel::default());
    }
}
