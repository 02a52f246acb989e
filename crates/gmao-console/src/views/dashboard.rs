//! Machines grouped by production chain.

use gmao_sync::{EntityId, Machine, Snapshot, StatusTone};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use rustc_hash::FxHashMap;

use super::{
    cell, header_style, label_style, muted_style, screen_block, selected_style, tone_style,
    value_style,
};

const ID_WIDTH: usize = 10;
const NAME_WIDTH: usize = 24;

/// One machine row plus everything its bound actions need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineRow {
    pub id: EntityId,
    pub name: String,
    pub status: String,
    pub tone: StatusTone,
    pub chain_id: EntityId,
}

/// One production chain with its machine rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainBlock {
    pub chain_id: EntityId,
    pub title: String,
    pub rows: Vec<MachineRow>,
}

/// Dashboard contents; machine rows share one flattened selection index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardModel {
    pub blocks: Vec<ChainBlock>,
}

impl DashboardModel {
    /// Total selectable machine rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.blocks.iter().map(|block| block.rows.len()).sum()
    }

    /// Row at the flattened selection index.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&MachineRow> {
        let mut rest = index;
        for block in &self.blocks {
            if rest < block.rows.len() {
                return Some(&block.rows[rest]);
            }
            rest -= block.rows.len();
        }
        None
    }

    /// Chain to pre-select when adding a machine: the selected row's chain,
    /// else the first chain.
    #[must_use]
    pub fn add_target(&self, selected: usize) -> Option<&EntityId> {
        if let Some(row) = self.row(selected) {
            return Some(&row.chain_id);
        }
        self.blocks.first().map(|block| &block.chain_id)
    }
}

/// Groups machines under their chain, keeping server order in both.
/// Machines whose chain is absent from the snapshot are not shown.
#[must_use]
pub fn build_dashboard(snapshot: &Snapshot) -> DashboardModel {
    let mut by_chain: FxHashMap<&str, Vec<&Machine>> = FxHashMap::default();
    for machine in &snapshot.machines {
        by_chain
            .entry(machine.id_chain.as_str())
            .or_default()
            .push(machine);
    }
    let blocks = snapshot
        .chains
        .iter()
        .map(|chain| {
            let rows = by_chain
                .get(chain.id_chain.as_str())
                .map(|machines| {
                    machines
                        .iter()
                        .map(|machine| MachineRow {
                            id: machine.id_machine.clone(),
                            name: machine.name_machine.clone(),
                            status: machine.status_machine.clone(),
                            tone: machine.tone(),
                            chain_id: machine.id_chain.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            ChainBlock {
                chain_id: chain.id_chain.clone(),
                title: format!("Chaîne : {}", chain.name_chain),
                rows,
            }
        })
        .collect();
    DashboardModel { blocks }
}

/// Draws the chain blocks with the selected machine row highlighted.
pub fn render_dashboard(
    area: Rect,
    frame: &mut ratatui::Frame<'_>,
    model: &DashboardModel,
    selected: usize,
    focused: bool,
) {
    let mut lines = Vec::new();
    let mut selected_line = 0usize;
    if model.blocks.is_empty() {
        lines.push(Line::from(Span::styled(
            "No production chains available.",
            muted_style(),
        )));
    }
    let mut row_index = 0usize;
    for block in &model.blocks {
        lines.push(Line::from(vec![
            Span::styled(block.title.clone(), header_style()),
            Span::raw("  "),
            Span::styled("+ Ajouter", label_style()),
        ]));
        lines.push(Line::from(vec![
            Span::styled(cell("ID", ID_WIDTH), header_style()),
            Span::raw(" "),
            Span::styled(cell("Nom", NAME_WIDTH), header_style()),
            Span::raw(" "),
            Span::styled("Statut", header_style()),
        ]));
        for row in &block.rows {
            if focused && row_index == selected {
                selected_line = lines.len();
                lines.push(Line::from(Span::styled(
                    format!(
                        "{} {} {}",
                        cell(row.id.as_str(), ID_WIDTH),
                        cell(&row.name, NAME_WIDTH),
                        row.status
                    ),
                    selected_style(),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::styled(cell(row.id.as_str(), ID_WIDTH), value_style()),
                    Span::raw(" "),
                    Span::styled(cell(&row.name, NAME_WIDTH), value_style()),
                    Span::raw(" "),
                    Span::styled(row.status.clone(), tone_style(row.tone)),
                ]));
            }
            row_index += 1;
        }
        lines.push(Line::default());
    }
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = selected_line.saturating_sub(visible.saturating_sub(1)) as u16;
    let block = screen_block("Dashboard View", focused);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}
