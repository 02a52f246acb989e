//! Generic stock table.
//!
//! The stock collection has no fixed schema on the wire, so the table is
//! derived from the data: columns are the alphabetically sorted scalar keys
//! of the first item, and every row is read through those keys.

use gmao_sync::Snapshot;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use serde_json::Value;

use super::{cell, header_style, muted_style, screen_block, selected_style, value_style};

const MAX_COLUMN_WIDTH: usize = 24;

/// Stock screen contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockModel {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    }
}

/// Derives the table from the first item's scalar keys.
#[must_use]
pub fn build_stock(snapshot: &Snapshot) -> StockModel {
    let Some(first) = snapshot.stock.first() else {
        return StockModel::default();
    };
    let mut columns: Vec<String> = first
        .iter()
        .filter(|(_, value)| scalar_text(Some(value)).is_some())
        .map(|(key, _)| key.clone())
        .collect();
    columns.sort();
    let rows = snapshot
        .stock
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|key| scalar_text(item.get(key)).unwrap_or_default())
                .collect()
        })
        .collect();
    StockModel { columns, rows }
}

impl StockModel {
    fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let widest_cell = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|text| text.chars().count())
                    .max()
                    .unwrap_or(0);
                column.chars().count().max(widest_cell).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }
}

/// Draws the stock table with the selected row highlighted.
pub fn render_stock(
    area: Rect,
    frame: &mut ratatui::Frame<'_>,
    model: &StockModel,
    selected: usize,
    focused: bool,
) {
    let mut lines = Vec::new();
    let mut selected_line = 0usize;
    if model.rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "No stock data available.",
            muted_style(),
        )));
    } else {
        let widths = model.column_widths();
        let header = model
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| cell(column, *width))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(Span::styled(header, header_style())));
        for (index, row) in model.rows.iter().enumerate() {
            let text = row
                .iter()
                .zip(&widths)
                .map(|(value, width)| cell(value, *width))
                .collect::<Vec<_>>()
                .join(" ");
            if focused && index == selected {
                selected_line = lines.len();
                lines.push(Line::from(Span::styled(text, selected_style())));
            } else {
                lines.push(Line::from(Span::styled(text, value_style())));
            }
        }
    }
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = selected_line.saturating_sub(visible.saturating_sub(1)) as u16;
    let block = screen_block("Stock View", focused);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}
