//! Per-screen view models and rendering.
//!
//! Each screen builds a plain model from the snapshot with a pure function so
//! contents can be asserted without a terminal. Render functions only lay a
//! model out.

/// Machines grouped by production chain.
pub mod dashboard;
/// Flat table of maintenance records.
pub mod maintenance;
/// Generic stock table.
pub mod stock;

pub use dashboard::{build_dashboard, render_dashboard, ChainBlock, DashboardModel, MachineRow};
pub use maintenance::{build_maintenance, render_maintenance, MaintenanceModel, MaintenanceRow};
pub use stock::{build_stock, render_stock, StockModel};

use gmao_sync::StatusTone;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::router::Route;

pub(crate) const COLOR_TEAL: Color = Color::Rgb(0, 168, 150);
pub(crate) const COLOR_GREEN: Color = Color::Rgb(46, 204, 113);
pub(crate) const COLOR_AMBER: Color = Color::Rgb(243, 156, 18);
pub(crate) const COLOR_RED: Color = Color::Rgb(231, 76, 60);
pub(crate) const COLOR_INFO: Color = Color::Rgb(142, 142, 147);
pub(crate) const COLOR_YELLOW: Color = Color::Rgb(245, 196, 66);
pub(crate) const COLOR_CYAN: Color = Color::Rgb(64, 212, 255);

pub(crate) fn screen_block(title: &str, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(COLOR_TEAL)
    } else {
        Style::default().fg(COLOR_INFO)
    };
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(COLOR_YELLOW)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(border_style)
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(COLOR_YELLOW)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn label_style() -> Style {
    Style::default().fg(COLOR_CYAN)
}

pub(crate) fn value_style() -> Style {
    Style::default().fg(Color::White)
}

pub(crate) fn muted_style() -> Style {
    Style::default().fg(COLOR_INFO)
}

pub(crate) fn selected_style() -> Style {
    Style::default()
        .bg(COLOR_TEAL)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn tone_style(tone: StatusTone) -> Style {
    match tone {
        StatusTone::Ok => Style::default().fg(COLOR_GREEN),
        StatusTone::Maintenance => Style::default().fg(COLOR_AMBER),
        StatusTone::Failure => Style::default().fg(COLOR_RED),
        StatusTone::Unknown => Style::default().fg(COLOR_INFO),
    }
}

/// Connection chip for the header line.
#[must_use]
pub fn link_chip(connected: bool) -> (String, Style) {
    let (text, bg) = if connected {
        ("[ONLINE]", COLOR_TEAL)
    } else {
        ("[OFFLINE]", COLOR_RED)
    };
    (
        text.to_string(),
        Style::default()
            .bg(bg)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )
}

/// Clips to `width` characters and left-pads the remainder.
pub(crate) fn cell(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{clipped:<width$}")
}

/// Sidebar navigation, active entry highlighted.
pub fn render_sidebar(area: Rect, frame: &mut ratatui::Frame<'_>, active: Route) {
    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled("Control Center", header_style())));
    lines.push(Line::default());
    for tab in Route::TABS {
        let style = if tab == active {
            selected_style()
        } else {
            value_style()
        };
        lines.push(Line::from(Span::styled(format!(" {} ", tab.title()), style)));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(COLOR_INFO));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Placeholder screen for unknown navigation tokens.
pub fn render_not_found(area: Rect, frame: &mut ratatui::Frame<'_>) {
    let block = screen_block(Route::NotFound.token(), true);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            Route::NotFound.title(),
            muted_style(),
        )))
        .block(block),
        area,
    );
}
