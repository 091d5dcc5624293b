//! Syntax tree pane rendering
//!
//! Lists the outline rows of the parsed tree, one node per line, with the
//! selected row highlighted and kept in view.

use crate::ui::theme::DEFAULT_THEME;
use crate::visit::printer::OutlineRow;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Scroll state for the tree pane
#[derive(Debug, Default)]
pub struct TreeScrollState {
    pub offset: usize,
}

impl TreeScrollState {
    /// Adjust the offset so that row `selected` is visible in `height` rows.
    pub fn follow(&mut self, selected: usize, height: usize) {
        let height = height.max(1);
        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset + height {
            self.offset = selected + 1 - height;
        }
    }
}

fn row_line(row: &OutlineRow, is_selected: bool) -> Line<'static> {
    let (kind, detail) = match row.label.split_once(' ') {
        Some((kind, detail)) => (kind.to_string(), format!(" {}", detail)),
        None => (row.label.clone(), String::new()),
    };

    let mut spans = vec![
        Span::styled(row.guide(), Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(kind, Style::default().fg(DEFAULT_THEME.node_kind)),
        Span::styled(detail, Style::default().fg(DEFAULT_THEME.fg)),
    ];

    if is_selected {
        let highlight = Style::default()
            .bg(DEFAULT_THEME.selected_bg)
            .add_modifier(Modifier::BOLD);
        for span in &mut spans {
            span.style = span.style.patch(highlight);
        }
    }
    Line::from(spans)
}

/// Render the syntax tree pane
pub fn render_tree_pane(
    frame: &mut Frame,
    area: Rect,
    rows: &[OutlineRow],
    selected: usize,
    is_focused: bool,
    scroll_state: &mut TreeScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Syntax Tree ({} nodes) ", rows.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let visible_height = area.height.saturating_sub(2) as usize;
    scroll_state.follow(selected, visible_height);

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, row)| row_line(row, idx == selected))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_keeps_selection_visible() {
        let mut scroll = TreeScrollState::default();
        scroll.follow(12, 5);
        assert_eq!(scroll.offset, 8);
        scroll.follow(10, 5);
        assert_eq!(scroll.offset, 8);
        scroll.follow(3, 5);
        assert_eq!(scroll.offset, 3);
    }
}
