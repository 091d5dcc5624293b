//! Status bar rendering with keybindings and the selected node's details

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the status bar shows about the selected node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRenderData {
    /// `#id Kind`
    pub node: String,
    /// `line:col-line:col`, or `synthetic`
    pub span: String,
    /// `parent #id`, or `root`
    pub parent: String,
}

/// Render the status bar at the bottom.
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    data: Option<&StatusRenderData>,
) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let bar = Style::default().bg(DEFAULT_THEME.span_bg);
    let sep_style = bar.fg(DEFAULT_THEME.comment);

    let mut left_spans = Vec::new();
    match data {
        Some(data) => {
            left_spans.push(Span::styled(
                format!(" {} ", data.node),
                Style::default()
                    .bg(DEFAULT_THEME.accent)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            ));
            left_spans.push(Span::styled(format!(" {} ", data.span), bar.fg(DEFAULT_THEME.fg)));
            left_spans.push(Span::styled("│", sep_style));
            left_spans.push(Span::styled(format!(" {} ", data.parent), bar.fg(DEFAULT_THEME.fg)));
            left_spans.push(Span::styled("│", sep_style));
        }
        None => left_spans.push(Span::styled(
            " EMPTY ",
            Style::default()
                .bg(DEFAULT_THEME.success)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )),
    }
    left_spans.push(Span::styled(format!(" {} ", message), bar.fg(DEFAULT_THEME.fg)));

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(bar)
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    // Right side: Keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar.fg(DEFAULT_THEME.fg);

    let right_spans = vec![
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" move ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" p ", key_style),
        Span::styled(" parent ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ⇥ ", key_style),
        Span::styled(" focus ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled("q", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(bar)
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(message: &str, data: Option<&StatusRenderData>) -> Vec<Span<'static>> {
        let mut terminal = Terminal::new(TestBackend::new(120, 1)).unwrap();
        terminal
            .draw(|f| render_status_bar(f, f.area(), message, data))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| Span::styled(cell.symbol().to_string(), cell.style()))
            .collect()
    }

    fn text(cells: &[Span]) -> String {
        cells.iter().map(|c| c.content.as_ref()).collect()
    }

    #[test]
    fn test_empty_tree_shows_badge_and_message() {
        let cells = draw("Ready!", None);
        let line = text(&cells);
        assert!(line.contains(" EMPTY "));
        assert!(line.contains("Ready!"));
        assert!(line.contains(" quit "));
    }

    #[test]
    fn test_selected_node_details_and_message_colour() {
        let data = StatusRenderData {
            node: "#4 Local".to_string(),
            span: "1:1-1:12".to_string(),
            parent: "parent #5".to_string(),
        };
        let cells = draw("Jumped to parent", Some(&data));
        let line = text(&cells);
        assert!(line.contains("#4 Local"));
        assert!(line.contains("1:1-1:12"));
        assert!(line.contains("parent #5"));

        let start = cells.iter().position(|c| c.content == "J").unwrap();
        assert_eq!(cells[start].style.fg, Some(DEFAULT_THEME.fg));
    }
}
