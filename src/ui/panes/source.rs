//! Source code pane rendering with syntax highlighting
//!
//! This module renders the Lua source being explored, with basic syntax
//! highlighting and the lines of the selected node's span highlighted.
//!
//! # Features
//!
//! - Syntax highlighting for Lua keywords, constants, strings, numbers and comments
//! - Selected-span highlighting with an arrow on the span's first line
//! - Scroll state that follows the selection unless the user scrolled manually
//! - Line numbering
//!
//! # Rendering
//!
//! The pane uses a simple character-by-character tokenizer per line rather
//! than the real lexer, so block comments and strings spanning lines are
//! only highlighted on their first line.

use crate::parser::ast::Span as SourceSpan;
use crate::parser::lexer::{keyword, TokenType};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Simple syntax highlighting for one line of Lua
fn highlight_source_code(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Comments run to the end of the line
        if c == '-' && chars.get(i + 1) == Some(&'-') {
            flush_word(&mut spans, &mut current_word, false);
            spans.push(Span::styled(
                chars[i..].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if c == '"' || c == '\'' {
            flush_word(&mut spans, &mut current_word, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            spans.push(Span::styled(
                chars[i..end].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        // Delimiters end the current word
        if !c.is_alphanumeric() && c != '_' && !(c == '.' && starts_with_digit(&current_word)) {
            flush_word(&mut spans, &mut current_word, c == '(');

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.accent),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, false);
    Line::from(spans)
}

fn starts_with_digit(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_digit())
}

fn flush_word(spans: &mut Vec<Span<'static>>, word: &mut String, is_call: bool) {
    if word.is_empty() {
        return;
    }
    let style = get_keyword_style(word, is_call);
    spans.push(Span::styled(std::mem::take(word), style));
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match keyword(word) {
        Some(TokenType::Nil | TokenType::True | TokenType::False) => {
            Style::default().fg(DEFAULT_THEME.constant)
        }
        Some(_) => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        None if starts_with_digit(word) => Style::default().fg(DEFAULT_THEME.number),
        None if word == "self" => Style::default().fg(DEFAULT_THEME.node_kind),
        None if is_function => Style::default().fg(DEFAULT_THEME.call),
        None => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Set when the user scrolls by hand; cleared when the selection moves.
    pub manual: bool,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    selected: Option<SourceSpan>,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders
    let max_scroll = total_lines.saturating_sub(visible_height);

    // Keep the selected span's first line in view, a third of the way down
    let selected = selected.filter(|span| !span.is_synthetic());
    if let (Some(span), false) = (selected, scroll_state.manual) {
        let first = span.start.line.saturating_sub(1);
        let visible = scroll_state.offset..scroll_state.offset + visible_height;
        if !visible.contains(&first) {
            scroll_state.offset = first.saturating_sub(visible_height / 3);
        }
    }
    scroll_state.offset = scroll_state.offset.min(max_scroll);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let in_span = selected.is_some_and(|span| span.covers_line(line_num));
            let is_first = selected.is_some_and(|span| span.start.line == line_num);

            let marker = if is_first { "▶" } else { " " };
            let num_style = if in_span {
                Style::default()
                    .fg(DEFAULT_THEME.span_line_number)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment) // Line numbers
            };

            let mut content_line = highlight_source_code(line);
            if in_span {
                let background = Style::default().bg(DEFAULT_THEME.span_bg);
                for span in &mut content_line.spans {
                    span.style = span.style.patch(background);
                }
            }

            let mut final_spans =
                vec![Span::styled(format!("{:4}{} ", line_num, marker), num_style)];
            final_spans.extend(content_line.spans);
            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_splits_words_strings_and_comments() {
        let line = highlight_source_code("local s = 'a b' -- note");
        let parts = texts(&line);
        assert_eq!(parts[0], "local");
        assert!(parts.contains(&"'a b'".to_string()));
        assert_eq!(parts.last().unwrap(), "-- note");
    }

    #[test]
    fn test_highlight_styles() {
        let line = highlight_source_code("print(1.5, nil)");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.call));
        let number = line.spans.iter().find(|s| s.content == "1.5").unwrap();
        assert_eq!(number.style.fg, Some(DEFAULT_THEME.number));
        let nil = line.spans.iter().find(|s| s.content == "nil").unwrap();
        assert_eq!(nil.style.fg, Some(DEFAULT_THEME.constant));
    }

    #[test]
    fn test_highlight_multibyte_comment() {
        let line = highlight_source_code("x = 1 -- é");
        assert_eq!(texts(&line).last().unwrap(), "-- é");
    }
}
