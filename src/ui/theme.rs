//! Explorer color palette (Catppuccin Mocha tones)

use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    /// Brackets and the node badge in the status bar
    pub accent: Color,
    /// Line numbers inside the selected span
    pub span_line_number: Color,
    /// Comments, line numbers, tree guides
    pub comment: Color,
    pub success: Color,
    pub keyword: Color,
    /// `nil`, `true`, `false`
    pub constant: Color,
    pub string: Color,
    pub number: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    /// Background of source lines covered by the selected node
    pub span_bg: Color,
    /// Background of the selected tree row
    pub selected_bg: Color,
    pub call: Color,
    pub node_kind: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    accent: Color::Rgb(137, 180, 250),
    span_line_number: Color::Rgb(250, 179, 135),
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    keyword: Color::Rgb(203, 166, 247),  // Mauve
    constant: Color::Rgb(245, 194, 231), // Pink
    string: Color::Rgb(166, 227, 161),
    number: Color::Rgb(250, 179, 135),
    border_focused: Color::Rgb(249, 226, 175),
    border_normal: Color::Rgb(108, 112, 134),
    span_bg: Color::Rgb(50, 50, 70),
    selected_bg: Color::Rgb(69, 71, 90),
    call: Color::Rgb(249, 226, 175),
    node_kind: Color::Rgb(148, 226, 213),
};
