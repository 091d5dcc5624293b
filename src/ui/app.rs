//! Main TUI application state and logic

use crate::parser::ast::{Ast, NodeId};
use crate::visit::printer::{outline_rows, OutlineRow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use super::panes::{SourceScrollState, StatusRenderData, TreeScrollState};

/// Rows moved by PgUp/PgDn
const PAGE: usize = 10;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Tree,
    Source,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Tree => FocusedPane::Source,
            FocusedPane::Source => FocusedPane::Tree,
        }
    }
}

/// The main application state
pub struct App {
    /// The parsed tree being explored
    pub ast: Ast,

    /// The source code the tree was parsed from
    pub source_code: String,

    /// Outline of the tree, one row per node
    pub rows: Vec<OutlineRow>,

    /// Index into `rows`
    pub selected: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    pub source_scroll: SourceScrollState,
    pub tree_scroll: TreeScrollState,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app exploring `ast`, parsed from `source_code`
    pub fn new(ast: Ast, source_code: String) -> Self {
        let rows = match ast.try_root() {
            Some(root) => outline_rows(&ast, root),
            None => Vec::new(),
        };
        App {
            ast,
            source_code,
            rows,
            selected: 0,
            focused_pane: FocusedPane::Tree,
            source_scroll: SourceScrollState::default(),
            tree_scroll: TreeScrollState::default(),
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// The node under the cursor
    pub fn selected_node(&self) -> Option<NodeId> {
        self.rows.get(self.selected).map(|row| row.node)
    }

    fn status_data(&self) -> Option<StatusRenderData> {
        let id = self.selected_node()?;
        let span = self.ast.span(id);
        Some(StatusRenderData {
            node: format!("{} {}", id, self.ast.kind(id).name()),
            span: if span.is_synthetic() {
                "synthetic".to_string()
            } else {
                format!("{}-{}", span.start, span.end)
            },
            parent: match self.ast.parent(id) {
                Some(parent) => format!("parent {}", parent),
                None => "root".to_string(),
            },
        })
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        // Source (left) | Tree (right)
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        let selected_span = self.selected_node().map(|id| self.ast.span(id));

        super::panes::render_source_pane(
            frame,
            columns[0],
            &self.source_code,
            selected_span,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_tree_pane(
            frame,
            columns[1],
            &self.rows,
            self.selected,
            self.focused_pane == FocusedPane::Tree,
            &mut self.tree_scroll,
        );

        let status = self.status_data();
        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            status.as_ref(),
        );
    }

    fn select(&mut self, index: usize) {
        let last = self.rows.len().saturating_sub(1);
        self.selected = index.min(last);
        self.source_scroll.manual = false;
    }

    fn move_up(&mut self, by: usize) {
        match self.focused_pane {
            FocusedPane::Tree => self.select(self.selected.saturating_sub(by)),
            FocusedPane::Source => {
                self.source_scroll.manual = true;
                self.source_scroll.offset = self.source_scroll.offset.saturating_sub(by);
            }
        }
    }

    fn move_down(&mut self, by: usize) {
        match self.focused_pane {
            FocusedPane::Tree => self.select(self.selected.saturating_add(by)),
            FocusedPane::Source => {
                // clamped against the line count when rendering
                self.source_scroll.manual = true;
                self.source_scroll.offset = self.source_scroll.offset.saturating_add(by);
            }
        }
    }

    fn select_parent(&mut self) {
        let parent = self.selected_node().and_then(|id| self.ast.parent(id));
        match parent.and_then(|p| self.rows.iter().position(|row| row.node == p)) {
            Some(index) => {
                self.select(index);
                self.status_message = "Jumped to parent".to_string();
            }
            None => self.status_message = "Already at the root".to_string(),
        }
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Up => self.move_up(1),
            KeyCode::Down => self.move_down(1),
            KeyCode::PageUp => self.move_up(PAGE),
            KeyCode::PageDown => self.move_down(PAGE),
            KeyCode::Home => match self.focused_pane {
                FocusedPane::Tree => self.select(0),
                FocusedPane::Source => {
                    self.source_scroll.manual = true;
                    self.source_scroll.offset = 0;
                }
            },
            KeyCode::End => match self.focused_pane {
                FocusedPane::Tree => self.select(usize::MAX),
                FocusedPane::Source => {
                    self.source_scroll.manual = true;
                    self.source_scroll.offset = usize::MAX;
                }
            },
            KeyCode::Char('p') => self.select_parent(),
            _ => {}
        }
    }
}
