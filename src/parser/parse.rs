//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, token cursor helpers, comment attachment and the
//! chunk/block entry points.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, chunk and block parsing
//! - `statements`: statement dispatch (local, function, if, loops, assignments)
//! - `expressions`: precedence climbing and prefix/suffix chains
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state. Nodes are allocated straight
//! into the [`Ast`] arena the parser owns.
//!
//! Parsing is fail-fast: the first error is returned and nothing is recovered.

use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token, TokenType};
use thiserror::Error;

/// Parser error type
///
/// Both variants render as `[line N] <message> token: <token>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An expected token was missing or no production matched.
    #[error("[line {line}] {message} token: {token}")]
    Syntax {
        message: String,
        token: TokenType,
        line: usize,
        column: usize,
    },
    /// A statement follows `return`, `break` or `continue` in the same block.
    #[error("[line {line}] {message} token: {token}")]
    GrammarRule {
        message: String,
        token: TokenType,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. } | ParseError::GrammarRule { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            ParseError::Syntax { column, .. } | ParseError::GrammarRule { column, .. } => *column,
        }
    }

    /// The offending token's classification.
    pub fn token(&self) -> TokenType {
        match self {
            ParseError::Syntax { token, .. } | ParseError::GrammarRule { token, .. } => *token,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Syntax { message, .. } | ParseError::GrammarRule { message, .. } => message,
        }
    }

    pub fn is_grammar_rule(&self) -> bool {
        matches!(self, ParseError::GrammarRule { .. })
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive descent parser for Lua
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Comments not yet attached, in source order.
    comments: Vec<Comment>,
    pub(crate) ast: Ast,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let (tokens, comments) = Lexer::new(source).tokenize_with_comments();
        Self {
            tokens,
            position: 0,
            comments,
            ast: Ast::new(),
        }
    }

    /// Parser over an existing token stream. An EOF token is appended if missing.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenType::Eof) {
            let end = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token {
                kind: TokenType::Eof,
                lexeme: String::new(),
                span: Span::new(end.end_offset, end.end_offset, end.end, end.end),
            });
        }
        Self {
            tokens,
            position: 0,
            comments: Vec::new(),
            ast: Ast::new(),
        }
    }

    /// Parse the whole input as a Chunk and hand over the finished tree.
    pub fn parse_chunk(&mut self) -> ParseResult<Ast> {
        let first = self.peek().span;
        let block = self.parse_block()?;

        if !self.is_at_end() {
            return Err(self.error("expected end of file"));
        }

        let span = first.to(self.peek().span);
        let chunk = self.ast.alloc(NodeKind::Chunk(Chunk { block }), span);
        self.ast.set_root(chunk);

        log::debug!(
            "parsed chunk: {} top-level statements, {} nodes",
            self.ast.top_level_statements().len(),
            self.ast.len()
        );
        Ok(std::mem::take(&mut self.ast))
    }

    /// Parse statements until a block-ending token.
    ///
    /// An optional `;` may follow each statement. `return`, `break` and
    /// `continue` must be the last statement of their block.
    pub(crate) fn parse_block(&mut self) -> ParseResult<NodeId> {
        let start = self.peek().span;
        let mut statements = Vec::new();

        while !self.is_block_end() {
            let leading = self.take_leading_comments();
            let statement = self.parse_statement()?;
            self.match_token(TokenType::Semicolon);
            let trailing = self.take_trailing_comments();
            self.ast.attach_comments(statement, leading, trailing);
            statements.push(statement);

            let is_terminal = matches!(
                self.ast.kind(statement),
                NodeKind::Return(_) | NodeKind::Break | NodeKind::Continue
            );
            if is_terminal && !self.is_block_end() {
                return Err(self.grammar_error(
                    "no statement allowed after 'return', 'break' or 'continue' in the same block",
                ));
            }
        }

        let span = match (statements.first(), statements.last()) {
            (Some(&first), Some(&last)) => self.ast.span(first).to(self.ast.span(last)),
            _ => Span::new(start.start_offset, start.start_offset, start.start, start.start),
        };
        let leftover = self.take_leading_comments();
        Ok(self.ast.alloc_with_comments(
            NodeKind::Block(Block {
                statements: statements.into(),
            }),
            span,
            Vec::new(),
            leftover,
        ))
    }

    // ===== Comment attachment =====

    /// Pending comments that end before the current token.
    fn take_leading_comments(&mut self) -> Vec<Comment> {
        let before = self.peek().span.start_offset;
        let count = self
            .comments
            .iter()
            .take_while(|c| c.span.end_offset <= before)
            .count();
        self.comments.drain(..count).collect()
    }

    /// Pending comments after the previous token that start on its last line.
    fn take_trailing_comments(&mut self) -> Vec<Comment> {
        let last = self.previous().span;
        let before = self.peek().span.start_offset;
        let first = self
            .comments
            .iter()
            .position(|c| c.span.start_offset >= last.end_offset)
            .unwrap_or(self.comments.len());
        let count = self.comments[first..]
            .iter()
            .take_while(|c| c.span.start.line == last.end.line && c.span.end_offset <= before)
            .count();
        self.comments.drain(first..first + count).collect()
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, kind: TokenType) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is any of `kinds`, returning its type.
    pub(crate) fn match_any(&mut self, kinds: &[TokenType]) -> Option<TokenType> {
        let kind = self.peek().kind;
        if kinds.contains(&kind) {
            self.advance();
            Some(kind)
        } else {
            None
        }
    }

    pub(crate) fn check(&self, kind: TokenType) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn check_next(&self, kind: TokenType) -> bool {
        self.peek_next().kind == kind
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenType::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    pub(crate) fn peek_next(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + 1).min(last)]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    /// Expect `kind`, or fail with `message`.
    pub(crate) fn consume(&mut self, kind: TokenType, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.error(message))
        }
    }

    /// END, ELSE, ELSEIF, UNTIL or EOF.
    pub(crate) fn is_block_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenType::End
                | TokenType::Else
                | TokenType::ElseIf
                | TokenType::Until
                | TokenType::Eof
        )
    }

    /// A token that ends a `return` with no values.
    pub(crate) fn is_return_terminator(&self) -> bool {
        self.check(TokenType::Semicolon) || self.is_block_end()
    }

    /// Whether the current token starts on a later line than the previous one ends.
    pub(crate) fn is_lookahead_on_new_line(&self) -> bool {
        if self.is_at_end() || self.position == 0 {
            return false;
        }
        self.peek().span.start.line > self.previous().span.end.line
    }

    /// Span from `start` to the end of the previous token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.to(self.previous().span)
    }

    /// Syntax error at the current token.
    pub(crate) fn error(&self, message: &str) -> ParseError {
        let token = self.peek();
        ParseError::Syntax {
            message: message.to_string(),
            token: token.kind,
            line: token.span.start.line,
            column: token.span.start.column,
        }
    }

    pub(crate) fn grammar_error(&self, message: &str) -> ParseError {
        let token = self.peek();
        ParseError::GrammarRule {
            message: message.to_string(),
            token: token.kind,
            line: token.span.start.line,
            column: token.span.start.column,
        }
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.ast.alloc(kind, span)
    }
}

/// Parse `source` into a tree rooted at a Chunk.
pub fn parse(source: &str) -> ParseResult<Ast> {
    Parser::new(source).parse_chunk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    #[test]
    fn test_parse_empty_chunk() {
        let ast = parse("").unwrap();
        let root = ast.root();
        assert!(matches!(ast.kind(root), NodeKind::Chunk(_)));
        assert_eq!(ast.top_level_statements().len(), 0);
        assert_eq!(ast.len(), 2);
    }

    #[test]
    fn test_optional_semicolons() {
        let err = parse("a = 1; b = 2;; c = 3").unwrap_err();
        // a lone ';' is not a statement
        assert_eq!(err.token(), TokenType::Semicolon);

        let ast = parse("a = 1; b = 2 c = 3;").unwrap();
        assert_eq!(ast.top_level_statements().len(), 3);
    }

    #[test]
    fn test_return_must_be_last() {
        let err = parse("return 1\nprint(2)").unwrap_err();
        assert!(err.is_grammar_rule());
        assert_eq!(err.line(), 2);
        assert_eq!(err.token(), TokenType::Identifier);
        assert_eq!(
            err.to_string(),
            "[line 2] no statement allowed after 'return', 'break' or 'continue' in the same block token: identifier"
        );

        assert!(parse("return 1;").is_ok());
        assert!(parse("while true do break end").is_ok());
        assert!(parse("while true do break x = 1 end").unwrap_err().is_grammar_rule());
        assert!(parse("while true do continue; end").is_ok());
    }

    #[test]
    fn test_stray_block_end_at_top_level() {
        let err = parse("x = 1 end").unwrap_err();
        assert!(!err.is_grammar_rule());
        assert_eq!(err.token(), TokenType::End);
    }

    #[test]
    fn test_from_tokens_appends_eof() {
        let mut tokens = tokenize("x = 1");
        tokens.pop();
        let ast = Parser::from_tokens(tokens).parse_chunk().unwrap();
        assert_eq!(ast.top_level_statements().len(), 1);
    }

    #[test]
    fn test_comment_attachment() {
        let source = "-- header\nlocal x = 1 -- trailing\n\n--[[ before y ]]\ny = 2\n-- dangling\n";
        let ast = parse(source).unwrap();
        let statements = ast.top_level_statements();

        let first = &ast[statements[0]];
        assert_eq!(first.leading_comments.len(), 1);
        assert_eq!(first.leading_comments[0].text, " header");
        assert_eq!(first.trailing_comments.len(), 1);
        assert_eq!(first.trailing_comments[0].text, " trailing");

        let second = &ast[statements[1]];
        assert_eq!(second.leading_comments[0].kind, CommentKind::Block);
        assert!(second.trailing_comments.is_empty());

        let chunk_block = match ast.kind(ast.root()) {
            NodeKind::Chunk(chunk) => chunk.block,
            _ => panic!("Expected chunk"),
        };
        assert_eq!(ast[chunk_block].trailing_comments[0].text, " dangling");
    }

    #[test]
    fn test_comment_inside_expression_goes_to_next_statement() {
        let ast = parse("x = 1 + -- inner\n 2 -- after\ny = 3").unwrap();
        let statements = ast.top_level_statements();
        assert_eq!(ast[statements[0]].trailing_comments[0].text, " after");
        assert_eq!(ast[statements[1]].leading_comments[0].text, " inner");
    }

    #[test]
    fn test_chunk_span_covers_source() {
        let ast = parse("x = 1\ny = 2").unwrap();
        let span = ast.span(ast.root());
        assert_eq!(span.start_offset, 0);
        assert_eq!(span.end_offset, 11);
    }
}
