//! Lexer (tokenizer) for Lua source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Whitespace and comments are skipped; comments are kept on the side as
//! [`Comment`] trivia so the parser can attach them to statements.
//!
//! Lexing never fails. Characters that start no token become
//! [`TokenType::Unknown`], and unterminated strings or block comments run to the
//! end of the input. The parser rejects what it cannot use.

use super::ast::{Comment, CommentKind, Position, Span};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Identifier,
    Number,
    String,

    // Keywords
    And,
    Break,
    Do,
    Else,
    ElseIf,
    End,
    False,
    For,
    Function,
    Goto,
    If,
    In,
    Local,
    Nil,
    Not,
    Or,
    Repeat,
    Return,
    Then,
    True,
    Until,
    While,
    Continue,

    // Arithmetic and bitwise
    Plus,        // +
    Minus,       // -
    Star,        // *
    Slash,       // /
    DoubleSlash, // //
    Percent,     // %
    Caret,       // ^
    Hash,        // #
    Amp,         // &
    Pipe,        // |
    Tilde,       // ~
    LtLt,        // <<
    GtGt,        // >>

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Colon,     // :
    Comma,     // ,
    Dot,       // .
    DotDot,    // ..
    Ellipsis,  // ...

    // Comparison and assignment
    Assign,    // =
    EqEq,      // ==
    NotEq,     // ~=
    Lt,        // <
    Le,        // <=
    Gt,        // >
    Ge,        // >=
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=

    Unknown,
    Eof,
}

impl TokenType {
    pub fn is_keyword(self) -> bool {
        keywords().values().any(|&k| k == self)
    }
}

/// The keyword token spelled `word`, if any.
pub fn keyword(word: &str) -> Option<TokenType> {
    keywords().get(word).copied()
}

fn keywords() -> &'static FxHashMap<&'static str, TokenType> {
    static KEYWORDS: OnceLock<FxHashMap<&'static str, TokenType>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        [
            ("and", TokenType::And),
            ("break", TokenType::Break),
            ("do", TokenType::Do),
            ("else", TokenType::Else),
            ("elseif", TokenType::ElseIf),
            ("end", TokenType::End),
            ("false", TokenType::False),
            ("for", TokenType::For),
            ("function", TokenType::Function),
            ("goto", TokenType::Goto),
            ("if", TokenType::If),
            ("in", TokenType::In),
            ("local", TokenType::Local),
            ("nil", TokenType::Nil),
            ("not", TokenType::Not),
            ("or", TokenType::Or),
            ("repeat", TokenType::Repeat),
            ("return", TokenType::Return),
            ("then", TokenType::Then),
            ("true", TokenType::True),
            ("until", TokenType::Until),
            ("while", TokenType::While),
            ("continue", TokenType::Continue),
        ]
        .into_iter()
        .collect()
    })
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenType::Identifier => "identifier",
            TokenType::Number => "number",
            TokenType::String => "string",
            TokenType::And => "'and'",
            TokenType::Break => "'break'",
            TokenType::Do => "'do'",
            TokenType::Else => "'else'",
            TokenType::ElseIf => "'elseif'",
            TokenType::End => "'end'",
            TokenType::False => "'false'",
            TokenType::For => "'for'",
            TokenType::Function => "'function'",
            TokenType::Goto => "'goto'",
            TokenType::If => "'if'",
            TokenType::In => "'in'",
            TokenType::Local => "'local'",
            TokenType::Nil => "'nil'",
            TokenType::Not => "'not'",
            TokenType::Or => "'or'",
            TokenType::Repeat => "'repeat'",
            TokenType::Return => "'return'",
            TokenType::Then => "'then'",
            TokenType::True => "'true'",
            TokenType::Until => "'until'",
            TokenType::While => "'while'",
            TokenType::Continue => "'continue'",
            TokenType::Plus => "'+'",
            TokenType::Minus => "'-'",
            TokenType::Star => "'*'",
            TokenType::Slash => "'/'",
            TokenType::DoubleSlash => "'//'",
            TokenType::Percent => "'%'",
            TokenType::Caret => "'^'",
            TokenType::Hash => "'#'",
            TokenType::Amp => "'&'",
            TokenType::Pipe => "'|'",
            TokenType::Tilde => "'~'",
            TokenType::LtLt => "'<<'",
            TokenType::GtGt => "'>>'",
            TokenType::LParen => "'('",
            TokenType::RParen => "')'",
            TokenType::LBrace => "'{'",
            TokenType::RBrace => "'}'",
            TokenType::LBracket => "'['",
            TokenType::RBracket => "']'",
            TokenType::Semicolon => "';'",
            TokenType::Colon => "':'",
            TokenType::Comma => "','",
            TokenType::Dot => "'.'",
            TokenType::DotDot => "'..'",
            TokenType::Ellipsis => "'...'",
            TokenType::Assign => "'='",
            TokenType::EqEq => "'=='",
            TokenType::NotEq => "'~='",
            TokenType::Lt => "'<'",
            TokenType::Le => "'<='",
            TokenType::Gt => "'>'",
            TokenType::Ge => "'>='",
            TokenType::PlusEq => "'+='",
            TokenType::MinusEq => "'-='",
            TokenType::StarEq => "'*='",
            TokenType::SlashEq => "'/='",
            TokenType::PercentEq => "'%='",
            TokenType::Unknown => "unknown character",
            TokenType::Eof => "end of file",
        };
        f.write_str(text)
    }
}

/// A lexical atom: classification, raw source text and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn line(&self) -> usize {
        self.span.start.line
    }

    /// Contents of a string token without its quotes. Escapes are left as written.
    pub fn string_contents(&self) -> &str {
        let mut chars = self.lexeme.char_indices();
        let quote = match chars.next() {
            Some((_, q @ ('"' | '\''))) => q,
            _ => return &self.lexeme,
        };
        let mut escaped = false;
        for (i, ch) in chars {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                return &self.lexeme[1..i];
            }
        }
        // unterminated: everything after the opening quote
        &self.lexeme[1..]
    }

    pub fn quote(&self) -> Option<char> {
        match self.lexeme.chars().next() {
            Some(q @ ('"' | '\'')) if self.kind == TokenType::String => Some(q),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenType::Identifier | TokenType::Number | TokenType::String | TokenType::Unknown => {
                write!(f, "{} '{}'", self.kind, self.lexeme)
            }
            kind => write!(f, "{}", kind),
        }
    }
}

/// Lexer for Lua source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    /// Byte offset of `input[position]`.
    offset: usize,
    line: usize,
    column: usize,
    comments: Vec<Comment>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
            comments: Vec::new(),
        }
    }

    /// Tokenize the entire input. The result always ends with one EOF token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                let here = self.current_location();
                tokens.push(Token {
                    kind: TokenType::Eof,
                    lexeme: String::new(),
                    span: Span::new(self.offset, self.offset, here, here),
                });
                break;
            }

            tokens.push(self.next_token());
        }

        log::trace!(
            "lexed {} tokens and {} comments over {} lines",
            tokens.len(),
            self.comments.len(),
            self.line
        );
        tokens
    }

    /// Tokenize and hand back the comments skipped along the way.
    pub fn tokenize_with_comments(mut self) -> (Vec<Token>, Vec<Comment>) {
        let tokens = self.tokenize();
        (tokens, self.comments)
    }

    /// Scan one token starting at the current character.
    fn next_token(&mut self) -> Token {
        let start_offset = self.offset;
        let start = self.current_location();
        let start_position = self.position;

        let kind = match self.advance() {
            Some(ch) => self.classify(ch),
            None => TokenType::Eof,
        };

        let lexeme: String = self.input[start_position..self.position].iter().collect();
        let kind = if kind == TokenType::Identifier {
            keyword(&lexeme).unwrap_or(kind)
        } else {
            kind
        };

        Token {
            kind,
            lexeme,
            span: Span::new(start_offset, self.offset, start, self.current_location()),
        }
    }

    /// Consume the rest of the token that begins with `ch`.
    fn classify(&mut self, ch: char) -> TokenType {
        match ch {
            '"' | '\'' => self.string_literal(ch),

            '0'..='9' => self.number_literal(),

            c if c.is_alphabetic() || c == '_' => {
                while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                    self.advance();
                }
                TokenType::Identifier
            }

            '+' => self.with_assign(TokenType::Plus, TokenType::PlusEq),
            '-' => self.with_assign(TokenType::Minus, TokenType::MinusEq),
            '*' => self.with_assign(TokenType::Star, TokenType::StarEq),
            '%' => self.with_assign(TokenType::Percent, TokenType::PercentEq),
            '/' => {
                if self.eat('/') {
                    TokenType::DoubleSlash
                } else {
                    self.with_assign(TokenType::Slash, TokenType::SlashEq)
                }
            }
            '=' => self.with_assign(TokenType::Assign, TokenType::EqEq),
            '~' => self.with_assign(TokenType::Tilde, TokenType::NotEq),
            '<' => {
                if self.eat('<') {
                    TokenType::LtLt
                } else {
                    self.with_assign(TokenType::Lt, TokenType::Le)
                }
            }
            '>' => {
                if self.eat('>') {
                    TokenType::GtGt
                } else {
                    self.with_assign(TokenType::Gt, TokenType::Ge)
                }
            }
            '.' => {
                if self.eat('.') {
                    if self.eat('.') {
                        TokenType::Ellipsis
                    } else {
                        TokenType::DotDot
                    }
                } else {
                    TokenType::Dot
                }
            }
            '^' => TokenType::Caret,
            '#' => TokenType::Hash,
            '&' => TokenType::Amp,
            '|' => TokenType::Pipe,
            '(' => TokenType::LParen,
            ')' => TokenType::RParen,
            '{' => TokenType::LBrace,
            '}' => TokenType::RBrace,
            '[' => TokenType::LBracket,
            ']' => TokenType::RBracket,
            ';' => TokenType::Semicolon,
            ':' => TokenType::Colon,
            ',' => TokenType::Comma,

            _ => TokenType::Unknown,
        }
    }

    /// `plain`, or `with_eq` when an `=` follows.
    fn with_assign(&mut self, plain: TokenType, with_eq: TokenType) -> TokenType {
        if self.eat('=') {
            with_eq
        } else {
            plain
        }
    }

    /// Rest of a quoted string. Runs to end of input when unterminated.
    fn string_literal(&mut self, quote: char) -> TokenType {
        while let Some(ch) = self.advance() {
            if ch == '\\' {
                self.advance();
            } else if ch == quote {
                break;
            }
        }
        TokenType::String
    }

    /// Rest of a number: digits with at most one `.` that is followed by a digit.
    fn number_literal(&mut self) -> TokenType {
        self.skip_digits();
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }
        TokenType::Number
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('-') if self.peek_ahead(1) == Some('-') => {
                    if self.peek_ahead(2) == Some('[') && self.peek_ahead(3) == Some('[') {
                        self.block_comment();
                    } else {
                        self.line_comment();
                    }
                }
                _ => break,
            }
        }
    }

    /// `-- ...` up to, not including, the newline.
    fn line_comment(&mut self) {
        let start_offset = self.offset;
        let start = self.current_location();
        self.advance();
        self.advance();

        let text_start = self.position;
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
        let text = self.input[text_start..self.position].iter().collect();
        self.push_comment(CommentKind::Line, text, start_offset, start);
    }

    /// `--[[ ... ]]`, non-nesting; the first `]]` closes it.
    fn block_comment(&mut self) {
        let start_offset = self.offset;
        let start = self.current_location();
        for _ in 0..4 {
            self.advance();
        }

        let text_start = self.position;
        let mut text_end = None;
        while !self.is_at_end() {
            if self.peek() == Some(']') && self.peek_ahead(1) == Some(']') {
                text_end = Some(self.position);
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
        let text_end = text_end.unwrap_or(self.position);
        let text = self.input[text_start..text_end].iter().collect();
        self.push_comment(CommentKind::Block, text, start_offset, start);
    }

    fn push_comment(
        &mut self,
        kind: CommentKind,
        text: String,
        start_offset: usize,
        start: Position,
    ) {
        self.comments.push(Comment {
            kind,
            text,
            span: Span::new(start_offset, self.offset, start, self.current_location()),
        });
    }

    /// Consume the current character if it is `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;
        self.offset += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Tokenize `source` in one call.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("local x = 10");

        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].kind, TokenType::Local);
        assert_eq!(tokens[1].kind, TokenType::Identifier);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[2].kind, TokenType::Assign);
        assert_eq!(tokens[3].kind, TokenType::Number);
        assert_eq!(tokens[3].lexeme, "10");
        assert_eq!(tokens[4].kind, TokenType::Eof);
    }

    #[test]
    fn test_operators_longest_match() {
        use TokenType::*;
        assert_eq!(
            kinds("== ~= <= >= // .. ... << >> += -= *= /= %="),
            vec![
                EqEq, NotEq, Le, Ge, DoubleSlash, DotDot, Ellipsis, LtLt, GtGt, PlusEq, MinusEq,
                StarEq, SlashEq, PercentEq, Eof
            ]
        );
        assert_eq!(
            kinds("= ~ < > / . + - * % ^ # & |"),
            vec![
                Assign, Tilde, Lt, Gt, Slash, Dot, Plus, Minus, Star, Percent, Caret, Hash, Amp,
                Pipe, Eof
            ]
        );
        assert_eq!(kinds("a....b"), vec![Identifier, Ellipsis, Dot, Identifier, Eof]);
    }

    #[test]
    fn test_number_keeps_trailing_dot_separate() {
        let tokens = tokenize("3.14 t.5 1..2");
        assert_eq!(tokens[0].lexeme, "3.14");
        assert_eq!(tokens[2].kind, TokenType::Dot);
        assert_eq!(tokens[3].lexeme, "5");
        assert_eq!(tokens[4].lexeme, "1");
        assert_eq!(tokens[5].kind, TokenType::DotDot);
        assert_eq!(tokens[6].lexeme, "2");
    }

    #[test]
    fn test_comments_are_skipped_and_recorded() {
        let (tokens, comments) =
            Lexer::new("x -- line\n--[[ block\ncomment ]] y --[[a]]--b").tokenize_with_comments();

        let idents: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenType::Identifier)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(idents, vec!["x", "y"]);
        assert_eq!(comments.len(), 4);
        assert_eq!(comments[0].kind, CommentKind::Line);
        assert_eq!(comments[0].text, " line");
        assert_eq!(comments[1].kind, CommentKind::Block);
        assert_eq!(comments[1].text, " block\ncomment ");
        assert_eq!(comments[2].text, "a");
        assert_eq!(comments[3].text, "b");
    }

    #[test]
    fn test_block_comments_do_not_nest() {
        let (tokens, comments) = Lexer::new("--[[ a --[[ b ]] x c ]]").tokenize_with_comments();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Block);
        assert_eq!(comments[0].text, " a --[[ b ");

        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["x", "c", "]", "]", ""]);
        assert_eq!(tokens[2].kind, TokenType::RBracket);
        assert_eq!(tokens[3].kind, TokenType::RBracket);
        assert_eq!(tokens[4].kind, TokenType::Eof);
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end() {
        let (tokens, comments) = Lexer::new("x --[[ never closed\ny").tokenize_with_comments();
        assert_eq!(tokens.len(), 2);
        assert_eq!(comments[0].text, " never closed\ny");
    }

    #[test]
    fn test_string_literal() {
        let tokens = tokenize(r#"'it\'s' "say \"hi\"""#);

        assert_eq!(tokens[0].kind, TokenType::String);
        assert_eq!(tokens[0].lexeme, r"'it\'s'");
        assert_eq!(tokens[0].string_contents(), r"it\'s");
        assert_eq!(tokens[0].quote(), Some('\''));
        assert_eq!(tokens[1].string_contents(), r#"say \"hi\""#);
        assert_eq!(tokens[2].kind, TokenType::Eof);
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = tokenize("x = \"abc\ny");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].kind, TokenType::String);
        assert_eq!(tokens[2].string_contents(), "abc\ny");
    }

    #[test]
    fn test_unknown_characters() {
        assert_eq!(
            kinds("a $ b ! @"),
            vec![
                TokenType::Identifier,
                TokenType::Unknown,
                TokenType::Identifier,
                TokenType::Unknown,
                TokenType::Unknown,
                TokenType::Eof
            ]
        );
    }

    #[test]
    fn test_spans_track_lines_and_offsets() {
        let tokens = tokenize("a\n  bb = 'é'");

        assert_eq!(tokens[0].span.start, Position::new(1, 1));
        assert_eq!(tokens[1].span.start, Position::new(2, 3));
        assert_eq!(tokens[1].span.end, Position::new(2, 5));
        assert_eq!(tokens[1].span.start_offset, 4);
        assert_eq!(tokens[1].span.end_offset, 6);
        // 'é' is two bytes but one column
        assert_eq!(tokens[3].span.len(), 4);
        assert_eq!(tokens[3].span.end.column, 11);
        assert_eq!(tokens[4].span.start_offset, 13);
    }

    #[test]
    fn test_keywords() {
        use TokenType::*;
        assert_eq!(
            kinds("and or not continue goto elseif endx"),
            vec![And, Or, Not, Continue, Goto, ElseIf, Identifier, Eof]
        );
        assert!(TokenType::Until.is_keyword());
        assert!(!TokenType::Identifier.is_keyword());
    }
}
