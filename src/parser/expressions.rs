//! Expression parsing implementation
//!
//! This module handles parsing of Lua expressions using one method per
//! precedence level, lowest first:
//!
//! ```text
//! or < and < comparison < | < ~ < & < shift < .. < + - < * / // % < unary < ^
//! ```
//!
//! # Notes
//!
//! - Comparison operators do not chain: `a < b < c` is rejected.
//! - `..` is right-associative through self-recursion on the right operand.
//! - `^` takes a prefix expression on the left and a *unary* expression on the
//!   right, so `2 ^ -3` parses and `-2 ^ 2` is `-(2 ^ 2)`.
//! - A `(` or `[` on a later line than the previous token does not continue a
//!   suffix chain; it starts the next statement.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenType;
use crate::parser::parse::{ParseResult, Parser};

impl Parser {
    /// `expr {',' expr}`
    pub(crate) fn parse_expression_list(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut list = vec![self.parse_expression()?];
        while self.match_token(TokenType::Comma) {
            list.push(self.parse_expression()?);
        }
        Ok(list)
    }

    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> ParseResult<NodeId> {
        self.parse_or()
    }

    fn binary(&mut self, op: BinOp, left: NodeId, right: NodeId) -> NodeId {
        let span = self.ast.span(left).to(self.ast.span(right));
        self.alloc(NodeKind::Binary(Binary { op, left, right }), span)
    }

    /// Left-associative level: `next {op next}`.
    fn parse_left_assoc(
        &mut self,
        ops: &[(TokenType, BinOp)],
        next: fn(&mut Parser) -> ParseResult<NodeId>,
    ) -> ParseResult<NodeId> {
        let mut left = next(self)?;
        'outer: loop {
            for &(kind, op) in ops {
                if self.match_token(kind) {
                    let right = next(self)?;
                    left = self.binary(op, left, right);
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn parse_or(&mut self) -> ParseResult<NodeId> {
        self.parse_left_assoc(&[(TokenType::Or, BinOp::Or)], Parser::parse_and)
    }

    fn parse_and(&mut self) -> ParseResult<NodeId> {
        self.parse_left_assoc(&[(TokenType::And, BinOp::And)], Parser::parse_comparison)
    }

    /// At most one comparison operator per level.
    fn parse_comparison(&mut self) -> ParseResult<NodeId> {
        let left = self.parse_bitwise_or()?;
        let op = match self.peek().kind {
            TokenType::EqEq => BinOp::Eq,
            TokenType::NotEq => BinOp::Ne,
            TokenType::Lt => BinOp::Lt,
            TokenType::Le => BinOp::Le,
            TokenType::Gt => BinOp::Gt,
            TokenType::Ge => BinOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_bitwise_or()?;
        Ok(self.binary(op, left, right))
    }

    fn parse_bitwise_or(&mut self) -> ParseResult<NodeId> {
        self.parse_left_assoc(&[(TokenType::Pipe, BinOp::BitOr)], Parser::parse_bitwise_xor)
    }

    fn parse_bitwise_xor(&mut self) -> ParseResult<NodeId> {
        self.parse_left_assoc(&[(TokenType::Tilde, BinOp::BitXor)], Parser::parse_bitwise_and)
    }

    fn parse_bitwise_and(&mut self) -> ParseResult<NodeId> {
        self.parse_left_assoc(&[(TokenType::Amp, BinOp::BitAnd)], Parser::parse_shift)
    }

    fn parse_shift(&mut self) -> ParseResult<NodeId> {
        self.parse_left_assoc(
            &[(TokenType::LtLt, BinOp::Shl), (TokenType::GtGt, BinOp::Shr)],
            Parser::parse_concat,
        )
    }

    /// `..` is right-associative.
    fn parse_concat(&mut self) -> ParseResult<NodeId> {
        let left = self.parse_additive()?;
        if self.match_token(TokenType::DotDot) {
            let right = self.parse_concat()?;
            return Ok(self.binary(BinOp::Concat, left, right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<NodeId> {
        self.parse_left_assoc(
            &[(TokenType::Plus, BinOp::Add), (TokenType::Minus, BinOp::Sub)],
            Parser::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> ParseResult<NodeId> {
        self.parse_left_assoc(
            &[
                (TokenType::Star, BinOp::Mul),
                (TokenType::Slash, BinOp::Div),
                (TokenType::DoubleSlash, BinOp::FloorDiv),
                (TokenType::Percent, BinOp::Mod),
            ],
            Parser::parse_unary,
        )
    }

    /// `not`, `-` and `#`, right-associative.
    fn parse_unary(&mut self) -> ParseResult<NodeId> {
        let op = match self.peek().kind {
            TokenType::Not => UnOp::Not,
            TokenType::Minus => UnOp::Neg,
            TokenType::Hash => UnOp::Len,
            _ => return self.parse_power(),
        };
        let start = self.advance().span;
        let operand = self.parse_unary()?;
        let span = start.to(self.ast.span(operand));
        Ok(self.alloc(NodeKind::Unary(Unary { op, operand }), span))
    }

    /// `prefixexp ['^' unary]`
    fn parse_power(&mut self) -> ParseResult<NodeId> {
        let left = self.parse_prefix_expression()?;
        if self.match_token(TokenType::Caret) {
            let right = self.parse_unary()?;
            return Ok(self.binary(BinOp::Pow, left, right));
        }
        Ok(left)
    }

    /// Primary expression followed by call, index, field and method suffixes.
    pub(crate) fn parse_prefix_expression(&mut self) -> ParseResult<NodeId> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.is_lookahead_on_new_line()
                && (self.check(TokenType::LParen) || self.check(TokenType::LBracket))
            {
                break;
            }

            let start = self.ast.span(expr);
            match self.peek().kind {
                TokenType::LParen => {
                    self.advance();
                    let args = self.parse_call_arguments("expected ')' after argument list")?;
                    expr = self.alloc(
                        NodeKind::FunctionCall(FunctionCall {
                            callee: expr,
                            args: args.into(),
                        }),
                        self.span_from(start),
                    );
                }
                TokenType::LBracket => {
                    self.advance();
                    let key = self.parse_expression()?;
                    self.consume(TokenType::RBracket, "expected ']' after table key")?;
                    expr = self.alloc(
                        NodeKind::TableAccess(TableAccess {
                            table: expr,
                            key,
                            style: AccessStyle::Bracket,
                        }),
                        self.span_from(start),
                    );
                }
                TokenType::Dot => {
                    self.advance();
                    let key = self.parse_name("expected identifier after '.'")?;
                    expr = self.alloc(
                        NodeKind::TableAccess(TableAccess {
                            table: expr,
                            key,
                            style: AccessStyle::Dot,
                        }),
                        self.span_from(start),
                    );
                }
                TokenType::Colon => {
                    self.advance();
                    let method = self.parse_name("expected method name after ':'")?;
                    self.consume(TokenType::LParen, "expected '(' after method name")?;
                    let args = self.parse_call_arguments("expected ')' after method arguments")?;
                    expr = self.alloc(
                        NodeKind::MethodCall(MethodCall {
                            receiver: expr,
                            method,
                            args: args.into(),
                        }),
                        self.span_from(start),
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Arguments after an already consumed `(`, through the closing `)`.
    fn parse_call_arguments(&mut self, message: &str) -> ParseResult<Vec<NodeId>> {
        let args = if self.check(TokenType::RParen) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.consume(TokenType::RParen, message)?;
        Ok(args)
    }

    /// An identifier token as an Identifier node.
    pub(crate) fn parse_name(&mut self, message: &str) -> ParseResult<NodeId> {
        let token = self.consume(TokenType::Identifier, message)?;
        Ok(self.alloc(
            NodeKind::Identifier(Identifier { name: token.lexeme }),
            token.span,
        ))
    }

    fn parse_primary(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        let literal = match token.kind {
            TokenType::Number => Some(Literal {
                value: token.lexeme.clone(),
                kind: LiteralKind::Number,
            }),
            TokenType::String => Some(Literal {
                value: token.string_contents().to_string(),
                kind: LiteralKind::String {
                    quote: token.quote().unwrap_or('"'),
                },
            }),
            TokenType::True | TokenType::False => Some(Literal {
                value: token.lexeme.clone(),
                kind: LiteralKind::Boolean,
            }),
            TokenType::Nil => Some(Literal {
                value: "nil".to_string(),
                kind: LiteralKind::Nil,
            }),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(self.alloc(NodeKind::Literal(literal), token.span));
        }

        match token.kind {
            TokenType::Identifier => self.parse_name("expected identifier"),
            TokenType::Ellipsis => {
                self.advance();
                Ok(self.alloc(NodeKind::VarArg, token.span))
            }
            TokenType::LBrace => {
                self.advance();
                self.parse_table_constructor(token.span)
            }
            TokenType::Function => {
                self.advance();
                let (params, body) = self.parse_function_body()?;
                Ok(self.alloc(
                    NodeKind::AnonymousFunction(AnonymousFunction { params, body }),
                    self.span_from(token.span),
                ))
            }
            TokenType::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenType::RParen, "expected ')'")?;
                Ok(self.alloc(NodeKind::Paren(Paren { inner }), self.span_from(token.span)))
            }
            _ => Err(self.error("unexpected token in expression")),
        }
    }

    /// Fields after an already consumed `{`, through the closing `}`.
    fn parse_table_constructor(&mut self, open: Span) -> ParseResult<NodeId> {
        let mut fields = Vec::new();

        while !self.check(TokenType::RBrace) && !self.is_at_end() {
            fields.push(self.parse_table_field()?);
            if self
                .match_any(&[TokenType::Comma, TokenType::Semicolon])
                .is_none()
            {
                break;
            }
        }

        self.consume(TokenType::RBrace, "expected '}' after table constructor")?;
        Ok(self.alloc(
            NodeKind::TableConstructor(TableConstructor {
                fields: fields.into(),
            }),
            self.span_from(open),
        ))
    }

    /// `[expr] = expr`, `name = expr` or `expr`.
    fn parse_table_field(&mut self) -> ParseResult<NodeId> {
        let start = self.peek().span;

        let (key, style) = if self.match_token(TokenType::LBracket) {
            let key = self.parse_expression()?;
            self.consume(TokenType::RBracket, "expected ']' after table key")?;
            self.consume(TokenType::Assign, "expected '=' after table key")?;
            (Some(key), FieldStyle::Bracketed)
        } else if self.check(TokenType::Identifier) && self.check_next(TokenType::Assign) {
            let key = self.parse_name("expected identifier")?;
            self.consume(TokenType::Assign, "expected '=' after field name")?;
            (Some(key), FieldStyle::Named)
        } else {
            (None, FieldStyle::Positional)
        };

        let value = self.parse_expression()?;
        Ok(self.alloc(
            NodeKind::TableField(TableField { key, value, style }),
            self.span_from(start),
        ))
    }

    /// `'(' [params] ')' block 'end'`, shared by every function form.
    ///
    /// Parameters are identifiers, optionally followed by a final `...`.
    pub(crate) fn parse_function_body(&mut self) -> ParseResult<(NodeList, NodeId)> {
        self.consume(TokenType::LParen, "expected '(' to start parameter list")?;

        let mut params = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                if self.check(TokenType::Ellipsis) {
                    let span = self.advance().span;
                    params.push(self.alloc(NodeKind::VarArg, span));
                    break;
                }
                params.push(self.parse_name("expected parameter name")?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::RParen, "expected ')' after parameters")?;

        let body = self.parse_block()?;
        self.consume(TokenType::End, "expected 'end' to close function")?;
        Ok((params.into(), body))
    }
}
