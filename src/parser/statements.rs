//! Statement parsing implementation
//!
//! This module handles parsing of all Lua statement types.
//!
//! # Supported Statements
//!
//! - `local` declarations and `local function`
//! - `function` declarations with dotted (`a.b.c`) and method (`a.b:c`) names
//! - `return`, `break`, `continue`
//! - `do ... end`, `while`, `repeat ... until`
//! - `if / elseif / else`
//! - Numeric `for i = a, b[, c]` and generic `for k, v in ...` loops
//! - Assignments (`a, b = 1, 2`), compound assignments (`a += 1`) and call
//!   statements
//!
//! The numeric and generic `for` forms are told apart by a single token of
//! lookahead: a numeric loop has `=` right after the loop variable.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenType;
use crate::parser::parse::{ParseResult, Parser};

impl Parser {
    /// Parse a statement, dispatching on its first token.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<NodeId> {
        match self.peek().kind {
            TokenType::Local => self.parse_local(),
            TokenType::Function => self.parse_function(),
            TokenType::Return => self.parse_return(),
            TokenType::Break => {
                let span = self.advance().span;
                Ok(self.alloc(NodeKind::Break, span))
            }
            TokenType::Continue => {
                let span = self.advance().span;
                Ok(self.alloc(NodeKind::Continue, span))
            }
            TokenType::Do => self.parse_do(),
            TokenType::If => self.parse_if(),
            TokenType::While => self.parse_while(),
            TokenType::Repeat => self.parse_repeat(),
            TokenType::For => self.parse_for(),
            _ => self.parse_prefix_statement(),
        }
    }

    /// `local name {',' name} ['=' exprlist]` or `local function name body`
    fn parse_local(&mut self) -> ParseResult<NodeId> {
        let start = self.advance().span;

        if self.match_token(TokenType::Function) {
            let name = self.parse_name("expected function name after 'local function'")?;
            let (params, body) = self.parse_function_body()?;
            return Ok(self.alloc(
                NodeKind::LocalFunction(LocalFunction { name, params, body }),
                self.span_from(start),
            ));
        }

        let mut names = vec![self.parse_name("expected identifier after 'local'")?];
        while self.match_token(TokenType::Comma) {
            names.push(self.parse_name("expected identifier")?);
        }

        let values = if self.match_token(TokenType::Assign) {
            self.parse_expression_list()?
        } else {
            Vec::new()
        };

        Ok(self.alloc(
            NodeKind::Local(Local {
                names: names.into(),
                values: values.into(),
            }),
            self.span_from(start),
        ))
    }

    /// `function funcname body`
    fn parse_function(&mut self) -> ParseResult<NodeId> {
        let start = self.advance().span;
        let name = self.parse_function_name()?;
        let (params, body) = self.parse_function_body()?;
        Ok(self.alloc(
            NodeKind::Function(Function { name, params, body }),
            self.span_from(start),
        ))
    }

    /// `name {'.' name} [':' name]`
    ///
    /// Dotted segments become a TableAccess chain; a trailing `:name` wraps the
    /// chain in a MethodDefinition.
    fn parse_function_name(&mut self) -> ParseResult<NodeId> {
        let mut name = self.parse_name("expected function name")?;
        let start = self.ast.span(name);

        while self.match_token(TokenType::Dot) {
            let key = self.parse_name("expected identifier after '.'")?;
            name = self.alloc(
                NodeKind::TableAccess(TableAccess {
                    table: name,
                    key,
                    style: AccessStyle::Dot,
                }),
                self.span_from(start),
            );
        }

        if self.match_token(TokenType::Colon) {
            let method = self.parse_name("expected method name after ':'")?;
            name = self.alloc(
                NodeKind::MethodDefinition(MethodDefinition {
                    receiver: name,
                    method,
                }),
                self.span_from(start),
            );
        }

        Ok(name)
    }

    /// `return [exprlist]`
    fn parse_return(&mut self) -> ParseResult<NodeId> {
        let start = self.advance().span;
        let values = if self.is_return_terminator() {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        Ok(self.alloc(
            NodeKind::Return(Return {
                values: values.into(),
            }),
            self.span_from(start),
        ))
    }

    /// `do block end`
    fn parse_do(&mut self) -> ParseResult<NodeId> {
        let start = self.advance().span;
        let body = self.parse_block()?;
        self.consume(TokenType::End, "expected 'end' after do block")?;
        Ok(self.alloc(NodeKind::Do(Do { body }), self.span_from(start)))
    }

    /// `if exp then block {elseif exp then block} [else block] end`
    fn parse_if(&mut self) -> ParseResult<NodeId> {
        let start = self.advance().span;
        let condition = self.parse_expression()?;
        self.consume(TokenType::Then, "expected 'then' after if condition")?;
        let body = self.parse_block()?;

        let mut else_ifs = Vec::new();
        while self.check(TokenType::ElseIf) {
            let clause_start = self.advance().span;
            let condition = self.parse_expression()?;
            self.consume(TokenType::Then, "expected 'then' after elseif condition")?;
            let body = self.parse_block()?;
            else_ifs.push(self.alloc(
                NodeKind::ElseIf(ElseIf { condition, body }),
                self.span_from(clause_start),
            ));
        }

        let else_branch = if self.check(TokenType::Else) {
            let clause_start = self.advance().span;
            let body = self.parse_block()?;
            Some(self.alloc(NodeKind::Else(Else { body }), self.span_from(clause_start)))
        } else {
            None
        };

        self.consume(TokenType::End, "expected 'end' to close if statement")?;
        Ok(self.alloc(
            NodeKind::If(If {
                condition,
                body,
                else_ifs: else_ifs.into(),
                else_branch,
            }),
            self.span_from(start),
        ))
    }

    /// `while exp do block end`
    fn parse_while(&mut self) -> ParseResult<NodeId> {
        let start = self.advance().span;
        let condition = self.parse_expression()?;
        self.consume(TokenType::Do, "expected 'do' after while condition")?;
        let body = self.parse_block()?;
        self.consume(TokenType::End, "expected 'end' to close while loop")?;
        Ok(self.alloc(
            NodeKind::While(While { condition, body }),
            self.span_from(start),
        ))
    }

    /// `repeat block until exp`
    fn parse_repeat(&mut self) -> ParseResult<NodeId> {
        let start = self.advance().span;
        let body = self.parse_block()?;
        self.consume(TokenType::Until, "expected 'until' after repeat body")?;
        let condition = self.parse_expression()?;
        Ok(self.alloc(
            NodeKind::Repeat(Repeat { body, condition }),
            self.span_from(start),
        ))
    }

    /// Numeric or generic `for`, decided by the token after the loop variable.
    fn parse_for(&mut self) -> ParseResult<NodeId> {
        let start = self.advance().span;
        if !self.check(TokenType::Identifier) {
            return Err(self.error("expected identifier after 'for'"));
        }
        if self.check_next(TokenType::Assign) {
            self.parse_numeric_for(start)
        } else {
            self.parse_generic_for(start)
        }
    }

    /// `for name '=' exp ',' exp [',' exp] do block end`
    fn parse_numeric_for(&mut self, start: Span) -> ParseResult<NodeId> {
        let variable = self.parse_name("expected loop variable")?;
        self.consume(TokenType::Assign, "expected '=' after loop variable")?;
        let first = self.parse_expression()?;
        self.consume(TokenType::Comma, "expected ',' after for loop start value")?;
        let limit = self.parse_expression()?;
        let step = if self.match_token(TokenType::Comma) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.consume(TokenType::Do, "expected 'do' after for loop header")?;
        let body = self.parse_block()?;
        self.consume(TokenType::End, "expected 'end' to close for loop")?;

        Ok(self.alloc(
            NodeKind::ForNumeric(ForNumeric {
                variable,
                start: first,
                limit,
                step,
                body,
            }),
            self.span_from(start),
        ))
    }

    /// `for namelist in exprlist do block end`
    fn parse_generic_for(&mut self, start: Span) -> ParseResult<NodeId> {
        let mut names = vec![self.parse_name("expected loop variable")?];
        while self.match_token(TokenType::Comma) {
            names.push(self.parse_name("expected loop variable after ','")?);
        }

        self.consume(TokenType::In, "expected 'in' after for loop variables")?;
        let iterators = self.parse_expression_list()?;

        self.consume(TokenType::Do, "expected 'do' after for loop header")?;
        let body = self.parse_block()?;
        self.consume(TokenType::End, "expected 'end' to close for loop")?;

        Ok(self.alloc(
            NodeKind::ForGeneric(ForGeneric {
                names: names.into(),
                iterators: iterators.into(),
                body,
            }),
            self.span_from(start),
        ))
    }

    /// Assignment, compound assignment or call statement.
    fn parse_prefix_statement(&mut self) -> ParseResult<NodeId> {
        let start = self.peek().span;
        let mut targets = vec![self.parse_prefix_expression()?];
        while self.match_token(TokenType::Comma) {
            targets.push(self.parse_prefix_expression()?);
        }

        if self.check(TokenType::Assign) {
            self.check_assignable(&targets)?;
            self.advance();
            let values = self.parse_expression_list()?;
            return Ok(self.alloc(
                NodeKind::Assignment(Assignment {
                    targets: targets.into(),
                    values: values.into(),
                }),
                self.span_from(start),
            ));
        }

        if let [target] = targets[..] {
            if let Some(op) = self.compound_operator() {
                self.check_assignable(&targets)?;
                self.advance();
                let value = self.parse_expression()?;
                return Ok(self.alloc(
                    NodeKind::CompoundAssignment(CompoundAssignment { op, target, value }),
                    self.span_from(start),
                ));
            }

            if matches!(
                self.ast.kind(target),
                NodeKind::FunctionCall(_) | NodeKind::MethodCall(_) | NodeKind::Paren(_)
            ) {
                return Ok(self.alloc(
                    NodeKind::ExpressionStatement(ExpressionStatement { expression: target }),
                    self.span_from(start),
                ));
            }
        }

        Err(self.error("unexpected expression in statement"))
    }

    fn compound_operator(&self) -> Option<BinOp> {
        match self.peek().kind {
            TokenType::PlusEq => Some(BinOp::Add),
            TokenType::MinusEq => Some(BinOp::Sub),
            TokenType::StarEq => Some(BinOp::Mul),
            TokenType::SlashEq => Some(BinOp::Div),
            TokenType::PercentEq => Some(BinOp::Mod),
            _ => None,
        }
    }

    /// Only names and table accesses can be assigned to.
    fn check_assignable(&self, targets: &[NodeId]) -> ParseResult<()> {
        for &target in targets {
            if !matches!(
                self.ast.kind(target),
                NodeKind::Identifier(_) | NodeKind::TableAccess(_)
            ) {
                return Err(self.error("cannot assign to this expression"));
            }
        }
        Ok(())
    }
}
