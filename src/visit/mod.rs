//! Tree traversal
//!
//! - [`Visitor`]: one method per node kind, reached through [`accept`]
//! - [`rewriter`]: the [`Rewriter`] trait, which rebuilds only changed parents
//! - [`printer`]: indented outline of a tree
//! - [`codegen`]: source text from a tree
//!
//! Dispatch is a single exhaustive `match` over [`NodeKind`], so adding a node
//! kind is a compile error in every visitor until it is handled.

pub mod codegen;
pub mod printer;
pub mod rewriter;

pub use codegen::{generate, CodegenOptions};
pub use printer::{outline, OutlineOptions};
pub use rewriter::Rewriter;

use crate::parser::ast::*;

/// Read-only traversal contract.
///
/// Each method receives the arena, the node's handle and its payload. Visitors
/// decide themselves whether and in which order to descend, usually by calling
/// [`accept`] on child handles.
pub trait Visitor {
    type Output;

    fn visit_chunk(&mut self, ast: &Ast, id: NodeId, node: &Chunk) -> Self::Output;
    fn visit_block(&mut self, ast: &Ast, id: NodeId, node: &Block) -> Self::Output;
    fn visit_assignment(&mut self, ast: &Ast, id: NodeId, node: &Assignment) -> Self::Output;
    fn visit_compound_assignment(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &CompoundAssignment,
    ) -> Self::Output;
    fn visit_local(&mut self, ast: &Ast, id: NodeId, node: &Local) -> Self::Output;
    fn visit_local_function(&mut self, ast: &Ast, id: NodeId, node: &LocalFunction) -> Self::Output;
    fn visit_function(&mut self, ast: &Ast, id: NodeId, node: &Function) -> Self::Output;
    fn visit_return(&mut self, ast: &Ast, id: NodeId, node: &Return) -> Self::Output;
    fn visit_break(&mut self, ast: &Ast, id: NodeId) -> Self::Output;
    fn visit_continue(&mut self, ast: &Ast, id: NodeId) -> Self::Output;
    fn visit_do(&mut self, ast: &Ast, id: NodeId, node: &Do) -> Self::Output;
    fn visit_if(&mut self, ast: &Ast, id: NodeId, node: &If) -> Self::Output;
    fn visit_else_if(&mut self, ast: &Ast, id: NodeId, node: &ElseIf) -> Self::Output;
    fn visit_else(&mut self, ast: &Ast, id: NodeId, node: &Else) -> Self::Output;
    fn visit_while(&mut self, ast: &Ast, id: NodeId, node: &While) -> Self::Output;
    fn visit_repeat(&mut self, ast: &Ast, id: NodeId, node: &Repeat) -> Self::Output;
    fn visit_for_numeric(&mut self, ast: &Ast, id: NodeId, node: &ForNumeric) -> Self::Output;
    fn visit_for_generic(&mut self, ast: &Ast, id: NodeId, node: &ForGeneric) -> Self::Output;
    fn visit_expression_statement(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &ExpressionStatement,
    ) -> Self::Output;

    fn visit_identifier(&mut self, ast: &Ast, id: NodeId, node: &Identifier) -> Self::Output;
    fn visit_literal(&mut self, ast: &Ast, id: NodeId, node: &Literal) -> Self::Output;
    fn visit_binary(&mut self, ast: &Ast, id: NodeId, node: &Binary) -> Self::Output;
    fn visit_unary(&mut self, ast: &Ast, id: NodeId, node: &Unary) -> Self::Output;
    fn visit_paren(&mut self, ast: &Ast, id: NodeId, node: &Paren) -> Self::Output;
    fn visit_vararg(&mut self, ast: &Ast, id: NodeId) -> Self::Output;
    fn visit_function_call(&mut self, ast: &Ast, id: NodeId, node: &FunctionCall) -> Self::Output;
    fn visit_method_call(&mut self, ast: &Ast, id: NodeId, node: &MethodCall) -> Self::Output;
    fn visit_method_definition(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &MethodDefinition,
    ) -> Self::Output;
    fn visit_table_access(&mut self, ast: &Ast, id: NodeId, node: &TableAccess) -> Self::Output;
    fn visit_table_constructor(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &TableConstructor,
    ) -> Self::Output;
    fn visit_table_field(&mut self, ast: &Ast, id: NodeId, node: &TableField) -> Self::Output;
    fn visit_anonymous_function(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &AnonymousFunction,
    ) -> Self::Output;
}

/// Call the `visitor` method matching the kind of node `id`.
pub fn accept<V: Visitor + ?Sized>(ast: &Ast, id: NodeId, visitor: &mut V) -> V::Output {
    match ast.kind(id) {
        NodeKind::Chunk(n) => visitor.visit_chunk(ast, id, n),
        NodeKind::Block(n) => visitor.visit_block(ast, id, n),
        NodeKind::Assignment(n) => visitor.visit_assignment(ast, id, n),
        NodeKind::CompoundAssignment(n) => visitor.visit_compound_assignment(ast, id, n),
        NodeKind::Local(n) => visitor.visit_local(ast, id, n),
        NodeKind::LocalFunction(n) => visitor.visit_local_function(ast, id, n),
        NodeKind::Function(n) => visitor.visit_function(ast, id, n),
        NodeKind::Return(n) => visitor.visit_return(ast, id, n),
        NodeKind::Break => visitor.visit_break(ast, id),
        NodeKind::Continue => visitor.visit_continue(ast, id),
        NodeKind::Do(n) => visitor.visit_do(ast, id, n),
        NodeKind::If(n) => visitor.visit_if(ast, id, n),
        NodeKind::ElseIf(n) => visitor.visit_else_if(ast, id, n),
        NodeKind::Else(n) => visitor.visit_else(ast, id, n),
        NodeKind::While(n) => visitor.visit_while(ast, id, n),
        NodeKind::Repeat(n) => visitor.visit_repeat(ast, id, n),
        NodeKind::ForNumeric(n) => visitor.visit_for_numeric(ast, id, n),
        NodeKind::ForGeneric(n) => visitor.visit_for_generic(ast, id, n),
        NodeKind::ExpressionStatement(n) => visitor.visit_expression_statement(ast, id, n),
        NodeKind::Identifier(n) => visitor.visit_identifier(ast, id, n),
        NodeKind::Literal(n) => visitor.visit_literal(ast, id, n),
        NodeKind::Binary(n) => visitor.visit_binary(ast, id, n),
        NodeKind::Unary(n) => visitor.visit_unary(ast, id, n),
        NodeKind::Paren(n) => visitor.visit_paren(ast, id, n),
        NodeKind::VarArg => visitor.visit_vararg(ast, id),
        NodeKind::FunctionCall(n) => visitor.visit_function_call(ast, id, n),
        NodeKind::MethodCall(n) => visitor.visit_method_call(ast, id, n),
        NodeKind::MethodDefinition(n) => visitor.visit_method_definition(ast, id, n),
        NodeKind::TableAccess(n) => visitor.visit_table_access(ast, id, n),
        NodeKind::TableConstructor(n) => visitor.visit_table_constructor(ast, id, n),
        NodeKind::TableField(n) => visitor.visit_table_field(ast, id, n),
        NodeKind::AnonymousFunction(n) => visitor.visit_anonymous_function(ast, id, n),
    }
}

impl Ast {
    /// Dispatch `visitor` on node `id`.
    pub fn accept<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) -> V::Output {
        accept(self, id, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    /// Counts identifiers by walking every child of every node.
    struct IdentifierCounter {
        names: Vec<String>,
    }

    impl IdentifierCounter {
        fn descend(&mut self, ast: &Ast, id: NodeId) {
            for child in ast.children(id) {
                accept(ast, child, self);
            }
        }
    }

    impl Visitor for IdentifierCounter {
        type Output = ();

        fn visit_chunk(&mut self, ast: &Ast, id: NodeId, _: &Chunk) {
            self.descend(ast, id)
        }
        fn visit_block(&mut self, ast: &Ast, id: NodeId, _: &Block) {
            self.descend(ast, id)
        }
        fn visit_assignment(&mut self, ast: &Ast, id: NodeId, _: &Assignment) {
            self.descend(ast, id)
        }
        fn visit_compound_assignment(&mut self, ast: &Ast, id: NodeId, _: &CompoundAssignment) {
            self.descend(ast, id)
        }
        fn visit_local(&mut self, ast: &Ast, id: NodeId, _: &Local) {
            self.descend(ast, id)
        }
        fn visit_local_function(&mut self, ast: &Ast, id: NodeId, _: &LocalFunction) {
            self.descend(ast, id)
        }
        fn visit_function(&mut self, ast: &Ast, id: NodeId, _: &Function) {
            self.descend(ast, id)
        }
        fn visit_return(&mut self, ast: &Ast, id: NodeId, _: &Return) {
            self.descend(ast, id)
        }
        fn visit_break(&mut self, _: &Ast, _: NodeId) {}
        fn visit_continue(&mut self, _: &Ast, _: NodeId) {}
        fn visit_do(&mut self, ast: &Ast, id: NodeId, _: &Do) {
            self.descend(ast, id)
        }
        fn visit_if(&mut self, ast: &Ast, id: NodeId, _: &If) {
            self.descend(ast, id)
        }
        fn visit_else_if(&mut self, ast: &Ast, id: NodeId, _: &ElseIf) {
            self.descend(ast, id)
        }
        fn visit_else(&mut self, ast: &Ast, id: NodeId, _: &Else) {
            self.descend(ast, id)
        }
        fn visit_while(&mut self, ast: &Ast, id: NodeId, _: &While) {
            self.descend(ast, id)
        }
        fn visit_repeat(&mut self, ast: &Ast, id: NodeId, _: &Repeat) {
            self.descend(ast, id)
        }
        fn visit_for_numeric(&mut self, ast: &Ast, id: NodeId, _: &ForNumeric) {
            self.descend(ast, id)
        }
        fn visit_for_generic(&mut self, ast: &Ast, id: NodeId, _: &ForGeneric) {
            self.descend(ast, id)
        }
        fn visit_expression_statement(&mut self, ast: &Ast, id: NodeId, _: &ExpressionStatement) {
            self.descend(ast, id)
        }
        fn visit_identifier(&mut self, _: &Ast, _: NodeId, node: &Identifier) {
            self.names.push(node.name.clone());
        }
        fn visit_literal(&mut self, _: &Ast, _: NodeId, _: &Literal) {}
        fn visit_binary(&mut self, ast: &Ast, id: NodeId, _: &Binary) {
            self.descend(ast, id)
        }
        fn visit_unary(&mut self, ast: &Ast, id: NodeId, _: &Unary) {
            self.descend(ast, id)
        }
        fn visit_paren(&mut self, ast: &Ast, id: NodeId, _: &Paren) {
            self.descend(ast, id)
        }
        fn visit_vararg(&mut self, _: &Ast, _: NodeId) {}
        fn visit_function_call(&mut self, ast: &Ast, id: NodeId, _: &FunctionCall) {
            self.descend(ast, id)
        }
        fn visit_method_call(&mut self, ast: &Ast, id: NodeId, _: &MethodCall) {
            self.descend(ast, id)
        }
        fn visit_method_definition(&mut self, ast: &Ast, id: NodeId, _: &MethodDefinition) {
            self.descend(ast, id)
        }
        fn visit_table_access(&mut self, ast: &Ast, id: NodeId, _: &TableAccess) {
            self.descend(ast, id)
        }
        fn visit_table_constructor(&mut self, ast: &Ast, id: NodeId, _: &TableConstructor) {
            self.descend(ast, id)
        }
        fn visit_table_field(&mut self, ast: &Ast, id: NodeId, _: &TableField) {
            self.descend(ast, id)
        }
        fn visit_anonymous_function(&mut self, ast: &Ast, id: NodeId, _: &AnonymousFunction) {
            self.descend(ast, id)
        }
    }

    #[test]
    fn test_accept_reaches_every_identifier_in_order() {
        let ast = parse("local t = {x = a}\nfunction t.m:go(b) return b .. c end").unwrap();
        let mut counter = IdentifierCounter { names: Vec::new() };
        ast.accept(ast.root(), &mut counter);
        assert_eq!(counter.names, vec!["t", "x", "a", "t", "m", "go", "b", "b", "c"]);
    }
}
