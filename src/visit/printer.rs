//! Tree outline printer
//!
//! Flattens a subtree into [`OutlineRow`]s, one per node in pre-order, and
//! renders them with box-drawing guides:
//!
//! ```text
//! Chunk
//! ├──Block
//! │ ├──Local
//! │ │ ├──Identifier x
//! ```
//!
//! The explorer UI consumes the rows directly; [`outline`] renders them as text.

use super::{accept, Visitor};
use crate::parser::ast::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlineOptions {
    /// Suffix every row with `@line:col` of the node's start.
    pub spans: bool,
}

/// One printed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub depth: usize,
    pub label: String,
    pub node: NodeId,
}

impl OutlineRow {
    /// Box-drawing prefix for this row's depth.
    pub fn guide(&self) -> String {
        if self.depth == 0 {
            return String::new();
        }
        let mut guide = "│ ".repeat(self.depth - 1);
        guide.push_str("├──");
        guide
    }

    pub fn render(&self, ast: &Ast, options: &OutlineOptions) -> String {
        let mut line = self.guide();
        line.push_str(&self.label);
        let span = ast.span(self.node);
        if options.spans && !span.is_synthetic() {
            line.push_str(&format!(" @{}", span.start));
        }
        line
    }
}

/// Rows for `id` and all of its descendants, in pre-order.
pub fn outline_rows(ast: &Ast, id: NodeId) -> Vec<OutlineRow> {
    let mut printer = OutlinePrinter {
        depth: 0,
        rows: Vec::new(),
    };
    accept(ast, id, &mut printer);
    printer.rows
}

/// Render the subtree at `id` as an outline, one node per line.
pub fn outline(ast: &Ast, id: NodeId, options: &OutlineOptions) -> String {
    let mut out = String::new();
    for row in outline_rows(ast, id) {
        out.push_str(&row.render(ast, options));
        out.push('\n');
    }
    out
}

/// Short description of a node: its kind name plus operator, name or value.
pub fn label(kind: &NodeKind) -> String {
    let detail = match kind {
        NodeKind::Identifier(n) => n.name.clone(),
        NodeKind::Literal(n) => match n.kind {
            LiteralKind::String { quote } => format!("{quote}{}{quote}", n.value),
            _ => n.value.clone(),
        },
        NodeKind::Binary(n) => n.op.symbol().to_string(),
        NodeKind::Unary(n) => n.op.symbol().to_string(),
        NodeKind::CompoundAssignment(n) => format!("{}=", n.op),
        NodeKind::TableAccess(n) => match n.style {
            AccessStyle::Dot => ".".to_string(),
            AccessStyle::Bracket => "[]".to_string(),
        },
        NodeKind::TableField(n) => match n.style {
            FieldStyle::Positional => "positional".to_string(),
            FieldStyle::Named => "named".to_string(),
            FieldStyle::Bracketed => "bracketed".to_string(),
        },
        _ => return kind.name().to_string(),
    };
    format!("{} {}", kind.name(), detail)
}

struct OutlinePrinter {
    depth: usize,
    rows: Vec<OutlineRow>,
}

impl OutlinePrinter {
    fn enter(&mut self, ast: &Ast, id: NodeId) {
        self.rows.push(OutlineRow {
            depth: self.depth,
            label: label(ast.kind(id)),
            node: id,
        });
        self.depth += 1;
        for child in ast.children(id) {
            accept(ast, child, self);
        }
        self.depth -= 1;
    }
}

impl Visitor for OutlinePrinter {
    type Output = ();

    fn visit_chunk(&mut self, ast: &Ast, id: NodeId, _: &Chunk) {
        self.enter(ast, id)
    }
    fn visit_block(&mut self, ast: &Ast, id: NodeId, _: &Block) {
        self.enter(ast, id)
    }
    fn visit_assignment(&mut self, ast: &Ast, id: NodeId, _: &Assignment) {
        self.enter(ast, id)
    }
    fn visit_compound_assignment(&mut self, ast: &Ast, id: NodeId, _: &CompoundAssignment) {
        self.enter(ast, id)
    }
    fn visit_local(&mut self, ast: &Ast, id: NodeId, _: &Local) {
        self.enter(ast, id)
    }
    fn visit_local_function(&mut self, ast: &Ast, id: NodeId, _: &LocalFunction) {
        self.enter(ast, id)
    }
    fn visit_function(&mut self, ast: &Ast, id: NodeId, _: &Function) {
        self.enter(ast, id)
    }
    fn visit_return(&mut self, ast: &Ast, id: NodeId, _: &Return) {
        self.enter(ast, id)
    }
    fn visit_break(&mut self, ast: &Ast, id: NodeId) {
        self.enter(ast, id)
    }
    fn visit_continue(&mut self, ast: &Ast, id: NodeId) {
        self.enter(ast, id)
    }
    fn visit_do(&mut self, ast: &Ast, id: NodeId, _: &Do) {
        self.enter(ast, id)
    }
    fn visit_if(&mut self, ast: &Ast, id: NodeId, _: &If) {
        self.enter(ast, id)
    }
    fn visit_else_if(&mut self, ast: &Ast, id: NodeId, _: &ElseIf) {
        self.enter(ast, id)
    }
    fn visit_else(&mut self, ast: &Ast, id: NodeId, _: &Else) {
        self.enter(ast, id)
    }
    fn visit_while(&mut self, ast: &Ast, id: NodeId, _: &While) {
        self.enter(ast, id)
    }
    fn visit_repeat(&mut self, ast: &Ast, id: NodeId, _: &Repeat) {
        self.enter(ast, id)
    }
    fn visit_for_numeric(&mut self, ast: &Ast, id: NodeId, _: &ForNumeric) {
        self.enter(ast, id)
    }
    fn visit_for_generic(&mut self, ast: &Ast, id: NodeId, _: &ForGeneric) {
        self.enter(ast, id)
    }
    fn visit_expression_statement(&mut self, ast: &Ast, id: NodeId, _: &ExpressionStatement) {
        self.enter(ast, id)
    }
    fn visit_identifier(&mut self, ast: &Ast, id: NodeId, _: &Identifier) {
        self.enter(ast, id)
    }
    fn visit_literal(&mut self, ast: &Ast, id: NodeId, _: &Literal) {
        self.enter(ast, id)
    }
    fn visit_binary(&mut self, ast: &Ast, id: NodeId, _: &Binary) {
        self.enter(ast, id)
    }
    fn visit_unary(&mut self, ast: &Ast, id: NodeId, _: &Unary) {
        self.enter(ast, id)
    }
    fn visit_paren(&mut self, ast: &Ast, id: NodeId, _: &Paren) {
        self.enter(ast, id)
    }
    fn visit_vararg(&mut self, ast: &Ast, id: NodeId) {
        self.enter(ast, id)
    }
    fn visit_function_call(&mut self, ast: &Ast, id: NodeId, _: &FunctionCall) {
        self.enter(ast, id)
    }
    fn visit_method_call(&mut self, ast: &Ast, id: NodeId, _: &MethodCall) {
        self.enter(ast, id)
    }
    fn visit_method_definition(&mut self, ast: &Ast, id: NodeId, _: &MethodDefinition) {
        self.enter(ast, id)
    }
    fn visit_table_access(&mut self, ast: &Ast, id: NodeId, _: &TableAccess) {
        self.enter(ast, id)
    }
    fn visit_table_constructor(&mut self, ast: &Ast, id: NodeId, _: &TableConstructor) {
        self.enter(ast, id)
    }
    fn visit_table_field(&mut self, ast: &Ast, id: NodeId, _: &TableField) {
        self.enter(ast, id)
    }
    fn visit_anonymous_function(&mut self, ast: &Ast, id: NodeId, _: &AnonymousFunction) {
        self.enter(ast, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use expect_test::expect;

    #[test]
    fn test_outline_of_chunk() {
        let ast = parse("local x = 1 + 2\nprint(x)").unwrap();
        let text = outline(&ast, ast.root(), &OutlineOptions::default());
        expect![[r#"
            Chunk
            ├──Block
            │ ├──Local
            │ │ ├──Identifier x
            │ │ ├──Binary +
            │ │ │ ├──Literal 1
            │ │ │ ├──Literal 2
            │ ├──ExpressionStatement
            │ │ ├──FunctionCall
            │ │ │ ├──Identifier print
            │ │ │ ├──Identifier x
        "#]]
        .assert_eq(&text);
    }

    #[test]
    fn test_outline_with_spans() {
        let ast = parse("local x = 1 + 2").unwrap();
        let local = ast.top_level_statements()[0];
        let text = outline(&ast, local, &OutlineOptions { spans: true });
        expect![[r#"
            Local @1:1
            ├──Identifier x @1:7
            ├──Binary + @1:11
            │ ├──Literal 1 @1:11
            │ ├──Literal 2 @1:15
        "#]]
        .assert_eq(&text);
    }

    #[test]
    fn test_labels_carry_details() {
        let ast = parse("t.k['s'] += -#u\nlocal v = {1, a = 2, [3] = 4}").unwrap();
        let labels: Vec<String> = outline_rows(&ast, ast.root())
            .into_iter()
            .map(|row| row.label)
            .collect();
        assert!(labels.contains(&"CompoundAssignment +=".to_string()));
        assert!(labels.contains(&"TableAccess .".to_string()));
        assert!(labels.contains(&"TableAccess []".to_string()));
        assert!(labels.contains(&"Literal 's'".to_string()));
        assert!(labels.contains(&"Unary -".to_string()));
        assert!(labels.contains(&"Unary #".to_string()));
        assert!(labels.contains(&"TableField positional".to_string()));
        assert!(labels.contains(&"TableField named".to_string()));
        assert!(labels.contains(&"TableField bracketed".to_string()));
    }

    #[test]
    fn test_synthetic_nodes_have_no_span_suffix() {
        let mut ast = Ast::new();
        let value = ast.nil();
        let stmt = ast.return_statement(vec![value]);
        let text = outline(&ast, stmt, &OutlineOptions { spans: true });
        assert_eq!(text, "Return\n├──Literal nil\n");
    }
}
