//! Source generator
//!
//! Renders a tree back to Lua source text. Parsed trees already carry a
//! [`Paren`] node wherever the source had parentheses, so the generator only
//! adds parentheses for hand-built trees whose nesting would otherwise re-parse
//! with a different shape.
//!
//! Formatting is normalized: one statement per line, bodies indented with
//! [`CodegenOptions::indent`], single spaces around binary operators.

use super::{accept, Visitor};
use crate::parser::ast::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Terminate every statement with `;`.
    pub semicolons: bool,
    /// One level of indentation.
    pub indent: String,
    /// Emit attached comments.
    pub comments: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            semicolons: false,
            indent: "\t".to_string(),
            comments: true,
        }
    }
}

/// Render the subtree at `id` as source text.
pub fn generate(ast: &Ast, id: NodeId, options: &CodegenOptions) -> String {
    let mut generator = Generator {
        options,
        out: String::new(),
        depth: 0,
    };
    accept(ast, id, &mut generator);
    generator.out
}

fn precedence(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Binary(n) => n.op.precedence(),
        NodeKind::Unary(_) => UNARY_PRECEDENCE,
        _ => u8::MAX,
    }
}

/// Whether `child` needs parentheses as an operand of `op`.
fn operand_needs_parens(op: BinOp, child: &NodeKind, is_right: bool) -> bool {
    // the right side of `^` is parsed as a unary expression
    if op == BinOp::Pow && is_right {
        return matches!(child, NodeKind::Binary(b) if b.op != BinOp::Pow);
    }
    let (parent, own) = (op.precedence(), precedence(child));
    if own != parent {
        return own < parent;
    }
    if op.is_relational() {
        return true;
    }
    op.is_right_associative() != is_right
}

/// Callees, indexed tables and method receivers must be prefix expressions.
fn needs_prefix_parens(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Binary(_) | NodeKind::Unary(_))
}

struct Generator<'a> {
    options: &'a CodegenOptions,
    out: String,
    depth: usize,
}

impl Generator<'_> {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(&self.options.indent);
        }
    }

    fn comment(&mut self, comment: &Comment) {
        match comment.kind {
            CommentKind::Line => {
                self.out.push_str("--");
                self.out.push_str(&comment.text);
            }
            CommentKind::Block => {
                self.out.push_str("--[[");
                self.out.push_str(&comment.text);
                self.out.push_str("]]");
            }
        }
    }

    /// Leading comments on their own lines, then the statement's indentation.
    fn begin(&mut self, ast: &Ast, id: NodeId) {
        if self.options.comments {
            for comment in &ast[id].leading_comments {
                self.indent();
                self.comment(comment);
                self.out.push('\n');
            }
        }
        self.indent();
    }

    /// Optional semicolon, trailing comments and the line break.
    fn finish(&mut self, ast: &Ast, id: NodeId) {
        if self.options.semicolons {
            self.out.push(';');
        }
        if self.options.comments {
            for comment in &ast[id].trailing_comments {
                self.out.push(' ');
                self.comment(comment);
            }
        }
        self.out.push('\n');
    }

    fn body(&mut self, ast: &Ast, block: NodeId) {
        self.depth += 1;
        accept(ast, block, self);
        self.depth -= 1;
    }

    fn end(&mut self, ast: &Ast, id: NodeId) {
        self.indent();
        self.out.push_str("end");
        self.finish(ast, id);
    }

    fn list(&mut self, ast: &Ast, items: &[NodeId]) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            accept(ast, item, self);
        }
    }

    fn parenthesized(&mut self, ast: &Ast, id: NodeId, parens: bool) {
        if parens {
            self.out.push('(');
        }
        accept(ast, id, self);
        if parens {
            self.out.push(')');
        }
    }

    fn prefix(&mut self, ast: &Ast, id: NodeId) {
        self.parenthesized(ast, id, needs_prefix_parens(ast.kind(id)));
    }

    /// `(params)` followed by the indented body and `end`, without the
    /// statement's line break.
    fn function_body(&mut self, ast: &Ast, params: &[NodeId], body: NodeId) {
        self.out.push('(');
        self.list(ast, params);
        self.out.push_str(")\n");
        self.body(ast, body);
        self.indent();
        self.out.push_str("end");
    }
}

impl Visitor for Generator<'_> {
    type Output = ();

    fn visit_chunk(&mut self, ast: &Ast, _id: NodeId, node: &Chunk) {
        accept(ast, node.block, self);
    }

    fn visit_block(&mut self, ast: &Ast, id: NodeId, node: &Block) {
        for &statement in node.statements.iter() {
            accept(ast, statement, self);
        }
        if self.options.comments {
            for comment in &ast[id].trailing_comments {
                self.indent();
                self.comment(comment);
                self.out.push('\n');
            }
        }
    }

    fn visit_assignment(&mut self, ast: &Ast, id: NodeId, node: &Assignment) {
        self.begin(ast, id);
        self.list(ast, &node.targets);
        self.out.push_str(" = ");
        self.list(ast, &node.values);
        self.finish(ast, id);
    }

    fn visit_compound_assignment(&mut self, ast: &Ast, id: NodeId, node: &CompoundAssignment) {
        self.begin(ast, id);
        accept(ast, node.target, self);
        self.out.push_str(&format!(" {}= ", node.op));
        accept(ast, node.value, self);
        self.finish(ast, id);
    }

    fn visit_local(&mut self, ast: &Ast, id: NodeId, node: &Local) {
        self.begin(ast, id);
        self.out.push_str("local ");
        self.list(ast, &node.names);
        if !node.values.is_empty() {
            self.out.push_str(" = ");
            self.list(ast, &node.values);
        }
        self.finish(ast, id);
    }

    fn visit_local_function(&mut self, ast: &Ast, id: NodeId, node: &LocalFunction) {
        self.begin(ast, id);
        self.out.push_str("local function ");
        accept(ast, node.name, self);
        self.function_body(ast, &node.params, node.body);
        self.finish(ast, id);
    }

    fn visit_function(&mut self, ast: &Ast, id: NodeId, node: &Function) {
        self.begin(ast, id);
        self.out.push_str("function ");
        accept(ast, node.name, self);
        self.function_body(ast, &node.params, node.body);
        self.finish(ast, id);
    }

    fn visit_return(&mut self, ast: &Ast, id: NodeId, node: &Return) {
        self.begin(ast, id);
        self.out.push_str("return");
        if !node.values.is_empty() {
            self.out.push(' ');
            self.list(ast, &node.values);
        }
        self.finish(ast, id);
    }

    fn visit_break(&mut self, ast: &Ast, id: NodeId) {
        self.begin(ast, id);
        self.out.push_str("break");
        self.finish(ast, id);
    }

    fn visit_continue(&mut self, ast: &Ast, id: NodeId) {
        self.begin(ast, id);
        self.out.push_str("continue");
        self.finish(ast, id);
    }

    fn visit_do(&mut self, ast: &Ast, id: NodeId, node: &Do) {
        self.begin(ast, id);
        self.out.push_str("do\n");
        self.body(ast, node.body);
        self.end(ast, id);
    }

    fn visit_if(&mut self, ast: &Ast, id: NodeId, node: &If) {
        self.begin(ast, id);
        self.out.push_str("if ");
        accept(ast, node.condition, self);
        self.out.push_str(" then\n");
        self.body(ast, node.body);
        for &clause in node.else_ifs.iter() {
            accept(ast, clause, self);
        }
        if let Some(else_branch) = node.else_branch {
            accept(ast, else_branch, self);
        }
        self.end(ast, id);
    }

    fn visit_else_if(&mut self, ast: &Ast, _id: NodeId, node: &ElseIf) {
        self.indent();
        self.out.push_str("elseif ");
        accept(ast, node.condition, self);
        self.out.push_str(" then\n");
        self.body(ast, node.body);
    }

    fn visit_else(&mut self, ast: &Ast, _id: NodeId, node: &Else) {
        self.indent();
        self.out.push_str("else\n");
        self.body(ast, node.body);
    }

    fn visit_while(&mut self, ast: &Ast, id: NodeId, node: &While) {
        self.begin(ast, id);
        self.out.push_str("while ");
        accept(ast, node.condition, self);
        self.out.push_str(" do\n");
        self.body(ast, node.body);
        self.end(ast, id);
    }

    fn visit_repeat(&mut self, ast: &Ast, id: NodeId, node: &Repeat) {
        self.begin(ast, id);
        self.out.push_str("repeat\n");
        self.body(ast, node.body);
        self.indent();
        self.out.push_str("until ");
        accept(ast, node.condition, self);
        self.finish(ast, id);
    }

    fn visit_for_numeric(&mut self, ast: &Ast, id: NodeId, node: &ForNumeric) {
        self.begin(ast, id);
        self.out.push_str("for ");
        accept(ast, node.variable, self);
        self.out.push_str(" = ");
        accept(ast, node.start, self);
        self.out.push_str(", ");
        accept(ast, node.limit, self);
        if let Some(step) = node.step {
            self.out.push_str(", ");
            accept(ast, step, self);
        }
        self.out.push_str(" do\n");
        self.body(ast, node.body);
        self.end(ast, id);
    }

    fn visit_for_generic(&mut self, ast: &Ast, id: NodeId, node: &ForGeneric) {
        self.begin(ast, id);
        self.out.push_str("for ");
        self.list(ast, &node.names);
        self.out.push_str(" in ");
        self.list(ast, &node.iterators);
        self.out.push_str(" do\n");
        self.body(ast, node.body);
        self.end(ast, id);
    }

    fn visit_expression_statement(&mut self, ast: &Ast, id: NodeId, node: &ExpressionStatement) {
        self.begin(ast, id);
        accept(ast, node.expression, self);
        self.finish(ast, id);
    }

    fn visit_identifier(&mut self, _ast: &Ast, _id: NodeId, node: &Identifier) {
        self.out.push_str(&node.name);
    }

    fn visit_literal(&mut self, _ast: &Ast, _id: NodeId, node: &Literal) {
        match node.kind {
            LiteralKind::String { quote } => {
                self.out.push(quote);
                self.out.push_str(&node.value);
                self.out.push(quote);
            }
            _ => self.out.push_str(&node.value),
        }
    }

    fn visit_binary(&mut self, ast: &Ast, _id: NodeId, node: &Binary) {
        let left = operand_needs_parens(node.op, ast.kind(node.left), false);
        self.parenthesized(ast, node.left, left);
        self.out.push(' ');
        self.out.push_str(node.op.symbol());
        self.out.push(' ');
        let right = operand_needs_parens(node.op, ast.kind(node.right), true);
        self.parenthesized(ast, node.right, right);
    }

    fn visit_unary(&mut self, ast: &Ast, _id: NodeId, node: &Unary) {
        self.out.push_str(node.op.symbol());
        if node.op == UnOp::Not {
            self.out.push(' ');
        }
        let parens = matches!(ast.kind(node.operand), NodeKind::Binary(b) if b.op != BinOp::Pow);
        let mark = self.out.len();
        self.parenthesized(ast, node.operand, parens);
        // `--` would start a comment
        if node.op == UnOp::Neg && self.out[mark..].starts_with('-') {
            self.out.insert(mark, ' ');
        }
    }

    fn visit_paren(&mut self, ast: &Ast, _id: NodeId, node: &Paren) {
        self.parenthesized(ast, node.inner, true);
    }

    fn visit_vararg(&mut self, _ast: &Ast, _id: NodeId) {
        self.out.push_str("...");
    }

    fn visit_function_call(&mut self, ast: &Ast, _id: NodeId, node: &FunctionCall) {
        self.prefix(ast, node.callee);
        self.out.push('(');
        self.list(ast, &node.args);
        self.out.push(')');
    }

    fn visit_method_call(&mut self, ast: &Ast, _id: NodeId, node: &MethodCall) {
        self.prefix(ast, node.receiver);
        self.out.push(':');
        accept(ast, node.method, self);
        self.out.push('(');
        self.list(ast, &node.args);
        self.out.push(')');
    }

    fn visit_method_definition(&mut self, ast: &Ast, _id: NodeId, node: &MethodDefinition) {
        accept(ast, node.receiver, self);
        self.out.push(':');
        accept(ast, node.method, self);
    }

    fn visit_table_access(&mut self, ast: &Ast, _id: NodeId, node: &TableAccess) {
        self.prefix(ast, node.table);
        match node.style {
            AccessStyle::Dot => {
                self.out.push('.');
                accept(ast, node.key, self);
            }
            AccessStyle::Bracket => {
                self.out.push('[');
                accept(ast, node.key, self);
                self.out.push(']');
            }
        }
    }

    fn visit_table_constructor(&mut self, ast: &Ast, _id: NodeId, node: &TableConstructor) {
        self.out.push('{');
        self.list(ast, &node.fields);
        self.out.push('}');
    }

    fn visit_table_field(&mut self, ast: &Ast, _id: NodeId, node: &TableField) {
        match (node.style, node.key) {
            (FieldStyle::Named, Some(key)) => {
                accept(ast, key, self);
                self.out.push_str(" = ");
            }
            (FieldStyle::Bracketed, Some(key)) => {
                self.out.push('[');
                accept(ast, key, self);
                self.out.push_str("] = ");
            }
            _ => {}
        }
        accept(ast, node.value, self);
    }

    fn visit_anonymous_function(&mut self, ast: &Ast, _id: NodeId, node: &AnonymousFunction) {
        self.out.push_str("function");
        self.function_body(ast, &node.params, node.body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn emit(source: &str) -> String {
        let ast = parse(source).unwrap();
        generate(&ast, ast.root(), &CodegenOptions::default())
    }

    fn emit_expr(ast: &Ast, id: NodeId) -> String {
        generate(ast, id, &CodegenOptions::default())
    }

    #[test]
    fn test_statements_are_normalized() {
        let source = "local x=1 if x then print(\"a\") elseif y then return else x=2 end";
        assert_eq!(
            emit(source),
            "local x = 1\nif x then\n\tprint(\"a\")\nelseif y then\n\treturn\nelse\n\tx = 2\nend\n"
        );
    }

    #[test]
    fn test_functions_and_loops() {
        let source = "function t.m:go(b, ...) return b .. c end\n\
                      for i = 1, 10, 2 do break end\n\
                      for k, v in pairs(t) do continue end\n\
                      repeat n -= 1 until n == 0\n\
                      local f = function() end";
        assert_eq!(
            emit(source),
            "function t.m:go(b, ...)\n\treturn b .. c\nend\n\
             for i = 1, 10, 2 do\n\tbreak\nend\n\
             for k, v in pairs(t) do\n\tcontinue\nend\n\
             repeat\n\tn -= 1\nuntil n == 0\n\
             local f = function()\nend\n"
        );
    }

    #[test]
    fn test_styles_and_quotes_are_preserved() {
        assert_eq!(
            emit("local t = {1, a = 'x', [k] = v}\nprint(t.a, t['b'], (t):len())"),
            "local t = {1, a = 'x', [k] = v}\nprint(t.a, t['b'], (t):len())\n"
        );
    }

    #[test]
    fn test_semicolons_and_indent_options() {
        let ast = parse("do x = 1 end").unwrap();
        let options = CodegenOptions {
            semicolons: true,
            indent: "  ".to_string(),
            comments: true,
        };
        assert_eq!(generate(&ast, ast.root(), &options), "do\n  x = 1;\nend;\n");
    }

    #[test]
    fn test_comments_are_emitted() {
        let source = "-- head\nx = 1 --[[ note ]]\ndo\n\ty = 2\n\t-- tail\nend";
        assert_eq!(
            emit(source),
            "-- head\nx = 1 --[[ note ]]\ndo\n\ty = 2\n\t-- tail\nend\n"
        );

        let ast = parse(source).unwrap();
        let options = CodegenOptions {
            comments: false,
            ..CodegenOptions::default()
        };
        assert_eq!(generate(&ast, ast.root(), &options), "x = 1\ndo\n\ty = 2\nend\n");
    }

    #[test]
    fn test_parens_for_synthetic_precedence() {
        let mut ast = Ast::new();
        let (a, b, c) = (ast.identifier("a"), ast.identifier("b"), ast.identifier("c"));
        let sum = ast.binary(BinOp::Add, a, b);
        let product = ast.binary(BinOp::Mul, sum, c);
        assert_eq!(emit_expr(&ast, product), "(a + b) * c");

        let (a, b, c) = (ast.identifier("a"), ast.identifier("b"), ast.identifier("c"));
        let inner = ast.binary(BinOp::Sub, b, c);
        let outer = ast.binary(BinOp::Sub, a, inner);
        assert_eq!(emit_expr(&ast, outer), "a - (b - c)");

        let (a, b, c) = (ast.identifier("a"), ast.identifier("b"), ast.identifier("c"));
        let inner = ast.binary(BinOp::Pow, a, b);
        let outer = ast.binary(BinOp::Pow, inner, c);
        assert_eq!(emit_expr(&ast, outer), "(a ^ b) ^ c");

        let (a, b, c) = (ast.identifier("a"), ast.identifier("b"), ast.identifier("c"));
        let inner = ast.binary(BinOp::Lt, a, b);
        let outer = ast.binary(BinOp::Lt, inner, c);
        assert_eq!(emit_expr(&ast, outer), "(a < b) < c");

        let (base, exponent) = (ast.number("2"), ast.number("2"));
        let neg = ast.unary(UnOp::Neg, base);
        let pow = ast.binary(BinOp::Pow, neg, exponent);
        assert_eq!(emit_expr(&ast, pow), "(-2) ^ 2");
    }

    #[test]
    fn test_unary_and_prefix_parens() {
        let mut ast = Ast::new();
        let (a, b) = (ast.identifier("a"), ast.identifier("b"));
        let eq = ast.binary(BinOp::Eq, a, b);
        let not = ast.unary(UnOp::Not, eq);
        assert_eq!(emit_expr(&ast, not), "not (a == b)");

        let x = ast.identifier("x");
        let inner = ast.unary(UnOp::Neg, x);
        let outer = ast.unary(UnOp::Neg, inner);
        assert_eq!(emit_expr(&ast, outer), "- -x");

        let (a, b) = (ast.identifier("a"), ast.identifier("b"));
        let concat = ast.binary(BinOp::Concat, a, b);
        let call = ast.call(concat, vec![]);
        assert_eq!(emit_expr(&ast, call), "(a .. b)()");
    }

    #[test]
    fn test_parsed_trees_get_no_extra_parens() {
        let source = "x = a - b - c .. d .. e ^ f ^ -g\ny = -x ^ 2 + not a == b\nz = (a + b) * c";
        assert_eq!(emit(source), format!("{source}\n"));
    }
}
