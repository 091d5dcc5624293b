//! Structural-sharing tree rewriter
//!
//! A [`Rewriter`] maps a node to a replacement handle. The default methods
//! rewrite children first (post-order) and rebuild a composite only when at
//! least one child handle or child list came back different. Untouched
//! subtrees are returned as the very same handle, and untouched lists as the
//! very same `Rc`, so an identity rewrite adds no nodes to the arena. Payloads
//! are cloned on the way down, names and literal text included.
//!
//! Rebuilt composites are appended to the arena with the original node's span
//! and comments and adopt their children; the original stays in the arena,
//! unreachable from the new root.
//!
//! Override the `rewrite_*` method of a kind to transform it. Call the matching
//! `walk_*` function from the override to keep descending into its children.

use std::rc::Rc;

use crate::parser::ast::*;

pub trait Rewriter {
    /// Rewrite node `id`, returning its replacement (possibly `id` itself).
    fn rewrite(&mut self, ast: &mut Ast, id: NodeId) -> NodeId {
        match ast.kind(id).clone() {
            NodeKind::Chunk(n) => self.rewrite_chunk(ast, id, n),
            NodeKind::Block(n) => self.rewrite_block(ast, id, n),
            NodeKind::Assignment(n) => self.rewrite_assignment(ast, id, n),
            NodeKind::CompoundAssignment(n) => self.rewrite_compound_assignment(ast, id, n),
            NodeKind::Local(n) => self.rewrite_local(ast, id, n),
            NodeKind::LocalFunction(n) => self.rewrite_local_function(ast, id, n),
            NodeKind::Function(n) => self.rewrite_function(ast, id, n),
            NodeKind::Return(n) => self.rewrite_return(ast, id, n),
            NodeKind::Break => self.rewrite_break(ast, id),
            NodeKind::Continue => self.rewrite_continue(ast, id),
            NodeKind::Do(n) => self.rewrite_do(ast, id, n),
            NodeKind::If(n) => self.rewrite_if(ast, id, n),
            NodeKind::ElseIf(n) => self.rewrite_else_if(ast, id, n),
            NodeKind::Else(n) => self.rewrite_else(ast, id, n),
            NodeKind::While(n) => self.rewrite_while(ast, id, n),
            NodeKind::Repeat(n) => self.rewrite_repeat(ast, id, n),
            NodeKind::ForNumeric(n) => self.rewrite_for_numeric(ast, id, n),
            NodeKind::ForGeneric(n) => self.rewrite_for_generic(ast, id, n),
            NodeKind::ExpressionStatement(n) => self.rewrite_expression_statement(ast, id, n),
            NodeKind::Identifier(n) => self.rewrite_identifier(ast, id, n),
            NodeKind::Literal(n) => self.rewrite_literal(ast, id, n),
            NodeKind::Binary(n) => self.rewrite_binary(ast, id, n),
            NodeKind::Unary(n) => self.rewrite_unary(ast, id, n),
            NodeKind::Paren(n) => self.rewrite_paren(ast, id, n),
            NodeKind::VarArg => self.rewrite_vararg(ast, id),
            NodeKind::FunctionCall(n) => self.rewrite_function_call(ast, id, n),
            NodeKind::MethodCall(n) => self.rewrite_method_call(ast, id, n),
            NodeKind::MethodDefinition(n) => self.rewrite_method_definition(ast, id, n),
            NodeKind::TableAccess(n) => self.rewrite_table_access(ast, id, n),
            NodeKind::TableConstructor(n) => self.rewrite_table_constructor(ast, id, n),
            NodeKind::TableField(n) => self.rewrite_table_field(ast, id, n),
            NodeKind::AnonymousFunction(n) => self.rewrite_anonymous_function(ast, id, n),
        }
    }

    /// Rewrite every element; returns `list` itself when no element changed.
    fn rewrite_list(&mut self, ast: &mut Ast, list: &NodeList) -> NodeList {
        walk_list(self, ast, list)
    }

    fn rewrite_chunk(&mut self, ast: &mut Ast, id: NodeId, node: Chunk) -> NodeId {
        walk_chunk(self, ast, id, node)
    }
    fn rewrite_block(&mut self, ast: &mut Ast, id: NodeId, node: Block) -> NodeId {
        walk_block(self, ast, id, node)
    }
    fn rewrite_assignment(&mut self, ast: &mut Ast, id: NodeId, node: Assignment) -> NodeId {
        walk_assignment(self, ast, id, node)
    }
    fn rewrite_compound_assignment(
        &mut self,
        ast: &mut Ast,
        id: NodeId,
        node: CompoundAssignment,
    ) -> NodeId {
        walk_compound_assignment(self, ast, id, node)
    }
    fn rewrite_local(&mut self, ast: &mut Ast, id: NodeId, node: Local) -> NodeId {
        walk_local(self, ast, id, node)
    }
    fn rewrite_local_function(&mut self, ast: &mut Ast, id: NodeId, node: LocalFunction) -> NodeId {
        walk_local_function(self, ast, id, node)
    }
    fn rewrite_function(&mut self, ast: &mut Ast, id: NodeId, node: Function) -> NodeId {
        walk_function(self, ast, id, node)
    }
    fn rewrite_return(&mut self, ast: &mut Ast, id: NodeId, node: Return) -> NodeId {
        walk_return(self, ast, id, node)
    }
    fn rewrite_break(&mut self, _ast: &mut Ast, id: NodeId) -> NodeId {
        id
    }
    fn rewrite_continue(&mut self, _ast: &mut Ast, id: NodeId) -> NodeId {
        id
    }
    fn rewrite_do(&mut self, ast: &mut Ast, id: NodeId, node: Do) -> NodeId {
        walk_do(self, ast, id, node)
    }
    fn rewrite_if(&mut self, ast: &mut Ast, id: NodeId, node: If) -> NodeId {
        walk_if(self, ast, id, node)
    }
    fn rewrite_else_if(&mut self, ast: &mut Ast, id: NodeId, node: ElseIf) -> NodeId {
        walk_else_if(self, ast, id, node)
    }
    fn rewrite_else(&mut self, ast: &mut Ast, id: NodeId, node: Else) -> NodeId {
        walk_else(self, ast, id, node)
    }
    fn rewrite_while(&mut self, ast: &mut Ast, id: NodeId, node: While) -> NodeId {
        walk_while(self, ast, id, node)
    }
    fn rewrite_repeat(&mut self, ast: &mut Ast, id: NodeId, node: Repeat) -> NodeId {
        walk_repeat(self, ast, id, node)
    }
    fn rewrite_for_numeric(&mut self, ast: &mut Ast, id: NodeId, node: ForNumeric) -> NodeId {
        walk_for_numeric(self, ast, id, node)
    }
    fn rewrite_for_generic(&mut self, ast: &mut Ast, id: NodeId, node: ForGeneric) -> NodeId {
        walk_for_generic(self, ast, id, node)
    }
    fn rewrite_expression_statement(
        &mut self,
        ast: &mut Ast,
        id: NodeId,
        node: ExpressionStatement,
    ) -> NodeId {
        walk_expression_statement(self, ast, id, node)
    }
    fn rewrite_identifier(&mut self, _ast: &mut Ast, id: NodeId, _node: Identifier) -> NodeId {
        id
    }
    fn rewrite_literal(&mut self, _ast: &mut Ast, id: NodeId, _node: Literal) -> NodeId {
        id
    }
    fn rewrite_binary(&mut self, ast: &mut Ast, id: NodeId, node: Binary) -> NodeId {
        walk_binary(self, ast, id, node)
    }
    fn rewrite_unary(&mut self, ast: &mut Ast, id: NodeId, node: Unary) -> NodeId {
        walk_unary(self, ast, id, node)
    }
    fn rewrite_paren(&mut self, ast: &mut Ast, id: NodeId, node: Paren) -> NodeId {
        walk_paren(self, ast, id, node)
    }
    fn rewrite_vararg(&mut self, _ast: &mut Ast, id: NodeId) -> NodeId {
        id
    }
    fn rewrite_function_call(&mut self, ast: &mut Ast, id: NodeId, node: FunctionCall) -> NodeId {
        walk_function_call(self, ast, id, node)
    }
    fn rewrite_method_call(&mut self, ast: &mut Ast, id: NodeId, node: MethodCall) -> NodeId {
        walk_method_call(self, ast, id, node)
    }
    fn rewrite_method_definition(
        &mut self,
        ast: &mut Ast,
        id: NodeId,
        node: MethodDefinition,
    ) -> NodeId {
        walk_method_definition(self, ast, id, node)
    }
    fn rewrite_table_access(&mut self, ast: &mut Ast, id: NodeId, node: TableAccess) -> NodeId {
        walk_table_access(self, ast, id, node)
    }
    fn rewrite_table_constructor(
        &mut self,
        ast: &mut Ast,
        id: NodeId,
        node: TableConstructor,
    ) -> NodeId {
        walk_table_constructor(self, ast, id, node)
    }
    fn rewrite_table_field(&mut self, ast: &mut Ast, id: NodeId, node: TableField) -> NodeId {
        walk_table_field(self, ast, id, node)
    }
    fn rewrite_anonymous_function(
        &mut self,
        ast: &mut Ast,
        id: NodeId,
        node: AnonymousFunction,
    ) -> NodeId {
        walk_anonymous_function(self, ast, id, node)
    }
}

impl Ast {
    /// Run `rewriter` over the whole tree and make its result the new root.
    pub fn rewrite_root<R: Rewriter + ?Sized>(&mut self, rewriter: &mut R) -> NodeId {
        let root = self.root();
        let new_root = rewriter.rewrite(self, root);
        self.set_root(new_root);
        new_root
    }
}

fn rebuild(ast: &mut Ast, original: NodeId, kind: NodeKind) -> NodeId {
    let id = ast.rebuild(original, kind);
    log::trace!("rebuilt {} {} as {}", ast.kind(id).name(), original, id);
    id
}

fn same(a: &NodeList, b: &NodeList) -> bool {
    Rc::ptr_eq(a, b)
}

fn walk_option<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: Option<NodeId>,
) -> Option<NodeId> {
    id.map(|id| rewriter.rewrite(ast, id))
}

pub fn walk_list<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    list: &NodeList,
) -> NodeList {
    let mut changed: Option<Vec<NodeId>> = None;
    for (i, &old) in list.iter().enumerate() {
        let new = rewriter.rewrite(ast, old);
        match changed.as_mut() {
            Some(items) => items.push(new),
            None if new != old => {
                let mut items = list[..i].to_vec();
                items.push(new);
                changed = Some(items);
            }
            None => {}
        }
    }
    match changed {
        Some(items) => items.into(),
        None => Rc::clone(list),
    }
}

pub fn walk_chunk<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Chunk,
) -> NodeId {
    let block = rewriter.rewrite(ast, node.block);
    if block == node.block {
        return id;
    }
    rebuild(ast, id, NodeKind::Chunk(Chunk { block }))
}

pub fn walk_block<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Block,
) -> NodeId {
    let statements = rewriter.rewrite_list(ast, &node.statements);
    if same(&statements, &node.statements) {
        return id;
    }
    rebuild(ast, id, NodeKind::Block(Block { statements }))
}

pub fn walk_assignment<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Assignment,
) -> NodeId {
    let targets = rewriter.rewrite_list(ast, &node.targets);
    let values = rewriter.rewrite_list(ast, &node.values);
    if same(&targets, &node.targets) && same(&values, &node.values) {
        return id;
    }
    rebuild(ast, id, NodeKind::Assignment(Assignment { targets, values }))
}

pub fn walk_compound_assignment<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: CompoundAssignment,
) -> NodeId {
    let target = rewriter.rewrite(ast, node.target);
    let value = rewriter.rewrite(ast, node.value);
    if target == node.target && value == node.value {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::CompoundAssignment(CompoundAssignment {
            op: node.op,
            target,
            value,
        }),
    )
}

pub fn walk_local<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Local,
) -> NodeId {
    let names = rewriter.rewrite_list(ast, &node.names);
    let values = rewriter.rewrite_list(ast, &node.values);
    if same(&names, &node.names) && same(&values, &node.values) {
        return id;
    }
    rebuild(ast, id, NodeKind::Local(Local { names, values }))
}

pub fn walk_local_function<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: LocalFunction,
) -> NodeId {
    let name = rewriter.rewrite(ast, node.name);
    let params = rewriter.rewrite_list(ast, &node.params);
    let body = rewriter.rewrite(ast, node.body);
    if name == node.name && same(&params, &node.params) && body == node.body {
        return id;
    }
    rebuild(ast, id, NodeKind::LocalFunction(LocalFunction { name, params, body }))
}

pub fn walk_function<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Function,
) -> NodeId {
    let name = rewriter.rewrite(ast, node.name);
    let params = rewriter.rewrite_list(ast, &node.params);
    let body = rewriter.rewrite(ast, node.body);
    if name == node.name && same(&params, &node.params) && body == node.body {
        return id;
    }
    rebuild(ast, id, NodeKind::Function(Function { name, params, body }))
}

pub fn walk_return<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Return,
) -> NodeId {
    let values = rewriter.rewrite_list(ast, &node.values);
    if same(&values, &node.values) {
        return id;
    }
    rebuild(ast, id, NodeKind::Return(Return { values }))
}

pub fn walk_do<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Do,
) -> NodeId {
    let body = rewriter.rewrite(ast, node.body);
    if body == node.body {
        return id;
    }
    rebuild(ast, id, NodeKind::Do(Do { body }))
}

pub fn walk_if<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: If,
) -> NodeId {
    let condition = rewriter.rewrite(ast, node.condition);
    let body = rewriter.rewrite(ast, node.body);
    let else_ifs = rewriter.rewrite_list(ast, &node.else_ifs);
    let else_branch = walk_option(rewriter, ast, node.else_branch);
    if condition == node.condition
        && body == node.body
        && same(&else_ifs, &node.else_ifs)
        && else_branch == node.else_branch
    {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::If(If {
            condition,
            body,
            else_ifs,
            else_branch,
        }),
    )
}

pub fn walk_else_if<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: ElseIf,
) -> NodeId {
    let condition = rewriter.rewrite(ast, node.condition);
    let body = rewriter.rewrite(ast, node.body);
    if condition == node.condition && body == node.body {
        return id;
    }
    rebuild(ast, id, NodeKind::ElseIf(ElseIf { condition, body }))
}

pub fn walk_else<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Else,
) -> NodeId {
    let body = rewriter.rewrite(ast, node.body);
    if body == node.body {
        return id;
    }
    rebuild(ast, id, NodeKind::Else(Else { body }))
}

pub fn walk_while<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: While,
) -> NodeId {
    let condition = rewriter.rewrite(ast, node.condition);
    let body = rewriter.rewrite(ast, node.body);
    if condition == node.condition && body == node.body {
        return id;
    }
    rebuild(ast, id, NodeKind::While(While { condition, body }))
}

pub fn walk_repeat<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Repeat,
) -> NodeId {
    let body = rewriter.rewrite(ast, node.body);
    let condition = rewriter.rewrite(ast, node.condition);
    if body == node.body && condition == node.condition {
        return id;
    }
    rebuild(ast, id, NodeKind::Repeat(Repeat { body, condition }))
}

pub fn walk_for_numeric<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: ForNumeric,
) -> NodeId {
    let variable = rewriter.rewrite(ast, node.variable);
    let start = rewriter.rewrite(ast, node.start);
    let limit = rewriter.rewrite(ast, node.limit);
    let step = walk_option(rewriter, ast, node.step);
    let body = rewriter.rewrite(ast, node.body);
    if variable == node.variable
        && start == node.start
        && limit == node.limit
        && step == node.step
        && body == node.body
    {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::ForNumeric(ForNumeric {
            variable,
            start,
            limit,
            step,
            body,
        }),
    )
}

pub fn walk_for_generic<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: ForGeneric,
) -> NodeId {
    let names = rewriter.rewrite_list(ast, &node.names);
    let iterators = rewriter.rewrite_list(ast, &node.iterators);
    let body = rewriter.rewrite(ast, node.body);
    if same(&names, &node.names) && same(&iterators, &node.iterators) && body == node.body {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::ForGeneric(ForGeneric {
            names,
            iterators,
            body,
        }),
    )
}

pub fn walk_expression_statement<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: ExpressionStatement,
) -> NodeId {
    let expression = rewriter.rewrite(ast, node.expression);
    if expression == node.expression {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::ExpressionStatement(ExpressionStatement { expression }),
    )
}

pub fn walk_binary<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Binary,
) -> NodeId {
    let left = rewriter.rewrite(ast, node.left);
    let right = rewriter.rewrite(ast, node.right);
    if left == node.left && right == node.right {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::Binary(Binary {
            op: node.op,
            left,
            right,
        }),
    )
}

pub fn walk_unary<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Unary,
) -> NodeId {
    let operand = rewriter.rewrite(ast, node.operand);
    if operand == node.operand {
        return id;
    }
    rebuild(ast, id, NodeKind::Unary(Unary { op: node.op, operand }))
}

pub fn walk_paren<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: Paren,
) -> NodeId {
    let inner = rewriter.rewrite(ast, node.inner);
    if inner == node.inner {
        return id;
    }
    rebuild(ast, id, NodeKind::Paren(Paren { inner }))
}

pub fn walk_function_call<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: FunctionCall,
) -> NodeId {
    let callee = rewriter.rewrite(ast, node.callee);
    let args = rewriter.rewrite_list(ast, &node.args);
    if callee == node.callee && same(&args, &node.args) {
        return id;
    }
    rebuild(ast, id, NodeKind::FunctionCall(FunctionCall { callee, args }))
}

pub fn walk_method_call<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: MethodCall,
) -> NodeId {
    let receiver = rewriter.rewrite(ast, node.receiver);
    let method = rewriter.rewrite(ast, node.method);
    let args = rewriter.rewrite_list(ast, &node.args);
    if receiver == node.receiver && method == node.method && same(&args, &node.args) {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::MethodCall(MethodCall {
            receiver,
            method,
            args,
        }),
    )
}

pub fn walk_method_definition<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: MethodDefinition,
) -> NodeId {
    let receiver = rewriter.rewrite(ast, node.receiver);
    let method = rewriter.rewrite(ast, node.method);
    if receiver == node.receiver && method == node.method {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::MethodDefinition(MethodDefinition { receiver, method }),
    )
}

pub fn walk_table_access<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: TableAccess,
) -> NodeId {
    let table = rewriter.rewrite(ast, node.table);
    let key = rewriter.rewrite(ast, node.key);
    if table == node.table && key == node.key {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::TableAccess(TableAccess {
            table,
            key,
            style: node.style,
        }),
    )
}

pub fn walk_table_constructor<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: TableConstructor,
) -> NodeId {
    let fields = rewriter.rewrite_list(ast, &node.fields);
    if same(&fields, &node.fields) {
        return id;
    }
    rebuild(ast, id, NodeKind::TableConstructor(TableConstructor { fields }))
}

pub fn walk_table_field<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: TableField,
) -> NodeId {
    let key = walk_option(rewriter, ast, node.key);
    let value = rewriter.rewrite(ast, node.value);
    if key == node.key && value == node.value {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::TableField(TableField {
            key,
            value,
            style: node.style,
        }),
    )
}

pub fn walk_anonymous_function<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    ast: &mut Ast,
    id: NodeId,
    node: AnonymousFunction,
) -> NodeId {
    let params = rewriter.rewrite_list(ast, &node.params);
    let body = rewriter.rewrite(ast, node.body);
    if same(&params, &node.params) && body == node.body {
        return id;
    }
    rebuild(
        ast,
        id,
        NodeKind::AnonymousFunction(AnonymousFunction { params, body }),
    )
}
