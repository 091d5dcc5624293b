//! AST node model
//!
//! Nodes live in an [`Ast`] arena and refer to each other through [`NodeId`]
//! handles. Every node kind is a variant of the closed [`NodeKind`] enum; the
//! composite kinds carry a payload struct holding their child handles.
//!
//! # Ownership
//!
//! [`Ast::alloc`] is the only way to create a node. Allocation *adopts* every
//! child named by the new payload: the child's parent link is set to the new
//! node, replacing whatever parent it had before. A node therefore has at most
//! one parent at any time, and the parent link only changes when a composite
//! that names it is allocated.
//!
//! Ordered child lists are stored as [`NodeList`] (`Rc<[NodeId]>`) so that a
//! rewriter can hand back the very same list instance when nothing in it changed.

use std::fmt;
use std::rc::Rc;

/// 1-based line/column pair. `(0, 0)` marks a synthetic location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open byte range into the source plus the matching line/column positions.
///
/// `end` is the position just past the last character covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start_offset: usize,
    pub end_offset: usize,
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start_offset: usize, end_offset: usize, start: Position, end: Position) -> Self {
        Self {
            start_offset,
            end_offset,
            start,
            end,
        }
    }

    /// Span from the start of `self` to the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start_offset: self.start_offset,
            end_offset: other.end_offset,
            start: self.start,
            end: other.end,
        }
    }

    /// True for spans of nodes built by hand rather than by the parser.
    pub fn is_synthetic(&self) -> bool {
        self.start.line == 0
    }

    pub fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the 1-based `line` falls inside this span.
    pub fn covers_line(&self, line: usize) -> bool {
        !self.is_synthetic() && self.start.line <= line && line <= self.end.line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `-- text`
    Line,
    /// `--[[ text ]]`
    Block,
}

/// A skipped comment, kept as trivia on a neighbouring node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Text between the delimiters, untrimmed.
    pub text: String,
    pub span: Span,
}

/// Handle to a node inside an [`Ast`].
///
/// An arena holds at most `u32::MAX` nodes; allocating past that panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered child list; compared by identity in the rewriter.
pub type NodeList = Rc<[NodeId]>;

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

/// Binding power of unary operators, between multiplicative and `^`.
pub const UNARY_PRECEDENCE: u8 = 11;

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Eq => "==",
            BinOp::Ne => "~=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::BitOr => "|",
            BinOp::BitXor => "~",
            BinOp::BitAnd => "&",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Concat => "..",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
        }
    }

    /// Level on the precedence ladder; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 3,
            BinOp::BitOr => 4,
            BinOp::BitXor => 5,
            BinOp::BitAnd => 6,
            BinOp::Shl | BinOp::Shr => 7,
            BinOp::Concat => 8,
            BinOp::Add | BinOp::Sub => 9,
            BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod => 10,
            BinOp::Pow => 12,
        }
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, BinOp::Concat | BinOp::Pow)
    }

    /// Relational operators do not chain.
    pub fn is_relational(self) -> bool {
        self.precedence() == 3
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Not,
    Neg,
    Len,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Not => "not",
            UnOp::Neg => "-",
            UnOp::Len => "#",
        }
    }
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Number,
    /// Remembers the quote character so generated source can reuse it.
    String { quote: char },
    Boolean,
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessStyle {
    /// `t.name`
    Dot,
    /// `t[expr]`
    Bracket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldStyle {
    /// `expr`
    Positional,
    /// `name = expr`
    Named,
    /// `[expr] = expr`
    Bracketed,
}

// ===== Payloads =====

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub block: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: NodeList,
}

/// `a, b.c = 1, 2`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub targets: NodeList,
    pub values: NodeList,
}

/// `target op= value` with `op` one of `+ - * / %`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAssignment {
    pub op: BinOp,
    pub target: NodeId,
    pub value: NodeId,
}

/// `local a, b = 1, 2`; `values` is empty without `=`.
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub names: NodeList,
    pub values: NodeList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalFunction {
    pub name: NodeId,
    pub params: NodeList,
    pub body: NodeId,
}

/// `function a.b:c() end`; `name` is an Identifier, a TableAccess chain or a
/// MethodDefinition.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: NodeId,
    pub params: NodeList,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub values: NodeList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Do {
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: NodeId,
    pub body: NodeId,
    pub else_ifs: NodeList,
    pub else_branch: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub condition: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub body: NodeId,
    pub condition: NodeId,
}

/// `for variable = start, limit[, step] do body end`
#[derive(Debug, Clone, PartialEq)]
pub struct ForNumeric {
    pub variable: NodeId,
    pub start: NodeId,
    pub limit: NodeId,
    pub step: Option<NodeId>,
    pub body: NodeId,
}

/// `for names in iterators do body end`
#[derive(Debug, Clone, PartialEq)]
pub struct ForGeneric {
    pub names: NodeList,
    pub iterators: NodeList,
    pub body: NodeId,
}

/// A call used as a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
}

/// Raw literal text. Strings keep their escapes but lose their quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: String,
    pub kind: LiteralKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinOp,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnOp,
    pub operand: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paren {
    pub inner: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: NodeId,
    pub args: NodeList,
}

/// `receiver:method(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub receiver: NodeId,
    pub method: NodeId,
    pub args: NodeList,
}

/// The `a.b:c` name of `function a.b:c() end`, which receives an implicit `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub receiver: NodeId,
    pub method: NodeId,
}

/// `table[key]`; for the dot form the key is an Identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAccess {
    pub table: NodeId,
    pub key: NodeId,
    pub style: AccessStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConstructor {
    pub fields: NodeList,
}

/// One entry of a table constructor; positional fields have no key.
#[derive(Debug, Clone, PartialEq)]
pub struct TableField {
    pub key: Option<NodeId>,
    pub value: NodeId,
    pub style: FieldStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousFunction {
    pub params: NodeList,
    pub body: NodeId,
}

/// Every kind of node, statements first.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Chunk(Chunk),
    Block(Block),
    Assignment(Assignment),
    CompoundAssignment(CompoundAssignment),
    Local(Local),
    LocalFunction(LocalFunction),
    Function(Function),
    Return(Return),
    Break,
    Continue,
    Do(Do),
    If(If),
    ElseIf(ElseIf),
    Else(Else),
    While(While),
    Repeat(Repeat),
    ForNumeric(ForNumeric),
    ForGeneric(ForGeneric),
    ExpressionStatement(ExpressionStatement),

    Identifier(Identifier),
    Literal(Literal),
    Binary(Binary),
    Unary(Unary),
    Paren(Paren),
    VarArg,
    FunctionCall(FunctionCall),
    MethodCall(MethodCall),
    MethodDefinition(MethodDefinition),
    TableAccess(TableAccess),
    TableConstructor(TableConstructor),
    TableField(TableField),
    AnonymousFunction(AnonymousFunction),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Chunk(_) => "Chunk",
            NodeKind::Block(_) => "Block",
            NodeKind::Assignment(_) => "Assignment",
            NodeKind::CompoundAssignment(_) => "CompoundAssignment",
            NodeKind::Local(_) => "Local",
            NodeKind::LocalFunction(_) => "LocalFunction",
            NodeKind::Function(_) => "Function",
            NodeKind::Return(_) => "Return",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::Do(_) => "Do",
            NodeKind::If(_) => "If",
            NodeKind::ElseIf(_) => "ElseIf",
            NodeKind::Else(_) => "Else",
            NodeKind::While(_) => "While",
            NodeKind::Repeat(_) => "Repeat",
            NodeKind::ForNumeric(_) => "ForNumeric",
            NodeKind::ForGeneric(_) => "ForGeneric",
            NodeKind::ExpressionStatement(_) => "ExpressionStatement",
            NodeKind::Identifier(_) => "Identifier",
            NodeKind::Literal(_) => "Literal",
            NodeKind::Binary(_) => "Binary",
            NodeKind::Unary(_) => "Unary",
            NodeKind::Paren(_) => "Paren",
            NodeKind::VarArg => "VarArg",
            NodeKind::FunctionCall(_) => "FunctionCall",
            NodeKind::MethodCall(_) => "MethodCall",
            NodeKind::MethodDefinition(_) => "MethodDefinition",
            NodeKind::TableAccess(_) => "TableAccess",
            NodeKind::TableConstructor(_) => "TableConstructor",
            NodeKind::TableField(_) => "TableField",
            NodeKind::AnonymousFunction(_) => "AnonymousFunction",
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier(_)
                | NodeKind::Literal(_)
                | NodeKind::Binary(_)
                | NodeKind::Unary(_)
                | NodeKind::Paren(_)
                | NodeKind::VarArg
                | NodeKind::FunctionCall(_)
                | NodeKind::MethodCall(_)
                | NodeKind::MethodDefinition(_)
                | NodeKind::TableAccess(_)
                | NodeKind::TableConstructor(_)
                | NodeKind::TableField(_)
                | NodeKind::AnonymousFunction(_)
        )
    }

    /// Statements proper; Chunk, Block and the if-chain clauses are neither
    /// statements nor expressions.
    pub fn is_statement(&self) -> bool {
        !self.is_expression()
            && !matches!(
                self,
                NodeKind::Chunk(_) | NodeKind::Block(_) | NodeKind::ElseIf(_) | NodeKind::Else(_)
            )
    }

    /// Children in source order. Derived from the payload on every call.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::Chunk(n) => out.push(n.block),
            NodeKind::Block(n) => out.extend_from_slice(&n.statements),
            NodeKind::Assignment(n) => {
                out.extend_from_slice(&n.targets);
                out.extend_from_slice(&n.values);
            }
            NodeKind::CompoundAssignment(n) => {
                out.push(n.target);
                out.push(n.value);
            }
            NodeKind::Local(n) => {
                out.extend_from_slice(&n.names);
                out.extend_from_slice(&n.values);
            }
            NodeKind::LocalFunction(n) => {
                out.push(n.name);
                out.extend_from_slice(&n.params);
                out.push(n.body);
            }
            NodeKind::Function(n) => {
                out.push(n.name);
                out.extend_from_slice(&n.params);
                out.push(n.body);
            }
            NodeKind::Return(n) => out.extend_from_slice(&n.values),
            NodeKind::Do(n) => out.push(n.body),
            NodeKind::If(n) => {
                out.push(n.condition);
                out.push(n.body);
                out.extend_from_slice(&n.else_ifs);
                out.extend(n.else_branch);
            }
            NodeKind::ElseIf(n) => {
                out.push(n.condition);
                out.push(n.body);
            }
            NodeKind::Else(n) => out.push(n.body),
            NodeKind::While(n) => {
                out.push(n.condition);
                out.push(n.body);
            }
            NodeKind::Repeat(n) => {
                out.push(n.body);
                out.push(n.condition);
            }
            NodeKind::ForNumeric(n) => {
                out.push(n.variable);
                out.push(n.start);
                out.push(n.limit);
                out.extend(n.step);
                out.push(n.body);
            }
            NodeKind::ForGeneric(n) => {
                out.extend_from_slice(&n.names);
                out.extend_from_slice(&n.iterators);
                out.push(n.body);
            }
            NodeKind::ExpressionStatement(n) => out.push(n.expression),
            NodeKind::Binary(n) => {
                out.push(n.left);
                out.push(n.right);
            }
            NodeKind::Unary(n) => out.push(n.operand),
            NodeKind::Paren(n) => out.push(n.inner),
            NodeKind::FunctionCall(n) => {
                out.push(n.callee);
                out.extend_from_slice(&n.args);
            }
            NodeKind::MethodCall(n) => {
                out.push(n.receiver);
                out.push(n.method);
                out.extend_from_slice(&n.args);
            }
            NodeKind::MethodDefinition(n) => {
                out.push(n.receiver);
                out.push(n.method);
            }
            NodeKind::TableAccess(n) => {
                out.push(n.table);
                out.push(n.key);
            }
            NodeKind::TableConstructor(n) => out.extend_from_slice(&n.fields),
            NodeKind::TableField(n) => {
                out.extend(n.key);
                out.push(n.value);
            }
            NodeKind::AnonymousFunction(n) => {
                out.extend_from_slice(&n.params);
                out.push(n.body);
            }
            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Identifier(_)
            | NodeKind::Literal(_)
            | NodeKind::VarArg => {}
        }
        out
    }

    /// Compares everything except child handles.
    fn same_shape(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::Identifier(a), NodeKind::Identifier(b)) => a.name == b.name,
            (NodeKind::Literal(a), NodeKind::Literal(b)) => a == b,
            (NodeKind::Binary(a), NodeKind::Binary(b)) => a.op == b.op,
            (NodeKind::Unary(a), NodeKind::Unary(b)) => a.op == b.op,
            (NodeKind::CompoundAssignment(a), NodeKind::CompoundAssignment(b)) => a.op == b.op,
            (NodeKind::TableAccess(a), NodeKind::TableAccess(b)) => a.style == b.style,
            (NodeKind::TableField(a), NodeKind::TableField(b)) => a.style == b.style,
            (NodeKind::ForNumeric(a), NodeKind::ForNumeric(b)) => {
                a.step.is_some() == b.step.is_some()
            }
            (NodeKind::Assignment(a), NodeKind::Assignment(b)) => {
                a.targets.len() == b.targets.len()
            }
            (NodeKind::Local(a), NodeKind::Local(b)) => a.names.len() == b.names.len(),
            (NodeKind::ForGeneric(a), NodeKind::ForGeneric(b)) => a.names.len() == b.names.len(),
            (NodeKind::Function(a), NodeKind::Function(b)) => a.params.len() == b.params.len(),
            (NodeKind::LocalFunction(a), NodeKind::LocalFunction(b)) => {
                a.params.len() == b.params.len()
            }
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub leading_comments: Vec<Comment>,
    pub trailing_comments: Vec<Comment>,
    parent: Option<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena holding every node of one or more trees.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl std::ops::Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and adopt its children.
    ///
    /// A child may appear only once in `kind`; debug builds assert this.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u32::MAX` nodes.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.alloc_with_comments(kind, span, Vec::new(), Vec::new())
    }

    pub fn alloc_with_comments(
        &mut self,
        kind: NodeKind,
        span: Span,
        leading_comments: Vec<Comment>,
        trailing_comments: Vec<Comment>,
    ) -> NodeId {
        let id = match u32::try_from(self.nodes.len()) {
            Ok(index) if index < u32::MAX => NodeId(index),
            _ => panic!("syntax tree arena is full ({} nodes)", self.nodes.len()),
        };
        let children = kind.children();
        debug_assert!(
            children
                .iter()
                .enumerate()
                .all(|(i, child)| !children[..i].contains(child)),
            "node {} would adopt the same child twice",
            id
        );
        for child in children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            span,
            leading_comments,
            trailing_comments,
            parent: None,
        });
        id
    }

    /// Allocate a replacement for `original` carrying its span and comments.
    pub fn rebuild(&mut self, original: NodeId, kind: NodeKind) -> NodeId {
        let source = &self.nodes[original.index()];
        let span = source.span;
        let leading = source.leading_comments.clone();
        let trailing = source.trailing_comments.clone();
        self.alloc_with_comments(kind, span, leading, trailing)
    }

    pub(crate) fn attach_comments(
        &mut self,
        id: NodeId,
        leading: Vec<Comment>,
        trailing: Vec<Comment>,
    ) {
        let node = &mut self.nodes[id.index()];
        node.leading_comments.extend(leading);
        node.trailing_comments.extend(trailing);
    }

    /// The tree's entry point; the Chunk for parsed sources.
    ///
    /// # Panics
    ///
    /// If no root has been recorded with [`Ast::set_root`].
    pub fn root(&self) -> NodeId {
        match self.root {
            Some(root) => root,
            None => panic!("Ast has no root node"),
        }
    }

    pub fn try_root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self[id].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self[id].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self[id].kind.children()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// All slots in allocation order, reachable or not.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            // alloc keeps every index below u32::MAX
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn as_identifier(&self, id: NodeId) -> Option<&Identifier> {
        match self.kind(id) {
            NodeKind::Identifier(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn as_literal(&self, id: NodeId) -> Option<&Literal> {
        match self.kind(id) {
            NodeKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_block(&self, id: NodeId) -> Option<&Block> {
        match self.kind(id) {
            NodeKind::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Statements of the root chunk's block.
    pub fn top_level_statements(&self) -> NodeList {
        let block = match self.kind(self.root()) {
            NodeKind::Chunk(chunk) => chunk.block,
            _ => self.root(),
        };
        match self.as_block(block) {
            Some(block) => Rc::clone(&block.statements),
            None => Rc::from(Vec::new()),
        }
    }
}

// ===== Navigation =====

impl Ast {
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Topmost ancestor, or `id` itself when it has no parent.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    pub fn nearest_ancestor(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.ancestors(id).find(|&a| pred(self.kind(a)))
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        siblings.get(index + 1).copied()
    }

    /// Pre-order descendants, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = self.descendants_and_self(id);
        out.remove(0);
        out
    }

    /// Pre-order traversal starting at `id`.
    pub fn descendants_and_self(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    pub fn descendants_where(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&d| pred(self.kind(d)))
            .collect()
    }
}

// ===== Synthetic node builders =====

impl Ast {
    pub fn identifier(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(
            NodeKind::Identifier(Identifier { name: name.into() }),
            Span::default(),
        )
    }

    pub fn number(&mut self, text: impl Into<String>) -> NodeId {
        self.literal(text.into(), LiteralKind::Number)
    }

    /// Double-quoted string literal; `text` is used verbatim between the quotes.
    pub fn string(&mut self, text: impl Into<String>) -> NodeId {
        self.literal(text.into(), LiteralKind::String { quote: '"' })
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.literal(value.to_string(), LiteralKind::Boolean)
    }

    pub fn nil(&mut self) -> NodeId {
        self.literal("nil".to_string(), LiteralKind::Nil)
    }

    fn literal(&mut self, value: String, kind: LiteralKind) -> NodeId {
        self.alloc(NodeKind::Literal(Literal { value, kind }), Span::default())
    }

    pub fn binary(&mut self, op: BinOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::Binary(Binary { op, left, right }), Span::default())
    }

    pub fn unary(&mut self, op: UnOp, operand: NodeId) -> NodeId {
        self.alloc(NodeKind::Unary(Unary { op, operand }), Span::default())
    }

    pub fn paren(&mut self, inner: NodeId) -> NodeId {
        self.alloc(NodeKind::Paren(Paren { inner }), Span::default())
    }

    pub fn call(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        self.alloc(
            NodeKind::FunctionCall(FunctionCall {
                callee,
                args: args.into(),
            }),
            Span::default(),
        )
    }

    /// `table.name`
    pub fn field(&mut self, table: NodeId, name: impl Into<String>) -> NodeId {
        let key = self.identifier(name);
        self.alloc(
            NodeKind::TableAccess(TableAccess {
                table,
                key,
                style: AccessStyle::Dot,
            }),
            Span::default(),
        )
    }

    /// `table[key]`
    pub fn index(&mut self, table: NodeId, key: NodeId) -> NodeId {
        self.alloc(
            NodeKind::TableAccess(TableAccess {
                table,
                key,
                style: AccessStyle::Bracket,
            }),
            Span::default(),
        )
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.alloc(
            NodeKind::Block(Block {
                statements: statements.into(),
            }),
            Span::default(),
        )
    }

    pub fn expression_statement(&mut self, expression: NodeId) -> NodeId {
        self.alloc(
            NodeKind::ExpressionStatement(ExpressionStatement { expression }),
            Span::default(),
        )
    }

    pub fn assignment(&mut self, targets: Vec<NodeId>, values: Vec<NodeId>) -> NodeId {
        self.alloc(
            NodeKind::Assignment(Assignment {
                targets: targets.into(),
                values: values.into(),
            }),
            Span::default(),
        )
    }

    pub fn local(&mut self, names: Vec<NodeId>, values: Vec<NodeId>) -> NodeId {
        self.alloc(
            NodeKind::Local(Local {
                names: names.into(),
                values: values.into(),
            }),
            Span::default(),
        )
    }

    pub fn return_statement(&mut self, values: Vec<NodeId>) -> NodeId {
        self.alloc(
            NodeKind::Return(Return {
                values: values.into(),
            }),
            Span::default(),
        )
    }

    /// `if condition then body end` with no else branches.
    pub fn if_statement(&mut self, condition: NodeId, body: NodeId) -> NodeId {
        self.alloc(
            NodeKind::If(If {
                condition,
                body,
                else_ifs: Rc::from(Vec::new()),
                else_branch: None,
            }),
            Span::default(),
        )
    }

    pub fn do_statement(&mut self, body: NodeId) -> NodeId {
        self.alloc(NodeKind::Do(Do { body }), Span::default())
    }

    pub fn chunk(&mut self, block: NodeId) -> NodeId {
        self.alloc(NodeKind::Chunk(Chunk { block }), Span::default())
    }
}

/// Compare two subtrees by kind, operators, names and literal values.
///
/// Spans, comments, parent links and handle values are ignored, so the two
/// subtrees may live in different arenas.
pub fn structurally_equal(a: &Ast, a_id: NodeId, b: &Ast, b_id: NodeId) -> bool {
    let (left, right) = (a.kind(a_id), b.kind(b_id));
    if !left.same_shape(right) {
        return false;
    }
    let (left_children, right_children) = (left.children(), right.children());
    left_children.len() == right_children.len()
        && left_children
            .iter()
            .zip(&right_children)
            .all(|(&x, &y)| structurally_equal(a, x, b, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(ast: &mut Ast) -> (NodeId, NodeId, NodeId) {
        let one = ast.number("1");
        let two = ast.number("2");
        let sum = ast.binary(BinOp::Add, one, two);
        let stmt = ast.return_statement(vec![sum]);
        let block = ast.block(vec![stmt]);
        let chunk = ast.chunk(block);
        ast.set_root(chunk);
        (one, two, sum)
    }

    fn sample() -> (Ast, NodeId, NodeId, NodeId) {
        let mut ast = Ast::new();
        let (one, two, sum) = build(&mut ast);
        (ast, one, two, sum)
    }

    #[test]
    fn test_alloc_adopts_children() {
        let (ast, one, two, sum) = sample();
        assert_eq!(ast.parent(one), Some(sum));
        assert_eq!(ast.parent(two), Some(sum));
        assert_eq!(ast.children(sum), vec![one, two]);
        assert_eq!(ast.child_count(one), 0);
        assert_eq!(ast.parent(ast.root()), None);
    }

    #[test]
    fn test_readoption_moves_parent() {
        let (mut ast, one, two, sum) = sample();
        let neg = ast.unary(UnOp::Neg, one);
        assert_eq!(ast.parent(one), Some(neg));
        // the old composite still names the child but no longer owns it
        assert_eq!(ast.children(sum), vec![one, two]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "the same child twice")]
    fn test_alloc_rejects_duplicate_child() {
        let mut ast = Ast::new();
        let one = ast.number("1");
        ast.binary(BinOp::Add, one, one);
    }

    #[test]
    fn test_node_ids_follow_allocation_order() {
        let (ast, one, two, _) = sample();
        assert_eq!(one.index(), 0);
        assert_eq!(two.index(), 1);
        let ids: Vec<NodeId> = ast.iter().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), ast.len());
        assert_eq!(ids[1], two);
    }

    #[test]
    fn test_navigation() {
        let (ast, one, two, sum) = sample();
        assert_eq!(ast.index_in_parent(two), Some(1));
        assert_eq!(ast.previous_sibling(two), Some(one));
        assert_eq!(ast.next_sibling(one), Some(two));
        assert_eq!(ast.next_sibling(two), None);
        assert_eq!(ast.root_of(one), ast.root());
        assert_eq!(ast.ancestors(one).count(), 4);
        let ret = ast.nearest_ancestor(one, |k| matches!(k, NodeKind::Return(_)));
        assert_eq!(ast.parent(sum), ret);
    }

    #[test]
    fn test_descendants_preorder() {
        let (ast, one, two, sum) = sample();
        let all = ast.descendants_and_self(ast.root());
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], ast.root());
        assert_eq!(&all[3..], &[sum, one, two]);
        let literals = ast.descendants_where(ast.root(), |k| matches!(k, NodeKind::Literal(_)));
        assert_eq!(literals, vec![one, two]);
        assert!(ast.descendants(one).is_empty());
    }

    #[test]
    fn test_structural_equality_ignores_handles() {
        let (a, _, _, a_sum) = sample();
        let mut b = Ast::new();
        b.identifier("padding");
        build(&mut b);
        assert!(structurally_equal(&a, a.root(), &b, b.root()));

        let mut c = Ast::new();
        let one = c.number("1");
        let two = c.number("2");
        let product = c.binary(BinOp::Mul, one, two);
        assert!(!structurally_equal(&a, a_sum, &c, product));
        let swapped = c.binary(BinOp::Add, two, one);
        assert!(!structurally_equal(&a, a_sum, &c, swapped));
    }

    #[test]
    fn test_precedence_ladder() {
        assert!(BinOp::Or.precedence() < BinOp::And.precedence());
        assert!(BinOp::Concat.precedence() < BinOp::Add.precedence());
        assert!(BinOp::Mod.precedence() < UNARY_PRECEDENCE);
        assert!(UNARY_PRECEDENCE < BinOp::Pow.precedence());
        assert!(BinOp::Le.is_relational());
        assert!(BinOp::Concat.is_right_associative());
        assert!(!BinOp::Sub.is_right_associative());
    }
}
