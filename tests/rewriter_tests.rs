// Integration tests for the structural-sharing rewriter

use luast::parser::ast::*;
use luast::parser::parse;
use luast::visit::rewriter::{walk_binary, walk_if};
use luast::visit::{generate, CodegenOptions, Rewriter};

const PROGRAM: &str = r#"
local total = 0
for i = 1, 10 do
    if i % 2 == 0 then
        total += i
    else
        print("odd", i)
    end
end
function report(label)
    return label .. ": " .. total
end
"#;

fn emit(ast: &Ast) -> String {
    generate(ast, ast.root(), &CodegenOptions::default())
}

struct Identity;
impl Rewriter for Identity {}

/// Replaces every string literal with `"Hello, World!"`.
struct HelloWorld;
impl Rewriter for HelloWorld {
    fn rewrite_literal(&mut self, ast: &mut Ast, id: NodeId, node: Literal) -> NodeId {
        match node.kind {
            LiteralKind::String { .. } => ast.string("Hello, World!"),
            _ => id,
        }
    }
}

/// Wraps every statement in `if true then ... end`.
struct IfWrapper;
impl Rewriter for IfWrapper {
    fn rewrite_block(&mut self, ast: &mut Ast, id: NodeId, node: Block) -> NodeId {
        let mut wrapped = Vec::with_capacity(node.statements.len());
        for &statement in node.statements.iter() {
            let inner = self.rewrite(ast, statement);
            let condition = ast.boolean(true);
            let body = ast.block(vec![inner]);
            wrapped.push(ast.if_statement(condition, body));
        }
        ast.rebuild(
            id,
            NodeKind::Block(Block {
                statements: wrapped.into(),
            }),
        )
    }
}

/// Folds `+` and `*` over integer literals, innermost first.
struct ConstantFolder;
impl Rewriter for ConstantFolder {
    fn rewrite_binary(&mut self, ast: &mut Ast, id: NodeId, node: Binary) -> NodeId {
        let id = walk_binary(self, ast, id, node);
        let NodeKind::Binary(folded) = ast.kind(id).clone() else {
            return id;
        };
        let left = integer(ast, folded.left);
        let right = integer(ast, folded.right);
        match (folded.op, left, right) {
            (BinOp::Add, Some(a), Some(b)) => ast.number((a + b).to_string()),
            (BinOp::Mul, Some(a), Some(b)) => ast.number((a * b).to_string()),
            _ => id,
        }
    }
}

fn integer(ast: &Ast, id: NodeId) -> Option<i64> {
    match ast.as_literal(id) {
        Some(Literal {
            value,
            kind: LiteralKind::Number,
        }) => value.parse().ok(),
        _ => None,
    }
}

/// Drops the else branch of every `if` whose condition is literally `true`.
struct DeadElse;
impl Rewriter for DeadElse {
    fn rewrite_if(&mut self, ast: &mut Ast, id: NodeId, node: If) -> NodeId {
        let always = matches!(
            ast.as_literal(node.condition),
            Some(Literal { kind: LiteralKind::Boolean, value }) if value == "true"
        );
        if !always || node.else_branch.is_none() {
            return walk_if(self, ast, id, node);
        }
        let body = self.rewrite(ast, node.body);
        ast.rebuild(
            id,
            NodeKind::If(If {
                condition: node.condition,
                body,
                else_ifs: node.else_ifs.clone(),
                else_branch: None,
            }),
        )
    }
}

#[test]
fn test_identity_rewriter_returns_same_root() {
    let mut ast = parse(PROGRAM).unwrap();
    let root = ast.root();
    let before = ast.len();

    assert_eq!(Identity.rewrite(&mut ast, root), root);
    assert_eq!(ast.len(), before);
}

#[test]
fn test_identity_rewriter_on_every_subtree() {
    let mut ast = parse(PROGRAM).unwrap();
    for id in ast.descendants_and_self(ast.root()) {
        assert_eq!(Identity.rewrite(&mut ast, id), id);
    }
}

#[test]
fn test_hello_world_rewrites_strings_only() {
    let mut ast = parse(PROGRAM).unwrap();
    let old_root = ast.root();
    let old_statements = ast.top_level_statements();

    ast.rewrite_root(&mut HelloWorld);
    assert_ne!(ast.root(), old_root);

    let statements = ast.top_level_statements();
    // `local total = 0` has no strings and is shared as-is
    assert_eq!(statements[0], old_statements[0]);
    assert_ne!(statements[1], old_statements[1]);
    assert_ne!(statements[2], old_statements[2]);

    let text = emit(&ast);
    assert!(text.contains("print(\"Hello, World!\", i)"));
    assert!(text.contains("return label .. \"Hello, World!\" .. total"));
    assert!(!text.contains("odd"));
}

#[test]
fn test_if_wrapper_nests_every_statement() {
    let mut ast = parse("x = 1\nwhile x do\n\tx -= 1\nend").unwrap();
    let assignment = ast.top_level_statements()[0];
    ast.rewrite_root(&mut IfWrapper);

    assert_eq!(
        emit(&ast),
        "if true then\n\tx = 1\nend\n\
         if true then\n\twhile x do\n\t\tif true then\n\t\t\tx -= 1\n\t\tend\n\tend\nend\n"
    );

    // the original statement node moved into the new if body
    let wrapper = ast.nearest_ancestor(assignment, |k| matches!(k, NodeKind::If(_)));
    assert_eq!(wrapper, Some(ast.top_level_statements()[0]));
    assert!(parse(&emit(&ast)).is_ok());
}

#[test]
fn test_constant_folder() {
    let mut ast = parse("local x = 1 + 2 * 3\nprint(y + 1)").unwrap();
    let call = ast.top_level_statements()[1];
    ast.rewrite_root(&mut ConstantFolder);

    assert_eq!(emit(&ast), "local x = 7\nprint(y + 1)\n");
    assert_eq!(ast.top_level_statements()[1], call);
}

#[test]
fn test_rewrite_keeps_untouched_else_if_list() {
    let mut ast = parse("if true then a() elseif b then c() else d() end").unwrap();
    let (old_else_ifs, old_body) = match ast.kind(ast.top_level_statements()[0]) {
        NodeKind::If(n) => (n.else_ifs.clone(), n.body),
        _ => panic!("Expected if statement"),
    };

    ast.rewrite_root(&mut DeadElse);
    match ast.kind(ast.top_level_statements()[0]) {
        NodeKind::If(n) => {
            assert!(std::rc::Rc::ptr_eq(&n.else_ifs, &old_else_ifs));
            assert_eq!(n.body, old_body);
            assert_eq!(n.else_branch, None);
        }
        other => panic!("Expected if statement, got {}", other.name()),
    }
    assert_eq!(emit(&ast), "if true then\n\ta()\nelseif b then\n\tc()\nend\n");
}

#[test]
fn test_rewriter_is_object_safe() {
    let mut ast = parse("print('x')").unwrap();
    let root = ast.root();
    let mut rewriters: Vec<Box<dyn Rewriter>> = vec![Box::new(Identity), Box::new(HelloWorld)];
    let results: Vec<NodeId> = rewriters
        .iter_mut()
        .map(|r| r.rewrite(&mut ast, root))
        .collect();
    assert_eq!(results[0], root);
    assert_ne!(results[1], root);
}
