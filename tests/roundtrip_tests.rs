// Integration tests: parse, regenerate, reparse

use luast::parser::ast::{structurally_equal, NodeKind};
use luast::parser::parse;
use luast::visit::{generate, CodegenOptions};

const PROGRAM: &str = r#"-- inventory module
local Inventory = {}
Inventory.__index = Inventory

local defaults = {"sword", 'shield', count = 3, [10] = true, nested = {1, 2}}

--[[ constructor ]]
function Inventory.new(owner, ...)
    local self = setmetatable({owner = owner, items = {...}}, Inventory)
    return self
end

function Inventory:add(item, amount) -- method
    self.items[item] = (self.items[item] or 0) + amount
end

local function score(n)
    if n < 0 then
        return -n
    elseif n == 0 then
        return nil
    else
        return n * 2 ^ -3
    end
end

for i = 10, 1, -1 do
    if i % 2 == 0 then continue end
    defaults.count += i
end

for name, value in pairs(defaults) do
    print(name, value, #name)
end

local count = 5
while count > 0 do
    count -= 1
    if count == 2 then break end
end

repeat
    count = count + 1
until not (count < 3) and count ~= 7

do
    local mask = 15 & 3 | 1 ~ 2 << 1 >> 1
    local text = "a" .. "b" .. 'c'
    local floor = 7 // 2
end

local negate = - -count
local apply = function(f, ...) return f(...) end
print(apply(score, 4), Inventory.new("bob"):add("gem", 1))
-- end of file
"#;

fn emit(source: &str, options: &CodegenOptions) -> String {
    let ast = parse(source).unwrap_or_else(|e| panic!("Parsing failed: {}\n{}", e, source));
    generate(&ast, ast.root(), options)
}

#[test]
fn test_regenerated_source_reparses_to_same_tree() {
    let original = parse(PROGRAM).unwrap();
    let text = generate(&original, original.root(), &CodegenOptions::default());
    let reparsed = parse(&text).unwrap_or_else(|e| panic!("Reparse failed: {}\n{}", e, text));

    assert!(structurally_equal(
        &original,
        original.root(),
        &reparsed,
        reparsed.root()
    ));
}

#[test]
fn test_generation_is_idempotent() {
    let options = CodegenOptions::default();
    let first = emit(PROGRAM, &options);
    let second = emit(&first, &options);
    assert_eq!(first, second);
}

#[test]
fn test_semicolon_mode_reparses_to_same_tree() {
    let options = CodegenOptions {
        semicolons: true,
        ..CodegenOptions::default()
    };
    let text = emit(PROGRAM, &options);
    assert!(text.contains("local Inventory = {};\n"));
    assert!(text.contains("\t\tbreak;\n"));

    let original = parse(PROGRAM).unwrap();
    let reparsed = parse(&text).unwrap();
    assert!(structurally_equal(
        &original,
        original.root(),
        &reparsed,
        reparsed.root()
    ));
}

#[test]
fn test_comments_survive_regeneration() {
    let text = emit(PROGRAM, &CodegenOptions::default());
    assert!(text.starts_with("-- inventory module\n"));
    assert!(text.contains("--[[ constructor ]]\nfunction Inventory.new(owner, ...)\n"));
    // a comment before the first statement of a body leads that statement
    assert!(text.contains("function Inventory:add(item, amount)\n\t-- method\n\tself.items"));
    assert!(text.ends_with("-- end of file\n"));

    let bare = emit(
        PROGRAM,
        &CodegenOptions {
            comments: false,
            ..CodegenOptions::default()
        },
    );
    assert!(!bare.contains("--"));
}

#[test]
fn test_regenerated_source_keeps_literal_spelling() {
    let text = emit(PROGRAM, &CodegenOptions::default());
    assert!(text.contains("{\"sword\", 'shield', count = 3, [10] = true, nested = {1, 2}}"));
    assert!(text.contains("local mask = 15 & 3 | 1 ~ 2 << 1 >> 1\n"));
    assert!(text.contains("local negate = - -count\n"));
    assert!(text.contains("return n * 2 ^ -3\n"));
    assert!(text.contains("until not (count < 3) and count ~= 7\n"));
}

#[test]
fn test_every_statement_kind_round_trips() {
    let ast = parse(PROGRAM).unwrap();
    let kinds: Vec<&str> = ast
        .descendants_and_self(ast.root())
        .into_iter()
        .map(|id| ast.kind(id).name())
        .collect();
    for expected in [
        "Chunk",
        "Local",
        "Assignment",
        "CompoundAssignment",
        "Function",
        "MethodDefinition",
        "LocalFunction",
        "If",
        "ElseIf",
        "Else",
        "ForNumeric",
        "ForGeneric",
        "While",
        "Repeat",
        "Do",
        "Break",
        "Continue",
        "Return",
        "VarArg",
        "AnonymousFunction",
        "MethodCall",
        "TableConstructor",
        "Paren",
    ] {
        assert!(kinds.contains(&expected), "missing {}", expected);
    }
    assert!(matches!(ast.kind(ast.root()), NodeKind::Chunk(_)));
}
