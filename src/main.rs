// luast: Lua/Luau syntax tree explorer

use std::fs;
use std::io;
use std::path::Path;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use luast::parser::lexer::Lexer;
use luast::parser::parse;
use luast::ui::App;
use luast::visit::{generate, outline, CodegenOptions, OutlineOptions};

/// What to do with the parsed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Explore,
    Tokens,
    Outline,
    Emit { semicolons: bool },
}

fn usage(program_name: &str) {
    eprintln!("Usage: {} [--tokens | --outline | --emit [--semicolons]] <file.lua>", program_name);
    eprintln!();
    eprintln!("Modes:");
    eprintln!("  (none)        Open the interactive syntax tree explorer");
    eprintln!("  --tokens      Print the token stream");
    eprintln!("  --outline     Print the syntax tree with source positions");
    eprintln!("  --emit        Print source regenerated from the syntax tree");
    eprintln!("  --semicolons  With --emit, terminate every statement with ';'");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("luast");

    let mut mode = Mode::Explore;
    let mut semicolons = false;
    let mut file = None;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--tokens" => mode = Mode::Tokens,
            "--outline" => mode = Mode::Outline,
            "--emit" => mode = Mode::Emit { semicolons: false },
            "--semicolons" => semicolons = true,
            "-h" | "--help" => {
                usage(program_name);
                return Ok(());
            }
            flag if flag.starts_with("--") => {
                eprintln!("Error: Unknown option '{}'", flag);
                usage(program_name);
                std::process::exit(1);
            }
            path => file = Some(path),
        }
    }
    if let Mode::Emit { .. } = mode {
        mode = Mode::Emit { semicolons };
    }

    let Some(file) = file else {
        eprintln!("Error: No input file provided");
        eprintln!();
        usage(program_name);
        std::process::exit(1);
    };

    if !Path::new(file).exists() {
        eprintln!("Error: File '{}' not found", file);
        std::process::exit(1);
    }

    let source = fs::read_to_string(file)?;

    if mode == Mode::Tokens {
        for token in Lexer::new(&source).tokenize() {
            let position = token.span.start.to_string();
            let kind = format!("{:?}", token.kind);
            println!("{:>7}  {:<12} {}", position, kind, token.lexeme);
        }
        return Ok(());
    }

    let ast = match parse(&source) {
        Ok(ast) => ast,
        Err(e) => {
            eprintln!("Parser error: {}", e);
            std::process::exit(1);
        }
    };

    match mode {
        Mode::Outline => {
            print!("{}", outline(&ast, ast.root(), &OutlineOptions { spans: true }));
            return Ok(());
        }
        Mode::Emit { semicolons } => {
            let options = CodegenOptions {
                semicolons,
                ..CodegenOptions::default()
            };
            print!("{}", generate(&ast, ast.root(), &options));
            return Ok(());
        }
        Mode::Explore | Mode::Tokens => {}
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(ast, source);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
