use std::io::{BufRead, BufReader, IsTerminal};

use bumpalo::Bump;
use clap::Parser;
use indexmap::IndexMap;
use miette::{IntoDiagnostic, Result};
use reedline::{
    default_emacs_keybindings, DefaultCompleter, DefaultPrompt, DefaultPromptSegment, Emacs,
    ExampleHighlighter, Reedline, Signal,
};
use skerry_core::api::{Context, Engine};
use tracing_subscriber::EnvFilter;

/// Skerry - sandboxed expression evaluation and templating
#[derive(Parser, Debug)]
#[command(name = "skerry")]
#[command(about = "Evaluate Skerry expressions and templates", long_about = None)]
struct Args {
    /// JSON file whose top-level keys become context variables
    #[arg(long, short = 'c')]
    context: Option<std::path::PathBuf>,

    /// JSON file of type-registry entries: name to { schema, serialization }
    #[arg(long, short = 't')]
    types: Option<std::path::PathBuf>,

    /// Print the parsed node tree (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Print referenced context roots instead of evaluating
    #[arg(long)]
    deps: bool,

    /// Skip the security validator
    #[arg(long)]
    no_strict: bool,

    /// Expression or template to evaluate (if not provided, reads from stdin)
    expression: Option<String>,
}

fn load_context(args: &Args) -> Result<Context> {
    let Some(path) = &args.context else {
        return Ok(Context::new());
    };
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    let json: serde_json::Value = serde_json::from_str(&text).into_diagnostic()?;
    Context::from_json(json)
        .ok_or_else(|| miette::miette!("context file must contain a JSON object"))
}

/// Register type entries from a JSON file shaped as
/// `{ "Name": { "schema": {...}, "serialization": "json" }, ... }`.
/// Entries register in document order, so later entries win detection.
fn load_types(engine: &mut Engine<'_>, args: &Args) -> Result<()> {
    let Some(path) = &args.types else {
        return Ok(());
    };
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    let configs: IndexMap<String, skerry_core::types::TypeConfig> =
        serde_json::from_str(&text).into_diagnostic()?;
    for (name, config) in configs {
        engine.register_type(name, config);
    }
    Ok(())
}

fn setup_reedline(engine: &Engine<'_>) -> (Reedline, DefaultPrompt) {
    // complete on registered function names
    let commands: Vec<String> = engine.list_functions(None);

    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['.', '_', '$']);
        completions.insert(commands.clone());
        completions
    });

    let edit_mode = Box::new(Emacs::new(default_emacs_keybindings()));

    let line_editor = Reedline::create()
        .with_highlighter(Box::new(ExampleHighlighter::new(commands)))
        .with_completer(completer)
        .with_edit_mode(edit_mode);

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("skerry".to_string()),
        DefaultPromptSegment::Empty,
    );

    (line_editor, prompt)
}

fn interpret_input(engine: &Engine<'_>, ctx: &Context, input: &str, args: &Args) {
    let input = input.trim();
    if input.is_empty() {
        return;
    }

    if args.debug_parse {
        match engine.parse(input) {
            Ok(parsed) => {
                println!("=== Parsed tree ===");
                println!("{:#?}", parsed.root);
                println!(
                    "complexity {} / depth {} / simple {}",
                    parsed.complexity, parsed.depth, parsed.is_simple
                );
                println!();
            }
            Err(e) => {
                eprintln!("Parse error: {}", e);
                return;
            }
        }
    }

    if args.deps {
        match engine.extract_dependencies(input) {
            Ok(deps) => println!("{}", deps.join(", ")),
            Err(e) => eprintln!("{}", e),
        }
        return;
    }

    match engine.evaluate(input, ctx) {
        Ok(out) => match &out.value {
            v @ (skerry_core::Value::Array(_) | skerry_core::Value::Object(_)) => {
                println!("{}", serde_json::to_string(&v.to_json()).unwrap_or_default())
            }
            v => println!("{}", v),
        },
        Err(e) => eprintln!("[{}] {}", e.kind().as_str(), e),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let arena = Bump::new();
    let mut options = skerry_core::EngineOptions::default();
    options.strict = !args.no_strict;
    let mut engine = Engine::with_options(&arena, options);
    load_types(&mut engine, &args)?;
    let ctx = load_context(&args)?;

    // direct expression argument
    if let Some(expr) = &args.expression {
        interpret_input(&engine, &ctx, expr, &args);
        return Ok(());
    }

    if std::io::stdin().is_terminal() {
        // interactive REPL mode
        let (mut line_editor, prompt) = setup_reedline(&engine);
        println!("Skerry REPL - expressions and {{{{ templates }}}} (Ctrl+D to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => {
                    interpret_input(&engine, &ctx, buffer.as_ref(), &args);
                }
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        // pipe/stdin mode: one input per line
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());
        for line in reader.lines() {
            let line = line.into_diagnostic()?;
            interpret_input(&engine, &ctx, &line, &args);
        }
        Ok(())
    }
}
