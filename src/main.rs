use std::{fs, process::exit};

use clap::Parser;
use log::info;
use termion::color::{self, Fg};

use glaze::{
    cli::{self, Command, CookOpts, MenuOpts, Opts},
    compiler::{compile_program, emit},
    diagnostics::DiagnosticsPrinter,
    dialect::{glsl_es_100, Syntax},
    recipe::{Recipe, RecipeError},
};

fn cook(opts: &Opts, cook_opts: &CookOpts) -> Result<(), RecipeError> {
    let verbose = opts.is_verbose();

    let recipe = Recipe::from_file(&cook_opts.file)?;
    let options = cook_opts.compile_options(&recipe);
    info!("cooking `{}` as a {} program", cook_opts.file, options.stage);

    let (graph, roots) = recipe.build()?;
    if verbose {
        cli::print_label("Graph");
        for node in graph.nodes() {
            eprintln!("{node}");
        }
    }

    let program = compile_program(&graph, &roots, &options)?;
    if verbose {
        cli::print_label("Program");
        eprintln!(
            "{} declaration(s), {} statement(s), {} output(s)",
            program.declarations.len(),
            program.statements.len(),
            program.outputs.len()
        );
    }

    let source = emit(&program, graph.dialect())?;
    match &cook_opts.output {
        Some(path) => fs::write(path, source)?,
        None => print!("{source}"),
    }
    Ok(())
}

fn menu(menu_opts: &MenuOpts) {
    let dialect = glsl_es_100();
    let table = dialect.as_ref();
    let symbols = match &menu_opts.operator {
        Some(op) => vec![op.as_str()],
        None => table.symbols(),
    };

    for symbol in symbols {
        let Some(def) = table.operator(symbol) else {
            eprintln!("{}[E]{} unknown operator `{symbol}`", Fg(color::Red), Fg(color::Reset));
            exit(1);
        };
        let form = match &def.syntax {
            Syntax::Operator(_) => "operator",
            Syntax::Call(_) => "function",
        };
        println!("{}{symbol}{} ({form})", Fg(color::Blue), Fg(color::Reset));
        for signature in &def.signatures {
            println!("\t{signature}");
        }
    }
}

fn report(file: &str, error: RecipeError) {
    match error {
        RecipeError::Compile(e) => DiagnosticsPrinter::new(&[e]).with_source(file).print(),
        RecipeError::Node { id, error } => {
            let source = format!("{file} (node `{id}`)");
            DiagnosticsPrinter::new(&[error]).with_source(&source).print();
        }
        other => eprintln!(
            "{}[E]{} {file}: {other}",
            Fg(color::Red),
            Fg(color::Reset)
        ),
    }
}

fn main() {
    let opts = Opts::parse();

    env_logger::Builder::new()
        .filter_level(opts.log_level())
        .parse_default_env()
        .init();

    match &opts.command {
        Command::Cook(cook_opts) => {
            if let Err(e) = cook(&opts, cook_opts) {
                report(&cook_opts.file, e);
                exit(1);
            }
            eprintln!("Enjoy!");
        }
        Command::Menu(menu_opts) => menu(menu_opts),
    }
}
