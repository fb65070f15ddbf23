//! The glaze cli.

use clap::{Parser, Subcommand};
use log::LevelFilter;
use termion::terminal_size;

use crate::{
    compiler::{CompileOptions, DEFAULT_TEMP_PREFIX},
    dialect::Stage,
    graph::Precision,
    recipe::Recipe,
};

/// Command line options for glaze
#[derive(Debug, Parser)]
#[command(version, about = "Cook shader expression graphs into GLSL")]
pub struct Opts {
    /// Be verbose
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Opts {
    /// Whether `-v` was given to glaze itself or to the subcommand.
    pub fn is_verbose(&self) -> bool {
        self.verbose || matches!(&self.command, Command::Cook(c) if c.verbose)
    }

    /// Log level for the binary's logger. `RUST_LOG` still overrides it.
    pub fn log_level(&self) -> LevelFilter {
        if self.is_verbose() {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

/// Glaze cli subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a recipe
    #[clap(alias = "build")]
    Cook(CookOpts),

    /// List the operators the target language offers
    Menu(MenuOpts),
}

/// Options for the cli `cook` subcommand.
#[derive(Debug, clap::Args)]
pub struct CookOpts {
    /// Recipe to compile.
    #[arg(required = true)]
    pub file: String,

    /// Pipeline stage. Overrides the stage named in the recipe.
    #[arg(short, long)]
    pub stage: Option<Stage>,

    /// Write the source to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Prefix of generated temporaries.
    #[arg(short('t'), long, default_value = DEFAULT_TEMP_PREFIX)]
    pub temp_prefix: String,

    /// Default float precision of fragment programs.
    #[arg(short('p'), long, default_value = "mediump")]
    pub precision: Precision,

    /// Do not emit a default float precision.
    #[arg(long)]
    pub no_precision: bool,

    /// Be verbose
    #[arg(short('v'), long)]
    pub verbose: bool,
}

impl CookOpts {
    pub fn from_file(file: String) -> Self {
        Self {
            file,
            stage: None,
            output: None,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            precision: Precision::Medium,
            no_precision: false,
            verbose: false,
        }
    }

    /// Options for compiling `recipe`. Command line flags win over the recipe.
    pub fn compile_options(&self, recipe: &Recipe) -> CompileOptions {
        let options = recipe.options(CompileOptions {
            temp_prefix: self.temp_prefix.clone(),
            float_precision: (!self.no_precision).then_some(self.precision),
            ..CompileOptions::default()
        });
        match self.stage {
            Some(stage) => options.with_stage(stage),
            None => options,
        }
    }
}

/// Options for the cli `menu` subcommand.
#[derive(Debug, clap::Args)]
pub struct MenuOpts {
    /// Only show this operator.
    pub operator: Option<String>,
}

/// Get the size of the current terminal that glaze is running in.
fn get_term_width() -> Option<usize> {
    if let Ok((w, _)) = terminal_size() {
        Some(w as usize)
    } else {
        None
    }
}

/// Print a centered string to stderr padded by '='. Stdout is reserved for generated source.
pub fn print_label(label: &'static str) {
    match get_term_width() {
        Some(width) if width > label.len() + 4 => {
            let mut padding = width / 2 - 1 - label.len() / 2;
            let mut odd = (width % 2) == 1;
            if (label.len() % 2) == 1 {
                padding -= 1;
                odd = !odd;
            }
            eprintln!(
                "\n{} {} {}",
                "=".repeat(padding),
                label,
                "=".repeat(padding + odd as usize),
            )
        }
        _ => {
            eprintln!("\n{}:", label)
        }
    }
}
