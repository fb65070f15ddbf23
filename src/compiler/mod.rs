//! Module for compiling an expression [Graph] to linear shader source. The analyzer finds shared
//! nodes, lowering binds them (and every conditional) to temporaries, the program builder
//! collects declarations and the emitter renders the result.

use log::debug;

use crate::{
    dialect::Stage,
    diagnostics::{CompilationError, CompilationResult},
    graph::{Graph, NodeId, NodeKind, Precision, Variable},
};

use self::{
    analyzer::analyze,
    lowering::Lowering,
    program::{OutputAssignment, ProgramBuilder},
};

pub mod analyzer;
mod emitter;
pub mod lowering;
pub mod program;


pub use emitter::emit;
pub use program::CompiledProgram;

/// Prefix of generated temporaries when none is configured.
pub const DEFAULT_TEMP_PREFIX: &str = "tmp";

/// Options for a single compilation.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileOptions {
    pub stage: Stage,
    /// Temporaries are named `{temp_prefix}{n}`.
    pub temp_prefix: String,
    /// Default float precision line for fragment programs.
    pub float_precision: Option<Precision>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            stage: Stage::default(),
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            float_precision: Some(Precision::Medium),
        }
    }
}

impl CompileOptions {
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }
}

/// Compile the output `roots` of `graph` to source text.
pub fn compile<S>(graph: &Graph, roots: &[(S, NodeId)], options: &CompileOptions) -> CompilationResult<String>
where
    S: AsRef<str>,
{
    let program = compile_program(graph, roots, options)?;
    let source = emit(&program, graph.dialect())?;
    debug!("emitted {} byte(s) of {} source", source.len(), graph.dialect().name());
    Ok(source)
}

/// Compile the output `roots` of `graph` without rendering it.
pub fn compile_program<S>(
    graph: &Graph,
    roots: &[(S, NodeId)],
    options: &CompileOptions,
) -> CompilationResult<CompiledProgram>
where
    S: AsRef<str>,
{
    if !Variable::is_valid_name(&options.temp_prefix) {
        return Err(CompilationError::new_unsupported(
            None,
            format!("`{}` can not prefix temporaries", options.temp_prefix),
        ));
    }

    let ids: Vec<NodeId> = roots.iter().map(|(_, id)| *id).collect();
    let analysis = analyze(graph, &ids)?;
    debug!(
        "analyzed {} output(s) of a {} program: {} reachable node(s) of {}",
        roots.len(),
        options.stage,
        analysis.order.len(),
        graph.len()
    );

    let mut builder = ProgramBuilder::new(graph.dialect(), options.stage);
    for id in &analysis.order {
        if let NodeKind::Variable(variable) = graph.node(*id)?.kind() {
            builder.declare_input(*id, variable)?;
        }
    }
    for (name, id) in roots {
        builder.declare_output(name.as_ref(), *id, graph.type_of(*id)?)?;
    }

    let mut lowering = Lowering::new(
        graph,
        &analysis,
        &options.temp_prefix,
        builder.reserved_names(),
    );
    let statements = lowering.lower_all()?;
    debug!("lowered to {} statement(s)", statements.len());

    let outputs = roots
        .iter()
        .map(|(name, id)| {
            Ok(OutputAssignment {
                name: name.as_ref().to_string(),
                value: lowering.expr(*id)?,
            })
        })
        .collect::<CompilationResult<Vec<_>>>()?;

    Ok(builder.finish(options.float_precision, statements, outputs))
}
