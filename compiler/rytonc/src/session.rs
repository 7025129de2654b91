//! One driver invocation: configuration, the compilation cache, and the
//! resolvers built over it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use ry_diagnostic::Diagnostic;
use ry_eval::{
    host_module_names, CancelToken, ExecutionStrategy, InterpreterStrategy, Program,
    SubprocessStrategy,
};
use ry_ir::SourceUnit;
use ry_lower::Lowered;
use ry_resolve::{ModuleMapping, PackageCompiler, Resolver, StaticProbe, TargetProbe};
use tracing::{debug, info};

use crate::cache::{CompileError, Compiled, SourceCache};
use crate::config::{SessionConfig, StrategyKind};
use crate::error::DriverError;

/// Name the entry unit goes by in the import graph.
const ENTRY_UNIT: &str = "main";

pub struct Session {
    config: SessionConfig,
    cache: Arc<SourceCache>,
    probe: Arc<dyn TargetProbe>,
    /// One resolver per search path list, so packages load once.
    resolvers: Mutex<FxHashMap<Vec<PathBuf>, Arc<Resolver>>>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let targets = host_module_names()
            .into_iter()
            .map(str::to_string)
            .chain(config.native_libs.iter().map(|lib| format!("native:{lib}")));
        Session {
            probe: Arc::new(StaticProbe::new(targets)),
            config,
            cache: Arc::new(SourceCache::new()),
            resolvers: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Read a source file.
    pub fn read(&self, path: &Path) -> Result<SourceUnit, DriverError> {
        let text = std::fs::read_to_string(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(SourceUnit::from_file(path, text))
    }

    /// Parse and lower `unit` through the cache.
    pub fn compile(&self, unit: &SourceUnit) -> Result<Arc<Compiled>, DriverError> {
        self.cache.compile(unit).map_err(|error| DriverError::Compile {
            unit: unit.clone(),
            error,
        })
    }

    /// Compile independent units in parallel, results in input order.
    pub fn compile_many(&self, units: &[SourceUnit]) -> Vec<Result<Arc<Compiled>, DriverError>> {
        units.par_iter().map(|unit| self.compile(unit)).collect()
    }

    /// Resolver for a program whose entry file is `entry`.
    pub fn resolver(&self, entry: Option<&Path>) -> Arc<Resolver> {
        let search = self.config.search_paths_for(entry);
        let mut resolvers = self.resolvers.lock();
        let resolver = resolvers.entry(search.clone()).or_insert_with(|| {
            debug!(?search, "new resolver");
            Arc::new(Resolver::new(
                ModuleMapping::standard(),
                Arc::clone(&self.probe),
                search,
                Arc::new(SessionCompiler {
                    cache: Arc::clone(&self.cache),
                }),
            ))
        });
        Arc::clone(resolver)
    }

    /// Compile `unit`, resolve its imports and check the result.
    #[tracing::instrument(level = "info", skip_all, fields(file = %unit.name()))]
    pub fn build(&self, unit: &SourceUnit) -> Result<Program, DriverError> {
        let compiled = self.compile(unit)?;
        let entry = match unit.origin() {
            ry_ir::SourceOrigin::File(path) => Some(path.as_path()),
            ry_ir::SourceOrigin::Inline => None,
        };
        let resolver = self.resolver(entry);
        let Lowered { tree, blocks } = compiled.lowered.clone();
        let tree = resolver
            .expand_imports(tree, ENTRY_UNIT)
            .map_err(|error| DriverError::Resolution {
                unit: unit.clone(),
                error,
            })?;
        ry_lower::validate(&tree, unit.text().len()).map_err(|e| DriverError::Compile {
            unit: unit.clone(),
            error: CompileError::Lowering(e),
        })?;
        let packages = resolver.packages();
        info!(packages = packages.len(), "program ready");
        Ok(Program::new(unit, tree, blocks).with_packages(&packages))
    }

    /// The execution strategy the configuration asks for.
    pub fn strategy(&self) -> Result<Box<dyn ExecutionStrategy>, DriverError> {
        match self.config.strategy {
            StrategyKind::Interpreter => Ok(Box::new(self.interpreter())),
            StrategyKind::Subprocess => {
                let strategy = SubprocessStrategy::current_exe()
                    .map_err(|error| DriverError::Exec {
                        program: None,
                        error,
                    })?
                    .with_args(self.config.child_args())
                    .with_timeout(self.config.timeout);
                Ok(Box::new(strategy))
            }
        }
    }

    /// In-process interpreter with this session's settings.
    pub fn interpreter(&self) -> InterpreterStrategy {
        InterpreterStrategy::new()
            .with_memory(self.config.memory)
            .with_timeout(self.config.timeout)
            .with_trace(self.config.trace)
            .with_bridge(Arc::new(self.config.bridge()))
    }

    /// Run `program` with the configured strategy.
    pub fn run(&self, program: Program) -> Result<(), DriverError> {
        execute(program, self.strategy()?.as_ref())
    }
}

/// Run `program` with `strategy`, keeping the program for the report.
pub fn execute(program: Program, strategy: &dyn ExecutionStrategy) -> Result<(), DriverError> {
    debug!(strategy = strategy.name(), "executing");
    strategy
        .execute(&program, &CancelToken::new())
        .map_err(|error| DriverError::Exec {
            program: Some(Box::new(program)),
            error,
        })
}

/// Package compilation through the session cache.
struct SessionCompiler {
    cache: Arc<SourceCache>,
}

impl PackageCompiler for SessionCompiler {
    fn compile(&self, unit: &SourceUnit) -> Result<Lowered, Diagnostic> {
        self.cache
            .compile(unit)
            .map(|compiled| compiled.lowered.clone())
            .map_err(|e| e.to_diagnostic())
    }
}
