//! Import expansion.
//!
//! Module imports are checked against the [`ModuleMapping`]; package
//! imports load, compile and resolve the package as its own unit. Each
//! package is compiled at most once per resolver: requests share an
//! `OnceLock` slot, and the wait-for graph refuses any wait that would
//! close a loop.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use rayon::prelude::*;
use ry_diagnostic::Diagnostic;
use ry_ir::visit::{walk_stmt_mut, VisitMut};
use ry_ir::{
    HostBinding, HostImport, ImportDecl, ImportItem, ImportKind, Origin, PassId, SourceUnit,
    Span, Stmt, StmtKind, Tree,
};
use ry_lower::Lowered;
use tracing::debug;

use crate::graph::WaitForGraph;
use crate::package::exports_of;
use crate::{ModuleMapping, PackageLoader, PackageRecord, ResolutionError, TargetProbe};

/// Parses and lowers one package source. Imports are left in the tree.
pub trait PackageCompiler: Send + Sync {
    fn compile(&self, unit: &SourceUnit) -> Result<Lowered, Diagnostic>;
}

/// Parse and lower with the standard pipeline.
#[derive(Copy, Clone, Debug, Default)]
pub struct StandardCompiler;

impl PackageCompiler for StandardCompiler {
    fn compile(&self, unit: &SourceUnit) -> Result<Lowered, Diagnostic> {
        let tree = ry_parse::parse(unit).map_err(|e| e.to_diagnostic())?;
        ry_lower::lower(tree, unit).map_err(|e| e.to_diagnostic())
    }
}

type Slot = Arc<OnceLock<Result<Arc<PackageRecord>, ResolutionError>>>;

pub struct Resolver {
    mapping: ModuleMapping,
    probe: Arc<dyn TargetProbe>,
    loader: PackageLoader,
    compiler: Arc<dyn PackageCompiler>,
    packages: DashMap<String, Slot>,
    graph: WaitForGraph,
}

impl Resolver {
    pub fn new(
        mapping: ModuleMapping,
        probe: Arc<dyn TargetProbe>,
        search: Vec<PathBuf>,
        compiler: Arc<dyn PackageCompiler>,
    ) -> Self {
        Resolver {
            mapping,
            probe,
            loader: PackageLoader::new(search),
            compiler,
            packages: DashMap::new(),
            graph: WaitForGraph::default(),
        }
    }

    pub fn mapping(&self) -> &ModuleMapping {
        &self.mapping
    }

    pub fn loader(&self) -> &PackageLoader {
        &self.loader
    }

    /// Replace every import statement of `tree` with a host import.
    ///
    /// `requester` names the unit that owns the tree. The packages of one
    /// import statement are loaded in parallel.
    #[tracing::instrument(level = "debug", skip(self, tree))]
    pub fn expand_imports(&self, tree: Tree, requester: &str) -> Result<Tree, ResolutionError> {
        self.expand(tree, requester, true)
    }

    fn expand(&self, mut tree: Tree, requester: &str, parallel: bool) -> Result<Tree, ResolutionError> {
        Expander {
            resolver: self,
            requester,
            parallel,
        }
        .visit_block(&mut tree.body)?;
        Ok(tree)
    }

    fn bindings(
        &self,
        decl: &ImportDecl,
        requester: &str,
        parallel: bool,
    ) -> Result<Vec<HostBinding>, ResolutionError> {
        match decl.kind {
            ImportKind::Module => decl.items.iter().map(|i| self.resolve_module(i)).collect(),
            // Nested loads stay on the current thread: a rayon worker blocked
            // inside a package initializer must not pick up another load.
            ImportKind::Package if parallel => decl
                .items
                .par_iter()
                .map(|i| self.resolve_package(i, requester))
                .collect(),
            ImportKind::Package => decl
                .items
                .iter()
                .map(|i| self.resolve_package(i, requester))
                .collect(),
        }
    }

    /// `a.b` binds the whole mapped module `a.b`; otherwise `a.b.c` binds
    /// symbol `c` of mapped module `a.b`. Every target of the module must
    /// be available.
    pub fn resolve_module(&self, item: &ImportItem) -> Result<HostBinding, ResolutionError> {
        let dotted = item.dotted();
        let (module, symbol) = if self.mapping.contains(&dotted) {
            (dotted, String::new())
        } else {
            match item.path.split_last() {
                Some((symbol, parent)) if !parent.is_empty() => {
                    let parent = parent.join(".");
                    if !self.mapping.contains(&parent) {
                        return Err(ResolutionError::ModuleNotFound {
                            path: parent,
                            span: item.span,
                        });
                    }
                    (parent, symbol.clone())
                }
                _ => {
                    return Err(ResolutionError::ModuleNotFound {
                        path: dotted,
                        span: item.span,
                    })
                }
            }
        };

        let targets = self.mapping.targets(&module).unwrap_or_default();
        if let Some(missing) = targets.iter().find(|t| !self.probe.is_available(t)) {
            return Err(ResolutionError::TargetUnavailable {
                module,
                target: missing.clone(),
                span: item.span,
            });
        }
        let companions = targets.iter().filter(|t| **t != module).cloned().collect();
        debug!(%module, %symbol, "resolved module import");
        Ok(HostBinding::Module {
            local: item.local_name().to_string(),
            module,
            symbol,
            companions,
        })
    }

    fn resolve_package(
        &self,
        item: &ImportItem,
        requester: &str,
    ) -> Result<HostBinding, ResolutionError> {
        if let [prefix, library] = item.path.as_slice() {
            if prefix == "native" {
                let target = format!("native:{library}");
                if !self.probe.is_available(&target) {
                    return Err(ResolutionError::TargetUnavailable {
                        module: item.dotted(),
                        target,
                        span: item.span,
                    });
                }
                return Ok(HostBinding::Native {
                    local: item.local_name().to_string(),
                    library: library.clone(),
                });
            }
        }
        let record = self.load_package(&item.dotted(), requester, item.span)?;
        Ok(HostBinding::Package {
            local: item.local_name().to_string(),
            package: record.name.clone(),
        })
    }

    /// Load `name` on behalf of `requester`, compiling it on first use.
    pub fn load_package(
        &self,
        name: &str,
        requester: &str,
        span: Span,
    ) -> Result<Arc<PackageRecord>, ResolutionError> {
        let slot = Arc::clone(&self.packages.entry(name.to_string()).or_default());
        if let Some(done) = slot.get() {
            return done.clone();
        }
        self.graph
            .wait(requester, name)
            .map_err(|cycle| ResolutionError::PackageCycle { cycle, span })?;
        let result = slot.get_or_init(|| self.build(name, span)).clone();
        self.graph.done(requester, name);
        result
    }

    fn build(&self, name: &str, span: Span) -> Result<Arc<PackageRecord>, ResolutionError> {
        let Some(path) = self.loader.locate(name) else {
            return Err(ResolutionError::PackageNotFound {
                name: name.to_string(),
                searched: self.loader.search_paths().to_vec(),
                span,
            });
        };
        let unit = self
            .loader
            .read(&path)
            .map_err(|e| ResolutionError::PackageUnreadable {
                name: name.to_string(),
                path: path.clone(),
                message: e.to_string(),
                span,
            })?;
        debug!(package = name, path = %path.display(), "compiling package");

        let failed = |diagnostic: Diagnostic| ResolutionError::PackageFailed {
            name: name.to_string(),
            unit: unit.clone(),
            diagnostic: Box::new(diagnostic),
        };
        let lowered = self.compiler.compile(&unit).map_err(failed)?;
        let tree = self
            .expand(lowered.tree, name, false)
            .map_err(|e| ResolutionError::InPackage {
                package: name.to_string(),
                unit: unit.clone(),
                source: Box::new(e),
            })?;
        ry_lower::validate(&tree, unit.text().len()).map_err(|e| failed(e.to_diagnostic()))?;

        Ok(Arc::new(PackageRecord {
            name: name.to_string(),
            path,
            exports: exports_of(&tree),
            unit,
            tree,
            blocks: lowered.blocks,
        }))
    }

    /// A package that has finished loading successfully.
    pub fn package(&self, name: &str) -> Option<Arc<PackageRecord>> {
        let slot = self.packages.get(name)?;
        match slot.get() {
            Some(Ok(record)) => Some(Arc::clone(record)),
            _ => None,
        }
    }

    /// Every successfully loaded package, by name.
    pub fn packages(&self) -> Vec<Arc<PackageRecord>> {
        let mut out: Vec<_> = self
            .packages
            .iter()
            .filter_map(|entry| match entry.value().get() {
                Some(Ok(record)) => Some(Arc::clone(record)),
                _ => None,
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

struct Expander<'a> {
    resolver: &'a Resolver,
    requester: &'a str,
    parallel: bool,
}

impl VisitMut for Expander<'_> {
    type Error = ResolutionError;

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), ResolutionError> {
        let StmtKind::Import(decl) = &stmt.kind else {
            return walk_stmt_mut(self, stmt);
        };
        let bindings = self.resolver.bindings(decl, self.requester, self.parallel)?;
        stmt.kind = StmtKind::HostImport(HostImport { bindings });
        stmt.origin = Origin::Synthesized(PassId::Imports);
        Ok(())
    }
}
