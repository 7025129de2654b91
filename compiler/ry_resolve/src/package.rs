//! Loaded packages and their exports.

use std::path::PathBuf;

use ry_diagnostic::BlockRegistry;
use ry_ir::{ExprKind, SourceUnit, StmtKind, Tree};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Function,
    Class,
    Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub kind: ExportKind,
}

/// A package compiled, lowered and resolved as its own unit.
#[derive(Clone, Debug)]
pub struct PackageRecord {
    /// Dotted name it was imported by, e.g. `utils.text`.
    pub name: String,
    pub path: PathBuf,
    pub unit: SourceUnit,
    pub tree: Tree,
    pub blocks: BlockRegistry,
    /// Exported symbols in declaration order.
    pub exports: Vec<Export>,
}

impl PackageRecord {
    pub fn export(&self, name: &str) -> Option<&Export> {
        self.exports.iter().find(|e| e.name == name)
    }
}

/// Every top-level binding not marked `private`, first declaration wins
/// the position.
pub fn exports_of(tree: &Tree) -> Vec<Export> {
    let mut exports: Vec<Export> = Vec::new();
    for stmt in &tree.body.stmts {
        let export = match &stmt.kind {
            StmtKind::Func(func) if !func.private => Export {
                name: func.name.clone(),
                kind: ExportKind::Function,
            },
            StmtKind::Class(class) if !class.private => Export {
                name: class.name.clone(),
                kind: ExportKind::Class,
            },
            StmtKind::Assign {
                target,
                private: false,
                ..
            } => match &target.kind {
                ExprKind::Name(name) => Export {
                    name: name.clone(),
                    kind: ExportKind::Value,
                },
                _ => continue,
            },
            _ => continue,
        };
        if !exports.iter().any(|e| e.name == export.name) {
            exports.push(export);
        }
    }
    exports
}
