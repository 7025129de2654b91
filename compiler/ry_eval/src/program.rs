//! A fully lowered and resolved program, ready to execute.

use std::sync::Arc;

use ry_diagnostic::{BlockRegistry, LocationTracker};
use ry_ir::{SourceOrigin, SourceUnit, Tree};
use ry_resolve::PackageRecord;
use serde::{Deserialize, Serialize};

/// Source text with its origin, in a serializable form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSource {
    pub origin: SourceOrigin,
    pub text: String,
}

impl ProgramSource {
    pub fn of(unit: &SourceUnit) -> Self {
        ProgramSource {
            origin: unit.origin().clone(),
            text: unit.text().to_string(),
        }
    }

    pub fn unit(&self) -> SourceUnit {
        SourceUnit::new(self.origin.clone(), self.text.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageProgram {
    pub name: String,
    pub source: ProgramSource,
    pub tree: Tree,
    pub blocks: BlockRegistry,
    /// Exported names in declaration order.
    pub exports: Vec<String>,
}

impl PackageProgram {
    pub fn of(record: &PackageRecord) -> Self {
        PackageProgram {
            name: record.name.clone(),
            source: ProgramSource::of(&record.unit),
            tree: record.tree.clone(),
            blocks: record.blocks.clone(),
            exports: record.exports.iter().map(|e| e.name.clone()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub source: ProgramSource,
    pub tree: Tree,
    pub blocks: BlockRegistry,
    /// Every package the program can import, in load order.
    pub packages: Vec<PackageProgram>,
}

impl Program {
    pub fn new(unit: &SourceUnit, tree: Tree, blocks: BlockRegistry) -> Self {
        Program {
            source: ProgramSource::of(unit),
            tree,
            blocks,
            packages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_packages(mut self, records: &[Arc<PackageRecord>]) -> Self {
        self.packages = records.iter().map(|r| PackageProgram::of(r)).collect();
        self
    }

    pub fn package(&self, name: &str) -> Option<&PackageProgram> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Location data for the unit named `package`, or the entry program.
    pub fn locate(&self, package: Option<&str>) -> (LocationTracker, &BlockRegistry) {
        let (source, tree, blocks) = match package.and_then(|name| self.package(name)) {
            Some(p) => (&p.source, &p.tree, &p.blocks),
            None => (&self.source, &self.tree, &self.blocks),
        };
        let tracker =
            LocationTracker::new(source.unit()).with_lowered(ry_lower::print_host(tree));
        (tracker, blocks)
    }
}
