//! State shared by the passes of one pipeline run.

use ry_diagnostic::span_utils::LineOffsetTable;
use ry_diagnostic::BlockRegistry;
use ry_ir::{Directives, ProtectToken, SourceUnit, Span};

/// Side table for text hidden from the passes between `protect` and
/// `restore`.
#[derive(Clone, Debug, Default)]
pub struct ProtectTable {
    entries: Vec<String>,
}

impl ProtectTable {
    pub fn protect(&mut self, text: String) -> ProtectToken {
        let token = ProtectToken(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.entries.push(text);
        token
    }

    pub fn get(&self, token: ProtectToken) -> Option<&str> {
        self.entries.get(token.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a pass may consult besides the tree itself.
///
/// The directives and source are fixed for the run. The protection table,
/// block registry and name counter are written by the passes that own them.
pub struct PassContext {
    directives: Directives,
    unit: SourceUnit,
    lines: LineOffsetTable,
    protected: ProtectTable,
    blocks: BlockRegistry,
    next_name: u32,
}

impl PassContext {
    pub fn new(directives: Directives, unit: &SourceUnit) -> Self {
        PassContext {
            directives,
            lines: LineOffsetTable::build(unit.text()),
            unit: unit.clone(),
            protected: ProtectTable::default(),
            blocks: BlockRegistry::new(),
            next_name: 0,
        }
    }

    pub fn directives(&self) -> Directives {
        self.directives
    }

    pub fn unit(&self) -> &SourceUnit {
        &self.unit
    }

    /// 1-based line of a byte offset.
    pub fn line_of(&self, offset: u32) -> u32 {
        self.lines.line_from_offset(offset)
    }

    /// Last line covered by `span`.
    pub fn end_line_of(&self, span: Span) -> u32 {
        self.line_of(span.end.saturating_sub(1).max(span.start))
    }

    pub fn protected(&self) -> &ProtectTable {
        &self.protected
    }

    pub fn protected_mut(&mut self) -> &mut ProtectTable {
        &mut self.protected
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockRegistry {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> BlockRegistry {
        self.blocks
    }

    /// A name no user program can collide with, e.g. `__match_3`.
    pub fn fresh_name(&mut self, stem: &str) -> String {
        let n = self.next_name;
        self.next_name += 1;
        format!("__{stem}_{n}")
    }
}
