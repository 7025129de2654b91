//! Code block registry.
//!
//! A `CodeBlock` mirrors a user-visible nested construct (function, type,
//! state machine, ...) purely for diagnostics: when a fault lands on a line,
//! the registry answers "which construct was this, and what encloses it".
//! Registration is a stack: `enter` pushes a block one level deeper than the
//! current top, `exit` closes the top with its end line.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of construct a block mirrors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Function,
    Method,
    Type,
    Record,
    StateMachine,
    Event,
}

impl BlockKind {
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Function => "func",
            BlockKind::Method => "method",
            BlockKind::Type => "pack",
            BlockKind::Record => "struct",
            BlockKind::StateMachine => "state_machine",
            BlockKind::Event => "event",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub name: String,
    pub kind: BlockKind,
    pub start_line: u32,
    /// `None` while the block is still open.
    pub end_line: Option<u32>,
    /// 1 for top-level constructs.
    pub depth: u32,
    pub parent: Option<BlockId>,
    pub children: Vec<BlockId>,
}

impl CodeBlock {
    /// Whether `line` falls inside this block. Open blocks extend to the end of file.
    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && !matches!(self.end_line, Some(end) if line > end)
    }

    /// Display name such as `func main`.
    pub fn title(&self) -> String {
        format!("{} {}", self.kind.label(), self.name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRegistry {
    blocks: Vec<CodeBlock>,
    #[serde(skip)]
    stack: Vec<BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a block nested in the current top of stack.
    pub fn enter(&mut self, name: impl Into<String>, kind: BlockKind, start_line: u32) -> BlockId {
        let id = BlockId(u32::try_from(self.blocks.len()).unwrap_or(u32::MAX));
        let parent = self.stack.last().copied();
        let depth = u32::try_from(self.stack.len()).unwrap_or(u32::MAX - 1) + 1;
        if let Some(parent) = parent {
            self.blocks[parent.index()].children.push(id);
        }
        self.blocks.push(CodeBlock {
            name: name.into(),
            kind,
            start_line,
            end_line: None,
            depth,
            parent,
            children: Vec::new(),
        });
        self.stack.push(id);
        id
    }

    /// Close the innermost open block. Returns `None` when nothing is open.
    pub fn exit(&mut self, end_line: u32) -> Option<BlockId> {
        let id = self.stack.pop()?;
        self.blocks[id.index()].end_line = Some(end_line);
        Some(id)
    }

    /// Move every block onto new lines, for a reformatted copy of the
    /// source it was recorded from.
    pub fn remap_lines(&mut self, mut start: impl FnMut(u32) -> u32, mut end: impl FnMut(u32) -> u32) {
        for block in &mut self.blocks {
            block.start_line = start(block.start_line);
            block.end_line = block.end_line.map(&mut end);
        }
    }

    /// The innermost open block.
    pub fn current(&self) -> Option<BlockId> {
        self.stack.last().copied()
    }

    /// True when every entered block has been exited.
    pub fn is_balanced(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&CodeBlock> {
        self.blocks.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &CodeBlock)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (BlockId(u32::try_from(i).unwrap_or(u32::MAX)), b))
    }

    /// Blocks at an exact nesting depth.
    pub fn at_depth(&self, depth: u32) -> impl Iterator<Item = &CodeBlock> {
        self.blocks.iter().filter(move |b| b.depth == depth)
    }

    /// The deepest block containing `line`.
    pub fn innermost_at(&self, line: u32) -> Option<BlockId> {
        self.iter()
            .filter(|(_, b)| b.contains_line(line))
            .max_by_key(|(_, b)| (b.depth, b.start_line))
            .map(|(id, _)| id)
    }

    /// Titles from the outermost ancestor down to `id`.
    pub fn hierarchy(&self, id: BlockId) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(block) = self.get(current) else {
                break;
            };
            chain.push(block.title());
            cursor = block.parent;
        }
        chain.reverse();
        chain
    }

    /// Hierarchy of the block containing `line`, or empty at top level.
    pub fn hierarchy_at(&self, line: u32) -> Vec<String> {
        self.innermost_at(line)
            .map(|id| self.hierarchy(id))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
