use crate::{MemoryError, StackHandle};

/// LIFO frames, sized in bytes.
#[derive(Debug, Default)]
pub struct Stack {
    frames: Vec<(StackHandle, usize)>,
    next: u32,
    used: usize,
}

impl Stack {
    pub fn push(&mut self, size: usize) -> StackHandle {
        let handle = StackHandle::new(self.next);
        self.next = self.next.wrapping_add(1);
        self.frames.push((handle, size));
        self.used += size;
        handle
    }

    /// Pop the most recent frame.
    pub fn pop(&mut self) -> Result<(StackHandle, usize), MemoryError> {
        let (handle, size) = self.frames.pop().ok_or(MemoryError::StackUnderflow)?;
        self.used -= size;
        Ok((handle, size))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn used_bytes(&self) -> usize {
        self.used
    }
}
