//! Linear-memory arena backing the call surface.
//!
//! Callers address blocks by word offset, exactly as they would address a
//! linear memory across a binary boundary. Every block allocated for a call
//! must be freed by its owner; `live_blocks` exists so embedders can assert
//! that discipline.

use std::collections::HashMap;

pub type WordPtr = u32;

/// Null pointer sentinel; offset 0 is never handed out.
pub const NULL: WordPtr = 0;

#[derive(Default, Debug)]
pub struct Memory {
    next: WordPtr,
    blocks: HashMap<WordPtr, Box<[i64]>>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            next: 8,
            blocks: HashMap::new(),
        }
    }

    /// Returns [`NULL`] when the address space is exhausted; a wrapped bump
    /// pointer would hand out offsets that alias live blocks.
    pub fn alloc(&mut self, words: usize) -> WordPtr {
        match self.reserve(words) {
            Some(ptr) => {
                self.blocks.insert(ptr, vec![0; words].into_boxed_slice());
                ptr
            }
            None => NULL,
        }
    }

    pub fn alloc_from(&mut self, words: &[i64]) -> WordPtr {
        match self.reserve(words.len()) {
            Some(ptr) => {
                self.blocks.insert(ptr, words.to_vec().into_boxed_slice());
                ptr
            }
            None => NULL,
        }
    }

    fn reserve(&mut self, words: usize) -> Option<WordPtr> {
        let span = WordPtr::try_from(words.max(1)).ok()?;
        let ptr = self.next;
        self.next = self.next.checked_add(span)?;
        Some(ptr)
    }

    pub fn write(&mut self, ptr: WordPtr, words: &[i64]) -> bool {
        match self.blocks.get_mut(&ptr) {
            Some(block) if block.len() >= words.len() => {
                block[..words.len()].copy_from_slice(words);
                true
            }
            _ => false,
        }
    }

    pub fn read(&self, ptr: WordPtr) -> Option<&[i64]> {
        self.blocks.get(&ptr).map(|b| &**b)
    }

    pub fn free(&mut self, ptr: WordPtr) -> bool {
        self.blocks.remove(&ptr).is_some()
    }

    /// Number of currently allocated blocks; a leak detector for tests.
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }
}
