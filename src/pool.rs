//! Fixed-block pool allocator over a growable array of 32-bit words.
//!
//! Node storage for the interning tree (`tree.rs`) lives here: every
//! allocation is exactly [`NODE_SIZE`] words, word-index 0 is reserved as
//! the tree's nil sentinel and is never handed out, and free blocks form an
//! intrusive singly-linked list threaded through the first word of each
//! freed block (0 terminates the list).

use crate::error::{Error, Result};

/// Word index into the pool's backing array. 0 means "nil".
pub type WordIndex = u32;

/// Words per node: `COLOR, LEFT, RIGHT, FLAGS, FG, BG, REF`.
pub const NODE_SIZE: u32 = 7;

pub const COLOR: u32 = 0;
pub const LEFT: u32 = 1;
pub const RIGHT: u32 = 2;
pub const FLAGS: u32 = 3;
pub const FG: u32 = 4;
pub const BG: u32 = 5;
pub const REF: u32 = 6;

/// A pool allocator over a single growable `Vec<u32>`.
///
/// The backing array's capacity (in nodes) doubles on exhaustion, bounded by
/// `max_nodes`. Word-index 0 is never allocated; it is skipped when building
/// the initial free list so the tree can use it as a nil marker.
#[derive(Debug)]
pub struct PoolAllocator {
    data: Vec<u32>,
    free_head: WordIndex,
    node_capacity: u32,
    max_nodes: u32,
}

impl PoolAllocator {
    /// Create a pool with room for `initial_nodes`, never growing past `max_nodes`.
    pub fn new(initial_nodes: u32, max_nodes: u32) -> Self {
        let node_capacity = initial_nodes.max(1);
        let mut data = vec![0u32; (node_capacity * NODE_SIZE) as usize];
        let free_head = Self::build_free_list(&mut data, 1, node_capacity);
        Self {
            data,
            free_head,
            node_capacity,
            max_nodes: max_nodes.max(node_capacity),
        }
    }

    /// Thread a free list through node slots `[start_node, end_node)`, returning its head.
    ///
    /// Node 0 is always skipped by callers passing `start_node >= 1`.
    fn build_free_list(data: &mut [u32], start_node: u32, end_node: u32) -> WordIndex {
        if start_node >= end_node {
            return 0;
        }
        for node in start_node..end_node {
            let idx = node * NODE_SIZE;
            let next = if node + 1 < end_node { (node + 1) * NODE_SIZE } else { 0 };
            data[idx as usize] = next;
        }
        start_node * NODE_SIZE
    }

    /// Allocate a zeroed 7-word block, growing (doubling, bounded by `max_nodes`) if needed.
    pub fn allocate(&mut self) -> Result<WordIndex> {
        if self.free_head == 0 {
            self.grow()?;
        }
        let idx = self.free_head;
        let next = self.data[idx as usize];
        self.free_head = next;
        for w in 0..NODE_SIZE {
            self.data[(idx + w) as usize] = 0;
        }
        Ok(idx)
    }

    fn grow(&mut self) -> Result<()> {
        if self.node_capacity >= self.max_nodes {
            tracing::warn!(capacity = self.node_capacity, "attribute pool exhausted");
            return Err(Error::OutOfMemory {
                capacity: self.node_capacity,
            });
        }
        let old_capacity = self.node_capacity;
        let new_capacity = (old_capacity.saturating_mul(2)).min(self.max_nodes).max(old_capacity + 1);
        tracing::debug!(old_capacity, new_capacity, "growing attribute pool");
        self.data.resize((new_capacity * NODE_SIZE) as usize, 0);
        self.free_head = Self::build_free_list(&mut self.data, old_capacity, new_capacity);
        self.node_capacity = new_capacity;
        Ok(())
    }

    /// Return `idx` to the free list. Undefined behavior (logically, not memory-unsafe) if
    /// `idx` was not previously allocated or is already free — callers (the tree) must uphold
    /// this.
    pub fn free(&mut self, idx: WordIndex) {
        debug_assert_ne!(idx, 0, "freeing the nil index");
        self.data[idx as usize] = self.free_head;
        self.free_head = idx;
    }

    /// Raw read access to the backing array. Field `idx + FIELD` is how the
    /// tree reads a node's word. Invalidated by the next growing `allocate`.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Raw write access to the backing array. Invalidated by the next growing `allocate`.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_never_returns_zero() {
        let mut pool = PoolAllocator::new(4, 64);
        for _ in 0..4 {
            assert_ne!(pool.allocate().unwrap(), 0);
        }
    }

    #[test]
    fn allocate_is_multiple_of_node_size() {
        let mut pool = PoolAllocator::new(4, 64);
        for _ in 0..4 {
            let idx = pool.allocate().unwrap();
            assert_eq!(idx % NODE_SIZE, 0);
        }
    }

    #[test]
    fn free_then_allocate_reuses_block() {
        let mut pool = PoolAllocator::new(2, 64);
        let a = pool.allocate().unwrap();
        let _b = pool.allocate().unwrap();
        pool.free(a);
        let c = pool.allocate().unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn grows_on_exhaustion_and_keeps_indices_valid() {
        let mut pool = PoolAllocator::new(1, 64);
        let first = pool.allocate().unwrap();
        pool.data_mut()[(first + FLAGS) as usize] = 0xABCD;
        let _second = pool.allocate().unwrap(); // forces growth
        assert_eq!(pool.data()[(first + FLAGS) as usize], 0xABCD);
    }

    #[test]
    fn out_of_memory_when_max_reached() {
        let mut pool = PoolAllocator::new(1, 1);
        pool.allocate().unwrap();
        assert_eq!(pool.allocate(), Err(Error::OutOfMemory { capacity: 1 }));
    }

    #[test]
    fn zeroed_on_reuse() {
        let mut pool = PoolAllocator::new(2, 64);
        let a = pool.allocate().unwrap();
        pool.data_mut()[(a + FG) as usize] = 0x123456;
        pool.free(a);
        let b = pool.allocate().unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.data()[(b + FG) as usize], 0);
    }
}
