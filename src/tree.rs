//! Iterative top-down red-black tree, keyed by `(flags, fg, bg)`, backed by
//! [`PoolAllocator`] node storage.
//!
//! The balancing logic is the classic top-down 2-3-4 insertion/deletion
//! scheme (fake root + single pass down, no recursion, no parent pointers).
//! A single fake-root node is allocated once per tree and reused across every
//! `insert`/`remove` call so the real root never needs special-casing during
//! rotations.

use crate::error::Result;
use crate::pool::{PoolAllocator, WordIndex, BG, COLOR, FG, FLAGS, LEFT, REF, RIGHT};

const BLACK: u32 = 0;
const RED: u32 = 1;

const LEFT_DIR: usize = 0;
const RIGHT_DIR: usize = 1;

fn field_for(dir: usize) -> u32 {
    if dir == LEFT_DIR { LEFT } else { RIGHT }
}

/// Lexicographic comparison of `(flags, fg, bg)` triples. -1/0/1.
#[inline]
pub fn cmp(a: (u32, u32, u32), b: (u32, u32, u32)) -> i32 {
    if a.0 != b.0 {
        return if a.0 < b.0 { -1 } else { 1 };
    }
    if a.1 != b.1 {
        return if a.1 < b.1 { -1 } else { 1 };
    }
    if a.2 != b.2 {
        return if a.2 < b.2 { -1 } else { 1 };
    }
    0
}

/// An interning tree of `(flags, fg, bg)` keyed nodes.
pub struct RbTree {
    pool: PoolAllocator,
    /// False tree root; its `RIGHT` link is the real root (0 = empty tree).
    head: WordIndex,
    size: u32,
}

impl RbTree {
    /// Fails with `OutOfMemory` if `initial_nodes` doesn't leave room for the
    /// fake root this tree allocates up front (word-index 0 is reserved as
    /// nil, so `initial_nodes` must be at least 2).
    pub fn new(initial_nodes: u32, max_nodes: u32) -> Result<Self> {
        let mut pool = PoolAllocator::new(initial_nodes, max_nodes);
        // The fake root is allocated once and never freed; its own color is
        // irrelevant (it is never read during rotations), only its RIGHT
        // link (the real root) matters.
        let head = pool.allocate()?;
        Ok(Self { pool, head, size: 0 })
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Read a node's field word directly out of the pool's backing array.
    #[inline]
    fn field_get(&self, idx: WordIndex, field: u32) -> u32 {
        self.pool.data()[(idx + field) as usize]
    }

    /// Write a node's field word directly into the pool's backing array.
    #[inline]
    fn field_set(&mut self, idx: WordIndex, field: u32, value: u32) {
        self.pool.data_mut()[(idx + field) as usize] = value;
    }

    #[inline]
    pub fn root(&self) -> WordIndex {
        self.field_get(self.head, RIGHT)
    }

    #[inline]
    fn is_red(&self, idx: WordIndex) -> bool {
        idx != 0 && self.field_get(idx, COLOR) == RED
    }

    #[inline]
    fn link(&self, idx: WordIndex, dir: usize) -> WordIndex {
        self.field_get(idx, field_for(dir))
    }

    #[inline]
    fn set_link(&mut self, idx: WordIndex, dir: usize, value: WordIndex) {
        self.field_set(idx, field_for(dir), value);
    }

    #[inline]
    fn key_of(&self, idx: WordIndex) -> (u32, u32, u32) {
        (
            self.field_get(idx, FLAGS),
            self.field_get(idx, FG),
            self.field_get(idx, BG),
        )
    }

    /// Single rotation: rotate `root` toward `dir` (dir=0 rotates left, dir=1 rotates right).
    fn single_rotation(&mut self, root: WordIndex, dir: usize) -> WordIndex {
        let other = 1 - dir;
        let save = self.link(root, other);
        self.set_link(root, other, self.link(save, dir));
        self.set_link(save, dir, root);
        self.field_set(root, COLOR, RED);
        self.field_set(save, COLOR, BLACK);
        save
    }

    /// Double rotation: rotate `root`'s `other` child toward `other`, then `root` toward `dir`.
    fn double_rotation(&mut self, root: WordIndex, dir: usize) -> WordIndex {
        let other = 1 - dir;
        let rotated = self.single_rotation(self.link(root, other), other);
        self.set_link(root, other, rotated);
        self.single_rotation(root, dir)
    }

    fn new_node(&mut self, key: (u32, u32, u32)) -> Result<WordIndex> {
        let idx = self.pool.allocate()?;
        self.field_set(idx, COLOR, RED);
        self.field_set(idx, LEFT, 0);
        self.field_set(idx, RIGHT, 0);
        self.field_set(idx, FLAGS, key.0);
        self.field_set(idx, FG, key.1);
        self.field_set(idx, BG, key.2);
        self.field_set(idx, REF, 0);
        Ok(idx)
    }

    /// Insert `(flags, fg, bg)` if absent; return the index of the (new or
    /// existing) node. Size only increases when a new node is created.
    pub fn insert(&mut self, flags: u32, fg: u32, bg: u32) -> Result<WordIndex> {
        let key = (flags, fg, bg);

        if self.root() == 0 {
            let root = self.new_node(key)?;
            self.field_set(root, COLOR, BLACK);
            self.set_link(self.head, RIGHT_DIR, root);
            self.size = 1;
            return Ok(root);
        }

        let mut dir = LEFT_DIR;
        let mut last = LEFT_DIR;
        let mut t = self.head;
        let mut g: WordIndex = 0;
        let mut p: WordIndex = 0;
        let mut q = self.link(self.head, RIGHT_DIR);
        let found: WordIndex;

        loop {
            if q == 0 {
                let new_q = self.new_node(key)?;
                self.set_link(p, dir, new_q);
                q = new_q;
                self.size += 1;
            } else if self.is_red(self.link(q, LEFT_DIR)) && self.is_red(self.link(q, RIGHT_DIR)) {
                self.field_set(q, COLOR, RED);
                self.field_set(self.link(q, LEFT_DIR), COLOR, BLACK);
                self.field_set(self.link(q, RIGHT_DIR), COLOR, BLACK);
            }

            if self.is_red(q) && self.is_red(p) {
                let dir2 = if self.link(t, RIGHT_DIR) == g { RIGHT_DIR } else { LEFT_DIR };
                if q == self.link(p, last) {
                    let rotated = self.single_rotation(g, 1 - last);
                    self.set_link(t, dir2, rotated);
                } else {
                    let rotated = self.double_rotation(g, 1 - last);
                    self.set_link(t, dir2, rotated);
                }
            }

            let c = cmp(key, self.key_of(q));
            if c == 0 {
                found = q;
                break;
            }

            last = dir;
            dir = if c > 0 { RIGHT_DIR } else { LEFT_DIR };

            if g != 0 {
                t = g;
            }
            g = p;
            p = q;
            q = self.link(q, dir);
        }

        let root = self.link(self.head, RIGHT_DIR);
        self.field_set(root, COLOR, BLACK);
        Ok(found)
    }

    /// Find the node matching `(flags, fg, bg)`, or 0 if absent.
    pub fn find(&self, flags: u32, fg: u32, bg: u32) -> WordIndex {
        let key = (flags, fg, bg);
        let mut idx = self.root();
        while idx != 0 {
            let c = cmp(key, self.key_of(idx));
            if c == 0 {
                return idx;
            }
            idx = self.link(idx, if c > 0 { RIGHT_DIR } else { LEFT_DIR });
        }
        0
    }

    /// Remove the node matching `(flags, fg, bg)` if present. Returns whether a removal happened.
    ///
    /// Field values are not preserved across the in-order-successor move this performs; callers
    /// must only remove nodes whose `REF` has already dropped to zero.
    pub fn remove(&mut self, flags: u32, fg: u32, bg: u32) -> bool {
        if self.root() == 0 {
            return false;
        }
        let key = (flags, fg, bg);

        let mut q = self.head;
        let mut p: WordIndex = 0;
        let mut g: WordIndex;
        let mut found: WordIndex = 0;
        let mut dir = RIGHT_DIR;

        while self.link(q, dir) != 0 {
            let last = dir;
            g = p;
            p = q;
            q = self.link(q, dir);
            let c = cmp(key, self.key_of(q));
            dir = if c > 0 { RIGHT_DIR } else { LEFT_DIR };
            if c == 0 {
                found = q;
            }

            if !self.is_red(q) && !self.is_red(self.link(q, dir)) {
                if self.is_red(self.link(q, 1 - dir)) {
                    let rotated = self.single_rotation(q, dir);
                    self.set_link(p, last, rotated);
                    p = rotated;
                } else if !self.is_red(self.link(q, 1 - dir)) {
                    let s = self.link(p, 1 - last);
                    if s != 0 {
                        if !self.is_red(self.link(s, 1 - last)) && !self.is_red(self.link(s, last)) {
                            self.field_set(p, COLOR, BLACK);
                            self.field_set(s, COLOR, RED);
                            self.field_set(q, COLOR, RED);
                        } else {
                            let dir2 = if self.link(g, RIGHT_DIR) == p { RIGHT_DIR } else { LEFT_DIR };
                            let new_sub = if self.is_red(self.link(s, last)) {
                                self.double_rotation(p, last)
                            } else {
                                self.single_rotation(p, last)
                            };
                            self.set_link(g, dir2, new_sub);
                            self.field_set(q, COLOR, RED);
                            self.field_set(new_sub, COLOR, RED);
                            self.field_set(self.link(new_sub, LEFT_DIR), COLOR, BLACK);
                            self.field_set(self.link(new_sub, RIGHT_DIR), COLOR, BLACK);
                        }
                    }
                }
            }
        }

        if found != 0 {
            // Copy q's key payload into found, then splice q out (q has at most one child).
            let key_q = self.key_of(q);
            self.field_set(found, FLAGS, key_q.0);
            self.field_set(found, FG, key_q.1);
            self.field_set(found, BG, key_q.2);

            let child = if self.link(q, LEFT_DIR) == 0 {
                self.link(q, RIGHT_DIR)
            } else {
                self.link(q, LEFT_DIR)
            };
            let slot = if self.link(p, RIGHT_DIR) == q { RIGHT_DIR } else { LEFT_DIR };
            self.set_link(p, slot, child);
            self.pool.free(q);
            self.size -= 1;
        }

        let root = self.link(self.head, RIGHT_DIR);
        if root != 0 {
            self.field_set(root, COLOR, BLACK);
        }
        found != 0
    }

    /// In-order (or reverse in-order) snapshot of node indices, taken at call time.
    pub fn iterate(&self, reverse: bool) -> Vec<WordIndex> {
        let mut out = Vec::with_capacity(self.size as usize);
        let mut stack = Vec::new();
        let mut node = self.root();
        let (first, second) = if reverse {
            (RIGHT_DIR, LEFT_DIR)
        } else {
            (LEFT_DIR, RIGHT_DIR)
        };
        loop {
            while node != 0 {
                stack.push(node);
                node = self.link(node, first);
            }
            match stack.pop() {
                Some(n) => {
                    out.push(n);
                    node = self.link(n, second);
                }
                None => break,
            }
        }
        out
    }

    pub fn flags_of(&self, idx: WordIndex) -> u32 {
        self.field_get(idx, FLAGS)
    }
    pub fn fg_of(&self, idx: WordIndex) -> u32 {
        self.field_get(idx, FG)
    }
    pub fn bg_of(&self, idx: WordIndex) -> u32 {
        self.field_get(idx, BG)
    }
    pub fn ref_count(&self, idx: WordIndex) -> u32 {
        self.field_get(idx, REF)
    }
    pub fn set_ref_count(&mut self, idx: WordIndex, value: u32) {
        self.field_set(idx, REF, value);
    }
    pub fn incref(&mut self, idx: WordIndex) -> u32 {
        let v = self.field_get(idx, REF) + 1;
        self.field_set(idx, REF, v);
        v
    }
    pub fn decref(&mut self, idx: WordIndex) -> u32 {
        let v = self.field_get(idx, REF).saturating_sub(1);
        self.field_set(idx, REF, v);
        v
    }

    /// Panics if any red-black invariant is violated. Test-only: a violation here
    /// is a bug in the tree implementation, never a condition callers recover from.
    #[cfg(any(test, feature = "test-support"))]
    pub fn check_invariants(&self) {
        fn walk(tree: &RbTree, idx: WordIndex, count: &mut u32) -> (u32, u32) {
            if idx == 0 {
                return (0, 1); // (reachable-node-count, black-height)
            }
            assert!(
                !(tree.is_red(idx) && (tree.is_red(tree.link(idx, LEFT_DIR)) || tree.is_red(tree.link(idx, RIGHT_DIR)))),
                "red node with red child at {idx}"
            );
            let (lcount, lbh) = walk(tree, tree.link(idx, LEFT_DIR), count);
            let (rcount, rbh) = walk(tree, tree.link(idx, RIGHT_DIR), count);
            assert_eq!(lbh, rbh, "unequal black height at {idx}");
            let bh = lbh + if tree.is_red(idx) { 0 } else { 1 };
            (lcount + rcount + 1, bh)
        }
        let mut count = 0;
        let (reachable, _) = walk(self, self.root(), &mut count);
        assert_eq!(reachable, self.size, "size does not match reachable node count");

        let order = self.iterate(false);
        for w in order.windows(2) {
            let a = self.key_of(w[0]);
            let b = self.key_of(w[1]);
            assert!(cmp(a, b) < 0, "in-order traversal not strictly ascending");
        }
    }
}
