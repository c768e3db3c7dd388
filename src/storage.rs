//! Reference-counted facade over the interning tree.
//!
//! This is what the cell buffer and the SGR serializer actually talk to:
//! `ref` turns a live [`Attributes`] value into a stable [`Identifier`],
//! `unref` releases one, and `from_address` reconstructs an `Attributes`
//! value from an identifier a cell is holding.

use crate::attributes::{Attributes, ColorMode, Identifier, TAG_MASK};
use crate::config::Config;
use crate::error::Result;
use crate::tree::RbTree;

/// Owns the pool array (via the tree) and brokers attribute interning.
pub struct AttributeStorage {
    tree: RbTree,
    config: Config,
}

impl AttributeStorage {
    pub fn new(config: Config) -> Result<Self> {
        let config = config.validate()?;
        Ok(Self {
            tree: RbTree::new(config.initial_nodes, config.max_nodes)?,
            config,
        })
    }

    /// Intern `a`, returning its identifier and incrementing the backing node's
    /// reference count (no-op increment for inline identifiers, which carry no
    /// pool state).
    pub fn ref_attrs(&mut self, a: &mut Attributes) -> Result<Identifier> {
        // Fast path: trust the memo if the node it points at still matches and is alive.
        let memoized = a.update_address();
        if memoized != 0 && memoized & TAG_MASK != 0 {
            let idx = memoized & !TAG_MASK;
            let matches = self.tree.flags_of(idx) == a.flags()
                && self.tree.fg_of(idx) == a.fg()
                && self.tree.bg_of(idx) == a.bg()
                && self.tree.ref_count(idx) > 0;
            if matches {
                self.tree.incref(idx);
                return Ok(memoized);
            }
        } else if memoized != 0 {
            // Inline memo: identifier is the flags word itself, nothing to verify against the pool.
            return Ok(memoized);
        }

        if !a.has_rgb() {
            let id = a.flags();
            a.memoize(id);
            return Ok(id);
        }

        let idx = self.tree.insert(a.flags(), a.fg(), a.bg())?;
        self.tree.incref(idx);
        let id = idx | TAG_MASK;
        a.memoize(id);
        Ok(id)
    }

    /// Release a reference to `id`. No-op for inline identifiers. A node whose reference
    /// count has already hit zero trips a debug assertion instead of underflowing.
    pub fn unref(&mut self, id: Identifier) {
        if id & TAG_MASK == 0 {
            return;
        }
        let idx = id & !TAG_MASK;
        if self.tree.ref_count(idx) == 0 {
            debug_assert!(false, "unref on a node with a zero reference count");
            return;
        }
        let remaining = self.tree.decref(idx);
        if remaining == 0 {
            let flags = self.tree.flags_of(idx);
            let fg = self.tree.fg_of(idx);
            let bg = self.tree.bg_of(idx);
            self.tree.remove(flags, fg, bg);
        }
    }

    /// Populate `out` from `id`. Reading back an identifier after `unref`-ing it is
    /// unsupported (`IdentifierReadbackMismatch`): the node may have been freed and reused.
    pub fn from_address(&self, id: Identifier, out: &mut Attributes) {
        if id & TAG_MASK == 0 {
            out.set_raw(id, 0, 0);
        } else {
            let idx = id & !TAG_MASK;
            out.set_raw(self.tree.flags_of(idx), self.tree.fg_of(idx), self.tree.bg_of(idx));
        }
        out.memoize(id);
    }

    /// Drop all references, recreating the allocator and tree from scratch.
    /// Any previously returned pool-pointer identifier is invalid afterward.
    pub fn reset(&mut self) {
        // `self.config` was already validated in `new`, so re-building a tree
        // from the same knobs cannot fail.
        self.tree = RbTree::new(self.config.initial_nodes, self.config.max_nodes)
            .expect("config was already validated by AttributeStorage::new");
    }

    /// Current number of distinct RGB attribute triples interned.
    pub fn interned_count(&self) -> u32 {
        self.tree.size()
    }

    #[cfg(test)]
    pub(crate) fn ref_count_of(&self, id: Identifier) -> Option<u32> {
        if id & TAG_MASK == 0 {
            None
        } else {
            Some(self.tree.ref_count(id & !TAG_MASK))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> AttributeStorage {
        AttributeStorage::new(Config::default()).unwrap()
    }

    #[test]
    fn repeated_ref_on_non_rgb_attrs_returns_flags_as_identifier_without_growing_pool() {
        let mut storage = storage();
        let mut a = Attributes::new();
        a.set_bold(true);
        let flags = a.flags();
        for _ in 0..3 {
            let mut a2 = a;
            let id = storage.ref_attrs(&mut a2).unwrap();
            assert_eq!(id, flags);
        }
        assert_eq!(storage.interned_count(), 0);
    }

    #[test]
    fn two_refs_on_identical_rgb_attrs_share_one_node() {
        let mut storage = storage();
        let mut a = Attributes::new();
        a.set_fg_mode(ColorMode::Rgb);
        a.set_fg(0x123456);

        let id1 = storage.ref_attrs(&mut a).unwrap();
        let mut b = Attributes::new();
        b.set_fg_mode(ColorMode::Rgb);
        b.set_fg(0x123456);
        let id2 = storage.ref_attrs(&mut b).unwrap();

        assert_eq!(id1, id2);
        assert_eq!(storage.ref_count_of(id1), Some(2));
        assert_eq!(storage.interned_count(), 1);
    }

    // Invariant 3: from_address(ref(a)) reconstructs a.
    #[test]
    fn from_address_roundtrips_ref() {
        let mut storage = storage();
        let mut a = Attributes::new();
        a.set_bg_mode(ColorMode::Rgb);
        a.set_bg(0x0A0B0C);
        a.set_italic(true);

        let id = storage.ref_attrs(&mut a).unwrap();
        let mut out = Attributes::new();
        storage.from_address(id, &mut out);
        assert_eq!(out.flags(), a.flags());
        assert_eq!(out.fg(), a.fg());
        assert_eq!(out.bg(), a.bg());
    }

    #[test]
    fn unref_then_different_rgb_ref_keeps_tree_size_stable() {
        let mut storage = storage();
        let mut a = Attributes::new();
        a.set_fg_mode(ColorMode::Rgb);
        a.set_fg(0x111111);
        let id1 = storage.ref_attrs(&mut a).unwrap();
        assert_eq!(storage.interned_count(), 1);

        storage.unref(id1);
        assert_eq!(storage.interned_count(), 0);

        let mut b = Attributes::new();
        b.set_fg_mode(ColorMode::Rgb);
        b.set_fg(0x222222);
        let id2 = storage.ref_attrs(&mut b).unwrap();
        assert_eq!(storage.interned_count(), 1);
        assert_ne!(id1, id2);
    }

    #[test]
    fn unref_on_inline_identifier_is_noop() {
        let mut storage = storage();
        storage.unref(0); // inline, tag bit clear
        assert_eq!(storage.interned_count(), 0);
    }

    #[test]
    fn reset_invalidates_previous_identifiers() {
        let mut storage = storage();
        let mut a = Attributes::new();
        a.set_fg_mode(ColorMode::Rgb);
        a.set_fg(0x333333);
        storage.ref_attrs(&mut a).unwrap();
        assert_eq!(storage.interned_count(), 1);

        storage.reset();
        assert_eq!(storage.interned_count(), 0);
    }

    #[test]
    fn balanced_ref_unref_returns_pool_to_empty() {
        let mut storage = storage();
        let mut ids = Vec::new();
        for i in 0..20u32 {
            let mut a = Attributes::new();
            a.set_fg_mode(ColorMode::Rgb);
            a.set_fg(i);
            ids.push(storage.ref_attrs(&mut a).unwrap());
        }
        assert_eq!(storage.interned_count(), 20);
        for id in ids {
            storage.unref(id);
        }
        assert_eq!(storage.interned_count(), 0);
    }
}
