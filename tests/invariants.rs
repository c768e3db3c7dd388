//! Property-based checks that survive arbitrary sequences of tree and
//! storage mutations, not just the hand-picked scenarios in the unit tests.

use proptest::prelude::*;
use termattr::tree::RbTree;
use termattr::{AttributeStorage, Attributes, ColorMode, Config};

#[derive(Debug, Clone, Copy)]
enum TreeOp {
    Insert(u32, u32, u32),
    Remove(u32, u32, u32),
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    let key = (0u32..8, 0u32..8, 0u32..8);
    prop_oneof![
        key.clone().prop_map(|(f, g, b)| TreeOp::Insert(f, g, b)),
        key.prop_map(|(f, g, b)| TreeOp::Remove(f, g, b)),
    ]
}

proptest! {
    /// After every insert/remove in a random sequence, the tree is still a
    /// valid red-black tree: no red node has a red child, every root-to-leaf
    /// path has the same black height, and in-order traversal stays sorted.
    #[test]
    fn random_insert_remove_sequence_keeps_tree_balanced(ops in proptest::collection::vec(tree_op_strategy(), 0..200)) {
        let mut tree = RbTree::new(4, 8192).unwrap();
        for op in ops {
            match op {
                TreeOp::Insert(f, g, b) => { let _ = tree.insert(f, g, b); }
                TreeOp::Remove(f, g, b) => { tree.remove(f, g, b); }
            }
            tree.check_invariants();
        }
    }

    /// Inserting the same key many times never changes the tree's size past one.
    #[test]
    fn repeated_insert_of_same_key_is_idempotent(flags in 0u32..1000, fg in 0u32..256, bg in 0u32..256, repeats in 1usize..20) {
        let mut tree = RbTree::new(4, 4096).unwrap();
        let mut first = None;
        for _ in 0..repeats {
            let idx = tree.insert(flags, fg, bg).unwrap();
            if let Some(f) = first {
                prop_assert_eq!(idx, f);
            }
            first = Some(idx);
        }
        prop_assert_eq!(tree.size(), 1);
    }

    /// Any sequence of ref/unref calls that balances out (equal refs and unrefs
    /// per distinct RGB value) returns the storage to zero interned entries.
    #[test]
    fn balanced_ref_unref_sequence_leaves_storage_empty(values in proptest::collection::vec(0u32..16, 1..40)) {
        let mut storage = AttributeStorage::new(Config::default()).unwrap();
        let mut ids = Vec::new();
        for v in &values {
            let mut a = Attributes::new();
            a.set_fg_mode(ColorMode::Rgb);
            a.set_fg(*v);
            ids.push(storage.ref_attrs(&mut a).unwrap());
        }
        for id in ids {
            storage.unref(id);
        }
        prop_assert_eq!(storage.interned_count(), 0);
    }

    /// `from_address` always reconstructs exactly what was ref'd, regardless
    /// of what else has been interned alongside it.
    #[test]
    fn from_address_reconstructs_any_interned_rgb_triple(
        fg in 0u32..0x1_000_000u32,
        bg in 0u32..0x1_000_000u32,
        bold in any::<bool>(),
        italic in any::<bool>(),
    ) {
        let mut storage = AttributeStorage::new(Config::default()).unwrap();
        let mut a = Attributes::new();
        a.set_bold(bold);
        a.set_italic(italic);
        a.set_fg_mode(ColorMode::Rgb);
        a.set_fg(fg);
        a.set_bg_mode(ColorMode::Rgb);
        a.set_bg(bg);

        let id = storage.ref_attrs(&mut a).unwrap();
        let mut out = Attributes::new();
        storage.from_address(id, &mut out);

        prop_assert_eq!(out.flags(), a.flags());
        prop_assert_eq!(out.fg(), a.fg());
        prop_assert_eq!(out.bg(), a.bg());
    }
}
