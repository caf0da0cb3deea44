#![no_main]

use libfuzzer_sys::fuzz_target;
use referral_tree::{build_tree, FlatMap, Position};

/// Fuzz arbitrary wire payloads
/// Any JSON that parses as a flat map must build and answer every query without panicking
fuzz_target!(|data: &[u8]| {
    let Ok(map) = FlatMap::from_slice(data) else {
        return;
    };

    let outcome = build_tree(&map);
    let Some(tree) = outcome.tree else {
        assert!(map.is_empty());
        return;
    };

    assert!(tree.len() <= map.len());
    let open: usize = tree
        .empty_slots()
        .iter()
        .map(|s| s.available_positions.len())
        .sum();
    assert_eq!(open, tree.len() + 1);

    for id in tree.preorder() {
        let node = tree.node(id);
        for position in Position::BOTH {
            if let Some(child) = node.child(position) {
                assert_eq!(tree.node(child).depth, node.depth + 1);
            }
        }
    }

    let _ = tree.search("a");
    let _ = tree.fingerprint();
});
