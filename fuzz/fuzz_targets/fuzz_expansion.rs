#![no_main]

use libfuzzer_sys::fuzz_target;
use referral_tree::{build_tree, ExpansionState, FlatMap, UserRecord, ViewMode};

/// Fuzz view transitions over a tree shaped by the input
/// Revealed nodes must stay visible until the next collapse or mode switch
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Each byte attaches a new user under an earlier one
    let mut map = FlatMap::new();
    map.insert("u0", UserRecord::new("root"));
    for (i, byte) in data.iter().enumerate().take(256) {
        let id = i + 1;
        let parent = format!("u{}", *byte as usize % id);
        let Some(record) = map.get_mut(&parent) else {
            continue;
        };
        let child = format!("u{id}");
        if record.left_child.is_none() {
            record.left_child = Some(child.clone());
        } else if record.right_child.is_none() {
            record.right_child = Some(child.clone());
        } else {
            continue;
        }
        map.insert(child, UserRecord::new(format!("n{byte}")).with_referral(parent));
    }

    let tree = build_tree(&map).tree.unwrap();
    let mut view = ExpansionState::with_mode(&tree, ViewMode::DepthLimited(1));
    let mut revealed = Vec::new();

    for byte in data {
        let target = format!("u{}", *byte as usize % map.len());
        match byte % 4 {
            0 => {
                view.set_mode(&tree, ViewMode::DepthLimited((*byte / 4) as usize % 8));
                revealed.clear();
            }
            1 => {
                view.toggle(&target);
                revealed.clear();
            }
            2 => {
                if view.reveal_node(&tree, &target).is_ok() {
                    revealed.push(target);
                }
            }
            _ => {
                let paths = tree.search(&target);
                view.reveal_search(&tree, &paths).unwrap();
            }
        }
        for id in &revealed {
            assert!(view.is_visible(&tree, id).unwrap());
        }
    }

    view.retain_known(&tree);
    let _ = view.visible_nodes(&tree);
});
