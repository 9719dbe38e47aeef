//! Query filtering over the category tree.
//!
//! Matching is plain case-insensitive substring containment against each
//! item's keyword string. There is no ranking: surviving items keep their
//! declaration order, and a branch survives only while it still holds at
//! least one item.

use std::sync::Arc;

use crate::tree::Node;

/// Prune `root` down to the items whose keywords contain `query`.
///
/// A blank query returns the full tree (the same allocation). `None` means no
/// item anywhere matched, which is distinct from a tree without categories.
pub fn filter(root: &Arc<Node>, query: &str) -> Option<Arc<Node>> {
    if query.trim().is_empty() {
        return Some(Arc::clone(root));
    }
    let needle = query.to_lowercase();
    let pruned = prune(root, &needle).map(Arc::new);
    tracing::debug!(
        query = %needle,
        matches = pruned.as_ref().map(|n| n.item_count()).unwrap_or(0),
        "filtered tree"
    );
    pruned
}

fn prune(node: &Node, needle: &str) -> Option<Node> {
    match node {
        Node::Leaf { name, items } => {
            let items: Vec<_> = items
                .iter()
                .filter(|item| item.matches(needle))
                .cloned()
                .collect();
            (!items.is_empty()).then(|| Node::Leaf {
                name: name.clone(),
                items,
            })
        }
        Node::Category { name, children } => {
            let children: Vec<Node> = children
                .iter()
                .filter_map(|child| prune(child, needle))
                .collect();
            (!children.is_empty()).then(|| Node::Category {
                name: name.clone(),
                children,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Keywords, RawNode};
    use crate::tree::build;
    use pretty_assertions::assert_eq;

    fn sample() -> Arc<Node> {
        let raw = RawNode::branch([
            (
                "Faces",
                RawNode::branch([
                    ("Happy", RawNode::leaf("🙂😀")),
                    ("Sad", RawNode::leaf("🙁")),
                ]),
            ),
            (
                "Animals",
                RawNode::branch([
                    ("Mammals", RawNode::leaf("🐶🐱")),
                    ("Birds", RawNode::leaf("🐦🐧")),
                ]),
            ),
        ]);
        let keywords: Keywords = [
            ("🙂", "slight"),
            ("😀", "grin"),
            ("🙁", "frown"),
            ("🐶", "dog"),
            ("🐱", "cat"),
            ("🐦", "bird"),
            ("🐧", "penguin"),
        ]
        .into_iter()
        .map(|(g, k)| (g.to_string(), k.to_string()))
        .collect();
        Arc::new(build(&raw, &keywords).unwrap())
    }

    fn glyphs(node: &Node) -> Vec<String> {
        node.items().iter().map(|i| i.glyph().to_string()).collect()
    }

    #[test]
    fn test_empty_query_returns_same_tree() {
        let tree = sample();
        for query in ["", "   ", "\t"] {
            let filtered = filter(&tree, query).unwrap();
            assert!(Arc::ptr_eq(&tree, &filtered));
            assert_eq!(glyphs(&filtered), glyphs(&tree));
        }
    }

    #[test]
    fn test_substring_match_prunes_branches() {
        let tree = sample();
        let filtered = filter(&tree, "gr").unwrap();
        insta::assert_snapshot!(filtered.to_string(), @r"
        Faces
          Happy: 😀
        ");
    }

    #[test]
    fn test_matching_and_non_matching_leaf_siblings() {
        let tree = sample();
        // "mammals" is part of the path keywords for the dog and cat only
        let filtered = filter(&tree, "mammals").unwrap();
        let animals = filtered.child("Animals").unwrap();
        assert!(animals.child("Mammals").is_some());
        assert!(animals.child("Birds").is_none());
        assert!(filtered.child("Faces").is_none());
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let tree = sample();
        assert_eq!(glyphs(&filter(&tree, "PENGUIN").unwrap()), vec!["🐧"]);
    }

    #[test]
    fn test_category_names_match_all_items() {
        let tree = sample();
        assert_eq!(
            glyphs(&filter(&tree, "faces").unwrap()),
            vec!["🙂", "😀", "🙁"]
        );
    }

    #[test]
    fn test_no_match_is_none() {
        let tree = sample();
        assert!(filter(&tree, "zebra").is_none());
    }

    #[test]
    fn test_query_must_be_contiguous() {
        let tree = sample();
        // all three letters of "dgo" appear in "dog", but not contiguously
        assert!(filter(&tree, "dgo").is_none());
        assert_eq!(glyphs(&filter(&tree, "og").unwrap()), vec!["🐶"]);
    }

    #[test]
    fn test_every_survivor_contains_query() {
        let tree = sample();
        for query in ["a", "s", "ir", "pp", ",", "e,"] {
            if let Some(filtered) = filter(&tree, query) {
                for item in filtered.items() {
                    assert!(
                        item.keywords().contains(query),
                        "{} should contain {query}",
                        item.keywords()
                    );
                }
            }
        }
    }

    #[test]
    fn test_survivors_share_items_with_source() {
        let tree = sample();
        let filtered = filter(&tree, "grin").unwrap();
        let source = tree.items();
        let kept = filtered.items();
        assert!(Arc::ptr_eq(kept[0], source[1]));
    }

    #[test]
    fn test_source_tree_untouched() {
        let tree = sample();
        let before = tree.to_string();
        let _ = filter(&tree, "cat");
        assert_eq!(tree.to_string(), before);
    }

    #[test]
    fn test_empty_tree_with_blank_query_is_not_none() {
        let tree = Arc::new(Node::Category {
            name: String::new(),
            children: Vec::new(),
        });
        assert!(filter(&tree, "").is_some());
        assert!(filter(&tree, "x").is_none());
    }
}
