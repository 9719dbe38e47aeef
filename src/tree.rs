//! The category tree: categories containing further categories or leaf rows
//! of selectable items.

use std::fmt;
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::{Keywords, RawNode};
use crate::error::ConfigError;

/// One selectable glyph and its searchable keyword string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    glyph: String,
    keywords: String,
}

impl Item {
    /// Create an item. Keywords are lower-cased for comparison.
    pub fn new(glyph: impl Into<String>, keywords: impl AsRef<str>) -> Self {
        Self {
            glyph: glyph.into(),
            keywords: keywords.as_ref().to_lowercase(),
        }
    }

    /// The glyph inserted into the host on commit.
    pub fn glyph(&self) -> &str {
        &self.glyph
    }

    /// Comma-joined keyword string: own name first, then the ancestor path.
    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    /// The primary keyword (the item's own name), empty when none was declared.
    pub fn name(&self) -> &str {
        self.keywords.split(',').next().unwrap_or_default()
    }

    /// Whether `needle` (already lower-cased) appears contiguously in the keywords.
    pub fn matches(&self, needle: &str) -> bool {
        self.keywords.contains(needle)
    }
}

/// A node of the category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A branch grouping leaves or further categories.
    Category { name: String, children: Vec<Node> },
    /// A row of items under one subcategory label. Never empty.
    Leaf { name: String, items: Vec<Arc<Item>> },
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Category { name, .. } | Node::Leaf { name, .. } => name,
        }
    }

    /// All items under this node, depth first, in declaration order.
    pub fn items(&self) -> Vec<&Arc<Item>> {
        fn collect<'a>(node: &'a Node, out: &mut Vec<&'a Arc<Item>>) {
            match node {
                Node::Category { children, .. } => {
                    for child in children {
                        collect(child, out);
                    }
                }
                Node::Leaf { items, .. } => out.extend(items.iter()),
            }
        }
        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }

    /// Number of items under this node.
    pub fn item_count(&self) -> usize {
        match self {
            Node::Category { children, .. } => children.iter().map(Node::item_count).sum(),
            Node::Leaf { items, .. } => items.len(),
        }
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Category { children, .. } => children.iter().find(|c| c.name() == name),
            Node::Leaf { .. } => None,
        }
    }
}

/// Renders an indented outline, one line per category and one per leaf:
///
/// ```text
/// Faces
///   Happy: 🙂 😀
/// ```
///
/// The unnamed root is not printed.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(node: &Node, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let indent = "  ".repeat(depth);
            match node {
                Node::Category { name, children } => {
                    writeln!(f, "{indent}{name}")?;
                    for child in children {
                        write_node(child, depth + 1, f)?;
                    }
                }
                Node::Leaf { name, items } => {
                    let glyphs: Vec<&str> = items.iter().map(|i| i.glyph()).collect();
                    writeln!(f, "{indent}{name}: {}", glyphs.join(" "))?;
                }
            }
            Ok(())
        }

        match self {
            Node::Category { name, children } if name.is_empty() => {
                for child in children {
                    write_node(child, 0, f)?;
                }
                Ok(())
            }
            node => write_node(node, 0, f),
        }
    }
}

/// Split an emoji string into grapheme clusters, dropping whitespace.
///
/// ZWJ sequences, flags, keycaps and skin-tone modified glyphs each come out
/// as a single unit.
pub fn split_glyphs(s: &str) -> Vec<&str> {
    s.graphemes(true)
        .filter(|g| !g.chars().all(char::is_whitespace))
        .collect()
}

/// Build the category tree from raw configuration.
///
/// Each item's keywords are its declared name (if any) followed by every
/// ancestor name down to its leaf, comma-joined and lower-cased. Leaves
/// that split into no glyphs are dropped, as are categories left empty.
pub fn build(raw: &RawNode, keywords: &Keywords) -> Result<Node, ConfigError> {
    let RawNode::Branch(entries) = raw else {
        return Err(ConfigError::InvalidLeaf {
            path: "(root)".to_string(),
            found: "a string",
        });
    };
    let children = build_children(entries, keywords, &[])?;
    let root = Node::Category {
        name: String::new(),
        children,
    };
    tracing::debug!(items = root.item_count(), "built category tree");
    Ok(root)
}

fn build_children(
    entries: &[(String, RawNode)],
    keywords: &Keywords,
    path: &[&str],
) -> Result<Vec<Node>, ConfigError> {
    let leaves = entries
        .iter()
        .filter(|(_, node)| matches!(node, RawNode::Leaf(_)))
        .count();
    if leaves != 0 && leaves != entries.len() {
        return Err(ConfigError::MixedChildren {
            path: if path.is_empty() {
                "(root)".to_string()
            } else {
                path.join("/")
            },
        });
    }

    let mut nodes = Vec::with_capacity(entries.len());
    for (name, node) in entries {
        let mut child_path = path.to_vec();
        child_path.push(name);
        match node {
            RawNode::Branch(children) => {
                let children = build_children(children, keywords, &child_path)?;
                if !children.is_empty() {
                    nodes.push(Node::Category {
                        name: name.clone(),
                        children,
                    });
                }
            }
            RawNode::Leaf(glyphs) => {
                let ancestry = child_path.join(",");
                let items: Vec<Arc<Item>> = split_glyphs(glyphs)
                    .into_iter()
                    .map(|glyph| {
                        let own = keywords.get(glyph).map(String::as_str).unwrap_or_default();
                        Arc::new(Item::new(glyph, format!("{own},{ancestry}")))
                    })
                    .collect();
                if items.is_empty() {
                    tracing::debug!(leaf = %child_path.join("/"), "dropping empty leaf");
                    continue;
                }
                nodes.push(Node::Leaf {
                    name: name.clone(),
                    items,
                });
            }
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn faces() -> RawNode {
        RawNode::branch([(
            "Faces",
            RawNode::branch([
                ("Happy", RawNode::leaf("🙂😀")),
                ("Sad", RawNode::leaf("🙁")),
            ]),
        )])
    }

    fn keywords() -> Keywords {
        [("🙂", "slight"), ("😀", "grin"), ("🙁", "frown")]
            .into_iter()
            .map(|(g, k)| (g.to_string(), k.to_string()))
            .collect()
    }

    #[test]
    fn test_split_keeps_zwj_sequence_whole() {
        let family = "👨\u{200D}👩\u{200D}👧\u{200D}👦";
        let input = format!("🙂{family}😀");
        assert_eq!(split_glyphs(&input), vec!["🙂", family, "😀"]);
    }

    #[test]
    fn test_split_keeps_flags_skin_tones_and_keycaps() {
        let input = "🇺🇸👍🏽1\u{FE0F}\u{20E3}❤\u{FE0F}";
        assert_eq!(
            split_glyphs(input),
            vec!["🇺🇸", "👍🏽", "1\u{FE0F}\u{20E3}", "❤\u{FE0F}"]
        );
    }

    #[test]
    fn test_split_drops_whitespace() {
        assert_eq!(split_glyphs(" 🙂  😀\n🙁\t"), vec!["🙂", "😀", "🙁"]);
        assert!(split_glyphs("   ").is_empty());
    }

    #[test]
    fn test_build_keywords_include_ancestors() {
        let tree = build(&faces(), &keywords()).unwrap();
        let items = tree.items();
        let pairs: Vec<(&str, &str)> = items.iter().map(|i| (i.glyph(), i.keywords())).collect();
        assert_eq!(
            pairs,
            vec![
                ("🙂", "slight,faces,happy"),
                ("😀", "grin,faces,happy"),
                ("🙁", "frown,faces,sad"),
            ]
        );
        assert_eq!(items[1].name(), "grin");
    }

    #[test]
    fn test_build_without_keyword_starts_with_empty_field() {
        let tree = build(&faces(), &Keywords::new()).unwrap();
        let items = tree.items();
        assert_eq!(items[0].keywords(), ",faces,happy");
        assert_eq!(items[0].name(), "");
    }

    #[test]
    fn test_build_preserves_order() {
        let raw = RawNode::branch([
            ("Zeta", RawNode::branch([("z", RawNode::leaf("🅰"))])),
            ("Alpha", RawNode::branch([("a", RawNode::leaf("🅱"))])),
        ]);
        let tree = build(&raw, &Keywords::new()).unwrap();
        insta::assert_snapshot!(tree.to_string(), @r"
        Zeta
          z: 🅰
        Alpha
          a: 🅱
        ");
    }

    #[test]
    fn test_build_drops_empty_leaves_and_categories() {
        let raw = RawNode::branch([
            (
                "Faces",
                RawNode::branch([("Happy", RawNode::leaf("🙂")), ("Blank", RawNode::leaf("  "))]),
            ),
            ("Empty", RawNode::branch([("Nothing", RawNode::leaf(""))])),
        ]);
        let tree = build(&raw, &Keywords::new()).unwrap();
        insta::assert_snapshot!(tree.to_string(), @r"
        Faces
          Happy: 🙂
        ");
    }

    #[test]
    fn test_build_rejects_mixed_children() {
        let raw = RawNode::branch([(
            "Faces",
            RawNode::branch([
                ("Happy", RawNode::leaf("🙂")),
                ("More", RawNode::branch([("Sad", RawNode::leaf("🙁"))])),
            ]),
        )]);
        match build(&raw, &Keywords::new()) {
            Err(ConfigError::MixedChildren { path }) => assert_eq!(path, "Faces"),
            other => panic!("expected MixedChildren, got {other:?}"),
        }
    }

    #[test]
    fn test_build_nested_categories() {
        let raw = RawNode::branch([(
            "Symbols",
            RawNode::branch([(
                "Arrows",
                RawNode::branch([("Straight", RawNode::leaf("⬆⬇"))]),
            )]),
        )]);
        let tree = build(&raw, &Keywords::new()).unwrap();
        assert_eq!(tree.items()[0].keywords(), ",symbols,arrows,straight");
        let arrows = tree.child("Symbols").and_then(|s| s.child("Arrows"));
        assert!(matches!(arrows, Some(Node::Category { .. })));
    }

    #[test]
    fn test_item_equality_is_by_value() {
        assert_eq!(Item::new("🙂", "A"), Item::new("🙂", "a"));
        assert_ne!(Item::new("🙂", "a"), Item::new("😀", "a"));
    }
}
