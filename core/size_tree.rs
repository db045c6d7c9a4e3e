use crate::bundle::PackageBundle;
use crate::stats::ProcessingStats;
use log;
use serde::{Deserialize, Serialize};

pub const ROOT_NODE_NAME: &str = "root";

/// Node of the size hierarchy handed to the visualization. Serializes as
/// `{name, children}` for directories and `{name, value}` for files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeTreeNode {
    Internal {
        name: String,
        children: Vec<SizeTreeNode>,
    },
    Leaf {
        name: String,
        value: u64,
    },
}

impl SizeTreeNode {
    fn internal(name: &str) -> Self {
        SizeTreeNode::Internal {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SizeTreeNode::Internal { name, .. } | SizeTreeNode::Leaf { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[SizeTreeNode] {
        match self {
            SizeTreeNode::Internal { children, .. } => children,
            SizeTreeNode::Leaf { .. } => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, SizeTreeNode::Leaf { .. })
    }

    /// Sum of every leaf value below (or at) this node.
    pub fn total_size(&self) -> u64 {
        match self {
            SizeTreeNode::Leaf { value, .. } => *value,
            SizeTreeNode::Internal { children, .. } => {
                children.iter().map(SizeTreeNode::total_size).sum()
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            SizeTreeNode::Leaf { .. } => 1,
            SizeTreeNode::Internal { children, .. } => {
                children.iter().map(SizeTreeNode::leaf_count).sum()
            }
        }
    }
}

/// Payload consumed by the visualization renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationData {
    pub tree: SizeTreeNode,
    pub stats: ProcessingStats,
}

/// Builds `root -> package -> directories... -> file` with each file leaf
/// holding its UTF-8 byte size. Directories are merged by name among the
/// children of the same parent; leaves are never merged.
pub fn build_size_tree(bundle: &PackageBundle) -> SizeTreeNode {
    let mut packages = Vec::with_capacity(bundle.package_count());

    for (package_name, files) in bundle.packages() {
        let mut package_children: Vec<SizeTreeNode> = Vec::new();
        for (relative_path, content) in files {
            insert_file(&mut package_children, relative_path, content.len() as u64);
        }
        packages.push(SizeTreeNode::Internal {
            name: package_name.to_string(),
            children: package_children,
        });
    }

    let root = SizeTreeNode::Internal {
        name: ROOT_NODE_NAME.to_string(),
        children: packages,
    };
    log::debug!(
        "Built size tree with {} leaves, {} bytes",
        root.leaf_count(),
        root.total_size()
    );
    root
}

fn insert_file(level: &mut Vec<SizeTreeNode>, relative_path: &str, size: u64) {
    let mut segments: Vec<&str> = relative_path.split('/').collect();
    let file_name = segments.pop().unwrap_or_default();

    let mut current = level;
    for segment in segments {
        let index = match current
            .iter()
            .position(|node| !node.is_leaf() && node.name() == segment)
        {
            Some(index) => index,
            None => {
                current.push(SizeTreeNode::internal(segment));
                current.len() - 1
            }
        };
        current = match &mut current[index] {
            SizeTreeNode::Internal { children, .. } => children,
            SizeTreeNode::Leaf { .. } => unreachable!("position() only selects internal nodes"),
        };
    }

    current.push(SizeTreeNode::Leaf {
        name: file_name.to_string(),
        value: size,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_nested_hierarchy_per_package() {
        let mut bundle = PackageBundle::new();
        bundle.insert("web", "src/a.ts", "aaaa");
        bundle.insert("web", "src/lib/b.ts", "bb");
        bundle.insert("web", "src/c.ts", "c");
        bundle.insert("web", "index.ts", "✓");

        let tree = build_size_tree(&bundle);
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "name": "root",
                "children": [{
                    "name": "web",
                    "children": [
                        {
                            "name": "src",
                            "children": [
                                { "name": "a.ts", "value": 4 },
                                { "name": "lib", "children": [{ "name": "b.ts", "value": 2 }] },
                                { "name": "c.ts", "value": 1 }
                            ]
                        },
                        { "name": "index.ts", "value": 3 }
                    ]
                }]
            })
        );
        assert_eq!(tree.total_size(), bundle.source_size());
        assert_eq!(tree.leaf_count(), bundle.file_count());
    }

    #[test]
    fn same_directory_name_under_different_parents_stays_separate() {
        let mut bundle = PackageBundle::new();
        bundle.insert("pkg", "a/utils/x.ts", "x");
        bundle.insert("pkg", "b/utils/y.ts", "y");
        bundle.insert("pkg", "a/utils/z.ts", "z");

        let tree = build_size_tree(&bundle);
        let package = &tree.children()[0];
        assert_eq!(package.children().len(), 2);
        let a_utils = &package.children()[0].children()[0];
        assert_eq!(a_utils.name(), "utils");
        assert_eq!(a_utils.children().len(), 2);
        let b_utils = &package.children()[1].children()[0];
        assert_eq!(b_utils.children().len(), 1);
    }

    #[test]
    fn leaves_are_never_merged() {
        let mut bundle = PackageBundle::new();
        bundle.insert("one", "same.ts", "dup");
        bundle.insert("two", "same.ts", "dup");
        let tree = build_size_tree(&bundle);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.children().len(), 2);
    }

    #[test]
    fn file_named_like_a_directory_does_not_absorb_children() {
        let mut bundle = PackageBundle::new();
        bundle.insert("pkg", "lib", "file");
        bundle.insert("pkg", "lib/inner.ts", "in");
        let tree = build_size_tree(&bundle);
        let children = tree.children()[0].children();
        assert_eq!(children.len(), 2);
        assert!(children[0].is_leaf());
        assert!(!children[1].is_leaf());
    }

    #[test]
    fn empty_bundle_gives_bare_root() {
        let tree = build_size_tree(&PackageBundle::new());
        assert_eq!(tree.name(), ROOT_NODE_NAME);
        assert!(tree.children().is_empty());
        assert_eq!(tree.total_size(), 0);
    }

    #[test]
    fn visualization_payload_shape() {
        let mut bundle = PackageBundle::new();
        bundle.insert("pkg", "a.ts", "abc");
        let data = VisualizationData {
            tree: build_size_tree(&bundle),
            stats: ProcessingStats::compute(&bundle, "{}", 2),
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["tree"]["children"][0]["children"][0]["value"], 3);
        assert_eq!(value["stats"]["totalFiles"], 1);
        let back: VisualizationData = serde_json::from_value(value).unwrap();
        assert_eq!(back, data);
    }
}
