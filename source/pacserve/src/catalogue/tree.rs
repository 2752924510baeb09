//! The prefix tree: the in-memory structure that supports
//! longest-matching-CIDR-prefix lookup.

use std::fmt::Write as _;

use crate::catalogue::element::LookupElement;
use crate::ip::IpNet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub data: LookupElement,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(data: LookupElement) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }
}

/// The published, immutable catalogue: a rooted arborescence over
/// `0.0.0.0/0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub root: TreeNode,
}

impl Tree {
    /// Builds a tree from a flat list of rendered elements plus a
    /// fallback default (used when no explicit `0.0.0.0/0` element is
    /// present in `elements`).
    pub fn build(elements: Vec<LookupElement>, default_root: LookupElement) -> Self {
        let mut root = TreeNode::new(default_root);

        for element in elements {
            insert(&mut root, element);
        }

        // If the administrator supplied an explicit 0.0.0.0/0 zone, it
        // is the synthesised root's only child; promote it.
        let root = if root.children.len() == 1 && root.children[0].data.network().is_root() {
            root.children.into_iter().next().unwrap()
        } else {
            root
        };

        let mut root = root;
        simplify(&mut root);

        Tree { root }
    }

    pub fn lookup(&self, query: IpNet) -> (LookupElement, Vec<LookupElement>) {
        find(&self.root, query)
    }

    pub fn stringify(&self) -> String {
        let mut out = String::new();
        stringify_node(&self.root, 0, &mut out);
        out
    }
}

/// Inserts `element` into the subtree rooted at `node`, re-parenting any
/// existing children that are narrower than `element` underneath it.
///
/// Children are scanned in reverse so removal mid-scan can't invalidate
/// the index of an earlier, not-yet-visited child.
fn insert(node: &mut TreeNode, element: LookupElement) {
    for i in (0..node.children.len()).rev() {
        if element.is_subnet_of(&node.children[i].data) {
            insert(&mut node.children[i], element);
            return;
        }
    }

    let mut new_node = TreeNode::new(element);

    for i in (0..node.children.len()).rev() {
        let child_is_narrower = node.children[i].data.is_subnet_of(&new_node.data);
        let new_is_root_replacement = new_node.data.is_identical_net(&node.data);
        if child_is_narrower || new_is_root_replacement {
            let child = node.children.remove(i);
            new_node.children.push(child);
        }
    }

    node.children.push(new_node);
}

/// Post-order: drop any child whose network and PAC filename both match
/// its parent, adopting the dropped child's children in its place. Then
/// sort surviving children by (network-address, prefix-length).
fn simplify(node: &mut TreeNode) {
    for child in node.children.iter_mut() {
        simplify(child);
    }

    let mut simplified = Vec::with_capacity(node.children.len());
    for child in std::mem::take(&mut node.children) {
        let redundant = child.data.is_identical_net(&node.data) && child.data.is_identical_pac(&node.data);
        if redundant {
            simplified.extend(child.children);
        } else {
            simplified.push(child);
        }
    }

    simplified.sort_by(|a, b| {
        a.data
            .network()
            .network_address()
            .cmp(&b.data.network().network_address())
            .then(a.data.network().prefix_len().cmp(&b.data.network().prefix_len()))
    });

    node.children = simplified;
}

fn find(node: &TreeNode, query: IpNet) -> (LookupElement, Vec<LookupElement>) {
    for child in &node.children {
        if query.is_subnet_of(&child.data.network()) {
            let (matched, mut path) = find(child, query);
            path.insert(0, node.data.clone());
            return (matched, path);
        }
    }
    (node.data.clone(), vec![node.data.clone()])
}

fn stringify_node(node: &TreeNode, depth: usize, out: &mut String) {
    let _ = writeln!(
        out,
        "{}- {} | {}",
        "\t".repeat(depth),
        node.data.network(),
        node.data.filename().unwrap_or("<synthetic root>")
    );
    for child in &node.children {
        stringify_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(net: &str, prefix: i64, pac: &str) -> LookupElement {
        LookupElement::standard(
            IpNet::from_parts(net, prefix).unwrap(),
            pac.to_string(),
            format!("// {pac}"),
        )
    }

    fn default_root(text: &str) -> LookupElement {
        LookupElement::synthetic_root(text.to_string())
    }

    #[test]
    fn empty_catalogue_serves_default() {
        let tree = Tree::build(vec![], default_root("// default for Your Help Desk"));
        let (matched, path) = tree.lookup(IpNet::from_parts("10.1.2.3", 32).unwrap());
        assert_eq!(matched.rendered_text(), "// default for Your Help Desk");
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn two_nested_nets_insertion_order_reversed() {
        let elements = vec![
            el("192.168.0.0", 24, "b.pac"),
            el("192.168.0.0", 16, "a.pac"),
        ];
        let tree = Tree::build(elements, default_root("// default"));

        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.root.children[0].data.filename(), Some("a.pac"));
        assert_eq!(tree.root.children[0].children.len(), 1);
        assert_eq!(tree.root.children[0].children[0].data.filename(), Some("b.pac"));

        let (m1, _) = tree.lookup(IpNet::from_parts("192.168.0.5", 32).unwrap());
        assert_eq!(m1.filename(), Some("b.pac"));
        let (m2, _) = tree.lookup(IpNet::from_parts("192.168.1.5", 32).unwrap());
        assert_eq!(m2.filename(), Some("a.pac"));
        let (m3, _) = tree.lookup(IpNet::from_parts("10.0.0.1", 32).unwrap());
        assert_eq!(m3.filename(), None);
    }

    #[test]
    fn duplicate_network_simplification() {
        let elements = vec![
            el("192.168.0.0", 16, "a.pac"),
            el("192.168.0.0", 16, "a.pac"),
            el("192.168.0.0", 24, "c.pac"),
        ];
        let tree = Tree::build(elements, default_root("// default"));

        assert_eq!(tree.root.children.len(), 1);
        let a = &tree.root.children[0];
        assert_eq!(a.data.filename(), Some("a.pac"));
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].data.filename(), Some("c.pac"));

        let (m1, _) = tree.lookup(IpNet::from_parts("192.168.0.5", 32).unwrap());
        assert_eq!(m1.filename(), Some("c.pac"));
        let (m2, _) = tree.lookup(IpNet::from_parts("192.168.5.5", 32).unwrap());
        assert_eq!(m2.filename(), Some("a.pac"));
    }

    #[test]
    fn explicit_default_zone_becomes_root() {
        let elements = vec![
            el("0.0.0.0", 0, "root.pac"),
            el("10.0.0.0", 8, "inner.pac"),
        ];
        let tree = Tree::build(elements, default_root("// synthetic"));
        assert_eq!(tree.root.data.filename(), Some("root.pac"));
        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.root.children[0].data.filename(), Some("inner.pac"));
    }

    #[test]
    fn children_are_sorted_ascending() {
        let elements = vec![
            el("10.2.0.0", 16, "b.pac"),
            el("10.1.0.0", 16, "a.pac"),
            el("10.1.0.0", 24, "c.pac"),
        ];
        let tree = Tree::build(elements, default_root("// default"));
        let addrs: Vec<_> = tree
            .root
            .children
            .iter()
            .map(|c| (c.data.network().network_address().0, c.data.network().prefix_len()))
            .collect();
        let mut sorted = addrs.clone();
        sorted.sort();
        assert_eq!(addrs, sorted);
    }

    #[test]
    fn sibling_disjointness_and_parent_containment_hold() {
        let elements = vec![
            el("192.168.0.0", 16, "a.pac"),
            el("192.168.0.0", 24, "b.pac"),
            el("192.168.128.0", 24, "c.pac"),
            el("10.0.0.0", 8, "d.pac"),
        ];
        let tree = Tree::build(elements, default_root("// default"));
        assert_invariants(&tree.root);
    }

    fn assert_invariants(node: &TreeNode) {
        for (i, a) in node.children.iter().enumerate() {
            assert!(a.data.is_subnet_of(&node.data) || node.data.network().is_root());
            for (j, b) in node.children.iter().enumerate() {
                if i != j {
                    assert!(
                        !a.data.is_subnet_of(&b.data) || a.data.is_identical_net(&b.data),
                        "sibling disjointness violated"
                    );
                }
            }
        }
        for child in &node.children {
            assert_invariants(child);
        }
    }
}
