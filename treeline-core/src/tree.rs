//! Parameter dependency tree.
//!
//! A [`ParamTree`] declares, per command, which values are legal at each
//! argument position and how later positions depend on earlier choices.
//! The tree is built once at registration time via [`TreeBuilder`] and is
//! immutable afterwards; the [`Validator`](crate::Validator) and
//! [`Completer`](crate::Completer) walk it read-only.

use std::collections::BTreeMap;

/// Inclusive numeric range for a numeric argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericConstraint {
    pub min: i64,
    pub max: i64,
}

impl NumericConstraint {
    /// Check whether a parsed value falls inside the range.
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A node in the parameter tree: the set of legal values at one argument
/// position, given the path of values that led here.
///
/// A node is *enumerated* (non-empty `candidates`), *numeric*
/// (`numeric` set, `candidates` empty), or *open* (neither: any token is
/// accepted, still eligible for a `children` transition by literal match).
/// A candidate with no `children` entry is a leaf value: argument parsing
/// stops there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamNode {
    /// Legal literal values at this position, in declaration order.
    pub candidates: Vec<String>,
    /// Next-position nodes, reachable only after the keyed value was chosen.
    pub children: BTreeMap<String, ParamNode>,
    /// Numeric range, meaningful only when `candidates` is empty.
    pub numeric: Option<NumericConstraint>,
}

impl ParamNode {
    /// Whether this node enumerates its legal values.
    pub fn is_enumerated(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Walk `path` through `children`, creating empty nodes on demand.
    fn node_at_mut(&mut self, path: &[&str]) -> &mut ParamNode {
        let mut current = self;
        for key in path {
            current = current.children.entry((*key).to_string()).or_default();
        }
        current
    }
}

/// An immutable, fully declared parameter tree for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamTree {
    root: ParamNode,
}

impl ParamTree {
    /// The root node, governing the first argument position.
    pub fn root(&self) -> &ParamNode {
        &self.root
    }

    /// Optional post-construction consistency check.
    ///
    /// Construction is deliberately permissive: a declared child value
    /// need not appear in its parent's candidates, and a node may carry
    /// both candidates and a numeric range. This diagnostic reports such
    /// declarations without enforcing anything at runtime, so a command's
    /// declared tree can be checked as test-suite input.
    pub fn check_consistency(&self) -> Vec<String> {
        let mut findings = Vec::new();
        Self::check_node(&self.root, &mut Vec::new(), &mut findings);
        findings
    }

    fn check_node(node: &ParamNode, path: &mut Vec<String>, findings: &mut Vec<String>) {
        let at = if path.is_empty() {
            "<root>".to_string()
        } else {
            path.join(" ")
        };

        if node.is_enumerated() && node.numeric.is_some() {
            findings.push(format!(
                "node '{at}' declares both candidates and a numeric range"
            ));
        }
        for key in node.children.keys() {
            if node.is_enumerated() && !node.candidates.iter().any(|c| c == key) {
                findings.push(format!(
                    "child '{key}' of node '{at}' is not among its candidates"
                ));
            }
        }
        for (key, child) in &node.children {
            path.push(key.clone());
            Self::check_node(child, path, findings);
            path.pop();
        }
    }
}

/// Incremental builder for a [`ParamTree`].
///
/// Paths are sequences of literal values leading to the node being
/// declared; intermediate nodes are created on demand. No shape
/// validation happens here — see [`ParamTree::check_consistency`].
///
/// ```
/// use treeline_core::TreeBuilder;
///
/// let tree = TreeBuilder::new()
///     .root(&["device1", "timeout"])
///     .node(&["device1"], &["light", "sound"])
///     .node(&["device1", "light"], &["0", "1", "2"])
///     .numeric(&["timeout"], 1, 600)
///     .build();
/// assert!(tree.check_consistency().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    root: ParamNode,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the candidates legal at the first argument position.
    pub fn root(mut self, candidates: &[&str]) -> Self {
        self.root.candidates = candidates.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Declare the candidates legal after the given path of values.
    pub fn node(mut self, path: &[&str], candidates: &[&str]) -> Self {
        let node = self.root.node_at_mut(path);
        node.candidates = candidates.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Declare the position after `path` as numeric with an inclusive range.
    /// Clears any previously declared candidates at that node.
    pub fn numeric(mut self, path: &[&str], min: i64, max: i64) -> Self {
        let node = self.root.node_at_mut(path);
        node.candidates.clear();
        node.numeric = Some(NumericConstraint { min, max });
        self
    }

    pub fn build(self) -> ParamTree {
        ParamTree { root: self.root }
    }
}
