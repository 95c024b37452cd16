//! Argument completion against a parameter tree.
//!
//! Called while the user is mid-typing: the walker follows the already
//! typed tokens through the tree and prefix-filters the candidates at
//! the reached node. A divergent path yields no suggestions — that is
//! correct behavior, not an error.

use crate::tree::{ParamNode, ParamTree};

/// A read-only tree walker producing completion candidates.
///
/// Holds a non-owning reference to the tree, like
/// [`Validator`](crate::Validator).
#[derive(Debug, Clone, Copy)]
pub struct Completer<'a> {
    root: &'a ParamNode,
}

impl<'a> Completer<'a> {
    pub fn new(tree: &'a ParamTree) -> Self {
        Self { root: tree.root() }
    }

    /// Suggest candidates for the argument at `param_index`.
    ///
    /// `tokens[0]` is the command name; tokens 1..`param_index` must
    /// exactly retrace a declared path. `current_input` is the in-progress
    /// token (possibly empty). Matching is case-sensitive and the result
    /// preserves declaration order.
    pub fn complete(
        &self,
        tokens: &[String],
        param_index: usize,
        current_input: &str,
    ) -> Vec<String> {
        if param_index < 1 {
            // The command name is completed by the registry, not here.
            return Vec::new();
        }

        let mut current = self.root;
        for token in tokens.iter().take(param_index).skip(1) {
            match current.children.get(token.as_str()) {
                Some(child) => current = child,
                None => return Vec::new(),
            }
        }
        if param_index > tokens.len() {
            return Vec::new();
        }

        current
            .candidates
            .iter()
            .filter(|c| c.starts_with(current_input))
            .cloned()
            .collect()
    }
}

/// Longest shared leading substring across a candidate set.
///
/// Used by the line editor for single-keystroke extension: the prefix is
/// itself a prefix of every candidate, and the longest such string.
/// Returns an empty string for an empty set.
pub fn longest_common_prefix(candidates: &[String]) -> String {
    let Some(first) = candidates.first() else {
        return String::new();
    };
    let mut prefix = first.as_str();
    for candidate in &candidates[1..] {
        let shared = prefix
            .char_indices()
            .zip(candidate.chars())
            .take_while(|((_, a), b)| a == b)
            .count();
        let end = prefix
            .char_indices()
            .nth(shared)
            .map_or(prefix.len(), |(idx, _)| idx);
        prefix = &prefix[..end];
        if prefix.is_empty() {
            break;
        }
    }
    prefix.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;
    use pretty_assertions::assert_eq;

    fn tokens(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    fn device_tree() -> ParamTree {
        TreeBuilder::new()
            .root(&["device1", "device2", "timeout"])
            .node(&["device1"], &["light", "sound"])
            .node(&["device1", "light"], &["0", "1", "2"])
            .numeric(&["timeout"], 1, 600)
            .build()
    }

    #[test]
    fn test_root_candidates_with_empty_input() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        assert_eq!(
            c.complete(&tokens(&["set", ""]), 1, ""),
            vec!["device1", "device2", "timeout"]
        );
    }

    #[test]
    fn test_prefix_filter() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        assert_eq!(
            c.complete(&tokens(&["set", "dev"]), 1, "dev"),
            vec!["device1", "device2"]
        );
        assert_eq!(c.complete(&tokens(&["set", "t"]), 1, "t"), vec!["timeout"]);
    }

    #[test]
    fn test_second_level_completion() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        assert_eq!(
            c.complete(&tokens(&["set", "device1", ""]), 2, ""),
            vec!["light", "sound"]
        );
    }

    #[test]
    fn test_all_results_share_the_typed_prefix() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        for input in ["", "d", "de", "device", "device1"] {
            for result in c.complete(&tokens(&["set", input]), 1, input) {
                assert!(result.starts_with(input));
            }
        }
    }

    #[test]
    fn test_divergent_path_returns_empty() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        assert!(c.complete(&tokens(&["set", "bogus", ""]), 2, "").is_empty());
    }

    #[test]
    fn test_param_index_zero_returns_empty() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        assert!(c.complete(&tokens(&["set"]), 0, "se").is_empty());
    }

    #[test]
    fn test_numeric_node_has_no_candidates() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        assert!(c.complete(&tokens(&["set", "timeout", ""]), 2, "").is_empty());
    }

    #[test]
    fn test_path_deeper_than_typed_tokens_returns_empty() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        assert!(c.complete(&tokens(&["set"]), 3, "").is_empty());
    }

    #[test]
    fn test_case_sensitive_matching() {
        let tree = device_tree();
        let c = Completer::new(&tree);
        assert!(c.complete(&tokens(&["set", "DEV"]), 1, "DEV").is_empty());
    }

    #[test]
    fn test_lcp_basic() {
        let set = tokens(&["device1", "device2"]);
        assert_eq!(longest_common_prefix(&set), "device");
    }

    #[test]
    fn test_lcp_single_candidate_is_itself() {
        let set = tokens(&["timeout"]);
        assert_eq!(longest_common_prefix(&set), "timeout");
    }

    #[test]
    fn test_lcp_no_shared_prefix() {
        let set = tokens(&["light", "sound"]);
        assert_eq!(longest_common_prefix(&set), "");
    }

    #[test]
    fn test_lcp_empty_set() {
        assert_eq!(longest_common_prefix(&[]), "");
    }

    #[test]
    fn test_lcp_is_prefix_of_every_candidate() {
        let set = tokens(&["restart", "reset", "resume"]);
        let lcp = longest_common_prefix(&set);
        assert_eq!(lcp, "res");
        for c in &set {
            assert!(c.starts_with(&lcp));
        }
        // Longest such string: extending by one char breaks the property.
        assert!(!set.iter().all(|c| c.starts_with("rest")));
    }

    #[test]
    fn test_lcp_multibyte_safe() {
        let set = tokens(&["naïve", "naïf"]);
        assert_eq!(longest_common_prefix(&set), "naï");
    }
}
