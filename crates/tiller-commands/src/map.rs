//! Prefix trie mapping whitespace-delimited alias paths to commands.
//!
//! Each node keys its children by path segment and holds the commands whose
//! aliases end exactly at that node (several when overloads share the alias).
//! Lookup selects the **longest** registered alias that is a prefix of the
//! input on a segment boundary, so a shorter alias ("math") never shadows a
//! longer one ("math add").

use std::collections::HashMap;
use std::sync::Arc;

use tiller_types::BuildError;

use crate::info::CommandInfo;

#[derive(Default)]
struct MapNode {
    children: HashMap<String, MapNode>,
    /// Commands terminating at this node. Overloads (distinct arities) share
    /// the node.
    commands: Vec<Arc<CommandInfo>>,
}

/// The command trie.
///
/// Keys are stored as given; the service normalizes alias case before
/// insertion, and lookups normalize each input segment to match.
#[derive(Default)]
pub struct CommandMap {
    root: MapNode,
}

/// Split `input` on `separator`, yielding each segment with the byte offset
/// of its end. Consecutive separators produce no empty segments.
fn segments(input: &str, separator: char) -> Vec<(&str, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if c == separator {
            if start < i {
                out.push((&input[start..i], i));
            }
            start = i + c.len_utf8();
        }
    }
    if start < input.len() {
        out.push((&input[start..], input.len()));
    }
    out
}

impl CommandMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a command at its canonical path.
    ///
    /// Fails with `DuplicatePath` if a command with the same arity already
    /// terminates at the path; distinct arities coexist as overloads.
    pub fn insert(
        &mut self,
        path: &str,
        separator: char,
        command: Arc<CommandInfo>,
    ) -> Result<(), BuildError> {
        let node = self.node_mut(path, separator);
        if node.commands.iter().any(|c| c.arity() == command.arity()) {
            return Err(BuildError::DuplicatePath {
                path: path.to_string(),
                arity: command.arity(),
            });
        }
        node.commands.push(command);
        Ok(())
    }

    /// Insert a secondary alias. Unlike canonical insertion this never fails:
    /// distinct commands may share an alias, with dispatch priority deciding
    /// the order they are tried in.
    pub fn insert_alias(&mut self, path: &str, separator: char, command: Arc<CommandInfo>) {
        let node = self.node_mut(path, separator);
        if !node.commands.iter().any(|c| Arc::ptr_eq(c, &command)) {
            node.commands.push(command);
        }
    }

    fn node_mut(&mut self, path: &str, separator: char) -> &mut MapNode {
        let mut node = &mut self.root;
        for (seg, _) in segments(path, separator) {
            node = node.children.entry(seg.to_string()).or_default();
        }
        node
    }

    /// Remove `command` from the node at `path`, pruning emptied nodes.
    pub fn remove(&mut self, path: &str, separator: char, command: &Arc<CommandInfo>) {
        fn recurse(node: &mut MapNode, segs: &[&str], command: &Arc<CommandInfo>) -> bool {
            match segs.split_first() {
                None => node.commands.retain(|c| !Arc::ptr_eq(c, command)),
                Some((head, tail)) => {
                    if let Some(child) = node.children.get_mut(*head) {
                        if recurse(child, tail, command) {
                            node.children.remove(*head);
                        }
                    }
                }
            }
            node.commands.is_empty() && node.children.is_empty()
        }
        let segs: Vec<&str> = segments(path, separator).into_iter().map(|(s, _)| s).collect();
        recurse(&mut self.root, &segs, command);
    }

    /// Resolve the longest registered alias that is a prefix of `input`.
    ///
    /// Returns every command at the matched node plus the remaining input
    /// after the alias (leading separators stripped, original casing kept).
    pub fn resolve_longest<'a>(
        &self,
        input: &'a str,
        separator: char,
        case_insensitive: bool,
    ) -> Option<(Vec<Arc<CommandInfo>>, &'a str)> {
        let mut node = &self.root;
        let mut best: Option<(&MapNode, usize)> = None;
        for (seg, end) in segments(input, separator) {
            let child = if case_insensitive {
                node.children.get(&seg.to_lowercase())
            } else {
                node.children.get(seg)
            };
            match child {
                Some(next) => {
                    node = next;
                    if !node.commands.is_empty() {
                        best = Some((node, end));
                    }
                }
                None => break,
            }
        }
        best.map(|(node, end)| {
            let remainder = input[end..].trim_start_matches(separator);
            (node.commands.clone(), remainder)
        })
    }

    /// Exact lookup with ancestor fallback: the commands at `path`, or at the
    /// nearest ancestor holding any, or empty. Lets a group-level handler
    /// service unmatched sub-paths.
    pub fn get_with_fallback(
        &self,
        path: &str,
        separator: char,
        case_insensitive: bool,
    ) -> Vec<Arc<CommandInfo>> {
        let mut trail: Vec<&MapNode> = vec![&self.root];
        let mut node = &self.root;
        for (seg, _) in segments(path, separator) {
            let child = if case_insensitive {
                node.children.get(&seg.to_lowercase())
            } else {
                node.children.get(seg)
            };
            match child {
                Some(next) => {
                    node = next;
                    trail.push(node);
                }
                None => break,
            }
        }
        trail
            .iter()
            .rev()
            .find(|n| !n.commands.is_empty())
            .map(|n| n.commands.clone())
            .unwrap_or_default()
    }

    /// Total number of (alias, command) registrations in the trie.
    pub fn len(&self) -> usize {
        fn count(node: &MapNode) -> usize {
            node.commands.len() + node.children.values().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler;
    use tiller_types::RunMode;

    fn command(path: &str, arity: usize) -> Arc<CommandInfo> {
        let parameters = (0..arity)
            .map(|i| {
                crate::info::ParameterInfo::new(
                    format!("p{i}"),
                    crate::value::TypeTag::of::<String>(),
                    Arc::new(crate::reader::PrimitiveReader::<String>::new()),
                    false,
                    false,
                    false,
                    None,
                )
            })
            .collect();
        Arc::new(CommandInfo::new(
            path.rsplit(' ').next().unwrap_or(path).to_string(),
            path.to_string(),
            String::new(),
            vec![path.to_string()],
            None,
            parameters,
            Vec::new(),
            RunMode::Sync,
            0,
            handler(|_ctx, _args| async { Ok(()) }),
        ))
    }

    #[test]
    fn test_duplicate_canonical_path_rejected_first_intact() {
        let mut map = CommandMap::new();
        let first = command("math add", 0);
        map.insert("math add", ' ', Arc::clone(&first)).expect("first insert");

        let err = map
            .insert("math add", ' ', command("math add", 0))
            .expect_err("duplicate");
        assert!(matches!(err, BuildError::DuplicatePath { .. }));

        // The first registration is untouched.
        let (found, _) = map.resolve_longest("math add", ' ', false).expect("found");
        assert_eq!(found.len(), 1);
        assert!(Arc::ptr_eq(&found[0], &first));
    }

    #[test]
    fn test_overloads_with_distinct_arity_share_a_path() {
        let mut map = CommandMap::new();
        map.insert("math add", ' ', command("math add", 2)).expect("2-ary");
        map.insert("math add", ' ', command("math add", 3)).expect("3-ary");

        let (found, rest) = map
            .resolve_longest("math add 1 2 3", ' ', false)
            .expect("found");
        assert_eq!(found.len(), 2);
        assert_eq!(rest, "1 2 3");
    }

    #[test]
    fn test_longest_alias_wins() {
        let mut map = CommandMap::new();
        map.insert("a", ' ', command("a", 0)).expect("a");
        map.insert("a b", ' ', command("a b", 0)).expect("a b");

        let (found, rest) = map.resolve_longest("a b c", ' ', false).expect("found");
        assert_eq!(found[0].path(), "a b");
        assert_eq!(rest, "c");

        // With only the short alias matching, it is still selected.
        let (found, rest) = map.resolve_longest("a x y", ' ', false).expect("found");
        assert_eq!(found[0].path(), "a");
        assert_eq!(rest, "x y");
    }

    #[test]
    fn test_remainder_keeps_original_casing_under_insensitive_lookup() {
        let mut map = CommandMap::new();
        map.insert("math add", ' ', command("math add", 1)).expect("insert");

        let (found, rest) = map
            .resolve_longest("MATH Add Hello", ' ', true)
            .expect("insensitive match");
        assert_eq!(found[0].path(), "math add");
        assert_eq!(rest, "Hello");
    }

    #[test]
    fn test_no_match_returns_none() {
        let mut map = CommandMap::new();
        map.insert("math add", ' ', command("math add", 0)).expect("insert");
        assert!(map.resolve_longest("math multiply 2 3", ' ', false).is_none());
        assert!(map.resolve_longest("", ' ', false).is_none());
    }

    #[test]
    fn test_fallback_walks_up_to_group_handler() {
        let mut map = CommandMap::new();
        map.insert("git", ' ', command("git", 1)).expect("group default");
        map.insert("git push", ' ', command("git push", 0)).expect("leaf");

        // Exact hit.
        let found = map.get_with_fallback("git push", ' ', false);
        assert_eq!(found[0].path(), "git push");

        // Unknown sub-path falls back to the group command.
        let found = map.get_with_fallback("git frobnicate", ' ', false);
        assert_eq!(found[0].path(), "git");

        // Nothing anywhere on the chain.
        assert!(map.get_with_fallback("svn up", ' ', false).is_empty());
    }

    #[test]
    fn test_remove_prunes_empty_nodes() {
        let mut map = CommandMap::new();
        let cmd = command("math add", 0);
        map.insert("math add", ' ', Arc::clone(&cmd)).expect("insert");
        map.insert("math sub", ' ', command("math sub", 0)).expect("insert");

        map.remove("math add", ' ', &cmd);
        assert!(map.resolve_longest("math add", ' ', false).is_none());

        // Sibling still resolvable.
        assert!(map.resolve_longest("math sub", ' ', false).is_some());
        assert_eq!(map.len(), 1);
    }
}
