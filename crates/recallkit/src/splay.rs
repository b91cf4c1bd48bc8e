//! Self-adjusting binary search tree (splay tree)
//!
//! Every search or insert splays the touched key to the root, so keys that
//! were accessed recently sit on short paths. Splaying is done top-down with
//! explicit left/right assembly spines, so neither splaying nor dropping the
//! tree recurses on tree depth.

use std::cmp::Ordering;
use std::mem;

use tracing::trace;

use crate::stats::TreeStats;

type Link<K, V> = Option<Box<Node<K, V>>>;

/// Tree node; children are exclusively owned
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn boxed(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            left: None,
            right: None,
        })
    }
}

/// Which side of the current node the target lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Splay step, classified by where the target sits relative to the current
/// node and its child on the target's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Child is the target, or the search path ends at the child.
    Zig,
    /// Target continues below the child on the same side.
    ZigZig,
    /// Target continues below the child on the opposite side.
    ZigZag,
}

/// Splay tree mapping ordered keys to values.
///
/// Nodes are only ever added; the whole tree is discarded with [`clear`].
///
/// [`clear`]: AdjustingTree::clear
pub struct AdjustingTree<K, V> {
    root: Link<K, V>,
    len: usize,
    stats: TreeStats,
}

impl<K: Ord, V> AdjustingTree<K, V> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            stats: TreeStats::new(),
        }
    }

    /// Splay `key` to the root and return its value.
    ///
    /// On a miss the last node on the search path becomes the root and
    /// `None` is returned.
    pub fn search(&mut self, key: &K) -> Option<&V> {
        let root = match self.root.take() {
            Some(root) => self.splay(root, key),
            None => {
                self.stats.record_search(false);
                return None;
            }
        };

        let hit = root.key == *key;
        self.stats.record_search(hit);
        if !hit {
            trace!(len = self.len, "splay miss");
        }

        let root = self.root.insert(root);
        if hit {
            Some(&root.value)
        } else {
            None
        }
    }

    /// Insert or overwrite `key`, leaving it at the root.
    ///
    /// Returns the previous value when the key was already present; the tree
    /// shape is then exactly what the splay left behind.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut root = match self.root.take() {
            Some(root) => self.splay(root, &key),
            None => {
                self.root = Some(Node::boxed(key, value));
                self.len = 1;
                self.stats.record_insert();
                return None;
            }
        };

        let node = match key.cmp(&root.key) {
            Ordering::Equal => {
                let old = mem::replace(&mut root.value, value);
                self.root = Some(root);
                self.stats.record_update();
                return Some(old);
            }
            Ordering::Less => {
                let mut node = Node::boxed(key, value);
                node.left = root.left.take();
                node.right = Some(root);
                node
            }
            Ordering::Greater => {
                let mut node = Node::boxed(key, value);
                node.right = root.right.take();
                node.left = Some(root);
                node
            }
        };

        debug_assert!(locally_ordered(&node));
        self.root = Some(node);
        self.len += 1;
        self.stats.record_insert();
        None
    }

    /// Check membership without restructuring the tree
    pub fn contains(&self, key: &K) -> bool {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match key.cmp(&node.key) {
                Ordering::Equal => return true,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        false
    }

    /// Discard every node (full reset); statistics are kept
    pub fn clear(&mut self) {
        dismantle(self.root.take());
        self.len = 0;
    }

    /// Verify BST ordering and the node count.
    ///
    /// Returns a description of the first inconsistency found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut count = 0;
        let mut prev: Option<&K> = None;
        for (key, _) in self.iter() {
            if let Some(prev) = prev {
                if prev >= key {
                    return Err(format!("in-order position {} breaks key ordering", count));
                }
            }
            prev = Some(key);
            count += 1;
        }

        if count != self.len {
            return Err(format!("tree holds {} nodes, len is {}", count, self.len));
        }
        Ok(())
    }

    /// Top-down splay of `key` within the subtree `t`, returning the new root.
    fn splay(&mut self, mut t: Box<Node<K, V>>, key: &K) -> Box<Node<K, V>> {
        // Nodes known to be smaller (left) or larger (right) than the target,
        // in path order. Each is missing the child that pointed towards it.
        let mut left_spine: Vec<Box<Node<K, V>>> = Vec::new();
        let mut right_spine: Vec<Box<Node<K, V>>> = Vec::new();

        loop {
            let (side, step) = match key.cmp(&t.key) {
                Ordering::Equal => break,
                Ordering::Less => match t.left.as_deref() {
                    None => break,
                    Some(child) => (Side::Left, classify(key, child, Side::Left)),
                },
                Ordering::Greater => match t.right.as_deref() {
                    None => break,
                    Some(child) => (Side::Right, classify(key, child, Side::Right)),
                },
            };

            self.stats.record_rotations(match step {
                Step::Zig => 1,
                Step::ZigZig | Step::ZigZag => 2,
            });

            match (side, step) {
                (Side::Left, Step::Zig) => link_right(&mut t, &mut right_spine),
                (Side::Left, Step::ZigZig) => {
                    rotate_right(&mut t);
                    link_right(&mut t, &mut right_spine);
                }
                (Side::Left, Step::ZigZag) => {
                    link_right(&mut t, &mut right_spine);
                    link_left(&mut t, &mut left_spine);
                }
                (Side::Right, Step::Zig) => link_left(&mut t, &mut left_spine),
                (Side::Right, Step::ZigZig) => {
                    rotate_left(&mut t);
                    link_left(&mut t, &mut left_spine);
                }
                (Side::Right, Step::ZigZag) => {
                    link_left(&mut t, &mut left_spine);
                    link_right(&mut t, &mut right_spine);
                }
            }
        }

        let mut left = t.left.take();
        for mut node in left_spine.into_iter().rev() {
            node.right = left;
            left = Some(node);
        }
        t.left = left;

        let mut right = t.right.take();
        for mut node in right_spine.into_iter().rev() {
            node.left = right;
            right = Some(node);
        }
        t.right = right;

        t
    }
}

impl<K, V> AdjustingTree<K, V> {
    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Key currently at the root
    pub fn root_key(&self) -> Option<&K> {
        self.root.as_deref().map(|node| &node.key)
    }

    /// Get tree statistics
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// In-order iterator over entries, without restructuring the tree
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        let mut stack = Vec::new();
        push_left_path(&mut stack, self.root.as_deref());
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            push_left_path(&mut stack, node.right.as_deref());
            Some((&node.key, &node.value))
        })
    }

    /// In-order iterator over keys
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Node<K, V>, usize)> =
            self.root.as_deref().map(|n| (n, 1)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.left.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.right.as_deref().map(|n| (n, depth + 1)));
        }
        deepest
    }
}

impl<K: Ord, V> Default for AdjustingTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for AdjustingTree<K, V> {
    fn drop(&mut self) {
        dismantle(self.root.take());
    }
}

impl<K, V> std::fmt::Debug for AdjustingTree<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdjustingTree")
            .field("len", &self.len)
            .field("stats", &self.stats)
            .finish()
    }
}

fn classify<K: Ord, V>(key: &K, child: &Node<K, V>, side: Side) -> Step {
    match (side, key.cmp(&child.key)) {
        (Side::Left, Ordering::Less) if child.left.is_some() => Step::ZigZig,
        (Side::Left, Ordering::Greater) if child.right.is_some() => Step::ZigZag,
        (Side::Right, Ordering::Greater) if child.right.is_some() => Step::ZigZig,
        (Side::Right, Ordering::Less) if child.left.is_some() => Step::ZigZag,
        _ => Step::Zig,
    }
}

/// Target is left of `t`: park `t` on the right spine and descend left.
fn link_right<K, V>(t: &mut Box<Node<K, V>>, spine: &mut Vec<Box<Node<K, V>>>) {
    if let Some(child) = t.left.take() {
        spine.push(mem::replace(t, child));
    }
}

/// Target is right of `t`: park `t` on the left spine and descend right.
fn link_left<K, V>(t: &mut Box<Node<K, V>>, spine: &mut Vec<Box<Node<K, V>>>) {
    if let Some(child) = t.right.take() {
        spine.push(mem::replace(t, child));
    }
}

/// Lift the left child of `node` into its place.
fn rotate_right<K: Ord, V>(node: &mut Box<Node<K, V>>) {
    if let Some(mut child) = node.left.take() {
        node.left = child.right.take();
        mem::swap(node, &mut child);
        node.right = Some(child);
        debug_assert!(locally_ordered(node));
    }
}

/// Lift the right child of `node` into its place.
fn rotate_left<K: Ord, V>(node: &mut Box<Node<K, V>>) {
    if let Some(mut child) = node.right.take() {
        node.right = child.left.take();
        mem::swap(node, &mut child);
        node.left = Some(child);
        debug_assert!(locally_ordered(node));
    }
}

fn locally_ordered<K: Ord, V>(node: &Node<K, V>) -> bool {
    let left_ok = node.left.as_deref().map_or(true, |l| l.key < node.key);
    let right_ok = node.right.as_deref().map_or(true, |r| r.key > node.key);
    left_ok && right_ok
}

fn push_left_path<'a, K, V>(stack: &mut Vec<&'a Node<K, V>>, mut link: Option<&'a Node<K, V>>) {
    while let Some(node) = link {
        stack.push(node);
        link = node.left.as_deref();
    }
}

fn dismantle<K, V>(root: Link<K, V>) {
    let mut stack: Vec<Box<Node<K, V>>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_from(keys: &[i32]) -> AdjustingTree<i32, i32> {
        let mut tree = AdjustingTree::new();
        for &k in keys {
            tree.insert(k, k * 100);
        }
        tree
    }

    #[test]
    fn test_empty_tree() {
        let mut tree: AdjustingTree<i32, i32> = AdjustingTree::new();

        assert_eq!(tree.search(&5), None);
        assert!(tree.is_empty());
        assert_eq!(tree.root_key(), None);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_insert_into_empty() {
        let mut tree = AdjustingTree::new();

        assert_eq!(tree.insert(5, "five"), None);
        assert_eq!(tree.root_key(), Some(&5));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.search(&5), Some(&"five"));
    }

    #[test]
    fn test_search_splays_to_root() {
        let mut tree = tree_from(&[50, 20, 80, 10, 30, 70, 90, 25, 35]);

        for k in [25, 90, 10, 35, 50, 70] {
            assert_eq!(tree.search(&k), Some(&(k * 100)));
            assert_eq!(tree.root_key(), Some(&k));
            tree.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_miss_splays_last_visited() {
        // Increasing inserts build a left path: 30 -> 20 -> 10
        let mut tree = tree_from(&[10, 20, 30]);
        assert_eq!(tree.depth(), 3);

        assert_eq!(tree.search(&15), None);
        assert_eq!(tree.root_key(), Some(&10));
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
        assert_eq!(tree.stats().searches(), 1);
        assert_eq!(tree.stats().hits(), 0);
    }

    #[test]
    fn test_zig_zig_halves_path() {
        let mut tree = tree_from(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tree.depth(), 7);

        assert_eq!(tree.search(&1), Some(&100));

        assert_eq!(tree.root_key(), Some(&1));
        assert_eq!(tree.depth(), 5);
        assert_eq!(tree.stats().rotations(), 6);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_zig_zag_steps() {
        let mut tree = tree_from(&[1, 2, 3, 4, 5, 6, 7]);
        tree.search(&1);
        // 1 (-, 6 (4 (2 (-, 3), 5), 7)): 3 is reached through two zig-zags
        tree.search(&3);

        assert_eq!(tree.root_key(), Some(&3));
        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.stats().rotations(), 10);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_zig_counts_one_rotation() {
        // Root 30 with left child 10
        let mut tree = tree_from(&[10, 30]);
        let before = tree.stats().rotations();

        assert_eq!(tree.search(&10), Some(&1000));

        assert_eq!(tree.root_key(), Some(&10));
        assert_eq!(tree.stats().rotations() - before, 1);
    }

    #[test]
    fn test_insert_between_root_and_child() {
        // Root 30 with left child 10, new key 20 lands between them
        let mut tree = tree_from(&[10, 30]);
        assert_eq!(tree.root_key(), Some(&30));

        tree.insert(20, 2000);

        assert_eq!(tree.root_key(), Some(&20));
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_insert_splits_at_key() {
        let mut tree = tree_from(&[10, 30, 50]);

        tree.insert(40, 4000);
        assert_eq!(tree.root_key(), Some(&40));
        tree.insert(5, 500);
        assert_eq!(tree.root_key(), Some(&5));

        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![5, 10, 30, 40, 50]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_reinsert_updates_value() {
        let mut tree = tree_from(&[3, 1, 4, 5, 9, 2, 6]);
        let keys_before: Vec<_> = tree.keys().copied().collect();

        assert_eq!(tree.insert(4, 44), Some(400));
        assert_eq!(tree.insert(4, 44), Some(44));

        assert_eq!(tree.len(), 7);
        assert_eq!(tree.root_key(), Some(&4));
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), keys_before);
        assert_eq!(tree.stats().updates(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_contains_does_not_splay() {
        let tree = tree_from(&[1, 2, 3]);

        assert!(tree.contains(&1));
        assert!(!tree.contains(&4));
        assert_eq!(tree.root_key(), Some(&3));
    }

    #[test]
    fn test_clear() {
        let mut tree = tree_from(&[1, 2, 3]);
        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.search(&2), None);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_deep_path_does_not_overflow() {
        let mut tree = AdjustingTree::new();
        for k in 0..200_000u32 {
            tree.insert(k, ());
        }
        assert_eq!(tree.depth(), 200_000);

        assert_eq!(tree.search(&0), Some(&()));
        assert_eq!(tree.root_key(), Some(&0));
        assert!(tree.depth() < 200_000);
    }
}
