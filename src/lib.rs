//! # bst-map
//!
//! A generic ordered map backed by an unbalanced binary search tree.
//!
//! Keys are kept in ascending `Ord` order. Every operation walks a single
//! root-to-leaf path, so lookups, insertions, and removals cost O(height):
//! O(log n) on random workloads, O(n) in the worst case. There is no
//! rebalancing.
//!
//! ## Example
//!
//! ```rust
//! use bst_map::BstMap;
//!
//! let mut map: BstMap<&str, u64> = BstMap::new();
//! map.insert("hello", 1);
//! map.insert("world", 2);
//!
//! assert_eq!(map.get("hello"), Some(&1));
//! assert_eq!(map.get("world"), Some(&2));
//! ```

#![forbid(unsafe_code)]

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

// =============================================================================
// Nodes
// =============================================================================

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    /// Keys in the left subtree are strictly less than `key`.
    left: Link<K, V>,
    /// Keys in the right subtree are strictly greater than `key`.
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
        })
    }
}

// =============================================================================
// Map
// =============================================================================

/// An ordered map backed by an unbalanced binary search tree.
///
/// Keys must have a consistent total order: if the `Ord` implementation is
/// inconsistent (non-transitive, or changes while a key is stored, e.g. via
/// interior mutability), the tree shape becomes unspecified. Operations stay
/// memory-safe, but lookups may miss entries that are present.
pub struct BstMap<K, V> {
    root: Link<K, V>,
    /// Live entry count; maintained by mutation, never recomputed.
    len: usize,
}

impl<K, V> BstMap<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Borrowing in-order iterator over `(&K, &V)` entries in ascending key
    /// order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_spine(self.root.as_deref());
        iter
    }

    /// Ascending iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Iterator over the values, in ascending order of their keys.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> BstMap<K, V> {
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| &node.value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| (&node.key, &node.value))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    fn find<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            };
        }
        None
    }

    /// Inserts a key-value pair. If the key is already present, replaces its
    /// value in place and returns the old one; the length is unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = match key.cmp(&node.key) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
            };
        }
        *link = Some(Node::new(key, value));
        self.len += 1;
        None
    }

    /// Removes a key, returning its value if it was present.
    ///
    /// A removed node with two children is replaced in place by its in-order
    /// successor (the smallest key of its right subtree). Recursion depth is
    /// the tree height.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (root, removed) = Self::remove_node(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Removes `key` from the subtree rooted at `link`. Each call takes
    /// ownership of the subtree and returns the rebuilt subtree for its
    /// caller to re-attach, along with the removed value.
    fn remove_node<Q>(link: Link<K, V>, key: &Q) -> (Link<K, V>, Option<V>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut node) = link else {
            return (None, None);
        };
        match key.cmp(node.key.borrow()) {
            Ordering::Less => {
                let (left, removed) = Self::remove_node(node.left.take(), key);
                node.left = left;
                (Some(node), removed)
            }
            Ordering::Greater => {
                let (right, removed) = Self::remove_node(node.right.take(), key);
                node.right = right;
                (Some(node), removed)
            }
            Ordering::Equal => match (node.left.take(), node.right.take()) {
                (None, None) => (None, Some(node.value)),
                (Some(child), None) | (None, Some(child)) => (Some(child), Some(node.value)),
                (Some(left), Some(right)) => {
                    let (right, succ) = Self::take_min(right);
                    let succ = *succ;
                    node.key = succ.key;
                    let removed = mem::replace(&mut node.value, succ.value);
                    node.left = Some(left);
                    node.right = right;
                    (Some(node), Some(removed))
                }
            },
        }
    }

    /// Detaches the minimum node of a non-empty subtree, splicing its right
    /// child into its place. The detached node comes back with no children.
    fn take_min(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        match node.left.take() {
            None => {
                let rest = node.right.take();
                (rest, node)
            }
            Some(left) => {
                let (rest, min) = Self::take_min(left);
                node.left = rest;
                (Some(node), min)
            }
        }
    }
}

impl<K, V> Default for BstMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for BstMap<K, V> {
    fn clone(&self) -> Self {
        // Copies node by node with an explicit stack of (source, destination
        // slot) pairs, for the same reason Drop is iterative: recursing into
        // children would overflow the call stack on degenerate chains.
        let mut root: Link<K, V> = None;
        let mut stack: Vec<(&Node<K, V>, &mut Link<K, V>)> = Vec::new();
        if let Some(src) = self.root.as_deref() {
            stack.push((src, &mut root));
        }
        while let Some((src, dst)) = stack.pop() {
            let node = dst.insert(Node::new(src.key.clone(), src.value.clone()));
            if let Some(left) = src.left.as_deref() {
                stack.push((left, &mut node.left));
            }
            if let Some(right) = src.right.as_deref() {
                stack.push((right, &mut node.right));
            }
        }
        Self {
            root,
            len: self.len,
        }
    }
}

impl<K, V> Drop for BstMap<K, V> {
    fn drop(&mut self) {
        // A degenerate tree is a linked list; letting the boxes drop
        // recursively would overflow the call stack on long chains.
        let mut stack = Vec::new();
        stack.extend(self.root.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BstMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for BstMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for BstMap<K, V> {}

impl<K: Ord, V> Extend<(K, V)> for BstMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BstMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Borrowing in-order iterator.
///
/// Holds an explicit stack of pending ancestors instead of recursing: the
/// stack always contains the leftmost spine of the part of the tree still to
/// visit, so its top is the next entry in ascending order. O(height)
/// auxiliary space, amortized O(1) per step.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_spine(&mut self, mut subtree: Option<&'a Node<K, V>>) {
        while let Some(node) = subtree {
            self.stack.push(node);
            subtree = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_spine(node.right.as_deref());
        Some((&node.key, &node.value))
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Ascending iterator over a map's keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over a map's values, in ascending order of their keys.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Owning in-order iterator. Consumes the tree with the same spine-stack
/// discipline as [`Iter`], detaching each node's left child as it is pushed.
pub struct IntoIter<K, V> {
    stack: Vec<Box<Node<K, V>>>,
}

impl<K, V> IntoIter<K, V> {
    fn push_spine(&mut self, mut subtree: Link<K, V>) {
        while let Some(mut node) = subtree {
            subtree = node.left.take();
            self.stack.push(node);
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let mut node = self.stack.pop()?;
        self.push_spine(node.right.take());
        let node = *node;
        Some((node.key, node.value))
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> Drop for IntoIter<K, V> {
    fn drop(&mut self) {
        // Stacked nodes still own their right subtrees; drain instead of
        // letting those boxes drop recursively.
        while self.next().is_some() {}
    }
}

impl<K, V> IntoIterator for BstMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        let mut iter = IntoIter { stack: Vec::new() };
        iter.push_spine(self.root.take());
        iter
    }
}

impl<'a, K, V> IntoIterator for &'a BstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}


#[cfg(test)]
mod proptests;
