use crate::prelude::*;

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
        })
    }
}

/// Unbalanced binary search tree allowing duplicate keys.
///
/// Keys less than a node's key go left, everything else goes right, so
/// equal keys form a chain through right children:
/// `left < key <= right` holds for every node.
///
/// All walks are iterative, a long run of equal keys degrades the tree into
/// a list without growing the call stack.
#[derive(Debug)]
pub(crate) struct Tree<K, V> {
    root: Link<K, V>,
    size: usize,
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self {
            root: None,
            size: 0,
        }
    }
}

// Drops nodes one by one, a degenerate tree is as deep as it is long.
impl<K, V> Drop for Tree<K, V> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Dir {
    Left,
    Right,
    Here,
}

impl<K: Ord, V> Tree<K, V> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn insert(&mut self, key: K, value: V) {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = if key < node.key {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *link = Some(Node::leaf(key, value));
        self.size += 1;
    }

    /// In-order iterator over all entries.
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, None)
    }

    /// In-order iterator over entries with `key >= from`. Left subtrees of
    /// nodes below the bound are never entered.
    pub(crate) fn range_from(&self, from: K) -> Iter<'_, K, V> {
        Iter::new(&self.root, Some(from))
    }

    /// Values stored under exactly `key`, found by descending a single path.
    pub(crate) fn get_all(&self, key: &K) -> Vec<&V> {
        let mut found = Vec::new();
        let mut link = &self.root;
        while let Some(node) = link {
            link = match key.cmp(&node.key) {
                CmpOrdering::Less => &node.left,
                CmpOrdering::Greater => &node.right,
                CmpOrdering::Equal => {
                    found.push(&node.value);
                    &node.right
                }
            };
        }
        found
    }

    /// First value satisfying the predicate, mutably. Visits every node in
    /// the worst case.
    pub(crate) fn find_mut<F>(&mut self, mut predicate: F) -> Option<&mut V>
    where
        F: FnMut(&V) -> bool,
    {
        let mut stack: Vec<&mut Node<K, V>> = self.root.as_deref_mut().into_iter().collect();
        while let Some(node) = stack.pop() {
            let Node {
                value, left, right, ..
            } = node;
            if predicate(value) {
                return Some(value);
            }
            stack.extend(right.as_deref_mut());
            stack.extend(left.as_deref_mut());
        }
        None
    }

    /// Removes the node stored under `key` whose value satisfies the
    /// predicate.
    ///
    /// A node with two children is replaced by its in-order successor, the
    /// leftmost node of its right subtree.
    /// # Errors
    /// `Kind::EmptyTree` for an empty tree, `Kind::NodeNotFound` if no node
    /// under `key` matches.
    pub(crate) fn remove<F>(&mut self, key: &K, mut predicate: F) -> Result<V>
    where
        F: FnMut(&V) -> bool,
    {
        if self.root.is_none() {
            return Err(Error::empty_tree());
        }
        let mut link = &mut self.root;
        loop {
            let dir = match link.as_deref() {
                None => return Err(Error::node_not_found()),
                Some(node) => match key.cmp(&node.key) {
                    CmpOrdering::Less => Dir::Left,
                    CmpOrdering::Greater => Dir::Right,
                    CmpOrdering::Equal if predicate(&node.value) => Dir::Here,
                    CmpOrdering::Equal => Dir::Right,
                },
            };
            match dir {
                Dir::Here => break,
                Dir::Left => link = &mut link.as_mut().ok_or_else(Error::node_not_found)?.left,
                Dir::Right => link = &mut link.as_mut().ok_or_else(Error::node_not_found)?.right,
            }
        }
        let value = Self::unlink(link).ok_or_else(Error::node_not_found)?;
        self.size -= 1;
        Ok(value)
    }

    fn unlink(link: &mut Link<K, V>) -> Option<V> {
        let mut node = link.take()?;
        *link = match (node.left.take(), node.right.take()) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => Some(child),
            (Some(left), Some(right)) => {
                let (mut successor, rest) = Self::take_min(right);
                successor.left = Some(left);
                successor.right = rest;
                Some(successor)
            }
        };
        Some(node.value)
    }

    // Splits off the leftmost node of `node`, returns it with the remaining
    // subtree. The successor's right child takes its place.
    fn take_min(mut node: Box<Node<K, V>>) -> (Box<Node<K, V>>, Link<K, V>) {
        let mut path = Vec::new();
        while let Some(left) = node.left.take() {
            path.push(node);
            node = left;
        }
        let mut rest = node.right.take();
        while let Some(mut parent) = path.pop() {
            parent.left = rest;
            rest = Some(parent);
        }
        (node, rest)
    }

    /// Checks `left < key <= right` across whole subtrees.
    pub(crate) fn check_invariant(&self) -> bool {
        let mut stack: Vec<(&Node<K, V>, Option<&K>, Option<&K>)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, None, None));
        }
        let mut count = 0;
        while let Some((node, low, high)) = stack.pop() {
            count += 1;
            if low.map_or(false, |low| node.key < *low) || high.map_or(false, |high| node.key >= *high) {
                return false;
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, low, Some(&node.key)));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, Some(&node.key), high));
            }
        }
        count == self.size
    }

    pub(crate) fn height(&self) -> usize {
        let mut stack: Vec<(&Node<K, V>, usize)> = self.root.as_deref().map(|r| (r, 1)).into_iter().collect();
        let mut height = 0;
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(node.left.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.right.as_deref().map(|n| (n, depth + 1)));
        }
        height
    }
}

/// In-order tree iterator with an optional inclusive lower bound.
#[derive(Debug)]
pub(crate) struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    from: Option<K>,
}

impl<'a, K: Ord, V> Iter<'a, K, V> {
    fn new(root: &'a Link<K, V>, from: Option<K>) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            from,
        };
        iter.descend(root);
        iter
    }

    fn descend(&mut self, mut link: &'a Link<K, V>) {
        while let Some(node) = link {
            if self.from.as_ref().map_or(false, |from| node.key < *from) {
                link = &node.right;
            } else {
                self.stack.push(node);
                link = &node.left;
            }
        }
    }
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(&node.right);
        Some((&node.key, &node.value))
    }
}
