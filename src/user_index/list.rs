use crate::prelude::*;

/// Handle of a node inside the list arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Doubly linked list with nodes stored in a slot arena.
///
/// `prev` and `next` are slot handles, freed slots are reused by later
/// pushes. Positions are 0-based and counted from the head.
#[derive(Debug)]
pub(crate) struct LinkedList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    size: usize,
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedList<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            size: 0,
        }
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<NodeId> {
        self.head
    }

    #[inline]
    pub(crate) fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn value(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|n| &n.value)
    }

    pub(crate) fn value_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).map(|n| &mut n.value)
    }

    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.next)
    }

    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.prev)
    }

    /// Walks `steps` links forward from `id`.
    pub(crate) fn advance(&self, mut id: NodeId, steps: usize) -> Option<NodeId> {
        for _ in 0..steps {
            id = self.next(id)?;
        }
        Some(id)
    }

    /// Appends a value after the tail in constant time.
    pub(crate) fn push_back(&mut self, value: T) -> NodeId {
        let node = Node {
            value,
            prev: self.tail,
            next: None,
        };
        let id = if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(node);
            NodeId(slot)
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        };
        if let Some(tail) = self.tail {
            if let Some(tail) = self.node_mut(tail) {
                tail.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        self.size += 1;
        id
    }

    /// Detaches the node and returns its value.
    pub(crate) fn unlink(&mut self, id: NodeId) -> Option<T> {
        let node = self.slots.get_mut(id.0)?.take()?;
        if let Some(prev) = node.prev {
            if let Some(prev) = self.node_mut(prev) {
                prev.next = node.next;
            }
        } else {
            self.head = node.next;
        }
        if let Some(next) = node.next {
            if let Some(next) = self.node_mut(next) {
                next.prev = node.prev;
            }
        } else {
            self.tail = node.prev;
        }
        self.free.push(id.0);
        self.size -= 1;
        Some(node.value)
    }

    /// Handle of the node at `position`.
    pub(crate) fn id_at(&self, position: usize) -> Option<NodeId> {
        if position >= self.size {
            return None;
        }
        self.advance(self.head?, position)
    }

    pub(crate) fn get(&self, position: usize) -> Option<&T> {
        self.id_at(position).and_then(|id| self.value(id))
    }

    /// Removes the value at `position`.
    /// # Errors
    /// `ErrorKind::EmptyList` for an empty list, `ErrorKind::InvalidIndex`
    /// when `position` is past the tail.
    pub(crate) fn remove_at(&mut self, position: usize) -> Result<T> {
        if self.is_empty() {
            return Err(Error::empty_list());
        }
        let len = self.size;
        self.id_at(position)
            .and_then(|id| self.unlink(id))
            .ok_or_else(|| Error::invalid_index(position, len))
    }

    /// Exchanges the values of two nodes, links stay untouched.
    pub(crate) fn swap_values(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (low, high) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        if high >= self.slots.len() {
            return;
        }
        let (left, right) = self.slots.split_at_mut(high);
        if let (Some(x), Some(y)) = (left[low].as_mut(), right[0].as_mut()) {
            std::mem::swap(&mut x.value, &mut y.value);
        }
    }

    /// First node whose value satisfies the predicate.
    pub(crate) fn find_id(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<NodeId> {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = self.node(id)?;
            if predicate(&node.value) {
                return Some(id);
            }
            cursor = node.next;
        }
        None
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }
}

/// Head-to-tail iterator over list values.
#[derive(Debug)]
pub(crate) struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    cursor: Option<NodeId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[u32]) -> LinkedList<u32> {
        let mut list = LinkedList::new();
        for &v in values {
            list.push_back(v);
        }
        list
    }

    fn collect(list: &LinkedList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    fn collect_backward(list: &LinkedList<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cursor = list.tail();
        while let Some(id) = cursor {
            out.push(*list.value(id).unwrap());
            cursor = list.prev(id);
        }
        out
    }

    #[test]
    fn push_back_links_both_directions() {
        let list = list_of(&[1, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(collect(&list), vec![1, 2, 3]);
        assert_eq!(collect_backward(&list), vec![3, 2, 1]);
    }

    #[test]
    fn remove_head_middle_tail() {
        let mut list = list_of(&[1, 2, 3, 4, 5]);
        assert_eq!(list.remove_at(0).unwrap(), 1);
        assert_eq!(list.remove_at(3).unwrap(), 5);
        assert_eq!(list.remove_at(1).unwrap(), 3);
        assert_eq!(collect(&list), vec![2, 4]);
        assert_eq!(collect_backward(&list), vec![4, 2]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn remove_errors_are_explicit() {
        let mut list: LinkedList<u32> = LinkedList::new();
        assert_eq!(list.remove_at(0).unwrap_err().kind(), Kind::EmptyList);
        list.push_back(1);
        assert_eq!(
            list.remove_at(1).unwrap_err().kind(),
            Kind::InvalidIndex { index: 1, len: 1 }
        );
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut list = list_of(&[1, 2, 3]);
        list.remove_at(1).unwrap();
        list.push_back(4);
        assert_eq!(list.slots.len(), 3);
        assert_eq!(collect(&list), vec![1, 3, 4]);
        assert_eq!(collect_backward(&list), vec![4, 3, 1]);
    }

    #[test]
    fn remove_last_element_empties_list() {
        let mut list = list_of(&[9]);
        assert_eq!(list.remove_at(0).unwrap(), 9);
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
        list.push_back(10);
        assert_eq!(collect(&list), vec![10]);
    }

    #[test]
    fn swap_values_keeps_links() {
        let mut list = list_of(&[1, 2, 3]);
        let head = list.head().unwrap();
        let tail = list.tail().unwrap();
        list.swap_values(head, tail);
        assert_eq!(collect(&list), vec![3, 2, 1]);
        assert_eq!(list.head(), Some(head));
    }

    #[test]
    fn advance_and_get() {
        let list = list_of(&[10, 20, 30]);
        let head = list.head().unwrap();
        assert_eq!(list.value(list.advance(head, 2).unwrap()), Some(&30));
        assert_eq!(list.advance(head, 3), None);
        assert_eq!(list.get(1), Some(&20));
        assert_eq!(list.get(3), None);
    }
}
