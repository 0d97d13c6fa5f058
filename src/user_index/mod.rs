use crate::prelude::*;
use list::{LinkedList, NodeId};

mod list;

/// Users kept in a doubly linked list in ascending username order.
///
/// [`add`](UserIndex::add) appends to the tail without restoring order, a
/// batch of adds is followed by one [`insertion_sort`](UserIndex::insertion_sort).
/// Username lookups walk node links in a binary search and require the
/// list to be sorted.
#[derive(Debug)]
pub struct UserIndex {
    list: LinkedList<User>,
    sorted: bool,
}

impl Default for UserIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl UserIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: LinkedList::new(),
            sorted: true,
        }
    }

    /// Appends a user to the tail in constant time.
    ///
    /// Order is kept only if the new username is not less than the tail's,
    /// otherwise the index is marked unsorted until the next
    /// [`insertion_sort`](UserIndex::insertion_sort).
    pub fn add(&mut self, user: User) {
        let in_order = self
            .list
            .tail()
            .and_then(|tail| self.list.value(tail))
            .map_or(true, |tail| tail.username <= user.username);
        if !in_order {
            self.sorted = false;
        }
        trace!("user {} appended, sorted: {}", user.username, self.sorted);
        self.list.push_back(user);
    }

    /// Restores ascending username order.
    ///
    /// Walks forward over the list and moves each value backward by
    /// swapping it with its predecessor while the predecessor's username is
    /// greater. Links are never touched, only values move.
    pub fn insertion_sort(&mut self) {
        let mut swaps = 0_usize;
        let mut cursor = self.list.head().and_then(|head| self.list.next(head));
        while let Some(id) = cursor {
            let mut current = id;
            while let Some(prev) = self.list.prev(current) {
                if !self.greater(prev, current) {
                    break;
                }
                self.list.swap_values(prev, current);
                swaps += 1;
                current = prev;
            }
            cursor = self.list.next(id);
        }
        self.sorted = true;
        debug!("user index sorted, {} users, {} swaps", self.list.len(), swaps);
    }

    fn greater(&self, a: NodeId, b: NodeId) -> bool {
        match (self.list.value(a), self.list.value(b)) {
            (Some(a), Some(b)) => a.username > b.username,
            _ => false,
        }
    }

    /// Binary search by username over node links.
    ///
    /// Returns `Ok(None)` for a blank username, an empty index or an absent
    /// user.
    /// # Errors
    /// Fails with `ErrorKind::Unsorted` if users were appended out of order
    /// since the last sort.
    pub fn find_by_username(&self, username: &str) -> Result<Option<&User>> {
        if username.trim().is_empty() {
            return Ok(None);
        }
        let (first, last) = match (self.list.head(), self.list.tail()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(None),
        };
        if !self.sorted {
            return Err(Error::unsorted());
        }
        let found = self.binary_search(first, last, self.list.len(), username);
        Ok(found.and_then(|id| self.list.value(id)))
    }

    // Window of `count` nodes starting at `first` and ending at `last`.
    fn binary_search(
        &self,
        first: NodeId,
        last: NodeId,
        count: usize,
        username: &str,
    ) -> Option<NodeId> {
        if count == 0 {
            return None;
        }
        if self.list.value(first)?.username > self.list.value(last)?.username {
            return None;
        }
        let half = count / 2;
        let mid = self.list.advance(first, half)?;
        match username.cmp(self.list.value(mid)?.username.as_str()) {
            CmpOrdering::Equal => Some(mid),
            CmpOrdering::Less if half > 0 => {
                let left_last = self.list.prev(mid)?;
                self.binary_search(first, left_last, half, username)
            }
            CmpOrdering::Greater if count - half > 1 => {
                let right_first = self.list.next(mid)?;
                self.binary_search(right_first, last, count - half - 1, username)
            }
            _ => None,
        }
    }

    /// Sequential scan for a mobile number.
    #[must_use]
    pub fn search_by_mobile_number(&self, mobile_number: u64) -> Option<&User> {
        self.list
            .iter()
            .find(|user| user.mobile_number == Some(mobile_number))
    }

    /// Users with the dentist role, in list order. Soft-deleted dentists are
    /// skipped.
    #[must_use]
    pub fn dentists(&self) -> Vec<&User> {
        self.list
            .iter()
            .filter(|user| user.is_dentist() && !user.is_deleted)
            .collect()
    }

    /// Iterates over all users in list order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.list.iter()
    }

    /// User at a 0-based position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&User> {
        self.list.get(position)
    }

    /// All users in list order.
    #[must_use]
    pub fn users(&self) -> Vec<&User> {
        self.list.iter().collect()
    }

    /// Unlinks the user with the same username.
    ///
    /// Returns `Ok(None)` if no such user is linked.
    /// # Errors
    /// Fails with `ErrorKind::EmptyList` on an empty index.
    pub fn remove(&mut self, user: &User) -> Result<Option<User>> {
        if self.list.is_empty() {
            return Err(Error::empty_list());
        }
        let removed = self
            .list
            .find_id(|u| u.username == user.username)
            .and_then(|id| self.list.unlink(id));
        if let Some(user) = &removed {
            debug!("user {} removed", user.username);
        }
        Ok(removed)
    }

    /// Unlinks the user at a 0-based position.
    /// # Errors
    /// Fails with `ErrorKind::EmptyList` on an empty index and with
    /// `ErrorKind::InvalidIndex` for a position past the tail.
    pub fn remove_at(&mut self, position: usize) -> Result<User> {
        let user = self.list.remove_at(position)?;
        debug!("user {} removed from position {}", user.username, position);
        Ok(user)
    }

    /// Applies `f` to the user in place and returns the updated copy.
    ///
    /// Returns `Ok(None)` if the user is absent. A changed username triggers
    /// a re-sort.
    /// # Errors
    /// Fails with `ErrorKind::Unsorted` when called on an unsorted index.
    pub fn update<F>(&mut self, username: &str, f: F) -> Result<Option<User>>
    where
        F: FnOnce(&mut User),
    {
        if !self.sorted {
            return Err(Error::unsorted());
        }
        let id = match self.list.find_id(|u| u.username == username) {
            Some(id) => id,
            None => return Ok(None),
        };
        let updated = match self.list.value_mut(id) {
            Some(user) => {
                f(user);
                user.clone()
            }
            None => return Ok(None),
        };
        if updated.username != username {
            debug!("user {} renamed to {}", username, updated.username);
            self.insertion_sort();
        }
        Ok(Some(updated))
    }

    /// Marks the user deleted without unlinking it.
    /// # Errors
    /// Fails with `ErrorKind::Unsorted` when called on an unsorted index.
    pub fn soft_delete(&mut self, username: &str) -> Result<Option<User>> {
        self.update(username, |user| user.is_deleted = true)
    }

    /// Number of linked users, soft-deleted included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Checks the index holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Checks whether username search is currently allowed.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    fn user(username: &str) -> User {
        User::new(username, "hash", Role::Patient, "First", "Last")
    }

    fn index_of(usernames: &[&str]) -> UserIndex {
        let mut index = UserIndex::new();
        for name in usernames {
            index.add(user(name));
        }
        index.insertion_sort();
        index
    }

    fn usernames(index: &UserIndex) -> Vec<String> {
        index.iter().map(|u| u.username.clone()).collect()
    }

    #[test]
    fn sort_then_find() {
        let index = index_of(&["bob", "amy", "zed", "cara"]);
        assert_eq!(usernames(&index), vec!["amy", "bob", "cara", "zed"]);
        let cara = index.find_by_username("cara").unwrap().unwrap();
        assert_eq!(cara.username, "cara");
        assert!(index.find_by_username("nope").unwrap().is_none());
    }

    #[test]
    fn every_present_name_is_found_for_all_sizes() {
        for size in 0..50 {
            let names: Vec<String> = (0..size).map(|i| format!("user{:03}", i * 2)).collect();
            let mut shuffled = names.clone();
            shuffled.shuffle(&mut rand::thread_rng());
            let mut index = UserIndex::new();
            for name in &shuffled {
                index.add(user(name));
            }
            index.insertion_sort();
            for name in &names {
                let found = index.find_by_username(name).unwrap();
                assert_eq!(found.map(|u| u.username.as_str()), Some(name.as_str()));
            }
            for i in 0..=size {
                let absent = format!("user{:03}", i * 2 + 1);
                assert!(index.find_by_username(&absent).unwrap().is_none());
            }
            assert!(index.find_by_username("aaa").unwrap().is_none());
            assert!(index.find_by_username("zzz").unwrap().is_none());
        }
    }

    #[test]
    fn insertion_sort_orders_adjacent_pairs() {
        let mut names: Vec<String> = (0..200).map(|i| format!("u{}", i)).collect();
        names.shuffle(&mut rand::thread_rng());
        let mut index = UserIndex::new();
        for name in &names {
            index.add(user(name));
        }
        assert!(!index.is_sorted());
        index.insertion_sort();
        let sorted = usernames(&index);
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sorted.len(), 200);
    }

    #[test]
    fn unsorted_search_is_detected() {
        let mut index = index_of(&["bob"]);
        index.add(user("amy"));
        assert_eq!(
            index.find_by_username("amy").unwrap_err().kind(),
            Kind::Unsorted
        );
        index.insertion_sort();
        assert!(index.find_by_username("amy").unwrap().is_some());
    }

    #[test]
    fn in_order_adds_keep_index_sorted() {
        let mut index = UserIndex::new();
        index.add(user("amy"));
        index.add(user("bob"));
        assert!(index.is_sorted());
        assert!(index.find_by_username("bob").unwrap().is_some());
    }

    #[test]
    fn blank_or_empty_lookups_find_nothing() {
        let empty = UserIndex::new();
        assert!(empty.find_by_username("amy").unwrap().is_none());
        let index = index_of(&["amy"]);
        assert!(index.find_by_username("  ").unwrap().is_none());
    }

    #[test]
    fn mobile_and_dentist_scans() {
        let mut index = UserIndex::new();
        index.add(user("amy").with_mobile_number(91234567));
        index.add(User::new("drlee", "x", Role::Dentist, "Lee", "Wong"));
        let mut gone = User::new("drold", "x", Role::Dentist, "Old", "Tan");
        gone.is_deleted = true;
        index.add(gone);
        index.insertion_sort();
        assert_eq!(
            index.search_by_mobile_number(91234567).map(|u| u.username.as_str()),
            Some("amy")
        );
        assert!(index.search_by_mobile_number(80000000).is_none());
        let dentists: Vec<_> = index.dentists().iter().map(|u| u.username.clone()).collect();
        assert_eq!(dentists, vec!["drlee"]);
    }

    #[test]
    fn remove_and_remove_at() {
        let mut index = index_of(&["amy", "bob", "cara"]);
        assert_eq!(index.remove(&user("bob")).unwrap().unwrap().username, "bob");
        assert!(index.remove(&user("bob")).unwrap().is_none());
        assert_eq!(index.get(1).map(|u| u.username.as_str()), Some("cara"));
        assert_eq!(index.remove_at(1).unwrap().username, "cara");
        assert_eq!(
            index.remove_at(5).unwrap_err().kind(),
            Kind::InvalidIndex { index: 5, len: 1 }
        );
        index.remove_at(0).unwrap();
        assert_eq!(index.remove_at(0).unwrap_err().kind(), Kind::EmptyList);
        assert_eq!(index.remove(&user("amy")).unwrap_err().kind(), Kind::EmptyList);
        assert!(index.find_by_username("amy").unwrap().is_none());
    }

    #[test]
    fn update_and_soft_delete() {
        let mut index = index_of(&["amy", "bob"]);
        let amy = index.soft_delete("amy").unwrap().unwrap();
        assert!(amy.is_deleted);
        assert_eq!(index.len(), 2);
        assert!(index.find_by_username("amy").unwrap().unwrap().is_deleted);

        index
            .update("amy", |u| u.username = "zoe".to_owned())
            .unwrap()
            .unwrap();
        assert_eq!(usernames(&index), vec!["bob", "zoe"]);
        assert!(index.update("nobody", |_| ()).unwrap().is_none());
    }
}
