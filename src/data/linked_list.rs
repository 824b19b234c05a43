//! Arena-backed cyclic doubly linked lists
//!
//! A [`NodePool`] owns a fixed number of link slots. Any number of lists can
//! share one pool: each list is just a [`ListHead`] (root handle + length),
//! and the pool keeps its own free list. Taking a node from the free list and
//! splicing it into a used list is O(1), and so is giving it back.
//!
//! The triangulator uses node handles directly as point indices, so a
//! contour's points can be walked, split and extended without ever moving
//! coordinate data around.

/// Handle to one slot of a [`NodePool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u16);

impl NodeId {
    /// Slot index inside the pool
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < NodePool::MAX_CAPACITY);
        Self(index as u16)
    }
}

impl From<NodeId> for u16 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: NodeId,
    next: NodeId,
}

/// Root and length of one list living in a [`NodePool`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListHead {
    root: Option<NodeId>,
    len: usize,
}

impl ListHead {
    /// An empty list
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Node to start iterating from, `None` if the list is empty
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Make another node of the same list the iteration start
    ///
    /// The node must already belong to this list.
    pub fn set_root(&mut self, node: NodeId) {
        debug_assert!(self.root.is_some());
        self.root = Some(node);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Fixed-capacity pool of list links
#[derive(Debug, Clone)]
pub struct NodePool {
    links: Vec<Link>,
    free: ListHead,
    high_water: usize,
}

impl NodePool {
    /// Handles are 16 bits wide
    pub const MAX_CAPACITY: usize = u16::MAX as usize;

    /// Create a pool of `capacity` slots.
    ///
    /// Slots `0..reserved` are handed to the caller unlinked, to be claimed
    /// with [`NodePool::list_from_range`]; slots `reserved..capacity` form
    /// the free list, in ascending order.
    pub fn new(capacity: usize, reserved: usize) -> Self {
        let capacity = capacity.min(Self::MAX_CAPACITY);
        let reserved = reserved.min(capacity);

        let links = (0..capacity)
            .map(|i| {
                let id = NodeId::from_index(i);
                Link { prev: id, next: id }
            })
            .collect();

        let mut pool = Self {
            links,
            free: ListHead::new(),
            high_water: reserved,
        };

        if reserved < capacity {
            pool.free = pool.link_range(reserved, capacity - 1);
        }
        pool
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.links.len()
    }

    /// Number of slots still on the free list
    pub fn free_len(&self) -> usize {
        self.free.len
    }

    /// One past the highest slot that was ever reserved or handed out
    pub fn high_water_mark(&self) -> usize {
        self.high_water
    }

    /// Link reserved slots `first..=last` into a new cyclic list, in order
    pub fn list_from_range(&mut self, first: usize, last: usize) -> ListHead {
        debug_assert!(last < self.high_water, "range must be reserved");
        self.link_range(first, last)
    }

    fn link_range(&mut self, first: usize, last: usize) -> ListHead {
        if last < first {
            return ListHead::new();
        }
        for i in first..=last {
            let prev = if i == first { last } else { i - 1 };
            let next = if i == last { first } else { i + 1 };
            self.links[i] = Link {
                prev: NodeId::from_index(prev),
                next: NodeId::from_index(next),
            };
        }
        ListHead {
            root: Some(NodeId::from_index(first)),
            len: last - first + 1,
        }
    }

    #[inline]
    pub fn next(&self, node: NodeId) -> NodeId {
        self.links[node.index()].next
    }

    #[inline]
    pub fn prev(&self, node: NodeId) -> NodeId {
        self.links[node.index()].prev
    }

    /// Take a free slot and link it right before `before`.
    ///
    /// The list root does not move. Returns `None` when the pool is exhausted.
    pub fn insert_before(&mut self, list: &mut ListHead, before: NodeId) -> Option<NodeId> {
        let node = self.take_free()?;
        self.link_before(list, node, Some(before));
        Some(node)
    }

    /// Take a free slot and append it at the end of the cycle (before the root)
    pub fn push_back(&mut self, list: &mut ListHead) -> Option<NodeId> {
        let node = self.take_free()?;
        self.link_before(list, node, None);
        Some(node)
    }

    /// Unlink `node` from `list` and return its slot to the free list
    pub fn remove(&mut self, list: &mut ListHead, node: NodeId) {
        self.unlink(list, node);
        let mut free = self.free;
        self.link_before(&mut free, node, None);
        free.root = Some(node);
        self.free = free;
    }

    /// Walk a list once around, starting at its root
    pub fn iter(&self, list: &ListHead) -> Iter<'_> {
        Iter {
            pool: self,
            start: list.root,
            next: list.root,
        }
    }

    fn take_free(&mut self) -> Option<NodeId> {
        let node = self.free.root?;
        let mut free = self.free;
        self.unlink(&mut free, node);
        self.free = free;
        self.high_water = self.high_water.max(node.index() + 1);
        Some(node)
    }

    fn unlink(&mut self, list: &mut ListHead, node: NodeId) {
        debug_assert!(list.len > 0);
        let Link { prev, next } = self.links[node.index()];
        if next == node {
            list.root = None;
        } else {
            self.links[prev.index()].next = next;
            self.links[next.index()].prev = prev;
            if list.root == Some(node) {
                list.root = Some(next);
            }
        }
        list.len -= 1;
    }

    fn link_before(&mut self, list: &mut ListHead, node: NodeId, before: Option<NodeId>) {
        match before.or(list.root) {
            None => {
                self.links[node.index()] = Link {
                    prev: node,
                    next: node,
                };
                list.root = Some(node);
            }
            Some(before) => {
                let prev = self.links[before.index()].prev;
                self.links[prev.index()].next = node;
                self.links[node.index()] = Link { prev, next: before };
                self.links[before.index()].prev = node;
            }
        }
        list.len += 1;
    }
}

/// One trip around a cyclic list
pub struct Iter<'a> {
    pool: &'a NodePool,
    start: Option<NodeId>,
    next: Option<NodeId>,
}

impl Iterator for Iter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        let following = self.pool.next(current);
        self.next = if Some(following) == self.start {
            None
        } else {
            Some(following)
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(pool: &NodePool, list: &ListHead) -> Vec<usize> {
        pool.iter(list).map(NodeId::index).collect()
    }

    #[test]
    fn test_range_list_is_cyclic_and_ordered() {
        let mut pool = NodePool::new(16, 4);
        let list = pool.list_from_range(0, 3);

        assert_eq!(list.len(), 4);
        assert_eq!(indices(&pool, &list), vec![0, 1, 2, 3]);
        assert_eq!(pool.next(NodeId::from_index(3)).index(), 0);
        assert_eq!(pool.prev(NodeId::from_index(0)).index(), 3);
        assert_eq!(pool.free_len(), 12);
    }

    #[test]
    fn test_free_slots_are_handed_out_in_order() {
        let mut pool = NodePool::new(8, 3);
        let mut list = pool.list_from_range(0, 2);

        let a = pool.push_back(&mut list).unwrap();
        let b = pool.push_back(&mut list).unwrap();
        assert_eq!((a.index(), b.index()), (3, 4));
        assert_eq!(indices(&pool, &list), vec![0, 1, 2, 3, 4]);
        assert_eq!(pool.high_water_mark(), 5);
    }

    #[test]
    fn test_insert_before_splices_without_moving_root() {
        let mut pool = NodePool::new(8, 3);
        let mut list = pool.list_from_range(0, 2);

        let inserted = pool
            .insert_before(&mut list, NodeId::from_index(1))
            .unwrap();
        assert_eq!(list.root(), Some(NodeId::from_index(0)));
        assert_eq!(indices(&pool, &list), vec![0, inserted.index(), 1, 2]);
        assert_eq!(pool.prev(NodeId::from_index(1)), inserted);
        assert_eq!(pool.next(NodeId::from_index(0)), inserted);
    }

    #[test]
    fn test_removed_slot_is_reused_first() {
        let mut pool = NodePool::new(6, 3);
        let mut list = pool.list_from_range(0, 2);

        pool.remove(&mut list, NodeId::from_index(1));
        assert_eq!(indices(&pool, &list), vec![0, 2]);
        assert_eq!(pool.free_len(), 4);

        let reused = pool.push_back(&mut list).unwrap();
        assert_eq!(reused.index(), 1);
    }

    #[test]
    fn test_removing_root_advances_root() {
        let mut pool = NodePool::new(4, 2);
        let mut list = pool.list_from_range(0, 1);

        pool.remove(&mut list, NodeId::from_index(0));
        assert_eq!(list.root(), Some(NodeId::from_index(1)));
        pool.remove(&mut list, NodeId::from_index(1));
        assert!(list.is_empty());
        assert_eq!(list.root(), None);
        assert_eq!(pool.iter(&list).count(), 0);
    }

    #[test]
    fn test_exhausted_pool_returns_none() {
        let mut pool = NodePool::new(4, 3);
        let mut list = pool.list_from_range(0, 2);

        assert!(pool.push_back(&mut list).is_some());
        assert!(pool.push_back(&mut list).is_none());
        assert!(pool
            .insert_before(&mut list, NodeId::from_index(0))
            .is_none());
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_lists_share_one_free_pool() {
        let mut pool = NodePool::new(8, 4);
        let mut first = pool.list_from_range(0, 1);
        let mut second = pool.list_from_range(2, 3);
        let mut extra = ListHead::new();

        let a = pool.push_back(&mut first).unwrap();
        let b = pool.insert_before(&mut second, NodeId::from_index(3)).unwrap();
        let c = pool.push_back(&mut extra).unwrap();

        assert_eq!(indices(&pool, &first), vec![0, 1, a.index()]);
        assert_eq!(indices(&pool, &second), vec![2, b.index(), 3]);
        assert_eq!(indices(&pool, &extra), vec![c.index()]);
        assert_eq!(pool.free_len(), 1);
    }

    #[test]
    fn test_set_root_changes_iteration_start() {
        let mut pool = NodePool::new(3, 3);
        let mut list = pool.list_from_range(0, 2);
        list.set_root(NodeId::from_index(2));
        assert_eq!(indices(&pool, &list), vec![2, 0, 1]);
    }
}
