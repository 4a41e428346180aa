//! Doubly-linked list of idle workers
//!
//! [`IdleList`] keeps released workers in release order: the front holds the
//! worker that has been idle longest, the back the one released most
//! recently. The pool reuses from the back (LIFO) and the reaper evicts from
//! the front, so idle time never decreases from back to front and eviction
//! is a single scan followed by one relink.
//!
//! Nodes live in an arena and are addressed by [`EntryId`] handles. Freed
//! slots are recycled through a free list; each slot carries a generation so
//! a handle to an evicted entry never resolves to a newer one.
//!
//! # Example
//!
//! ```rust
//! use recycle_pool::core::IdleList;
//!
//! let mut list = IdleList::new();
//! list.push_back("a");
//! list.push_back("b");
//! list.push_back("c");
//!
//! // Keep "b" onward; everything before it comes back to the caller
//! let second = list.front().and_then(|e| list.next(e));
//! assert_eq!(list.reset_front(second), vec!["a"]);
//!
//! assert_eq!(list.pop_back(), Some("c"));
//! assert_eq!(list.pop_back(), Some("b"));
//! assert_eq!(list.pop_back(), None);
//! ```

use std::fmt;

/// Handle to an entry of an [`IdleList`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryId {
    index: usize,
    generation: u64,
}

struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

/// Arena-backed doubly-linked list with O(1) push/pop at the back and O(1)
/// truncation of a prefix at the front
pub struct IdleList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for IdleList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IdleList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of linked entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest entry, if any
    pub fn front(&self) -> Option<EntryId> {
        self.head.map(|index| self.entry_id(index))
    }

    /// Most recently pushed entry, if any
    pub fn back(&self) -> Option<EntryId> {
        self.tail.map(|index| self.entry_id(index))
    }

    /// Value stored at `entry`, or `None` for a stale handle
    pub fn get(&self, entry: EntryId) -> Option<&T> {
        self.resolve(entry)
            .and_then(|index| self.slots[index].node.as_ref())
            .map(|node| &node.value)
    }

    /// Entry following `entry` toward the back
    pub fn next(&self, entry: EntryId) -> Option<EntryId> {
        let index = self.resolve(entry)?;
        let next = self.slots[index].node.as_ref()?.next?;
        Some(self.entry_id(next))
    }

    /// Entry preceding `entry` toward the front
    pub fn prev(&self, entry: EntryId) -> Option<EntryId> {
        let index = self.resolve(entry)?;
        let prev = self.slots[index].node.as_ref()?.prev?;
        Some(self.entry_id(prev))
    }

    /// Iterate entries front (oldest) to back (newest)
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Append `value` at the back
    pub fn push_back(&mut self, value: T) -> EntryId {
        let node = Node {
            value,
            prev: self.tail,
            next: None,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => {
                if let Some(node) = self.node_mut(tail) {
                    node.next = Some(index);
                }
            }
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        self.entry_id(index)
    }

    /// Remove and return the back value
    pub fn pop_back(&mut self) -> Option<T> {
        let index = self.tail?;
        let node = self.release_slot(index)?;

        self.tail = node.prev;
        match node.prev {
            Some(prev) => {
                if let Some(prev) = self.node_mut(prev) {
                    prev.next = None;
                }
            }
            None => self.head = None,
        }

        Some(node.value)
    }

    /// Make `entry` the new front, detaching every entry before it
    ///
    /// The chain is cut with a single relink at `entry`; the detached values
    /// are returned front to back so the caller can dispose of them after
    /// releasing any lock guarding the list. `None` detaches everything.
    /// If `entry` is already the front, or is stale, nothing changes.
    pub fn reset_front(&mut self, entry: Option<EntryId>) -> Vec<T> {
        let detached = self.head;

        match entry {
            Some(entry) => {
                let Some(index) = self.resolve(entry) else {
                    return Vec::new();
                };
                let Some(prev) = self.node_mut(index).and_then(|node| node.prev.take()) else {
                    return Vec::new();
                };
                if let Some(prev) = self.node_mut(prev) {
                    prev.next = None;
                }
                self.head = Some(index);
            }
            None => {
                self.head = None;
                self.tail = None;
            }
        }

        let mut evicted = Vec::new();
        let mut cursor = detached;
        while let Some(index) = cursor {
            let Some(node) = self.release_slot(index) else {
                break;
            };
            cursor = node.next;
            evicted.push(node.value);
        }
        evicted
    }

    fn entry_id(&self, index: usize) -> EntryId {
        EntryId {
            index,
            generation: self.slots[index].generation,
        }
    }

    fn resolve(&self, entry: EntryId) -> Option<usize> {
        let slot = self.slots.get(entry.index)?;
        (slot.generation == entry.generation && slot.node.is_some()).then_some(entry.index)
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(index)?.node.as_mut()
    }

    fn release_slot(&mut self, index: usize) -> Option<Node<T>> {
        let slot = self.slots.get_mut(index)?;
        let node = slot.node.take()?;
        slot.generation += 1;
        self.free.push(index);
        self.len -= 1;
        Some(node)
    }
}

impl<T: fmt::Debug> fmt::Debug for IdleList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(_, value)| value))
            .finish()
    }
}

/// Front-to-back iterator over an [`IdleList`]
pub struct Iter<'a, T> {
    list: &'a IdleList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (EntryId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let node = self.list.slots[index].node.as_ref()?;
        self.cursor = node.next;
        Some((self.list.entry_id(index), &node.value))
    }
}
