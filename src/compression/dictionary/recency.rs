//! Arena-backed LRU lists.
//!
//! Entries live in one flat array and are linked by integer indices, one
//! doubly-linked list per set. Entry `i` always belongs to set
//! `i / set_size`; only its position within that set's list changes.

/// Marks the absence of a neighbour.
const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: usize,
    next: usize,
}

/// Per-set recency order over a fixed arena of entries.
#[derive(Debug, Clone)]
pub struct RecencyList {
    links: Vec<Link>,
    heads: Vec<usize>,
    tails: Vec<usize>,
    set_size: usize,
}

impl RecencyList {
    /// Creates `num_sets` lists of `set_size` entries each. Within a set the
    /// lowest index starts as most recently used and the highest as least.
    pub fn new(num_sets: usize, set_size: usize) -> Self {
        let mut links = Vec::with_capacity(num_sets * set_size);
        let mut heads = Vec::with_capacity(num_sets);
        let mut tails = Vec::with_capacity(num_sets);
        for set in 0..num_sets {
            let first = set * set_size;
            let last = first + set_size - 1;
            for index in first..=last {
                links.push(Link {
                    prev: if index == first { NIL } else { index - 1 },
                    next: if index == last { NIL } else { index + 1 },
                });
            }
            heads.push(first);
            tails.push(last);
        }
        RecencyList {
            links,
            heads,
            tails,
            set_size,
        }
    }

    /// The set an entry belongs to.
    #[inline]
    pub fn set_of(&self, index: usize) -> usize {
        index / self.set_size
    }

    /// Least recently used entry of a set: the victim on a miss.
    #[inline]
    pub fn tail(&self, set: usize) -> usize {
        self.tails[set]
    }

    /// Moves an entry to the front of its set in O(1).
    pub fn promote(&mut self, index: usize) {
        let set = self.set_of(index);
        let head = self.heads[set];
        if head == index {
            return;
        }
        let Link { prev, next } = self.links[index];
        // Not the head, so it has a predecessor.
        self.links[prev].next = next;
        if next == NIL {
            self.tails[set] = prev;
        } else {
            self.links[next].prev = prev;
        }
        self.links[index] = Link {
            prev: NIL,
            next: head,
        };
        self.links[head].prev = index;
        self.heads[set] = index;
    }

    /// Entries of a set from most to least recently used.
    pub fn iter(&self, set: usize) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.heads[set],
        }
    }

    /// First entry of the set, in recency order, accepted by `matches`, or
    /// the set's LRU entry when none is.
    pub fn find_or_victim(&self, set: usize, mut matches: impl FnMut(usize) -> bool) -> usize {
        self.iter(set)
            .find(|&index| matches(index))
            .unwrap_or(self.tails[set])
    }

    /// Whether `a` is more recently used than `b`. Both must share a set.
    pub fn more_recent(&self, a: usize, b: usize) -> bool {
        debug_assert_eq!(self.set_of(a), self.set_of(b));
        self.iter(self.set_of(a))
            .find(|&index| index == a || index == b)
            .is_some_and(|index| index == a)
    }
}

/// Iterator over one set's entries in recency order.
pub struct Iter<'a> {
    list: &'a RecencyList,
    cursor: usize,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursor == NIL {
            return None;
        }
        let current = self.cursor;
        self.cursor = self.list.links[current].next;
        Some(current)
    }
}
