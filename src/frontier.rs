use std::collections::VecDeque;

/// Index of a node in the search arena.
pub type NodeId = usize;

/// Discovered but not yet expanded nodes. The order in which `remove_next`
/// hands them back is what distinguishes one search strategy from another.
pub trait Frontier {
    /// Add a node. `priority` is only meaningful for ordered frontiers.
    fn insert(&mut self, node: NodeId, priority: usize);

    fn remove_next(&mut self) -> Option<NodeId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Oldest node first (breadth-first search).
#[derive(Default)]
pub struct FifoFrontier {
    queue: VecDeque<NodeId>,
}

impl Frontier for FifoFrontier {
    fn insert(&mut self, node: NodeId, _priority: usize) {
        self.queue.push_back(node);
    }

    fn remove_next(&mut self) -> Option<NodeId> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Newest node first (depth-first search).
#[derive(Default)]
pub struct LifoFrontier {
    stack: Vec<NodeId>,
}

impl Frontier for LifoFrontier {
    fn insert(&mut self, node: NodeId, _priority: usize) {
        self.stack.push(node);
    }

    fn remove_next(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

/// A bucketed priority queue with O(1) push and a bitmap scan for pop-min.
/// Nodes of equal priority come out in insertion order.
pub struct PriorityFrontier {
    buckets: Vec<VecDeque<NodeId>>,
    bitmap: Vec<u64>,
    len: usize,
}

impl PriorityFrontier {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            bitmap: Vec::new(),
            len: 0,
        }
    }
}

impl Default for PriorityFrontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier for PriorityFrontier {
    fn insert(&mut self, node: NodeId, priority: usize) {
        if priority >= self.buckets.len() {
            self.buckets.resize_with(priority + 1, VecDeque::new);
            self.bitmap.resize(priority / 64 + 1, 0);
        }
        self.buckets[priority].push_back(node);
        self.len += 1;

        let word_idx = priority / 64;
        let bit_idx = priority % 64;
        self.bitmap[word_idx] |= 1u64 << bit_idx;
    }

    fn remove_next(&mut self) -> Option<NodeId> {
        // Find first non-empty word, then the first non-empty bucket in it
        let word_idx = self.bitmap.iter().position(|&word| word != 0)?;
        let bit_idx = self.bitmap[word_idx].trailing_zeros() as usize;
        let priority = word_idx * 64 + bit_idx;

        let node = self.buckets[priority].pop_front()?;
        self.len -= 1;

        if self.buckets[priority].is_empty() {
            self.bitmap[word_idx] &= !(1u64 << bit_idx);
        }

        Some(node)
    }

    fn len(&self) -> usize {
        self.len
    }
}
