use std::cmp::Ordering;
use std::fmt;

use crate::error::{HuffmanError, Result};
use crate::min_heap::MinHeap;

pub type NodeIndex = usize;

/// One node of the arena. Links are indices into the owning [`HuffmanTree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffNode {
    pub parent: Option<NodeIndex>,
    pub zero: Option<NodeIndex>,
    pub one: Option<NodeIndex>,
    /// Whether this node hangs off its parent's one-edge.
    pub is_one: bool,
}

impl HuffNode {
    pub fn is_leaf(&self) -> bool {
        self.zero.is_none() && self.one.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// Ordered by weight, then by node index, so equal weights pop lowest index first.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    weight: f32,
    node: NodeIndex,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN weights are rejected before they reach the queue.
        self.weight
            .partial_cmp(&other.weight)
            .unwrap_or(Ordering::Equal)
            .then(self.node.cmp(&other.node))
    }
}

/// Huffman tree stored as a flat arena of `2N - 1` nodes for `N` leaves.
///
/// Leaves occupy indices `0..N` in the order of the weights they were built
/// from, internal nodes follow in creation order and the root is last.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffNode>,
    leaf_count: usize,
}

impl HuffmanTree {
    /// Builds the tree greedily from one weight per leaf.
    ///
    /// Each merge takes the two lightest entries; the heavier of the pair
    /// becomes the zero-child and the lighter the one-child.
    ///
    /// At least one weight is required; the codec always supplies the escape leaf.
    pub fn from_weights(weights: &[f32]) -> Result<Self> {
        let leaf_count = weights.len();
        if leaf_count == 0 {
            return Err(HuffmanError::NoLeaves);
        }
        let mut nodes = vec![HuffNode::default(); 2 * leaf_count - 1];

        let entries = weights
            .iter()
            .enumerate()
            .map(|(node, &weight)| QueueEntry { weight, node })
            .collect();
        let mut heap = MinHeap::build(entries);

        let mut next_empty = leaf_count;
        while heap.heap_size() > 1 {
            let lower = heap.extract_min()?;
            let low = heap.extract_min()?;

            // One parent per two extracted, so the arena never runs out.
            debug_assert!(next_empty < nodes.len());
            let parent = next_empty;

            nodes[lower.node].parent = Some(parent);
            nodes[lower.node].is_one = true;
            nodes[low.node].parent = Some(parent);
            nodes[parent].zero = Some(low.node);
            nodes[parent].one = Some(lower.node);

            heap.insert(QueueEntry {
                weight: lower.weight + low.weight,
                node: parent,
            });
            next_empty += 1;
        }

        let tree = HuffmanTree { nodes, leaf_count };
        if !tree.is_consistent() {
            return Err(HuffmanError::Inconsistent);
        }
        Ok(tree)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[HuffNode] {
        &self.nodes
    }

    pub fn root(&self) -> NodeIndex {
        self.nodes.len() - 1
    }

    /// Checks the structural invariants of the arena: size, leaf and root
    /// placement, and that every parent and child link is mirrored.
    pub fn is_consistent(&self) -> bool {
        if self.leaf_count == 0 || self.nodes.len() != 2 * self.leaf_count - 1 {
            return false;
        }
        let last = self.nodes.len() - 1;
        self.nodes.iter().enumerate().all(|(i, node)| {
            self.is_parent_consistent(i, node)
                && self.are_children_consistent(i, node)
                && node.is_leaf() == (i < self.leaf_count)
                && node.is_root() == (i == last)
        })
    }

    fn is_parent_consistent(&self, index: NodeIndex, node: &HuffNode) -> bool {
        let parent = match node.parent {
            Some(parent) if parent == index => return false,
            Some(parent) => match self.nodes.get(parent) {
                Some(parent) => parent,
                None => return false,
            },
            None => return !node.is_one,
        };
        if node.is_one {
            parent.one == Some(index)
        } else {
            parent.zero == Some(index)
        }
    }

    fn are_children_consistent(&self, index: NodeIndex, node: &HuffNode) -> bool {
        [node.zero, node.one].into_iter().flatten().all(|child| {
            self.nodes
                .get(child)
                .is_some_and(|child| child.parent == Some(index))
        })
    }

    /// Edge bits from the root down to `leaf`. The root contributes nothing.
    pub fn path_bits(&self, leaf: NodeIndex) -> Vec<bool> {
        let mut bits = Vec::new();
        let mut current = leaf;
        while let Some(parent) = self.nodes[current].parent {
            bits.push(self.nodes[current].is_one);
            current = parent;
        }
        bits.reverse();
        bits
    }

    /// Same as [`path_bits`](Self::path_bits), rendered as `'0'`/`'1'`.
    pub fn code_string(&self, leaf: NodeIndex) -> String {
        self.path_bits(leaf)
            .into_iter()
            .map(|bit| if bit { '1' } else { '0' })
            .collect()
    }

    /// Calls `emit` for each edge bit on the way from the root to `leaf`
    /// without building an intermediate code.
    pub fn for_each_bit<E>(
        &self,
        leaf: NodeIndex,
        emit: &mut impl FnMut(bool) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        let node = &self.nodes[leaf];
        match node.parent {
            None => Ok(()),
            Some(parent) => {
                self.for_each_bit(parent, emit)?;
                emit(node.is_one)
            }
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, index: NodeIndex, depth: usize, label: &str) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let node = &self.nodes[index];
        if node.is_leaf() {
            return writeln!(f, "{}{}-> Leaf #{}", indent, label, index);
        }
        writeln!(f, "{}{}-> Internal #{}", indent, label, index)?;
        if let Some(zero) = node.zero {
            self.fmt_node(f, zero, depth + 1, "0")?;
        }
        if let Some(one) = node.one {
            self.fmt_node(f, one, depth + 1, "1")?;
        }
        Ok(())
    }
}

/// Indented outline of the tree, zero-edge before one-edge at each node.
impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root(), 0, "root")
    }
}
