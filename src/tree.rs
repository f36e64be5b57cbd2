use crate::error::{HuffmanError, Result};
use crate::queue::PriorityQueue;
use crate::weight::Weight;
use log::{debug, trace};
use std::collections::HashMap;
use std::hash::Hash;
use total_float_wrap::TotalF64;

/// Node of a Huffman tree.
///
/// A leaf carries a symbol and no children. An internal node carries no
/// symbol and exactly two children whose frequencies sum to its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<Symbol, W = u64> {
    frequency: W,
    symbol: Option<Symbol>,
    left: Option<Box<Node<Symbol, W>>>,
    right: Option<Box<Node<Symbol, W>>>,
}

impl<Symbol, W: Weight> Node<Symbol, W> {
    pub fn leaf(symbol: Symbol, frequency: W) -> Self {
        Self {
            frequency,
            symbol: Some(symbol),
            left: None,
            right: None,
        }
    }

    /// Internal node owning `left` and `right`.
    pub fn from_children(left: Node<Symbol, W>, right: Node<Symbol, W>) -> Result<Self> {
        let frequency = left
            .frequency
            .checked_combine(&right.frequency)
            .ok_or(HuffmanError::WeightOverflow)?;

        Ok(Self {
            frequency,
            symbol: None,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        })
    }

    pub fn frequency(&self) -> &W {
        &self.frequency
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn left(&self) -> Option<&Node<Symbol, W>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<Symbol, W>> {
        self.right.as_deref()
    }

    /// Both children of an internal node, `None` for a leaf.
    pub fn children(&self) -> Option<(&Node<Symbol, W>, &Node<Symbol, W>)> {
        self.left().zip(self.right())
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            Some((l, r)) => l.leaf_count() + r.leaf_count(),
            None => 1,
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        match self.children() {
            Some((l, r)) => 1 + l.height().max(r.height()),
            None => 0,
        }
    }

    /// Sum over all leaves of frequency times code length.
    ///
    /// Equals the sum of the frequencies of all internal nodes. A lone leaf
    /// root is counted with a code length of one.
    pub fn weighted_path_length(&self) -> Option<W> {
        match self.children() {
            None => Some(self.frequency.clone()),
            Some(_) => {
                let mut total: Option<W> = None;
                let mut stack = vec![self];
                while let Some(node) = stack.pop() {
                    if let Some((l, r)) = node.children() {
                        total = Some(match total {
                            Some(t) => t.checked_combine(&node.frequency)?,
                            None => node.frequency.clone(),
                        });
                        stack.push(r);
                        stack.push(l);
                    }
                }
                total
            }
        }
    }
}

/// Builds a Huffman tree from `(symbol, frequency)` pairs.
///
/// The whole input is validated before any merging starts: it must be
/// non-empty, every frequency must be positive and no symbol may appear
/// twice. Equal frequencies are merged in input order, and the first node
/// taken from the queue becomes the left child.
pub fn build_tree<Symbol, W, I>(frequencies: I) -> Result<Node<Symbol, W>>
where
    Symbol: Hash + Eq,
    W: Weight,
    I: IntoIterator<Item = (Symbol, W)>,
{
    let pairs: Vec<(Symbol, W)> = frequencies.into_iter().collect();
    if pairs.is_empty() {
        return Err(HuffmanError::EmptyInput);
    }

    let mut seen: HashMap<&Symbol, usize> = HashMap::with_capacity(pairs.len());
    for (index, (symbol, frequency)) in pairs.iter().enumerate() {
        if !frequency.is_positive() {
            return Err(HuffmanError::NonPositiveFrequency { index });
        }
        if let Some(&first) = seen.get(symbol) {
            return Err(HuffmanError::DuplicateSymbol {
                first,
                second: index,
            });
        }
        seen.insert(symbol, index);
    }

    debug!("Building Huffman tree from {} unique symbols", pairs.len());

    let mut queue: PriorityQueue<W, Node<Symbol, W>> = pairs
        .into_iter()
        .map(|(symbol, frequency)| (frequency.clone(), Node::leaf(symbol, frequency)))
        .collect();

    while queue.size() > 1 {
        let left = queue.extract_min()?;
        let right = queue.extract_min()?;

        let parent = Node::from_children(left, right)?;
        trace!("merged into internal node of weight {:?}", parent.frequency);
        queue.insert(parent.frequency.clone(), parent);
    }

    let root = queue.extract_min()?;
    debug!(
        "Tree construction complete: root weight {:?}, {} leaves, height {}",
        root.frequency,
        root.leaf_count(),
        root.height()
    );
    Ok(root)
}

/// Tallies a stream of symbols.
///
/// Symbols are listed in order of first occurrence, which keeps the tree
/// built from the result reproducible.
pub fn count_frequencies<Symbol, I>(symbols: I) -> Vec<(Symbol, u64)>
where
    Symbol: Hash + Eq + Clone,
    I: IntoIterator<Item = Symbol>,
{
    let mut index: HashMap<Symbol, usize> = HashMap::new();
    let mut counts: Vec<(Symbol, u64)> = Vec::new();

    for s in symbols {
        match index.get(&s) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(s.clone(), counts.len());
                counts.push((s, 1));
            }
        }
    }

    counts
}

/// Turns tallies into probabilities that sum to one.
pub fn probabilities<Symbol>(counts: Vec<(Symbol, u64)>) -> Vec<(Symbol, TotalF64)> {
    let total: u64 = counts.iter().map(|(_, c)| c).sum();

    counts
        .into_iter()
        .map(|(s, c)| (s, TotalF64(c as f64 / total as f64)))
        .collect()
}

/// Tallies `symbols` and builds the tree for their frequencies.
pub fn huffman<Symbol, I>(symbols: I) -> Result<Node<Symbol>>
where
    Symbol: Hash + Eq + Clone,
    I: IntoIterator<Item = Symbol>,
{
    build_tree(count_frequencies(symbols))
}
