use crate::error::{HuffmanError, Result};
use crate::tree::Node;
use crate::weight::Weight;
use derivative::Derivative;
use bitvec::prelude::*;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Path from the root to a leaf: `0` for every left edge, `1` for every
/// right edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(BitVec);

impl Code {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.0.starts_with(self.0.as_bitslice())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.0.iter().by_vals() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Depth-first, left-to-right walk over the leaves of a tree.
///
/// Created by [`code_words`].
pub struct CodeWords<'a, Symbol, W> {
    stack: Vec<(&'a Node<Symbol, W>, BitVec)>,
}

impl<'a, Symbol, W: Weight> Iterator for CodeWords<'a, Symbol, W> {
    type Item = (&'a Symbol, Code);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, prefix)) = self.stack.pop() {
            match node.children() {
                Some((left, right)) => {
                    let mut right_code = prefix.clone();
                    right_code.push(true);
                    let mut left_code = prefix;
                    left_code.push(false);

                    self.stack.push((right, right_code));
                    self.stack.push((left, left_code));
                }
                None => {
                    if let Some(symbol) = node.symbol() {
                        return Some((symbol, Code(prefix)));
                    }
                }
            }
        }

        None
    }
}

/// Every `(symbol, code)` pair of the tree, in depth-first order.
///
/// A tree made of a single leaf yields that leaf with the code `0`.
pub fn code_words<Symbol, W: Weight>(root: &Node<Symbol, W>) -> CodeWords<'_, Symbol, W> {
    let prefix = if root.is_leaf() {
        bitvec![0]
    } else {
        BitVec::new()
    };

    CodeWords {
        stack: vec![(root, prefix)],
    }
}

/// Collects the code of every leaf into a [`CodeTable`].
///
/// Trees from [`build_tree`](crate::build_tree) never repeat a symbol; a
/// hand-assembled tree that does is rejected with `DuplicateSymbol`, with
/// positions counted in traversal order.
pub fn build_code_table<Symbol, W>(root: &Node<Symbol, W>) -> Result<CodeTable<Symbol>>
where
    Symbol: Hash + Eq + Clone,
    W: Weight,
{
    let mut table = CodeTable::with_capacity(root.leaf_count());
    for (second, (symbol, code)) in code_words(root).enumerate() {
        trace!("assigned code {} at depth {}", code, code.len());
        table
            .push(symbol.clone(), code)
            .map_err(|first| HuffmanError::DuplicateSymbol { first, second })?;
    }

    debug!(
        "Code table built: {} entries, weighted path length {:?}",
        table.len(),
        root.weighted_path_length()
    );
    Ok(table)
}

/// Mapping from symbol to code, iterated in the order the leaves were
/// visited.
#[derive(Debug, Clone, Derivative)]
#[derivative(
    PartialEq(bound = "Symbol: Hash + Eq"),
    Eq(bound = "Symbol: Hash + Eq")
)]
pub struct CodeTable<Symbol> {
    entries: Vec<(Symbol, Code)>,
    index: HashMap<Symbol, usize>,
}

impl<Symbol> CodeTable<Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Appends an entry, returning the position of an earlier entry for the
    /// same symbol instead.
    fn push(&mut self, symbol: Symbol, code: Code) -> std::result::Result<(), usize> {
        if let Some(&existing) = self.index.get(&symbol) {
            return Err(existing);
        }
        self.index.insert(symbol.clone(), self.entries.len());
        self.entries.push((symbol, code));
        Ok(())
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Code> {
        self.index.get(symbol).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Code)> {
        self.entries.iter().map(|(s, c)| (s, c))
    }

    /// Entries ordered by code length, then by code bits.
    pub fn sorted_by_code(&self) -> Vec<(&Symbol, &Code)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| a.1.cmp(b.1)));
        sorted
    }

    /// Sum of `frequency * code length` over `frequencies`.
    ///
    /// `None` if `frequencies` is empty, a symbol has no code or the sum
    /// overflows `W`.
    pub fn weighted_length<W: Weight>(&self, frequencies: &[(Symbol, W)]) -> Option<W> {
        let mut total: Option<W> = None;
        for (symbol, freq) in frequencies {
            let code = self.get(symbol)?;
            for _ in 0..code.len() {
                total = Some(match total {
                    Some(t) => t.checked_combine(freq)?,
                    None => freq.clone(),
                });
            }
        }
        total
    }

    /// Whether no code is a prefix of (or equal to) another.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&Code> = self.entries.iter().map(|(_, c)| c).collect();
        codes.sort();
        codes.windows(2).all(|w| !w[0].is_prefix_of(w[1]))
    }

    pub fn into_map(self) -> HashMap<Symbol, Code> {
        self.entries.into_iter().collect()
    }
}

/// Serde form of a [`CodeTable`]. Each code is stored as its bit length plus
/// the words backing it.
#[derive(Serialize, Deserialize)]
pub struct SerializableCodeTable<Symbol> {
    entries: Vec<(Symbol, (usize, Box<[usize]>))>,
}

impl<'a, Symbol> From<&'a CodeTable<Symbol>> for SerializableCodeTable<Symbol>
where
    Symbol: Clone,
{
    fn from(other: &'a CodeTable<Symbol>) -> Self {
        Self {
            entries: other
                .entries
                .iter()
                .map(|(s, code)| {
                    let len = code.len();
                    let words = code.0.clone().into_boxed_bitslice().into_boxed_slice();

                    (s.clone(), (len, words))
                })
                .collect(),
        }
    }
}

impl<Symbol> TryFrom<SerializableCodeTable<Symbol>> for CodeTable<Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    type Error = HuffmanError;

    fn try_from(other: SerializableCodeTable<Symbol>) -> Result<Self> {
        let mut table = CodeTable::with_capacity(other.entries.len());
        for (second, (symbol, (len, words))) in other.entries.into_iter().enumerate() {
            let mut bits = BitBox::from_boxed_slice(words).into_bitvec();
            bits.resize(len, false);

            table
                .push(symbol, Code(bits))
                .map_err(|first| HuffmanError::DuplicateSymbol { first, second })?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;
    use total_float_wrap::TotalF64;
    use quickcheck::{quickcheck, TestResult};

    fn codes_as_strings<Symbol: Hash + Eq + Clone>(
        table: &CodeTable<Symbol>,
    ) -> HashMap<Symbol, String> {
        table.iter().map(|(s, c)| (s.clone(), c.to_string())).collect()
    }

    /// Optimal weighted length computed without the priority queue: merge
    /// the two smallest weights of a sorted list until one remains.
    fn reference_cost(weights: &[u64]) -> u64 {
        if weights.len() == 1 {
            return weights[0];
        }
        let mut ws = weights.to_vec();
        let mut cost = 0;
        while ws.len() > 1 {
            ws.sort_unstable_by(|a, b| b.cmp(a));
            let a = ws.pop().unwrap();
            let b = ws.pop().unwrap();
            cost += a + b;
            ws.push(a + b);
        }
        cost
    }

    fn input_from(raw: Vec<u16>) -> Vec<(usize, u64)> {
        raw.into_iter()
            .take(64)
            .enumerate()
            .map(|(i, f)| (i, f as u64 + 1))
            .collect()
    }

    #[test]
    fn single_symbol_gets_zero() {
        let root = build_tree(vec![('x', 5u64)]).unwrap();
        let table = build_code_table(&root).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&'x').map(Code::to_string), Some("0".to_string()));
    }

    #[test]
    fn textbook_codes() {
        let input = vec![
            ('A', 5u64),
            ('B', 9),
            ('C', 12),
            ('D', 13),
            ('E', 16),
            ('F', 45),
        ];
        let table = build_code_table(&build_tree(input.clone()).unwrap()).unwrap();

        let expected: HashMap<char, String> = [
            ('F', "0"),
            ('C', "100"),
            ('D', "101"),
            ('A', "1100"),
            ('B', "1101"),
            ('E', "111"),
        ]
        .into_iter()
        .map(|(s, c)| (s, c.to_string()))
        .collect();

        assert_eq!(codes_as_strings(&table), expected);
        assert_eq!(table.weighted_length(&input), Some(224));
        assert!(table.is_prefix_free());
    }

    #[test]
    fn traversal_order_is_left_to_right() {
        let input = vec![
            ('A', 5u64),
            ('B', 9),
            ('C', 12),
            ('D', 13),
            ('E', 16),
            ('F', 45),
        ];
        let root = build_tree(input).unwrap();
        let order: Vec<char> = code_words(&root).map(|(s, _)| *s).collect();
        assert_eq!(order, ['F', 'C', 'D', 'A', 'B', 'E']);
    }

    #[test]
    fn string_tokens() {
        let input = vec![
            ("the".to_string(), 4u64),
            ("cat".to_string(), 2),
            ("sat".to_string(), 1),
            ("mat".to_string(), 1),
        ];
        let table = build_code_table(&build_tree(input).unwrap()).unwrap();

        assert_eq!(table.get(&"the".to_string()).map(Code::len), Some(1));
        assert_eq!(table.get(&"cat".to_string()).map(Code::len), Some(2));
        assert_eq!(table.get(&"sat".to_string()).map(Code::len), Some(3));
        assert_eq!(table.get(&"mat".to_string()).map(Code::len), Some(3));
        assert_eq!(table.get(&"dog".to_string()), None);
    }

    #[test]
    fn digits_example_is_optimal() {
        let input = vec![
            ('1', 26u64),
            ('2', 14),
            ('3', 5),
            ('4', 10),
            ('5', 7),
            ('6', 11),
            ('7', 2),
            ('8', 20),
            ('9', 5),
        ];
        let weights: Vec<u64> = input.iter().map(|(_, f)| *f).collect();
        let table = build_code_table(&build_tree(input.clone()).unwrap()).unwrap();

        assert_eq!(table.len(), 9);
        assert_eq!(table.weighted_length(&input), Some(reference_cost(&weights)));
        assert_eq!(table.weighted_length(&input), Some(290));
    }

    #[test]
    fn sorted_by_code_orders_short_codes_first() {
        let input = vec![('a', 1u64), ('b', 1), ('c', 2)];
        let table = build_code_table(&build_tree(input).unwrap()).unwrap();
        let sorted: Vec<String> = table
            .sorted_by_code()
            .into_iter()
            .map(|(s, c)| format!("{}={}", s, c))
            .collect();
        assert_eq!(sorted, ["c=0", "a=10", "b=11"]);
    }

    #[test]
    fn into_map_holds_every_symbol() {
        let input = vec![("to", 3u64), ("be", 2), ("or", 1), ("not", 1)];
        let map = build_code_table(&build_tree(input).unwrap()).unwrap().into_map();

        let mut codes: Vec<(&str, String)> =
            map.iter().map(|(s, c)| (*s, c.to_string())).collect();
        codes.sort();
        assert_eq!(
            codes,
            [
                ("be", "10".to_string()),
                ("not", "111".to_string()),
                ("or", "110".to_string()),
                ("to", "0".to_string()),
            ]
        );
    }

    #[test]
    fn weighted_length_of_probabilities() {
        let input = vec![
            ('a', TotalF64(0.5)),
            ('b', TotalF64(0.25)),
            ('c', TotalF64(0.25)),
        ];
        let table = build_code_table(&build_tree(input.clone()).unwrap()).unwrap();

        assert_eq!(table.weighted_length(&input), Some(TotalF64(1.5)));
        assert_eq!(table.weighted_length::<TotalF64>(&[]), None);
        assert_eq!(table.weighted_length(&[('z', TotalF64(1.0))]), None);
    }

    #[test]
    fn weighted_length_overflow() {
        let input = vec![('a', 100u8), ('b', 100), ('c', 50)];
        let table = build_code_table(&build_tree(vec![('a', 1u8), ('b', 1), ('c', 2)]).unwrap())
            .unwrap();
        assert_eq!(table.weighted_length(&input), None);
    }

    #[test]
    fn duplicate_leaves_are_rejected() {
        let tree = Node::from_children(Node::leaf('a', 1u64), Node::leaf('a', 2)).unwrap();
        assert_eq!(
            build_code_table(&tree),
            Err(HuffmanError::DuplicateSymbol {
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn prefix_check_detects_collisions() {
        let mut table = CodeTable::with_capacity(2);
        table.push('a', Code(bitvec![0])).unwrap();
        table.push('b', Code(bitvec![0, 1])).unwrap();
        assert!(!table.is_prefix_free());

        assert_eq!(table.push('a', Code(bitvec![1])), Err(0));
    }

    #[test]
    fn serialize_round_trip() {
        let input: Vec<(char, u64)> = "abcdefghijklmnopqrstuvwxyz"
            .chars()
            .zip(1..)
            .collect();
        let table = build_code_table(&build_tree(input).unwrap()).unwrap();

        let bytes = rmp_serde::to_vec(&SerializableCodeTable::from(&table)).unwrap();
        let restored: SerializableCodeTable<char> = rmp_serde::from_slice(&bytes).unwrap();
        let restored = CodeTable::try_from(restored).unwrap();

        assert_eq!(restored, table);
    }

    #[test]
    fn deserialize_rejects_duplicates() {
        let serialized = SerializableCodeTable {
            entries: vec![
                ('a', (1, vec![0usize].into_boxed_slice())),
                ('a', (1, vec![1usize].into_boxed_slice())),
            ],
        };
        assert_eq!(
            CodeTable::try_from(serialized),
            Err(HuffmanError::DuplicateSymbol {
                first: 0,
                second: 1
            })
        );
    }

    quickcheck! {
        fn one_code_per_symbol(raw: Vec<u16>) -> TestResult {
            let input = input_from(raw);
            if input.is_empty() {
                return TestResult::discard();
            }
            let table = build_code_table(&build_tree(input.clone()).unwrap()).unwrap();

            TestResult::from_bool(
                table.len() == input.len()
                    && input.iter().all(|(s, _)| table.get(s).map_or(false, |c| !c.is_empty())),
            )
        }

        fn codes_are_prefix_free(raw: Vec<u16>) -> TestResult {
            let input = input_from(raw);
            if input.is_empty() {
                return TestResult::discard();
            }
            let table = build_code_table(&build_tree(input).unwrap()).unwrap();

            TestResult::from_bool(table.is_prefix_free())
        }

        fn weighted_length_is_optimal(raw: Vec<u16>) -> TestResult {
            let input = input_from(raw);
            if input.is_empty() {
                return TestResult::discard();
            }
            let weights: Vec<u64> = input.iter().map(|(_, f)| *f).collect();
            let root = build_tree(input.clone()).unwrap();
            let table = build_code_table(&root).unwrap();

            let expected = reference_cost(&weights);
            TestResult::from_bool(
                table.weighted_length(&input) == Some(expected)
                    && root.weighted_path_length() == Some(expected),
            )
        }

        fn root_holds_total_frequency(raw: Vec<u16>) -> TestResult {
            let input = input_from(raw);
            if input.is_empty() {
                return TestResult::discard();
            }
            let total: u64 = input.iter().map(|(_, f)| f).sum();
            let root = build_tree(input).unwrap();

            TestResult::from_bool(*root.frequency() == total)
        }

        fn tables_are_deterministic(raw: Vec<u16>) -> TestResult {
            let input = input_from(raw);
            if input.is_empty() {
                return TestResult::discard();
            }
            let first = build_code_table(&build_tree(input.clone()).unwrap()).unwrap();
            let second = build_code_table(&build_tree(input).unwrap()).unwrap();

            TestResult::from_bool(first.entries == second.entries)
        }
    }
}
