// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bit-packed 0/1 weight vectors over a candidate germ list.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

const WORD_BITS: usize = 64;

/// Fixed-length vector of 0/1 weights. Equality and hashing are by
/// content; bits past `len` are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeightVector {
    words: Vec<u64>,
    len: usize,
}

impl WeightVector {
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    pub fn ones(len: usize) -> Self {
        let mut v = Self::zeros(len);
        for i in 0..len {
            v.set(i, true);
        }
        v
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        let mut v = Self::zeros(bits.len());
        for (i, &bit) in bits.iter().enumerate() {
            v.set(i, bit);
        }
        v
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Panics
    /// If `i >= len`.
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "weight index {} out of range {}", i, self.len);
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    /// # Panics
    /// If `i >= len`.
    pub fn set(&mut self, i: usize, value: bool) {
        assert!(i < self.len, "weight index {} out of range {}", i, self.len);
        let mask = 1u64 << (i % WORD_BITS);
        if value {
            self.words[i / WORD_BITS] |= mask;
        } else {
            self.words[i / WORD_BITS] &= !mask;
        }
    }

    /// Copy with weight `i` toggled.
    pub fn flipped(&self, i: usize) -> Self {
        let mut v = self.clone();
        v.set(i, !self.get(i));
        v
    }

    /// Number of selected germs (the L1 norm).
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Whether the first `k` weights are all set. False when the vector is
    /// shorter than `k`.
    pub fn leading_ones(&self, k: usize) -> bool {
        k <= self.len && (0..k).all(|i| self.get(i))
    }

    pub fn to_bools(&self) -> Vec<bool> {
        self.iter().collect()
    }

    /// Weights as floats, for weighted sums.
    pub fn to_f64(&self) -> Vec<f64> {
        self.iter().map(|b| if b { 1.0 } else { 0.0 }).collect()
    }

    /// Indices of set weights, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        (0..self.len).filter(|&i| self.get(i)).collect()
    }

    /// All single-flip neighbors, in index order.
    ///
    /// The iterator borrows `self`; calling this again restarts the scan.
    pub fn neighbors(&self) -> Neighbors<'_> {
        Neighbors {
            base: self,
            next: 0,
        }
    }
}

impl fmt::Display for WeightVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl Serialize for WeightVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len))?;
        for bit in self.iter() {
            seq.serialize_element(&u8::from(bit))?;
        }
        seq.end()
    }
}

/// Lazy iterator over the single-flip neighbors of a weight vector.
#[derive(Debug, Clone)]
pub struct Neighbors<'a> {
    base: &'a WeightVector,
    next: usize,
}

impl Iterator for Neighbors<'_> {
    type Item = WeightVector;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.base.len() {
            return None;
        }
        let neighbor = self.base.flipped(self.next);
        self.next += 1;
        Some(neighbor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.base.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Neighbors<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ones_and_zeros() {
        let ones = WeightVector::ones(70);
        assert_eq!(ones.count_ones(), 70);
        assert!(ones.leading_ones(70));
        let zeros = WeightVector::zeros(70);
        assert_eq!(zeros.count_ones(), 0);
        assert!(!zeros.leading_ones(1));
        assert!(zeros.leading_ones(0));
    }

    #[test]
    fn test_leading_ones_longer_than_vector() {
        // Fewer germs than gates can never cover every singleton
        let short = WeightVector::ones(2);
        assert!(short.leading_ones(2));
        assert!(!short.leading_ones(3));
    }

    #[test]
    fn test_set_get_across_word_boundary() {
        let mut v = WeightVector::zeros(130);
        v.set(63, true);
        v.set(64, true);
        v.set(129, true);
        assert!(v.get(63) && v.get(64) && v.get(129));
        assert!(!v.get(65));
        assert_eq!(v.selected_indices(), vec![63, 64, 129]);
        v.set(64, false);
        assert_eq!(v.count_ones(), 2);
    }

    #[test]
    fn test_equality_and_hash_by_content() {
        let a = WeightVector::from_bools(&[true, false, true]);
        let b = WeightVector::ones(3).flipped(1);
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_all_ones_neighbors_have_fewer_germs() {
        let ones = WeightVector::ones(11);
        let neighbors = ones.neighbors();
        assert_eq!(neighbors.len(), 11);
        for n in neighbors {
            assert_eq!(n.count_ones(), 10);
        }
    }

    #[test]
    fn test_neighbors_flip_each_index_in_order() {
        let base = WeightVector::from_bools(&[true, false, false]);
        let flipped: Vec<String> = base.neighbors().map(|n| n.to_string()).collect();
        assert_eq!(flipped, vec!["000", "110", "101"]);
        // restartable
        assert_eq!(base.neighbors().count(), 3);
    }

    #[test]
    fn test_serialize_as_bits() {
        let v = WeightVector::from_bools(&[true, false, true]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1,0,1]");
        assert_eq!(v.to_f64(), vec![1.0, 0.0, 1.0]);
    }
}
