// MIT LICENSE
//
// Copyright (c) 2024 Ledger Tree Contributors
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! A single B-tree node: either a leaf holding records, or an internal
//! node holding child summaries. Conceptually immutable — every mutating
//! method here returns a *new* `Node` value; the cache (`NodeStore`)
//! replaces the old value under the same id.
//!
//! `amount` is a cached aggregate, derived once in the constructors below
//! and never patched independently, so there is exactly one place that can
//! get it wrong.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::key::RecordKey;
use crate::node_ref::NodeRef;
use crate::record::Record;

#[derive(Clone, Debug, Serialize, Deserialize)]
enum Body {
    Leaf(Vec<Record>),
    Internal(Vec<NodeRef>),
}

/// An immutable-by-convention tree node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    id: u64,
    body: Body,
    amount: BigDecimal,
}

impl Node {
    /// Builds a leaf from an already-sorted record list. `amount` is
    /// derived here, once.
    pub fn new_leaf(id: u64, records: Vec<Record>) -> Self {
        let amount = records.iter().fold(BigDecimal::zero(), |acc, r| acc + r.amount());
        Self {
            id,
            body: Body::Leaf(records),
            amount,
        }
    }

    /// Builds an internal node from an already-sorted child-ref list.
    /// `amount` is derived here, once.
    pub fn new_internal(id: u64, children: Vec<NodeRef>) -> Self {
        let amount = children.iter().fold(BigDecimal::zero(), |acc, c| acc + c.amount());
        Self {
            id,
            body: Body::Internal(children),
            amount,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, Body::Leaf(_))
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    /// Number of entries (records or children). A node is overflowing
    /// when this exceeds the configured degree.
    pub fn len(&self) -> usize {
        match &self.body {
            Body::Leaf(r) => r.len(),
            Body::Internal(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Result<&[Record]> {
        match &self.body {
            Body::Leaf(r) => Ok(r),
            Body::Internal(_) => Err(Error::InvariantViolation(
                "records() called on an internal node".into(),
            )),
        }
    }

    pub fn children(&self) -> Result<&[NodeRef]> {
        match &self.body {
            Body::Internal(c) => Ok(c),
            Body::Leaf(_) => Err(Error::InvariantViolation(
                "children() called on a leaf node".into(),
            )),
        }
    }

    /// Binary search for `key` among this leaf's records. Returns the
    /// index on a hit, or the bitwise complement of the insertion point
    /// on a miss (so the sign bit distinguishes hit from miss and `!idx`
    /// recovers the insertion point).
    pub fn find_record(&self, key: &RecordKey) -> Result<isize> {
        let records = self.records()?;
        match records.binary_search_by(|r| r.key().cmp(key)) {
            Ok(i) => Ok(i as isize),
            Err(i) => Ok(!(i as isize)),
        }
    }

    /// Binary search for the child whose `[first_key, last_key]` range
    /// contains `key`. Returns the index on a hit, or the bitwise
    /// complement of the insertion point (among children ordered by
    /// `first_key`) on a miss.
    ///
    /// Fails if called on an internal node with an empty `children` —
    /// tree invariants forbid empty non-root internals.
    pub fn find_child(&self, key: &RecordKey) -> Result<isize> {
        let children = self.children()?;
        if children.is_empty() {
            return Err(Error::InvariantViolation(
                "find_child called on an internal node with no children".into(),
            ));
        }
        let mut lo = 0usize;
        let mut hi = children.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let child = &children[mid];
            if key < child.first_key() {
                hi = mid;
            } else if key > child.last_key() {
                lo = mid + 1;
            } else {
                return Ok(mid as isize);
            }
        }
        Ok(!(lo as isize))
    }

    /// Returns a new leaf with `r` inserted at index `i`.
    pub fn with_inserted_record(&self, i: usize, r: Record) -> Result<Self> {
        let records = self.records()?;
        let mut next = Vec::with_capacity(records.len() + 1);
        next.extend_from_slice(&records[..i]);
        next.push(r);
        next.extend_from_slice(&records[i..]);
        Ok(Self::new_leaf(self.id, next))
    }

    /// Returns a new leaf with the record at index `i` removed.
    pub fn with_deleted_record(&self, i: usize) -> Result<Self> {
        let records = self.records()?;
        let mut next = Vec::with_capacity(records.len() - 1);
        next.extend_from_slice(&records[..i]);
        next.extend_from_slice(&records[i + 1..]);
        Ok(Self::new_leaf(self.id, next))
    }

    /// Returns a new leaf with the record at index `i` replaced by `r`.
    pub fn with_replaced_record(&self, i: usize, r: Record) -> Result<Self> {
        let records = self.records()?;
        let mut next = records.to_vec();
        next[i] = r;
        Ok(Self::new_leaf(self.id, next))
    }

    /// Returns a new internal node with the child ref at index `i`
    /// overwritten by `new_ref`.
    pub fn with_replaced_child(&self, i: usize, new_ref: NodeRef) -> Result<Self> {
        let children = self.children()?;
        let mut next = children.to_vec();
        next[i] = new_ref;
        Ok(Self::new_internal(self.id, next))
    }

    /// Returns a new internal node in which the child matching
    /// `old_child_id` is replaced by `new_refs` (used only by split: the
    /// new children exactly span the old child's key range, so sort
    /// order is preserved).
    pub fn with_replaced_child_by_many(&self, old_child_id: u64, new_refs: Vec<NodeRef>) -> Result<Self> {
        let children = self.children()?;
        let pos = children
            .iter()
            .position(|c| c.child_id() == old_child_id)
            .ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "with_replaced_child_by_many: child {old_child_id} not found in parent {}",
                    self.id
                ))
            })?;
        let mut next = Vec::with_capacity(children.len() - 1 + new_refs.len());
        next.extend_from_slice(&children[..pos]);
        next.extend(new_refs);
        next.extend_from_slice(&children[pos + 1..]);
        Ok(Self::new_internal(self.id, next))
    }

    /// The `NodeRef` summarizing this node, for installation into its
    /// parent's `children` array.
    pub fn self_ref(&self) -> Result<NodeRef> {
        let (first, last) = match &self.body {
            Body::Leaf(records) => {
                let first = records
                    .first()
                    .ok_or_else(|| Error::InvariantViolation(format!("self_ref on empty leaf {}", self.id)))?
                    .key()
                    .clone();
                let last = records
                    .last()
                    .ok_or_else(|| Error::InvariantViolation(format!("self_ref on empty leaf {}", self.id)))?
                    .key()
                    .clone();
                (first, last)
            }
            Body::Internal(children) => {
                let first = children
                    .first()
                    .ok_or_else(|| {
                        Error::InvariantViolation(format!("self_ref on empty internal node {}", self.id))
                    })?
                    .first_key()
                    .clone();
                let last = children
                    .last()
                    .ok_or_else(|| {
                        Error::InvariantViolation(format!("self_ref on empty internal node {}", self.id))
                    })?
                    .last_key()
                    .clone();
                (first, last)
            }
        };
        Ok(NodeRef::new(first, last, self.id, self.amount.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use bigdecimal::FromPrimitive;
    use chrono::{TimeZone, Utc};

    fn rec(seq: u32, amount: f64) -> Record {
        let key = RecordKey::new("A", Utc.timestamp_opt(0, 0).unwrap(), seq);
        Record::new(key, "d", BigDecimal::from_f64(amount).unwrap())
    }

    #[test]
    fn leaf_amount_is_the_sum() {
        let leaf = Node::new_leaf(0, vec![rec(0, 1.0), rec(1, 2.5)]);
        assert_eq!(leaf.amount(), &BigDecimal::from_f64(3.5).unwrap());
    }

    #[test]
    fn insert_delete_replace_maintain_amount() {
        let leaf = Node::new_leaf(0, vec![rec(0, 1.0), rec(2, 2.0)]);
        let inserted = leaf.with_inserted_record(1, rec(1, 5.0)).unwrap();
        assert_eq!(inserted.amount(), &BigDecimal::from_f64(8.0).unwrap());
        assert_eq!(inserted.len(), 3);

        let deleted = inserted.with_deleted_record(1).unwrap();
        assert_eq!(deleted.amount(), &BigDecimal::from_f64(3.0).unwrap());

        let replaced = deleted.with_replaced_record(0, rec(0, 10.0)).unwrap();
        assert_eq!(replaced.amount(), &BigDecimal::from_f64(12.0).unwrap());
    }

    #[test]
    fn find_record_hit_and_miss() {
        let leaf = Node::new_leaf(0, vec![rec(0, 1.0), rec(2, 2.0), rec(4, 3.0)]);
        let k1 = RecordKey::new("A", Utc.timestamp_opt(0, 0).unwrap(), 2);
        assert_eq!(leaf.find_record(&k1).unwrap(), 1);
        let miss = RecordKey::new("A", Utc.timestamp_opt(0, 0).unwrap(), 3);
        let idx = leaf.find_record(&miss).unwrap();
        assert!(idx < 0);
        assert_eq!(!idx, 2);
    }

    #[test]
    fn leaf_only_ops_reject_internal_nodes() {
        let internal = Node::new_internal(
            0,
            vec![NodeRef::new(
                RecordKey::new("A", Utc.timestamp_opt(0, 0).unwrap(), 0),
                RecordKey::new("A", Utc.timestamp_opt(0, 0).unwrap(), 0),
                1,
                BigDecimal::from_f64(1.0).unwrap(),
            )],
        );
        assert_matches!(internal.records(), Err(Error::InvariantViolation(_)));
        assert_matches!(
            internal.find_record(&RecordKey::new("A", Utc.timestamp_opt(0, 0).unwrap(), 0)),
            Err(Error::InvariantViolation(_))
        );
    }
}
