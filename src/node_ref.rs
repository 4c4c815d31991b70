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

//! `NodeRef`: a compact summary of a child subtree, stored inside its
//! parent's `children` array in place of the child itself.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::key::RecordKey;

/// Bounds, id, and cached amount sum of a child subtree.
///
/// Invariant: for any mutation to the child, the parent's `NodeRef` for
/// that child is refreshed in the same logical operation — see
/// `Node::with_replaced_child`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    first_key: RecordKey,
    last_key: RecordKey,
    child_id: u64,
    amount: BigDecimal,
}

impl NodeRef {
    pub fn new(first_key: RecordKey, last_key: RecordKey, child_id: u64, amount: BigDecimal) -> Self {
        Self {
            first_key,
            last_key,
            child_id,
            amount,
        }
    }

    pub fn first_key(&self) -> &RecordKey {
        &self.first_key
    }

    pub fn last_key(&self) -> &RecordKey {
        &self.last_key
    }

    pub fn child_id(&self) -> u64 {
        self.child_id
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    /// Whether `key` falls within `[first_key, last_key]` of this subtree.
    pub fn contains_key(&self, key: &RecordKey) -> bool {
        &self.first_key <= key && key <= &self.last_key
    }
}
