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

//! The leaf value: a keyed, described, signed monetary amount.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::key::RecordKey;

/// A single financial record. Immutable once constructed; updates produce
/// a new `Record` rather than mutating one in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    key: RecordKey,
    description: String,
    amount: BigDecimal,
}

impl Record {
    pub fn new(key: RecordKey, description: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            key,
            description: description.into(),
            amount,
        }
    }

    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    /// Returns a copy of this record with a different amount and the same
    /// key and description. Used by `with_replaced_record`.
    pub fn with_amount(&self, amount: BigDecimal) -> Self {
        Self {
            key: self.key.clone(),
            description: self.description.clone(),
            amount,
        }
    }
}
