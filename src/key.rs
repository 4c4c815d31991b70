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

//! The composite key every record and node range is ordered by.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comparable (account, date, sequence) triple.
///
/// Total order: `account_id` lexicographic, then `date` ascending, then
/// `sequence` ascending. Immutable once constructed; equality is
/// structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    account_id: String,
    date: DateTime<Utc>,
    sequence: u32,
}

impl RecordKey {
    /// Builds a key. Rejecting an empty `account_id` is a boundary concern
    /// (the façade's job per the spec's scope), not enforced here.
    pub fn new(account_id: impl Into<String>, date: DateTime<Utc>, sequence: u32) -> Self {
        Self {
            account_id: account_id.into(),
            date,
            sequence,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Whether `self` and `other` share the same (account, date) day,
    /// i.e. differ only in sequence. Used by `adjust_key`.
    pub fn same_day(&self, other: &Self) -> bool {
        self.account_id == other.account_id && self.date == other.date
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.account_id
            .cmp(&other.account_id)
            .then_with(|| self.date.cmp(&other.date))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(account: &str, day: i64, seq: u32) -> RecordKey {
        RecordKey::new(account, DateTime::from_timestamp(day * 86_400, 0).unwrap(), seq)
    }

    #[test]
    fn orders_by_account_then_date_then_sequence() {
        assert!(key("A", 0, 0) < key("B", 0, 0));
        assert!(key("A", 0, 0) < key("A", 1, 0));
        assert!(key("A", 0, 0) < key("A", 0, 1));
        assert_eq!(key("A", 0, 0), key("A", 0, 0));
    }

    #[test]
    fn same_day_ignores_sequence() {
        assert!(key("A", 0, 0).same_day(&key("A", 0, 5)));
        assert!(!key("A", 0, 0).same_day(&key("A", 1, 0)));
        assert!(!key("A", 0, 0).same_day(&key("B", 0, 0)));
    }
}
