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

//! Range scans, `record_count`, the cumulative-balance query, and
//! `adjust_key`.

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::key::RecordKey;
use crate::record::Record;
use crate::store::ROOT_ID;

use super::AccountTree;

impl AccountTree {
    /// All records, in key order. Single-account trees only (§4.3 "list").
    pub fn list(&mut self) -> Result<Vec<Record>> {
        let mut out = Vec::new();
        if self.root_exists()? {
            self.collect_all(ROOT_ID, &mut out)?;
        }
        Ok(out)
    }

    fn collect_all(&mut self, id: u64, out: &mut Vec<Record>) -> Result<()> {
        let node = self.fetch(id)?;
        if node.is_leaf() {
            out.extend_from_slice(node.records()?);
            return Ok(());
        }
        let child_ids: Vec<u64> = node.children()?.iter().map(|c| c.child_id()).collect();
        for child_id in child_ids {
            self.collect_all(child_id, out)?;
        }
        Ok(())
    }

    /// Records with `start <= key <= end`, in key order. Subtrees whose
    /// whole range misses `[start, end]` are pruned rather than visited.
    pub fn list_range(&mut self, start: &RecordKey, end: &RecordKey) -> Result<Vec<Record>> {
        let mut out = Vec::new();
        if self.root_exists()? {
            self.collect_range(ROOT_ID, start, end, &mut out)?;
        }
        Ok(out)
    }

    fn collect_range(&mut self, id: u64, start: &RecordKey, end: &RecordKey, out: &mut Vec<Record>) -> Result<()> {
        let node = self.fetch(id)?;
        if node.is_leaf() {
            for r in node.records()? {
                if r.key() >= start && r.key() <= end {
                    out.push(r.clone());
                }
            }
            return Ok(());
        }
        let candidates: Vec<u64> = node
            .children()?
            .iter()
            .filter(|c| !(c.last_key() < start || c.first_key() > end))
            .map(|c| c.child_id())
            .collect();
        for child_id in candidates {
            self.collect_range(child_id, start, end, out)?;
        }
        Ok(())
    }

    /// Deletes every record with `start <= key <= end`. Returns the count
    /// removed. Implemented by collecting the matching keys with a single
    /// range scan, then deleting each directly against the live cache —
    /// the core has no transaction log, so (per §7) an `InvariantViolation`
    /// encountered mid-loop is fatal and unwinds rather than partially
    /// committing silently.
    pub fn delete_range(&mut self, start: &RecordKey, end: &RecordKey) -> Result<u64> {
        let keys: Vec<RecordKey> = self
            .list_range(start, end)?
            .into_iter()
            .map(|r| r.key().clone())
            .collect();
        let mut deleted = 0u64;
        for key in &keys {
            if self.delete_key(key)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Total record count, by summing leaf sizes on an in-order walk.
    pub fn record_count(&mut self) -> Result<u64> {
        if !self.root_exists()? {
            return Ok(0);
        }
        self.count_at(ROOT_ID)
    }

    fn count_at(&mut self, id: u64) -> Result<u64> {
        let node = self.fetch(id)?;
        if node.is_leaf() {
            return Ok(node.len() as u64);
        }
        let child_ids: Vec<u64> = node.children()?.iter().map(|c| c.child_id()).collect();
        let mut total = 0u64;
        for child_id in child_ids {
            total += self.count_at(child_id)?;
        }
        Ok(total)
    }

    /// Sum of amounts of every record with `key' <= key`. O(height):
    /// every fully-covered sibling subtree contributes its cached
    /// `amount` instead of being visited.
    pub fn balance_as_of(&mut self, key: &RecordKey) -> Result<BigDecimal> {
        let mut result = BigDecimal::zero();
        if !self.root_exists()? {
            return Ok(result);
        }
        let mut current = ROOT_ID;
        loop {
            let node = self.fetch(current)?;
            if node.is_leaf() {
                for r in node.records()? {
                    if r.key() > key {
                        return Ok(result);
                    }
                    result += r.amount().clone();
                }
                return Ok(result);
            }

            let mut next = None;
            for child in node.children()? {
                if key > child.last_key() {
                    result += child.amount().clone();
                } else {
                    next = Some(child.child_id());
                    break;
                }
            }
            match next {
                Some(id) => current = id,
                // `key` is at or after every child's range: every child's
                // amount has already been added above, nothing more to add.
                None => return Ok(result),
            }
        }
    }

    /// The record with the greatest key `<= probe`, or `None` if every
    /// key exceeds `probe` (or the tree is empty).
    fn floor(&mut self, probe: &RecordKey) -> Result<Option<Record>> {
        if !self.root_exists()? {
            return Ok(None);
        }
        self.floor_at(ROOT_ID, probe)
    }

    fn floor_at(&mut self, id: u64, probe: &RecordKey) -> Result<Option<Record>> {
        let node = self.fetch(id)?;
        if node.is_leaf() {
            let records = node.records()?;
            let idx = node.find_record(probe)?;
            let pos = if idx >= 0 {
                idx as usize
            } else {
                let insertion = !idx as usize;
                if insertion == 0 {
                    return Ok(None);
                }
                insertion - 1
            };
            return Ok(Some(records[pos].clone()));
        }

        let idx = node.find_child(probe)?;
        let start = if idx >= 0 {
            idx as usize
        } else {
            let insertion = !idx as usize;
            if insertion == 0 {
                return Ok(None);
            }
            insertion - 1
        };
        // The routed child (or, on a miss, the nearest child left of the
        // insertion point) is the usual floor candidate. But a child whose
        // key range is entirely `<= probe` can still yield no record: a
        // fully-deleted leaf keeps its old bounds (`AccountTree::ref_for`)
        // while holding nothing. Walk further left until a subtree actually
        // produces a predecessor, or none remains.
        let candidate_ids: Vec<u64> = node.children()?[..=start].iter().map(|c| c.child_id()).collect();
        for child_id in candidate_ids.into_iter().rev() {
            if let Some(record) = self.floor_at(child_id, probe)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Returns a key for `date` with the smallest sequence number greater
    /// than every existing sequence already used on that (account, date),
    /// or the input's own sequence if the day has no records yet.
    pub fn adjust_key(&mut self, date: DateTime<Utc>, sequence: u32) -> Result<RecordKey> {
        let probe = RecordKey::new(self.account_id(), date, u32::MAX);
        let candidate = RecordKey::new(self.account_id(), date, sequence);
        match self.floor(&probe)? {
            Some(r) if r.key().same_day(&candidate) => {
                let next = r
                    .key()
                    .sequence()
                    .checked_add(1)
                    .ok_or(Error::Saturated)?;
                Ok(RecordKey::new(self.account_id(), date, next))
            }
            _ => Ok(candidate),
        }
    }
}
