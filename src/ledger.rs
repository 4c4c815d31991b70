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

//! `Ledger`: the thin façade that multiplexes accounts over independent
//! [`AccountTree`]s (component F). HTTP/CLI front-ends, import formats,
//! and fine-grained per-account locking are explicitly out of scope —
//! this is the mapping layer only.

use std::path::{Path, PathBuf};
use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};

use crate::error::Result;
use crate::key::RecordKey;
use crate::record::Record;
use crate::tree::AccountTree;

/// Degree `D`: the maximum entries per node, applied uniformly to every
/// account tree a `Ledger` creates (§6 "Configuration").
#[derive(Clone, Copy, Debug)]
pub struct TreeConfig {
    pub degree: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { degree: 100 }
    }
}

/// Maps account id to its tree, routing every call by `key.account_id()`.
pub struct Ledger {
    data_dir: PathBuf,
    config: TreeConfig,
    trees: HashMap<String, AccountTree>,
}

impl Ledger {
    /// A fresh ledger rooted at `data_dir`, with no accounts registered
    /// yet (they are created lazily on first write).
    pub fn new(data_dir: impl Into<PathBuf>, config: TreeConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
            trees: HashMap::new(),
        }
    }

    /// Enumerates `<data_dir>/Nodes/*` and registers an empty
    /// (not-yet-loaded) `AccountTree` per directory found. Each tree's
    /// root is lazily materialized on first use, per §4.6.
    pub fn load(data_dir: impl Into<PathBuf>, config: TreeConfig) -> Result<Self> {
        let data_dir = data_dir.into();
        let mut trees = HashMap::new();
        let nodes_dir = data_dir.join("Nodes");
        if nodes_dir.is_dir() {
            for entry in std::fs::read_dir(&nodes_dir)? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    let account_id = entry.file_name().to_string_lossy().into_owned();
                    let tree = AccountTree::empty(&data_dir, account_id.clone(), config.degree);
                    trees.insert(account_id, tree);
                }
            }
        }
        Ok(Self {
            data_dir,
            config,
            trees,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn tree_for(&mut self, account_id: &str) -> &mut AccountTree {
        self.trees
            .entry(account_id.to_string())
            .or_insert_with(|| AccountTree::open(&self.data_dir, account_id, self.config.degree))
    }

    /// Existing tree, if the account has been touched or loaded. Does not
    /// create one — used by read-only ops so querying an unknown account
    /// yields an empty result instead of fabricating a tree for it.
    fn existing_tree(&mut self, account_id: &str) -> Option<&mut AccountTree> {
        self.trees.get_mut(account_id)
    }

    pub fn insert(&mut self, record: Record) -> Result<bool> {
        let account_id = record.key().account_id().to_string();
        self.tree_for(&account_id).insert(record)
    }

    pub fn update(&mut self, record: Record) -> Result<bool> {
        match self.existing_tree(record.key().account_id()) {
            Some(tree) => tree.update(record),
            None => Ok(false),
        }
    }

    pub fn delete(&mut self, key: &RecordKey) -> Result<bool> {
        match self.existing_tree(key.account_id()) {
            Some(tree) => tree.delete_key(key),
            None => Ok(false),
        }
    }

    pub fn delete_range(&mut self, start: &RecordKey, end: &RecordKey) -> Result<u64> {
        assert_eq!(
            start.account_id(),
            end.account_id(),
            "delete_range spans a single account"
        );
        match self.existing_tree(start.account_id()) {
            Some(tree) => tree.delete_range(start, end),
            None => Ok(0),
        }
    }

    pub fn list(&mut self, account_id: &str) -> Result<Vec<Record>> {
        match self.existing_tree(account_id) {
            Some(tree) => tree.list(),
            None => Ok(Vec::new()),
        }
    }

    pub fn list_range(&mut self, start: &RecordKey, end: &RecordKey) -> Result<Vec<Record>> {
        assert_eq!(
            start.account_id(),
            end.account_id(),
            "list_range spans a single account"
        );
        match self.existing_tree(start.account_id()) {
            Some(tree) => tree.list_range(start, end),
            None => Ok(Vec::new()),
        }
    }

    pub fn read(&mut self, key: &RecordKey) -> Result<Option<Record>> {
        match self.existing_tree(key.account_id()) {
            Some(tree) => tree.read(key),
            None => Ok(None),
        }
    }

    pub fn contains(&mut self, key: &RecordKey) -> Result<bool> {
        Ok(self.read(key)?.is_some())
    }

    pub fn record_count(&mut self, account_id: &str) -> Result<u64> {
        match self.existing_tree(account_id) {
            Some(tree) => tree.record_count(),
            None => Ok(0),
        }
    }

    pub fn balance_as_of(&mut self, account_id: &str, key: &RecordKey) -> Result<BigDecimal> {
        match self.existing_tree(account_id) {
            Some(tree) => tree.balance_as_of(key),
            None => Ok(BigDecimal::zero()),
        }
    }

    pub fn adjust_key(&mut self, key: &RecordKey) -> Result<RecordKey> {
        self.tree_for(key.account_id()).adjust_key(key.date(), key.sequence())
    }

    /// Fans `save` out to every live tree. Per §5, this is the point the
    /// façade would hold its system-wide exclusive lock over all accounts
    /// in a concurrent embedding; that locking is out of scope here and
    /// left to the embedder (`&mut self` already statically excludes
    /// concurrent callers within this process).
    pub fn save(&mut self) -> Result<()> {
        for tree in self.trees.values_mut() {
            tree.save()?;
        }
        Ok(())
    }
}
