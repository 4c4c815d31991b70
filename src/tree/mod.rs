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

//! `AccountTree`: the B-tree algorithms over one account's `NodeStore` —
//! recursive, copy-on-write insert/update/delete, deferred split at save,
//! and the range/balance queries in `query.rs`.

mod query;
mod split;

use std::path::PathBuf;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::codec::{JsonNodeCodec, NodeCodec};
use crate::error::{Error, Result};
use crate::key::RecordKey;
use crate::node::Node;
use crate::node_ref::NodeRef;
use crate::record::Record;
use crate::rng::{NeighbourRng, ThreadNeighbourRng};
use crate::store::{NodeStore, ROOT_ID};

/// A single account's private B-tree. Owns its `NodeStore` exclusively.
pub struct AccountTree {
    account_id: String,
    degree: usize,
    store: NodeStore,
    /// Coin flip used only when an insert's key falls strictly between
    /// two children (§4.3 `select_child`).
    neighbour_rng: Box<dyn NeighbourRng + Send>,
    /// Draws fresh node ids at split time. Deliberately independent of
    /// `neighbour_rng` so pinning one for deterministic tests doesn't
    /// also pin the other.
    id_rng: SmallRng,
}

impl AccountTree {
    /// Opens (without loading) the tree for `account_id`, rooted at
    /// `<data_dir>/Nodes/<account_id>/`, using the default JSON codec and
    /// a non-deterministic neighbour coin flip.
    pub fn open(data_dir: impl Into<PathBuf>, account_id: impl Into<String>, degree: usize) -> Self {
        Self::open_with(
            data_dir,
            account_id,
            degree,
            Box::new(JsonNodeCodec),
            Box::new(ThreadNeighbourRng::default()),
        )
    }

    /// Like [`Self::open`] but with an injectable codec and neighbour RNG,
    /// so tests can pin both the wire format and the coin flip.
    pub fn open_with(
        data_dir: impl Into<PathBuf>,
        account_id: impl Into<String>,
        degree: usize,
        codec: Box<dyn NodeCodec + Send + Sync>,
        neighbour_rng: Box<dyn NeighbourRng + Send>,
    ) -> Self {
        let account_id = account_id.into();
        let dir = data_dir.into().join("Nodes").join(&account_id);
        Self {
            account_id,
            degree,
            store: NodeStore::new(dir, codec),
            neighbour_rng,
            id_rng: SmallRng::from_entropy(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn fetch(&mut self, id: u64) -> Result<Node> {
        self.store
            .get(id)?
            .cloned()
            .ok_or_else(|| Error::InvariantViolation(format!("expected live node {id}")))
    }

    fn root_exists(&mut self) -> Result<bool> {
        Ok(self.store.get(ROOT_ID)?.is_some())
    }

    /// `position` is `insert's` miss-insertion-point among `n` children, per
    /// `Node::find_child`'s bitwise-complement convention. Position 0 and
    /// position n have only one neighbour; anywhere in between, a coin
    /// flip picks left or right (§4.3, §9).
    fn select_child(&mut self, position: usize, n: usize) -> usize {
        if position == 0 {
            0
        } else if position == n {
            n - 1
        } else if self.neighbour_rng.prefer_left() {
            position - 1
        } else {
            position
        }
    }

    /// Summarizes `new_node` for installation into its parent. A leaf that
    /// became empty on delete keeps its previous key bounds (`old_ref`) —
    /// there is no record left to derive bounds from, and shrinking the
    /// bracket would make future inserts into that same range ambiguous.
    fn ref_for(old_ref: &NodeRef, new_node: &Node) -> Result<NodeRef> {
        if new_node.is_empty() {
            Ok(NodeRef::new(
                old_ref.first_key().clone(),
                old_ref.last_key().clone(),
                new_node.id(),
                new_node.amount().clone(),
            ))
        } else {
            new_node.self_ref()
        }
    }

    /// Inserts `record`. Returns `false` without changing the tree if its
    /// key already exists (idempotent duplicate).
    pub fn insert(&mut self, record: Record) -> Result<bool> {
        if !self.root_exists()? {
            self.store.put(Node::new_leaf(ROOT_ID, vec![record]));
            return Ok(true);
        }
        match self.insert_into(ROOT_ID, record)? {
            Some(new_root) => {
                self.store.put(new_root);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_into(&mut self, id: u64, record: Record) -> Result<Option<Node>> {
        let node = self.fetch(id)?;
        if node.is_leaf() {
            let idx = node.find_record(record.key())?;
            if idx >= 0 {
                return Ok(None);
            }
            let at = !idx as usize;
            return Ok(Some(node.with_inserted_record(at, record)?));
        }

        let idx = node.find_child(record.key())?;
        let child_index = if idx >= 0 {
            idx as usize
        } else {
            let position = !idx as usize;
            self.select_child(position, node.children()?.len())
        };
        let old_ref = node.children()?[child_index].clone();
        match self.insert_into(old_ref.child_id(), record)? {
            None => Ok(None),
            Some(new_child) => {
                let new_ref = Self::ref_for(&old_ref, &new_child)?;
                self.store.put(new_child);
                Ok(Some(node.with_replaced_child(child_index, new_ref)?))
            }
        }
    }

    /// Replaces the record at `record.key()`. Returns `false` if the key
    /// is not present.
    pub fn update(&mut self, record: Record) -> Result<bool> {
        if !self.root_exists()? {
            return Ok(false);
        }
        match self.update_into(ROOT_ID, record)? {
            Some(new_root) => {
                self.store.put(new_root);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_into(&mut self, id: u64, record: Record) -> Result<Option<Node>> {
        let node = self.fetch(id)?;
        if node.is_leaf() {
            let idx = node.find_record(record.key())?;
            if idx < 0 {
                return Ok(None);
            }
            return Ok(Some(node.with_replaced_record(idx as usize, record)?));
        }

        // A miss here means the key cannot exist anywhere under this
        // subtree — no neighbour selection, unlike insert.
        let idx = node.find_child(record.key())?;
        if idx < 0 {
            return Ok(None);
        }
        let child_index = idx as usize;
        let old_ref = node.children()?[child_index].clone();
        match self.update_into(old_ref.child_id(), record)? {
            None => Ok(None),
            Some(new_child) => {
                let new_ref = Self::ref_for(&old_ref, &new_child)?;
                self.store.put(new_child);
                Ok(Some(node.with_replaced_child(child_index, new_ref)?))
            }
        }
    }

    /// Deletes the record at `key`. Returns `false` if absent. No
    /// rebalancing or merging occurs — a leaf may become empty.
    pub fn delete_key(&mut self, key: &RecordKey) -> Result<bool> {
        if !self.root_exists()? {
            return Ok(false);
        }
        match self.delete_into(ROOT_ID, key)? {
            Some(new_root) => {
                self.store.put(new_root);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deletes by full record identity (only the key is significant).
    pub fn delete_record(&mut self, record: &Record) -> Result<bool> {
        self.delete_key(record.key())
    }

    fn delete_into(&mut self, id: u64, key: &RecordKey) -> Result<Option<Node>> {
        let node = self.fetch(id)?;
        if node.is_leaf() {
            let idx = node.find_record(key)?;
            if idx < 0 {
                return Ok(None);
            }
            return Ok(Some(node.with_deleted_record(idx as usize)?));
        }

        let idx = node.find_child(key)?;
        if idx < 0 {
            return Ok(None);
        }
        let child_index = idx as usize;
        let old_ref = node.children()?[child_index].clone();
        match self.delete_into(old_ref.child_id(), key)? {
            None => Ok(None),
            Some(new_child) => {
                let new_ref = Self::ref_for(&old_ref, &new_child)?;
                self.store.put(new_child);
                Ok(Some(node.with_replaced_child(child_index, new_ref)?))
            }
        }
    }

    pub fn contains(&mut self, key: &RecordKey) -> Result<bool> {
        Ok(self.read(key)?.is_some())
    }

    pub fn read(&mut self, key: &RecordKey) -> Result<Option<Record>> {
        if !self.root_exists()? {
            return Ok(None);
        }
        self.read_at(ROOT_ID, key)
    }

    fn read_at(&mut self, id: u64, key: &RecordKey) -> Result<Option<Record>> {
        let node = self.fetch(id)?;
        if node.is_leaf() {
            let idx = node.find_record(key)?;
            return Ok(if idx < 0 {
                None
            } else {
                Some(node.records()?[idx as usize].clone())
            });
        }
        let idx = node.find_child(key)?;
        if idx < 0 {
            return Ok(None);
        }
        let child_id = node.children()?[idx as usize].child_id();
        self.read_at(child_id, key)
    }

    /// Number of cached nodes, for diagnostics and the post-save size
    /// invariant (§8).
    pub fn cache_len(&self) -> u64 {
        self.store.cache_len()
    }

    /// Entry count of every currently cached node — a diagnostic used to
    /// verify the post-save size bound (§8 "no node has more than D
    /// entries after Save returns").
    pub fn node_lens(&self) -> Vec<usize> {
        self.store.list().map(|n| n.len()).collect()
    }

    /// Discharges overflow (§4.5) by repeatedly splitting overflowing
    /// nodes until none remain, then flushes the cache to disk.
    pub fn save(&mut self) -> Result<()> {
        loop {
            let overflowing: Vec<Node> = self
                .store
                .list()
                .filter(|n| n.len() > self.degree)
                .cloned()
                .collect();
            if overflowing.is_empty() {
                break;
            }
            for node in overflowing {
                // An earlier split in this same pass may already have
                // replaced `node`'s id with something smaller; re-check
                // the live state before splitting a stale copy.
                if let Some(current) = self.store.get(node.id())?.cloned() {
                    if current.len() > self.degree {
                        self.split_node(current)?;
                    }
                }
            }
        }
        self.store.save()
    }

    /// Enumerates the account directory under `data_dir` and returns an
    /// empty (not-yet-loaded) tree — used by the façade's `load` to
    /// register accounts without eagerly reading every node.
    pub fn empty(data_dir: impl Into<PathBuf>, account_id: impl Into<String>, degree: usize) -> Self {
        Self::open(data_dir, account_id, degree)
    }
}
