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

//! Per-account node cache plus its persistent backend: lazy reads,
//! batched writes, id generation. Id 0 is reserved for the root.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use rand::Rng;

use crate::codec::NodeCodec;
use crate::error::Result;
use crate::node::Node;

/// The node id reserved for the root of every account tree.
pub const ROOT_ID: u64 = 0;

/// A lazily-populated node cache backed by one blob file per node under
/// `<root>/Nodes/<account_id>/`.
pub struct NodeStore {
    dir: PathBuf,
    codec: Box<dyn NodeCodec + Send + Sync>,
    cache: HashMap<u64, Node>,
}

impl NodeStore {
    pub fn new(dir: PathBuf, codec: Box<dyn NodeCodec + Send + Sync>) -> Self {
        Self {
            dir,
            codec,
            cache: HashMap::new(),
        }
    }

    fn blob_path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{id}.{}", self.codec.extension()))
    }

    /// Returns the cached node, materializing it from disk on a cache miss.
    /// `None` if `id` is unknown in both the cache and the backing store.
    pub fn get(&mut self, id: u64) -> Result<Option<&Node>> {
        if !self.cache.contains_key(&id) {
            let path = self.blob_path(id);
            if path.exists() {
                let bytes = fs::read(&path)?;
                let node = self.codec.decode(&bytes)?;
                self.cache.insert(id, node);
            } else {
                return Ok(None);
            }
        }
        Ok(self.cache.get(&id))
    }

    /// Inserts or replaces the cache entry for `node.id()`. Does not touch
    /// the backing store — that happens only at `save`.
    pub fn put(&mut self, node: Node) {
        self.cache.insert(node.id(), node);
    }

    /// Evicts `id` from the cache and removes its backing blob, if any.
    /// Used only by split, when an id is retired.
    pub fn delete(&mut self, id: u64) -> Result<()> {
        self.cache.remove(&id);
        let path = self.blob_path(id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Every currently cached node. Iteration order is unspecified but
    /// stable within one traversal.
    pub fn list(&self) -> impl Iterator<Item = &Node> {
        self.cache.values()
    }

    pub fn cache_len(&self) -> u64 {
        self.cache.len() as u64
    }

    /// Serializes every cached node to its backing blob, creating the
    /// account directory if needed. Overwrites existing blobs so on-disk
    /// state matches the cache on return.
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        for node in self.cache.values() {
            let bytes = self.codec.encode(node)?;
            fs::write(self.blob_path(node.id()), bytes)?;
        }
        Ok(())
    }

    /// Returns an id not currently present in the cache, drawn from a
    /// uniform 63-bit space (id 0 is reserved for the root and never
    /// returned here).
    pub fn new_id(&self, rng: &mut impl Rng) -> u64 {
        loop {
            let candidate: u64 = rng.gen_range(1..=(u64::MAX >> 1));
            if !self.cache.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::{BigDecimal, FromPrimitive};
    use chrono::{TimeZone, Utc};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    use super::*;
    use crate::codec::JsonNodeCodec;
    use crate::key::RecordKey;
    use crate::record::Record;

    fn leaf(id: u64) -> Node {
        let key = RecordKey::new("A", Utc.timestamp_opt(0, 0).unwrap(), 0);
        Node::new_leaf(id, vec![Record::new(key, "d", BigDecimal::from_f64(1.0).unwrap())])
    }

    #[test]
    fn put_then_get_round_trips_without_touching_disk() {
        let dir = tempdir().unwrap();
        let mut store = NodeStore::new(dir.path().to_path_buf(), Box::new(JsonNodeCodec));
        store.put(leaf(0));
        assert_eq!(store.cache_len(), 1);
        let got = store.get(0).unwrap().unwrap();
        assert_eq!(got.id(), 0);
        assert!(!dir.path().join("0.json").exists());
    }

    #[test]
    fn save_then_fresh_store_loads_lazily() {
        let dir = tempdir().unwrap();
        {
            let mut store = NodeStore::new(dir.path().to_path_buf(), Box::new(JsonNodeCodec));
            store.put(leaf(0));
            store.save().unwrap();
        }
        let mut reloaded = NodeStore::new(dir.path().to_path_buf(), Box::new(JsonNodeCodec));
        assert_eq!(reloaded.cache_len(), 0);
        let got = reloaded.get(0).unwrap().unwrap();
        assert_eq!(got.id(), 0);
        assert_eq!(reloaded.cache_len(), 1);
    }

    #[test]
    fn get_on_unknown_id_is_none() {
        let dir = tempdir().unwrap();
        let mut store = NodeStore::new(dir.path().to_path_buf(), Box::new(JsonNodeCodec));
        assert!(store.get(42).unwrap().is_none());
    }

    #[test]
    fn new_id_avoids_cache_collisions() {
        let dir = tempdir().unwrap();
        let mut store = NodeStore::new(dir.path().to_path_buf(), Box::new(JsonNodeCodec));
        let mut rng = SmallRng::seed_from_u64(1);
        let id = store.new_id(&mut rng);
        store.put(leaf(id));
        let next = store.new_id(&mut rng);
        assert_ne!(id, next);
    }

    #[test]
    fn delete_removes_cache_entry_and_blob() {
        let dir = tempdir().unwrap();
        let mut store = NodeStore::new(dir.path().to_path_buf(), Box::new(JsonNodeCodec));
        store.put(leaf(7));
        store.save().unwrap();
        assert!(dir.path().join("7.json").exists());
        store.delete(7).unwrap();
        assert!(!dir.path().join("7.json").exists());
        assert_eq!(store.cache_len(), 0);
    }
}
