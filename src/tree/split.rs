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

//! Split, discharged only at `save` (§4.5). Never invoked mid-descent.

use crate::error::{Error, Result};
use crate::node::Node;
use crate::node_ref::NodeRef;
use crate::store::ROOT_ID;

use super::AccountTree;

/// Index bounds `[start, end)` for each segment of an `n`-entry node split
/// at degree `degree`. `segments = ceil(n / degree)`; the base segment
/// size is `floor(n / segments)` and the last segment absorbs whatever
/// remains (so it may exceed `degree` under pathological rounding — the
/// next save pass splits it again; see `AccountTree::save`'s loop).
fn segment_bounds(n: usize, degree: usize) -> Vec<(usize, usize)> {
    let segments = (n + degree - 1) / degree;
    let base = n / segments;
    let mut bounds = Vec::with_capacity(segments);
    let mut start = 0;
    for i in 0..segments {
        let end = if i + 1 == segments { n } else { start + base };
        bounds.push((start, end));
        start = end;
    }
    bounds
}

impl AccountTree {
    /// Splits one overflowing node (leaf or internal) and links the
    /// resulting segments back into the tree.
    pub(super) fn split_node(&mut self, node: Node) -> Result<()> {
        let is_root = node.id() == ROOT_ID;
        let target = if is_root { None } else { Some(node.self_ref()?) };

        let (new_nodes, new_refs) = if node.is_leaf() {
            let records = node.records()?.to_vec();
            let bounds = segment_bounds(records.len(), self.degree);
            let ids = self.allocate_segment_ids(node.id(), bounds.len(), is_root);
            let mut nodes = Vec::with_capacity(bounds.len());
            let mut refs = Vec::with_capacity(bounds.len());
            for ((start, end), id) in bounds.into_iter().zip(ids) {
                let segment = Node::new_leaf(id, records[start..end].to_vec());
                refs.push(segment.self_ref()?);
                nodes.push(segment);
            }
            (nodes, refs)
        } else {
            let children = node.children()?.to_vec();
            let bounds = segment_bounds(children.len(), self.degree);
            let ids = self.allocate_segment_ids(node.id(), bounds.len(), is_root);
            let mut nodes = Vec::with_capacity(bounds.len());
            let mut refs = Vec::with_capacity(bounds.len());
            for ((start, end), id) in bounds.into_iter().zip(ids) {
                let segment = Node::new_internal(id, children[start..end].to_vec());
                refs.push(segment.self_ref()?);
                nodes.push(segment);
            }
            (nodes, refs)
        };

        self.install_split(is_root, target, new_nodes, new_refs)
    }

    /// If the split node is not root, the first segment reuses its id (so
    /// the parent's existing `NodeRef` can be overwritten in place by the
    /// many-replacement below); every other segment, and every segment of
    /// a split root, draws a fresh id.
    fn allocate_segment_ids(&mut self, original_id: u64, count: usize, is_root: bool) -> Vec<u64> {
        (0..count)
            .map(|i| {
                if !is_root && i == 0 {
                    original_id
                } else {
                    self.store.new_id(&mut self.id_rng)
                }
            })
            .collect()
    }

    fn install_split(
        &mut self,
        is_root: bool,
        target: Option<NodeRef>,
        new_nodes: Vec<Node>,
        new_refs: Vec<NodeRef>,
    ) -> Result<()> {
        for node in new_nodes {
            self.store.put(node);
        }

        if is_root {
            self.store.put(Node::new_internal(ROOT_ID, new_refs));
            return Ok(());
        }

        let target = target.ok_or_else(|| {
            Error::InvariantViolation("install_split: non-root split carried no target ref".into())
        })?;
        let parent_id = self.closest_child_parent(ROOT_ID, &target)?;
        let parent = self.fetch(parent_id)?;
        let new_parent = parent.with_replaced_child_by_many(target.child_id(), new_refs)?;
        self.store.put(new_parent);
        Ok(())
    }

    /// Re-descends from `id` looking for the parent of `target`: the
    /// child whose key range exactly matches or most closely contains
    /// `target`'s range. Because this tree's children never overlap,
    /// at most one child at each level can contain `target`'s range, so
    /// "closest" reduces to "the one containing child".
    fn closest_child_parent(&mut self, id: u64, target: &NodeRef) -> Result<u64> {
        let node = self.fetch(id)?;
        let children = node.children()?;
        if children.iter().any(|c| c.child_id() == target.child_id()) {
            return Ok(id);
        }
        let next = children
            .iter()
            .find(|c| c.first_key() <= target.first_key() && target.last_key() <= c.last_key())
            .ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "closest_child_parent: no child of node {id} contains the range of retired node {}",
                    target.child_id()
                ))
            })?
            .child_id();
        self.closest_child_parent(next, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_bounds_cover_every_index_exactly_once() {
        for n in [1usize, 3, 4, 5, 9, 10, 11, 100] {
            for degree in [1usize, 2, 3, 4, 7] {
                let bounds = segment_bounds(n, degree);
                let mut covered = 0;
                for (start, end) in &bounds {
                    assert_eq!(*start, covered);
                    assert!(end > start);
                    covered = *end;
                }
                assert_eq!(covered, n, "n={n} degree={degree}");
                assert!(bounds.len() >= 2 || n <= degree, "n={n} degree={degree}");
            }
        }
    }

    #[test]
    fn segment_bounds_terminate_the_save_loop() {
        // The last segment may exceed `degree` by rounding, but it must
        // never exceed the original length `n` — so repeated splitting
        // strictly shrinks every offending node until it fits.
        let bounds = segment_bounds(101, 4);
        for (start, end) in &bounds {
            assert!(end - start <= 101);
        }
        assert!(bounds.len() > 1);
    }
}
