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

//! An embeddable storage engine for append-mostly financial records keyed
//! by (account, date, sequence), partitioned into one B-tree per account.
//!
//! Every account tree supports point lookups, range scans, and — its
//! distinguishing feature — cumulative-balance queries up to any key in
//! `O(height)` via a cached per-node amount sum. Splits are deferred to
//! [`tree::AccountTree::save`]; nodes may transiently hold more than the
//! configured degree between saves.

pub mod codec;
pub mod error;
pub mod key;
mod ledger;
pub mod node;
pub mod node_ref;
pub mod record;
pub mod rng;
pub mod store;
pub mod tree;

pub use crate::error::{Error, Result};
pub use crate::key::RecordKey;
pub use crate::ledger::{Ledger, TreeConfig};
pub use crate::node::Node;
pub use crate::node_ref::NodeRef;
pub use crate::record::Record;
pub use crate::store::NodeStore;
pub use crate::tree::AccountTree;
