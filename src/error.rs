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

//! Error kinds surfaced by the tree core.
//!
//! `DuplicateKey` and plain not-found outcomes on `insert`/`update`/`delete`
//! are intentionally *not* variants here: the spec routes those as ordinary
//! `bool`/`Option` returns. Only the genuinely exceptional kinds live in
//! this enum.

use std::io;

/// Errors surfaced by [`crate::node`], [`crate::store`], [`crate::tree`] and
/// [`crate::ledger`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A key lookup that required presence found nothing.
    #[error("not found")]
    NotFound,

    /// `adjust_key` could not find a free sequence number for the day.
    #[error("sequence space for the day is saturated")]
    Saturated,

    /// A tree invariant was violated: leaf op on an internal node (or vice
    /// versa), a corrupted on-disk blob, or a parent locator that failed to
    /// find a known-live child. Fatal — callers should not attempt to
    /// recover from this, only report it.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// I/O fault while reading or writing a node blob.
    #[error("storage fault: {0}")]
    StorageFault(#[from] io::Error),

    /// A node blob failed to decode, or a node failed to encode.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
