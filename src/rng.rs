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

//! Injectable randomness for the neighbour coin flip on an internal-node
//! insert miss (§4.3). Kept behind a trait so tests can pin the outcome.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Supplies the single bit of randomness `AccountTree::select_child` needs
/// when an inserted key falls strictly between two children.
pub trait NeighbourRng {
    /// Returns `true` to prefer the left neighbour, `false` for the right.
    fn prefer_left(&mut self) -> bool;
}

/// The default RNG: a small, fast, non-cryptographic generator seeded from
/// entropy, matching the teacher's `test_utils` preference for
/// `rand`'s `small_rng` feature.
pub struct ThreadNeighbourRng(SmallRng);

impl Default for ThreadNeighbourRng {
    fn default() -> Self {
        Self(SmallRng::from_entropy())
    }
}

impl NeighbourRng for ThreadNeighbourRng {
    fn prefer_left(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }
}

/// A deterministic stand-in for tests: always returns the fixed answer it
/// was built with.
pub struct FixedNeighbourRng(pub bool);

impl NeighbourRng for FixedNeighbourRng {
    fn prefer_left(&mut self) -> bool {
        self.0
    }
}
