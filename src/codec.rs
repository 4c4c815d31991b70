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

//! Node (de)serialization, kept behind a trait so `NodeStore` never hard
//! codes a wire format. `JsonNodeCodec` is the one codec this crate ships.

use crate::error::Result;
use crate::node::Node;

/// Encodes and decodes a single `Node` to and from an opaque byte blob.
pub trait NodeCodec {
    /// File extension (without the leading dot) blobs are named with.
    fn extension(&self) -> &'static str;

    fn encode(&self, node: &Node) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<Node>;
}

/// The default codec: JSON via `serde_json`. `BigDecimal` and
/// `DateTime<Utc>` both serialize as strings under `serde`, so amounts and
/// dates round-trip exactly — never through binary floating point.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonNodeCodec;

impl NodeCodec for JsonNodeCodec {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn encode(&self, node: &Node) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(node)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Node> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::FromPrimitive;
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::key::RecordKey;
    use crate::record::Record;

    #[test]
    fn json_codec_round_trips_a_leaf() {
        let key = RecordKey::new("A", Utc.timestamp_opt(0, 0).unwrap(), 0);
        let record = Record::new(key, "rent", BigDecimal::from_f64(-1200.505).unwrap());
        let node = Node::new_leaf(0, vec![record]);

        let codec = JsonNodeCodec;
        let bytes = codec.encode(&node).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(decoded.id(), node.id());
        assert_eq!(decoded.amount(), node.amount());
        assert_eq!(decoded.records().unwrap(), node.records().unwrap());
    }
}
