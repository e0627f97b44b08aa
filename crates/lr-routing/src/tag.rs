//! Path tags: compact, stateless route identifiers.
//!
//! # Encoding
//!
//! A path `n0, n1, …, nk` becomes:
//!
//! 1. one decimal digit per step, the 1-based position of `n(i+1)` in the
//!    ascending neighbour list of `n(i)`, concatenated into an integer `D`
//!    (`D = 0` for a single-node path);
//! 2. `value = D · M + n0` with `M = largest_node_id + 1`;
//! 3. the big-endian bytes of `value`, base64-encoded over the alphabet
//!    `A–Z a–z 0–9 * -` without padding.
//!
//! Decoding reverses the steps, so a tag is only meaningful against the
//! graph it was produced from.  A step whose neighbour position needs two
//! digits cannot be represented and is rejected at encode time.

use base64::Engine;
use base64::alphabet::Alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use num_bigint::BigUint;

use lr_core::NodeId;
use lr_graph::RoadGraph;

use crate::{TagError, TagResult};

const TAG_ALPHABET: Alphabet =
    match Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789*-") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("tag alphabet must be 64 distinct printable symbols"),
    };

const TAG_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &TAG_ALPHABET,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Modulus separating the start node from the digit string.
fn modulus(graph: &RoadGraph) -> Option<u64> {
    graph.largest_node_id().map(|n| n.0 as u64 + 1)
}

pub fn encode_tag(graph: &RoadGraph, path: &[NodeId]) -> TagResult<String> {
    let (&first, _) = path.split_first().ok_or(TagError::EmptyPath)?;
    let m = modulus(graph)
        .filter(|_| graph.contains(first))
        .ok_or(TagError::UnknownNode(first.0 as u64))?;

    let mut digits = BigUint::default();
    for w in path.windows(2) {
        let (from, to) = (w[0], w[1]);
        if !graph.contains(from) {
            return Err(TagError::UnknownNode(from.0 as u64));
        }
        let position = graph
            .connections(from)
            .binary_search(&to)
            .map_err(|_| TagError::NotAdjacent { from, to })?;
        let digit = position + 1;
        if digit > 9 {
            return Err(TagError::TooManyConnections { node: from, index: digit });
        }
        digits = digits * 10u32 + digit as u32;
    }

    let value = digits * BigUint::from(m) + BigUint::from(first.0);
    Ok(TAG_ENGINE.encode(value.to_bytes_be()))
}

pub fn decode_tag(graph: &RoadGraph, tag: &str) -> TagResult<Vec<NodeId>> {
    let bytes = TAG_ENGINE.decode(tag.trim()).map_err(|_| TagError::Corrupt)?;
    // Encoding never emits padding zeros; only the value 0 is a lone zero byte.
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == 0) {
        return Err(TagError::Corrupt);
    }
    let value = BigUint::from_bytes_be(&bytes);

    let m = BigUint::from(modulus(graph).ok_or(TagError::UnknownNode(0))?);
    let first = u32::try_from(&(&value % &m)).map_err(|_| TagError::Corrupt)?;
    let digits = &value / &m;

    let mut cur = NodeId(first);
    let mut path = vec![cur];
    if digits.bits() == 0 {
        return Ok(path);
    }
    for ch in digits.to_string().bytes() {
        let index = (ch - b'0') as u32;
        let conns = graph.connections(cur);
        if index == 0 || index as usize > conns.len() {
            return Err(TagError::ConnectionOutOfRange { node: cur, index });
        }
        cur = conns[index as usize - 1];
        path.push(cur);
    }
    Ok(path)
}
