//! The fixed call-surface contract: artifact names, status codes, and the
//! count-prefixed word layout of path collections.
//!
//! A path is `point_count, x0, y0, x1, y1, ...`; a collection is
//! `path_count` followed by each path. The layout is part of the ABI and
//! must not change shape.

use crate::engine::math::Vertex;

pub use crate::engine::tree::{NODE_FLAG_HOLE, NODE_FLAG_OPEN};

pub const ARTIFACT_WASM: &str = "clipper.wasm";
pub const ARTIFACT_ASMJS: &str = "clipper.asm.js";
pub const KNOWN_ARTIFACTS: [&str; 2] = [ARTIFACT_WASM, ARTIFACT_ASMJS];

pub const STATUS_OK: i32 = 0;
/// Input buffer malformed (bad counts, truncated coordinates).
pub const STATUS_INVALID_BUFFER: i32 = 1;
/// Operation could not produce a result.
pub const STATUS_EXEC_FAILED: i32 = 2;
/// Unknown enum code passed for clip type, fill rule, join or end style.
pub const STATUS_UNKNOWN_CODE: i32 = 3;
/// The runtime was started without the keep-alive directive and has exited.
pub const STATUS_RUNTIME_EXITED: i32 = 4;

pub fn encode_paths(paths: &[Vec<Vertex>]) -> Vec<i64> {
    let total: usize = paths.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(1 + paths.len() + total * 2);
    out.push(paths.len() as i64);
    for path in paths {
        out.push(path.len() as i64);
        for v in path {
            out.push(v.x);
            out.push(v.y);
        }
    }
    out
}

pub fn decode_paths(words: &[i64]) -> Option<Vec<Vec<Vertex>>> {
    let mut iter = words.iter().copied();
    let count = usize::try_from(iter.next()?).ok()?;
    // Count words come from the caller's buffer; cap the reservation by what
    // the buffer could actually hold so a garbage count cannot force a huge
    // allocation before the decode loop rejects it.
    let mut paths = Vec::with_capacity(count.min(words.len()));
    for _ in 0..count {
        let len = usize::try_from(iter.next()?).ok()?;
        let mut path = Vec::with_capacity(len.min(words.len() / 2));
        for _ in 0..len {
            let x = iter.next()?;
            let y = iter.next()?;
            path.push(Vertex::new(x, y));
        }
        paths.push(path);
    }
    Some(paths)
}

/// Decodes a collection and reports how many words it consumed, for buffers
/// that embed collections inside a larger job layout.
pub fn decode_paths_at(words: &[i64], at: usize) -> Option<(Vec<Vec<Vertex>>, usize)> {
    let mut pos = at;
    let count = usize::try_from(*words.get(pos)?).ok()?;
    pos += 1;
    let mut paths = Vec::with_capacity(count.min(words.len()));
    for _ in 0..count {
        let len = usize::try_from(*words.get(pos)?).ok()?;
        pos += 1;
        let end = pos.checked_add(len.checked_mul(2)?)?;
        if end > words.len() {
            return None;
        }
        let path = words[pos..end]
            .chunks_exact(2)
            .map(|c| Vertex::new(c[0], c[1]))
            .collect();
        pos = end;
        paths.push(path);
    }
    Some((paths, pos - at))
}
