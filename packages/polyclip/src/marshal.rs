//! Crossing the kernel boundary: flat-buffer serialization, scratch-block
//! lifetime, and status translation.
//!
//! Every call follows the same shape: encode inputs into words, stage them
//! in the module's memory through a [`NativeScratch`] guard, invoke the
//! export, then claim the output block. The guard frees every staged block
//! when it drops, so input memory is released on success and on every
//! error path alike; the output block is freed as soon as its words are
//! copied out.

use polyclip_kernel::abi::{NODE_FLAG_HOLE, NODE_FLAG_OPEN};
use polyclip_kernel::{abi, CallOutcome, NativeModule, WordPtr, NULL};

use crate::enums::{ClipType, EndType, JoinType, PolyFillType};
use crate::errors::{ClipperError, Result};
use crate::geometry::{IntPoint, Path, Paths, PolyTree};

/// Serializes a collection into the kernel's word layout, rejecting
/// coordinates the kernel's arithmetic cannot represent exactly.
pub(crate) fn to_words(paths: &[Path]) -> Result<Vec<i64>> {
    let total: usize = paths.iter().map(Vec::len).sum();
    let mut words = Vec::with_capacity(1 + paths.len() + total * 2);
    words.push(paths.len() as i64);
    for path in paths {
        words.push(path.len() as i64);
        for p in path {
            if !p.in_range() {
                return Err(ClipperError::UsagePrecondition(
                    "coordinate magnitude exceeds the supported range",
                ));
            }
            words.push(p.x);
            words.push(p.y);
        }
    }
    Ok(words)
}

pub(crate) fn paths_from_words(words: &[i64]) -> Result<Paths> {
    let decoded = abi::decode_paths(words)
        .ok_or_else(|| ClipperError::Internal("malformed paths buffer from kernel".to_string()))?;
    Ok(decoded
        .into_iter()
        .map(|path| path.into_iter().map(|v| IntPoint::new(v.x, v.y)).collect())
        .collect())
}

/// Staged input blocks for one call. Dropping the guard releases them all.
struct NativeScratch<'m> {
    module: &'m NativeModule,
    ptrs: Vec<WordPtr>,
}

impl<'m> NativeScratch<'m> {
    fn new(module: &'m NativeModule) -> Self {
        Self {
            module,
            ptrs: Vec::new(),
        }
    }

    fn stage(&mut self, words: &[i64]) -> WordPtr {
        let ptr = self.module.malloc(words.len());
        self.module.write(ptr, words);
        self.ptrs.push(ptr);
        ptr
    }

    fn stage_paths(&mut self, paths: &[Path]) -> Result<WordPtr> {
        if paths.is_empty() {
            return Ok(NULL);
        }
        Ok(self.stage(&to_words(paths)?))
    }
}

impl Drop for NativeScratch<'_> {
    fn drop(&mut self) {
        for &ptr in &self.ptrs {
            if !self.module.free(ptr) {
                log::error!("scratch block {ptr} was already gone");
            }
        }
    }
}

/// Translates one call outcome, claiming and freeing the output block.
fn claim_output(module: &NativeModule, op: &'static str, outcome: CallOutcome) -> Result<Vec<i64>> {
    if outcome.status != abi::STATUS_OK {
        return Err(ClipperError::Kernel {
            op,
            status: outcome.status,
        });
    }
    let words = module.read(outcome.ptr);
    module.free(outcome.ptr);
    words.ok_or_else(|| ClipperError::Internal(format!("{op} returned an unreadable block")))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn call_clip(
    module: &NativeModule,
    subject: &[Path],
    subject_open: &[Path],
    clip: &[Path],
    clip_type: ClipType,
    subject_fill: PolyFillType,
    clip_fill: PolyFillType,
    as_tree: bool,
) -> Result<Vec<i64>> {
    let mut scratch = NativeScratch::new(module);
    let subject_ptr = scratch.stage_paths(subject)?;
    let open_ptr = scratch.stage_paths(subject_open)?;
    let clip_ptr = scratch.stage_paths(clip)?;
    let outcome = module.clip(
        subject_ptr,
        open_ptr,
        clip_ptr,
        clip_type as u8,
        subject_fill as u8,
        clip_fill as u8,
        as_tree,
    );
    claim_output(module, "clip", outcome)
}

pub(crate) fn call_offset(
    module: &NativeModule,
    groups: &[(JoinType, EndType, &Paths)],
    delta: f64,
    miter_limit: f64,
    arc_tolerance: f64,
    as_tree: bool,
) -> Result<Vec<i64>> {
    let mut job = vec![groups.len() as i64];
    for (join, end, paths) in groups {
        job.push(*join as i64);
        job.push(*end as i64);
        job.extend(to_words(paths)?);
    }
    let mut scratch = NativeScratch::new(module);
    let job_ptr = scratch.stage(&job);
    let outcome = module.offset(job_ptr, delta, miter_limit, arc_tolerance, as_tree);
    claim_output(module, "offset", outcome)
}

pub(crate) fn call_clean(module: &NativeModule, paths: &[Path], distance: f64) -> Result<Paths> {
    let mut scratch = NativeScratch::new(module);
    let ptr = scratch.stage_paths(paths)?;
    let outcome = module.clean(ptr, distance);
    paths_from_words(&claim_output(module, "clean", outcome)?)
}

pub(crate) fn call_minkowski(
    module: &NativeModule,
    pattern: &Path,
    paths: &[Path],
    is_sum: bool,
    path_closed: bool,
) -> Result<Paths> {
    let mut scratch = NativeScratch::new(module);
    let pattern_ptr = scratch.stage(&to_words(std::slice::from_ref(pattern))?);
    let paths_ptr = scratch.stage_paths(paths)?;
    let outcome = module.minkowski(pattern_ptr, paths_ptr, is_sum, path_closed);
    paths_from_words(&claim_output(module, "minkowski", outcome)?)
}

/// Rebuilds a [`PolyTree`] from the kernel's flag-prefixed node stream in
/// one pass, tracking pending children on an explicit stack.
pub(crate) fn poly_tree_from_words(words: &[i64]) -> Result<PolyTree> {
    let mut cursor = WordCursor { words, pos: 0 };
    let top_count = cursor.take_count()?;
    let mut tree = PolyTree::new();
    let mut stack: Vec<(usize, usize)> = vec![(0, top_count)];
    while let Some(frame) = stack.last_mut() {
        if frame.1 == 0 {
            stack.pop();
            continue;
        }
        frame.1 -= 1;
        let parent = frame.0;
        let flags = cursor.take()?;
        let point_count = cursor.take_count()?;
        let mut contour = Path::with_capacity(point_count.min(cursor.words.len() / 2));
        for _ in 0..point_count {
            let x = cursor.take()?;
            let y = cursor.take()?;
            contour.push(IntPoint::new(x, y));
        }
        let child_count = cursor.take_count()?;
        let node = tree.add_node(
            parent,
            contour,
            flags & NODE_FLAG_OPEN != 0,
            flags & NODE_FLAG_HOLE != 0,
        );
        stack.push((node, child_count));
    }
    if cursor.pos != words.len() {
        return Err(ClipperError::Internal(
            "trailing words after tree stream".to_string(),
        ));
    }
    Ok(tree)
}

struct WordCursor<'a> {
    words: &'a [i64],
    pos: usize,
}

impl WordCursor<'_> {
    fn take(&mut self) -> Result<i64> {
        let word = self
            .words
            .get(self.pos)
            .copied()
            .ok_or_else(|| ClipperError::Internal("truncated tree stream".to_string()))?;
        self.pos += 1;
        Ok(word)
    }

    fn take_count(&mut self) -> Result<usize> {
        usize::try_from(self.take()?)
            .map_err(|_| ClipperError::Internal("negative count in tree stream".to_string()))
    }
}
