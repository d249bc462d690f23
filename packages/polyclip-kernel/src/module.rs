//! An instantiated kernel: a linear memory plus the exported entry points.
//!
//! Instantiation mirrors the lifecycle of an embedded runtime. The artifact
//! name is resolved through an optional `locate_file` override and checked
//! against the known artifacts, `pre_run` fires once the memory is ready,
//! and `on_quit` fires with an exit code when the runtime goes down. With
//! `no_exit_runtime` unset the runtime tears down as soon as startup
//! completes and every later call reports [`STATUS_RUNTIME_EXITED`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::abi::{
    self, decode_paths_at, encode_paths, KNOWN_ARTIFACTS, STATUS_EXEC_FAILED,
    STATUS_INVALID_BUFFER, STATUS_OK, STATUS_RUNTIME_EXITED, STATUS_UNKNOWN_CODE,
};
use crate::engine::boolean::{self, ClipJob, ClipOp};
use crate::engine::math::{FillRule, Vertex};
use crate::engine::offset::{self, EndStyle, JoinStyle, OffsetGroup};
use crate::engine::tree::{encode_forest, nest};
use crate::engine::{clean, minkowski};
use crate::memory::{Memory, WordPtr, NULL};

pub type LocateFile = Box<dyn Fn(&str) -> String + Send + Sync>;
pub type RunHook = Box<dyn Fn() + Send + Sync>;
pub type QuitHook = Box<dyn Fn(i32) + Send + Sync>;

/// Startup knobs, consumed by [`NativeModule::instantiate`].
pub struct ModuleOverrides {
    /// Rewrites the artifact name before it is validated, the way an
    /// embedder redirects runtime files to its own asset directory.
    pub locate_file: Option<LocateFile>,
    /// Keep the runtime alive after startup. Almost always wanted.
    pub no_exit_runtime: bool,
    pub pre_run: Option<RunHook>,
    pub on_quit: Option<QuitHook>,
}

impl Default for ModuleOverrides {
    fn default() -> Self {
        Self {
            locate_file: None,
            no_exit_runtime: true,
            pre_run: None,
            on_quit: None,
        }
    }
}

/// Result of one exported call. `ptr` addresses the output block in the
/// module's memory when `status` is [`STATUS_OK`]; the caller owns that
/// block and must free it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    pub status: i32,
    pub ptr: WordPtr,
    pub len: u32,
}

impl CallOutcome {
    fn fail(status: i32) -> Self {
        Self {
            status,
            ptr: NULL,
            len: 0,
        }
    }
}

#[derive(Debug)]
pub struct NativeModule {
    artifact: String,
    exited: AtomicBool,
    memory: Mutex<Memory>,
}

impl NativeModule {
    pub fn instantiate(artifact: &str, overrides: ModuleOverrides) -> Result<Self, String> {
        let resolved = match &overrides.locate_file {
            Some(locate) => locate(artifact),
            None => artifact.to_string(),
        };
        if !KNOWN_ARTIFACTS.iter().any(|known| resolved.ends_with(known)) {
            if let Some(on_quit) = &overrides.on_quit {
                on_quit(1);
            }
            return Err(format!("unrecognized kernel artifact: {resolved}"));
        }
        log::debug!("instantiating kernel from {resolved}");
        let module = Self {
            artifact: resolved,
            exited: AtomicBool::new(false),
            memory: Mutex::new(Memory::new()),
        };
        if let Some(pre_run) = &overrides.pre_run {
            pre_run();
        }
        if !overrides.no_exit_runtime {
            // Startup ran to completion and nothing pinned the runtime.
            module.exited.store(true, Ordering::Release);
            if let Some(on_quit) = &overrides.on_quit {
                on_quit(0);
            }
        }
        Ok(module)
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    fn mem(&self) -> std::sync::MutexGuard<'_, Memory> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn malloc(&self, words: usize) -> WordPtr {
        self.mem().alloc(words)
    }

    pub fn write(&self, ptr: WordPtr, words: &[i64]) -> bool {
        self.mem().write(ptr, words)
    }

    pub fn read(&self, ptr: WordPtr) -> Option<Vec<i64>> {
        self.mem().read(ptr).map(<[i64]>::to_vec)
    }

    pub fn free(&self, ptr: WordPtr) -> bool {
        self.mem().free(ptr)
    }

    /// Blocks still allocated. Zero after a disciplined caller is done.
    pub fn live_blocks(&self) -> usize {
        self.mem().live_blocks()
    }

    fn runtime_gone(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    /// Decodes a path collection at `ptr`; `NULL` reads as empty.
    fn collection(&self, ptr: WordPtr) -> Result<Vec<Vec<Vertex>>, i32> {
        if ptr == NULL {
            return Ok(Vec::new());
        }
        let mem = self.mem();
        let words = mem.read(ptr).ok_or(STATUS_INVALID_BUFFER)?;
        abi::decode_paths(words).ok_or(STATUS_INVALID_BUFFER)
    }

    fn deliver(&self, words: Vec<i64>) -> CallOutcome {
        let len = words.len() as u32;
        let ptr = self.mem().alloc_from(&words);
        if ptr == NULL {
            return CallOutcome::fail(STATUS_EXEC_FAILED);
        }
        CallOutcome {
            status: STATUS_OK,
            ptr,
            len,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn clip(
        &self,
        subject: WordPtr,
        subject_open: WordPtr,
        clip: WordPtr,
        op_code: u8,
        subject_fill_code: u8,
        clip_fill_code: u8,
        as_tree: bool,
    ) -> CallOutcome {
        if self.runtime_gone() {
            return CallOutcome::fail(STATUS_RUNTIME_EXITED);
        }
        let (Some(op), Some(subject_fill), Some(clip_fill)) = (
            ClipOp::from_code(op_code),
            FillRule::from_code(subject_fill_code),
            FillRule::from_code(clip_fill_code),
        ) else {
            return CallOutcome::fail(STATUS_UNKNOWN_CODE);
        };
        let subject = match self.collection(subject) {
            Ok(paths) => paths,
            Err(status) => return CallOutcome::fail(status),
        };
        let subject_open = match self.collection(subject_open) {
            Ok(paths) => paths,
            Err(status) => return CallOutcome::fail(status),
        };
        let clip = match self.collection(clip) {
            Ok(paths) => paths,
            Err(status) => return CallOutcome::fail(status),
        };
        let solution = boolean::execute(&ClipJob {
            subject: &subject,
            subject_open: &subject_open,
            clip: &clip,
            op,
            subject_fill,
            clip_fill,
        });
        let words = if as_tree {
            encode_forest(&nest(solution.closed, solution.open))
        } else {
            encode_paths(&solution.closed)
        };
        self.deliver(words)
    }

    /// `job` points at `[group_count, {join, end, paths...}...]`.
    pub fn offset(
        &self,
        job: WordPtr,
        delta: f64,
        miter_limit: f64,
        arc_tolerance: f64,
        as_tree: bool,
    ) -> CallOutcome {
        if self.runtime_gone() {
            return CallOutcome::fail(STATUS_RUNTIME_EXITED);
        }
        if !(delta.is_finite() && miter_limit.is_finite() && arc_tolerance.is_finite()) {
            return CallOutcome::fail(STATUS_EXEC_FAILED);
        }
        let groups = {
            let mem = self.mem();
            let Some(words) = mem.read(job) else {
                return CallOutcome::fail(STATUS_INVALID_BUFFER);
            };
            match decode_offset_job(words) {
                Ok(groups) => groups,
                Err(status) => return CallOutcome::fail(status),
            }
        };
        let rings = offset::execute(&groups, delta, miter_limit, arc_tolerance);
        let words = if as_tree {
            encode_forest(&nest(rings, Vec::new()))
        } else {
            encode_paths(&rings)
        };
        self.deliver(words)
    }

    pub fn clean(&self, paths: WordPtr, distance: f64) -> CallOutcome {
        if self.runtime_gone() {
            return CallOutcome::fail(STATUS_RUNTIME_EXITED);
        }
        if !distance.is_finite() {
            return CallOutcome::fail(STATUS_EXEC_FAILED);
        }
        let paths = match self.collection(paths) {
            Ok(paths) => paths,
            Err(status) => return CallOutcome::fail(status),
        };
        self.deliver(encode_paths(&clean::clean_paths(&paths, distance)))
    }

    /// Minkowski sum of `pattern` with every path in `paths`, or the
    /// difference of the first paths of each buffer when `is_sum` is false.
    pub fn minkowski(
        &self,
        pattern: WordPtr,
        paths: WordPtr,
        is_sum: bool,
        path_closed: bool,
    ) -> CallOutcome {
        if self.runtime_gone() {
            return CallOutcome::fail(STATUS_RUNTIME_EXITED);
        }
        let pattern = match self.collection(pattern) {
            Ok(paths) => paths,
            Err(status) => return CallOutcome::fail(status),
        };
        let paths = match self.collection(paths) {
            Ok(paths) => paths,
            Err(status) => return CallOutcome::fail(status),
        };
        let Some(first) = pattern.first() else {
            return CallOutcome::fail(STATUS_INVALID_BUFFER);
        };
        let merged = if is_sum {
            minkowski::sum(first, &paths, path_closed)
        } else {
            let Some(other) = paths.first() else {
                return CallOutcome::fail(STATUS_INVALID_BUFFER);
            };
            minkowski::diff(first, other)
        };
        self.deliver(encode_paths(&merged))
    }
}

fn decode_offset_job(words: &[i64]) -> Result<Vec<OffsetGroup>, i32> {
    let mut pos = 0;
    let count = usize::try_from(*words.get(pos).ok_or(STATUS_INVALID_BUFFER)?)
        .map_err(|_| STATUS_INVALID_BUFFER)?;
    pos += 1;
    let mut groups = Vec::with_capacity(count.min(words.len()));
    for _ in 0..count {
        let join_word = *words.get(pos).ok_or(STATUS_INVALID_BUFFER)?;
        let end_word = *words.get(pos + 1).ok_or(STATUS_INVALID_BUFFER)?;
        pos += 2;
        let join = u8::try_from(join_word)
            .ok()
            .and_then(JoinStyle::from_code)
            .ok_or(STATUS_UNKNOWN_CODE)?;
        let end = u8::try_from(end_word)
            .ok()
            .and_then(EndStyle::from_code)
            .ok_or(STATUS_UNKNOWN_CODE)?;
        let (paths, consumed) = decode_paths_at(words, pos).ok_or(STATUS_INVALID_BUFFER)?;
        pos += consumed;
        groups.push(OffsetGroup { paths, join, end });
    }
    Ok(groups)
}
