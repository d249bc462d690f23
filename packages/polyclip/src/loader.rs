//! Kernel acquisition: one load attempt per format per process, memoized.
//!
//! Each format owns an independent slot that moves `Unattempted ->
//! Loading -> Loaded | Failed` exactly once. Callers that arrive while a
//! load is in flight block on the slot's condvar and observe the same
//! outcome as the caller that started it. A failed slot stays failed;
//! acquisition never retries a format.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use polyclip_kernel::{ModuleOverrides, NativeModule};

use crate::enums::{NativeLibFormat, RequestedFormat};
use crate::errors::{ClipperError, Result};

/// Caller-facing knobs for where the kernel artifacts live.
#[derive(Clone, Default)]
pub struct LoadOptions {
    /// Prepended to every artifact filename the runtime asks for.
    pub resource_file_prefix: String,
}

/// Seam between the state machine and actual module startup. Production
/// code uses [`KernelFactory`]; tests substitute counting or failing
/// factories.
pub trait ModuleFactory: Send + Sync {
    fn instantiate(
        &self,
        format: NativeLibFormat,
        options: &LoadOptions,
    ) -> std::result::Result<NativeModule, String>;
}

#[derive(Default)]
struct StartupSignal {
    ready: bool,
    quit: Option<i32>,
}

/// Default factory: instantiates the kernel with the runtime hooks wired
/// so readiness and failure are observed rather than assumed.
pub struct KernelFactory;

impl ModuleFactory for KernelFactory {
    fn instantiate(
        &self,
        format: NativeLibFormat,
        options: &LoadOptions,
    ) -> std::result::Result<NativeModule, String> {
        let signal = Arc::new(Mutex::new(StartupSignal::default()));
        let prefix = options.resource_file_prefix.clone();
        let ready_signal = signal.clone();
        let quit_signal = signal.clone();
        let overrides = ModuleOverrides {
            locate_file: Some(Box::new(move |name| format!("{prefix}{name}"))),
            no_exit_runtime: true,
            pre_run: Some(Box::new(move || {
                lock(&ready_signal).ready = true;
            })),
            on_quit: Some(Box::new(move |code| {
                lock(&quit_signal).quit = Some(code);
            })),
        };
        let module = NativeModule::instantiate(format.artifact(), overrides)?;
        let seen = lock(&signal);
        if let Some(code) = seen.quit {
            return Err(format!("runtime quit during startup with code {code}"));
        }
        if !seen.ready {
            return Err("runtime never signaled readiness".to_string());
        }
        Ok(module)
    }
}

enum FormatState {
    Unattempted,
    Loading,
    Loaded(Arc<NativeModule>),
    Failed(String),
}

struct FormatSlot {
    state: Mutex<FormatState>,
    cond: Condvar,
}

impl FormatSlot {
    fn new() -> Self {
        Self {
            state: Mutex::new(FormatState::Unattempted),
            cond: Condvar::new(),
        }
    }
}

pub struct KernelRegistry {
    wasm: FormatSlot,
    asm_js: FormatSlot,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self {
            wasm: FormatSlot::new(),
            asm_js: FormatSlot::new(),
        }
    }

    fn slot(&self, format: NativeLibFormat) -> &FormatSlot {
        match format {
            NativeLibFormat::Wasm => &self.wasm,
            NativeLibFormat::AsmJs => &self.asm_js,
        }
    }

    /// Resolves one format to its memoized outcome, running the factory at
    /// most once per process.
    pub fn acquire(
        &self,
        format: NativeLibFormat,
        options: &LoadOptions,
        factory: &dyn ModuleFactory,
    ) -> std::result::Result<Arc<NativeModule>, String> {
        let slot = self.slot(format);
        let mut state = lock(&slot.state);
        loop {
            match &*state {
                FormatState::Loaded(module) => return Ok(module.clone()),
                FormatState::Failed(message) => return Err(message.clone()),
                FormatState::Loading => {
                    state = slot
                        .cond
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                FormatState::Unattempted => {
                    *state = FormatState::Loading;
                    break;
                }
            }
        }
        drop(state);

        log::info!("loading native kernel ({format:?})");
        let outcome = factory.instantiate(format, options);
        let mut state = lock(&slot.state);
        let result = match outcome {
            Ok(module) => {
                let module = Arc::new(module);
                *state = FormatState::Loaded(module.clone());
                Ok(module)
            }
            Err(message) => {
                log::warn!("{format:?} kernel failed to load: {message}");
                *state = FormatState::Failed(message.clone());
                Err(message)
            }
        };
        slot.cond.notify_all();
        result
    }

    /// Walks the formats a request allows, in order, returning the first
    /// that loads. Cached failures short-circuit without a retry.
    pub fn acquire_requested(
        &self,
        requested: RequestedFormat,
        options: &LoadOptions,
        factory: &dyn ModuleFactory,
    ) -> Result<(NativeLibFormat, Arc<NativeModule>)> {
        let mut last_cause = None;
        for &format in requested.candidates() {
            match self.acquire(format, options, factory) {
                Ok(module) => return Ok((format, module)),
                Err(message) => last_cause = Some(message),
            }
        }
        Err(ClipperError::LoadFailure {
            message: last_cause
                .unwrap_or_else(|| "could not load in the desired format".to_string()),
        })
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

static REGISTRY: OnceLock<KernelRegistry> = OnceLock::new();

/// Process-wide acquisition. At most one load attempt per format for the
/// life of the process; repeated calls return the cached handle.
pub fn load_native_library(
    requested: RequestedFormat,
    options: &LoadOptions,
) -> Result<(NativeLibFormat, Arc<NativeModule>)> {
    REGISTRY
        .get_or_init(KernelRegistry::new)
        .acquire_requested(requested, options, &KernelFactory)
}
