//! Precompiled polygon kernel, consumed through a flat-buffer call surface.
//!
//! The crate exposes one artifact per delivery format and a single module
//! type whose exports take and return word pointers into its own linear
//! memory. Hosts never touch the engine types directly; they encode path
//! collections with the [`abi`] helpers, hand pointers to [`NativeModule`],
//! and decode the block the call returns.

pub mod abi;
pub mod engine;
pub mod memory;
pub mod module;

pub use memory::{WordPtr, NULL};
pub use module::{CallOutcome, ModuleOverrides, NativeModule};
