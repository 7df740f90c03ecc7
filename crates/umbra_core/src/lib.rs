//! `umbra_core`: the object model and Proxy meta-object protocol of the
//! Umbra JavaScript engine.
//!
//! # Crate layout
//!
//! - [`objects`]: JavaScript values, property descriptors, and the
//!   ordinary / function object representations.
//! - [`object_ops`]: dispatch for every fundamental operation, plus the
//!   throw-on-failure and descriptor-conversion helpers.
//! - [`proxy`]: proxy creation and revocation, trap lookup, internal
//!   methods, and invariant enforcement.
//! - [`reflect`]: the `Reflect` namespace.
//! - [`isolate`] / [`config`]: per-isolate call-depth tracking and its
//!   configuration.
//! - [`error`]: the engine's error type.

/// Isolate configuration.
pub mod config;
/// Engine error types.
pub mod error;
/// Per-isolate execution state.
pub mod isolate;
/// Fundamental-operation dispatch.
pub mod object_ops;
/// JavaScript value representation and object types.
pub mod objects;
/// Proxy exotic objects.
pub mod proxy;
/// The `Reflect` namespace.
pub mod reflect;

pub use error::{UmbraError, UmbraResult, Violation};
pub use isolate::Isolate;
pub use objects::heap_object::{HeapObject, ObjectRef};
pub use objects::value::JsValue;
pub use proxy::{Proxy, RevocableProxy};
pub use reflect::Reflect;
