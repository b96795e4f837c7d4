// core/src/lib.rs

//! Flowline: a small asynchronous step-pipeline engine.
//!
//! A pipeline is an ordered list of named steps. Every step has three handler
//! phases (`before`, `on`, `after`) that operate on a shared, lock-protected
//! context. Handlers may stop the run early, and steps may be optional or
//! skipped by a condition evaluated against the context.
//!
//! Pipelines are usually stored in a [`Registry`], keyed by the type of data
//! they operate on, so request handlers only need to build a context and call
//! [`Registry::run`].

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Registry;
