//! Recomputation controller and trigger interface for impetu.
//!
//! This crate wires the signal, scoring and storage stages into runs:
//! - [`Recomputer`]: computes and atomically replaces one evaluation date's
//!   cross-section
//! - [`Trigger`]: validates request input, applies the run timeout and maps
//!   failures to HTTP-style status codes
//! - [`EngineConfig`]: every stage's configuration, loadable from TOML
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use impetu_engine::{ComputeRequest, EngineConfig, Recomputer, Trigger};
//!
//! let recomputer = Recomputer::new(EngineConfig::default(), prices, fundamentals, store)?;
//! let trigger = Trigger::new(Arc::new(recomputer));
//! let response = trigger
//!     .compute(&ComputeRequest {
//!         start_date: "2024-01-01".into(),
//!         end_date: "2024-06-28".into(),
//!     })
//!     .await?;
//! ```

pub mod config;
pub mod controller;
pub mod report;
pub mod trigger;

// Re-export main types
pub use config::EngineConfig;
pub use controller::{Recomputer, merge_timestamps};
pub use report::{BatchReport, SkipReason, SkippedInstrument};
pub use trigger::{
    ComputeRequest, ComputeResponse, RankRequest, RankResponse, Summary, Trigger, TriggerError,
    TriggerResult,
};
