//! # sform-state — Form Session State
//!
//! Holds a live form: the combined value object edited through a single
//! change handler, the error map from the latest validation pass, and the
//! guarded submission pipeline.
//!
//! ## Modules
//!
//! - **Session** (`session.rs`): [`FormSession`], change handling,
//!   validation, and the two-phase submit protocol with its busy guard.
//!
//! - **Submit** (`submit.rs`): the [`SubmitSink`] seam with file and HTTP
//!   implementations.
//!
//! - **Config** (`config.rs`): [`SessionConfig`], YAML or JSON loadable.
//!
//! ## Concurrency
//!
//! A session is owned by one task. The sink call is the only suspension
//! point; at most one submission is in flight and none are queued.

pub mod config;
pub mod session;
pub mod submit;

pub use config::{ConfigError, SessionConfig};
pub use session::{FormSession, PendingSubmission, SessionError, SubmitError};
pub use submit::{FileSink, HttpSink, SinkError, SubmitSink};
