//! # Form Session
//!
//! One live form: the combined value object (field values plus MetaState
//! under `$meta`), the latest [`ErrorMap`], an optional failure banner, and
//! the submission guard.
//!
//! ## Submission Protocol
//!
//! ```text
//! idle ──begin_submit()──▶ pending ──complete_submit(ok)──▶ idle
//!   │                         │
//!   │ errors present          └──complete_submit(err)──▶ idle + banner
//!   ▼
//! idle (errors shown inline, sink not called)
//! ```
//!
//! [`FormSession::begin_submit`] hands out a [`PendingSubmission`] token and
//! marks the session busy; the token must be returned through
//! [`FormSession::complete_submit`] (or [`FormSession::abandon_submit`])
//! before another submission can start. Each token carries a fresh ticket
//! id, and only the token matching the pending ticket is accepted.
//!
//! [`FormSession::submit`] runs both halves around a [`SubmitSink`]. If its
//! future is dropped while the sink is awaited, the guard is released, so a
//! timed-out or cancelled submission can be retried.

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use sform_core::{tree, FieldPath};
use sform_schema::{
    json_type_name, normalize, render_form, walk_form, ErrorMap, Field, FieldRenderer,
    FormValidator, Schema, SchemaError, ValidatorCache,
};

use crate::config::SessionConfig;
use crate::submit::{SinkError, SubmitSink};

/// Error constructing a [`FormSession`].
#[derive(Error, Debug)]
pub enum SessionError {
    /// The schema could not be compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Initial values must be an object (or null for an empty form).
    #[error("initial values must be a JSON object, found {found}")]
    InitialValuesNotObject {
        /// JSON type name of the supplied value.
        found: &'static str,
    },
}

/// Why a submission did not reach, or did not get through, the sink.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Another submission is still pending.
    #[error("a submission is already in progress")]
    Busy,

    /// Validation produced field errors; they are kept on the session.
    #[error("form has {count} validation error(s)")]
    Invalid {
        /// Number of entries in the error map.
        count: usize,
    },

    /// The sink reported a failure; the session banner carries it.
    #[error("submission failed: {0}")]
    Sink(#[from] SinkError),

    /// The token does not match this session's pending submission.
    #[error("submission {ticket} is not pending on this session")]
    UnknownTicket {
        /// Ticket id carried by the rejected token.
        ticket: Uuid,
    },
}

/// Token for an in-flight submission, carrying the payload to hand over.
#[derive(Debug)]
#[must_use = "a pending submission keeps the session busy until completed"]
pub struct PendingSubmission {
    ticket: Uuid,
    payload: Value,
}

impl PendingSubmission {
    /// Ticket id tying this token to the session that issued it.
    pub fn ticket(&self) -> Uuid {
        self.ticket
    }

    /// The projected payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// Clears the pending ticket on drop unless disarmed.
struct PendingGuard<'a> {
    pending: &'a mut Option<Uuid>,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("submission dropped before the sink answered; guard released");
            *self.pending = None;
        }
    }
}

/// A live form bound to one schema.
#[derive(Debug)]
pub struct FormSession {
    validator: FormValidator,
    config: SessionConfig,
    values: Value,
    errors: ErrorMap,
    banner: Option<String>,
    pending: Option<Uuid>,
}

impl FormSession {
    /// Start a session over `schema` with `initial` values.
    ///
    /// `initial` may be null for an empty form. The values are normalized
    /// before the first walk.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Schema` if the schema does not compile and
    /// `SessionError::InitialValuesNotObject` for scalar or array values.
    pub fn new(
        schema: Schema,
        initial: Value,
        cache: &ValidatorCache,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let mut values = match initial {
            Value::Null => Value::Object(Map::new()),
            Value::Object(obj) => Value::Object(obj),
            other => {
                return Err(SessionError::InitialValuesNotObject {
                    found: json_type_name(&other),
                })
            }
        };
        let validator = FormValidator::new(&schema, cache, config.name_field.as_str())?
            .with_projection(config.projection());
        normalize(&schema, &mut values);
        tracing::debug!(schema = %schema.digest().short(), "form session started");

        Ok(Self {
            validator,
            config,
            values,
            errors: ErrorMap::new(),
            banner: None,
            pending: None,
        })
    }

    /// The schema this session renders.
    pub fn schema(&self) -> &Schema {
        self.validator.schema()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The combined value object, MetaState included.
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Errors from the latest validation pass.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Form-level submission failure message.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Whether a submission is pending.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Write `value` at `path`, creating containers along the way.
    ///
    /// Errors, banner, and other values are left alone. A discriminant
    /// change is an ordinary write to its MetaState path.
    pub fn on_change(&mut self, path: &FieldPath, value: Value) {
        tracing::trace!(path = %path, "field changed");
        tree::set(&mut self.values, path, value);
    }

    /// The payload a submission would send right now.
    pub fn payload(&self) -> Value {
        self.validator.payload(&self.values)
    }

    /// Field descriptors for the current values and errors.
    pub fn fields(&self) -> Vec<Field> {
        walk_form(self.schema(), &self.values, &self.errors)
    }

    /// Render the banner (if any) and every field.
    pub fn render<R: FieldRenderer>(&self, renderer: &mut R) -> Vec<R::Output> {
        render_form(&self.fields(), self.banner(), renderer)
    }

    /// Normalize and validate, replacing the error map.
    pub fn validate(&mut self) -> &ErrorMap {
        normalize(self.validator.schema(), &mut self.values);
        self.errors = self.validator.validate(&self.values);
        &self.errors
    }

    /// First half of a submission: guard, clear the banner, validate.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Busy` while another submission is pending and
    /// `SubmitError::Invalid` when validation finds errors.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitError> {
        if self.is_busy() {
            tracing::debug!("submission rejected: already in progress");
            return Err(SubmitError::Busy);
        }
        self.banner = None;

        let count = self.validate().len();
        if count > 0 {
            tracing::info!(errors = count, "submission blocked by validation errors");
            return Err(SubmitError::Invalid { count });
        }

        let ticket = Uuid::new_v4();
        self.pending = Some(ticket);
        tracing::debug!(%ticket, "submission pending");
        Ok(PendingSubmission {
            ticket,
            payload: self.payload(),
        })
    }

    /// Consume `pending` and release the guard if it is this session's
    /// pending ticket.
    fn release(&mut self, pending: PendingSubmission) -> Result<(), SubmitError> {
        if self.pending != Some(pending.ticket) {
            tracing::warn!(ticket = %pending.ticket, "rejected foreign submission token");
            return Err(SubmitError::UnknownTicket {
                ticket: pending.ticket,
            });
        }
        self.pending = None;
        Ok(())
    }

    /// Release the guard without recording an outcome.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::UnknownTicket` if `pending` was not issued for
    /// this session's current submission; the session is left unchanged.
    pub fn abandon_submit(&mut self, pending: PendingSubmission) -> Result<(), SubmitError> {
        self.release(pending)?;
        tracing::info!("submission abandoned");
        Ok(())
    }

    /// Second half of a submission: release the guard and record the outcome.
    ///
    /// A sink failure sets the banner; field errors are not recomputed.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Sink` carrying the sink's failure, or
    /// `SubmitError::UnknownTicket` (session unchanged) for a token this
    /// session is not waiting on.
    pub fn complete_submit(
        &mut self,
        pending: PendingSubmission,
        result: Result<(), SinkError>,
    ) -> Result<(), SubmitError> {
        self.release(pending)?;
        match result {
            Ok(()) => {
                tracing::info!("submission accepted");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "submission failed");
                self.banner = Some(format!("Submission failed: {err}"));
                Err(SubmitError::Sink(err))
            }
        }
    }

    /// Validate and, if clean, hand the payload to `sink`.
    ///
    /// # Errors
    ///
    /// See [`begin_submit`](Self::begin_submit) and
    /// [`complete_submit`](Self::complete_submit).
    pub async fn submit<S: SubmitSink + ?Sized>(&mut self, sink: &S) -> Result<(), SubmitError> {
        let pending = self.begin_submit()?;
        let guard = PendingGuard {
            pending: &mut self.pending,
            armed: true,
        };
        let result = sink.submit(pending.payload()).await;
        guard.disarm();
        self.complete_submit(pending, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host_port() -> Schema {
        Schema::from_value(json!({
            "properties": {
                "host": {"type": "string"},
                "port": {"type": "string", "enum": ["80", "443"]}
            },
            "required": ["host"]
        }))
        .unwrap()
    }

    fn session(initial: Value) -> FormSession {
        FormSession::new(host_port(), initial, &ValidatorCache::new(), SessionConfig::default())
            .unwrap()
    }

    fn path(dotted: &str) -> FieldPath {
        FieldPath::parse_dotted(dotted)
    }

    #[test]
    fn test_null_initial_values_start_empty() {
        assert_eq!(session(Value::Null).values(), &json!({}));
    }

    #[test]
    fn test_scalar_initial_values_rejected() {
        let err = FormSession::new(
            host_port(),
            json!([1]),
            &ValidatorCache::new(),
            SessionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InitialValuesNotObject { found: "array" }
        ));
    }

    #[test]
    fn test_uncompilable_schema_rejected() {
        let schema = Schema::from_value(json!({"type": "object", "minProperties": "many"})).unwrap();
        let err = FormSession::new(schema, json!({}), &ValidatorCache::new(), SessionConfig::default())
            .unwrap_err();
        assert!(matches!(err, SessionError::Schema(SchemaError::Compile { .. })));
    }

    #[test]
    fn test_on_change_only_touches_values() {
        let mut s = session(json!({"name": "c1"}));
        s.validate();
        let errors = s.errors().clone();
        s.on_change(&path("host"), json!("db"));
        assert_eq!(s.values(), &json!({"name": "c1", "host": "db"}));
        assert_eq!(s.errors(), &errors);
    }

    #[test]
    fn test_last_write_wins() {
        let mut s = session(json!({}));
        s.on_change(&path("host"), json!("a"));
        s.on_change(&path("host"), json!("b"));
        assert_eq!(s.values()["host"], "b");
    }

    #[test]
    fn test_fields_reflect_errors_after_validate() {
        let mut s = session(json!({"name": "c1", "host": "", "port": "80"}));
        assert!(s.validate().get_dotted("host").is_some());
        let fields = s.fields();
        let Field::Text(host) = &fields[0] else { panic!("expected text") };
        assert!(host.error.is_some());
        let Field::Choice(port) = &fields[1] else { panic!("expected choice") };
        assert_eq!(port.value.as_deref(), Some("80"));
    }

    #[test]
    fn test_invalid_submission_keeps_errors_and_stays_idle() {
        let mut s = session(json!({"host": "x"}));
        let err = s.begin_submit().unwrap_err();
        assert!(matches!(err, SubmitError::Invalid { count: 1 }));
        assert_eq!(s.errors().get_dotted("name"), Some("name is required"));
        assert!(!s.is_busy());
        assert_eq!(s.banner(), None);
    }

    #[test]
    fn test_busy_guard_rejects_second_submission() {
        let mut s = session(json!({"name": "c1", "host": "x"}));
        let pending = s.begin_submit().unwrap();
        assert!(s.is_busy());
        assert!(matches!(s.begin_submit(), Err(SubmitError::Busy)));
        s.complete_submit(pending, Ok(())).unwrap();
        assert!(!s.is_busy());
        let again = s.begin_submit().unwrap();
        s.complete_submit(again, Ok(())).unwrap();
    }

    #[test]
    fn test_token_from_other_session_rejected() {
        let mut first = session(json!({"name": "c1", "host": "x"}));
        let mut second = session(json!({"name": "c2", "host": "y"}));
        let ours = first.begin_submit().unwrap();
        let theirs = second.begin_submit().unwrap();
        assert_ne!(ours.ticket(), theirs.ticket());

        let err = first.complete_submit(theirs, Ok(())).unwrap_err();
        assert!(matches!(err, SubmitError::UnknownTicket { .. }));
        assert!(first.is_busy());
        assert!(second.is_busy());

        first.complete_submit(ours, Ok(())).unwrap();
        assert!(!first.is_busy());
    }

    #[test]
    fn test_stale_token_rejected_after_completion() {
        let mut s = session(json!({"name": "c1", "host": "x"}));
        let stale = s.begin_submit().unwrap();
        let stale_ticket = stale.ticket();
        s.abandon_submit(stale).unwrap();

        let current = s.begin_submit().unwrap();
        let forged = PendingSubmission {
            ticket: stale_ticket,
            payload: json!({}),
        };
        assert!(matches!(
            s.abandon_submit(forged),
            Err(SubmitError::UnknownTicket { ticket }) if ticket == stale_ticket
        ));
        assert!(s.is_busy());
        s.complete_submit(current, Ok(())).unwrap();
    }

    #[test]
    fn test_abandon_releases_guard_without_banner() {
        let mut s = session(json!({"name": "c1", "host": "x"}));
        let pending = s.begin_submit().unwrap();
        s.abandon_submit(pending).unwrap();
        assert!(!s.is_busy());
        assert_eq!(s.banner(), None);
        let again = s.begin_submit().unwrap();
        s.complete_submit(again, Ok(())).unwrap();
    }

    #[test]
    fn test_sink_failure_sets_single_banner() {
        let mut s = session(json!({"name": "c1", "host": "x"}));
        let pending = s.begin_submit().unwrap();
        let err = s
            .complete_submit(pending, Err(SinkError::Custom("connection refused".into())))
            .unwrap_err();
        assert!(matches!(err, SubmitError::Sink(_)));
        assert_eq!(s.banner(), Some("Submission failed: connection refused"));
        assert!(s.errors().is_empty());
        assert!(!s.is_busy());
    }

    #[test]
    fn test_new_submission_clears_banner() {
        let mut s = session(json!({"name": "c1", "host": "x"}));
        let pending = s.begin_submit().unwrap();
        let _ = s.complete_submit(pending, Err(SinkError::Custom("down".into())));
        let pending = s.begin_submit().unwrap();
        assert_eq!(s.banner(), None);
        s.complete_submit(pending, Ok(())).unwrap();
    }

    #[test]
    fn test_pending_payload_is_projected() {
        let mut s = session(json!({"name": "c1", "host": "x", "$meta": {}}));
        let pending = s.begin_submit().unwrap();
        assert_eq!(pending.payload(), &json!({"name": "c1", "host": "x"}));
        s.complete_submit(pending, Ok(())).unwrap();
    }

    #[test]
    fn test_custom_name_field() {
        let config = SessionConfig {
            name_field: "label".into(),
            ..SessionConfig::default()
        };
        let mut s =
            FormSession::new(host_port(), json!({"host": "x"}), &ValidatorCache::new(), config)
                .unwrap();
        assert_eq!(s.validate().get_dotted("label"), Some("label is required"));
    }
}
