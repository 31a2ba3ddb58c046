//! Outcome envelope shared by handlers, the dispatcher and publish callers.
//!
//! A handler never signals a business failure by erroring: it returns an
//! [`Outcome`] with a [`FailureKind`]. Unexpected faults travel separately as
//! `anyhow::Error` (see [`crate::handler::HandlerResult`]).

use serde::{Serialize, Serializer};

/// Status classification exposed to callers and endpoint adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKind {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    Conflict,
    Unexpected,
}

impl StatusKind {
    #[inline]
    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            StatusKind::BadRequest
                | StatusKind::NotFound
                | StatusKind::Conflict
                | StatusKind::Unexpected
        )
    }
}

/// Optional classification of a successful outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuccessKind {
    Ok,
    Created,
    NoContent,
}

impl From<SuccessKind> for StatusKind {
    fn from(kind: SuccessKind) -> Self {
        match kind {
            SuccessKind::Ok => StatusKind::Ok,
            SuccessKind::Created => StatusKind::Created,
            SuccessKind::NoContent => StatusKind::NoContent,
        }
    }
}

/// Business failure taxonomy. Set by handlers, never invented by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FailureKind {
    /// Caller-supplied data is invalid.
    BadRequest,
    /// Referenced entity is absent.
    NotFound,
    /// A state precondition was violated.
    Conflict,
    #[default]
    Unexpected,
}

impl From<FailureKind> for StatusKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::BadRequest => StatusKind::BadRequest,
            FailureKind::NotFound => StatusKind::NotFound,
            FailureKind::Conflict => StatusKind::Conflict,
            FailureKind::Unexpected => StatusKind::Unexpected,
        }
    }
}

/// A business failure: human-readable message plus its classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    kind: FailureKind,
    message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Tagged success/failure. A success never carries a message and a failure
/// never carries a value; the enum shape enforces both.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success {
        value: T,
        kind: Option<SuccessKind>,
    },
    Failure(Failure),
}

/// Outcome without a payload, returned by broadcast handlers and broadcasts.
pub type VoidOutcome = Outcome<()>;

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success { value, kind: None }
    }

    pub fn success_with(value: T, kind: SuccessKind) -> Self {
        Outcome::Success {
            value,
            kind: Some(kind),
        }
    }

    pub fn created(value: T) -> Self {
        Self::success_with(value, SuccessKind::Created)
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Outcome::Failure(Failure::new(kind, message))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::failure(FailureKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::failure(FailureKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::failure(FailureKind::Conflict, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::failure(FailureKind::Unexpected, message)
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success { value, .. } => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success { value, .. } => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure(f) => Some(f),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.as_failure().map(Failure::message)
    }

    pub fn status_kind(&self) -> StatusKind {
        match self {
            Outcome::Success { kind, .. } => kind.map_or(StatusKind::Ok, StatusKind::from),
            Outcome::Failure(f) => f.kind().into(),
        }
    }

    /// Transform the success value; failures pass through untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success { value, kind } => Outcome::Success {
                value: f(value),
                kind,
            },
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Drop the value but keep the status, e.g. to forward as a broadcast result.
    pub fn discard_value(self) -> VoidOutcome {
        self.map(|_| ())
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Success { value, .. } => Ok(value),
            Outcome::Failure(f) => Err(f),
        }
    }
}

impl Outcome<()> {
    pub fn ok() -> Self {
        Self::success(())
    }

    pub fn no_content() -> Self {
        Self::success_with((), SuccessKind::NoContent)
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        Outcome::Failure(failure)
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Outcome::success(value),
            Err(failure) => Outcome::Failure(failure),
        }
    }
}

/// Wire shape: `{ isSuccess, value?, errorMessage?, statusKind }`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeBody<'a, T> {
    is_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
    status_kind: StatusKind,
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OutcomeBody {
            is_success: self.is_success(),
            value: self.value(),
            error_message: self.error_message(),
            status_kind: self.status_kind(),
        }
        .serialize(serializer)
    }
}
