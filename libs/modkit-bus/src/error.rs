use thiserror::Error;

/// Wiring defects detected while resolving handlers for a publish call.
///
/// Distinct from business failures (`Outcome::Failure`) and from runtime
/// faults raised by handlers: a configuration fault means the application was
/// assembled wrong.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationFault {
    #[error("no request handler registered for '{event}' answering '{answer}'")]
    NoRequestHandler {
        event: &'static str,
        answer: &'static str,
    },

    #[error(
        "{} request handlers registered for '{event}' answering '{answer}', exactly one is allowed: [{}]",
        .candidates.len(),
        .candidates.join(", ")
    )]
    AmbiguousRequestHandlers {
        event: &'static str,
        answer: &'static str,
        candidates: Vec<String>,
    },

    #[error("registered handler '{handler}' does not match '{event}'")]
    TypeMismatch {
        event: &'static str,
        handler: &'static str,
    },
}

/// Everything a publish call can fail with other than a business outcome.
#[derive(Debug, Error)]
pub enum BusError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationFault),

    #[error("failed to construct handler '{handler}' for '{event}'")]
    Construction {
        event: &'static str,
        handler: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("handler '{handler}' faulted while processing '{event}'")]
    Handler {
        event: &'static str,
        handler: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("broadcast of '{event}' cancelled after {completed} of {total} handlers")]
    Cancelled {
        event: &'static str,
        completed: usize,
        total: usize,
    },
}

impl BusError {
    /// True for wiring defects (wrong request-handler cardinality and the like).
    pub fn is_configuration_fault(&self) -> bool {
        matches!(self, BusError::Configuration(_))
    }

    pub fn as_configuration_fault(&self) -> Option<&ConfigurationFault> {
        match self {
            BusError::Configuration(fault) => Some(fault),
            _ => None,
        }
    }
}

/// Errors raised while sealing the handler registry at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid handler registration:\n{errors:#?}")]
    InvalidRegistration { errors: Vec<String> },

    #[error(transparent)]
    AmbiguousRequestHandlers(ConfigurationFault),
}
