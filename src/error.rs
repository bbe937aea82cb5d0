use thiserror::Error;

/// Errors raised by an injection pass.
#[derive(Debug, Error)]
pub enum InjectError {
    /// A required member has no matching registry entry.
    #[error("Unable to find service of type '{service}' for member '{member}' on '{target}'")]
    MissingService {
        service: &'static str,
        member: &'static str,
        target: &'static str,
    },

    /// A resolved service could not be written into its member.
    #[error("Unable to inject member '{member}' into '{target}'")]
    InjectionFailure {
        member: &'static str,
        target: &'static str,
        #[source]
        source: AssignError,
    },
}

impl InjectError {
    /// Name of the member the pass stopped at.
    pub fn member(&self) -> &'static str {
        match self {
            InjectError::MissingService { member, .. } => member,
            InjectError::InjectionFailure { member, .. } => member,
        }
    }
}

/// Reasons a single assignment is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("Service is not of type '{expected}'")]
    TypeMismatch { expected: &'static str },

    #[error("Member '{member}' has no backing storage")]
    NoBackingStorage { member: &'static str },

    #[error("Assignment rejected: {0}")]
    Rejected(String),
}

impl AssignError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        AssignError::Rejected(reason.into())
    }
}
