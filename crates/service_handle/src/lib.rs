//! Transport-agnostic contract for a resolved RPC service.
//!
//! A handle exposes the service name, its ordered method signatures, and an
//! asynchronous JSON-in/JSON-out `invoke`. Schema loading and wire framing
//! belong to the implementations.

use std::fmt;

use futures_util::future::BoxFuture;
use serde_json::Value;

/// One callable method as declared by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub request_type: String,
    pub response_type: String,
}

impl MethodSignature {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            request_type: request_type.into(),
            response_type: response_type.into(),
        }
    }

    /// Name as typed at the prompt: the declared name with its first
    /// character lower-cased.
    #[must_use]
    pub fn call_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// True when `name` is the declared name or the call name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.call_name() == name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeErrorKind {
    /// The request never produced a response.
    Transport,
    /// The service answered with a failure status.
    Status,
    /// The service handled the call and reported an application error.
    Remote,
    /// The invocation panicked.
    Panicked,
}

impl InvokeErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Status => "status",
            Self::Remote => "remote",
            Self::Panicked => "panicked",
        }
    }
}

/// Error returned by [`ServiceHandle::invoke`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeError {
    kind: InvokeErrorKind,
    message: String,
}

impl InvokeError {
    #[must_use]
    pub fn new(kind: InvokeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(InvokeErrorKind::Transport, message)
    }

    #[must_use]
    pub fn status(message: impl Into<String>) -> Self {
        Self::new(InvokeErrorKind::Status, message)
    }

    #[must_use]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(InvokeErrorKind::Remote, message)
    }

    #[must_use]
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::new(InvokeErrorKind::Panicked, message)
    }

    #[must_use]
    pub fn kind(&self) -> InvokeErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvokeError {}

impl From<String> for InvokeError {
    fn from(message: String) -> Self {
        Self::remote(message)
    }
}

impl From<&str> for InvokeError {
    fn from(message: &str) -> Self {
        Self::remote(message)
    }
}

/// A resolved service the shell can call.
pub trait ServiceHandle: Send + Sync + 'static {
    fn service_name(&self) -> &str;

    /// Methods in declaration order.
    fn methods(&self) -> &[MethodSignature];

    /// Finds a method by declared name or call name.
    fn find_method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods().iter().find(|method| method.matches(name))
    }

    /// Calls `method` (the declared name) with a JSON object of parameters.
    fn invoke(&self, method: &str, params: Value) -> BoxFuture<'_, Result<Value, InvokeError>>;
}
