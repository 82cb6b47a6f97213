//! `rpc call <method> [<json>]`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::FutureExt;
use replterm::{blue_bold, green, yellow};
use serde_json::{Map, Value};
use service_handle::{InvokeError, InvokeErrorKind, ServiceHandle};
use tracing::{info, warn};

use crate::commands::split_token;
use crate::completion::Completion;
use crate::console::Console;
use crate::help::rpc_help;

/// A validated call, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    /// Declared method name.
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    MissingMethod,
    InvalidJson(String),
    NotAnObject,
    UnknownMethod(String),
}

impl PrepareError {
    pub fn message(&self) -> String {
        match self {
            Self::MissingMethod => "Please provide a valid method to call".to_string(),
            Self::InvalidJson(reason) => format!("Unable to parse JSON: {reason}"),
            Self::NotAnObject => "Request payload must be a JSON object".to_string(),
            Self::UnknownMethod(method) => format!("Invalid method {} specified", blue_bold(method)),
        }
    }
}

/// Resolves `extra` into a call. No invocation happens here.
pub fn prepare_call(service: &dyn ServiceHandle, extra: &str) -> Result<PreparedCall, PrepareError> {
    let (method, payload) = split_token(extra.trim());
    if method.is_empty() {
        return Err(PrepareError::MissingMethod);
    }

    let params = if payload.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str::<Value>(payload)
            .map_err(|err| PrepareError::InvalidJson(err.to_string()))?
    };
    if !params.is_object() {
        return Err(PrepareError::NotAnObject);
    }

    let signature = service
        .find_method(method)
        .ok_or_else(|| PrepareError::UnknownMethod(method.to_string()))?;

    Ok(PreparedCall {
        method: signature.name.clone(),
        params,
    })
}

/// Runs `rpc call`, finishing `completion` exactly once when the result has
/// been printed.
pub async fn run_call(
    service: Arc<dyn ServiceHandle>,
    console: Console,
    extra: String,
    completion: Completion,
) {
    let call = match prepare_call(service.as_ref(), &extra) {
        Ok(call) => call,
        Err(err) => {
            console.error(&err.message());
            if err == PrepareError::MissingMethod {
                console.line(&rpc_help(service.service_name()));
            }
            completion.done();
            return;
        }
    };

    console.info(&format!(
        "Calling {} on {}",
        blue_bold(&call.method),
        yellow(service.service_name())
    ));
    info!(method = %call.method, service = service.service_name(), "invoking");

    match invoke_guarded(service.as_ref(), &call).await {
        Ok(response) => {
            console.line(&green("Response:"));
            console.line(&pretty_json(&response));
        }
        Err(err) => {
            warn!(method = %call.method, kind = err.kind().as_str(), error = %err, "invocation failed");
            if err.kind() == InvokeErrorKind::Panicked {
                console.error(&format!("Unable to call {}", blue_bold(&call.method)));
                console.line(err.message());
            } else {
                console.error(err.message());
            }
        }
    }
    completion.done();
}

/// Invokes the call, turning a panic in either the handle's synchronous part
/// or its future into an [`InvokeError`].
pub async fn invoke_guarded(
    service: &dyn ServiceHandle,
    call: &PreparedCall,
) -> Result<Value, InvokeError> {
    let future = match panic::catch_unwind(AssertUnwindSafe(|| {
        service.invoke(&call.method, call.params.clone())
    })) {
        Ok(future) => future,
        Err(payload) => return Err(panic_error(payload.as_ref())),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(panic_error(payload.as_ref())),
    }
}

fn panic_error(payload: &(dyn Any + Send)) -> InvokeError {
    InvokeError::panicked(format!("invocation panicked: {}", panic_message(payload)))
}

/// Text of a panic payload raised by `panic!`.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Two-space indented JSON.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
