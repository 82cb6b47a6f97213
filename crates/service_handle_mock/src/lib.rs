//! Deterministic in-process implementation of the `service_handle` contract.
//!
//! Used for local runs (`--service-kind mock`) and dispatch tests. Every
//! invocation is recorded.

use std::sync::{Mutex, MutexGuard};

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::{json, Value};
use service_handle::{InvokeError, MethodSignature, ServiceHandle};

pub const MOCK_SERVICE_NAME: &str = "Echo";

/// One recorded `invoke` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

#[derive(Debug)]
pub struct MockService {
    name: String,
    methods: Vec<MethodSignature>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockService {
    /// A service with caller-declared methods. `Reverse` and `Fail` keep their
    /// special behavior; every other method echoes its params.
    #[must_use]
    pub fn with_methods(name: impl Into<String>, methods: Vec<MethodSignature>) -> Self {
        Self {
            name: name.into(),
            methods,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock_unpoisoned(&self.calls).clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        lock_unpoisoned(&self.calls).len()
    }

    fn respond(method: &str, params: Value) -> Result<Value, InvokeError> {
        match method {
            "Fail" => Err(InvokeError::remote("Fail always fails")),
            "Reverse" => {
                let text = params
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| InvokeError::remote("Reverse requires a string `text` field"))?;
                Ok(json!({ "text": text.chars().rev().collect::<String>() }))
            }
            _ => Ok(params),
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::with_methods(
            MOCK_SERVICE_NAME,
            vec![
                MethodSignature::new("Echo", "EchoRequest", "EchoResponse"),
                MethodSignature::new("Reverse", "ReverseRequest", "ReverseResponse"),
                MethodSignature::new("Fail", "FailRequest", "FailResponse"),
            ],
        )
    }
}

impl ServiceHandle for MockService {
    fn service_name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    fn invoke(&self, method: &str, params: Value) -> BoxFuture<'_, Result<Value, InvokeError>> {
        lock_unpoisoned(&self.calls).push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
        });
        future::ready(Self::respond(method, params)).boxed()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
