//! Scriptable inference backend for tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use crate::core::client::InferenceBackend;
use crate::core::errors::{Result, ServiceError};

/// One recorded model invocation
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub model_id: String,
    pub inputs: String,
    pub parameters: Option<Value>,
}

/// What the mock answers
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Translation payload wrapping the input: `[{"translation_text": "<input>"}]`
    Echo,
    /// Echo, but the n-th call (1-indexed) fails with an API error
    FailOnCall(usize),
    /// Same body for every call
    Fixed(Value),
    /// Every call fails with an API error
    Failing,
}

#[derive(Debug)]
pub struct MockBackend {
    behavior: MockBehavior,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fixed(body: Value) -> Self {
        Self::new(MockBehavior::Fixed(body))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn upstream_failure() -> ServiceError {
    ServiceError::ApiError {
        status: 503,
        message: "model unavailable".to_string(),
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn invoke_model(
        &self,
        model_id: &str,
        inputs: &str,
        parameters: Option<Value>,
    ) -> Result<Value> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(MockCall {
                model_id: model_id.to_string(),
                inputs: inputs.to_string(),
                parameters,
            });
            calls.len()
        };

        match &self.behavior {
            MockBehavior::Echo => Ok(json!([{ "translation_text": format!("<{}>", inputs) }])),
            MockBehavior::FailOnCall(n) if *n == call_number => Err(upstream_failure()),
            MockBehavior::FailOnCall(_) => {
                Ok(json!([{ "translation_text": format!("<{}>", inputs) }]))
            }
            MockBehavior::Fixed(body) => Ok(body.clone()),
            MockBehavior::Failing => Err(upstream_failure()),
        }
    }
}
