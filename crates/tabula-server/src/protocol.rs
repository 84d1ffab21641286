//! JSON-lines command protocol
//!
//! One request object per input line, tagged by `op`, and one response
//! object per output line:
//!
//! ```text
//! {"op":"evaluate","model":"loan","facts":{"score":720}}
//! {"ok":true,"result":{"request_id":"eval_...","model":{...},"decisions":[...]}}
//! ```

use crate::error::{ErrorBody, ServerError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabula_sdk::{DecisionService, EvaluationRequest, Value};
use tracing::{debug, warn};

/// A command read from one input line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Evaluate {
        /// Model name or namespace hint
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        facts: HashMap<String, Value>,
        /// Caller-chosen id; generated when absent
        #[serde(default)]
        request_id: Option<String>,
    },
    ListModels,
    GetSchema {
        model: String,
    },
    ListTables {
        model: String,
    },
    GetTable {
        model: String,
        decision: String,
    },
    ReplaceTable {
        model: String,
        decision: String,
        /// Serialized `decisionTable` element
        table: String,
        #[serde(default)]
        test_cases: Option<serde_json::Value>,
    },
    Reload,
}

impl Request {
    pub fn op(&self) -> &'static str {
        match self {
            Request::Evaluate { .. } => "evaluate",
            Request::ListModels => "list_models",
            Request::GetSchema { .. } => "get_schema",
            Request::ListTables { .. } => "list_tables",
            Request::GetTable { .. } => "get_table",
            Request::ReplaceTable { .. } => "replace_table",
            Request::Reload => "reload",
        }
    }
}

/// A response written as one output line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: &ServerError) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_body()),
        }
    }
}

const ENCODE_FAILURE: &str =
    r#"{"ok":false,"error":{"kind":"internal_error","message":"failed to encode response"}}"#;

/// Handle one input line and return the output line, without newline
pub async fn handle_line(service: &DecisionService, line: &str) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(service, request).await,
        Err(e) => {
            warn!("Rejected request line: {}", e);
            Response::failure(&ServerError::InvalidRequest(e.to_string()))
        }
    };
    serde_json::to_string(&response).unwrap_or_else(|_| ENCODE_FAILURE.to_string())
}

/// Dispatch a request to the decision service
pub async fn handle(service: &DecisionService, request: Request) -> Response {
    let op = request.op();
    match dispatch(service, request).await {
        Ok(result) => {
            debug!("{} succeeded", op);
            Response::success(result)
        }
        Err(e) => {
            warn!("{} failed: {}", op, e);
            Response::failure(&e)
        }
    }
}

async fn dispatch(
    service: &DecisionService,
    request: Request,
) -> Result<serde_json::Value, ServerError> {
    let value = match request {
        Request::Evaluate {
            model,
            facts,
            request_id,
        } => {
            let result = match request_id {
                Some(id) => {
                    let mut request = EvaluationRequest::new(id, facts);
                    if let Some(hint) = model {
                        request = request.with_model_hint(hint);
                    }
                    service.evaluate_request(request)?
                }
                None => service.evaluate(model.as_deref(), facts)?,
            };
            serde_json::to_value(result)?
        }
        Request::ListModels => serde_json::to_value(service.list_models().await)?,
        Request::GetSchema { model } => serde_json::to_value(service.get_schema(&model).await?)?,
        Request::ListTables { model } => {
            serde_json::to_value(service.list_tables(&model).await?)?
        }
        Request::GetTable { model, decision } => {
            serde_json::to_value(service.get_table(&model, &decision).await?)?
        }
        Request::ReplaceTable {
            model,
            decision,
            table,
            test_cases,
        } => {
            let response = service
                .replace_table(&model, &decision, &table, test_cases.as_ref())
                .await?;
            serde_json::to_value(response)?
        }
        Request::Reload => {
            let version = service.reload().await?;
            serde_json::json!({ "version": version })
        }
    };
    Ok(value)
}
