//! Stateless HTTP request builder and response parser for the todo RPC endpoint.
//!
//! # Design
//! `TodoClient` holds only the endpoint base URL and carries no mutable state
//! between calls. Each call (or batch of calls) is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The host executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::procedure::{Call, ProcedureKind, Reply};
use crate::types::{SetDone, Todo};
use crate::wire::{self, Envelope};

/// Synchronous, stateless client for the todo RPC endpoint.
///
/// `base_url` is the endpoint root, e.g. `http://localhost:3002/api/trpc`.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

/// A batch answers with an array, or with one envelope when the whole
/// request was rejected.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchBody {
    Many(Vec<Envelope>),
    One(Envelope),
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Single calls
    // -----------------------------------------------------------------------

    pub fn build_call(&self, call: &Call) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/{}", self.base_url, call.procedure().path());
        let input = call.input().map(|value| to_json(&value)).transpose()?;
        Ok(match call.kind() {
            ProcedureKind::Query => HttpRequest {
                method: HttpMethod::Get,
                path,
                query: input
                    .map(|input| vec![(wire::INPUT_PARAM.to_string(), input)])
                    .unwrap_or_default(),
                headers: Vec::new(),
                body: None,
            },
            ProcedureKind::Mutation => HttpRequest {
                method: HttpMethod::Post,
                path,
                query: Vec::new(),
                headers: json_headers(),
                body: input,
            },
        })
    }

    pub fn parse_call(&self, call: &Call, response: HttpResponse) -> Result<Reply, ApiError> {
        let envelope: Envelope = decode_body(&response)?;
        resolve(call, envelope)
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    /// Build one request carrying every call. All calls must share a kind.
    pub fn build_batch(&self, calls: &[Call]) -> Result<HttpRequest, ApiError> {
        let Some(first) = calls.first() else {
            return Err(ApiError::InvalidBatch("batch is empty".to_string()));
        };
        let kind = first.kind();
        if calls.iter().any(|call| call.kind() != kind) {
            return Err(ApiError::InvalidBatch(
                "queries and mutations cannot share a batch".to_string(),
            ));
        }

        let paths: Vec<&str> = calls.iter().map(|call| call.procedure().path()).collect();
        let path = format!("{}/{}", self.base_url, paths.join(","));
        let inputs: Vec<Option<Value>> = calls.iter().map(Call::input).collect();
        let input = to_json(&wire::encode_batch_input(&inputs))?;
        let mut query = vec![(wire::BATCH_PARAM.to_string(), "1".to_string())];

        Ok(match kind {
            ProcedureKind::Query => {
                query.push((wire::INPUT_PARAM.to_string(), input));
                HttpRequest {
                    method: HttpMethod::Get,
                    path,
                    query,
                    headers: Vec::new(),
                    body: None,
                }
            }
            ProcedureKind::Mutation => HttpRequest {
                method: HttpMethod::Post,
                path,
                query,
                headers: json_headers(),
                body: Some(input),
            },
        })
    }

    /// Parse a batch response into one result per call, in call order.
    ///
    /// The outer `Err` covers failures of the whole exchange; inner results
    /// are per call.
    pub fn parse_batch(
        &self,
        calls: &[Call],
        response: HttpResponse,
    ) -> Result<Vec<Result<Reply, ApiError>>, ApiError> {
        let envelopes = match decode_body::<BatchBody>(&response)? {
            BatchBody::Many(envelopes) => envelopes,
            BatchBody::One(Envelope::Failure(shape)) => return Err(shape.into()),
            BatchBody::One(Envelope::Success { .. }) => {
                return Err(ApiError::DeserializationError(
                    "expected an array of envelopes".to_string(),
                ))
            }
        };
        if envelopes.len() != calls.len() {
            return Err(ApiError::DeserializationError(format!(
                "expected {} envelopes, got {}",
                calls.len(),
                envelopes.len()
            )));
        }
        Ok(calls
            .iter()
            .zip(envelopes)
            .map(|(call, envelope)| resolve(call, envelope))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Typed helpers
    // -----------------------------------------------------------------------

    pub fn build_get_todos(&self) -> Result<HttpRequest, ApiError> {
        self.build_call(&Call::GetTodos)
    }

    pub fn parse_get_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        self.parse_call(&Call::GetTodos, response)?.into_todos()
    }

    pub fn build_add_todo(&self, content: &str) -> Result<HttpRequest, ApiError> {
        self.build_call(&Call::AddTodo(content.to_string()))
    }

    pub fn parse_add_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        self.parse_call(&Call::AddTodo(String::new()), response)?.into_todo()
    }

    pub fn build_set_done(&self, input: SetDone) -> Result<HttpRequest, ApiError> {
        self.build_call(&Call::SetDone(input))
    }

    pub fn parse_set_done(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        self.parse_call(&Call::SetDone(SetDone { id: 0, done: false }), response)?
            .into_todo()
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json(value: &Value) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Decode the body as JSON. A body that fails to decode on a non-200 status
/// is reported as the raw HTTP failure rather than a decode failure.
fn decode_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| {
        if response.status == 200 {
            ApiError::DeserializationError(e.to_string())
        } else {
            ApiError::HttpError {
                status: response.status,
                body: response.body.clone(),
            }
        }
    })
}

fn resolve(call: &Call, envelope: Envelope) -> Result<Reply, ApiError> {
    match envelope {
        Envelope::Success { data } => call.decode_output(data),
        Envelope::Failure(shape) => Err(shape.into()),
    }
}
