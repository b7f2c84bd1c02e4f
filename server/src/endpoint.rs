//! HTTP endpoint for procedure calls, single and batched.
//!
//! `GET /api/trpc/{paths}` runs queries, `POST` runs mutations. With
//! `?batch=1` the path segment is a comma-separated list of procedures, all
//! run concurrently, and the response is an array of envelopes in call order.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use todo_core::wire::{self, Envelope, ErrorCode, ErrorShape};
use todo_core::ProcedureKind;
use tracing::{info, warn};

use crate::router::TodoRouter;

/// Mount point of the procedure endpoint.
pub const ENDPOINT: &str = "/api/trpc";

#[derive(Debug, Default, Deserialize)]
pub struct CallParams {
    pub batch: Option<String>,
    pub input: Option<String>,
}

impl CallParams {
    fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1") | Some("true"))
    }
}

pub fn routes(router: TodoRouter) -> Router {
    Router::new()
        .route(
            &format!("{ENDPOINT}/{{paths}}"),
            get(handle_call).post(handle_call),
        )
        .with_state(router)
}

async fn handle_call(
    State(router): State<TodoRouter>,
    method: Method,
    Path(paths): Path<String>,
    Query(params): Query<CallParams>,
    body: Bytes,
) -> Response {
    let kind = if method == Method::POST {
        ProcedureKind::Mutation
    } else {
        ProcedureKind::Query
    };
    let batch = params.is_batch();
    info!(%method, %paths, batch, "procedure request");

    let raw_input = match read_input(kind, params.input.as_deref(), &body) {
        Ok(raw) => raw,
        Err(shape) => return reject(shape),
    };

    if !batch {
        let envelope = router.respond(kind, &paths, raw_input).await;
        return respond_with(envelope.status(), envelope);
    }

    let paths: Vec<&str> = paths.split(',').collect();
    let inputs = match wire::decode_batch_input(raw_input, paths.len()) {
        Ok(inputs) => inputs,
        Err(shape) => return reject(shape),
    };
    let envelopes: Vec<Envelope> = join_all(
        paths
            .iter()
            .zip(inputs)
            .map(|(path, input)| router.respond(kind, path, input)),
    )
    .await;
    respond_with(wire::batch_status(&envelopes), envelopes)
}

/// Queries carry input in the query string, mutations in the body.
fn read_input(
    kind: ProcedureKind,
    query: Option<&str>,
    body: &[u8],
) -> Result<Option<Value>, ErrorShape> {
    let parsed = match kind {
        ProcedureKind::Query => query.map(|raw| serde_json::from_str(raw)).transpose(),
        ProcedureKind::Mutation if body.is_empty() => Ok(None),
        ProcedureKind::Mutation => serde_json::from_slice(body).map(Some),
    };
    parsed.map_err(|e| {
        ErrorShape::new(
            ErrorCode::ParseError,
            format!("input is not valid JSON: {e}"),
            None,
        )
    })
}

fn reject(shape: ErrorShape) -> Response {
    warn!(code = ?shape.data.code, message = %shape.message, "request rejected");
    let status = shape.data.http_status;
    respond_with(status, Envelope::Failure(shape))
}

fn respond_with<T: serde::Serialize>(status: u16, body: T) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_flag_values() {
        let params = |batch: Option<&str>| CallParams {
            batch: batch.map(str::to_string),
            input: None,
        };
        assert!(params(Some("1")).is_batch());
        assert!(params(Some("true")).is_batch());
        assert!(!params(Some("0")).is_batch());
        assert!(!params(None).is_batch());
    }

    #[test]
    fn query_input_comes_from_query_string() {
        let input = read_input(ProcedureKind::Query, Some(r#"{"0":null}"#), b"ignored").unwrap();
        assert_eq!(input, Some(serde_json::json!({"0": null})));
        assert_eq!(read_input(ProcedureKind::Query, None, b"").unwrap(), None);
    }

    #[test]
    fn empty_mutation_body_means_no_input() {
        assert_eq!(read_input(ProcedureKind::Mutation, None, b"").unwrap(), None);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let shape = read_input(ProcedureKind::Mutation, None, b"{oops").unwrap_err();
        assert_eq!(shape.data.code, ErrorCode::ParseError);
        assert_eq!(shape.data.http_status, 400);
    }
}
