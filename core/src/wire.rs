//! JSON envelopes and batch encoding shared by the HTTP endpoint and clients.
//!
//! # Design
//! Every call answers with exactly one envelope: `{"result":{"data":…}}` on
//! success or `{"error":{…}}` on failure. A batch answers with an array of
//! envelopes in call order. Batched inputs travel as one JSON object keyed by
//! the call index (`{"0":…,"1":…}`), with calls that take no input leaving
//! their key out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query parameter that switches the endpoint into batch mode.
pub const BATCH_PARAM: &str = "batch";

/// Query parameter that carries query input.
pub const INPUT_PARAM: &str = "input";

/// Status of a batch whose envelopes disagree.
pub const MULTI_STATUS: u16 = 207;

/// Failure category reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ParseError,
    BadRequest,
    NotFound,
    MethodNotSupported,
    InternalServerError,
}

impl ErrorCode {
    pub fn json_rpc_code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::BadRequest => -32600,
            ErrorCode::NotFound => -32004,
            ErrorCode::MethodNotSupported => -32005,
            ErrorCode::InternalServerError => -32603,
        }
    }

    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::ParseError | ErrorCode::BadRequest => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::MethodNotSupported => 405,
            ErrorCode::InternalServerError => 500,
        }
    }
}

/// Body of an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorShape {
    pub message: String,
    pub code: i32,
    pub data: ErrorData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub code: ErrorCode,
    pub http_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorShape {
    pub fn new(code: ErrorCode, message: impl Into<String>, path: Option<&str>) -> Self {
        Self {
            message: message.into(),
            code: code.json_rpc_code(),
            data: ErrorData {
                code,
                http_status: code.http_status(),
                path: path.map(str::to_string),
            },
        }
    }
}

/// Per-call response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Envelope {
    #[serde(rename = "result")]
    Success { data: Value },
    #[serde(rename = "error")]
    Failure(ErrorShape),
}

impl Envelope {
    pub fn status(&self) -> u16 {
        match self {
            Envelope::Success { .. } => 200,
            Envelope::Failure(shape) => shape.data.http_status,
        }
    }
}

/// HTTP status for a batch response: the shared status when every envelope
/// agrees, 207 otherwise.
pub fn batch_status(envelopes: &[Envelope]) -> u16 {
    let mut statuses = envelopes.iter().map(Envelope::status);
    let Some(first) = statuses.next() else {
        return 200;
    };
    if statuses.all(|status| status == first) {
        first
    } else {
        MULTI_STATUS
    }
}

/// Pack per-call inputs into the index-keyed batch object.
pub fn encode_batch_input(inputs: &[Option<Value>]) -> Value {
    let map: Map<String, Value> = inputs
        .iter()
        .enumerate()
        .filter_map(|(index, input)| input.clone().map(|value| (index.to_string(), value)))
        .collect();
    Value::Object(map)
}

/// Unpack the index-keyed batch object into `len` per-call inputs.
///
/// A missing object means no call has input. Explicit `null` counts as no
/// input.
pub fn decode_batch_input(raw: Option<Value>, len: usize) -> Result<Vec<Option<Value>>, ErrorShape> {
    let mut map = match raw {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ErrorShape::new(
                ErrorCode::BadRequest,
                "batch input must be an object keyed by call index",
                None,
            ))
        }
    };
    Ok((0..len)
        .map(|index| map.remove(&index.to_string()).filter(|value| !value.is_null()))
        .collect())
}
