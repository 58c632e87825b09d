use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ServiceError;

pub const ALLOWED_METHODS: &str = "GET, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    Unauthorized,
    Forbidden,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::Unauthorized => 401,
            Status::Forbidden => 403,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::Unauthorized => "Unauthorized",
            Status::Forbidden => "Forbidden",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.code())
    }
}

/// API Gateway proxy response. `body` carries serialized JSON.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub status_code: Status,
    pub headers: Value,
    pub body: String,
}

fn cors_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Methods": ALLOWED_METHODS,
        "Access-Control-Allow-Headers": ALLOWED_HEADERS,
    })
}

fn error_body(err: ServiceError, expose_details: bool) -> Value {
    let mut body = json!({
        "success": false,
        "error": err.status.reason(),
        "message": err.msg,
    });
    if let (true, Some(details)) = (expose_details, err.details) {
        body["details"] = Value::String(details);
    }
    body
}

///
/// Wraps a handler result into the proxy response envelope.
///
/// ## Arguments
///
/// * `result` - The success body, or the error to render as `{ success: false, .. }`.
/// * `expose_details` - Whether error `details` may be sent (false in production).
///
pub fn make_response_payload(
    result: Result<Value, ServiceError>,
    expose_details: bool,
) -> Result<Value, lambda_runtime::Error> {
    let (status_code, body) = match result {
        Err(err) => (err.status, error_body(err, expose_details)),
        Ok(body) => (Status::Ok, body),
    };
    let response_payload = ResponsePayload {
        status_code,
        headers: cors_headers(),
        body: serde_json::to_string(&body)?,
    };
    serde_json::to_value(response_payload).map_err(lambda_runtime::Error::from)
}

/// CORS preflight answer: headers only, empty body.
pub fn make_preflight_payload() -> Result<Value, lambda_runtime::Error> {
    let response_payload = ResponsePayload {
        status_code: Status::Ok,
        headers: cors_headers(),
        body: String::new(),
    };
    serde_json::to_value(response_payload).map_err(lambda_runtime::Error::from)
}
