use crate::response::Status;
use serde::Serialize;
use serde_json;
use std::error;
use std::fmt;

#[derive(Debug, Serialize, Clone)]
pub struct ServiceError {
    pub msg: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl error::Error for ServiceError {}

impl ServiceError {
    fn new<T: fmt::Display>(status: Status, msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status,
            details: None,
        }
    }

    pub fn bad_request<T: fmt::Display>(msg: T) -> ServiceError {
        Self::new(Status::BadRequest, msg)
    }

    pub fn unauthorized<T: fmt::Display>(msg: T) -> ServiceError {
        Self::new(Status::Unauthorized, msg)
    }

    pub fn forbidden<T: fmt::Display>(msg: T) -> ServiceError {
        Self::new(Status::Forbidden, msg)
    }

    pub fn method_not_allowed<T: fmt::Display>(msg: T) -> ServiceError {
        Self::new(Status::MethodNotAllowed, msg)
    }

    pub fn internal_server_error<T: fmt::Display>(msg: T) -> ServiceError {
        Self::new(Status::InternalServerError, msg)
    }

    /// Attaches diagnostic text that is only surfaced outside production.
    pub fn with_details<T: fmt::Display>(mut self, details: T) -> ServiceError {
        self.details = Some(details.to_string());
        self
    }
}
