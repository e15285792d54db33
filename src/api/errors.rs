use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Request;
use tracing::{error, warn};
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::utils::{DatabaseError, ServiceError};

/// Body of every failed response.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ErrorDetail {
    pub detail: String,
}

/// Field-level validation failures, keyed by field name.
#[derive(Serialize, ToSchema, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ValidationDetail {
    #[schema(value_type = Object)]
    pub detail: ValidationErrors,
}

#[derive(Responder, Debug)]
pub enum Error {
    #[response(status = 404)]
    NotFound(Json<ErrorDetail>),
    #[response(status = 409)]
    Conflict(Json<ErrorDetail>),
    #[response(status = 422)]
    Unprocessable(Json<ValidationDetail>),
    #[response(status = 500)]
    InternalServer(Json<ErrorDetail>),
}

fn detail(msg: impl Into<String>) -> Json<ErrorDetail> {
    Json(ErrorDetail { detail: msg.into() })
}

impl From<ServiceError> for Error {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => Error::NotFound(detail(msg)),
            ServiceError::Conflict(msg) => Error::Conflict(detail(msg)),
            ServiceError::Database(e @ DatabaseError::DuplicationError { .. }) => {
                Error::Conflict(detail(e.to_string()))
            }
            ServiceError::Database(e) => {
                error!(?e, "database failure");
                Error::InternalServer(detail("Internal server error"))
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(e: ValidationErrors) -> Self {
        warn!(%e, "payload rejected");
        Error::Unprocessable(Json(ValidationDetail { detail: e }))
    }
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> Json<ErrorDetail> {
    detail(format!("No resource at {} {}", req.method(), req.uri()))
}

#[catch(422)]
fn unprocessable(req: &Request<'_>) -> Json<ErrorDetail> {
    detail(format!(
        "Malformed request to {} {}: check the path, query and JSON body",
        req.method(),
        req.uri()
    ))
}

#[catch(default)]
fn default_catcher(status: rocket::http::Status, _req: &Request<'_>) -> Json<ErrorDetail> {
    detail(status.reason_lossy())
}

pub fn catchers() -> Vec<rocket::Catcher> {
    catchers![not_found, unprocessable, default_catcher]
}
