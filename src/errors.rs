use actix_web::{http::StatusCode, HttpResponse};
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum ServerError {
    #[display(fmt = "{}", _0)]
    UserError(String),
    #[display(fmt = "note id: {} was not found", _0)]
    NotFound(String),
    #[display(fmt = "Library Error: Diesel Error.")]
    DieselError,
    #[display(fmt = "Server Error: Pooling Error.")]
    R2D2Error,
    #[display(fmt = "Server Error: Migration Error.")]
    MigrationError,
    #[display(fmt = "Server Error: Note storage is unavailable.")]
    Unavailable,
}

impl ServerError {
    pub fn not_found(id: i64) -> Self {
        ServerError::NotFound(id.to_string())
    }
}

impl From<r2d2::Error> for ServerError {
    fn from(e: r2d2::Error) -> ServerError {
        log::error!("{e}");
        ServerError::R2D2Error
    }
}

impl From<diesel::result::Error> for ServerError {
    fn from(e: diesel::result::Error) -> ServerError {
        log::error!("{e}");
        ServerError::DieselError
    }
}

impl From<actix_web::error::BlockingError> for ServerError {
    fn from(_: actix_web::error::BlockingError) -> ServerError {
        ServerError::Unavailable
    }
}

impl actix_web::error::ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::UserError(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::DieselError
            | ServerError::R2D2Error
            | ServerError::MigrationError
            | ServerError::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, ResponseError};

    #[actix_web::test]
    async fn user_error_is_bad_request_with_json_body() {
        let res = ServerError::UserError("title is empty".to_owned()).error_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(res.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "error": "title is empty" }));
    }

    #[test]
    fn storage_failures_are_internal() {
        for err in [
            ServerError::DieselError,
            ServerError::R2D2Error,
            ServerError::MigrationError,
            ServerError::Unavailable,
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
        assert_eq!(ServerError::not_found(7).status_code(), StatusCode::NOT_FOUND);
    }
}
