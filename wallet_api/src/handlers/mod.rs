mod transactions;
mod wallet;

use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError},
    http::Method,
    web,
};
use serde::Serialize;

pub use transactions::*;
pub use wallet::*;

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

pub fn message(message: &'static str) -> MessageBody {
    MessageBody { message }
}

/// A 500 carrying a fixed JSON body; the underlying cause is only logged.
pub fn internal_error<B: Serialize>(cause: &'static str, body: B) -> actix_web::Error {
    InternalError::from_response(cause, HttpResponse::InternalServerError().json(body)).into()
}

/// Unreadable request bodies are reported like any other failed write: a 500
/// with the route's generic body.
fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::error!("Rejected {} {} body: {}", req.method(), req.path(), err);
    if req.path().starts_with("/api/transactions") {
        let error = if *req.method() == Method::PUT {
            "An error occurred while updating the transaction"
        } else {
            "An error occurred while adding the transaction"
        };
        return internal_error(error, ErrorBody { error });
    }
    internal_error("Internal server error", message("Internal server error"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .service(upsert_wallet)
            .service(get_wallet)
            .service(get_transactions)
            .service(add_transaction)
            .service(update_transaction),
    );
}
