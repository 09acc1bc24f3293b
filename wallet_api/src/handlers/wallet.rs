use actix_web::{Error, HttpResponse, error::InternalError, get, post, web};
use common::UpsertOutcome;
use serde::Deserialize;

use super::{internal_error, message};
use crate::state::AppState;

const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Deserialize)]
pub struct WalletPayload {
    pub address: String,
    pub balance: f64,
    pub withdrawable: f64,
}

#[post("/wallet")]
pub async fn upsert_wallet(
    payload: web::Json<WalletPayload>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let outcome = app_state
        .db
        .upsert_wallet(&payload.address, payload.balance, payload.withdrawable)
        .await
        .map_err(|e| {
            log::error!("Failed to save wallet {}: {:#}", payload.address, e);
            internal_error(INTERNAL_SERVER_ERROR, message(INTERNAL_SERVER_ERROR))
        })?;

    let body = match outcome {
        UpsertOutcome::Inserted => message("Data inserted successfully"),
        UpsertOutcome::Updated => message("Data updated successfully"),
    };
    Ok(HttpResponse::Ok().json(body))
}

#[get("/wallet/{wallet_address}")]
pub async fn get_wallet(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let wallet_address = path.into_inner();

    let maybe_wallet = app_state.db.get_wallet(&wallet_address).await.map_err(|e| {
        log::error!("Database error fetching wallet {}: {:#}", wallet_address, e);
        internal_error(INTERNAL_SERVER_ERROR, message(INTERNAL_SERVER_ERROR))
    })?;

    match maybe_wallet {
        Some(wallet) => Ok(HttpResponse::Ok().json(wallet)),
        None => {
            log::warn!("Wallet not found: {}", wallet_address);
            Err(InternalError::from_response(
                "Wallet not found",
                HttpResponse::NotFound().json(message("Wallet not found")),
            )
            .into())
        }
    }
}
