use actix_web::{Error, HttpResponse, get, post, put, web};
use common::{NewTransaction, TransactionUpdate};
use serde::Deserialize;

use super::{ErrorBody, internal_error, message};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct TransactionQuery {
    #[serde(rename = "walletAddress")]
    wallet_address: Option<String>,
}

#[get("/transactions")]
pub async fn get_transactions(
    query: web::Query<TransactionQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    // Without an address nothing can match.
    let Some(wallet_address) = query.wallet_address.as_deref() else {
        return Ok(HttpResponse::Ok().json(Vec::<common::Transaction>::new()));
    };

    let transactions = app_state
        .db
        .get_transactions_by_wallet(wallet_address)
        .await
        .map_err(|e| {
            log::error!("Failed to get transactions for {}: {:#}", wallet_address, e);
            let error = "An error occurred while fetching transactions";
            internal_error(error, ErrorBody { error })
        })?;

    Ok(HttpResponse::Ok().json(transactions))
}

#[post("/transactions")]
pub async fn add_transaction(
    payload: web::Json<NewTransaction>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let saved = app_state.db.add_transaction(&payload).await.map_err(|e| {
        log::error!(
            "Failed to add transaction for {}: {:#}",
            payload.wallet_address,
            e
        );
        let error = "An error occurred while adding the transaction";
        internal_error(error, ErrorBody { error })
    })?;
    log::info!(
        "Added transaction id={} for wallet {}",
        saved.id,
        saved.wallet_address
    );

    Ok(HttpResponse::Ok().json(message("Transaction added successfully")))
}

#[put("/transactions")]
pub async fn update_transaction(
    payload: web::Json<TransactionUpdate>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let affected = app_state
        .db
        .update_transaction(&payload)
        .await
        .map_err(|e| {
            log::error!(
                "Failed to update transaction {} for {}: {:#}",
                payload.id,
                payload.wallet_address,
                e
            );
            let error = "An error occurred while updating the transaction";
            internal_error(error, ErrorBody { error })
        })?;

    if affected == 0 {
        log::warn!(
            "No transaction with id={} for wallet {}; nothing updated",
            payload.id,
            payload.wallet_address
        );
    }

    Ok(HttpResponse::Ok().json(message("Transaction updated successfully")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use common::MemoryStore;
    use serde_json::{Value, json};

    use crate::handlers::configure;
    use crate::state::AppState;

    fn state(store: MemoryStore) -> web::Data<AppState> {
        web::Data::new(AppState::new(Arc::new(store)))
    }

    #[actix_web::test]
    async fn add_then_list_newest_first() {
        let app = test::init_service(
            App::new()
                .app_data(state(MemoryStore::new()))
                .configure(configure),
        )
        .await;

        for (kind, value) in [("deposit", 10.0), ("withdraw", 4.5)] {
            let req = test::TestRequest::post()
                .uri("/api/transactions")
                .set_json(json!({
                    "wallet_address": "0xA",
                    "status": "pending",
                    "type": kind,
                    "value": value,
                }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body, json!({"message": "Transaction added successfully"}));
        }

        let req = test::TestRequest::get()
            .uri("/api/transactions?walletAddress=0xA")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let rows = body.as_array().expect("array of transactions");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["type"], "withdraw");
        assert_eq!(rows[0]["id"], 2);
        assert_eq!(rows[1]["type"], "deposit");
        assert_eq!(rows[1]["wallet_address"], "0xA");
        assert!(rows[0]["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn list_for_unknown_or_missing_wallet_is_empty() {
        let app = test::init_service(
            App::new()
                .app_data(state(MemoryStore::new()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/transactions?walletAddress=0xNobody")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));

        let req = test::TestRequest::get().uri("/api/transactions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn update_overwrites_matching_row_and_ignores_mismatch() {
        let app = test::init_service(
            App::new()
                .app_data(state(MemoryStore::new()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/transactions")
            .set_json(json!({
                "wallet_address": "0xA",
                "status": "pending",
                "type": "deposit",
                "value": 10.0,
            }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/transactions")
            .set_json(json!({
                "id": 1,
                "wallet_address": "0xB",
                "status": "done",
                "type": "deposit",
                "value": 99.0,
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"message": "Transaction updated successfully"}));

        let req = test::TestRequest::get()
            .uri("/api/transactions?walletAddress=0xA")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["status"], "pending");
        assert_eq!(body[0]["value"], 10.0);

        let req = test::TestRequest::put()
            .uri("/api/transactions")
            .set_json(json!({
                "id": 1,
                "wallet_address": "0xA",
                "status": "done",
                "type": "deposit",
                "value": 12.5,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/transactions?walletAddress=0xA")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["status"], "done");
        assert_eq!(body[0]["value"], 12.5);
    }

    #[actix_web::test]
    async fn store_failures_map_to_error_bodies() {
        let app = test::init_service(
            App::new()
                .app_data(state(MemoryStore::unavailable()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/transactions?walletAddress=0xA")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"error": "An error occurred while fetching transactions"})
        );

        let req = test::TestRequest::post()
            .uri("/api/transactions")
            .set_json(json!({
                "wallet_address": "0xA",
                "status": "pending",
                "type": "deposit",
                "value": 1.0,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let req = test::TestRequest::put()
            .uri("/api/transactions")
            .set_json(json!({
                "id": 1,
                "wallet_address": "0xA",
                "status": "done",
                "type": "deposit",
                "value": 1.0,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn malformed_transaction_bodies_map_to_error_bodies() {
        let app = test::init_service(
            App::new()
                .app_data(state(MemoryStore::new()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/transactions")
            .set_json(json!({"wallet_address": "0xA", "status": "pending", "type": "deposit"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"error": "An error occurred while adding the transaction"})
        );

        let req = test::TestRequest::put()
            .uri("/api/transactions")
            .set_json(json!({
                "id": "one",
                "wallet_address": "0xA",
                "status": "done",
                "type": "deposit",
                "value": 1.0,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"error": "An error occurred while updating the transaction"})
        );

        let req = test::TestRequest::get()
            .uri("/api/transactions?walletAddress=0xA")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }
}
