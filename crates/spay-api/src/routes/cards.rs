//! # Card and wallet routes
//!
//! Each handler makes exactly one adapter call and returns its record as
//! JSON. Adapter failures become the error envelope via [`AppError`].
//!
//! | Method | Path | Adapter operation |
//! |---|---|---|
//! | GET | `/cards` | `list_cards` |
//! | GET | `/wallet/balance` | `wallet_balance` |
//! | GET | `/card/:card_issuer_id/balance` | `get_card_balance` |
//! | POST | `/card/:card_issuer_id/load` | `load_card` |
//! | POST | `/card/:card_issuer_id/unload` | `unload_card` |
//! | POST | `/card/:card_issuer_id/activate` | `activate_card` |
//! | POST | `/card/:card_issuer_id/deactivate` | `deactivate_card` |
//! | POST | `/card/:card_number_id/assign` | `assign_card` |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use spay_provider_client::ProviderError;
use spay_provider_client::types::{
    Amount, CardBalanceResponse, ListCardResponse, OperationResponse, ShopperCardData,
    WalletBalanceResponse,
};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cards", get(list_cards))
        .route("/wallet/balance", get(wallet_balance))
        .route("/card/:card_issuer_id/balance", get(get_card_balance))
        .route("/card/:card_issuer_id/load", post(load_card))
        .route("/card/:card_issuer_id/unload", post(unload_card))
        .route("/card/:card_issuer_id/activate", post(activate_card))
        .route("/card/:card_issuer_id/deactivate", post(deactivate_card))
        // Same segment as the issuer id; for assignment it carries the
        // physical card number id.
        .route("/card/:card_issuer_id/assign", post(assign_card))
}

/// Body of load and unload requests.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Amount,
}

fn adapter_error(state: &AppState) -> impl FnOnce(ProviderError) -> AppError + '_ {
    move |err| AppError::provider(state.adapter.name(), err)
}

async fn list_cards(State(state): State<AppState>) -> Result<Json<ListCardResponse>, AppError> {
    let cards = state.adapter.list_cards().await.map_err(adapter_error(&state))?;
    Ok(Json(cards))
}

async fn wallet_balance(
    State(state): State<AppState>,
) -> Result<Json<WalletBalanceResponse>, AppError> {
    let balance = state
        .adapter
        .wallet_balance()
        .await
        .map_err(adapter_error(&state))?;
    Ok(Json(balance))
}

async fn get_card_balance(
    State(state): State<AppState>,
    Path(card_issuer_id): Path<String>,
) -> Result<Json<CardBalanceResponse>, AppError> {
    let balance = state
        .adapter
        .get_card_balance(&card_issuer_id)
        .await
        .map_err(adapter_error(&state))?;
    Ok(Json(balance))
}

async fn load_card(
    State(state): State<AppState>,
    Path(card_issuer_id): Path<String>,
    body: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let req = extract_json(body)?;
    let response = state
        .adapter
        .load_card(&card_issuer_id, &req.amount)
        .await
        .map_err(adapter_error(&state))?;
    Ok(Json(response))
}

async fn unload_card(
    State(state): State<AppState>,
    Path(card_issuer_id): Path<String>,
    body: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let req = extract_json(body)?;
    let response = state
        .adapter
        .unload_card(&card_issuer_id, &req.amount)
        .await
        .map_err(adapter_error(&state))?;
    Ok(Json(response))
}

async fn activate_card(
    State(state): State<AppState>,
    Path(card_issuer_id): Path<String>,
) -> Result<Json<OperationResponse>, AppError> {
    let response = state
        .adapter
        .activate_card(&card_issuer_id)
        .await
        .map_err(adapter_error(&state))?;
    Ok(Json(response))
}

async fn deactivate_card(
    State(state): State<AppState>,
    Path(card_issuer_id): Path<String>,
) -> Result<Json<OperationResponse>, AppError> {
    let response = state
        .adapter
        .deactivate_card(&card_issuer_id)
        .await
        .map_err(adapter_error(&state))?;
    Ok(Json(response))
}

async fn assign_card(
    State(state): State<AppState>,
    Path(card_number_id): Path<String>,
    body: Result<Json<ShopperCardData>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let shopper = extract_json(body)?;
    let response = state
        .adapter
        .assign_card(&card_number_id, &shopper)
        .await
        .map_err(adapter_error(&state))?;
    Ok(Json(response))
}
