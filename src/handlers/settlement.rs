// src/handlers/settlement.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::ledger::{LedgerSummary, TransactionReportRow, DEFAULT_CURRENCY},
};

// ---
// Validação Customizada
// ---
pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// ---
// Visão do razão devolvida por todas as operações de acerto
// ---
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    #[serde(flatten)]
    pub summary: LedgerSummary,
    pub transactions: Vec<TransactionReportRow>,
}

// GET /api/orders/{id}/ledger
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}/ledger",
    tag = "Settlement",
    responses(
        (status = 200, description = "Visão derivada do razão + histórico em partidas dobradas", body = LedgerView)
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn get_ledger(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let txs = app_state.settlement_service.history(order_id).await?;
    let summary = crate::services::ledger::summarize(&txs);
    let transactions = txs.iter().map(TransactionReportRow::from).collect();

    Ok(Json(LedgerView {
        summary,
        transactions,
    }))
}

// ---
// Payload: RecordPayment
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentPayload {
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "500.00")]
    pub amount: Decimal,

    #[serde(default = "default_currency")]
    #[schema(example = "UAH")]
    pub currency: String,

    #[validate(length(min = 1, message = "O canal de pagamento é obrigatório."))]
    #[schema(example = "cash")]
    pub method: String,
}

// POST /api/orders/{id}/payments
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/payments",
    tag = "Settlement",
    request_body = RecordPaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado; visão do razão atualizada", body = LedgerSummary)
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let summary = app_state
        .settlement_service
        .record_payment(order_id, payload.amount, &payload.currency, &payload.method)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

// ---
// Payload: caução (hold / writeoff / release compartilham a forma)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositPayload {
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "1500.00")]
    pub amount: Decimal,

    #[serde(default = "default_currency")]
    #[schema(example = "UAH")]
    pub currency: String,
}

// POST /api/orders/{id}/deposit/hold
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/deposit/hold",
    tag = "Settlement",
    request_body = DepositPayload,
    responses(
        (status = 201, description = "Caução retida", body = LedgerSummary)
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn hold_deposit(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<DepositPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let summary = app_state
        .settlement_service
        .hold_deposit(order_id, payload.amount, &payload.currency)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

// POST /api/orders/{id}/deposit/writeoff
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/deposit/writeoff",
    tag = "Settlement",
    request_body = DepositPayload,
    responses(
        (status = 201, description = "Caução baixada contra o saldo devedor (par payment + writeoff)", body = LedgerSummary),
        (status = 409, description = "Caução insuficiente; resposta traz o disponível e a diferença")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn writeoff_deposit(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<DepositPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let summary = app_state
        .settlement_service
        .writeoff_deposit(order_id, payload.amount, &payload.currency)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

// POST /api/orders/{id}/deposit/release
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/deposit/release",
    tag = "Settlement",
    request_body = DepositPayload,
    responses(
        (status = 201, description = "Caução devolvida ao cliente; saldo devedor intocado", body = LedgerSummary),
        (status = 409, description = "Caução insuficiente; resposta traz o disponível e a diferença")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn release_deposit(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<DepositPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let summary = app_state
        .settlement_service
        .release_deposit(order_id, payload.amount, &payload.currency)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

// ---
// Payload: AccrueCharge (dano avulso ou aluguel)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccrueChargePayload {
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "300.00")]
    pub amount: Decimal,

    #[serde(default = "default_currency")]
    #[schema(example = "UAH")]
    pub currency: String,

    #[schema(example = "Vaso lascado na devolução")]
    pub note: Option<String>,
}

// POST /api/orders/{id}/damage-fees
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/damage-fees",
    tag = "Settlement",
    request_body = AccrueChargePayload,
    responses(
        (status = 201, description = "Taxa de dano lançada no saldo devedor", body = LedgerSummary)
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn accrue_damage(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AccrueChargePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let summary = app_state
        .settlement_service
        .accrue_damage(
            order_id,
            payload.amount,
            &payload.currency,
            payload.note.as_deref().unwrap_or("Taxa de dano"),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

// POST /api/orders/{id}/rent
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/rent",
    tag = "Settlement",
    request_body = AccrueChargePayload,
    responses(
        (status = 201, description = "Aluguel devido lançado no razão", body = LedgerSummary)
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn accrue_rent(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AccrueChargePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let summary = app_state
        .settlement_service
        .accrue_rent(order_id, payload.amount, &payload.currency, payload.note.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}
