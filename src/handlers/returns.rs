// src/handlers/returns.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::ledger::LedgerSummary,
    models::returns::VersionWithQuote,
    services::returns_service::CloseOutcome,
};

// POST /api/orders/{id}/return/close
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/return/close",
    tag = "Returns",
    responses(
        (status = 200, description = "Devolução coberta por completo; pedido acertado", body = CloseOutcome),
        (status = 201, description = "Devolução parcial; versão nova gerada com a sobra", body = CloseOutcome),
        (status = 409, description = "Pedido fora da etapa de recebimento"),
        (status = 422, description = "Cobertura total, mas com pendência financeira que impede o acerto"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn close_return(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.returns_service.close_return(order_id).await?;

    let status = if outcome.forked_version.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

// GET /api/orders/{id}/return-versions
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}/return-versions",
    tag = "Returns",
    responses(
        (status = 200, description = "Versões do pedido, cada uma com a cotação de atraso do dia", body = Vec<VersionWithQuote>)
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn list_return_versions(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let versions = app_state.returns_service.versions_with_quotes(order_id).await?;
    Ok(Json(versions))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeOverdueResponse {
    pub version: VersionWithQuote,
    pub ledger: LedgerSummary,
}

// POST /api/return-versions/{id}/charge-overdue
#[utoipa::path(
    post,
    path = "/api/return-versions/{version_id}/charge-overdue",
    tag = "Returns",
    responses(
        (status = 201, description = "Diferença positiva da multa lançada no razão", body = ChargeOverdueResponse),
        (status = 409, description = "Versão não está ativa ou não há diferença a cobrar"),
        (status = 404, description = "Versão não encontrada")
    ),
    params(
        ("version_id" = Uuid, Path, description = "ID da Versão de Devolução")
    )
)]
pub async fn charge_overdue(
    State(app_state): State<AppState>,
    Path(version_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (version, ledger) = app_state.returns_service.charge_overdue(version_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ChargeOverdueResponse { version, ledger }),
    ))
}
