// src/handlers/damage.rs

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
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::damage::{
        CommittedEffect, DamageCase, DamageCaseStatus, DamageLine, DamageSeverity, DamageStage,
    },
    models::fees::FeeRule,
};

use super::settlement::validate_positive;

// ---
// Payload: AddDamageLine
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDamageLinePayload {
    #[schema(example = "RETURN")]
    pub stage: DamageStage,

    pub order_item_id: Uuid,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    #[schema(example = "glassware")]
    pub category: String,

    #[validate(length(min = 1, message = "O código do tipo de dano é obrigatório."))]
    #[schema(example = "chip")]
    pub kind_code: String,

    #[schema(example = "MEDIUM")]
    pub severity: DamageSeverity,

    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    #[schema(example = 2)]
    pub qty: i32,

    /// Valor unitário proposto pelo operador; ausente usa o padrão da política.
    #[schema(example = "80.00")]
    pub proposed_per_unit: Option<Decimal>,

    #[schema(example = "Lascado na borda superior")]
    pub note: Option<String>,

    #[schema(example = "photos/2026/08/chip-0042.jpg")]
    pub photo_ref: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DamageLineCreated {
    pub case: DamageCase,
    pub line: DamageLine,
}

// POST /api/orders/{id}/damage-lines
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/damage-lines",
    tag = "Damage",
    request_body = AddDamageLinePayload,
    responses(
        (status = 201, description = "Linha de dano criada no caso da etapa informada", body = DamageLineCreated),
        (status = 422, description = "Valor proposto abaixo do piso da política"),
        (status = 404, description = "Pedido, item ou política não encontrados")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn add_damage_line(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AddDamageLinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (case, line) = app_state
        .damage_service
        .add_damage_line(
            order_id,
            payload.stage,
            payload.order_item_id,
            &payload.category,
            &payload.kind_code,
            payload.severity,
            payload.qty,
            payload.proposed_per_unit,
            payload.note.as_deref(),
            payload.photo_ref.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DamageLineCreated { case, line })))
}

// ---
// Payload: UpdateLineAmount
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLineAmountPayload {
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "95.00")]
    pub proposed_per_unit: Decimal,
}

// PATCH /api/damage-lines/{id}
#[utoipa::path(
    patch,
    path = "/api/damage-lines/{line_id}",
    tag = "Damage",
    request_body = UpdateLineAmountPayload,
    responses(
        (status = 200, description = "Valor da linha revalidado contra a política e regravado", body = DamageLine),
        (status = 422, description = "Valor proposto abaixo do piso da política"),
        (status = 404, description = "Linha não encontrada")
    ),
    params(
        ("line_id" = Uuid, Path, description = "ID da Linha de Dano")
    )
)]
pub async fn update_line_amount(
    State(app_state): State<AppState>,
    Path(line_id): Path<Uuid>,
    Json(payload): Json<UpdateLineAmountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let line = app_state
        .damage_service
        .update_line_amount(line_id, payload.proposed_per_unit)
        .await?;

    Ok(Json(line))
}

// ---
// Payload: AdvanceCase
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceCasePayload {
    #[schema(example = "AWAITING_PAYMENT")]
    pub target: DamageCaseStatus,
}

// POST /api/damage-cases/{id}/advance
#[utoipa::path(
    post,
    path = "/api/damage-cases/{case_id}/advance",
    tag = "Damage",
    request_body = AdvanceCasePayload,
    responses(
        (status = 200, description = "Caso avançado (só para frente)", body = DamageCase),
        (status = 409, description = "Transição de caso ilegal"),
        (status = 404, description = "Caso não encontrado")
    ),
    params(
        ("case_id" = Uuid, Path, description = "ID do Caso de Dano")
    )
)]
pub async fn advance_case(
    State(app_state): State<AppState>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<AdvanceCasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state
        .damage_service
        .advance_case_status(case_id, payload.target)
        .await?;

    Ok(Json(case))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseWithLines {
    #[serde(flatten)]
    pub case: DamageCase,
    pub lines: Vec<DamageLine>,
}

// GET /api/damage-cases/{id}
#[utoipa::path(
    get,
    path = "/api/damage-cases/{case_id}",
    tag = "Damage",
    responses(
        (status = 200, description = "Caso com suas linhas", body = CaseWithLines),
        (status = 404, description = "Caso não encontrado")
    ),
    params(
        ("case_id" = Uuid, Path, description = "ID do Caso de Dano")
    )
)]
pub async fn get_case(
    State(app_state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (case, lines) = app_state.damage_service.get_case_with_lines(case_id).await?;
    Ok(Json(CaseWithLines { case, lines }))
}

// GET /api/damage-cases/{id}/effects
#[utoipa::path(
    get,
    path = "/api/damage-cases/{case_id}/effects",
    tag = "Damage",
    responses(
        (status = 200, description = "Efeitos de inventário comprometidos pelo caso", body = Vec<CommittedEffect>),
        (status = 404, description = "Caso não encontrado")
    ),
    params(
        ("case_id" = Uuid, Path, description = "ID do Caso de Dano")
    )
)]
pub async fn get_committed_effects(
    State(app_state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let effects = app_state.damage_service.committed_effects(case_id).await?;
    Ok(Json(effects))
}

// GET /api/fee-policies
#[utoipa::path(
    get,
    path = "/api/fee-policies",
    tag = "Damage",
    responses(
        (status = 200, description = "Catálogo de políticas de taxa em vigor", body = Vec<FeeRule>)
    )
)]
pub async fn list_fee_policies(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.fee_table.rules().to_vec()))
}
