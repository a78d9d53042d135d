// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::orders::{ChecklistEntry, OrderAssignee, OrderDetail, OrderItem, OrderStatus, RentalOrder},
    services::lifecycle_service::AdvanceOutcome,
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateOrder
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[schema(example = "2026-09-05")]
    pub issue_date: Option<NaiveDate>,

    #[schema(example = "2026-09-12")]
    pub return_due_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "0.00")]
    pub discount: Decimal,

    #[schema(example = "Casamento no salão Vidubich")]
    pub notes: Option<String>,
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado em rascunho", body = RentalOrder)
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state
        .orders_service
        .create_order(
            payload.issue_date,
            payload.return_due_date,
            payload.discount,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedido com itens, checklist e responsáveis", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.orders_service.get_detail(order_id).await?;
    Ok(Json(detail))
}

// ---
// Payload: AddItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemPayload {
    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    #[schema(example = "VAS-0042")]
    pub sku: String,

    #[validate(length(min = 2, message = "O nome deve ter pelo menos 2 caracteres."))]
    #[schema(example = "Vaso de cerâmica azul")]
    pub name: String,

    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    #[schema(example = 4)]
    pub ordered_qty: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "120.00")]
    pub rent_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "300.00")]
    pub deposit_value: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "950.00")]
    pub replacement_value: Decimal,

    pub serial_numbers: Option<Vec<String>>,
}

// POST /api/orders/{id}/items
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/items",
    tag = "Orders",
    request_body = AddItemPayload,
    responses(
        (status = 201, description = "Item adicionado ao pedido", body = OrderItem),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn add_item(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AddItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .orders_service
        .add_item(
            order_id,
            &payload.sku,
            &payload.name,
            payload.ordered_qty,
            payload.rent_price,
            payload.deposit_value,
            payload.replacement_value,
            payload.serial_numbers.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

// ---
// Payload: UpdateItemQuantities (separação e devolução)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemQuantitiesPayload {
    #[schema(example = 4)]
    pub picked_qty: Option<i32>,

    #[schema(example = 3)]
    pub returned_qty: Option<i32>,

    pub scanned_serials: Option<Vec<String>>,
}

// PATCH /api/items/{id}
#[utoipa::path(
    patch,
    path = "/api/items/{item_id}",
    tag = "Orders",
    request_body = UpdateItemQuantitiesPayload,
    responses(
        (status = 200, description = "Quantidades do item atualizadas", body = OrderItem),
        (status = 404, description = "Item não encontrado")
    ),
    params(
        ("item_id" = Uuid, Path, description = "ID do Item")
    )
)]
pub async fn update_item_quantities(
    State(app_state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemQuantitiesPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .orders_service
        .update_item_quantities(
            item_id,
            payload.picked_qty,
            payload.returned_qty,
            payload.scanned_serials.as_deref(),
        )
        .await?;

    Ok(Json(item))
}

// DELETE /api/items/{id}
#[utoipa::path(
    delete,
    path = "/api/items/{item_id}",
    tag = "Orders",
    responses(
        (status = 204, description = "Item removido do pedido"),
        (status = 404, description = "Item não encontrado")
    ),
    params(
        ("item_id" = Uuid, Path, description = "ID do Item")
    )
)]
pub async fn remove_item(
    State(app_state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.orders_service.remove_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Payload: AddChecklistEntry
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddChecklistEntryPayload {
    #[validate(length(min = 2, message = "O rótulo deve ter pelo menos 2 caracteres."))]
    #[schema(example = "Conferir caixas de transporte")]
    pub label: String,

    #[serde(default)]
    #[schema(example = true)]
    pub required: bool,
}

// POST /api/orders/{id}/checklist
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/checklist",
    tag = "Orders",
    request_body = AddChecklistEntryPayload,
    responses(
        (status = 201, description = "Entrada de checklist criada", body = ChecklistEntry),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn add_checklist_entry(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AddChecklistEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state
        .orders_service
        .add_checklist_entry(order_id, &payload.label, payload.required)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// ---
// Payload: SetChecklistChecked
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetChecklistCheckedPayload {
    #[schema(example = true)]
    pub checked: bool,
}

// PATCH /api/checklist/{id}
#[utoipa::path(
    patch,
    path = "/api/checklist/{entry_id}",
    tag = "Orders",
    request_body = SetChecklistCheckedPayload,
    responses(
        (status = 200, description = "Entrada de checklist marcada/desmarcada", body = ChecklistEntry),
        (status = 404, description = "Entrada não encontrada")
    ),
    params(
        ("entry_id" = Uuid, Path, description = "ID da Entrada de Checklist")
    )
)]
pub async fn set_checklist_checked(
    State(app_state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<SetChecklistCheckedPayload>,
) -> Result<impl IntoResponse, AppError> {
    let entry = app_state
        .orders_service
        .set_checklist_checked(entry_id, payload.checked)
        .await?;

    Ok(Json(entry))
}

// ---
// Payload: AddAssignee
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAssigneePayload {
    #[validate(length(min = 2, message = "O nome deve ter pelo menos 2 caracteres."))]
    #[schema(example = "Oksana Melnyk")]
    pub staff_name: String,

    #[validate(length(min = 1, message = "O papel é obrigatório."))]
    #[schema(example = "requisitor")]
    pub role: String,
}

// POST /api/orders/{id}/assignees
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/assignees",
    tag = "Orders",
    request_body = AddAssigneePayload,
    responses(
        (status = 201, description = "Responsável atribuído ao pedido", body = OrderAssignee),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn add_assignee(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AddAssigneePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let assignee = app_state
        .orders_service
        .add_assignee(order_id, &payload.staff_name, &payload.role)
        .await?;

    Ok((StatusCode::CREATED, Json(assignee)))
}

// ---
// Payload: AdvanceOrder
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceOrderPayload {
    #[schema(example = "ISSUED")]
    pub target: OrderStatus,
}

// POST /api/orders/{id}/advance
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/advance",
    tag = "Orders",
    request_body = AdvanceOrderPayload,
    responses(
        (status = 200, description = "Pedido avançado; avisos não-bloqueantes inclusos", body = AdvanceOutcome),
        (status = 409, description = "Transição ilegal ou pré-condição de negócio falhou"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn advance_order(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AdvanceOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .lifecycle_service
        .advance(order_id, payload.target)
        .await?;

    Ok(Json(outcome))
}
