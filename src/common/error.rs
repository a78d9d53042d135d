use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::models::damage::DamageCaseStatus;
use crate::models::orders::OrderStatus;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
//
// Regra da casa: toda rejeição de domínio carrega o limite corretivo (piso,
// teto, quanto falta) para o chamador poder se corrigir sozinho. Nada de
// falhar com mensagem genérica tendo tanto contexto de domínio à mão.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Taxas de dano ---
    #[error("Valor abaixo do piso da política ({floor})")]
    FeeBelowFloor { floor: Decimal },

    #[error("Política de taxa desconhecida para ({category}, {kind_code})")]
    UnknownFeePolicy { category: String, kind_code: String },

    // --- Acerto financeiro ---
    #[error("Caução insuficiente em {currency}: pedido {requested}, disponível {available}")]
    InsufficientHeld {
        requested: Decimal,
        available: Decimal,
        shortfall: Decimal,
        currency: String,
    },

    #[error("Nada a cobrar: o valor calculado já foi cobrado integralmente")]
    NothingToCharge,

    #[error("O valor deve ser maior que zero")]
    NonPositiveAmount,

    // --- Ciclo de vida ---
    #[error("Transição inválida: {from:?} → {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Pré-condição não atendida: {condition}")]
    PreconditionFailed {
        condition: String,
        details: Vec<String>,
    },

    #[error("Transição de caso inválida: {from:?} → {to:?}")]
    InvalidCaseTransition {
        from: DamageCaseStatus,
        to: DamageCaseStatus,
    },

    // --- Devolução parcial ---
    #[error("Conflito de versão: {0}")]
    VersionConflict(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Um ou mais campos são inválidos.",
                        "details": details,
                    }),
                )
            }

            AppError::FeeBelowFloor { floor } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "O valor proposto está abaixo do piso da política.",
                    "floor": floor,
                }),
            ),

            AppError::UnknownFeePolicy { category, kind_code } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "Não há política de taxa cadastrada para esta combinação.",
                    "category": category,
                    "kindCode": kind_code,
                }),
            ),

            AppError::InsufficientHeld {
                requested,
                available,
                shortfall,
                currency,
            } => (
                // O chamador recebe o disponível para oferecer a ação corrigida
                // ("liberar o que resta" em vez do valor pedido).
                StatusCode::CONFLICT,
                json!({
                    "error": "Caução insuficiente para a operação.",
                    "requested": requested,
                    "available": available,
                    "shortfall": shortfall,
                    "currency": currency,
                }),
            ),

            AppError::NothingToCharge => (
                StatusCode::CONFLICT,
                json!({ "error": "O valor calculado já foi cobrado integralmente." }),
            ),

            AppError::NonPositiveAmount => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "O valor deve ser maior que zero." }),
            ),

            AppError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "Transição de status inválida.",
                    "from": from,
                    "to": to,
                }),
            ),

            AppError::PreconditionFailed { condition, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": format!("Pré-condição não atendida: {}", condition),
                    "details": details,
                }),
            ),

            AppError::InvalidCaseTransition { from, to } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "Status do caso de dano só avança para frente.",
                    "from": from,
                    "to": to,
                }),
            ),

            AppError::VersionConflict(msg) => (
                StatusCode::CONFLICT,
                json!({ "error": msg }),
            ),

            AppError::ResourceNotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{} não encontrado.", what) }),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Ocorreu um erro inesperado." }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
