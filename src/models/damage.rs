// src/models/damage.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

/// Etapa do ciclo em que o achado foi registrado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "damage_stage", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum DamageStage {
    PreIssue, // Conferência antes da entrega
    Return,   // Recebimento da devolução
    Audit,    // Auditoria posterior
}

/// Status do caso de dano. Só avança para frente; o único salto permitido é
/// pular o cliente direto para awaiting_payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "damage_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DamageCaseStatus {
    Draft,
    AwaitingClient,
    AwaitingPayment,
    InRepair,
    Closed,
}

impl DamageCaseStatus {
    /// Posição na cadeia draft → awaiting_client → awaiting_payment → in_repair → closed.
    pub fn rank(&self) -> u8 {
        match self {
            DamageCaseStatus::Draft => 0,
            DamageCaseStatus::AwaitingClient => 1,
            DamageCaseStatus::AwaitingPayment => 2,
            DamageCaseStatus::InRepair => 3,
            DamageCaseStatus::Closed => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "damage_severity", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DamageSeverity {
    Low,
    Medium,
    High,
    Critical, // Item perdido para o estoque
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DamageCase {
    pub id: Uuid,
    pub order_id: Uuid,
    pub stage: DamageStage,
    pub status: DamageCaseStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Achado individual de dano, amarrado a um item do pedido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DamageLine {
    pub id: Uuid,
    pub case_id: Uuid,
    pub order_item_id: Uuid,

    #[schema(example = "textile")]
    pub category: String,

    #[schema(example = "tear")]
    pub kind_code: String,

    pub severity: DamageSeverity,

    #[schema(example = 2)]
    pub qty: i32,

    #[schema(example = "120.00")]
    pub amount_per_unit: Decimal,

    /// Sempre amount_per_unit × qty, calculado na gravação. Não é recalculado
    /// depois: uma edição posterior de qty não pode alterar totais históricos
    /// em silêncio.
    #[schema(example = "240.00")]
    pub total: Decimal,

    pub note: Option<String>,

    #[schema(example = "photos/dmg-20240310-01.jpg")]
    pub photo_ref: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

// --- Efeitos comprometidos ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryEffect {
    /// Estoque congelado enquanto o caso estiver aberto.
    StockFrozen,
    /// Quantidade baixada do estoque (perda definitiva).
    QuantityWrittenOff,
}

/// Efeito de inventário que o caso causou. A exclusão do caso é
/// responsabilidade de um colaborador externo, mas a reversão precisa ser
/// bem-definida: esta lista diz exatamente o que desfazer.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommittedEffect {
    pub order_item_id: Uuid,
    #[schema(example = 2)]
    pub qty: i32,
    pub effect: InventoryEffect,
}
