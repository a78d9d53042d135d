// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

/// Ciclo de vida do pedido de aluguel.
/// draft → processing → ready_for_issue → issued → return_intake → settled,
/// com archived como terminal paralelo a partir de settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum OrderStatus {
    Draft,
    Processing,    // Separação no depósito
    ReadyForIssue, // Separado e conferido
    Issued,        // Entregue ao cliente
    ReturnIntake,  // Recebimento da devolução
    Settled,       // Acertado financeiramente
    Archived,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalOrder {
    pub id: Uuid,

    #[schema(example = 1024)]
    pub display_id: i32,

    pub status: OrderStatus,

    #[schema(value_type = String, format = Date, example = "2024-03-01")]
    pub issue_date: Option<NaiveDate>,

    #[schema(value_type = String, format = Date, example = "2024-03-10")]
    pub return_due_date: Option<NaiveDate>,

    #[schema(example = "0.00")]
    pub discount: Decimal,

    pub notes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Item do pedido. O razão e os casos de dano referenciam o pedido apenas por
/// order_id; a posse do item é da camada de gestão de pedidos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,

    #[schema(example = "CAD-0042")]
    pub sku: String,

    #[schema(example = "Cadeira Luís XV dourada")]
    pub name: String,

    #[schema(example = 10)]
    pub ordered_qty: i32,

    #[schema(example = 10)]
    pub picked_qty: i32,

    #[schema(example = 6)]
    pub returned_qty: i32,

    /// Preço de aluguel por unidade.
    #[schema(example = "100.00")]
    pub rent_price: Decimal,

    /// Exposição de caução por unidade.
    #[schema(example = "150.00")]
    pub deposit_value: Decimal,

    /// Valor de reposição integral, base dos tetos das políticas de taxa.
    #[schema(example = "800.00")]
    pub replacement_value: Decimal,

    /// Seriais cadastrados (itens serializados).
    pub serial_numbers: Option<Vec<String>>,

    /// Seriais efetivamente bipados na separação. Incompleto é aviso, não bloqueio.
    pub scanned_serials: Option<Vec<String>>,
}

/// Entrada de checklist da separação. Só as obrigatórias bloqueiam a
/// liberação; as demais geram aviso.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistEntry {
    pub id: Uuid,
    pub order_id: Uuid,

    #[schema(example = "Conferir embalagem")]
    pub label: String,

    #[schema(example = true)]
    pub required: bool,

    #[schema(example = false)]
    pub checked: bool,
}

/// Funcionário alocado ao pedido. "requisitor" é quem separa/recebe no depósito.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderAssignee {
    pub id: Uuid,
    pub order_id: Uuid,

    #[schema(example = "Olena K.")]
    pub staff_name: String,

    #[schema(example = "requisitor")]
    pub role: String,
}

/// Pedido completo com os agregados que o motor consome.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: RentalOrder,
    pub items: Vec<OrderItem>,
    pub checklist: Vec<ChecklistEntry>,
    pub assignees: Vec<OrderAssignee>,
}
