// src/models/returns.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "version_status", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum VersionStatus {
    Active,
    /// A contabilidade desta versão está fechada, o que não significa que tudo
    /// voltou: a sobra segue na versão seguinte.
    Returned,
    Archived,
}

// --- Structs ---

/// Item ainda não devolvido, carregado para a versão seguinte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShortfallItem {
    pub order_item_id: Uuid,

    #[schema(example = "CAD-0042")]
    pub sku: String,

    #[schema(example = "Cadeira Luís XV dourada")]
    pub name: String,

    /// Quantidade em falta (alugada − devolvida).
    #[schema(example = 4)]
    pub qty: i32,
}

/// Versão de devolução parcial. No máximo uma versão Active por pedido;
/// fechar uma versão ou encerra o pedido ou gera a versão n+1 com a sobra.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnVersion {
    pub id: Uuid,
    pub parent_order_id: Uuid,

    #[schema(example = 2)]
    pub version_number: i32,

    pub status: VersionStatus,

    #[schema(value_type = Vec<ShortfallItem>)]
    pub items: Json<Vec<ShortfallItem>>,

    /// Data de devolução original, base do cálculo de atraso.
    #[schema(value_type = String, format = Date, example = "2024-03-10")]
    pub return_due_date: NaiveDate,

    /// Diária congelada no momento do fork (Σ qty em falta × preço de aluguel).
    #[schema(example = "400.00")]
    pub daily_rate_snapshot: Decimal,

    /// Quanto de multa de atraso já foi efetivamente cobrado. Mantido
    /// separado do valor calculado para que recarregar a tela nunca cobre
    /// duas vezes.
    #[schema(example = "0.00")]
    pub charged_overdue: Decimal,

    pub created_at: Option<DateTime<Utc>>,
}

/// Multa de atraso proposta: recalculada a cada leitura, nunca cobrada
/// automaticamente. Cobrar é uma operação de acerto explícita e só pela
/// diferença positiva.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverdueQuote {
    #[schema(example = 3)]
    pub days_overdue: i64,

    #[schema(example = "1200.00")]
    pub calculated_amount: Decimal,

    #[schema(example = "400.00")]
    pub charged_amount: Decimal,

    /// max(0, calculated − charged): o único valor que pode ser cobrado agora.
    #[schema(example = "800.00")]
    pub chargeable: Decimal,
}

/// Versão com sua cotação de atraso corrente.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionWithQuote {
    #[serde(flatten)]
    pub version: ReturnVersion,
    pub overdue: OverdueQuote,
}
