// src/models/ledger.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Moeda padrão do sistema (código ISO).
pub const DEFAULT_CURRENCY: &str = "UAH";

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tx_type", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum TxType {
    RentAccrual,     // Aluguel devido
    Prepayment,      // Adiantamento do cliente
    Payment,         // Pagamento efetivo
    DepositHold,     // Caução retida
    DepositRelease,  // Caução devolvida
    DepositWriteoff, // Caução convertida em pagamento
    Damage,          // Taxa de dano / perda
    BalanceDue,      // Saldo devedor lançado manualmente
}

impl TxType {
    /// Tipos que aumentam o saldo devedor do pedido.
    pub fn is_debit(&self) -> bool {
        matches!(self, TxType::RentAccrual | TxType::BalanceDue | TxType::Damage)
    }

    /// Tipos que reduzem o saldo devedor do pedido.
    /// Caução nunca entra aqui: só afeta o saldo via baixa explícita (writeoff).
    pub fn is_credit(&self) -> bool {
        matches!(self, TxType::Prepayment | TxType::Payment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tx_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Pending,   // Aguardando confirmação do cliente (processo de negócio, não concorrência)
    Held,      // Retido como caução
    Completed, // Concluída, imutável a partir daqui
    Unpaid,    // Débito em aberto
}

// --- Structs ---

/// Uma transação do razão. Imutável depois de gravada: correções são sempre
/// novas transações (uma baixa de caução é um registro próprio, nunca uma
/// edição do hold original).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    pub order_id: Uuid,

    pub tx_type: TxType,

    #[schema(example = "1500.00")]
    pub amount: Decimal,

    #[schema(example = "UAH")]
    pub currency: String,

    pub status: TxStatus,

    /// Canal de pagamento ("cash", "card", "deposit"...).
    #[schema(example = "cash")]
    pub method: Option<String>,

    pub date: DateTime<Utc>,

    pub notes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Valor com sinal derivado do tipo, para agregação do saldo devedor.
    /// Substitui as colunas debit/credit duplicadas do sistema antigo: o tipo
    /// já classifica a transação, então o sinal é derivado na leitura.
    pub fn signed_amount(&self) -> Decimal {
        if self.tx_type.is_debit() {
            self.amount
        } else if self.tx_type.is_credit() {
            -self.amount
        } else {
            Decimal::ZERO
        }
    }
}

/// Linha de relatório em partidas dobradas, para consumidores externos que
/// ainda esperam colunas debit/credit. Sempre derivada do tipo, nunca gravada.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReportRow {
    pub id: Uuid,
    pub tx_type: TxType,
    #[schema(example = "300.00")]
    pub debit: Decimal,
    #[schema(example = "0.00")]
    pub credit: Decimal,
    #[schema(example = "UAH")]
    pub currency: String,
    pub status: TxStatus,
    pub method: Option<String>,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<&Transaction> for TransactionReportRow {
    fn from(tx: &Transaction) -> Self {
        let (debit, credit) = if tx.tx_type.is_debit() {
            (tx.amount, Decimal::ZERO)
        } else {
            (Decimal::ZERO, tx.amount)
        };
        Self {
            id: tx.id,
            tx_type: tx.tx_type,
            debit,
            credit,
            currency: tx.currency.clone(),
            status: tx.status,
            method: tx.method.clone(),
            date: tx.date,
            notes: tx.notes.clone(),
        }
    }
}

/// Visão derivada do razão de um pedido. Nunca armazenada: qualquer campo
/// "saldo" gravado em outro lugar do sistema é cache e vale só como dica.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// Quanto o cliente ainda deve (nunca negativo).
    #[schema(example = "1000.00")]
    pub balance_due: Decimal,

    /// Caução disponível por moeda. Moedas com saldo zerado são omitidas.
    pub held: BTreeMap<String, Decimal>,

    /// Total já pago (pagamentos + adiantamentos).
    #[schema(example = "500.00")]
    pub paid: Decimal,
}
