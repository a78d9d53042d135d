// src/db/ledger_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ledger::{Transaction, TxStatus, TxType},
};

/// Repositório do razão. Só SELECT e INSERT: a tabela é append-only por
/// construção, e correção é transação nova, nunca UPDATE.
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Histórico completo do pedido, na ordem de gravação.
    pub async fn list_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let txs = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, order_id, tx_type, amount, currency, status, method, date, notes, created_at
            FROM ledger_transactions
            WHERE order_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(txs)
    }

    pub async fn append<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        tx_type: TxType,
        amount: Decimal,
        currency: &str,
        status: TxStatus,
        method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tx = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO ledger_transactions (order_id, tx_type, amount, currency, status, method, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, order_id, tx_type, amount, currency, status, method, date, notes, created_at
            "#,
        )
        .bind(order_id)
        .bind(tx_type)
        .bind(amount)
        .bind(currency)
        .bind(status)
        .bind(method)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(tx)
    }
}
