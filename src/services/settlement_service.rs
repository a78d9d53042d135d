// src/services/settlement_service.rs
//
// Operações de acerto financeiro. Cada operação anexa transações ao razão
// (nenhuma altera as existentes) e devolve a visão derivada fresca
// (balance_due + held por moeda) para o chamador não precisar recomputar nem
// recarregar nada.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LedgerRepository,
    models::ledger::{LedgerSummary, TxStatus, TxType},
    services::ledger,
};

#[derive(Clone)]
pub struct SettlementService {
    repo: LedgerRepository,
}

impl SettlementService {
    pub fn new(repo: LedgerRepository) -> Self {
        Self { repo }
    }

    /// Histórico completo do pedido (para a visão de relatório).
    pub async fn history(&self, order_id: Uuid) -> Result<Vec<crate::models::ledger::Transaction>, AppError> {
        self.repo.list_for_order(self.repo.pool(), order_id).await
    }

    // =========================================================================
    //  OPERAÇÕES SIMPLES (um append, sem pré-condição de caução)
    // =========================================================================

    pub async fn record_payment(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
        method: &str,
    ) -> Result<LedgerSummary, AppError> {
        self.append_simple(order_id, TxType::Payment, amount, currency, TxStatus::Completed, Some(method), None)
            .await
    }

    pub async fn hold_deposit(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<LedgerSummary, AppError> {
        self.append_simple(order_id, TxType::DepositHold, amount, currency, TxStatus::Held, None, None)
            .await
    }

    pub async fn accrue_damage(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
        note: &str,
    ) -> Result<LedgerSummary, AppError> {
        self.append_simple(order_id, TxType::Damage, amount, currency, TxStatus::Unpaid, None, Some(note))
            .await
    }

    /// A camada de pedidos lança o aluguel devido na emissão.
    pub async fn accrue_rent(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
        note: Option<&str>,
    ) -> Result<LedgerSummary, AppError> {
        self.append_simple(order_id, TxType::RentAccrual, amount, currency, TxStatus::Unpaid, None, note)
            .await
    }

    async fn append_simple(
        &self,
        order_id: Uuid,
        tx_type: TxType,
        amount: Decimal,
        currency: &str,
        status: TxStatus,
        method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<LedgerSummary, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::NonPositiveAmount);
        }

        let mut tx = self.repo.pool().begin().await?;
        self.repo
            .append(&mut *tx, order_id, tx_type, amount, currency, status, method, notes)
            .await?;
        let txs = self.repo.list_for_order(&mut *tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(%order_id, ?tx_type, %amount, currency, "transação anexada ao razão");
        Ok(ledger::summarize(&txs))
    }

    // =========================================================================
    //  OPERAÇÕES COM PRÉ-CONDIÇÃO DE CAUÇÃO
    // =========================================================================
    //
    // A pré-condição é checada contra a lista relida DENTRO da transação de
    // banco, nunca contra saldo em cache. Se mesmo assim falhar (corrida com
    // outro atendente), tentamos mais uma vez contra estado fresco antes de
    // devolver o erro de validação.

    /// Converte parte da caução em pagamento do saldo devedor.
    /// Par tudo-ou-nada: payment (method=deposit) + deposit_writeoff na mesma
    /// transação de banco, com o payment gravado primeiro: se algo morrer no
    /// meio, o lado conservador (held alto demais) é o que sobra.
    pub async fn writeoff_deposit(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<LedgerSummary, AppError> {
        match self.try_writeoff(order_id, amount, currency).await {
            Err(AppError::InsufficientHeld { .. }) => {
                self.try_writeoff(order_id, amount, currency).await
            }
            other => other,
        }
    }

    async fn try_writeoff(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<LedgerSummary, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::NonPositiveAmount);
        }

        let mut tx = self.repo.pool().begin().await?;

        let txs = self.repo.list_for_order(&mut *tx, order_id).await?;
        let available = ledger::held_in(&txs, currency);
        if amount > available {
            return Err(AppError::InsufficientHeld {
                requested: amount,
                available,
                shortfall: amount - available,
                currency: currency.to_string(),
            });
        }

        // Pagamento primeiro, baixa depois.
        self.repo
            .append(
                &mut *tx,
                order_id,
                TxType::Payment,
                amount,
                currency,
                TxStatus::Completed,
                Some("deposit"),
                None,
            )
            .await?;
        self.repo
            .append(
                &mut *tx,
                order_id,
                TxType::DepositWriteoff,
                amount,
                currency,
                TxStatus::Completed,
                None,
                None,
            )
            .await?;

        let txs = self.repo.list_for_order(&mut *tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(%order_id, %amount, currency, "caução baixada contra o saldo devedor");
        Ok(ledger::summarize(&txs))
    }

    /// Devolve caução ao cliente. Não mexe no saldo devedor.
    pub async fn release_deposit(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<LedgerSummary, AppError> {
        match self.try_release(order_id, amount, currency).await {
            Err(AppError::InsufficientHeld { .. }) => {
                self.try_release(order_id, amount, currency).await
            }
            other => other,
        }
    }

    async fn try_release(
        &self,
        order_id: Uuid,
        amount: Decimal,
        currency: &str,
    ) -> Result<LedgerSummary, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::NonPositiveAmount);
        }

        let mut tx = self.repo.pool().begin().await?;

        let txs = self.repo.list_for_order(&mut *tx, order_id).await?;
        let available = ledger::held_in(&txs, currency);
        if amount > available {
            return Err(AppError::InsufficientHeld {
                requested: amount,
                available,
                shortfall: amount - available,
                currency: currency.to_string(),
            });
        }

        self.repo
            .append(
                &mut *tx,
                order_id,
                TxType::DepositRelease,
                amount,
                currency,
                TxStatus::Completed,
                None,
                None,
            )
            .await?;

        let txs = self.repo.list_for_order(&mut *tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(%order_id, %amount, currency, "caução liberada");
        Ok(ledger::summarize(&txs))
    }
}
