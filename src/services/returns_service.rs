// src/services/returns_service.rs
//
// Versionamento de devolução parcial. Fechar a devolução ou encerra o pedido
// ou gera a versão seguinte carregando a sobra; a multa de atraso é proposta
// a cada leitura e cobrada só pela diferença positiva, em operação explícita.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::EnginePolicy,
    db::{DamageRepository, LedgerRepository, OrdersRepository, ReturnsRepository},
    models::ledger::{LedgerSummary, TxStatus, TxType, DEFAULT_CURRENCY},
    models::orders::{OrderItem, OrderStatus, RentalOrder},
    models::returns::{OverdueQuote, ReturnVersion, ShortfallItem, VersionStatus, VersionWithQuote},
    services::ledger,
    services::lifecycle_service,
};

/// Sobra por item: alugado − devolvido (acumulado), só os positivos.
pub fn compute_shortfall(items: &[OrderItem]) -> Vec<ShortfallItem> {
    items
        .iter()
        .filter(|i| i.returned_qty < i.ordered_qty)
        .map(|i| ShortfallItem {
            order_item_id: i.id,
            sku: i.sku.clone(),
            name: i.name.clone(),
            qty: i.ordered_qty - i.returned_qty,
        })
        .collect()
}

/// Diária da versão: Σ qty em falta × preço de aluguel unitário.
pub fn shortfall_daily_rate(items: &[OrderItem], shortfall: &[ShortfallItem]) -> Decimal {
    shortfall
        .iter()
        .map(|s| {
            items
                .iter()
                .find(|i| i.id == s.order_item_id)
                .map(|i| i.rent_price * Decimal::from(s.qty))
                .unwrap_or(Decimal::ZERO)
        })
        .sum()
}

/// Cotação de atraso, recalculada a cada carga. Dias nunca negativos;
/// cobrável é só o que ainda não foi cobrado.
pub fn overdue_quote(version: &ReturnVersion, today: NaiveDate) -> OverdueQuote {
    let days_overdue = (today - version.return_due_date).num_days().max(0);
    let calculated = version.daily_rate_snapshot * Decimal::from(days_overdue);
    let chargeable = (calculated - version.charged_overdue).max(Decimal::ZERO);

    OverdueQuote {
        days_overdue,
        calculated_amount: calculated,
        charged_amount: version.charged_overdue,
        chargeable,
    }
}

/// O que o fechamento da devolução deve fazer, decidido fora do banco.
#[derive(Debug, PartialEq, Eq)]
pub enum CloseDecision {
    /// Pedido já acertado e sem versão ativa: repetir o fechamento é no-op.
    AlreadySettled,
    /// Cobertura total: fechar a versão ativa (se houver) e acertar o pedido.
    Settle,
    /// Cobertura parcial: gerar a versão seguinte com a sobra.
    Fork { next_number: i32 },
}

/// Decide o fechamento a partir do estado corrente. O no-op de repetição vem
/// antes da checagem de etapa, senão o segundo fechamento de um pedido já
/// acertado viraria erro em vez de sucesso.
pub fn close_decision(
    status: OrderStatus,
    active_version: Option<i32>,
    has_shortfall: bool,
) -> Result<CloseDecision, AppError> {
    if status == OrderStatus::Settled && active_version.is_none() {
        return Ok(CloseDecision::AlreadySettled);
    }

    if status != OrderStatus::ReturnIntake {
        return Err(AppError::InvalidTransition {
            from: status,
            to: OrderStatus::Settled,
        });
    }

    if has_shortfall {
        Ok(CloseDecision::Fork {
            next_number: active_version.map_or(1, |n| n + 1),
        })
    } else {
        Ok(CloseDecision::Settle)
    }
}

/// Resultado do fechamento de uma devolução.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseOutcome {
    pub order: RentalOrder,
    /// Versão nova com a sobra, quando a devolução não cobriu tudo.
    pub forked_version: Option<ReturnVersion>,
    pub settled: bool,
}

#[derive(Clone)]
pub struct ReturnsService {
    returns_repo: ReturnsRepository,
    orders_repo: OrdersRepository,
    ledger_repo: LedgerRepository,
    damage_repo: DamageRepository,
    policy: EnginePolicy,
}

impl ReturnsService {
    pub fn new(
        returns_repo: ReturnsRepository,
        orders_repo: OrdersRepository,
        ledger_repo: LedgerRepository,
        damage_repo: DamageRepository,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            returns_repo,
            orders_repo,
            ledger_repo,
            damage_repo,
            policy,
        }
    }

    /// Fecha a devolução corrente. Cobertura total → versão ativa (se houver)
    /// vira Returned e o pedido é acertado, sob o mesmo portão do avanço
    /// direto; repetir num pedido já acertado é no-op de sucesso. Cobertura
    /// parcial → versão n+1 Active com a sobra, e o pedido continua em
    /// return_intake.
    pub async fn close_return(&self, order_id: Uuid) -> Result<CloseOutcome, AppError> {
        let mut tx = self.returns_repo.pool().begin().await?;

        let order = self.orders_repo.get_order(&mut *tx, order_id).await?;
        let active = self.returns_repo.active_version(&mut *tx, order_id).await?;
        let items = self.orders_repo.list_items(&mut *tx, order_id).await?;
        let shortfall = compute_shortfall(&items);

        let decision = close_decision(
            order.status,
            active.as_ref().map(|v| v.version_number),
            !shortfall.is_empty(),
        )?;

        match decision {
            CloseDecision::AlreadySettled => Ok(CloseOutcome {
                order,
                forked_version: None,
                settled: true,
            }),

            CloseDecision::Settle => {
                // Mesmas pré-condições financeiras do avanço direto; a versão
                // ativa fica de fora porque é fechada aqui mesmo.
                let txs = self.ledger_repo.list_for_order(&mut *tx, order_id).await?;
                let open_cases: Vec<Uuid> = if self.policy.require_damage_closed {
                    self.damage_repo
                        .list_open_cases(&mut *tx, order_id)
                        .await?
                        .into_iter()
                        .map(|case| case.id)
                        .collect()
                } else {
                    Vec::new()
                };
                lifecycle_service::check_settlement(
                    &items,
                    ledger::balance_due(&txs),
                    &open_cases,
                    None,
                )?;

                if let Some(version) = &active {
                    self.returns_repo
                        .update_status(&mut *tx, version.id, VersionStatus::Returned)
                        .await?;
                }
                let order = self
                    .orders_repo
                    .update_status(&mut *tx, order_id, OrderStatus::Settled)
                    .await?;
                tx.commit().await?;

                tracing::info!(%order_id, "devolução coberta por completo; pedido acertado");
                Ok(CloseOutcome {
                    order,
                    forked_version: None,
                    settled: true,
                })
            }

            CloseDecision::Fork { next_number } => {
                // Versão anterior fecha a contabilidade dela ("returned"
                // ainda que parcial) e a sobra segue na próxima.
                if let Some(version) = &active {
                    self.returns_repo
                        .update_status(&mut *tx, version.id, VersionStatus::Returned)
                        .await?;
                }

                let due_date = order
                    .return_due_date
                    .unwrap_or_else(|| Utc::now().date_naive());
                let daily_rate = shortfall_daily_rate(&items, &shortfall);

                let forked = self
                    .returns_repo
                    .insert_version(&mut *tx, order_id, next_number, &shortfall, due_date, daily_rate)
                    .await?;
                tx.commit().await?;

                tracing::info!(
                    %order_id,
                    version = next_number,
                    itens_em_falta = shortfall.len(),
                    "devolução parcial: sobra carregada para a próxima versão"
                );
                Ok(CloseOutcome {
                    order,
                    forked_version: Some(forked),
                    settled: false,
                })
            }
        }
    }

    /// Versões do pedido com as cotações de atraso correntes.
    pub async fn versions_with_quotes(&self, order_id: Uuid) -> Result<Vec<VersionWithQuote>, AppError> {
        let versions = self
            .returns_repo
            .list_for_order(self.returns_repo.pool(), order_id)
            .await?;
        let today = Utc::now().date_naive();

        Ok(versions
            .into_iter()
            .map(|version| {
                let overdue = overdue_quote(&version, today);
                VersionWithQuote { version, overdue }
            })
            .collect())
    }

    /// Cobra a multa de atraso da versão, só a diferença positiva entre o
    /// calculado e o já cobrado, para que recargas repetidas nunca dupliquem
    /// a cobrança. A leitura trava a linha da versão: cobranças concorrentes
    /// se serializam e a segunda recalcula sobre o acumulador já atualizado.
    /// Lançamento e acumulador na mesma transação de banco.
    pub async fn charge_overdue(
        &self,
        version_id: Uuid,
    ) -> Result<(VersionWithQuote, LedgerSummary), AppError> {
        let mut tx = self.returns_repo.pool().begin().await?;

        let version = self
            .returns_repo
            .get_version_for_update(&mut *tx, version_id)
            .await?;
        if version.status != VersionStatus::Active {
            return Err(AppError::VersionConflict(format!(
                "A versão {} não está ativa; multa de atraso só se cobra da versão ativa.",
                version.version_number
            )));
        }

        let today = Utc::now().date_naive();
        let quote = overdue_quote(&version, today);
        if quote.chargeable <= Decimal::ZERO {
            return Err(AppError::NothingToCharge);
        }

        let note = format!(
            "Multa de atraso: {} dias × {} (versão {})",
            quote.days_overdue, version.daily_rate_snapshot, version.version_number
        );
        self.ledger_repo
            .append(
                &mut *tx,
                version.parent_order_id,
                TxType::Damage,
                quote.chargeable,
                DEFAULT_CURRENCY,
                TxStatus::Unpaid,
                None,
                Some(&note),
            )
            .await?;

        let updated = self
            .returns_repo
            .add_charged_overdue(&mut *tx, version_id, quote.chargeable)
            .await?;

        let txs = self
            .ledger_repo
            .list_for_order(&mut *tx, version.parent_order_id)
            .await?;
        tx.commit().await?;

        tracing::info!(
            %version_id,
            cobrado = %quote.chargeable,
            "multa de atraso lançada no razão"
        );
        let overdue = overdue_quote(&updated, today);
        Ok((
            VersionWithQuote {
                version: updated,
                overdue,
            },
            ledger::summarize(&txs),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(sku: &str, ordered: i32, returned: i32, rent: &str) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            sku: sku.to_string(),
            name: sku.to_string(),
            ordered_qty: ordered,
            picked_qty: ordered,
            returned_qty: returned,
            rent_price: dec(rent),
            deposit_value: Decimal::ZERO,
            replacement_value: Decimal::ZERO,
            serial_numbers: None,
            scanned_serials: None,
        }
    }

    fn version(due: NaiveDate, rate: &str, charged: &str) -> ReturnVersion {
        ReturnVersion {
            id: Uuid::new_v4(),
            parent_order_id: Uuid::new_v4(),
            version_number: 1,
            status: VersionStatus::Active,
            items: Json(vec![]),
            return_due_date: due,
            daily_rate_snapshot: dec(rate),
            charged_overdue: dec(charged),
            created_at: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn sobra_de_10_alugados_6_devolvidos_e_4() {
        let items = vec![item("A", 10, 6, "100")];
        let shortfall = compute_shortfall(&items);
        assert_eq!(shortfall.len(), 1);
        assert_eq!(shortfall[0].qty, 4);
    }

    #[test]
    fn cobertura_total_nao_gera_sobra() {
        let items = vec![item("A", 10, 10, "100"), item("B", 2, 5, "50")];
        assert!(compute_shortfall(&items).is_empty());
    }

    #[test]
    fn diaria_soma_so_os_itens_em_falta() {
        let items = vec![item("A", 10, 6, "100"), item("B", 2, 2, "999")];
        let shortfall = compute_shortfall(&items);
        // 4 × 100; o item B está coberto e não entra
        assert_eq!(shortfall_daily_rate(&items, &shortfall), dec("400"));
    }

    #[test]
    fn dias_de_atraso_nunca_negativos() {
        let v = version(date("2024-03-10"), "400", "0");
        let quote = overdue_quote(&v, date("2024-03-05"));
        assert_eq!(quote.days_overdue, 0);
        assert_eq!(quote.calculated_amount, Decimal::ZERO);
        assert_eq!(quote.chargeable, Decimal::ZERO);
    }

    #[test]
    fn cobravel_e_somente_a_diferenca_positiva() {
        // 3 dias × 400 = 1200 calculado; 400 já cobrado → 800 cobrável
        let v = version(date("2024-03-10"), "400", "400");
        let quote = overdue_quote(&v, date("2024-03-13"));
        assert_eq!(quote.days_overdue, 3);
        assert_eq!(quote.calculated_amount, dec("1200"));
        assert_eq!(quote.chargeable, dec("800"));
    }

    #[test]
    fn cobrado_alem_do_calculado_nao_vira_credito() {
        // Diária caiu entre cobranças: já cobrado 500 > calculado 400
        let v = version(date("2024-03-10"), "400", "500");
        let quote = overdue_quote(&v, date("2024-03-11"));
        assert_eq!(quote.chargeable, Decimal::ZERO);
    }

    #[test]
    fn cobrancas_serializadas_no_mesmo_dia_nao_duplicam() {
        // Duas cobranças em sequência (a trava de linha serializa as
        // concorrentes): a primeira leva 1200, a segunda recalcula sobre o
        // acumulador e não tem mais nada a cobrar.
        let mut v = version(date("2024-03-10"), "400", "0");
        let today = date("2024-03-13");

        let first = overdue_quote(&v, today);
        assert_eq!(first.chargeable, dec("1200"));
        v.charged_overdue += first.chargeable;

        let second = overdue_quote(&v, today);
        assert_eq!(second.chargeable, Decimal::ZERO);
    }

    #[test]
    fn fechamento_decide_fork_com_numeracao_sequencial() {
        // Primeira devolução parcial abre a versão 1; as seguintes somam 1.
        assert_eq!(
            close_decision(OrderStatus::ReturnIntake, None, true).unwrap(),
            CloseDecision::Fork { next_number: 1 }
        );
        assert_eq!(
            close_decision(OrderStatus::ReturnIntake, Some(2), true).unwrap(),
            CloseDecision::Fork { next_number: 3 }
        );
    }

    #[test]
    fn fechamento_cobre_tudo_e_acerta() {
        assert_eq!(
            close_decision(OrderStatus::ReturnIntake, Some(1), false).unwrap(),
            CloseDecision::Settle
        );
    }

    #[test]
    fn refechar_pedido_acertado_e_no_op_e_nunca_segundo_acerto() {
        // Primeiro fechamento com cobertura total acerta o pedido...
        assert_eq!(
            close_decision(OrderStatus::ReturnIntake, None, false).unwrap(),
            CloseDecision::Settle
        );
        // ...e repetir sobre o pedido já acertado não acerta de novo.
        assert_eq!(
            close_decision(OrderStatus::Settled, None, false).unwrap(),
            CloseDecision::AlreadySettled
        );
    }

    #[test]
    fn fechar_fora_da_etapa_de_recebimento_e_erro() {
        let err = close_decision(OrderStatus::Issued, None, false).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: OrderStatus::Issued,
                to: OrderStatus::Settled
            }
        ));
    }
}
