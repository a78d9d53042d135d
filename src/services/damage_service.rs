// src/services/damage_service.rs
//
// Casos e linhas de dano. A taxa default sai do catálogo; override de gerente
// passa pelo avaliador (piso rejeita, teto grampeia) e o total da linha é
// congelado na gravação.

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DamageRepository, OrdersRepository},
    models::damage::{
        CommittedEffect, DamageCase, DamageCaseStatus, DamageLine, DamageSeverity, DamageStage,
        InventoryEffect,
    },
    services::fees::{self, FeeRuleTable},
};

#[derive(Clone)]
pub struct DamageService {
    damage_repo: DamageRepository,
    orders_repo: OrdersRepository,
    fee_table: Arc<FeeRuleTable>,
}

impl DamageService {
    pub fn new(
        damage_repo: DamageRepository,
        orders_repo: OrdersRepository,
        fee_table: Arc<FeeRuleTable>,
    ) -> Self {
        Self {
            damage_repo,
            orders_repo,
            fee_table,
        }
    }

    /// Registra um achado de dano. Cria o caso da etapa no primeiro achado.
    /// Sem override, vale a taxa default da política; com override, vale o
    /// valor validado (ou grampeado no teto).
    #[allow(clippy::too_many_arguments)]
    pub async fn add_damage_line(
        &self,
        order_id: Uuid,
        stage: DamageStage,
        order_item_id: Uuid,
        category: &str,
        kind_code: &str,
        severity: DamageSeverity,
        qty: i32,
        proposed_per_unit: Option<Decimal>,
        note: Option<&str>,
        photo_ref: Option<&str>,
    ) -> Result<(DamageCase, DamageLine), AppError> {
        if qty < 1 {
            return Err(AppError::NonPositiveAmount);
        }

        let policy = self.fee_table.require(category, kind_code)?.clone();

        let mut tx = self.damage_repo.pool().begin().await?;

        // Garante que o item é mesmo deste pedido.
        let item = self.orders_repo.get_item(&mut *tx, order_item_id).await?;
        if item.order_id != order_id {
            return Err(AppError::ResourceNotFound(format!(
                "Item {} no pedido {}",
                order_item_id, order_id
            )));
        }

        let per_unit = match proposed_per_unit {
            Some(proposed) => {
                fees::validate_override(&policy, item.replacement_value, proposed)?.amount()
            }
            None => fees::resolve_default_fee(&policy, item.replacement_value),
        };
        // Total congelado na gravação: edição posterior de qty não altera
        // totais históricos.
        let total = per_unit * Decimal::from(qty);

        let case = match self.damage_repo.find_case(&mut *tx, order_id, stage).await? {
            Some(case) => case,
            None => self.damage_repo.create_case(&mut *tx, order_id, stage).await?,
        };

        let line = self
            .damage_repo
            .insert_line(
                &mut *tx,
                case.id,
                order_item_id,
                category,
                kind_code,
                severity,
                qty,
                per_unit,
                total,
                note,
                photo_ref,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(%order_id, ?stage, %per_unit, qty, "linha de dano registrada");
        Ok((case, line))
    }

    /// Edição de gerente no valor unitário. Revalida contra a mesma política
    /// e o valor de reposição do item; reescreve valor e total.
    pub async fn update_line_amount(
        &self,
        line_id: Uuid,
        proposed_per_unit: Decimal,
    ) -> Result<DamageLine, AppError> {
        let mut tx = self.damage_repo.pool().begin().await?;

        let line = self.damage_repo.get_line(&mut *tx, line_id).await?;
        let item = self.orders_repo.get_item(&mut *tx, line.order_item_id).await?;
        let policy = self.fee_table.require(&line.category, &line.kind_code)?;

        let per_unit =
            fees::validate_override(policy, item.replacement_value, proposed_per_unit)?.amount();
        let total = per_unit * Decimal::from(line.qty);

        let updated = self
            .damage_repo
            .update_line_amount(&mut *tx, line_id, per_unit, total)
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Avança o status do caso. Só para frente, um passo por vez; o único
    /// salto permitido é draft → awaiting_payment (cliente pulado).
    pub async fn advance_case_status(
        &self,
        case_id: Uuid,
        target: DamageCaseStatus,
    ) -> Result<DamageCase, AppError> {
        let mut tx = self.damage_repo.pool().begin().await?;

        let case = self.damage_repo.get_case(&mut *tx, case_id).await?;
        let allowed = target.rank() == case.status.rank() + 1
            || (case.status == DamageCaseStatus::Draft
                && target == DamageCaseStatus::AwaitingPayment);
        if !allowed {
            return Err(AppError::InvalidCaseTransition {
                from: case.status,
                to: target,
            });
        }

        let updated = self
            .damage_repo
            .update_case_status(&mut *tx, case_id, target)
            .await?;
        tx.commit().await?;

        tracing::info!(%case_id, from = ?case.status, to = ?target, "caso de dano avançou");
        Ok(updated)
    }

    pub async fn get_case_with_lines(
        &self,
        case_id: Uuid,
    ) -> Result<(DamageCase, Vec<DamageLine>), AppError> {
        let case = self.damage_repo.get_case(self.damage_repo.pool(), case_id).await?;
        let lines = self.damage_repo.list_lines(self.damage_repo.pool(), case_id).await?;
        Ok((case, lines))
    }

    /// Efeitos de inventário que o caso comprometeu. Quem excluir o caso
    /// precisa desfazer exatamente isto: descongelar estoque, restaurar
    /// quantidade baixada.
    pub async fn committed_effects(&self, case_id: Uuid) -> Result<Vec<CommittedEffect>, AppError> {
        let lines = self.damage_repo.list_lines(self.damage_repo.pool(), case_id).await?;
        Ok(lines.iter().map(line_effect).collect())
    }
}

/// Dano crítico é perda definitiva (baixa de quantidade); o resto congela o
/// estoque enquanto o caso vive.
fn line_effect(line: &DamageLine) -> CommittedEffect {
    let effect = match line.severity {
        DamageSeverity::Critical => InventoryEffect::QuantityWrittenOff,
        _ => InventoryEffect::StockFrozen,
    };
    CommittedEffect {
        order_item_id: line.order_item_id,
        qty: line.qty,
        effect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(severity: DamageSeverity, qty: i32) -> DamageLine {
        DamageLine {
            id: Uuid::new_v4(),
            case_id: Uuid::new_v4(),
            order_item_id: Uuid::new_v4(),
            category: "glassware".to_string(),
            kind_code: "break".to_string(),
            severity,
            qty,
            amount_per_unit: Decimal::from(100),
            total: Decimal::from(100) * Decimal::from(qty),
            note: None,
            photo_ref: None,
            created_at: None,
        }
    }

    #[test]
    fn dano_critico_baixa_quantidade_demais_congelam() {
        let e = line_effect(&line(DamageSeverity::Critical, 3));
        assert_eq!(e.effect, InventoryEffect::QuantityWrittenOff);
        assert_eq!(e.qty, 3);

        let e = line_effect(&line(DamageSeverity::Medium, 1));
        assert_eq!(e.effect, InventoryEffect::StockFrozen);
    }

    #[test]
    fn salto_permitido_e_passos_do_caso() {
        use DamageCaseStatus::*;
        // Um passo à frente sempre vale
        assert_eq!(AwaitingClient.rank(), Draft.rank() + 1);
        assert_eq!(Closed.rank(), InRepair.rank() + 1);
        // O salto draft → awaiting_payment pula exatamente um estágio
        assert_eq!(AwaitingPayment.rank(), Draft.rank() + 2);
    }
}
