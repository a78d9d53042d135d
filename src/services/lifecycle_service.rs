// src/services/lifecycle_service.rs
//
// Máquina de estados do pedido:
// draft → processing → ready_for_issue → issued → return_intake → settled,
// com archived como terminal a partir de settled.
//
// A assimetria dos portões da liberação é decisão de negócio, não descuido:
// separação incompleta e falta de requisitor BLOQUEIAM; seriais não bipados e
// checklist opcional só geram aviso.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::EnginePolicy,
    db::{DamageRepository, LedgerRepository, OrdersRepository, ReturnsRepository},
    models::orders::{ChecklistEntry, OrderAssignee, OrderItem, OrderStatus, RentalOrder},
    services::ledger,
};

/// Resultado de um avanço: o pedido atualizado e os avisos não-bloqueantes.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceOutcome {
    pub order: RentalOrder,
    pub warnings: Vec<String>,
}

/// Os pares (de, para) legais da cadeia.
fn transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Draft, Processing)
            | (Processing, ReadyForIssue)
            | (ReadyForIssue, Issued)
            | (Issued, ReturnIntake)
            | (ReturnIntake, Settled)
            | (Settled, Archived)
    )
}

/// Portão processing → ready_for_issue.
/// Bloqueia: item com separação incompleta; nenhum requisitor; checklist
/// obrigatório pendente (quando a política exige). Devolve os avisos.
pub fn check_ready_for_issue(
    items: &[OrderItem],
    assignees: &[OrderAssignee],
    checklist: &[ChecklistEntry],
    require_checklist: bool,
) -> Result<Vec<String>, AppError> {
    let mut blocking: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for item in items {
        if item.picked_qty < item.ordered_qty {
            blocking.push(format!(
                "item {}: separado {}/{}",
                item.sku, item.picked_qty, item.ordered_qty
            ));
        }

        // Seriais não bipados: aviso, nunca bloqueio.
        if let Some(serials) = &item.serial_numbers {
            let scanned = item.scanned_serials.as_ref().map_or(0, |s| s.len());
            if scanned < serials.len() {
                warnings.push(format!(
                    "item {}: {}/{} seriais bipados",
                    item.sku,
                    scanned,
                    serials.len()
                ));
            }
        }
    }

    let has_requisitor = assignees.iter().any(|a| a.role == "requisitor");
    if !has_requisitor {
        blocking.push("nenhum requisitor alocado à separação".to_string());
    }

    for entry in checklist {
        if entry.checked {
            continue;
        }
        if entry.required && require_checklist {
            blocking.push(format!("checklist obrigatório pendente: {}", entry.label));
        } else {
            warnings.push(format!("checklist pendente: {}", entry.label));
        }
    }

    if !blocking.is_empty() {
        return Err(AppError::PreconditionFailed {
            condition: "liberação para entrega".to_string(),
            details: blocking,
        });
    }

    Ok(warnings)
}

/// Itens cuja devolução ainda não cobre a quantidade alugada.
pub fn uncovered_items(items: &[OrderItem]) -> Vec<String> {
    items
        .iter()
        .filter(|i| i.returned_qty < i.ordered_qty)
        .map(|i| format!("item {}: devolvido {}/{}", i.sku, i.returned_qty, i.ordered_qty))
        .collect()
}

/// Portão return_intake → settled, compartilhado entre o avanço direto e o
/// fechamento da devolução. Bloqueia: item não coberto; saldo devedor; caso
/// de dano aberto (quando a política exige); versão de devolução ainda ativa.
/// Uma versão ativa bloqueia SOZINHA: acertar por cima dela deixaria a multa
/// de atraso cobrável num pedido encerrado.
pub fn check_settlement(
    items: &[OrderItem],
    balance_due: Decimal,
    open_case_ids: &[Uuid],
    active_version: Option<i32>,
) -> Result<(), AppError> {
    let mut details = uncovered_items(items);

    if !balance_due.is_zero() {
        details.push(format!("saldo devedor em aberto: {}", balance_due));
    }

    for case_id in open_case_ids {
        details.push(format!("caso de dano aberto: {}", case_id));
    }

    if let Some(number) = active_version {
        details.push(format!(
            "versão de devolução {} ainda ativa; feche a devolução em vez de forçar o acerto",
            number
        ));
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(AppError::PreconditionFailed {
            condition: "acerto do pedido".to_string(),
            details,
        })
    }
}

#[derive(Clone)]
pub struct LifecycleService {
    orders_repo: OrdersRepository,
    ledger_repo: LedgerRepository,
    damage_repo: DamageRepository,
    returns_repo: ReturnsRepository,
    policy: EnginePolicy,
}

impl LifecycleService {
    pub fn new(
        orders_repo: OrdersRepository,
        ledger_repo: LedgerRepository,
        damage_repo: DamageRepository,
        returns_repo: ReturnsRepository,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            orders_repo,
            ledger_repo,
            damage_repo,
            returns_repo,
            policy,
        }
    }

    pub async fn advance(&self, order_id: Uuid, target: OrderStatus) -> Result<AdvanceOutcome, AppError> {
        let mut tx = self.orders_repo.pool().begin().await?;

        let order = self.orders_repo.get_order(&mut *tx, order_id).await?;
        if !transition_allowed(order.status, target) {
            return Err(AppError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let mut warnings = Vec::new();

        match (order.status, target) {
            (OrderStatus::Processing, OrderStatus::ReadyForIssue) => {
                let items = self.orders_repo.list_items(&mut *tx, order_id).await?;
                let assignees = self.orders_repo.list_assignees(&mut *tx, order_id).await?;
                let checklist = self.orders_repo.list_checklist(&mut *tx, order_id).await?;
                warnings = check_ready_for_issue(
                    &items,
                    &assignees,
                    &checklist,
                    self.policy.require_checklist,
                )?;
            }

            // Emitir é ato de confirmação: estar em ready_for_issue basta,
            // não revalidamos nada.
            (OrderStatus::ReadyForIssue, OrderStatus::Issued) => {}

            // Abrir o recebimento não tem pré-condição de razão.
            (OrderStatus::Issued, OrderStatus::ReturnIntake) => {}

            (OrderStatus::ReturnIntake, OrderStatus::Settled) => {
                let items = self.orders_repo.list_items(&mut *tx, order_id).await?;
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
                let active = self.returns_repo.active_version(&mut *tx, order_id).await?;

                check_settlement(
                    &items,
                    ledger::balance_due(&txs),
                    &open_cases,
                    active.map(|v| v.version_number),
                )?;
            }

            (OrderStatus::Settled, OrderStatus::Archived) => {}

            // Draft → Processing e os demais pares legais sem portão.
            _ => {}
        }

        let updated = self.orders_repo.update_status(&mut *tx, order_id, target).await?;
        tx.commit().await?;

        tracing::info!(%order_id, from = ?order.status, to = ?target, "pedido avançou de etapa");
        Ok(AdvanceOutcome {
            order: updated,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(sku: &str, ordered: i32, picked: i32, returned: i32) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            sku: sku.to_string(),
            name: sku.to_string(),
            ordered_qty: ordered,
            picked_qty: picked,
            returned_qty: returned,
            rent_price: Decimal::from(100),
            deposit_value: Decimal::from(150),
            replacement_value: Decimal::from(800),
            serial_numbers: None,
            scanned_serials: None,
        }
    }

    fn requisitor() -> OrderAssignee {
        OrderAssignee {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            staff_name: "Olena K.".to_string(),
            role: "requisitor".to_string(),
        }
    }

    fn entry(label: &str, required: bool, checked: bool) -> ChecklistEntry {
        ChecklistEntry {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            label: label.to_string(),
            required,
            checked,
        }
    }

    #[test]
    fn separacao_incompleta_bloqueia() {
        let items = vec![item("A", 10, 8, 0)];
        let err = check_ready_for_issue(&items, &[requisitor()], &[], true).unwrap_err();
        match err {
            AppError::PreconditionFailed { details, .. } => {
                assert!(details[0].contains("separado 8/10"));
            }
            other => panic!("esperava PreconditionFailed, veio {:?}", other),
        }
    }

    #[test]
    fn sem_requisitor_bloqueia_mesmo_com_tudo_separado() {
        let items = vec![item("A", 10, 10, 0)];
        assert!(check_ready_for_issue(&items, &[], &[], true).is_err());
    }

    #[test]
    fn checklist_opcional_pendente_so_avisa() {
        let items = vec![item("A", 10, 10, 0)];
        let checklist = vec![entry("Polir talheres", false, false)];
        let warnings = check_ready_for_issue(&items, &[requisitor()], &checklist, true).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Polir talheres"));
    }

    #[test]
    fn checklist_obrigatorio_pendente_bloqueia_quando_politica_exige() {
        let items = vec![item("A", 10, 10, 0)];
        let checklist = vec![entry("Conferir embalagem", true, false)];
        assert!(check_ready_for_issue(&items, &[requisitor()], &checklist, true).is_err());
        // Com a política desligada, vira aviso
        let warnings =
            check_ready_for_issue(&items, &[requisitor()], &checklist, false).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn seriais_nao_bipados_avisam_sem_bloquear() {
        let mut it = item("A", 2, 2, 0);
        it.serial_numbers = Some(vec!["S1".to_string(), "S2".to_string()]);
        it.scanned_serials = Some(vec!["S1".to_string()]);
        let warnings = check_ready_for_issue(&[it], &[requisitor()], &[], true).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("1/2 seriais"));
    }

    #[test]
    fn liberacao_passa_com_tudo_separado_e_requisitor() {
        let items = vec![item("A", 10, 10, 0), item("B", 3, 3, 0)];
        let warnings = check_ready_for_issue(&items, &[requisitor()], &[], true).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn cobertura_de_devolucao_lista_apenas_os_em_falta() {
        let items = vec![item("A", 10, 10, 10), item("B", 4, 4, 1)];
        let uncovered = uncovered_items(&items);
        assert_eq!(uncovered.len(), 1);
        assert!(uncovered[0].contains("B"));
    }

    #[test]
    fn versao_ativa_bloqueia_o_acerto_mesmo_sem_outra_pendencia() {
        // Tudo devolvido e saldo zerado, mas a versão 2 segue ativa:
        // o acerto direto tem de mandar fechar a devolução.
        let items = vec![item("A", 10, 10, 10)];
        let err = check_settlement(&items, Decimal::ZERO, &[], Some(2)).unwrap_err();
        match err {
            AppError::PreconditionFailed { details, .. } => {
                assert_eq!(details.len(), 1);
                assert!(details[0].contains("versão de devolução 2"));
            }
            other => panic!("esperava PreconditionFailed, veio {:?}", other),
        }
    }

    #[test]
    fn acerto_passa_sem_pendencias() {
        let items = vec![item("A", 10, 10, 10)];
        assert!(check_settlement(&items, Decimal::ZERO, &[], None).is_ok());
    }

    #[test]
    fn acerto_acumula_todas_as_pendencias() {
        let items = vec![item("A", 10, 10, 6)];
        let case_id = Uuid::new_v4();
        let err =
            check_settlement(&items, Decimal::from(300), &[case_id], Some(1)).unwrap_err();
        match err {
            AppError::PreconditionFailed { details, .. } => {
                assert_eq!(details.len(), 4);
                assert!(details[0].contains("devolvido 6/10"));
                assert!(details[1].contains("saldo devedor em aberto: 300"));
                assert!(details[2].contains(&case_id.to_string()));
                assert!(details[3].contains("versão de devolução 1"));
            }
            other => panic!("esperava PreconditionFailed, veio {:?}", other),
        }
    }

    #[test]
    fn cadeia_de_transicoes_legais() {
        use OrderStatus::*;
        assert!(transition_allowed(Draft, Processing));
        assert!(transition_allowed(Processing, ReadyForIssue));
        assert!(transition_allowed(ReadyForIssue, Issued));
        assert!(transition_allowed(Issued, ReturnIntake));
        assert!(transition_allowed(ReturnIntake, Settled));
        assert!(transition_allowed(Settled, Archived));
        // Sem atalhos nem retrocesso
        assert!(!transition_allowed(Draft, Issued));
        assert!(!transition_allowed(Issued, Processing));
        assert!(!transition_allowed(Processing, Settled));
        assert!(!transition_allowed(Archived, Settled));
    }
}
