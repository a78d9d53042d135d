// src/services/ledger.rs
//
// Agregações puras sobre a lista de transações de um pedido. Tudo aqui é
// visão derivada, recalculada do histórico completo a cada leitura, nunca
// armazenada. Como as transações são append-only, não existe lost-update no
// razão em si; quem checa pré-condição precisa reler a lista fresca antes de
// gravar (ver settlement_service).

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::ledger::{LedgerSummary, Transaction, TxType};

/// Saldo devedor: max(0, Σ débitos − Σ créditos).
/// Caução não entra na soma; só afeta o saldo via par writeoff + payment.
pub fn balance_due(txs: &[Transaction]) -> Decimal {
    let total: Decimal = txs.iter().map(Transaction::signed_amount).sum();
    total.max(Decimal::ZERO)
}

/// Caução disponível por moeda: holds − releases − writeoffs, piso em zero.
/// Moedas com saldo computado ≤ 0 ficam fora do mapa (não aparecem zeradas).
pub fn held_amounts(txs: &[Transaction]) -> BTreeMap<String, Decimal> {
    let mut per_currency: BTreeMap<String, Decimal> = BTreeMap::new();

    for tx in txs {
        let delta = match tx.tx_type {
            TxType::DepositHold => tx.amount,
            TxType::DepositRelease | TxType::DepositWriteoff => -tx.amount,
            _ => continue,
        };
        *per_currency.entry(tx.currency.clone()).or_default() += delta;
    }

    per_currency.retain(|_, v| *v > Decimal::ZERO);
    per_currency
}

/// Quanto de caução está disponível numa moeda específica.
pub fn held_in(txs: &[Transaction], currency: &str) -> Decimal {
    held_amounts(txs)
        .get(currency)
        .copied()
        .unwrap_or(Decimal::ZERO)
}

/// Total já pago (pagamentos + adiantamentos). Visão de relatório.
pub fn paid_amount(txs: &[Transaction]) -> Decimal {
    txs.iter()
        .filter(|tx| tx.tx_type.is_credit())
        .map(|tx| tx.amount)
        .sum()
}

/// Monta a visão derivada completa que toda operação de acerto devolve.
pub fn summarize(txs: &[Transaction]) -> LedgerSummary {
    LedgerSummary {
        balance_due: balance_due(txs),
        held: held_amounts(txs),
        paid: paid_amount(txs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ledger::TxStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn tx(tx_type: TxType, amount: &str, currency: &str) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            tx_type,
            amount: dec(amount),
            currency: currency.to_string(),
            status: TxStatus::Completed,
            method: None,
            date: Utc::now(),
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn balance_due_nunca_negativo() {
        let txs = vec![
            tx(TxType::RentAccrual, "100", "UAH"),
            tx(TxType::Payment, "500", "UAH"),
        ];
        assert_eq!(balance_due(&txs), Decimal::ZERO);
    }

    #[test]
    fn caucao_nao_entra_no_saldo_devedor() {
        let txs = vec![
            tx(TxType::RentAccrual, "1000", "UAH"),
            tx(TxType::DepositHold, "1500", "UAH"),
        ];
        assert_eq!(balance_due(&txs), dec("1000"));
    }

    #[test]
    fn held_por_moeda_omite_saldo_zerado() {
        let txs = vec![
            tx(TxType::DepositHold, "1500", "UAH"),
            tx(TxType::DepositHold, "100", "USD"),
            tx(TxType::DepositRelease, "100", "USD"),
        ];
        let held = held_amounts(&txs);
        assert_eq!(held.get("UAH"), Some(&dec("1500")));
        // USD zerou: não aparece como entrada zero, some do mapa
        assert!(!held.contains_key("USD"));
    }

    #[test]
    fn held_piso_em_zero_por_moeda() {
        // Release maior que o hold (histórico corrompido à mão): nunca negativo
        let txs = vec![
            tx(TxType::DepositHold, "100", "UAH"),
            tx(TxType::DepositRelease, "300", "UAH"),
        ];
        assert!(held_amounts(&txs).is_empty());
    }

    #[test]
    fn writeoff_reduz_held_e_saldo_na_mesma_medida() {
        // Par atômico: writeoff próprio + payment com method=deposit
        let mut txs = vec![
            tx(TxType::RentAccrual, "1000", "UAH"),
            tx(TxType::DepositHold, "1500", "UAH"),
        ];
        let held_antes = held_in(&txs, "UAH");
        let saldo_antes = balance_due(&txs);

        txs.push(tx(TxType::Payment, "300", "UAH"));
        txs.push(tx(TxType::DepositWriteoff, "300", "UAH"));

        assert_eq!(held_in(&txs, "UAH"), held_antes - dec("300"));
        assert_eq!(balance_due(&txs), saldo_antes - dec("300"));
    }

    #[test]
    fn cenario_completo_do_acerto() {
        // Pedido: aluguel 1000 UAH, caução 1500 UAH
        let mut txs = vec![
            tx(TxType::RentAccrual, "1000", "UAH"),
            tx(TxType::DepositHold, "1500", "UAH"),
        ];

        // Dano de 300 → saldo 1300
        txs.push(tx(TxType::Damage, "300", "UAH"));
        assert_eq!(balance_due(&txs), dec("1300"));

        // Baixa de 300 da caução → saldo 1000, held 1200
        txs.push(tx(TxType::Payment, "300", "UAH"));
        txs.push(tx(TxType::DepositWriteoff, "300", "UAH"));
        assert_eq!(balance_due(&txs), dec("1000"));
        assert_eq!(held_in(&txs, "UAH"), dec("1200"));

        // Liberar 1200 → mapa sem entrada UAH; saldo intocado
        txs.push(tx(TxType::DepositRelease, "1200", "UAH"));
        assert!(!held_amounts(&txs).contains_key("UAH"));
        assert_eq!(balance_due(&txs), dec("1000"));
    }

    #[test]
    fn relatorio_deriva_debito_credito_do_tipo() {
        use crate::models::ledger::TransactionReportRow;

        let t = tx(TxType::Damage, "300", "UAH");
        let row = TransactionReportRow::from(&t);
        assert_eq!(row.debit, dec("300"));
        assert_eq!(row.credit, Decimal::ZERO);

        let t = tx(TxType::Payment, "200", "UAH");
        let row = TransactionReportRow::from(&t);
        assert_eq!(row.debit, Decimal::ZERO);
        assert_eq!(row.credit, dec("200"));
    }
}
