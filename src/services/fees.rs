// src/services/fees.rs
//
// Catálogo estático de políticas de taxa e o avaliador de taxa de dano.
// O catálogo é carregado na inicialização e não é editável em runtime.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;

use crate::common::error::AppError;
use crate::models::fees::{FeePolicy, FeeRule};

/// Resultado da validação de um override de gerente.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideOutcome {
    /// Aceito como proposto.
    Accepted(Decimal),
    /// Acima do teto: aceito, mas grudado no teto. Rejeitar aqui deixaria o
    /// gerente sem saída depois de uma cobrança a maior acidental; o piso
    /// rejeita, o teto grampeia.
    Clamped(Decimal),
}

impl OverrideOutcome {
    pub fn amount(&self) -> Decimal {
        match self {
            OverrideOutcome::Accepted(v) | OverrideOutcome::Clamped(v) => *v,
        }
    }
}

/// Taxa padrão por unidade para uma política, dado o valor de reposição
/// integral do item.
pub fn resolve_default_fee(policy: &FeePolicy, full_value: Decimal) -> Decimal {
    match policy {
        FeePolicy::Min { min } => *min,
        // O default de uma faixa é o limite inferior; qualquer valor dentro
        // de [min, max] vale como override.
        FeePolicy::Range { min, .. } => *min,
        // Sem default numérico: o chamador decide; o teto vale no override.
        FeePolicy::MaxFull => Decimal::ZERO,
        FeePolicy::PercentOfFull { percent } => (percent * full_value).round_dp(2),
    }
}

/// Valida um override contra piso e teto da política.
/// Abaixo do piso → rejeitado com o piso, para o chamador reperguntar.
/// Acima do teto → grampeado no teto, nunca rejeitado.
pub fn validate_override(
    policy: &FeePolicy,
    full_value: Decimal,
    proposed: Decimal,
) -> Result<OverrideOutcome, AppError> {
    let floor = policy.floor();
    if proposed < floor {
        return Err(AppError::FeeBelowFloor { floor });
    }

    let ceiling = match policy {
        FeePolicy::Range { max, .. } => Some(*max),
        FeePolicy::MaxFull | FeePolicy::PercentOfFull { .. } => Some(full_value),
        FeePolicy::Min { .. } => None,
    };

    match ceiling {
        Some(max) if proposed > max => Ok(OverrideOutcome::Clamped(max)),
        _ => Ok(OverrideOutcome::Accepted(proposed)),
    }
}

// =============================================================================
//  CATÁLOGO
// =============================================================================

#[derive(Debug, Clone)]
pub struct FeeRuleTable {
    rules: Vec<FeeRule>,
    index: HashMap<(String, String), usize>,
}

impl FeeRuleTable {
    fn from_rules(rules: Vec<FeeRule>) -> Self {
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, r)| ((r.category.clone(), r.kind_code.clone()), i))
            .collect();
        Self { rules, index }
    }

    /// Catálogo embutido, espelhando a tabela do negócio.
    pub fn builtin() -> Self {
        fn dec(s: &str) -> Decimal {
            s.parse().expect("constante decimal inválida no catálogo")
        }
        fn rule(category: &str, kind_code: &str, policy: FeePolicy) -> FeeRule {
            FeeRule {
                category: category.to_string(),
                kind_code: kind_code.to_string(),
                policy,
            }
        }

        Self::from_rules(vec![
            // Tecidos (toalhas, cortinas, estofados)
            rule("textile", "stain", FeePolicy::Min { min: dec("50") }),
            rule("textile", "tear", FeePolicy::Range { min: dec("100"), max: dec("400") }),
            rule("textile", "loss", FeePolicy::MaxFull),
            // Mobiliário
            rule("furniture", "scratch", FeePolicy::Range { min: dec("80"), max: dec("300") }),
            rule("furniture", "break", FeePolicy::PercentOfFull { percent: dec("0.6") }),
            rule("furniture", "loss", FeePolicy::MaxFull),
            // Vidraria e louça
            rule("glassware", "chip", FeePolicy::Min { min: dec("30") }),
            rule("glassware", "break", FeePolicy::MaxFull),
            rule("glassware", "loss", FeePolicy::MaxFull),
            // Iluminação e elétrica
            rule("lighting", "malfunction", FeePolicy::Range { min: dec("150"), max: dec("600") }),
            rule("lighting", "break", FeePolicy::PercentOfFull { percent: dec("0.8") }),
            rule("lighting", "loss", FeePolicy::MaxFull),
            // Decoração miúda
            rule("decor", "scratch", FeePolicy::Min { min: dec("40") }),
            rule("decor", "break", FeePolicy::PercentOfFull { percent: dec("0.5") }),
            rule("decor", "loss", FeePolicy::MaxFull),
        ])
    }

    /// Carrega o catálogo de um JSON de deploy (lista de FeeRule).
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let rules: Vec<FeeRule> = serde_json::from_str(&raw)?;
        Ok(Self::from_rules(rules))
    }

    pub fn get(&self, category: &str, kind_code: &str) -> Option<&FeePolicy> {
        self.index
            .get(&(category.to_string(), kind_code.to_string()))
            .map(|&i| &self.rules[i].policy)
    }

    /// Busca que devolve o erro de domínio com o par não cadastrado.
    pub fn require(&self, category: &str, kind_code: &str) -> Result<&FeePolicy, AppError> {
        self.get(category, kind_code).ok_or_else(|| AppError::UnknownFeePolicy {
            category: category.to_string(),
            kind_code: kind_code.to_string(),
        })
    }

    pub fn rules(&self) -> &[FeeRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn default_por_forma_de_politica() {
        let full = dec("800");

        let p = FeePolicy::Min { min: dec("50") };
        assert_eq!(resolve_default_fee(&p, full), dec("50"));

        let p = FeePolicy::Range { min: dec("100"), max: dec("400") };
        assert_eq!(resolve_default_fee(&p, full), dec("100"));

        let p = FeePolicy::MaxFull;
        assert_eq!(resolve_default_fee(&p, full), Decimal::ZERO);

        let p = FeePolicy::PercentOfFull { percent: dec("0.6") };
        assert_eq!(resolve_default_fee(&p, full), dec("480.00"));
    }

    #[test]
    fn override_abaixo_do_piso_rejeitado_com_o_piso() {
        let p = FeePolicy::Range { min: dec("100"), max: dec("400") };
        match validate_override(&p, dec("800"), dec("99")) {
            Err(AppError::FeeBelowFloor { floor }) => assert_eq!(floor, dec("100")),
            other => panic!("esperava FeeBelowFloor, veio {:?}", other),
        }
    }

    #[test]
    fn override_no_piso_ou_dentro_da_faixa_aceito() {
        let p = FeePolicy::Range { min: dec("100"), max: dec("400") };
        assert_eq!(
            validate_override(&p, dec("800"), dec("100")).unwrap(),
            OverrideOutcome::Accepted(dec("100"))
        );
        assert_eq!(
            validate_override(&p, dec("800"), dec("400")).unwrap(),
            OverrideOutcome::Accepted(dec("400"))
        );
    }

    #[test]
    fn override_acima_do_teto_grampeado_nao_rejeitado() {
        let p = FeePolicy::Range { min: dec("100"), max: dec("400") };
        assert_eq!(
            validate_override(&p, dec("800"), dec("500")).unwrap(),
            OverrideOutcome::Clamped(dec("400"))
        );

        let p = FeePolicy::MaxFull;
        assert_eq!(
            validate_override(&p, dec("800"), dec("1200")).unwrap(),
            OverrideOutcome::Clamped(dec("800"))
        );
    }

    #[test]
    fn max_full_aceita_qualquer_valor_ate_o_valor_integral() {
        let p = FeePolicy::MaxFull;
        assert_eq!(
            validate_override(&p, dec("800"), dec("0")).unwrap(),
            OverrideOutcome::Accepted(dec("0"))
        );
        assert_eq!(
            validate_override(&p, dec("800"), dec("800")).unwrap(),
            OverrideOutcome::Accepted(dec("800"))
        );
    }

    #[test]
    fn percent_of_full_tambem_tem_teto_no_valor_integral() {
        let p = FeePolicy::PercentOfFull { percent: dec("0.5") };
        assert_eq!(
            validate_override(&p, dec("800"), dec("900")).unwrap(),
            OverrideOutcome::Clamped(dec("800"))
        );
    }

    #[test]
    fn valor_negativo_sempre_rejeitado() {
        // Mesmo para MaxFull, cujo piso é zero
        let p = FeePolicy::MaxFull;
        assert!(matches!(
            validate_override(&p, dec("800"), dec("-1")),
            Err(AppError::FeeBelowFloor { .. })
        ));
    }

    #[test]
    fn catalogo_embutido_resolve_pares_conhecidos() {
        let table = FeeRuleTable::builtin();
        assert!(table.get("textile", "tear").is_some());
        assert!(table.get("glassware", "break").is_some());
        assert!(table.get("textile", "inexistente").is_none());

        match table.require("nave", "explosao") {
            Err(AppError::UnknownFeePolicy { category, kind_code }) => {
                assert_eq!(category, "nave");
                assert_eq!(kind_code, "explosao");
            }
            other => panic!("esperava UnknownFeePolicy, veio {:?}", other),
        }
    }
}
