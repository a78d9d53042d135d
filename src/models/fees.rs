// src/models/fees.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Política de taxa de dano para um par (categoria, tipo de dano).
///
/// O sistema antigo guardava um objeto solto onde a forma era deduzida pelas
/// chaves presentes (`min`, `range`, `max: "full"`, `percentOf`). Aqui cada
/// forma é uma variante: combinações ilegais não são representáveis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum FeePolicy {
    /// Piso fixo, sem teto.
    Min { min: Decimal },

    /// Faixa inclusiva [min, max].
    Range { min: Decimal, max: Decimal },

    /// Teto = valor de reposição integral do item (fornecido pelo chamador,
    /// nunca armazenado na política). Sem piso numérico além de zero.
    MaxFull,

    /// Fração do valor de reposição integral, percent ∈ (0, 1].
    PercentOfFull { percent: Decimal },
}

impl FeePolicy {
    /// Piso resolvido da política: abaixo dele um override é sempre rejeitado.
    pub fn floor(&self) -> Decimal {
        match self {
            FeePolicy::Min { min } => *min,
            FeePolicy::Range { min, .. } => *min,
            FeePolicy::MaxFull | FeePolicy::PercentOfFull { .. } => Decimal::ZERO,
        }
    }
}

/// Uma regra do catálogo estático: (categoria, código do dano) → política.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeRule {
    #[schema(example = "textile")]
    pub category: String,

    #[schema(example = "tear")]
    pub kind_code: String,

    pub policy: FeePolicy,
}
