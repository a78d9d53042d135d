// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, sync::Arc, time::Duration};

use crate::db::{DamageRepository, LedgerRepository, OrdersRepository, ReturnsRepository};
use crate::services::{
    DamageService, FeeRuleTable, LifecycleService, OrdersService, ReturnsService,
    SettlementService,
};

/// Políticas configuráveis do motor. São regras de negócio ajustáveis por
/// deploy, não flags de debug.
#[derive(Debug, Clone, Copy)]
pub struct EnginePolicy {
    /// Checklist obrigatório bloqueia a liberação para entrega.
    pub require_checklist: bool,
    /// Exigir caso de dano fechado antes do acerto final.
    pub require_damage_closed: bool,
}

impl EnginePolicy {
    fn from_env() -> Self {
        let flag = |name: &str, default: bool| {
            env::var(name)
                .ok()
                .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
                .unwrap_or(default)
        };
        Self {
            require_checklist: flag("REQUIRE_CHECKLIST", true),
            require_damage_closed: flag("REQUIRE_DAMAGE_CLOSED", false),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub policy: EnginePolicy,
    pub fee_table: Arc<FeeRuleTable>,
    pub orders_service: OrdersService,
    pub settlement_service: SettlementService,
    pub lifecycle_service: LifecycleService,
    pub damage_service: DamageService,
    pub returns_service: ReturnsService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, quem chama
    // decide abortar a subida.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let policy = EnginePolicy::from_env();

        // Catálogo estático de taxas: embutido, com override opcional por
        // arquivo JSON de deploy. Carregado uma vez; não muda em runtime.
        let fee_table = match env::var("FEE_TABLE_PATH") {
            Ok(path) => {
                let table = FeeRuleTable::from_json_file(&PathBuf::from(&path))?;
                tracing::info!(path, "catálogo de taxas carregado do arquivo");
                Arc::new(table)
            }
            Err(_) => Arc::new(FeeRuleTable::builtin()),
        };

        // --- Monta o gráfico de dependências ---
        let ledger_repo = LedgerRepository::new(db_pool.clone());
        let orders_repo = OrdersRepository::new(db_pool.clone());
        let damage_repo = DamageRepository::new(db_pool.clone());
        let returns_repo = ReturnsRepository::new(db_pool.clone());

        let orders_service = OrdersService::new(orders_repo.clone());
        let settlement_service = SettlementService::new(ledger_repo.clone());
        let lifecycle_service = LifecycleService::new(
            orders_repo.clone(),
            ledger_repo.clone(),
            damage_repo.clone(),
            returns_repo.clone(),
            policy,
        );
        let damage_service =
            DamageService::new(damage_repo.clone(), orders_repo.clone(), fee_table.clone());
        let returns_service =
            ReturnsService::new(returns_repo, orders_repo, ledger_repo, damage_repo, policy);

        Ok(Self {
            db_pool,
            policy,
            fee_table,
            orders_service,
            settlement_service,
            lifecycle_service,
            damage_service,
            returns_service,
        })
    }
}
