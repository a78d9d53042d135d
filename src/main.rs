//src/main.rs

use axum::{
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Serviço no ar", body = String)
    )
)]
pub async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de pedido: cadastro, itens, checklist, responsáveis e ciclo de vida
    let order_routes = Router::new()
        .route("/"
               ,post(handlers::orders::create_order)
        )
        .route("/{order_id}"
               ,get(handlers::orders::get_order)
        )
        .route("/{order_id}/items"
               ,post(handlers::orders::add_item)
        )
        .route("/{order_id}/checklist"
               ,post(handlers::orders::add_checklist_entry)
        )
        .route("/{order_id}/assignees"
               ,post(handlers::orders::add_assignee)
        )
        .route("/{order_id}/advance"
               ,post(handlers::orders::advance_order)
        );

    // Rotas de acerto: razão, pagamentos e caução
    let settlement_routes = Router::new()
        .route("/{order_id}/ledger"
               ,get(handlers::settlement::get_ledger)
        )
        .route("/{order_id}/payments"
               ,post(handlers::settlement::record_payment)
        )
        .route("/{order_id}/deposit/hold"
               ,post(handlers::settlement::hold_deposit)
        )
        .route("/{order_id}/deposit/writeoff"
               ,post(handlers::settlement::writeoff_deposit)
        )
        .route("/{order_id}/deposit/release"
               ,post(handlers::settlement::release_deposit)
        )
        .route("/{order_id}/damage-fees"
               ,post(handlers::settlement::accrue_damage)
        )
        .route("/{order_id}/rent"
               ,post(handlers::settlement::accrue_rent)
        );

    // Rotas de dano e devolução ancoradas no pedido
    let order_damage_routes = Router::new()
        .route("/{order_id}/damage-lines"
               ,post(handlers::damage::add_damage_line)
        )
        .route("/{order_id}/return/close"
               ,post(handlers::returns::close_return)
        )
        .route("/{order_id}/return-versions"
               ,get(handlers::returns::list_return_versions)
        );

    let damage_case_routes = Router::new()
        .route("/{case_id}"
               ,get(handlers::damage::get_case)
        )
        .route("/{case_id}/advance"
               ,post(handlers::damage::advance_case)
        )
        .route("/{case_id}/effects"
               ,get(handlers::damage::get_committed_effects)
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/fee-policies", get(handlers::damage::list_fee_policies))
        .route("/api/items/{item_id}"
               ,patch(handlers::orders::update_item_quantities)
               .delete(handlers::orders::remove_item)
        )
        .route("/api/checklist/{entry_id}"
               ,patch(handlers::orders::set_checklist_checked)
        )
        .route("/api/damage-lines/{line_id}"
               ,patch(handlers::damage::update_line_amount)
        )
        .route("/api/return-versions/{version_id}/charge-overdue"
               ,post(handlers::returns::charge_overdue)
        )
        .nest("/api/orders", order_routes)
        .nest("/api/orders", settlement_routes)
        .nest("/api/orders", order_damage_routes)
        .nest("/api/damage-cases", damage_case_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
