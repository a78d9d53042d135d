// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        crate::health_check,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::add_item,
        handlers::orders::update_item_quantities,
        handlers::orders::remove_item,
        handlers::orders::add_checklist_entry,
        handlers::orders::set_checklist_checked,
        handlers::orders::add_assignee,
        handlers::orders::advance_order,

        // --- Settlement ---
        handlers::settlement::get_ledger,
        handlers::settlement::record_payment,
        handlers::settlement::hold_deposit,
        handlers::settlement::writeoff_deposit,
        handlers::settlement::release_deposit,
        handlers::settlement::accrue_damage,
        handlers::settlement::accrue_rent,

        // --- Damage ---
        handlers::damage::add_damage_line,
        handlers::damage::update_line_amount,
        handlers::damage::advance_case,
        handlers::damage::get_case,
        handlers::damage::get_committed_effects,
        handlers::damage::list_fee_policies,

        // --- Returns ---
        handlers::returns::close_return,
        handlers::returns::list_return_versions,
        handlers::returns::charge_overdue,
    ),
    components(
        schemas(

            // --- Ledger ---
            models::ledger::TxType,
            models::ledger::TxStatus,
            models::ledger::Transaction,
            models::ledger::TransactionReportRow,
            models::ledger::LedgerSummary,

            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::RentalOrder,
            models::orders::OrderItem,
            models::orders::ChecklistEntry,
            models::orders::OrderAssignee,
            models::orders::OrderDetail,

            // --- Fees ---
            models::fees::FeePolicy,
            models::fees::FeeRule,

            // --- Damage ---
            models::damage::DamageStage,
            models::damage::DamageCaseStatus,
            models::damage::DamageSeverity,
            models::damage::DamageCase,
            models::damage::DamageLine,
            models::damage::InventoryEffect,
            models::damage::CommittedEffect,

            // --- Returns ---
            models::returns::VersionStatus,
            models::returns::ShortfallItem,
            models::returns::ReturnVersion,
            models::returns::OverdueQuote,
            models::returns::VersionWithQuote,

            // --- Outcomes ---
            services::lifecycle_service::AdvanceOutcome,
            services::returns_service::CloseOutcome,

            // --- ORDERS PAYLOADS ---
            handlers::orders::CreateOrderPayload,
            handlers::orders::AddItemPayload,
            handlers::orders::UpdateItemQuantitiesPayload,
            handlers::orders::AddChecklistEntryPayload,
            handlers::orders::SetChecklistCheckedPayload,
            handlers::orders::AddAssigneePayload,
            handlers::orders::AdvanceOrderPayload,

            // --- SETTLEMENT PAYLOADS ---
            handlers::settlement::RecordPaymentPayload,
            handlers::settlement::DepositPayload,
            handlers::settlement::AccrueChargePayload,
            handlers::settlement::LedgerView,

            // --- DAMAGE PAYLOADS ---
            handlers::damage::AddDamageLinePayload,
            handlers::damage::UpdateLineAmountPayload,
            handlers::damage::AdvanceCasePayload,
            handlers::damage::DamageLineCreated,
            handlers::damage::CaseWithLines,

            // --- RETURNS PAYLOADS ---
            handlers::returns::ChargeOverdueResponse,
        )
    ),
    tags(
        (name = "Health", description = "Verificação de Saúde do Serviço"),
        (name = "Orders", description = "Gestão de Pedidos de Locação"),
        (name = "Settlement", description = "Razão Financeiro, Pagamentos e Caução"),
        (name = "Damage", description = "Casos de Dano e Políticas de Taxa"),
        (name = "Returns", description = "Devolução Parcial e Versões")
    )
)]
pub struct ApiDoc;
