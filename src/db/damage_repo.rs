// src/db/damage_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::damage::{DamageCase, DamageCaseStatus, DamageLine, DamageSeverity, DamageStage},
};

#[derive(Clone)]
pub struct DamageRepository {
    pool: PgPool,
}

impl DamageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  CASOS
    // =========================================================================

    pub async fn find_case<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        stage: DamageStage,
    ) -> Result<Option<DamageCase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let case = sqlx::query_as::<_, DamageCase>(
            r#"
            SELECT id, order_id, stage, status, created_at
            FROM damage_cases
            WHERE order_id = $1 AND stage = $2
            "#,
        )
        .bind(order_id)
        .bind(stage)
        .fetch_optional(executor)
        .await?;

        Ok(case)
    }

    pub async fn create_case<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        stage: DamageStage,
    ) -> Result<DamageCase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let case = sqlx::query_as::<_, DamageCase>(
            r#"
            INSERT INTO damage_cases (order_id, stage)
            VALUES ($1, $2)
            RETURNING id, order_id, stage, status, created_at
            "#,
        )
        .bind(order_id)
        .bind(stage)
        .fetch_one(executor)
        .await?;

        Ok(case)
    }

    pub async fn get_case<'e, E>(
        &self,
        executor: E,
        case_id: Uuid,
    ) -> Result<DamageCase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let case = sqlx::query_as::<_, DamageCase>(
            r#"
            SELECT id, order_id, stage, status, created_at
            FROM damage_cases
            WHERE id = $1
            "#,
        )
        .bind(case_id)
        .fetch_optional(executor)
        .await?;

        case.ok_or_else(|| AppError::ResourceNotFound(format!("Caso de dano {}", case_id)))
    }

    pub async fn update_case_status<'e, E>(
        &self,
        executor: E,
        case_id: Uuid,
        status: DamageCaseStatus,
    ) -> Result<DamageCase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let case = sqlx::query_as::<_, DamageCase>(
            r#"
            UPDATE damage_cases
            SET status = $2
            WHERE id = $1
            RETURNING id, order_id, stage, status, created_at
            "#,
        )
        .bind(case_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        case.ok_or_else(|| AppError::ResourceNotFound(format!("Caso de dano {}", case_id)))
    }

    /// Casos ainda abertos de um pedido (qualquer status ≠ Closed).
    pub async fn list_open_cases<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<DamageCase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cases = sqlx::query_as::<_, DamageCase>(
            r#"
            SELECT id, order_id, stage, status, created_at
            FROM damage_cases
            WHERE order_id = $1 AND status <> 'CLOSED'
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(cases)
    }

    // =========================================================================
    //  LINHAS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        case_id: Uuid,
        order_item_id: Uuid,
        category: &str,
        kind_code: &str,
        severity: DamageSeverity,
        qty: i32,
        amount_per_unit: Decimal,
        total: Decimal,
        note: Option<&str>,
        photo_ref: Option<&str>,
    ) -> Result<DamageLine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let line = sqlx::query_as::<_, DamageLine>(
            r#"
            INSERT INTO damage_lines
                (case_id, order_item_id, category, kind_code, severity, qty,
                 amount_per_unit, total, note, photo_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, case_id, order_item_id, category, kind_code, severity, qty,
                      amount_per_unit, total, note, photo_ref, created_at
            "#,
        )
        .bind(case_id)
        .bind(order_item_id)
        .bind(category)
        .bind(kind_code)
        .bind(severity)
        .bind(qty)
        .bind(amount_per_unit)
        .bind(total)
        .bind(note)
        .bind(photo_ref)
        .fetch_one(executor)
        .await?;

        Ok(line)
    }

    pub async fn get_line<'e, E>(
        &self,
        executor: E,
        line_id: Uuid,
    ) -> Result<DamageLine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let line = sqlx::query_as::<_, DamageLine>(
            r#"
            SELECT id, case_id, order_item_id, category, kind_code, severity, qty,
                   amount_per_unit, total, note, photo_ref, created_at
            FROM damage_lines
            WHERE id = $1
            "#,
        )
        .bind(line_id)
        .fetch_optional(executor)
        .await?;

        line.ok_or_else(|| AppError::ResourceNotFound(format!("Linha de dano {}", line_id)))
    }

    /// Reescreve o valor unitário e o total congelado da linha.
    /// O total vem pronto do service: é calculado na gravação, nunca aqui.
    pub async fn update_line_amount<'e, E>(
        &self,
        executor: E,
        line_id: Uuid,
        amount_per_unit: Decimal,
        total: Decimal,
    ) -> Result<DamageLine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let line = sqlx::query_as::<_, DamageLine>(
            r#"
            UPDATE damage_lines
            SET amount_per_unit = $2, total = $3
            WHERE id = $1
            RETURNING id, case_id, order_item_id, category, kind_code, severity, qty,
                      amount_per_unit, total, note, photo_ref, created_at
            "#,
        )
        .bind(line_id)
        .bind(amount_per_unit)
        .bind(total)
        .fetch_optional(executor)
        .await?;

        line.ok_or_else(|| AppError::ResourceNotFound(format!("Linha de dano {}", line_id)))
    }

    pub async fn list_lines<'e, E>(
        &self,
        executor: E,
        case_id: Uuid,
    ) -> Result<Vec<DamageLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, DamageLine>(
            r#"
            SELECT id, case_id, order_item_id, category, kind_code, severity, qty,
                   amount_per_unit, total, note, photo_ref, created_at
            FROM damage_lines
            WHERE case_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(case_id)
        .fetch_all(executor)
        .await?;

        Ok(lines)
    }
}
