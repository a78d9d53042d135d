// src/db/returns_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::returns::{ReturnVersion, ShortfallItem, VersionStatus},
};

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: PgPool,
}

impl ReturnsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A versão Active do pedido, se houver. O índice único parcial garante
    /// no máximo uma.
    pub async fn active_version<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<ReturnVersion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let version = sqlx::query_as::<_, ReturnVersion>(
            r#"
            SELECT id, parent_order_id, version_number, status, items, return_due_date,
                   daily_rate_snapshot, charged_overdue, created_at
            FROM return_versions
            WHERE parent_order_id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        Ok(version)
    }

    /// Busca a versão travando a linha até o fim da transação. Quem for
    /// cobrar em cima do acumulador charged_overdue lê por aqui: duas
    /// cobranças concorrentes partindo da mesma base duplicariam a multa.
    pub async fn get_version_for_update<'e, E>(
        &self,
        executor: E,
        version_id: Uuid,
    ) -> Result<ReturnVersion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let version = sqlx::query_as::<_, ReturnVersion>(
            r#"
            SELECT id, parent_order_id, version_number, status, items, return_due_date,
                   daily_rate_snapshot, charged_overdue, created_at
            FROM return_versions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(version_id)
        .fetch_optional(executor)
        .await?;

        version.ok_or_else(|| AppError::ResourceNotFound(format!("Versão de devolução {}", version_id)))
    }

    pub async fn list_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<ReturnVersion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let versions = sqlx::query_as::<_, ReturnVersion>(
            r#"
            SELECT id, parent_order_id, version_number, status, items, return_due_date,
                   daily_rate_snapshot, charged_overdue, created_at
            FROM return_versions
            WHERE parent_order_id = $1
            ORDER BY version_number ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(versions)
    }

    pub async fn insert_version<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        version_number: i32,
        items: &[ShortfallItem],
        return_due_date: NaiveDate,
        daily_rate_snapshot: Decimal,
    ) -> Result<ReturnVersion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let version = sqlx::query_as::<_, ReturnVersion>(
            r#"
            INSERT INTO return_versions
                (parent_order_id, version_number, items, return_due_date, daily_rate_snapshot)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, parent_order_id, version_number, status, items, return_due_date,
                      daily_rate_snapshot, charged_overdue, created_at
            "#,
        )
        .bind(order_id)
        .bind(version_number)
        .bind(Json(items))
        .bind(return_due_date)
        .bind(daily_rate_snapshot)
        .fetch_one(executor)
        .await?;

        Ok(version)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        version_id: Uuid,
        status: VersionStatus,
    ) -> Result<ReturnVersion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let version = sqlx::query_as::<_, ReturnVersion>(
            r#"
            UPDATE return_versions
            SET status = $2
            WHERE id = $1
            RETURNING id, parent_order_id, version_number, status, items, return_due_date,
                      daily_rate_snapshot, charged_overdue, created_at
            "#,
        )
        .bind(version_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        version.ok_or_else(|| AppError::ResourceNotFound(format!("Versão de devolução {}", version_id)))
    }

    /// Acumula a fatia recém-cobrada da multa de atraso.
    pub async fn add_charged_overdue<'e, E>(
        &self,
        executor: E,
        version_id: Uuid,
        delta: Decimal,
    ) -> Result<ReturnVersion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let version = sqlx::query_as::<_, ReturnVersion>(
            r#"
            UPDATE return_versions
            SET charged_overdue = charged_overdue + $2
            WHERE id = $1
            RETURNING id, parent_order_id, version_number, status, items, return_due_date,
                      daily_rate_snapshot, charged_overdue, created_at
            "#,
        )
        .bind(version_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;

        version.ok_or_else(|| AppError::ResourceNotFound(format!("Versão de devolução {}", version_id)))
    }
}
