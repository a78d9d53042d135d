// src/db/orders_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{ChecklistEntry, OrderAssignee, OrderItem, OrderStatus, RentalOrder},
};

#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  PEDIDOS
    // =========================================================================

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        issue_date: Option<NaiveDate>,
        return_due_date: Option<NaiveDate>,
        discount: Decimal,
        notes: Option<&str>,
    ) -> Result<RentalOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, RentalOrder>(
            r#"
            INSERT INTO rental_orders (issue_date, return_due_date, discount, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, display_id, status, issue_date, return_due_date, discount, notes,
                      created_at, updated_at
            "#,
        )
        .bind(issue_date)
        .bind(return_due_date)
        .bind(discount)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn get_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<RentalOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, RentalOrder>(
            r#"
            SELECT id, display_id, status, issue_date, return_due_date, discount, notes,
                   created_at, updated_at
            FROM rental_orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        order.ok_or_else(|| AppError::ResourceNotFound(format!("Pedido {}", order_id)))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<RentalOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, RentalOrder>(
            r#"
            UPDATE rental_orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, display_id, status, issue_date, return_due_date, discount, notes,
                      created_at, updated_at
            "#,
        )
        .bind(order_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        order.ok_or_else(|| AppError::ResourceNotFound(format!("Pedido {}", order_id)))
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        sku: &str,
        name: &str,
        ordered_qty: i32,
        rent_price: Decimal,
        deposit_value: Decimal,
        replacement_value: Decimal,
        serial_numbers: Option<&[String]>,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items
                (order_id, sku, name, ordered_qty, rent_price, deposit_value,
                 replacement_value, serial_numbers)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, order_id, sku, name, ordered_qty, picked_qty, returned_qty,
                      rent_price, deposit_value, replacement_value, serial_numbers, scanned_serials
            "#,
        )
        .bind(order_id)
        .bind(sku)
        .bind(name)
        .bind(ordered_qty)
        .bind(rent_price)
        .bind(deposit_value)
        .bind(replacement_value)
        .bind(serial_numbers)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn get_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, sku, name, ordered_qty, picked_qty, returned_qty,
                   rent_price, deposit_value, replacement_value, serial_numbers, scanned_serials
            FROM order_items
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(executor)
        .await?;

        item.ok_or_else(|| AppError::ResourceNotFound(format!("Item {}", item_id)))
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, sku, name, ordered_qty, picked_qty, returned_qty,
                   rent_price, deposit_value, replacement_value, serial_numbers, scanned_serials
            FROM order_items
            WHERE order_id = $1
            ORDER BY sku ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    /// Atualização explícita de quantidades, sem truques posicionais: quem
    /// quer mexer num item diz qual e o quê.
    pub async fn update_item_quantities<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        picked_qty: Option<i32>,
        returned_qty: Option<i32>,
        scanned_serials: Option<&[String]>,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            UPDATE order_items
            SET picked_qty = COALESCE($2, picked_qty),
                returned_qty = COALESCE($3, returned_qty),
                scanned_serials = COALESCE($4, scanned_serials)
            WHERE id = $1
            RETURNING id, order_id, sku, name, ordered_qty, picked_qty, returned_qty,
                      rent_price, deposit_value, replacement_value, serial_numbers, scanned_serials
            "#,
        )
        .bind(item_id)
        .bind(picked_qty)
        .bind(returned_qty)
        .bind(scanned_serials)
        .fetch_optional(executor)
        .await?;

        item.ok_or_else(|| AppError::ResourceNotFound(format!("Item {}", item_id)))
    }

    pub async fn remove_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(item_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Item {}", item_id)));
        }
        Ok(())
    }

    // =========================================================================
    //  CHECKLIST & EQUIPE
    // =========================================================================

    pub async fn add_checklist_entry<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        label: &str,
        required: bool,
    ) -> Result<ChecklistEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, ChecklistEntry>(
            r#"
            INSERT INTO order_checklist (order_id, label, required)
            VALUES ($1, $2, $3)
            RETURNING id, order_id, label, required, checked
            "#,
        )
        .bind(order_id)
        .bind(label)
        .bind(required)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn set_checklist_checked<'e, E>(
        &self,
        executor: E,
        entry_id: Uuid,
        checked: bool,
    ) -> Result<ChecklistEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, ChecklistEntry>(
            r#"
            UPDATE order_checklist
            SET checked = $2
            WHERE id = $1
            RETURNING id, order_id, label, required, checked
            "#,
        )
        .bind(entry_id)
        .bind(checked)
        .fetch_optional(executor)
        .await?;

        entry.ok_or_else(|| AppError::ResourceNotFound(format!("Entrada de checklist {}", entry_id)))
    }

    pub async fn list_checklist<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<ChecklistEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, ChecklistEntry>(
            r#"
            SELECT id, order_id, label, required, checked
            FROM order_checklist
            WHERE order_id = $1
            ORDER BY label ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }

    pub async fn add_assignee<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        staff_name: &str,
        role: &str,
    ) -> Result<OrderAssignee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignee = sqlx::query_as::<_, OrderAssignee>(
            r#"
            INSERT INTO order_assignees (order_id, staff_name, role)
            VALUES ($1, $2, $3)
            RETURNING id, order_id, staff_name, role
            "#,
        )
        .bind(order_id)
        .bind(staff_name)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(assignee)
    }

    pub async fn list_assignees<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderAssignee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignees = sqlx::query_as::<_, OrderAssignee>(
            r#"
            SELECT id, order_id, staff_name, role
            FROM order_assignees
            WHERE order_id = $1
            ORDER BY staff_name ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(assignees)
    }
}
