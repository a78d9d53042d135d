// src/services/orders_service.rs
//
// Camada mínima de intake de pedidos: o suficiente para alimentar o motor de
// acerto. Gestão completa de catálogo/cliente fica com a aplicação em volta.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrdersRepository,
    models::orders::{ChecklistEntry, OrderAssignee, OrderDetail, OrderItem, RentalOrder},
};

#[derive(Clone)]
pub struct OrdersService {
    repo: OrdersRepository,
}

impl OrdersService {
    pub fn new(repo: OrdersRepository) -> Self {
        Self { repo }
    }

    pub async fn create_order(
        &self,
        issue_date: Option<NaiveDate>,
        return_due_date: Option<NaiveDate>,
        discount: Decimal,
        notes: Option<&str>,
    ) -> Result<RentalOrder, AppError> {
        self.repo
            .create_order(self.repo.pool(), issue_date, return_due_date, discount, notes)
            .await
    }

    pub async fn get_detail(&self, order_id: Uuid) -> Result<OrderDetail, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let header = self.repo.get_order(&mut *tx, order_id).await?;
        let items = self.repo.list_items(&mut *tx, order_id).await?;
        let checklist = self.repo.list_checklist(&mut *tx, order_id).await?;
        let assignees = self.repo.list_assignees(&mut *tx, order_id).await?;
        tx.commit().await?;

        Ok(OrderDetail {
            header,
            items,
            checklist,
            assignees,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_item(
        &self,
        order_id: Uuid,
        sku: &str,
        name: &str,
        ordered_qty: i32,
        rent_price: Decimal,
        deposit_value: Decimal,
        replacement_value: Decimal,
        serial_numbers: Option<&[String]>,
    ) -> Result<OrderItem, AppError> {
        // O pedido precisa existir; o erro 404 sai daqui, não de FK violada.
        self.repo.get_order(self.repo.pool(), order_id).await?;
        self.repo
            .add_item(
                self.repo.pool(),
                order_id,
                sku,
                name,
                ordered_qty,
                rent_price,
                deposit_value,
                replacement_value,
                serial_numbers,
            )
            .await
    }

    pub async fn update_item_quantities(
        &self,
        item_id: Uuid,
        picked_qty: Option<i32>,
        returned_qty: Option<i32>,
        scanned_serials: Option<&[String]>,
    ) -> Result<OrderItem, AppError> {
        if picked_qty.is_some_and(|q| q < 0) || returned_qty.is_some_and(|q| q < 0) {
            return Err(AppError::NonPositiveAmount);
        }
        self.repo
            .update_item_quantities(self.repo.pool(), item_id, picked_qty, returned_qty, scanned_serials)
            .await
    }

    pub async fn remove_item(&self, item_id: Uuid) -> Result<(), AppError> {
        self.repo.remove_item(self.repo.pool(), item_id).await
    }

    pub async fn add_checklist_entry(
        &self,
        order_id: Uuid,
        label: &str,
        required: bool,
    ) -> Result<ChecklistEntry, AppError> {
        self.repo.get_order(self.repo.pool(), order_id).await?;
        self.repo
            .add_checklist_entry(self.repo.pool(), order_id, label, required)
            .await
    }

    pub async fn set_checklist_checked(
        &self,
        entry_id: Uuid,
        checked: bool,
    ) -> Result<ChecklistEntry, AppError> {
        self.repo
            .set_checklist_checked(self.repo.pool(), entry_id, checked)
            .await
    }

    pub async fn add_assignee(
        &self,
        order_id: Uuid,
        staff_name: &str,
        role: &str,
    ) -> Result<OrderAssignee, AppError> {
        self.repo.get_order(self.repo.pool(), order_id).await?;
        self.repo
            .add_assignee(self.repo.pool(), order_id, staff_name, role)
            .await
    }
}
