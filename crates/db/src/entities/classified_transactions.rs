//! `SeaORM` Entity for classified_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "classified_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub classification_id: Uuid,
    pub transaction_id: Uuid,
    /// 0-based position within the submitted split list.
    pub line_no: i32,
    pub cost_centre_id: Uuid,
    pub entity_id: Uuid,
    pub transaction_type_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub contract_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub value_date: Date,
    pub remarks: Option<String>,
    pub is_active_classification: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_delete = "Cascade"
    )]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
