//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionDirection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub bank_account_id: Uuid,
    pub cost_centre_id: Uuid,
    pub transaction_type_id: Uuid,
    pub direction: TransactionDirection,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub date: Date,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id",
        on_delete = "Cascade"
    )]
    Companies,
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id",
        on_delete = "Cascade"
    )]
    BankAccounts,
    #[sea_orm(
        belongs_to = "super::cost_centres::Entity",
        from = "Column::CostCentreId",
        to = "super::cost_centres::Column::Id",
        on_delete = "Cascade"
    )]
    CostCentres,
    #[sea_orm(
        belongs_to = "super::transaction_types::Entity",
        from = "Column::TransactionTypeId",
        to = "super::transaction_types::Column::Id",
        on_delete = "Cascade"
    )]
    TransactionTypes,
    #[sea_orm(has_many = "super::classified_transactions::Entity")]
    ClassifiedTransactions,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::classified_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassifiedTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
