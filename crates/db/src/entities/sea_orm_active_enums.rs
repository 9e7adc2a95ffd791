//! `SeaORM` active enums backed by Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_category")]
pub enum DocumentCategory {
    #[sea_orm(string_value = "bank_statement")]
    BankStatement,
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "other")]
    Other,
    #[sea_orm(string_value = "receipt")]
    Receipt,
    #[sea_orm(string_value = "tax_form")]
    TaxForm,
}
