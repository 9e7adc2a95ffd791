//! `SeaORM` entity definitions.

pub mod documents;
pub mod sea_orm_active_enums;
pub mod users;
