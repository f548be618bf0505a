//! `SeaORM` Entity for the rice_prices table (append-only price log)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rice_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Whole currency units (KRW)
    pub price: i64,
    pub item_name: String,
    /// Region label or the national-average sentinel
    pub location: String,
    /// Ingestion commit time, shared by every row of one batch
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
