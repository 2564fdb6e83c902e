//! Donation entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single contribution. Rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub donation_request_id: String,

    #[sea_orm(indexed)]
    pub donor_id: String,

    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,

    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_anonymous: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::donation_request::Entity",
        from = "Column::DonationRequestId",
        to = "super::donation_request::Column::Id",
        on_delete = "Cascade"
    )]
    DonationRequest,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DonorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Donor,
}

impl Related<super::donation_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DonationRequest.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
