//! Donation request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a donation request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// How urgently a request needs support.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Default,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    #[sea_orm(string_value = "LOW")]
    Low,
    #[sea_orm(string_value = "MEDIUM")]
    #[default]
    Medium,
    #[sea_orm(string_value = "HIGH")]
    High,
}

/// Kind of support a request accepts. Stored as the `accepts_*` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationType {
    Money,
    Items,
    Volunteer,
}

impl DonationType {
    /// Parse a lowercase tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "money" => Some(Self::Money),
            "items" => Some(Self::Items),
            "volunteer" => Some(Self::Volunteer),
            _ => None,
        }
    }

    /// The flag column backing this type.
    #[must_use]
    pub const fn column(self) -> Column {
        match self {
            Self::Money => Column::AcceptsMoney,
            Self::Items => Column::AcceptsItems,
            Self::Volunteer => Column::AcceptsVolunteer,
        }
    }
}

/// Donation request model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donation_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(indexed)]
    pub category_id: i32,

    /// Organizer who submitted the request.
    #[sea_orm(indexed)]
    pub organizer_id: String,

    pub organization_id: String,

    pub urgency: Urgency,

    pub accepts_money: bool,
    pub accepts_items: bool,
    pub accepts_volunteer: bool,

    /// Fundraising target, required when money is accepted.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub goal_amount: Option<Decimal>,

    /// Sum of all donations. Only the donation ledger writes this.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub current_amount: Decimal,

    /// Bank account and `PromptPay` details.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub payment_methods: Option<Json>,

    #[sea_orm(column_type = "Text", nullable)]
    pub items_needed: Option<String>,

    #[sea_orm(nullable)]
    pub volunteers_needed: Option<i32>,

    #[sea_orm(default_value = 0)]
    pub volunteers_received: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub volunteer_details: Option<String>,

    #[sea_orm(nullable)]
    pub location: Option<String>,

    #[sea_orm(nullable)]
    pub latitude: Option<f64>,

    #[sea_orm(nullable)]
    pub longitude: Option<f64>,

    #[sea_orm(indexed)]
    pub status: RequestStatus,

    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub approved_at: Option<DateTimeWithTimeZone>,

    /// Admin who approved the request.
    #[sea_orm(nullable)]
    pub approved_by: Option<String>,

    #[sea_orm(nullable)]
    pub rejected_at: Option<DateTimeWithTimeZone>,

    /// Raw hit counter, incremented on every public read.
    #[sea_orm(default_value = 0)]
    pub view_count: i32,

    /// Distinct donors, recomputed with every donation.
    #[sea_orm(default_value = 0)]
    pub supporters: i32,

    /// Reserved for ranking; always 0.
    #[sea_orm(default_value = 0.0)]
    pub recommendation_score: f64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrganizerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Organizer,
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
    #[sea_orm(has_many = "super::story::Entity")]
    Stories,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl Related<super::story::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stories.def()
    }
}

impl Model {
    /// Donation types this request accepts, in canonical order.
    #[must_use]
    pub fn donation_types(&self) -> Vec<DonationType> {
        [
            (self.accepts_money, DonationType::Money),
            (self.accepts_items, DonationType::Items),
            (self.accepts_volunteer, DonationType::Volunteer),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect()
    }
}

impl ActiveModelBehavior for ActiveModel {}
