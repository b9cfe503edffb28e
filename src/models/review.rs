use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Une seule review par couple (review_user_id, watchlist_id), vérifiée à
/// l'écriture par ReviewService sous verrou du titre.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub review_user_id: i32,
    pub watchlist_id: i32,
    pub rating: i32, // 1..=5
    pub description: String,
    pub active: bool,
    pub created: DateTimeUtc,
    pub updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReviewUserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::watchlist::Entity",
        from = "Column::WatchlistId",
        to = "super::watchlist::Column::Id",
        on_delete = "Cascade"
    )]
    Watchlist,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::watchlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Watchlist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
