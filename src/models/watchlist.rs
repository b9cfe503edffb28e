// ============================================================================
// MODÈLE : WATCHLIST (titre regardable)
// ============================================================================
//
// Colonnes d'agrégat (gérées uniquement par ReviewService, jamais par l'API
// catalogue):
//   - number_rating : nombre de reviews comptées
//   - rating_sum    : somme entière des notes comptées
//   - avg_rating    : rating_sum / number_rating (0 si aucune note)
//
// Les trois colonnes sont toujours écrites ensemble, dans la transaction qui
// crée/modifie/supprime la review.
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watchlist")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub platform_id: i32,
    pub active: bool,
    pub avg_rating: f64,
    pub number_rating: i32,
    #[serde(skip_serializing)]
    pub rating_sum: i64,
    pub created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stream_platform::Entity",
        from = "Column::PlatformId",
        to = "super::stream_platform::Column::Id",
        on_delete = "Cascade"
    )]
    StreamPlatform,

    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::stream_platform::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StreamPlatform.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
