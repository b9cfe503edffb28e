// ============================================================================
// MODÈLE : TOKEN BLACKLIST
// ============================================================================
//
// Description:
//   Refresh tokens révoqués au logout, identifiés par leur jti.
//
// Points d'attention:
//   - Table en ajout seul: on n'y supprime ni ne modifie jamais rien
//   - jti UNIQUE: deux logouts concurrents du même token -> une seule ligne
//   - expires_at = exp du refresh token (utile pour une purge éventuelle)
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token_blacklist")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub jti: String,

    pub user_id: i32,

    pub expires_at: DateTimeUtc,

    pub created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
