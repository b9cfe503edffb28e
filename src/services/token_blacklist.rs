use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::models::token_blacklist;

/// Révocation des refresh tokens (table en ajout seul)
pub struct TokenBlacklist;

impl TokenBlacklist {
    pub async fn contains(db: &DatabaseConnection, jti: &str) -> Result<bool, DbErr> {
        let found = token_blacklist::Entity::find()
            .filter(token_blacklist::Column::Jti.eq(jti))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Idempotent: un jti déjà présent est ignoré (ON CONFLICT DO NOTHING)
    pub async fn add(
        db: &DatabaseConnection,
        jti: &str,
        user_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let entry = token_blacklist::ActiveModel {
            jti: Set(jti.to_string()),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
            created: Set(Utc::now()),
            ..Default::default()
        };

        token_blacklist::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(token_blacklist::Column::Jti)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::test_support::seed_user;

    #[actix_web::test]
    async fn test_add_is_idempotent() {
        let db = test_connection().await;
        let user = seed_user(&db, "alice@example.com", false).await;

        assert!(!TokenBlacklist::contains(&db, "abc").await.unwrap());
        TokenBlacklist::add(&db, "abc", user.id, Utc::now()).await.unwrap();
        TokenBlacklist::add(&db, "abc", user.id, Utc::now()).await.unwrap();
        assert!(TokenBlacklist::contains(&db, "abc").await.unwrap());

        let rows = token_blacklist::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
