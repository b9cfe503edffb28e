// connexion BD + création du schéma depuis les entités

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    sea_query::Index,
};
use tracing::info;

use crate::models::{review, stream_platform, token_blacklist, users, watchlist};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables manquantes (ordre = ordre des clés étrangères)
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, stream_platform::Entity).await?;
    create_table(db, watchlist::Entity).await?;
    create_table(db, review::Entity).await?;
    create_table(db, token_blacklist::Entity).await?;

    // Filet de sécurité: la vraie garantie est le verrou pris par ReviewService
    let backend = db.get_database_backend();
    let unique_review = Index::create()
        .name("idx_review_user_watchlist")
        .table(review::Entity)
        .col(review::Column::ReviewUserId)
        .col(review::Column::WatchlistId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&unique_review)).await?;

    info!("Database schema ready");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Base SQLite en mémoire avec le schéma complet, pour les tests
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // Une seule connexion: chaque connexion SQLite en mémoire a sa propre base
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    create_schema(&db).await.unwrap();
    db
}
