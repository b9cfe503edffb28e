// ============================================================================
// SERVICE : REVIEWS + AGRÉGAT DES NOTES
// ============================================================================
//
// Toute écriture de review (création, modification, suppression) suit le même
// schéma, dans UNE transaction:
//   1. SELECT ... FOR UPDATE sur la ligne du titre (sérialise les écritures
//      concurrentes sur un même titre)
//   2. vérification (doublon / existence / permission)
//   3. écriture de la review
//   4. écriture de l'agrégat (rating_sum, number_rating, avg_rating ensemble)
//   5. commit
// Toute erreur abandonne la transaction: jamais de review sans agrégat à jour
// ni l'inverse.
//
// L'index unique (review_user_id, watchlist_id) reste un filet de sécurité:
// une violation est renvoyée comme DuplicateReview.
//
// ============================================================================

use actix_web::http::Method;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, warn};
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::ReviewRequest;
use crate::models::{review, watchlist};
use crate::services::rating::RatingAggregate;
use crate::utils::permissions::ensure_access;

pub struct ReviewService;

impl ReviewService {
    /// Crée la review de `user_id` pour le titre `watchlist_id` et met à jour l'agrégat
    pub async fn create_review(
        db: &DatabaseConnection,
        user_id: i32,
        watchlist_id: i32,
        request: ReviewRequest,
    ) -> Result<review::Model, ApiError> {
        // Validation avant tout accès à la BD
        request.validate()?;

        let txn = db.begin().await?;

        let title = Self::lock_title(&txn, watchlist_id).await?;

        let existing = review::Entity::find()
            .filter(review::Column::ReviewUserId.eq(user_id))
            .filter(review::Column::WatchlistId.eq(watchlist_id))
            .one(&txn)
            .await?;

        if existing.is_some() {
            warn!(user_id, watchlist_id, "duplicate review rejected");
            txn.rollback().await?;
            return Err(ApiError::DuplicateReview);
        }

        let now = Utc::now();
        let created = review::ActiveModel {
            review_user_id: Set(user_id),
            watchlist_id: Set(watchlist_id),
            rating: Set(request.rating),
            description: Set(request.description),
            active: Set(request.active.unwrap_or(true)),
            created: Set(now),
            updated: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ApiError::from_review_insert)?;

        let aggregate = aggregate_of(&title).add(created.rating);
        Self::store_aggregate(&txn, title, aggregate).await?;

        txn.commit().await?;

        info!(
            review_id = created.id,
            user_id,
            watchlist_id,
            avg_rating = aggregate.average(),
            number_rating = aggregate.count,
            "review created"
        );
        Ok(created)
    }

    /// Reviews d'un titre (liste vide si le titre n'existe pas)
    pub async fn list_for_title(
        db: &DatabaseConnection,
        watchlist_id: i32,
    ) -> Result<Vec<review::Model>, ApiError> {
        Ok(review::Entity::find()
            .filter(review::Column::WatchlistId.eq(watchlist_id))
            .order_by_asc(review::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get_review(db: &DatabaseConnection, review_id: i32) -> Result<review::Model, ApiError> {
        review::Entity::find_by_id(review_id)
            .one(db)
            .await?
            .ok_or_else(|| review_not_found(review_id))
    }

    /// Modifie une review (auteur ou admin); l'ancienne note est remplacée dans l'agrégat
    pub async fn update_review(
        db: &DatabaseConnection,
        actor: &AuthUser,
        review_id: i32,
        request: ReviewRequest,
    ) -> Result<review::Model, ApiError> {
        request.validate()?;

        let txn = db.begin().await?;
        let (title, current) = Self::lock_review(&txn, actor, review_id, &Method::PUT).await?;

        let old_rating = current.rating;
        let active_default = current.active;
        let mut active: review::ActiveModel = current.into();
        active.rating = Set(request.rating);
        active.description = Set(request.description);
        active.active = Set(request.active.unwrap_or(active_default));
        active.updated = Set(Utc::now());
        let updated = active.update(&txn).await?;

        let aggregate = aggregate_of(&title).replace(old_rating, updated.rating);
        Self::store_aggregate(&txn, title, aggregate).await?;

        txn.commit().await?;

        info!(review_id, user_id = actor.user_id, "review updated");
        Ok(updated)
    }

    /// Supprime une review (auteur ou admin) et la retire de l'agrégat
    pub async fn delete_review(
        db: &DatabaseConnection,
        actor: &AuthUser,
        review_id: i32,
    ) -> Result<(), ApiError> {
        let txn = db.begin().await?;
        let (title, current) = Self::lock_review(&txn, actor, review_id, &Method::DELETE).await?;

        Self::remove_locked(&txn, title, current).await?;

        txn.commit().await?;

        info!(review_id, user_id = actor.user_id, "review deleted");
        Ok(())
    }

    /// Retire toutes les reviews d'un utilisateur (avant suppression du compte).
    /// S'exécute dans la transaction de l'appelant.
    pub async fn delete_all_for_user(txn: &DatabaseTransaction, user_id: i32) -> Result<u64, ApiError> {
        let reviews = review::Entity::find()
            .filter(review::Column::ReviewUserId.eq(user_id))
            .order_by_asc(review::Column::WatchlistId)
            .all(txn)
            .await?;

        let mut removed = 0;
        for current in reviews {
            let title = Self::lock_title(txn, current.watchlist_id).await?;
            Self::remove_locked(txn, title, current).await?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn remove_locked(
        txn: &DatabaseTransaction,
        title: watchlist::Model,
        current: review::Model,
    ) -> Result<(), ApiError> {
        let aggregate = aggregate_of(&title).remove(current.rating);
        review::Entity::delete_by_id(current.id).exec(txn).await?;
        Self::store_aggregate(txn, title, aggregate).await
    }

    /// Charge la review, vérifie la permission, verrouille son titre puis relit
    /// la review sous verrou (elle a pu changer entre-temps)
    async fn lock_review(
        txn: &DatabaseTransaction,
        actor: &AuthUser,
        review_id: i32,
        method: &Method,
    ) -> Result<(watchlist::Model, review::Model), ApiError> {
        let current = review::Entity::find_by_id(review_id)
            .one(txn)
            .await?
            .ok_or_else(|| review_not_found(review_id))?;

        ensure_access(actor, Some(current.review_user_id), method)?;

        let title = Self::lock_title(txn, current.watchlist_id).await?;
        let current = review::Entity::find_by_id(review_id)
            .one(txn)
            .await?
            .ok_or_else(|| review_not_found(review_id))?;

        Ok((title, current))
    }

    async fn lock_title(txn: &DatabaseTransaction, watchlist_id: i32) -> Result<watchlist::Model, ApiError> {
        watchlist::Entity::find_by_id(watchlist_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Watchlist item {} not found", watchlist_id)))
    }

    async fn store_aggregate(
        txn: &DatabaseTransaction,
        title: watchlist::Model,
        aggregate: RatingAggregate,
    ) -> Result<(), ApiError> {
        let mut active: watchlist::ActiveModel = title.into();
        active.rating_sum = Set(aggregate.sum);
        active.number_rating = Set(aggregate.count);
        active.avg_rating = Set(aggregate.average());
        active.update(txn).await?;
        Ok(())
    }
}

fn aggregate_of(title: &watchlist::Model) -> RatingAggregate {
    RatingAggregate::new(title.rating_sum, title.number_rating)
}

fn review_not_found(review_id: i32) -> ApiError {
    ApiError::NotFound(format!("Review {} not found", review_id))
}
