use actix_web::{delete, get, web, HttpResponse};
use sea_orm::*;
use tracing::info;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::UserResponse;
use crate::models::users;
use crate::services::review_service::ReviewService;

// Gestion des comptes: réservée aux admins (is_staff)

fn require_staff(user: &AuthUser) -> Result<(), ApiError> {
    if user.is_staff {
        Ok(())
    } else {
        tracing::warn!(user_id = user.user_id, "non-staff access to user management");
        Err(ApiError::PermissionDenied)
    }
}

async fn find_user(db: &impl ConnectionTrait, user_id: i32) -> Result<users::Model, ApiError> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))
}

/// GET /users - Liste des comptes (ADMIN)
#[get("/users")]
pub async fn list_users(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_staff(&auth_user)?;

    let users: Vec<UserResponse> = users::Entity::find()
        .order_by_asc(users::Column::Id)
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// GET /users/{id} - Détail d'un compte (ADMIN)
#[get("/users/{id}")]
pub async fn get_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_staff(&auth_user)?;

    let user = find_user(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /users/{id}/delete - Supprime le compte et ses reviews (ADMIN)
#[delete("/users/{id}/delete")]
pub async fn delete_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_staff(&auth_user)?;
    let user_id = path.into_inner();

    // Les agrégats des titres notés sont corrigés dans la même transaction
    let txn = db.begin().await?;
    let user = find_user(&txn, user_id).await?;
    let removed = ReviewService::delete_all_for_user(&txn, user.id).await?;
    users::Entity::delete_by_id(user.id).exec(&txn).await?;
    txn.commit().await?;

    info!(user_id, removed_reviews = removed, deleted_by = auth_user.user_id, "user deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users).service(get_user).service(delete_user);
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    use crate::db::test_connection;
    use crate::models::dto::ReviewRequest;
    use crate::models::watchlist;
    use crate::services::review_service::ReviewService;
    use crate::test_support::{bearer, seed_platform, seed_title, seed_user, test_app, test_auth_data};
    use sea_orm::EntityTrait;

    #[actix_web::test]
    async fn test_non_staff_is_denied() {
        let db = test_connection().await;
        let (auth, _) = test_auth_data();
        let app = test_app!(db, auth);
        let alice = seed_user(&db, "alice@example.com", false).await;

        let req = test::TestRequest::get()
            .uri("/users")
            .insert_header(bearer(&auth, &alice))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_staff_lists_and_reads_users() {
        let db = test_connection().await;
        let (auth, _) = test_auth_data();
        let app = test_app!(db, auth);
        let admin = seed_user(&db, "admin@example.com", true).await;
        let alice = seed_user(&db, "alice@example.com", false).await;

        let req = test::TestRequest::get()
            .uri("/users")
            .insert_header(bearer(&auth, &admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri(&format!("/users/{}", alice.id))
            .insert_header(bearer(&auth, &admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["email"], "alice@example.com");

        let req = test::TestRequest::get()
            .uri("/users/999")
            .insert_header(bearer(&auth, &admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_user_restores_aggregate() {
        let db = test_connection().await;
        let (auth, _) = test_auth_data();
        let app = test_app!(db, auth);
        let admin = seed_user(&db, "admin@example.com", true).await;
        let alice = seed_user(&db, "alice@example.com", false).await;
        let bob = seed_user(&db, "bob@example.com", false).await;
        let platform = seed_platform(&db).await;
        let title = seed_title(&db, platform.id).await;

        for (user, rating) in [(&alice, 4), (&bob, 2)] {
            let request = ReviewRequest { rating, description: String::new(), active: None };
            ReviewService::create_review(&db, user.id, title.id, request).await.unwrap();
        }

        let req = test::TestRequest::delete()
            .uri(&format!("/users/{}/delete", alice.id))
            .insert_header(bearer(&auth, &admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let title = watchlist::Entity::find_by_id(title.id).one(&db).await.unwrap().unwrap();
        assert_eq!(title.number_rating, 1);
        assert_eq!(title.avg_rating, 2.0);
        assert!(crate::models::users::Entity::find_by_id(alice.id).one(&db).await.unwrap().is_none());
    }
}
