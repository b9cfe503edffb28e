use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::ReviewRequest;
use crate::services::review_service::ReviewService;

/// GET /stream/{id}/review - Reviews d'un titre (PUBLIC)
#[get("/stream/{id}/review")]
pub async fn list_reviews(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let reviews = ReviewService::list_for_title(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /{id}/review-create - Noter un titre (PROTÉGÉE, une review par utilisateur et par titre)
#[post("/{id}/review-create")]
pub async fn create_review(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ReviewRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let review = ReviewService::create_review(
        db.get_ref(),
        auth_user.user_id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /stream/review/{id} - Détail d'une review (PUBLIC)
#[get("/stream/review/{id}")]
pub async fn get_review(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let review = ReviewService::get_review(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(review))
}

/// PUT /stream/review/{id} - Modifier sa review (auteur ou admin)
#[put("/stream/review/{id}")]
pub async fn update_review(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ReviewRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let review =
        ReviewService::update_review(db.get_ref(), &auth_user, path.into_inner(), body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(review))
}

/// DELETE /stream/review/{id} - Supprimer sa review (auteur ou admin)
#[delete("/stream/review/{id}")]
pub async fn delete_review(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    ReviewService::delete_review(db.get_ref(), &auth_user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn review_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_reviews)
        .service(create_review)
        .service(get_review)
        .service(update_review)
        .service(delete_review);
}
