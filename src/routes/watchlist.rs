use actix_web::{get, http::Method, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::*;
use tracing::info;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{WatchlistDetail, WatchlistRequest};
use crate::models::{stream_platform, watchlist};
use crate::services::review_service::ReviewService;
use crate::utils::permissions::ensure_access;

async fn find_title(db: &DatabaseConnection, id: i32) -> Result<watchlist::Model, ApiError> {
    watchlist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Watchlist item {} not found", id)))
}

async fn ensure_platform(db: &DatabaseConnection, platform_id: i32) -> Result<(), ApiError> {
    match stream_platform::Entity::find_by_id(platform_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::Validation(format!("Invalid platform {}", platform_id))),
    }
}

/// GET /watchlist - Tous les titres (PUBLIC)
#[get("/watchlist")]
pub async fn list_watchlist(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    let titles = watchlist::Entity::find()
        .order_by_asc(watchlist::Column::Id)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(titles))
}

/// POST /watchlist - Ajouter un titre (ADMIN)
#[post("/watchlist")]
pub async fn create_watchlist(
    auth_user: AuthUser,
    body: web::Json<WatchlistRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    ensure_access(&auth_user, None, &Method::POST)?;
    body.validate()?;
    ensure_platform(db.get_ref(), body.platform).await?;

    let request = body.into_inner();
    // Un nouveau titre démarre sans note
    let created = watchlist::ActiveModel {
        title: Set(request.title),
        description: Set(request.description),
        platform_id: Set(request.platform),
        active: Set(request.active.unwrap_or(true)),
        avg_rating: Set(0.0),
        number_rating: Set(0),
        rating_sum: Set(0),
        created: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    info!(watchlist_id = created.id, "watchlist item created");
    Ok(HttpResponse::Created().json(created))
}

/// GET /watchlist/{id} - Détail + reviews (PUBLIC)
#[get("/watchlist/{id}")]
pub async fn get_watchlist(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let title = find_title(db.get_ref(), path.into_inner()).await?;
    let reviews = ReviewService::list_for_title(db.get_ref(), title.id).await?;

    Ok(HttpResponse::Ok().json(WatchlistDetail { watchlist: title, reviews }))
}

/// PUT /watchlist/{id} - Modifier un titre (ADMIN). L'agrégat des notes n'est pas modifiable.
#[put("/watchlist/{id}")]
pub async fn update_watchlist(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<WatchlistRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    ensure_access(&auth_user, None, &Method::PUT)?;
    body.validate()?;
    ensure_platform(db.get_ref(), body.platform).await?;

    let title = find_title(db.get_ref(), path.into_inner()).await?;
    let request = body.into_inner();
    let active_default = title.active;

    let mut active: watchlist::ActiveModel = title.into();
    active.title = Set(request.title);
    active.description = Set(request.description);
    active.platform_id = Set(request.platform);
    active.active = Set(request.active.unwrap_or(active_default));
    let updated = active.update(db.get_ref()).await?;

    info!(watchlist_id = updated.id, "watchlist item updated");
    Ok(HttpResponse::Ok().json(updated))
}

pub fn watchlist_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_watchlist)
        .service(create_watchlist)
        .service(get_watchlist)
        .service(update_watchlist);
}
