use actix_web::{delete, get, http::Method, post, put, web, HttpResponse};
use sea_orm::*;
use tracing::info;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{PlatformDetail, PlatformRequest};
use crate::models::{review, stream_platform, watchlist};
use crate::utils::permissions::ensure_access;

async fn find_platform(db: &impl ConnectionTrait, id: i32) -> Result<stream_platform::Model, ApiError> {
    stream_platform::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Platform {} not found", id)))
}

/// GET /stream - Toutes les plateformes (PUBLIC)
#[get("/stream")]
pub async fn list_platforms(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    let platforms = stream_platform::Entity::find()
        .order_by_asc(stream_platform::Column::Id)
        .all(db.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(platforms))
}

/// POST /stream - Ajouter une plateforme (ADMIN)
#[post("/stream")]
pub async fn create_platform(
    auth_user: AuthUser,
    body: web::Json<PlatformRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    ensure_access(&auth_user, None, &Method::POST)?;
    body.validate()?;

    let request = body.into_inner();
    let created = stream_platform::ActiveModel {
        name: Set(request.name),
        about: Set(request.about),
        website: Set(request.website),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    info!(platform_id = created.id, "platform created");
    Ok(HttpResponse::Created().json(created))
}

/// GET /stream/{id} - Détail + titres de la plateforme (PUBLIC)
#[get("/stream/{id}")]
pub async fn get_platform(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let platform = find_platform(db.get_ref(), path.into_inner()).await?;
    let titles = watchlist::Entity::find()
        .filter(watchlist::Column::PlatformId.eq(platform.id))
        .order_by_asc(watchlist::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(PlatformDetail { platform, watchlist: titles }))
}

/// PUT /stream/{id} - Modifier une plateforme (ADMIN)
#[put("/stream/{id}")]
pub async fn update_platform(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<PlatformRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    ensure_access(&auth_user, None, &Method::PUT)?;
    body.validate()?;

    let platform = find_platform(db.get_ref(), path.into_inner()).await?;
    let request = body.into_inner();

    let mut active: stream_platform::ActiveModel = platform.into();
    active.name = Set(request.name);
    active.about = Set(request.about);
    active.website = Set(request.website);
    let updated = active.update(db.get_ref()).await?;

    info!(platform_id = updated.id, "platform updated");
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /stream/{id} - Supprime la plateforme, ses titres et leurs reviews (ADMIN)
#[delete("/stream/{id}")]
pub async fn delete_platform(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    ensure_access(&auth_user, None, &Method::DELETE)?;
    let platform_id = path.into_inner();

    let txn = db.begin().await?;
    find_platform(&txn, platform_id).await?;

    let title_ids: Vec<i32> = watchlist::Entity::find()
        .filter(watchlist::Column::PlatformId.eq(platform_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    review::Entity::delete_many()
        .filter(review::Column::WatchlistId.is_in(title_ids.clone()))
        .exec(&txn)
        .await?;
    watchlist::Entity::delete_many()
        .filter(watchlist::Column::PlatformId.eq(platform_id))
        .exec(&txn)
        .await?;
    stream_platform::Entity::delete_by_id(platform_id).exec(&txn).await?;
    txn.commit().await?;

    info!(platform_id, removed_titles = title_ids.len(), "platform deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn platform_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_platforms)
        .service(create_platform)
        .service(get_platform)
        .service(update_platform)
        .service(delete_platform);
}
