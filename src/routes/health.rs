use actix_web::{get, HttpResponse};
use crate::models::health::HealthResponse;

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::ok())
}

#[get("/home")]
pub async fn homepage() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Hello, world!" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_and_home() {
        let app = test::init_service(App::new().service(health_check).service(homepage)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/home").to_request()).await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Hello, world!");
    }
}
