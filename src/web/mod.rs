use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::controller::ServoController;

/// The control page, embedded at build time and served at `/`.
const INDEX_PAGE: &str = include_str!("../../static/index.html");

#[derive(Debug, Deserialize)]
pub struct ConnectForm {
    pub port: String,
}

#[derive(Debug, Deserialize)]
pub struct PositionForm {
    pub position: u8,
}

async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_PAGE)
}

async fn connect(
    controller: web::Data<ServoController>,
    form: web::Form<ConnectForm>,
) -> impl Responder {
    HttpResponse::Ok().json(controller.connect(&form.port).await)
}

async fn disconnect(controller: web::Data<ServoController>) -> impl Responder {
    controller.disconnect().await;
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

async fn ports(controller: web::Data<ServoController>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "ports": controller.list_ports() }))
}

async fn set_position(
    controller: web::Data<ServoController>,
    form: web::Form<PositionForm>,
) -> impl Responder {
    HttpResponse::Ok().json(controller.set_position(form.position).await)
}

async fn status(controller: web::Data<ServoController>) -> impl Responder {
    HttpResponse::Ok().json(controller.status().await)
}

/// Mount the control endpoints on an actix app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/connect", web::post().to(connect))
        .route("/disconnect", web::post().to(disconnect))
        .route("/ports", web::get().to(ports))
        .route("/set_position", web::post().to(set_position))
        .route("/status", web::get().to(status));
}
