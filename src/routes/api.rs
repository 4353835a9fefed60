use actix_web::{HttpRequest, Responder, delete, get, post, put, web};
use serde_json::Value;

use crate::Executor;
use crate::models::auth::BearerToken;
use crate::resources::ResourceRegistry;
use crate::routes::envelope_response;
use crate::services::resources::{
    ProxyContext, create_resource, delete_resource, get_resource, search_resource,
    update_resource,
};

#[get("/{resource}/search")]
pub async fn search(
    resource: web::Path<String>,
    req: HttpRequest,
    token: BearerToken,
    executor: web::Data<Executor>,
    registry: web::Data<ResourceRegistry>,
) -> impl Responder {
    let ctx = ProxyContext::new(executor.get_ref(), registry.get_ref(), &token);
    let envelope = search_resource(ctx, &resource, req.query_string()).await;
    envelope_response(&envelope)
}

#[get("/{resource}/{id}")]
pub async fn show(
    path: web::Path<(String, String)>,
    token: BearerToken,
    executor: web::Data<Executor>,
    registry: web::Data<ResourceRegistry>,
) -> impl Responder {
    let (resource, id) = path.into_inner();
    let ctx = ProxyContext::new(executor.get_ref(), registry.get_ref(), &token);
    let envelope = get_resource(ctx, &resource, &id).await;
    envelope_response(&envelope)
}

#[post("/{resource}/create")]
pub async fn create(
    resource: web::Path<String>,
    token: BearerToken,
    executor: web::Data<Executor>,
    registry: web::Data<ResourceRegistry>,
    web::Json(payload): web::Json<Value>,
) -> impl Responder {
    let ctx = ProxyContext::new(executor.get_ref(), registry.get_ref(), &token);
    let envelope = create_resource(ctx, &resource, payload).await;
    envelope_response(&envelope)
}

#[put("/{resource}/edit/{id}")]
pub async fn update(
    path: web::Path<(String, String)>,
    token: BearerToken,
    executor: web::Data<Executor>,
    registry: web::Data<ResourceRegistry>,
    web::Json(payload): web::Json<Value>,
) -> impl Responder {
    let (resource, id) = path.into_inner();
    let ctx = ProxyContext::new(executor.get_ref(), registry.get_ref(), &token);
    let envelope = update_resource(ctx, &resource, &id, payload).await;
    envelope_response(&envelope)
}

#[delete("/{resource}/{id}")]
pub async fn delete(
    path: web::Path<(String, String)>,
    token: BearerToken,
    executor: web::Data<Executor>,
    registry: web::Data<ResourceRegistry>,
) -> impl Responder {
    let (resource, id) = path.into_inner();
    let ctx = ProxyContext::new(executor.get_ref(), registry.get_ref(), &token);
    let envelope = delete_resource(ctx, &resource, &id).await;
    envelope_response(&envelope)
}
