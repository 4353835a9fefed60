//! Generic CRUD-and-search forwarding for every configured resource.

use serde_json::Value;

use crate::domain::envelope::ResponseEnvelope;
use crate::errors::{ErrorEnvelope, ErrorKind};
use crate::models::auth::TokenProvider;
use crate::proxy::{HttpMethod, ProxyRequestExecutor, RequestOptions, Transport};
use crate::query;
use crate::resources::{Action, ResourceConfig, ResourceRegistry};
use crate::services::ServiceResult;

/// Everything a resource operation needs besides its own arguments.
pub struct ProxyContext<'a, X, P: ?Sized> {
    pub executor: &'a ProxyRequestExecutor<X>,
    pub registry: &'a ResourceRegistry,
    pub tokens: &'a P,
}

impl<X, P: ?Sized> Clone for ProxyContext<'_, X, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<X, P: ?Sized> Copy for ProxyContext<'_, X, P> {}

impl<'a, X, P> ProxyContext<'a, X, P>
where
    X: Transport,
    P: TokenProvider + ?Sized,
{
    pub fn new(
        executor: &'a ProxyRequestExecutor<X>,
        registry: &'a ResourceRegistry,
        tokens: &'a P,
    ) -> Self {
        Self {
            executor,
            registry,
            tokens,
        }
    }

    fn resource(&self, name: &str) -> ServiceResult<&'a ResourceConfig> {
        self.registry.get(name).ok_or_else(|| {
            log::warn!("Unknown resource requested: {name}");
            ErrorEnvelope::not_found().with_message(format!("Unknown resource: {name}"))
        })
    }

    async fn forward(
        &self,
        resource: &ResourceConfig,
        action: Action,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Value>,
    ) -> ResponseEnvelope<Value> {
        let options = RequestOptions::new(resource.success_message(action))
            .require_auth(resource.requires_auth(action));
        self.executor
            .execute(method, endpoint, body, self.tokens, options)
            .await
    }
}

/// Searches `resource` with the raw client query, normalized through the codec.
pub async fn search_resource<X, P>(
    ctx: ProxyContext<'_, X, P>,
    resource: &str,
    raw_query: &str,
) -> ResponseEnvelope<Value>
where
    X: Transport,
    P: TokenProvider + ?Sized,
{
    let resource = match ctx.resource(resource) {
        Ok(resource) => resource,
        Err(error) => return error.into(),
    };

    let request = query::decode(raw_query, resource.default_page_size);
    let endpoint = resource.search_endpoint(&query::encode(&request));

    ctx.forward(resource, Action::Search, HttpMethod::Get, &endpoint, None)
        .await
}

/// Loads one item of `resource`.
pub async fn get_resource<X, P>(
    ctx: ProxyContext<'_, X, P>,
    resource: &str,
    id: &str,
) -> ResponseEnvelope<Value>
where
    X: Transport,
    P: TokenProvider + ?Sized,
{
    let (resource, id) = match ctx.resource(resource).and_then(|r| Ok((r, checked_id(id)?))) {
        Ok(found) => found,
        Err(error) => return error.into(),
    };

    let endpoint = resource.item_endpoint(id);
    ctx.forward(resource, Action::Get, HttpMethod::Get, &endpoint, None)
        .await
}

/// Creates an item of `resource` from the JSON payload.
pub async fn create_resource<X, P>(
    ctx: ProxyContext<'_, X, P>,
    resource: &str,
    payload: Value,
) -> ResponseEnvelope<Value>
where
    X: Transport,
    P: TokenProvider + ?Sized,
{
    let resource = match ctx.resource(resource) {
        Ok(resource) => resource,
        Err(error) => return error.into(),
    };

    ctx.forward(
        resource,
        Action::Create,
        HttpMethod::Post,
        resource.collection(),
        Some(payload),
    )
    .await
}

/// Replaces item `id` of `resource` with the JSON payload.
pub async fn update_resource<X, P>(
    ctx: ProxyContext<'_, X, P>,
    resource: &str,
    id: &str,
    payload: Value,
) -> ResponseEnvelope<Value>
where
    X: Transport,
    P: TokenProvider + ?Sized,
{
    let (resource, id) = match ctx.resource(resource).and_then(|r| Ok((r, checked_id(id)?))) {
        Ok(found) => found,
        Err(error) => return error.into(),
    };

    let endpoint = resource.item_endpoint(id);
    ctx.forward(resource, Action::Update, HttpMethod::Put, &endpoint, Some(payload))
        .await
}

/// Deletes item `id` of `resource`.
pub async fn delete_resource<X, P>(
    ctx: ProxyContext<'_, X, P>,
    resource: &str,
    id: &str,
) -> ResponseEnvelope<Value>
where
    X: Transport,
    P: TokenProvider + ?Sized,
{
    let (resource, id) = match ctx.resource(resource).and_then(|r| Ok((r, checked_id(id)?))) {
        Ok(found) => found,
        Err(error) => return error.into(),
    };

    let endpoint = resource.item_endpoint(id);
    ctx.forward(resource, Action::Delete, HttpMethod::Delete, &endpoint, None)
        .await
}

/// Identifiers are forwarded into the upstream path, so only plain tokens pass.
fn checked_id(id: &str) -> ServiceResult<&str> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(ErrorEnvelope::new(ErrorKind::BadRequest).with_message(format!("Invalid id: {id}")))
    }
}
