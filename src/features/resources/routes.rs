use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use super::collection::Resource;
use super::handlers::{self, ScopedResource};
use super::scope::ScopeDescriptor;
use super::service::ResourceService;
use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::shared::constants::API_PREFIX;

/// Room for the JSON part of a multipart write
const FORM_OVERHEAD: usize = 1024 * 1024;

/// Base path of a collection under one scope shape
pub fn collection_base<R: Resource>(scope: &ScopeDescriptor) -> String {
    format!(
        "{}{}/{}",
        API_PREFIX,
        scope.route_prefix(),
        R::COLLECTION.segment_in(scope)
    )
}

/// Routes of a collection in every scope shape it declares
pub fn collection_routes<R: Resource>(service: Arc<ResourceService<R>>) -> Router {
    let slots = R::COLLECTION.slots.len().max(1);
    R::SCOPES
        .iter()
        .fold(Router::new(), |router, scope| {
            router.merge(scoped_routes(service.clone(), *scope))
        })
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE * slots + FORM_OVERHEAD))
}

fn scoped_routes<R: Resource>(service: Arc<ResourceService<R>>, scope: ScopeDescriptor) -> Router {
    let base = collection_base::<R>(&scope);
    let id_param = R::COLLECTION.id_param;
    let item = format!("{}/{{{}}}", base, id_param);

    let router = Router::new()
        .route(&format!("{}/paged", base), get(handlers::list_paged::<R>))
        .route(&base, post(handlers::create::<R>))
        .route(&format!("{}/", base), post(handlers::create::<R>))
        .route(
            &item,
            get(handlers::get_one::<R>)
                .put(handlers::update::<R>)
                .delete(handlers::delete_one::<R>),
        );

    let router = if R::COLLECTION.slots.is_empty() {
        router
    } else {
        router.route(
            &format!("{}/files/{{slot}}", item),
            get(handlers::download::<R>)
                .put(handlers::upload::<R>)
                .delete(handlers::remove_file::<R>),
        )
    };

    router.with_state(ScopedResource { service, scope })
}
