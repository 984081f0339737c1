pub mod auth;
pub mod categories;
pub mod customers;
pub mod encryption;
pub mod error;
pub mod health;
pub mod inventory;
pub mod permissions;
pub mod products;
pub mod roles;
pub mod users;

use axum::Router;

use crate::bootstrap::app_context::AppContext;

/// Every resource router mounted at the root, without health or docs.
pub fn api_router(ctx: AppContext) -> Router {
    let router = Router::new()
        .nest("/auth", auth::routes(ctx.clone()))
        .merge(users::routes(ctx.clone()))
        .merge(roles::routes(ctx.clone()))
        .merge(permissions::routes(ctx.clone()))
        .merge(categories::routes(ctx.clone()))
        .merge(products::routes(ctx.clone()))
        .merge(inventory::routes(ctx.clone()))
        .merge(customers::routes(ctx.clone()));
    match ctx.cipher() {
        Some(cipher) => router.layer(axum::middleware::from_fn_with_state(
            cipher,
            encryption::encrypt_payloads,
        )),
        None => router,
    }
}
