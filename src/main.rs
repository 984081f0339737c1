use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use cellar_api::bootstrap::app_context::{AppContext, AppServices};
use cellar_api::bootstrap::config::Config;
use cellar_api::infrastructure::crypto::PayloadCipher;
use cellar_api::infrastructure::db::repositories::{
    category_repository_sqlx::SqlxCategoryRepository,
    customer_repository_sqlx::SqlxCustomerRepository,
    inventory_repository_sqlx::SqlxInventoryRepository,
    permission_repository_sqlx::SqlxPermissionRepository,
    product_repository_sqlx::SqlxProductRepository, role_repository_sqlx::SqlxRoleRepository,
    user_repository_sqlx::SqlxUserRepository,
};
use cellar_api::infrastructure::mail::LogMailer;
use cellar_api::infrastructure::security::jwt::JwtTokenService;
use cellar_api::infrastructure::security::password::BcryptPasswordHasher;
use cellar_api::infrastructure::security::token_blacklist::InMemoryTokenBlacklist;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
        paths(
            cellar_api::presentation::http::health::health,
            cellar_api::presentation::http::auth::register_customer,
            cellar_api::presentation::http::auth::login,
            cellar_api::presentation::http::auth::logout,
            cellar_api::presentation::http::auth::forgot_password,
            cellar_api::presentation::http::auth::reset_password,
            cellar_api::presentation::http::auth::verify_email,
            cellar_api::presentation::http::auth::get_profile,
            cellar_api::presentation::http::auth::update_profile,
            cellar_api::presentation::http::auth::change_password,
            cellar_api::presentation::http::users::list_users,
            cellar_api::presentation::http::users::get_user,
            cellar_api::presentation::http::users::create_user,
            cellar_api::presentation::http::users::update_user,
            cellar_api::presentation::http::users::delete_user,
            cellar_api::presentation::http::users::restore_user,
            cellar_api::presentation::http::users::assign_roles,
            cellar_api::presentation::http::users::remove_roles,
            cellar_api::presentation::http::users::users_by_role,
            cellar_api::presentation::http::roles::create_role,
            cellar_api::presentation::http::roles::list_roles,
            cellar_api::presentation::http::roles::get_role,
            cellar_api::presentation::http::roles::update_role,
            cellar_api::presentation::http::roles::delete_role,
            cellar_api::presentation::http::roles::add_permissions,
            cellar_api::presentation::http::roles::remove_permissions,
            cellar_api::presentation::http::permissions::create_permission,
            cellar_api::presentation::http::permissions::list_permissions,
            cellar_api::presentation::http::permissions::get_permission,
            cellar_api::presentation::http::permissions::update_permission,
            cellar_api::presentation::http::permissions::delete_permission,
            cellar_api::presentation::http::categories::list_categories,
            cellar_api::presentation::http::categories::get_category,
            cellar_api::presentation::http::products::create_product,
            cellar_api::presentation::http::products::list_products,
            cellar_api::presentation::http::products::search_products,
            cellar_api::presentation::http::products::count_products,
            cellar_api::presentation::http::products::get_product,
            cellar_api::presentation::http::products::update_product,
            cellar_api::presentation::http::products::delete_product,
            cellar_api::presentation::http::products::toggle_status,
            cellar_api::presentation::http::inventory::get_inventory,
            cellar_api::presentation::http::inventory::update_inventory,
            cellar_api::presentation::http::inventory::record_movement,
            cellar_api::presentation::http::inventory::list_movements,
            cellar_api::presentation::http::inventory::low_stock,
            cellar_api::presentation::http::inventory::out_of_stock,
            cellar_api::presentation::http::customers::get_my_account,
            cellar_api::presentation::http::customers::update_my_preferences,
        ),
        components(schemas(
            cellar_api::presentation::http::error::ErrorBody,
            cellar_api::presentation::http::health::HealthResp,
            cellar_api::presentation::http::auth::RegisterCustomerBody,
            cellar_api::presentation::http::auth::CustomerPreferencesBody,
            cellar_api::presentation::http::auth::AccessTokenResponse,
            cellar_api::presentation::http::auth::LoginBody,
            cellar_api::presentation::http::auth::LoginResponse,
            cellar_api::presentation::http::auth::LogoutResponse,
            cellar_api::presentation::http::auth::MessageResponse,
            cellar_api::presentation::http::auth::ForgotPasswordBody,
            cellar_api::presentation::http::auth::ResetPasswordBody,
            cellar_api::presentation::http::auth::UpdateProfileBody,
            cellar_api::presentation::http::auth::ChangePasswordBody,
            cellar_api::presentation::http::users::UserResponse,
            cellar_api::presentation::http::users::UserWithRolesResponse,
            cellar_api::presentation::http::users::UserListResponse,
            cellar_api::presentation::http::users::CreateUserBody,
            cellar_api::presentation::http::users::UpdateUserBody,
            cellar_api::presentation::http::users::RoleIdsBody,
            cellar_api::presentation::http::roles::RoleResponse,
            cellar_api::presentation::http::roles::CreateRoleBody,
            cellar_api::presentation::http::roles::UpdateRoleBody,
            cellar_api::presentation::http::roles::RolePermissionsBody,
            cellar_api::presentation::http::permissions::PermissionResponse,
            cellar_api::presentation::http::permissions::CreatePermissionBody,
            cellar_api::presentation::http::permissions::UpdatePermissionBody,
            cellar_api::presentation::http::categories::CategoryResponse,
            cellar_api::presentation::http::products::ProductResponse,
            cellar_api::presentation::http::products::CreateProductBody,
            cellar_api::presentation::http::products::UpdateProductBody,
            cellar_api::presentation::http::products::ProductStatusBody,
            cellar_api::presentation::http::products::CountResponse,
            cellar_api::presentation::http::inventory::InventoryResponse,
            cellar_api::presentation::http::inventory::StockMovementResponse,
            cellar_api::presentation::http::inventory::InventoryChangeResponse,
            cellar_api::presentation::http::inventory::UpdateInventoryBody,
            cellar_api::presentation::http::inventory::StockMovementBody,
            cellar_api::presentation::http::customers::CustomerAccountResponse,
            cellar_api::presentation::http::customers::CustomerProfileResponse,
            cellar_api::presentation::http::customers::PreferencesBody,
        )),
        modifiers(&BearerAuth),
        tags(
            (name = "Auth", description = "Registration, login and profile"),
            (name = "Users", description = "User administration"),
            (name = "Roles", description = "Roles and their permissions"),
            (name = "Permissions", description = "Permission catalog"),
            (name = "Categories", description = "Wine categories"),
            (name = "Products", description = "Wine catalog"),
            (name = "Inventory", description = "Stock levels and movements"),
            (name = "Customers", description = "Customer account and preferences"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "shutdown_signal_failed");
    }
    info!("shutdown_requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "cellar_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        production = cfg.is_production,
        encryption = cfg.encryption_enabled,
        "Starting cellar backend"
    );

    // Database
    let pool =
        cellar_api::infrastructure::db::connect_pool(&cfg.database_url, cfg.db_max_connections)
            .await?;
    cellar_api::infrastructure::db::migrate(&pool).await?;

    let cipher = match (cfg.encryption_enabled, cfg.encryption_key.as_deref()) {
        (true, Some(key)) => Some(Arc::new(PayloadCipher::new(key))),
        _ => None,
    };

    let services = AppServices::new(
        Arc::new(SqlxUserRepository::new(pool.clone())),
        Arc::new(SqlxRoleRepository::new(pool.clone())),
        Arc::new(SqlxPermissionRepository::new(pool.clone())),
        Arc::new(SqlxCategoryRepository::new(pool.clone())),
        Arc::new(SqlxProductRepository::new(pool.clone())),
        Arc::new(SqlxInventoryRepository::new(pool.clone())),
        Arc::new(SqlxCustomerRepository::new(pool.clone())),
        Arc::new(BcryptPasswordHasher::new(cfg.bcrypt_cost)),
        Arc::new(JwtTokenService::new(
            cfg.jwt_secret.clone(),
            cfg.jwt_expires_secs,
        )),
        Arc::new(InMemoryTokenBlacklist::new()),
        Arc::new(LogMailer::new(&cfg.app_url)),
        cipher,
    );

    let ctx = AppContext::new(cfg.clone(), services);

    if cfg.seed_on_startup {
        cellar_api::bootstrap::seed::seed_essentials(&ctx).await?;
    }

    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::PATCH,
        http::Method::OPTIONS,
    ];
    let headers = [http::header::CONTENT_TYPE, http::header::AUTHORIZATION];
    let cors = match cfg
        .frontend_url
        .as_deref()
        .map(HeaderValue::from_str)
    {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
        // Production refuses to start without a FRONTEND_URL; this is development convenience
        _ => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
    };

    let app = cellar_api::presentation::http::api_router(ctx.clone())
        .merge(cellar_api::presentation::http::health::routes(pool.clone()))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
