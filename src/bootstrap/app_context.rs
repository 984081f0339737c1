use std::sync::Arc;

use crate::application::ports::category_repository::CategoryRepository;
use crate::application::ports::customer_repository::CustomerRepository;
use crate::application::ports::inventory_repository::InventoryRepository;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::permission_repository::PermissionRepository;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::ports::token_service::TokenService;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;
use crate::infrastructure::crypto::PayloadCipher;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    role_repo: Arc<dyn RoleRepository>,
    permission_repo: Arc<dyn PermissionRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    product_repo: Arc<dyn ProductRepository>,
    inventory_repo: Arc<dyn InventoryRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_service: Arc<dyn TokenService>,
    token_blacklist: Arc<dyn TokenBlacklist>,
    mailer: Arc<dyn Mailer>,
    cipher: Option<Arc<PayloadCipher>>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        role_repo: Arc<dyn RoleRepository>,
        permission_repo: Arc<dyn PermissionRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        product_repo: Arc<dyn ProductRepository>,
        inventory_repo: Arc<dyn InventoryRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_service: Arc<dyn TokenService>,
        token_blacklist: Arc<dyn TokenBlacklist>,
        mailer: Arc<dyn Mailer>,
        cipher: Option<Arc<PayloadCipher>>,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            permission_repo,
            category_repo,
            product_repo,
            inventory_repo,
            customer_repo,
            password_hasher,
            token_service,
            token_blacklist,
            mailer,
            cipher,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn role_repo(&self) -> Arc<dyn RoleRepository> {
        self.services.role_repo.clone()
    }

    pub fn permission_repo(&self) -> Arc<dyn PermissionRepository> {
        self.services.permission_repo.clone()
    }

    pub fn category_repo(&self) -> Arc<dyn CategoryRepository> {
        self.services.category_repo.clone()
    }

    pub fn product_repo(&self) -> Arc<dyn ProductRepository> {
        self.services.product_repo.clone()
    }

    pub fn inventory_repo(&self) -> Arc<dyn InventoryRepository> {
        self.services.inventory_repo.clone()
    }

    pub fn customer_repo(&self) -> Arc<dyn CustomerRepository> {
        self.services.customer_repo.clone()
    }

    pub fn password_hasher(&self) -> Arc<dyn PasswordHasher> {
        self.services.password_hasher.clone()
    }

    pub fn token_service(&self) -> Arc<dyn TokenService> {
        self.services.token_service.clone()
    }

    pub fn token_blacklist(&self) -> Arc<dyn TokenBlacklist> {
        self.services.token_blacklist.clone()
    }

    pub fn mailer(&self) -> Arc<dyn Mailer> {
        self.services.mailer.clone()
    }

    /// Present only when payload encryption is switched on.
    pub fn cipher(&self) -> Option<Arc<PayloadCipher>> {
        self.services.cipher.clone()
    }
}
