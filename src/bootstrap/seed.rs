//! Essential data every deployment needs: the base roles and permissions, an
//! administrator account and the wine categories.

use async_trait::async_trait;

use crate::application::ports::category_repository::CategoryRepository;
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::permission_repository::{NewPermission, PermissionRepository};
use crate::application::ports::role_repository::{NewRole, RoleRepository};
use crate::application::ports::user_repository::{NewUser, UserRepository};
use crate::bootstrap::app_context::AppContext;
use crate::domain::catalog::category::DEFAULT_CATEGORIES;
use crate::domain::users::user::{ADMIN_ROLE, CUSTOMER_ROLE};

pub const ADMIN_EMAIL: &str = "admin@example.com";

const BASE_PERMISSIONS: &[(&str, &str)] = &[
    ("users", "read"),
    ("users", "create"),
    ("users", "update"),
    ("users", "delete"),
    ("auth", "manage"),
    ("roles", "read"),
    ("roles", "create"),
    ("roles", "update"),
    ("roles", "delete"),
    ("products", "read"),
    ("products", "create"),
    ("products", "update"),
    ("products", "delete"),
    ("orders", "read"),
    ("orders", "create"),
    ("orders", "update"),
    ("orders", "delete"),
    ("categories", "read"),
    ("categories", "create"),
    ("categories", "update"),
    ("categories", "delete"),
];

const CUSTOMER_PERMISSIONS: &[&str] = &[
    "auth.manage",
    "products.read",
    "orders.read",
    "orders.create",
    "orders.update",
    "categories.read",
    "users.read",
    "users.update",
];

#[async_trait]
pub trait Seeder: Send + Sync {
    fn name(&self) -> &'static str;
    async fn should_run(&self) -> anyhow::Result<bool>;
    async fn run(&self) -> anyhow::Result<()>;
}

pub struct RolesPermissionsSeeder<'a> {
    pub roles: &'a dyn RoleRepository,
    pub permissions: &'a dyn PermissionRepository,
}

#[async_trait]
impl Seeder for RolesPermissionsSeeder<'_> {
    fn name(&self) -> &'static str {
        "roles_permissions"
    }

    async fn should_run(&self) -> anyhow::Result<bool> {
        Ok(self.roles.count().await? == 0)
    }

    async fn run(&self) -> anyhow::Result<()> {
        let mut all_ids = Vec::with_capacity(BASE_PERMISSIONS.len());
        let mut customer_ids = Vec::new();
        for (module, action) in BASE_PERMISSIONS {
            let name = format!("{module}.{action}");
            let permission = match self.permissions.find_by_name(&name).await? {
                Some(p) => p,
                None => {
                    self.permissions
                        .create_permission(&NewPermission {
                            description: Some(format!("Permission to {action} {module}")),
                            name: name.clone(),
                            module: module.to_string(),
                            action: action.to_string(),
                        })
                        .await?
                }
            };
            if CUSTOMER_PERMISSIONS.contains(&name.as_str()) {
                customer_ids.push(permission.id);
            }
            all_ids.push(permission.id);
        }

        self.roles
            .create_role(&NewRole {
                name: ADMIN_ROLE.to_string(),
                description: Some("Administrator with full access".into()),
                is_active: true,
                permission_ids: all_ids,
            })
            .await?;
        self.roles
            .create_role(&NewRole {
                name: CUSTOMER_ROLE.to_string(),
                description: Some("Registered shop customer".into()),
                is_active: true,
                permission_ids: customer_ids,
            })
            .await?;
        Ok(())
    }
}

pub struct AdminUserSeeder<'a> {
    pub users: &'a dyn UserRepository,
    pub roles: &'a dyn RoleRepository,
    pub hasher: &'a dyn PasswordHasher,
    pub password: &'a str,
}

#[async_trait]
impl Seeder for AdminUserSeeder<'_> {
    fn name(&self) -> &'static str {
        "admin_user"
    }

    async fn should_run(&self) -> anyhow::Result<bool> {
        Ok(self.users.find_by_email(ADMIN_EMAIL).await?.is_none())
    }

    async fn run(&self) -> anyhow::Result<()> {
        let Some(role) = self.roles.find_by_name(ADMIN_ROLE).await? else {
            anyhow::bail!("admin role not found; seed roles before the admin user");
        };
        let password_hash = self.hasher.hash(self.password).await?;
        let user = self
            .users
            .create_user(&NewUser {
                email: ADMIN_EMAIL.to_string(),
                name: Some("Administrator".into()),
                password_hash,
                is_email_verified: true,
            })
            .await?;
        self.users.replace_roles(user.id, &[role.id]).await?;
        Ok(())
    }
}

pub struct CategorySeeder<'a> {
    pub categories: &'a dyn CategoryRepository,
}

#[async_trait]
impl Seeder for CategorySeeder<'_> {
    fn name(&self) -> &'static str {
        "categories"
    }

    async fn should_run(&self) -> anyhow::Result<bool> {
        Ok(self.categories.count().await? == 0)
    }

    async fn run(&self) -> anyhow::Result<()> {
        for (name, description) in DEFAULT_CATEGORIES {
            self.categories.insert(name, Some(*description)).await?;
        }
        Ok(())
    }
}

pub async fn run_seeders(seeders: &[&dyn Seeder]) -> anyhow::Result<()> {
    for seeder in seeders {
        if !seeder.should_run().await? {
            tracing::debug!(seeder = seeder.name(), "seeder_skipped");
            continue;
        }
        seeder.run().await?;
        tracing::info!(seeder = seeder.name(), "seeder_completed");
    }
    Ok(())
}

/// Runs every essential seeder in dependency order.
pub async fn seed_essentials(ctx: &AppContext) -> anyhow::Result<()> {
    let users = ctx.user_repo();
    let roles = ctx.role_repo();
    let permissions = ctx.permission_repo();
    let categories = ctx.category_repo();
    let hasher = ctx.password_hasher();

    let roles_seeder = RolesPermissionsSeeder {
        roles: roles.as_ref(),
        permissions: permissions.as_ref(),
    };
    let admin_seeder = AdminUserSeeder {
        users: users.as_ref(),
        roles: roles.as_ref(),
        hasher: hasher.as_ref(),
        password: &ctx.cfg.admin_password,
    };
    let category_seeder = CategorySeeder {
        categories: categories.as_ref(),
    };
    run_seeders(&[&roles_seeder, &admin_seeder, &category_seeder]).await
}
