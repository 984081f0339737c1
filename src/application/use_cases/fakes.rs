//! In-memory port implementations shared by the use case tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::ports::category_repository::CategoryRepository;
use crate::application::ports::customer_repository::{
    CustomerRepository, NewCustomerAccount, RegistrationOutcome,
};
use crate::application::ports::inventory_repository::{
    InventoryChange, InventoryLevels, InventoryRepository, NewStockMovement,
};
use crate::application::ports::mailer::Mailer;
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::permission_repository::{
    NewPermission, PermissionChanges, PermissionRepository,
};
use crate::application::ports::product_repository::{
    NewProduct, ProductChanges, ProductFilter, ProductRepository, ProductSearch,
};
use crate::application::ports::role_repository::{NewRole, RoleChanges, RoleRepository};
use crate::application::ports::user_repository::{
    NewUser, UserChanges, UserFilter, UserPage, UserRepository,
};
use crate::domain::catalog::category::Category;
use crate::domain::catalog::product::Product;
use crate::domain::customers::customer::{
    CommunicationPreferences, Customer, CustomerAccount, CustomerProfile, WineType,
};
use crate::domain::inventory::stock::{
    DEFAULT_MAXIMUM_STOCK, DEFAULT_MINIMUM_STOCK, Inventory, StockMovement, StockMovementKind,
};
use crate::domain::users::user::{Permission, Role, RoleWithPermissions, User};
use crate::infrastructure::security::jwt::JwtTokenService;

pub fn token_service() -> JwtTokenService {
    JwtTokenService::new("test-secret", 3600)
}

/// Stores `plain:<password>` so tests can assert on hashes directly.
pub struct PlainHasher;

impl PlainHasher {
    pub fn hashed(plain: &str) -> String {
        format!("plain:{plain}")
    }
}

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, plain: &str) -> anyhow::Result<String> {
        Ok(Self::hashed(plain))
    }

    async fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        Ok(Self::hashed(plain) == hash)
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    verifications: Mutex<Vec<(String, String)>>,
    resets: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn verifications(&self) -> Vec<(String, String)> {
        self.verifications.lock().unwrap().clone()
    }

    pub fn resets(&self) -> Vec<(String, String)> {
        self.resets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification_email(&self, email: &str, token: &str) -> anyhow::Result<()> {
        self.verifications
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str, token: &str) -> anyhow::Result<()> {
        self.resets
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    user_roles: HashMap<Uuid, Vec<Uuid>>,
    role_permissions: HashMap<Uuid, Vec<Uuid>>,
    accounts: HashMap<Uuid, CustomerAccount>,
}

impl State {
    fn with_permissions(&self, role: &Role) -> RoleWithPermissions {
        let ids = self.role_permissions.get(&role.id).cloned().unwrap_or_default();
        let mut permissions: Vec<Permission> = self
            .permissions
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        RoleWithPermissions {
            role: role.clone(),
            permissions,
        }
    }

    fn known_permissions(&self, ids: &[Uuid]) -> Vec<Uuid> {
        let mut out: Vec<Uuid> = Vec::new();
        for id in ids {
            if self.permissions.iter().any(|p| p.id == *id) && !out.contains(id) {
                out.push(*id);
            }
        }
        out
    }

    fn permission_id(&mut self, name: &str) -> Uuid {
        if let Some(p) = self.permissions.iter().find(|p| p.name == name) {
            return p.id;
        }
        let (module, action) = name.split_once('.').unwrap_or((name, ""));
        let now = Utc::now();
        let p = Permission {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            module: module.to_string(),
            action: action.to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = p.id;
        self.permissions.push(p);
        id
    }

    fn insert_role(&mut self, name: &str, permission_ids: Vec<Uuid>) -> Uuid {
        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let id = role.id;
        self.roles.push(role);
        self.role_permissions.insert(id, permission_ids);
        id
    }

    fn live_user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
    }
}

fn new_user(email: &str, name: Option<String>, password_hash: String, verified: bool) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name,
        password_hash,
        is_email_verified: verified,
        email_verification_token: None,
        password_reset_token: None,
        password_reset_expires: None,
        avatar: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// One store backing the user, role, permission and customer ports.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn seed_user(&self, email: &str, password: &str, verified: bool) -> User {
        let user = new_user(email, None, PlainHasher::hashed(password), verified);
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    /// Gives the user `role_name`, creating the role and permissions on demand.
    pub fn grant(&self, user_id: Uuid, role_name: &str, permissions: &[&str]) {
        let mut st = self.state.lock().unwrap();
        let ids: Vec<Uuid> = permissions.iter().map(|p| st.permission_id(p)).collect();
        let existing = st.roles.iter().find(|r| r.name == role_name).map(|r| r.id);
        let role_id = match existing {
            Some(id) => id,
            None => st.insert_role(role_name, ids),
        };
        st.user_roles.entry(user_id).or_default().push(role_id);
    }

    pub fn seed_role(&self, name: &str, permissions: &[&str]) -> Uuid {
        let mut st = self.state.lock().unwrap();
        let ids: Vec<Uuid> = permissions.iter().map(|p| st.permission_id(p)).collect();
        st.insert_role(name, ids)
    }

    pub fn seed_role_with_ids(&self, name: &str, permission_ids: &[Uuid]) -> Uuid {
        self.state
            .lock()
            .unwrap()
            .insert_role(name, permission_ids.to_vec())
    }

    pub fn seed_permission(&self, name: &str) -> Uuid {
        self.state.lock().unwrap().permission_id(name)
    }

    /// Includes soft-deleted users.
    pub fn user(&self, id: Uuid) -> Option<User> {
        let st = self.state.lock().unwrap();
        st.users.iter().find(|u| u.id == id).cloned()
    }

    pub fn account(&self, user_id: Uuid) -> Option<CustomerAccount> {
        self.state.lock().unwrap().accounts.get(&user_id).cloned()
    }

    pub fn role_names(&self, user_id: Uuid) -> Vec<String> {
        let st = self.state.lock().unwrap();
        let ids = st.user_roles.get(&user_id).cloned().unwrap_or_default();
        st.roles
            .iter()
            .filter(|r| r.is_active && ids.contains(&r.id))
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn set_reset(&self, id: Uuid, token: &str, expires: DateTime<Utc>) {
        let mut st = self.state.lock().unwrap();
        if let Some(u) = st.users.iter_mut().find(|u| u.id == id) {
            u.password_reset_token = Some(token.to_string());
            u.password_reset_expires = Some(expires);
        }
    }

    pub fn set_verification(&self, id: Uuid, token: &str) {
        let mut st = self.state.lock().unwrap();
        if let Some(u) = st.users.iter_mut().find(|u| u.id == id) {
            u.email_verification_token = Some(token.to_string());
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user_row: &NewUser) -> anyhow::Result<User> {
        let mut st = self.state.lock().unwrap();
        if st
            .users
            .iter()
            .any(|u| u.deleted_at.is_none() && u.email == new_user_row.email)
        {
            anyhow::bail!("duplicate email");
        }
        let user = new_user(
            &new_user_row.email,
            new_user_row.name.clone(),
            new_user_row.password_hash.clone(),
            new_user_row.is_email_verified,
        );
        st.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn list(&self, filter: &UserFilter) -> anyhow::Result<UserPage> {
        let st = self.state.lock().unwrap();
        let matching: Vec<User> = st
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .filter(|u| filter.email.as_deref().is_none_or(|e| u.email.contains(e)))
            .filter(|u| {
                filter
                    .name
                    .as_deref()
                    .is_none_or(|n| u.name.as_deref().is_some_and(|un| un.contains(n)))
            })
            .filter(|u| {
                filter
                    .is_email_verified
                    .is_none_or(|v| u.is_email_verified == v)
            })
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let users = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok(UserPage { users, total })
    }

    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> anyhow::Result<Option<User>> {
        let mut st = self.state.lock().unwrap();
        let Some(u) = st.live_user_mut(id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.name {
            u.name = Some(v.clone());
        }
        if let Some(v) = &changes.email {
            u.email = v.clone();
        }
        if let Some(v) = &changes.password_hash {
            u.password_hash = v.clone();
        }
        if let Some(v) = &changes.avatar {
            u.avatar = Some(v.clone());
        }
        if let Some(v) = changes.is_email_verified {
            u.is_email_verified = v;
        }
        u.updated_at = Utc::now();
        Ok(Some(u.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.state.lock().unwrap();
        Ok(match st.live_user_mut(id) {
            Some(u) => {
                u.deleted_at = Some(Utc::now());
                true
            }
            None => false,
        })
    }

    async fn restore(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.state.lock().unwrap();
        Ok(
            match st
                .users
                .iter_mut()
                .find(|u| u.id == id && u.deleted_at.is_some())
            {
                Some(u) => {
                    u.deleted_at = None;
                    true
                }
                None => false,
            },
        )
    }

    async fn roles_of(&self, user_id: Uuid) -> anyhow::Result<Vec<RoleWithPermissions>> {
        let st = self.state.lock().unwrap();
        let ids = st.user_roles.get(&user_id).cloned().unwrap_or_default();
        Ok(st
            .roles
            .iter()
            .filter(|r| r.is_active && ids.contains(&r.id))
            .map(|r| st.with_permissions(r))
            .collect())
    }

    async fn replace_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()> {
        let mut st = self.state.lock().unwrap();
        st.user_roles.insert(user_id, role_ids.to_vec());
        Ok(())
    }

    async fn remove_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()> {
        let mut st = self.state.lock().unwrap();
        if let Some(held) = st.user_roles.get_mut(&user_id) {
            held.retain(|id| !role_ids.contains(id));
        }
        Ok(())
    }

    async fn find_by_role(&self, role_name: &str) -> anyhow::Result<Vec<User>> {
        let st = self.state.lock().unwrap();
        let Some(role) = st.roles.iter().find(|r| r.name == role_name) else {
            return Ok(Vec::new());
        };
        Ok(st
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .filter(|u| {
                st.user_roles
                    .get(&u.id)
                    .is_some_and(|ids| ids.contains(&role.id))
            })
            .cloned()
            .collect())
    }

    async fn set_email_verification_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut st = self.state.lock().unwrap();
        if let Some(u) = st.live_user_mut(id) {
            u.email_verification_token = token.map(str::to_string);
        }
        Ok(())
    }

    async fn mark_email_verified(&self, id: Uuid) -> anyhow::Result<()> {
        let mut st = self.state.lock().unwrap();
        if let Some(u) = st.live_user_mut(id) {
            u.is_email_verified = true;
            u.email_verification_token = None;
        }
        Ok(())
    }

    async fn set_password_reset(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.set_reset(id, token, expires_at);
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        let mut st = self.state.lock().unwrap();
        if let Some(u) = st.live_user_mut(id) {
            u.password_hash = password_hash.to_string();
            u.password_reset_token = None;
            u.password_reset_expires = None;
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn create_role(&self, new_role: &NewRole) -> anyhow::Result<RoleWithPermissions> {
        let mut st = self.state.lock().unwrap();
        let ids = st.known_permissions(&new_role.permission_ids);
        let id = st.insert_role(&new_role.name, ids);
        let role = st
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| anyhow::anyhow!("role vanished"))?;
        role.description = new_role.description.clone();
        role.is_active = new_role.is_active;
        let role = role.clone();
        Ok(st.with_permissions(&role))
    }

    async fn list_active(&self) -> anyhow::Result<Vec<RoleWithPermissions>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .roles
            .iter()
            .filter(|r| r.is_active)
            .map(|r| st.with_permissions(r))
            .collect())
    }

    async fn find_active(&self, id: Uuid) -> anyhow::Result<Option<RoleWithPermissions>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .roles
            .iter()
            .find(|r| r.id == id && r.is_active)
            .map(|r| st.with_permissions(r)))
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Role>> {
        let st = self.state.lock().unwrap();
        Ok(st.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn find_active_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Role>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .roles
            .iter()
            .filter(|r| r.is_active && ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn update_role(
        &self,
        id: Uuid,
        changes: &RoleChanges,
    ) -> anyhow::Result<Option<RoleWithPermissions>> {
        let mut st = self.state.lock().unwrap();
        let known = changes
            .permission_ids
            .as_ref()
            .map(|ids| st.known_permissions(ids));
        let Some(role) = st.roles.iter_mut().find(|r| r.id == id && r.is_active) else {
            return Ok(None);
        };
        if let Some(v) = &changes.name {
            role.name = v.clone();
        }
        if let Some(v) = &changes.description {
            role.description = Some(v.clone());
        }
        if let Some(v) = changes.is_active {
            role.is_active = v;
        }
        role.updated_at = Utc::now();
        let role = role.clone();
        if let Some(ids) = known {
            st.role_permissions.insert(id, ids);
        }
        Ok(Some(st.with_permissions(&role)))
    }

    async fn deactivate(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.state.lock().unwrap();
        Ok(match st.roles.iter_mut().find(|r| r.id == id && r.is_active) {
            Some(r) => {
                r.is_active = false;
                true
            }
            None => false,
        })
    }

    async fn add_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> anyhow::Result<()> {
        let mut st = self.state.lock().unwrap();
        let known = st.known_permissions(permission_ids);
        let held = st.role_permissions.entry(role_id).or_default();
        for id in known {
            if !held.contains(&id) {
                held.push(id);
            }
        }
        Ok(())
    }

    async fn remove_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> anyhow::Result<()> {
        let mut st = self.state.lock().unwrap();
        if let Some(held) = st.role_permissions.get_mut(&role_id) {
            held.retain(|id| !permission_ids.contains(id));
        }
        Ok(())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.state.lock().unwrap().roles.len() as i64)
    }
}

#[async_trait]
impl PermissionRepository for MemoryStore {
    async fn create_permission(
        &self,
        new_permission: &NewPermission,
    ) -> anyhow::Result<Permission> {
        let mut st = self.state.lock().unwrap();
        let now = Utc::now();
        let p = Permission {
            id: Uuid::new_v4(),
            name: new_permission.name.clone(),
            description: new_permission.description.clone(),
            module: new_permission.module.clone(),
            action: new_permission.action.clone(),
            created_at: now,
            updated_at: now,
        };
        st.permissions.push(p.clone());
        Ok(p)
    }

    async fn list(&self, module: Option<&str>) -> anyhow::Result<Vec<Permission>> {
        let st = self.state.lock().unwrap();
        let mut out: Vec<Permission> = st
            .permissions
            .iter()
            .filter(|p| module.is_none_or(|m| p.module == m))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Permission>> {
        let st = self.state.lock().unwrap();
        Ok(st.permissions.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Permission>> {
        let st = self.state.lock().unwrap();
        Ok(st.permissions.iter().find(|p| p.name == name).cloned())
    }

    async fn update_permission(
        &self,
        id: Uuid,
        changes: &PermissionChanges,
    ) -> anyhow::Result<Option<Permission>> {
        let mut st = self.state.lock().unwrap();
        let Some(p) = st.permissions.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.name {
            p.name = v.clone();
        }
        if let Some(v) = &changes.description {
            p.description = Some(v.clone());
        }
        if let Some(v) = &changes.module {
            p.module = v.clone();
        }
        if let Some(v) = &changes.action {
            p.action = v.clone();
        }
        p.updated_at = Utc::now();
        Ok(Some(p.clone()))
    }

    async fn delete_permission(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.state.lock().unwrap();
        let before = st.permissions.len();
        st.permissions.retain(|p| p.id != id);
        for held in st.role_permissions.values_mut() {
            held.retain(|p| *p != id);
        }
        Ok(st.permissions.len() != before)
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn register(&self, account: &NewCustomerAccount) -> anyhow::Result<RegistrationOutcome> {
        let mut st = self.state.lock().unwrap();
        if st
            .users
            .iter()
            .any(|u| u.deleted_at.is_none() && u.email == account.email)
        {
            return Ok(RegistrationOutcome::EmailTaken);
        }
        let user = new_user(
            &account.email,
            Some(account.name.clone()),
            account.password_hash.clone(),
            false,
        );
        let user_id = user.id;
        st.users.push(user);

        let role_id = st
            .roles
            .iter()
            .find(|r| r.is_active && r.name == account.role_name)
            .map(|r| r.id);
        if let Some(role_id) = role_id {
            st.user_roles.entry(user_id).or_default().push(role_id);
        }

        let customer = Customer {
            id: Uuid::new_v4(),
            user_id,
            customer_code: Some(account.customer_code.clone()),
            created_at: Utc::now(),
        };
        let customer_id = customer.id;
        st.accounts.insert(
            user_id,
            CustomerAccount {
                customer,
                profile: Some(CustomerProfile {
                    phone: account.phone.clone(),
                    birth_date: account.birth_date,
                }),
                communication: account.communication,
                wine_types: account.wine_types.clone(),
            },
        );
        Ok(RegistrationOutcome::Created {
            user_id,
            customer_id,
            role_assigned: role_id.is_some(),
        })
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<CustomerAccount>> {
        Ok(self.account(user_id))
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        communication: CommunicationPreferences,
        wine_types: &[WineType],
    ) -> anyhow::Result<Option<CustomerAccount>> {
        let mut st = self.state.lock().unwrap();
        let Some(account) = st.accounts.get_mut(&user_id) else {
            return Ok(None);
        };
        account.communication = communication;
        let mut seen = HashSet::new();
        account.wine_types = wine_types
            .iter()
            .copied()
            .filter(|w| seen.insert(*w))
            .collect();
        Ok(Some(account.clone()))
    }
}

#[derive(Default)]
struct CatalogState {
    categories: Vec<Category>,
    products: Vec<Product>,
    inventory: Vec<Inventory>,
    movements: Vec<StockMovement>,
}

impl CatalogState {
    fn is_listed(&self, product_id: Uuid) -> bool {
        self.products
            .iter()
            .any(|p| p.id == product_id && p.is_active && p.deleted_at.is_none())
    }
}

/// Categories, products and inventory held in memory.
#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<CatalogState>,
}

impl MemoryCatalog {
    pub fn seed_category(&self, name: &str) -> Uuid {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            category_type: "product".into(),
            created_at: now,
            updated_at: now,
        };
        let id = category.id;
        self.state.lock().unwrap().categories.push(category);
        id
    }
}

#[async_trait]
impl CategoryRepository for MemoryCatalog {
    async fn list(&self) -> anyhow::Result<Vec<Category>> {
        let mut out = self.state.lock().unwrap().categories.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Category>> {
        let st = self.state.lock().unwrap();
        Ok(st.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.state.lock().unwrap().categories.len() as i64)
    }

    async fn insert(&self, name: &str, description: Option<&str>) -> anyhow::Result<Category> {
        let id = self.seed_category(name);
        let mut st = self.state.lock().unwrap();
        let category = st
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow::anyhow!("category vanished"))?;
        category.description = description.map(str::to_string);
        Ok(category.clone())
    }
}

#[async_trait]
impl ProductRepository for MemoryCatalog {
    async fn create_with_inventory(
        &self,
        new_product: &NewProduct,
        updated_by: &str,
    ) -> anyhow::Result<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: new_product.name.clone(),
            description: new_product.description.clone(),
            category_id: new_product.category_id,
            vintage_year: new_product.vintage_year,
            alcohol_content: new_product.alcohol_content,
            grape_variety: new_product.grape_variety.clone(),
            region: new_product.region.clone(),
            volume: new_product.volume,
            price: new_product.price,
            image_url: new_product.image_url.clone(),
            images: new_product.images.clone(),
            tasting_notes: new_product.tasting_notes.clone(),
            food_pairing: new_product.food_pairing.clone(),
            awards: new_product.awards.clone(),
            is_active: new_product.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let mut st = self.state.lock().unwrap();
        st.inventory.push(Inventory {
            id: Uuid::new_v4(),
            product_id: product.id,
            current_stock: 0,
            reserved_stock: 0,
            minimum_stock: DEFAULT_MINIMUM_STOCK,
            maximum_stock: DEFAULT_MAXIMUM_STOCK,
            last_updated: now,
            updated_by: Some(updated_by.to_string()),
        });
        st.products.push(product.clone());
        Ok(product)
    }

    async fn list(&self, filter: &ProductFilter) -> anyhow::Result<Vec<Product>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .products
            .iter()
            .rev()
            .filter(|p| p.deleted_at.is_none() && p.is_active == filter.is_active)
            .filter(|p| filter.category_id.is_none_or(|c| p.category_id == c))
            .cloned()
            .collect())
    }

    async fn search(&self, search: &ProductSearch) -> anyhow::Result<Vec<Product>> {
        let st = self.state.lock().unwrap();
        let needle = search.query.as_deref().map(str::to_lowercase);
        Ok(st
            .products
            .iter()
            .filter(|p| p.deleted_at.is_none() && p.is_active)
            .filter(|p| {
                search.category_ids.is_empty() || search.category_ids.contains(&p.category_id)
            })
            .filter(|p| {
                needle.as_deref().is_none_or(|n| {
                    [
                        Some(p.name.as_str()),
                        p.description.as_deref(),
                        p.grape_variety.as_deref(),
                        p.region.as_deref(),
                    ]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(n))
                })
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .products
            .iter()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .cloned())
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: &ProductChanges,
    ) -> anyhow::Result<Option<Product>> {
        let mut st = self.state.lock().unwrap();
        let Some(p) = st
            .products
            .iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
        else {
            return Ok(None);
        };
        if let Some(v) = &changes.name {
            p.name = v.clone();
        }
        if let Some(v) = &changes.description {
            p.description = Some(v.clone());
        }
        if let Some(v) = changes.category_id {
            p.category_id = v;
        }
        if let Some(v) = changes.vintage_year {
            p.vintage_year = v;
        }
        if let Some(v) = changes.alcohol_content {
            p.alcohol_content = Some(v);
        }
        if let Some(v) = &changes.grape_variety {
            p.grape_variety = Some(v.clone());
        }
        if let Some(v) = &changes.region {
            p.region = Some(v.clone());
        }
        if let Some(v) = changes.volume {
            p.volume = Some(v);
        }
        if let Some(v) = changes.price {
            p.price = v;
        }
        if let Some(v) = &changes.image_url {
            p.image_url = Some(v.clone());
        }
        if let Some(v) = &changes.images {
            p.images = v.clone();
        }
        if let Some(v) = &changes.tasting_notes {
            p.tasting_notes = Some(v.clone());
        }
        if let Some(v) = &changes.food_pairing {
            p.food_pairing = v.clone();
        }
        if let Some(v) = &changes.awards {
            p.awards = v.clone();
        }
        if let Some(v) = changes.is_active {
            p.is_active = v;
        }
        p.updated_at = Utc::now();
        Ok(Some(p.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.state.lock().unwrap();
        Ok(
            match st
                .products
                .iter_mut()
                .find(|p| p.id == id && p.deleted_at.is_none())
            {
                Some(p) => {
                    p.deleted_at = Some(Utc::now());
                    true
                }
                None => false,
            },
        )
    }

    async fn count_active(&self) -> anyhow::Result<i64> {
        let st = self.state.lock().unwrap();
        Ok(st
            .products
            .iter()
            .filter(|p| p.is_active && p.deleted_at.is_none())
            .count() as i64)
    }
}

#[async_trait]
impl InventoryRepository for MemoryCatalog {
    async fn find_by_product(&self, product_id: Uuid) -> anyhow::Result<Option<Inventory>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .inventory
            .iter()
            .find(|i| i.product_id == product_id)
            .cloned())
    }

    async fn update_levels(
        &self,
        product_id: Uuid,
        levels: &InventoryLevels,
        actor: &str,
    ) -> anyhow::Result<Option<InventoryChange>> {
        let mut st = self.state.lock().unwrap();
        let Some(inv) = st.inventory.iter_mut().find(|i| i.product_id == product_id) else {
            return Ok(None);
        };
        let previous = inv.current_stock;
        if let Some(v) = levels.current_stock {
            inv.current_stock = v;
        }
        if let Some(v) = levels.minimum_stock {
            inv.minimum_stock = v;
        }
        if let Some(v) = levels.maximum_stock {
            inv.maximum_stock = v;
        }
        inv.last_updated = Utc::now();
        inv.updated_by = Some(actor.to_string());
        let inventory = inv.clone();
        let movement = (inventory.current_stock != previous).then(|| StockMovement {
            id: Uuid::new_v4(),
            product_id,
            kind: StockMovementKind::Adjustment,
            quantity: (inventory.current_stock - previous).abs(),
            previous_stock: previous,
            new_stock: inventory.current_stock,
            reason: Some(format!("Stock adjustment by {actor}")),
            reference_id: None,
            created_at: Utc::now(),
            created_by: Some(actor.to_string()),
        });
        if let Some(m) = &movement {
            st.movements.push(m.clone());
        }
        Ok(Some(InventoryChange {
            inventory,
            movement,
        }))
    }

    async fn record_movement(
        &self,
        product_id: Uuid,
        movement: &NewStockMovement,
        actor: &str,
    ) -> anyhow::Result<Option<InventoryChange>> {
        let mut st = self.state.lock().unwrap();
        let Some(inv) = st.inventory.iter_mut().find(|i| i.product_id == product_id) else {
            return Ok(None);
        };
        let previous = inv.current_stock;
        inv.current_stock = movement.kind.apply(previous, movement.quantity);
        inv.last_updated = Utc::now();
        inv.updated_by = Some(actor.to_string());
        let inventory = inv.clone();
        let recorded = StockMovement {
            id: Uuid::new_v4(),
            product_id,
            kind: movement.kind,
            quantity: movement.quantity,
            previous_stock: previous,
            new_stock: inventory.current_stock,
            reason: movement.reason.clone(),
            reference_id: movement.reference_id,
            created_at: Utc::now(),
            created_by: Some(actor.to_string()),
        };
        st.movements.push(recorded.clone());
        Ok(Some(InventoryChange {
            inventory,
            movement: Some(recorded),
        }))
    }

    async fn movements(&self, product_id: Uuid) -> anyhow::Result<Vec<StockMovement>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .movements
            .iter()
            .rev()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn low_stock(&self) -> anyhow::Result<Vec<Inventory>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .inventory
            .iter()
            .filter(|i| i.current_stock > 0 && i.current_stock <= i.minimum_stock)
            .filter(|i| st.is_listed(i.product_id))
            .cloned()
            .collect())
    }

    async fn out_of_stock(&self) -> anyhow::Result<Vec<Inventory>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .inventory
            .iter()
            .filter(|i| i.current_stock == 0)
            .filter(|i| st.is_listed(i.product_id))
            .cloned()
            .collect())
    }
}
