use crate::application::error::ServiceResult;
use crate::application::ports::user_repository::{UserFilter, UserRepository};
use crate::domain::users::user::User;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page whose offset still fits in an `i64` at any page size.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

pub struct ListUsers<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_email_verified: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct UserListPage {
    pub users: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

fn non_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl<'a, R: UserRepository + ?Sized> ListUsers<'a, R> {
    pub async fn execute(&self, query: &UserListQuery) -> ServiceResult<UserListPage> {
        let page = query.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let filter = UserFilter {
            email: non_blank(&query.email),
            name: non_blank(&query.name),
            is_email_verified: query.is_email_verified,
            offset: (page - 1) * limit,
            limit,
        };
        let found = self.repo.list(&filter).await?;
        Ok(UserListPage {
            total_pages: total_pages(found.total, limit),
            users: found.users,
            total: found.total,
            page,
            limit,
        })
    }
}
