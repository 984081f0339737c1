use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::use_cases::auth::authenticate::Session;

pub struct Logout<'a, B: TokenBlacklist + ?Sized> {
    pub blacklist: &'a B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub seconds_remaining: i64,
}

impl<'a, B: TokenBlacklist + ?Sized> Logout<'a, B> {
    pub fn execute(&self, session: &Session) -> LogoutOutcome {
        let exp = session.claims.exp;
        self.blacklist.revoke(&session.token, exp);
        let seconds_remaining = (exp - chrono::Utc::now().timestamp()).max(0);
        tracing::info!(user_id = %session.principal.id(), seconds_remaining, "logout");
        LogoutOutcome { seconds_remaining }
    }
}
