use crate::{error::AuthError, schema::User};

use super::jwt::verify_session;

/// Identity collaborator of the recipe pages.
#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    async fn get_user(&self) -> Result<User, AuthError>;
}

/// Session carried by a signed token, usually read from the `session` cookie.
pub struct JwtSession<'a> {
    token: Option<String>,
    secret: &'a [u8],
}

impl<'a> JwtSession<'a> {
    pub fn new(token: Option<String>, secret: &'a [u8]) -> Self {
        Self { token, secret }
    }
}

impl SessionProvider for JwtSession<'_> {
    async fn get_user(&self) -> Result<User, AuthError> {
        match &self.token {
            Some(token) => verify_session(token, self.secret).map(Into::into),
            None => Err(AuthError::new("No session")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEntry {
    Render(User),
    Redirect(String),
}

/// Resolves the visitor of a protected page. Without a valid session the page is not rendered.
pub async fn enter_page<P: SessionProvider>(provider: &P, login_path: &str) -> PageEntry {
    match provider.get_user().await {
        Ok(user) => PageEntry::Render(user),
        Err(e) => {
            log::debug!("> Redirecting to {login_path}: {e}");
            PageEntry::Redirect(login_path.to_owned())
        }
    }
}
