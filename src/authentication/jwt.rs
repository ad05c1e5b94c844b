use chrono::Duration;
use chrono::Local;
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::constants::SESSION_LIFETIME_HOURS;
use crate::error::AuthError;
use crate::schema::{User, Uuid};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: Option<String>,
    iat: i64,
    exp: i64,
}

impl SessionClaims {
    pub fn new(user: &User) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + Duration::hours(SESSION_LIFETIME_HOURS)).timestamp();

        Self {
            sub: user.id,
            email: user.email.to_owned(),
            iat,
            exp,
        }
    }

    pub fn is_expired(&self) -> bool {
        (self.exp - Local::now().timestamp()).is_negative()
    }
}

impl Into<User> for SessionClaims {
    fn into(self) -> User {
        User {
            id: self.sub,
            email: self.email,
        }
    }
}

fn signing_key(secret: &[u8]) -> Result<Hmac<Sha256>, AuthError> {
    Hmac::new_from_slice(secret).map_err(|_| AuthError::new("Invalid signing key"))
}

pub fn issue_session(user: &User, secret: &[u8]) -> Result<String, AuthError> {
    sign_claims(&SessionClaims::new(user), secret)
}

fn sign_claims(claims: &SessionClaims, secret: &[u8]) -> Result<String, AuthError> {
    let key = signing_key(secret)?;

    claims
        .sign_with_key(&key)
        .map_err(|_| AuthError::new("Could not sign token"))
}

pub fn verify_session(token: &str, secret: &[u8]) -> Result<SessionClaims, AuthError> {
    let key = signing_key(secret)?;

    let session: Result<SessionClaims, jwt::Error> = token.verify_with_key(&key);
    let session = session.map_err(|_| AuthError::new("Invalid token"))?;

    if session.is_expired() {
        return Err(AuthError::new("Token expired"));
    }

    Ok(session)
}
