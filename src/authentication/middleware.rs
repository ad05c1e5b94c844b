use std::sync::Arc;

use warp::{reject::Rejection, Filter};

use crate::{constants::SESSION_COOKIE, schema::User};

use super::session::{enter_page, JwtSession, PageEntry, SessionProvider};

pub fn with_user(secret: Arc<[u8]>) -> impl Filter<Extract = (User,), Error = Rejection> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE).and_then(move |token: Option<String>| {
        let secret = secret.clone();
        async move {
            JwtSession::new(token, &secret)
                .get_user()
                .await
                .map_err(|e| -> Rejection { e.into() })
        }
    })
}

pub fn with_page_entry(
    secret: Arc<[u8]>,
    login_path: Arc<str>,
) -> impl Filter<Extract = (PageEntry,), Error = Rejection> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE).and_then(move |token: Option<String>| {
        let secret = secret.clone();
        let login_path = login_path.clone();
        async move {
            let session = JwtSession::new(token, &secret);
            Ok::<_, Rejection>(enter_page(&session, &login_path).await)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{jwt::issue_session, schema::Uuid};

    fn secret() -> Arc<[u8]> {
        Arc::from(&b"secret"[..])
    }

    fn cookie() -> String {
        let user = User {
            id: Uuid::from_u128(5),
            email: None,
        };
        format!("session={}", issue_session(&user, b"secret").unwrap())
    }

    #[tokio::test]
    async fn extracts_user_from_session_cookie() {
        let user = warp::test::request()
            .header("cookie", cookie())
            .filter(&with_user(secret()))
            .await
            .unwrap();

        assert_eq!(user.id, Uuid::from_u128(5));
    }

    #[tokio::test]
    async fn rejects_request_without_session() {
        let result = warp::test::request().filter(&with_user(secret())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn page_entry_redirects_to_login() {
        let filter = with_page_entry(secret(), Arc::from("/login"));

        let entry = warp::test::request().filter(&filter).await.unwrap();
        assert_eq!(entry, PageEntry::Redirect("/login".to_string()));

        let entry = warp::test::request()
            .header("cookie", cookie())
            .filter(&filter)
            .await
            .unwrap();
        assert!(matches!(entry, PageEntry::Render(user) if user.id == Uuid::from_u128(5)));
    }
}
