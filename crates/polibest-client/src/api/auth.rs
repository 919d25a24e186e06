//! # Auth API
//!
//! Sign-in goes through a hosted identity page. It redirects back to the
//! front end with a one-time `session_id`, which the backend exchanges for a
//! long-lived session token. Only whitelisted e-mail addresses get a token.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Ack, ApiClient};
use crate::error::{ClientError, ClientResult};
use crate::session::{Session, User};

#[derive(Debug, Serialize)]
struct SessionExchange<'a> {
    session_id: &'a str,
}

/// Body of a successful `/auth/session`: the user plus its token.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(flatten)]
    user: User,
    session_token: String,
}

/// Authentication endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    api: ApiClient,
}

impl AuthApi {
    pub fn new(api: ApiClient) -> Self {
        AuthApi { api }
    }

    /// URL of the hosted sign-in page, redirecting back to the front end.
    pub fn login_url(&self) -> String {
        format!(
            "{}?redirect={}",
            self.api.auth_url,
            urlencoding::encode(&self.api.callback_url)
        )
    }

    /// Exchanges the one-time `session_id` for a session and signs in.
    ///
    /// ## Outcomes
    /// - success: the session context is signed in and the session returned
    /// - 403 `access_denied`: the context records the denied e-mail and
    ///   [`ClientError::AccessDenied`] is returned
    pub async fn exchange_session(&self, session_id: &str) -> ClientResult<Session> {
        debug!("Exchanging session id");
        let result: ClientResult<SessionResponse> = self
            .api
            .send_json(Method::POST, "auth/session", &SessionExchange { session_id })
            .await;

        match result {
            Ok(response) => {
                let session = Session {
                    token: response.session_token,
                    user: response.user,
                };
                self.api.session.sign_in(session.clone()).await?;
                Ok(session)
            }
            Err(ClientError::AccessDenied { email }) => {
                self.api.session.deny(email.clone()).await;
                Err(ClientError::AccessDenied { email })
            }
            Err(e) => Err(e),
        }
    }

    /// Current user; refreshes the stored user on success.
    pub async fn me(&self) -> ClientResult<User> {
        if self.api.session.bearer_token().await.is_none() {
            return Err(ClientError::NoSession);
        }
        let user: User = self.api.get_json("auth/me").await?;
        self.api.session.refresh_user(user.clone()).await?;
        Ok(user)
    }

    /// Ends the session at the backend and locally.
    ///
    /// The local session is cleared even when the backend call fails.
    pub async fn logout(&self) -> ClientResult<()> {
        let result: ClientResult<Ack> = self.api.call(Method::POST, "auth/logout").await;
        self.api.session.sign_out().await?;
        info!("Logged out");
        result.map(|_| ())
    }
}
