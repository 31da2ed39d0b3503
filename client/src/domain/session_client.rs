//! Session client state machine.
//!
//! The client cycles between [`SessionState::Anonymous`] and
//! [`SessionState::Authenticated`] for the life of the process. Transitions
//! happen only through [`SessionClient::register`], [`SessionClient::login`],
//! [`SessionClient::logout`] and the local [`SessionClient::clear`].
//!
//! Every operation holds the state lock across its single provider round
//! trip, so concurrent calls on one instance run one after another and a
//! response is always applied to the state it was requested from. Dropping
//! an operation's future abandons the request; the guard is released and the
//! state is left as it was.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::ports::{IdentityProvider, IdentityProviderError};
use super::{Account, Credentials, Session, SessionError, SessionState};

/// Holds the current session and drives the provider operations.
///
/// # Examples
/// ```rust,ignore
/// let client = SessionClient::new(Arc::new(provider));
/// let session = client.login("ali1@email.com", "12345").await?;
/// assert_eq!(session.account().email(), "ali1@email.com");
/// client.logout().await?;
/// assert!(!client.is_authenticated().await);
/// ```
pub struct SessionClient<P> {
    provider: Arc<P>,
    state: Mutex<SessionState>,
}

impl<P> SessionClient<P> {
    /// Create an anonymous client backed by `provider`.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            state: Mutex::new(SessionState::Anonymous),
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Return whether a session is held.
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_authenticated()
    }

    /// Account of the held session, if any.
    pub async fn account(&self) -> Option<Account> {
        self.state
            .lock()
            .await
            .session()
            .map(|session| session.account().clone())
    }

    /// Drop the held session without contacting the provider.
    ///
    /// Waits for any in-flight operation to finish first.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        if state.is_authenticated() {
            info!("session cleared locally");
        }
        *state = SessionState::Anonymous;
    }
}

impl<P> SessionClient<P>
where
    P: IdentityProvider,
{
    /// Create an account and sign in to it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyAuthenticated`] without a network call
    /// when a session is already held, or [`SessionError::Provider`] when the
    /// provider rejects the request or the exchange fails. The state is
    /// unchanged on error.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let credentials = Credentials::registration(name, email, password);
        async {
            let mut state = self.state.lock().await;
            if state.is_authenticated() {
                debug!("register refused while signed in");
                return Err(SessionError::AlreadyAuthenticated);
            }
            let outcome = self.provider.register(&credentials).await;
            establish(&mut state, outcome)
        }
        .instrument(operation_span("register"))
        .await
    }

    /// Sign in to an existing account.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::register`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let credentials = Credentials::login(email, password);
        async {
            let mut state = self.state.lock().await;
            if state.is_authenticated() {
                debug!("login refused while signed in");
                return Err(SessionError::AlreadyAuthenticated);
            }
            let outcome = self.provider.login(&credentials).await;
            establish(&mut state, outcome)
        }
        .instrument(operation_span("login"))
        .await
    }

    /// Revoke the held token and return to the anonymous state.
    ///
    /// Succeeds without a network call when no session is held.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Provider`] when the provider rejects the
    /// request or the exchange fails. A `401` rejection means the token is
    /// already invalid, so the session is cleared before the error is
    /// returned; any other failure keeps the session.
    pub async fn logout(&self) -> Result<(), SessionError> {
        async {
            let mut state = self.state.lock().await;
            let Some(token) = state.session().map(|session| session.token().clone()) else {
                debug!("logout without a session is a no-op");
                return Ok(());
            };
            match self.provider.logout(&token).await {
                Ok(()) => {
                    *state = SessionState::Anonymous;
                    info!("session ended");
                    Ok(())
                }
                Err(error) => {
                    discard_if_unauthenticated(&mut state, &error);
                    Err(reported(error))
                }
            }
        }
        .instrument(operation_span("logout"))
        .await
    }

    /// Ask the provider which account the held token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] without a network call when
    /// no session is held, or [`SessionError::Provider`] on failure. A `401`
    /// rejection clears the session as for [`Self::logout`].
    pub async fn current_account(&self) -> Result<Account, SessionError> {
        async {
            let mut state = self.state.lock().await;
            let Some(token) = state.session().map(|session| session.token().clone()) else {
                return Err(SessionError::NotAuthenticated);
            };
            match self.provider.current_account(&token).await {
                Ok(account) => Ok(account),
                Err(error) => {
                    discard_if_unauthenticated(&mut state, &error);
                    Err(reported(error))
                }
            }
        }
        .instrument(operation_span("current_account"))
        .await
    }
}

fn operation_span(operation: &'static str) -> tracing::Span {
    info_span!("session_operation", operation, request_id = %Uuid::new_v4())
}

fn establish(
    state: &mut SessionState,
    outcome: Result<Session, IdentityProviderError>,
) -> Result<Session, SessionError> {
    let session = outcome.map_err(reported)?;
    info!(account_id = session.account().id(), "session established");
    *state = SessionState::Authenticated(session.clone());
    Ok(session)
}

fn discard_if_unauthenticated(state: &mut SessionState, error: &IdentityProviderError) {
    if error.is_unauthenticated() && state.is_authenticated() {
        info!("provider no longer recognises the token; session cleared");
        *state = SessionState::Anonymous;
    }
}

fn reported(error: IdentityProviderError) -> SessionError {
    match &error {
        IdentityProviderError::Rejected { status, .. } => {
            info!(status, "identity provider rejected the request");
        }
        other => warn!(error = %other, "identity provider call failed"),
    }
    SessionError::Provider(error)
}
