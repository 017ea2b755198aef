use domain::User;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    /// Set when a protected action was attempted without a signed-in user.
    pub sign_in_requested: bool,
}

/// The signed-in user, passed explicitly to everything that needs it.
#[derive(Clone)]
pub struct Session {
    state: Arc<watch::Sender<SessionState>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::from_state(SessionState::default())
    }

    pub fn signed_in(user: User, token: Option<String>) -> Self {
        Self::from_state(SessionState {
            user: Some(user),
            token,
            sign_in_requested: false,
        })
    }

    fn from_state(state: SessionState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn sign_in(&self, user: User, token: Option<String>) {
        info!("Signed in as {}", user.id);
        self.state.send_modify(|s| {
            s.user = Some(user);
            s.token = token;
            s.sign_in_requested = false;
        });
    }

    pub fn sign_out(&self) {
        self.state.send_modify(|s| {
            s.user = None;
            s.token = None;
        });
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    /// Whether the current user authored the item owned by `customer_id`.
    pub fn owns(&self, customer_id: &str) -> bool {
        self.state
            .borrow()
            .user
            .as_ref()
            .is_some_and(|u| u.id == customer_id)
    }

    /// Returns the current user, or flags a sign-in redirect.
    pub fn require_user(&self) -> Result<User, ApiError> {
        match self.current_user() {
            Some(user) => Ok(user),
            None => {
                self.request_sign_in();
                Err(ApiError::Unauthenticated)
            }
        }
    }

    pub fn request_sign_in(&self) {
        warn!("Protected action without a session, redirecting to sign-in");
        self.state.send_modify(|s| s.sign_in_requested = true);
    }

    pub fn sign_in_requested(&self) -> bool {
        self.state.borrow().sign_in_requested
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}
