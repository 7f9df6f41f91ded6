use std::sync::Arc;

use parking_lot::RwLock;

use issuedeck_gateway::Gateway;

#[derive(Debug, Clone, Copy)]
struct AuthState {
    logged_in: bool,
    loading: bool,
}

/// Whether the backend holds a usable GitHub token.
pub struct AuthStore {
    gateway: Arc<dyn Gateway>,
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(AuthState {
                logged_in: false,
                loading: true,
            }),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().logged_in
    }

    /// True until the first `check_auth` completes.
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Ask the backend for the auth status. A failed check counts as
    /// logged out.
    pub async fn check_auth(&self) -> bool {
        let logged_in = match self.gateway.check_auth().await {
            Ok(logged_in) => logged_in,
            Err(e) => {
                tracing::warn!("Auth check failed, treating as logged out: {}", e);
                false
            }
        };

        *self.state.write() = AuthState {
            logged_in,
            loading: false,
        };
        logged_in
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        let mut state = self.state.write();
        state.logged_in = logged_in;
        state.loading = false;
    }
}
