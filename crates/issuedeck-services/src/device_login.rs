//! GitHub OAuth device-flow sign-in.
//!
//! The backend talks to GitHub; this side only shows the user code and
//! polls until the user approves, the code expires, or the caller cancels.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use issuedeck_core::{AuthError, DeviceCode, TokenPoll};
use issuedeck_gateway::Gateway;

use crate::stores::AuthStore;

/// Extra wait added on every `slow_down` response.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Upper bound on the backend-supplied code lifetime (one day).
const MAX_EXPIRES_IN_SECS: u64 = 24 * 60 * 60;

pub struct DeviceLogin {
    gateway: Arc<dyn Gateway>,
    auth: Arc<AuthStore>,
}

impl DeviceLogin {
    pub fn new(gateway: Arc<dyn Gateway>, auth: Arc<AuthStore>) -> Self {
        Self { gateway, auth }
    }

    /// Request a device code to show the user.
    pub async fn start(&self) -> Result<DeviceCode, AuthError> {
        let code = self.gateway.initiate_device_login().await?;
        tracing::info!(
            "Device login started, expires in {}s (poll every {}s)",
            code.expires_in,
            code.interval
        );
        Ok(code)
    }

    /// Poll until the token is granted. Returns the access token and marks
    /// the auth store logged in.
    pub async fn poll(
        &self,
        code: &DeviceCode,
        cancel: &CancellationToken,
    ) -> Result<String, AuthError> {
        let expires_in = code.expires_in.min(MAX_EXPIRES_IN_SECS);
        let deadline = Instant::now() + Duration::from_secs(expires_in);
        let mut interval = Duration::from_secs(code.interval.clamp(1, expires_in.max(1)));

        loop {
            until_done(tokio::time::sleep(interval), cancel, deadline).await?;
            let poll = until_done(
                self.gateway.poll_for_token(&code.device_code),
                cancel,
                deadline,
            )
            .await??;

            match poll {
                TokenPoll::Granted { access_token } => {
                    tracing::info!("Device login granted");
                    self.auth.set_logged_in(true);
                    return Ok(access_token);
                }
                TokenPoll::Pending => {
                    tracing::debug!("Authorization pending");
                }
                TokenPoll::SlowDown => {
                    interval += SLOW_DOWN_STEP;
                    tracing::debug!("Slowing down token polling to {:?}", interval);
                }
                TokenPoll::Expired => return Err(AuthError::Expired),
                TokenPoll::Denied { reason } => return Err(AuthError::Denied(reason)),
            }
        }
    }
}

/// Run `fut` unless the login is cancelled or its deadline passes first.
async fn until_done<F: Future>(
    fut: F,
    cancel: &CancellationToken,
    deadline: Instant,
) -> Result<F::Output, AuthError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!("Device login cancelled");
            Err(AuthError::Cancelled)
        }
        _ = tokio::time::sleep_until(deadline) => {
            tracing::warn!("Device login timed out");
            Err(AuthError::TimedOut)
        }
        output = fut => Ok(output),
    }
}
