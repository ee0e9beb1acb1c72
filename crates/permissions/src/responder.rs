//! Grant and deny pending requests.

use crate::{
    Error, GrantAmendments, PermissionRequest, PermissionToken, RequestId, RequestRegistry,
    Resolution, ResourceDescriptor, Result, TokenStore,
};
use std::sync::Arc;

/// Cloneable handle for resolving permission requests.
///
/// Callback handlers capture one of these to answer the requests they are
/// shown, immediately or after asking the user.
#[derive(Clone)]
pub struct PermissionResponder {
    tokens: Arc<TokenStore>,
    requests: Arc<RequestRegistry>,
    differentiate_privileged: bool,
}

impl PermissionResponder {
    pub(crate) fn new(
        tokens: Arc<TokenStore>,
        requests: Arc<RequestRegistry>,
        differentiate_privileged: bool,
    ) -> Self {
        Self {
            tokens,
            requests,
            differentiate_privileged,
        }
    }

    /// Grant a pending request, minting a token unless the grant is ephemeral.
    ///
    /// The token is stored before the waiting call is woken, so its
    /// re-evaluation finds it.
    pub fn grant(&self, id: RequestId, amendments: GrantAmendments) -> Result<()> {
        let (request, reply) = self.requests.take(id).ok_or(Error::InvalidRequestId(id))?;

        if !amendments.ephemeral {
            let token = self.mint(&request, &amendments);
            if let Some(previous) = self.tokens.insert(token) {
                tracing::debug!(token = %previous.id, "replaced existing token");
            }
        }

        tracing::info!(
            request = %id,
            originator = %request.originator,
            category = %request.category,
            ephemeral = amendments.ephemeral,
            "permission granted"
        );
        if reply.send(Resolution::Granted(amendments)).is_err() {
            tracing::debug!(request = %id, "granted request has no waiter");
        }
        Ok(())
    }

    /// Deny a pending request; its waiter fails with `PermissionDenied`.
    pub fn deny(&self, id: RequestId, reason: Option<String>) -> Result<()> {
        let (request, reply) = self.requests.take(id).ok_or(Error::InvalidRequestId(id))?;

        tracing::info!(
            request = %id,
            originator = %request.originator,
            category = %request.category,
            "permission denied"
        );
        if reply.send(Resolution::Denied { reason }).is_err() {
            tracing::debug!(request = %id, "denied request has no waiter");
        }
        Ok(())
    }

    pub fn pending_requests(&self) -> Vec<PermissionRequest> {
        self.requests.pending()
    }

    fn mint(&self, request: &PermissionRequest, amendments: &GrantAmendments) -> PermissionToken {
        let descriptor = &request.descriptor;
        let mut token = PermissionToken::new(
            request.originator.clone(),
            descriptor.resource_key(self.differentiate_privileged),
            descriptor.security_level(),
        );
        token.expires_at = amendments.expires_at;
        if let ResourceDescriptor::Spending { amount, .. } = descriptor {
            token.spending_limit = Some(amendments.spending_limit.unwrap_or(*amount));
        }
        token
    }
}
