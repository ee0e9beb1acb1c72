//! The permissions manager: a wallet wrapper that gates every call.

use crate::request::is_admin_label;
use crate::{
    CallbackDispatcher, CallbackError, CallbackId, Decision, Error, Evaluator, GrantAmendments,
    LineItem, MetadataCipher, PermissionCategory, PermissionRequest, PermissionResponder,
    PermissionToken, PermissionsConfig, RequestHandle, RequestId, RequestRegistry, Resolution,
    ResourceDescriptor, Result, Seek, TokenStore,
};
use std::sync::Arc;
use wallet::{Counterparty, KeyDerivation, Protocol, SecurityLevel, WalletInterface};

/// Wraps an underlying wallet and enforces per-originator permissions.
///
/// The manager implements [`WalletInterface`] itself, so it can be used
/// anywhere the wrapped wallet could. Calls from the admin originator go
/// straight through; every other call is checked against stored tokens and,
/// when none applies, suspended on a permission request until a bound
/// handler grants or denies it.
pub struct PermissionsManager<W> {
    pub(crate) wallet: W,
    admin_originator: String,
    pub(crate) config: PermissionsConfig,
    tokens: Arc<TokenStore>,
    requests: Arc<RequestRegistry>,
    callbacks: CallbackDispatcher,
    responder: PermissionResponder,
}

impl<W> PermissionsManager<W> {
    pub fn new(wallet: W, admin_originator: impl Into<String>, config: PermissionsConfig) -> Self {
        let admin_originator = admin_originator.into();
        let tokens = Arc::new(TokenStore::new());
        let requests = Arc::new(RequestRegistry::new());
        let responder = PermissionResponder::new(
            tokens.clone(),
            requests.clone(),
            config.differentiate_privileged_operations,
        );

        if config.request_timeout().is_none() {
            tracing::warn!(
                admin = %admin_originator,
                "no request timeout configured; unanswered requests wait indefinitely"
            );
        }

        Self {
            wallet,
            admin_originator,
            config,
            tokens,
            requests,
            callbacks: CallbackDispatcher::new(),
            responder,
        }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn admin_originator(&self) -> &str {
        &self.admin_originator
    }

    pub fn config(&self) -> &PermissionsConfig {
        &self.config
    }

    pub fn is_admin(&self, originator: &str) -> bool {
        originator == self.admin_originator
    }

    /// A cloneable handle for resolving requests from callback handlers.
    pub fn responder(&self) -> PermissionResponder {
        self.responder.clone()
    }

    /// Bind a handler for requests of one category.
    pub fn bind_callback<F>(&self, category: PermissionCategory, handler: F) -> CallbackId
    where
        F: Fn(&PermissionRequest) -> std::result::Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.callbacks.bind(category, handler)
    }

    pub fn unbind_callback(&self, id: CallbackId) -> bool {
        self.callbacks.unbind(id)
    }

    /// Grant a pending request. Without amendments the grant is persistent,
    /// never expires, and a spending grant covers exactly the requested amount.
    pub fn grant_permission(&self, id: RequestId, amendments: Option<GrantAmendments>) -> Result<()> {
        self.responder.grant(id, amendments.unwrap_or_default())
    }

    pub fn deny_permission(&self, id: RequestId, reason: Option<String>) -> Result<()> {
        self.responder.deny(id, reason)
    }

    pub fn pending_requests(&self) -> Vec<PermissionRequest> {
        self.requests.pending()
    }

    /// Snapshot of every stored token.
    pub fn tokens(&self) -> Vec<PermissionToken> {
        self.tokens.tokens()
    }

    /// Store a token directly, replacing any token for the same resource.
    pub fn seed_token(&self, token: PermissionToken) -> Option<PermissionToken> {
        tracing::debug!(
            token = %token.id,
            originator = %token.originator,
            category = %token.category(),
            "seeding permission token"
        );
        self.tokens.insert(token)
    }

    pub fn revoke_tokens(&self, predicate: impl Fn(&PermissionToken) -> bool) -> Vec<PermissionToken> {
        let revoked = self.tokens.revoke(predicate);
        if !revoked.is_empty() {
            tracing::info!(count = revoked.len(), "revoked permission tokens");
        }
        revoked
    }

    /// Revoke every token held by an originator. Returns how many were removed.
    pub fn revoke_originator(&self, originator: &str) -> usize {
        self.revoke_tokens(|token| token.originator == originator).len()
    }

    pub(crate) fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.admin_originator, &self.config, &self.tokens)
    }

    /// Register a request and notify handlers. Handlers may resolve it
    /// before this returns; the handle still observes that resolution.
    fn raise(&self, originator: &str, descriptor: ResourceDescriptor) -> RequestHandle {
        let handle = self
            .requests
            .open(originator, descriptor, self.config.request_timeout());
        tracing::info!(
            request = %handle.id(),
            originator,
            resource = %handle.request().descriptor,
            "permission request raised"
        );
        self.callbacks.dispatch(handle.request());
        handle
    }

    /// Make sure `originator` may use the described resource, raising a
    /// request and waiting on it if no token applies.
    ///
    /// With `may_prompt` false a missing token is a denial.
    pub(crate) async fn ensure(
        &self,
        originator: &str,
        descriptor: ResourceDescriptor,
        seek: Seek,
        may_prompt: bool,
    ) -> Result<()> {
        self.authorize(originator, descriptor, seek, may_prompt)
            .await
            .map(|_| ())
    }

    /// Like [`ensure`](Self::ensure), returning the token the call was
    /// allowed under. `None` means no token was needed or the grant was
    /// ephemeral. A returned spending token has already been charged.
    async fn authorize(
        &self,
        originator: &str,
        descriptor: ResourceDescriptor,
        seek: Seek,
        may_prompt: bool,
    ) -> Result<Option<PermissionToken>> {
        match self.evaluator().evaluate(originator, &descriptor, seek)? {
            Decision::Allowed(token) => return Ok(token),
            Decision::Exhausted {
                requested,
                available,
            } => {
                return Err(Error::InsufficientSpendingLimit {
                    requested,
                    available,
                });
            }
            Decision::MustRequest => {}
        }

        if !may_prompt {
            return Err(Error::denied(&descriptor, "no permission on record"));
        }

        let resolution = self.raise(originator, descriptor.clone()).resolved().await;
        match resolution {
            Resolution::Granted(amendments) if amendments.ephemeral => {
                match (descriptor.amount(), amendments.spending_limit) {
                    (Some(requested), Some(available)) if available < requested => {
                        Err(Error::InsufficientSpendingLimit {
                            requested,
                            available,
                        })
                    }
                    _ => Ok(None),
                }
            }
            // The minted token is in the store; re-evaluating charges it.
            Resolution::Granted(_) => match self.evaluator().evaluate(originator, &descriptor, seek)? {
                Decision::Allowed(token) => Ok(token),
                Decision::Exhausted {
                    requested,
                    available,
                } => Err(Error::InsufficientSpendingLimit {
                    requested,
                    available,
                }),
                Decision::MustRequest => Err(Error::denied(&descriptor, "granted token unavailable")),
            },
            Resolution::Denied { reason } => Err(Error::PermissionDenied {
                category: descriptor.category(),
                resource: descriptor.to_string(),
                reason,
            }),
            Resolution::Expired => Err(Error::denied(&descriptor, "request expired")),
        }
    }

    /// Check a key-derivation call against its protocol permission.
    pub(crate) async fn ensure_key(
        &self,
        originator: &str,
        key: &KeyDerivation,
        seek: Seek,
    ) -> Result<()> {
        let descriptor = ResourceDescriptor::Protocol {
            protocol: key.protocol_id.clone(),
            counterparty: key.counterparty.clone(),
            privileged: key.privileged,
            reason: key.privileged_reason.clone(),
        };
        self.ensure(originator, descriptor, seek, key.seek_permission.unwrap_or(true))
            .await
    }

    /// Check a wallet-defined protocol such as identity resolution.
    pub(crate) async fn ensure_protocol(
        &self,
        originator: &str,
        protocol: Protocol,
        counterparty: Option<Counterparty>,
        privileged: bool,
        seek: Seek,
        may_prompt: bool,
    ) -> Result<()> {
        let descriptor = ResourceDescriptor::Protocol {
            protocol,
            counterparty,
            privileged,
            reason: None,
        };
        self.ensure(originator, descriptor, seek, may_prompt).await
    }

    pub(crate) async fn ensure_basket(&self, originator: &str, basket: &str, seek: Seek) -> Result<()> {
        let descriptor = ResourceDescriptor::Basket {
            basket: basket.to_string(),
            reason: None,
        };
        self.ensure(originator, descriptor, seek, true).await
    }

    /// Labels starting with `admin` are refused outright; others are checked
    /// as the app-level protocol `action label <label>`.
    pub(crate) async fn ensure_label(&self, originator: &str, label: &str, seek: Seek) -> Result<()> {
        if is_admin_label(label) {
            return Err(Error::PermissionDenied {
                category: PermissionCategory::ProtocolUsage,
                resource: format!("label '{label}'"),
                reason: Some("reserved for the admin originator".to_string()),
            });
        }
        let protocol = Protocol::new(SecurityLevel::App, format!("action label {label}"));
        self.ensure_protocol(originator, protocol, None, false, seek, true)
            .await
    }

    pub(crate) async fn ensure_spending(
        &self,
        originator: &str,
        amount: u64,
        line_items: Vec<LineItem>,
        reason: Option<String>,
    ) -> Result<Option<PermissionToken>> {
        let descriptor = ResourceDescriptor::Spending {
            amount,
            line_items,
            reason,
        };
        self.authorize(originator, descriptor, Seek::Spending, true)
            .await
    }

    /// Give back a charge taken by [`ensure_spending`](Self::ensure_spending)
    /// for a call that failed afterwards.
    pub(crate) fn refund_spending(&self, token: &PermissionToken, amount: u64) {
        match self.tokens.refund(token.id, amount) {
            Some(restored) => tracing::debug!(
                token = %token.id,
                amount,
                restored,
                "refunded spending charge"
            ),
            None => tracing::debug!(token = %token.id, "charged token gone; nothing to refund"),
        }
    }
}

impl<W> PermissionsManager<W>
where
    W: WalletInterface<Error = wallet::Error>,
{
    pub(crate) fn cipher(&self) -> MetadataCipher<'_, W> {
        MetadataCipher::new(&self.wallet, &self.admin_originator)
    }
}
