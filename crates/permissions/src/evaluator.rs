//! The permission decision core.

use crate::{
    Error, PermissionToken, PermissionsConfig, ResourceDescriptor, Result, Seek, SpendOutcome,
    TokenStore,
};
use wallet::SecurityLevel;

/// Outcome of evaluating a call against config and stored tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The call may proceed, under the given token if one was needed.
    Allowed(Option<PermissionToken>),
    /// No token satisfies the call; a request must be raised.
    MustRequest,
    /// The originator's live spending budget is smaller than the amount.
    Exhausted { requested: u64, available: u64 },
}

/// Decides whether a call needs, has, or lacks a permission.
pub struct Evaluator<'a> {
    admin_originator: &'a str,
    config: &'a PermissionsConfig,
    tokens: &'a TokenStore,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        admin_originator: &'a str,
        config: &'a PermissionsConfig,
        tokens: &'a TokenStore,
    ) -> Self {
        Self {
            admin_originator,
            config,
            tokens,
        }
    }

    /// Evaluate one call.
    ///
    /// Order: admin bypass, reserved or malformed resources (always denied),
    /// disabled check class, silent protocols, then token lookup. A matching
    /// spending token is charged before this returns.
    pub fn evaluate(
        &self,
        originator: &str,
        descriptor: &ResourceDescriptor,
        seek: Seek,
    ) -> Result<Decision> {
        if originator == self.admin_originator {
            return Ok(Decision::Allowed(None));
        }
        if descriptor.is_admin_reserved() {
            return Err(Error::denied(descriptor, "reserved for the admin originator"));
        }
        if let Some(defect) = descriptor.defect() {
            return Err(Error::denied(descriptor, defect));
        }
        if !self.config.seeks(seek) {
            tracing::debug!(originator, ?seek, "check disabled by config");
            return Ok(Decision::Allowed(None));
        }
        if descriptor.security_level() == SecurityLevel::Silent {
            return Ok(Decision::Allowed(None));
        }

        let decision = match descriptor {
            ResourceDescriptor::Spending { amount, .. } => {
                match self.tokens.spend(originator, *amount) {
                    SpendOutcome::Spent(token) => Decision::Allowed(Some(token)),
                    SpendOutcome::Insufficient { available } => Decision::Exhausted {
                        requested: *amount,
                        available,
                    },
                    SpendOutcome::Missing => Decision::MustRequest,
                }
            }
            _ => {
                let key = descriptor.resource_key(self.config.differentiate_privileged_operations);
                match self.tokens.find(originator, &key) {
                    Some(token) => Decision::Allowed(Some(token)),
                    None => Decision::MustRequest,
                }
            }
        };
        Ok(decision)
    }
}
