//! Capability tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use wallet::{Protocol, SecurityLevel};

/// The four permission categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    ProtocolUsage,
    BasketInsertion,
    CertificateDisclosure,
    SpendingAuthorization,
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PermissionCategory::ProtocolUsage => "protocol usage",
            PermissionCategory::BasketInsertion => "basket access",
            PermissionCategory::CertificateDisclosure => "certificate disclosure",
            PermissionCategory::SpendingAuthorization => "spending authorization",
        };
        f.write_str(name)
    }
}

/// The resource a token is scoped to. Spending tokens cover the whole originator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceKey {
    Protocol {
        protocol: Protocol,
        counterparty: Option<String>,
        privileged: bool,
    },
    Basket {
        basket: String,
    },
    Certificate {
        cert_type: String,
        certifier: String,
        privileged: bool,
    },
    Spending,
}

impl ResourceKey {
    pub fn category(&self) -> PermissionCategory {
        match self {
            ResourceKey::Protocol { .. } => PermissionCategory::ProtocolUsage,
            ResourceKey::Basket { .. } => PermissionCategory::BasketInsertion,
            ResourceKey::Certificate { .. } => PermissionCategory::CertificateDisclosure,
            ResourceKey::Spending => PermissionCategory::SpendingAuthorization,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cached grant letting matching calls skip re-approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionToken {
    pub id: TokenId,
    pub originator: String,
    pub resource: ResourceKey,
    pub security_level: SecurityLevel,
    /// Unset means the token never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Remaining budget for spending tokens.
    pub spending_limit: Option<u64>,
    pub granted_at: DateTime<Utc>,
}

impl PermissionToken {
    pub fn new(
        originator: impl Into<String>,
        resource: ResourceKey,
        security_level: SecurityLevel,
    ) -> Self {
        Self {
            id: TokenId::new(),
            originator: originator.into(),
            resource,
            security_level,
            expires_at: None,
            spending_limit: None,
            granted_at: Utc::now(),
        }
    }

    /// A spending token with the given budget.
    pub fn spending(originator: impl Into<String>, limit: u64) -> Self {
        Self::new(originator, ResourceKey::Spending, SecurityLevel::App).with_spending_limit(limit)
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_spending_limit(mut self, limit: u64) -> Self {
        self.spending_limit = Some(limit);
        self
    }

    pub fn category(&self) -> PermissionCategory {
        self.resource.category()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}
