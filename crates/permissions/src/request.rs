//! Permission requests and the resources they describe.

use crate::{PermissionCategory, ResourceKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use wallet::{Counterparty, Protocol, SecurityLevel};

/// A unique identifier for a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a request asks permission for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceDescriptor {
    /// Use of a key-derivation protocol.
    Protocol {
        protocol: Protocol,
        counterparty: Option<Counterparty>,
        privileged: bool,
        reason: Option<String>,
    },
    /// Access to a named output basket.
    Basket {
        basket: String,
        reason: Option<String>,
    },
    /// Revealing certificate fields to a verifier.
    Certificate {
        cert_type: String,
        certifier: String,
        verifier: String,
        fields: Vec<String>,
        privileged: bool,
        reason: Option<String>,
    },
    /// Spending satoshis out of the wallet.
    Spending {
        amount: u64,
        line_items: Vec<LineItem>,
        reason: Option<String>,
    },
}

/// One entry of a spending breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub kind: LineItemKind,
    pub description: String,
    pub satoshis: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    Input,
    Output,
    Fee,
}

impl ResourceDescriptor {
    pub fn category(&self) -> PermissionCategory {
        match self {
            ResourceDescriptor::Protocol { .. } => PermissionCategory::ProtocolUsage,
            ResourceDescriptor::Basket { .. } => PermissionCategory::BasketInsertion,
            ResourceDescriptor::Certificate { .. } => PermissionCategory::CertificateDisclosure,
            ResourceDescriptor::Spending { .. } => PermissionCategory::SpendingAuthorization,
        }
    }

    /// Security level of the grant; only protocols can be silent.
    pub fn security_level(&self) -> SecurityLevel {
        match self {
            ResourceDescriptor::Protocol { protocol, .. } => protocol.security_level,
            _ => SecurityLevel::App,
        }
    }

    /// Requested satoshis for spending requests.
    pub fn amount(&self) -> Option<u64> {
        match self {
            ResourceDescriptor::Spending { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ResourceDescriptor::Protocol { reason, .. }
            | ResourceDescriptor::Basket { reason, .. }
            | ResourceDescriptor::Certificate { reason, .. }
            | ResourceDescriptor::Spending { reason, .. } => reason.as_deref(),
        }
    }

    /// The key a token must carry to satisfy this descriptor.
    ///
    /// Counterparty only matters at security level 2, and `privileged` only
    /// when privileged operations are kept apart.
    pub fn resource_key(&self, differentiate_privileged: bool) -> ResourceKey {
        match self {
            ResourceDescriptor::Protocol {
                protocol,
                counterparty,
                privileged,
                ..
            } => {
                let counterparty = match protocol.security_level {
                    SecurityLevel::Counterparty => Some(
                        counterparty
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| Counterparty::Myself.to_string()),
                    ),
                    _ => None,
                };
                ResourceKey::Protocol {
                    protocol: protocol.clone(),
                    counterparty,
                    privileged: differentiate_privileged && *privileged,
                }
            }
            ResourceDescriptor::Basket { basket, .. } => ResourceKey::Basket {
                basket: basket.clone(),
            },
            ResourceDescriptor::Certificate {
                cert_type,
                certifier,
                privileged,
                ..
            } => ResourceKey::Certificate {
                cert_type: cert_type.clone(),
                certifier: certifier.clone(),
                privileged: differentiate_privileged && *privileged,
            },
            ResourceDescriptor::Spending { .. } => ResourceKey::Spending,
        }
    }

    /// Why this descriptor can never be granted, if it is malformed.
    pub(crate) fn defect(&self) -> Option<&'static str> {
        match self {
            ResourceDescriptor::Protocol { protocol, .. } if protocol.name.trim().is_empty() => {
                Some("protocol name is empty")
            }
            ResourceDescriptor::Basket { basket, .. } if basket.trim().is_empty() => {
                Some("basket name is empty")
            }
            ResourceDescriptor::Certificate {
                cert_type,
                certifier,
                ..
            } if cert_type.is_empty() || certifier.is_empty() => {
                Some("certificate type and certifier are required")
            }
            _ => None,
        }
    }

    /// Whether only the admin originator may touch this resource.
    pub(crate) fn is_admin_reserved(&self) -> bool {
        match self {
            ResourceDescriptor::Protocol { protocol, .. } => is_admin_protocol(&protocol.name),
            ResourceDescriptor::Basket { basket, .. } => is_admin_basket(basket),
            _ => false,
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceDescriptor::Protocol {
                protocol,
                counterparty,
                privileged,
                ..
            } => {
                write!(f, "protocol {protocol}")?;
                if let Some(counterparty) = counterparty {
                    write!(f, " with counterparty {counterparty}")?;
                }
                if *privileged {
                    f.write_str(" (privileged)")?;
                }
                Ok(())
            }
            ResourceDescriptor::Basket { basket, .. } => write!(f, "basket '{basket}'"),
            ResourceDescriptor::Certificate {
                cert_type,
                certifier,
                verifier,
                ..
            } => write!(
                f,
                "certificate {cert_type} from {certifier} disclosed to {verifier}"
            ),
            ResourceDescriptor::Spending { amount, .. } => write!(f, "spending {amount} satoshis"),
        }
    }
}

pub(crate) fn is_admin_protocol(name: &str) -> bool {
    name.starts_with("admin")
}

pub(crate) fn is_admin_basket(name: &str) -> bool {
    name == "default" || name.starts_with("admin")
}

pub(crate) fn is_admin_label(label: &str) -> bool {
    label.starts_with("admin")
}

/// Lifecycle state of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Granted,
    Denied,
    Expired,
}

/// An in-flight authorization ask, as shown to callback handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub id: RequestId,
    pub category: PermissionCategory,
    pub originator: String,
    pub descriptor: ResourceDescriptor,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl PermissionRequest {
    pub fn new(originator: impl Into<String>, descriptor: ResourceDescriptor) -> Self {
        Self {
            id: RequestId::new(),
            category: descriptor.category(),
            originator: originator.into(),
            descriptor,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Terms a grant may attach to the token it mints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantAmendments {
    /// When the minted token stops being valid. Unset means never.
    pub expires_at: Option<DateTime<Utc>>,
    /// Spending budget; defaults to the requested amount.
    pub spending_limit: Option<u64>,
    /// Allow only the waiting call; mint no token.
    pub ephemeral: bool,
}

impl GrantAmendments {
    pub fn ephemeral() -> Self {
        Self {
            ephemeral: true,
            ..Self::default()
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_spending_limit(mut self, limit: u64) -> Self {
        self.spending_limit = Some(limit);
        self
    }
}
