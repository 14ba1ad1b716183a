use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The signed-in account, resolved once per request from the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl Principal {
    pub fn capabilities(&self) -> Capabilities {
        capabilities(self)
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ReportItems,
    Search,
    ViewInvoices,
    ManageCatalog,
    IssueInvoices,
    AdministerAccounts,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::ReportItems,
        Capability::Search,
        Capability::ViewInvoices,
        Capability::ManageCatalog,
        Capability::IssueInvoices,
        Capability::AdministerAccounts,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of capabilities held by a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// Granted to every signed-in account
    pub const MEMBER: Capabilities = Capabilities(0b000_111);
    /// Granted on top of [`Capabilities::MEMBER`] by the admin flag
    pub const ADMIN: Capabilities = Capabilities(0b111_000);

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }

    /// True when every admin capability is present
    pub fn is_admin(&self) -> bool {
        self.0 & Self::ADMIN.0 == Self::ADMIN.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

/// The single authorization predicate. The admin flag stored on the account is
/// the only source of admin capabilities.
pub fn capabilities(principal: &Principal) -> Capabilities {
    if principal.is_admin {
        Capabilities::MEMBER.union(Capabilities::ADMIN)
    } else {
        Capabilities::MEMBER
    }
}
