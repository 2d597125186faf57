//! Role types carried by a caller identity

use serde::{Deserialize, Serialize};

/// Platform role for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    /// Platform operator; may verify companies
    PlatformManager,
    /// Legally represents a company; may invite users into it
    LegalRepresentative,
    /// Ordinary member of a company
    CompanyMember,
}

impl CallerRole {
    /// Check if this role may perform platform administration
    pub fn can_administer_platform(&self) -> bool {
        matches!(self, CallerRole::PlatformManager)
    }

    /// Check if this role may invite users into its company
    pub fn can_invite(&self) -> bool {
        matches!(self, CallerRole::LegalRepresentative)
    }
}

impl std::str::FromStr for CallerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "platform_manager" => Ok(CallerRole::PlatformManager),
            "legal_representative" => Ok(CallerRole::LegalRepresentative),
            "company_member" | "member" => Ok(CallerRole::CompanyMember),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for CallerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallerRole::PlatformManager => write!(f, "platform_manager"),
            CallerRole::LegalRepresentative => write!(f, "legal_representative"),
            CallerRole::CompanyMember => write!(f, "company_member"),
        }
    }
}
