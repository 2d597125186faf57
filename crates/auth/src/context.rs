//! Resolved identity of the acting caller

use uuid::Uuid;

use crate::types::CallerRole;

/// The authenticated user/company context resolved from a credential
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub company_id: Option<i64>,
    pub roles: Vec<CallerRole>,
}

impl CallerIdentity {
    pub fn new(
        user_id: Uuid,
        email: Option<String>,
        company_id: Option<i64>,
        roles: Vec<CallerRole>,
    ) -> Self {
        Self {
            user_id,
            email,
            company_id,
            roles,
        }
    }

    pub fn has_role(&self, role: CallerRole) -> bool {
        self.roles.contains(&role)
    }

    /// Check if caller may perform platform administration
    pub fn is_platform_manager(&self) -> bool {
        self.roles.iter().any(|r| r.can_administer_platform())
    }

    /// Check if caller acts for the given company
    pub fn belongs_to(&self, company_id: i64) -> bool {
        self.company_id == Some(company_id)
    }

    /// Check if caller may invite users into the given company.
    ///
    /// Requires both an inviting role and membership of that exact company.
    pub fn can_invite_for(&self, company_id: i64) -> bool {
        self.belongs_to(company_id) && self.roles.iter().any(|r| r.can_invite())
    }
}
