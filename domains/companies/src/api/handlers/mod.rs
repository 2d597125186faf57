//! HTTP handlers for the companies domain

pub mod admin;
pub mod certificates;
pub mod invitations;
pub mod settings;

use partyhub_auth::CallerIdentity;
use partyhub_common::{Error, Result};

use crate::domain::entities::PartyId;

/// Company the caller acts for; callers without one cannot act on company resources
pub(crate) fn caller_company(caller: &CallerIdentity) -> Result<PartyId> {
    caller
        .company_id
        .ok_or_else(|| Error::Authorization("Access denied: Caller has no company".to_string()))
}
