/*
 * Responsibility
 * - The "authorized request context" type as seen from handlers
 * - The permission gate verifies the token and stores this in request extensions;
 *   handlers only ever receive this type
 *
 * Notes
 * - JWT verification and claims validation belong to middleware/services
 * - This is fixed as a type (contract), kept apart from the parts that grow per resource
 */
use std::collections::BTreeSet;

use crate::services::auth::claims::VerifiedAccessToken;

/// Context attached to an authorized request.
///
/// - `subject` is the identity provider's `sub` (e.g. `auth0|...`), for logs/audit
/// - `permissions` is `None` when the token had no `permissions` claim at all
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: Option<String>,
    pub permissions: Option<BTreeSet<String>>,
}

impl AuthCtx {
    pub fn has_permissions_claim(&self) -> bool {
        self.permissions.is_some()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|perms| perms.contains(permission))
    }
}

impl From<VerifiedAccessToken> for AuthCtx {
    fn from(token: VerifiedAccessToken) -> Self {
        Self {
            subject: token.subject,
            permissions: token.permissions,
        }
    }
}
