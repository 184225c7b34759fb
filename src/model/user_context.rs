use crate::model::access::{self, AccessMask};
use crate::model::Id;
use serde::{Deserialize, Serialize};

/// Caller identity and granted capabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Id,
    pub access: AccessMask,
}

impl UserContext {
    pub fn new(user_id: Id, access: AccessMask) -> Self {
        Self { user_id, access }
    }

    /// A caller that presented no identity; holds no capabilities
    pub fn anonymous() -> Self {
        Self {
            user_id: 0,
            access: 0,
        }
    }

    /// Internal context for seeding and maintenance tasks
    pub fn system() -> Self {
        Self {
            user_id: 0,
            access: AccessMask::MAX,
        }
    }

    pub fn can(&self, required: AccessMask) -> bool {
        access::allows(self.access, required)
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::access::{DOC_CREATE, DOC_READ};

    #[test]
    fn test_anonymous_has_no_capabilities() {
        let ctx = UserContext::default();
        assert!(!ctx.can(DOC_READ));
    }

    #[test]
    fn test_system_can_do_everything() {
        let ctx = UserContext::system();
        assert!(ctx.can(DOC_READ));
        assert!(ctx.can(DOC_CREATE));
    }
}
