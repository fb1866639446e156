pub mod invite;
pub mod registry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::plans::PlanTier;
use crate::types::{GroupId, MemberRole, TenantId};

pub use invite::{generate_invite_code, normalize_invite_code, INVITE_CODE_LEN};
pub use registry::DealerGroupRegistry;

/// a tenant's seat in a dealer group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub tenant_id: TenantId,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// a network of dealerships sharing one invite code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerGroup {
    pub id: GroupId,
    pub name: String,
    pub owner: TenantId,
    /// the owner's plan caps how many members may join.
    /// a snapshot taken at creation, refreshed by `DealerGroupRegistry::update_owner_plan`
    pub owner_plan: PlanTier,
    pub invite_code: String,
    pub members: Vec<GroupMember>,
    pub created_at: DateTime<Utc>,
}

impl DealerGroup {
    pub fn is_member(&self, tenant_id: TenantId) -> bool {
        self.members.iter().any(|m| m.tenant_id == tenant_id)
    }

    pub fn is_owner(&self, tenant_id: TenantId) -> bool {
        self.owner == tenant_id
    }

    /// members other than the owner
    pub fn member_count(&self) -> usize {
        self.members.iter().filter(|m| m.role == MemberRole::Member).count()
    }
}
