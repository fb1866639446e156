use std::collections::HashMap;

use hourglass_rs::SafeTimeProvider;
use log::info;
use uuid::Uuid;

use crate::errors::{CreditError, Result};
use crate::events::{Event, EventStore};
use crate::groups::invite::{generate_invite_code, normalize_invite_code};
use crate::groups::{DealerGroup, GroupMember};
use crate::plans::{FeatureKey, PlanCatalog};
use crate::types::{GroupId, MemberRole, Tenant, TenantId};

/// attempts at drawing an unused invite code before giving up
const CODE_ATTEMPTS: usize = 16;

/// in-memory dealer-group membership, one group per tenant
#[derive(Debug, Default)]
pub struct DealerGroupRegistry {
    catalog: PlanCatalog,
    groups: HashMap<GroupId, DealerGroup>,
    codes: HashMap<String, GroupId>,
    memberships: HashMap<TenantId, GroupId>,
}

impl DealerGroupRegistry {
    pub fn new(catalog: PlanCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn get(&self, group_id: GroupId) -> Option<&DealerGroup> {
        self.groups.get(&group_id)
    }

    pub fn group_of(&self, tenant_id: TenantId) -> Option<&DealerGroup> {
        self.memberships
            .get(&tenant_id)
            .and_then(|group_id| self.groups.get(group_id))
    }

    pub fn find_by_code(&self, code: &str) -> Option<&DealerGroup> {
        self.codes
            .get(&normalize_invite_code(code))
            .and_then(|group_id| self.groups.get(group_id))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// create a group owned by `owner`
    pub fn create_group(
        &mut self,
        owner: &Tenant,
        name: &str,
        time: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<&DealerGroup> {
        self.catalog.ensure_enabled(owner.plan, FeatureKey::CanCreateGroup)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CreditError::BlankGroupName);
        }
        self.ensure_not_in_group(owner.id)?;

        let now = time.now();
        let invite_code = self.unused_code()?;
        let group = DealerGroup {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner: owner.id,
            owner_plan: owner.plan,
            invite_code: invite_code.clone(),
            members: vec![GroupMember {
                tenant_id: owner.id,
                role: MemberRole::Owner,
                joined_at: now,
            }],
            created_at: now,
        };
        let group_id = group.id;

        info!("dealer group {} created by tenant {}", group_id, owner.id);
        events.emit(Event::GroupCreated {
            group_id,
            owner: owner.id,
            name: group.name.clone(),
            timestamp: now,
        });

        self.codes.insert(invite_code, group_id);
        self.memberships.insert(owner.id, group_id);
        Ok(self.groups.entry(group_id).or_insert(group))
    }

    /// join the group behind `code`
    pub fn join_group(
        &mut self,
        tenant: &Tenant,
        code: &str,
        time: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<GroupId> {
        self.catalog.ensure_enabled(tenant.plan, FeatureKey::CanJoinGroup)?;
        self.ensure_not_in_group(tenant.id)?;

        let group_id = *self
            .codes
            .get(&normalize_invite_code(code))
            .ok_or_else(|| CreditError::InvalidInviteCode {
                code: code.trim().to_string(),
            })?;
        let group = self
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| CreditError::InvalidInviteCode {
                code: code.trim().to_string(),
            })?;

        let current = u32::try_from(group.member_count()).unwrap_or(u32::MAX);
        self.catalog
            .ensure_capacity(group.owner_plan, FeatureKey::MaxGroupMembers, current)?;

        let now = time.now();
        group.members.push(GroupMember {
            tenant_id: tenant.id,
            role: MemberRole::Member,
            joined_at: now,
        });
        self.memberships.insert(tenant.id, group_id);

        info!("tenant {} joined dealer group {}", tenant.id, group_id);
        events.emit(Event::MemberJoined {
            group_id,
            tenant_id: tenant.id,
            member_count: group.members.len(),
            timestamp: now,
        });

        Ok(group_id)
    }

    /// leave the current group; owners dissolve instead
    pub fn leave_group(
        &mut self,
        tenant_id: TenantId,
        time: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<GroupId> {
        let group_id = *self
            .memberships
            .get(&tenant_id)
            .ok_or(CreditError::NotAGroupMember { tenant_id })?;
        let group = self
            .groups
            .get_mut(&group_id)
            .ok_or(CreditError::NotAGroupMember { tenant_id })?;

        if group.is_owner(tenant_id) {
            return Err(CreditError::OwnerCannotLeave { group_id });
        }

        group.members.retain(|m| m.tenant_id != tenant_id);
        self.memberships.remove(&tenant_id);

        info!("tenant {} left dealer group {}", tenant_id, group_id);
        events.emit(Event::MemberLeft {
            group_id,
            tenant_id,
            member_count: group.members.len(),
            timestamp: time.now(),
        });

        Ok(group_id)
    }

    /// remove the owner's group and release every member
    pub fn dissolve_group(
        &mut self,
        owner_id: TenantId,
        time: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<DealerGroup> {
        let group_id = self.owned_group(owner_id)?;
        let group = self
            .groups
            .remove(&group_id)
            .ok_or(CreditError::NotAGroupMember { tenant_id: owner_id })?;

        self.codes.remove(&group.invite_code);
        for member in &group.members {
            self.memberships.remove(&member.tenant_id);
        }

        info!("dealer group {} dissolved by tenant {}", group_id, owner_id);
        events.emit(Event::GroupDissolved {
            group_id,
            released_members: group.members.len(),
            timestamp: time.now(),
        });

        Ok(group)
    }

    /// replace the invite code; the old one stops working
    pub fn rotate_invite_code(
        &mut self,
        owner_id: TenantId,
        time: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<String> {
        let group_id = self.owned_group(owner_id)?;
        let code = self.unused_code()?;

        let group = self
            .groups
            .get_mut(&group_id)
            .ok_or(CreditError::NotAGroupMember { tenant_id: owner_id })?;
        let old_code = std::mem::replace(&mut group.invite_code, code.clone());

        self.codes.remove(&old_code);
        self.codes.insert(code.clone(), group_id);

        info!("invite code of dealer group {} rotated by tenant {}", group_id, owner_id);
        events.emit(Event::InviteCodeRotated {
            group_id,
            timestamp: time.now(),
        });

        Ok(code)
    }

    /// apply a plan change of `owner` to the group it owns; the new tier caps
    /// later joins, members already in the group stay
    pub fn update_owner_plan(&mut self, owner: &Tenant) -> Option<GroupId> {
        let group_id = self.owned_group(owner.id).ok()?;
        let group = self.groups.get_mut(&group_id)?;
        if group.owner_plan != owner.plan {
            info!(
                "dealer group {} owner plan changed from {} to {}",
                group_id, group.owner_plan, owner.plan
            );
            group.owner_plan = owner.plan;
        }
        Some(group_id)
    }

    fn owned_group(&self, owner_id: TenantId) -> Result<GroupId> {
        let group = self
            .group_of(owner_id)
            .ok_or(CreditError::NotAGroupMember { tenant_id: owner_id })?;
        if !group.is_owner(owner_id) {
            return Err(CreditError::NotGroupOwner {
                tenant_id: owner_id,
                group_id: group.id,
            });
        }
        Ok(group.id)
    }

    fn ensure_not_in_group(&self, tenant_id: TenantId) -> Result<()> {
        match self.memberships.get(&tenant_id) {
            Some(group_id) => Err(CreditError::AlreadyInGroup {
                tenant_id,
                group_id: *group_id,
            }),
            None => Ok(()),
        }
    }

    fn unused_code(&self) -> Result<String> {
        (0..CODE_ATTEMPTS)
            .map(|_| generate_invite_code())
            .find(|code| !self.codes.contains_key(code))
            .ok_or_else(|| CreditError::InvalidConfiguration {
                message: "could not allocate an unused invite code".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::{Limit, PlanTier};
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn setup() -> (DealerGroupRegistry, SafeTimeProvider, EventStore) {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));
        (DealerGroupRegistry::new(PlanCatalog::default()), time, EventStore::new())
    }

    #[test]
    fn test_create_and_join() {
        let (mut registry, time, mut events) = setup();
        let owner = Tenant::new("Sinar Motor", PlanTier::Pro);
        let dealer = Tenant::new("Jaya Mobil", PlanTier::Basic);

        let code = registry
            .create_group(&owner, "  Jabodetabek Network ", &time, &mut events)
            .unwrap()
            .invite_code
            .clone();

        let control = time.test_control().unwrap();
        control.advance(Duration::days(2));

        let group_id = registry
            .join_group(&dealer, &code.to_ascii_lowercase(), &time, &mut events)
            .unwrap();

        let group = registry.get(group_id).unwrap();
        assert_eq!(group.name, "Jabodetabek Network");
        assert!(group.is_member(dealer.id));
        assert_eq!(group.member_count(), 1);
        assert_eq!(group.members[1].joined_at - group.created_at, Duration::days(2));
        assert_eq!(registry.group_of(dealer.id).unwrap().id, group_id);
        assert_eq!(registry.find_by_code(&code).unwrap().id, group_id);

        let emitted = events.take_events();
        assert_eq!(emitted.len(), 2);
        assert!(matches!(emitted[0], Event::GroupCreated { .. }));
        assert!(matches!(emitted[1], Event::MemberJoined { member_count: 2, .. }));
    }

    #[test]
    fn test_plan_gates_creation_and_joining() {
        let (mut registry, time, mut events) = setup();
        let basic = Tenant::new("Basic Dealer", PlanTier::Basic);
        let demo = Tenant::new("Demo Dealer", PlanTier::Demo);

        assert_eq!(
            registry.create_group(&basic, "Nope", &time, &mut events).unwrap_err(),
            CreditError::FeatureNotAvailable {
                tier: PlanTier::Basic,
                feature: FeatureKey::CanCreateGroup,
            }
        );

        let owner = Tenant::new("Owner", PlanTier::Unlimited);
        let code = registry
            .create_group(&owner, "Open Group", &time, &mut events)
            .unwrap()
            .invite_code
            .clone();
        assert!(matches!(
            registry.join_group(&demo, &code, &time, &mut events),
            Err(CreditError::FeatureNotAvailable { feature: FeatureKey::CanJoinGroup, .. })
        ));
    }

    #[test]
    fn test_owner_plan_caps_members() {
        let (mut registry, time, mut events) = setup();
        let owner = Tenant::new("Owner", PlanTier::Pro);
        let code = registry
            .create_group(&owner, "Capped", &time, &mut events)
            .unwrap()
            .invite_code
            .clone();

        for i in 0..5 {
            let dealer = Tenant::new(format!("Dealer {}", i), PlanTier::Basic);
            registry.join_group(&dealer, &code, &time, &mut events).unwrap();
        }

        let late = Tenant::new("Late", PlanTier::Unlimited);
        assert_eq!(
            registry.join_group(&late, &code, &time, &mut events).unwrap_err(),
            CreditError::PlanLimitReached {
                tier: PlanTier::Pro,
                feature: FeatureKey::MaxGroupMembers,
                limit: Limit::Capped(5),
                current: 5,
            }
        );
    }

    #[test]
    fn test_owner_plan_change_moves_the_cap() {
        let (mut registry, time, mut events) = setup();
        let mut owner = Tenant::new("Owner", PlanTier::Unlimited);
        let code = registry
            .create_group(&owner, "Shrinking", &time, &mut events)
            .unwrap()
            .invite_code
            .clone();

        for i in 0..6 {
            let dealer = Tenant::new(format!("Dealer {}", i), PlanTier::Basic);
            registry.join_group(&dealer, &code, &time, &mut events).unwrap();
        }

        owner.plan = PlanTier::Pro;
        let group_id = registry.update_owner_plan(&owner).unwrap();
        let group = registry.get(group_id).unwrap();
        assert_eq!(group.owner_plan, PlanTier::Pro);
        // existing members stay above the new cap
        assert_eq!(group.member_count(), 6);

        let late = Tenant::new("Late", PlanTier::Basic);
        assert!(matches!(
            registry.join_group(&late, &code, &time, &mut events),
            Err(CreditError::PlanLimitReached { tier: PlanTier::Pro, current: 6, .. })
        ));

        let stranger = Tenant::new("Stranger", PlanTier::Pro);
        assert_eq!(registry.update_owner_plan(&stranger), None);
    }

    #[test]
    fn test_unlimited_owner_has_no_cap() {
        let (mut registry, time, mut events) = setup();
        let owner = Tenant::new("Owner", PlanTier::Unlimited);
        let code = registry
            .create_group(&owner, "Big", &time, &mut events)
            .unwrap()
            .invite_code
            .clone();

        for i in 0..40 {
            let dealer = Tenant::new(format!("Dealer {}", i), PlanTier::Basic);
            registry.join_group(&dealer, &code, &time, &mut events).unwrap();
        }
        assert_eq!(registry.find_by_code(&code).unwrap().member_count(), 40);
    }

    #[test]
    fn test_single_membership() {
        let (mut registry, time, mut events) = setup();
        let first = Tenant::new("First", PlanTier::Pro);
        let second = Tenant::new("Second", PlanTier::Pro);
        let dealer = Tenant::new("Dealer", PlanTier::Pro);

        let first_code = registry.create_group(&first, "A", &time, &mut events).unwrap().invite_code.clone();
        let second_code = registry.create_group(&second, "B", &time, &mut events).unwrap().invite_code.clone();

        let joined = registry.join_group(&dealer, &first_code, &time, &mut events).unwrap();
        assert_eq!(
            registry.join_group(&dealer, &second_code, &time, &mut events).unwrap_err(),
            CreditError::AlreadyInGroup {
                tenant_id: dealer.id,
                group_id: joined,
            }
        );
        assert!(matches!(
            registry.create_group(&first, "Again", &time, &mut events),
            Err(CreditError::AlreadyInGroup { .. })
        ));
    }

    #[test]
    fn test_invalid_code_and_blank_name() {
        let (mut registry, time, mut events) = setup();
        let owner = Tenant::new("Owner", PlanTier::Pro);
        let dealer = Tenant::new("Dealer", PlanTier::Basic);

        assert_eq!(
            registry.create_group(&owner, "   ", &time, &mut events).unwrap_err(),
            CreditError::BlankGroupName
        );
        assert_eq!(
            registry.join_group(&dealer, " nothing ", &time, &mut events).unwrap_err(),
            CreditError::InvalidInviteCode {
                code: "nothing".to_string(),
            }
        );
        assert!(registry.is_empty());
        assert!(events.events().is_empty());
    }

    #[test]
    fn test_leave_group() {
        let (mut registry, time, mut events) = setup();
        let owner = Tenant::new("Owner", PlanTier::Pro);
        let dealer = Tenant::new("Dealer", PlanTier::Basic);
        let code = registry.create_group(&owner, "G", &time, &mut events).unwrap().invite_code.clone();
        let group_id = registry.join_group(&dealer, &code, &time, &mut events).unwrap();

        assert_eq!(registry.leave_group(dealer.id, &time, &mut events).unwrap(), group_id);
        assert!(registry.group_of(dealer.id).is_none());
        assert_eq!(registry.get(group_id).unwrap().member_count(), 0);

        assert_eq!(
            registry.leave_group(dealer.id, &time, &mut events).unwrap_err(),
            CreditError::NotAGroupMember { tenant_id: dealer.id }
        );
        assert_eq!(
            registry.leave_group(owner.id, &time, &mut events).unwrap_err(),
            CreditError::OwnerCannotLeave { group_id }
        );

        // a tenant that left can join again
        registry.join_group(&dealer, &code, &time, &mut events).unwrap();
    }

    #[test]
    fn test_dissolve_releases_members() {
        let (mut registry, time, mut events) = setup();
        let owner = Tenant::new("Owner", PlanTier::Pro);
        let dealer = Tenant::new("Dealer", PlanTier::Basic);
        let code = registry.create_group(&owner, "G", &time, &mut events).unwrap().invite_code.clone();
        let group_id = registry.join_group(&dealer, &code, &time, &mut events).unwrap();

        assert_eq!(
            registry.dissolve_group(dealer.id, &time, &mut events).unwrap_err(),
            CreditError::NotGroupOwner {
                tenant_id: dealer.id,
                group_id,
            }
        );

        let dissolved = registry.dissolve_group(owner.id, &time, &mut events).unwrap();
        assert_eq!(dissolved.id, group_id);
        assert!(registry.is_empty());
        assert!(registry.group_of(owner.id).is_none());
        assert!(registry.group_of(dealer.id).is_none());
        assert!(registry.find_by_code(&code).is_none());
        assert!(matches!(
            events.events().last(),
            Some(Event::GroupDissolved { released_members: 2, .. })
        ));
    }

    #[test]
    fn test_rotate_invite_code() {
        let (mut registry, time, mut events) = setup();
        let owner = Tenant::new("Owner", PlanTier::Pro);
        let dealer = Tenant::new("Dealer", PlanTier::Basic);
        let old_code = registry.create_group(&owner, "G", &time, &mut events).unwrap().invite_code.clone();

        let new_code = registry.rotate_invite_code(owner.id, &time, &mut events).unwrap();
        assert_ne!(new_code, old_code);
        assert!(registry.find_by_code(&old_code).is_none());
        assert!(matches!(
            registry.join_group(&dealer, &old_code, &time, &mut events),
            Err(CreditError::InvalidInviteCode { .. })
        ));
        registry.join_group(&dealer, &new_code, &time, &mut events).unwrap();

        assert!(matches!(
            registry.rotate_invite_code(dealer.id, &time, &mut events),
            Err(CreditError::NotGroupOwner { .. })
        ));
    }
}
