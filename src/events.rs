use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GroupId, TenantId};

/// all events emitted by dealer-group operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    GroupCreated {
        group_id: GroupId,
        owner: TenantId,
        name: String,
        timestamp: DateTime<Utc>,
    },
    MemberJoined {
        group_id: GroupId,
        tenant_id: TenantId,
        member_count: usize,
        timestamp: DateTime<Utc>,
    },
    MemberLeft {
        group_id: GroupId,
        tenant_id: TenantId,
        member_count: usize,
        timestamp: DateTime<Utc>,
    },
    InviteCodeRotated {
        group_id: GroupId,
        timestamp: DateTime<Utc>,
    },
    GroupDissolved {
        group_id: GroupId,
        released_members: usize,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn group_id(&self) -> GroupId {
        match self {
            Event::GroupCreated { group_id, .. }
            | Event::MemberJoined { group_id, .. }
            | Event::MemberLeft { group_id, .. }
            | Event::InviteCodeRotated { group_id, .. }
            | Event::GroupDissolved { group_id, .. } => *group_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
