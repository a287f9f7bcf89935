//! Shared fixtures for engine tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mentorlink_core::types::UserId;
use mentorlink_database::Stores;
use mentorlink_database::memory::MemoryDirectory;
use mentorlink_entity::user::{UserRole, UserSummary};

use crate::context::RequestContext;
use crate::publisher::{DomainEvent, EventPublisher};

/// Publisher that remembers every event it was handed.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(Vec<UserId>, DomainEvent)>>,
}

impl RecordingPublisher {
    pub fn take(&self) -> Vec<(Vec<UserId>, DomainEvent)> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, recipients: &[UserId], event: DomainEvent) {
        self.events
            .lock()
            .unwrap()
            .push((recipients.to_vec(), event));
    }
}

/// Memory stores plus a seeded directory and a recording publisher.
pub struct Fixture {
    pub stores: Stores,
    pub directory: Arc<MemoryDirectory>,
    pub publisher: Arc<RecordingPublisher>,
}

impl Fixture {
    pub fn new() -> Self {
        let directory = Arc::new(MemoryDirectory::new());
        Self {
            stores: Stores::memory(directory.clone()),
            directory,
            publisher: Arc::new(RecordingPublisher::default()),
        }
    }

    /// Register a user in the directory and return a context acting as them.
    pub fn user(&self, name: &str, role: UserRole) -> RequestContext {
        let id = UserId::new();
        self.directory.insert(UserSummary {
            id,
            name: name.to_string(),
            email: format!("{}@mentorlink.test", name.to_lowercase()),
            role,
            profile_picture: None,
        });
        RequestContext::new(id, role, name)
    }
}
