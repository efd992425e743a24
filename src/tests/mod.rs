mod membership_tests;

use crate::core::models::user::{Actor, Role, User};
use crate::core::services::StudyService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use uuid::Uuid;

pub fn create_test_service() -> StudyService<InMemoryLogging, InMemoryStorage> {
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    StudyService::new(storage, logging, "test-secret".to_string())
}

pub async fn register_user(
    service: &StudyService<InMemoryLogging, InMemoryStorage>,
    name: &str,
    role: Role,
) -> Actor {
    let user = service
        .add_user(User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name),
            password: "hunter2".to_string(),
            role,
        })
        .await
        .unwrap();
    Actor {
        id: user.id,
        role: user.role,
    }
}
