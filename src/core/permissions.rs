use crate::core::models::study::Study;
use crate::core::models::user::Actor;

/// Object-level write gate: the study leader or an admin.
pub fn is_study_manager(study: &Study, actor: &Actor) -> bool {
    actor.is_admin() || study.is_led_by(&actor.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::study::StudyStatus;
    use crate::core::models::user::Role;
    use chrono::Utc;

    fn study_led_by(leader: Option<&str>) -> Study {
        Study {
            id: "s1".to_string(),
            title: "Rust reading club".to_string(),
            description: String::new(),
            leader: leader.map(String::from),
            status: StudyStatus::Opened,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn leader_is_manager() {
        let study = study_led_by(Some("alice"));
        let actor = Actor {
            id: "alice".to_string(),
            role: Role::User,
        };
        assert!(is_study_manager(&study, &actor));
    }

    #[test]
    fn admin_is_manager_of_any_study() {
        let study = study_led_by(Some("alice"));
        let actor = Actor {
            id: "root".to_string(),
            role: Role::Admin,
        };
        assert!(is_study_manager(&study, &actor));
    }

    #[test]
    fn plain_member_is_not_manager() {
        let study = study_led_by(Some("alice"));
        let actor = Actor {
            id: "bob".to_string(),
            role: Role::User,
        };
        assert!(!is_study_manager(&study, &actor));
    }

    #[test]
    fn leaderless_study_is_admin_only() {
        let study = study_led_by(None);
        let actor = Actor {
            id: "alice".to_string(),
            role: Role::User,
        };
        assert!(!is_study_manager(&study, &actor));
    }
}
