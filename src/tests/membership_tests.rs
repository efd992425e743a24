use crate::core::errors::StudyHubError;
use crate::core::models::study::{StudyPatch, StudyStatus};
use crate::core::models::user::Role;
use crate::tests::{create_test_service, register_user};

#[tokio::test]
async fn test_join_closed_study_is_forbidden() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let joiner = register_user(&service, "joiner", Role::User).await;

    let study = service
        .create_study("Closed club".to_string(), String::new(), &leader)
        .await
        .unwrap();
    service
        .update_study(
            &study.id,
            StudyPatch {
                status: Some(StudyStatus::Closed),
                ..Default::default()
            },
            &leader,
        )
        .await
        .unwrap();

    let result = service.join_study(&study.id, &joiner).await;
    assert!(matches!(result, Err(StudyHubError::StudyNotOpen(_))));
}

#[tokio::test]
async fn test_join_twice_fails_on_second_attempt() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let joiner = register_user(&service, "joiner", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();

    service.join_study(&study.id, &joiner).await.unwrap();
    let result = service.join_study(&study.id, &joiner).await;
    assert!(matches!(result, Err(StudyHubError::AlreadyJoined(_))));
}

#[tokio::test]
async fn test_join_creates_pending_membership() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let joiner = register_user(&service, "joiner", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    service.join_study(&study.id, &joiner).await.unwrap();

    let members = service.list_applicants(&study.id, &leader).await.unwrap();
    assert_eq!(members.len(), 2);
    let row = members.iter().find(|m| m.user_id == joiner.id).unwrap();
    assert!(!row.is_approve);
}

#[tokio::test]
async fn test_leader_quit_leaves_study_leaderless() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    let study = service.quit_study(&study.id, &leader).await.unwrap();

    assert_eq!(study.leader, None);
    let members = service.get_study_members(&study.id).await.unwrap();
    assert!(members.iter().all(|m| m.user_id != leader.id));
}

#[tokio::test]
async fn test_quit_without_membership_is_not_found() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let stranger = register_user(&service, "stranger", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    let result = service.quit_study(&study.id, &stranger).await;
    assert!(matches!(result, Err(StudyHubError::MembershipNotFound(_))));
}

#[tokio::test]
async fn test_set_leader_promotes_non_member() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let outsider = register_user(&service, "outsider", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    let study = service.set_leader(&study.id, &outsider.id, &leader).await.unwrap();

    assert_eq!(study.leader.as_deref(), Some(outsider.id.as_str()));
    let members = service.get_study_members(&study.id).await.unwrap();
    let row = members.iter().find(|m| m.user_id == outsider.id).unwrap();
    // Promotion does not toggle the approval flag; a fresh row starts pending.
    assert!(!row.is_approve);
}

#[tokio::test]
async fn test_set_leader_keeps_existing_membership() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let member = register_user(&service, "member", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    service.join_study(&study.id, &member).await.unwrap();
    service.approve_member(&study.id, &member.id, &leader).await.unwrap();

    let study = service.set_leader(&study.id, &member.id, &leader).await.unwrap();
    assert_eq!(study.leader.as_deref(), Some(member.id.as_str()));

    let members = service.get_study_members(&study.id).await.unwrap();
    assert_eq!(members.iter().filter(|m| m.user_id == member.id).count(), 1);
    assert!(members.iter().find(|m| m.user_id == member.id).unwrap().is_approve);
}

#[tokio::test]
async fn test_set_leader_unknown_user_is_not_found() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    let result = service.set_leader(&study.id, "no-such-user", &leader).await;
    assert!(matches!(result, Err(StudyHubError::UserNotFound(_))));
}

#[tokio::test]
async fn test_reject_leader_is_forbidden() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    let result = service.reject_member(&study.id, &leader.id, &leader).await;
    assert!(matches!(result, Err(StudyHubError::CannotRejectLeader)));
}

#[tokio::test]
async fn test_reject_member_removes_relation() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let member = register_user(&service, "member", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    service.join_study(&study.id, &member).await.unwrap();
    service.reject_member(&study.id, &member.id, &leader).await.unwrap();

    let members = service.get_study_members(&study.id).await.unwrap();
    assert!(members.iter().all(|m| m.user_id != member.id));
}

#[tokio::test]
async fn test_reject_unknown_member_is_not_found() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let stranger = register_user(&service, "stranger", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    let result = service.reject_member(&study.id, &stranger.id, &leader).await;
    assert!(matches!(result, Err(StudyHubError::MembershipNotFound(_))));
}

#[tokio::test]
async fn test_approve_without_relation_is_not_found() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let stranger = register_user(&service, "stranger", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    let result = service.approve_member(&study.id, &stranger.id, &leader).await;
    assert!(matches!(result, Err(StudyHubError::MembershipNotFound(_))));
}

#[tokio::test]
async fn test_approve_is_idempotent() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let member = register_user(&service, "member", Role::User).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    service.join_study(&study.id, &member).await.unwrap();

    let first = service.approve_member(&study.id, &member.id, &leader).await.unwrap();
    assert!(first.is_approve);
    let second = service.approve_member(&study.id, &member.id, &leader).await.unwrap();
    assert!(second.is_approve);
}

#[tokio::test]
async fn test_workflow_requires_leader_or_admin() {
    let service = create_test_service();
    let leader = register_user(&service, "leader", Role::User).await;
    let member = register_user(&service, "member", Role::User).await;
    let admin = register_user(&service, "admin", Role::Admin).await;

    let study = service
        .create_study("Reading group".to_string(), String::new(), &leader)
        .await
        .unwrap();
    service.join_study(&study.id, &member).await.unwrap();

    let result = service.approve_member(&study.id, &member.id, &member).await;
    assert!(matches!(result, Err(StudyHubError::NotStudyManager(_))));
    let result = service.list_applicants(&study.id, &member).await;
    assert!(matches!(result, Err(StudyHubError::NotStudyManager(_))));

    // Admin passes the same gate without being a member.
    let approved = service.approve_member(&study.id, &member.id, &admin).await.unwrap();
    assert!(approved.is_approve);
}

#[tokio::test]
async fn test_full_membership_workflow() {
    let service = create_test_service();
    let a = register_user(&service, "a", Role::User).await;
    let b = register_user(&service, "b", Role::User).await;

    // A creates, B joins pending.
    let study = service
        .create_study("Algorithms study".to_string(), String::new(), &a)
        .await
        .unwrap();
    service.join_study(&study.id, &b).await.unwrap();

    let applicants = service.list_applicants(&study.id, &a).await.unwrap();
    let row = applicants.iter().find(|m| m.user_id == b.id).unwrap();
    assert!(!row.is_approve);

    // A approves B.
    let membership = service.approve_member(&study.id, &b.id, &a).await.unwrap();
    assert!(membership.is_approve);

    // A quits, study goes leaderless.
    let study_after_quit = service.quit_study(&study.id, &a).await.unwrap();
    assert_eq!(study_after_quit.leader, None);

    // Admin hands leadership to B.
    let admin = register_user(&service, "root", Role::Admin).await;
    let study_after_transfer = service.set_leader(&study.id, &b.id, &admin).await.unwrap();
    assert_eq!(study_after_transfer.leader.as_deref(), Some(b.id.as_str()));
}
