//! Group reconciler tests against the in-memory platform.

use std::sync::Arc;

use sitesmith_core::{
    CreateMode, Principal, Profile, ReconcileError, RoleDefinition, RoleType, ScopeStore,
};
use sitesmith_db_memory::{FailPoint, InMemoryPlatform, ScopeState};
use sitesmith_groups::{
    GroupOutcome, GroupReconciler, GroupSettings, GroupSpec, RoleAssignmentPolicy,
};

const SCOPE: &str = "portal";
const AUTHOR: &str = "CORP\\spadmin";

fn platform() -> Arc<InMemoryPlatform> {
    let platform = InMemoryPlatform::new();
    platform.insert_scope(SCOPE, ScopeState::new(AUTHOR).with_default_roles());
    Arc::new(platform)
}

fn reconciler(platform: &Arc<InMemoryPlatform>) -> GroupReconciler<InMemoryPlatform> {
    GroupReconciler::new(platform.clone())
}

fn member_logins(platform: &InMemoryPlatform, group: &str) -> Vec<String> {
    platform
        .scope(SCOPE)
        .unwrap()
        .group(group)
        .unwrap()
        .members
        .iter()
        .map(|m| m.login_name.clone())
        .collect()
}

fn readers(members: &[&str]) -> GroupSpec {
    GroupSpec::builder("Site Readers")
        .description("Read-only visitors")
        .members(members.iter().copied())
        .build()
        .unwrap()
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn test_create_fresh_group() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = GroupSpec::builder("Approvers")
        .description("Approves requests")
        .role_type(RoleType::Contributor)
        .owner("CORP\\owner")
        .members(["CORP\\first", "CORP\\second"])
        .build()
        .unwrap();

    let outcome = reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    assert_eq!(outcome, GroupOutcome::Created);

    let state = platform.scope(SCOPE).unwrap();
    let group = state.group("Approvers").unwrap();
    assert_eq!(group.description, "Approves requests");
    assert_eq!(group.owner.login_name, "CORP\\owner");
    assert_eq!(
        member_logins(&platform, "Approvers"),
        ["CORP\\first", "CORP\\second"]
    );

    let contribute = state
        .role_definitions
        .iter()
        .find(|d| d.role_type == RoleType::Contributor)
        .unwrap();
    let assignments: Vec<_> = state.assignments_for(group.id).collect();
    assert_eq!(assignments.len(), 1);
    assert!(assignments[0].binds(group.id, contribute.id));
}

#[tokio::test]
async fn test_create_defaults_to_author() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = GroupSpec::builder("Visitors").build().unwrap();

    reconciler
        .create(&spec, SCOPE, CreateMode::IgnoreExisting)
        .await
        .unwrap();

    let state = platform.scope(SCOPE).unwrap();
    let group = state.group("Visitors").unwrap();
    assert_eq!(group.owner.login_name, AUTHOR);
    assert_eq!(member_logins(&platform, "Visitors"), [AUTHOR]);
}

#[tokio::test]
async fn test_unsafe_updates_restored_after_create() {
    let platform = platform();
    let reconciler = reconciler(&platform);

    reconciler
        .create(&readers(&["CORP\\a"]), SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    assert!(!platform.allow_unsafe_updates(SCOPE));

    platform.set_allow_unsafe_updates(SCOPE, true);
    reconciler
        .create(&readers(&["CORP\\a"]), SCOPE, CreateMode::ReplaceExisting)
        .await
        .unwrap();
    assert!(platform.allow_unsafe_updates(SCOPE));
}

#[tokio::test]
async fn test_unsafe_updates_restored_after_failure() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    platform.fail_once(FailPoint::AddGroup);

    let err = reconciler
        .create(&readers(&[]), SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Platform(_)));
    assert!(!platform.allow_unsafe_updates(SCOPE));
    assert!(platform.scope(SCOPE).unwrap().groups.is_empty());
}

// =============================================================================
// Create modes
// =============================================================================

#[tokio::test]
async fn test_ignore_existing_leaves_group_untouched() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    reconciler
        .create(&readers(&["CORP\\a"]), SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    let before = platform.scope(SCOPE).unwrap();

    let changed = GroupSpec::builder("Site Readers")
        .description("Something else")
        .role_type(RoleType::Administrator)
        .members(["CORP\\b"])
        .build()
        .unwrap();
    let outcome = reconciler
        .create(&changed, SCOPE, CreateMode::IgnoreExisting)
        .await
        .unwrap();

    assert_eq!(outcome, GroupOutcome::Ignored);
    assert_eq!(platform.scope(SCOPE).unwrap(), before);
}

#[tokio::test]
async fn test_replace_existing_drops_prior_members() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    reconciler
        .create(&readers(&["CORP\\a", "CORP\\b"]), SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    let old_id = platform.scope(SCOPE).unwrap().group("Site Readers").unwrap().id;

    let outcome = reconciler
        .create(&readers(&["CORP\\c"]), SCOPE, CreateMode::ReplaceExisting)
        .await
        .unwrap();
    assert_eq!(outcome, GroupOutcome::Replaced);

    let state = platform.scope(SCOPE).unwrap();
    let group = state.group("Site Readers").unwrap();
    assert_ne!(group.id, old_id);
    assert_eq!(member_logins(&platform, "Site Readers"), ["CORP\\c"]);
    assert_eq!(state.assignments_for(old_id).count(), 0);
    assert_eq!(state.assignments_for(group.id).count(), 1);
    assert_eq!(state.groups.len(), 1);
}

#[tokio::test]
async fn test_update_existing_keeps_default_member() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    reconciler
        .create(&readers(&["CORP\\original"]), SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    let updated = GroupSpec::builder("Site Readers")
        .description("Updated description")
        .owner("CORP\\new-owner")
        .members(["CORP\\b", "CORP\\c"])
        .build()
        .unwrap();
    let outcome = reconciler
        .create(&updated, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    assert_eq!(outcome, GroupOutcome::Updated);

    let state = platform.scope(SCOPE).unwrap();
    let group = state.group("Site Readers").unwrap();
    assert_eq!(group.description, "Updated description");
    assert_eq!(group.owner.login_name, "CORP\\new-owner");
    assert_eq!(
        member_logins(&platform, "Site Readers"),
        ["CORP\\original", "CORP\\b", "CORP\\c"]
    );
}

// =============================================================================
// Role assignments
// =============================================================================

#[tokio::test]
async fn test_update_existing_is_idempotent_with_dedupe() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = readers(&["CORP\\a", "CORP\\b"]);

    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    let first = platform.scope(SCOPE).unwrap();
    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    let second = platform.scope(SCOPE).unwrap();

    let group = second.group("Site Readers").unwrap();
    assert_eq!(first.group("Site Readers"), Some(group));
    assert_eq!(first.role_assignments, second.role_assignments);
    assert_eq!(second.assignments_for(group.id).count(), 1);
}

#[tokio::test]
async fn test_append_policy_accumulates_assignments() {
    let platform = platform();
    let reconciler = GroupReconciler::with_settings(
        platform.clone(),
        GroupSettings {
            role_assignment_policy: RoleAssignmentPolicy::Append,
            ..GroupSettings::default()
        },
    );
    let spec = readers(&["CORP\\a"]);

    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    let state = platform.scope(SCOPE).unwrap();
    let group = state.group("Site Readers").unwrap();
    assert_eq!(state.assignments_for(group.id).count(), 2);
    assert_eq!(member_logins(&platform, "Site Readers"), ["CORP\\a"]);
}

#[tokio::test]
async fn test_role_tie_break_picks_last_definition() {
    let platform = Arc::new(InMemoryPlatform::new());
    let custom = RoleDefinition::new("Contribute (Custom)", RoleType::Contributor);
    let approve = RoleDefinition::new("Approve", RoleType::Administrator);
    let standard = RoleDefinition::new("Contribute", RoleType::Contributor);
    platform.insert_scope(
        SCOPE,
        ScopeState::new(AUTHOR)
            .with_role_definition(custom.clone())
            .with_role_definition(approve)
            .with_role_definition(standard.clone()),
    );
    let reconciler = reconciler(&platform);
    let spec = GroupSpec::builder("Writers")
        .role_type(RoleType::Contributor)
        .build()
        .unwrap();

    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    let state = platform.scope(SCOPE).unwrap();
    let group = state.group("Writers").unwrap();
    let assignments: Vec<_> = state.assignments_for(group.id).collect();
    assert_eq!(assignments.len(), 1);
    assert!(assignments[0].binds(group.id, standard.id));
    assert!(!assignments[0].binds(group.id, custom.id));
}

#[tokio::test]
async fn test_missing_role_definition() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.insert_scope(SCOPE, ScopeState::new(AUTHOR));
    let reconciler = reconciler(&platform);

    let err = reconciler
        .create(&readers(&[]), SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::RoleDefinitionNotFound { .. }));
}

#[tokio::test]
async fn test_rerun_after_partial_failure_converges() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = readers(&["CORP\\a", "CORP\\b"]);
    platform.fail_once(FailPoint::AddRoleAssignment);

    assert!(
        reconciler
            .create(&spec, SCOPE, CreateMode::UpdateExisting)
            .await
            .is_err()
    );
    let partial = platform.scope(SCOPE).unwrap();
    let group = partial.group("Site Readers").unwrap();
    assert_eq!(partial.assignments_for(group.id).count(), 0);
    assert_eq!(member_logins(&platform, "Site Readers"), ["CORP\\a"]);

    let outcome = reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();
    assert_eq!(outcome, GroupOutcome::Updated);

    let state = platform.scope(SCOPE).unwrap();
    assert_eq!(state.assignments_for(group.id).count(), 1);
    assert_eq!(
        member_logins(&platform, "Site Readers"),
        ["CORP\\a", "CORP\\b"]
    );
}

// =============================================================================
// Removal
// =============================================================================

#[tokio::test]
async fn test_remove_absent_group_is_not_found() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = readers(&[]);

    assert!(reconciler.find(&spec, SCOPE).await.unwrap().is_none());
    let err = reconciler.remove(&spec, SCOPE).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_remove_drops_group_and_assignments() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = readers(&["CORP\\a"]);
    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    reconciler.remove(&spec, SCOPE).await.unwrap();

    let state = platform.scope(SCOPE).unwrap();
    assert!(state.groups.is_empty());
    assert!(state.role_assignments.is_empty());
}

// =============================================================================
// Member queries
// =============================================================================

#[tokio::test]
async fn test_member_emails_skip_missing_profiles() {
    let platform = platform();
    platform.insert_profile(Profile::new("CORP\\a").with_property("WorkEmail", "a@x"));
    let reconciler = reconciler(&platform);
    let spec = readers(&["CORP\\a", "CORP\\b"]);
    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    let emails = reconciler.member_emails(&spec, SCOPE).await.unwrap();
    assert_eq!(emails, ["a@x"]);
}

#[tokio::test]
async fn test_member_emails_use_configured_property() {
    let platform = platform();
    platform.insert_profile(
        Profile::new("CORP\\a")
            .with_property("WorkEmail", "a@x")
            .with_property("SecondaryEmail", "a@y"),
    );
    platform.insert_profile(Profile::new("CORP\\b"));
    let reconciler = GroupReconciler::with_settings(
        platform.clone(),
        GroupSettings {
            contact_property: "SecondaryEmail".into(),
            ..GroupSettings::default()
        },
    );
    let spec = readers(&["CORP\\a", "CORP\\b"]);
    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    assert_eq!(reconciler.member_emails(&spec, SCOPE).await.unwrap(), ["a@y"]);
}

#[tokio::test]
async fn test_member_corp_ids() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = readers(&["CORP\\jdoe", "svc-backup"]);
    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    let ids = reconciler.member_corp_ids(&spec, SCOPE).await.unwrap();
    assert_eq!(ids, ["jdoe", "svc-backup"]);
}

#[tokio::test]
async fn test_ensure_member_is_idempotent() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = readers(&["CORP\\a"]);
    reconciler
        .create(&spec, SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    let newcomer = Principal::new("CORP\\newcomer");
    assert!(reconciler.ensure_member(&spec, SCOPE, &newcomer).await.unwrap());
    assert!(!reconciler.ensure_member(&spec, SCOPE, &newcomer).await.unwrap());

    // Same login, different id: still a member.
    let alias = Principal::new("CORP\\a");
    assert!(!reconciler.ensure_member(&spec, SCOPE, &alias).await.unwrap());

    assert_eq!(
        member_logins(&platform, "Site Readers"),
        ["CORP\\a", "CORP\\newcomer"]
    );
}

#[tokio::test]
async fn test_update_after_ensure_member_keeps_single_entry() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    reconciler
        .create(&readers(&["CORP\\a"]), SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    let added = reconciler
        .ensure_member(&readers(&["CORP\\a"]), SCOPE, &Principal::new("CORP\\b"))
        .await
        .unwrap();
    assert!(added);

    reconciler
        .create(&readers(&["CORP\\a", "CORP\\b"]), SCOPE, CreateMode::UpdateExisting)
        .await
        .unwrap();

    assert_eq!(
        member_logins(&platform, "Site Readers"),
        ["CORP\\a", "CORP\\b"]
    );
    let state = platform.scope(SCOPE).unwrap();
    let principal = state
        .principals
        .iter()
        .find(|p| p.login_name == "CORP\\b")
        .unwrap();
    assert!(state.group("Site Readers").unwrap().has_member_id(principal.id));
}

#[tokio::test]
async fn test_queries_on_absent_group() {
    let platform = platform();
    let reconciler = reconciler(&platform);
    let spec = readers(&[]);

    assert!(reconciler.member_emails(&spec, SCOPE).await.unwrap_err().is_not_found());
    assert!(reconciler.member_corp_ids(&spec, SCOPE).await.unwrap_err().is_not_found());
    let principal = Principal::new("CORP\\x");
    assert!(
        reconciler
            .ensure_member(&spec, SCOPE, &principal)
            .await
            .unwrap_err()
            .is_not_found()
    );
}
