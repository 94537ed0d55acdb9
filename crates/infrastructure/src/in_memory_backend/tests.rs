use gatehouse_application::{
    AssociationGateway, GrantSource, IdentityAdminGateway, LinkFlagToggle, ListFilter,
    NewUserAccount, PermissionChange, ResourceGateway, RoleAdminGateway,
};
use gatehouse_core::{AppError, Severity, UserIdentity};
use gatehouse_domain::{
    AccessFlag, Customer, CustomerUserLink, EmailAddress, Employee, EmployeeUserLink,
    RBAC_DATA_OBJECT, READ_ACTION, RecordId, RoleDefinition, SubjectRoleAssignment, UserAccount,
    WRITE_ACTION,
};

use super::{DEMO_ADMIN_EMAIL, DEMO_ADMIN_SUBJECT, InMemoryBackend};

fn admin() -> UserIdentity {
    UserIdentity::new(
        DEMO_ADMIN_SUBJECT,
        "Ada Admin",
        Some(DEMO_ADMIN_EMAIL.to_owned()),
    )
}

fn is_warning(error: &AppError) -> bool {
    matches!(error, AppError::Backend(failure) if failure.severity == Severity::Warning)
}

#[tokio::test]
async fn seeded_admin_holds_rbac_read_and_write() {
    let backend = InMemoryBackend::with_demo_data();

    let grants = backend.fetch_grants(&admin()).await;

    let Ok(grants) = grants else {
        panic!("grants should load");
    };
    assert!(grants.iter().any(|grant| {
        grant.object == RBAC_DATA_OBJECT && grant.action == READ_ACTION && grant.role == "admin"
    }));
    assert!(
        grants
            .iter()
            .any(|grant| grant.object == RBAC_DATA_OBJECT && grant.action == WRITE_ACTION)
    );
}

#[tokio::test]
async fn unknown_identity_has_no_grants() {
    let backend = InMemoryBackend::with_demo_data();

    let grants = backend
        .fetch_grants(&UserIdentity::new("uid-stranger", "Stranger", None))
        .await;

    assert!(grants.is_ok_and(|grants| grants.is_empty()));
}

#[tokio::test]
async fn employee_create_assigns_id_and_keyword_filters() {
    let backend = InMemoryBackend::new();

    assert!(
        ResourceGateway::<Employee>::create(&backend, &Employee::new(RecordId::Draft, "A. Tester"))
            .await
            .is_ok()
    );
    assert!(
        ResourceGateway::<Employee>::create(&backend, &Employee::new(RecordId::Draft, "B. Other"))
            .await
            .is_ok()
    );

    let filtered = ResourceGateway::<Employee>::list(&backend, &ListFilter::keyword("tester")).await;
    let Ok(filtered) = filtered else {
        panic!("employees should list");
    };
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, RecordId::saved("1"));
    assert_eq!(filtered[0].full_name, "A. Tester");
}

#[tokio::test]
async fn duplicate_customer_is_a_warning() {
    let backend = InMemoryBackend::with_demo_data();

    let result =
        ResourceGateway::<Customer>::create(&backend, &Customer::new(RecordId::Draft, "Initech"))
            .await;

    assert!(result.as_ref().is_err_and(is_warning));
}

#[tokio::test]
async fn deleting_missing_employee_is_not_found() {
    let backend = InMemoryBackend::new();

    let result = ResourceGateway::<Employee>::delete(&backend, "99").await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn employee_links_only_offer_unassigned_users() {
    let backend = InMemoryBackend::with_demo_data();

    assert!(
        AssociationGateway::<EmployeeUserLink>::create_link(&backend, "1", "grace@example.com")
            .await
            .is_ok()
    );

    let eligible = AssociationGateway::<EmployeeUserLink>::list_eligible_children(&backend).await;
    assert!(eligible.is_ok_and(|emails| !emails.contains(&"grace@example.com".to_owned())));

    let second =
        AssociationGateway::<EmployeeUserLink>::create_link(&backend, "2", "grace@example.com")
            .await;
    assert!(second.as_ref().is_err_and(is_warning));

    let links = AssociationGateway::<EmployeeUserLink>::list_links(&backend, "1").await;
    assert!(links.is_ok_and(|links| {
        links.len() == 1 && links[0].id == RecordId::saved("uid-grace")
    }));
}

#[tokio::test]
async fn customer_link_flags_toggle_independently() {
    let backend = InMemoryBackend::with_demo_data();
    assert!(
        AssociationGateway::<CustomerUserLink>::create_link(&backend, "3", "grace@example.com")
            .await
            .is_ok()
    );

    let toggle = LinkFlagToggle {
        parent_id: "3".to_owned(),
        child_id: "uid-grace".to_owned(),
        flag: AccessFlag::Financial,
        enabled: true,
    };
    assert!(
        AssociationGateway::<CustomerUserLink>::toggle_flag(&backend, &toggle)
            .await
            .is_ok()
    );

    let links = AssociationGateway::<CustomerUserLink>::list_links(&backend, "3").await;
    let Ok(links) = links else {
        panic!("links should list");
    };
    assert!(links[0].has_financial_access);
    assert!(!links[0].has_performance_access);
}

#[tokio::test]
async fn unknown_email_cannot_be_linked() {
    let backend = InMemoryBackend::with_demo_data();

    let result =
        AssociationGateway::<CustomerUserLink>::create_link(&backend, "3", "nobody@example.com")
            .await;

    assert!(result.as_ref().is_err_and(is_warning));
}

#[tokio::test]
async fn role_matrix_reflects_grants_and_revokes() {
    let backend = InMemoryBackend::with_demo_data();
    let change = PermissionChange {
        role: "viewer".to_owned(),
        resource: RBAC_DATA_OBJECT.to_owned(),
        action: WRITE_ACTION.to_owned(),
    };

    assert!(backend.grant_permission(&change).await.is_ok());
    let matrix = backend.list_role_permissions("viewer").await;
    assert!(matrix.is_ok_and(|matrix| {
        matrix
            .find(RBAC_DATA_OBJECT, WRITE_ACTION)
            .is_some_and(|descriptor| descriptor.has_permission)
    }));

    assert!(backend.revoke_permission(&change).await.is_ok());
    let matrix = backend.list_role_permissions("viewer").await;
    assert!(matrix.is_ok_and(|matrix| {
        matrix
            .find(RBAC_DATA_OBJECT, WRITE_ACTION)
            .is_some_and(|descriptor| !descriptor.has_permission)
    }));
}

#[tokio::test]
async fn deleting_a_role_unassigns_its_users() {
    let backend = InMemoryBackend::with_demo_data();

    assert!(backend.delete_role("viewer").await.is_ok());

    let users = ResourceGateway::<SubjectRoleAssignment>::list(&backend, &ListFilter::default())
        .await;
    assert!(users.is_ok_and(|users| {
        users
            .iter()
            .any(|user| user.email == "grace@example.com" && user.role.is_empty())
    }));
}

#[tokio::test]
async fn duplicate_role_is_a_warning() {
    let backend = InMemoryBackend::with_demo_data();

    let result = backend
        .create_role(&RoleDefinition {
            role: "admin".to_owned(),
            description: String::new(),
        })
        .await;

    assert!(result.as_ref().is_err_and(is_warning));
}

#[tokio::test]
async fn assigning_unknown_role_is_rejected() {
    let backend = InMemoryBackend::with_demo_data();

    let result = ResourceGateway::<SubjectRoleAssignment>::update(
        &backend,
        &SubjectRoleAssignment {
            id: RecordId::saved("uid-linus"),
            full_name: "Linus New".to_owned(),
            email: "linus@example.com".to_owned(),
            role: "root".to_owned(),
        },
    )
    .await;

    assert!(result.as_ref().is_err_and(is_warning));
}

#[tokio::test]
async fn provisioned_account_reaches_the_directory_after_sync() {
    let backend = InMemoryBackend::with_demo_data();
    let Ok(email) = EmailAddress::new("new.hire@example.com") else {
        panic!("email should be valid");
    };
    let account = NewUserAccount {
        email,
        password: "s3cret-pass".to_owned(),
    };

    assert!(backend.provision_account(&account).await.is_ok());
    let before = ResourceGateway::<SubjectRoleAssignment>::list(
        &backend,
        &ListFilter::keyword("new.hire"),
    )
    .await;
    assert!(before.is_ok_and(|users| users.is_empty()));

    assert!(backend.sync_identities().await.is_ok());
    let after = ResourceGateway::<SubjectRoleAssignment>::list(
        &backend,
        &ListFilter::keyword("new.hire"),
    )
    .await;
    assert!(after.is_ok_and(|users| users.len() == 1 && users[0].role.is_empty()));

    let duplicate = backend.provision_account(&account).await;
    assert!(duplicate.as_ref().is_err_and(is_warning));
}

#[tokio::test]
async fn deleted_account_leaves_directory_and_links_on_sync() {
    let backend = InMemoryBackend::with_demo_data();
    assert!(
        AssociationGateway::<CustomerUserLink>::create_link(&backend, "3", "grace@example.com")
            .await
            .is_ok()
    );

    assert!(
        ResourceGateway::<UserAccount>::delete(&backend, "uid-grace")
            .await
            .is_ok()
    );
    assert!(backend.sync_identities().await.is_ok());

    let links = AssociationGateway::<CustomerUserLink>::list_links(&backend, "3").await;
    assert!(links.is_ok_and(|links| links.is_empty()));
    assert!(backend.accounts().await.len() == 2);
}
