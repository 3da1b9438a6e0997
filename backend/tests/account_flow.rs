use std::sync::Arc;

use account_backend::{
    error::AccountError,
    models::{
        auth::{
            CheckCodeRequest, CreateNewPasswordRequest, LoginRequest, RefreshTokenRequest,
            RegisterRequest,
        },
        pagination::PageRequest,
        user::{UserFilter, UserPatch},
    },
    repositories::{InMemoryUserStore, UserStore},
    services::AccountService,
    utils::{
        email::MailTemplate,
        jwt::TokenIssuer,
        password::verify_password,
    },
};
use chrono::{Duration, Utc};

mod support;
use support::{FailingMailer, TestApp};

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.into(),
        password: "Abc@1234".into(),
        name: Some("A".into()),
    }
}

fn check(id: &str, code: &str) -> CheckCodeRequest {
    CheckCodeRequest {
        id: id.into(),
        code: code.into(),
    }
}

#[tokio::test]
async fn register_then_activate_with_mailed_code() {
    let app = TestApp::new();
    let accounts = &app.state.accounts;

    let created = accounts
        .register(register_request("a@b.com"))
        .await
        .expect("register");
    let mails = app.mailer.wait_for(1).await;
    assert_eq!(mails[0].to, "a@b.com");
    assert_eq!(mails[0].template, MailTemplate::Activation);
    assert_eq!(mails[0].context.name, "A");
    let code = mails[0].context.code.clone();

    let id = created.id.to_string();
    let err = accounts.check_code(check(&id, "wrong")).await.unwrap_err();
    assert!(matches!(err, AccountError::CodeMismatch));

    let activated = accounts.check_code(check(&id, &code)).await.expect("activate");
    assert!(activated.is_active);

    // Codes stay usable until they expire or are replaced.
    let again = accounts.check_code(check(&id, &code)).await.expect("activate twice");
    assert!(again.is_active);
}

#[tokio::test]
async fn reissuing_invalidates_previous_code() {
    let app = TestApp::new();
    let accounts = &app.state.accounts;
    let created = accounts.register(register_request("a@b.com")).await.unwrap();
    let first = app.mailer.wait_for(1).await[0].context.code.clone();

    let retried = accounts.retry_active("a@b.com").await.expect("retry");
    assert_eq!(retried.id, created.id);
    let second = app.mailer.wait_for(2).await[1].context.code.clone();
    assert_ne!(first, second);

    let id = created.id.to_string();
    let err = accounts.check_code(check(&id, &first)).await.unwrap_err();
    assert!(matches!(err, AccountError::CodeMismatch));
    accounts.check_code(check(&id, &second)).await.expect("new code works");
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let app = TestApp::new();
    let accounts = &app.state.accounts;
    let created = accounts.register(register_request("a@b.com")).await.unwrap();
    let code = app.mailer.wait_for(1).await[0].context.code.clone();

    let patch = UserPatch {
        code_expired: Some(Utc::now() - Duration::seconds(1)),
        ..UserPatch::default()
    };
    app.store.update_fields(created.id, &patch).await.unwrap();

    let err = accounts
        .check_code(check(&created.id.to_string(), &code))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::CodeExpired));
}

#[tokio::test]
async fn retry_active_checks_account_state() {
    let app = TestApp::new();
    let accounts = &app.state.accounts;

    let err = accounts.retry_active("ghost@b.com").await.unwrap_err();
    assert!(matches!(err, AccountError::NotFound(_)));

    let created = accounts.register(register_request("a@b.com")).await.unwrap();
    let code = app.mailer.wait_for(1).await[0].context.code.clone();
    accounts
        .check_code(check(&created.id.to_string(), &code))
        .await
        .unwrap();

    let err = accounts.retry_active("a@b.com").await.unwrap_err();
    assert!(matches!(err, AccountError::AlreadyActive));
}

#[tokio::test]
async fn concurrent_registrations_with_same_email_yield_one_account() {
    let app = TestApp::new();
    let accounts = &app.state.accounts;

    let (first, second) = tokio::join!(
        accounts.register(register_request("race@b.com")),
        accounts.register(register_request("race@b.com")),
    );

    let results = [first, second];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(AccountError::DuplicateEmail(_))))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(duplicates, 1);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn mail_failure_does_not_fail_registration() {
    let store = Arc::new(InMemoryUserStore::new());
    let accounts = AccountService::new(
        store.clone(),
        Arc::new(FailingMailer),
        TokenIssuer::new("s", "s", Duration::hours(1), Duration::days(7)),
        Duration::minutes(5),
    );

    let created = accounts
        .register(register_request("a@b.com"))
        .await
        .expect("registration succeeds without mail");
    let stored = store.find_by_id(created.id).await.unwrap().expect("stored");
    assert!(!stored.is_active);
    assert!(stored.code_id.is_some());
}

#[tokio::test]
async fn password_reset_replaces_credentials() {
    let app = TestApp::new();
    let accounts = &app.state.accounts;
    let created = accounts.register(register_request("a@b.com")).await.unwrap();
    let activation = app.mailer.wait_for(1).await[0].context.code.clone();
    accounts
        .check_code(check(&created.id.to_string(), &activation))
        .await
        .unwrap();

    let retried = accounts.retry_password("a@b.com").await.expect("retry password");
    assert_eq!(retried.email, "a@b.com");
    let mails = app.mailer.wait_for(2).await;
    assert_eq!(mails[1].template, MailTemplate::PasswordReset);
    let reset_code = mails[1].context.code.clone();

    let err = accounts
        .create_new_password(CreateNewPasswordRequest {
            email: "a@b.com".into(),
            code: activation,
            password: "NewPass#1".into(),
            confirm_password: "NewPass#1".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::CodeMismatch));

    accounts
        .create_new_password(CreateNewPasswordRequest {
            email: "a@b.com".into(),
            code: reset_code,
            password: "NewPass#1".into(),
            confirm_password: "NewPass#1".into(),
        })
        .await
        .expect("reset");

    let err = accounts
        .login(LoginRequest {
            email: "a@b.com".into(),
            password: "Abc@1234".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::InvalidCredentials));

    accounts
        .login(LoginRequest {
            email: "a@b.com".into(),
            password: "NewPass#1".into(),
        })
        .await
        .expect("login with new password");
}

#[tokio::test]
async fn create_new_password_rejects_expired_reset_code() {
    let app = TestApp::new();
    let accounts = &app.state.accounts;
    let created = accounts.register(register_request("a@b.com")).await.unwrap();
    app.mailer.wait_for(1).await;

    accounts.retry_password("a@b.com").await.expect("retry password");
    let reset_code = app.mailer.wait_for(2).await[1].context.code.clone();

    let patch = UserPatch {
        code_expired: Some(Utc::now() - Duration::seconds(1)),
        ..UserPatch::default()
    };
    app.store.update_fields(created.id, &patch).await.unwrap();

    let err = accounts
        .create_new_password(CreateNewPasswordRequest {
            email: "a@b.com".into(),
            code: reset_code,
            password: "NewPass#1".into(),
            confirm_password: "NewPass#1".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::CodeExpired));

    let stored = app.store.find_by_id(created.id).await.unwrap().expect("stored");
    assert!(verify_password("Abc@1234", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn create_new_password_for_unknown_email_is_not_found() {
    let app = TestApp::new();
    let err = app
        .state
        .accounts
        .create_new_password(CreateNewPasswordRequest {
            email: "ghost@b.com".into(),
            code: "x".into(),
            password: "Abc@1234".into(),
            confirm_password: "Abc@1234".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::NotFound(_)));
}

#[tokio::test]
async fn login_requires_activation_and_refresh_issues_access_token() {
    let app = TestApp::new();
    let accounts = &app.state.accounts;
    let created = accounts.register(register_request("a@b.com")).await.unwrap();

    let login = || LoginRequest {
        email: "a@b.com".into(),
        password: "Abc@1234".into(),
    };
    let err = accounts.login(login()).await.unwrap_err();
    assert!(matches!(err, AccountError::NotActivated));

    app.mailer.wait_for(1).await;
    let code = app.mailer.last_code_for("a@b.com").await;
    accounts
        .check_code(check(&created.id.to_string(), &code))
        .await
        .unwrap();

    let pair = accounts.login(login()).await.expect("login");
    let claims = app
        .state
        .tokens
        .verify_access_token(&pair.access_token)
        .expect("valid access token");
    assert_eq!(claims.sub, created.id.to_string());
    assert_eq!(claims.email, "a@b.com");

    let refreshed = accounts
        .refresh(RefreshTokenRequest {
            refresh_token: pair.refresh_token,
        })
        .expect("refresh");
    assert!(app
        .state
        .tokens
        .verify_access_token(&refreshed.access_token)
        .is_ok());
}

#[tokio::test]
async fn fact_register_shares_password_and_code() {
    let app = TestApp::new();
    let inserted = app.state.accounts.fact_register(5).await.expect("fact register");
    assert_eq!(inserted, 5);

    let (users, total) = app
        .store
        .paginated_list(&UserFilter::default(), PageRequest::new(None, Some(50)))
        .await
        .unwrap();
    assert_eq!(total, 5);

    let first = &users[0];
    assert!(verify_password("123456", &first.password_hash).unwrap());
    for user in &users {
        assert!(!user.is_active);
        assert!(user.email.ends_with("@example.com"));
        assert!(user.name.is_some());
        assert_eq!(user.password_hash, first.password_hash);
        assert_eq!(user.code_id, first.code_id);
        assert_eq!(user.code_expired, first.code_expired);
    }
    assert!(app.mailer.sent().await.is_empty());
}
