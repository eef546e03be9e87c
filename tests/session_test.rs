mod common;

use common::{
    DEVICE_TOKEN, DeviceOutcome, RecordingPresenter, USER_ID, VALID_TOKEN, bundle, harness,
    logged_in,
};
use tidal_mcp::{error::ToolError, management::LoginOutcome, types::CredentialBundle};

#[tokio::test]
async fn test_store_round_trip_uses_data_wrapping() {
    let h = harness();
    let original = bundle(VALID_TOKEN, Some("refresh-token"));

    h.store.save(&original).await.unwrap();
    assert!(h.store.exists());

    let raw = std::fs::read_to_string(h.store.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["access_token"]["data"], VALID_TOKEN);
    assert_eq!(json["refresh_token"]["data"], "refresh-token");
    assert_eq!(json["token_type"]["data"], "Bearer");
    assert_eq!(json["is_pkce"]["data"], false);

    assert_eq!(h.store.load().await, Some(original));
}

#[tokio::test]
async fn test_store_reads_file_written_elsewhere() {
    let h = harness();
    std::fs::create_dir_all(h.store.path().parent().unwrap()).unwrap();
    std::fs::write(
        h.store.path(),
        r#"{
            "token_type": {"data": "Bearer"},
            "session_id": {"data": "abc"},
            "access_token": {"data": "token"},
            "refresh_token": {"data": null},
            "is_pkce": {"data": true}
        }"#,
    )
    .unwrap();

    let loaded: CredentialBundle = h.store.load().await.unwrap();
    assert_eq!(loaded.session_id, "abc");
    assert_eq!(loaded.refresh_token, None);
    assert!(loaded.is_pkce);
    assert_eq!(loaded.authorization(), "Bearer token");
}

#[tokio::test]
async fn test_malformed_session_file_is_discarded() {
    let h = harness();
    std::fs::create_dir_all(h.store.path().parent().unwrap()).unwrap();
    std::fs::write(h.store.path(), "{ not json").unwrap();

    assert_eq!(h.store.load().await, None);
    assert!(!h.store.exists());
}

#[tokio::test]
async fn test_read_reports_malformed_file_without_deleting_it() {
    let h = harness();
    std::fs::create_dir_all(h.store.path().parent().unwrap()).unwrap();
    std::fs::write(h.store.path(), "{ not json").unwrap();

    let err = h.store.read().await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(h.store.exists());

    // A missing file is not an error
    h.store.clear().await;
    assert_eq!(h.store.read().await.unwrap(), None);
}

#[tokio::test]
async fn test_clear_without_file_is_a_no_op() {
    let h = harness();
    h.store.clear().await;
    assert!(!h.store.exists());
}

#[tokio::test]
async fn test_missing_session_requires_auth_without_remote_calls() {
    let h = harness();

    let err = h.sessions.ensure().await.unwrap_err();
    assert!(matches!(err, ToolError::AuthenticationRequired));
    assert!(h.fake.calls().is_empty());
}

#[tokio::test]
async fn test_valid_session_yields_scoped_credentials() {
    let h = logged_in().await;

    let auth = h.sessions.ensure().await.unwrap();
    assert_eq!(auth.authorization, format!("Bearer {VALID_TOKEN}"));
    assert_eq!(auth.user_id, USER_ID);
    assert_eq!(auth.country_code, "US");
}

#[tokio::test]
async fn test_session_is_revalidated_on_every_call() {
    let h = logged_in().await;

    h.sessions.ensure().await.unwrap();
    h.sessions.ensure().await.unwrap();
    let checks = h
        .fake
        .calls()
        .iter()
        .filter(|c| *c == "check_session")
        .count();
    assert_eq!(checks, 2);
}

#[tokio::test]
async fn test_rejected_session_without_refresh_token_is_cleared() {
    let h = harness();
    h.store.save(&bundle("stale", None)).await.unwrap();

    let err = h.sessions.ensure().await.unwrap_err();
    assert!(matches!(err, ToolError::AuthenticationRequired));
    assert!(!h.store.exists());
    // No refresh attempt without a refresh token
    assert_eq!(h.fake.calls(), vec!["check_session"]);

    // Nothing left to check afterwards
    let err = h.sessions.ensure().await.unwrap_err();
    assert!(matches!(err, ToolError::AuthenticationRequired));
    assert_eq!(h.fake.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_refresh_clears_session() {
    let h = harness();
    h.store.save(&bundle("stale", Some("old-refresh"))).await.unwrap();

    let err = h.sessions.ensure().await.unwrap_err();
    assert!(matches!(err, ToolError::AuthenticationRequired));
    assert_eq!(h.fake.calls(), vec!["check_session", "refresh"]);
    assert!(!h.store.exists());
}

#[tokio::test]
async fn test_rejected_session_is_refreshed_and_persisted() {
    let h = harness();
    h.store.save(&bundle("stale", Some("old-refresh"))).await.unwrap();
    h.fake.grant_refresh("fresh-token");

    let auth = h.sessions.ensure().await.unwrap();
    assert_eq!(auth.authorization, "Bearer fresh-token");

    let stored = h.store.load().await.unwrap();
    assert_eq!(stored.access_token, "fresh-token");
    assert_eq!(stored.session_id, "session-1");

    // The refreshed bundle is now the held one
    h.sessions.ensure().await.unwrap();
    assert_eq!(
        h.fake.calls().iter().filter(|c| *c == "refresh").count(),
        1
    );
}

#[tokio::test]
async fn test_session_written_by_auth_command_is_adopted() {
    let h = harness();
    h.fake.accept_token("old-token");
    h.store.save(&bundle("old-token", None)).await.unwrap();
    h.sessions.ensure().await.unwrap();

    // The held session expires while `tidal-mcp auth` stores a new one
    h.fake.revoke_token("old-token");
    let written = bundle(VALID_TOKEN, Some("refresh-token"));
    h.store.save(&written).await.unwrap();

    let auth = h.sessions.ensure().await.unwrap();
    assert_eq!(auth.authorization, format!("Bearer {VALID_TOKEN}"));
    assert_eq!(h.store.load().await, Some(written));
    assert!(!h.fake.calls().contains(&"refresh".to_string()));

    // The adopted bundle is now the held one
    h.sessions.ensure().await.unwrap();
}

#[tokio::test]
async fn test_rejected_session_file_replaced_by_another_rejected_one_is_kept() {
    let h = harness();
    h.fake.accept_token("old-token");
    h.store.save(&bundle("old-token", None)).await.unwrap();
    h.sessions.ensure().await.unwrap();

    h.fake.revoke_token("old-token");
    let other = bundle("other-token", None);
    h.store.save(&other).await.unwrap();

    let err = h.sessions.ensure().await.unwrap_err();
    assert!(matches!(err, ToolError::AuthenticationRequired));
    // Only the bundle this process held is discarded
    assert_eq!(h.store.load().await, Some(other));
}

#[tokio::test]
async fn test_inspect_leaves_rejected_session_in_place() {
    let h = harness();
    h.store.save(&bundle("stale", None)).await.unwrap();

    assert_eq!(h.sessions.inspect().await, None);
    assert!(h.store.exists());
}

#[tokio::test]
async fn test_login_with_valid_session_skips_device_flow() {
    let h = logged_in().await;
    let presenter = RecordingPresenter::default();

    let outcome = h.sessions.login(&presenter).await.unwrap();
    assert_eq!(outcome, LoginOutcome::AlreadyAuthenticated);
    assert_eq!(h.fake.device_authorizations(), 0);
    assert!(presenter.links().is_empty());
}

#[tokio::test]
async fn test_device_login_persists_session() {
    let h = harness();
    h.fake.set_device_outcome(DeviceOutcome::Grant);
    let presenter = RecordingPresenter::default();

    let outcome = h.sessions.login(&presenter).await.unwrap();
    assert_eq!(outcome, LoginOutcome::Authenticated);

    let links = presenter.links();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url, "https://link.tidal.com/ABCDE");
    assert_eq!(links[0].user_code, "ABCDE");

    let stored = h.store.load().await.unwrap();
    assert_eq!(stored.access_token, DEVICE_TOKEN);
    assert_eq!(stored.refresh_token.as_deref(), Some("device-refresh-token"));
    assert!(!stored.is_pkce);

    // Subsequent operations reuse the new session
    let auth = h.sessions.ensure().await.unwrap();
    assert_eq!(auth.authorization, format!("Bearer {DEVICE_TOKEN}"));
}

#[tokio::test]
async fn test_concurrent_logins_share_one_device_flow() {
    let h = harness();
    h.fake.set_device_outcome(DeviceOutcome::Grant);
    let presenter = RecordingPresenter::default();

    let (first, second) = tokio::join!(
        h.sessions.login(&presenter),
        h.sessions.login(&presenter)
    );

    let mut outcomes = vec![first.unwrap(), second.unwrap()];
    outcomes.sort_by_key(|o| *o == LoginOutcome::Authenticated);
    assert_eq!(
        outcomes,
        vec![LoginOutcome::AlreadyAuthenticated, LoginOutcome::Authenticated]
    );
    assert_eq!(h.fake.device_authorizations(), 1);
    assert_eq!(presenter.links().len(), 1);
}

#[tokio::test]
async fn test_expired_device_link_points_to_helper_command() {
    let h = harness();
    h.fake.set_device_outcome(DeviceOutcome::Expire);
    let presenter = RecordingPresenter::default();

    let err = h.sessions.login(&presenter).await.unwrap_err();
    match err {
        ToolError::AuthenticationFailed(message) => {
            assert!(message.contains("timed out"));
            assert!(message.contains("tidal-mcp auth"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!h.store.exists());
}

#[tokio::test]
async fn test_establish_rejects_unusable_bundle() {
    let h = harness();

    let err = h
        .sessions
        .establish(bundle("never-issued", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::AuthenticationFailed(_)));
    assert!(!h.store.exists());
}

#[tokio::test]
async fn test_facade_login_reports_status() {
    let h = harness();
    h.fake.set_device_outcome(DeviceOutcome::Grant);
    let presenter = RecordingPresenter::default();

    let result = h.service.login(&presenter).await.unwrap();
    assert!(result.authenticated);
    assert_eq!(result.status, "success");
    assert_eq!(result.message, "Successfully authenticated with TIDAL");

    let again = h.service.login(&presenter).await.unwrap();
    assert_eq!(again.message, "Already authenticated with TIDAL");
}
