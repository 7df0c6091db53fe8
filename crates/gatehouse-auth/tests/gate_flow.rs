//! End-to-end behaviour of the authentication gate against in-memory
//! collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use gatehouse_auth::{
    Argon2Hasher, AuthError, AuthenticationGate, Credentials, InMemoryCredentialStore,
};
use gatehouse_core::config::AppConfig;
use gatehouse_core::events::{EventPublisher, SessionEvent};
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::{CredentialStore, ManualClock};
use gatehouse_core::types::Principal;

struct TestGate {
    gate: AuthenticationGate,
    clock: ManualClock,
    events: EventPublisher,
}

/// Store that suspends on every lookup, so concurrent requests interleave
/// between token validation and session admission.
#[derive(Debug)]
struct YieldingStore(InMemoryCredentialStore);

#[async_trait]
impl CredentialStore for YieldingStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Principal>> {
        tokio::task::yield_now().await;
        self.0.find_by_username(username).await
    }
}

fn gate() -> TestGate {
    build_gate(|store| Arc::new(store) as Arc<dyn CredentialStore>)
}

fn build_gate(
    wrap: impl FnOnce(InMemoryCredentialStore) -> Arc<dyn CredentialStore>,
) -> TestGate {
    let hasher = Argon2Hasher::with_params(8, 1, 1).expect("params");
    let store = InMemoryCredentialStore::new();
    for (name, password) in [("alice", "correct-pw"), ("bob", "bob-pw")] {
        store.insert(Principal::new(
            name,
            hasher.hash_password(password).expect("hash"),
            ["USER"],
        ));
    }

    let clock = ManualClock::default();
    let events = EventPublisher::new();
    let gate = AuthenticationGate::from_config(
        &AppConfig::default(),
        wrap(store),
        Arc::new(hasher),
        Arc::new(clock.clone()),
        events.clone(),
    )
    .expect("gate");

    TestGate {
        gate,
        clock,
        events,
    }
}

#[tokio::test]
async fn test_second_login_evicts_first_session() {
    let t = gate();

    let a = t.gate.login("alice", "correct-pw", false).await.unwrap();
    let b = t.gate.login("alice", "correct-pw", false).await.unwrap();

    assert!(t.gate.registry().lookup(&a.session.id).is_none());
    let live = t.gate.registry().lookup(&b.session.id).expect("B is live");
    assert_eq!(live.principal, "alice");
    assert_eq!(b.evicted.len(), 1);
    assert_eq!(b.evicted[0].id, a.session.id);
}

#[tokio::test]
async fn test_at_most_one_session_per_principal_after_many_logins() {
    let t = gate();

    for i in 0..10 {
        let user = if i % 3 == 0 { "bob" } else { "alice" };
        let password = if user == "bob" { "bob-pw" } else { "correct-pw" };
        t.gate.login(user, password, i % 2 == 0).await.unwrap();

        assert!(t.gate.registry().sessions_for("alice").len() <= 1);
        assert!(t.gate.registry().sessions_for("bob").len() <= 1);
    }
    assert_eq!(t.gate.registry().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_keep_single_session() {
    let t = gate();
    let gate = Arc::new(t.gate);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.login("alice", "correct-pw", false).await })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        winners.push(handle.await.unwrap().unwrap().session.id);
    }

    let live = gate.registry().sessions_for("alice");
    assert_eq!(live.len(), 1);
    assert!(winners.contains(&live[0].id));
    assert_eq!(gate.registry().len(), 1);
}

#[tokio::test]
async fn test_credential_failures_are_indistinguishable() {
    let t = gate();

    let wrong_password = t.gate.login("alice", "nope", false).await.unwrap_err();
    let no_such_user = t.gate.login("nobody", "nope", false).await.unwrap_err();

    assert_eq!(wrong_password, AuthError::BadCredential);
    assert_eq!(wrong_password, no_such_user);
    assert_eq!(format!("{wrong_password}"), format!("{no_such_user}"));
}

#[tokio::test]
async fn test_remember_me_expires_after_21_days() {
    let t = gate();
    let token = t
        .gate
        .login("alice", "correct-pw", true)
        .await
        .unwrap()
        .remember_me
        .expect("token issued");
    assert_eq!(token.expires_at - token.issued_at, Duration::days(21));

    t.clock.advance(Duration::days(21) + Duration::milliseconds(1));

    let credentials = Credentials {
        remember_me: Some(token.value.clone()),
        ..Credentials::default()
    };
    assert_eq!(
        t.gate.authenticate(&credentials).await.unwrap_err(),
        AuthError::TokenExpired
    );
}

#[tokio::test]
async fn test_revoked_token_is_unknown_before_expiry() {
    let t = gate();
    let token = t
        .gate
        .login("alice", "correct-pw", true)
        .await
        .unwrap()
        .remember_me
        .expect("token issued");

    assert!(t.gate.remember_me().revoke(&token.value));
    assert_eq!(
        t.gate.remember_me().validate(&token.value),
        Err(AuthError::TokenUnknown)
    );
}

#[tokio::test]
async fn test_logout_twice_is_harmless() {
    let t = gate();
    let login = t.gate.login("alice", "correct-pw", false).await.unwrap();
    let other = t.gate.login("bob", "bob-pw", false).await.unwrap();

    t.gate.logout(Some(&login.session.id), None);
    let after_first = t.gate.registry().len();
    t.gate.logout(Some(&login.session.id), None);

    assert_eq!(t.gate.registry().len(), after_first);
    assert!(t.gate.registry().lookup(&other.session.id).is_some());
}

#[tokio::test]
async fn test_remember_me_token_mints_at_most_one_session() {
    let t = gate();
    let token = t
        .gate
        .login("alice", "correct-pw", true)
        .await
        .unwrap()
        .remember_me
        .expect("token issued");
    let credentials = Credentials {
        remember_me: Some(token.value.clone()),
        ..Credentials::default()
    };

    let first = t.gate.authenticate(&credentials).await.unwrap();
    assert!(first.session.is_some());

    assert_eq!(
        t.gate.authenticate(&credentials).await.unwrap_err(),
        AuthError::TokenUnknown
    );
    // Replaying the old secret revoked the lineage; the admitted session remains.
    assert!(t.gate.remember_me().is_empty());
    assert_eq!(t.gate.registry().sessions_for("alice").len(), 1);
}

#[tokio::test]
async fn test_concurrent_remember_me_restore_leaves_winner_live() {
    let t = build_gate(|store| Arc::new(YieldingStore(store)) as Arc<dyn CredentialStore>);
    let token = t
        .gate
        .login("alice", "correct-pw", true)
        .await
        .unwrap()
        .remember_me
        .expect("token issued");
    let credentials = Credentials {
        remember_me: Some(token.value.clone()),
        ..Credentials::default()
    };

    let (a, b) = tokio::join!(
        t.gate.authenticate(&credentials),
        t.gate.authenticate(&credentials)
    );

    let outcomes = [a, b];
    let winners: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(outcomes.iter().any(|r| r.as_ref().err() == Some(&AuthError::TokenUnknown)));

    let session = winners[0].session.as_ref().expect("restored session");
    assert!(t.gate.registry().lookup(&session.id).is_some());
    assert_eq!(t.gate.registry().sessions_for("alice").len(), 1);
}

#[tokio::test]
async fn test_lifecycle_events_are_published() {
    let t = gate();
    let mut rx = t.events.subscribe();

    let a = t.gate.login("alice", "correct-pw", false).await.unwrap();
    let b = t.gate.login("alice", "correct-pw", false).await.unwrap();
    t.gate.logout(Some(&b.session.id), None);

    assert_eq!(
        rx.recv().await.unwrap(),
        SessionEvent::Created {
            session_id: a.session.id,
            principal: "alice".into()
        }
    );
    assert!(matches!(rx.recv().await.unwrap(), SessionEvent::Evicted { .. }));
    assert!(matches!(rx.recv().await.unwrap(), SessionEvent::Created { .. }));
    assert_eq!(
        rx.recv().await.unwrap(),
        SessionEvent::Destroyed {
            session_id: b.session.id,
            principal: "alice".into()
        }
    );
}
