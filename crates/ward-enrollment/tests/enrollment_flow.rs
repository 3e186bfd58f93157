//! Enrollment and revocation flows over the in-memory store: idempotent
//! secret issuance, confirm/retry, expiry, and the policy gate on
//! disable/delete.

use assert_matches::assert_matches;
use std::sync::Arc;
use ward_core::effects::NotificationKind;
use ward_core::{
    CountBasis, EnrollmentConfig, PolicyConfig, SessionId, TotpConfig, WardError,
};
use ward_effects::MemoryStore;
use ward_enrollment::{ConfirmOutcome, FactorEnrollmentSession};
use ward_factors::{totp, FactorKind, IdentityStore};
use ward_testkit::{identity_with_factors, ManualClock, RecordingNotifier};

struct Harness {
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    notifier: Arc<RecordingNotifier>,
    session: FactorEnrollmentSession,
}

fn harness_with_policy(policy: PolicyConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at(1_000_000));
    let notifier = Arc::new(RecordingNotifier::new());
    let session = FactorEnrollmentSession::new(
        store.clone(),
        clock.clone(),
        notifier.clone(),
        policy,
        TotpConfig::default(),
        EnrollmentConfig::default(),
    );
    Harness {
        store,
        clock,
        notifier,
        session,
    }
}

fn harness() -> Harness {
    harness_with_policy(PolicyConfig::default())
}

#[tokio::test]
async fn begin_issues_once_per_scope_until_expiry() {
    let h = harness();
    let session_id = SessionId::new();
    let identity = identity_with_factors(&[]);

    let first = h.session.begin(None, session_id, identity.id).await;
    let first_secret = first.secret().base32();
    let first_id = first.id;

    // re-entry returns the same pending candidate, secret unchanged
    let again = h.session.begin(Some(first), session_id, identity.id).await;
    assert_eq!(again.id, first_id);
    assert_eq!(again.secret().base32(), first_secret);

    // a different session never sees that secret
    let other = h.session.begin(None, SessionId::new(), identity.id).await;
    assert_ne!(other.secret().base32(), first_secret);

    // expiry discards the pending candidate and reissues
    h.clock.advance(EnrollmentConfig::default().candidate_ttl_secs);
    let reissued = h.session.begin(Some(again), session_id, identity.id).await;
    assert_ne!(reissued.id, first_id);
    assert_ne!(reissued.secret().base32(), first_secret);
}

#[tokio::test]
async fn reset_always_regenerates_the_secret() {
    let h = harness();
    let session_id = SessionId::new();
    let identity = identity_with_factors(&[]);

    let first = h.session.begin(None, session_id, identity.id).await;
    let reset = h.session.reset(session_id, identity.id).await;
    assert_ne!(first.secret().base32(), reset.secret().base32());
}

#[tokio::test]
async fn wrong_code_allows_retry_and_correct_code_still_commits() {
    let h = harness();
    let identity = identity_with_factors(&[]);
    h.store.insert_identity(&identity).await.unwrap();

    let candidate = h.session.begin(None, SessionId::new(), identity.id).await;
    let candidate_id = candidate.id;

    let code = totp::code_at(candidate.secret(), 1_000_000, &TotpConfig::default());
    // same length, every digit different from the expected code
    let wrong: String = code
        .chars()
        .map(|c| if c == '9' { '0' } else { '9' })
        .collect();

    let outcome = h.session.confirm(candidate, &wrong).await;
    let candidate = match outcome {
        ConfirmOutcome::Retry { candidate, error } => {
            assert_matches!(error, WardError::InvalidCode);
            candidate
        }
        other => panic!("expected retry, got {other:?}"),
    };
    assert_eq!(candidate.id, candidate_id);

    // the factor set is untouched after the failed attempt
    let unchanged = h.store.load_identity(identity.id).await.unwrap();
    assert!(unchanged.factors.is_empty());

    let code = totp::code_at(candidate.secret(), 1_000_000, &TotpConfig::default());
    let outcome = h.session.confirm(candidate, &code).await;
    let factor = match outcome {
        ConfirmOutcome::Committed(factor) => factor,
        other => panic!("expected commit, got {other:?}"),
    };
    assert_eq!(factor.kind, FactorKind::Totp);
    assert_eq!(factor.confirmed_at, Some(1_000_000));

    let updated = h.store.load_identity(identity.id).await.unwrap();
    assert_eq!(updated.factors.enabled_count(), 1);
    assert!(updated.factors.first_of_kind(FactorKind::Totp).is_some());
}

#[tokio::test]
async fn expired_candidate_is_discarded_on_confirm() {
    let h = harness();
    let identity = identity_with_factors(&[]);
    h.store.insert_identity(&identity).await.unwrap();

    let candidate = h.session.begin(None, SessionId::new(), identity.id).await;
    let code = totp::code_at(candidate.secret(), 1_000_000, &TotpConfig::default());

    h.clock.advance(EnrollmentConfig::default().candidate_ttl_secs + 1);
    let outcome = h.session.confirm(candidate, &code).await;
    assert_matches!(
        outcome,
        ConfirmOutcome::Discarded {
            error: WardError::CandidateExpired
        }
    );
}

#[tokio::test]
async fn provisioning_uri_embeds_the_candidate_secret() {
    let h = harness();
    let candidate = h
        .session
        .begin(None, SessionId::new(), identity_with_factors(&[]).id)
        .await;
    let uri = h.session.provisioning_uri(&candidate, "user@example.com");
    assert!(uri.starts_with("otpauth://totp/"));
    assert!(uri.contains(&candidate.secret().base32()));
}

#[tokio::test]
async fn delete_blocked_below_the_minimum_reports_counts() {
    // policy minimum of 3 total factors before removal
    let h = harness();
    let identity = identity_with_factors(&[FactorKind::Phone, FactorKind::Webauthn]);
    h.store.insert_identity(&identity).await.unwrap();
    let phone_id = identity.factors.first_of_kind(FactorKind::Phone).unwrap().id;

    let err = h.session.delete(identity.id, phone_id).await.unwrap_err();
    match err {
        WardError::PolicyViolation {
            violations,
            counts_by_kind,
        } => {
            assert_eq!(counts_by_kind.get("phone"), Some(&1));
            assert_eq!(counts_by_kind.get("webauthn"), Some(&1));
            assert_eq!(
                violations.get("identity"),
                Some(&vec!["must have 3 or more enabled factors".to_string()])
            );
        }
        other => panic!("expected policy violation, got {other:?}"),
    }

    // no mutation took place
    let unchanged = h.store.load_identity(identity.id).await.unwrap();
    assert_eq!(unchanged.factors.enabled_count(), 2);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn delete_allowed_when_the_minimum_is_satisfied() {
    let h = harness_with_policy(PolicyConfig {
        min_factor_count: 2,
        count_basis: CountBasis::BeforeMutation,
    });
    let identity = identity_with_factors(&[FactorKind::Phone, FactorKind::PivCac]);
    h.store.insert_identity(&identity).await.unwrap();
    let phone_id = identity.factors.first_of_kind(FactorKind::Phone).unwrap().id;

    let decision = h.session.delete(identity.id, phone_id).await.unwrap();
    assert!(decision.allowed);

    let updated = h.store.load_identity(identity.id).await.unwrap();
    let kinds: Vec<_> = updated.factors.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FactorKind::PivCac]);

    let sent = h.notifier.sent_of_kind(NotificationKind::FactorRevoked);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.payload["kind"], "phone");
}

#[tokio::test]
async fn disable_keeps_the_configuration_but_stops_counting_it() {
    let h = harness_with_policy(PolicyConfig {
        min_factor_count: 2,
        count_basis: CountBasis::BeforeMutation,
    });
    let identity = identity_with_factors(&[FactorKind::Totp, FactorKind::Webauthn]);
    h.store.insert_identity(&identity).await.unwrap();
    let totp_id = identity.factors.first_of_kind(FactorKind::Totp).unwrap().id;

    h.session.disable(identity.id, totp_id).await.unwrap();

    let updated = h.store.load_identity(identity.id).await.unwrap();
    assert_eq!(updated.factors.len(), 2);
    assert_eq!(updated.factors.enabled_count(), 1);
    assert!(!updated.factors.by_id(totp_id).unwrap().enabled);
}

#[tokio::test]
async fn revoking_an_unknown_factor_is_not_found() {
    let h = harness();
    let identity = identity_with_factors(&[FactorKind::Phone]);
    h.store.insert_identity(&identity).await.unwrap();

    let err = h
        .session
        .disable(identity.id, ward_core::FactorId::new())
        .await
        .unwrap_err();
    assert_matches!(err, WardError::NotFound { .. });
}

#[tokio::test]
async fn after_mutation_basis_enforces_the_same_rule_one_lower() {
    let h = harness_with_policy(PolicyConfig {
        min_factor_count: 2,
        count_basis: CountBasis::AfterMutation,
    });
    let identity = identity_with_factors(&[FactorKind::Phone, FactorKind::Webauthn]);
    h.store.insert_identity(&identity).await.unwrap();
    let phone_id = identity.factors.first_of_kind(FactorKind::Phone).unwrap().id;

    // removal would leave 1 enabled factor, below the post-mutation minimum
    let err = h.session.delete(identity.id, phone_id).await.unwrap_err();
    assert_matches!(err, WardError::PolicyViolation { .. });
}
