//! Integration tests for the reconciliation service
//!
//! Drives `ReconcileService` against in-memory directory mocks, covering
//! the two-phase replace, the payload fallback, and every precondition
//! failure path.

mod support;

use std::sync::Arc;

use provisor_core::{ReconcileRequest, ReconcileService};
use provisor_domain::{
    BundleIdPlatform, CertificateType, DeviceStatus, ProfileType, ProvisorError, SigningMode,
};
use support::directory::{
    bundle_id_fixture, certificate_fixture, device_fixture, profile_fixture, MockBundleIdDirectory,
    MockCertificateDirectory, MockDeviceDirectory, MockProfileDirectory, StubInspector,
    PAYLOAD_FIXTURE,
};

struct Harness {
    profiles: Arc<MockProfileDirectory>,
    inspector: Arc<StubInspector>,
    service: ReconcileService,
}

fn harness(profiles: MockProfileDirectory) -> Harness {
    harness_with(
        profiles,
        MockCertificateDirectory::new(standard_certificates()),
        standard_bundle_ids(),
    )
}

fn harness_with(
    profiles: MockProfileDirectory,
    certificates: MockCertificateDirectory,
    bundle_ids: Vec<provisor_domain::BundleId>,
) -> Harness {
    let profiles = Arc::new(profiles);
    let inspector = Arc::new(StubInspector::new("com.example.app"));

    let service = ReconcileService::new(
        profiles.clone(),
        Arc::new(MockDeviceDirectory::new(standard_devices())),
        Arc::new(certificates),
        Arc::new(MockBundleIdDirectory::new(bundle_ids)),
        inspector.clone(),
    );

    Harness { profiles, inspector, service }
}

fn standard_devices() -> Vec<provisor_domain::Device> {
    vec![
        device_fixture("dev-1", DeviceStatus::Enabled, BundleIdPlatform::Ios),
        device_fixture("dev-2", DeviceStatus::Enabled, BundleIdPlatform::Ios),
        device_fixture("dev-3", DeviceStatus::Disabled, BundleIdPlatform::Ios),
        device_fixture("dev-4", DeviceStatus::Enabled, BundleIdPlatform::MacOs),
    ]
}

fn standard_certificates() -> Vec<provisor_domain::Certificate> {
    vec![
        certificate_fixture("cert-dev", CertificateType::Development, None),
        certificate_fixture(
            "cert-ios-dev",
            CertificateType::IosDevelopment,
            Some(BundleIdPlatform::Ios),
        ),
        certificate_fixture("cert-dist", CertificateType::Distribution, None),
        certificate_fixture(
            "cert-mac-dev",
            CertificateType::Development,
            Some(BundleIdPlatform::MacOs),
        ),
    ]
}

fn standard_bundle_ids() -> Vec<provisor_domain::BundleId> {
    vec![
        bundle_id_fixture("bundle-1", "com.example.app"),
        bundle_id_fixture("bundle-2", "com.example.other"),
    ]
}

/// A first-time reconcile creates the profile with the eligible membership
/// and deletes nothing.
#[tokio::test]
async fn fresh_profile_gets_filtered_membership() {
    let h = harness(MockProfileDirectory::new(Vec::new()));

    let report = h
        .service
        .reconcile(
            ReconcileRequest::new("CI Signing", SigningMode::Development)
                .with_bundle_id("com.example.app"),
        )
        .await
        .unwrap();

    assert!(report.replaced_profile_id.is_none());
    assert_eq!(report.profile.attributes.name, "CI Signing");
    assert!(h.profiles.deleted().is_empty());

    let created = h.profiles.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].bundle_id, "bundle-1");
    assert_eq!(created[0].profile_type, ProfileType::IosAppDevelopment);
    assert_eq!(created[0].device_ids, vec!["dev-1", "dev-2"]);
    assert_eq!(created[0].certificate_ids, vec!["cert-dev", "cert-ios-dev"]);
}

/// Distribution mode swaps both the certificate set and the profile type.
#[tokio::test]
async fn distribution_mode_selects_distribution_membership() {
    let h = harness(MockProfileDirectory::new(Vec::new()));

    h.service
        .reconcile(
            ReconcileRequest::new("Store Signing", SigningMode::Distribution)
                .with_bundle_id("com.example.app"),
        )
        .await
        .unwrap();

    let created = h.profiles.created();
    assert_eq!(created[0].profile_type, ProfileType::IosAppStore);
    assert_eq!(created[0].certificate_ids, vec!["cert-dist"]);
}

/// Reconciling the same name twice deletes exactly the profile created by
/// the first run, and both runs request identical membership.
#[tokio::test]
async fn second_run_replaces_the_first_profile() {
    let h = harness(MockProfileDirectory::new(Vec::new()));
    let request = ReconcileRequest::new("CI Signing", SigningMode::Development)
        .with_bundle_id("com.example.app");

    let first = h.service.reconcile(request.clone()).await.unwrap();
    let second = h.service.reconcile(request).await.unwrap();

    let first_id = first.profile.id.clone();
    assert_eq!(h.profiles.deleted(), vec![first_id.clone()]);
    assert_eq!(second.replaced_profile_id, Some(first_id.clone()));
    assert_ne!(second.profile.id, first_id);

    let created = h.profiles.created();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].device_ids, created[1].device_ids);
    assert_eq!(created[0].certificate_ids, created[1].certificate_ids);

    // The cache holds exactly one profile under the name afterwards.
    let cached = h.profiles.cached();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].attributes.name, "CI Signing");
    assert_eq!(cached[0].id, second.profile.id);
}

/// Without a hint the bundle identifier is recovered from the stored
/// payload through the inspector.
#[tokio::test]
async fn payload_fallback_resolves_the_bundle_id() {
    let h = harness(MockProfileDirectory::new(vec![profile_fixture("prof-old", "CI Signing")]));

    let report = h
        .service
        .reconcile(ReconcileRequest::new("CI Signing", SigningMode::Development))
        .await
        .unwrap();

    // The inspector saw the base64-decoded payload bytes.
    assert_eq!(h.inspector.seen(), vec![PAYLOAD_FIXTURE.to_vec()]);
    assert_eq!(h.profiles.created()[0].bundle_id, "bundle-1");
    assert_eq!(report.replaced_profile_id.as_deref(), Some("prof-old"));
}

/// An explicit hint wins over the stored payload; the inspector is never
/// consulted.
#[tokio::test]
async fn hint_bypasses_the_inspector() {
    let h = harness(MockProfileDirectory::new(vec![profile_fixture("prof-old", "CI Signing")]));

    h.service
        .reconcile(
            ReconcileRequest::new("CI Signing", SigningMode::Development)
                .with_bundle_id("com.example.other"),
        )
        .await
        .unwrap();

    assert!(h.inspector.seen().is_empty());
    assert_eq!(h.profiles.created()[0].bundle_id, "bundle-2");
}

/// A missing profile without a hint fails before any mutating call.
#[tokio::test]
async fn missing_profile_without_hint_fails_cleanly() {
    let h = harness(MockProfileDirectory::new(Vec::new()));

    let err = h
        .service
        .reconcile(ReconcileRequest::new("CI Signing", SigningMode::Development))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisorError::Reconcile(_)));
    assert!(err.to_string().contains("no bundle identifier"));
    assert!(h.profiles.deleted().is_empty());
    assert!(h.profiles.created().is_empty());
}

/// An unregistered bundle identifier fails before the delete phase.
#[tokio::test]
async fn unregistered_bundle_id_leaves_the_old_profile() {
    let h = harness_with(
        MockProfileDirectory::new(vec![profile_fixture("prof-old", "CI Signing")]),
        MockCertificateDirectory::new(standard_certificates()),
        Vec::new(),
    );

    let err = h
        .service
        .reconcile(
            ReconcileRequest::new("CI Signing", SigningMode::Development)
                .with_bundle_id("com.example.app"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisorError::Reconcile(_)));
    assert!(h.profiles.deleted().is_empty());
}

/// A directory failure while gathering membership happens before the
/// delete, so the old profile survives.
#[tokio::test]
async fn gather_failure_precedes_the_delete() {
    let h = harness_with(
        MockProfileDirectory::new(vec![profile_fixture("prof-old", "CI Signing")]),
        MockCertificateDirectory::failing(),
        standard_bundle_ids(),
    );

    let err = h
        .service
        .reconcile(
            ReconcileRequest::new("CI Signing", SigningMode::Development)
                .with_bundle_id("com.example.app"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisorError::Transport(_)));
    assert!(h.profiles.deleted().is_empty());
    assert!(h.profiles.created().is_empty());
}

/// A create failure after the delete propagates unchanged; the delete is
/// not rolled back and the stale cache entry survives until a later run.
#[tokio::test]
async fn create_failure_after_delete_propagates() {
    let profiles = MockProfileDirectory::new(vec![profile_fixture("prof-old", "CI Signing")]);
    profiles.fail_next_create();
    let h = harness(profiles);

    let err = h
        .service
        .reconcile(
            ReconcileRequest::new("CI Signing", SigningMode::Development)
                .with_bundle_id("com.example.app"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisorError::Api { status: 409, .. }));
    assert_eq!(h.profiles.deleted(), vec!["prof-old"]);

    // replace_cached_profile never ran, so the cached list still shows the
    // deleted profile.
    assert_eq!(h.profiles.cached().len(), 1);
    assert_eq!(h.profiles.cached()[0].id, "prof-old");
}
