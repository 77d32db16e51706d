//! Mock directory implementations for testing
//!
//! In-memory mocks for the provisioning ports, enabling deterministic
//! reconciliation tests without any network dependency. The profile mock
//! mirrors the real repository's cache semantics: `delete_profile` only
//! records the call, `replace_cached_profile` performs the swap.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use chrono::{TimeZone, Utc};

use provisor_core::provisioning::ports::{
    BundleIdDirectory, CertificateDirectory, DeviceDirectory, PayloadSummary, ProfileDirectory,
    ProfilePayloadInspector,
};
use provisor_domain::{
    ApiErrorDetail, BundleId, BundleIdAttributes, BundleIdPlatform, Certificate,
    CertificateAttributes, CertificateType, Device, DeviceAttributes, DeviceStatus, NewProfile,
    Profile, ProfileAttributes, ProfileState, ProfileType, ProvisorError, Result,
};

/// Payload bytes embedded in every profile fixture (pre base64).
pub const PAYLOAD_FIXTURE: &[u8] = b"provision-payload-fixture";

pub fn device_fixture(id: &str, status: DeviceStatus, platform: BundleIdPlatform) -> Device {
    Device {
        id: id.to_string(),
        attributes: DeviceAttributes {
            name: format!("device {id}"),
            udid: format!("00008110-{id:0>16}"),
            status,
            platform,
            model: None,
            device_class: None,
            added_date: None,
        },
    }
}

pub fn certificate_fixture(
    id: &str,
    certificate_type: CertificateType,
    platform: Option<BundleIdPlatform>,
) -> Certificate {
    Certificate {
        id: id.to_string(),
        attributes: CertificateAttributes {
            name: format!("cert {id}"),
            display_name: format!("Cert {id}"),
            certificate_type,
            expiration_date: Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap(),
            platform,
            serial_number: None,
        },
    }
}

pub fn bundle_id_fixture(id: &str, identifier: &str) -> BundleId {
    BundleId {
        id: id.to_string(),
        attributes: BundleIdAttributes {
            identifier: identifier.to_string(),
            name: format!("bundle {id}"),
            platform: BundleIdPlatform::Ios,
            seed_id: None,
        },
    }
}

pub fn profile_fixture(id: &str, name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        attributes: ProfileAttributes {
            name: name.to_string(),
            uuid: format!("uuid-{id}"),
            profile_content: BASE64_STANDARD.encode(PAYLOAD_FIXTURE),
            profile_type: ProfileType::IosAppDevelopment,
            created_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            expiration_date: Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap(),
            profile_state: Some(ProfileState::Active),
            platform: Some(BundleIdPlatform::Ios),
        },
    }
}

fn created_profile(id: &str, new: &NewProfile) -> Profile {
    let mut profile = profile_fixture(id, &new.name);
    profile.attributes.profile_type = new.profile_type;
    profile
}

/// In-memory mock for `ProfileDirectory`.
///
/// Records every delete and create so tests can assert on the mutation
/// sequence. Creation can be armed to fail once, mimicking a server
/// rejection between the delete and create phases.
#[derive(Default)]
pub struct MockProfileDirectory {
    profiles: Mutex<Vec<Profile>>,
    deleted_ids: Mutex<Vec<String>>,
    created_requests: Mutex<Vec<NewProfile>>,
    next_id: AtomicUsize,
    fail_next_create: AtomicBool,
}

impl MockProfileDirectory {
    /// Create a mock seeded with the provided profiles.
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            deleted_ids: Mutex::new(Vec::new()),
            created_requests: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            fail_next_create: AtomicBool::new(false),
        }
    }

    /// Arm the next `create_profile` call to fail with a structured error.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted_ids.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewProfile> {
        self.created_requests.lock().unwrap().clone()
    }

    pub fn cached(&self) -> Vec<Profile> {
        self.profiles.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileDirectory for MockProfileDirectory {
    async fn profiles(&self) -> Result<Vec<Profile>> {
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn create_profile(&self, new: NewProfile) -> Result<Profile> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(ProvisorError::Api {
                status: 409,
                errors: vec![ApiErrorDetail {
                    id: None,
                    status: "409".to_string(),
                    code: "ENTITY_ERROR.RELATIONSHIP.INVALID".to_string(),
                    title: None,
                    detail: Some("create rejected".to_string()),
                }],
            });
        }

        let seq = self.next_id.fetch_add(1, Ordering::SeqCst);
        let profile = created_profile(&format!("prof-{seq}"), &new);
        self.created_requests.lock().unwrap().push(new);
        Ok(profile)
    }

    async fn delete_profile(&self, id: &str) -> Result<()> {
        self.deleted_ids.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn replace_cached_profile(&self, stale_name: &str, replacement: Profile) {
        let mut profiles = self.profiles.lock().unwrap();
        profiles.retain(|profile| profile.attributes.name != stale_name);
        profiles.push(replacement);
    }
}

/// In-memory mock for `DeviceDirectory`.
#[derive(Default)]
pub struct MockDeviceDirectory {
    devices: Vec<Device>,
}

impl MockDeviceDirectory {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl DeviceDirectory for MockDeviceDirectory {
    async fn devices(&self) -> Result<Vec<Device>> {
        Ok(self.devices.clone())
    }
}

/// In-memory mock for `CertificateDirectory` with an optional failure mode.
#[derive(Default)]
pub struct MockCertificateDirectory {
    certificates: Vec<Certificate>,
    fail: bool,
}

impl MockCertificateDirectory {
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self { certificates, fail: false }
    }

    /// A directory whose list call always fails with a transport error.
    pub fn failing() -> Self {
        Self { certificates: Vec::new(), fail: true }
    }
}

#[async_trait]
impl CertificateDirectory for MockCertificateDirectory {
    async fn certificates(&self) -> Result<Vec<Certificate>> {
        if self.fail {
            return Err(ProvisorError::Transport("certificate list unavailable".to_string()));
        }
        Ok(self.certificates.clone())
    }
}

/// In-memory mock for `BundleIdDirectory`.
#[derive(Default)]
pub struct MockBundleIdDirectory {
    bundle_ids: Vec<BundleId>,
}

impl MockBundleIdDirectory {
    pub fn new(bundle_ids: Vec<BundleId>) -> Self {
        Self { bundle_ids }
    }
}

#[async_trait]
impl BundleIdDirectory for MockBundleIdDirectory {
    async fn bundle_ids(&self) -> Result<Vec<BundleId>> {
        Ok(self.bundle_ids.clone())
    }
}

/// Stub inspector returning a fixed identifier, recording what it saw.
pub struct StubInspector {
    app_id: String,
    seen: Mutex<Vec<Vec<u8>>>,
}

impl StubInspector {
    pub fn new(app_id: &str) -> Self {
        Self { app_id: app_id.to_string(), seen: Mutex::new(Vec::new()) }
    }

    /// Payloads handed to `inspect`, in call order.
    pub fn seen(&self) -> Vec<Vec<u8>> {
        self.seen.lock().unwrap().clone()
    }
}

impl ProfilePayloadInspector for StubInspector {
    fn inspect(&self, payload: &[u8]) -> Result<PayloadSummary> {
        self.seen.lock().unwrap().push(payload.to_vec());
        Ok(PayloadSummary {
            app_id: self.app_id.clone(),
            expiration_date: None,
            entitlements: BTreeMap::new(),
        })
    }
}
