//! Profile reconciliation service - core business logic

use std::sync::Arc;

use tracing::{info, warn};

use provisor_domain::{
    BundleIdPlatform, NewProfile, Profile, ProvisorError, Result, SigningMode,
};

use super::ports::{
    BundleIdDirectory, CertificateDirectory, DeviceDirectory, ProfileDirectory,
    ProfilePayloadInspector,
};
use super::selection::{signing_certificates, valid_devices};

/// What to reconcile
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    /// Profile name to bring up to date
    pub name: String,

    /// Bundle identifier to use when the profile does not exist yet.
    /// When absent and the profile exists, the identifier is recovered
    /// from the stored payload.
    pub bundle_id_hint: Option<String>,

    /// Development or Distribution signing
    pub signing_mode: SigningMode,
}

impl ReconcileRequest {
    /// Request for an existing profile, identifier recovered from payload
    #[must_use]
    pub fn new(name: impl Into<String>, signing_mode: SigningMode) -> Self {
        Self { name: name.into(), bundle_id_hint: None, signing_mode }
    }

    /// Supply the bundle identifier explicitly
    #[must_use]
    pub fn with_bundle_id(mut self, identifier: impl Into<String>) -> Self {
        self.bundle_id_hint = Some(identifier.into());
        self
    }
}

/// Outcome of a reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    /// The freshly created profile
    pub profile: Profile,

    /// Id of the profile that was deleted to make room, if one existed
    pub replaced_profile_id: Option<String>,
}

/// Rebuilds a named profile against the current directory inventory
///
/// The refresh is two-phase: the old profile is deleted first because the
/// server rejects overlapping profiles, then the replacement is created
/// with the full eligible device set and the mode's certificates. A
/// failure between the phases leaves the name absent until the next run;
/// there is no rollback.
pub struct ReconcileService {
    profiles: Arc<dyn ProfileDirectory>,
    devices: Arc<dyn DeviceDirectory>,
    certificates: Arc<dyn CertificateDirectory>,
    bundle_ids: Arc<dyn BundleIdDirectory>,
    inspector: Arc<dyn ProfilePayloadInspector>,
    platform: BundleIdPlatform,
}

impl ReconcileService {
    /// Create a service targeting iOS devices
    pub fn new(
        profiles: Arc<dyn ProfileDirectory>,
        devices: Arc<dyn DeviceDirectory>,
        certificates: Arc<dyn CertificateDirectory>,
        bundle_ids: Arc<dyn BundleIdDirectory>,
        inspector: Arc<dyn ProfilePayloadInspector>,
    ) -> Self {
        Self {
            profiles,
            devices,
            certificates,
            bundle_ids,
            inspector,
            platform: BundleIdPlatform::Ios,
        }
    }

    /// Target a different device platform
    #[must_use]
    pub fn with_platform(mut self, platform: BundleIdPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Bring the named profile up to date with the directory
    ///
    /// Resolves the bundle identifier, gathers the eligible membership,
    /// then deletes the old profile and creates its replacement. All
    /// lookups run before the first mutating call, so precondition
    /// failures never leave the directory changed.
    ///
    /// # Errors
    /// Returns `ProvisorError::Reconcile` when the profile is absent and no
    /// identifier hint was given, or the identifier is not registered.
    /// Directory errors propagate unchanged.
    pub async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileReport> {
        let existing = self
            .profiles
            .profiles()
            .await?
            .into_iter()
            .find(|profile| profile.attributes.name == request.name);

        let identifier = match (&request.bundle_id_hint, &existing) {
            (Some(hint), _) => hint.clone(),
            (None, Some(profile)) => {
                let payload = profile.decoded_payload()?;
                self.inspector.inspect(&payload)?.app_id
            }
            (None, None) => {
                return Err(ProvisorError::Reconcile(format!(
                    "profile '{}' not found and no bundle identifier provided",
                    request.name
                )));
            }
        };

        let bundle_id = self
            .bundle_ids
            .bundle_ids()
            .await?
            .into_iter()
            .find(|bundle_id| bundle_id.attributes.identifier == identifier)
            .ok_or_else(|| {
                ProvisorError::Reconcile(format!("bundle id '{identifier}' is not registered"))
            })?;

        // Membership is gathered before the delete so a directory failure
        // here leaves the old profile untouched.
        let devices = valid_devices(&self.devices.devices().await?, self.platform);
        let certificates = signing_certificates(
            &self.certificates.certificates().await?,
            request.signing_mode,
            self.platform,
        );

        let replaced_profile_id = match &existing {
            Some(profile) => {
                self.profiles.delete_profile(&profile.id).await?;
                warn!(
                    deleted_profile_id = %profile.id,
                    pending_name = %request.name,
                    "old profile deleted, replacement not yet created"
                );
                Some(profile.id.clone())
            }
            None => None,
        };

        let new = NewProfile {
            name: request.name.clone(),
            profile_type: request.signing_mode.profile_type(),
            bundle_id: bundle_id.id.clone(),
            device_ids: devices.iter().map(|device| device.id.clone()).collect(),
            certificate_ids: certificates.iter().map(|cert| cert.id.clone()).collect(),
        };
        let profile = self.profiles.create_profile(new).await?;

        self.profiles.replace_cached_profile(&request.name, profile.clone()).await;

        info!(
            profile_id = %profile.id,
            device_count = devices.len(),
            certificate_count = certificates.len(),
            "profile reconciled"
        );

        Ok(ReconcileReport { profile, replaced_profile_id })
    }
}
