//! Typed resource repository
//!
//! Maps directory resources (devices, certificates, bundle ids, profiles)
//! onto API endpoints. Full listings are cached for the lifetime of the
//! repository; filtered listings always go to the server. Mutations keep
//! the affected cache coherent instead of dropping it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use provisor_common::ListCache;
use provisor_core::{BundleIdDirectory, CertificateDirectory, DeviceDirectory, ProfileDirectory};
use provisor_domain::{
    BundleId, Certificate, Device, Document, NewDevice, NewProfile, Profile, ProvisorError,
    ResourceObject, Result,
};

use super::executor::RequestExecutor;
use super::request::RequestDescriptor;

/// Cached, typed access to the provisioning directory
///
/// One repository shares one executor. Each resource kind has a whole-list
/// cache: the first listing fetches every page, later listings reuse the
/// snapshot until it is invalidated. Creations and deletions patch the
/// snapshot in place, so reconciliation never re-lists mid-run.
pub struct ProvisioningRepository {
    executor: Arc<RequestExecutor>,
    devices: ListCache<Device>,
    certificates: ListCache<Certificate>,
    bundle_ids: ListCache<BundleId>,
    profiles: ListCache<Profile>,
}

impl ProvisioningRepository {
    /// Create a repository on top of an executor
    #[must_use]
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            devices: ListCache::new(),
            certificates: ListCache::new(),
            bundle_ids: ListCache::new(),
            profiles: ListCache::new(),
        }
    }

    // ------------------------------------------------------------------
    // Cached listings
    // ------------------------------------------------------------------

    /// All registered devices
    ///
    /// # Errors
    /// Propagates executor failures and `ProvisorError::Transport` when a
    /// returned object cannot be decoded.
    pub async fn devices(&self) -> Result<Vec<Device>> {
        self.devices.get_or_fetch(|| self.fetch_collection("/devices", Device::from_object)).await
    }

    /// All signing certificates
    ///
    /// # Errors
    /// Propagates executor failures and `ProvisorError::Transport` when a
    /// returned object cannot be decoded.
    pub async fn certificates(&self) -> Result<Vec<Certificate>> {
        self.certificates
            .get_or_fetch(|| self.fetch_collection("/certificates", Certificate::from_object))
            .await
    }

    /// All registered bundle ids
    ///
    /// # Errors
    /// Propagates executor failures and `ProvisorError::Transport` when a
    /// returned object cannot be decoded.
    pub async fn bundle_ids(&self) -> Result<Vec<BundleId>> {
        self.bundle_ids
            .get_or_fetch(|| self.fetch_collection("/bundleIds", BundleId::from_object))
            .await
    }

    /// All provisioning profiles
    ///
    /// # Errors
    /// Propagates executor failures and `ProvisorError::Transport` when a
    /// returned object cannot be decoded.
    pub async fn profiles(&self) -> Result<Vec<Profile>> {
        self.profiles
            .get_or_fetch(|| self.fetch_collection("/profiles", Profile::from_object))
            .await
    }

    // ------------------------------------------------------------------
    // Filtered listings (uncached)
    // ------------------------------------------------------------------

    /// Devices matching server-side filters
    ///
    /// Filters are `(field, value)` pairs sent as `filter[field]=value`.
    /// The result is not cached and does not touch the full-list snapshot.
    ///
    /// # Errors
    /// Propagates executor failures and `ProvisorError::Transport` when a
    /// returned object cannot be decoded.
    pub async fn devices_filtered(&self, filters: &[(&str, &str)]) -> Result<Vec<Device>> {
        self.fetch_filtered("/devices", filters, Device::from_object).await
    }

    /// Certificates matching server-side filters
    ///
    /// # Errors
    /// Propagates executor failures and `ProvisorError::Transport` when a
    /// returned object cannot be decoded.
    pub async fn certificates_filtered(
        &self,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Certificate>> {
        self.fetch_filtered("/certificates", filters, Certificate::from_object).await
    }

    /// Bundle ids matching server-side filters
    ///
    /// # Errors
    /// Propagates executor failures and `ProvisorError::Transport` when a
    /// returned object cannot be decoded.
    pub async fn bundle_ids_filtered(&self, filters: &[(&str, &str)]) -> Result<Vec<BundleId>> {
        self.fetch_filtered("/bundleIds", filters, BundleId::from_object).await
    }

    /// Profiles matching server-side filters
    ///
    /// # Errors
    /// Propagates executor failures and `ProvisorError::Transport` when a
    /// returned object cannot be decoded.
    pub async fn profiles_filtered(&self, filters: &[(&str, &str)]) -> Result<Vec<Profile>> {
        self.fetch_filtered("/profiles", filters, Profile::from_object).await
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a provisioning profile
    ///
    /// The created record is appended to the profile snapshot if one is
    /// cached. Relationship ids are passed through as given; the server
    /// rejects unknown ids with a structured error that surfaces unchanged.
    ///
    /// # Errors
    /// Propagates executor failures; `ProvisorError::Api` carries the
    /// server's rejection reasons.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_profile(&self, new: &NewProfile) -> Result<Profile> {
        let body = serde_json::to_value(new.to_document())
            .map_err(|e| ProvisorError::Transport(format!("encoding profile creation: {e}")))?;
        let document: Document =
            self.executor.execute(&RequestDescriptor::post("/profiles", body)).await?;
        let object = document.data.ok_or_else(|| {
            ProvisorError::Transport("profile creation response had no data".to_string())
        })?;
        let profile = Profile::from_object(object)?;

        let created = profile.clone();
        self.profiles.update(|list| list.push(created)).await;

        info!(id = %profile.id, "profile created");
        Ok(profile)
    }

    /// Delete a profile by id
    ///
    /// Not idempotent: deleting an id the server no longer has surfaces
    /// the API error. The cached snapshot drops the entry on success.
    ///
    /// # Errors
    /// Propagates executor failures; `ProvisorError::Api` carries the
    /// server's rejection reasons.
    #[instrument(skip(self))]
    pub async fn delete_profile(&self, id: &str) -> Result<()> {
        let _: serde_json::Value =
            self.executor.execute(&RequestDescriptor::delete(format!("/profiles/{id}"))).await?;

        let deleted = id.to_string();
        self.profiles.update(|list| list.retain(|profile| profile.id != deleted)).await;

        info!(id, "profile deleted");
        Ok(())
    }

    /// Register a device
    ///
    /// The registered record is appended to the device snapshot if one is
    /// cached.
    ///
    /// # Errors
    /// Propagates executor failures; `ProvisorError::Api` carries the
    /// server's rejection reasons.
    #[instrument(skip(self, new), fields(udid = %new.udid))]
    pub async fn register_device(&self, new: &NewDevice) -> Result<Device> {
        let body = serde_json::to_value(new.to_document())
            .map_err(|e| ProvisorError::Transport(format!("encoding device registration: {e}")))?;
        let document: Document =
            self.executor.execute(&RequestDescriptor::post("/devices", body)).await?;
        let object = document.data.ok_or_else(|| {
            ProvisorError::Transport("device registration response had no data".to_string())
        })?;
        let device = Device::from_object(object)?;

        let registered = device.clone();
        self.devices.update(|list| list.push(registered)).await;

        info!(id = %device.id, "device registered");
        Ok(device)
    }

    // ------------------------------------------------------------------
    // Cache control
    // ------------------------------------------------------------------

    /// Swap a replaced profile into the cached snapshot
    ///
    /// Removes every cached profile named `stale_name`, then appends the
    /// replacement. No-op when no snapshot is cached yet.
    pub async fn replace_cached_profile(&self, stale_name: &str, replacement: Profile) {
        let stale = stale_name.to_string();
        self.profiles
            .update(|list| {
                list.retain(|profile| profile.attributes.name != stale);
                list.push(replacement);
            })
            .await;
    }

    /// Drop the cached device snapshot
    pub async fn invalidate_devices(&self) {
        self.devices.invalidate().await;
    }

    /// Drop the cached certificate snapshot
    pub async fn invalidate_certificates(&self) {
        self.certificates.invalidate().await;
    }

    /// Drop the cached bundle id snapshot
    pub async fn invalidate_bundle_ids(&self) {
        self.bundle_ids.invalidate().await;
    }

    /// Drop the cached profile snapshot
    pub async fn invalidate_profiles(&self) {
        self.profiles.invalidate().await;
    }

    /// Drop every cached snapshot
    pub async fn invalidate_all(&self) {
        self.devices.invalidate().await;
        self.certificates.invalidate().await;
        self.bundle_ids.invalidate().await;
        self.profiles.invalidate().await;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn fetch_collection<T>(
        &self,
        path: &str,
        decode: fn(ResourceObject) -> Result<T>,
    ) -> Result<Vec<T>> {
        let objects = self.executor.fetch_all(&RequestDescriptor::get(path)).await?;
        objects.into_iter().map(decode).collect()
    }

    async fn fetch_filtered<T>(
        &self,
        path: &str,
        filters: &[(&str, &str)],
        decode: fn(ResourceObject) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut request = RequestDescriptor::get(path);
        for (field, value) in filters {
            request = request.with_filter(field, *value);
        }
        let objects = self.executor.fetch_all(&request).await?;
        objects.into_iter().map(decode).collect()
    }
}

#[async_trait]
impl DeviceDirectory for ProvisioningRepository {
    async fn devices(&self) -> Result<Vec<Device>> {
        ProvisioningRepository::devices(self).await
    }
}

#[async_trait]
impl CertificateDirectory for ProvisioningRepository {
    async fn certificates(&self) -> Result<Vec<Certificate>> {
        ProvisioningRepository::certificates(self).await
    }
}

#[async_trait]
impl BundleIdDirectory for ProvisioningRepository {
    async fn bundle_ids(&self) -> Result<Vec<BundleId>> {
        ProvisioningRepository::bundle_ids(self).await
    }
}

#[async_trait]
impl ProfileDirectory for ProvisioningRepository {
    async fn profiles(&self) -> Result<Vec<Profile>> {
        ProvisioningRepository::profiles(self).await
    }

    async fn create_profile(&self, new: NewProfile) -> Result<Profile> {
        ProvisioningRepository::create_profile(self, &new).await
    }

    async fn delete_profile(&self, id: &str) -> Result<()> {
        ProvisioningRepository::delete_profile(self, id).await
    }

    async fn replace_cached_profile(&self, stale_name: &str, replacement: Profile) {
        ProvisioningRepository::replace_cached_profile(self, stale_name, replacement).await;
    }
}
