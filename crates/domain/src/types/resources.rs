//! Typed resource records
//!
//! Records pair a resource id with a fully decoded attribute set. They are
//! snapshots: the client never mutates one in place, it fetches or creates a
//! replacement. `from_object` constructors reject objects with a wrong
//! resource type or missing required attributes.

use std::io;
use std::path::{Path, PathBuf};

use base64::prelude::{Engine as _, BASE64_STANDARD};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::enums::{
    BundleIdPlatform, CertificateType, DeviceClass, DeviceStatus, ProfileState, ProfileType,
};
use super::wire::{
    CreationDocument, Relationship, RelationshipList, ResourceLinkage, ResourceObject,
};
use crate::errors::{ProvisorError, Result};

fn decode_attributes<T: DeserializeOwned>(
    object: ResourceObject,
    expected: &str,
) -> Result<(String, T)> {
    if object.kind != expected {
        return Err(ProvisorError::Transport(format!(
            "expected '{expected}' resource, got '{}' for id {}",
            object.kind, object.id
        )));
    }
    let attributes = serde_json::from_value(object.attributes).map_err(|e| {
        ProvisorError::Transport(format!("decoding {expected} {}: {e}", object.id))
    })?;
    Ok((object.id, attributes))
}

// ============================================================================
// Devices
// ============================================================================

/// Attributes of a registered device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAttributes {
    pub name: String,
    pub udid: String,
    pub status: DeviceStatus,
    pub platform: BundleIdPlatform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<DeviceClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<DateTime<Utc>>,
}

/// A device registered with the developer account
#[derive(Debug, Clone)]
pub struct Device {
    pub id: String,
    pub attributes: DeviceAttributes,
}

impl Device {
    pub const KIND: &'static str = "devices";

    /// Decode a wire object into a device record
    ///
    /// # Errors
    /// Returns `ProvisorError::Transport` if the object has a different
    /// resource type or a required attribute is missing.
    pub fn from_object(object: ResourceObject) -> Result<Self> {
        let (id, attributes) = decode_attributes(object, Self::KIND)?;
        Ok(Self { id, attributes })
    }

    /// Whether the device can be included in a provisioning profile
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.attributes.status == DeviceStatus::Enabled
    }
}

/// Payload for registering a new device
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: String,
    pub udid: String,
    pub platform: BundleIdPlatform,
}

impl NewDevice {
    /// New iOS device registration
    #[must_use]
    pub fn new(name: impl Into<String>, udid: impl Into<String>) -> Self {
        Self { name: name.into(), udid: udid.into(), platform: BundleIdPlatform::Ios }
    }

    /// Override the target platform
    #[must_use]
    pub fn with_platform(mut self, platform: BundleIdPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Wrap into the request document the API expects
    #[must_use]
    pub fn to_document(&self) -> CreationDocument<DeviceCreation> {
        CreationDocument {
            data: DeviceCreation { kind: Device::KIND, attributes: self.clone() },
        }
    }
}

/// Creation object for the device registration request
#[derive(Debug, Clone, Serialize)]
pub struct DeviceCreation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: NewDevice,
}

// ============================================================================
// Certificates
// ============================================================================

/// Attributes of a signing certificate
///
/// `platform` is absent for the platform-agnostic certificate types
/// (`DEVELOPMENT`, `DISTRIBUTION`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAttributes {
    pub name: String,
    pub display_name: String,
    pub certificate_type: CertificateType,
    pub expiration_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<BundleIdPlatform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

/// A signing certificate held by the developer account
#[derive(Debug, Clone)]
pub struct Certificate {
    pub id: String,
    pub attributes: CertificateAttributes,
}

impl Certificate {
    pub const KIND: &'static str = "certificates";

    /// Decode a wire object into a certificate record
    ///
    /// # Errors
    /// Returns `ProvisorError::Transport` if the object has a different
    /// resource type or a required attribute is missing.
    pub fn from_object(object: ResourceObject) -> Result<Self> {
        let (id, attributes) = decode_attributes(object, Self::KIND)?;
        Ok(Self { id, attributes })
    }
}

// ============================================================================
// Bundle ids
// ============================================================================

/// Attributes of a registered bundle id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleIdAttributes {
    pub identifier: String,
    pub name: String,
    pub platform: BundleIdPlatform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_id: Option<String>,
}

/// A bundle id registered with the developer account
#[derive(Debug, Clone)]
pub struct BundleId {
    pub id: String,
    pub attributes: BundleIdAttributes,
}

impl BundleId {
    pub const KIND: &'static str = "bundleIds";

    /// Decode a wire object into a bundle id record
    ///
    /// # Errors
    /// Returns `ProvisorError::Transport` if the object has a different
    /// resource type or a required attribute is missing.
    pub fn from_object(object: ResourceObject) -> Result<Self> {
        let (id, attributes) = decode_attributes(object, Self::KIND)?;
        Ok(Self { id, attributes })
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Attributes of a provisioning profile
///
/// `profile_content` holds the base64-encoded `.mobileprovision` payload as
/// delivered by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAttributes {
    pub name: String,
    pub uuid: String,
    pub profile_content: String,
    pub profile_type: ProfileType,
    pub created_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_state: Option<ProfileState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<BundleIdPlatform>,
}

/// A provisioning profile
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: String,
    pub attributes: ProfileAttributes,
}

impl Profile {
    pub const KIND: &'static str = "profiles";

    /// Decode a wire object into a profile record
    ///
    /// # Errors
    /// Returns `ProvisorError::Transport` if the object has a different
    /// resource type or a required attribute is missing.
    pub fn from_object(object: ResourceObject) -> Result<Self> {
        let (id, attributes) = decode_attributes(object, Self::KIND)?;
        Ok(Self { id, attributes })
    }

    /// Profile name as shown in the developer portal
    #[must_use]
    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    /// Whether the server still considers this profile usable
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.attributes.profile_state == Some(ProfileState::Active)
    }

    /// Decode the embedded `.mobileprovision` payload
    ///
    /// # Errors
    /// Returns `ProvisorError::Transport` if the stored content is not valid
    /// base64.
    pub fn decoded_payload(&self) -> Result<Vec<u8>> {
        BASE64_STANDARD.decode(&self.attributes.profile_content).map_err(|e| {
            ProvisorError::Transport(format!(
                "profile payload for '{}' is not valid base64: {e}",
                self.attributes.name
            ))
        })
    }

    /// Write the decoded payload to disk
    ///
    /// When `path` is a directory the file name is derived from the profile
    /// name and uuid. Returns the path actually written.
    ///
    /// # Errors
    /// Returns an I/O error if the payload cannot be decoded or written.
    pub fn write_payload(&self, path: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = path.as_ref();
        let target = if path.is_dir() {
            path.join(format!("{}-{}.mobileprovision", self.attributes.name, self.attributes.uuid))
        } else {
            path.to_path_buf()
        };
        let content = self
            .decoded_payload()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(&target, content)?;
        Ok(target)
    }
}

/// Payload for creating a profile
///
/// Membership (bundle id, devices, certificates) is fixed at creation. The
/// API offers no way to edit it afterwards, so replacing membership means
/// deleting and recreating the profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub name: String,
    pub profile_type: ProfileType,
    pub bundle_id: String,
    pub device_ids: Vec<String>,
    pub certificate_ids: Vec<String>,
}

impl NewProfile {
    /// Wrap into the request document the API expects
    #[must_use]
    pub fn to_document(&self) -> CreationDocument<ProfileCreation> {
        let linkages = |ids: &[String], kind: &'static str| {
            ids.iter().map(|id| ResourceLinkage { id: id.clone(), kind }).collect()
        };
        CreationDocument {
            data: ProfileCreation {
                kind: Profile::KIND,
                attributes: ProfileCreationAttributes {
                    name: self.name.clone(),
                    profile_type: self.profile_type,
                },
                relationships: ProfileCreationRelationships {
                    bundle_id: Relationship {
                        data: ResourceLinkage { id: self.bundle_id.clone(), kind: BundleId::KIND },
                    },
                    devices: RelationshipList { data: linkages(&self.device_ids, Device::KIND) },
                    certificates: RelationshipList {
                        data: linkages(&self.certificate_ids, Certificate::KIND),
                    },
                },
            },
        }
    }
}

/// Creation object for the profile creation request
#[derive(Debug, Clone, Serialize)]
pub struct ProfileCreation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: ProfileCreationAttributes,
    pub relationships: ProfileCreationRelationships,
}

/// Attributes section of a profile creation request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreationAttributes {
    pub name: String,
    pub profile_type: ProfileType,
}

/// Relationships section of a profile creation request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreationRelationships {
    pub bundle_id: Relationship,
    pub devices: RelationshipList,
    pub certificates: RelationshipList,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn device_object() -> ResourceObject {
        ResourceObject {
            id: "dev-1".to_string(),
            kind: "devices".to_string(),
            attributes: json!({
                "name": "Test iPhone",
                "udid": "00008110-001234567890801E",
                "status": "ENABLED",
                "platform": "IOS",
                "model": "iPhone 13 Pro Max",
                "deviceClass": "IPHONE",
                "addedDate": "2024-03-01T10:00:00+00:00"
            }),
        }
    }

    #[test]
    fn device_from_object_decodes_all_attributes() {
        let device = Device::from_object(device_object()).unwrap();
        assert_eq!(device.id, "dev-1");
        assert_eq!(device.attributes.udid, "00008110-001234567890801E");
        assert_eq!(device.attributes.device_class, Some(DeviceClass::Iphone));
        assert!(device.is_enabled());
    }

    #[test]
    fn device_from_object_fails_on_missing_udid() {
        let object = ResourceObject {
            id: "dev-2".to_string(),
            kind: "devices".to_string(),
            attributes: json!({"name": "No udid", "status": "ENABLED", "platform": "IOS"}),
        };
        let err = Device::from_object(object).unwrap_err();
        assert!(matches!(err, ProvisorError::Transport(_)));
        assert!(err.to_string().contains("dev-2"));
    }

    #[test]
    fn device_from_object_fails_on_kind_mismatch() {
        let mut object = device_object();
        object.kind = "profiles".to_string();
        let err = Device::from_object(object).unwrap_err();
        assert!(matches!(err, ProvisorError::Transport(_)));
    }

    #[test]
    fn certificate_platform_is_optional() {
        let object = ResourceObject {
            id: "cert-1".to_string(),
            kind: "certificates".to_string(),
            attributes: json!({
                "name": "Development",
                "displayName": "Dev Team",
                "certificateType": "DEVELOPMENT",
                "expirationDate": "2025-03-01T10:00:00+00:00"
            }),
        };
        let cert = Certificate::from_object(object).unwrap();
        assert_eq!(cert.attributes.certificate_type, CertificateType::Development);
        assert!(cert.attributes.platform.is_none());
    }

    #[test]
    fn profile_payload_round_trips_through_base64() {
        let payload = b"<plist>fixture</plist>";
        let object = ResourceObject {
            id: "prof-1".to_string(),
            kind: "profiles".to_string(),
            attributes: json!({
                "name": "App Dev",
                "uuid": "aaaa-bbbb",
                "profileContent": BASE64_STANDARD.encode(payload),
                "profileType": "IOS_APP_DEVELOPMENT",
                "createdDate": "2024-03-01T10:00:00+00:00",
                "expirationDate": "2025-03-01T10:00:00+00:00",
                "profileState": "ACTIVE"
            }),
        };
        let profile = Profile::from_object(object).unwrap();
        assert!(profile.is_active());
        assert_eq!(profile.decoded_payload().unwrap(), payload);
    }

    #[test]
    fn profile_payload_rejects_invalid_base64() {
        let object = ResourceObject {
            id: "prof-2".to_string(),
            kind: "profiles".to_string(),
            attributes: json!({
                "name": "Broken",
                "uuid": "cccc-dddd",
                "profileContent": "not-base64!!!",
                "profileType": "IOS_APP_DEVELOPMENT",
                "createdDate": "2024-03-01T10:00:00+00:00",
                "expirationDate": "2025-03-01T10:00:00+00:00"
            }),
        };
        let profile = Profile::from_object(object).unwrap();
        assert!(matches!(profile.decoded_payload(), Err(ProvisorError::Transport(_))));
    }

    #[test]
    fn new_profile_document_matches_wire_shape() {
        let new = NewProfile {
            name: "App Dev".to_string(),
            profile_type: ProfileType::IosAppDevelopment,
            bundle_id: "bundle-1".to_string(),
            device_ids: vec!["dev-1".to_string(), "dev-2".to_string()],
            certificate_ids: vec!["cert-1".to_string()],
        };

        let value = serde_json::to_value(new.to_document()).unwrap();
        assert_eq!(value["data"]["type"], "profiles");
        assert_eq!(value["data"]["attributes"]["name"], "App Dev");
        assert_eq!(value["data"]["attributes"]["profileType"], "IOS_APP_DEVELOPMENT");
        assert_eq!(value["data"]["relationships"]["bundleId"]["data"]["id"], "bundle-1");
        assert_eq!(value["data"]["relationships"]["bundleId"]["data"]["type"], "bundleIds");
        assert_eq!(
            value["data"]["relationships"]["devices"]["data"]
                .as_array()
                .map(|devices| devices.len()),
            Some(2)
        );
        assert_eq!(value["data"]["relationships"]["certificates"]["data"][0]["id"], "cert-1");
    }

    #[test]
    fn new_device_document_matches_wire_shape() {
        let value = serde_json::to_value(
            NewDevice::new("CI iPhone", "00008110-000000000000001E").to_document(),
        )
        .unwrap();
        assert_eq!(value["data"]["type"], "devices");
        assert_eq!(value["data"]["attributes"]["udid"], "00008110-000000000000001E");
        assert_eq!(value["data"]["attributes"]["platform"], "IOS");
    }
}
