//! Closed enumerations for server-controlled vocabularies
//!
//! Every enum that mirrors a server string carries an `Unknown` variant via
//! `#[serde(other)]`. The server may introduce values at any time; decoding
//! must tolerate them without failing, and matching must stay exhaustive.

use serde::{Deserialize, Serialize};

/// Registration state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Enabled,
    Disabled,
    #[serde(other)]
    Unknown,
}

/// Hardware class of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceClass {
    AppleWatch,
    Ipad,
    Iphone,
    Ipod,
    AppleTv,
    Mac,
    #[serde(other)]
    Unknown,
}

/// Operating system family of a device or bundle id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleIdPlatform {
    Ios,
    MacOs,
    #[serde(other)]
    Unknown,
}

/// Server-side validity state of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileState {
    Active,
    Invalid,
    #[serde(other)]
    Unknown,
}

/// Distribution category of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileType {
    IosAppDevelopment,
    IosAppStore,
    IosAppAdhoc,
    IosAppInhouse,
    MacAppDevelopment,
    MacAppStore,
    MacAppDirect,
    TvosAppDevelopment,
    TvosAppStore,
    TvosAppAdhoc,
    TvosAppInhouse,
    MacCatalystAppDevelopment,
    MacCatalystAppStore,
    MacCatalystAppDirect,
    #[serde(other)]
    Unknown,
}

/// Kind of signing certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    IosDevelopment,
    IosDistribution,
    MacAppDistribution,
    MacInstallerDistribution,
    MacAppDevelopment,
    DeveloperIdKext,
    DeveloperIdApplication,
    Development,
    Distribution,
    PassTypeId,
    PassTypeIdWithNfc,
    #[serde(other)]
    Unknown,
}

/// Client-side signing intent
///
/// Selects which certificate types a profile should reference and which
/// profile type is created. Never sent to the server as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningMode {
    Development,
    Distribution,
}

impl SigningMode {
    /// Certificate types eligible for this signing intent
    #[must_use]
    pub fn certificate_types(self) -> [CertificateType; 2] {
        match self {
            Self::Development => {
                [CertificateType::Development, CertificateType::IosDevelopment]
            }
            Self::Distribution => {
                [CertificateType::Distribution, CertificateType::IosDistribution]
            }
        }
    }

    /// Profile type created for this signing intent
    #[must_use]
    pub fn profile_type(self) -> ProfileType {
        match self {
            Self::Development => ProfileType::IosAppDevelopment,
            Self::Distribution => ProfileType::IosAppStore,
        }
    }
}
