//! Domain types for the provisioning API
//!
//! Resource records are immutable snapshots decoded from wire documents.
//! Decoding is fail-fast: a record with a missing required attribute is
//! rejected when it is constructed, not when a field is first read.

pub mod enums;
pub mod resources;
pub mod wire;

pub use enums::{
    BundleIdPlatform, CertificateType, DeviceClass, DeviceStatus, ProfileState, ProfileType,
    SigningMode,
};
pub use resources::{
    BundleId, BundleIdAttributes, Certificate, CertificateAttributes, Device, DeviceAttributes,
    NewDevice, NewProfile, Profile, ProfileAttributes,
};
pub use wire::{CollectionDocument, Document, ErrorDocument, PageLinks, ResourceObject};
