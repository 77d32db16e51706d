//! Membership selection rules
//!
//! A refreshed profile always carries the full usable device set and the
//! certificates matching the signing mode. These helpers are pure filters
//! over directory snapshots, exposed for reuse outside the service.

use provisor_domain::{BundleIdPlatform, Certificate, Device, SigningMode};

/// Devices eligible for profile membership
///
/// Eligible means enabled and registered for the service platform.
/// Disabled devices stay registered server-side but cannot sign.
#[must_use]
pub fn valid_devices(devices: &[Device], platform: BundleIdPlatform) -> Vec<Device> {
    devices
        .iter()
        .filter(|device| device.is_enabled() && device.attributes.platform == platform)
        .cloned()
        .collect()
}

/// Certificates eligible for profile membership under a signing mode
///
/// Matches the mode's certificate types. Platform-agnostic certificates
/// (no platform attribute) are included; certificates pinned to a
/// different platform are excluded.
#[must_use]
pub fn signing_certificates(
    certificates: &[Certificate],
    mode: SigningMode,
    platform: BundleIdPlatform,
) -> Vec<Certificate> {
    let wanted = mode.certificate_types();
    certificates
        .iter()
        .filter(|certificate| {
            let platform_ok = certificate
                .attributes
                .platform
                .map_or(true, |certificate_platform| certificate_platform == platform);
            platform_ok && wanted.contains(&certificate.attributes.certificate_type)
        })
        .cloned()
        .collect()
}
