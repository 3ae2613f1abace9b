// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Confidential-compute launch configuration.

use serde::{Deserialize, Serialize};

/// The `<launchSecurity>` element.
///
/// The `type` discriminator is opaque free text (`sev`, `sev-snp`, ...);
/// whether the host actually supports it is for the hypervisor to decide.
/// All AMD variants share the [`AmdLaunchSecurity`] payload, whose fields
/// are emitted as individual child elements of the wrapper.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchSecurity {
    #[serde(rename = "type")]
    pub security_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amd: Option<AmdLaunchSecurity>,
}

/// Knobs of the AMD SEV family. Every field is optional; empty ones stay
/// off the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AmdLaunchSecurity {
    /// Guest policy bits, e.g. `0x30000`.
    pub policy: String,
    pub author_key: String,
    pub vcek: String,
    pub id_auth: String,
    pub id_block: String,
    pub host_data: String,
    /// Owner certificate chain (SEV attestation).
    pub dh_cert: String,
    /// Launch session blob (SEV attestation).
    pub session: String,
    pub cbitpos: String,
    pub reduced_phys_bits: String,
}
