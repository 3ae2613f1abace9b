// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data model for hypervisor domain specifications.
//!
//! The types in this crate mirror the domain XML grammar understood by the
//! hypervisor management library. A [`Domain`] pairs a [`DomainSpec`] (the
//! serialized document tree) with the namespace and name it was created
//! under; the latter two never reach the wire and only seed defaults.
//!
//! Absence is modeled explicitly so that it survives a round trip:
//! optional subtrees are `Option`s, optional scalar attributes and elements
//! are empty strings, and neither produces any XML when unset. A value that
//! is present but empty still emits its (empty) element, so "absent" and
//! "present but empty" remain distinguishable. Collections keep their
//! insertion order; nothing is sorted or normalized behind the caller's
//! back, and unit tokens ride along verbatim.
//!
//! The XML codec itself lives in the `virtdom-xml` crate. These types also
//! carry serde derives for the JSON status snapshots the manager exchanges
//! with its controllers.

use serde::{Deserialize, Serialize};

mod alias;
mod cpu;
mod defaults;
mod devices;
mod launch_security;

pub use alias::Alias;
pub use cpu::{
    Cpu, CpuEmulatorPin, CpuFeature, CpuTopology, CpuTune,
    CpuTuneIoThreadPin, CpuTuneVcpuPin, IoThreads, MemNode, Numa, NumaCell,
    NumaTune, NumaTuneMemory, Vcpu,
};
pub use defaults::{Arch, Defaulter};
pub use devices::{
    Cid, Console, ConsoleTarget, Controller, Devices, Disk, DiskDriver,
    DiskSource, DiskSourceHost, DiskTarget, Input, Interface, InterfaceModel,
    InterfaceSource, InterfaceTarget, Mac, MemBalloon, Rng, RngBackend,
    Stats, Video, VideoModel, Vsock, Watchdog,
};
pub use launch_security::{AmdLaunchSecurity, LaunchSecurity};

/// Namespace of qemu-extended domain documents.
pub const DOMAIN_XMLNS: &str = "http://libvirt.org/schemas/domain/qemu/1.0";

/// Namespace of the manager-private `<virtdom>` metadata element.
pub const METADATA_XMLNS: &str = "http://virtdom.io";

/// A domain specification together with the namespace and name it was
/// created under. Only [`Domain::spec`] is ever serialized to XML.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Domain {
    pub namespace: String,
    pub name: String,
    pub spec: DomainSpec,
}

impl Domain {
    /// Returns a minimal viable domain in the `default` namespace.
    pub fn minimal(name: &str) -> Domain {
        Domain::minimal_with_namespace("default", name)
    }

    /// Returns a minimal viable domain in the given namespace.
    pub fn minimal_with_namespace(namespace: &str, name: &str) -> Domain {
        Domain {
            namespace: namespace.to_string(),
            name: name.to_string(),
            spec: DomainSpec::minimal(&format!("{}_{}", namespace, name)),
        }
    }
}

/// The root of the domain document tree.
///
/// Field order here matches the order in which the XML codec emits the
/// corresponding child elements.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainSpec {
    /// Hypervisor driver, e.g. `kvm`. Rides as the `type` attribute of the
    /// root element.
    #[serde(rename = "type")]
    pub domain_type: String,
    /// Namespace of the document. Empty means none is emitted.
    pub xmlns: String,
    pub name: String,
    pub uuid: String,
    pub metadata: Metadata,
    pub memory: Memory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_memory: Option<Memory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpu: Option<Vcpu>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iothreads: Option<IoThreads>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_tune: Option<CpuTune>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numa_tune: Option<NumaTune>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysinfo: Option<SysInfo>,
    pub os: Os,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Features>,
    pub cpu: Cpu,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<Clock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_security: Option<LaunchSecurity>,
    pub devices: Devices,
}

impl DomainSpec {
    /// Returns the smallest spec a hypervisor will accept: a name and a
    /// token amount of memory. Everything else is left for the caller and
    /// the [`Defaulter`].
    pub fn minimal(name: &str) -> DomainSpec {
        DomainSpec {
            name: name.to_string(),
            memory: Memory { value: 9, unit: "MB".to_string() },
            ..DomainSpec::default()
        }
    }
}

/// An amount of guest memory. The unit token is kept verbatim; this crate
/// never converts between units.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Memory {
    pub value: u64,
    pub unit: String,
}

/// The `<os>` block: guest loader type plus boot order and SMBIOS wiring.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Os {
    #[serde(rename = "type")]
    pub os_type: OsType,
    pub boot: Vec<Boot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smbios: Option<Smbios>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OsType {
    /// Element text, `hvm` for fully virtualized guests.
    pub os: String,
    pub arch: String,
    pub machine: String,
}

/// One `<boot dev=...>` entry; order is significant.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Boot {
    pub dev: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Smbios {
    pub mode: String,
}

/// SMBIOS tables exposed to the guest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SysInfo {
    #[serde(rename = "type")]
    pub sysinfo_type: String,
    pub system: Vec<Entry>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Entry {
    pub name: String,
    pub value: String,
}

/// Guest clock configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Clock {
    pub offset: String,
    pub timers: Vec<Timer>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timer {
    pub name: String,
    pub tickpolicy: String,
    pub present: String,
}

/// Optional platform features. Presence of a [`FeatureEnabled`] member
/// turns the feature on; its element carries no content.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Features {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acpi: Option<FeatureEnabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apic: Option<FeatureEnabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smm: Option<FeatureEnabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kvm: Option<FeatureKvm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pvspinlock: Option<FeatureState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmu: Option<FeatureState>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FeatureEnabled {}

/// KVM paravirtualization tweaks.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureKvm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<FeatureState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_dedicated: Option<FeatureState>,
}

/// A feature carrying an explicit `state` token (`on`/`off`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureState {
    pub state: String,
}

/// The `<metadata>` element. The manager stores its bookkeeping in a
/// privately-namespaced `<virtdom>` child; the hypervisor carries it
/// opaquely.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    pub virtdom: VirtdomMetadata,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VirtdomMetadata {
    /// Stable identifier of the VM object this domain was rendered from.
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<GracePeriodMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GracePeriodMetadata {
    pub deletion_grace_period_seconds: i64,
}
