// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Guest CPU model, topology and placement tuning.

use serde::{Deserialize, Serialize};

/// The `<cpu>` block. Always present in a domain document, even if empty.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cpu {
    pub mode: String,
    pub model: String,
    pub features: Vec<CpuFeature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology: Option<CpuTopology>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numa: Option<Numa>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuFeature {
    pub name: String,
    pub policy: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuTopology {
    pub sockets: u32,
    pub cores: u32,
    pub threads: u32,
}

/// Guest NUMA layout. Cell order is preserved; the hypervisor derives node
/// indices from it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Numa {
    pub cells: Vec<NumaCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumaCell {
    pub id: String,
    /// Guest CPU range spanned by this cell, e.g. `0-3`.
    pub cpus: String,
    pub memory: u64,
    pub unit: String,
}

/// The `<vcpu>` element: virtual CPU count plus placement policy.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vcpu {
    pub placement: String,
    pub cpus: u32,
}

/// Number of I/O threads backing the device queues.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IoThreads {
    pub iothreads: u32,
}

/// Pinning of guest CPUs, I/O threads and the emulator onto host CPU sets.
/// Pin order is preserved as given.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuTune {
    pub vcpu_pin: Vec<CpuTuneVcpuPin>,
    pub iothread_pin: Vec<CpuTuneIoThreadPin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emulator_pin: Option<CpuEmulatorPin>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuTuneVcpuPin {
    pub vcpu: u32,
    pub cpuset: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuTuneIoThreadPin {
    pub iothread: u32,
    pub cpuset: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuEmulatorPin {
    pub cpuset: String,
}

/// Host NUMA placement of guest memory.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumaTune {
    pub memory: NumaTuneMemory,
    pub mem_nodes: Vec<MemNode>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumaTuneMemory {
    pub mode: String,
    pub nodeset: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemNode {
    pub cellid: u32,
    pub mode: String,
    pub nodeset: String,
}
