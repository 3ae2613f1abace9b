// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `<devices>` subtree of a domain document.
//!
//! Device lists stay in the order the caller put them in; the hypervisor
//! assigns addresses based on that order.

use serde::{Deserialize, Serialize};

use crate::alias::Alias;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Devices {
    /// Path of the emulator binary. Defaulted per target architecture.
    pub emulator: String,
    pub disks: Vec<Disk>,
    pub interfaces: Vec<Interface>,
    pub inputs: Vec<Input>,
    pub video: Vec<Video>,
    pub consoles: Vec<Console>,
    pub watchdogs: Vec<Watchdog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng: Option<Rng>,
    pub controllers: Vec<Controller>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballooning: Option<MemBalloon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vsock: Option<Vsock>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Disk {
    /// Source kind: `file`, `block` or `network`.
    #[serde(rename = "type")]
    pub disk_type: String,
    /// Guest-facing kind, e.g. `disk` or `cdrom`.
    pub device: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<DiskDriver>,
    pub source: DiskSource,
    pub target: DiskTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<Alias>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiskDriver {
    pub name: String,
    #[serde(rename = "type")]
    pub driver_type: String,
}

/// Where the disk payload lives. Exactly one of `file`, `dev` or
/// `protocol`/`name` is populated, matching the disk's type.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiskSource {
    pub file: String,
    pub dev: String,
    pub protocol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<DiskSourceHost>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiskSourceHost {
    pub name: String,
    /// Kept as text; some transports take service names here.
    pub port: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiskTarget {
    /// Guest device node, e.g. `vda`. Rides as the `dev` attribute.
    pub device: String,
    pub bus: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Interface {
    #[serde(rename = "type")]
    pub interface_type: String,
    pub source: InterfaceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<InterfaceTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<InterfaceModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<Mac>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<Alias>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterfaceSource {
    pub network: String,
    pub bridge: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterfaceTarget {
    pub dev: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterfaceModel {
    #[serde(rename = "type")]
    pub model_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mac {
    pub address: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Input {
    #[serde(rename = "type")]
    pub input_type: String,
    pub bus: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<Alias>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Video {
    pub model: VideoModel,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoModel {
    #[serde(rename = "type")]
    pub model_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heads: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vram: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Console {
    #[serde(rename = "type")]
    pub console_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ConsoleTarget>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsoleTarget {
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Watchdog {
    pub model: String,
    /// What the hypervisor does when the timer fires, e.g. `poweroff`.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<Alias>,
}

/// Entropy source passed through to the guest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rng {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<RngBackend>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RngBackend {
    pub model: String,
    /// Host entropy device, carried as the element's text.
    pub source: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Controller {
    #[serde(rename = "type")]
    pub controller_type: String,
    pub index: String,
    pub model: String,
}

/// The memory balloon device.
///
/// A model of `none` disables ballooning; the codec drops any statistics
/// polling configuration in that case since there is no device to poll.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemBalloon {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    /// Polling interval in seconds.
    pub period: u32,
}

/// A vsock channel between host and guest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vsock {
    pub model: String,
    pub cid: Cid,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cid {
    /// `yes` to let the hypervisor pick the context id.
    pub auto: String,
    pub address: u32,
}
