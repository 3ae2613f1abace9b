// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction of schema types from domain XML.
//!
//! Reading is deliberately lenient about shape: elements are matched by
//! local tag name, unknown elements and attributes are skipped, and
//! missing ones leave the field at its unset value. Domain documents
//! queried back from the hypervisor carry plenty of runtime-only state,
//! and all of it must be ignorable. Malformed values, by contrast, are
//! hard errors that name the offending element.

use std::num::ParseIntError;
use std::str::FromStr;

use roxmltree::Node;
use virtdom_schema::*;

use crate::DecodeError;

fn elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

fn attr(node: Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

fn text(node: Node) -> String {
    node.text().unwrap_or_default().to_string()
}

/// Parses an optional numeric attribute. Absent means `None`; present but
/// unparseable is an error.
fn opt_num_attr<T>(node: Node, name: &str) -> Result<Option<T>, DecodeError>
where
    T: FromStr<Err = ParseIntError>,
{
    match node.attribute(name) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|source| {
            DecodeError::InvalidAttribute {
                element: node.tag_name().name().to_string(),
                attribute: name.to_string(),
                value: raw.to_string(),
                source,
            }
        }),
        None => Ok(None),
    }
}

/// Like [`opt_num_attr`], but an absent attribute reads as zero.
fn num_attr<T>(node: Node, name: &str) -> Result<T, DecodeError>
where
    T: FromStr<Err = ParseIntError> + Default,
{
    Ok(opt_num_attr(node, name)?.unwrap_or_default())
}

/// Parses the element text as a number; whitespace around it is
/// tolerated, and no text at all reads as zero.
fn num_text<T>(node: Node) -> Result<T, DecodeError>
where
    T: FromStr<Err = ParseIntError> + Default,
{
    let raw = node.text().unwrap_or_default().trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse().map_err(|source| DecodeError::InvalidText {
        element: node.tag_name().name().to_string(),
        value: raw.to_string(),
        source,
    })
}

pub(crate) fn read_domain_spec(
    node: Node,
) -> Result<DomainSpec, DecodeError> {
    let mut spec = DomainSpec {
        domain_type: attr(node, "type"),
        xmlns: node.tag_name().namespace().unwrap_or_default().to_string(),
        ..DomainSpec::default()
    };
    for child in elements(node) {
        match child.tag_name().name() {
            "name" => spec.name = text(child),
            "uuid" => spec.uuid = text(child),
            "metadata" => spec.metadata = read_metadata(child)?,
            "memory" => spec.memory = read_memory(child)?,
            "currentMemory" => {
                spec.current_memory = Some(read_memory(child)?)
            }
            "vcpu" => {
                spec.vcpu = Some(Vcpu {
                    placement: attr(child, "placement"),
                    cpus: num_text(child)?,
                })
            }
            "iothreads" => {
                spec.iothreads =
                    Some(IoThreads { iothreads: num_text(child)? })
            }
            "cputune" => spec.cpu_tune = Some(read_cputune(child)?),
            "numatune" => spec.numa_tune = Some(read_numatune(child)?),
            "sysinfo" => spec.sysinfo = Some(read_sysinfo(child)),
            "os" => spec.os = read_os(child),
            "features" => spec.features = Some(read_features(child)),
            "cpu" => spec.cpu = read_cpu(child)?,
            "clock" => spec.clock = Some(read_clock(child)),
            "launchSecurity" => {
                spec.launch_security = Some(read_launch_security(child))
            }
            "devices" => spec.devices = read_devices(child)?,
            _ => {}
        }
    }
    Ok(spec)
}

fn read_metadata(node: Node) -> Result<Metadata, DecodeError> {
    let mut metadata = Metadata::default();
    for child in elements(node) {
        if child.tag_name().name() != "virtdom" {
            continue;
        }
        for item in elements(child) {
            match item.tag_name().name() {
                "uid" => metadata.virtdom.uid = text(item),
                "graceperiod" => {
                    let mut grace = GracePeriodMetadata::default();
                    for field in elements(item) {
                        if field.tag_name().name()
                            == "deletionGracePeriodSeconds"
                        {
                            grace.deletion_grace_period_seconds =
                                num_text(field)?;
                        }
                    }
                    metadata.virtdom.grace_period = Some(grace);
                }
                _ => {}
            }
        }
    }
    Ok(metadata)
}

fn read_memory(node: Node) -> Result<Memory, DecodeError> {
    Ok(Memory { value: num_text(node)?, unit: attr(node, "unit") })
}

fn read_cputune(node: Node) -> Result<CpuTune, DecodeError> {
    let mut tune = CpuTune::default();
    for child in elements(node) {
        match child.tag_name().name() {
            "vcpupin" => tune.vcpu_pin.push(CpuTuneVcpuPin {
                vcpu: num_attr(child, "vcpu")?,
                cpuset: attr(child, "cpuset"),
            }),
            "iothreadpin" => tune.iothread_pin.push(CpuTuneIoThreadPin {
                iothread: num_attr(child, "iothread")?,
                cpuset: attr(child, "cpuset"),
            }),
            "emulatorpin" => {
                tune.emulator_pin =
                    Some(CpuEmulatorPin { cpuset: attr(child, "cpuset") })
            }
            _ => {}
        }
    }
    Ok(tune)
}

fn read_numatune(node: Node) -> Result<NumaTune, DecodeError> {
    let mut tune = NumaTune::default();
    for child in elements(node) {
        match child.tag_name().name() {
            "memory" => {
                tune.memory = NumaTuneMemory {
                    mode: attr(child, "mode"),
                    nodeset: attr(child, "nodeset"),
                }
            }
            "memnode" => tune.mem_nodes.push(MemNode {
                cellid: num_attr(child, "cellid")?,
                mode: attr(child, "mode"),
                nodeset: attr(child, "nodeset"),
            }),
            _ => {}
        }
    }
    Ok(tune)
}

fn read_sysinfo(node: Node) -> SysInfo {
    let mut sysinfo = SysInfo {
        sysinfo_type: attr(node, "type"),
        ..SysInfo::default()
    };
    for child in elements(node) {
        if child.tag_name().name() != "system" {
            continue;
        }
        for item in elements(child) {
            if item.tag_name().name() == "entry" {
                sysinfo.system.push(Entry {
                    name: attr(item, "name"),
                    value: text(item),
                });
            }
        }
    }
    sysinfo
}

fn read_os(node: Node) -> Os {
    let mut os = Os::default();
    for child in elements(node) {
        match child.tag_name().name() {
            "type" => {
                os.os_type = OsType {
                    os: text(child),
                    arch: attr(child, "arch"),
                    machine: attr(child, "machine"),
                }
            }
            "boot" => os.boot.push(Boot { dev: attr(child, "dev") }),
            "smbios" => {
                os.smbios = Some(Smbios { mode: attr(child, "mode") })
            }
            _ => {}
        }
    }
    os
}

fn read_features(node: Node) -> Features {
    let mut features = Features::default();
    for child in elements(node) {
        match child.tag_name().name() {
            "acpi" => features.acpi = Some(FeatureEnabled {}),
            "apic" => features.apic = Some(FeatureEnabled {}),
            "smm" => features.smm = Some(FeatureEnabled {}),
            "kvm" => {
                let mut kvm = FeatureKvm::default();
                for item in elements(child) {
                    match item.tag_name().name() {
                        "hidden" => {
                            kvm.hidden = Some(read_feature_state(item))
                        }
                        "hint-dedicated" => {
                            kvm.hint_dedicated =
                                Some(read_feature_state(item))
                        }
                        _ => {}
                    }
                }
                features.kvm = Some(kvm);
            }
            "pvspinlock" => {
                features.pvspinlock = Some(read_feature_state(child))
            }
            "pmu" => features.pmu = Some(read_feature_state(child)),
            _ => {}
        }
    }
    features
}

fn read_feature_state(node: Node) -> FeatureState {
    FeatureState { state: attr(node, "state") }
}

fn read_cpu(node: Node) -> Result<Cpu, DecodeError> {
    let mut cpu = Cpu { mode: attr(node, "mode"), ..Cpu::default() };
    for child in elements(node) {
        match child.tag_name().name() {
            "model" => cpu.model = text(child),
            "feature" => cpu.features.push(CpuFeature {
                name: attr(child, "name"),
                policy: attr(child, "policy"),
            }),
            "topology" => {
                cpu.topology = Some(CpuTopology {
                    sockets: num_attr(child, "sockets")?,
                    cores: num_attr(child, "cores")?,
                    threads: num_attr(child, "threads")?,
                })
            }
            "numa" => {
                let mut numa = Numa::default();
                for cell in elements(child) {
                    if cell.tag_name().name() != "cell" {
                        continue;
                    }
                    numa.cells.push(NumaCell {
                        id: attr(cell, "id"),
                        cpus: attr(cell, "cpus"),
                        memory: num_attr(cell, "memory")?,
                        unit: attr(cell, "unit"),
                    });
                }
                cpu.numa = Some(numa);
            }
            _ => {}
        }
    }
    Ok(cpu)
}

fn read_clock(node: Node) -> Clock {
    let mut clock = Clock { offset: attr(node, "offset"), ..Clock::default() };
    for child in elements(node) {
        if child.tag_name().name() == "timer" {
            clock.timers.push(Timer {
                name: attr(child, "name"),
                tickpolicy: attr(child, "tickpolicy"),
                present: attr(child, "present"),
            });
        }
    }
    clock
}

pub(crate) fn read_launch_security(node: Node) -> LaunchSecurity {
    let mut amd = AmdLaunchSecurity::default();
    let mut present = false;
    for child in elements(node) {
        let field = match child.tag_name().name() {
            "policy" => &mut amd.policy,
            "authorKey" => &mut amd.author_key,
            "vcek" => &mut amd.vcek,
            "idAuth" => &mut amd.id_auth,
            "idBlock" => &mut amd.id_block,
            "hostData" => &mut amd.host_data,
            "dhCert" => &mut amd.dh_cert,
            "session" => &mut amd.session,
            "cbitpos" => &mut amd.cbitpos,
            "reducedPhysBits" => &mut amd.reduced_phys_bits,
            _ => continue,
        };
        *field = text(child);
        present = true;
    }
    LaunchSecurity {
        security_type: attr(node, "type"),
        amd: present.then_some(amd),
    }
}

fn read_devices(node: Node) -> Result<Devices, DecodeError> {
    let mut devices = Devices::default();
    for child in elements(node) {
        match child.tag_name().name() {
            "emulator" => devices.emulator = text(child),
            "disk" => devices.disks.push(read_disk(child)),
            "interface" => {
                devices.interfaces.push(read_interface(child))
            }
            "input" => devices.inputs.push(read_input(child)),
            "video" => devices.video.push(read_video(child)?),
            "console" => devices.consoles.push(read_console(child)?),
            "watchdog" => devices.watchdogs.push(read_watchdog(child)),
            "rng" => devices.rng = Some(read_rng(child)),
            "controller" => devices.controllers.push(Controller {
                controller_type: attr(child, "type"),
                index: attr(child, "index"),
                model: attr(child, "model"),
            }),
            "memballoon" => {
                devices.ballooning = Some(read_memballoon(child)?)
            }
            "vsock" => devices.vsock = Some(read_vsock(child)?),
            _ => {}
        }
    }
    Ok(devices)
}

fn read_disk(node: Node) -> Disk {
    let mut disk = Disk {
        disk_type: attr(node, "type"),
        device: attr(node, "device"),
        ..Disk::default()
    };
    for child in elements(node) {
        match child.tag_name().name() {
            "driver" => {
                disk.driver = Some(DiskDriver {
                    name: attr(child, "name"),
                    driver_type: attr(child, "type"),
                })
            }
            "source" => {
                let mut source = DiskSource {
                    file: attr(child, "file"),
                    dev: attr(child, "dev"),
                    protocol: attr(child, "protocol"),
                    name: attr(child, "name"),
                    ..DiskSource::default()
                };
                for host in elements(child) {
                    if host.tag_name().name() == "host" {
                        source.host = Some(DiskSourceHost {
                            name: attr(host, "name"),
                            port: attr(host, "port"),
                        });
                    }
                }
                disk.source = source;
            }
            "target" => {
                disk.target = DiskTarget {
                    device: attr(child, "dev"),
                    bus: attr(child, "bus"),
                }
            }
            "alias" => disk.alias = Some(read_alias(child)),
            _ => {}
        }
    }
    disk
}

fn read_interface(node: Node) -> Interface {
    let mut interface = Interface {
        interface_type: attr(node, "type"),
        ..Interface::default()
    };
    for child in elements(node) {
        match child.tag_name().name() {
            "source" => {
                interface.source = InterfaceSource {
                    network: attr(child, "network"),
                    bridge: attr(child, "bridge"),
                }
            }
            "target" => {
                interface.target =
                    Some(InterfaceTarget { dev: attr(child, "dev") })
            }
            "model" => {
                interface.model =
                    Some(InterfaceModel { model_type: attr(child, "type") })
            }
            "mac" => {
                interface.mac =
                    Some(Mac { address: attr(child, "address") })
            }
            "alias" => interface.alias = Some(read_alias(child)),
            _ => {}
        }
    }
    interface
}

fn read_input(node: Node) -> Input {
    let mut input = Input {
        input_type: attr(node, "type"),
        bus: attr(node, "bus"),
        ..Input::default()
    };
    for child in elements(node) {
        if child.tag_name().name() == "alias" {
            input.alias = Some(read_alias(child));
        }
    }
    input
}

fn read_video(node: Node) -> Result<Video, DecodeError> {
    let mut video = Video::default();
    for child in elements(node) {
        if child.tag_name().name() == "model" {
            video.model = VideoModel {
                model_type: attr(child, "type"),
                heads: opt_num_attr(child, "heads")?,
                vram: opt_num_attr(child, "vram")?,
            };
        }
    }
    Ok(video)
}

fn read_console(node: Node) -> Result<Console, DecodeError> {
    let mut console = Console {
        console_type: attr(node, "type"),
        ..Console::default()
    };
    for child in elements(node) {
        if child.tag_name().name() == "target" {
            console.target = Some(ConsoleTarget {
                target_type: attr(child, "type"),
                port: opt_num_attr(child, "port")?,
            });
        }
    }
    Ok(console)
}

fn read_watchdog(node: Node) -> Watchdog {
    let mut watchdog = Watchdog {
        model: attr(node, "model"),
        action: attr(node, "action"),
        ..Watchdog::default()
    };
    for child in elements(node) {
        if child.tag_name().name() == "alias" {
            watchdog.alias = Some(read_alias(child));
        }
    }
    watchdog
}

fn read_rng(node: Node) -> Rng {
    let mut rng = Rng { model: attr(node, "model"), ..Rng::default() };
    for child in elements(node) {
        if child.tag_name().name() == "backend" {
            rng.backend = Some(RngBackend {
                model: attr(child, "model"),
                source: text(child),
            });
        }
    }
    rng
}

fn read_memballoon(node: Node) -> Result<MemBalloon, DecodeError> {
    let mut balloon = MemBalloon {
        model: attr(node, "model"),
        ..MemBalloon::default()
    };
    for child in elements(node) {
        if child.tag_name().name() == "stats" {
            balloon.stats = Some(Stats { period: num_attr(child, "period")? });
        }
    }
    Ok(balloon)
}

fn read_vsock(node: Node) -> Result<Vsock, DecodeError> {
    let mut vsock = Vsock { model: attr(node, "model"), ..Vsock::default() };
    for child in elements(node) {
        if child.tag_name().name() == "cid" {
            vsock.cid = Cid {
                auto: attr(child, "auto"),
                address: num_attr(child, "address")?,
            };
        }
    }
    Ok(vsock)
}

pub(crate) fn read_alias(node: Node) -> Alias {
    Alias::from_wire_name(&attr(node, "name"))
}

#[cfg(test)]
mod test {
    use virtdom_schema::DomainSpec;

    use crate::{DecodeError, XmlElement};

    // Shaped like a domain queried back from a running hypervisor:
    // runtime ids, security labels and lifecycle actions must all be
    // skippable without affecting the fields we track.
    const RUNTIME_XML: &str = r#"
<domain type="kvm" id="42">
  <name>runtime</name>
  <memory unit="KiB">262144</memory>
  <resource>
    <partition>/machine</partition>
  </resource>
  <on_poweroff>destroy</on_poweroff>
  <seclabel type="dynamic" model="dac" relabel="yes"/>
  <devices>
    <disk type="file" device="disk">
      <source file="/tmp/disk.img"/>
      <target dev="vda" bus="virtio"/>
      <readonly/>
      <address type="pci" domain="0x0000" bus="0x07" slot="0x00"/>
    </disk>
  </devices>
</domain>
"#;

    #[test]
    fn unknown_elements_and_attributes_are_skipped() {
        let spec = DomainSpec::from_xml(RUNTIME_XML).unwrap();
        assert_eq!(spec.name, "runtime");
        assert_eq!(spec.memory.value, 262144);
        assert_eq!(spec.memory.unit, "KiB");
        assert_eq!(spec.devices.disks.len(), 1);
        assert_eq!(spec.devices.disks[0].source.file, "/tmp/disk.img");
        assert_eq!(spec.devices.disks[0].target.bus, "virtio");
    }

    #[test]
    fn malformed_numeric_text_names_the_element() {
        let err = DomainSpec::from_xml(
            "<domain><memory unit=\"MB\">nine</memory></domain>",
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidText { .. }));
        let message = err.to_string();
        assert!(message.contains("memory"), "{message}");
        assert!(message.contains("nine"), "{message}");
    }

    #[test]
    fn malformed_numeric_attribute_names_element_and_attribute() {
        let err = DomainSpec::from_xml(
            "<domain><devices><memballoon model=\"virtio\">\
             <stats period=\"often\"/>\
             </memballoon></devices></domain>",
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAttribute { .. }));
        let message = err.to_string();
        assert!(message.contains("stats"), "{message}");
        assert!(message.contains("period"), "{message}");
        assert!(message.contains("often"), "{message}");
    }

    #[test]
    fn mismatched_root_is_rejected() {
        let err = DomainSpec::from_xml("<alias name=\"x\"/>").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedRoot { expected: "domain", .. }
        ));
    }

    #[test]
    fn unparseable_documents_surface_the_syntax_error() {
        let err = DomainSpec::from_xml("<domain><name>x</domain>")
            .unwrap_err();
        assert!(matches!(err, DecodeError::Syntax(_)));
    }

    #[test]
    fn missing_attributes_read_as_unset() {
        let spec = DomainSpec::from_xml(
            "<domain><vcpu>4</vcpu><memory>512</memory></domain>",
        )
        .unwrap();
        assert_eq!(spec.vcpu.unwrap().placement, "");
        assert_eq!(spec.memory.unit, "");
        assert_eq!(spec.memory.value, 512);
        assert_eq!(spec.xmlns, "");
    }
}
