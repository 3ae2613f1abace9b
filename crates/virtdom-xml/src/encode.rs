// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rendering of schema types into domain XML.
//!
//! Children are emitted in a fixed canonical order; within a list the
//! caller's order is kept. `None` subtrees and empty-string attributes
//! produce nothing.

use virtdom_schema::*;

use crate::writer::XmlWriter;

pub(crate) fn write_domain_spec(w: &mut XmlWriter, spec: &DomainSpec) {
    w.start_element(
        "domain",
        &[("type", &spec.domain_type), ("xmlns", &spec.xmlns)],
    );
    w.text_element("name", &[], &spec.name);
    if !spec.uuid.is_empty() {
        w.text_element("uuid", &[], &spec.uuid);
    }
    write_metadata(w, &spec.metadata);
    write_memory(w, "memory", &spec.memory);
    if let Some(memory) = &spec.current_memory {
        write_memory(w, "currentMemory", memory);
    }
    if let Some(vcpu) = &spec.vcpu {
        let cpus = vcpu.cpus.to_string();
        w.text_element("vcpu", &[("placement", &vcpu.placement)], &cpus);
    }
    if let Some(iothreads) = &spec.iothreads {
        let count = iothreads.iothreads.to_string();
        w.text_element("iothreads", &[], &count);
    }
    if let Some(tune) = &spec.cpu_tune {
        write_cputune(w, tune);
    }
    if let Some(tune) = &spec.numa_tune {
        write_numatune(w, tune);
    }
    if let Some(sysinfo) = &spec.sysinfo {
        write_sysinfo(w, sysinfo);
    }
    write_os(w, &spec.os);
    if let Some(features) = &spec.features {
        write_features(w, features);
    }
    write_cpu(w, &spec.cpu);
    if let Some(clock) = &spec.clock {
        write_clock(w, clock);
    }
    if let Some(security) = &spec.launch_security {
        write_launch_security(w, security);
    }
    write_devices(w, &spec.devices);
    w.end_element("domain");
}

fn write_metadata(w: &mut XmlWriter, metadata: &Metadata) {
    w.start_element("metadata", &[]);
    w.start_element("virtdom", &[("xmlns", METADATA_XMLNS)]);
    if !metadata.virtdom.uid.is_empty() {
        w.text_element("uid", &[], &metadata.virtdom.uid);
    }
    if let Some(grace) = &metadata.virtdom.grace_period {
        let seconds = grace.deletion_grace_period_seconds.to_string();
        w.start_element("graceperiod", &[]);
        w.text_element("deletionGracePeriodSeconds", &[], &seconds);
        w.end_element("graceperiod");
    }
    w.end_element("virtdom");
    w.end_element("metadata");
}

fn write_memory(w: &mut XmlWriter, tag: &str, memory: &Memory) {
    let value = memory.value.to_string();
    w.text_element(tag, &[("unit", &memory.unit)], &value);
}

fn write_cputune(w: &mut XmlWriter, tune: &CpuTune) {
    w.start_element("cputune", &[]);
    for pin in &tune.vcpu_pin {
        let vcpu = pin.vcpu.to_string();
        w.empty_element(
            "vcpupin",
            &[("vcpu", &vcpu), ("cpuset", &pin.cpuset)],
        );
    }
    for pin in &tune.iothread_pin {
        let iothread = pin.iothread.to_string();
        w.empty_element(
            "iothreadpin",
            &[("iothread", &iothread), ("cpuset", &pin.cpuset)],
        );
    }
    if let Some(pin) = &tune.emulator_pin {
        w.empty_element("emulatorpin", &[("cpuset", &pin.cpuset)]);
    }
    w.end_element("cputune");
}

fn write_numatune(w: &mut XmlWriter, tune: &NumaTune) {
    w.start_element("numatune", &[]);
    w.empty_element(
        "memory",
        &[("mode", &tune.memory.mode), ("nodeset", &tune.memory.nodeset)],
    );
    for node in &tune.mem_nodes {
        let cellid = node.cellid.to_string();
        w.empty_element(
            "memnode",
            &[
                ("cellid", &cellid),
                ("mode", &node.mode),
                ("nodeset", &node.nodeset),
            ],
        );
    }
    w.end_element("numatune");
}

fn write_sysinfo(w: &mut XmlWriter, sysinfo: &SysInfo) {
    w.start_element("sysinfo", &[("type", &sysinfo.sysinfo_type)]);
    if !sysinfo.system.is_empty() {
        w.start_element("system", &[]);
        for entry in &sysinfo.system {
            w.text_element("entry", &[("name", &entry.name)], &entry.value);
        }
        w.end_element("system");
    }
    w.end_element("sysinfo");
}

fn write_os(w: &mut XmlWriter, os: &Os) {
    w.start_element("os", &[]);
    w.text_element(
        "type",
        &[("arch", &os.os_type.arch), ("machine", &os.os_type.machine)],
        &os.os_type.os,
    );
    for boot in &os.boot {
        w.empty_element("boot", &[("dev", &boot.dev)]);
    }
    if let Some(smbios) = &os.smbios {
        w.empty_element("smbios", &[("mode", &smbios.mode)]);
    }
    w.end_element("os");
}

fn write_features(w: &mut XmlWriter, features: &Features) {
    w.start_element("features", &[]);
    if features.acpi.is_some() {
        w.empty_element("acpi", &[]);
    }
    if features.apic.is_some() {
        w.empty_element("apic", &[]);
    }
    if features.smm.is_some() {
        w.empty_element("smm", &[]);
    }
    if let Some(kvm) = &features.kvm {
        w.start_element("kvm", &[]);
        if let Some(state) = &kvm.hidden {
            write_feature_state(w, "hidden", state);
        }
        if let Some(state) = &kvm.hint_dedicated {
            write_feature_state(w, "hint-dedicated", state);
        }
        w.end_element("kvm");
    }
    if let Some(state) = &features.pvspinlock {
        write_feature_state(w, "pvspinlock", state);
    }
    if let Some(state) = &features.pmu {
        write_feature_state(w, "pmu", state);
    }
    w.end_element("features");
}

fn write_feature_state(w: &mut XmlWriter, tag: &str, state: &FeatureState) {
    w.empty_element(tag, &[("state", &state.state)]);
}

fn write_cpu(w: &mut XmlWriter, cpu: &Cpu) {
    w.start_element("cpu", &[("mode", &cpu.mode)]);
    if !cpu.model.is_empty() {
        w.text_element("model", &[], &cpu.model);
    }
    for feature in &cpu.features {
        w.empty_element(
            "feature",
            &[("name", &feature.name), ("policy", &feature.policy)],
        );
    }
    if let Some(topology) = &cpu.topology {
        let sockets = topology.sockets.to_string();
        let cores = topology.cores.to_string();
        let threads = topology.threads.to_string();
        w.empty_element(
            "topology",
            &[
                ("sockets", &sockets),
                ("cores", &cores),
                ("threads", &threads),
            ],
        );
    }
    if let Some(numa) = &cpu.numa {
        w.start_element("numa", &[]);
        for cell in &numa.cells {
            let memory = cell.memory.to_string();
            w.empty_element(
                "cell",
                &[
                    ("id", &cell.id),
                    ("cpus", &cell.cpus),
                    ("memory", &memory),
                    ("unit", &cell.unit),
                ],
            );
        }
        w.end_element("numa");
    }
    w.end_element("cpu");
}

fn write_clock(w: &mut XmlWriter, clock: &Clock) {
    w.start_element("clock", &[("offset", &clock.offset)]);
    for timer in &clock.timers {
        w.empty_element(
            "timer",
            &[
                ("name", &timer.name),
                ("tickpolicy", &timer.tickpolicy),
                ("present", &timer.present),
            ],
        );
    }
    w.end_element("clock");
}

pub(crate) fn write_launch_security(
    w: &mut XmlWriter,
    security: &LaunchSecurity,
) {
    w.start_element(
        "launchSecurity",
        &[("type", &security.security_type)],
    );
    if let Some(amd) = &security.amd {
        for (tag, value) in amd_fields(amd) {
            w.text_element(tag, &[], value);
        }
    }
    w.end_element("launchSecurity");
}

fn amd_fields(amd: &AmdLaunchSecurity) -> Vec<(&'static str, &str)> {
    [
        ("policy", amd.policy.as_str()),
        ("authorKey", amd.author_key.as_str()),
        ("vcek", amd.vcek.as_str()),
        ("idAuth", amd.id_auth.as_str()),
        ("idBlock", amd.id_block.as_str()),
        ("hostData", amd.host_data.as_str()),
        ("dhCert", amd.dh_cert.as_str()),
        ("session", amd.session.as_str()),
        ("cbitpos", amd.cbitpos.as_str()),
        ("reducedPhysBits", amd.reduced_phys_bits.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .collect()
}

fn write_devices(w: &mut XmlWriter, devices: &Devices) {
    w.start_element("devices", &[]);
    if !devices.emulator.is_empty() {
        w.text_element("emulator", &[], &devices.emulator);
    }
    for disk in &devices.disks {
        write_disk(w, disk);
    }
    for interface in &devices.interfaces {
        write_interface(w, interface);
    }
    for input in &devices.inputs {
        write_input(w, input);
    }
    for video in &devices.video {
        write_video(w, video);
    }
    for console in &devices.consoles {
        write_console(w, console);
    }
    for watchdog in &devices.watchdogs {
        write_watchdog(w, watchdog);
    }
    if let Some(rng) = &devices.rng {
        write_rng(w, rng);
    }
    for controller in &devices.controllers {
        w.empty_element(
            "controller",
            &[
                ("type", &controller.controller_type),
                ("index", &controller.index),
                ("model", &controller.model),
            ],
        );
    }
    if let Some(balloon) = &devices.ballooning {
        write_memballoon(w, balloon);
    }
    if let Some(vsock) = &devices.vsock {
        write_vsock(w, vsock);
    }
    w.end_element("devices");
}

fn write_disk(w: &mut XmlWriter, disk: &Disk) {
    w.start_element(
        "disk",
        &[("type", &disk.disk_type), ("device", &disk.device)],
    );
    if let Some(driver) = &disk.driver {
        w.empty_element(
            "driver",
            &[("name", &driver.name), ("type", &driver.driver_type)],
        );
    }
    write_disk_source(w, &disk.source);
    w.empty_element(
        "target",
        &[("dev", &disk.target.device), ("bus", &disk.target.bus)],
    );
    if let Some(alias) = &disk.alias {
        write_alias(w, alias);
    }
    w.end_element("disk");
}

fn write_disk_source(w: &mut XmlWriter, source: &DiskSource) {
    w.start_element(
        "source",
        &[
            ("file", &source.file),
            ("dev", &source.dev),
            ("protocol", &source.protocol),
            ("name", &source.name),
        ],
    );
    if let Some(host) = &source.host {
        w.empty_element(
            "host",
            &[("name", &host.name), ("port", &host.port)],
        );
    }
    w.end_element("source");
}

fn write_interface(w: &mut XmlWriter, interface: &Interface) {
    w.start_element("interface", &[("type", &interface.interface_type)]);
    w.empty_element(
        "source",
        &[
            ("network", &interface.source.network),
            ("bridge", &interface.source.bridge),
        ],
    );
    if let Some(target) = &interface.target {
        w.empty_element("target", &[("dev", &target.dev)]);
    }
    if let Some(model) = &interface.model {
        w.empty_element("model", &[("type", &model.model_type)]);
    }
    if let Some(mac) = &interface.mac {
        w.empty_element("mac", &[("address", &mac.address)]);
    }
    if let Some(alias) = &interface.alias {
        write_alias(w, alias);
    }
    w.end_element("interface");
}

fn write_input(w: &mut XmlWriter, input: &Input) {
    w.start_element(
        "input",
        &[("type", &input.input_type), ("bus", &input.bus)],
    );
    if let Some(alias) = &input.alias {
        write_alias(w, alias);
    }
    w.end_element("input");
}

fn write_video(w: &mut XmlWriter, video: &Video) {
    let heads = video.model.heads.map(|heads| heads.to_string());
    let vram = video.model.vram.map(|vram| vram.to_string());
    w.start_element("video", &[]);
    w.empty_element(
        "model",
        &[
            ("type", &video.model.model_type),
            ("heads", heads.as_deref().unwrap_or("")),
            ("vram", vram.as_deref().unwrap_or("")),
        ],
    );
    w.end_element("video");
}

fn write_console(w: &mut XmlWriter, console: &Console) {
    w.start_element("console", &[("type", &console.console_type)]);
    if let Some(target) = &console.target {
        let port = target.port.map(|port| port.to_string());
        w.empty_element(
            "target",
            &[
                ("type", &target.target_type),
                ("port", port.as_deref().unwrap_or("")),
            ],
        );
    }
    w.end_element("console");
}

fn write_watchdog(w: &mut XmlWriter, watchdog: &Watchdog) {
    w.start_element(
        "watchdog",
        &[("model", &watchdog.model), ("action", &watchdog.action)],
    );
    if let Some(alias) = &watchdog.alias {
        write_alias(w, alias);
    }
    w.end_element("watchdog");
}

fn write_rng(w: &mut XmlWriter, rng: &Rng) {
    w.start_element("rng", &[("model", &rng.model)]);
    if let Some(backend) = &rng.backend {
        w.text_element(
            "backend",
            &[("model", &backend.model)],
            &backend.source,
        );
    }
    w.end_element("rng");
}

fn write_memballoon(w: &mut XmlWriter, balloon: &MemBalloon) {
    w.start_element("memballoon", &[("model", &balloon.model)]);
    // A disabled balloon has nothing to report stats about.
    if balloon.model != "none" {
        if let Some(stats) = &balloon.stats {
            let period = stats.period.to_string();
            w.empty_element("stats", &[("period", &period)]);
        }
    }
    w.end_element("memballoon");
}

fn write_vsock(w: &mut XmlWriter, vsock: &Vsock) {
    let address = vsock.cid.address.to_string();
    w.start_element("vsock", &[("model", &vsock.model)]);
    w.empty_element(
        "cid",
        &[("auto", &vsock.cid.auto), ("address", &address)],
    );
    w.end_element("vsock");
}

pub(crate) fn write_alias(w: &mut XmlWriter, alias: &Alias) {
    let name = alias.wire_name();
    w.empty_element("alias", &[("name", &name)]);
}
