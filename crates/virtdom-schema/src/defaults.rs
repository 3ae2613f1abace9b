// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Architecture-aware defaulting of domain specifications.
//!
//! A freshly assembled [`DomainSpec`] only carries what its builder cared
//! about. Before the document is handed to the hypervisor the remaining
//! platform knobs are filled in here, keyed on the target architecture.
//! Every rule only applies when the field is still unset, so defaulting is
//! idempotent and never overrides a deliberate choice.

use std::str::FromStr;

use crate::devices::{ConsoleTarget, MemBalloon, Stats};
use crate::{Domain, DomainSpec, DOMAIN_XMLNS};

/// Guest architectures with platform defaults.
#[derive(
    Copy, Clone, Eq, PartialEq, Debug, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
    Ppc64le,
}

impl Arch {
    /// The architecture token the emulator goes by.
    fn qemu_arch(self) -> &'static str {
        match self {
            Arch::Amd64 => "x86_64",
            Arch::Arm64 => "aarch64",
            Arch::Ppc64le => "ppc64le",
        }
    }

    fn machine_type(self) -> &'static str {
        match self {
            Arch::Amd64 => "q35",
            Arch::Arm64 => "virt",
            Arch::Ppc64le => "pseries",
        }
    }

    fn emulator(self) -> &'static str {
        match self {
            Arch::Amd64 => "/usr/bin/qemu-system-x86_64",
            Arch::Arm64 => "/usr/bin/qemu-system-aarch64",
            Arch::Ppc64le => "/usr/bin/qemu-system-ppc64",
        }
    }

    fn console_target_type(self) -> &'static str {
        match self {
            Arch::Arm64 => "virtio",
            Arch::Amd64 | Arch::Ppc64le => "serial",
        }
    }

    fn memballoon(self) -> MemBalloon {
        match self {
            // No balloon device on pseries machines.
            Arch::Ppc64le => MemBalloon {
                model: "none".to_string(),
                stats: None,
            },
            Arch::Amd64 | Arch::Arm64 => MemBalloon {
                model: "virtio".to_string(),
                stats: Some(Stats { period: 10 }),
            },
        }
    }
}

/// Fills unset fields of a domain with the platform defaults of one target
/// architecture.
pub struct Defaulter {
    arch: Option<Arch>,
}

impl Defaulter {
    /// An unrecognized architecture token is not an error: the defaulter
    /// still applies the architecture-independent rules and leaves the
    /// rest untouched.
    pub fn new(arch: &str) -> Defaulter {
        Defaulter { arch: Arch::from_str(arch).ok() }
    }

    /// Defaults the spec, seeding its name from the domain's namespace and
    /// name first.
    pub fn set_domain_defaults(&self, domain: &mut Domain) {
        if domain.spec.name.is_empty() {
            domain.spec.name =
                format!("{}_{}", domain.namespace, domain.name);
        }
        self.set_spec_defaults(&mut domain.spec);
    }

    pub fn set_spec_defaults(&self, spec: &mut DomainSpec) {
        if spec.xmlns.is_empty() {
            spec.xmlns = DOMAIN_XMLNS.to_string();
        }
        if spec.domain_type.is_empty() {
            spec.domain_type = "kvm".to_string();
        }
        if spec.os.os_type.os.is_empty() {
            spec.os.os_type.os = "hvm".to_string();
        }

        let Some(arch) = self.arch else {
            return;
        };

        if spec.os.os_type.arch.is_empty() {
            spec.os.os_type.arch = arch.qemu_arch().to_string();
        }
        if spec.os.os_type.machine.is_empty() {
            spec.os.os_type.machine = arch.machine_type().to_string();
        }
        if spec.devices.emulator.is_empty() {
            spec.devices.emulator = arch.emulator().to_string();
        }
        for console in &mut spec.devices.consoles {
            if console.target.is_none() {
                console.target = Some(ConsoleTarget {
                    target_type: arch.console_target_type().to_string(),
                    port: Some(0),
                });
            }
        }
        if spec.devices.ballooning.is_none() {
            spec.devices.ballooning = Some(arch.memballoon());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::devices::Console;

    fn defaulted(arch: &str) -> Domain {
        let mut domain = Domain::minimal_with_namespace("ns", "vm");
        domain.spec.devices.consoles.push(Console {
            console_type: "pty".to_string(),
            target: None,
        });
        Defaulter::new(arch).set_domain_defaults(&mut domain);
        domain
    }

    #[test]
    fn amd64_platform_defaults() {
        let domain = defaulted("amd64");
        let spec = &domain.spec;
        assert_eq!(spec.xmlns, DOMAIN_XMLNS);
        assert_eq!(spec.domain_type, "kvm");
        assert_eq!(spec.os.os_type.os, "hvm");
        assert_eq!(spec.os.os_type.arch, "x86_64");
        assert_eq!(spec.os.os_type.machine, "q35");
        assert_eq!(spec.devices.emulator, "/usr/bin/qemu-system-x86_64");
        assert_eq!(
            spec.devices.consoles[0].target,
            Some(ConsoleTarget {
                target_type: "serial".to_string(),
                port: Some(0),
            })
        );
        assert_eq!(
            spec.devices.ballooning,
            Some(MemBalloon {
                model: "virtio".to_string(),
                stats: Some(Stats { period: 10 }),
            })
        );
    }

    #[test]
    fn arm64_platform_defaults() {
        let spec = defaulted("arm64").spec;
        assert_eq!(spec.os.os_type.arch, "aarch64");
        assert_eq!(spec.os.os_type.machine, "virt");
        assert_eq!(spec.devices.emulator, "/usr/bin/qemu-system-aarch64");
        assert_eq!(
            spec.devices.consoles[0].target.as_ref().unwrap().target_type,
            "virtio"
        );
        assert_eq!(spec.devices.ballooning.unwrap().model, "virtio");
    }

    #[test]
    fn ppc64le_platform_defaults() {
        let spec = defaulted("ppc64le").spec;
        assert_eq!(spec.os.os_type.arch, "ppc64le");
        assert_eq!(spec.os.os_type.machine, "pseries");
        assert_eq!(spec.devices.emulator, "/usr/bin/qemu-system-ppc64");
        assert_eq!(
            spec.devices.consoles[0].target.as_ref().unwrap().target_type,
            "serial"
        );
        assert_eq!(
            spec.devices.ballooning,
            Some(MemBalloon { model: "none".to_string(), stats: None })
        );
    }

    #[test]
    fn unknown_arch_applies_only_platform_independent_rules() {
        let spec = defaulted("riscv64").spec;
        assert_eq!(spec.xmlns, DOMAIN_XMLNS);
        assert_eq!(spec.domain_type, "kvm");
        assert_eq!(spec.os.os_type.os, "hvm");
        assert_eq!(spec.os.os_type.arch, "");
        assert_eq!(spec.os.os_type.machine, "");
        assert_eq!(spec.devices.emulator, "");
        assert_eq!(spec.devices.consoles[0].target, None);
        assert_eq!(spec.devices.ballooning, None);
    }

    #[test]
    fn preset_values_are_left_alone() {
        let mut domain = Domain::minimal("vm");
        domain.spec.os.os_type.machine = "pc-i440fx-2.1".to_string();
        domain.spec.devices.ballooning =
            Some(MemBalloon { model: "none".to_string(), stats: None });
        Defaulter::new("amd64").set_domain_defaults(&mut domain);

        assert_eq!(domain.spec.os.os_type.machine, "pc-i440fx-2.1");
        assert_eq!(domain.spec.devices.ballooning.unwrap().model, "none");
        // Unset siblings are still filled.
        assert_eq!(domain.spec.os.os_type.arch, "x86_64");
    }

    #[test]
    fn defaulting_is_idempotent() {
        let mut once = defaulted("amd64");
        let twice = defaulted("amd64");
        Defaulter::new("amd64").set_domain_defaults(&mut once);
        assert_eq!(once, twice);
    }

    #[test]
    fn name_is_seeded_from_namespace_and_name() {
        let mut domain = Domain {
            namespace: "tenant".to_string(),
            name: "guest".to_string(),
            spec: DomainSpec::default(),
        };
        Defaulter::new("amd64").set_domain_defaults(&mut domain);
        assert_eq!(domain.spec.name, "tenant_guest");

        // An explicit name survives.
        let mut named = Domain::minimal_with_namespace("tenant", "guest");
        Defaulter::new("amd64").set_domain_defaults(&mut named);
        assert_eq!(named.spec.name, "tenant_guest");
    }

    #[test]
    fn arch_tokens_parse_case_sensitively() {
        assert_eq!(Arch::from_str("amd64").unwrap(), Arch::Amd64);
        assert_eq!(Arch::from_str("arm64").unwrap(), Arch::Arm64);
        assert_eq!(Arch::from_str("ppc64le").unwrap(), Arch::Ppc64le);
        assert!(Arch::from_str("AMD64").is_err());
        assert_eq!(Arch::Ppc64le.to_string(), "ppc64le");
    }
}
