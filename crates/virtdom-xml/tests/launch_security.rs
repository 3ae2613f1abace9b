// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Launch-security element encoding and decoding.

use virtdom_schema::{AmdLaunchSecurity, DomainSpec, LaunchSecurity};
use virtdom_xml::XmlElement;

fn full_payload() -> AmdLaunchSecurity {
    AmdLaunchSecurity {
        policy: "0x0003".to_string(),
        author_key: "true".to_string(),
        vcek: "true".to_string(),
        id_auth: "RkFLRUlEQVVUSA==".to_string(),
        id_block: "RkFLRUlEQkxPQ0s=".to_string(),
        host_data: "aG9zdCBkYXRh".to_string(),
        dh_cert: "RkFLRURIQ0VSVA==".to_string(),
        session: "RkFLRVNFU1NJT04=".to_string(),
        cbitpos: "47".to_string(),
        reduced_phys_bits: "1".to_string(),
    }
}

#[test]
fn full_payload_emits_every_child_in_fixed_order() {
    let security = LaunchSecurity {
        security_type: "sev-snp".to_string(),
        amd: Some(full_payload()),
    };
    assert_eq!(
        security.to_xml(),
        r#"<launchSecurity type="sev-snp">
  <policy>0x0003</policy>
  <authorKey>true</authorKey>
  <vcek>true</vcek>
  <idAuth>RkFLRUlEQVVUSA==</idAuth>
  <idBlock>RkFLRUlEQkxPQ0s=</idBlock>
  <hostData>aG9zdCBkYXRh</hostData>
  <dhCert>RkFLRURIQ0VSVA==</dhCert>
  <session>RkFLRVNFU1NJT04=</session>
  <cbitpos>47</cbitpos>
  <reducedPhysBits>1</reducedPhysBits>
</launchSecurity>"#
    );
    assert_eq!(
        LaunchSecurity::from_xml(&security.to_xml()).unwrap(),
        security
    );
}

#[test]
fn empty_payload_fields_stay_off_the_wire() {
    let security = LaunchSecurity {
        security_type: "sev".to_string(),
        amd: Some(AmdLaunchSecurity {
            policy: "0x0001".to_string(),
            ..AmdLaunchSecurity::default()
        }),
    };
    assert_eq!(
        security.to_xml(),
        "<launchSecurity type=\"sev\">\n  \
         <policy>0x0001</policy>\n\
         </launchSecurity>"
    );
}

#[test]
fn unset_payload_emits_only_the_wrapping_element() {
    let security = LaunchSecurity {
        security_type: "sev".to_string(),
        amd: None,
    };
    assert_eq!(security.to_xml(), r#"<launchSecurity type="sev"/>"#);
}

#[test]
fn present_but_empty_payload_emits_only_the_wrapping_element() {
    let security = LaunchSecurity {
        security_type: "sev".to_string(),
        amd: Some(AmdLaunchSecurity::default()),
    };
    assert_eq!(security.to_xml(), r#"<launchSecurity type="sev"/>"#);

    // With no child elements on the wire, nothing says a payload was
    // ever there; decoding yields the unset form.
    let decoded = LaunchSecurity::from_xml(&security.to_xml()).unwrap();
    assert_eq!(decoded.security_type, "sev");
    assert_eq!(decoded.amd, None);
}

#[test]
fn payload_decodes_whenever_any_child_is_present() {
    let decoded = LaunchSecurity::from_xml(
        "<launchSecurity type=\"sev\">\
         <cbitpos>47</cbitpos>\
         <session>c2Vzc2lvbg==</session>\
         </launchSecurity>",
    )
    .unwrap();
    let amd = decoded.amd.unwrap();
    assert_eq!(amd.cbitpos, "47");
    assert_eq!(amd.session, "c2Vzc2lvbg==");
    // Fields absent from the document stay at their zero value.
    assert_eq!(amd.policy, "");
    assert_eq!(amd.dh_cert, "");
}

#[test]
fn sev_and_sev_snp_documents_do_not_leak_into_each_other() {
    let sev = LaunchSecurity {
        security_type: "sev".to_string(),
        amd: Some(full_payload()),
    }
    .to_xml();
    assert!(sev.contains(r#"type="sev""#));
    assert!(!sev.contains("sev-snp"));

    let snp = LaunchSecurity {
        security_type: "sev-snp".to_string(),
        amd: Some(full_payload()),
    }
    .to_xml();
    assert!(snp.contains(r#"type="sev-snp""#));
    // The only "sev" in the document is the one inside "sev-snp".
    assert!(!snp.replace("sev-snp", "").contains("sev"));
}

#[test]
fn unknown_discriminators_round_trip_verbatim() {
    // The type is opaque at this layer; future values must pass through.
    for token in ["sev-es", "tdx", ""] {
        let security = LaunchSecurity {
            security_type: token.to_string(),
            amd: None,
        };
        let decoded = LaunchSecurity::from_xml(&security.to_xml()).unwrap();
        assert_eq!(decoded.security_type, token);
    }
}

#[test]
fn launch_security_rides_inside_a_domain_document() {
    let mut spec = DomainSpec::minimal("mynamespace_testvmi");
    spec.launch_security = Some(LaunchSecurity {
        security_type: "sev".to_string(),
        amd: Some(AmdLaunchSecurity {
            policy: "0x0003".to_string(),
            dh_cert: "RkFLRURIQ0VSVA==".to_string(),
            session: "RkFLRVNFU1NJT04=".to_string(),
            ..AmdLaunchSecurity::default()
        }),
    });

    let xml = spec.to_xml();
    assert!(xml.contains(r#"<launchSecurity type="sev">"#), "{xml}");
    assert!(xml.contains("<policy>0x0003</policy>"), "{xml}");
    assert_eq!(DomainSpec::from_xml(&xml).unwrap(), spec);
}
