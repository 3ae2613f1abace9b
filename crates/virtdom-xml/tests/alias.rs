// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Alias wire-name handling through the XML codec.

use virtdom_schema::Alias;
use virtdom_xml::{DecodeError, XmlElement};

#[test]
fn user_defined_alias_is_prefixed_on_the_wire() {
    let alias = Alias::user_defined("mydisk");
    assert_eq!(alias.to_xml(), r#"<alias name="ua-mydisk"/>"#);
}

#[test]
fn system_managed_alias_is_emitted_bare() {
    let alias = Alias::system_managed("mydisk");
    assert_eq!(alias.to_xml(), r#"<alias name="mydisk"/>"#);
}

#[test]
fn round_trip_restores_name_and_flag_for_both_kinds() {
    let user = Alias::from_xml(&Alias::user_defined("mydisk").to_xml())
        .unwrap();
    assert_eq!(user.name(), "mydisk");
    assert!(user.is_user_defined());

    let system =
        Alias::from_xml(&Alias::system_managed("mydisk").to_xml()).unwrap();
    assert_eq!(system.name(), "mydisk");
    assert!(!system.is_user_defined());

    // The flag never reaches the wire; the two forms differ only by
    // the prefix.
    assert_eq!(
        Alias::user_defined("mydisk").to_xml().replace("ua-", ""),
        Alias::system_managed("mydisk").to_xml()
    );
}

#[test]
fn flag_is_reconstructed_from_prefix_detection_alone() {
    let decoded = Alias::from_xml(r#"<alias name="ua-net0"/>"#).unwrap();
    assert_eq!(decoded, Alias::user_defined("net0"));

    let decoded = Alias::from_xml(r#"<alias name="balloon0"/>"#).unwrap();
    assert_eq!(decoded, Alias::system_managed("balloon0"));
}

#[test]
fn mismatched_root_element_is_rejected() {
    let err = Alias::from_xml("<domain/>").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnexpectedRoot { expected: "alias", .. }
    ));
}
