// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device aliases.
//!
//! The hypervisor tracks every device under an alias. Aliases chosen by the
//! manager are marked user-defined and carry a `ua-` prefix on the wire so
//! the hypervisor treats them as stable identifiers; aliases the hypervisor
//! assigned itself have no prefix. In memory the name is always stored
//! unprefixed, so lookups never have to care where an alias came from.

use serde::{Deserialize, Serialize};

const USER_ALIAS_PREFIX: &str = "ua-";

/// An alias of a domain device.
///
/// The fields are private on purpose: the only way the prefix and the
/// user-defined flag can change is through the constructors and
/// [`Alias::from_wire_name`], which keeps the two in agreement.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Alias {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "UserDefined")]
    user_defined: bool,
}

impl Alias {
    /// Returns an alias chosen by the manager. It will carry the user
    /// alias prefix on the wire.
    pub fn user_defined(name: &str) -> Alias {
        Alias { name: name.to_string(), user_defined: true }
    }

    /// Returns an alias as assigned by the hypervisor itself.
    pub fn system_managed(name: &str) -> Alias {
        Alias { name: name.to_string(), user_defined: false }
    }

    /// The unprefixed alias name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_user_defined(&self) -> bool {
        self.user_defined
    }

    /// The name as it appears in domain XML, prefix included.
    pub fn wire_name(&self) -> String {
        if self.user_defined {
            format!("{}{}", USER_ALIAS_PREFIX, self.name)
        } else {
            self.name.clone()
        }
    }

    /// Rebuilds an alias from its XML form, deriving the user-defined flag
    /// from the presence of the prefix.
    pub fn from_wire_name(wire_name: &str) -> Alias {
        match wire_name.strip_prefix(USER_ALIAS_PREFIX) {
            Some(name) => Alias::user_defined(name),
            None => Alias::system_managed(wire_name),
        }
    }
}

#[cfg(test)]
mod test {
    use serde_test::{assert_tokens, Token};

    use super::*;

    #[test]
    fn wire_name_carries_prefix_only_when_user_defined() {
        assert_eq!(Alias::user_defined("alias0").wire_name(), "ua-alias0");
        assert_eq!(Alias::system_managed("alias0").wire_name(), "alias0");
    }

    #[test]
    fn from_wire_name_restores_flag_and_name() {
        let user = Alias::from_wire_name("ua-alias0");
        assert_eq!(user.name(), "alias0");
        assert!(user.is_user_defined());
        assert_eq!(user, Alias::user_defined("alias0"));

        let system = Alias::from_wire_name("alias0");
        assert_eq!(system.name(), "alias0");
        assert!(!system.is_user_defined());
        assert_eq!(system, Alias::system_managed("alias0"));
    }

    #[test]
    fn wire_round_trip_preserves_both_kinds() {
        for alias in
            [Alias::user_defined("alias0"), Alias::system_managed("alias0")]
        {
            assert_eq!(Alias::from_wire_name(&alias.wire_name()), alias);
        }
    }

    #[test]
    fn json_exposes_private_fields_by_fixed_names() {
        let system = Alias::system_managed("alias0");
        assert_eq!(
            serde_json::to_string(&system).unwrap(),
            r#"{"Name":"alias0","UserDefined":false}"#
        );

        let user = Alias::user_defined("alias0");
        assert_eq!(
            serde_json::to_string(&user).unwrap(),
            r#"{"Name":"alias0","UserDefined":true}"#
        );

        let decoded: Alias =
            serde_json::from_str(r#"{"Name":"alias0","UserDefined":true}"#)
                .unwrap();
        assert_eq!(decoded.name(), "alias0");
        assert!(decoded.is_user_defined());
    }

    #[test]
    fn json_flag_defaults_to_system_managed() {
        let decoded: Alias =
            serde_json::from_str(r#"{"Name":"alias0"}"#).unwrap();
        assert_eq!(decoded, Alias::system_managed("alias0"));
    }

    #[test]
    fn serde_tokens() {
        let alias = Alias::user_defined("alias0");
        assert_tokens(
            &alias,
            &[
                Token::Struct { name: "Alias", len: 2 },
                Token::Str("Name"),
                Token::Str("alias0"),
                Token::Str("UserDefined"),
                Token::Bool(true),
                Token::StructEnd,
            ],
        );
    }
}
