// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XML codec for the virtdom domain schema.
//!
//! The hypervisor management library speaks an XML grammar; this crate
//! translates between it and the `virtdom-schema` types. Encoding walks
//! the tree and emits an indented document through [`XmlWriter`];
//! decoding parses with `roxmltree` and rebuilds the tree, skipping
//! whatever it does not recognize so that hypervisor-annotated documents
//! read back cleanly.
//!
//! The two directions are inverses: for any schema value,
//! `from_xml(to_xml(v))` reconstructs `v` exactly, including collection
//! order, verbatim unit tokens and the absent-versus-empty distinction.

use std::num::ParseIntError;

use thiserror::Error;
use virtdom_schema::{Alias, DomainSpec, LaunchSecurity};

mod decode;
mod encode;
mod writer;

pub use writer::XmlWriter;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Cannot parse xml document: {0}")]
    Syntax(#[from] roxmltree::Error),
    #[error("Unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot { expected: &'static str, found: String },
    #[error(
        "Invalid value {value:?} for attribute {attribute:?} of <{element}>"
    )]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Invalid text {value:?} in <{element}>")]
    InvalidText {
        element: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// A schema type with a domain XML representation of its own.
pub trait XmlElement: Sized {
    /// Tag of the element this type maps to, also required of the root
    /// element when parsing a standalone document.
    const TAG: &'static str;

    /// Writes the element (and its subtree) to `writer`.
    fn write_element(&self, writer: &mut XmlWriter);

    /// Rebuilds the value from a parsed element node.
    fn read_element(node: roxmltree::Node<'_, '_>)
        -> Result<Self, DecodeError>;

    /// Renders a standalone document.
    fn to_xml(&self) -> String {
        let mut writer = XmlWriter::new();
        self.write_element(&mut writer);
        writer.finish()
    }

    /// Parses a standalone document whose root element must be
    /// [`XmlElement::TAG`].
    fn from_xml(text: &str) -> Result<Self, DecodeError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();
        if root.tag_name().name() != Self::TAG {
            return Err(DecodeError::UnexpectedRoot {
                expected: Self::TAG,
                found: root.tag_name().name().to_string(),
            });
        }
        Self::read_element(root)
    }
}

impl XmlElement for DomainSpec {
    const TAG: &'static str = "domain";

    fn write_element(&self, writer: &mut XmlWriter) {
        encode::write_domain_spec(writer, self);
    }

    fn read_element(
        node: roxmltree::Node<'_, '_>,
    ) -> Result<Self, DecodeError> {
        decode::read_domain_spec(node)
    }
}

impl XmlElement for Alias {
    const TAG: &'static str = "alias";

    fn write_element(&self, writer: &mut XmlWriter) {
        encode::write_alias(writer, self);
    }

    fn read_element(
        node: roxmltree::Node<'_, '_>,
    ) -> Result<Self, DecodeError> {
        Ok(decode::read_alias(node))
    }
}

impl XmlElement for LaunchSecurity {
    const TAG: &'static str = "launchSecurity";

    fn write_element(&self, writer: &mut XmlWriter) {
        encode::write_launch_security(writer, self);
    }

    fn read_element(
        node: roxmltree::Node<'_, '_>,
    ) -> Result<Self, DecodeError> {
        Ok(decode::read_launch_security(node))
    }
}
