// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A small pretty-printing XML writer.
//!
//! Emits two-space indented documents, one element per line, with
//! double-quoted attributes. Childless elements are collapsed to the
//! self-closing form, and attributes whose value is the empty string are
//! skipped entirely; the schema treats empty strings as unset, so an
//! omitted attribute and an empty one mean the same thing on read-back.
//!
//! Writing cannot fail. Unbalanced start/end calls are a bug in the
//! caller and assert.

/// Streaming writer over an owned buffer. Obtain the document with
/// [`XmlWriter::finish`].
#[derive(Default)]
pub struct XmlWriter {
    buf: String,
    depth: usize,
    // Rendered "<tag attrs" line of the innermost element, held back until
    // we know whether it has children (collapse to "<tag/>") or not.
    pending: Option<String>,
    open: Vec<String>,
}

impl XmlWriter {
    pub fn new() -> XmlWriter {
        XmlWriter::default()
    }

    /// Opens `tag`. Attributes are written in slice order; empty values
    /// are skipped.
    pub fn start_element(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.flush_pending();
        let mut line = String::new();
        push_indent(&mut line, self.depth);
        line.push('<');
        line.push_str(tag);
        push_attrs(&mut line, attrs);
        self.pending = Some(line);
        self.open.push(tag.to_string());
    }

    /// Closes the innermost element, which must be `tag`.
    pub fn end_element(&mut self, tag: &str) {
        let top = self.open.pop();
        assert_eq!(top.as_deref(), Some(tag), "unbalanced element {tag:?}");
        if let Some(line) = self.pending.take() {
            self.buf.push_str(&line);
            self.buf.push_str("/>\n");
            return;
        }
        self.depth -= 1;
        push_indent(&mut self.buf, self.depth);
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
    }

    /// Writes `<tag attrs>text</tag>` on one line. Empty text degrades to
    /// a self-closing element.
    pub fn text_element(
        &mut self,
        tag: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) {
        if text.is_empty() {
            self.empty_element(tag, attrs);
            return;
        }
        self.flush_pending();
        push_indent(&mut self.buf, self.depth);
        self.buf.push('<');
        self.buf.push_str(tag);
        push_attrs(&mut self.buf, attrs);
        self.buf.push('>');
        push_escaped(&mut self.buf, text, false);
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
    }

    /// Writes a self-closing `<tag attrs/>`.
    pub fn empty_element(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.start_element(tag, attrs);
        self.end_element(tag);
    }

    /// Returns the finished document, without a trailing newline.
    pub fn finish(mut self) -> String {
        assert!(self.open.is_empty(), "unclosed element {:?}", self.open);
        while self.buf.ends_with('\n') {
            self.buf.pop();
        }
        self.buf
    }

    fn flush_pending(&mut self) {
        if let Some(line) = self.pending.take() {
            self.buf.push_str(&line);
            self.buf.push_str(">\n");
            self.depth += 1;
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn push_attrs(out: &mut String, attrs: &[(&str, &str)]) {
    for (name, value) in attrs {
        if value.is_empty() {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        push_escaped(out, value, true);
        out.push('"');
    }
}

fn push_escaped(out: &mut String, raw: &str, quote: bool) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote => out.push_str("&quot;"),
            // Literal control whitespace in an attribute value would be
            // normalized to a space by the parser; escape it so the exact
            // bytes come back.
            '\n' if quote => out.push_str("&#xA;"),
            '\r' if quote => out.push_str("&#xD;"),
            '\t' if quote => out.push_str("&#x9;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nests_with_two_space_indent() {
        let mut w = XmlWriter::new();
        w.start_element("a", &[("x", "1")]);
        w.start_element("b", &[]);
        w.text_element("c", &[("y", "2")], "text");
        w.end_element("b");
        w.empty_element("d", &[]);
        w.end_element("a");
        assert_eq!(
            w.finish(),
            "<a x=\"1\">\n  <b>\n    <c y=\"2\">text</c>\n  </b>\n  <d/>\n</a>"
        );
    }

    #[test]
    fn collapses_childless_elements() {
        let mut w = XmlWriter::new();
        w.start_element("outer", &[]);
        w.start_element("inner", &[("k", "v")]);
        w.end_element("inner");
        w.end_element("outer");
        assert_eq!(w.finish(), "<outer>\n  <inner k=\"v\"/>\n</outer>");
    }

    #[test]
    fn skips_empty_attributes_and_text() {
        let mut w = XmlWriter::new();
        w.text_element("e", &[("set", "x"), ("unset", "")], "");
        assert_eq!(w.finish(), "<e set=\"x\"/>");
    }

    #[test]
    fn escapes_markup_characters() {
        let mut w = XmlWriter::new();
        w.text_element("e", &[("a", "say \"no\" & <go>")], "1 < 2 & 3 > 2");
        assert_eq!(
            w.finish(),
            "<e a=\"say &quot;no&quot; &amp; &lt;go&gt;\">\
             1 &lt; 2 &amp; 3 &gt; 2</e>"
        );
    }

    #[test]
    fn escapes_control_whitespace_in_attribute_values() {
        let mut w = XmlWriter::new();
        w.text_element("e", &[("a", "one\ntwo\tthree\r")], "kept\nraw");
        assert_eq!(
            w.finish(),
            "<e a=\"one&#xA;two&#x9;three&#xD;\">kept\nraw</e>"
        );
    }

    #[test]
    #[should_panic(expected = "unbalanced element")]
    fn mismatched_end_asserts() {
        let mut w = XmlWriter::new();
        w.start_element("a", &[]);
        w.end_element("b");
    }

    #[test]
    #[should_panic(expected = "unclosed element")]
    fn finish_with_open_element_asserts() {
        let mut w = XmlWriter::new();
        w.start_element("a", &[]);
        let _ = w.finish();
    }
}
