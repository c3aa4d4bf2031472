//! # Transform Module
//!
//! The bundled declarative transform that inlines externalized parameters.
//!
//! The transform is an identity copy of the flow definition in which every
//! `{{key}}` placeholder found in an attribute value, text node or CDATA
//! section is replaced by the value of `key`. Placeholders for keys that are
//! not defined stay as they are. Events without placeholders are copied
//! byte-for-byte.
//!
//! The transform has a fixed identity and is never supplied by the user.

use crate::{Parameters, ParametersError};
use quick_xml::events::{BytesCData, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A placeholder-substitution transform over XML documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterTransform {
    identity: &'static str,
    open: &'static str,
    close: &'static str,
}

/// The one transform applied to flow definitions.
pub const REPLACE_EXTERNAL_PARAMETERS: ParameterTransform = ParameterTransform {
    identity: "replace-external-parameters",
    open: "{{",
    close: "}}",
};

impl ParameterTransform {
    /// Fixed identity of this transform.
    #[must_use]
    pub const fn identity(&self) -> &'static str {
        self.identity
    }

    /// Rewrite `document`, passing the whole parameter map as one input.
    ///
    /// Fails with `ParametersError::TransformFailed` if the document is not
    /// well-formed.
    pub fn apply(
        &self,
        document: &[u8],
        parameters: &Parameters,
    ) -> Result<Vec<u8>, ParametersError> {
        let mut reader = Reader::from_reader(document);
        let mut writer = Writer::new(Vec::with_capacity(document.len()));
        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut seen_root = false;

        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(failed(format!(
                        "{e} (at byte {})",
                        reader.buffer_position()
                    )));
                }
            };

            let out = match event {
                Event::Eof => break,
                Event::Start(start) => {
                    if depth == 0 && seen_root {
                        return Err(failed("multiple root elements".to_string()));
                    }
                    depth += 1;
                    seen_root = true;
                    Event::Start(self.rewrite_start(start, parameters)?)
                }
                Event::Empty(start) => {
                    if depth == 0 && seen_root {
                        return Err(failed("multiple root elements".to_string()));
                    }
                    seen_root = true;
                    Event::Empty(self.rewrite_start(start, parameters)?)
                }
                Event::End(end) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| failed("unmatched end tag".to_string()))?;
                    Event::End(end)
                }
                Event::Text(text) => {
                    let replaced = {
                        let unescaped = text.unescape().map_err(|e| failed(e.to_string()))?;
                        outside_root(depth, &unescaped)?;
                        self.substitute(&unescaped, parameters)
                    };
                    match replaced {
                        Some(value) => Event::Text(BytesText::new(&value).into_owned()),
                        None => Event::Text(text),
                    }
                }
                Event::CData(cdata) => {
                    let replaced = {
                        let content =
                            std::str::from_utf8(&cdata).map_err(|e| failed(e.to_string()))?;
                        outside_root(depth, content)?;
                        self.substitute(content, parameters)
                    };
                    match replaced {
                        Some(value) => Event::CData(BytesCData::new(value)),
                        None => Event::CData(cdata),
                    }
                }
                other => other,
            };

            writer
                .write_event(out)
                .map_err(|e| failed(e.to_string()))?;
            buf.clear();
        }

        if depth != 0 {
            return Err(failed(format!("{depth} unclosed element(s)")));
        }
        if !seen_root {
            return Err(failed("document has no root element".to_string()));
        }

        Ok(writer.into_inner())
    }

    /// Rebuild a start tag only if one of its attribute values changes.
    fn rewrite_start<'a>(
        &self,
        start: BytesStart<'a>,
        parameters: &Parameters,
    ) -> Result<BytesStart<'a>, ParametersError> {
        let mut changed = false;
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| failed(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| failed(e.to_string()))?
                .to_string();
            let value = attr.unescape_value().map_err(|e| failed(e.to_string()))?;
            match self.substitute(&value, parameters) {
                Some(replaced) => {
                    changed = true;
                    attributes.push((key, replaced));
                }
                None => attributes.push((key, value.into_owned())),
            }
        }

        if !changed {
            return Ok(start);
        }

        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| failed(e.to_string()))?
            .to_string();
        let mut rewritten = BytesStart::new(name);
        for (key, value) in &attributes {
            rewritten.push_attribute((key.as_str(), value.as_str()));
        }
        Ok(rewritten)
    }

    /// Replace known placeholders in `text`.
    ///
    /// Returns `None` when nothing was replaced.
    #[must_use]
    pub fn substitute(&self, text: &str, parameters: &Parameters) -> Option<String> {
        let mut out = String::new();
        let mut rest = text;
        let mut replaced = false;

        while let Some(start) = rest.find(self.open) {
            let after_open = &rest[start + self.open.len()..];
            let Some(end) = after_open.find(self.close) else {
                break;
            };
            let key = &after_open[..end];
            match parameters.get(key) {
                Some(value) => {
                    out.push_str(&rest[..start]);
                    out.push_str(value);
                    rest = &after_open[end + self.close.len()..];
                    replaced = true;
                }
                None => {
                    out.push_str(&rest[..start + self.open.len()]);
                    rest = after_open;
                }
            }
        }

        if !replaced {
            return None;
        }
        out.push_str(rest);
        Some(out)
    }
}

/// Only whitespace may appear between top-level markup.
fn outside_root(depth: usize, text: &str) -> Result<(), ParametersError> {
    if depth == 0 && !text.trim().is_empty() {
        return Err(failed("text outside root element".to_string()));
    }
    Ok(())
}

fn failed(reason: String) -> ParametersError {
    ParametersError::TransformFailed(reason)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs.iter().copied().collect()
    }

    fn apply(doc: &str, pairs: &[(&str, &str)]) -> Result<String, ParametersError> {
        REPLACE_EXTERNAL_PARAMETERS
            .apply(doc.as_bytes(), &params(pairs))
            .map(|bytes| String::from_utf8(bytes).expect("utf8 output"))
    }

    #[test]
    fn identity_is_fixed() {
        assert_eq!(
            REPLACE_EXTERNAL_PARAMETERS.identity(),
            "replace-external-parameters"
        );
    }

    #[test]
    fn substitute_replaces_known_placeholders() {
        let p = params(&[("greeting", "hello"), ("who", "world")]);
        let out = REPLACE_EXTERNAL_PARAMETERS.substitute("{{greeting}}, {{who}}!", &p);
        assert_eq!(out.as_deref(), Some("hello, world!"));
    }

    #[test]
    fn substitute_keeps_unknown_placeholders() {
        let p = params(&[("greeting", "hello")]);
        let out = REPLACE_EXTERNAL_PARAMETERS.substitute("{{other}} {{greeting}}", &p);
        assert_eq!(out.as_deref(), Some("{{other}} hello"));
        assert_eq!(REPLACE_EXTERNAL_PARAMETERS.substitute("{{other}}", &p), None);
    }

    #[test]
    fn substitute_ignores_unterminated_placeholder() {
        let p = params(&[("a", "1")]);
        assert_eq!(REPLACE_EXTERNAL_PARAMETERS.substitute("{{a", &p), None);
    }

    #[test]
    fn text_placeholders_are_replaced() {
        let out = apply(
            "<flow><value>{{greeting}}</value></flow>",
            &[("greeting", "hello")],
        )
        .expect("transform");
        assert_eq!(out, "<flow><value>hello</value></flow>");
    }

    #[test]
    fn attribute_placeholders_are_replaced_and_escaped() {
        let out = apply(
            r#"<flow><step address="{{url}}" id="1"/></flow>"#,
            &[("url", "http://h/?a=1&b=2")],
        )
        .expect("transform");
        assert_eq!(
            out,
            r#"<flow><step address="http://h/?a=1&amp;b=2" id="1"/></flow>"#
        );
    }

    #[test]
    fn replacement_text_is_escaped() {
        let out = apply("<v>{{x}}</v>", &[("x", "a<b")]).expect("transform");
        assert_eq!(out, "<v>a&lt;b</v>");
    }

    #[test]
    fn untouched_document_is_copied_verbatim() {
        let doc = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                   <!-- note -->\n<flow a='1'>\n  <v>&amp;{{none}}</v>\n</flow>";
        let out = apply(doc, &[("greeting", "hello")]).expect("transform");
        assert_eq!(out, doc);
    }

    #[test]
    fn cdata_placeholders_are_replaced() {
        let out = apply("<s><![CDATA[x={{v}}]]></s>", &[("v", "1")]).expect("transform");
        assert_eq!(out, "<s><![CDATA[x=1]]></s>");
    }

    #[test]
    fn mismatched_tags_fail() {
        let result = apply("<a><b></a>", &[]);
        assert!(matches!(result, Err(ParametersError::TransformFailed(_))));
    }

    #[test]
    fn second_root_fails() {
        for doc in ["<a/><b/>", "<a>{{g}}</a><b/>", "<a></a><b>{{g}}</b>"] {
            let result = apply(doc, &[("g", "h")]);
            assert!(
                matches!(result, Err(ParametersError::TransformFailed(_))),
                "{doc}: {result:?}"
            );
        }
    }

    #[test]
    fn text_outside_root_fails() {
        for doc in ["junk<a/>", "junk<a>{{g}}</a>", "<a/>tail", "<![CDATA[x]]><a/>"] {
            let result = apply(doc, &[("g", "h")]);
            assert!(
                matches!(result, Err(ParametersError::TransformFailed(_))),
                "{doc}: {result:?}"
            );
        }
    }

    #[test]
    fn whitespace_around_root_is_kept() {
        let doc = "<?xml version=\"1.0\"?>\n<a>{{g}}</a>\n";
        let out = apply(doc, &[("g", "h")]).expect("transform");
        assert_eq!(out, "<?xml version=\"1.0\"?>\n<a>h</a>\n");
    }

    #[test]
    fn unclosed_root_fails() {
        let result = apply("<a><b/>", &[]);
        assert!(matches!(result, Err(ParametersError::TransformFailed(_))));
    }

    #[test]
    fn empty_document_fails() {
        let result = apply("", &[]);
        assert!(matches!(result, Err(ParametersError::TransformFailed(_))));
    }
}
