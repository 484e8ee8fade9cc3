//! HTML form extraction for the SSO handshake
//!
//! The identity provider drives its flow with plain HTML forms: each step
//! returns a page whose form must be re-submitted, pre-filled fields and
//! all, with the caller's credential fields merged in. This module pulls
//! the submit target and the `(name, value)` pairs out of such a page.
//!
//! "No form present" is a distinct failure from "form with no fields": the
//! former means the upstream page changed shape, the latter is a valid
//! (if unusual) step.

use once_cell::sync::Lazy;
use regex::Regex;
use skoleport_domain::{ClientError, Result};

static FORM_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<form\b[^>]*>").expect("static regex"));
static INPUT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<input\b[^>]*/?>").expect("static regex"));
static ACTION_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\baction\s*=\s*["']([^"']*)["']"#).expect("static regex"));
static NAME_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bname\s*=\s*["']([^"']*)["']"#).expect("static regex"));
static VALUE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bvalue\s*=\s*["']([^"']*)["']"#).expect("static regex"));

/// A login form as extracted from an upstream HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Submit target, entity-decoded (SAML actions routinely carry `&amp;`)
    pub action: String,
    /// All `(name, value)` pairs from inputs declaring both attributes
    pub fields: Vec<(String, String)>,
}

impl LoginForm {
    /// Extract the first form from an HTML document.
    ///
    /// # Errors
    /// Returns [`ClientError::MalformedPage`] when the document contains no
    /// form element or the form declares no action URL.
    pub fn parse(html: &str) -> Result<Self> {
        let form_match = FORM_TAG
            .find(html)
            .ok_or_else(|| ClientError::MalformedPage("no form element in page".into()))?;

        let action = ACTION_ATTR
            .captures(form_match.as_str())
            .map(|caps| decode_entities(&caps[1]))
            .ok_or_else(|| ClientError::MalformedPage("form without action url".into()))?;

        // Inputs are collected from the whole document rather than the form
        // body; upstream pages occasionally place hidden inputs outside the
        // form element that the server still expects back.
        let fields = INPUT_TAG
            .find_iter(html)
            .filter_map(|input| {
                let tag = input.as_str();
                let name = NAME_ATTR.captures(tag).map(|caps| decode_entities(&caps[1]))?;
                let value = VALUE_ATTR.captures(tag).map(|caps| decode_entities(&caps[1]))?;
                Some((name, value))
            })
            .collect();

        Ok(Self { action, fields })
    }

    /// Merge caller-supplied `(name, value)` overrides into the extracted
    /// fields. An override only applies where the form actually declares an
    /// input of that name; the caller's value then wins over the pre-filled
    /// one.
    pub fn apply_overrides(&mut self, overrides: &[(&str, &str)]) {
        for (name, value) in overrides {
            for field in self.fields.iter_mut().filter(|(n, _)| n == name) {
                field.1 = (*value).to_string();
            }
        }
    }
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
