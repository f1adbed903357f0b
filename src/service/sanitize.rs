//! Input sanitizers applied to validated fields.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sanitizer {
    /// Strip tags and percent-encoded octets, collapse all whitespace to single spaces, trim.
    #[default]
    Text,
    /// As `Text` but line breaks are kept.
    Textarea,
    /// Pass through unchanged.
    Raw,
}

impl Sanitizer {
    /// Only strings are rewritten; other JSON values pass through.
    pub fn apply(self, value: &Value) -> Value {
        match (self, value) {
            (Sanitizer::Raw, v) => v.clone(),
            (s, Value::String(text)) => Value::String(sanitize_str(text, s == Sanitizer::Textarea)),
            (_, v) => v.clone(),
        }
    }
}

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script[^>]*>.*?</script\s*>|<style[^>]*>.*?</style\s*>").expect("static regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn octet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("static regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n\t ]+").expect("static regex"))
}

fn inline_whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\t ]+").expect("static regex"))
}

fn sanitize_str(input: &str, keep_newlines: bool) -> String {
    let no_scripts = script_style_re().replace_all(input, "");
    let mut out = tag_re().replace_all(&no_scripts, "").into_owned();
    // removing one octet can expose another ("%%4141" -> "%41")
    while octet_re().is_match(&out) {
        out = octet_re().replace_all(&out, "").into_owned();
    }
    let collapsed = if keep_newlines {
        inline_whitespace_re().replace_all(&out, " ")
    } else {
        whitespace_re().replace_all(&out, " ")
    };
    collapsed.trim().to_string()
}
