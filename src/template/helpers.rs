//! Escaping and the helpers callable from templates.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\n|\r").expect("line break pattern"));

/// HTML-escape an interpolated value.
pub fn escape_expression(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'', '`', '=']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape `text`, then turn every line break into `<br>`.
pub fn nl2br(text: &str) -> String {
    let escaped = escape_expression(text);
    LINE_BREAK.replace_all(&escaped, "<br>").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    Nl2br,
}

impl Helper {
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "nl2br" => Some(Helper::Nl2br),
            _ => None,
        }
    }

    pub fn apply(self, arg: &str) -> String {
        match self {
            Helper::Nl2br => nl2br(arg),
        }
    }
}
