//! Path segment and anchor sanitization.
//!
//! Code-element names and topic ids become file names and URL fragments.
//! Characters that are invalid in file names or that carry meaning in URLs
//! are replaced according to an [`Escape`] policy.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};

/// Replacement policy for characters that cannot appear in a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Replace with `_`.
    Underscore,
    /// Replace with `-`.
    Dash,
    /// Keep the raw name on disk; percent-encode it in URLs.
    Percent,
}

/// Characters meaningful inside a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Everything except unreserved characters.
const ANCHOR: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Whether `c` must be replaced inside a path segment.
#[inline]
fn is_invalid_segment_char(c: char) -> bool {
    c.is_control() || matches!(c, ' ' | '"' | '#' | '%' | '*' | '/' | ':' | '<' | '>' | '?' | '\\' | '|')
}

/// Whether `c` cannot appear in a file name.
#[inline]
fn is_invalid_file_char(c: char) -> bool {
    c.is_control() || matches!(c, '"' | '*' | '/' | ':' | '<' | '>' | '?' | '\\' | '|')
}

impl Escape {
    const fn replacement(self) -> char {
        match self {
            Self::Underscore => '_',
            Self::Dash | Self::Percent => '-',
        }
    }

    /// Sanitize a single path segment (the on-disk name).
    ///
    /// The generic-arity backtick (``List`1``) becomes `-`. Under
    /// [`Percent`](Self::Percent) only characters invalid in file names are
    /// replaced; the URL form comes from [`url_path`](Self::url_path).
    ///
    /// # Examples
    /// ```
    /// use docaddr::utils::path::slug::Escape;
    /// assert_eq!(Escape::Underscore.segment("List`1"), "List-1");
    /// assert_eq!(Escape::Underscore.segment("a:b"), "a_b");
    /// assert_eq!(Escape::Percent.segment("List`1"), "List`1");
    /// assert_eq!(Escape::Percent.segment("a:b"), "a-b");
    /// ```
    pub fn segment(self, name: &str) -> Cow<'_, str> {
        if let Self::Percent = self {
            return replace_chars(name, is_invalid_file_char, '-');
        }
        if !name.chars().any(|c| c == '`' || is_invalid_segment_char(c)) {
            return Cow::Borrowed(name);
        }
        let replacement = self.replacement();
        name.chars()
            .map(|c| match c {
                '`' => '-',
                c if is_invalid_segment_char(c) => replacement,
                c => c,
            })
            .collect::<String>()
            .into()
    }

    /// URL form of a page path built from [`segment`](Self::segment)s.
    ///
    /// # Examples
    /// ```
    /// use docaddr::utils::path::slug::Escape;
    /// assert_eq!(Escape::Percent.url_path("100% done/a b"), "100%25%20done/a%20b");
    /// assert_eq!(Escape::Dash.url_path("Foo.Bar/Baz"), "Foo.Bar/Baz");
    /// ```
    pub fn url_path(self, path: &str) -> Cow<'_, str> {
        match self {
            Self::Percent => utf8_percent_encode(path, SEGMENT).into(),
            Self::Underscore | Self::Dash => Cow::Borrowed(path),
        }
    }

    /// Sanitize a URL fragment (anchor id).
    ///
    /// Anchors keep ASCII alphanumerics, `-` and `_`; everything else is
    /// replaced (or percent-encoded).
    ///
    /// # Examples
    /// ```
    /// use docaddr::utils::path::slug::Escape;
    /// assert_eq!(Escape::Underscore.anchor("Qux"), "Qux");
    /// assert_eq!(Escape::Underscore.anchor("Qux(System.Int32)"), "Qux_System_Int32_");
    /// assert_eq!(Escape::Percent.anchor("Qux(A)"), "Qux%28A%29");
    /// ```
    pub fn anchor(self, id: &str) -> Cow<'_, str> {
        if let Self::Percent = self {
            return utf8_percent_encode(id, ANCHOR).into();
        }
        let keep = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if id.chars().all(keep) {
            return Cow::Borrowed(id);
        }
        let replacement = self.replacement();
        id.chars()
            .map(|c| if keep(c) { c } else { replacement })
            .collect::<String>()
            .into()
    }
}

fn replace_chars(text: &str, invalid: fn(char) -> bool, replacement: char) -> Cow<'_, str> {
    if !text.chars().any(invalid) {
        return Cow::Borrowed(text);
    }
    text.chars()
        .map(|c| if invalid(c) { replacement } else { c })
        .collect::<String>()
        .into()
}

/// Transliterate to ASCII and collapse whitespace runs into `separator`.
///
/// # Examples
/// ```
/// use docaddr::utils::path::slug::ascii_slug;
/// assert_eq!(ascii_slug("Getting  Started", '-'), "Getting-Started");
/// assert_eq!(ascii_slug("Überblick", '-'), "Uberblick");
/// ```
pub fn ascii_slug(text: &str, separator: char) -> String {
    let ascii = deunicode::deunicode(text);
    collapse_whitespace(&ascii, separator)
}

/// Collapse whitespace runs into `separator`, trimming both ends.
pub fn collapse_whitespace(text: &str, separator: char) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(separator);
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_borrowed_when_clean() {
        assert!(matches!(Escape::Underscore.segment("Foo.Bar"), Cow::Borrowed("Foo.Bar")));
        assert!(matches!(Escape::Dash.segment("Baz"), Cow::Borrowed("Baz")));
    }

    #[test]
    fn test_segment_replacements() {
        assert_eq!(Escape::Underscore.segment("a<b>|c"), "a_b__c");
        assert_eq!(Escape::Dash.segment("a<b>"), "a-b-");
        assert_eq!(Escape::Dash.segment("Dictionary`2"), "Dictionary-2");
        assert_eq!(Escape::Percent.segment("Dictionary`2"), "Dictionary`2");
        assert_eq!(Escape::Percent.segment("100%"), "100%");
        assert_eq!(Escape::Percent.segment("a<b>"), "a-b-");
    }

    #[test]
    fn test_url_path_decodes_to_file_name() {
        for name in ["Dictionary`2", "100%", "Über uns", "a#b?c"] {
            let file = Escape::Percent.segment(name);
            let url = Escape::Percent.url_path(&file);
            let decoded = percent_encoding::percent_decode_str(&url).decode_utf8().unwrap();
            assert_eq!(decoded, file, "{name}");
        }
        assert_eq!(Escape::Percent.url_path("Foo.List`1.md"), "Foo.List%601.md");
        assert!(matches!(Escape::Underscore.url_path("a b"), Cow::Borrowed("a b")));
    }

    #[test]
    fn test_anchor_replacements() {
        assert_eq!(Escape::Dash.anchor("Op_Addition(A,B)"), "Op_Addition-A-B-");
        assert_eq!(
            Escape::Underscore.anchor("System#IDisposable#Dispose"),
            "System_IDisposable_Dispose"
        );
        assert_eq!(Escape::Percent.anchor("a.b~c"), "a.b~c");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b  ", '_'), "a_b");
        assert_eq!(collapse_whitespace("", '-'), "");
    }
}
