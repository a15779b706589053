//! URL processing utilities.
//!
//! Pure string algebra for site URLs:
//! - Splitting into path, query and fragment
//! - Classification (absolute, rooted, query/fragment only)
//! - Combining a base with a relative URL (query strings are merged)
//! - `.`/`..` segment normalization with root-escape detection
//!
//! Components returned by the splitters keep their leading delimiter
//! (`?`, `#`), so concatenating them reproduces the input.

use std::borrow::Cow;

use smallvec::SmallVec;

use crate::address::AddressError;

/// Normalized path segments (borrowed from the input).
pub type Segments<'a> = SmallVec<[&'a str; 8]>;

/// Split a URL into path, query and fragment.
///
/// Splits on the first `#`, then on the first `?` before it. Query and
/// fragment keep their delimiter, or are empty.
///
/// # Examples
/// ```
/// use docaddr::utils::path::route::split_path_query_fragment;
/// assert_eq!(split_path_query_fragment("a/b?x=1#top"), ("a/b", "?x=1", "#top"));
/// assert_eq!(split_path_query_fragment("a/b#top?x"), ("a/b", "", "#top?x"));
/// assert_eq!(split_path_query_fragment("a/b"), ("a/b", "", ""));
/// ```
#[inline]
pub fn split_path_query_fragment(url: &str) -> (&str, &str, &str) {
    let (rest, fragment) = url.find('#').map_or((url, ""), |i| url.split_at(i));
    let (path, query) = rest.find('?').map_or((rest, ""), |i| rest.split_at(i));
    (path, query, fragment)
}

/// Split a URL into its path and everything after it (query and fragment).
#[inline]
pub fn split_path_suffix(url: &str) -> (&str, &str) {
    url.find(['?', '#']).map_or((url, ""), |i| url.split_at(i))
}

/// Split a URL into path and fragment (fragment without `#`).
///
/// # Examples
/// ```
/// use docaddr::utils::path::route::split_path_fragment;
/// assert_eq!(split_path_fragment("/about#team"), ("/about", "team"));
/// assert_eq!(split_path_fragment("/about"), ("/about", ""));
/// ```
#[inline]
pub fn split_path_fragment(url: &str) -> (&str, &str) {
    url.split_once('#').unwrap_or((url, ""))
}

/// Length of the URL scheme (excluding `:`), if the URL has one.
///
/// A valid scheme starts with an ASCII letter, contains only ASCII
/// alphanumerics or `+`, `-`, `.`, and ends before any `/`, `?` or `#`.
fn scheme_len(url: &str) -> Option<usize> {
    let end = url.find([':', '/', '?', '#'])?;
    let scheme = &url[..end];
    let valid = url[end..].starts_with(':')
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(end)
}

/// Check if a link is absolute: it has a URL scheme (`https:`, `mailto:`,
/// a drive letter such as `C:`) or is protocol-relative (`//host/...`).
///
/// # Examples
/// ```
/// use docaddr::utils::path::route::is_absolute;
/// assert!(is_absolute("https://example.com"));
/// assert!(is_absolute("mailto:user@example.com"));
/// assert!(is_absolute("//cdn.example.com/a.js"));
/// assert!(!is_absolute("/about"));
/// assert!(!is_absolute("./file.txt"));
/// ```
#[inline]
pub fn is_absolute(url: &str) -> bool {
    url.starts_with("//") || url.starts_with("\\\\") || scheme_len(url).is_some()
}

/// Check if a link is rooted at the site root (`/about`).
#[inline]
pub fn is_rooted(url: &str) -> bool {
    url.starts_with('/') || url.starts_with('\\')
}

/// Absolute and rooted URLs are never site-relative candidates.
#[inline]
pub fn is_absolute_or_rooted(url: &str) -> bool {
    is_rooted(url) || is_absolute(url)
}

/// Check if a URL carries only a query and/or fragment (`?v=2`, `#top`).
#[inline]
pub fn is_query_or_fragment_only(url: &str) -> bool {
    url.starts_with('?') || url.starts_with('#')
}

/// Split an absolute URL into its authority prefix and the rest.
///
/// `https://host:8080/a/b?q` -> (`https://host:8080`, `/a/b?q`)
/// `mailto:user@example.com` -> (`mailto:`, `user@example.com`)
/// `a/b` -> (``, `a/b`)
fn split_authority(url: &str) -> (&str, &str) {
    let after_scheme = match scheme_len(url) {
        Some(len) => len + 1,
        None if url.starts_with("//") => 0,
        None => return ("", url),
    };
    let rest = &url[after_scheme..];
    let Some(host) = rest.strip_prefix("//") else {
        return url.split_at(after_scheme);
    };
    let end = host.find(['/', '?', '#']).map_or(url.len(), |i| url.len() - host.len() + i);
    url.split_at(end)
}

/// Resolve `.` and `..` segments.
///
/// - `.` and empty segments are dropped
/// - `..` pops the preceding real segment
/// - a `..` with nothing to pop fails for rooted paths (`None`) and is kept
///   as a literal leading `..` for relative paths
///
/// # Examples
/// ```
/// use docaddr::utils::path::route::normalize_path_segments;
/// let segs = normalize_path_segments("a/./b/../c".split('/'), false).unwrap();
/// assert_eq!(segs.as_slice(), ["a", "c"]);
/// let segs = normalize_path_segments("../../a".split('/'), false).unwrap();
/// assert_eq!(segs.as_slice(), ["..", "..", "a"]);
/// assert!(normalize_path_segments("a/../../b".split('/'), true).is_none());
/// ```
pub fn normalize_path_segments<'a>(
    segments: impl IntoIterator<Item = &'a str>,
    rooted: bool,
) -> Option<Segments<'a>> {
    let mut out = Segments::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ if rooted => return None,
                _ => out.push(".."),
            },
            _ => out.push(segment),
        }
    }
    Some(out)
}

/// Whether a path denotes a directory (trailing `/`, `.` or `..`).
fn ends_as_directory(path: &str) -> bool {
    path.ends_with('/')
        || path == "."
        || path == ".."
        || path.ends_with("/.")
        || path.ends_with("/..")
}

/// Rebuild a path string from normalized segments.
fn join_segments(segments: &[&str], rooted: bool, directory: bool) -> String {
    let mut out = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum::<usize>() + 1);
    if rooted {
        out.push('/');
    }
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(segment);
    }
    if directory && !segments.is_empty() {
        out.push('/');
    }
    out
}

/// Normalize `.`/`..` in a path, keeping its leading and trailing slash.
///
/// Returns `None` if a rooted path would navigate above the root.
///
/// # Examples
/// ```
/// use docaddr::utils::path::route::try_normalize_path;
/// assert_eq!(try_normalize_path("a/b/../c/").as_deref(), Some("a/c/"));
/// assert_eq!(try_normalize_path("/a/./b").as_deref(), Some("/a/b"));
/// assert_eq!(try_normalize_path("../a").as_deref(), Some("../a"));
/// assert_eq!(try_normalize_path("/../a"), None);
/// ```
pub fn try_normalize_path(path: &str) -> Option<String> {
    let rooted = is_rooted(path);
    let segments = normalize_path_segments(path.split(['/', '\\']), rooted)?;
    Some(join_segments(&segments, rooted, ends_as_directory(path)))
}

/// Merge two query strings, base parameters first.
///
/// Parameters present on both sides are all kept.
fn merge_query(base: &str, relative: &str) -> String {
    let base = base.trim_start_matches('?');
    let relative = relative.trim_start_matches('?');
    match (base.is_empty(), relative.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("?{base}"),
        (true, false) => format!("?{relative}"),
        (false, false) => format!("?{base}&{relative}"),
    }
}

/// Combine a base URL with a relative URL.
///
/// - An empty `relative` returns `base` unchanged
/// - An absolute `relative` replaces the base entirely
/// - The relative path is appended to the base path (the base is treated as
///   a directory), or replaces it when it starts with `/`; the base
///   authority is always kept
/// - Query strings are merged: `?a=1` + `?b=2` -> `?a=1&b=2`
/// - The relative fragment wins when present, else the base fragment stays
///
/// Fails if the combined path of a rooted or absolute URL navigates above
/// the root. For relative bases, unresolvable `..` stays as a leading `..`.
///
/// # Examples
/// ```
/// use docaddr::utils::path::route::combine;
/// assert_eq!(combine("x?a=1", "y?b=2").unwrap(), "x/y?a=1&b=2");
/// assert_eq!(combine("https://h.com/api/", "/v2/x").unwrap(), "https://h.com/v2/x");
/// assert_eq!(combine("a/b#top", "c").unwrap(), "a/b/c#top");
/// assert!(combine("/a", "../../b").is_err());
/// ```
pub fn combine(base: &str, relative: &str) -> Result<String, AddressError> {
    if relative.is_empty() {
        return Ok(base.to_string());
    }
    if is_absolute(relative) {
        return Ok(relative.to_string());
    }

    let (authority, base_rest) = split_authority(base);
    let (base_path, base_query, base_fragment) = split_path_query_fragment(base_rest);
    let (rel_path, rel_query, rel_fragment) = split_path_query_fragment(relative);

    let joined: Cow<'_, str> = if rel_path.is_empty() {
        Cow::Borrowed(base_path)
    } else if is_rooted(rel_path) || base_path.is_empty() {
        Cow::Borrowed(rel_path)
    } else {
        Cow::Owned(format!("{}/{}", base_path.trim_end_matches('/'), rel_path))
    };

    let rooted = !authority.is_empty() || is_rooted(&joined);
    let path = if joined.is_empty() {
        String::new()
    } else {
        let segments = normalize_path_segments(joined.split(['/', '\\']), rooted)
            .ok_or_else(|| AddressError::AboveRoot(format!("{base} + {relative}")))?;
        join_segments(&segments, rooted, ends_as_directory(&joined))
    };

    let query = merge_query(base_query, rel_query);
    let fragment = if rel_fragment.is_empty() {
        base_fragment
    } else {
        rel_fragment
    };

    let mut out = String::with_capacity(authority.len() + path.len() + query.len() + fragment.len());
    out.push_str(authority);
    out.push_str(&path);
    out.push_str(&query);
    out.push_str(fragment);
    Ok(out)
}

/// Strip leading slashes from a URL path
///
/// # Examples
/// ```
/// use docaddr::utils::path::route::strip_leading_slash;
/// assert_eq!(strip_leading_slash("/blog/post"), "blog/post");
/// assert_eq!(strip_leading_slash("/"), "");
/// ```
#[inline]
pub fn strip_leading_slash(url: &str) -> &str {
    url.trim_start_matches('/')
}

/// Remove the file extension from the last path segment, if any.
///
/// Dot-files (`.config`) and dots in directory names are left alone.
///
/// # Examples
/// ```
/// use docaddr::utils::path::route::strip_extension;
/// assert_eq!(strip_extension("docs/page.html"), "docs/page");
/// assert_eq!(strip_extension("v1.2/page"), "v1.2/page");
/// assert_eq!(strip_extension(".config"), ".config");
/// ```
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}
