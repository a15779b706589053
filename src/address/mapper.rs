//! Legacy path to URL redirects.

use std::borrow::Cow;

use parking_lot::RwLock;
use percent_encoding::percent_decode_str;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::AddressError;
use crate::utils::path::route::{combine, split_path_suffix, strip_extension};

/// Case-insensitive map from old paths to their new URLs.
///
/// A lookup tries, in order: the path as given, its percent-decoded form,
/// the path without extension, the decoded path without extension.
#[derive(Debug, Default)]
pub struct PathToUrlMapper {
    urls: RwLock<FxHashMap<String, String>>,
}

impl PathToUrlMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `path` to `url`. Paths differing only in case collide.
    pub fn add(&self, path: &str, url: impl Into<String>) -> Result<(), AddressError> {
        let key = path.trim().to_lowercase();
        let mut urls = self.urls.write();
        if urls.contains_key(&key) {
            return Err(AddressError::DuplicateMapping(path.to_string()));
        }
        urls.insert(key, url.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.urls.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.read().is_empty()
    }

    /// New URL for `path`, keeping the query and fragment the caller passed.
    pub fn try_get_url(&self, path: &str) -> Option<String> {
        let (raw, suffix) = split_path_suffix(path.trim());
        let raw = raw.to_lowercase();
        let decoded = percent_decode_str(&raw).decode_utf8_lossy();

        let mut candidates: SmallVec<[&str; 4]> = SmallVec::new();
        for candidate in [
            raw.as_str(),
            decoded.as_ref(),
            strip_extension(&raw),
            strip_extension(&decoded),
        ] {
            if !candidate.is_empty() && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }

        let urls = self.urls.read();
        let (matched, url) = candidates
            .iter()
            .find_map(|c| urls.get(*c).map(|url| (*c, url)))?;
        if matched != raw {
            debug!("redirect"; "`{}` matched as `{}`", path, matched);
        }
        Some(with_suffix(url, suffix).into_owned())
    }
}

/// Append the caller's query and fragment to a mapped URL.
fn with_suffix<'a>(url: &'a str, suffix: &str) -> Cow<'a, str> {
    if suffix.is_empty() {
        return Cow::Borrowed(url);
    }
    match combine(url, suffix) {
        Ok(combined) => Cow::Owned(combined),
        Err(_) => Cow::Owned(format!("{url}{suffix}")),
    }
}
