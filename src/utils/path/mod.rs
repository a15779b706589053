//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`route`]: URL algebra (`split_path_query_fragment`, `combine`, `try_normalize_path`)
//! - [`slug`]: Segment and anchor sanitization (`Escape`, `ascii_slug`)

pub mod route;
pub mod slug;
