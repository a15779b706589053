//! Page granularity flags.

use bitflags::bitflags;

bitflags! {
    /// Which entity kinds get a page of their own.
    ///
    /// Entities whose kind is not included are folded into their parent's
    /// page as a URL fragment (members into types, types into namespaces).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Granularity: u8 {
        const NAMESPACE = 1;
        const TYPE = 1 << 1;
        const MEMBER = 1 << 2;
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self::NAMESPACE | Self::TYPE
    }
}

impl Granularity {
    /// Parse a single level name (`namespace`, `type`, `member`).
    pub fn from_level(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "namespace" | "namespaces" => Some(Self::NAMESPACE),
            "type" | "types" => Some(Self::TYPE),
            "member" | "members" => Some(Self::MEMBER),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let g = Granularity::default();
        assert!(g.contains(Granularity::NAMESPACE));
        assert!(g.contains(Granularity::TYPE));
        assert!(!g.contains(Granularity::MEMBER));
    }

    #[test]
    fn test_from_level() {
        assert_eq!(Granularity::from_level("Type"), Some(Granularity::TYPE));
        assert_eq!(Granularity::from_level(" members "), Some(Granularity::MEMBER));
        assert_eq!(Granularity::from_level("page"), None);

        // Flag names (generated by `bitflags!`) stay distinct from level names
        assert_eq!(Granularity::from_name("MEMBER"), Some(Granularity::MEMBER));
        assert_eq!(Granularity::from_name("members"), None);
    }
}
