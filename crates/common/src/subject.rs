//! Punishment subject identity.

use serde::{Deserialize, Serialize};

/// The identity of a punishment subject.
///
/// A subject may be known by up to three partially-overlapping keys: an
/// opaque account identifier, a staff-typed display name, and a network
/// address. Lookups resolve in a fixed order regardless of which
/// components a call site happens to supply: account id first, then
/// address, then display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectKey {
    /// Opaque account identifier, when the subject resolved to an account.
    pub account_id: Option<String>,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Textual IPv4/IPv6 address.
    pub address: Option<String>,
}

impl SubjectKey {
    /// Create a subject key from an account identifier.
    #[must_use]
    pub fn from_account_id(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            ..Self::default()
        }
    }

    /// Create a subject key from a display name.
    #[must_use]
    pub fn from_display_name(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }

    /// Create a subject key from a network address.
    #[must_use]
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Attach an address to this key.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Attach a display name to this key.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Account id component, blank values treated as absent.
    #[must_use]
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Display name component, blank values treated as absent.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Address component, blank values treated as absent.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Whether no usable component is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.account_id().is_none() && self.display_name().is_none() && self.address().is_none()
    }

    /// The display name to record for this subject.
    ///
    /// Falls back to `"IP <address>"` when only an address is known and
    /// `"Unknown"` when nothing usable was supplied.
    #[must_use]
    pub fn display_name_or_synthesized(&self) -> String {
        if let Some(name) = self.display_name() {
            return name.to_string();
        }
        self.address()
            .map_or_else(|| "Unknown".to_string(), |addr| format!("IP {addr}"))
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.display_name() {
            return write!(f, "{name}");
        }
        if let Some(id) = self.account_id() {
            return write!(f, "account:{id}");
        }
        if let Some(addr) = self.address() {
            return write!(f, "IP {addr}");
        }
        write!(f, "Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_components_are_absent() {
        let subject = SubjectKey {
            account_id: Some(String::new()),
            display_name: Some("  ".to_string()),
            address: None,
        };
        assert!(subject.is_empty());
        assert_eq!(subject.account_id(), None);
    }

    #[test]
    fn test_display_name_synthesis() {
        let named = SubjectKey::from_display_name("Steve");
        assert_eq!(named.display_name_or_synthesized(), "Steve");

        let addressed = SubjectKey::from_address("1.2.3.4");
        assert_eq!(addressed.display_name_or_synthesized(), "IP 1.2.3.4");

        let nothing = SubjectKey::default();
        assert_eq!(nothing.display_name_or_synthesized(), "Unknown");
    }

    #[test]
    fn test_display_renders_best_component() {
        let subject = SubjectKey::from_account_id("a1").with_display_name("Alex");
        assert_eq!(subject.to_string(), "Alex");

        let subject = SubjectKey::from_account_id("a1");
        assert_eq!(subject.to_string(), "account:a1");
    }
}
