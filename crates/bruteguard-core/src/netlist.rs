//! Static allow/deny overrides expressed as CIDR subnets.
//!
//! A [`SubnetList`] stores subnet strings exactly as given. Uniqueness is
//! by string, not by the network they denote: `10.0.0.0/8` and
//! `10.0.0.1/8` are two different entries. Membership tests parse every
//! entry on the fly and stop at the first malformed one.

use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::sync::{PoisonError, RwLock};

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Which override list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Deny,
    Allow,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Deny => "deny",
            ListKind::Allow => "allow",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a single address for a membership test.
pub fn parse_address(address: &str) -> CoreResult<IpAddr> {
    address
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidAddress(address.to_string()))
}

/// Checks that `subnet` is valid CIDR notation (`addr/prefix`).
pub fn validate_subnet(subnet: &str) -> CoreResult<()> {
    parse_subnet(subnet).map(|_| ())
}

fn parse_subnet(subnet: &str) -> CoreResult<IpNet> {
    subnet
        .parse()
        .map_err(|_| CoreError::InvalidSubnet(subnet.to_string()))
}

/// Returns the first entry whose network contains `address`.
///
/// Entries are scanned in iteration order. A malformed entry aborts the
/// scan with [`CoreError::InvalidSubnet`], even if a later entry would
/// have matched.
pub fn find_match<'a, I>(entries: I, address: IpAddr) -> CoreResult<Option<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    for entry in entries {
        let net = parse_subnet(entry).inspect_err(|_| {
            tracing::warn!(subnet = entry, "stored subnet does not parse, membership test aborted");
        })?;
        if net.contains(&address) {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// A set of subnet strings with reader-writer locking.
///
/// Concurrent [`contains`](Self::contains) calls proceed together;
/// [`add`](Self::add) and [`remove`](Self::remove) are exclusive.
#[derive(Debug, Default)]
pub struct SubnetList {
    entries: RwLock<HashSet<String>>,
}

impl SubnetList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `subnet`.
    ///
    /// # Errors
    ///
    /// [`CoreError::AlreadyExists`] if the exact string is already present.
    pub fn add(&self, subnet: &str) -> CoreResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains(subnet) {
            return Err(CoreError::AlreadyExists(subnet.to_string()));
        }
        entries.insert(subnet.to_string());
        Ok(())
    }

    /// Removes `subnet`.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] if the exact string is absent.
    pub fn remove(&self, subnet: &str) -> CoreResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.remove(subnet) {
            return Err(CoreError::NotFound(subnet.to_string()));
        }
        Ok(())
    }

    /// Returns `true` if any entry's network contains `address`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidAddress`] if `address` is not an IP address.
    /// - [`CoreError::InvalidSubnet`] if a stored entry is malformed.
    pub fn contains(&self, address: &str) -> CoreResult<bool> {
        let address = parse_address(address)?;
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(find_match(entries.iter().map(String::as_str), address)?.is_some())
    }

    /// Sorted snapshot of the stored subnet strings.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot: Vec<String> = entries.iter().cloned().collect();
        snapshot.sort();
        snapshot
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_add_fails_with_already_exists() {
        let list = SubnetList::new();
        list.add("10.0.0.0/8").unwrap();
        assert!(matches!(
            list.add("10.0.0.0/8"),
            Err(CoreError::AlreadyExists(s)) if s == "10.0.0.0/8"
        ));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn equality_is_by_string_not_network() {
        let list = SubnetList::new();
        list.add("10.0.0.0/8").unwrap();
        list.add("10.0.0.1/8").unwrap();
        assert_eq!(list.entries(), vec!["10.0.0.0/8", "10.0.0.1/8"]);
    }

    #[test]
    fn remove_missing_fails_with_not_found() {
        let list = SubnetList::new();
        assert!(matches!(
            list.remove("192.168.0.0/16"),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn remove_after_add_stops_matching() {
        let list = SubnetList::new();
        list.add("192.1.1.0/25").unwrap();
        assert!(list.contains("192.1.1.6").unwrap());

        list.remove("192.1.1.0/25").unwrap();
        assert!(!list.contains("192.1.1.6").unwrap());
        assert!(list.is_empty());
    }

    #[test]
    fn contains_checks_subnet_membership() {
        let list = SubnetList::new();
        list.add("192.1.1.0/25").unwrap();

        assert!(list.contains("192.1.1.6").unwrap());
        assert!(list.contains("192.1.1.127").unwrap());
        assert!(!list.contains("192.1.1.128").unwrap());
        assert!(!list.contains("127.0.0.1").unwrap());
    }

    #[test]
    fn contains_on_empty_list_is_false() {
        let list = SubnetList::new();
        assert!(!list.contains("10.0.0.1").unwrap());
    }

    #[test]
    fn contains_supports_ipv6() {
        let list = SubnetList::new();
        list.add("2001:db8::/32").unwrap();
        assert!(list.contains("2001:db8::1").unwrap());
        assert!(!list.contains("2001:db9::1").unwrap());
        assert!(!list.contains("10.0.0.1").unwrap());
    }

    #[test]
    fn host_bits_in_entry_are_ignored_for_matching() {
        let list = SubnetList::new();
        list.add("10.0.0.1/8").unwrap();
        assert!(list.contains("10.200.3.4").unwrap());
    }

    #[test]
    fn malformed_address_is_rejected() {
        let list = SubnetList::new();
        list.add("10.0.0.0/8").unwrap();
        assert!(matches!(
            list.contains("not-an-ip"),
            Err(CoreError::InvalidAddress(_))
        ));
    }

    #[test]
    fn malformed_entry_blocks_membership_tests() {
        let list = SubnetList::new();
        list.add("garbage").unwrap();
        assert!(matches!(
            list.contains("10.0.0.1"),
            Err(CoreError::InvalidSubnet(s)) if s == "garbage"
        ));

        list.remove("garbage").unwrap();
        assert!(!list.contains("10.0.0.1").unwrap());
    }

    #[test]
    fn find_match_aborts_before_later_match() {
        let address = parse_address("10.0.0.1").unwrap();
        let entries = ["bad/entry", "10.0.0.0/8"];
        assert!(matches!(
            find_match(entries, address),
            Err(CoreError::InvalidSubnet(_))
        ));
    }

    #[test]
    fn find_match_returns_matching_entry() {
        let address = parse_address("172.16.5.4").unwrap();
        let entries = ["10.0.0.0/8", "172.16.0.0/12"];
        assert_eq!(find_match(entries, address).unwrap(), Some("172.16.0.0/12"));
    }

    #[test]
    fn validate_subnet_requires_prefix() {
        assert!(validate_subnet("10.0.0.0/8").is_ok());
        assert!(validate_subnet("2001:db8::/32").is_ok());
        assert!(validate_subnet("10.0.0.1").is_err());
        assert!(validate_subnet("10.0.0.0/33").is_err());
    }

    #[test]
    fn list_kind_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: ListKind,
        }
        let w: Wrapper = toml::from_str(r#"kind = "allow""#).unwrap();
        assert_eq!(w.kind, ListKind::Allow);
        assert_eq!(ListKind::Deny.to_string(), "deny");
    }
}
