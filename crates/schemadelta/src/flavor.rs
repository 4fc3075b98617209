//! Vendor/version tags that select DDL rendering conventions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Database server vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Vendor could not be determined; no vendor-specific adjustments apply.
    #[default]
    Unknown,
    /// Oracle MySQL.
    Mysql,
    /// Percona Server.
    Percona,
    /// MariaDB.
    Mariadb,
}

impl Vendor {
    /// Returns the lowercase vendor name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Mysql => "mysql",
            Self::Percona => "percona",
            Self::Mariadb => "mariadb",
        }
    }
}

/// A `(vendor, major, minor)` descriptor for the server whose DDL conventions
/// generated statements should match.
///
/// The zero value ([`Flavor::default`]) is an unknown flavor, which makes no
/// vendor-specific adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Flavor {
    pub vendor: Vendor,
    pub major: u16,
    pub minor: u16,
}

impl Flavor {
    /// Creates a flavor from explicit parts.
    #[must_use]
    pub fn new(vendor: Vendor, major: u16, minor: u16) -> Self {
        Self { vendor, major, minor }
    }

    /// Shorthand for a MySQL flavor of the given version.
    #[must_use]
    pub fn mysql(major: u16, minor: u16) -> Self {
        Self::new(Vendor::Mysql, major, minor)
    }

    /// Shorthand for a MariaDB flavor of the given version.
    #[must_use]
    pub fn mariadb(major: u16, minor: u16) -> Self {
        Self::new(Vendor::Mariadb, major, minor)
    }

    /// Returns true if the vendor is MariaDB.
    #[must_use]
    pub fn is_mariadb(&self) -> bool {
        self.vendor == Vendor::Mariadb
    }

    /// Returns true if this flavor's version is at least `major.minor`.
    #[must_use]
    pub fn at_least(&self, major: u16, minor: u16) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }

    /// MariaDB 10.2+ prints `current_timestamp()` style default expressions in
    /// lowercase.
    #[must_use]
    pub(crate) fn lowercases_default_expressions(&self) -> bool {
        self.is_mariadb() && self.at_least(10, 2)
    }

    /// MariaDB 10.2+ prints integer column defaults without surrounding quotes.
    #[must_use]
    pub(crate) fn unquotes_numeric_defaults(&self) -> bool {
        self.is_mariadb() && self.at_least(10, 2)
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.vendor.name(), self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flavor_is_unknown() {
        let flavor = Flavor::default();
        assert_eq!(flavor.vendor, Vendor::Unknown);
        assert!(!flavor.lowercases_default_expressions());
        assert!(!flavor.unquotes_numeric_defaults());
    }

    #[test]
    fn test_at_least() {
        let flavor = Flavor::mariadb(10, 3);
        assert!(flavor.at_least(10, 2));
        assert!(flavor.at_least(10, 3));
        assert!(!flavor.at_least(10, 4));
        assert!(!flavor.at_least(11, 0));
        assert!(Flavor::mysql(8, 0).at_least(5, 7));
    }

    #[test]
    fn test_mariadb_rendering_predicates() {
        assert!(Flavor::mariadb(10, 2).lowercases_default_expressions());
        assert!(Flavor::mariadb(10, 2).unquotes_numeric_defaults());
        assert!(!Flavor::mariadb(10, 1).lowercases_default_expressions());
        assert!(!Flavor::mysql(8, 0).unquotes_numeric_defaults());
    }

    #[test]
    fn test_display() {
        assert_eq!(Flavor::mysql(5, 7).to_string(), "mysql:5.7");
        assert_eq!(Flavor::default().to_string(), "unknown:0.0");
    }
}
