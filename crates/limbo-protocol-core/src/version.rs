use std::fmt;
use std::ops::RangeInclusive;

/// A protocol version number as sent in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolVersion(pub i32);

impl ProtocolVersion {
    pub const V1_8: ProtocolVersion = ProtocolVersion(47);
    pub const V1_9: ProtocolVersion = ProtocolVersion(107);
    pub const V1_11: ProtocolVersion = ProtocolVersion(315);
    pub const V1_12_2: ProtocolVersion = ProtocolVersion(340);
    pub const V1_13: ProtocolVersion = ProtocolVersion(393);
    pub const V1_14: ProtocolVersion = ProtocolVersion(477);
    pub const V1_16: ProtocolVersion = ProtocolVersion(735);
    pub const V1_17: ProtocolVersion = ProtocolVersion(755);
    pub const V1_19: ProtocolVersion = ProtocolVersion(759);
    pub const V1_19_3: ProtocolVersion = ProtocolVersion(761);
    pub const V1_20: ProtocolVersion = ProtocolVersion(763);
    pub const V1_20_2: ProtocolVersion = ProtocolVersion(764);
    pub const V1_20_3: ProtocolVersion = ProtocolVersion(765);
    pub const V1_20_5: ProtocolVersion = ProtocolVersion(766);
    pub const V1_21: ProtocolVersion = ProtocolVersion(767);

    pub fn number(self) -> i32 {
        self.0
    }

    /// Human-readable game release(s) speaking this protocol, if known.
    pub fn release_name(self) -> Option<&'static str> {
        Some(match self.0 {
            47 => "1.8.x",
            107 => "1.9",
            315 => "1.11",
            340 => "1.12.2",
            393 => "1.13",
            477 => "1.14",
            735 => "1.16",
            755 => "1.17",
            759 => "1.19",
            761 => "1.19.3",
            763 => "1.20-1.20.1",
            764 => "1.20.2",
            765 => "1.20.3-1.20.4",
            766 => "1.20.5-1.20.6",
            767 => "1.21-1.21.1",
            _ => return None,
        })
    }

    pub fn at_least(self, other: ProtocolVersion) -> bool {
        self >= other
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.release_name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "protocol {}", self.0),
        }
    }
}

/// An inclusive span of protocol versions sharing one packet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub first: ProtocolVersion,
    pub last: ProtocolVersion,
}

impl VersionRange {
    pub const fn new(first: ProtocolVersion, last: ProtocolVersion) -> Self {
        Self { first, last }
    }

    pub const fn only(version: ProtocolVersion) -> Self {
        Self::new(version, version)
    }

    pub fn contains(&self, version: ProtocolVersion) -> bool {
        self.first <= version && version <= self.last
    }
}

impl From<RangeInclusive<i32>> for VersionRange {
    fn from(range: RangeInclusive<i32>) -> Self {
        Self::new(ProtocolVersion(*range.start()), ProtocolVersion(*range.end()))
    }
}

impl From<ProtocolVersion> for VersionRange {
    fn from(version: ProtocolVersion) -> Self {
        Self::only(version)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first.0)
        } else {
            write!(f, "{}..={}", self.first.0, self.last.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let range = VersionRange::from(47..=340);
        assert!(range.contains(ProtocolVersion::V1_8));
        assert!(range.contains(ProtocolVersion::V1_12_2));
        assert!(!range.contains(ProtocolVersion::V1_20));
        assert!(VersionRange::only(ProtocolVersion::V1_21).contains(ProtocolVersion(767)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ProtocolVersion::V1_20_3.to_string(), "1.20.3-1.20.4 (765)");
        assert_eq!(ProtocolVersion(5).to_string(), "protocol 5");
    }
}
