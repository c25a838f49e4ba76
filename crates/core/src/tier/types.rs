//! Plan tier ordering and transition classification.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::tier::error::TierError;

/// Plan tier.
///
/// Ordered `free < seed < grow < pro < enterprise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free tier.
    Free,
    /// Entry paid tier.
    Seed,
    /// Mid tier.
    Grow,
    /// Upper tier.
    Pro,
    /// Superset of every other tier.
    Enterprise,
}

impl PlanTier {
    /// Every tier in ascending rank order.
    pub const ALL: [Self; 5] = [
        Self::Free,
        Self::Seed,
        Self::Grow,
        Self::Pro,
        Self::Enterprise,
    ];

    /// Returns the ordinal rank of the tier.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Free => 1,
            Self::Seed => 2,
            Self::Grow => 3,
            Self::Pro => 4,
            Self::Enterprise => 5,
        }
    }

    /// Returns the string representation of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Seed => "seed",
            Self::Grow => "grow",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parses a tier from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "seed" => Some(Self::Seed),
            "grow" => Some(Self::Grow),
            "pro" => Some(Self::Pro),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Checks that ranks are unique and ascend in `ALL` order.
    ///
    /// # Errors
    ///
    /// Returns `TierError::RankCollision` if two tiers share or invert a rank.
    pub fn validate_ranks() -> Result<(), TierError> {
        for pair in Self::ALL.windows(2) {
            if pair[0].rank() >= pair[1].rank() {
                return Err(TierError::RankCollision {
                    lower: pair[0],
                    higher: pair[1],
                });
            }
        }
        Ok(())
    }
}

impl PartialOrd for PlanTier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PlanTier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanTier {
    type Err = TierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TierError::UnknownTier(s.to_string()))
    }
}

/// Classification of a move between two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierChange {
    /// Target ranks above the current tier.
    Upgrade,
    /// Target ranks below the current tier.
    Downgrade,
    /// Target has the same rank.
    Same,
}

impl TierChange {
    /// Classifies a transition by tier rank.
    ///
    /// An organization without a current tier is treated as upgrading.
    #[must_use]
    pub fn classify(current: Option<PlanTier>, target: PlanTier) -> Self {
        match current.map(|tier| tier.cmp(&target)) {
            None | Some(Ordering::Less) => Self::Upgrade,
            Some(Ordering::Greater) => Self::Downgrade,
            Some(Ordering::Equal) => Self::Same,
        }
    }

    /// Returns the string representation of the classification.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
            Self::Same => "same",
        }
    }
}

impl fmt::Display for TierChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates the tier column of the plan catalog.
///
/// Every plan must name a known tier; returns the parsed tiers in input order.
///
/// # Errors
///
/// Returns `TierError::UnknownTier` for the first unrecognized value.
pub fn validate_catalog_tiers<'a, I>(tiers: I) -> Result<Vec<PlanTier>, TierError>
where
    I: IntoIterator<Item = &'a str>,
{
    PlanTier::validate_ranks()?;
    tiers
        .into_iter()
        .map(|tier| tier.parse::<PlanTier>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PlanTier::Free, 1)]
    #[case(PlanTier::Seed, 2)]
    #[case(PlanTier::Grow, 3)]
    #[case(PlanTier::Pro, 4)]
    #[case(PlanTier::Enterprise, 5)]
    fn test_rank(#[case] tier: PlanTier, #[case] rank: u8) {
        assert_eq!(tier.rank(), rank);
    }

    #[test]
    fn test_ordering() {
        assert!(PlanTier::Free < PlanTier::Seed);
        assert!(PlanTier::Seed < PlanTier::Grow);
        assert!(PlanTier::Grow < PlanTier::Pro);
        assert!(PlanTier::Pro < PlanTier::Enterprise);
        assert_eq!(PlanTier::ALL.iter().max(), Some(&PlanTier::Enterprise));
    }

    #[test]
    fn test_parse() {
        assert_eq!(PlanTier::parse("seed"), Some(PlanTier::Seed));
        assert_eq!(PlanTier::parse("PRO"), Some(PlanTier::Pro));
        assert_eq!(PlanTier::parse(" Enterprise "), Some(PlanTier::Enterprise));
        assert_eq!(PlanTier::parse("platinum"), None);
        assert!("platinum".parse::<PlanTier>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PlanTier::Grow), "grow");
        assert_eq!(format!("{}", TierChange::Downgrade), "downgrade");
    }

    #[rstest]
    #[case(Some(PlanTier::Seed), PlanTier::Pro, TierChange::Upgrade)]
    #[case(Some(PlanTier::Pro), PlanTier::Seed, TierChange::Downgrade)]
    #[case(Some(PlanTier::Grow), PlanTier::Grow, TierChange::Same)]
    #[case(Some(PlanTier::Pro), PlanTier::Enterprise, TierChange::Upgrade)]
    #[case(Some(PlanTier::Enterprise), PlanTier::Free, TierChange::Downgrade)]
    #[case(None, PlanTier::Free, TierChange::Upgrade)]
    fn test_classify(
        #[case] current: Option<PlanTier>,
        #[case] target: PlanTier,
        #[case] expected: TierChange,
    ) {
        assert_eq!(TierChange::classify(current, target), expected);
    }

    #[test]
    fn test_ranks_are_valid() {
        assert!(PlanTier::validate_ranks().is_ok());
    }

    #[test]
    fn test_validate_catalog_tiers() {
        let tiers = validate_catalog_tiers(["free", "seed", "pro"]).unwrap();
        assert_eq!(tiers, vec![PlanTier::Free, PlanTier::Seed, PlanTier::Pro]);

        let err = validate_catalog_tiers(["free", "gold"]).unwrap_err();
        assert!(matches!(err, TierError::UnknownTier(ref t) if t == "gold"));
    }
}
