use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use votecast_core::{DomainError, DomainResult};

/// What a voter would like to happen to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOption {
    Auction,
    BuyNow,
    Tokenization,
    Raffle,
    NotInterested,
}

impl VoteOption {
    pub const ALL: [VoteOption; 5] = [
        VoteOption::Auction,
        VoteOption::BuyNow,
        VoteOption::Tokenization,
        VoteOption::Raffle,
        VoteOption::NotInterested,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VoteOption::Auction => "auction",
            VoteOption::BuyNow => "buy_now",
            VoteOption::Tokenization => "tokenization",
            VoteOption::Raffle => "raffle",
            VoteOption::NotInterested => "not_interested",
        }
    }

    /// Dotted path of this option's tally inside a product document.
    pub fn counter_path(self) -> String {
        format!("counts.{}", self.as_str())
    }
}

impl core::fmt::Display for VoteOption {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteOption {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoteOption::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("invalid option: {s}")))
    }
}

/// Per-option vote tally.
///
/// Always holds exactly one entry per [`VoteOption`]; a map with a missing or
/// unknown key is rejected on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")]
pub struct Counts(BTreeMap<VoteOption, u64>);

impl Counts {
    /// Every option present at zero.
    pub fn zeroed() -> Self {
        Self(VoteOption::ALL.into_iter().map(|o| (o, 0)).collect())
    }

    pub fn get(&self, option: VoteOption) -> u64 {
        self.0.get(&option).copied().unwrap_or(0)
    }

    pub fn contains(&self, option: VoteOption) -> bool {
        self.0.contains_key(&option)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VoteOption, u64)> + '_ {
        self.0.iter().map(|(o, n)| (*o, *n))
    }
}

impl Default for Counts {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl TryFrom<BTreeMap<String, u64>> for Counts {
    type Error = DomainError;

    fn try_from(raw: BTreeMap<String, u64>) -> Result<Self, Self::Error> {
        let mut counts = BTreeMap::new();
        for (key, value) in raw {
            let option: VoteOption = key
                .parse()
                .map_err(|_| DomainError::validation(format!("unexpected count key: {key}")))?;
            counts.insert(option, value);
        }

        if let Some(missing) = VoteOption::ALL.into_iter().find(|o| !counts.contains_key(o)) {
            return Err(DomainError::validation(format!("missing count for option: {missing}")));
        }

        Ok(Self(counts))
    }
}

impl From<Counts> for BTreeMap<String, u64> {
    fn from(counts: Counts) -> Self {
        counts
            .0
            .into_iter()
            .map(|(o, n)| (o.as_str().to_string(), n))
            .collect()
    }
}

/// A single validated vote.
///
/// Quantity hints are informational only; they are checked but not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRequest {
    pub option: VoteOption,
    pub desired_shares: Option<u64>,
    pub desired_tickets: Option<u64>,
}

impl VoteRequest {
    pub fn new(option: VoteOption) -> Self {
        Self {
            option,
            desired_shares: None,
            desired_tickets: None,
        }
    }

    /// Validate raw request fields.
    pub fn parse(
        option: &str,
        desired_shares: Option<i64>,
        desired_tickets: Option<i64>,
    ) -> DomainResult<Self> {
        Ok(Self {
            option: option.parse()?,
            desired_shares: positive_hint("desired_shares", desired_shares)?,
            desired_tickets: positive_hint("desired_tickets", desired_tickets)?,
        })
    }
}

fn positive_hint(field: &str, value: Option<i64>) -> DomainResult<Option<u64>> {
    match value {
        None => Ok(None),
        Some(v) if v >= 1 => Ok(Some(v as u64)),
        Some(v) => Err(DomainError::validation(format!(
            "{field} must be at least 1 (got {v})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn options_parse_from_wire_names() {
        for option in VoteOption::ALL {
            assert_eq!(option.as_str().parse::<VoteOption>().unwrap(), option);
        }
        assert_eq!(VoteOption::BuyNow.counter_path(), "counts.buy_now");
    }

    #[test]
    fn unknown_option_is_a_validation_error() {
        let err = "maybe_later".parse::<VoteOption>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn zeroed_counts_serialize_every_option() {
        let json = serde_json::to_value(Counts::zeroed()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "auction": 0,
                "buy_now": 0,
                "tokenization": 0,
                "raffle": 0,
                "not_interested": 0,
            })
        );
    }

    #[test]
    fn counts_reject_missing_key() {
        let json = serde_json::json!({
            "auction": 1,
            "buy_now": 0,
            "tokenization": 0,
            "raffle": 0,
        });
        assert!(serde_json::from_value::<Counts>(json).is_err());
    }

    #[test]
    fn counts_reject_extraneous_key() {
        let json = serde_json::json!({
            "auction": 0,
            "buy_now": 0,
            "tokenization": 0,
            "raffle": 0,
            "not_interested": 0,
            "lottery": 3,
        });
        assert!(serde_json::from_value::<Counts>(json).is_err());
    }

    #[test]
    fn vote_request_accepts_absent_hints() {
        let req = VoteRequest::parse("raffle", None, Some(2)).unwrap();
        assert_eq!(req.option, VoteOption::Raffle);
        assert_eq!(req.desired_shares, None);
        assert_eq!(req.desired_tickets, Some(2));
    }

    #[test]
    fn vote_request_rejects_non_positive_hints() {
        assert!(VoteRequest::parse("tokenization", Some(0), None).is_err());
        assert!(VoteRequest::parse("raffle", None, Some(-4)).is_err());
    }

    proptest! {
        #[test]
        fn counts_survive_json_with_arbitrary_tallies(tallies in proptest::array::uniform5(0u64..1_000_000)) {
            let raw: BTreeMap<String, u64> = VoteOption::ALL
                .into_iter()
                .zip(tallies)
                .map(|(o, n)| (o.as_str().to_string(), n))
                .collect();

            let counts = Counts::try_from(raw.clone()).unwrap();
            for (option, n) in VoteOption::ALL.into_iter().zip(tallies) {
                prop_assert_eq!(counts.get(option), n);
            }
            prop_assert_eq!(counts.total(), tallies.iter().sum::<u64>());
            prop_assert_eq!(BTreeMap::<String, u64>::from(counts), raw);
        }

        #[test]
        fn counts_missing_any_single_option_are_rejected(idx in 0usize..5) {
            let raw: BTreeMap<String, u64> = VoteOption::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, o)| (o.as_str().to_string(), 0))
                .collect();
            prop_assert!(Counts::try_from(raw).is_err());
        }
    }
}
