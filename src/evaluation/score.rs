use std::fmt::Display;
use std::ops::Neg;

/// The score represents the relative value of the position for one of the
/// players or a decided game (four in a row on the board).
///
/// Heuristic values always stay strictly between [`Score::LOSS`] and
/// [`Score::WIN`], so a decided position outranks any combination of
/// positional terms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    value: i32,
}

impl Score {
    /// Bound of the alpha-beta window. Also returned by minimax for lines
    /// where a player already completed four in a row before the search
    /// reached the leaf.
    pub const INFINITY: Self = Self {
        value: 1_000_000_000,
    };
    /// The player has four in a row.
    pub const WIN: Self = Self { value: 500_001 };
    /// The opponent has four in a row.
    pub const LOSS: Self = Self { value: -500_001 };
    /// Neither side is better.
    pub const EVEN: Self = Self { value: 0 };

    /// Creates a heuristic score.
    ///
    /// The value must be strictly between the [`Score::LOSS`] and
    /// [`Score::WIN`] sentinels.
    #[must_use]
    pub fn new(value: i32) -> Self {
        assert!(value.abs() < Self::WIN.value);
        Self { value }
    }

    /// Raw value of the score.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.value
    }

    /// Returns `true` if the score represents a finished game rather than a
    /// heuristic estimate.
    #[must_use]
    pub const fn is_decisive(self) -> bool {
        self.value >= Self::WIN.value || self.value <= Self::LOSS.value
    }

    /// Maps the score to the MCTS reward interval `[-1, 1]`: decisive scores
    /// become ±1, heuristic ones are scaled and stay strictly inside.
    #[must_use]
    pub fn to_reward(self) -> f64 {
        if self.value >= Self::WIN.value {
            1.0
        } else if self.value <= Self::LOSS.value {
            -1.0
        } else {
            f64::from(self.value) / f64::from(Self::WIN.value)
        }
    }
}

impl Neg for Score {
    type Output = Self;

    /// Mirrors evaluation to other player's perspective.
    fn neg(self) -> Self::Output {
        Self { value: -self.value }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.value >= Self::WIN.value {
            write!(f, "win")
        } else if self.value <= Self::LOSS.value {
            write!(f, "loss")
        } else {
            write!(f, "{:+}", self.value)
        }
    }
}
