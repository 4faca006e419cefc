//! Deterministic per-participant assignment.
//!
//! An [`Assignment`] is a pure function of the seed and the number of cases.
//! Each of the three draws starts from a freshly seeded [`StudyRng`] so that
//! no draw depends on how many values another one consumed.

use serde::{Deserialize, Serialize};

use crate::rng::StudyRng;
use crate::seed::Seed;

/// Timed/untimed experimental condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Untimed,
    Timed,
}

impl Condition {
    /// Condition from the single binary draw.
    pub fn from_bit(bit: u64) -> Self {
        if bit == 0 { Self::Untimed } else { Self::Timed }
    }

    pub fn is_timed(self) -> bool {
        matches!(self, Self::Timed)
    }

    /// Wire form used by the survey form (`"0"` or `"1"`).
    pub fn as_flag(self) -> &'static str {
        match self {
            Self::Untimed => "0",
            Self::Timed => "1",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Untimed => write!(f, "untimed"),
            Self::Timed => write!(f, "timed"),
        }
    }
}

/// Reproducible experimental configuration for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Seed the assignment was drawn from.
    pub seed: Seed,
    /// Case indices in presentation order. A bijection over `0..n`.
    pub permutation: Vec<usize>,
    /// Guidance flag per presented case, aligned with `permutation`.
    pub guidance: Vec<bool>,
    /// Timed/untimed condition.
    pub condition: Condition,
}

impl Assignment {
    /// Number of cases covered by the assignment.
    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    /// Guidance flag keyed by canonical case index rather than position.
    pub fn guidance_by_case(&self) -> Vec<bool> {
        let mut by_case = vec![false; self.len()];
        for (&case, &flag) in self.permutation.iter().zip(&self.guidance) {
            by_case[case] = flag;
        }
        by_case
    }

    /// Comma-separated case indices in presentation order.
    pub fn order_string(&self) -> String {
        self.permutation
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// One `1`/`0` character per presented case.
    pub fn guidance_bits(&self) -> String {
        self.guidance
            .iter()
            .map(|&flag| if flag { '1' } else { '0' })
            .collect()
    }

    /// Iterate `(position, case_index, guidance)` in presentation order.
    pub fn presented(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        self.permutation
            .iter()
            .zip(&self.guidance)
            .enumerate()
            .map(|(position, (&case, &flag))| (position, case, flag))
    }
}

/// Draw the assignment for `case_count` cases from `seed`.
pub fn generate_assignment(seed: Seed, case_count: usize) -> Assignment {
    let guided = StudyRng::new(seed).sample_indices(case_count, case_count / 2);
    let mut guidance_by_case = vec![false; case_count];
    for case in guided {
        guidance_by_case[case] = true;
    }

    let permutation = StudyRng::new(seed).sample_indices(case_count, case_count);

    let timed_bit = StudyRng::new(seed)
        .sample_indices(2, 1)
        .first()
        .copied()
        .unwrap_or(0);

    let guidance = permutation.iter().map(|&case| guidance_by_case[case]).collect();

    tracing::debug!(%seed, case_count, timed = timed_bit, "generated assignment");

    Assignment {
        seed,
        permutation,
        guidance,
        condition: Condition::from_bit(timed_bit as u64),
    }
}
