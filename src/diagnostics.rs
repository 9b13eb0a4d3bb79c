//! Root-cause classification for unsatisfied actor pairs.
//!
//! A pair that fails under full constraints is searched again with the
//! language check off, the addressing check off, and both off. Which of the
//! relaxed searches succeed tells why the strict one did not.
//!
//! A search that ran out of steps without finding a path proves nothing, so
//! any such run makes the diagnosis [`Diagnosis::Inconclusive`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::search::{Checks, PathOutcome};

/// Why a pair of actors cannot communicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    /// No path even with both checks off: reliability or topology.
    NoViablePath,
    /// A path exists once languages are ignored.
    NoUsableLanguage,
    /// A path exists once addressing is ignored.
    AddressingUnsatisfied,
    /// Relaxing either constraint on its own is enough.
    EitherConstraint,
    /// Only relaxing both constraints together yields a path.
    BothConstraints,
    /// A search hit the step budget before it could decide.
    Inconclusive,
}

impl Diagnosis {
    /// Stable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Diagnosis::NoViablePath => "no viable path",
            Diagnosis::NoUsableLanguage => "path exists but no usable language",
            Diagnosis::AddressingUnsatisfied => "path exists but addressing not satisfied",
            Diagnosis::EitherConstraint => {
                "path exists if either language or addressing is relaxed"
            }
            Diagnosis::BothConstraints => {
                "path exists only if both language and addressing are relaxed"
            }
            Diagnosis::Inconclusive => "search truncated, cause undetermined",
        }
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of each relaxed re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Relaxations {
    pub language_off: bool,
    pub addressing_off: bool,
    pub both_off: bool,
    /// Some relaxed run was cut short without finding a path.
    pub truncated: bool,
}

impl Relaxations {
    pub fn classify(self) -> Diagnosis {
        if self.truncated {
            return Diagnosis::Inconclusive;
        }
        match (self.language_off, self.addressing_off, self.both_off) {
            (true, true, _) => Diagnosis::EitherConstraint,
            (true, false, _) => Diagnosis::NoUsableLanguage,
            (false, true, _) => Diagnosis::AddressingUnsatisfied,
            (false, false, true) => Diagnosis::BothConstraints,
            (false, false, false) => Diagnosis::NoViablePath,
        }
    }
}

/// Re-run a failed pair search under each relaxation and classify the result.
///
/// `strict` is the outcome under full checks; `search` runs the pair search
/// under the given checks. Relaxation only adds paths, so when a single
/// relaxation succeeds the both-off run is implied and skipped. A truncated
/// strict run is not re-run at all.
pub fn diagnose(strict: &PathOutcome, mut search: impl FnMut(Checks) -> PathOutcome) -> Diagnosis {
    if strict.truncated {
        debug!(steps = strict.steps, "strict search truncated, pair not diagnosed");
        return Diagnosis::Inconclusive;
    }

    let mut truncated = false;
    let mut run = |checks| {
        let outcome = search(checks);
        truncated |= outcome.truncated && !outcome.found;
        outcome.found
    };
    let language_off = run(Checks::LANGUAGE_RELAXED);
    let addressing_off = run(Checks::ADDRESSING_RELAXED);
    let both_off = language_off || addressing_off || run(Checks::NONE);

    let relaxations = Relaxations {
        language_off,
        addressing_off,
        both_off,
        truncated,
    };
    let diagnosis = relaxations.classify();
    debug!(?relaxations, %diagnosis, "pair diagnosed");
    diagnosis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(found: bool) -> PathOutcome {
        PathOutcome {
            found,
            ..Default::default()
        }
    }

    fn strict() -> PathOutcome {
        outcome(false)
    }

    fn oracle(
        language_off: bool,
        addressing_off: bool,
        both_off: bool,
    ) -> impl FnMut(Checks) -> PathOutcome {
        move |checks| {
            outcome(match (checks.language, checks.addressing) {
                (false, true) => language_off,
                (true, false) => addressing_off,
                (false, false) => both_off,
                (true, true) => false,
            })
        }
    }

    #[test]
    fn classification_table() {
        let s = strict();
        assert_eq!(diagnose(&s, oracle(false, false, false)), Diagnosis::NoViablePath);
        assert_eq!(diagnose(&s, oracle(true, false, true)), Diagnosis::NoUsableLanguage);
        assert_eq!(
            diagnose(&s, oracle(false, true, true)),
            Diagnosis::AddressingUnsatisfied
        );
        assert_eq!(diagnose(&s, oracle(true, true, true)), Diagnosis::EitherConstraint);
        assert_eq!(diagnose(&s, oracle(false, false, true)), Diagnosis::BothConstraints);
    }

    #[test]
    fn both_off_skipped_when_single_relaxation_succeeds() {
        let mut runs = Vec::new();
        let diagnosis = diagnose(&strict(), |checks| {
            runs.push(checks);
            outcome(!checks.language)
        });
        assert_eq!(diagnosis, Diagnosis::NoUsableLanguage);
        assert_eq!(runs, vec![Checks::LANGUAGE_RELAXED, Checks::ADDRESSING_RELAXED]);
    }

    #[test]
    fn truncated_strict_run_is_not_rerun() {
        let strict = PathOutcome {
            truncated: true,
            ..Default::default()
        };
        let mut runs = 0;
        let diagnosis = diagnose(&strict, |_| {
            runs += 1;
            outcome(false)
        });
        assert_eq!(diagnosis, Diagnosis::Inconclusive);
        assert_eq!(runs, 0);
    }

    #[test]
    fn truncated_relaxed_miss_is_inconclusive() {
        let diagnosis = diagnose(&strict(), |checks| PathOutcome {
            truncated: checks == Checks::NONE,
            ..Default::default()
        });
        assert_eq!(diagnosis, Diagnosis::Inconclusive);
    }

    #[test]
    fn truncated_relaxed_hit_still_counts() {
        // A path found before the budget ran out is a real path.
        let diagnosis = diagnose(&strict(), |checks| PathOutcome {
            found: true,
            truncated: !checks.language,
            ..Default::default()
        });
        assert_eq!(diagnosis, Diagnosis::EitherConstraint);
    }

    #[test]
    fn labels_are_distinct() {
        let all = [
            Diagnosis::NoViablePath,
            Diagnosis::NoUsableLanguage,
            Diagnosis::AddressingUnsatisfied,
            Diagnosis::EitherConstraint,
            Diagnosis::BothConstraints,
            Diagnosis::Inconclusive,
        ];
        let labels: std::collections::HashSet<_> = all.iter().map(|d| d.label()).collect();
        assert_eq!(labels.len(), all.len());
        assert_eq!(Diagnosis::NoViablePath.to_string(), "no viable path");
    }
}
