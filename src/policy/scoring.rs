//! Composite eviction score.
//!
//! Victim selection keeps one running candidate and challenges it with every
//! other entry. Each challenge normalizes the two entries against each other,
//! so scores are only meaningful pairwise:
//!
//! ```text
//!   wf_x = weight_x / max(weight_a, weight_b)
//!
//!   Deadline basis (an expiry policy is active):
//!     af_x = remaining_x / max(remaining_a, remaining_b)
//!
//!   Elapsed basis (no expiry policy, stamps are last-touch times):
//!     af_x = 1 / (elapsed_x / max(elapsed_a, elapsed_b))
//!
//!   score_x = 0.5 * wf_x + 0.5 * af_x        lower score is evicted
//! ```
//!
//! With equal weights this picks the entry closest to its deadline, or the
//! one touched longest ago. With equal ages it picks the lightest entry.
//! A pair whose maximum is zero normalizes to `1.0` on both sides.
//! Ties keep the current candidate.

use std::time::{Duration, Instant};

const WEIGHT_SHARE: f64 = 0.5;
const AGE_SHARE: f64 = 0.5;

/// How an entry's stamp turns into an age factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBasis {
    /// Stamps are deadlines; compare remaining lifetime.
    Deadline,
    /// Stamps are last write/read times; compare inverted elapsed time.
    Elapsed,
}

/// The scoring inputs of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub weight: u64,
    pub stamp: Instant,
}

#[inline]
fn normalize(a: f64, b: f64) -> (f64, f64) {
    let max = a.max(b);
    if max <= 0.0 {
        (1.0, 1.0)
    } else {
        (a / max, b / max)
    }
}

#[inline]
fn nanos(d: Duration) -> f64 {
    d.as_nanos() as f64
}

/// Scores `a` and `b` against each other at time `now`.
pub fn pair_scores(a: Candidate, b: Candidate, basis: AgeBasis, now: Instant) -> (f64, f64) {
    let (wa, wb) = normalize(a.weight as f64, b.weight as f64);

    let (aa, ab) = match basis {
        AgeBasis::Deadline => normalize(
            nanos(a.stamp.saturating_duration_since(now)),
            nanos(b.stamp.saturating_duration_since(now)),
        ),
        AgeBasis::Elapsed => {
            let (ra, rb) = normalize(
                nanos(now.saturating_duration_since(a.stamp)),
                nanos(now.saturating_duration_since(b.stamp)),
            );
            // 1/0 is +inf: an entry touched at `now` never loses to an older one.
            (1.0 / ra, 1.0 / rb)
        },
    };

    (
        WEIGHT_SHARE * wa + AGE_SHARE * aa,
        WEIGHT_SHARE * wb + AGE_SHARE * ab,
    )
}

/// Returns `true` if `challenger` should replace `current` as the eviction
/// candidate.
#[inline]
pub fn replaces(current: Candidate, challenger: Candidate, basis: AgeBasis, now: Instant) -> bool {
    let (current_score, challenger_score) = pair_scores(current, challenger, basis, now);
    challenger_score < current_score
}

/// Runs the running-candidate scan over `entries` and returns the victim.
pub fn select_victim<'a, K, I>(entries: I, basis: AgeBasis, now: Instant) -> Option<&'a K>
where
    K: 'a,
    I: IntoIterator<Item = (&'a K, Candidate)>,
{
    let mut best: Option<(&'a K, Candidate)> = None;
    for (key, candidate) in entries {
        match best {
            None => best = Some((key, candidate)),
            Some((_, current)) if replaces(current, candidate, basis, now) => {
                best = Some((key, candidate));
            },
            Some(_) => {},
        }
    }
    best.map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, millis: u64, weight: u64) -> Candidate {
        Candidate {
            weight,
            stamp: base + Duration::from_millis(millis),
        }
    }

    #[test]
    fn elapsed_basis_prefers_older_entry() {
        let base = Instant::now();
        let now = base + Duration::from_secs(10);
        let old = at(base, 0, 1);
        let young = at(base, 5_000, 1);

        let (s_old, s_young) = pair_scores(old, young, AgeBasis::Elapsed, now);
        assert_eq!(s_old, 1.0);
        assert_eq!(s_young, 1.5);
        assert!(replaces(young, old, AgeBasis::Elapsed, now));
        assert!(!replaces(old, young, AgeBasis::Elapsed, now));
    }

    #[test]
    fn deadline_basis_prefers_nearest_deadline() {
        let now = Instant::now();
        let soon = at(now, 1_000, 1);
        let late = at(now, 4_000, 1);

        let (s_soon, s_late) = pair_scores(soon, late, AgeBasis::Deadline, now);
        assert_eq!(s_soon, 0.625);
        assert_eq!(s_late, 1.0);
        assert!(replaces(late, soon, AgeBasis::Deadline, now));
    }

    #[test]
    fn lighter_entry_loses_when_ages_match() {
        let now = Instant::now();
        let light = at(now, 1_000, 1);
        let heavy = at(now, 1_000, 4);

        let (s_light, s_heavy) = pair_scores(light, heavy, AgeBasis::Deadline, now);
        assert_eq!(s_light, 0.5 * 0.25 + 0.5);
        assert_eq!(s_heavy, 1.0);
    }

    #[test]
    fn zero_maxima_normalize_to_one() {
        let now = Instant::now();
        let a = Candidate {
            weight: 0,
            stamp: now,
        };
        let b = a;
        assert_eq!(pair_scores(a, b, AgeBasis::Deadline, now), (1.0, 1.0));
        assert_eq!(pair_scores(a, b, AgeBasis::Elapsed, now), (1.0, 1.0));
    }

    #[test]
    fn expired_deadlines_saturate_to_zero_remaining() {
        let base = Instant::now();
        let now = base + Duration::from_secs(5);
        let past = at(base, 0, 1);
        let future = at(base, 6_000, 1);
        let (s_past, s_future) = pair_scores(past, future, AgeBasis::Deadline, now);
        assert_eq!(s_past, 0.5);
        assert_eq!(s_future, 1.0);
    }

    #[test]
    fn ties_keep_current_candidate() {
        let now = Instant::now();
        let a = at(now, 100, 2);
        assert!(!replaces(a, a, AgeBasis::Deadline, now));
        assert!(!replaces(a, a, AgeBasis::Elapsed, now + Duration::from_secs(1)));
    }

    #[test]
    fn select_victim_on_empty_is_none() {
        let entries: Vec<(&u32, Candidate)> = Vec::new();
        assert_eq!(select_victim(entries, AgeBasis::Elapsed, Instant::now()), None);
    }

    #[test]
    fn select_victim_single_entry() {
        let now = Instant::now();
        let key = 7u32;
        let entries = vec![(&key, at(now, 0, 1))];
        assert_eq!(select_victim(entries, AgeBasis::Deadline, now), Some(&7));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// With equal weights the elapsed scan evicts the oldest stamp.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_elapsed_picks_oldest(
            offsets in prop::collection::hash_set(0u64..1_000_000, 1..40)
        ) {
            let base = Instant::now();
            let now = base + Duration::from_secs(2);
            let keys: Vec<u64> = offsets.into_iter().collect();
            let entries = keys.iter().map(|k| {
                (k, Candidate { weight: 1, stamp: base + Duration::from_micros(*k) })
            });
            let victim = select_victim(entries, AgeBasis::Elapsed, now);
            prop_assert_eq!(victim, keys.iter().min());
        }

        /// With equal weights the deadline scan evicts the nearest deadline.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_deadline_picks_nearest(
            offsets in prop::collection::hash_set(1u64..1_000_000, 1..40)
        ) {
            let now = Instant::now();
            let keys: Vec<u64> = offsets.into_iter().collect();
            let entries = keys.iter().map(|k| {
                (k, Candidate { weight: 1, stamp: now + Duration::from_micros(*k) })
            });
            let victim = select_victim(entries, AgeBasis::Deadline, now);
            prop_assert_eq!(victim, keys.iter().min());
        }

        /// With equal stamps the scan evicts the lightest entry.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_equal_age_picks_lightest(
            weights in prop::collection::hash_set(1u64..10_000, 1..40)
        ) {
            let now = Instant::now();
            let stamp = now + Duration::from_secs(30);
            let keys: Vec<u64> = weights.into_iter().collect();
            let entries = keys.iter().map(|w| (w, Candidate { weight: *w, stamp }));
            let victim = select_victim(entries, AgeBasis::Deadline, now);
            prop_assert_eq!(victim, keys.iter().min());
        }

        /// The victim is always one of the scanned keys.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_victim_is_member(
            entries in prop::collection::vec((0u64..1_000, 0u64..100), 1..50),
            elapsed in any::<bool>()
        ) {
            let base = Instant::now();
            let now = base + Duration::from_secs(1);
            let basis = if elapsed { AgeBasis::Elapsed } else { AgeBasis::Deadline };
            let keyed: Vec<(usize, Candidate)> = entries
                .iter()
                .enumerate()
                .map(|(i, (ms, w))| (i, Candidate { weight: *w, stamp: base + Duration::from_millis(*ms) }))
                .collect();
            let victim = select_victim(keyed.iter().map(|(i, c)| (i, *c)), basis, now);
            prop_assert!(victim.is_some_and(|i| *i < entries.len()));
        }
    }
}
