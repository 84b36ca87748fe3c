//! Post-peak kinetic-energy early-stop heuristic.
//!
//! Kinetic energy in an impact event rises, peaks, and decays toward a
//! post-impact plateau. Once the observed minimum is behind us and KE has
//! risen for several consecutive samples, the transient response is treated
//! as resolved and the run can be cut short.

/// Consecutive strict KE increases after the minimum required to stop.
///
/// Fixed policy constant, tuned against observed explicit-dynamics impact
/// transients.
const KE_STREAK_LIMIT: u32 = 3;

/// Decision after observing one kinetic-energy sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Keep monitoring.
    Continue,
    /// KE has risen off its minimum long enough; stop the job early.
    Stop {
        /// Lowest KE observed since monitoring attached.
        minimum: f64,
        /// The sample that triggered the stop.
        current: f64,
    },
}

/// Tracks the running KE minimum and the post-minimum increase streak.
#[derive(Debug, Default)]
pub struct KineticEnergyTracker {
    previous: Option<f64>,
    minimum: Option<f64>,
    streak: u32,
}

impl KineticEnergyTracker {
    /// Create a fresh tracker with no samples observed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest kinetic energy observed so far, if any.
    ///
    /// The very first sample only seeds the comparison baseline and is
    /// never a candidate for the minimum.
    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    /// Feed one kinetic-energy sample and decide whether to stop.
    pub fn observe(&mut self, ke: f64) -> Verdict {
        let Some(previous) = self.previous else {
            self.previous = Some(ke);
            return Verdict::Continue;
        };

        if self.minimum.map_or(true, |m| ke < m) {
            // A new minimum always resets the streak
            self.minimum = Some(ke);
            self.streak = 0;
        } else if ke > previous {
            self.streak += 1;
            if self.streak >= KE_STREAK_LIMIT {
                return Verdict::Stop {
                    minimum: self.minimum.unwrap_or(ke),
                    current: ke,
                };
            }
        } else {
            // Plateau or decrease that is not a new low
            self.streak = 0;
        }

        self.previous = Some(ke);
        Verdict::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut KineticEnergyTracker, samples: &[f64]) -> Vec<Verdict> {
        samples.iter().map(|&ke| tracker.observe(ke)).collect()
    }

    #[test]
    fn test_first_sample_never_tracked() {
        let mut tracker = KineticEnergyTracker::new();
        assert_eq!(tracker.observe(10.0), Verdict::Continue);
        assert_eq!(tracker.minimum(), None);
        // Second sample becomes the first tracked minimum
        tracker.observe(12.0);
        assert_eq!(tracker.minimum(), Some(12.0));
    }

    #[test]
    fn test_minimum_is_min_of_samples_after_the_first() {
        let mut tracker = KineticEnergyTracker::new();
        feed(&mut tracker, &[5.0, 9.0, 7.0, 8.0, 6.5]);
        // Sample 1 (5.0) is excluded; minimum over 2..k is 6.5
        assert_eq!(tracker.minimum(), Some(6.5));
    }

    #[test]
    fn test_stop_fires_exactly_on_third_consecutive_increase() {
        let mut tracker = KineticEnergyTracker::new();
        let verdicts = feed(&mut tracker, &[10.0, 8.0, 6.0, 7.0, 9.0, 11.0]);

        assert_eq!(&verdicts[..5], &[Verdict::Continue; 5]);
        assert_eq!(
            verdicts[5],
            Verdict::Stop {
                minimum: 6.0,
                current: 11.0
            }
        );
        assert_eq!(tracker.minimum(), Some(6.0));
    }

    #[test]
    fn test_plateau_and_decrease_reset_streak() {
        let mut tracker = KineticEnergyTracker::new();
        // 7 at position 4 is a new minimum; the 9 -> 7 drop resets the streak
        let verdicts = feed(&mut tracker, &[10.0, 8.0, 9.0, 7.0, 9.0, 10.0, 11.0]);

        assert_eq!(&verdicts[..6], &[Verdict::Continue; 6]);
        assert_eq!(
            verdicts[6],
            Verdict::Stop {
                minimum: 7.0,
                current: 11.0
            }
        );
    }

    #[test]
    fn test_equal_sample_resets_streak() {
        let mut tracker = KineticEnergyTracker::new();
        // Two increases, a plateau, then only two more increases: no stop
        let verdicts = feed(&mut tracker, &[10.0, 5.0, 6.0, 7.0, 7.0, 8.0, 9.0]);
        assert!(verdicts.iter().all(|v| *v == Verdict::Continue));
    }

    #[test]
    fn test_new_minimum_resets_nonzero_streak() {
        let mut tracker = KineticEnergyTracker::new();
        // Streak reaches 2, then a new minimum clears it
        let verdicts = feed(&mut tracker, &[10.0, 8.0, 9.0, 10.0, 4.0, 5.0, 6.0, 7.0]);

        assert_eq!(&verdicts[..7], &[Verdict::Continue; 7]);
        assert_eq!(
            verdicts[7],
            Verdict::Stop {
                minimum: 4.0,
                current: 7.0
            }
        );
    }
}
