//! Jittered retry delay: `max(0, delay + U(-0.2*delay, +0.2*delay))`,
//! per SPEC_FULL.md §4.E step 5. Pure and deterministic given an `Rng`.

use rand::Rng;
use std::time::Duration;

pub fn jittered_delay(delay_secs: f64, rng: &mut impl Rng) -> Duration {
    let jitter = rng.gen_range(-0.2 * delay_secs..=0.2 * delay_secs);
    let seconds = (delay_secs + jitter).max(0.0);
    Duration::from_secs_f64(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn stays_within_twenty_percent_of_base() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let d = jittered_delay(2.0, &mut rng).as_secs_f64();
            assert!((1.6..=2.4).contains(&d), "delay {d} out of jitter band");
        }
    }

    #[test]
    fn never_goes_negative_for_small_base() {
        let mut rng = StepRng::new(0, 1);
        let d = jittered_delay(0.01, &mut rng);
        assert!(d.as_secs_f64() >= 0.0);
    }
}
