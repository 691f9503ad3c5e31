use rand::Rng;
use rand_distr::{Distribution, Exp};

/// Pure function (modulo the RNG) computing the per-message network delay
/// described in spec §4.2: a one-shot propagation delay drawn once per
/// simulation run, plus a per-send transmission delay and an independently
/// redrawn queueing delay.
#[derive(Debug, Clone, Copy)]
pub struct DelayModel {
    prop_delay: f64,
    slow_link_speed: f64,
    fast_link_speed: f64,
    queuing_delay_constant: f64,
}

impl DelayModel {
    pub fn new(
        prop_delay: f64,
        slow_link_speed: f64,
        fast_link_speed: f64,
        queuing_delay_constant: f64,
    ) -> Self {
        DelayModel { prop_delay, slow_link_speed, fast_link_speed, queuing_delay_constant }
    }

    /// Draws `prop_delay ~ Uniform(min, max)` once, as spec §4.2 requires.
    pub fn sample_prop_delay(
        rng: &mut impl Rng,
        min_light_prop_delay: f64,
        max_light_prop_delay: f64,
    ) -> f64 {
        rng.gen_range(min_light_prop_delay..=max_light_prop_delay)
    }

    /// Total delay for a `size`-byte message between a sender and receiver,
    /// at least one of which may be slow.
    pub fn delay(
        &self,
        rng: &mut impl Rng,
        size_bytes: usize,
        sender_is_slow: bool,
        receiver_is_slow: bool,
    ) -> f64 {
        let link_speed = if sender_is_slow || receiver_is_slow {
            self.slow_link_speed
        } else {
            self.fast_link_speed
        };

        let transmission = (size_bytes as f64 * 8.0) / (link_speed * 1024.0);
        let queueing_mean = self.queuing_delay_constant / (link_speed * 1024.0);
        let queueing = Exp::new(1.0 / queueing_mean)
            .expect("queueing mean is always strictly positive")
            .sample(rng);

        self.prop_delay + transmission + queueing
    }
}
