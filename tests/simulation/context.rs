//! Simulation context providing deterministic randomness.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bob", "Bobbi", "Chen", "Dara", "Emeka", "Farah", "Goran", "Hana", "Ivo", "Jules",
];

/// Context for a simulation run providing deterministic primitives.
pub struct WorkloadContext {
    seed: u64,
    rng: StdRng,
    start_time: Instant,
    operation_count: u64,
    next_user: u64,
}

impl WorkloadContext {
    /// Create new context with given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            start_time: Instant::now(),
            operation_count: 0,
            next_user: 0,
        }
    }

    /// Get the seed for reproducibility.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get mutable reference to seeded RNG - use this instead of rand::random().
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Generate next operation ID (monotonically increasing).
    pub fn next_op_id(&mut self) -> u64 {
        self.operation_count += 1;
        self.operation_count
    }

    pub fn total_ops(&self) -> u64 {
        self.operation_count
    }

    /// Fresh user id, never reused within a run.
    pub fn fresh_user_id(&mut self) -> String {
        self.next_user += 1;
        format!("usr-{:05}", self.next_user)
    }

    /// Random display name; several share the "bob" substring.
    pub fn random_name(&mut self) -> String {
        let first = FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())];
        let suffix: u16 = self.rng.gen_range(0..100);
        format!("{first} {suffix}")
    }

    /// Choose random element from slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let idx = self.rng.gen_range(0..items.len());
            Some(&items[idx])
        }
    }

    /// Return true with given probability (0.0 to 1.0).
    pub fn chance(&mut self, probability: f64) -> bool {
        debug_assert!(
            (0.0..=1.0).contains(&probability),
            "probability must be between 0.0 and 1.0, got {}",
            probability
        );
        self.rng.gen::<f64>() < probability.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_rng() {
        let mut ctx1 = WorkloadContext::new(12345);
        let mut ctx2 = WorkloadContext::new(12345);
        assert_eq!(ctx1.random_name(), ctx2.random_name());
    }

    #[test]
    fn test_fresh_ids_unique() {
        let mut ctx = WorkloadContext::new(1);
        let a = ctx.fresh_user_id();
        let b = ctx.fresh_user_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_op_id_increments() {
        let mut ctx = WorkloadContext::new(1);
        assert_eq!(ctx.next_op_id(), 1);
        assert_eq!(ctx.next_op_id(), 2);
        assert_eq!(ctx.total_ops(), 2);
    }
}
