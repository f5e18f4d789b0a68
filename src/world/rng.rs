//! Random source abstraction for creature AI
//!
//! Target selection and aim-cooldown jitter draw from this trait so hosts can
//! inject a seeded generator for deterministic runs.

/// Integer random draws used by the creature controller
pub trait RandomSource {
    /// Uniform integer in `[0, range)`. Returns 0 when `range` is 0.
    fn uniform_int(&mut self, range: u32) -> u32;

    /// Uniform integer in `[-range, range]`. Returns 0 when `range` is 0.
    fn uniform_signed_int(&mut self, range: i32) -> i32;
}

// Covers thread_rng() as well as seeded generators such as Xoshiro256StarStar
impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn uniform_int(&mut self, range: u32) -> u32 {
        if range == 0 {
            return 0;
        }
        self.gen_range(0..range)
    }

    fn uniform_signed_int(&mut self, range: i32) -> i32 {
        let range = range.saturating_abs();
        if range == 0 {
            return 0;
        }
        self.gen_range(-range..=range)
    }
}
