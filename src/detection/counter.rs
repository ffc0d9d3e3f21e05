// StepCounter - running step total and derived calorie estimate

/// Running step total owned by the tracking session.
///
/// The count is a non-negative integer that only moves up, except for the
/// explicit user-invoked reset. Calories are always derived from the count
/// on demand and never stored, so the two can never drift apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCounter {
    steps: u64,
}

impl StepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step count.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Credit one step. No upper bound, no error conditions.
    pub fn increment(&mut self) {
        self.steps += 1;
    }

    /// Zero the count. Unconditional; triggered only by explicit user action.
    pub fn reset(&mut self) {
        self.steps = 0;
    }

    /// Exact calorie estimate: steps x calories_per_step.
    pub fn calories(&self, calories_per_step: f64) -> f64 {
        self.steps as f64 * calories_per_step
    }

    /// Calorie estimate rounded to two decimals for display. The internal
    /// value stays exact; only the published figure is rounded.
    pub fn calories_display(&self, calories_per_step: f64) -> f64 {
        (self.calories(calories_per_step) * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALORIES_PER_STEP: f64 = 0.05;

    #[test]
    fn test_increment_accumulates() {
        let mut counter = StepCounter::new();
        assert_eq!(counter.steps(), 0);

        counter.increment();
        counter.increment();
        counter.increment();
        assert_eq!(counter.steps(), 3);
    }

    #[test]
    fn test_calories_derive_from_count() {
        let mut counter = StepCounter::new();
        assert_eq!(counter.calories(CALORIES_PER_STEP), 0.0);

        counter.increment();
        counter.increment();
        assert!((counter.calories(CALORIES_PER_STEP) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_calories_idempotent_without_mutation() {
        let mut counter = StepCounter::new();
        counter.increment();

        let first = counter.calories(CALORIES_PER_STEP);
        let second = counter.calories(CALORIES_PER_STEP);
        let third = counter.calories(CALORIES_PER_STEP);
        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn test_reset_zeroes_count_and_calories() {
        let mut counter = StepCounter::new();
        for _ in 0..42 {
            counter.increment();
        }
        assert_eq!(counter.steps(), 42);

        counter.reset();
        assert_eq!(counter.steps(), 0);
        assert_eq!(counter.calories(CALORIES_PER_STEP), 0.0);
        assert_eq!(counter.calories_display(CALORIES_PER_STEP), 0.0);
    }

    #[test]
    fn test_display_rounding_two_decimals() {
        let mut counter = StepCounter::new();
        // 3 steps x 0.333... would not round cleanly; verify with an
        // awkward per-step constant.
        counter.increment();
        counter.increment();
        counter.increment();

        let display = counter.calories_display(0.333);
        assert_eq!(display, 1.0); // 0.999 rounds up
        assert!((counter.calories(0.333) - 0.999).abs() < 1e-12);
    }
}
