pub const DEFAULT_TOLERANCE: f64 = 1e-14;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Settings for Bairstow's root finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenConfig {
    /// Iteration stops once both corrections are below this value
    pub tolerance: f64,
    /// Per quadratic factor; `None` iterates until convergence
    pub max_iterations: Option<usize>,
}

impl Default for EigenConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EigenConfig {
    pub fn new() -> Self {
        EigenConfig {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
        }
    }

    pub fn unbounded() -> Self {
        EigenConfig {
            max_iterations: None,
            ..Self::new()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}
