//! Configuration options for the local search minimizer.

/// Configuration options for [`LocalSearchMinimizer`](super::LocalSearchMinimizer).
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSearchConfig {
    /// Number of iterations after which `iterate` stops asking for more. Default: 10
    pub max_iterations: usize,

    /// Maximum number of cost evaluations when bracketing a minimum along one axis. Default: 100
    pub max_probes: usize,

    /// Maximum number of segments in a cost slice. Default: 3
    pub max_segments: usize,

    /// Upper bound on the nodes of each slice segment. Default: 100
    pub max_nodes: usize,

    /// Newton steps are considered only for iteration indices above this. Default: 3
    pub newton_after: usize,

    /// First bracketing step, relative to the parameter value. Default: 1e-3
    pub initial_step: f64,

    /// Order of slice segments that fail to converge within the budget. Default: 8
    pub fallback_order: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            max_probes: 100,
            max_segments: 3,
            max_nodes: 100,
            newton_after: 3,
            initial_step: 1e-3,
            fallback_order: 8,
        }
    }
}

impl LocalSearchConfig {
    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the probe cap of the bracket search.
    pub fn with_max_probes(mut self, max_probes: usize) -> Self {
        self.max_probes = max_probes;
        self
    }

    /// Set the segment cap of a cost slice.
    pub fn with_max_segments(mut self, max_segments: usize) -> Self {
        self.max_segments = max_segments;
        self
    }

    /// Set the node cap of a slice segment.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Set the iteration index after which Newton steps may be taken.
    pub fn with_newton_after(mut self, newton_after: usize) -> Self {
        self.newton_after = newton_after;
        self
    }

    /// Set the relative size of the first bracketing step.
    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        self.initial_step = initial_step;
        self
    }

    /// Set the order of fallback slice segments.
    pub fn with_fallback_order(mut self, fallback_order: usize) -> Self {
        self.fallback_order = fallback_order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LocalSearchConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.max_probes, 100);
        assert_eq!(config.max_segments, 3);
        assert_eq!(config.max_nodes, 100);
        assert_eq!(config.newton_after, 3);
    }

    #[test]
    fn test_builder() {
        let config = LocalSearchConfig::default()
            .with_max_iterations(4)
            .with_initial_step(0.1)
            .with_fallback_order(4);
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.initial_step, 0.1);
        assert_eq!(config.fallback_order, 4);
        assert_eq!(config.max_probes, 100);
    }
}
