//! Runner configuration

/// Options accepted by the circuit runner
///
/// # Example
///
/// ```
/// use simvec_sim::Parameter;
///
/// let param = Parameter::new().with_num_threads(4).with_seed(42);
/// assert_eq!(param.num_threads, 4);
/// assert_eq!(param.verbosity, 0);
/// ```
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Worker count for the parallel executor; one or less selects the
    /// sequential executor
    ///
    /// Default: 1
    pub num_threads: usize,

    /// 0 silent; 1 reports total elapsed time; 2 additionally reports
    /// per-group time
    ///
    /// Default: 0
    pub verbosity: u32,

    /// Seed for measurement-gate outcomes, so runs are reproducible
    ///
    /// Default: 0
    pub seed: u64,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            num_threads: 1,
            verbosity: 0,
            seed: 0,
        }
    }
}

impl Parameter {
    /// Defaults: sequential, silent, seed 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Set the verbosity level
    pub fn with_verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the measurement seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
