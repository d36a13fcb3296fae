//! Runtime configuration.

use std::env;

use serde::{Deserialize, Serialize};

/// Settings a [`Runtime`](crate::Runtime) is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Kernel parallelism. `None` uses one thread per logical core.
    pub num_threads: Option<usize>,

    /// Initial generator seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Number of accelerator ordinals (`Device::Cuda(0..n)`) the runtime accepts.
    pub accelerators: usize,
}

impl RuntimeConfig {
    /// Read `KILN_NUM_THREADS`, `KILN_SEED` and `KILN_ACCELERATORS`.
    ///
    /// Unset, empty or unparsable values keep the default.
    pub fn from_env() -> Self {
        Self {
            num_threads: parse_var("KILN_NUM_THREADS").filter(|&n: &usize| n > 0),
            seed: parse_var("KILN_SEED"),
            accelerators: parse_var("KILN_ACCELERATORS").unwrap_or(0),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    pub fn with_accelerators(mut self, n: usize) -> Self {
        self.accelerators = n;
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse().ok(),
        _ => None,
    }
}
