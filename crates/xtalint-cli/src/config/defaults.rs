use xtalint::engine::config::{
    DEFAULT_CLASH_DISTANCE, DEFAULT_CUTOFF, DEFAULT_PROBE_RADIUS, DEFAULT_SHELL_RADIUS,
    DEFAULT_SPHERE_POINTS,
};

/// Values used when neither the command line, `--set`, nor the config file
/// provide one.
pub struct DefaultsConfig {
    pub cutoff: f64,
    pub shell_radius: u32,
    pub redundancy_elimination: bool,
    pub clash_distance: f64,
    pub probe_radius: f64,
    pub sphere_points: usize,
    pub threads: usize,
    pub include_hydrogens: bool,
    pub include_non_polymer: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            shell_radius: DEFAULT_SHELL_RADIUS,
            redundancy_elimination: true,
            clash_distance: DEFAULT_CLASH_DISTANCE,
            probe_radius: DEFAULT_PROBE_RADIUS,
            sphere_points: DEFAULT_SPHERE_POINTS,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            include_hydrogens: false,
            include_non_polymer: false,
        }
    }
}
