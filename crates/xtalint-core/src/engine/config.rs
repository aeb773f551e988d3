use crate::core::tables::radii::RadiusTable;
use crate::core::tables::reference_asa::ReferenceAsaTable;
use thiserror::Error;

pub const DEFAULT_CUTOFF: f64 = 5.0;
pub const DEFAULT_PROBE_RADIUS: f64 = 1.4;
pub const DEFAULT_SPHERE_POINTS: usize = 960;
pub const DEFAULT_THREADS: usize = 1;
pub const DEFAULT_SHELL_RADIUS: u32 = 2;
pub const DEFAULT_CLASH_DISTANCE: f64 = 1.5;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Parameters of the rolling-ball surface calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
    pub probe_radius: f64,
    pub sphere_points: usize,
    pub threads: usize,
    pub include_hydrogens: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            probe_radius: DEFAULT_PROBE_RADIUS,
            sphere_points: DEFAULT_SPHERE_POINTS,
            threads: DEFAULT_THREADS,
            include_hydrogens: false,
        }
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.probe_radius.is_finite() || self.probe_radius < 0.0 {
            return Err(invalid(
                "probe_radius",
                format!("must be a finite, non-negative distance (got {})", self.probe_radius),
            ));
        }
        if self.sphere_points == 0 {
            return Err(invalid("sphere_points", "at least one sphere point is required"));
        }
        if self.threads == 0 {
            return Err(invalid("threads", "at least one worker thread is required"));
        }
        Ok(())
    }
}

/// Which chains and residues take part in the analysis.
///
/// By default only protein chains are used, and hetero residues inside them
/// are dropped. With `include_non_polymer` every chain except pure water
/// chains is used and hetero residues are kept. Waters are never used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionConfig {
    pub include_non_polymer: bool,
}

/// Parameters of the symmetry search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub cutoff: f64,
    pub shell_radius: u32,
    pub redundancy_elimination: bool,
    pub clash_distance: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            shell_radius: DEFAULT_SHELL_RADIUS,
            redundancy_elimination: true,
            clash_distance: DEFAULT_CLASH_DISTANCE,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cutoff.is_finite() || self.cutoff <= 0.0 {
            return Err(invalid(
                "cutoff",
                format!("must be a finite, positive distance (got {})", self.cutoff),
            ));
        }
        if self.shell_radius == 0 {
            return Err(invalid("shell_radius", "must be at least 1"));
        }
        if !self.clash_distance.is_finite() || self.clash_distance < 0.0 {
            return Err(invalid(
                "clash_distance",
                format!("must be a finite, non-negative distance (got {})", self.clash_distance),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceConfig {
    pub search: SearchConfig,
    pub surface: SurfaceConfig,
    pub selection: SelectionConfig,
    pub radii: RadiusTable,
    pub reference_asa: ReferenceAsaTable,
}

#[derive(Default)]
pub struct InterfaceConfigBuilder {
    cutoff: Option<f64>,
    shell_radius: Option<u32>,
    redundancy_elimination: Option<bool>,
    clash_distance: Option<f64>,
    probe_radius: Option<f64>,
    sphere_points: Option<usize>,
    threads: Option<usize>,
    include_hydrogens: Option<bool>,
    include_non_polymer: Option<bool>,
    radii: Option<RadiusTable>,
    reference_asa: Option<ReferenceAsaTable>,
}

impl InterfaceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn shell_radius(mut self, shell: u32) -> Self {
        self.shell_radius = Some(shell);
        self
    }
    pub fn redundancy_elimination(mut self, enabled: bool) -> Self {
        self.redundancy_elimination = Some(enabled);
        self
    }
    pub fn clash_distance(mut self, distance: f64) -> Self {
        self.clash_distance = Some(distance);
        self
    }
    pub fn probe_radius(mut self, radius: f64) -> Self {
        self.probe_radius = Some(radius);
        self
    }
    pub fn sphere_points(mut self, n: usize) -> Self {
        self.sphere_points = Some(n);
        self
    }
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = Some(n);
        self
    }
    pub fn include_hydrogens(mut self, include: bool) -> Self {
        self.include_hydrogens = Some(include);
        self
    }
    pub fn include_non_polymer(mut self, include: bool) -> Self {
        self.include_non_polymer = Some(include);
        self
    }
    pub fn radii(mut self, table: RadiusTable) -> Self {
        self.radii = Some(table);
        self
    }
    pub fn reference_asa(mut self, table: ReferenceAsaTable) -> Self {
        self.reference_asa = Some(table);
        self
    }

    pub fn build(self) -> Result<InterfaceConfig, ConfigError> {
        let search_defaults = SearchConfig::default();
        let search = SearchConfig {
            cutoff: self.cutoff.unwrap_or(search_defaults.cutoff),
            shell_radius: self.shell_radius.unwrap_or(search_defaults.shell_radius),
            redundancy_elimination: self
                .redundancy_elimination
                .unwrap_or(search_defaults.redundancy_elimination),
            clash_distance: self.clash_distance.unwrap_or(search_defaults.clash_distance),
        };
        search.validate()?;

        let surface = build_surface(
            self.probe_radius,
            self.sphere_points,
            self.threads,
            self.include_hydrogens,
        )?;

        Ok(InterfaceConfig {
            search,
            surface,
            selection: SelectionConfig {
                include_non_polymer: self.include_non_polymer.unwrap_or(false),
            },
            radii: self.radii.unwrap_or_default(),
            reference_asa: self.reference_asa.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceAnalysisConfig {
    pub surface: SurfaceConfig,
    pub selection: SelectionConfig,
    pub radii: RadiusTable,
    pub reference_asa: ReferenceAsaTable,
}

#[derive(Default)]
pub struct SurfaceAnalysisConfigBuilder {
    probe_radius: Option<f64>,
    sphere_points: Option<usize>,
    threads: Option<usize>,
    include_hydrogens: Option<bool>,
    include_non_polymer: Option<bool>,
    radii: Option<RadiusTable>,
    reference_asa: Option<ReferenceAsaTable>,
}

impl SurfaceAnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe_radius(mut self, radius: f64) -> Self {
        self.probe_radius = Some(radius);
        self
    }
    pub fn sphere_points(mut self, n: usize) -> Self {
        self.sphere_points = Some(n);
        self
    }
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = Some(n);
        self
    }
    pub fn include_hydrogens(mut self, include: bool) -> Self {
        self.include_hydrogens = Some(include);
        self
    }
    pub fn include_non_polymer(mut self, include: bool) -> Self {
        self.include_non_polymer = Some(include);
        self
    }
    pub fn radii(mut self, table: RadiusTable) -> Self {
        self.radii = Some(table);
        self
    }
    pub fn reference_asa(mut self, table: ReferenceAsaTable) -> Self {
        self.reference_asa = Some(table);
        self
    }

    pub fn build(self) -> Result<SurfaceAnalysisConfig, ConfigError> {
        let surface = build_surface(
            self.probe_radius,
            self.sphere_points,
            self.threads,
            self.include_hydrogens,
        )?;
        Ok(SurfaceAnalysisConfig {
            surface,
            selection: SelectionConfig {
                include_non_polymer: self.include_non_polymer.unwrap_or(false),
            },
            radii: self.radii.unwrap_or_default(),
            reference_asa: self.reference_asa.unwrap_or_default(),
        })
    }
}

fn build_surface(
    probe_radius: Option<f64>,
    sphere_points: Option<usize>,
    threads: Option<usize>,
    include_hydrogens: Option<bool>,
) -> Result<SurfaceConfig, ConfigError> {
    let defaults = SurfaceConfig::default();
    let surface = SurfaceConfig {
        probe_radius: probe_radius.unwrap_or(defaults.probe_radius),
        sphere_points: sphere_points.unwrap_or(defaults.sphere_points),
        threads: threads.unwrap_or(defaults.threads),
        include_hydrogens: include_hydrogens.unwrap_or(defaults.include_hydrogens),
    };
    surface.validate()?;
    Ok(surface)
}
