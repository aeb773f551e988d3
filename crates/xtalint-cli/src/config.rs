pub mod defaults;

use crate::cli::{InterfacesArgs, SurfaceArgs, SurfaceOptions};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use xtalint::core::crystal::space_group::SpaceGroup;
use xtalint::core::tables::radii::RadiusTable;
use xtalint::core::tables::reference_asa::ReferenceAsaTable;
use xtalint::engine::config as core_config;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSearchConfig {
    cutoff: Option<f64>,
    shell: Option<u32>,
    redundancy_elimination: Option<bool>,
    clash_distance: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSurfaceConfig {
    probe: Option<f64>,
    sphere_points: Option<usize>,
    threads: Option<usize>,
    include_hydrogens: Option<bool>,
    /// TOML file of `Element = radius` overrides.
    radii: Option<PathBuf>,
    /// CSV file with `residue,asa` columns.
    reference_asa: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSelectionConfig {
    include_non_polymer: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialCrystalConfig {
    space_group: Option<String>,
    operators: Option<Vec<String>>,
}

/// Run configuration as read from a TOML file; every value is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    search: Option<PartialSearchConfig>,
    surface: Option<PartialSurfaceConfig>,
    selection: Option<PartialSelectionConfig>,
    crystal: Option<PartialCrystalConfig>,
    /// Directory that relative table paths are resolved against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Surface and selection settings after merging every source.
struct MergedSurface {
    probe_radius: f64,
    sphere_points: usize,
    threads: usize,
    include_hydrogens: bool,
    include_non_polymer: bool,
    radii: RadiusTable,
    reference_asa: ReferenceAsaTable,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Reads `path` when given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_interfaces(
        mut self,
        args: &InterfacesArgs,
        threads: Option<usize>,
    ) -> Result<core_config::InterfaceConfig> {
        let defaults = DefaultsConfig::default();

        let search = self.search.take().unwrap_or_default();
        let surface = self.merge_surface_options(&args.surface, threads, &defaults)?;

        let redundancy_elimination = if args.no_redundancy_elimination {
            false
        } else {
            search
                .redundancy_elimination
                .unwrap_or(defaults.redundancy_elimination)
        };

        core_config::InterfaceConfigBuilder::new()
            .cutoff(args.cutoff.or(search.cutoff).unwrap_or(defaults.cutoff))
            .shell_radius(
                args.shell_radius
                    .or(search.shell)
                    .unwrap_or(defaults.shell_radius),
            )
            .redundancy_elimination(redundancy_elimination)
            .clash_distance(search.clash_distance.unwrap_or(defaults.clash_distance))
            .probe_radius(surface.probe_radius)
            .sphere_points(surface.sphere_points)
            .threads(surface.threads)
            .include_hydrogens(surface.include_hydrogens)
            .include_non_polymer(surface.include_non_polymer)
            .radii(surface.radii)
            .reference_asa(surface.reference_asa)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn merge_surface(
        mut self,
        args: &SurfaceArgs,
        threads: Option<usize>,
    ) -> Result<core_config::SurfaceAnalysisConfig> {
        let defaults = DefaultsConfig::default();
        let surface = self.merge_surface_options(&args.surface, threads, &defaults)?;

        core_config::SurfaceAnalysisConfigBuilder::new()
            .probe_radius(surface.probe_radius)
            .sphere_points(surface.sphere_points)
            .threads(surface.threads)
            .include_hydrogens(surface.include_hydrogens)
            .include_non_polymer(surface.include_non_polymer)
            .radii(surface.radii)
            .reference_asa(surface.reference_asa)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// The space group that replaces the one from the structure file, if any.
    ///
    /// A symbol on the command line wins over the `[crystal]` section; within
    /// the section an explicit operator list wins over a symbol.
    pub fn space_group_override(&self, cli_symbol: Option<&str>) -> Result<Option<SpaceGroup>> {
        let to_config_error = |e: xtalint::core::crystal::error::CrystalError| {
            CliError::Config(e.to_string())
        };

        if let Some(symbol) = cli_symbol {
            return SpaceGroup::from_symbol(symbol)
                .map(Some)
                .map_err(to_config_error);
        }
        let Some(crystal) = self.crystal.as_ref() else {
            return Ok(None);
        };
        match (&crystal.operators, &crystal.space_group) {
            (Some(operators), symbol) => {
                let symbol = symbol.as_deref().unwrap_or("custom");
                SpaceGroup::from_algebraic(symbol, operators.as_slice())
                    .map(Some)
                    .map_err(to_config_error)
            }
            (None, Some(symbol)) => SpaceGroup::from_symbol(symbol)
                .map(Some)
                .map_err(to_config_error),
            (None, None) => Ok(None),
        }
    }

    fn merge_surface_options(
        &mut self,
        options: &SurfaceOptions,
        threads: Option<usize>,
        defaults: &DefaultsConfig,
    ) -> Result<MergedSurface> {
        let surface = self.surface.take().unwrap_or_default();
        let selection = self.selection.take().unwrap_or_default();

        let radii = match &surface.radii {
            Some(path) => {
                let path = self.resolve_path(path);
                RadiusTable::load_overrides(&path).map_err(|e| CliError::FileParsing {
                    path,
                    source: e.into(),
                })?
            }
            None => RadiusTable::default(),
        };
        let reference_asa = match &surface.reference_asa {
            Some(path) => {
                let path = self.resolve_path(path);
                ReferenceAsaTable::load(&path).map_err(|e| CliError::FileParsing {
                    path,
                    source: e.into(),
                })?
            }
            None => ReferenceAsaTable::default(),
        };

        Ok(MergedSurface {
            probe_radius: options
                .probe_radius
                .or(surface.probe)
                .unwrap_or(defaults.probe_radius),
            sphere_points: options
                .sphere_points
                .or(surface.sphere_points)
                .unwrap_or(defaults.sphere_points),
            threads: threads.or(surface.threads).unwrap_or(defaults.threads),
            include_hydrogens: options.include_hydrogens
                || surface
                    .include_hydrogens
                    .unwrap_or(defaults.include_hydrogens),
            include_non_polymer: options.include_non_polymer
                || selection
                    .include_non_polymer
                    .unwrap_or(defaults.include_non_polymer),
            radii,
            reference_asa,
        })
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Applies `-S key=value` overrides on top of the file values.
    pub fn with_set_values(mut self, set_values: &[String]) -> Result<Self> {
        self.apply_set_values(set_values)?;
        Ok(self)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value_str) = (key.trim(), value_str.trim());

            match key {
                "search.cutoff" => {
                    self.search.get_or_insert_with(Default::default).cutoff =
                        Some(parse_value(key, value_str)?);
                }
                "search.shell" => {
                    self.search.get_or_insert_with(Default::default).shell =
                        Some(parse_value(key, value_str)?);
                }
                "search.redundancy-elimination" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .redundancy_elimination = Some(parse_value(key, value_str)?);
                }
                "search.clash-distance" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .clash_distance = Some(parse_value(key, value_str)?);
                }
                "surface.probe" => {
                    self.surface.get_or_insert_with(Default::default).probe =
                        Some(parse_value(key, value_str)?);
                }
                "surface.sphere-points" => {
                    self.surface
                        .get_or_insert_with(Default::default)
                        .sphere_points = Some(parse_value(key, value_str)?);
                }
                "surface.threads" => {
                    self.surface.get_or_insert_with(Default::default).threads =
                        Some(parse_value(key, value_str)?);
                }
                "surface.include-hydrogens" => {
                    self.surface
                        .get_or_insert_with(Default::default)
                        .include_hydrogens = Some(parse_value(key, value_str)?);
                }
                "selection.include-non-polymer" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .include_non_polymer = Some(parse_value(key, value_str)?);
                }
                "crystal.space-group" => {
                    self.crystal
                        .get_or_insert_with(Default::default)
                        .space_group = Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn interfaces_args(extra: &[&str]) -> InterfacesArgs {
        let mut args = vec!["xtalint", "interfaces", "-i", "in.pdb"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Interfaces(args) => args,
            _ => panic!("Expected 'interfaces' subcommand"),
        }
    }

    fn surface_args(extra: &[&str]) -> SurfaceArgs {
        let mut args = vec!["xtalint", "surface", "-i", "in.pdb"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Surface(args) => args,
            _ => panic!("Expected 'surface' subcommand"),
        }
    }

    #[test]
    fn empty_configuration_uses_defaults() {
        let config = PartialRunConfig::default()
            .merge_interfaces(&interfaces_args(&[]), Some(1))
            .unwrap();

        assert_eq!(config.search.cutoff, 5.0);
        assert_eq!(config.search.shell_radius, 2);
        assert!(config.search.redundancy_elimination);
        assert_eq!(config.search.clash_distance, 1.5);
        assert_eq!(config.surface.probe_radius, 1.4);
        assert_eq!(config.surface.sphere_points, 960);
        assert_eq!(config.surface.threads, 1);
        assert!(!config.surface.include_hydrogens);
        assert!(!config.selection.include_non_polymer);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "file.toml",
            r#"
            [search]
            cutoff = 4.0
            shell = 1
            redundancy-elimination = false

            [surface]
            probe = 1.2
            sphere-points = 240
            threads = 3

            [selection]
            include-non-polymer = true
            "#,
        );

        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_interfaces(&interfaces_args(&[]), None)
            .unwrap();

        assert_eq!(config.search.cutoff, 4.0);
        assert_eq!(config.search.shell_radius, 1);
        assert!(!config.search.redundancy_elimination);
        assert_eq!(config.surface.probe_radius, 1.2);
        assert_eq!(config.surface.sphere_points, 240);
        assert_eq!(config.surface.threads, 3);
        assert!(config.selection.include_non_polymer);
    }

    #[test]
    fn cli_args_override_set_values_which_override_the_file() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "priority.toml",
            r#"
            [search]
            cutoff = 4.0
            clash-distance = 1.0

            [surface]
            sphere-points = 240
            threads = 3
            "#,
        );

        let args = interfaces_args(&[
            "--cutoff",
            "6.0",
            "-S",
            "search.cutoff=3.0",
            "-S",
            "search.clash-distance=2.0",
            "-S",
            "surface.sphere-points=480",
        ]);
        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .with_set_values(&args.set_values)
            .unwrap()
            .merge_interfaces(&args, Some(8))
            .unwrap();

        assert_eq!(config.search.cutoff, 6.0);
        assert_eq!(config.search.clash_distance, 2.0);
        assert_eq!(config.surface.sphere_points, 480);
        assert_eq!(config.surface.threads, 8);
    }

    #[test]
    fn flags_enable_boolean_options() {
        let args = interfaces_args(&[
            "--include-hydrogens",
            "--include-non-polymer",
            "--no-redundancy-elimination",
        ]);
        let config = PartialRunConfig::default()
            .merge_interfaces(&args, Some(1))
            .unwrap();
        assert!(config.surface.include_hydrogens);
        assert!(config.selection.include_non_polymer);
        assert!(!config.search.redundancy_elimination);
    }

    #[test]
    fn unknown_keys_in_file_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "unknown.toml", "[search]\nradius = 3.0\n");
        let result = PartialRunConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["search.cutoff", "search.cutoff=abc", "search.unknown=1"] {
            let args = interfaces_args(&["-S", bad]);
            let result = PartialRunConfig::default()
                .with_set_values(&args.set_values)
                .and_then(|config| config.merge_interfaces(&args, Some(1)));
            assert!(matches!(result, Err(CliError::Config(_))), "{} accepted", bad);
        }
    }

    #[test]
    fn invalid_values_fail_validation() {
        let args = interfaces_args(&["--cutoff=-1.0"]);
        let result = PartialRunConfig::default().merge_interfaces(&args, Some(1));
        match result {
            Err(CliError::Config(msg)) => assert!(msg.contains("cutoff")),
            other => panic!("Expected a configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn relative_table_paths_resolve_against_the_config_directory() {
        let dir = tempdir().unwrap();
        write_config_file(&dir, "radii.toml", "S = 2.0\n");
        write_config_file(&dir, "reference.csv", "residue,asa\nGLY,90.0\n");
        let path = write_config_file(
            &dir,
            "tables.toml",
            "[surface]\nradii = \"radii.toml\"\nreference-asa = \"reference.csv\"\n",
        );

        let config = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_surface(&surface_args(&[]), Some(1))
            .unwrap();

        assert_eq!(config.radii.element_radius("S"), Some(2.0));
        assert_eq!(
            config
                .reference_asa
                .get(xtalint::core::models::residue::AminoAcidType::Glycine),
            Some(90.0)
        );
    }

    #[test]
    fn missing_table_file_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "missing.toml", "[surface]\nradii = \"nope.toml\"\n");
        let result = PartialRunConfig::from_file(&path)
            .unwrap()
            .merge_surface(&surface_args(&[]), Some(1));
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn space_group_override_prefers_the_command_line() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "crystal.toml",
            "[crystal]\nspace-group = \"P 21 21 21\"\n",
        );
        let config = PartialRunConfig::from_file(&path).unwrap();

        let from_file = config.space_group_override(None).unwrap().unwrap();
        assert_eq!(from_file.num_operators(), 4);

        let from_cli = config.space_group_override(Some("P 1")).unwrap().unwrap();
        assert_eq!(from_cli.num_operators(), 1);
    }

    #[test]
    fn explicit_operators_build_a_custom_space_group() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "operators.toml",
            "[crystal]\noperators = [\"X,Y,Z\", \"-X,Y+1/2,-Z\"]\n",
        );
        let config = PartialRunConfig::from_file(&path).unwrap();
        let group = config.space_group_override(None).unwrap().unwrap();
        assert_eq!(group.num_operators(), 2);
        assert_eq!(group.symbol(), "custom");
    }

    #[test]
    fn set_value_selects_a_space_group() {
        let config = PartialRunConfig::default()
            .with_set_values(&["crystal.space-group=C 1 2 1".to_string()])
            .unwrap();
        let group = config.space_group_override(None).unwrap().unwrap();
        assert_eq!(group.num_operators(), 4);
    }

    #[test]
    fn unknown_space_group_is_a_configuration_error() {
        let config = PartialRunConfig::default();
        let result = config.space_group_override(Some("Q 7"));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
