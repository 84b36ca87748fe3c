//! Configuration models for study.json.
//!
//! A study file declares the parameter grid, the material library, and the
//! solver settings for one parametric impact study. Serde models here keep
//! the on-disk key spelling of the original study files (`E1`, `NU12`,
//! `GIc`, ...) via renames.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Default study definition path.
pub const STUDY_FILE: &str = "inputs/study.json";
/// Default directory for expanded case files.
pub const CASES_DIR: &str = "temp/cases";
/// Default scratch directory the solver runs in.
pub const TEMP_DIR: &str = "temp";

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the study file from disk.
    #[error("Failed to read study file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Error parsing the study file JSON.
    #[error("Failed to parse study JSON: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// One parameter axis of the study grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    /// Values this parameter sweeps over. Kept as raw JSON so axes can hold
    /// numbers, strings (material names), or lists (ply layups).
    pub values: Vec<serde_json::Value>,
}

/// Solver settings: mesh sizing, step time, and output density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Total simulation time in seconds.
    #[serde(default = "default_time")]
    pub time: f64,
    /// Element size for the refined (impact) region in mm.
    #[serde(default = "default_mesh_refined")]
    pub mesh_refined: f64,
    /// Element size for the coarse (outer) region in mm.
    #[serde(default = "default_mesh_coarse")]
    pub mesh_coarse: f64,
    /// Scale factor for the coarse region extent.
    #[serde(default = "default_coarse_scale")]
    pub coarse_scale: f64,
    /// Number of field output intervals.
    #[serde(default = "default_num_output_intervals")]
    pub num_output_intervals: u32,
}

fn default_time() -> f64 {
    0.008
}

fn default_mesh_refined() -> f64 {
    1.0
}

fn default_mesh_coarse() -> f64 {
    2.0
}

fn default_coarse_scale() -> f64 {
    2.0
}

fn default_num_output_intervals() -> u32 {
    250
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time: default_time(),
            mesh_refined: default_mesh_refined(),
            mesh_coarse: default_mesh_coarse(),
            coarse_scale: default_coarse_scale(),
            num_output_intervals: default_num_output_intervals(),
        }
    }
}

/// Material properties for lamina (ply) and cohesive interface layers.
///
/// Units follow the mm-s-ton-MPa system: moduli and tractions in MPa,
/// densities in ton/mm³, fracture energies in N/mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSetup {
    /// Elastic modulus in the fibre direction.
    #[serde(rename = "E1")]
    pub e1: f64,
    /// Elastic modulus transverse in-plane.
    #[serde(rename = "E2")]
    pub e2: f64,
    /// Elastic modulus through-thickness.
    #[serde(rename = "E3")]
    pub e3: f64,
    /// In-plane Poisson's ratio.
    #[serde(rename = "NU12")]
    pub nu12: f64,
    /// Out-of-plane Poisson's ratio (1-3).
    #[serde(rename = "NU13")]
    pub nu13: f64,
    /// Out-of-plane Poisson's ratio (2-3).
    #[serde(rename = "NU23")]
    pub nu23: f64,
    /// In-plane shear modulus.
    #[serde(rename = "G12")]
    pub g12: f64,
    /// Out-of-plane shear modulus (1-3).
    #[serde(rename = "G13")]
    pub g13: f64,
    /// Out-of-plane shear modulus (2-3).
    #[serde(rename = "G23")]
    pub g23: f64,
    /// Lamina density.
    pub rho_lam: f64,
    /// Cohesive normal elastic stiffness (MPa/mm).
    #[serde(rename = "En")]
    pub en: f64,
    /// Cohesive first shear stiffness (MPa/mm).
    #[serde(rename = "G1")]
    pub g1: f64,
    /// Cohesive second shear stiffness (MPa/mm).
    #[serde(rename = "G2")]
    pub g2: f64,
    /// Peak normal traction.
    #[serde(rename = "N")]
    pub n: f64,
    /// Peak first shear traction.
    #[serde(rename = "S1")]
    pub s1: f64,
    /// Peak second shear traction.
    #[serde(rename = "S2")]
    pub s2: f64,
    /// Benzeggagh-Kenane mixed-mode parameter.
    pub eta: f64,
    /// Mode I fracture energy.
    #[serde(rename = "GIc")]
    pub g_ic: f64,
    /// Mode II fracture energy.
    #[serde(rename = "GIIc")]
    pub g_iic: f64,
    /// Mode III fracture energy.
    #[serde(rename = "GIIIc")]
    pub g_iiic: f64,
    /// Cohesive layer density.
    pub rho_coh: f64,
}

/// Full parametric study definition, loaded from study.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Study name, used as the job-name prefix.
    pub study_name: String,
    /// Unit system label (e.g. "mm-s-ton-MPa").
    pub units: String,
    /// Parameter grid; combinations enumerate in key order.
    pub parameters: BTreeMap<String, ParameterDef>,
    /// Material library keyed by preset name.
    pub materials: HashMap<String, MaterialSetup>,
    /// Solver settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl StudyConfig {
    /// Load a study definition from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: StudyConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }
}
