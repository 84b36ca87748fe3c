//! Parametric study expansion.
//!
//! Expands a [`StudyConfig`] into individual simulation cases (one per point
//! of the parameter grid), writes them as `case{N}.json` files, and derives
//! the per-case [`ModelInput`] the model builder and job runner consume.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{MaterialSetup, SimulationConfig, StudyConfig};
use crate::output::ProgressSink;

/// Material preset assumed when a study omits the `material` parameter axis.
const DEFAULT_MATERIAL: &str = "MatA";

/// Error type for study expansion operations.
#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    /// Error reading or writing case files.
    #[error("Case file I/O failed: {0}")]
    IoError(#[from] std::io::Error),
    /// Error serialising or parsing case JSON.
    #[error("Case JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// A required parameter is absent from the case.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
    /// A parameter is present but has the wrong shape.
    #[error("Parameter '{name}' is not {expected}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Description of the expected shape.
        expected: &'static str,
    },
    /// The case references a material not in the study's library.
    #[error("Unknown material preset: {0}")]
    UnknownMaterial(String),
}

/// Generate all combinations of parameter values, in key order.
///
/// Each combination maps parameter name to one value drawn from that
/// parameter's list. An empty grid yields a single empty combination; a
/// parameter with no values yields none.
pub fn parameter_combinations(
    parameters: &BTreeMap<String, crate::config::ParameterDef>,
) -> Vec<BTreeMap<String, Value>> {
    let mut combos: Vec<BTreeMap<String, Value>> = vec![BTreeMap::new()];

    for (name, def) in parameters {
        let mut next = Vec::with_capacity(combos.len() * def.values.len());
        for combo in &combos {
            for value in &def.values {
                let mut extended = combo.clone();
                extended.insert(name.clone(), value.clone());
                next.push(extended);
            }
        }
        combos = next;
    }

    combos
}

/// Complete configuration for one expanded case, as stored in `case{N}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseConfig {
    /// Case number within the study (1-based).
    pub case_id: u32,
    /// Study name, used as the job-name prefix.
    pub study_name: String,
    /// Unit system label.
    pub units: String,
    /// Timestamp of the expansion run (YYYYMMDD).
    pub created_at: String,
    /// The parameter values selected for this case.
    pub parameters: BTreeMap<String, Value>,
    /// Name of the material preset this case uses.
    pub material_name: String,
    /// The resolved material properties.
    pub material_properties: MaterialSetup,
    /// Solver settings shared by all cases of the study.
    pub simulation: SimulationConfig,
}

impl CaseConfig {
    /// Unique solver job name for this case: `{study_name}_{case_id}`.
    pub fn job_name(&self) -> String {
        format!("{}_{}", self.study_name, self.case_id)
    }

    /// Load a case file from disk.
    pub fn load(path: &Path) -> Result<Self, StudyError> {
        let contents = fs::read_to_string(path)?;
        let case: CaseConfig = serde_json::from_str(&contents)?;
        Ok(case)
    }

    /// Write this case to disk as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), StudyError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Reference to one written case file.
#[derive(Debug, Clone)]
pub struct CaseRef {
    /// Path of the written `case{N}.json`.
    pub path: PathBuf,
    /// Solver job name for the case.
    pub job_name: String,
}

/// Expand a study into case files under `<out_dir>/<timestamp>/`.
///
/// Returns one [`CaseRef`] per case, numbered from 1 in grid order.
pub fn split_into_cases(
    study: &StudyConfig,
    out_dir: &Path,
    timestamp: &str,
) -> Result<Vec<CaseRef>, StudyError> {
    let combos = parameter_combinations(&study.parameters);
    let case_dir = out_dir.join(timestamp);
    fs::create_dir_all(&case_dir)?;

    let mut refs = Vec::with_capacity(combos.len());
    for (i, params) in combos.into_iter().enumerate() {
        let case_id = (i + 1) as u32;

        let material_name = params
            .get("material")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_MATERIAL)
            .to_string();
        let material = study
            .materials
            .get(&material_name)
            .ok_or_else(|| StudyError::UnknownMaterial(material_name.clone()))?;

        let case = CaseConfig {
            case_id,
            study_name: study.study_name.clone(),
            units: study.units.clone(),
            created_at: timestamp.to_string(),
            parameters: params,
            material_name,
            material_properties: material.clone(),
            simulation: study.simulation.clone(),
        };

        let path = case_dir.join(format!("case{case_id}.json"));
        case.save(&path)?;

        refs.push(CaseRef {
            path,
            job_name: case.job_name(),
        });
    }

    Ok(refs)
}

/// Fully resolved inputs for a single simulation model.
///
/// Masses are in tons and speeds in mm/s (the solver's mm-s-ton-MPa system);
/// the kg value from the study file is converted during derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    /// Unique identifier (the case id).
    pub uid: String,
    /// Study name.
    pub study: String,
    /// Expansion timestamp.
    pub created_at: String,
    /// Unit system label.
    pub units: String,
    /// Plate width in mm.
    pub width: f64,
    /// Plate length in mm.
    pub length: f64,
    /// Ply angles in degrees, bottom to top.
    pub ply_angles: Vec<i64>,
    /// Ply thickness in mm.
    pub ply_thk: f64,
    /// Cohesive layer thickness in mm.
    pub coh_thk: f64,
    /// Impactor radius in mm.
    pub imp_radius: f64,
    /// Impactor mass in tons.
    pub imp_mass: f64,
    /// Impact velocity in mm/s.
    pub imp_speed: f64,
    /// Material preset name.
    pub material_name: String,
    /// Material properties.
    pub material: MaterialSetup,
}

impl ModelInput {
    /// Derive the model input from a loaded case.
    pub fn from_case(case: &CaseConfig) -> Result<Self, StudyError> {
        Ok(Self {
            uid: case.case_id.to_string(),
            study: case.study_name.clone(),
            created_at: case.created_at.clone(),
            units: case.units.clone(),
            width: param_f64(&case.parameters, "width")?,
            length: param_f64(&case.parameters, "length")?,
            ply_angles: param_angles(&case.parameters, "ply_angles")?,
            ply_thk: param_f64(&case.parameters, "ply_thk")?,
            coh_thk: param_f64(&case.parameters, "coh_thk")?,
            imp_radius: param_f64(&case.parameters, "imp_radius")?,
            // Study files carry the impactor mass in kg
            imp_mass: param_f64(&case.parameters, "imp_mass_kg")? / 1000.0,
            imp_speed: param_f64(&case.parameters, "imp_speed")?,
            material_name: case.material_name.clone(),
            material: case.material_properties.clone(),
        })
    }

    /// Number of plies in the layup.
    pub fn n_ply(&self) -> usize {
        self.ply_angles.len()
    }

    /// Number of cohesive layers.
    ///
    /// Cohesive interfaces are inserted only between adjacent plies with
    /// different fibre orientations, to capture delamination.
    pub fn n_coh(&self) -> usize {
        self.ply_angles
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .count()
    }

    /// Total plate thickness in mm.
    pub fn plate_thickness(&self) -> f64 {
        self.n_ply() as f64 * self.ply_thk
    }

    /// Impact kinetic energy in Joules (0.5 * m * v²).
    pub fn impact_energy_j(&self) -> f64 {
        let m_kg = self.imp_mass * 1000.0;
        let v_m_s = self.imp_speed / 1000.0;
        0.5 * m_kg * v_m_s * v_m_s
    }

    /// Unique solver job name: `{study}_{uid}`.
    pub fn job_name(&self) -> String {
        format!("{}_{}", self.study, self.uid)
    }

    /// Write a human-readable `config_summary.txt` into `dir`.
    pub fn write_summary(&self, dir: &Path) -> Result<(), StudyError> {
        let mut text = String::new();
        text.push_str("Job Summary\n===========\n");
        text.push_str(&format!("Job Name: {}\n", self.job_name()));

        text.push_str("\nPlate Data:\n===========\n");
        text.push_str(&format!("Ply Angles: {:?}\n", self.ply_angles));
        text.push_str(&format!("Ply Thickness (mm): {:.3}\n", self.ply_thk));
        text.push_str(&format!("Cohesive Thickness (mm): {:.3}\n", self.coh_thk));
        text.push_str(&format!("Number of Plies: {}\n", self.n_ply()));
        text.push_str(&format!("Number of Cohesive Layers: {}\n", self.n_coh()));
        text.push_str(&format!(
            "Plate Thickness (mm): {:.3}\n",
            self.plate_thickness()
        ));

        text.push_str("\nImpactor Data:\n===========\n");
        text.push_str(&format!("Impact Radius (mm): {:.1}\n", self.imp_radius));
        text.push_str(&format!("Impact Mass (kg): {:.3}\n", self.imp_mass * 1e3));
        text.push_str(&format!(
            "Impact Speed (m/s): {:.1}\n",
            self.imp_speed * 1e-3
        ));
        text.push_str(&format!("Impact Energy (J): {:.1}\n", self.impact_energy_j()));

        fs::write(dir.join("config_summary.txt"), text)?;
        Ok(())
    }
}

/// Write the study summary report (totals plus unique-value counts per
/// parameter) to the given sink.
pub fn write_study_summary(study: &StudyConfig, sink: &mut dyn ProgressSink) {
    let combos = parameter_combinations(&study.parameters);

    sink.section("PARAMETRIC STUDY SUMMARY");
    sink.emit(&format!("Total configurations: {}", combos.len()));

    sink.emit("");
    sink.emit(&format!("Study: {}", study.study_name));
    sink.emit(&format!("Units: {}", study.units));

    sink.emit("");
    sink.emit("Parameter variations:");
    for (name, def) in &study.parameters {
        let mut reprs: Vec<String> = def.values.iter().map(|v| v.to_string()).collect();
        reprs.sort();
        reprs.dedup();
        sink.emit(&format!("  {name:20}: {} unique values", reprs.len()));
    }
}

fn param_f64(params: &BTreeMap<String, Value>, name: &str) -> Result<f64, StudyError> {
    let value = params
        .get(name)
        .ok_or_else(|| StudyError::MissingParameter(name.to_string()))?;
    value.as_f64().ok_or_else(|| StudyError::InvalidParameter {
        name: name.to_string(),
        expected: "a number",
    })
}

fn param_angles(params: &BTreeMap<String, Value>, name: &str) -> Result<Vec<i64>, StudyError> {
    let value = params
        .get(name)
        .ok_or_else(|| StudyError::MissingParameter(name.to_string()))?;
    let items = value.as_array().ok_or_else(|| StudyError::InvalidParameter {
        name: name.to_string(),
        expected: "a list of angles",
    })?;
    items
        .iter()
        .map(|v| {
            v.as_i64().ok_or_else(|| StudyError::InvalidParameter {
                name: name.to_string(),
                expected: "a list of integer angles",
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::SAMPLE_STUDY;
    use crate::output::MemorySink;
    use tempfile::TempDir;

    fn sample_study() -> StudyConfig {
        serde_json::from_str(SAMPLE_STUDY).unwrap()
    }

    #[test]
    fn test_combination_count_is_product_of_axes() {
        let study = sample_study();
        let combos = parameter_combinations(&study.parameters);
        // Two layups x two masses, everything else single-valued
        assert_eq!(combos.len(), 4);
    }

    #[test]
    fn test_combinations_are_deterministic() {
        let study = sample_study();
        let a = parameter_combinations(&study.parameters);
        let b = parameter_combinations(&study.parameters);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_grid_yields_one_empty_combination() {
        let combos = parameter_combinations(&BTreeMap::new());
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn test_split_writes_case_files() {
        let study = sample_study();
        let temp = TempDir::new().unwrap();

        let refs = split_into_cases(&study, temp.path(), "20250505").unwrap();
        assert_eq!(refs.len(), 4);
        assert_eq!(refs[0].job_name, "drop_test_1");
        assert_eq!(refs[3].job_name, "drop_test_4");

        for r in &refs {
            assert!(r.path.exists());
            assert!(r.path.starts_with(temp.path().join("20250505")));
        }

        let case = CaseConfig::load(&refs[1].path).unwrap();
        assert_eq!(case.case_id, 2);
        assert_eq!(case.created_at, "20250505");
        assert_eq!(case.material_name, "MatA");
    }

    #[test]
    fn test_split_rejects_unknown_material() {
        let mut study = sample_study();
        study.parameters.get_mut("material").unwrap().values =
            vec![Value::String("Unobtainium".to_string())];
        let temp = TempDir::new().unwrap();

        let err = split_into_cases(&study, temp.path(), "20250505").unwrap_err();
        assert!(matches!(err, StudyError::UnknownMaterial(name) if name == "Unobtainium"));
    }

    #[test]
    fn test_case_round_trips_to_model_input() {
        let study = sample_study();
        let temp = TempDir::new().unwrap();
        let refs = split_into_cases(&study, temp.path(), "20250505").unwrap();

        let case = CaseConfig::load(&refs[0].path).unwrap();
        let input = ModelInput::from_case(&case).unwrap();

        assert_eq!(input.job_name(), refs[0].job_name);
        assert_eq!(input.width, 100.0);
        // ply_angles sorts after imp_mass_kg, so it is the faster-varying axis
        assert_eq!(input.ply_angles, vec![0, 90, 0]);
        // 5 kg converted to tons
        assert_eq!(input.imp_mass, 0.005);
    }

    #[test]
    fn test_cohesive_layers_count_only_angle_changes() {
        let case_angles = |angles: Vec<i64>| ModelInput {
            uid: "1".to_string(),
            study: "s".to_string(),
            created_at: "20250505".to_string(),
            units: "mm-s-ton-MPa".to_string(),
            width: 100.0,
            length: 100.0,
            ply_angles: angles,
            ply_thk: 0.25,
            coh_thk: 0.01,
            imp_radius: 8.0,
            imp_mass: 0.005,
            imp_speed: 2000.0,
            material_name: "MatA".to_string(),
            material: sample_study().materials["MatA"].clone(),
        };

        assert_eq!(case_angles(vec![0, 90, 0]).n_coh(), 2);
        assert_eq!(case_angles(vec![0, 45, -45, 0]).n_coh(), 3);
        assert_eq!(case_angles(vec![0, 0, 0]).n_coh(), 0);
        assert_eq!(case_angles(vec![0]).n_coh(), 0);
    }

    #[test]
    fn test_impact_energy_in_joules() {
        let study = sample_study();
        let temp = TempDir::new().unwrap();
        let refs = split_into_cases(&study, temp.path(), "20250505").unwrap();
        let case = CaseConfig::load(&refs[0].path).unwrap();
        let input = ModelInput::from_case(&case).unwrap();

        // 5 kg at 2 m/s: 0.5 * 5 * 2^2 = 10 J
        assert!((input.impact_energy_j() - 10.0).abs() < 1e-9);
        assert_eq!(input.plate_thickness(), 3.0 * 0.25);
    }

    #[test]
    fn test_missing_parameter_is_reported_by_name() {
        let study = sample_study();
        let temp = TempDir::new().unwrap();
        let refs = split_into_cases(&study, temp.path(), "20250505").unwrap();
        let mut case = CaseConfig::load(&refs[0].path).unwrap();
        case.parameters.remove("imp_speed");

        let err = ModelInput::from_case(&case).unwrap_err();
        assert!(matches!(err, StudyError::MissingParameter(name) if name == "imp_speed"));
    }

    #[test]
    fn test_write_summary_file() {
        let study = sample_study();
        let temp = TempDir::new().unwrap();
        let refs = split_into_cases(&study, temp.path(), "20250505").unwrap();
        let case = CaseConfig::load(&refs[0].path).unwrap();
        let input = ModelInput::from_case(&case).unwrap();

        input.write_summary(temp.path()).unwrap();
        let text = std::fs::read_to_string(temp.path().join("config_summary.txt")).unwrap();
        assert!(text.contains("Job Name: drop_test_1"));
        assert!(text.contains("Impact Energy (J): 10.0"));
    }

    #[test]
    fn test_study_summary_reports_unique_counts() {
        let study = sample_study();
        let mut sink = MemorySink::new();
        write_study_summary(&study, &mut sink);

        assert!(sink.contains("PARAMETRIC STUDY SUMMARY"));
        assert!(sink.contains("Total configurations: 4"));
        assert!(sink
            .lines
            .iter()
            .any(|l| l.contains("imp_mass_kg") && l.contains("2 unique values")));
        assert!(sink
            .lines
            .iter()
            .any(|l| l.contains("width") && l.contains("1 unique values")));
    }
}
