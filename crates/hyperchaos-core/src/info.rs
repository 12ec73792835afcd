//! Per-system descriptions.

use std::fmt;

use hyperchaos_dynamics::{State, SystemConfig};
use serde::Serialize;

/// One named coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedParameter {
    /// Coefficient name
    pub name: &'static str,
    /// Coefficient value
    pub value: f64,
}

/// Name, coefficients and initial condition of one session system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    /// Position in round order
    pub index: usize,
    /// Human-readable name
    pub name: &'static str,
    /// State-space dimension
    pub dimensions: usize,
    /// Coefficients in declaration order
    pub parameters: Vec<NamedParameter>,
    /// Initial condition actually integrated
    pub initial_conditions: State,
    /// Leading bitstream bits as `0`/`1` characters, empty when unknown
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bitstream_preview: String,
}

impl SystemInfo {
    /// Describes `config` as system `index`.
    pub fn describe(index: usize, config: &SystemConfig) -> Self {
        let system = config.system();
        Self {
            index,
            name: system.name(),
            dimensions: system.dimensions(),
            parameters: system
                .parameters()
                .into_iter()
                .map(|(name, value)| NamedParameter { name, value })
                .collect(),
            initial_conditions: *config.initial_condition(),
            bitstream_preview: String::new(),
        }
    }

    /// Attaches the leading bits of the system's bitstream.
    #[must_use]
    pub fn with_bitstream_preview(mut self, bits: &[bool]) -> Self {
        self.bitstream_preview = bits.iter().map(|bit| if *bit { '1' } else { '0' }).collect();
        self
    }
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (dim {})", self.index, self.name, self.dimensions)?;
        for p in &self.parameters {
            write!(f, " {}={}", p.name, p.value)?;
        }
        let [x, y, z, w] = self.initial_conditions;
        write!(f, " ic=({x}, {y}, {z}, {w})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_lists_parameters_in_order() {
        let info = SystemInfo::describe(1, &SystemConfig::reference_set()[1]);
        assert_eq!(info.name, "Chen Hyperchaos");
        assert_eq!(info.dimensions, 4);
        let names: Vec<_> = info.parameters.iter().map(|p| p.name).collect();
        assert_eq!(names, ["a", "b", "c", "d", "r"]);
    }

    #[test]
    fn display_is_single_line() {
        let info = SystemInfo::describe(0, &SystemConfig::reference_set()[0]);
        assert_eq!(
            info.to_string(),
            "[0] Rössler Hyperchaos (dim 4) a=0.25 b=3 c=0.5 d=0.05 ic=(-10, -6, 0, 10)"
        );
    }

    #[test]
    fn serializes_to_json() {
        let info = SystemInfo::describe(2, &SystemConfig::reference_set()[2]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["name"], "Hyperchaotic Lorenz");
        assert_eq!(json["parameters"][0]["name"], "sigma");
        assert_eq!(json["initial_conditions"][3], 1.0);
        assert!(json.get("bitstream_preview").is_none());
    }

    #[test]
    fn preview_renders_bits_as_digits() {
        let info = SystemInfo::describe(0, &SystemConfig::reference_set()[0])
            .with_bitstream_preview(&[true, false, false, true, true]);
        assert_eq!(info.bitstream_preview, "10011");
        assert!(!info.to_string().contains("10011"));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["bitstream_preview"], "10011");
    }
}
