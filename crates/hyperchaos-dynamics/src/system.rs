//! Hyperchaotic vector fields
//!
//! The supported systems form a closed set. Each variant carries its own
//! coefficients and supplies both the right-hand side `f(x)` and the analytic
//! Jacobian `Df(x)`, so integrator and verifier never need to know which
//! concrete system they are driving.
//!
//! | Variant   | Right-hand side                                              |
//! |-----------|--------------------------------------------------------------|
//! | Rössler   | `-y-z`, `x+ay+w`, `b+xz`, `-cz+dw`                           |
//! | Chen      | `a(y-x)+w`, `dx-xz+cy`, `xy-bz`, `yz+rw`                     |
//! | Lorenz    | `σ(y-x)+w`, `ρx-y-xz`, `xy-βz`, `-yz+kw`                     |

use serde::{Deserialize, Serialize};

use crate::{DIM, State, error::DynamicsError, linalg::Matrix4};

/// A 4-dimensional hyperchaotic vector field with fixed coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HyperchaoticSystem {
    /// Rössler hyperchaos
    Rossler {
        /// Linear feedback on `y`
        a: f64,
        /// Constant forcing on `z`
        b: f64,
        /// Coupling from `z` into `w`
        c: f64,
        /// Linear feedback on `w`
        d: f64,
    },
    /// Chen hyperchaos (Li, Tang and Chen form)
    Chen {
        /// Diffusive coupling between `x` and `y`
        a: f64,
        /// Damping of `z`
        b: f64,
        /// Linear feedback on `y`
        c: f64,
        /// Drive from `x` into `y`
        d: f64,
        /// Linear feedback on `w`
        r: f64,
    },
    /// Hyperchaotic Lorenz (Wang and Wang form)
    Lorenz {
        /// Prandtl number
        sigma: f64,
        /// Rayleigh number
        rho: f64,
        /// Geometric factor
        beta: f64,
        /// Linear feedback on `w`
        k: f64,
    },
}

impl HyperchaoticSystem {
    /// Rössler coefficients used by the reference configuration.
    pub const ROSSLER: Self = Self::Rossler { a: 0.25, b: 3.0, c: 0.5, d: 0.05 };

    /// Chen coefficients used by the reference configuration.
    pub const CHEN: Self = Self::Chen { a: 35.0, b: 3.0, c: 12.0, d: 7.0, r: 0.5 };

    /// Lorenz coefficients used by the reference configuration.
    pub const LORENZ: Self = Self::Lorenz { sigma: 10.0, rho: 28.0, beta: 8.0 / 3.0, k: -1.0 };

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rossler { .. } => "Rössler Hyperchaos",
            Self::Chen { .. } => "Chen Hyperchaos",
            Self::Lorenz { .. } => "Hyperchaotic Lorenz",
        }
    }

    /// Named coefficients in declaration order.
    pub fn parameters(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Self::Rossler { a, b, c, d } => vec![("a", a), ("b", b), ("c", c), ("d", d)],
            Self::Chen { a, b, c, d, r } => {
                vec![("a", a), ("b", b), ("c", c), ("d", d), ("r", r)]
            },
            Self::Lorenz { sigma, rho, beta, k } => {
                vec![("sigma", sigma), ("rho", rho), ("beta", beta), ("k", k)]
            },
        }
    }

    /// Evaluates the vector field at `s`.
    pub fn derivative(&self, s: &State) -> State {
        let [x, y, z, w] = *s;
        match *self {
            Self::Rossler { a, b, c, d } => [-y - z, x + a * y + w, b + x * z, -c * z + d * w],
            Self::Chen { a, b, c, d, r } => {
                [a * (y - x) + w, d * x - x * z + c * y, x * y - b * z, y * z + r * w]
            },
            Self::Lorenz { sigma, rho, beta, k } => {
                [sigma * (y - x) + w, rho * x - y - x * z, x * y - beta * z, -y * z + k * w]
            },
        }
    }

    /// Analytic Jacobian of the vector field at `s`, row `i` holding
    /// `∂f_i/∂x_j`.
    pub fn jacobian(&self, s: &State) -> Matrix4 {
        let [x, y, z, _] = *s;
        let rows = match *self {
            Self::Rossler { a, c, d, .. } => [
                [0.0, -1.0, -1.0, 0.0],
                [1.0, a, 0.0, 1.0],
                [z, 0.0, x, 0.0],
                [0.0, 0.0, -c, d],
            ],
            Self::Chen { a, b, c, d, r } => [
                [-a, a, 0.0, 1.0],
                [d - z, c, -x, 0.0],
                [y, x, -b, 0.0],
                [0.0, z, y, r],
            ],
            Self::Lorenz { sigma, rho, beta, k } => [
                [-sigma, sigma, 0.0, 1.0],
                [rho - z, -1.0, -x, 0.0],
                [y, x, -beta, 0.0],
                [0.0, -z, -y, k],
            ],
        };
        Matrix4::from_rows(rows)
    }

    /// Rejects coefficient sets containing NaN or infinities.
    pub fn validate(&self) -> Result<(), DynamicsError> {
        match self.parameters().into_iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(DynamicsError::invalid(format!(
                "{} parameter {name} is not finite ({value})",
                self.name()
            ))),
            None => Ok(()),
        }
    }

    /// Dimension of the state space.
    pub const fn dimensions(&self) -> usize {
        DIM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [HyperchaoticSystem; 3] =
        [HyperchaoticSystem::ROSSLER, HyperchaoticSystem::CHEN, HyperchaoticSystem::LORENZ];

    #[test]
    fn rossler_derivative_matches_field() {
        let f = HyperchaoticSystem::ROSSLER.derivative(&[1.0, 2.0, 3.0, 4.0]);
        let expected = [-5.0, 5.5, 6.0, -1.3];
        for (got, want) in f.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "got {f:?}, want {expected:?}");
        }
    }

    #[test]
    fn lorenz_origin_is_fixed_point() {
        let f = HyperchaoticSystem::LORENZ.derivative(&[0.0; 4]);
        assert_eq!(f, [0.0; 4]);
        let f = HyperchaoticSystem::CHEN.derivative(&[0.0; 4]);
        assert_eq!(f, [0.0; 4]);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let point = [1.3, -0.7, 2.1, 0.4];
        let eps = 1e-6;

        for system in ALL {
            let jac = system.jacobian(&point);
            for j in 0..DIM {
                let mut plus = point;
                let mut minus = point;
                plus[j] += eps;
                minus[j] -= eps;
                let fp = system.derivative(&plus);
                let fm = system.derivative(&minus);
                for i in 0..DIM {
                    let numeric = (fp[i] - fm[i]) / (2.0 * eps);
                    let analytic = jac.get(i, j);
                    assert!(
                        (numeric - analytic).abs() < 1e-6,
                        "{}: d f{i}/d x{j} analytic {analytic} numeric {numeric}",
                        system.name()
                    );
                }
            }
        }
    }

    #[test]
    fn parameters_are_named_in_order() {
        let names: Vec<_> =
            HyperchaoticSystem::CHEN.parameters().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b", "c", "d", "r"]);
    }

    #[test]
    fn validate_rejects_nan_coefficient() {
        let system = HyperchaoticSystem::Rossler { a: f64::NAN, b: 3.0, c: 0.5, d: 0.05 };
        assert!(matches!(system.validate(), Err(DynamicsError::InvalidConfig { .. })));
        for system in ALL {
            assert!(system.validate().is_ok(), "{} should validate", system.name());
        }
    }

    #[test]
    fn serde_uses_kind_tag() {
        let json = serde_json::to_string(&HyperchaoticSystem::ROSSLER).unwrap();
        assert!(json.contains(r#""kind":"rossler""#), "{json}");
        let back: HyperchaoticSystem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HyperchaoticSystem::ROSSLER);
    }
}
