use decoy_core::{Transform, TransformError, WorkerContext};

use super::conformation::{Conformation, wrap_degrees};

/// Deterministic descent: moves every torsion a fixed fraction of the way
/// to the nearest staggered minimum (60, 180 or -60 degrees).
#[derive(Debug, Clone)]
pub struct TorsionRelax {
    pub step: f64,
}

impl Default for TorsionRelax {
    fn default() -> Self {
        Self { step: 0.5 }
    }
}

fn nearest_staggered(angle: f64) -> f64 {
    let k = ((angle - 60.0) / 120.0).round();
    60.0 + 120.0 * k
}

impl Transform<Conformation> for TorsionRelax {
    fn name(&self) -> &str {
        "torsion_relax"
    }

    fn apply(&self, state: &mut Conformation, _ctx: &mut WorkerContext) -> Result<(), TransformError> {
        if !(0.0..=1.0).contains(&self.step) {
            return Err(TransformError::Failed(format!(
                "step must be within [0, 1], got {}",
                self.step
            )));
        }
        for t in &mut state.torsions {
            let target = nearest_staggered(*t);
            *t = wrap_degrees(*t + (target - *t) * self.step);
        }
        Ok(())
    }
}
