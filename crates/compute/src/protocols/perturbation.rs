use decoy_core::{Transform, TransformError, WorkerContext};
use rand::Rng;

use super::conformation::{Conformation, wrap_degrees};

/// Random small moves: each round picks `moves` torsions and shifts each by
/// up to `max_angle` degrees either way.
#[derive(Debug, Clone)]
pub struct SmallPerturbation {
    pub max_angle: f64,
    pub moves: usize,
}

impl Default for SmallPerturbation {
    fn default() -> Self {
        Self {
            max_angle: 5.0,
            moves: 1,
        }
    }
}

impl Transform<Conformation> for SmallPerturbation {
    fn name(&self) -> &str {
        "small_perturbation"
    }

    fn apply(&self, state: &mut Conformation, ctx: &mut WorkerContext) -> Result<(), TransformError> {
        if state.is_empty() {
            return Err(TransformError::InvalidState("conformation has no torsions".into()));
        }
        if !self.max_angle.is_finite() || self.max_angle <= 0.0 {
            return Err(TransformError::Failed(format!(
                "max_angle must be positive and finite, got {}",
                self.max_angle
            )));
        }

        let rng = ctx.rng();
        for _ in 0..self.moves {
            let i = rng.gen_range(0..state.torsions.len());
            let delta = rng.gen_range(-self.max_angle..=self.max_angle);
            state.torsions[i] = wrap_degrees(state.torsions[i] + delta);
        }
        Ok(())
    }
}
