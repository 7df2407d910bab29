use decoy_core::ScoreFunction;

use super::conformation::Conformation;

/// Threefold torsional potential, `sum(k * (1 + cos(3 * phi)))`. Zero at
/// staggered angles, `2k` per torsion when eclipsed. Lower is better.
#[derive(Debug, Clone)]
pub struct TorsionEnergy {
    pub barrier: f64,
}

impl Default for TorsionEnergy {
    fn default() -> Self {
        Self { barrier: 1.0 }
    }
}

impl ScoreFunction<Conformation> for TorsionEnergy {
    fn name(&self) -> &str {
        "torsion_energy"
    }

    fn score(&self, state: &Conformation) -> f64 {
        state
            .torsions
            .iter()
            .map(|phi| self.barrier * (1.0 + (3.0 * phi.to_radians()).cos()))
            .sum()
    }
}
