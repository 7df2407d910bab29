//! A small torsion-space protocol used by the binaries and integration tests.

pub mod conformation;
pub mod energy;
pub mod perturbation;
pub mod relax;

pub use conformation::{Conformation, wrap_degrees};
pub use energy::TorsionEnergy;
pub use perturbation::SmallPerturbation;
pub use relax::TorsionRelax;

use crate::registry::{ProtocolRegistry, RegistryError};

/// Registry holding every built-in conformation transform and score.
pub fn demo_registry() -> Result<ProtocolRegistry<Conformation>, RegistryError> {
    let mut registry = ProtocolRegistry::new();
    registry.register_transform(SmallPerturbation::default())?;
    registry.register_transform(TorsionRelax::default())?;
    registry.register_score(TorsionEnergy::default())?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_registry_resolves_defaults() {
        let r = demo_registry().unwrap();
        assert!(r.protocol("small_perturbation", "torsion_energy").is_ok());
        assert!(r.protocol("torsion_relax", "torsion_energy").is_ok());
        assert_eq!(r.transform_names(), vec!["small_perturbation", "torsion_relax"]);
    }
}
