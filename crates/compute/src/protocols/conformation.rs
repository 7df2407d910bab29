use decoy_core::{Representation, WorkState};
use serde::{Deserialize, Serialize};

/// Backbone torsions of a chain, in degrees within `(-180, 180]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conformation {
    pub torsions: Vec<f64>,
    /// Full-atom or centroid detail.
    pub full_atom: bool,
}

impl Conformation {
    /// Fully extended chain: every torsion at 180.
    pub fn extended(residues: usize, full_atom: bool) -> Self {
        Self {
            torsions: vec![180.0; residues],
            full_atom,
        }
    }

    pub fn len(&self) -> usize {
        self.torsions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.torsions.is_empty()
    }
}

impl WorkState for Conformation {
    fn representation(&self) -> Representation {
        if self.full_atom {
            Representation::FullAtom
        } else {
            Representation::Centroid
        }
    }
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_chain() {
        let c = Conformation::extended(4, false);
        assert_eq!(c.len(), 4);
        assert!(c.torsions.iter().all(|&t| t == 180.0));
        assert_eq!(c.representation(), Representation::Centroid);
        assert_eq!(
            Conformation::extended(1, true).representation(),
            Representation::FullAtom
        );
    }

    #[test]
    fn wraps_into_range() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(540.0), 180.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
    }
}
