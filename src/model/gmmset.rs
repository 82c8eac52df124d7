use std::sync::Arc;

use crate::gmm::gmmerror::GmmError;
use crate::gmm::groundmotionmodel::{
    Gmm,
    GroundMotionModel
};
use crate::gmm::imt::Imt;
use crate::model::modelerror::ModelError;

pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Weights of the (+ε, 0, −ε) additional epistemic-uncertainty branches.
pub const EPI_WEIGHTS: [f64; 3] = [0.185, 0.63, 0.185];

const DEFAULT_MAX_DISTANCE: f64 = 300.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GmmBranch {
    pub gmm: Gmm,
    pub weight: f64
}

/// Logic tree of ground-motion models attached to a source set.
///
/// Weights sum to one within [`WEIGHT_TOLERANCE`]; checked by
/// [`GmmSetBuilder::build`]. When `uncertainty` is set every model's mean is
/// additionally evaluated at `±uncertainty` (natural-log units) with the
/// [`EPI_WEIGHTS`] branch weights.
#[derive(Debug, Clone, PartialEq)]
pub struct GmmSet {
    branches: Vec<GmmBranch>,
    max_distance: f64,
    uncertainty: Option<f64>
}

impl GmmSet {
    pub fn builder() -> GmmSetBuilder {
        GmmSetBuilder {
            branches: Vec::new(),
            max_distance: DEFAULT_MAX_DISTANCE,
            uncertainty: None
        }
    }

    /// Single model with weight one.
    pub fn single(gmm: Gmm) -> GmmSet {
        GmmSet {
            branches: vec![GmmBranch { gmm, weight: 1.0 }],
            max_distance: DEFAULT_MAX_DISTANCE,
            uncertainty: None
        }
    }

    pub fn branches(&self) -> &[GmmBranch] {
        &self.branches
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn uncertainty(&self) -> Option<f64> {
        self.uncertainty
    }

    /// `(mean offset, weight)` branches applied to every ground motion; a
    /// single zero-offset branch when no uncertainty is configured or it is
    /// switched off.
    pub fn epistemic_branches(&self, enabled: bool) -> Vec<(f64, f64)> {
        match self.uncertainty {
            Some(epi) if enabled => vec![
                (epi, EPI_WEIGHTS[0]),
                (0.0, EPI_WEIGHTS[1]),
                (-epi, EPI_WEIGHTS[2])
            ],
            _ => vec![(0.0, 1.0)]
        }
    }

    pub fn supports(&self, imt: Imt) -> bool {
        self.branches.iter().all(|b| b.gmm.supports(imt))
    }

    /// Per-IMT evaluators paired with their logic-tree weights, in branch
    /// order.
    pub fn instances(&self, imt: Imt) -> Result<Vec<(Arc<dyn GroundMotionModel>, f64)>, GmmError> {
        self.branches
            .iter()
            .map(|b| Ok((b.gmm.instance(imt)?, b.weight)))
            .collect()
    }
}

pub struct GmmSetBuilder {
    branches: Vec<GmmBranch>,
    max_distance: f64,
    uncertainty: Option<f64>
}

impl GmmSetBuilder {
    pub fn gmm(mut self, gmm: Gmm, weight: f64) -> Self {
        self.branches.push(GmmBranch { gmm, weight });
        self
    }

    pub fn max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn uncertainty(mut self, uncertainty: f64) -> Self {
        self.uncertainty = Some(uncertainty);
        self
    }

    pub fn build(self) -> Result<GmmSet, ModelError> {
        if self.branches.is_empty() {
            return Err(ModelError::Empty("gmm set".to_owned()));
        }
        for branch in &self.branches {
            ModelError::check_range("gmm weight", branch.weight, f64::MIN_POSITIVE, 1.0)?;
        }
        let sum: f64 = self.branches.iter().map(|b| b.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ModelError::WeightSum { context: "gmm set".to_owned(), sum });
        }
        ModelError::check_range("gmm max_distance", self.max_distance, f64::MIN_POSITIVE, 1000.0)?;
        if let Some(epi) = self.uncertainty {
            ModelError::check_range("gmm uncertainty", epi, 0.0, 2.0)?;
        }
        Ok(GmmSet {
            branches: self.branches,
            max_distance: self.max_distance,
            uncertainty: self.uncertainty
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_must_sum_to_one() {
        let set = GmmSet::builder().gmm(Gmm::Toro97, 0.6).gmm(Gmm::Campbell03, 0.4).build();
        assert!(set.is_ok());
        let set = GmmSet::builder().gmm(Gmm::Toro97, 0.6).gmm(Gmm::Campbell03, 0.3).build();
        assert!(matches!(set, Err(ModelError::WeightSum { .. })));
        let set = GmmSet::builder().gmm(Gmm::Toro97, 0.5).gmm(Gmm::Campbell03, 0.5 + 5e-7).build();
        assert!(set.is_ok());
        assert_eq!(GmmSet::builder().build(), Err(ModelError::Empty("gmm set".to_owned())));
    }

    #[test]
    fn epistemic_branches_sum_to_one() {
        let set = GmmSet::builder().gmm(Gmm::Bjf97, 1.0).uncertainty(0.25).build().unwrap();
        let branches = set.epistemic_branches(true);
        assert_eq!(branches.len(), 3);
        assert!((branches.iter().map(|b| b.1).sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(set.epistemic_branches(false), vec![(0.0, 1.0)]);
        assert_eq!(GmmSet::single(Gmm::Bjf97).epistemic_branches(true), vec![(0.0, 1.0)]);
    }

    #[test]
    fn instances_follow_branch_order() {
        let set = GmmSet::builder().gmm(Gmm::Toro97, 0.5).gmm(Gmm::Campbell03, 0.5).build().unwrap();
        let instances = set.instances(Imt::PGA).unwrap();
        assert_eq!(instances.len(), 2);
        assert!(set.supports(Imt::SA1P0));
        assert!(!set.supports(Imt::PGV));
        assert!(set.instances(Imt::PGV).is_err());
    }
}
