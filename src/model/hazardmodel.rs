use std::collections::BTreeSet;

use crate::gmm::imt::Imt;
use crate::model::modelerror::ModelError;
use crate::model::sourceset::SourceSet;
use crate::model::sourcetype::{
    SourceType,
    TectonicSetting
};

/// Read-only earthquake source model.
///
/// Built once and shared behind an `Arc` by every calculation; source sets
/// keep their insertion order, which fixes the order in which hazard is
/// accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardModel {
    name: String,
    source_sets: Vec<SourceSet>
}

impl HazardModel {
    pub fn builder(name: impl Into<String>) -> HazardModelBuilder {
        HazardModelBuilder { name: name.into(), source_sets: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_sets(&self) -> &[SourceSet] {
        &self.source_sets
    }

    pub fn source_types(&self) -> BTreeSet<SourceType> {
        self.source_sets.iter().map(SourceSet::source_type).collect()
    }

    pub fn settings(&self) -> BTreeSet<TectonicSetting> {
        self.source_sets.iter().map(SourceSet::setting).collect()
    }

    /// Source sets of one type, in model order.
    pub fn source_sets_of(&self, source_type: SourceType) -> impl Iterator<Item = &SourceSet> {
        self.source_sets.iter().filter(move |s| s.source_type() == source_type)
    }

    /// IMTs every GMM in the model supports.
    pub fn supported_imts(&self) -> BTreeSet<Imt> {
        Imt::ALL
            .iter()
            .copied()
            .filter(|&imt| self.source_sets.iter().all(|s| s.gmm_set().supports(imt)))
            .collect()
    }

    pub fn source_count(&self) -> usize {
        self.source_sets.iter().map(|s| s.sources().len()).sum()
    }
}

pub struct HazardModelBuilder {
    name: String,
    source_sets: Vec<SourceSet>
}

impl HazardModelBuilder {
    pub fn source_set(mut self, source_set: SourceSet) -> Self {
        self.source_sets.push(source_set);
        self
    }

    pub fn build(self) -> Result<HazardModel, ModelError> {
        if self.source_sets.is_empty() {
            return Err(ModelError::Empty(format!("hazard model {}", self.name)));
        }
        Ok(HazardModel { name: self.name, source_sets: self.source_sets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::gmm::groundmotionmodel::Gmm;
    use crate::model::gmmset::GmmSet;
    use crate::model::location::Location;
    use crate::model::mfd::Mfd;
    use crate::model::source::Source;

    fn point_set(name: &str, source_type: SourceType, gmm: Gmm) -> SourceSet {
        let hypo = Location::new(-90.0, 36.0).unwrap().with_depth(5.0).unwrap();
        let source = Source::point("pt", hypo, 0.0, &Mfd::single(6.0, 1e-3).unwrap()).unwrap();
        SourceSet::builder(name, source_type)
            .gmm_set(Arc::new(GmmSet::single(gmm)))
            .source(source)
            .build()
            .unwrap()
    }

    #[test]
    fn groups_by_type_in_order() {
        let model = HazardModel::builder("test")
            .source_set(point_set("a", SourceType::Grid, Gmm::Toro97))
            .source_set(point_set("b", SourceType::Fault, Gmm::Campbell03))
            .source_set(point_set("c", SourceType::Grid, Gmm::Campbell03))
            .build()
            .unwrap();
        let grid: Vec<&str> = model.source_sets_of(SourceType::Grid).map(|s| s.name()).collect();
        assert_eq!(grid, vec!["a", "c"]);
        assert_eq!(model.source_types().into_iter().collect::<Vec<_>>(), vec![SourceType::Fault, SourceType::Grid]);
        assert_eq!(model.settings().len(), 1);
        assert!(model.supported_imts().contains(&Imt::SA1P0));
        assert!(!model.supported_imts().contains(&Imt::PGV));
        assert_eq!(model.source_count(), 3);
    }

    #[test]
    fn rejects_empty_models_and_sets() {
        assert!(HazardModel::builder("empty").build().is_err());
        let set = SourceSet::builder("no gmm", SourceType::Grid).build();
        assert!(set.is_err());
        let hypo = Location::new(0.0, 0.0).unwrap();
        let source = Source::point("pt", hypo, 0.0, &Mfd::single(6.0, 1e-3).unwrap()).unwrap();
        let set = SourceSet::builder("heavy", SourceType::Grid)
            .weight(1.5)
            .gmm_set(Arc::new(GmmSet::single(Gmm::Toro97)))
            .source(source)
            .build();
        assert!(matches!(set, Err(ModelError::InvalidRange { .. })));
    }
}
