use std::sync::Arc;

use crate::model::gmmset::GmmSet;
use crate::model::modelerror::ModelError;
use crate::model::source::Source;
use crate::model::sourcetype::{
    SourceType,
    TectonicSetting
};

/// Sources of one type and tectonic setting evaluated with a common
/// [`GmmSet`]. `weight` scales every contribution of the set.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSet {
    name: String,
    source_type: SourceType,
    setting: TectonicSetting,
    weight: f64,
    gmm_set: Arc<GmmSet>,
    sources: Vec<Source>
}

impl SourceSet {
    pub fn builder(name: impl Into<String>, source_type: SourceType) -> SourceSetBuilder {
        SourceSetBuilder {
            name: name.into(),
            source_type,
            setting: None,
            weight: 1.0,
            gmm_set: None,
            sources: Vec::new()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn setting(&self) -> TectonicSetting {
        self.setting
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn gmm_set(&self) -> &GmmSet {
        &self.gmm_set
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

pub struct SourceSetBuilder {
    name: String,
    source_type: SourceType,
    setting: Option<TectonicSetting>,
    weight: f64,
    gmm_set: Option<Arc<GmmSet>>,
    sources: Vec<Source>
}

impl SourceSetBuilder {
    pub fn setting(mut self, setting: TectonicSetting) -> Self {
        self.setting = Some(setting);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn gmm_set(mut self, gmm_set: Arc<GmmSet>) -> Self {
        self.gmm_set = Some(gmm_set);
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.sources.extend(sources);
        self
    }

    pub fn build(self) -> Result<SourceSet, ModelError> {
        ModelError::check_range("source set weight", self.weight, f64::MIN_POSITIVE, 1.0)?;
        if self.sources.is_empty() {
            return Err(ModelError::Empty(format!("source set {}", self.name)));
        }
        let gmm_set = self.gmm_set
            .ok_or_else(|| ModelError::Empty(format!("gmm set of {}", self.name)))?;
        Ok(SourceSet {
            setting: self.setting.unwrap_or_else(|| TectonicSetting::default_for(self.source_type)),
            name: self.name,
            source_type: self.source_type,
            weight: self.weight,
            gmm_set,
            sources: self.sources
        })
    }
}
