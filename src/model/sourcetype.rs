use std::fmt;

use serde::{
    Deserialize,
    Serialize
};

/// Source categories used to break hazard out by contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Fault,
    Grid,
    Area,
    Interface,
    Slab,
    Cluster,
    System
}

impl SourceType {
    pub const ALL: [SourceType; 7] = [
        SourceType::Fault,
        SourceType::Grid,
        SourceType::Area,
        SourceType::Interface,
        SourceType::Slab,
        SourceType::Cluster,
        SourceType::System
    ];
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TectonicSetting {
    ActiveShallowCrust,
    StableShallowCrust,
    SubductionInterface,
    SubductionIntraslab,
    Volcanic
}

impl TectonicSetting {
    /// Setting a source type usually belongs to when none is given.
    pub fn default_for(source_type: SourceType) -> TectonicSetting {
        match source_type {
            SourceType::Interface => TectonicSetting::SubductionInterface,
            SourceType::Slab => TectonicSetting::SubductionIntraslab,
            _ => TectonicSetting::ActiveShallowCrust
        }
    }
}

impl fmt::Display for TectonicSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
