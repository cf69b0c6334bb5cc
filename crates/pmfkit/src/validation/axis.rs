//! Canonical ranking of axis labels against run metadata.

use chrono::NaiveDateTime;

use crate::metadata::RunMetadata;
use crate::table::{
    Axis, BootstrapFactor, FactorSpecies, IterationId, MappingColumn, Method, SpeciesFactor,
};

/// A label that is not part of the run vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub axis: Axis,
    pub label: String,
}

impl UnknownLabel {
    fn new(axis: Axis, label: &str) -> Self {
        Self {
            axis,
            label: label.to_string(),
        }
    }
}

/// A key that can be placed in canonical order.
///
/// `axis` is the declared kind of the axis the key sits on. It only
/// matters for plain string keys, which may name either factors or
/// species; composite keys know their own layout.
pub trait AxisKey: Clone {
    type Rank: Ord;

    fn rank(&self, axis: Axis, metadata: &RunMetadata) -> Result<Self::Rank, UnknownLabel>;

    /// Label used in error messages.
    fn label(&self) -> String;
}

fn factor_rank(metadata: &RunMetadata, name: &str) -> Result<usize, UnknownLabel> {
    metadata
        .factor_index(name)
        .ok_or_else(|| UnknownLabel::new(Axis::Factor, name))
}

fn species_rank(metadata: &RunMetadata, name: &str) -> Result<usize, UnknownLabel> {
    metadata
        .species_index(name)
        .ok_or_else(|| UnknownLabel::new(Axis::Species, name))
}

impl AxisKey for String {
    type Rank = usize;

    fn rank(&self, axis: Axis, metadata: &RunMetadata) -> Result<usize, UnknownLabel> {
        match axis {
            Axis::Species => species_rank(metadata, self),
            _ => factor_rank(metadata, self),
        }
    }

    fn label(&self) -> String {
        self.clone()
    }
}

impl AxisKey for FactorSpecies {
    type Rank = (usize, usize);

    fn rank(&self, _axis: Axis, metadata: &RunMetadata) -> Result<(usize, usize), UnknownLabel> {
        Ok((
            factor_rank(metadata, &self.factor)?,
            species_rank(metadata, &self.species)?,
        ))
    }

    fn label(&self) -> String {
        format!("{}/{}", self.factor, self.species)
    }
}

impl AxisKey for SpeciesFactor {
    type Rank = (usize, usize);

    fn rank(&self, _axis: Axis, metadata: &RunMetadata) -> Result<(usize, usize), UnknownLabel> {
        Ok((
            species_rank(metadata, &self.species)?,
            factor_rank(metadata, &self.factor)?,
        ))
    }

    fn label(&self) -> String {
        format!("{}/{}", self.species, self.factor)
    }
}

impl AxisKey for IterationId {
    type Rank = u32;

    fn rank(&self, _axis: Axis, _metadata: &RunMetadata) -> Result<u32, UnknownLabel> {
        Ok(self.0)
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl AxisKey for NaiveDateTime {
    type Rank = NaiveDateTime;

    fn rank(&self, _axis: Axis, _metadata: &RunMetadata) -> Result<NaiveDateTime, UnknownLabel> {
        Ok(*self)
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl AxisKey for Method {
    type Rank = Method;

    fn rank(&self, _axis: Axis, _metadata: &RunMetadata) -> Result<Method, UnknownLabel> {
        Ok(*self)
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl AxisKey for MappingColumn {
    type Rank = (u8, usize);

    fn rank(&self, _axis: Axis, metadata: &RunMetadata) -> Result<(u8, usize), UnknownLabel> {
        match self {
            MappingColumn::Factor(name) => Ok((0, factor_rank(metadata, name)?)),
            MappingColumn::Unmapped => Ok((1, 0)),
        }
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl AxisKey for BootstrapFactor {
    type Rank = usize;

    fn rank(&self, _axis: Axis, metadata: &RunMetadata) -> Result<usize, UnknownLabel> {
        metadata
            .factor_index(&self.factor)
            .ok_or_else(|| UnknownLabel::new(Axis::BootstrapFactor, &self.label))
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}

impl AxisKey for () {
    type Rank = ();

    fn rank(&self, _axis: Axis, _metadata: &RunMetadata) -> Result<(), UnknownLabel> {
        Ok(())
    }

    fn label(&self) -> String {
        String::new()
    }
}
