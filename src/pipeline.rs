//! Render pipeline orchestration.
//!
//! A render runs two ordered stage lists over one `(Document, Data)` pair:
//!
//! 1. Extractors read the document and fill [`Data`].
//! 2. Transforms rewrite the document, reading [`Data`].
//!
//! after which `<body>` is marked prerendered. A third list, the publish-time
//! transforms, runs only through [`Pipeline::distillify`].
//!
//! Order is declared in [`Pipeline::standard`] and is significant: the
//! bibliography transform needs the citation order the citation extractor
//! records. The first failing stage aborts the run and the document is left
//! as that stage found it, including earlier stages' edits.

use std::fmt;

use thiserror::Error;

use crate::bibtex::BibtexError;
use crate::config::RenderConfig;
use crate::data::Data;
use crate::dom::{Document, DomError};
use crate::extractors::{ExtractBibliography, ExtractCitations};
use crate::transforms::{Bibliography, DistillAppendix, DistillFooter, DistillHeader};

/// Errors a single stage can raise.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Bibtex(#[from] BibtexError),

    #[error("{0}")]
    Failed(String),
}

/// Which stage list a failing stage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extract,
    Transform,
    Distill,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Extract => "extractor",
            Phase::Transform => "transform",
            Phase::Distill => "distill transform",
        })
    }
}

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{phase} '{stage}' failed: {source}")]
    Stage {
        phase: Phase,
        stage: String,
        #[source]
        source: StageError,
    },

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// A stage that reads the document to populate [`Data`].
pub trait Extractor {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    fn extract(&self, document: &Document, data: &mut Data, verbose: bool) -> Result<(), StageError>;
}

/// A stage that rewrites the document using [`Data`].
pub trait Transform {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    fn transform(&self, document: &mut Document, data: &Data, verbose: bool) -> Result<(), StageError>;
}

/// The ordered stage lists of a render.
pub struct Pipeline {
    config: RenderConfig,
    extractors: Vec<Box<dyn Extractor>>,
    transforms: Vec<Box<dyn Transform>>,
    distill_transforms: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// An empty pipeline; stages run in the order they are pushed.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            extractors: Vec::new(),
            transforms: Vec::new(),
            distill_transforms: Vec::new(),
        }
    }

    /// The registered stages of a Distill article render.
    pub fn standard(config: RenderConfig) -> Self {
        let mut pipeline = Self::new(config.clone());

        pipeline.push_extractor(Box::new(ExtractBibliography::new(&config)));
        pipeline.push_extractor(Box::new(ExtractCitations::new(&config)));

        pipeline.push_transform(Box::new(Bibliography::new(&config)));

        pipeline.push_distill_transform(Box::new(DistillHeader));
        pipeline.push_distill_transform(Box::new(DistillAppendix));
        pipeline.push_distill_transform(Box::new(DistillFooter));

        pipeline
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn push_extractor(&mut self, extractor: Box<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    pub fn push_transform(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    pub fn push_distill_transform(&mut self, transform: Box<dyn Transform>) {
        self.distill_transforms.push(transform);
    }

    /// Runs every extractor, then every transform, then marks the document
    /// prerendered.
    ///
    /// # Errors
    ///
    /// Returns the first stage error. Later stages do not run and the
    /// prerendered marker is not set.
    pub fn render(&self, document: &mut Document, data: &mut Data, verbose: bool) -> Result<(), PipelineError> {
        for extractor in &self.extractors {
            if verbose {
                tracing::info!(stage = extractor.name(), "Running extractor");
            }
            extractor
                .extract(document, data, verbose)
                .map_err(|source| PipelineError::Stage {
                    phase: Phase::Extract,
                    stage: extractor.name().to_string(),
                    source,
                })?;
        }

        run_transforms(&self.transforms, Phase::Transform, document, data, verbose)?;

        document.mark_prerendered(&self.config.prerendered_attribute)?;
        Ok(())
    }

    /// Runs the publish-time transforms. Never called by [`Pipeline::render`].
    pub fn distillify(&self, document: &mut Document, data: &Data, verbose: bool) -> Result<(), PipelineError> {
        run_transforms(&self.distill_transforms, Phase::Distill, document, data, verbose)
    }

    /// Stage names in execution order: extractors, transforms, distill transforms.
    pub fn stage_names(&self) -> (Vec<&str>, Vec<&str>, Vec<&str>) {
        (
            self.extractors.iter().map(|s| s.name()).collect(),
            self.transforms.iter().map(|s| s.name()).collect(),
            self.distill_transforms.iter().map(|s| s.name()).collect(),
        )
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard(RenderConfig::default())
    }
}

fn run_transforms(
    transforms: &[Box<dyn Transform>],
    phase: Phase,
    document: &mut Document,
    data: &Data,
    verbose: bool,
) -> Result<(), PipelineError> {
    for transform in transforms {
        if verbose {
            tracing::info!(stage = transform.name(), "Running {}", phase);
        }
        transform
            .transform(document, data, verbose)
            .map_err(|source| PipelineError::Stage {
                phase,
                stage: transform.name().to_string(),
                source,
            })?;
    }
    Ok(())
}

/// Renders `document` with the standard stages and default configuration.
pub fn render(document: &mut Document, data: &mut Data, verbose: bool) -> Result<(), PipelineError> {
    Pipeline::default().render(document, data, verbose)
}

/// Runs the standard publish-time transforms with default configuration.
pub fn distillify(document: &mut Document, data: &Data, verbose: bool) -> Result<(), PipelineError> {
    Pipeline::default().distillify(document, data, verbose)
}
