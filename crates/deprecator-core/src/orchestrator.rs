//! Batch processing across all modules.

use crate::artifact::ArtifactBuilder;
use crate::module::ModuleDescriptor;
use crate::mutator::RepositoryMutator;
use crate::status::{BatchReport, FailureRecord};

/// Drives the stub build and the repository rename for each module in turn.
///
/// A failure in one module is recorded in the report and never stops the
/// modules after it.
pub struct BatchOrchestrator<'a> {
    builder: &'a ArtifactBuilder,
    mutator: &'a RepositoryMutator<'a>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(builder: &'a ArtifactBuilder, mutator: &'a RepositoryMutator<'a>) -> Self {
        Self { builder, mutator }
    }

    /// Process `modules` in order and return the full report.
    pub async fn run(&self, modules: &[ModuleDescriptor]) -> BatchReport {
        let mut report = BatchReport::new();
        self.run_into(modules, &mut report).await;
        report
    }

    /// Process `modules` in order, recording into `report`.
    pub async fn run_into(&self, modules: &[ModuleDescriptor], report: &mut BatchReport) {
        for (index, module) in modules.iter().enumerate() {
            tracing::info!(
                module = %module.name,
                position = index + 1,
                total = modules.len(),
                "Processing module"
            );
            self.process(module, report).await;
        }

        tracing::info!(
            total = report.len(),
            succeeded = report.succeeded(),
            "Batch finished"
        );
    }

    async fn process(&self, module: &ModuleDescriptor, report: &mut BatchReport) {
        let status = report.start(&module.name);

        match self.builder.build(module) {
            Ok(_) => status
                .deprecation_module
                .mark_published(&module.version_to_publish),
            Err(err) => {
                let failure = FailureRecord::from_error(err);
                tracing::warn!(module = %module.name, error = %failure.message, "Deprecation stub failed");
                status.deprecation_module.mark_failed(failure);
                return;
            }
        }

        match self.mutator.mutate(module).await {
            Ok(outcome) => status
                .replacement_module
                .mark_done(outcome.pr_created(), outcome.pr_url()),
            Err(err) => {
                let failure = FailureRecord::from_error(err);
                tracing::warn!(module = %module.name, error = %failure.message, "Repository rename failed");
                status.replacement_module.mark_failed(failure);
            }
        }
    }
}
