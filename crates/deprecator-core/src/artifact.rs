//! Deprecation stub generation.

use std::path::PathBuf;

use crate::error::ArtifactError;
use crate::module::ModuleDescriptor;
use crate::template::TemplateSet;

/// Writes the rendered stub package for each module into `out_dir/<name>`.
#[derive(Debug)]
pub struct ArtifactBuilder {
    out_dir: PathBuf,
    templates: TemplateSet,
}

impl ArtifactBuilder {
    pub fn new(out_dir: PathBuf, templates: TemplateSet) -> Self {
        Self { out_dir, templates }
    }

    /// Directory the stub for `module` is written to.
    pub fn module_dir(&self, module: &ModuleDescriptor) -> PathBuf {
        self.out_dir.join(&module.name)
    }

    /// Validate the descriptor, then render and write the three stub files.
    ///
    /// The first write error aborts the remaining writes. Files already
    /// written are left in place; the next run overwrites them.
    pub fn build(&self, module: &ModuleDescriptor) -> Result<PathBuf, ArtifactError> {
        module.validate()?;

        let dir = self.module_dir(module);
        std::fs::create_dir_all(&dir).map_err(|source| ArtifactError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        for (file, contents) in self.templates.render_stub(module) {
            let path = dir.join(file);
            std::fs::write(&path, contents)
                .map_err(|source| ArtifactError::Write { path, source })?;
        }

        tracing::debug!(module = %module.name, dir = %dir.display(), "Wrote deprecation stub");
        Ok(dir)
    }
}
