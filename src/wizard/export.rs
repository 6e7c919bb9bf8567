//! Writing generated artifacts to disk

use super::state::WizardConfiguration;
use crate::api::constants::{mapping_filename, translator_filename};
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `{code}_translator.py` and `{code}.yaml` into `dir`, creating it if
/// needed. Returns the written paths, translator first.
pub fn export_artifacts(config: &WizardConfiguration, dir: &Path) -> Result<Vec<PathBuf>> {
    if !config.has_generated_artifacts() {
        anyhow::bail!("Nothing to export: generate the translator and mapping document first");
    }

    let code = config.pms_code();
    if code.is_empty() {
        anyhow::bail!("Nothing to export: PMS code is empty");
    }

    fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory: {:?}", dir))?;

    let files = [
        (translator_filename(code), config.generated_translator_code()),
        (mapping_filename(code), config.generated_mapping_document()),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (filename, content) in files {
        let path = dir.join(filename);
        fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        info!("Exported {:?}", path);
        written.push(path);
    }

    Ok(written)
}
