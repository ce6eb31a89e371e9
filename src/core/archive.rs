use crate::utils::error::{PifError, Result};
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Returns the contents of the first entry whose name ends with `system.prop`.
pub fn extract_system_prop(zip_bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !entry.name().ends_with("system.prop") {
            continue;
        }

        tracing::info!("Found: {}", entry.name());
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        return Ok(content);
    }

    Err(PifError::SystemPropNotFound)
}
