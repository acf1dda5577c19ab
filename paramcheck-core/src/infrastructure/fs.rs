// paramcheck-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Writes a report (or any generated file) so that readers see either the
/// previous content or the new one, never a partial file.
///
/// The temporary file lives next to the target so that the final rename
/// stays on one filesystem. Missing parent directories are created.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| InfrastructureError::file_access(parent, e))?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;
    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::file_access(path, e.error))?;

    Ok(())
}
