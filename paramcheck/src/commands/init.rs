// paramcheck/src/commands/init.rs
//
// USE CASE: Scaffold a sample project.

use std::path::PathBuf;

use anyhow::Context;
use paramcheck_core::infrastructure::scaffold::write_sample_project;

pub fn execute(dir: PathBuf, name: Option<String>) -> anyhow::Result<()> {
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let name = name.unwrap_or_else(|| {
        dir.canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "paramcheck-project".to_string())
    });

    println!("🌱 Writing sample project '{}' in {}", name, dir.display());
    let files = write_sample_project(&dir, &name)
        .with_context(|| format!("Failed to write the sample project in {:?}", dir))?;
    for file in &files {
        let shown = file.strip_prefix(&dir).unwrap_or(file);
        println!("   + {}", shown.display());
    }
    println!("✨ Done. Try: paramcheck check --project-dir {}", dir.display());
    Ok(())
}
