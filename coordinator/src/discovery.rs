use anyhow::{Context, Result};
use glob::glob;
use std::path::Path;

/// Archivos `*.txt` de `input_dir`, en orden de ruta.
/// Ese orden es el "orden de descubrimiento" que usa el round robin.
pub fn discover_input_files(input_dir: &Path) -> Result<Vec<String>> {
    let pattern = input_dir.join("*.txt");
    let pattern = pattern.to_string_lossy();

    let mut files = Vec::new();
    for entry in glob(&pattern).with_context(|| format!("patrón inválido: {}", pattern))? {
        let path = entry.context("no se pudo leer una entrada del directorio de inputs")?;
        if path.is_file() {
            files.push(path.to_string_lossy().to_string());
        }
    }

    files.sort();
    Ok(files)
}
