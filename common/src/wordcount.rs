use std::{
    collections::{BTreeMap, HashMap},
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::TaskError;
use crate::partition::{Layout, PartitionTable};
use crate::protocol::TaskId;

/// Normaliza un token: quita puntuación ASCII de los extremos y pasa a
/// minúscula. Si queda vacío o con algún carácter no alfabético, se descarta.
pub fn normalize_token(raw: &str) -> Option<String> {
    let word = raw
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();

    if !word.is_empty() && word.chars().all(char::is_alphabetic) {
        Some(word)
    } else {
        None
    }
}

/// Cuenta palabras normalizadas en todos los archivos, acumulando en un solo mapa.
pub fn count_words<P: AsRef<Path>>(files: &[P]) -> Result<HashMap<String, u64>, TaskError> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for path in files {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TaskError::read(path, e))?;

        for word in content.split_whitespace().filter_map(normalize_token) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    Ok(counts)
}

fn create_parent_dir(path: &Path) -> Result<(), TaskError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| TaskError::write(parent, e))?;
        }
    }
    Ok(())
}

/// Ejecuta una tarea map:
/// 1. cuenta palabras en `input_files`
/// 2. crea los M archivos `mp-<task_id>-<r>` (aunque queden vacíos)
/// 3. escribe "palabra conteo" en la partición de la primera letra
///
/// Devuelve las rutas escritas, indexadas por reduce id.
pub fn run_map_task<P: AsRef<Path>>(
    task_id: TaskId,
    input_files: &[P],
    table: &PartitionTable,
    layout: &Layout,
) -> Result<Vec<PathBuf>, TaskError> {
    let counts = count_words(input_files)?;

    fs::create_dir_all(&layout.intermediate_dir)
        .map_err(|e| TaskError::write(&layout.intermediate_dir, e))?;

    let paths: Vec<PathBuf> = (0..table.reduce_tasks())
        .map(|r| layout.intermediate_path(task_id, r))
        .collect();

    let mut writers: Vec<BufWriter<File>> = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = File::create(path).map_err(|e| TaskError::write(path, e))?;
        writers.push(BufWriter::new(file));
    }

    for (word, count) in &counts {
        let r = table.partition_for(word);
        writeln!(writers[r], "{} {}", word, count).map_err(|e| TaskError::write(&paths[r], e))?;
    }

    for (writer, path) in writers.iter_mut().zip(&paths) {
        writer.flush().map_err(|e| TaskError::write(path, e))?;
    }

    Ok(paths)
}

fn parse_line(path: &Path, line_no: usize, line: &str) -> Result<(String, u64), TaskError> {
    let malformed = || TaskError::MalformedLine {
        path: path.to_path_buf(),
        line_no,
        line: line.to_string(),
    };

    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(word), Some(count), None) => {
            let count = count.parse::<u64>().map_err(|_| malformed())?;
            Ok((word.to_string(), count))
        }
        _ => Err(malformed()),
    }
}

/// Suma los conteos de todos los archivos intermedios de una partición.
/// El orden de archivos y líneas no afecta el resultado.
pub fn merge_partition_files<P: AsRef<Path>>(
    files: &[P],
) -> Result<BTreeMap<String, u64>, TaskError> {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();

    for path in files {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TaskError::read(path, e))?;
        let reader = BufReader::new(file);

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| TaskError::read(path, e))?;
            let (word, count) = parse_line(path, index + 1, &line)?;
            *totals.entry(word).or_insert(0) += count;
        }
    }

    Ok(totals)
}

/// Ejecuta una tarea reduce: mezcla las N particiones y escribe
/// `output-<task_id>` ordenado por palabra.
pub fn run_reduce_task<P: AsRef<Path>>(
    task_id: TaskId,
    input_files: &[P],
    layout: &Layout,
) -> Result<PathBuf, TaskError> {
    let totals = merge_partition_files(input_files)?;

    let output_path = layout.output_path(task_id);
    create_parent_dir(&output_path)?;

    let out = File::create(&output_path).map_err(|e| TaskError::write(&output_path, e))?;
    let mut writer = BufWriter::new(out);

    // BTreeMap ya itera en orden lexicográfico
    for (word, total) in &totals {
        writeln!(writer, "{} {}", word, total).map_err(|e| TaskError::write(&output_path, e))?;
    }

    writer
        .flush()
        .map_err(|e| TaskError::write(&output_path, e))?;
    Ok(output_path)
}
