use std::path::{Path, PathBuf};

use crate::protocol::TaskId;

/// Directorio de archivos intermedios (relativo al work dir).
pub const INTERMEDIATE_DIR: &str = "outputs_tmp";
/// Directorio de salida final (relativo al work dir).
pub const OUTPUT_DIR: &str = "outputs";

const ALPHABET_LEN: usize = 26;

/// Reparte los archivos descubiertos entre `map_tasks` tareas, round robin:
/// el archivo en la posición j va a la tarea `j % map_tasks`.
///
/// Devuelve exactamente `map_tasks` listas (algunas vacías si hay menos
/// archivos que tareas).
pub fn assign_round_robin(files: &[String], map_tasks: usize) -> Vec<Vec<String>> {
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); map_tasks];
    if map_tasks == 0 {
        return buckets;
    }

    for (j, file) in files.iter().enumerate() {
        buckets[j % map_tasks].push(file.clone());
    }

    buckets
}

/// Dónde viven los archivos intermedios y los de salida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub intermediate_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Layout {
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        let work_dir = work_dir.as_ref();
        Self {
            intermediate_dir: work_dir.join(INTERMEDIATE_DIR),
            output_dir: work_dir.join(OUTPUT_DIR),
        }
    }

    /// `<intermediate_dir>/mp-<map_task>-<reduce_id>`
    pub fn intermediate_path(&self, map_task: TaskId, reduce_id: TaskId) -> PathBuf {
        self.intermediate_dir
            .join(format!("mp-{}-{}", map_task, reduce_id))
    }

    /// `<output_dir>/output-<reduce_id>`
    pub fn output_path(&self, reduce_id: TaskId) -> PathBuf {
        self.output_dir.join(format!("output-{}", reduce_id))
    }

    /// Nombres de los N archivos que lee la tarea reduce `reduce_id`.
    /// Se generan por convención, sin mirar si existen.
    pub fn reduce_inputs(&self, map_tasks: usize, reduce_id: TaskId) -> Vec<String> {
        (0..map_tasks)
            .map(|m| {
                self.intermediate_path(m, reduce_id)
                    .to_string_lossy()
                    .to_string()
            })
            .collect()
    }
}

/// Tabla letra → partición, `(letra - 'a') % M`.
/// Se arma una sola vez por worker a partir de M.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    reduce_tasks: usize,
    letters: [usize; ALPHABET_LEN],
}

impl PartitionTable {
    /// `reduce_tasks` tiene que ser >= 1.
    pub fn new(reduce_tasks: usize) -> Self {
        let reduce_tasks = reduce_tasks.max(1);
        let mut letters = [0; ALPHABET_LEN];
        for (index, slot) in letters.iter_mut().enumerate() {
            *slot = index % reduce_tasks;
        }
        Self {
            reduce_tasks,
            letters,
        }
    }

    pub fn reduce_tasks(&self) -> usize {
        self.reduce_tasks
    }

    /// Partición para una palabra ya normalizada, según su primera letra.
    /// Letras fuera de a-z (acentos, etc.) usan su código Unicode módulo M.
    pub fn partition_for(&self, word: &str) -> usize {
        match word.chars().next() {
            Some(c @ 'a'..='z') => self.letters[(c as u8 - b'a') as usize],
            Some(c) => c as usize % self.reduce_tasks,
            None => 0,
        }
    }
}
