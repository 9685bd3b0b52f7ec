use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fallos de ejecución de una tarea map o reduce.
/// Ninguno se recupera localmente: abortan el intento de la tarea.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("no se pudo leer {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no se pudo escribir {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("línea mal formada en {}:{line_no}: {line:?}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line_no: usize,
        line: String,
    },
}

impl TaskError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TaskError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TaskError::Write {
            path: path.into(),
            source,
        }
    }
}
