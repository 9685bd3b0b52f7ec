use common::Phase;
use reqwest::StatusCode;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::WorkerError;
use crate::worker::{PollStep, Worker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get(Phase),
    /// `GET <algo>` con una ruta que el protocolo no tiene; se reenvía al coordinator.
    UnknownEndpoint(String),
    Invalid,
}

/// Interpreta una línea del operador: `GET map` o `GET reduce`.
pub fn parse_command(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), None) if method.eq_ignore_ascii_case("GET") => {
            match path.trim_start_matches('/') {
                "map" => Command::Get(Phase::Map),
                "reduce" => Command::Get(Phase::Reduce),
                other => Command::UnknownEndpoint(other.to_string()),
            }
        }
        _ => Command::Invalid,
    }
}

/// Consola interactiva: cada `GET map`/`GET reduce` pide una tarea y la ejecuta.
/// Termina cuando ya no quedan tareas reduce o cuando se cierra la entrada.
pub async fn run_console<R, W>(worker: &Worker, input: R, out: &mut W) -> Result<(), WorkerError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        writeln!(out, "Enter your HTTP command (GET map, GET reduce):")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        match parse_command(&line) {
            Command::Get(phase) => match worker.poll_and_run(phase).await? {
                PollStep::Ran(task_id) => {
                    writeln!(out, "Worker finished {} task {}\n", phase, task_id)?;
                }
                PollStep::Exhausted if phase == Phase::Map => {
                    writeln!(out, "All map tasks are finished!\n")?;
                }
                PollStep::Exhausted => {
                    writeln!(out, "All reduce tasks are finished!")?;
                    writeln!(out, "The program is finished!\n")?;
                    return Ok(());
                }
                PollStep::PhaseNotReady => {
                    writeln!(out, "Not all map tasks are finished!\n")?;
                }
            },
            Command::UnknownEndpoint(path) => {
                // se reenvía igual: el coordinator decide si la ruta existe
                match worker.client().get_status(&path).await? {
                    StatusCode::NOT_FOUND => writeln!(out, "Wrong endpoint!\n")?,
                    status => writeln!(out, "Unexpected response: {}\n", status)?,
                }
            }
            Command::Invalid => {
                writeln!(
                    out,
                    "Invalid input format. Please provide a valid HTTP command."
                )?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_acepta_get_map_y_reduce() {
        assert_eq!(parse_command("GET map"), Command::Get(Phase::Map));
        assert_eq!(parse_command("  get /reduce "), Command::Get(Phase::Reduce));
    }

    #[test]
    fn parse_command_rechaza_lo_demas() {
        assert_eq!(
            parse_command("GET jobs"),
            Command::UnknownEndpoint("jobs".to_string())
        );
        assert_eq!(parse_command("POST map"), Command::Invalid);
        assert_eq!(parse_command("GET"), Command::Invalid);
        assert_eq!(parse_command(""), Command::Invalid);
        assert_eq!(parse_command("GET map ahora"), Command::Invalid);
    }
}
