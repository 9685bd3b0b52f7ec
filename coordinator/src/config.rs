use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::state::BarrierPolicy;

#[derive(Parser, Debug, Clone)]
#[command(name = "coordinator")]
#[command(about = "Coordinador de tareas map/reduce para contar palabras")]
pub struct Cli {
    /// Cantidad de tareas map pedida (se recorta a la cantidad de archivos)
    #[arg(short = 'n', long = "map-tasks", value_parser = clap::value_parser!(u32).range(1..))]
    pub map_tasks: u32,

    /// Cantidad de tareas reduce
    #[arg(short = 'm', long = "reduce-tasks", value_parser = clap::value_parser!(u32).range(1..))]
    pub reduce_tasks: u32,

    /// Directorio con los `*.txt` de entrada
    #[arg(long, default_value = "inputs")]
    pub input_dir: PathBuf,

    /// Directorio base de `outputs_tmp/` y `outputs/`
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Cuándo se habilitan las tareas reduce
    #[arg(long, value_enum, default_value_t = BarrierPolicy::AllAssigned)]
    pub barrier: BarrierPolicy,
}

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub map_tasks: usize,
    pub reduce_tasks: usize,
    pub input_dir: PathBuf,
    pub work_dir: PathBuf,
    pub bind: SocketAddr,
    pub barrier: BarrierPolicy,
}

impl From<Cli> for CoordinatorConfig {
    fn from(cli: Cli) -> Self {
        Self {
            map_tasks: cli.map_tasks as usize,
            reduce_tasks: cli.reduce_tasks as usize,
            input_dir: cli.input_dir,
            work_dir: cli.work_dir,
            bind: cli.bind,
            barrier: cli.barrier,
        }
    }
}
