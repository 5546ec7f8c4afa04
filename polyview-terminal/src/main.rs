/// polyview - terminal viewer for OFF and RAW triangle meshes
///
/// Controls (view command):
///   - Drag with the left button: apply the current mode
///   - r/t/s: rotate/translate/scale mode, z: axis lock, o: reset
///   - k/l: rotate/translate the light, i: idle spin
///   - 1-4: points/lines/fill/fill+lines, f: flat/smooth, c: stripes
///   - n: next mesh, u: reload files, q/ESC: quit

use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use polyview_core::{
    loader, ControllerConfig, LoadError, Mesh, MeshFormat, SceneMesh, Session, TransformController,
    ViewConfig, Viewport, WeldStrategy,
};
use polyview_terminal::TerminalApp;

#[derive(Parser)]
#[command(name = "polyview", author, version, about = "Terminal viewer for OFF and RAW triangle meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open meshes in the interactive terminal viewer
    View {
        /// Mesh files; an octahedron is shown when none are given
        files: Vec<PathBuf>,

        #[command(flatten)]
        load: LoadArgs,

        /// Start with idle spin enabled
        #[arg(long)]
        spin: bool,

        /// Target frames per second
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Write logs to this file instead of stderr
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Load meshes and print their statistics
    Info {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        load: LoadArgs,
    },
}

#[derive(Args)]
struct LoadArgs {
    /// Force the input format instead of detecting it
    #[arg(long)]
    format: Option<MeshFormat>,

    /// Vertex welding strategy for triangle soups
    #[arg(long, default_value = "linear")]
    weld: WeldStrategy,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::View {
            files,
            load,
            spin,
            fps,
            log_file,
        } => init_logging(log_file.as_deref(), true)
            .map_err(CliError::from)
            .and_then(|()| view(&files, &load, spin, fps)),
        Commands::Info { files, load } => init_logging(None, false)
            .map_err(CliError::from)
            .and_then(|()| info(&files, &load)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("polyview: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default level.
///
/// Without a log file the interactive viewer sends only warnings to stderr.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> std::io::Result<()> {
    let default_level = if interactive && log_file.is_none() {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_scene(files: &[PathBuf], load: &LoadArgs) -> Result<Vec<SceneMesh>, LoadError> {
    files
        .iter()
        .map(|path| {
            let loaded = loader::load(path, load.format, load.weld)?;
            for warning in &loaded.warnings {
                tracing::warn!("{}: {}", path.display(), warning);
            }
            Ok(SceneMesh {
                name: display_name(path),
                mesh: loaded.mesh,
                source: Some(path.clone()),
            })
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn view(files: &[PathBuf], load: &LoadArgs, spin: bool, fps: u32) -> Result<(), CliError> {
    let mut meshes = load_scene(files, load)?;
    if meshes.is_empty() {
        tracing::info!("No mesh files given, showing the default octahedron");
        meshes.push(SceneMesh {
            name: "octahedron".to_string(),
            mesh: Mesh::octahedron(1.0),
            source: None,
        });
    }

    let mut controller = TransformController::new(ControllerConfig::default(), Viewport::new(80.0, 48.0));
    controller.set_idle_spin(spin);

    let mut session = Session::new(controller, ViewConfig::default(), load.weld);
    for mesh in meshes {
        session.add_mesh(mesh);
    }

    let mut app = TerminalApp::new(session, load.format, fps)?;
    app.run()?;
    Ok(())
}

fn info(files: &[PathBuf], load: &LoadArgs) -> Result<(), CliError> {
    for path in files {
        let loaded = loader::load(path, load.format, load.weld)?;
        let mesh = &loaded.mesh;

        println!("{} ({})", path.display(), loaded.format);
        println!("  vertices: {}", mesh.vertices().len());
        println!("  faces:    {}", mesh.faces().len());
        println!("  warnings: {}", loaded.warnings.len());
        for warning in &loaded.warnings {
            println!("    {warning}");
        }
        if let Some(bounds) = mesh.bounds() {
            println!(
                "  bounds:   ({:.4}, {:.4}, {:.4}) .. ({:.4}, {:.4}, {:.4}), radius {:.4}",
                bounds.min.x,
                bounds.min.y,
                bounds.min.z,
                bounds.max.x,
                bounds.max.y,
                bounds.max.z,
                bounds.radius()
            );
        }
    }
    Ok(())
}
