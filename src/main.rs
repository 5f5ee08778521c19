use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use shapekit::shapes::subroutine;
use shapekit::{Defaults, NcShape, Program, ShapeInstance};

/// Command line host for the ShapeKit core: loads a project file,
/// re-attaches fonts and subroutines, and writes the rendered program.
struct Args {
    project: Option<PathBuf>,
    output: Option<PathBuf>,
    defaults: Option<PathBuf>,
    subroutine_dir: Option<PathBuf>,
}

fn usage() -> ! {
    eprintln!(
        "Usage: shapekit [OPTIONS] [PROJECT]\n\
         \n\
         Renders a ShapeKit project file (JSON shape list) to G-code.\n\
         Without a project, renders an empty program (preamble/postamble).\n\
         \n\
         Options:\n\
           -o, --output FILE      write G-code to FILE instead of stdout\n\
           -d, --defaults FILE    defaults table for newly created shapes\n\
           -s, --subroutines DIR  directory of .ngc subroutines to attach\n\
           -V, --version          print version and exit"
    );
    std::process::exit(2)
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        project: None,
        output: None,
        defaults: None,
        subroutine_dir: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                args.output = Some(it.next().map(PathBuf::from).unwrap_or_else(|| usage()))
            }
            "-d" | "--defaults" => {
                args.defaults = Some(it.next().map(PathBuf::from).unwrap_or_else(|| usage()))
            }
            "-s" | "--subroutines" => {
                args.subroutine_dir =
                    Some(it.next().map(PathBuf::from).unwrap_or_else(|| usage()))
            }
            "-V" | "--version" => {
                println!("shapekit {} (built {})", shapekit::VERSION, shapekit::BUILD_DATE);
                std::process::exit(0)
            }
            "-h" | "--help" => usage(),
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {other}");
                usage()
            }
            other => {
                if args.project.is_some() {
                    bail!("Only one project file may be given");
                }
                args.project = Some(PathBuf::from(other));
            }
        }
    }
    Ok(args)
}

/// Re-attaches loaded resources to the shapes that reference them.
fn attach_resources(program: &mut Program, subroutine_dir: Option<&PathBuf>) {
    let subs = subroutine_dir
        .map(|dir| match subroutine::load_all_subroutines(dir) {
            Ok(subs) => subs,
            Err(e) => {
                warn!("{e}");
                Vec::new()
            }
        })
        .unwrap_or_default();

    for shape in program.shapes_mut() {
        match shape {
            ShapeInstance::Text(text) => {
                if text.fontfile.is_empty() {
                    continue;
                }
                let fontfile = text.fontfile.clone();
                if let Err(e) = text.load_font(&fontfile) {
                    warn!("{}: {e}", text.object_name());
                }
            }
            ShapeInstance::Subroutine(call) => {
                match subs.iter().find(|s| s.name == call.sub_name) {
                    Some(sub) => call.sub = Some(Arc::new(sub.clone())),
                    None => warn!(
                        "{}: subroutine {:?} not found",
                        call.object_name(),
                        call.sub_name
                    ),
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    shapekit::init_logging()?;
    let args = parse_args()?;

    let defaults = match &args.defaults {
        Some(path) => Defaults::load(path)?,
        None => Defaults::default(),
    };

    let name = args
        .project
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());
    let mut program = Program::new(name, defaults);

    if let Some(project) = &args.project {
        program.load_project(project)?;
        attach_resources(&mut program, args.subroutine_dir.as_ref());
        info!("Loaded {} with {} objects", project.display(), program.len());
    }

    match &args.output {
        Some(path) => {
            program
                .save_gcode(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", program.gcode(false)),
    }
    Ok(())
}
