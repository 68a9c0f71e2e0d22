use anyhow::{Context, Result, bail};
use lume_asset::extract::ExportKinds;
use lume_asset::scene::ObjImporter;
use lume_asset::{ExportOptions, MaterialElements, MaterialSelection, MeshElements, export_file};
use std::env;
use std::path::PathBuf;

const USAGE: &str = "\
Usage: lume-processor <input> [mesh] [material] [animation]
           [--mesh-elements <bits>] [--material-elements <bits>]
           [--mesh-name <name>] [--material-index <n>]

  mesh elements:     1 position, 2 normal, 4 color, 8 texcoord (default 15)
  material elements: 1 diffuse, 2 emissive, 4 specular, 8 normal map (default 15)";

fn parse_bits(flag: &str, value: &str) -> Result<u32> {
    let bits = value.parse::<u32>().with_context(|| format!("{} expects a number, got '{}'", flag, value))?;
    if bits == 0 || bits > 15 {
        bail!("{} must be between 1 and 15, got {}", flag, bits);
    }
    Ok(bits)
}

fn parse_args(args: &[String]) -> Result<(PathBuf, ExportOptions)> {
    let Some((input, rest)) = args.split_first() else {
        bail!("Missing input file");
    };

    let mut options = ExportOptions::default();
    let mut kinds = ExportKinds::NONE;
    let mut rest = rest.iter();

    while let Some(arg) = rest.next() {
        let mut value = || rest.next().with_context(|| format!("{} expects a value", arg));
        match arg.as_str() {
            "mesh" => kinds = kinds | ExportKinds::MESH,
            "material" => kinds = kinds | ExportKinds::MATERIAL,
            "animation" => kinds = kinds | ExportKinds::ANIMATION,
            "--mesh-elements" => options.mesh_elements = MeshElements(parse_bits(arg, value()?)?),
            "--material-elements" => options.material_elements = MaterialElements(parse_bits(arg, value()?)?),
            "--mesh-name" => options.mesh_name = Some(value()?.clone()),
            "--material-index" => {
                let raw = value()?;
                let index = raw.parse::<usize>().with_context(|| format!("{} expects a number, got '{}'", arg, raw))?;
                options.material = MaterialSelection::Index(index);
            }
            other => bail!("Unknown argument '{}', expected mesh, material, animation or an option", other),
        }
    }

    if !kinds.is_empty() {
        options.kinds = kinds;
    }
    Ok((PathBuf::from(input), options))
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("{}", USAGE);
        return Ok(());
    }

    let (input_path, options) = parse_args(&args[1..])?;

    println!("Processing {:?}...", input_path);
    let start_total = std::time::Instant::now();

    let outcomes = export_file(&ObjImporter, &input_path, &options)
        .with_context(|| format!("Failed to import scene: {:?}", input_path))?;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(bytes) => println!("{:?}: wrote {:?} ({} bytes)", outcome.kind, outcome.path, bytes),
            Err(e) => {
                failed += 1;
                println!("{:?}: failed, {}", outcome.kind, e);
            }
        }
    }
    println!("Total execution time: {:.2}s", start_total.elapsed().as_secs_f32());

    if failed == outcomes.len() {
        bail!("No assets exported from {:?}", input_path);
    }
    Ok(())
}
