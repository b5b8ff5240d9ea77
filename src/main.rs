/*

    Run the Max-like group command on a scene file.

    Loads the scene, groups the current selection (optionally
    several times in a row) and prints the resulting scene as
    JSON on stdout.

    @date: Nov, 2025
    @author: Bartu

*/

use std::{self, env};
use tracing::{info, warn, error, debug};

use max_group::command::{CommandStatus, GroupSelected};
use max_group::json_parser::parse_scene_json;

fn main() -> Result<(), Box<dyn std::error::Error>> {

    // Logging on console
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    let (json_path, repeat) = match args.as_slice() {
        [_, path] => (path.clone(), 1),
        [_, path, flag, n] if flag == "--repeat" => (path.clone(), n.parse::<usize>()?),
        _ => {
            let bin = args.first().map(String::as_str).unwrap_or("max-group");
            error!("Usage: {} <scene>.json [--repeat N]", bin);
            std::process::exit(1);
        }
    };

    // Parse JSON
    info!("Loading scene from {}...", json_path);
    let root = parse_scene_json(&json_path).map_err(|e| {
        error!("Failed to load scene: {}", e);
        e
    })?;

    let mut scene = root.scene.build()?;
    debug!("Scene is setup successfully.\n {:#?}", scene);

    let command = GroupSelected::new(root.scene.settings);
    for i in 0..repeat {
        match command.execute(&mut scene)? {
            CommandStatus::Finished(proxy) => {
                info!("Pass {}: grouped {} objects under {:?} (size {})", i + 1, proxy.children.len(), proxy.id, proxy.size);
            }
            CommandStatus::Cancelled => {
                warn!("Pass {}: nothing selected, stopping.", i + 1);
                break;
            }
        }
    }

    let report = scene.report()?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Finished execution.");
    Ok(())
}
