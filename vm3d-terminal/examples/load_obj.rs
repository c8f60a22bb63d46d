/// Example: Load an OBJ model and fly around it next to the ship
///
/// Usage: cargo run --example load_obj -- path/to/model.obj

use std::env;
use std::path::PathBuf;
use vm3d_terminal::{TerminalApp, ViewerConfig, ViewerResult};

fn main() -> ViewerResult<()> {
    let mut config = ViewerConfig::default();

    match env::args().nth(1) {
        Some(path) => {
            println!("Loading OBJ file: {}", path);
            config.scene.obj = Some(PathBuf::from(path));
        }
        None => {
            eprintln!("Usage: load_obj <obj-file>");
            eprintln!("\nNo OBJ file provided, showing the ship only...");
        }
    }

    let mut app = TerminalApp::new(config)?;
    println!("Starting terminal renderer (press Esc to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    app.run()?;

    println!("Thank you for using the VM3D Terminal Viewer!");
    Ok(())
}
