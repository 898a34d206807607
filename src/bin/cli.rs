use crablens::testing::FakeSessionAdapter;
use crablens::{
    CameraControl, CapabilityCatalog, CrabLensConfig, JsonDeviceSource, Position, SwitchOutcome,
};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    crablens::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: crablens-cli <devices|presets|simulate> [snapshot.json] [args]");
        std::process::exit(1);
    }

    let command = &args[1];
    match command.as_str() {
        "devices" => cmd_devices(&args),
        "presets" => cmd_presets(&args),
        "simulate" => cmd_simulate(&args),
        _ => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

/// Snapshot path from the command line, else from crablens.toml
fn load_catalog(args: &[String]) -> Result<CapabilityCatalog, Box<dyn std::error::Error>> {
    let path = match args
        .get(2)
        .filter(|a| !a.starts_with("--") && a.parse::<Position>().is_err())
    {
        Some(path) => path.clone(),
        None => CrabLensConfig::load_or_default()
            .catalog
            .device_snapshot_path
            .ok_or("device snapshot path required")?,
    };
    Ok(CapabilityCatalog::from_source(&JsonDeviceSource::new(path))?)
}

fn cmd_devices(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(args)?;
    if args.contains(&"--json".to_string()) {
        println!("{}", serde_json::to_string(catalog.devices())?);
    } else {
        for d in catalog.devices() {
            println!(
                "{}: {:?} {:?} fov={:.1} zoom={}..={} flash={}",
                d.id,
                d.position,
                d.device_kind,
                d.field_of_view_degrees,
                d.min_zoom_factor,
                d.max_zoom_factor,
                d.has_flash
            );
        }
        if let Some(anchor) = catalog.back_anchor() {
            println!("back anchor: {}", anchor.id);
        }
    }
    Ok(())
}

fn cmd_presets(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(args)?;
    let position = match args.iter().skip(2).find(|a| *a == "front" || *a == "back") {
        Some(p) => p.parse::<Position>()?,
        None => Position::Back,
    };

    let presets = catalog.presets(position);
    if args.contains(&"--json".to_string()) {
        println!("{}", serde_json::to_string(&presets)?);
    } else if presets.is_empty() {
        println!("No camera available ({})", position.as_str());
    } else {
        for p in presets {
            println!(
                "{:>5} -> {} @ {:.2}{}",
                p.label(),
                p.target_device.id,
                p.target_zoom_factor,
                if p.is_virtual_zoom { " (virtual)" } else { "" }
            );
        }
    }
    Ok(())
}

/// Drive the engine over an in-memory session: every back preset, then a flip
fn cmd_simulate(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(args)?;
    let config = CrabLensConfig::load_or_default();
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async move {
        let control = CameraControl::spawn(catalog, FakeSessionAdapter::new(), config.engine)?;
        control.start().await?;

        for preset in control.presets(Position::Back) {
            let label = preset.label();
            let outcome = control.switch_to(preset).await?;
            report(&label, &outcome, &control);
        }

        let outcome = control.flip_position().await?;
        report("flip", &outcome, &control);

        control.shutdown().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn report(step: &str, outcome: &SwitchOutcome, control: &CameraControl) {
    let snapshot = control.snapshot();
    match snapshot.selection {
        Some(state) => println!(
            "{:>5}: {:?} -> {} zoom={:.2} flash={:?}",
            step, outcome, state.current_device.id, state.current_zoom_factor, state.flash_mode
        ),
        None => println!("{:>5}: {:?} (idle)", step, outcome),
    }
}
