use clap::{Parser, Subcommand};
use std::path::PathBuf;

use treescope::camera::{self, CameraError, CameraSettings, Resolution};
use treescope::config::Config;
use treescope::gui::{AppSettings, TreeScopeApp};
use treescope::shutdown;

/// Parse and validate a resolution (WIDTHxHEIGHT format)
fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 640x480)",
            s
        ));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width '{}' in resolution", parts[0]))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height '{}' in resolution", parts[1]))?;
    if width == 0 || height == 0 {
        return Err("Resolution width and height must be greater than 0".to_string());
    }
    if width > 7680 || height > 4320 {
        return Err("Resolution exceeds maximum supported (7680x4320)".to_string());
    }
    Ok(Resolution { width, height })
}

/// Parse and validate a framerate (1-120 fps)
fn parse_framerate(s: &str) -> Result<u32, String> {
    let fps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid framerate", s))?;
    if !(1..=120).contains(&fps) {
        return Err(format!(
            "Framerate must be between 1 and 120 fps, got {}",
            fps
        ));
    }
    Ok(fps)
}

/// treescope: live tree classification viewer
#[derive(Parser)]
#[command(name = "treescope")]
#[command(version, about = "Live camera viewer with tree classification")]
#[command(after_help = "EXAMPLES:
    # Launch with the default camera
    treescope

    # Use the second camera at 1280x720, unmirrored
    treescope --device 1 --resolution 1280x720 --no-mirror

    # List available cameras
    treescope list-devices")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Camera device index
    #[arg(long, short = 'd')]
    device: Option<u32>,

    /// Capture resolution (WIDTHxHEIGHT, e.g. 640x480)
    #[arg(long, short = 'r', value_parser = parse_resolution)]
    resolution: Option<Resolution>,

    /// Capture framerate (1-120 fps)
    #[arg(long, short = 'f', value_parser = parse_framerate)]
    fps: Option<u32>,

    /// Mirror the camera preview horizontally
    #[arg(long)]
    mirror: bool,

    /// Disable mirroring (overrides --mirror and config)
    #[arg(long)]
    no_mirror: bool,

    /// Hide the tree information panel
    #[arg(long)]
    no_info_panel: bool,

    /// Custom config file path (default: ~/.config/treescope/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available camera devices
    ListDevices,
}

/// Merge settings: CLI args > config file > built-in defaults.
fn resolve_settings(cli: &Cli, cfg: &Config) -> AppSettings {
    let device_index = cli.device.or(cfg.camera.device).unwrap_or(0);

    let resolution = cli.resolution.unwrap_or_else(|| {
        match (cfg.camera.width, cfg.camera.height) {
            (Some(width), Some(height)) => Resolution { width, height },
            _ => Resolution::default(),
        }
    });

    let fps = cli.fps.or(cfg.camera.fps).unwrap_or(30);

    // --no-mirror beats --mirror beats the config file.
    let mirror = if cli.no_mirror {
        false
    } else if cli.mirror {
        true
    } else {
        cfg.camera.mirror.unwrap_or(true)
    };

    let info_panel = if cli.no_info_panel {
        false
    } else {
        cfg.ui.info_panel.unwrap_or(true)
    };

    AppSettings {
        camera: CameraSettings {
            device_index,
            resolution,
            fps,
            mirror,
        },
        info_panel,
    }
}

fn run_list_devices() -> Result<(), CameraError> {
    let devices = camera::list_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
    } else {
        for device in &devices {
            println!("{}", device);
        }
    }
    Ok(())
}

fn run_app(settings: AppSettings) -> Result<(), eframe::Error> {
    if let Err(e) = shutdown::install_ctrlc_handler() {
        log::warn!("Could not install Ctrl-C handler: {}", e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 850.0])
            .with_title("Treescope - Real-time Tree Classification"),
        ..Default::default()
    };

    eframe::run_native(
        "treescope",
        options,
        Box::new(move |cc| Ok(Box::new(TreeScopeApp::new(cc, settings)))),
    )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ListDevices) => {
            if let Err(e) = run_list_devices() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            // An explicitly named config file must exist; the default
            // path is allowed to be absent.
            if let Some(path) = &cli.config {
                if !path.exists() {
                    eprintln!("Error: config file '{}' not found", path.display());
                    std::process::exit(1);
                }
            }

            let cfg = match Config::load(cli.config.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            let settings = resolve_settings(&cli, &cfg);
            if let Err(e) = run_app(settings) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_cli() -> Cli {
        Cli {
            command: None,
            device: None,
            resolution: None,
            fps: None,
            mirror: false,
            no_mirror: false,
            no_info_panel: false,
            config: None,
        }
    }

    // Resolution parsing tests

    #[test]
    fn parse_resolution_valid() {
        assert_eq!(
            parse_resolution("640x480").unwrap(),
            Resolution {
                width: 640,
                height: 480
            }
        );
        assert_eq!(
            parse_resolution("1920x1080").unwrap(),
            Resolution {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn parse_resolution_invalid_format() {
        assert!(parse_resolution("640").is_err());
        assert!(parse_resolution("640:480").is_err());
        assert!(parse_resolution("widthxheight").is_err());
    }

    #[test]
    fn parse_resolution_zero_values() {
        assert!(parse_resolution("0x480").is_err());
        assert!(parse_resolution("640x0").is_err());
    }

    #[test]
    fn parse_resolution_too_large() {
        assert!(parse_resolution("10000x10000").is_err());
    }

    // Framerate parsing tests

    #[test]
    fn parse_framerate_valid() {
        assert_eq!(parse_framerate("30").unwrap(), 30);
        assert_eq!(parse_framerate("1").unwrap(), 1);
        assert_eq!(parse_framerate("120").unwrap(), 120);
    }

    #[test]
    fn parse_framerate_invalid() {
        assert!(parse_framerate("0").is_err());
        assert!(parse_framerate("121").is_err());
        assert!(parse_framerate("abc").is_err());
    }

    // Settings merge tests

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = resolve_settings(&bare_cli(), &Config::default());
        assert_eq!(settings.camera.device_index, 0);
        assert_eq!(settings.camera.resolution, Resolution::default());
        assert_eq!(settings.camera.fps, 30);
        assert!(settings.camera.mirror);
        assert!(settings.info_panel);
    }

    #[test]
    fn cli_overrides_config() {
        let mut cli = bare_cli();
        cli.device = Some(2);
        cli.fps = Some(60);

        let cfg: Config = toml::from_str("[camera]\ndevice = 1\nfps = 15\n").unwrap();
        let settings = resolve_settings(&cli, &cfg);
        assert_eq!(settings.camera.device_index, 2);
        assert_eq!(settings.camera.fps, 60);
    }

    #[test]
    fn config_used_when_cli_is_silent() {
        let cfg: Config =
            toml::from_str("[camera]\ndevice = 1\nwidth = 1280\nheight = 720\nmirror = false\n")
                .unwrap();
        let settings = resolve_settings(&bare_cli(), &cfg);
        assert_eq!(settings.camera.device_index, 1);
        assert_eq!(
            settings.camera.resolution,
            Resolution {
                width: 1280,
                height: 720
            }
        );
        assert!(!settings.camera.mirror);
    }

    #[test]
    fn no_mirror_overrides_mirror() {
        let mut cli = bare_cli();
        cli.mirror = true;
        cli.no_mirror = true;
        let settings = resolve_settings(&cli, &Config::default());
        assert!(!settings.camera.mirror);
    }

    #[test]
    fn partial_config_resolution_falls_back() {
        // Width without height is not a resolution; use the default.
        let cfg: Config = toml::from_str("[camera]\nwidth = 1280\n").unwrap();
        let settings = resolve_settings(&bare_cli(), &cfg);
        assert_eq!(settings.camera.resolution, Resolution::default());
    }

    #[test]
    fn info_panel_toggle() {
        let mut cli = bare_cli();
        cli.no_info_panel = true;
        let cfg: Config = toml::from_str("[ui]\ninfo_panel = true\n").unwrap();
        let settings = resolve_settings(&cli, &cfg);
        assert!(!settings.info_panel);
    }
}
