use clap::Parser;
use serial_tap::bridge::{spawn_ctrl_c_listener, spawn_keypress_listener};
use serial_tap::config::{Config, ConfigError, ConfigLoader};
use serial_tap::{
    logging, port, AppError, Bridge, LinkSettings, ShutdownCoordinator, SyncSerialPort,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "serial-tap",
    version,
    about = "Bridge two serial ports and log everything that crosses between them.",
    long_about = "Forwards bytes in both directions between two serial ports, mirrors CTS/DSR \
                  on one port onto RTS/DTR on the other, and logs every forwarded chunk as a \
                  hex dump. Port definitions use the form PORT,BAUD,PARITY,DATABITS,STOPBITS, \
                  for example COM5,19200,N,8,1."
)]
struct Args {
    /// Left port definition
    #[arg(short = 'l', long, value_name = "DEFINITION")]
    left_port: Option<String>,

    /// Name of the left port in logs
    #[arg(long, value_name = "LABEL")]
    left_label: Option<String>,

    /// Right port definition
    #[arg(short = 'r', long, value_name = "DEFINITION")]
    right_port: Option<String>,

    /// Name of the right port in logs
    #[arg(long, value_name = "LABEL")]
    right_label: Option<String>,

    /// Also append the log to this file
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Read timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    read_timeout: Option<u64>,

    /// Bytes requested per read
    #[arg(long, value_name = "BYTES")]
    read_buffer: Option<usize>,

    /// Log every mirrored CTS/DSR transition
    #[arg(long)]
    log_control_flow: bool,

    /// Apply events to each port strictly in the order they were observed
    #[arg(long)]
    ordered: bool,

    /// Do not stop when return is pressed (Ctrl-C still works)
    #[arg(long)]
    no_keypress: bool,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    /// Command-line flags win over file and environment values.
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref port) = self.left_port {
            config.left.port = port.clone();
        }
        if let Some(ref label) = self.left_label {
            config.left.label = label.clone();
        }
        if let Some(ref port) = self.right_port {
            config.right.port = port.clone();
        }
        if let Some(ref label) = self.right_label {
            config.right.label = label.clone();
        }
        if let Some(ref file) = self.output {
            config.logging.file = Some(file.clone());
        }
        if let Some(ms) = self.read_timeout {
            config.serial.read_timeout_ms = ms;
        }
        if let Some(size) = self.read_buffer {
            config.serial.read_buffer_size = size;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
        if self.log_control_flow {
            config.logging.log_control_flow = true;
        }
        if self.ordered {
            config.serial.dispatch = serial_tap::DispatchMode::Ordered;
        }
        if self.no_keypress {
            config.interrupt.keypress = false;
        }
    }
}

// --- Main Application Entry Point ---
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            if tracing::dispatcher::has_been_set() {
                error!("{err}");
            } else {
                eprintln!("{err}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, AppError> {
    let mut config = ConfigLoader::load(args.config.as_deref())?.into_config();
    args.apply_to(&mut config);
    config.validate()?;

    if args.dump_config {
        let rendered = toml::to_string_pretty(&config).map_err(ConfigError::from)?;
        print!("{rendered}");
        return Ok(ExitCode::SUCCESS);
    }

    if args.list_ports {
        list_ports()?;
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(&config.logging)?;

    let left = open_port(&config.left.port, &config.left.label, "left", &config)?;
    let right = open_port(&config.right.port, &config.right.label, "right", &config)?;

    let bridge = Bridge::new(Arc::new(left), Arc::new(right), config.bridge_settings());
    let coordinator = ShutdownCoordinator::new();
    if config.interrupt.keypress {
        spawn_keypress_listener(coordinator.reporter())?;
    }
    spawn_ctrl_c_listener(coordinator.reporter());

    info!("Both ports successfully opened. starting proxy threads...");
    if config.interrupt.keypress {
        info!("Press return to quit");
    } else {
        info!("Press Ctrl-C to quit");
    }

    let cause = bridge.run(coordinator).await;
    if cause.is_user_break() {
        info!("{cause}");
    } else {
        error!("{cause}");
    }

    Ok(cause.exit_code())
}

fn open_port(
    definition: &str,
    label: &str,
    side: &str,
    config: &Config,
) -> Result<SyncSerialPort, AppError> {
    let settings: LinkSettings = definition.parse().map_err(|source| AppError::Definition {
        label: label.to_string(),
        source,
    })?;

    info!("Opening {side} serial port ({label}): {settings}");
    SyncSerialPort::open(&settings, config.serial.read_timeout()).map_err(|source| AppError::Open {
        label: label.to_string(),
        source,
    })
}

fn list_ports() -> Result<(), AppError> {
    let ports = port::available_ports().map_err(AppError::ListPorts)?;
    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    for info in ports {
        match info.port_type {
            serialport::SerialPortType::UsbPort(usb) => println!(
                "{}  USB {:04x}:{:04x} {}",
                info.port_name,
                usb.vid,
                usb.pid,
                usb.product.unwrap_or_default()
            ),
            serialport::SerialPortType::PciPort => println!("{}  PCI", info.port_name),
            serialport::SerialPortType::BluetoothPort => println!("{}  Bluetooth", info.port_name),
            serialport::SerialPortType::Unknown => println!("{}", info.port_name),
        }
    }
    Ok(())
}
