//! Log setup and traffic formatting.
//!
//! Everything is emitted through `tracing`. Traffic entries use the
//! [`TRAFFIC_TARGET`] target so they can be filtered separately, e.g.
//! `RUST_LOG=serial_tap::traffic=off`.

use crate::bridge::event::ControlLine;
use crate::config::LoggingConfig;
use crate::error::AppError;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target used for forwarded data and control-line entries.
pub const TRAFFIC_TARGET: &str = "serial_tap::traffic";

const BYTES_PER_LINE: usize = 16;

/// Dump lines are indented so they line up under the log message.
const DUMP_INDENT: &str = "                    ";

/// Install the global subscriber: console output plus an optional log file.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| AppError::Logging(e.to_string()))?;

    let file_layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(AppError::LogFile)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

/// Render `data` as a canonical hex dump: offset, sixteen hex bytes in two
/// groups of eight, then the printable characters between bars.
///
/// ```
/// let dump = serial_tap::logging::hex_dump(b"AB");
/// assert_eq!(
///     dump,
///     "00000000  41 42                                             |AB|\n"
/// );
/// ```
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(BYTES_PER_LINE) * 79);

    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(out, "{:08x}  ", line * BYTES_PER_LINE);

        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{byte:02x} ");
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }

        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if (0x20..=0x7e).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }

    out
}

/// Hex dump with every line indented, without the trailing newline.
pub fn indented_hex_dump(data: &[u8]) -> String {
    hex_dump(data)
        .lines()
        .map(|line| format!("{DUMP_INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Log bytes that were forwarded in `direction`.
pub fn log_data(direction: &str, data: &[u8]) {
    info!(target: TRAFFIC_TARGET, "{}\n{}", direction, indented_hex_dump(data));
}

/// Log a mirrored control-line change, if control-flow logging is on.
pub fn log_control_flow(enabled: bool, direction: &str, line: ControlLine, asserted: bool) {
    if !enabled {
        return;
    }
    let state = if asserted { "set" } else { "clear" };
    info!(target: TRAFFIC_TARGET, "{}: {} {}", direction, line, state);
}


#[cfg(test)]
mod tests {
    use super::capture::capture;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_data_entry_is_direction_then_indented_dump() {
        let ((), logs) = capture(|| log_data("Left Port -> Right Port", b"AB"));

        assert_eq!(logs.traffic_entries(), 1);
        let contents = logs.contents();
        assert!(contents.contains("serial_tap::traffic: Left Port -> Right Port\n"));
        assert!(contents.contains(&format!(
            "{DUMP_INDENT}00000000  41 42                                             |AB|"
        )));
    }

    #[test]
    fn test_control_entries_follow_the_flag() {
        let ((), logs) = capture(|| {
            log_control_flow(false, "Left Port <- Right Port", ControlLine::Dsr, true)
        });
        assert_eq!(logs.traffic_entries(), 0);

        let ((), logs) = capture(|| {
            log_control_flow(true, "Left Port <- Right Port", ControlLine::Dsr, false)
        });
        assert_eq!(logs.traffic_entries(), 1);
        assert!(logs
            .contents()
            .contains("serial_tap::traffic: Left Port <- Right Port: DSR clear"));
    }

    #[test]
    fn test_full_line() {
        assert_eq!(
            hex_dump(b"0123456789abcdef"),
            "00000000  30 31 32 33 34 35 36 37  38 39 61 62 63 64 65 66  |0123456789abcdef|\n"
        );
    }

    #[test]
    fn test_partial_second_line_and_unprintables() {
        let mut data = b"0123456789abcdef".to_vec();
        data.extend_from_slice(&[0x00, 0x41, 0x7f]);

        let dump = hex_dump(&data);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "00000010  00 41 7f                                          |.A.|"
        );
        // The ASCII gutter starts in the same column on both lines.
        assert_eq!(lines[0].find('|'), lines[1].find('|'));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn test_indented_dump_has_no_trailing_newline() {
        let dump = indented_hex_dump(&[0x41, 0x42, 0x43]);
        assert!(dump.starts_with(DUMP_INDENT));
        assert!(!dump.ends_with('\n'));
        assert!(dump.contains("|ABC|"));
    }
}
