//! Transport registration and dispatch
//!
//! This module provides a centralized registry for all transports, with
//! support for feature-gated inclusion and dynamic help text generation.

use isrmod_core::transport::RegisterTransport;

/// Information about a transport backend
pub struct TransportInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available transports (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "dummy")]
    transports.push(TransportInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "Emulated module for testing (mode=bus|stream)",
    });

    #[cfg(feature = "linux-i2c")]
    transports.push(TransportInfo {
        name: "linux_i2c",
        aliases: &["linux-i2c", "i2c"],
        description: "Linux i2c-dev interface (dev=/dev/i2c-N,addr=<0x14>)",
    });

    #[cfg(feature = "serial")]
    transports.push(TransportInfo {
        name: "serial",
        aliases: &["uart"],
        description: "Serial port, 8N1 (dev=<port>,baud=<57600>)",
    });

    transports
}

/// Generate help text listing all available transports
pub fn transport_help() -> String {
    let transports = available_transports();

    if transports.is_empty() {
        return "No transports available (recompile with transport features enabled)".to_string();
    }

    let mut help = String::from("Available transports:\n");
    for t in &transports {
        help.push_str(&format!("  {:10} - {}\n", t.name, t.description));
    }
    help
}

/// Generate a short list of transport names for CLI help
pub fn transport_names_short() -> String {
    let transports = available_transports();
    let names: Vec<&str> = transports.iter().map(|t| t.name).collect();
    names.join(", ")
}

/// Resolve a transport name or alias to its primary name
pub fn find_transport(name: &str) -> Option<&'static str> {
    available_transports()
        .into_iter()
        .find(|t| t.name == name || t.aliases.contains(&name))
        .map(|t| t.name)
}

/// Parse a transport string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_transport_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the transport described by `spec`
#[allow(unused_variables)]
pub fn open_transport(spec: &str) -> Result<Box<dyn RegisterTransport>, Box<dyn std::error::Error>> {
    let (name, options) = parse_transport_string(spec);

    let canonical_name = match find_transport(name) {
        Some(n) => n,
        None => return Err(unknown_transport_error(name)),
    };

    match canonical_name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            log::info!("Attaching emulated module...");
            Ok(isrmod_dummy::open_dummy(&options)?)
        }

        #[cfg(feature = "linux-i2c")]
        "linux_i2c" => {
            log::info!("Opening Linux I2C transport...");
            isrmod_linux_i2c::open_linux_i2c(&options).map_err(|e| {
                format!(
                    "Failed to open Linux I2C device: {}\n\
                     Make sure i2c-dev is loaded and you have read/write permissions.\n\
                     You may need to: sudo usermod -aG i2c $USER",
                    e
                )
                .into()
            })
        }

        #[cfg(feature = "serial")]
        "serial" => {
            log::info!("Opening serial transport...");
            isrmod_serial::open_serial(&options)
                .map_err(|e| format!("Failed to open serial port: {}", e).into())
        }

        _ => Err(unknown_transport_error(name)),
    }
}

fn unknown_transport_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown transport: {}\n\n", name);
    msg.push_str(&transport_help());
    msg.push_str("\nUse 'isrmod list-transports' for more details");
    msg.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transport_string() {
        assert_eq!(parse_transport_string("dummy"), ("dummy", vec![]));
        assert_eq!(
            parse_transport_string("linux_i2c:dev=/dev/i2c-1,addr=0x14"),
            ("linux_i2c", vec![("dev", "/dev/i2c-1"), ("addr", "0x14")])
        );
        // Options without '=' are ignored
        assert_eq!(
            parse_transport_string("serial:dev=COM3,fast"),
            ("serial", vec![("dev", "COM3")])
        );
    }

    #[test]
    fn test_unknown_transport() {
        assert!(find_transport("ch341a").is_none());
        assert!(open_transport("ch341a").is_err());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_alias_opens() {
        assert_eq!(find_transport("emulator"), Some("dummy"));
        let mut transport = open_transport("dummy:mode=stream").unwrap();
        assert_eq!(transport.name(), "stream");
        assert!(transport.probe().is_ok());
    }
}
