//! List commands implementation

use crate::transports;

/// List all supported transports
pub fn list_transports() {
    let transports = transports::available_transports();
    if transports.is_empty() {
        println!("No transports compiled in.");
        return;
    }

    println!("Supported transports:");
    println!();
    for t in &transports {
        let aliases = if t.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", t.aliases.join(", "))
        };
        println!("  {:10} - {}{}", t.name, t.description, aliases);
    }
}
