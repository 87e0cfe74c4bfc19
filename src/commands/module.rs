//! Module configuration commands

use isrmod_core::device::{IsrModule, ModuleConfig};
use isrmod_core::error::Error;
use isrmod_core::register::{ModelType, MODULE_PID, MODULE_VID};
use isrmod_core::transport::RegisterTransport;

/// Check presence and print the identity registers
pub fn run_probe<T: RegisterTransport>(
    module: &mut IsrModule<T>,
) -> Result<(), Box<dyn std::error::Error>> {
    module.manager().transport_mut().probe()?;
    let identity = module.identity()?;

    println!("Found recognition module:");
    println!("  PID:      0x{:04X}", identity.pid);
    println!("  VID:      0x{:04X}", identity.vid);
    println!(
        "  Firmware: {}.{}",
        identity.version >> 8,
        identity.version & 0xFF
    );

    if identity.vid != MODULE_VID {
        log::warn!("Unexpected vendor id 0x{:04X}", identity.vid);
    }
    if identity.pid != MODULE_PID {
        return Err(Box::new(Error::IdentityMismatch {
            expected: MODULE_PID,
            found: identity.pid,
        }));
    }
    Ok(())
}

/// Bring the module up with `config`
pub fn run_init<T: RegisterTransport>(
    module: &mut IsrModule<T>,
    config: &ModuleConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    module.begin(config)?;
    println!(
        "Module ready: model {}, wake duration {}",
        config.model,
        describe_wake(config.wake_duration)
    );
    Ok(())
}

/// Select the recognition model
pub fn run_set_model<T: RegisterTransport>(
    module: &mut IsrModule<T>,
    model: ModelType,
) -> Result<(), Box<dyn std::error::Error>> {
    module.set_model_type(model)?;
    println!("Model set to {}", model);
    Ok(())
}

/// Set the wake duration
pub fn run_set_wake<T: RegisterTransport>(
    module: &mut IsrModule<T>,
    seconds: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    module.set_wakeup_time(seconds)?;
    println!("Wake duration set to {}", describe_wake(seconds));
    Ok(())
}

fn describe_wake(seconds: u8) -> String {
    match seconds {
        0 => "always awake".to_string(),
        1..=5 => format!("{} s (module raises this to 6 s)", seconds),
        s => format!("{} s", s),
    }
}
