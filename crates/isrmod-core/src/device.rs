//! Recognition module facade
//!
//! [`IsrModule`] is what applications hold: bring-up, the two
//! configuration registers, identity, recognition polling, and the
//! command word table (forwarded to [`CommandWordManager`]).

use core::fmt;

use crate::error::{Error, Result};
use crate::manager::CommandWordManager;
use crate::observer::{LogObserver, Observer};
use crate::register::{reg, ModelType, MODULE_PID, NO_MATCH_ID, WAKE_WORD_ID};
use crate::transport::RegisterTransport;

/// Longest wake duration the module accepts, in seconds
pub const MAX_WAKE_DURATION: u8 = 120;
/// Shortest nonzero wake duration; the module raises smaller values to this
pub const MIN_WAKE_DURATION: u8 = 6;

/// Bring-up parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Recognition model to load
    pub model: ModelType,
    /// Seconds the module stays awake after the wake word (0 = always awake)
    pub wake_duration: u8,
    /// Check the product id before configuring
    pub verify_identity: bool,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            model: ModelType::Chinese,
            wake_duration: 10,
            verify_identity: true,
        }
    }
}

impl ModuleConfig {
    /// Set the recognition model
    pub fn with_model(mut self, model: ModelType) -> Self {
        self.model = model;
        self
    }

    /// Set the wake duration in seconds
    pub fn with_wake_duration(mut self, secs: u8) -> Self {
        self.wake_duration = secs;
        self
    }

    /// Enable or disable the product id check
    pub fn with_verify_identity(mut self, verify: bool) -> Self {
        self.verify_identity = verify;
        self
    }
}

/// Identity registers of the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Product id
    pub pid: u16,
    /// Vendor id
    pub vid: u16,
    /// Firmware version
    pub version: u16,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PID 0x{:04X}, VID 0x{:04X}, firmware {}.{}",
            self.pid,
            self.vid,
            self.version >> 8,
            self.version & 0xFF
        )
    }
}

/// Decoded recognition result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognition {
    /// The wake word was heard
    WakeWord,
    /// A command word with this id was heard
    Command(u8),
    /// Nothing recognized (or the read failed)
    NoMatch,
}

impl Recognition {
    /// Decode a value of the result register
    pub fn from_id(id: u8) -> Self {
        match id {
            WAKE_WORD_ID => Self::WakeWord,
            NO_MATCH_ID => Self::NoMatch,
            id => Self::Command(id),
        }
    }
}

impl fmt::Display for Recognition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WakeWord => write!(f, "wake word"),
            Self::Command(id) => write!(f, "command word {}", id),
            Self::NoMatch => write!(f, "no match"),
        }
    }
}

/// Speech recognition module
pub struct IsrModule<T, O = LogObserver> {
    words: CommandWordManager<T, O>,
}

impl<T: RegisterTransport> IsrModule<T> {
    /// Wrap a transport
    pub fn new(transport: T) -> Self {
        Self {
            words: CommandWordManager::new(transport),
        }
    }
}

impl<T: RegisterTransport, O: Observer> IsrModule<T, O> {
    /// Wrap a transport, reporting trace points to `observer`
    pub fn with_observer(transport: T, observer: O) -> Self {
        Self {
            words: CommandWordManager::with_observer(transport, observer),
        }
    }

    /// Command word manager
    pub fn manager(&mut self) -> &mut CommandWordManager<T, O> {
        &mut self.words
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        self.words.transport()
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.words.into_inner()
    }

    /// Bring the module up: probe, optionally check identity, then load the
    /// model and wake duration and wait for the module to settle
    pub fn begin(&mut self, config: &ModuleConfig) -> Result<()> {
        check_wake_duration(config.wake_duration)?;

        self.words.transport_mut().probe()?;

        if config.verify_identity {
            let pid = self.read_u16(reg::PID)?;
            if pid != MODULE_PID {
                log::error!("isr: unexpected product id 0x{:04X}", pid);
                return Err(Error::IdentityMismatch {
                    expected: MODULE_PID,
                    found: pid,
                });
            }
        }

        // One write sets both: the module reads the model from the byte
        // after the wake duration
        self.words.write_register(
            reg::WAKEUP_TIME,
            &[config.wake_duration, config.model.as_byte()],
        )?;

        let settle = self.words.transport().timing().init_settle_ms;
        self.words.transport_mut().delay_ms(settle);

        log::info!(
            "isr: module ready over {} (model {}, wake {} s)",
            self.words.transport().name(),
            config.model,
            config.wake_duration
        );
        Ok(())
    }

    /// Read the product id, vendor id and firmware version
    pub fn identity(&mut self) -> Result<Identity> {
        Ok(Identity {
            pid: self.read_u16(reg::PID)?,
            vid: self.read_u16(reg::VID)?,
            version: self.read_u16(reg::VERSION)?,
        })
    }

    /// Select the recognition model
    pub fn set_model_type(&mut self, model: ModelType) -> Result<()> {
        log::debug!("isr: model type {}", model);
        self.words.write_register(reg::MODEL_TYPE, &[model.as_byte()])
    }

    /// Set how long the module stays awake after the wake word.
    ///
    /// 0 keeps it awake permanently; 1 to 5 are raised to 6 by the module.
    pub fn set_wakeup_time(&mut self, secs: u8) -> Result<()> {
        check_wake_duration(secs)?;
        if secs != 0 && secs < MIN_WAKE_DURATION {
            log::debug!(
                "isr: wake duration {} s will be raised to {} s by the module",
                secs,
                MIN_WAKE_DURATION
            );
        }
        self.words.write_register(reg::WAKEUP_TIME, &[secs])
    }

    /// Add a command word (see [`CommandWordManager::add_command_word`])
    pub fn add_command_word(&mut self, id: u8, text: &[u8]) -> Result<()> {
        self.words.add_command_word(id, text)
    }

    /// Delete a command word by id, unverified
    pub fn delete_command_word_by_id(&mut self, id: u8) {
        self.words.delete_command_word_by_id(id)
    }

    /// Delete a command word by text
    pub fn delete_command_word_by_text(&mut self, text: &[u8]) -> Result<()> {
        self.words.delete_command_word_by_text(text)
    }

    /// Raw recognition result; `0xFF` for no match or a failed read
    pub fn keyword_id(&mut self) -> u8 {
        self.words.keyword_id()
    }

    /// Decoded recognition result
    pub fn recognition(&mut self) -> Recognition {
        Recognition::from_id(self.keyword_id())
    }

    fn read_u16(&mut self, register: u8) -> Result<u16> {
        let data = self.words.read_register(register, 2)?;
        Ok(u16::from_be_bytes([data[0], data[1]]))
    }
}

fn check_wake_duration(secs: u8) -> Result<()> {
    if secs > MAX_WAKE_DURATION {
        return Err(Error::WakeDurationOutOfRange(secs));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedTransport;

    fn module(responses: &[&[u8]]) -> IsrModule<ScriptedTransport> {
        let mut transport = ScriptedTransport::new();
        transport.timing = transport.timing.with_init_settle(1000);
        for r in responses {
            transport.respond(r);
        }
        IsrModule::new(transport)
    }

    #[test]
    fn test_begin_writes_duration_and_model() {
        let mut m = module(&[&[0x42, 0xCB]]);
        let config = ModuleConfig::default().with_model(ModelType::English);
        m.begin(&config).unwrap();

        let t = m.transport();
        assert!(t.probed);
        assert_eq!(t.read_requests[0].register(), reg::PID);
        assert_eq!(t.writes.len(), 1);
        assert_eq!(t.writes[0].register(), reg::WAKEUP_TIME);
        assert_eq!(t.writes[0].payload(), &[10, 0x02]);
        assert_eq!(t.delays, [1000]);
    }

    #[test]
    fn test_begin_rejects_foreign_module() {
        let mut m = module(&[&[0x12, 0x34]]);
        assert_eq!(
            m.begin(&ModuleConfig::default()),
            Err(Error::IdentityMismatch {
                expected: 0x42CB,
                found: 0x1234
            })
        );
        assert!(m.transport().writes.is_empty());
    }

    #[test]
    fn test_begin_without_identity_check() {
        let mut m = module(&[]);
        let config = ModuleConfig::default().with_verify_identity(false);
        m.begin(&config).unwrap();
        assert!(m.transport().read_requests.is_empty());
    }

    #[test]
    fn test_identity() {
        let mut m = module(&[&[0x42, 0xCB], &[0x33, 0x43], &[0x01, 0x00]]);
        let id = m.identity().unwrap();
        assert_eq!(
            id,
            Identity {
                pid: 0x42CB,
                vid: 0x3343,
                version: 0x0100
            }
        );
    }

    #[test]
    fn test_setters() {
        let mut m = module(&[]);
        m.set_model_type(ModelType::Standby).unwrap();
        m.set_wakeup_time(0).unwrap();
        assert_eq!(
            m.set_wakeup_time(121),
            Err(Error::WakeDurationOutOfRange(121))
        );

        let t = m.transport();
        assert_eq!(t.writes.len(), 2);
        assert_eq!(t.writes[0].register(), reg::MODEL_TYPE);
        assert_eq!(t.writes[0].payload(), &[0x00]);
        assert_eq!(t.writes[1].register(), reg::WAKEUP_TIME);
        assert_eq!(t.writes[1].payload(), &[0]);
    }

    #[test]
    fn test_recognition_decoding() {
        assert_eq!(Recognition::from_id(0), Recognition::WakeWord);
        assert_eq!(Recognition::from_id(17), Recognition::Command(17));
        assert_eq!(Recognition::from_id(0xFF), Recognition::NoMatch);

        let mut m = module(&[&[3]]);
        assert_eq!(m.recognition(), Recognition::Command(3));
        // Script exhausted: the failed read decodes as no match
        assert_eq!(m.recognition(), Recognition::NoMatch);
    }
}
