//! Command word table commands

use std::path::Path;

use crate::words::WordList;
use isrmod_core::device::IsrModule;
use isrmod_core::transport::RegisterTransport;

/// How a word to delete is selected
#[derive(Debug, Clone)]
pub enum DeleteTarget {
    /// By id; the module does not confirm this
    Id(u8),
    /// By exact text
    Text(String),
}

/// Add one command word
pub fn run_add<T: RegisterTransport>(
    module: &mut IsrModule<T>,
    id: u8,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    module
        .add_command_word(id, text.as_bytes())
        .map_err(|e| format!("Failed to add command word {}: {}", id, e))?;
    println!("Added command word {}: {:?}", id, text);
    Ok(())
}

/// Delete one command word
pub fn run_delete<T: RegisterTransport>(
    module: &mut IsrModule<T>,
    target: &DeleteTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    match target {
        DeleteTarget::Id(id) => {
            module.delete_command_word_by_id(*id);
            println!("Delete of command word {} sent (not confirmed by the module)", id);
        }
        DeleteTarget::Text(text) => {
            module.delete_command_word_by_text(text.as_bytes())?;
            println!("Delete of command word {:?} sent", text);
        }
    }
    Ok(())
}

/// Add every word of a word list file
pub fn run_provision<T: RegisterTransport>(
    module: &mut IsrModule<T>,
    path: &Path,
    keep_going: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let list = WordList::from_file(path)?;
    if list.is_empty() {
        log::warn!("{} lists no command words", path.display());
        return Ok(());
    }
    log::info!("Loaded {} command words from {}", list.len(), path.display());

    let mut failed = 0usize;
    for entry in &list.words {
        match module.add_command_word(entry.id, entry.text.as_bytes()) {
            Ok(()) => println!("  {:3} {:?}", entry.id, entry.text),
            Err(e) if keep_going => {
                eprintln!("  {:3} {:?} FAILED: {}", entry.id, entry.text, e);
                failed += 1;
            }
            Err(e) => {
                return Err(format!("Failed to add command word {}: {}", entry.id, e).into());
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} command words were rejected", failed, list.len()).into());
    }
    println!("Provisioned {} command words", list.len());
    Ok(())
}
