//! ELF loading and code-section selection.
//!
//! The loader is a pure view over `object::File`; it performs no selection
//! itself. Section selection is a small state machine (see
//! [`select_sections`]) that decides which sections feed the disassembler.

use object::{Object, ObjectSection};

use crate::error::FaultCampaignError;
use crate::types::Section;

/// Parse an ELF image and return every section with its virtual address,
/// file offset, and raw bytes.
pub fn load_sections(path: &std::path::Path, data: &[u8]) -> Result<Vec<Section>, FaultCampaignError> {
    let file = object::File::parse(data).map_err(|e| FaultCampaignError::InvalidElf {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut sections = Vec::new();
    for section in file.sections() {
        let name = section
            .name()
            .map_err(|e| FaultCampaignError::InvalidElf {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_string();
        let Some((file_offset, _size)) = section.file_range() else {
            continue;
        };
        let bytes = section
            .data()
            .map_err(|e| FaultCampaignError::InvalidElf {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_vec();
        sections.push(Section {
            name,
            va: section.address(),
            file_offset,
            data: bytes,
        });
    }
    Ok(sections)
}

/// Section-selection automaton state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectState {
    Skip,
    Parse,
}

/// Walk `sections` in order and return the subset that should be fed to the
/// disassembler: starting in `Skip`, `.init` flips the state to `Parse` (and
/// is itself included); `.rodata` flips back to `Skip` (and is excluded);
/// every other section is included iff the current state is `Parse`.
pub fn select_sections(sections: &[Section]) -> Vec<&Section> {
    let mut state = SelectState::Skip;
    let mut selected = Vec::new();
    for section in sections {
        match section.name.as_str() {
            ".init" => {
                state = SelectState::Parse;
                selected.push(section);
            }
            ".rodata" => {
                state = SelectState::Skip;
            }
            _ => {
                if state == SelectState::Parse {
                    selected.push(section);
                }
            }
        }
    }
    selected
}
