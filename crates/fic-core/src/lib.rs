pub mod classify;
pub mod config;
pub mod disasm;
pub mod elf;
pub mod error;
pub mod executor;
pub mod faults;
pub mod mapped_file;
pub mod materialise;
pub mod pattern;
pub mod types;

pub use config::{Arch, CampaignConfig};
pub use error::{FaultCampaignError, Result};
pub use mapped_file::MappedFile;
pub use types::{
    FaultCategory, FaultPlan, Instruction, JumpSite, MutatedBinary, RunResult, Section, ValueSite,
};

use std::path::Path;

/// Run the full planning pipeline (load -> select -> disassemble ->
/// classify -> plan faults) for one input binary, returning the full
/// `FaultPlan` population alongside the raw bytes of the source binary.
pub fn plan_campaign(
    path: &Path,
    arch: Arch,
) -> anyhow::Result<(Vec<u8>, Vec<FaultPlan>)> {
    let mapped = MappedFile::open(path)?;
    let bytes = mapped.bytes().to_vec();
    let sections = elf::load_sections(path, &bytes)?;
    let selected = elf::select_sections(&sections);

    let mut instructions = Vec::new();
    for section in &selected {
        instructions.extend(disasm::disassemble_section(section, arch)?);
    }

    let classified = classify::classify(instructions, arch);
    let plans = faults::plan_all_faults(&classified, &bytes, arch);
    Ok((bytes, plans))
}
