//! 4.5.2 — je/jne opcode bit-0 flip (x86 only).

use crate::types::{FaultCategory, FaultPlan, JumpSite};

/// Flip bit 0 of the opcode byte of a `je`/`jne` site, turning one into the
/// other (short `je` = 0x74, short `jne` = 0x75). Returns `None` for any
/// other mnemonic or if the opcode byte is out of range.
pub fn inject_flip_je_jne_fault(site: &JumpSite, binary: &[u8]) -> Option<FaultPlan> {
    if site.mnemonic != "je" && site.mnemonic != "jne" {
        return None;
    }
    let offset = site.from_file_offset as usize;
    let opcode = *binary.get(offset)?;
    let flipped = opcode ^ 0x01;
    Some(FaultPlan {
        label: format!("flip_{}_at_{:#x}", site.mnemonic, site.from_file_offset),
        category: FaultCategory::BranchFlip,
        file_offset: site.from_file_offset,
        patch_bytes: vec![flipped],
    })
}
