//! Turns a decoded instruction stream into the three classifications the
//! fault models consume: every instruction, jump/branch sites, and
//! cmp/mov sites carrying a literal immediate of known width.

use crate::config::Arch;
use crate::types::{Instruction, JumpSite, ValueSite};

const X86_JUMP_MNEMONICS: &[&str] = &[
    "jne", "je", "jbe", "jae", "jb", "jo", "jmp", "ja", "jle", "js", "jc", "jcxz", "jecxz",
    "jrcxz", "jg", "jge", "jl", "jna", "jnae", "jnbe", "jnc", "jng", "jnge", "jnl", "jnle", "jno",
    "jnp", "jns", "jnz", "jp", "jpe", "jpo", "jz",
];

const ARM_BRANCH_MNEMONICS: &[&str] = &[
    "b", "beq", "bne", "bcs", "bhs", "bcc", "blo", "bmi", "bpl", "bvs", "bvc", "bhi", "bls",
    "bge", "blt", "bgt", "ble", "bl", "bleq", "bllt", "blx", "bx", "bxeq", "bxne", "bxcs", "bxcc",
    "bxhi", "bxls", "bxgt", "bxle",
];

/// The three outputs of classification, grouped for convenience.
#[derive(Debug, Default)]
pub struct Classified {
    pub all: Vec<Instruction>,
    pub jumps: Vec<JumpSite>,
    pub value_sites: Vec<ValueSite>,
}

/// Classify an already-ordered instruction stream (selected sections,
/// concatenated in selection order).
pub fn classify(instructions: Vec<Instruction>, arch: Arch) -> Classified {
    let mut jumps = Vec::new();
    let mut value_sites = Vec::new();

    for insn in &instructions {
        match arch {
            Arch::X86 => {
                if X86_JUMP_MNEMONICS.contains(&insn.mnemonic.as_str())
                    && insn.operand_text.len() == 6
                {
                    if let Some(site) = jump_site_from(insn) {
                        jumps.push(site);
                    }
                }
                if let Some(site) = value_site_x86(insn) {
                    value_sites.push(site);
                }
            }
            Arch::Arm => {
                if ARM_BRANCH_MNEMONICS.contains(&insn.mnemonic.as_str())
                    && insn.operand_text.contains('#')
                {
                    if let Some(site) = jump_site_from(insn) {
                        jumps.push(site);
                    }
                }
                if let Some(site) = value_site_arm(insn) {
                    value_sites.push(site);
                }
            }
        }
    }

    Classified {
        all: instructions,
        jumps,
        value_sites,
    }
}

fn parse_hex_operand(text: &str) -> Option<u64> {
    let hex = text.rsplit("0x").next()?;
    u64::from_str_radix(hex, 16).ok()
}

fn jump_site_from(insn: &Instruction) -> Option<JumpSite> {
    let to_va = parse_hex_operand(&insn.operand_text)?;
    Some(JumpSite {
        mnemonic: insn.mnemonic.clone(),
        from_va: insn.va,
        from_file_offset: insn.file_offset,
        to_va,
        target_file_offset: insn.file_offset + insn.size as u64 - 2,
    })
}

fn value_site_x86(insn: &Instruction) -> Option<ValueSite> {
    if insn.mnemonic != "cmp" && insn.mnemonic != "mov" {
        return None;
    }
    if insn.last_operand_is_register {
        return None;
    }
    // The last whitespace-separated token is the instruction's final operand.
    // If it's a memory reference (e.g. `dword ptr [ebx + 0x10]`), the trailing
    // token still carries a literal hex value but reaching into it would
    // corrupt the memory operand's displacement/ModRM tail, not a standalone
    // immediate.
    let last_token = insn.operand_text.split_whitespace().last()?;
    if last_token.contains(']') {
        return None;
    }
    let hex = insn.operand_text.rsplit("0x").next()?;
    if hex == insn.operand_text {
        return None;
    }
    let hex_len = hex.len() + 2; // include "0x" prefix in the length count
    let width = if hex_len <= 4 {
        if insn.operand_text.contains("byte") {
            1
        } else if insn.operand_text.contains("word") {
            2
        } else if insn.operand_text.contains("dword") {
            4
        } else {
            return None;
        }
    } else if hex_len <= 6 {
        if insn.operand_text.contains("dword") {
            4
        } else {
            2
        }
    } else if hex_len <= 10 {
        4
    } else {
        return None;
    };

    if width as u64 > insn.size as u64 {
        return None;
    }
    Some(ValueSite {
        mnemonic: insn.mnemonic.clone(),
        instruction_file_offset: insn.file_offset,
        instruction_size: insn.size,
        width,
        imm_file_offset: insn.file_offset + insn.size as u64 - width as u64,
    })
}

fn value_site_arm(insn: &Instruction) -> Option<ValueSite> {
    if insn.mnemonic != "cmp" && insn.mnemonic != "mov" {
        return None;
    }
    let hex = insn.operand_text.rsplit('#').next()?;
    let hex = hex.trim_start_matches("0x");
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let hex_len = hex.len() + 2;
    let width = if hex_len <= 4 {
        1
    } else if hex_len <= 6 {
        2
    } else if hex_len <= 10 {
        4
    } else {
        return None;
    };
    if width as u64 > insn.size as u64 {
        return None;
    }
    Some(ValueSite {
        mnemonic: insn.mnemonic.clone(),
        instruction_file_offset: insn.file_offset,
        instruction_size: insn.size,
        width,
        imm_file_offset: insn.file_offset + insn.size as u64 - width as u64,
    })
}
