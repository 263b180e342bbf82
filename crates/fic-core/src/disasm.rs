//! Architecture-specific disassembly built on `capstone`.

use capstone::arch::x86::X86OperandType;
use capstone::arch::{self, ArchDetail};
use capstone::prelude::*;

use crate::config::Arch;
use crate::types::{Instruction, Section};

fn build_capstone(arch: Arch) -> capstone::Result<Capstone> {
    match arch {
        Arch::X86 => Capstone::new()
            .x86()
            .mode(arch::x86::ArchMode::Mode32)
            .syntax(arch::x86::ArchSyntax::Intel)
            .detail(true)
            .build(),
        Arch::Arm => Capstone::new()
            .arm()
            .mode(arch::arm::ArchMode::Arm)
            .detail(false)
            .build(),
    }
}

/// Disassemble every instruction in `section`, starting at its virtual
/// address, and resolve each instruction's file offset against the section.
pub fn disassemble_section(section: &Section, arch: Arch) -> anyhow::Result<Vec<Instruction>> {
    let cs = build_capstone(arch).map_err(|e| anyhow::anyhow!("capstone init failed: {e}"))?;
    let insns = cs
        .disasm_all(&section.data, section.va)
        .map_err(|e| anyhow::anyhow!("disassembly failed: {e}"))?;

    let mut out = Vec::with_capacity(insns.len());
    for insn in insns.iter() {
        let mnemonic = insn.mnemonic().unwrap_or("").to_string();
        let operand_text = insn.op_str().unwrap_or("").to_string();
        let last_operand_is_register = match arch {
            Arch::X86 => last_operand_is_register_x86(&cs, insn),
            Arch::Arm => false,
        };
        out.push(Instruction {
            va: insn.address(),
            file_offset: section.file_offset_of(insn.address()),
            size: insn.bytes().len() as u8,
            mnemonic,
            operand_text,
            last_operand_is_register,
            raw_bytes: insn.bytes().to_vec(),
        });
    }
    Ok(out)
}

fn last_operand_is_register_x86(cs: &Capstone, insn: &capstone::Insn) -> bool {
    let Ok(detail) = cs.insn_detail(insn) else {
        return false;
    };
    let ArchDetail::X86Detail(x86) = detail.arch_detail() else {
        return false;
    };
    matches!(
        x86.operands().last(),
        Some(op) if matches!(op.op_type, X86OperandType::Reg(_))
    )
}
