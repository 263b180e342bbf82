//! End-to-end scenarios from the campaign's documented test matrix,
//! exercising classification, fault planning, and materialisation together
//! without going through actual ELF parsing (the unit tests in `elf.rs`
//! already cover section selection against `object`).

use std::fs;
use std::io::Write as _;

use fic_core::classify::classify;
use fic_core::config::Arch;
use fic_core::disasm::disassemble_section;
use fic_core::faults::plan_all_faults;
use fic_core::materialise::materialise;
use fic_core::types::Section;
use tempfile::TempDir;

fn write_source(dir: &TempDir, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join("source.bin");
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(bytes).unwrap();
    path
}

#[test]
fn single_jmp_yields_sixteen_mutated_binaries() {
    // jmp 0x1000 (E9 + rel32) at file offset 0x0.
    let code = [0xE9u8, 0xFB, 0x0F, 0x00, 0x00];
    let mut binary = vec![0u8; 16];
    binary[0..5].copy_from_slice(&code);

    let section = Section {
        name: ".init".into(),
        va: 0,
        file_offset: 0,
        data: code.to_vec(),
    };
    let instructions = disassemble_section(&section, Arch::X86).unwrap();
    let classified = classify(instructions, Arch::X86);
    assert_eq!(classified.jumps.len(), 1);

    let plans = plan_all_faults(&classified, &binary, Arch::X86);
    let jump_plans: Vec<_> = plans
        .iter()
        .filter(|p| p.category == fic_core::FaultCategory::JumpRetarget)
        .collect();
    assert_eq!(jump_plans.len(), 16);

    let dir = TempDir::new().unwrap();
    let source_path = write_source(&dir, &binary);
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    for plan in &jump_plans {
        let mutated = materialise(&source_path, &out_dir, plan).unwrap();
        let data = fs::read(&mutated.path).unwrap();
        assert_eq!(data.len(), binary.len());
    }
}

#[test]
fn value_zero_phase_targets_tail_of_instruction() {
    // mov dword ptr [ebp - 4], 0x11223344
    let code = [0xC7u8, 0x45, 0xFC, 0x44, 0x33, 0x22, 0x11];
    let mut binary = vec![0u8; 16];
    binary[0..7].copy_from_slice(&code);

    let section = Section {
        name: ".init".into(),
        va: 0,
        file_offset: 0,
        data: code.to_vec(),
    };
    let instructions = disassemble_section(&section, Arch::X86).unwrap();
    let classified = classify(instructions, Arch::X86);
    assert_eq!(classified.value_sites.len(), 1);
    assert_eq!(classified.value_sites[0].imm_file_offset, 3);

    let plans = plan_all_faults(&classified, &binary, Arch::X86);
    let zero_plan = plans
        .iter()
        .find(|p| p.category == fic_core::FaultCategory::ZeroImmediate)
        .unwrap();
    assert_eq!(zero_plan.file_offset, 3);
    assert_eq!(zero_plan.patch_bytes, vec![0u8; 4]);
}
