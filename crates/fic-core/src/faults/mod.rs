//! The five fault models, and the planner that runs all of them over a
//! classified instruction stream.

pub mod branch_flip;
pub mod flp;
pub mod jump;
pub mod nop;
pub mod zero;

use log::info;

use crate::classify::Classified;
use crate::config::Arch;
use crate::types::FaultPlan;

/// Run every fault model over `classified` and return the full plan
/// population. Logs accepted-plan counts per model, matching the original
/// engine's per-phase summary.
pub fn plan_all_faults(classified: &Classified, binary: &[u8], arch: Arch) -> Vec<FaultPlan> {
    let mut plans = Vec::new();

    let before = plans.len();
    for site in &classified.jumps {
        plans.extend(jump::inject_jump_faults(site, binary));
    }
    info!("jump-retarget: {} plans", plans.len() - before);

    let before = plans.len();
    for site in &classified.jumps {
        if let Some(plan) = branch_flip::inject_flip_je_jne_fault(site, binary) {
            plans.push(plan);
        }
    }
    info!("branch-flip: {} plans", plans.len() - before);

    let before = plans.len();
    for site in &classified.value_sites {
        plans.push(zero::inject_zero_fault(site));
    }
    info!("zero-immediate: {} plans", plans.len() - before);

    let before = plans.len();
    for insn in &classified.all {
        plans.push(nop::inject_nop_fault(insn, arch));
    }
    info!("nop: {} plans", plans.len() - before);

    let before = plans.len();
    for insn in &classified.all {
        plans.extend(flp::inject_flp_faults(insn));
    }
    info!("bit-flip: {} plans", plans.len() - before);

    plans
}
