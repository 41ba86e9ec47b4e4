use crate::iloc::{Operation, SourceReg, VirtualReg};
use ahash::AHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenameSummary {
    /// Total virtual registers handed out; every vr in the block is below this.
    pub vr_count: VirtualReg,
    pub max_live: usize,
}

/// Renames a block bottom-up so that every live range gets its own virtual register, and fills in
/// the next-use distance of each operand.
pub fn rename(block: &mut [Operation]) -> RenameSummary {
    let mut sr_to_vr: AHashMap<SourceReg, VirtualReg> = AHashMap::new();
    let mut last_use: AHashMap<SourceReg, usize> = AHashMap::new();
    let mut next_vr: VirtualReg = 0;
    let mut live = 0usize;
    let mut max_live = 0usize;

    for (index, op) in block.iter_mut().enumerate().rev() {
        let opcode = op.opcode;

        for slot in opcode.def_slots() {
            let operand = &mut op.operands[*slot];
            let Some(sr) = operand.sr else {
                continue;
            };
            // A definition nothing below reads still gets a name.
            let vr = *sr_to_vr.entry(sr).or_insert_with(|| {
                live += 1;
                next_vr += 1;
                next_vr - 1
            });
            operand.vr = Some(vr);
            operand.next_use = last_use.remove(&sr);
            sr_to_vr.remove(&sr);
            live -= 1;
        }

        for slot in opcode.use_slots() {
            let operand = &mut op.operands[*slot];
            let Some(sr) = operand.sr else {
                continue;
            };
            let vr = *sr_to_vr.entry(sr).or_insert_with(|| {
                live += 1;
                next_vr += 1;
                next_vr - 1
            });
            operand.vr = Some(vr);
            operand.next_use = last_use.insert(sr, index);
        }

        max_live = max_live.max(live);
    }

    log::debug!(
        "renamed {} operations into {} virtual registers (max live: {})",
        block.len(),
        next_vr,
        max_live
    );

    RenameSummary {
        vr_count: next_vr,
        max_live,
    }
}
