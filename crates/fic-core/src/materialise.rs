//! Turns `FaultPlan`s into on-disk mutated binaries.

use std::fs;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::FaultCampaignError;
use crate::types::{FaultPlan, MutatedBinary};

/// Write the full plan population to `output_dir/manifest.json`, one entry
/// per plan (label, category, patch offset/bytes), for `--plan-only` runs
/// and for post-mortem traceability of a materialised population.
pub fn write_manifest(output_dir: &Path, plans: &[FaultPlan]) -> Result<(), FaultCampaignError> {
    let json = serde_json::to_string_pretty(plans).map_err(|e| {
        FaultCampaignError::MaterialiseIoError {
            path: output_dir.join("manifest.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        }
    })?;
    fs::write(output_dir.join("manifest.json"), json).map_err(|e| {
        FaultCampaignError::MaterialiseIoError {
            path: output_dir.join("manifest.json"),
            source: e,
        }
    })
}

/// Copy `source` to `output_dir/<plan.label>` and apply `plan`'s patch at
/// its file offset. The source file's length is never changed.
pub fn materialise(
    source: &Path,
    output_dir: &Path,
    plan: &FaultPlan,
) -> Result<MutatedBinary, FaultCampaignError> {
    let out_path = output_dir.join(&plan.label);
    fs::copy(source, &out_path).map_err(|e| FaultCampaignError::MaterialiseIoError {
        path: out_path.clone(),
        source: e,
    })?;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .open(&out_path)
        .map_err(|e| FaultCampaignError::MaterialiseIoError {
            path: out_path.clone(),
            source: e,
        })?;
    file.seek(SeekFrom::Start(plan.file_offset))
        .map_err(|e| FaultCampaignError::MaterialiseIoError {
            path: out_path.clone(),
            source: e,
        })?;
    file.write_all(&plan.patch_bytes)
        .map_err(|e| FaultCampaignError::MaterialiseIoError {
            path: out_path.clone(),
            source: e,
        })?;

    Ok(MutatedBinary {
        path: out_path,
        label: plan.label.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FaultCategory;
    use std::io::Write as _;
    use tempfile::TempDir;

    #[test]
    fn patch_applied_without_changing_length() {
        let dir = TempDir::new().unwrap();
        let source_path = dir.path().join("source.bin");
        {
            let mut f = fs::File::create(&source_path).unwrap();
            f.write_all(&[0u8; 16]).unwrap();
        }
        let out_dir = dir.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let plan = FaultPlan {
            label: "flp_at_0x4_sgnf_0".into(),
            category: FaultCategory::BitFlip,
            file_offset: 4,
            patch_bytes: vec![0x01],
        };
        let mutated = materialise(&source_path, &out_dir, &plan).unwrap();
        let data = fs::read(&mutated.path).unwrap();
        assert_eq!(data.len(), 16);
        assert_eq!(data[4], 0x01);
        assert_eq!(data[3], 0x00);
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let plan = FaultPlan {
            label: "x".into(),
            category: FaultCategory::Nop,
            file_offset: 0,
            patch_bytes: vec![0x90],
        };
        let result = materialise(
            &dir.path().join("does-not-exist"),
            dir.path(),
            &plan,
        );
        assert!(result.is_err());
    }

    #[test]
    fn apply_then_revert_restores_source_bytes() {
        let dir = TempDir::new().unwrap();
        let source_path = dir.path().join("source.bin");
        let original = vec![0xAAu8; 32];
        fs::write(&source_path, &original).unwrap();
        let out_dir = dir.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let plan = FaultPlan {
            label: "flp_at_0x8_sgnf_3".into(),
            category: FaultCategory::BitFlip,
            file_offset: 8,
            patch_bytes: vec![0xAA ^ 0x08],
        };
        let mutated = materialise(&source_path, &out_dir, &plan).unwrap();
        let patched = fs::read(&mutated.path).unwrap();
        assert_ne!(patched, original);

        let revert = FaultPlan {
            patch_bytes: original[plan.file_offset as usize
                ..plan.file_offset as usize + plan.patch_bytes.len()]
                .to_vec(),
            ..plan.clone()
        };
        let reverted_path = out_dir.join("reverted");
        fs::copy(&mutated.path, &reverted_path).unwrap();
        let mut f = fs::OpenOptions::new()
            .write(true)
            .open(&reverted_path)
            .unwrap();
        f.seek(SeekFrom::Start(revert.file_offset)).unwrap();
        f.write_all(&revert.patch_bytes).unwrap();
        drop(f);

        assert_eq!(fs::read(&reverted_path).unwrap(), original);
    }

    #[test]
    fn manifest_contains_one_entry_per_plan() {
        let dir = TempDir::new().unwrap();
        let plans = vec![
            FaultPlan {
                label: "nop_0x10-0x12".into(),
                category: FaultCategory::Nop,
                file_offset: 0x10,
                patch_bytes: vec![0x90, 0x90, 0x90],
            },
            FaultPlan {
                label: "flip_je_at_0x200".into(),
                category: FaultCategory::BranchFlip,
                file_offset: 0x200,
                patch_bytes: vec![0x75],
            },
        ];
        write_manifest(dir.path(), &plans).unwrap();
        let contents = fs::read_to_string(dir.path().join("manifest.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["label"], "nop_0x10-0x12");
        assert_eq!(parsed[1]["category"], "branch_flip");
    }
}
