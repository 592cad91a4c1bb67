//! Applying patches to a ROM.
//!
//! Application is a plain replay: every record's payload is written at its
//! offset, in file order, one patch after another. There is no rollback. A
//! patch that fails halfway leaves its earlier writes in place, and the next
//! patch is still attempted.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::ips::IpsPatch;
use crate::rom::{RomAccess, RomFile};

/// Suffix appended to the output path when a backup is made
pub const BACKUP_SUFFIX: &str = ".backup";

/// Write every record of `patch` into `rom`, in record order.
///
/// Returns the number of records written.
pub fn apply_patch<R: RomAccess + ?Sized>(patch: &IpsPatch, rom: &mut R) -> Result<usize> {
    for record in patch {
        rom.write_bytes(record.offset() as u64, record.payload())?;
    }
    Ok(patch.len())
}

/// Copy `input` to `output`, backing up `output` first when both name the
/// same file.
///
/// Returns the backup path if one was written.
pub fn prepare_output(input: &Path, output: &Path) -> Result<Option<PathBuf>> {
    if !input.exists() {
        return Err(Error::NotFound(input.to_path_buf()));
    }

    if is_same_file(input, output)? {
        let backup = backup_path(output);
        info!("Creating backup: {}", backup.display());
        fs::copy(output, &backup)?;
        return Ok(Some(backup));
    }

    info!("Copying {} to {}", input.display(), output.display());
    fs::copy(input, output)?;
    Ok(None)
}

/// Whether two paths resolve to one file, through `..`, symlinks or
/// relative spellings. A missing `output` is never the same file.
fn is_same_file(input: &Path, output: &Path) -> Result<bool> {
    if input == output {
        return Ok(true);
    }
    if !output.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(input)? == fs::canonicalize(output)?)
}

/// `<path>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Result of applying one patch
#[derive(Debug)]
pub struct PatchOutcome {
    pub name: String,
    pub result: Result<usize>,
}

impl PatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-patch results of a batch, in application order
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub outcomes: Vec<PatchOutcome>,
}

impl ApplyReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PatchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Applies a batch of patches to one ROM store.
pub struct Patcher<R: RomAccess> {
    rom: R,
}

impl Patcher<RomFile> {
    /// Open the ROM at `path` for patching
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(RomFile::open(path)?))
    }
}

impl<R: RomAccess> Patcher<R> {
    pub fn new(rom: R) -> Self {
        Self { rom }
    }

    pub fn rom(&self) -> &R {
        &self.rom
    }

    /// Give back the underlying store (closing it, for a file)
    pub fn into_inner(self) -> R {
        self.rom
    }

    /// Load and apply the patch at `path`
    pub fn apply_file(&mut self, path: &Path) -> Result<usize> {
        let patch = IpsPatch::open(path)?;
        let written = apply_patch(&patch, &mut self.rom)?;
        debug!("Wrote {} records from {}", written, path.display());
        Ok(written)
    }

    /// Apply each `(name, path)` in order.
    ///
    /// A failing patch is logged and recorded; the batch carries on with the
    /// next one.
    pub fn apply_all(&mut self, selection: &[(String, PathBuf)]) -> ApplyReport {
        let mut report = ApplyReport::default();
        for (name, path) in selection {
            info!("Applying patch: {}", name);
            let result = self.apply_file(path);
            match &result {
                Ok(records) => info!("Applied {} ({} records)", name, records),
                Err(e) => warn!("Failed to apply {}: {}", name, e),
            }
            report.outcomes.push(PatchOutcome {
                name: name.clone(),
                result,
            });
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ips::PatchRecord;
    use crate::rom::RomBuffer;

    fn patch(records: &[(u32, &[u8])]) -> IpsPatch {
        IpsPatch::from_records(
            records
                .iter()
                .map(|&(offset, data)| PatchRecord::new(offset, data.to_vec()).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_apply_patch_writes_records() {
        let mut rom = RomBuffer::zeroed(0x20);
        let written = apply_patch(&patch(&[(0x10, b"AB"), (0x02, &[0x07])]), &mut rom).unwrap();

        assert_eq!(written, 2);
        assert_eq!(rom.as_bytes()[0x02], 0x07);
        assert_eq!(&rom.as_bytes()[0x10..0x12], b"AB");
    }

    #[test]
    fn test_apply_patch_later_record_wins() {
        let mut rom = RomBuffer::zeroed(4);
        apply_patch(&patch(&[(0, &[1, 1, 1]), (1, &[2])]), &mut rom).unwrap();
        assert_eq!(rom.as_bytes(), &[1, 2, 1, 0]);
    }

    #[test]
    fn test_apply_patch_extends_store() {
        let mut rom = RomBuffer::zeroed(2);
        apply_patch(&patch(&[(4, &[9, 9])]), &mut rom).unwrap();
        assert_eq!(rom.len(), 6);
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(backup_path(Path::new("sod.mod.gb")), PathBuf::from("sod.mod.gb.backup"));
    }

    #[test]
    fn test_prepare_output_copies() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sod.gb");
        let output = dir.path().join("sod.mod.gb");
        fs::write(&input, [1u8, 2, 3]).unwrap();

        let backup = prepare_output(&input, &output).unwrap();
        assert!(backup.is_none());
        assert_eq!(fs::read(&output).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_prepare_output_same_path_makes_backup() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("sod.gb");
        fs::write(&rom, [4u8, 5]).unwrap();

        let backup = prepare_output(&rom, &rom).unwrap().unwrap();
        assert_eq!(backup, dir.path().join("sod.gb.backup"));
        assert_eq!(fs::read(&backup).unwrap(), vec![4, 5]);
        assert_eq!(fs::read(&rom).unwrap(), vec![4, 5]);
    }

    #[test]
    fn test_prepare_output_dotdot_path_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let rom = dir.path().join("sod.gb");
        fs::write(&rom, [0xAA; 64]).unwrap();

        let output = dir.path().join("sub").join("..").join("sod.gb");
        let backup = prepare_output(&rom, &output).unwrap();

        assert!(backup.is_some());
        assert_eq!(fs::read(&rom).unwrap(), vec![0xAA; 64]);
    }

    #[cfg(unix)]
    #[test]
    fn test_prepare_output_symlink_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("sod.gb");
        fs::write(&rom, [0xAA; 64]).unwrap();
        let link = dir.path().join("link.gb");
        std::os::unix::fs::symlink(&rom, &link).unwrap();

        let backup = prepare_output(&rom, &link).unwrap().unwrap();

        assert_eq!(backup, dir.path().join("link.gb.backup"));
        assert_eq!(fs::read(&backup).unwrap(), vec![0xAA; 64]);
        assert_eq!(fs::read(&rom).unwrap(), vec![0xAA; 64]);
    }

    #[test]
    fn test_prepare_output_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare_output(&dir.path().join("none.gb"), &dir.path().join("out.gb"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_apply_all_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.ips");
        fs::write(&good, patch(&[(1, &[0xAA])]).to_bytes()).unwrap();
        let bad = dir.path().join("bad.ips");
        fs::write(&bad, b"NOPE").unwrap();
        let later = dir.path().join("later.ips");
        fs::write(&later, patch(&[(3, &[0xBB])]).to_bytes()).unwrap();

        let mut patcher = Patcher::new(RomBuffer::zeroed(4));
        let report = patcher.apply_all(&[
            ("good".to_string(), good),
            ("bad".to_string(), bad),
            ("later".to_string(), later),
        ]);

        assert_eq!(report.total(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures().next().unwrap().name, "bad");
        assert_eq!(patcher.into_inner().into_bytes(), vec![0, 0xAA, 0, 0xBB]);
    }
}
