use super::*;
use std::cell::Cell;

fn output(bytes: &[u8]) -> ExportOutput {
    ExportOutput {
        bytes: bytes.to_vec(),
        frame_count: 2,
        duration_secs: 2.0,
        width: 4,
        height: 4,
    }
}

#[test]
fn fs_saver_writes_file_and_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out.mp4");

    output(b"video").save_to(&FsVideoSaver, &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"video");

    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn fs_saver_reports_failure_without_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    // A directory already occupies the destination, so the final rename fails.
    let path = dir.path().join("taken");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), b"x").unwrap();

    let err = output(b"video").save_to(&FsVideoSaver, &path).unwrap_err();
    assert!(matches!(err, ExportError::FileSaveFailed(_)));
    assert!(!err.is_fatal());
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["taken".to_owned()]);
}

struct FlakySaver {
    calls: Cell<u32>,
}

impl VideoSaver for FlakySaver {
    fn save(&self, _path: &Path, bytes: &[u8]) -> ExportResult<()> {
        self.calls.set(self.calls.get() + 1);
        if self.calls.get() == 1 {
            return Err(ExportError::file_save("disk full"));
        }
        assert_eq!(bytes, b"video");
        Ok(())
    }
}

#[test]
fn output_is_retained_for_retry_after_failed_save() {
    let out = output(b"video");
    let saver = FlakySaver {
        calls: Cell::new(0),
    };
    let path = Path::new("ignored.mp4");
    assert!(out.save_to(&saver, path).is_err());
    assert_eq!(out.bytes, b"video");
    out.save_to(&saver, path).unwrap();
    assert_eq!(saver.calls.get(), 2);
}

#[test]
fn fs_saver_rejects_path_without_file_name() {
    let err = FsVideoSaver.save(Path::new("/"), b"x").unwrap_err();
    assert!(matches!(err, ExportError::FileSaveFailed(_)));
}
