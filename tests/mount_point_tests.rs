// MountPoint lifecycle tests: real directories via tempfile, recorded mount commands

mod common;

use common::{MissingBinaries, RecordingExecutor};
use mountkeeper::Error;
use mountkeeper::command::SystemExecutor;
use mountkeeper::mount_point::{DEFAULT_DIR_MODE, MountPoint, build_path};
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

#[test]
fn create_then_exists() {
    let dir = tempfile::TempDir::new().unwrap();
    let mp = MountPoint::new(dir.path().join("a/b/data"));
    assert!(!mp.exists().unwrap());

    mp.create(DEFAULT_DIR_MODE).unwrap();
    assert!(mp.exists().unwrap());
    let mode = std::fs::metadata(mp.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700);
}

#[test]
fn create_on_existing_directory_runs_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let exec = Arc::new(RecordingExecutor::new());
    let mp = MountPoint::with_executor(dir.path(), exec.clone());

    mp.create("0755").unwrap();
    assert!(exec.command_lines().is_empty());
}

#[test]
fn create_issues_mkdir_with_mode() {
    let dir = tempfile::TempDir::new().unwrap();
    let target = dir.path().join("new");
    let exec = Arc::new(RecordingExecutor::new());
    let mp = MountPoint::with_executor(&target, exec.clone());

    mp.create("0750").unwrap();
    assert_eq!(
        exec.command_lines(),
        vec![format!("mkdir --parents --mode=0750 {}", target.display())]
    );
}

#[test]
fn create_with_invalid_mode_is_execution_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let mp = MountPoint::with_executor(dir.path().join("x"), Arc::new(SystemExecutor));
    let err = mp.create("bogus").unwrap_err();
    assert!(err.is_execution(), "unexpected error: {err}");
    assert!(!mp.exists().unwrap());
}

#[test]
fn exists_on_regular_file_is_shape_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("file");
    std::fs::write(&file, b"x").unwrap();
    let mp = MountPoint::new(&file);

    let err = mp.exists().unwrap_err();
    assert!(matches!(err, Error::NotADirectory(ref p) if p == &file));
    assert!(!err.is_execution());
    assert!(mp.create(DEFAULT_DIR_MODE).is_err());
}

#[test]
fn unlink_removes_tree() {
    let dir = tempfile::TempDir::new().unwrap();
    let target = dir.path().join("mnt");
    std::fs::create_dir_all(target.join("nested")).unwrap();
    std::fs::write(target.join("nested/file"), b"data").unwrap();

    let mp = MountPoint::new(&target);
    mp.unlink(true).unwrap();
    assert!(!mp.exists().unwrap());
}

#[test]
fn unlink_missing_path_is_noop() {
    let dir = tempfile::TempDir::new().unwrap();
    let exec = Arc::new(RecordingExecutor::new());
    let mp = MountPoint::with_executor(dir.path().join("gone"), exec.clone());

    mp.unlink(true).unwrap();
    mp.unlink(false).unwrap();
    assert!(exec.command_lines().is_empty());
}

#[test]
fn unlink_force_flag_maps_to_rm() {
    let dir = tempfile::TempDir::new().unwrap();
    let exec = Arc::new(RecordingExecutor::new());
    let mp = MountPoint::with_executor(dir.path(), exec.clone());

    mp.unlink(true).unwrap();
    mp.unlink(false).unwrap();
    let p = dir.path().display();
    assert_eq!(
        exec.command_lines(),
        vec![
            format!("rm --recursive --force {}", p),
            format!("rm --recursive {}", p),
        ]
    );
}

#[test]
fn is_mount_point_follows_exit_status() {
    let exec = Arc::new(
        RecordingExecutor::new()
            .respond(0, &[])
            .respond(1, &[])
            .respond(32, &[]),
    );
    let mp = MountPoint::with_executor("/srv/data", exec.clone());

    assert!(mp.is_mount_point().unwrap());
    assert!(!mp.is_mount_point().unwrap());
    assert!(!mp.is_mounted().unwrap());
    assert_eq!(exec.last().command_line(), "mountpoint -q /srv/data");
    assert!(exec.last().ignores_failure());
}

#[test]
fn is_mount_point_on_real_paths() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(MountPoint::new("/").is_mount_point().unwrap());
    assert!(!MountPoint::new(dir.path().join("missing")).is_mounted().unwrap());
}

#[test]
fn is_mount_point_spawn_failure_is_error() {
    let mp = MountPoint::with_executor("/srv/data", Arc::new(MissingBinaries));
    assert!(matches!(mp.is_mount_point(), Err(Error::Spawn { .. })));
}

#[test]
fn mount_joins_options() {
    let exec = Arc::new(RecordingExecutor::new());
    let mp = MountPoint::with_executor("/srv/data", exec.clone());

    mp.mount("defaults,nofail").unwrap();
    assert_eq!(
        exec.last().command_line(),
        "mount -v -o defaults,nofail --target /srv/data"
    );
    assert!(exec.last().merges_stderr());

    mp.mount(vec!["ro".to_string(), "noexec".to_string()]).unwrap();
    assert_eq!(
        exec.last().command_line(),
        "mount -v -o ro,noexec --target /srv/data"
    );

    mp.mount("").unwrap();
    assert_eq!(exec.last().command_line(), "mount -v --target /srv/data");
}

#[test]
fn mount_failure_carries_command_and_output() {
    let exec = Arc::new(RecordingExecutor::new().respond(
        32,
        &["mount: /srv/data: can't find in /etc/fstab."],
    ));
    let mp = MountPoint::with_executor("/srv/data", exec);

    match mp.mount("").unwrap_err() {
        Error::Exec {
            command,
            args,
            status,
            output,
        } => {
            assert_eq!(command, "mount");
            assert_eq!(args, vec!["-v", "--target", "/srv/data"]);
            assert_eq!(status, 32);
            assert!(output.contains("can't find"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn umount_flags_combine() {
    let exec = Arc::new(RecordingExecutor::new());
    let mp = MountPoint::with_executor("/srv/data", exec.clone());

    mp.umount(false, false).unwrap();
    mp.umount(true, false).unwrap();
    mp.umount(false, true).unwrap();
    mp.umount(true, true).unwrap();
    assert_eq!(
        exec.command_lines(),
        vec![
            "umount -v /srv/data",
            "umount -v -f /srv/data",
            "umount -v -l /srv/data",
            "umount -v -f -l /srv/data",
        ]
    );
}

#[test]
fn umount_busy_is_error() {
    let exec = Arc::new(RecordingExecutor::new().respond(32, &["umount: /srv/data: target is busy."]));
    let mp = MountPoint::with_executor("/srv/data", exec);
    assert!(matches!(
        mp.umount(false, false),
        Err(Error::Exec { status: 32, .. })
    ));
}

#[test]
fn set_path_retargets_operations() {
    let exec = Arc::new(RecordingExecutor::new());
    let mut mp = MountPoint::with_executor("/srv/a", exec.clone());
    mp.set_path(build_path("/srv", "/dev/sdb1"));
    assert_eq!(mp.path(), std::path::Path::new("/srv/dev-sdb1"));

    mp.umount(false, true).unwrap();
    assert_eq!(exec.last().command_line(), "umount -v -l /srv/dev-sdb1");
}

#[test]
fn build_path_examples() {
    assert_eq!(
        build_path("/srv", "/dev/disk/by-id/wwn-0x5000cca211cc703c-part1"),
        std::path::PathBuf::from("/srv/dev-disk-by-id-wwn-0x5000cca211cc703c-part1")
    );
    assert_eq!(
        build_path("/srv", "78b669c1-9183-4ca3-a32c-80a4e2c61e2d"),
        std::path::PathBuf::from("/srv/78b669c1-9183-4ca3-a32c-80a4e2c61e2d")
    );
    assert_eq!(
        build_path("/media", "/dev/mapper/vg0-data:1"),
        std::path::PathBuf::from("/media/dev-mapper-vg0-data-1")
    );
}
