//! Shared fixture: fake bridge and mirroring tools as shell scripts
//!
//! The scripts are written once per test binary, before any test spawns a
//! process, so no child ever inherits an open write handle to them.

#![allow(dead_code)]

use droidlink_core::application::{SessionOrchestrator, ToolPaths};
use droidlink_core::port::time_provider::mocks::FixedTimeProvider;
use droidlink_infra_system::SubprocessExecutor;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

pub const NOW_MS: i64 = 1_700_000_000_000;

pub const USB_OK: &str = "emulator-5554";
pub const USB_BROKEN: &str = "R58M123";
pub const NETWORK_OFFLINE: &str = "192.168.1.50:5555";

const FAKE_ADB: &str = r#"#!/bin/sh
case "$*" in
  "devices -l")
    printf 'List of devices attached\n'
    printf 'emulator-5554          device product:sdk_gphone64 model:Pixel_7 transport_id:1\n'
    printf 'R58M123                device usb:1-1 product:beyond1 transport_id:2\n'
    printf '192.168.1.50:5555      offline\n'
    printf '\n'
    ;;
  "-s emulator-5554 shell getprop ro.product.model") echo "Pixel 7" ;;
  "-s emulator-5554 shell getprop ro.build.version.release") echo "14" ;;
  "-s emulator-5554 shell dumpsys battery")
    printf 'Current Battery Service state:\n  AC powered: true\n  level: 87\n  scale: 100\n'
    ;;
  "-s emulator-5554 shell wm size") echo "Physical size: 1080x2400" ;;
  "-s emulator-5554 shell ip route")
    echo "192.168.1.0/24 dev wlan0 proto kernel scope link src 192.168.1.42"
    ;;
  "-s R58M123 "*)
    echo "error: device 'R58M123' not found" >&2
    exit 1
    ;;
  "connect 192.168.1.50:5555") echo "connected to 192.168.1.50:5555" ;;
  "connect "*)
    echo "unable to connect to $2: Connection refused"
    exit 1
    ;;
  "-s emulator-5554 tcpip "*) echo "restarting in TCP mode port: $4" ;;
  "-s emulator-5554 install "*good.apk)
    echo "Performing Streamed Install"
    echo "Success"
    ;;
  "-s emulator-5554 install "*)
    echo "Performing Streamed Install"
    echo "adb: failed to install $4: Failure [INSTALL_FAILED_INVALID_APK]"
    exit 1
    ;;
  "-s emulator-5554 push "*) echo "$4: 1 file pushed, 0 skipped." ;;
  "-s emulator-5554 pull /sdcard/missing "*)
    echo "adb: error: failed to stat remote object '/sdcard/missing': No such file or directory" >&2
    exit 1
    ;;
  "-s emulator-5554 pull "*)
    printf 'CAPTURE' > "$5"
    echo "$4: 1 file pulled, 0 skipped."
    ;;
  "-s emulator-5554 shell screencap "*) ;;
  "-s emulator-5554 shell screenrecord "*) ;;
  "-s emulator-5554 shell rm "*)
    echo "rm: $5: Read-only file system" >&2
    exit 1
    ;;
  "-s emulator-5554 shell ls /sdcard") printf 'DCIM\nDownload\n' ;;
  "-s emulator-5554 shell cat /nope")
    echo "cat: /nope: No such file or directory" >&2
    exit 1
    ;;
  "-s emulator-5554 shell cat /sdcard/blob") printf 'ok\377done' ;;
  "-s emulator-5554 shell logcat -d")
    i=0
    while [ $i -lt 5000 ]; do
      echo "I/ActivityManager: line $i"
      echo "W/System: noise $i" >&2
      i=$((i+1))
    done
    ;;
  "-s emulator-5554 shell input "*) ;;
  *)
    echo "unknown command: $*" >&2
    exit 1
    ;;
esac
"#;

pub struct Fixture {
    pub dir: PathBuf,
    pub adb: PathBuf,
    pub scrcpy: PathBuf,
    pub mirror_log: PathBuf,
}

/// Fake tools shared by every test in this binary
pub fn fixture() -> &'static Fixture {
    static FIXTURE: OnceLock<Fixture> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("droidlink-it-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let adb = dir.join("adb");
        write_script(&adb, FAKE_ADB);

        let mirror_log = dir.join("mirror.log");
        let scrcpy = dir.join("scrcpy");
        write_script(
            &scrcpy,
            &format!("#!/bin/sh\necho \"$*\" > '{}'\n", mirror_log.display()),
        );

        Fixture {
            dir,
            adb,
            scrcpy,
            mirror_log,
        }
    })
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Fresh per-test directory for captured files
pub fn capture_dir(test: &str) -> PathBuf {
    let dir = fixture().dir.join(test);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Orchestrator over the real subprocess executor and the fake tools
pub fn orchestrator(test: &str) -> SessionOrchestrator {
    let fixture = fixture();
    let time = Arc::new(FixedTimeProvider(NOW_MS));
    SessionOrchestrator::new(
        Arc::new(SubprocessExecutor::new(time.clone())),
        ToolPaths {
            bridge: fixture.adb.to_string_lossy().into_owned(),
            mirror: Some(fixture.scrcpy.to_string_lossy().into_owned()),
        },
        time,
    )
    .with_capture_dir(capture_dir(test))
}
