//! Test fixtures - reusable content for installations and stub tools.

/// Backend entry point shipped by the currently installed release
pub const INSTALLED_BACKEND: &str = "print('v1')\n";

/// Backend entry point shipped by the new release
pub const RELEASE_BACKEND: &str = "print('v2')\n";

/// Runtime data written by the running application
pub const LIVE_USERS: &str = "[\"alice\", \"bob\"]\n";

/// Secrets file of the live installation
pub const LIVE_SECRETS: &str = "DATABASE_URL=postgres://prod\n";

/// Client configuration of the live installation
pub const LIVE_CLIENT_CONFIG: &str = "window.API_BASE = 'https://example.org/api';\n";

/// Development defaults that ship inside a release tree
pub const RELEASE_CLIENT_CONFIG: &str = "window.API_BASE = 'http://localhost:8000';\n";

pub const REQUIREMENTS: &str = "fastapi==0.110.0\nuvicorn[standard]>=0.29\n# pinned for py3.10\n";

/// `pip` stand-in inside the dependency environment
pub const PIP_STUB: &str = "#!/bin/sh\nexit 0\n";

/// `systemctl` stand-in.
///
/// Appends every invocation to `calls.log` next to itself, keeps unit state
/// as `<unit>.active` marker files and fails any verb on a unit that has a
/// `<unit>.fail` marker.
pub const SYSTEMCTL_STUB: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$*" >> "$dir/calls.log"
case "$1" in
  is-active)
    [ -f "$dir/$3.active" ]
    exit $?
    ;;
esac
unit="$2"
if [ -f "$dir/$unit.fail" ]; then
  echo "Job for $unit failed" >&2
  exit 1
fi
case "$1" in
  stop) rm -f "$dir/$unit.active" ;;
  start|restart) touch "$dir/$unit.active" ;;
esac
exit 0
"#;
