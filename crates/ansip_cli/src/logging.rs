//! Log sink setup.

use ansip_server::LogTarget;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber writing to `target`.
pub fn init(filter: EnvFilter, target: &LogTarget) -> io::Result<()> {
    let ansi = matches!(target, LogTarget::Stdout | LogTarget::Stderr);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(make_writer(target)?)
        .init();
    Ok(())
}

fn make_writer(target: &LogTarget) -> io::Result<BoxMakeWriter> {
    Ok(match target {
        LogTarget::Stdout => BoxMakeWriter::new(io::stdout),
        LogTarget::Stderr => BoxMakeWriter::new(io::stderr),
        LogTarget::Discard => BoxMakeWriter::new(io::sink),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn file_target_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ansip.log");
        make_writer(&LogTarget::File(path.clone())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_file_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("missing").join("ansip.log");
        assert!(make_writer(&LogTarget::File(path)).is_err());
    }

    #[test]
    fn stream_targets_never_fail() {
        for target in [LogTarget::Stdout, LogTarget::Stderr, LogTarget::Discard] {
            assert!(make_writer(&target).is_ok());
        }
    }
}
