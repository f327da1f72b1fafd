//! Child-process plumbing shared by the external tool invocations.

use std::{
    io::{self, Write},
    process::{Command, ExitStatus, Stdio},
};

/// Run `command` with stdout and stderr merged into one pipe, streaming
/// everything it prints into `sink` on the calling thread.
pub fn run_merged(mut command: Command, sink: &mut dyn Write) -> io::Result<ExitStatus> {
    let (mut reader, writer) = io::pipe()?;
    command
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer);

    let mut child = command.spawn()?;
    // The command keeps its copies of the write end open until dropped.
    drop(command);

    if let Err(err) = io::copy(&mut reader, sink) {
        // The child is reaped even when its output can't be delivered.
        let _ = child.kill();
        child.wait()?;
        return Err(err);
    }
    child.wait()
}

/// Run `command` to completion and return stdout followed by stderr.
pub fn capture(mut command: Command) -> io::Result<String> {
    let output = command.stdin(Stdio::null()).output()?;
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(text)
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn test_run_merged_collects_both_streams() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out; echo err 1>&2; exit 3"]);

        let mut sink = Vec::new();
        let status = run_merged(command, &mut sink).unwrap();

        let text = String::from_utf8(sink).unwrap();
        assert_eq!(status.code(), Some(3));
        assert!(text.contains("out"));
        assert!(text.contains("err"));
    }

    #[test]
    fn test_run_merged_spawn_failure() {
        let command = Command::new("/definitely/not/a/compiler");
        let mut sink = Vec::new();
        assert!(run_merged(command, &mut sink).is_err());
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_merged_sink_failure_stops_child() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out; sleep 30"]);

        let started = Instant::now();
        let err = run_merged(command, &mut BrokenSink).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test]
    fn test_capture() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo javac 1.8.0_292 1>&2"]);
        assert_eq!(capture(command).unwrap().trim(), "javac 1.8.0_292");
    }
}
