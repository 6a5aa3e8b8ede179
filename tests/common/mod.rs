// Shared test helpers: recording executor and fixture /proc trees
#![allow(dead_code)]

use mountkeeper::command::{Command, CommandOutput, Executor};
use mountkeeper::{Error, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// Records every command and answers from a queue of canned outputs.
/// When the queue is empty, commands succeed with no output.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<Command>>,
    responses: Mutex<VecDeque<CommandOutput>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: i32, lines: &[&str]) -> Self {
        self.responses.lock().unwrap().push_back(CommandOutput {
            status,
            lines: lines.iter().map(|l| l.to_string()).collect(),
            stderr: String::new(),
        });
        self
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(Command::command_line)
            .collect()
    }

    pub fn last(&self) -> Command {
        self.calls.lock().unwrap().last().cloned().expect("no command ran")
    }
}

impl Executor for RecordingExecutor {
    fn spawn(&self, cmd: &Command) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(cmd.clone());
        Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Executor whose programs can never be started.
pub struct MissingBinaries;

impl Executor for MissingBinaries {
    fn spawn(&self, cmd: &Command) -> Result<CommandOutput> {
        Err(Error::Spawn {
            command: cmd.program().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

pub const CPUINFO: &str = "processor\t: 0
vendor_id\t: GenuineIntel
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
cpu MHz\t\t: 1800.000

processor\t: 1
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
cpu MHz\t\t: 1700.000
";

pub const PROC_STAT: &str = "cpu  100 0 50 800 50 0 0 0 0 0
cpu0 50 0 25 400 25 0 0 0 0 0
intr 12345
";

/// Write a minimal /proc and /etc tree under `root`.
pub fn write_fixture_tree(root: &Path) {
    std::fs::create_dir_all(root.join("proc/net")).unwrap();
    std::fs::create_dir_all(root.join("etc")).unwrap();
    std::fs::write(root.join("proc/uptime"), "90065.3 350000.12\n").unwrap();
    std::fs::write(root.join("proc/loadavg"), "0.52 0.58 0.59 1/389 12345\n").unwrap();
    std::fs::write(root.join("proc/cpuinfo"), CPUINFO).unwrap();
    std::fs::write(root.join("proc/stat"), PROC_STAT).unwrap();
    std::fs::write(
        root.join("etc/login.defs"),
        "# login.defs\nMAIL_DIR        /var/mail\nUID_MIN\t\t\t 1000\nUMASK\t\t022\n",
    )
    .unwrap();
}
