//! Shared integration-test harness for running the `swipesim` binary.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

/// How long to wait for the server to report its bound address.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the compiled binary under test.
pub fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_swipesim")
}

/// Runs `swipesim` to completion with stdin closed.
#[allow(clippy::missing_panics_doc)]
pub fn run_command(args: &[&str]) -> Output {
    std::process::Command::new(bin())
        .args(args)
        .env_remove("SWIPESIM_LOG_LEVEL")
        .env_remove("SWIPESIM_BIND")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run swipesim")
}

/// Runs `swipesim` with `input` written to its stdin.
#[allow(clippy::missing_panics_doc)]
pub fn run_with_stdin(args: &[&str], input: &str) -> Output {
    use std::io::Write;

    let mut child = std::process::Command::new(bin())
        .args(args)
        .env_remove("SWIPESIM_LOG_LEVEL")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn swipesim");

    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for swipesim")
}

/// A running `swipesim serve` process bound to an ephemeral port.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
pub struct ServeProcess {
    child: Child,
    addr: SocketAddr,
}

impl ServeProcess {
    /// Starts `serve --bind 127.0.0.1:0` plus `extra` and waits until it
    /// logs the address it bound.
    #[allow(clippy::missing_panics_doc)]
    pub async fn spawn(extra: &[&str]) -> Self {
        let mut child = Command::new(bin())
            .args(["serve", "--bind", "127.0.0.1:0", "-v", "--color", "never"])
            .args(extra)
            .env_remove("SWIPESIM_LOG_LEVEL")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn swipesim serve");

        let stderr = child.stderr.take().expect("stderr not captured");
        let mut lines = BufReader::new(stderr).lines();

        let addr = tokio::time::timeout(STARTUP_TIMEOUT, async {
            while let Some(line) = lines.next_line().await.expect("stderr read error") {
                if line.contains("HTTP server listening") {
                    if let Some(addr) = parse_bound_addr(&line) {
                        return addr;
                    }
                }
            }
            panic!("server exited before reporting its address");
        })
        .await
        .expect("timed out waiting for server startup");

        // Keep draining stderr so the child never blocks on a full pipe.
        tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });

        Self { child, addr }
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Kills the server.
    pub async fn kill(mut self) {
        let _ = self.child.kill().await;
    }
}

fn parse_bound_addr(line: &str) -> Option<SocketAddr> {
    let start = line.find("bound_addr=")? + "bound_addr=".len();
    line[start..].split_whitespace().next()?.parse().ok()
}
