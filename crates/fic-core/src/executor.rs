//! Campaign executor: runs the mutated-binary population against the key x
//! plaintext input matrix under bounded concurrency, with a per-run timeout
//! and streamed CSV output.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

use rayon::prelude::*;

use crate::config::{Arch, CampaignConfig};
use crate::error::FaultCampaignError;
use crate::pattern::contains_bypass_token;
use crate::types::{MutatedBinary, RunResult};

/// Run the whole campaign: every key, every plaintext, every batch of
/// binaries, streaming one CSV row per `(binary, key, plaintext)` as soon as
/// its batch completes.
pub fn run_campaign(
    infile: &str,
    binaries: &[MutatedBinary],
    config: &CampaignConfig,
    arch: Arch,
) -> Result<(), FaultCampaignError> {
    let mut writer = csv::Writer::from_path(&config.results_csv)?;
    writer.write_record([
        "infile", "filename", "key", "plaintext", "stdout", "stderr", "exitcode", "timed_out",
    ])?;
    writer.flush()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()
        .map_err(|e| FaultCampaignError::ExecutionIoError {
            binary: config.output_dir.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;

    for key in &config.keys {
        for plaintext in &config.plaintexts {
            for batch in binaries.chunks(config.batch_size.max(1)) {
                let results: Vec<RunResult> = pool.install(|| {
                    batch
                        .par_iter()
                        .map(|binary| {
                            run_one(infile, binary, key, plaintext, config, arch)
                        })
                        .collect()
                });
                for result in &results {
                    if contains_bypass_token(&result.stdout) {
                        log::info!("bypass detected in {}", result.filename);
                    }
                    write_row(&mut writer, result)?;
                }
                writer.flush()?;
            }
        }
    }
    Ok(())
}

fn write_row(
    writer: &mut csv::Writer<std::fs::File>,
    result: &RunResult,
) -> Result<(), FaultCampaignError> {
    writer.write_record([
        result.infile.as_str(),
        result.filename.as_str(),
        result.key.as_str(),
        result.plaintext.as_str(),
        &String::from_utf8_lossy(&result.stdout),
        &String::from_utf8_lossy(&result.stderr),
        &result
            .exitcode
            .map(|c| c.to_string())
            .unwrap_or_else(|| "".to_string()),
        &result.timed_out.to_string(),
    ])?;
    Ok(())
}

fn build_command(binary: &MutatedBinary, key: &str, plaintext: &str, config: &CampaignConfig, arch: Arch) -> Command {
    match arch {
        Arch::X86 => {
            let mut cmd = Command::new(&binary.path);
            cmd.arg(key).arg(plaintext);
            cmd
        }
        Arch::Arm => {
            let mut cmd = Command::new("qemu-arm");
            cmd.arg("-L")
                .arg(&config.qemu_sysroot)
                .arg(&binary.path)
                .arg(key)
                .arg(plaintext);
            cmd
        }
    }
}

/// Spawn `binary` with `(key, plaintext)`, enforce `config.timeout` by
/// polling `Child::try_wait` rather than blocking, and force-kill on
/// expiry. stdout/stderr are drained on background threads so a child that
/// fills its pipe buffer can't deadlock the poll loop.
fn run_one(
    infile: &str,
    binary: &MutatedBinary,
    key: &str,
    plaintext: &str,
    config: &CampaignConfig,
    arch: Arch,
) -> RunResult {
    let mut cmd = build_command(binary, key, plaintext, config, arch);
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return RunResult {
                infile: infile.to_string(),
                filename: binary.label.clone(),
                key: key.to_string(),
                plaintext: plaintext.to_string(),
                stdout: Vec::new(),
                stderr: e.to_string().into_bytes(),
                exitcode: None,
                timed_out: false,
            };
        }
    };

    let stdout_handle = drain_pipe(child.stdout.take());
    let stderr_handle = drain_pipe(child.stderr.take());

    let deadline = Instant::now() + config.timeout;
    let mut timed_out = false;
    let exitcode = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status.code(),
            Ok(None) => {
                if Instant::now() >= deadline {
                    timed_out = true;
                    let _ = child.kill();
                    let _ = child.wait();
                    break None;
                }
                thread::sleep(std::time::Duration::from_millis(20));
            }
            Err(_) => break None,
        }
    };

    let stdout = stdout_handle.and_then(|h| h.join().ok()).unwrap_or_default();
    let stderr = stderr_handle.and_then(|h| h.join().ok()).unwrap_or_default();

    RunResult {
        infile: infile.to_string(),
        filename: binary.label.clone(),
        key: key.to_string(),
        plaintext: plaintext.to_string(),
        stdout,
        stderr,
        exitcode,
        timed_out,
    }
}

fn drain_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    }))
}
