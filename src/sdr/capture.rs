//! Live capture from a raw sample source
//!
//! Opens the sample stream (stdin, a file or a receiver process writing to
//! its stdout), runs the demodulator on a dedicated thread and pushes every
//! valid frame into the raw message queue.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, error, info, warn};

use crate::adsb::RawMessage;
use crate::device::DeviceStats;
use crate::error::Error;

use super::detect::Demodulator;

const COMMAND_PREFIX: &str = "cmd:";

/// Where raw samples come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSource {
    Stdin,
    File(PathBuf),
    /// Receiver process whose stdout carries the samples
    Command { program: String, args: Vec<String> },
}

impl SampleSource {
    /// Parse `-` (stdin), `cmd:<program> <args...>` or a file path
    pub fn parse(value: &str) -> crate::Result<Self> {
        let value = value.trim();
        if value.is_empty() || value == "-" {
            return Ok(Self::Stdin);
        }
        if let Some(command) = value.strip_prefix(COMMAND_PREFIX) {
            let mut words = command.split_whitespace().map(str::to_string);
            let program = words.next().ok_or_else(|| Error::InvalidConfig {
                var: "SAMPLE_SOURCE",
                value: value.to_string(),
            })?;
            return Ok(Self::Command {
                program,
                args: words.collect(),
            });
        }
        Ok(Self::File(PathBuf::from(value)))
    }

    /// Open the stream. A spawned process lives as long as the stream.
    pub fn open(&self) -> Result<SampleStream> {
        match self {
            Self::Stdin => Ok(SampleStream {
                reader: Box::new(io::stdin()),
                child: None,
            }),
            Self::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open sample file {}", path.display()))?;
                Ok(SampleStream {
                    reader: Box::new(BufReader::new(file)),
                    child: None,
                })
            }
            Self::Command { program, args } => {
                info!("Executing: {} {}", program, args.join(" "));
                let mut child = Command::new(program)
                    .args(args)
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()
                    .with_context(|| format!("Failed to spawn {}", program))?;

                let stdout = child
                    .stdout
                    .take()
                    .with_context(|| format!("Failed to capture {} stdout", program))?;

                if let Some(stderr) = child.stderr.take() {
                    let name = program.clone();
                    thread::Builder::new()
                        .name("sample-stderr".to_string())
                        .spawn(move || {
                            for line in BufReader::new(stderr).lines().map_while(io::Result::ok) {
                                if !line.trim().is_empty() {
                                    info!("[{}] {}", name, line.trim());
                                }
                            }
                        })
                        .context("Failed to spawn stderr reader")?;
                }

                Ok(SampleStream {
                    reader: Box::new(stdout),
                    child: Some(child),
                })
            }
        }
    }
}

impl fmt::Display for SampleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Command { program, args } => write!(f, "{}{} {}", COMMAND_PREFIX, program, args.join(" ")),
        }
    }
}

/// Open sample stream; kills and reaps its receiver process on drop
pub struct SampleStream {
    reader: Box<dyn Read + Send>,
    child: Option<Child>,
}

impl Read for SampleStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Drop for SampleStream {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            match child.wait() {
                Ok(status) => debug!("Receiver process exited: {}", status),
                Err(e) => warn!("Failed to reap receiver process: {}", e),
            }
        }
    }
}

/// Start demodulating `source` on a dedicated thread
pub fn spawn_capture(
    source: SampleSource,
    tx: Sender<RawMessage>,
    running: Arc<AtomicBool>,
    stats: Arc<DeviceStats>,
) -> Result<JoinHandle<()>> {
    info!("Starting capture from {}", source);

    thread::Builder::new()
        .name("sdr-capture".to_string())
        .spawn(move || {
            if let Err(e) = run_capture(&source, &tx, &running, &stats) {
                error!("Capture error: {:#}", e);
            }
            running.store(false, Ordering::SeqCst);
        })
        .context("Failed to spawn capture thread")
}

fn run_capture(
    source: &SampleSource,
    tx: &Sender<RawMessage>,
    running: &AtomicBool,
    stats: &DeviceStats,
) -> Result<()> {
    let stream = source.open()?;
    let mut demodulator = Demodulator::new(stream).context("Failed to read initial samples")?;
    let mut first_frame = true;

    while running.load(Ordering::SeqCst) {
        let message = demodulator
            .next_message()
            .context("Failed to read samples")?;
        stats.set_detector(demodulator.stats.preambles_detected, demodulator.stats.crc_errors);

        let Some(message) = message else {
            info!("Sample stream exhausted");
            break;
        };

        if first_frame {
            info!("First frame received! Demodulator is working.");
            first_frame = false;
        }
        stats.record_frame();

        match tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                stats.record_dropped();
                debug!("Frame channel full, dropping frame");
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Channel closed, stopping capture");
                break;
            }
        }
    }

    info!(
        "Capture stopped. Preambles={}, Frames={}, CRC errors={}",
        demodulator.stats.preambles_detected,
        demodulator.stats.frames_decoded,
        demodulator.stats.crc_errors
    );
    Ok(())
}
