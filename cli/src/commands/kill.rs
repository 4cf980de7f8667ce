//! Kill command - terminate whatever holds a port.
//!
//! One scan decides the plan: nothing to do, a single process, or several
//! candidates the operator picks from.

use std::collections::HashSet;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{bail, Result};
use portman_core::{
    Config, PortInfo, PortScanner, PortScannerPort, PortService, ProcessKillerPort,
    ProcessTerminator,
};
use tracing::debug;

use crate::tui::{self, Selection};

/// What a scan says about the requested port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillPlan {
    NotFound,
    Single(PortInfo),
    Ambiguous(Vec<PortInfo>),
}

impl KillPlan {
    pub fn from_matches(mut matches: Vec<PortInfo>) -> Self {
        match matches.len() {
            0 => KillPlan::NotFound,
            1 => KillPlan::Single(matches.remove(0)),
            _ => KillPlan::Ambiguous(matches),
        }
    }
}

pub async fn run(port: u16, config: &Config) -> Result<ExitCode> {
    let service = PortService::new(PortScanner::new()?);
    let terminator =
        ProcessTerminator::new().with_timing(config.grace_timeout(), config.poll_interval());

    let plan = plan(&service, port).await?;
    // Unlocked handle: the chooser draws to stdout from the blocking pool
    let mut out = io::stdout();
    let succeeded = execute(port, plan, terminator, choose_interactively, &mut out).await?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub async fn plan<S: PortScannerPort>(service: &PortService<S>, port: u16) -> Result<KillPlan> {
    let matches = service.find_all_by_port(port).await?;
    debug!(port = port, matches = matches.len(), "Resolved kill targets");
    Ok(KillPlan::from_matches(matches))
}

/// Carry out a plan, reporting progress to `out`; `Ok(false)` means
/// something the operator asked for did not happen.
async fn execute<K, C, W>(
    port: u16,
    plan: KillPlan,
    killer: K,
    choose: C,
    out: &mut W,
) -> Result<bool>
where
    K: ProcessKillerPort + Clone + 'static,
    C: FnOnce(u16, Vec<PortInfo>) -> Result<Selection> + Send + 'static,
    W: Write,
{
    match plan {
        KillPlan::NotFound => {
            writeln!(out, "No process found on port {}", port)?;
            Ok(false)
        }
        KillPlan::Single(target) => {
            writeln!(
                out,
                "Killing process on port {} (PID: {}, Process: {})...",
                target.port, target.pid, target.process_name
            )?;
            kill_one(&killer, target.pid, out).await
        }
        KillPlan::Ambiguous(candidates) => {
            let total = candidates.len();
            let selection = tokio::task::spawn_blocking(move || choose(port, candidates)).await??;

            let chosen = match selection {
                Selection::Cancelled => {
                    writeln!(out, "Cancelled")?;
                    return Ok(true);
                }
                Selection::Confirmed(chosen) => chosen,
            };

            if chosen.is_empty() {
                writeln!(out, "No processes selected")?;
                return Ok(true);
            }
            if chosen.len() == total {
                writeln!(out, "Killing all {} processes on port {}...", total, port)?;
            }

            // One process can hold the port over several protocols
            let mut seen = HashSet::new();
            let mut all_succeeded = true;
            for target in chosen {
                if !seen.insert(target.pid) {
                    debug!(pid = target.pid, protocol = %target.protocol, "Skipping pid already killed");
                    continue;
                }
                writeln!(out, "Killing PID {} ({})...", target.pid, target.process_name)?;
                all_succeeded &= kill_one(&killer, target.pid, out).await?;
            }
            Ok(all_succeeded)
        }
    }
}

async fn kill_one<K, W>(killer: &K, pid: u32, out: &mut W) -> Result<bool>
where
    K: ProcessKillerPort + Clone + 'static,
    W: Write,
{
    let killer = killer.clone();
    let outcome = tokio::task::spawn_blocking(move || killer.kill(pid)).await?;

    if outcome.success {
        writeln!(out, "{}", outcome)?;
    } else {
        eprintln!("{}", outcome);
    }
    Ok(outcome.success)
}

fn choose_interactively(port: u16, candidates: Vec<PortInfo>) -> Result<Selection> {
    if !atty::is(atty::Stream::Stdin) || !atty::is(atty::Stream::Stdout) {
        eprintln!("Multiple processes found on port {}:", port);
        for candidate in &candidates {
            eprintln!("  {}", candidate);
        }
        bail!("a terminal is needed to choose between them");
    }
    tui::choose(port, candidates)
}
