//! Script runner (default binary).
//!
//! Replays a JSON button script against a fresh session and prints the
//! events it produced. There is no renderer; hosts draw from snapshots.
//!
//! Usage: `blockfall <script.json | -> [--snapshot]`

use std::io::Read;

use anyhow::{anyhow, Context, Result};

use blockfall::script::{run_script, Script};

struct Args {
    path: String,
    snapshot: bool,
}

fn parse_args() -> Result<Args> {
    let mut path = None;
    let mut snapshot = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--snapshot" => snapshot = true,
            "-h" | "--help" => {
                println!("usage: blockfall <script.json | -> [--snapshot]");
                std::process::exit(0);
            }
            _ if path.is_none() => path = Some(arg),
            _ => return Err(anyhow!("unexpected argument: {}", arg)),
        }
    }
    let path = path.ok_or_else(|| anyhow!("missing script path (use - for stdin)"))?;
    Ok(Args { path, snapshot })
}

fn read_script(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read script from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("read script {}", path))
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let script = Script::from_json_str(&read_script(&args.path)?)?;

    println!(
        "[session] seed={} steps={} frame_ms={}",
        script.seed,
        script.steps.len(),
        script.frame_ms
    );

    let report = run_script(&script)?;
    for timed in &report.events {
        println!("[session] t={}ms {:?}", timed.at_ms, timed.event);
    }

    let snap = &report.snapshot;
    println!(
        "[session] done t={}ms state={:?} score={} level={} lines={}",
        report.elapsed_ms, snap.state, snap.score, snap.level, snap.lines
    );

    if args.snapshot {
        println!("{}", snap.to_json()?);
    }
    Ok(())
}
