use std::io::Write;

use anyhow::Context;
use dnclear_core::{ApiError, DncClient, Transport};
use serde_json::Value;

use crate::Command;

const SAMPLE_NUMBER: &str = "222-222-2222";
const SAMPLE_WEBHOOK_NUMBER: &str = "333-333-3333";

pub fn run<T: Transport>(client: &DncClient<T>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Add { phone } => print_json(&client.add(&phone)?),
        Command::Webhook { phone } => print_json(&client.webhook(&phone)?),
        Command::Check { phone } => print_json(&client.check(&phone)?),
        Command::Remove { phone } => print_json(&client.remove(&phone)?),
        Command::List { page, limit } => print_json(&client.retrieve(page, limit)?),
        Command::DumpCsv { output } => {
            let csv = client.dump_csv()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "CSV export written");
                    Ok(())
                }
                None => {
                    print!("{csv}");
                    Ok(())
                }
            }
        }
        Command::BatchAdd { phones } => print_json(&client.batch_add(phones)?),
        Command::BatchScan { phones } => print_json(&client.batch_scan(phones)?),
        Command::Demo => demo(client, &mut std::io::stdout().lock()),
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Call every endpoint once, writing one line per step. Failed steps print
/// `null`; the failure itself has already been logged by the client.
pub fn demo<T: Transport, W: Write>(client: &DncClient<T>, out: &mut W) -> anyhow::Result<()> {
    let batch = [SAMPLE_NUMBER, SAMPLE_WEBHOOK_NUMBER];

    write_step(out, client.add(SAMPLE_NUMBER))?;
    write_step(out, client.webhook(SAMPLE_WEBHOOK_NUMBER))?;
    write_step(out, client.check(SAMPLE_NUMBER))?;
    write_step(out, client.remove(SAMPLE_NUMBER))?;
    write_step(out, client.retrieve(1, 100))?;
    match client.dump_csv() {
        Ok(csv) => writeln!(out, "{}", csv.trim_end())?,
        Err(_) => writeln!(out, "null")?,
    }
    write_step(out, client.batch_add(batch))?;
    write_step(out, client.batch_scan(batch))?;
    Ok(())
}

fn write_step<W: Write>(out: &mut W, result: Result<Value, ApiError>) -> anyhow::Result<()> {
    let line = serde_json::to_string(&result.ok())?;
    writeln!(out, "{line}")?;
    Ok(())
}
