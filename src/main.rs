//! Binario `localboot`: lleva el backend local de "no instalado" a
//! "arrancado y alcanzable" y publica su endpoint.
//!
//! Configuración por variables `LOCALBOOT_*` (o `.env`); trazas con
//! `RUST_LOG`. Código de salida 0 si se conecta, 1 si un paso queda en
//! error (volver a ejecutar reintenta ese paso) y 2 ante errores de cableado.

use std::process::ExitCode;

use boot_core::StepStatus;
use localboot::session::{Session, SessionReport};
use localboot::{AppError, BootConfig};
use log::{debug, info};

fn print_report(report: &SessionReport) {
    for line in &report.steps {
        let mark = match line.status {
            StepStatus::Success => "ok",
            StepStatus::Error => "error",
            StepStatus::Pending => "pending",
            StepStatus::NotStarted => "-",
        };
        match &line.error {
            Some(message) => println!("[{mark:>7}] {}: {message}", line.title),
            None => println!("[{mark:>7}] {}", line.title),
        }
    }
    if let Some(version) = &report.latest_version {
        println!("latest version: {version}");
    }
}

async fn run() -> Result<(Session, Result<String, AppError>), AppError> {
    let cfg = BootConfig::from_env();
    debug!("config:loaded host={} port={} poll_interval={:?} max_attempts={} commands={}",
           cfg.host,
           cfg.port,
           cfg.poll_interval,
           cfg.poll_max_attempts,
           cfg.commands.len());
    let session = Session::from_config(&cfg)?;
    let outcome = session.run().await.map(|c| c.endpoint_url);
    Ok((session, outcome))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let (session, outcome) = match run().await {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("localboot: {e}");
            return ExitCode::from(2);
        }
    };

    let report = session.report();
    print_report(&report);
    match serde_json::to_string(&report) {
        Ok(json) => info!("session:report {json}"),
        Err(e) => debug!("session:report-unserializable err={e}"),
    }

    match outcome {
        Ok(endpoint) => {
            println!("connected: {endpoint}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("localboot: {e}");
            ExitCode::FAILURE
        }
    }
}
