//! WinWork RPC Server: JSON-RPC over stdin/stdout for the desktop front-end.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"link.create", "params":{"name":"...","type":"WebUrl","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr; stdout carries protocol frames only.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use winwork::app::App;
use winwork::rpc_handler::handle_method;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("winwork=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn send(out: &mut impl Write, frame: &Value) -> io::Result<()> {
    writeln!(out, "{}", frame)?;
    out.flush()
}

fn main() -> ExitCode {
    init_tracing();

    let app = match App::open_default() {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            tracing::error!(error = %e, "failed to open link store");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let ready = json!({"event":"ready","version":env!("CARGO_PKG_VERSION")});
    if send(&mut out, &ready).is_err() {
        return ExitCode::FAILURE;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));

                tracing::debug!(method, "rpc request");
                match handle_method(&app, method, &params) {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => {
                        tracing::warn!(method, error = %err, "rpc request failed");
                        json!({"id": id, "error": err})
                    }
                }
            }
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
        };

        if send(&mut out, &response).is_err() {
            break;
        }
    }

    ExitCode::SUCCESS
}
