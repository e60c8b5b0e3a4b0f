//! Command output: human-readable by default, boundary envelopes with
//! `--json`.

use anyhow::Result;
use luach_core::{ApiResponse, LuachError};
use serde::Serialize;

pub fn success<T: Serialize>(
    json: bool,
    data: T,
    message: Option<String>,
    human: impl FnOnce(&T),
) -> Result<()> {
    if json {
        let envelope = match message {
            Some(message) => ApiResponse::success_with_message(data, message),
            None => ApiResponse::success(data),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        human(&data);
        if let Some(message) = message {
            println!("Warning: {}", message);
        }
    }
    Ok(())
}

pub fn failure(json: bool, err: LuachError) -> Result<()> {
    if json {
        let envelope = ApiResponse::<()>::failure(&err);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        std::process::exit(1);
    }
    Err(err.into())
}
