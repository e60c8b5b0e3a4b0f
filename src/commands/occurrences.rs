use anyhow::Result;
use luach_core::{LuachError, Store};

use crate::{config, output};

pub fn run(event_id: String, json: bool) -> Result<()> {
    let store = config::open_store()?;

    let event = match store.event(&event_id) {
        Ok(Some(event)) if event.owner_id == config::OWNER_ID => event,
        Ok(_) => {
            return output::failure(json, LuachError::NotFound(format!("event {}", event_id)));
        }
        Err(err) => return output::failure(json, err),
    };

    match store.occurrences_for_event(&event.id) {
        Ok(occurrences) => output::success(json, occurrences, None, |occurrences| {
            println!("{} occurrences of '{}'", occurrences.len(), event.title);
            for occurrence in occurrences {
                println!(
                    "  {}  {}  -> {}",
                    occurrence.year, occurrence.date, occurrence.remote_event_id
                );
            }
        }),
        Err(err) => output::failure(json, err),
    }
}
