use anyhow::Result;
use luach_core::Store;

use crate::{config, output};

pub fn run(json: bool) -> Result<()> {
    let store = config::open_store()?;
    match store.events_for_owner(config::OWNER_ID) {
        Ok(events) => output::success(json, events, None, |events| {
            if events.is_empty() {
                println!("No anniversaries yet. Add one with `luach add`.");
                return;
            }
            for event in events {
                println!(
                    "{}  {}  (anchor {}, synced through {})",
                    event.id, event.title, event.anchor, event.last_synced_year
                );
            }
        }),
        Err(err) => output::failure(json, err),
    }
}
