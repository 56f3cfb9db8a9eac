use tabled::Table;

use crate::{info, seatgeek, utils, warning};

/// Searches upcoming concerts for an artist and prints them as a table.
pub async fn concerts(artist: String) {
    let artist = artist.trim();
    if artist.is_empty() {
        warning!("Artist name is required");
        return;
    }

    match seatgeek::search_events_typed(artist).await {
        Ok(events) if events.is_empty() => info!("No concerts found for {}", artist),
        Ok(events) => {
            let table = Table::new(utils::concert_table_rows(&events));
            println!("{}", table);
        }
        Err(e) => warning!("Concert search failed: {}", e),
    }
}
