use std::io::Write;

use crate::api::{ApiClient, Backend};
use crate::config::Settings;
use crate::ui::main_window::InputLines;

/// First-run prompt for the backend URL. The URL is saved even when the
/// server cannot be reached right now.
pub async fn prompt_server(settings: &mut Settings, lines: &mut InputLines) -> std::io::Result<()> {
    loop {
        print!("Server URL (e.g. http://localhost:8000): ");
        std::io::stdout().flush()?;
        let Some(input) = lines.next_line().await? else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no server URL entered",
            ));
        };
        if input.trim().is_empty() {
            println!("Please enter a server URL.");
            continue;
        }

        let client = match ApiClient::new(&input, settings.timeout()) {
            Ok(client) => client,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        println!("Connecting…");
        let message = match client.providers().await {
            Ok(list) => format!("Connected ({} providers)", list.len()),
            Err(e) => format!("Saved (server check failed: {e})"),
        };
        println!("{message}");

        settings.base_url = client.base_url().to_string();
        if let Err(e) = settings.save() {
            println!("Failed to save settings: {e}");
        }
        return Ok(());
    }
}
