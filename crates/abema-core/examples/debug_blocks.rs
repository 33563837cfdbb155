//! Debug script to inspect the JSON-LD blocks of an abema.tv page
//!
//! Run with: cargo run --example debug_blocks -p abema-core -- <url>

use abema_core::{AbemaClient, parse_episodes, resolve_title, scan_blocks};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://abema.tv/video/title/26-249".to_string());

    let client = AbemaClient::new()?;

    println!("Fetching {}...\n", url);
    let html = client.fetch(&url, 3).await?;

    std::fs::write("debug_page.html", &html)?;
    println!("HTML saved to debug_page.html\n");

    for (i, block) in scan_blocks(&html).enumerate() {
        let snippet: String = block.trim().chars().take(200).collect();
        println!("=== Block {} ({} bytes) ===", i + 1, block.len());
        println!("{}\n", snippet);
    }

    println!("Series title: {}", resolve_title(&html));

    let episodes = parse_episodes(&html, &url);
    println!("Episodes found: {}", episodes.len());
    for episode in &episodes {
        println!(
            "  第{}話 {} -> {}",
            episode.number,
            episode.title,
            episode.url.as_deref().unwrap_or("(no url)")
        );
    }

    Ok(())
}
