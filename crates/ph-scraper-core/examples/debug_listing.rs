//! Debug script to check listing selectors against a live page
//!
//! Run with: cargo run --example debug_listing -p ph-scraper-core -- <profile-url> [page]

use ph_scraper_core::{
    ClientConfig, Listing, ListingConfig, ListingExtractor, PageOutcome, PageSource,
    ProfileClient, Site, parse_profile_url,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let url = args.next().ok_or("usage: debug_listing <profile-url> [page]")?;
    let page: u32 = args.next().map(|p| p.parse()).transpose()?.unwrap_or(1);

    let profile = parse_profile_url(&Site::default(), &url)?;
    let config = ListingConfig::for_profile(profile.content_type, Listing::PublicVideos);
    let listing_url = config.listing_url(&profile.profile_url);

    println!("Fetching page {} of {}...\n", page, listing_url);

    let client = ProfileClient::with_config(&ClientConfig::default())?;
    let html = match client.fetch_page(&listing_url, page).await? {
        PageOutcome::Body(html) => html,
        PageOutcome::NotFound => {
            println!("Page not found (end of listing)");
            return Ok(());
        }
    };

    // Save HTML to file for inspection
    std::fs::write("debug_listing.html", &html)?;
    println!("HTML saved to debug_listing.html");

    let videos = ListingExtractor::new(&config.selectors)?.extract(&html);
    println!(
        "Container #{}: {} videos\n",
        config.selectors.list_container_id,
        videos.len()
    );

    for (i, video) in videos.iter().enumerate() {
        println!("{}. {} [{}]", i + 1, video.title.as_deref().unwrap_or("-"), video.vkey);
        if let Some(ref duration) = video.duration {
            println!("   Duration: {}", duration);
        }
        if let Some(ref views) = video.views {
            println!("   Views: {}", views);
        }
    }

    Ok(())
}
