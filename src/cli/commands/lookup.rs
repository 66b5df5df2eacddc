use crate::config::Config;
use crate::domain::MediaParams;
use crate::models::anime::Anime;
use crate::services::{CatalogError, CatalogRequest};
use crate::state::build_providers;
use serde_json::Value;

pub struct LookupArgs {
    pub kind: String,
    pub search: Option<String>,
    pub id: Option<String>,
    pub season: Option<String>,
    pub year: Option<String>,
    pub source: Option<String>,
    pub no_fallback: bool,
    pub json: bool,
}

pub async fn cmd_lookup(config: &Config, args: &LookupArgs) -> anyhow::Result<()> {
    let params = MediaParams {
        kind: Some(args.kind.as_str()),
        search: args.search.as_deref(),
        id: args.id.as_deref(),
        season: args.season.as_deref(),
        year: args.year.as_deref(),
    };
    let fallback = args.no_fallback.then_some("false");
    let request = CatalogRequest::from_params(&params, args.source.as_deref(), fallback)?;

    let providers = build_providers(&config.providers)?;

    let payload = match providers.catalog.resolve(&request).await {
        Ok(payload) => payload,
        Err(CatalogError::AllProvidersFailed(failures)) => {
            println!("Both AniList and Kitsu are unavailable:");
            for failure in &failures {
                println!("  • {}: {}", failure.service, failure.message);
            }
            anyhow::bail!("lookup failed for {}", request.query);
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if payload.is_array() {
        print_list(&payload)
    } else {
        print_detail(payload)
    }
}

fn print_list(payload: &Value) -> anyhow::Result<()> {
    let results: Vec<Anime> = serde_json::from_value(payload.clone())?;

    if results.is_empty() {
        println!("No anime found.");
        return Ok(());
    }

    println!("Results:");
    println!("{:-<60}", "");

    for anime in &results {
        println!("• {} ({})", anime.display_title(), episodes_label(anime));
        if let Some(romaji) = &anime.title.romaji
            && romaji != anime.display_title()
        {
            println!("  Romaji: {romaji}");
        }
        println!(
            "  Status: {} | Score: {} | ID: {}",
            anime.status.as_deref().unwrap_or("?"),
            score_label(anime),
            anime.id
        );
    }

    Ok(())
}

fn print_detail(payload: Value) -> anyhow::Result<()> {
    let anime: Anime = serde_json::from_value(payload)?;

    println!("{}", anime.display_title());
    println!("{:-<60}", "");
    if let Some(romaji) = &anime.title.romaji {
        println!("Romaji:   {romaji}");
    }
    if let Some(native) = &anime.title.native {
        println!("Native:   {native}");
    }
    println!("ID:       {}", anime.id);
    println!("Episodes: {}", episodes_label(&anime));
    println!("Status:   {}", anime.status.as_deref().unwrap_or("?"));
    println!("Score:    {}", score_label(&anime));

    if let Some(genres) = anime.genres.as_ref().filter(|g| !g.is_empty()) {
        println!("Genres:   {}", genres.join(", "));
    }

    if let Some(studios) = anime.studios.as_ref().filter(|s| !s.nodes.is_empty()) {
        let names: Vec<&str> = studios.nodes.iter().map(|n| n.name.as_str()).collect();
        println!("Studios:  {}", names.join(", "));
    }

    if let (Some(season), Some(year)) = (&anime.season, anime.season_year) {
        println!("Season:   {season} {year}");
    }

    if let Some(description) = &anime.description {
        println!();
        println!("{}", render_description(description));
    }

    Ok(())
}

/// `AniList` descriptions carry HTML (`<br>`, `<i>`); render them as text.
fn render_description(description: &str) -> String {
    html2text::from_read(description.as_bytes(), 80)
        .map_or_else(|_| description.to_string(), |text| text.trim_end().to_string())
}

fn episodes_label(anime: &Anime) -> String {
    anime
        .episodes
        .map_or_else(|| "? eps".to_string(), |e| format!("{e} eps"))
}

fn score_label(anime: &Anime) -> String {
    anime
        .average_score
        .map_or_else(|| "-".to_string(), |s| format!("{s}"))
}
