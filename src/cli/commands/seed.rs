use crate::config::Config;
use crate::db::Store;
use crate::models::anime::AnimeTitle;
use crate::models::catalog::NewCatalogAnime;

struct SampleAnime {
    anilist_id: i32,
    english: &'static str,
    romaji: &'static str,
    native: &'static str,
    cover: &'static str,
    synopsis: &'static str,
    episodes: i32,
    status: &'static str,
    genres: &'static [&'static str],
    studio: &'static str,
    rating: f64,
}

const SAMPLES: &[SampleAnime] = &[
    SampleAnime {
        anilist_id: 16498,
        english: "Attack on Titan",
        romaji: "Shingeki no Kyojin",
        native: "進撃の巨人",
        cover: "bx9CtSE1A7nXIL5auxPA.jpg",
        synopsis: "Several hundred years ago, humans were nearly exterminated by titans...",
        episodes: 87,
        status: "Finished",
        genres: &["Action", "Drama", "Fantasy", "Military", "Shounen"],
        studio: "Wit Studio",
        rating: 9.0,
    },
    SampleAnime {
        anilist_id: 21,
        english: "One Piece",
        romaji: "One Piece",
        native: "ワンピース",
        cover: "nx24j76Jc34dCljY1N3.jpg",
        synopsis: "Gol D. Roger, known as the Pirate King, was executed...",
        episodes: 1000,
        status: "Releasing",
        genres: &["Adventure", "Comedy", "Drama", "Shounen"],
        studio: "Toei Animation",
        rating: 9.1,
    },
    SampleAnime {
        anilist_id: 52991,
        english: "Jujutsu Kaisen",
        romaji: "Jujutsu Kaisen",
        native: "呪術廻戦",
        cover: "n9ew2ymdOcEl5B8xJfM.jpg",
        synopsis: "Yuji Itadori is a genius with track and field...",
        episodes: 24,
        status: "Finished",
        genres: &["Action", "School", "Shounen", "Supernatural"],
        studio: "MAPPA",
        rating: 8.5,
    },
    SampleAnime {
        anilist_id: 113415,
        english: "Chainsaw Man",
        romaji: "Chainsaw Man",
        native: "チェンソーマン",
        cover: "epGgrn874DrcrU3p26c.jpg",
        synopsis: "Denji has a simple dream: to live a happy and peaceful life...",
        episodes: 12,
        status: "Finished",
        genres: &["Action", "Supernatural", "Shounen"],
        studio: "MAPPA",
        rating: 8.6,
    },
    SampleAnime {
        anilist_id: 30,
        english: "Death Note",
        romaji: "Death Note",
        native: "デスノート",
        cover: "ynboWAiAwJiI8Y3d3fQ.jpg",
        synopsis: "A shinigami, as a god of death, can kill any person...",
        episodes: 37,
        status: "Finished",
        genres: &["Mystery", "Psychological", "Supernatural", "Thriller"],
        studio: "Madhouse",
        rating: 9.0,
    },
];

const ANILIST_CDN: &str = "https://s4.anilist.co/file/anilistcdn/media/anime";

impl SampleAnime {
    fn to_new(&self) -> NewCatalogAnime {
        NewCatalogAnime {
            anilist_id: Some(self.anilist_id),
            kitsu_id: None,
            title: AnimeTitle {
                english: Some(self.english.to_string()),
                romaji: Some(self.romaji.to_string()),
                native: Some(self.native.to_string()),
            },
            cover_image: format!("{ANILIST_CDN}/cover/large/{}", self.cover),
            banner_image: Some(format!("{ANILIST_CDN}/banner/{}.jpg", self.anilist_id)),
            synopsis: Some(self.synopsis.to_string()),
            episodes: Some(self.episodes),
            status: Some(self.status.to_string()),
            genres: self.genres.iter().map(|g| (*g).to_string()).collect(),
            studio: Some(self.studio.to_string()),
            rating: Some(self.rating),
        }
    }
}

/// The bundled sample catalog.
#[must_use]
pub fn sample_catalog() -> Vec<NewCatalogAnime> {
    SAMPLES.iter().map(SampleAnime::to_new).collect()
}

pub async fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    println!("Seeding local catalog...");
    println!("{:-<60}", "");

    for anime in sample_catalog() {
        let model = store.upsert_anime_by_anilist_id(&anime).await?;
        println!(
            "• {} (AniList {})",
            anime.title.preferred().unwrap_or("Unknown"),
            model.anilist_id.unwrap_or_default()
        );
    }

    println!();
    println!("✓ Seeded {} anime", SAMPLES.len());
    Ok(())
}
