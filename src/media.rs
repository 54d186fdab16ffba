use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::Color;
use serde::{Deserialize, Deserializer};

use crate::debounce::Token;
use crate::settings::SetupMessage;

fn simple_hash(s: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    format!("{:016x}", hash)
}

fn get_cache_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".cache")
            .join("streamflix")
            .join("images")
    })
}

/// TMDB sends `null` for some text fields it documents as strings.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub const BACKGROUND_BLACK: Color = Color::from_rgb(0.078, 0.078, 0.078);
pub const SURFACE_DARK_GRAY: Color = Color::from_rgb(0.141, 0.141, 0.141);
pub const NETFLIX_RED: Color = Color::from_rgb(0.898, 0.035, 0.078);
pub const TEXT_WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const TEXT_GRAY: Color = Color::from_rgb(0.702, 0.702, 0.702);

pub type MediaId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn path(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Item {
    pub id: MediaId,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
}

impl Item {
    pub fn kind(&self) -> MediaKind {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => MediaKind::Movie,
            _ => MediaKind::Tv,
        }
    }

    pub fn display_title(&self) -> &str {
        [&self.title, &self.name, &self.original_name]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    pub fn has_poster(&self) -> bool {
        self.poster_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_backdrop(&self) -> bool {
        self.backdrop_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Episode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub episode_number: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Season {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub season_number: u32,
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

impl Season {
    // Season records from the detail listing carry a count but no episodes.
    pub fn episode_total(&self) -> usize {
        if self.episodes.is_empty() {
            self.episode_count as usize
        } else {
            self.episodes.len()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_run_time: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seasons: Vec<Season>,
}

impl ItemDetail {
    pub fn runtime_minutes(&self) -> Option<u32> {
        self.runtime
            .filter(|minutes| *minutes > 0)
            .or_else(|| self.episode_run_time.first().copied())
    }

    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

impl From<Item> for ItemDetail {
    fn from(item: Item) -> Self {
        Self {
            item,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ListingPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Item>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl ListingPage {
    pub fn is_last(&self) -> bool {
        self.results.is_empty() || self.page >= self.total_pages
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    cache: HashMap<String, Handle>,
    pending: HashSet<String>,
    cache_directory: Option<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        let cache_directory = get_cache_dir();
        if let Some(ref dir) = cache_directory {
            if let Err(err) = std::fs::create_dir_all(dir) {
                tracing::warn!("failed to create image cache directory: {}", err);
            }
        }
        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            cache_directory,
        }
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.cache.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.pending.remove(&url);
        self.cache.insert(url, handle);
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.pending.insert(url);
    }

    pub fn clear_pending(&mut self, url: &str) {
        self.pending.remove(url);
    }

    pub fn wants(&self, url: &str) -> bool {
        self.get(url).is_none() && !self.is_pending(url)
    }

    pub fn get_cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_directory
            .as_ref()
            .map(|dir| dir.join(simple_hash(url)))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Setup(SetupMessage),
    SearchQueryChanged(String),
    SearchDebounced(Token),
    SearchPageLoaded(u64, ListingPage),
    MainScrolled { offset: f32, relative: f32 },
    LogoPressed,
    RowLoaded(usize, Vec<Item>),
    BannerLoaded(Option<Item>),
    OpenDetail(Item),
    DetailLoaded(u64, Option<ItemDetail>),
    SeasonsLoaded(u64, Vec<Season>),
    RecommendationsLoaded(u64, Vec<Item>),
    ToggleOverview,
    SelectSeason(u32),
    ModalBodyPressed,
    CloseDetail,
    DetailClosed(u64),
    LoadImage(String),
    ImageLoaded(String, Result<Handle, String>),
}

pub fn truncate_description(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}...", kept)
}
