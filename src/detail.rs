use std::fmt;
use std::time::Duration;

use iced::futures::future::join_all;
use tracing::debug;

use crate::media::{Episode, Item, ItemDetail, MediaId, MediaKind, Season};
use crate::tmdb::CatalogSource;

pub const CLOSE_DELAY: Duration = Duration::from_millis(300);
pub const OVERVIEW_LIMIT: usize = 100;
const DEFAULT_SEASON: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum ModalPhase {
    Hidden,
    Loading,
    Ready(Box<ItemDetail>),
    Closing(Option<Box<ItemDetail>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewToggle {
    More,
    Less,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailLoad {
    pub id: MediaId,
    pub kind: MediaKind,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonsLoad {
    pub tv_id: MediaId,
    pub season_numbers: Vec<u32>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonOption {
    pub number: u32,
    pub label: String,
}

impl fmt::Display for SeasonOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone)]
pub struct DetailModal {
    item: Option<Item>,
    generation: u64,
    phase: ModalPhase,
    seasons: Vec<Season>,
    recommendations: Vec<Item>,
    overview_expanded: bool,
    selected_season: u32,
}

impl Default for DetailModal {
    fn default() -> Self {
        Self {
            item: None,
            generation: 0,
            phase: ModalPhase::Hidden,
            seasons: Vec::new(),
            recommendations: Vec::new(),
            overview_expanded: false,
            selected_season: DEFAULT_SEASON,
        }
    }
}

impl DetailModal {
    pub fn is_open(&self) -> bool {
        self.phase != ModalPhase::Hidden
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.phase, ModalPhase::Closing(_))
    }

    pub fn phase(&self) -> &ModalPhase {
        &self.phase
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn detail(&self) -> Option<&ItemDetail> {
        match &self.phase {
            ModalPhase::Ready(detail) | ModalPhase::Closing(Some(detail)) => Some(&**detail),
            _ => None,
        }
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    pub fn select(&mut self, item: Item) -> Option<DetailLoad> {
        if self.is_closing() {
            return None;
        }
        self.generation += 1;
        let load = DetailLoad {
            id: item.id,
            kind: item.kind(),
            generation: self.generation,
        };
        debug!(id = item.id, kind = ?load.kind, "opening detail");

        self.item = Some(item);
        self.phase = ModalPhase::Loading;
        self.seasons.clear();
        self.recommendations.clear();
        self.overview_expanded = false;
        self.selected_season = DEFAULT_SEASON;
        Some(load)
    }

    pub fn on_detail_loaded(
        &mut self,
        generation: u64,
        detail: Option<ItemDetail>,
    ) -> Option<SeasonsLoad> {
        if generation != self.generation || self.phase != ModalPhase::Loading {
            return None;
        }
        let item = self.item.clone()?;
        let kind = item.kind();
        let detail = detail.unwrap_or_else(|| ItemDetail::from(item));

        let season_numbers: Vec<u32> = detail
            .seasons
            .iter()
            .map(|season| season.season_number)
            .filter(|number| *number > 0)
            .collect();
        let tv_id = detail.item.id;
        self.phase = ModalPhase::Ready(Box::new(detail));

        (kind == MediaKind::Tv && !season_numbers.is_empty()).then_some(SeasonsLoad {
            tv_id,
            season_numbers,
            generation,
        })
    }

    pub fn on_seasons_loaded(&mut self, generation: u64, mut seasons: Vec<Season>) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        seasons.sort_by_key(|season| season.season_number);
        self.seasons = seasons;
        true
    }

    pub fn on_recommendations_loaded(&mut self, generation: u64, items: Vec<Item>) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.recommendations = items;
        true
    }

    fn accepts(&self, generation: u64) -> bool {
        generation == self.generation
            && matches!(self.phase, ModalPhase::Loading | ModalPhase::Ready(_))
    }

    pub fn begin_close(&mut self) -> Option<u64> {
        let shown = match std::mem::replace(&mut self.phase, ModalPhase::Hidden) {
            ModalPhase::Loading => None,
            ModalPhase::Ready(detail) => Some(detail),
            other => {
                self.phase = other;
                return None;
            }
        };
        self.generation += 1;
        self.phase = ModalPhase::Closing(shown);
        Some(self.generation)
    }

    pub fn finish_close(&mut self, token: u64) -> bool {
        if token != self.generation || !self.is_closing() {
            return false;
        }
        self.phase = ModalPhase::Hidden;
        self.item = None;
        self.seasons.clear();
        self.recommendations.clear();
        self.overview_expanded = false;
        self.selected_season = DEFAULT_SEASON;
        true
    }

    pub fn toggle_overview(&mut self) {
        self.overview_expanded = !self.overview_expanded;
    }

    pub fn overview(&self) -> (String, Option<OverviewToggle>) {
        let full = match (self.detail(), &self.item) {
            (Some(detail), _) if !detail.item.overview.is_empty() => detail.item.overview.as_str(),
            (_, Some(item)) => item.overview.as_str(),
            _ => "",
        };
        if full.chars().count() <= OVERVIEW_LIMIT {
            return (full.to_string(), None);
        }
        if self.overview_expanded {
            return (full.to_string(), Some(OverviewToggle::Less));
        }
        let head: String = full.chars().take(OVERVIEW_LIMIT).collect();
        (format!("{}... ", head), Some(OverviewToggle::More))
    }

    pub fn select_season(&mut self, number: u32) {
        self.selected_season = number;
    }

    pub fn selected_season(&self) -> u32 {
        self.selected_season
    }

    pub fn season_options(&self) -> Vec<SeasonOption> {
        self.seasons
            .iter()
            .map(|season| SeasonOption {
                number: season.season_number,
                label: format!("{} ({} Episodes)", season.name, season.episode_total()),
            })
            .collect()
    }

    pub fn selected_episodes(&self) -> &[Episode] {
        self.seasons
            .iter()
            .find(|season| season.season_number == self.selected_season)
            .map(|season| season.episodes.as_slice())
            .unwrap_or_default()
    }

    pub fn visible_recommendations(&self) -> impl Iterator<Item = &Item> {
        self.recommendations.iter().filter(|item| item.has_backdrop())
    }
}

pub fn metadata_line(detail: &ItemDetail) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(rating) = detail.vote_average.filter(|r| *r > 0.0) {
        parts.push(format!("{:.1}", rating));
    }
    if let Some(minutes) = detail.runtime_minutes() {
        parts.push(format!("{} min", minutes));
    }
    let genres = detail.genre_names();
    if !genres.is_empty() {
        parts.push(genres);
    }
    parts
}

pub async fn fetch_detail<S: CatalogSource + ?Sized>(
    source: &S,
    load: DetailLoad,
) -> (u64, Option<ItemDetail>) {
    (load.generation, source.detail(load.id, load.kind).await)
}

pub async fn fetch_seasons<S: CatalogSource + ?Sized>(
    source: &S,
    load: SeasonsLoad,
) -> (u64, Vec<Season>) {
    let requests = load
        .season_numbers
        .iter()
        .map(|number| source.season(load.tv_id, *number));
    let seasons = join_all(requests).await.into_iter().flatten().collect();
    (load.generation, seasons)
}

pub async fn fetch_recommendations<S: CatalogSource + ?Sized>(
    source: &S,
    load: DetailLoad,
) -> (u64, Vec<Item>) {
    (load.generation, source.recommendations(load.id, load.kind).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::fake::FakeCatalog;

    fn movie(id: u64) -> Item {
        Item {
            id,
            title: Some(format!("Movie {id}")),
            backdrop_path: Some(format!("/b{id}.jpg")),
            overview: String::from("short"),
            ..Default::default()
        }
    }

    fn series(id: u64) -> Item {
        Item {
            id,
            name: Some(format!("Show {id}")),
            ..Default::default()
        }
    }

    fn season(number: u32, episodes: usize) -> Season {
        Season {
            name: format!("Season {number}"),
            season_number: number,
            episode_count: episodes as u32,
            episodes: (1..=episodes as u32)
                .map(|n| Episode {
                    name: format!("Episode {n}"),
                    episode_number: n,
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn series_detail(id: u64, numbers: &[u32]) -> ItemDetail {
        ItemDetail {
            item: series(id),
            seasons: numbers.iter().map(|n| season(*n, 0)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn select_infers_kind_and_resets_state() {
        let mut modal = DetailModal::default();
        let load = modal.select(series(4)).expect("load issued");
        assert_eq!(load.kind, MediaKind::Tv);

        modal.on_detail_loaded(load.generation, Some(series_detail(4, &[1])));
        modal.on_seasons_loaded(load.generation, vec![season(1, 3)]);
        modal.toggle_overview();
        modal.select_season(2);

        let load = modal.select(movie(9)).expect("load issued");
        assert_eq!(load.kind, MediaKind::Movie);
        assert_eq!(modal.phase(), &ModalPhase::Loading);
        assert!(modal.seasons().is_empty());
        assert_eq!(modal.selected_season(), 1);
        assert_eq!(modal.overview().1, None);
    }

    #[test]
    fn series_fetches_seasons_except_specials() {
        let mut modal = DetailModal::default();
        let load = modal.select(series(1)).expect("load issued");
        let seasons = modal
            .on_detail_loaded(load.generation, Some(series_detail(1, &[0, 1, 2])))
            .expect("seasons requested");

        assert_eq!(seasons.season_numbers, vec![1, 2]);
        assert_eq!(seasons.tv_id, 1);
    }

    #[test]
    fn movie_does_not_fetch_seasons() {
        let mut modal = DetailModal::default();
        let load = modal.select(movie(1)).expect("load issued");
        let detail = ItemDetail::from(movie(1));
        assert_eq!(modal.on_detail_loaded(load.generation, Some(detail)), None);
        assert!(modal.detail().is_some());
    }

    #[test]
    fn missing_detail_falls_back_to_item() {
        let mut modal = DetailModal::default();
        let load = modal.select(movie(3)).expect("load issued");
        modal.on_detail_loaded(load.generation, None);
        assert_eq!(modal.detail().map(|d| d.item.id), Some(3));
    }

    #[test]
    fn recommendation_replaces_detail_without_closing() {
        let mut modal = DetailModal::default();
        let first = modal.select(movie(1)).expect("load issued");
        modal.on_detail_loaded(first.generation, Some(ItemDetail::from(movie(1))));

        let second = modal.select(movie(2)).expect("load issued");
        assert!(modal.is_open());
        assert!(!modal.is_closing());

        // late answers for the first item are ignored
        assert!(!modal.on_recommendations_loaded(first.generation, vec![movie(7)]));
        modal.on_detail_loaded(second.generation, Some(ItemDetail::from(movie(2))));
        assert_eq!(modal.detail().map(|d| d.item.id), Some(2));
    }

    #[test]
    fn close_is_idempotent_and_token_guarded() {
        let mut modal = DetailModal::default();
        assert_eq!(modal.begin_close(), None);

        let load = modal.select(movie(1)).expect("load issued");
        modal.on_detail_loaded(load.generation, Some(ItemDetail::from(movie(1))));

        let token = modal.begin_close().expect("close started");
        assert_eq!(modal.begin_close(), None);
        assert!(modal.is_closing());
        assert!(modal.detail().is_some());
        assert_eq!(modal.select(movie(2)), None);

        assert!(!modal.finish_close(token + 1));
        assert!(modal.finish_close(token));
        assert!(!modal.is_open());
        assert_eq!(modal.item(), None);
    }

    #[test]
    fn responses_after_close_are_dropped() {
        let mut modal = DetailModal::default();
        let load = modal.select(movie(1)).expect("load issued");
        let token = modal.begin_close().expect("close started");

        assert_eq!(modal.on_detail_loaded(load.generation, None), None);
        assert!(!modal.on_recommendations_loaded(load.generation, vec![movie(2)]));
        modal.finish_close(token);

        modal.select(movie(5));
        assert!(!modal.on_recommendations_loaded(load.generation, vec![movie(2)]));
    }

    #[test]
    fn long_overview_toggles() {
        let mut modal = DetailModal::default();
        let mut item = movie(1);
        item.overview = "가".repeat(150);
        modal.select(item);

        let (collapsed, toggle) = modal.overview();
        assert_eq!(toggle, Some(OverviewToggle::More));
        assert_eq!(collapsed.chars().count(), OVERVIEW_LIMIT + 4);
        assert!(collapsed.ends_with("... "));

        modal.toggle_overview();
        let (expanded, toggle) = modal.overview();
        assert_eq!(toggle, Some(OverviewToggle::Less));
        assert_eq!(expanded.chars().count(), 150);
    }

    #[test]
    fn season_picker_labels_and_episodes() {
        let mut modal = DetailModal::default();
        let load = modal.select(series(1)).expect("load issued");
        modal.on_detail_loaded(load.generation, Some(series_detail(1, &[1, 2])));
        modal.on_seasons_loaded(load.generation, vec![season(2, 1), season(1, 3)]);

        let labels: Vec<String> = modal.season_options().iter().map(|o| o.to_string()).collect();
        assert_eq!(labels, vec!["Season 1 (3 Episodes)", "Season 2 (1 Episodes)"]);
        assert_eq!(modal.selected_episodes().len(), 3);

        modal.select_season(2);
        assert_eq!(modal.selected_episodes().len(), 1);
        modal.select_season(9);
        assert!(modal.selected_episodes().is_empty());
    }

    #[test]
    fn recommendations_without_backdrop_are_hidden() {
        let mut modal = DetailModal::default();
        let load = modal.select(movie(1)).expect("load issued");
        let mut bare = movie(3);
        bare.backdrop_path = None;
        modal.on_recommendations_loaded(load.generation, vec![movie(2), bare]);

        let ids: Vec<u64> = modal.visible_recommendations().map(|i| i.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn metadata_formats_rating_runtime_genres() {
        let detail = ItemDetail {
            runtime: Some(125),
            vote_average: Some(7.456),
            genres: vec![
                crate::media::Genre { name: "Drama".into() },
                crate::media::Genre { name: "Crime".into() },
            ],
            ..Default::default()
        };
        assert_eq!(metadata_line(&detail), vec!["7.5", "125 min", "Drama / Crime"]);
        assert!(metadata_line(&ItemDetail::default()).is_empty());
    }

    #[tokio::test]
    async fn series_flow_loads_seasons_and_recommendations() {
        let mut fake = FakeCatalog::default();
        fake.details.insert(8, series_detail(8, &[0, 1, 2]));
        fake.seasons.insert((8, 1), season(1, 2));
        fake.recommendations.insert(8, vec![movie(20), movie(21)]);

        let mut modal = DetailModal::default();
        let load = modal.select(series(8)).expect("load issued");

        let (generation, detail) = fetch_detail(&fake, load).await;
        let seasons_load = modal
            .on_detail_loaded(generation, detail)
            .expect("seasons requested");
        let (generation, seasons) = fetch_seasons(&fake, seasons_load).await;
        assert!(modal.on_seasons_loaded(generation, seasons));
        let (generation, recs) = fetch_recommendations(&fake, load).await;
        assert!(modal.on_recommendations_loaded(generation, recs));

        // season 2 has no canned answer and is skipped
        assert_eq!(modal.seasons().len(), 1);
        assert_eq!(modal.visible_recommendations().count(), 2);

        let calls = fake.calls();
        assert!(calls.contains(&"detail tv 8".to_string()));
        assert!(calls.contains(&"season 8 1".to_string()));
        assert!(calls.contains(&"season 8 2".to_string()));
        assert!(!calls.contains(&"season 8 0".to_string()));
        assert!(calls.contains(&"recommendations tv 8".to_string()));
    }
}
