use std::time::Duration;

use iced::widget::{column, container, mouse_area, text, Column, Row};
use iced::{Border, Color, Element, Length, Padding, Shadow};
use tracing::debug;

use crate::media::{Item, ListingPage, Message, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::tmdb::{CatalogSource, ImageSize};
use crate::Streamflix;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const LOAD_MORE_THRESHOLD: f32 = 0.95;

const CARDS_PER_ROW: usize = 6;
const MIN_FILLED_ROWS: usize = 2;
const POSTER_WIDTH: f32 = 180.0;
const POSTER_HEIGHT: f32 = 270.0;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    LoadingFirstPage { query: String },
    Loaded { query: String, page: u32, has_more: bool },
    LoadingNextPage { query: String, page: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub query: String,
    pub page: u32,
    pub generation: u64,
}

/// Paged search over one debounced query at a time.
///
/// Results of every page fetched for the active query are accumulated in order,
/// duplicates included. A new query or an empty one bumps the generation so that
/// responses still in flight for the previous query are dropped on arrival.
#[derive(Debug, Clone)]
pub struct SearchSession {
    state: SearchState,
    results: Vec<Item>,
    generation: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            state: SearchState::Idle,
            results: Vec::new(),
            generation: 0,
        }
    }
}

impl SearchSession {
    #[cfg(test)]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn results(&self) -> &[Item] {
        &self.results
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_query(&self) -> Option<&str> {
        match &self.state {
            SearchState::Idle => None,
            SearchState::LoadingFirstPage { query }
            | SearchState::Loaded { query, .. }
            | SearchState::LoadingNextPage { query, .. } => Some(query),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != SearchState::Idle
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.state, SearchState::LoadingFirstPage { .. })
    }

    pub fn has_more(&self) -> bool {
        match self.state {
            SearchState::Idle => false,
            SearchState::Loaded { has_more, .. } => has_more,
            SearchState::LoadingFirstPage { .. } | SearchState::LoadingNextPage { .. } => true,
        }
    }

    pub fn on_debounced_query(&mut self, query: &str) -> Option<PageRequest> {
        if query.trim().is_empty() {
            if self.is_active() {
                debug!("search cleared");
                self.generation += 1;
            }
            self.state = SearchState::Idle;
            self.results.clear();
            return None;
        }
        if self.active_query() == Some(query) {
            return None;
        }

        self.generation += 1;
        self.results.clear();
        self.state = SearchState::LoadingFirstPage {
            query: query.to_string(),
        };
        Some(PageRequest {
            query: query.to_string(),
            page: 1,
            generation: self.generation,
        })
    }

    pub fn load_more(&mut self) -> Option<PageRequest> {
        let SearchState::Loaded {
            query,
            page,
            has_more: true,
        } = &self.state
        else {
            return None;
        };
        let query = query.clone();
        let page = page + 1;
        self.state = SearchState::LoadingNextPage {
            query: query.clone(),
            page,
        };
        Some(PageRequest {
            query,
            page,
            generation: self.generation,
        })
    }

    pub fn on_page_loaded(&mut self, generation: u64, listing: ListingPage) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale search page");
            return false;
        }
        let (query, page) = match &self.state {
            SearchState::LoadingFirstPage { query } => (query.clone(), 1),
            SearchState::LoadingNextPage { query, page } => (query.clone(), *page),
            SearchState::Idle | SearchState::Loaded { .. } => return false,
        };

        let has_more = !listing.is_last();
        self.results.extend(listing.results);
        self.state = SearchState::Loaded {
            query,
            page,
            has_more,
        };
        true
    }

    pub fn visible_results(&self) -> impl Iterator<Item = &Item> {
        self.results.iter().filter(|item| item.has_poster())
    }

    // A grid too short to scroll never reaches the load-more threshold.
    pub fn fill_request(&mut self) -> Option<PageRequest> {
        if self.visible_results().count() >= MIN_FILLED_ROWS * CARDS_PER_ROW {
            return None;
        }
        self.load_more()
    }
}

pub fn near_end(relative_offset: f32) -> bool {
    relative_offset >= LOAD_MORE_THRESHOLD
}

pub async fn fetch_page<S: CatalogSource + ?Sized>(source: &S, request: PageRequest) -> (u64, ListingPage) {
    let listing = source.search(&request.query, request.page).await;
    (request.generation, listing)
}

impl Streamflix {
    pub fn view_search_page(&self) -> Element<'_, Message> {
        let content: Element<Message> = if self.search.is_searching() {
            self.view_search_message("Searching...")
        } else if self.search.results().is_empty() {
            self.view_search_message("No results")
        } else {
            let query = self.search.active_query().unwrap_or_default();
            let heading = text(format!("Results for '{}'", query))
                .size(24)
                .color(TEXT_WHITE)
                .font(iced::Font {
                    weight: iced::font::Weight::Bold,
                    ..Default::default()
                });

            let footer = if self.search.has_more() {
                text("Loading more...").size(16).color(TEXT_GRAY)
            } else {
                text("You have seen all results.")
                    .size(16)
                    .color(TEXT_GRAY)
                    .font(iced::Font {
                        weight: iced::font::Weight::Bold,
                        ..Default::default()
                    })
            };

            column![
                heading,
                self.view_search_results_grid(),
                container(footer).width(Length::Fill).center_x(Length::Fill)
            ]
            .spacing(24)
            .width(Length::Fill)
            .into()
        };

        container(content)
            .padding(Padding::new(100.0).left(48.0).right(48.0).bottom(48.0))
            .width(Length::Fill)
            .into()
    }

    fn view_search_message(&self, message: &str) -> Element<'_, Message> {
        container(text(message.to_string()).size(24).color(TEXT_GRAY))
            .width(Length::Fill)
            .height(Length::Fixed(300.0))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn view_search_results_grid(&self) -> Element<'_, Message> {
        let visible: Vec<&Item> = self.search.visible_results().collect();

        let rows: Vec<Element<Message>> = visible
            .chunks(CARDS_PER_ROW)
            .map(|chunk| {
                let cards: Vec<Element<Message>> = chunk
                    .iter()
                    .map(|item| self.view_search_result_card(item))
                    .collect();
                Row::with_children(cards)
                    .spacing(16)
                    .align_y(iced::Alignment::Start)
                    .into()
            })
            .collect();

        Column::with_children(rows)
            .spacing(16)
            .width(Length::Fill)
            .into()
    }

    fn view_search_result_card(&self, item: &Item) -> Element<'_, Message> {
        let poster = self.view_artwork(
            item.poster_path.as_deref(),
            ImageSize::Poster,
            POSTER_WIDTH,
            POSTER_HEIGHT,
        );

        let card = container(poster)
            .width(Length::Fixed(POSTER_WIDTH))
            .height(Length::Fixed(POSTER_HEIGHT))
            .style(|_| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    radius: 4.0.into(),
                    ..Default::default()
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.3),
                    offset: iced::Vector::new(0.0, 4.0),
                    blur_radius: 8.0,
                },
                ..Default::default()
            });

        mouse_area(card)
            .on_press(Message::OpenDetail(item.clone()))
            .into()
    }
}
