use iced::widget::{operation, scrollable};
use iced::Task;
use tracing::{debug, warn};

use crate::components::MAIN_SCROLLABLE;
use crate::debounce::Token;
use crate::detail_handlers;
use crate::media::{Item, ListingPage, Message};
use crate::search::{self, PageRequest};
use crate::tmdb::{fetch_image_bytes, ImageSize};
use crate::Streamflix;

pub fn handle_message(app: &mut Streamflix, message: Message) -> Task<Message> {
    match message {
        Message::Setup(_) => Task::none(),
        Message::SearchQueryChanged(query) => handle_search_query_changed(app, query),
        Message::SearchDebounced(token) => handle_search_debounced(app, token),
        Message::SearchPageLoaded(generation, listing) => {
            handle_search_page_loaded(app, generation, listing)
        }
        Message::MainScrolled { offset, relative } => handle_main_scrolled(app, offset, relative),
        Message::LogoPressed => handle_logo_pressed(app),
        Message::RowLoaded(index, items) => handle_row_loaded(app, index, items),
        Message::BannerLoaded(banner) => handle_banner_loaded(app, banner),
        Message::OpenDetail(item) => detail_handlers::handle_open_detail(app, item),
        Message::DetailLoaded(generation, detail) => {
            detail_handlers::handle_detail_loaded(app, generation, detail)
        }
        Message::SeasonsLoaded(generation, seasons) => {
            detail_handlers::handle_seasons_loaded(app, generation, seasons)
        }
        Message::RecommendationsLoaded(generation, items) => {
            detail_handlers::handle_recommendations_loaded(app, generation, items)
        }
        Message::ToggleOverview => {
            app.detail.toggle_overview();
            Task::none()
        }
        Message::SelectSeason(number) => detail_handlers::handle_select_season(app, number),
        // Swallows clicks inside the popup so they never reach the backdrop.
        Message::ModalBodyPressed => Task::none(),
        Message::CloseDetail => detail_handlers::handle_close_detail(app),
        Message::DetailClosed(token) => detail_handlers::handle_detail_closed(app, token),
        Message::LoadImage(url) => handle_load_image(app, url),
        Message::ImageLoaded(url, result) => handle_image_loaded(app, url, result),
    }
}

pub fn load_images<'a>(
    app: &Streamflix,
    paths: impl IntoIterator<Item = (&'a str, ImageSize)>,
) -> Task<Message> {
    let Some(client) = &app.tmdb_client else {
        return Task::none();
    };
    let tasks: Vec<Task<Message>> = paths
        .into_iter()
        .map(|(path, size)| client.image_url(path, size))
        .filter(|url| app.image_cache.wants(url))
        .map(|url| Task::done(Message::LoadImage(url)))
        .collect();
    Task::batch(tasks)
}

fn scroll_to_top(app: &mut Streamflix) -> Task<Message> {
    app.main_scroll_offset = 0.0;
    operation::scroll_to(
        iced::widget::Id::new(MAIN_SCROLLABLE),
        scrollable::AbsoluteOffset { x: 0.0, y: 0.0 },
    )
}

fn handle_search_query_changed(app: &mut Streamflix, query: String) -> Task<Message> {
    let Some(token) = app.search_input.set(query) else {
        return Task::none();
    };
    Task::perform(app.search_input.timer(token), Message::SearchDebounced)
}

fn handle_search_debounced(app: &mut Streamflix, token: Token) -> Task<Message> {
    let Some(query) = app.search_input.fire(token).cloned() else {
        return Task::none();
    };
    apply_search_query(app, &query)
}

fn apply_search_query(app: &mut Streamflix, query: &str) -> Task<Message> {
    let was_active = app.search.is_active();
    let previous_generation = app.search.generation();
    let request = app.search.on_debounced_query(query);

    let mut tasks = Vec::new();
    if was_active != app.search.is_active() || previous_generation != app.search.generation() {
        tasks.push(scroll_to_top(app));
    }
    if let Some(request) = request {
        tasks.push(fetch_search_page(app, request));
    }
    Task::batch(tasks)
}

fn fetch_search_page(app: &Streamflix, request: PageRequest) -> Task<Message> {
    let Some(client) = app.tmdb_client.clone() else {
        return Task::none();
    };
    Task::perform(
        async move { search::fetch_page(&client, request).await },
        |(generation, listing)| Message::SearchPageLoaded(generation, listing),
    )
}

fn handle_search_page_loaded(
    app: &mut Streamflix,
    generation: u64,
    listing: ListingPage,
) -> Task<Message> {
    if !app.search.on_page_loaded(generation, listing) {
        return Task::none();
    }
    let posters: Vec<(&str, ImageSize)> = app
        .search
        .visible_results()
        .filter_map(|item| item.poster_path.as_deref())
        .map(|path| (path, ImageSize::Poster))
        .collect();
    let load_posters = load_images(app, posters);

    match app.search.fill_request() {
        Some(request) => Task::batch([load_posters, fetch_search_page(app, request)]),
        None => load_posters,
    }
}

fn handle_main_scrolled(app: &mut Streamflix, offset: f32, relative: f32) -> Task<Message> {
    app.main_scroll_offset = offset;
    if !app.search.is_active() || !search::near_end(relative) {
        return Task::none();
    }
    match app.search.load_more() {
        Some(request) => fetch_search_page(app, request),
        None => Task::none(),
    }
}

fn handle_logo_pressed(app: &mut Streamflix) -> Task<Message> {
    app.search_input.reset(String::new());
    apply_search_query(app, "")
}

fn handle_row_loaded(app: &mut Streamflix, index: usize, items: Vec<Item>) -> Task<Message> {
    let Some(catalog_row) = app.rows.get_mut(index) else {
        warn!(index, "row loaded for unknown index");
        return Task::none();
    };
    catalog_row.set_items(items);

    let catalog_row = &app.rows[index];
    let artwork: Vec<(&str, ImageSize)> = catalog_row
        .displayable()
        .filter_map(|item| catalog_row.artwork(item))
        .collect();
    load_images(app, artwork)
}

fn handle_banner_loaded(app: &mut Streamflix, banner: Option<Item>) -> Task<Message> {
    app.banner = banner;
    let backdrop = app
        .banner
        .as_ref()
        .and_then(|item| item.backdrop_path.as_deref())
        .map(|path| (path, ImageSize::Original));
    load_images(app, backdrop)
}

fn handle_load_image(app: &mut Streamflix, url: String) -> Task<Message> {
    if !app.image_cache.wants(&url) {
        return Task::none();
    }
    app.image_cache.mark_pending(url.clone());
    let cache_path = app.image_cache.get_cache_path(&url);

    Task::perform(
        async move {
            if let Some(path) = &cache_path {
                if let Ok(bytes) = tokio::fs::read(path).await {
                    return (url, Ok(bytes));
                }
            }
            let result = fetch_image_bytes(url.clone()).await;
            if let (Ok(bytes), Some(path)) = (&result, &cache_path) {
                if let Err(err) = tokio::fs::write(path, bytes).await {
                    warn!("failed to write image cache {}: {}", path.display(), err);
                }
            }
            (url, result)
        },
        |(url, result)| {
            let handle = result.map(iced::widget::image::Handle::from_bytes);
            Message::ImageLoaded(url, handle)
        },
    )
}

fn handle_image_loaded(
    app: &mut Streamflix,
    url: String,
    result: Result<iced::widget::image::Handle, String>,
) -> Task<Message> {
    match result {
        Ok(handle) => app.image_cache.insert(url, handle),
        Err(error) => {
            debug!("image {} failed: {}", url, error);
            app.image_cache.clear_pending(&url);
        }
    }
    Task::none()
}
