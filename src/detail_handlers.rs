use iced::Task;
use tracing::debug;

use crate::detail::{self, CLOSE_DELAY};
use crate::handlers::load_images;
use crate::media::{Item, ItemDetail, Message, Season};
use crate::tmdb::ImageSize;
use crate::Streamflix;

pub fn handle_open_detail(app: &mut Streamflix, item: Item) -> Task<Message> {
    let Some(load) = app.detail.select(item) else {
        return Task::none();
    };
    let Some(client) = app.tmdb_client.clone() else {
        return Task::none();
    };

    let detail_client = client.clone();
    Task::batch([
        Task::perform(
            async move { detail::fetch_detail(&detail_client, load).await },
            |(generation, detail)| Message::DetailLoaded(generation, detail),
        ),
        Task::perform(
            async move { detail::fetch_recommendations(&client, load).await },
            |(generation, items)| Message::RecommendationsLoaded(generation, items),
        ),
    ])
}

pub fn handle_detail_loaded(
    app: &mut Streamflix,
    generation: u64,
    detail: Option<ItemDetail>,
) -> Task<Message> {
    let seasons_load = app.detail.on_detail_loaded(generation, detail);

    let backdrop = app
        .detail
        .detail()
        .and_then(|detail| detail.item.backdrop_path.as_deref())
        .map(|path| (path, ImageSize::Original));
    let load_backdrop = load_images(app, backdrop);

    let Some(seasons_load) = seasons_load else {
        return load_backdrop;
    };
    let Some(client) = app.tmdb_client.clone() else {
        return load_backdrop;
    };
    debug!(tv_id = seasons_load.tv_id, seasons = seasons_load.season_numbers.len(), "fetching seasons");

    Task::batch([
        load_backdrop,
        Task::perform(
            async move { detail::fetch_seasons(&client, seasons_load).await },
            |(generation, seasons)| Message::SeasonsLoaded(generation, seasons),
        ),
    ])
}

pub fn handle_seasons_loaded(
    app: &mut Streamflix,
    generation: u64,
    seasons: Vec<Season>,
) -> Task<Message> {
    if !app.detail.on_seasons_loaded(generation, seasons) {
        return Task::none();
    }
    load_episode_stills(app)
}

pub fn handle_recommendations_loaded(
    app: &mut Streamflix,
    generation: u64,
    items: Vec<Item>,
) -> Task<Message> {
    if !app.detail.on_recommendations_loaded(generation, items) {
        return Task::none();
    }
    let backdrops: Vec<(&str, ImageSize)> = app
        .detail
        .visible_recommendations()
        .filter_map(|item| item.backdrop_path.as_deref())
        .map(|path| (path, ImageSize::Poster))
        .collect();
    load_images(app, backdrops)
}

pub fn handle_select_season(app: &mut Streamflix, number: u32) -> Task<Message> {
    app.detail.select_season(number);
    load_episode_stills(app)
}

fn load_episode_stills(app: &Streamflix) -> Task<Message> {
    let stills: Vec<(&str, ImageSize)> = app
        .detail
        .selected_episodes()
        .iter()
        .filter_map(|episode| episode.still_path.as_deref())
        .map(|path| (path, ImageSize::Poster))
        .collect();
    load_images(app, stills)
}

pub fn handle_close_detail(app: &mut Streamflix) -> Task<Message> {
    let Some(token) = app.detail.begin_close() else {
        return Task::none();
    };
    Task::perform(
        async { tokio::time::sleep(CLOSE_DELAY).await },
        move |_| Message::DetailClosed(token),
    )
}

pub fn handle_detail_closed(app: &mut Streamflix, token: u64) -> Task<Message> {
    if !app.detail.finish_close(token) {
        debug!(token, "ignoring stale close");
    }
    Task::none()
}
