mod cards;
mod catalog;
mod components;
mod debounce;
mod detail;
mod detail_handlers;
mod detail_popup;
mod handlers;
mod hero;
mod media;
mod search;
mod settings;
mod tmdb;

use iced::widget::container;
use iced::{Element, Font, Length, Size, Task, Theme};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::{home_rows, load_row, CatalogRow};
use debounce::Debouncer;
use detail::DetailModal;
use media::{ImageCache, Item, Message, BACKGROUND_BLACK};
use search::{SearchSession, SEARCH_DEBOUNCE};
use settings::{AppSettings, SetupPage};
use tmdb::{ClientConfig, TmdbClient};

pub struct Streamflix {
    pub setup_page: Option<SetupPage>,
    pub tmdb_client: Option<TmdbClient>,
    pub image_cache: ImageCache,
    pub rows: Vec<CatalogRow>,
    pub banner: Option<Item>,
    pub search_input: Debouncer<String>,
    pub search: SearchSession,
    pub detail: DetailModal,
    pub main_scroll_offset: f32,
}

impl Default for Streamflix {
    fn default() -> Self {
        Self {
            setup_page: None,
            tmdb_client: None,
            image_cache: ImageCache::new(),
            rows: home_rows(),
            banner: None,
            search_input: Debouncer::new(String::new(), SEARCH_DEBOUNCE),
            search: SearchSession::default(),
            detail: DetailModal::default(),
            main_scroll_offset: 0.0,
        }
    }
}

impl Streamflix {
    fn new() -> (Self, Task<Message>) {
        let settings = AppSettings::load();
        if !settings.is_valid() {
            info!("no API key configured, showing setup");
            return (
                Self {
                    setup_page: Some(SetupPage::default()),
                    ..Default::default()
                },
                Task::none(),
            );
        }

        let mut app = Self::default();
        let task = app.initialize_with_settings(settings);
        (app, task)
    }

    fn initialize_with_settings(&mut self, settings: AppSettings) -> Task<Message> {
        let client = TmdbClient::new(ClientConfig::from_settings(&settings));
        self.tmdb_client = Some(client.clone());
        self.setup_page = None;

        let mut tasks: Vec<Task<Message>> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(index, catalog_row)| {
                let request = catalog_row.request()?;
                let row_client = client.clone();
                Some(Task::perform(
                    async move { load_row(&row_client, request).await },
                    move |items| Message::RowLoaded(index, items),
                ))
            })
            .collect();

        tasks.push(Task::perform(
            async move { hero::load_banner(&client).await },
            Message::BannerLoaded,
        ));
        Task::batch(tasks)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        if let Message::Setup(setup_msg) = message {
            if let Some(ref mut setup) = self.setup_page {
                if let Some(settings) = setup.update(setup_msg) {
                    return self.initialize_with_settings(settings);
                }
            }
            return Task::none();
        }
        handlers::handle_message(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        if let Some(ref setup) = self.setup_page {
            return setup.view().map(Message::Setup);
        }

        let main_content = container(self.view_main_content())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            });

        if self.detail.is_open() {
            return iced::widget::stack![main_content, self.view_detail_overlay()]
                .width(Length::Fill)
                .height(Length::Fill)
                .into();
        }

        main_content.into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    iced::application(Streamflix::new, Streamflix::update, Streamflix::view)
        .title("Streamflix")
        .theme(Streamflix::theme)
        .window_size(Size::new(1280.0, 720.0))
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .default_font(Font::DEFAULT)
        .run()
}
