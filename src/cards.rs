use iced::widget::{column, container, mouse_area, scrollable, text, Column, Row};
use iced::{Border, Color, Element, Length, Shadow};

use crate::catalog::CatalogRow;
use crate::components::hidden_scrollbar_style;
use crate::media::{Item, Message, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::tmdb::ImageSize;
use crate::Streamflix;

const ICON_FILM: char = '\u{F3A9}';

const LARGE_CARD_WIDTH: f32 = 167.0;
const LARGE_CARD_HEIGHT: f32 = 250.0;
const CARD_WIDTH: f32 = 178.0;
const CARD_HEIGHT: f32 = 100.0;

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

impl Streamflix {
    pub fn view_catalog_rows(&self) -> Element<'_, Message> {
        let rows: Vec<Element<Message>> = self
            .rows
            .iter()
            .map(|catalog_row| self.view_catalog_row(catalog_row))
            .collect();

        Column::with_children(rows)
            .spacing(32)
            .padding(iced::Padding::new(32.0).left(24.0).right(24.0).top(0.0))
            .width(Length::Fill)
            .into()
    }

    fn view_catalog_row<'a>(&'a self, catalog_row: &'a CatalogRow) -> Element<'a, Message> {
        let title = text(catalog_row.title.as_str())
            .size(22)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        let cards: Vec<Element<Message>> = catalog_row
            .displayable()
            .map(|item| self.view_row_card(catalog_row, item))
            .collect();

        let cards_row = Row::with_children(cards)
            .spacing(10)
            .align_y(iced::Alignment::Start);

        let scrollable_cards = scrollable(cards_row)
            .direction(scrollable::Direction::Horizontal(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .style(hidden_scrollbar_style);

        column![title, scrollable_cards]
            .spacing(12)
            .width(Length::Fill)
            .into()
    }

    fn view_row_card<'a>(&'a self, catalog_row: &CatalogRow, item: &'a Item) -> Element<'a, Message> {
        let (width, height) = if catalog_row.large {
            (LARGE_CARD_WIDTH, LARGE_CARD_HEIGHT)
        } else {
            (CARD_WIDTH, CARD_HEIGHT)
        };
        let artwork = match catalog_row.artwork(item) {
            Some((path, size)) => self.view_artwork(Some(path), size, width, height),
            None => self.view_card_placeholder(width, height),
        };

        let card = container(artwork)
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 4.0.into(),
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

    pub fn view_artwork(
        &self,
        path: Option<&str>,
        size: ImageSize,
        width: f32,
        height: f32,
    ) -> Element<'_, Message> {
        let handle = path.and_then(|path| {
            let client = self.tmdb_client.as_ref()?;
            self.image_cache.get(&client.image_url(path, size))
        });

        match handle {
            Some(h) => iced::widget::image(h.clone())
                .width(Length::Fixed(width))
                .height(Length::Fixed(height))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => self.view_card_placeholder(width, height),
        }
    }

    pub fn view_card_placeholder(&self, width: f32, height: f32) -> Element<'_, Message> {
        let icon_size = (height / 3.0).clamp(16.0, 48.0);
        container(icon(ICON_FILM).size(icon_size).color(TEXT_GRAY))
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            })
            .into()
    }
}
