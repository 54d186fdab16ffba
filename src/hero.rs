use iced::widget::{button, column, container, row, text, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::media::{truncate_description, Item, Message, SURFACE_DARK_GRAY, TEXT_WHITE};
use crate::tmdb::{requests, CatalogSource, ImageSize};
use crate::Streamflix;

pub const HERO_HEIGHT: f32 = 620.0;
const DESCRIPTION_LIMIT: usize = 150;
const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_PLUS_LG: char = '\u{F64D}';

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn pick_featured<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Option<Item> {
    items.choose(rng).cloned()
}

pub async fn load_banner<S: CatalogSource + ?Sized>(source: &S) -> Option<Item> {
    let listing = source.listing(requests::NETFLIX_ORIGINALS).await;
    pick_featured(&listing.results, &mut rand::thread_rng())
}

impl Streamflix {
    pub fn view_hero_section(&self) -> Element<'_, Message> {
        match &self.banner {
            Some(item) => self.view_hero_with_content(item),
            None => self.view_hero_backdrop_placeholder(),
        }
    }

    fn view_hero_with_content<'a>(&'a self, item: &'a Item) -> Element<'a, Message> {
        let hero_title = text(item.display_title().to_string())
            .size(48)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        let button_row = row![self.view_hero_play_button(item), self.view_hero_list_button()]
            .spacing(12)
            .align_y(iced::Alignment::Center);

        let hero_description = container(
            text(truncate_description(&item.overview, DESCRIPTION_LIMIT))
                .size(16)
                .color(TEXT_WHITE)
                .wrapping(text::Wrapping::Word),
        )
        .max_width(460.0);

        let hero_text_content = column![hero_title, button_row, hero_description]
            .spacing(20)
            .padding(Padding::new(64.0).left(48.0).right(48.0));

        let hero_left_gradient = container(hero_text_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_y(iced::alignment::Vertical::Center)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(0.0)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.9))
                        .add_stop(0.4, Color::from_rgba(0.0, 0.0, 0.0, 0.5))
                        .add_stop(0.8, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        // fades into the rows below
        let hero_bottom_fade = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::TRANSPARENT)
                        .add_stop(0.85, Color::TRANSPARENT)
                        .add_stop(1.0, Color::from_rgb(0.078, 0.078, 0.078)),
                ))),
                ..Default::default()
            });

        iced::widget::stack![
            self.view_hero_backdrop(item),
            hero_bottom_fade,
            hero_left_gradient
        ]
        .width(Length::Fill)
        .height(Length::Fixed(HERO_HEIGHT))
        .into()
    }

    fn view_hero_backdrop(&self, item: &Item) -> Element<'_, Message> {
        let Some(backdrop_path) = &item.backdrop_path else {
            return self.view_hero_backdrop_placeholder();
        };
        let Some(client) = &self.tmdb_client else {
            return self.view_hero_backdrop_placeholder();
        };
        let image_url = client.image_url(backdrop_path, ImageSize::Original);
        let Some(handle) = self.image_cache.get(&image_url) else {
            return self.view_hero_backdrop_placeholder();
        };
        iced::widget::image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(HERO_HEIGHT))
            .content_fit(iced::ContentFit::Cover)
            .into()
    }

    fn view_hero_backdrop_placeholder(&self) -> Element<'_, Message> {
        container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fixed(HERO_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            })
            .into()
    }

    fn view_hero_play_button(&self, item: &Item) -> Element<'_, Message> {
        hero_button(ICON_PLAY_FILL, "Play")
            .on_press(Message::OpenDetail(item.clone()))
            .into()
    }

    fn view_hero_list_button(&self) -> Element<'_, Message> {
        hero_button(ICON_PLUS_LG, "My List").into()
    }
}

fn hero_button<'a>(icon_char: char, label: &'a str) -> iced::widget::Button<'a, Message> {
    button(
        row![
            icon(icon_char).size(14).color(TEXT_WHITE),
            text(label).size(16).color(TEXT_WHITE)
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center),
    )
    .padding(Padding::new(10.0).left(28.0).right(28.0))
    .style(|_theme, status| {
        let background_color = match status {
            button::Status::Hovered => Color::from_rgba(0.9, 0.9, 0.9, 0.9),
            _ => Color::from_rgba(0.2, 0.2, 0.2, 0.5),
        };
        let text_color = match status {
            button::Status::Hovered => Color::BLACK,
            _ => TEXT_WHITE,
        };
        button::Style {
            background: Some(iced::Background::Color(background_color)),
            text_color,
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 4.0.into(),
            },
            shadow: Shadow::default(),
            snap: false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ListingPage;
    use crate::tmdb::fake::FakeCatalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn show(id: u64) -> Item {
        Item {
            id,
            name: Some(format!("Show {id}")),
            ..Default::default()
        }
    }

    #[test]
    fn pick_from_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_featured(&[], &mut rng), None);
    }

    #[test]
    fn pick_reaches_every_item() {
        let items: Vec<Item> = (1..=3).map(show).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let picked = pick_featured(&items, &mut rng).expect("non-empty");
            seen.insert(picked.id);
        }
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn banner_comes_from_originals() {
        let mut fake = FakeCatalog::default();
        fake.listings.insert(
            requests::NETFLIX_ORIGINALS.path,
            ListingPage {
                results: vec![show(66)],
                page: 1,
                total_pages: 1,
            },
        );

        let banner = load_banner(&fake).await;

        assert_eq!(banner.map(|item| item.id), Some(66));
        assert_eq!(fake.calls(), vec!["listing /discover/tv".to_string()]);
    }

    #[tokio::test]
    async fn failed_listing_leaves_no_banner() {
        let fake = FakeCatalog::default();
        assert_eq!(load_banner(&fake).await, None);
    }
}
