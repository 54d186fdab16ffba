use iced::widget::{
    button, column, container, mouse_area, pick_list, row, scrollable, text, Column, Row, Space,
};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::hidden_scrollbar_style;
use crate::detail::{metadata_line, ModalPhase, OverviewToggle};
use crate::media::{
    Episode, Item, ItemDetail, Message, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::tmdb::ImageSize;
use crate::Streamflix;

const POPUP_WIDTH: f32 = 880.0;
const MINI_HERO_HEIGHT: f32 = 400.0;
const STILL_WIDTH: f32 = 160.0;
const STILL_HEIGHT: f32 = 90.0;
const RECOMMENDATION_WIDTH: f32 = 250.0;
const RECOMMENDATIONS_PER_ROW: usize = 3;

const ICON_X_LG: char = '\u{F659}';
const ICON_FILM: char = '\u{F3A9}';

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

fn bold(content: String, size: u32) -> iced::widget::Text<'static> {
    text(content).size(size).color(TEXT_WHITE).font(iced::Font {
        weight: iced::font::Weight::Bold,
        ..Default::default()
    })
}

fn popup_container_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(Color::from_rgb(
            0.078, 0.078, 0.078,
        ))),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: 8.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
            offset: iced::Vector::new(0.0, 25.0),
            blur_radius: 50.0,
        },
        ..Default::default()
    }
}

fn skeleton_block(width: Length, height: f32) -> Element<'static, Message> {
    container(Space::new().width(width).height(height))
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(Color::from_rgb(0.15, 0.15, 0.15))),
            border: Border {
                radius: 4.0.into(),
                ..Default::default()
            },
            ..Default::default()
        })
        .into()
}

impl Streamflix {
    pub fn view_detail_overlay(&self) -> Element<'_, Message> {
        let closing = self.detail.is_closing();
        let body = match self.detail.phase() {
            ModalPhase::Ready(detail) | ModalPhase::Closing(Some(detail)) => {
                self.view_detail_content(detail)
            }
            _ => self.view_detail_loading(),
        };

        let popup_with_close = iced::widget::stack![body, self.view_detail_close_button()]
            .width(Length::Fixed(POPUP_WIDTH))
            .height(Length::Fill);

        let popup = container(popup_with_close)
            .max_width(POPUP_WIDTH)
            .clip(true)
            .style(popup_container_style);

        // swallows clicks so that only the backdrop closes the modal
        let popup_mouse_area = mouse_area(popup).on_press(Message::ModalBodyPressed);

        let backdrop_alpha = if closing { 0.3 } else { 0.8 };
        let overlay_bg = mouse_area(
            container(Space::new().width(Length::Fill).height(Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(move |_theme| container::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        0.0,
                        0.0,
                        0.0,
                        backdrop_alpha,
                    ))),
                    ..Default::default()
                }),
        )
        .on_press(Message::CloseDetail);

        let centered_popup = container(popup_mouse_area)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .padding(Padding::new(40.0));

        iced::widget::stack![overlay_bg, centered_popup]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_detail_loading(&self) -> Element<'_, Message> {
        let hero = container(Space::new().width(Length::Fill).height(MINI_HERO_HEIGHT))
            .width(Length::Fill)
            .height(Length::Fixed(MINI_HERO_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            });

        let heading: Element<Message> = match self.detail.item() {
            Some(item) => bold(item.display_title().to_string(), 32).into(),
            None => skeleton_block(Length::Fixed(240.0), 32.0),
        };
        let body = column![
            heading,
            skeleton_block(Length::Fixed(160.0), 16.0),
            skeleton_block(Length::Fill, 14.0),
            skeleton_block(Length::Fixed(320.0), 14.0)
        ]
        .spacing(12)
        .padding(Padding::new(32.0));

        column![hero, body]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_detail_close_button(&self) -> Element<'_, Message> {
        let btn = button(
            container(icon(ICON_X_LG).size(18).color(TEXT_WHITE))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(Length::Fixed(36.0))
        .height(Length::Fixed(36.0))
        .padding(0)
        .style(|_theme, status| {
            let alpha = if matches!(status, button::Status::Hovered) {
                0.9
            } else {
                0.6
            };
            button::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, alpha,
                ))),
                text_color: TEXT_WHITE,
                border: Border {
                    radius: 18.0.into(),
                    ..Default::default()
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::CloseDetail);

        container(btn)
            .width(Length::Fill)
            .align_x(iced::alignment::Horizontal::Right)
            .padding(Padding::new(16.0))
            .into()
    }

    fn view_detail_content<'a>(&'a self, detail: &'a ItemDetail) -> Element<'a, Message> {
        let mut sections: Vec<Element<Message>> = vec![
            self.view_detail_mini_hero(detail),
            self.view_detail_info(detail),
        ];

        if !self.detail.seasons().is_empty() {
            sections.push(self.view_detail_seasons());
        }

        let recommendations: Vec<&Item> = self.detail.visible_recommendations().collect();
        if !recommendations.is_empty() {
            sections.push(self.view_detail_recommendations(recommendations));
        }

        scrollable(Column::with_children(sections).width(Length::Fill))
            .direction(scrollable::Direction::Vertical(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(hidden_scrollbar_style)
            .into()
    }

    fn view_detail_mini_hero<'a>(&'a self, detail: &'a ItemDetail) -> Element<'a, Message> {
        let backdrop = self.view_detail_backdrop(&detail.item);

        let title = bold(detail.item.display_title().to_string(), 32);
        let title_area = container(column![title].padding(Padding::new(32.0)))
            .width(Length::Fill)
            .height(Length::Fill)
            .align_y(iced::alignment::Vertical::Bottom)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::TRANSPARENT)
                        .add_stop(0.5, Color::from_rgba(0.0, 0.0, 0.0, 0.3))
                        .add_stop(1.0, Color::from_rgba(0.078, 0.078, 0.078, 1.0)),
                ))),
                ..Default::default()
            });

        iced::widget::stack![backdrop, title_area]
            .width(Length::Fill)
            .height(Length::Fixed(MINI_HERO_HEIGHT))
            .into()
    }

    fn view_detail_backdrop(&self, item: &Item) -> Element<'_, Message> {
        let handle = item.backdrop_path.as_ref().and_then(|path| {
            let url = self
                .tmdb_client
                .as_ref()?
                .image_url(path, ImageSize::Original);
            self.image_cache.get(&url)
        });

        match handle {
            Some(h) => iced::widget::image(h.clone())
                .width(Length::Fill)
                .height(Length::Fixed(MINI_HERO_HEIGHT))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => container(Space::new().width(Length::Fill).height(MINI_HERO_HEIGHT))
                .width(Length::Fill)
                .height(Length::Fixed(MINI_HERO_HEIGHT))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                    ..Default::default()
                })
                .into(),
        }
    }

    fn view_detail_info<'a>(&'a self, detail: &'a ItemDetail) -> Element<'a, Message> {
        let mut items: Vec<Element<Message>> = Vec::new();

        let metadata: Vec<Element<Message>> = metadata_line(detail)
            .into_iter()
            .enumerate()
            .map(|(index, part)| {
                let color = if index == 0 && detail.vote_average.is_some_and(|r| r > 0.0) {
                    Color::from_rgb(0.275, 0.827, 0.412)
                } else {
                    TEXT_GRAY
                };
                text(part).size(14).color(color).into()
            })
            .collect();
        if !metadata.is_empty() {
            items.push(
                Row::with_children(metadata)
                    .spacing(16)
                    .align_y(iced::Alignment::Center)
                    .into(),
            );
        }

        if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
            items.push(
                text(format!("\"{}\"", tagline))
                    .size(18)
                    .color(TEXT_WHITE)
                    .font(iced::Font {
                        style: iced::font::Style::Italic,
                        ..Default::default()
                    })
                    .into(),
            );
        }

        items.push(self.view_detail_overview());

        Column::with_children(items)
            .spacing(16)
            .padding(Padding::new(32.0).top(8.0))
            .width(Length::Fill)
            .into()
    }

    fn view_detail_overview(&self) -> Element<'_, Message> {
        let (overview, toggle) = self.detail.overview();
        let overview_text = text(overview)
            .size(16)
            .color(TEXT_WHITE)
            .wrapping(text::Wrapping::Word);

        let Some(toggle) = toggle else {
            return overview_text.into();
        };
        let label = match toggle {
            OverviewToggle::More => "More",
            OverviewToggle::Less => "Less",
        };
        let toggle_button = button(text(label).size(14).color(TEXT_GRAY))
            .padding(0)
            .style(|_theme, status| button::Style {
                background: None,
                text_color: if matches!(status, button::Status::Hovered) {
                    TEXT_WHITE
                } else {
                    TEXT_GRAY
                },
                border: Border::default(),
                shadow: Shadow::default(),
                snap: false,
            })
            .on_press(Message::ToggleOverview);

        column![overview_text, toggle_button].spacing(6).into()
    }

    fn view_detail_seasons(&self) -> Element<'_, Message> {
        let options = self.detail.season_options();
        let selected = options
            .iter()
            .find(|option| option.number == self.detail.selected_season())
            .cloned();

        let picker = pick_list(options, selected, |option| Message::SelectSeason(option.number))
            .placeholder("Select season")
            .text_size(14)
            .padding(Padding::new(8.0).left(12.0).right(12.0))
            .style(|_, _| pick_list::Style {
                text_color: TEXT_WHITE,
                placeholder_color: TEXT_GRAY,
                handle_color: TEXT_WHITE,
                background: iced::Background::Color(SURFACE_DARK_GRAY),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                    width: 1.0,
                    radius: 4.0.into(),
                },
            });

        let header = row![
            bold(String::from("Episodes"), 20),
            Space::new().width(Length::Fill),
            picker
        ]
        .align_y(iced::Alignment::Center);

        let episodes = self.detail.selected_episodes();
        let episode_list: Element<Message> = if episodes.is_empty() {
            container(text("No episodes available").size(14).color(TEXT_GRAY))
                .padding(16.0)
                .into()
        } else {
            Column::with_children(
                episodes
                    .iter()
                    .map(|episode| self.view_detail_episode(episode)),
            )
            .spacing(12)
            .into()
        };

        column![header, episode_list]
            .spacing(20)
            .padding(Padding::new(32.0).top(8.0))
            .width(Length::Fill)
            .into()
    }

    fn view_detail_episode<'a>(&'a self, episode: &'a Episode) -> Element<'a, Message> {
        let still = match episode.still_path.as_deref() {
            Some(path) => self.view_artwork(Some(path), ImageSize::Poster, STILL_WIDTH, STILL_HEIGHT),
            None => container(icon(ICON_FILM).size(24).color(TEXT_GRAY))
                .width(Length::Fixed(STILL_WIDTH))
                .height(Length::Fixed(STILL_HEIGHT))
                .center_x(Length::Fixed(STILL_WIDTH))
                .center_y(Length::Fixed(STILL_HEIGHT))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                    border: Border {
                        radius: 4.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .into(),
        };

        let info = column![
            bold(format!("{}. {}", episode.episode_number, episode.name), 15),
            text(episode.overview.as_str())
                .size(13)
                .color(TEXT_GRAY)
                .wrapping(text::Wrapping::Word)
        ]
        .spacing(6)
        .width(Length::Fill);

        container(
            row![still, info]
                .spacing(16)
                .align_y(iced::Alignment::Start),
        )
        .padding(12)
        .width(Length::Fill)
        .style(|_theme| container::Style {
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        })
        .into()
    }

    fn view_detail_recommendations<'a>(&'a self, items: Vec<&'a Item>) -> Element<'a, Message> {
        let rows: Vec<Element<Message>> = items
            .chunks(RECOMMENDATIONS_PER_ROW)
            .map(|chunk| {
                Row::with_children(
                    chunk
                        .iter()
                        .map(|item| self.view_recommendation_card(item)),
                )
                .spacing(16)
                .into()
            })
            .collect();

        column![
            bold(String::from("More Like This"), 20),
            Column::with_children(rows).spacing(16)
        ]
        .spacing(20)
        .padding(Padding::new(32.0).top(8.0))
        .width(Length::Fill)
        .into()
    }

    fn view_recommendation_card(&self, item: &Item) -> Element<'_, Message> {
        let height = RECOMMENDATION_WIDTH * 9.0 / 16.0;
        let backdrop = self.view_artwork(
            item.backdrop_path.as_deref(),
            ImageSize::Poster,
            RECOMMENDATION_WIDTH,
            height,
        );
        let title = container(
            text(item.display_title().to_string())
                .size(14)
                .color(TEXT_WHITE)
                .wrapping(text::Wrapping::Word),
        )
        .max_width(RECOMMENDATION_WIDTH);

        let card = container(column![backdrop, title].spacing(8))
            .width(Length::Fixed(RECOMMENDATION_WIDTH))
            .style(|_theme| container::Style {
                border: Border {
                    radius: 4.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            });

        mouse_area(card)
            .on_press(Message::OpenDetail(item.clone()))
            .into()
    }
}
