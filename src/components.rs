use iced::widget::{container, mouse_area, row, scrollable, text, text_input, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::media::{Message, NETFLIX_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::Streamflix;

const ICON_PERSON_FILL: char = '\u{F4DA}';
const ICON_SEARCH: char = '\u{F52A}';

pub const MAIN_SCROLLABLE: &str = "main-content";
pub const HEADER_HEIGHT: f32 = 72.0;
const HEADER_SOLID_AFTER: f32 = 100.0;

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn hidden_scrollbar_style(_theme: &iced::Theme, _status: scrollable::Status) -> scrollable::Style {
    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: hidden_rail(),
        horizontal_rail: hidden_rail(),
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            shadow: Shadow::default(),
            icon: Color::TRANSPARENT,
        },
    }
}

fn hidden_rail() -> scrollable::Rail {
    scrollable::Rail {
        background: None,
        border: Border::default(),
        scroller: scrollable::Scroller {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
        },
    }
}

pub fn header_is_solid(scroll_offset: f32) -> bool {
    scroll_offset > HEADER_SOLID_AFTER
}

impl Streamflix {
    pub fn view_header(&self) -> Element<'_, Message> {
        let header_content = row![
            self.view_logo(),
            Space::new().width(Length::Fill),
            self.view_search_bar(),
            self.view_avatar()
        ]
        .spacing(16)
        .padding(Padding::new(16.0).left(48.0).right(48.0))
        .align_y(iced::Alignment::Center);

        let is_solid = header_is_solid(self.main_scroll_offset);

        container(header_content)
            .width(Length::Fill)
            .height(Length::Fixed(HEADER_HEIGHT))
            .style(move |_theme| {
                if is_solid {
                    container::Style {
                        background: Some(iced::Background::Color(Color::from_rgb(
                            0.067, 0.067, 0.067,
                        ))),
                        ..Default::default()
                    }
                } else {
                    container::Style {
                        background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                            iced::gradient::Linear::new(std::f32::consts::PI)
                                .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.7))
                                .add_stop(1.0, Color::TRANSPARENT),
                        ))),
                        ..Default::default()
                    }
                }
            })
            .into()
    }

    fn view_logo(&self) -> Element<'_, Message> {
        let logo = text("STREAMFLIX")
            .size(28)
            .color(NETFLIX_RED)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        mouse_area(logo).on_press(Message::LogoPressed).into()
    }

    fn view_search_bar(&self) -> Element<'_, Message> {
        let search_icon = icon(ICON_SEARCH).size(14).color(TEXT_GRAY);

        let search_input = text_input("Search titles...", self.search_input.volatile())
            .on_input(Message::SearchQueryChanged)
            .padding(8)
            .width(Length::Fixed(220.0))
            .style(|_theme, _status| text_input::Style {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
                icon: TEXT_GRAY,
                placeholder: TEXT_GRAY,
                value: TEXT_WHITE,
                selection: NETFLIX_RED,
            });

        let search_content = row![search_icon, search_input]
            .spacing(8)
            .align_y(iced::Alignment::Center);

        container(search_content)
            .padding(Padding::new(4.0).left(12.0).right(8.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.7,
                ))),
                border: Border {
                    color: TEXT_GRAY,
                    width: 1.0,
                    radius: 4.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_avatar(&self) -> Element<'_, Message> {
        container(icon(ICON_PERSON_FILL).size(18).color(TEXT_WHITE))
            .width(Length::Fixed(36.0))
            .height(Length::Fixed(36.0))
            .center_x(Length::Fixed(36.0))
            .center_y(Length::Fixed(36.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    radius: 4.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .into()
    }

    pub fn view_main_content(&self) -> Element<'_, Message> {
        let main_column: Element<Message> = if self.search.is_active() {
            self.view_search_page()
        } else {
            iced::widget::column![self.view_hero_section(), self.view_catalog_rows()]
                .width(Length::Fill)
                .into()
        };

        let main_scroll = scrollable(main_column)
            .id(iced::widget::Id::new(MAIN_SCROLLABLE))
            .direction(scrollable::Direction::Vertical(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .on_scroll(|viewport| Message::MainScrolled {
                offset: viewport.absolute_offset().y,
                relative: viewport.relative_offset().y,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .style(hidden_scrollbar_style);

        iced::widget::stack![main_scroll, self.view_header()]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_turns_solid_past_threshold() {
        assert!(!header_is_solid(0.0));
        assert!(!header_is_solid(100.0));
        assert!(header_is_solid(100.5));
    }
}
