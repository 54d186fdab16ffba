use std::path::PathBuf;

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::media::{BACKGROUND_BLACK, NETFLIX_RED, TEXT_GRAY, TEXT_WHITE};

pub const API_KEY_ENV: &str = "TMDB_API_KEY";
pub const LANGUAGE_ENV: &str = "TMDB_LANGUAGE";
pub const DEFAULT_LANGUAGE: &str = "ko-KR";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,
    #[error("failed to access the configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    String::from(DEFAULT_LANGUAGE)
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("streamflix")
                .join("config.json")
        })
    }

    pub fn load() -> Self {
        let from_file = match Self::read_file() {
            Ok(settings) => settings,
            Err(SettingsError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(err) => {
                warn!("ignoring configuration file: {}", err);
                Self::default()
            }
        };
        from_file.with_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(LANGUAGE_ENV).ok(),
        )
    }

    fn read_file() -> Result<Self, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn with_overrides(mut self, api_key: Option<String>, language: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key.trim().to_string();
        }
        if let Some(lang) = language.filter(|l| !l.trim().is_empty()) {
            self.language = lang.trim().to_string();
        }
        if self.language.trim().is_empty() {
            self.language = default_language();
        }
        self
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        info!("saved settings to {}", path.display());
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum SetupMessage {
    ApiKeyChanged(String),
    LanguageChanged(String),
    Submit,
}

pub struct SetupPage {
    pub api_key: String,
    pub language: String,
    pub error: Option<String>,
}

impl Default for SetupPage {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            error: None,
        }
    }
}

impl SetupPage {
    pub fn update(&mut self, message: SetupMessage) -> Option<AppSettings> {
        match message {
            SetupMessage::ApiKeyChanged(key) => {
                self.api_key = key;
                self.error = None;
                None
            }
            SetupMessage::LanguageChanged(lang) => {
                self.language = lang;
                None
            }
            SetupMessage::Submit => {
                let settings = match self.submitted_settings() {
                    Ok(settings) => settings,
                    Err(message) => {
                        self.error = Some(message);
                        return None;
                    }
                };
                if let Err(err) = settings.save() {
                    // The key is still usable for this session.
                    warn!("failed to save settings: {}", err);
                }
                Some(settings)
            }
        }
    }

    fn submitted_settings(&self) -> Result<AppSettings, String> {
        if self.api_key.trim().is_empty() {
            return Err(String::from("API key is required"));
        }
        Ok(AppSettings::default()
            .with_overrides(Some(self.api_key.clone()), Some(self.language.clone())))
    }

    pub fn view(&self) -> Element<'_, SetupMessage> {
        let logo = text("STREAMFLIX").size(48).color(NETFLIX_RED);

        let title = text("Welcome").size(28).color(TEXT_WHITE);
        let subtitle = text("Enter your TMDB API key to start browsing")
            .size(14)
            .color(TEXT_GRAY);

        let api_label = text("TMDB API Key").size(14).color(TEXT_WHITE);
        let api_hint = text(format!(
            "Get a free key at themoviedb.org/settings/api, or set {}",
            API_KEY_ENV
        ))
        .size(12)
        .color(TEXT_GRAY);
        let api_input = text_input("Enter your TMDB API key...", &self.api_key)
            .on_input(SetupMessage::ApiKeyChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let lang_label = text("Language").size(14).color(TEXT_WHITE);
        let lang_input = text_input(DEFAULT_LANGUAGE, &self.language)
            .on_input(SetupMessage::LanguageChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let submit_button = button(text("Get Started").size(16).color(TEXT_WHITE))
            .padding([12, 32])
            .style(|_theme, status| {
                let bg = match status {
                    button::Status::Hovered => iced::Color::from_rgb(0.7, 0.02, 0.06),
                    _ => NETFLIX_RED,
                };
                button::Style {
                    background: Some(iced::Background::Color(bg)),
                    text_color: TEXT_WHITE,
                    border: iced::Border::default().rounded(4),
                    ..Default::default()
                }
            })
            .on_press(SetupMessage::Submit);

        let error_text = text(self.error.clone().unwrap_or_default())
            .size(14)
            .color(NETFLIX_RED);

        let spacer = || Space::new().height(16);
        let small_spacer = || Space::new().height(4);

        let form = column![
            logo,
            spacer(),
            title,
            small_spacer(),
            subtitle,
            spacer(),
            api_label,
            small_spacer(),
            api_hint,
            small_spacer(),
            api_input,
            spacer(),
            lang_label,
            small_spacer(),
            lang_input,
            spacer(),
            error_text,
            small_spacer(),
            row![submit_button].width(Length::Fill),
        ]
        .width(Length::Fixed(400.0))
        .align_x(Alignment::Start);

        container(form)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_overrides_file_values() {
        let from_file = AppSettings {
            api_key: String::from("file-key"),
            language: String::from("en-US"),
        };
        let settings = from_file.with_overrides(Some(" env-key ".into()), None);
        assert_eq!(settings.api_key, "env-key");
        assert_eq!(settings.language, "en-US");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let settings = AppSettings::default().with_overrides(Some("   ".into()), Some("".into()));
        assert!(!settings.is_valid());
        assert_eq!(settings.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn missing_language_in_file_uses_default() {
        let settings: AppSettings =
            serde_json::from_str(r#"{ "api_key": "abc" }"#).expect("valid config");
        assert_eq!(settings.language, DEFAULT_LANGUAGE);
        assert!(settings.is_valid());
    }

    #[test]
    fn setup_requires_api_key() {
        let mut page = SetupPage::default();
        assert_eq!(page.update(SetupMessage::Submit), None);
        assert_eq!(page.error.as_deref(), Some("API key is required"));

        page.update(SetupMessage::ApiKeyChanged(String::from("key")));
        assert!(page.error.is_none());
    }
}
