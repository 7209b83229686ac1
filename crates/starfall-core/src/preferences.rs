use serde::{Deserialize, Serialize};

/// Selectable player sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerSkin {
    #[default]
    Goku,
    Vegeta,
    Frieza,
    Piccolo,
}

impl PlayerSkin {
    pub const ALL: [PlayerSkin; 4] = [
        PlayerSkin::Goku,
        PlayerSkin::Vegeta,
        PlayerSkin::Frieza,
        PlayerSkin::Piccolo,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PlayerSkin::Goku => "goku",
            PlayerSkin::Vegeta => "vegeta",
            PlayerSkin::Frieza => "frieza",
            PlayerSkin::Piccolo => "piccolo",
        }
    }
}

/// Selectable backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Background {
    #[default]
    KameHouse,
    Namek,
    VegetaPalace,
    PlanetFrieza,
}

/// Cosmetic preferences persisted by the presentation layer.
///
/// The simulation only ever reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub player: PlayerSkin,
    pub background: Background,
    /// Sanitized `@handle` used for score submission.
    pub handle: Option<String>,
}

impl Preferences {
    /// Parse stored preferences. Unknown keys are ignored; an unreadable
    /// field or document falls back to the defaults.
    pub fn from_json(json: &str) -> Self {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(json)
        else {
            tracing::debug!("Unreadable preferences, using defaults");
            return Self::default();
        };

        let mut prefs = Self::default();
        if let Some(skin) = map
            .get("player")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
        {
            prefs.player = skin;
        }
        if let Some(bg) = map
            .get("background")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
        {
            prefs.background = bg;
        }
        prefs.handle = map
            .get("handle")
            .and_then(|v| v.as_str())
            .and_then(crate::handle::extract_handle);
        prefs
    }
}

/// Read-only access to the player's preferences.
pub trait PreferencesStore {
    fn preferences(&self) -> Preferences;

    fn skin(&self) -> PlayerSkin {
        self.preferences().player
    }
}

impl PreferencesStore for Preferences {
    fn preferences(&self) -> Preferences {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_goku_and_kame_house() {
        let prefs = Preferences::default();
        assert_eq!(prefs.player, PlayerSkin::Goku);
        assert_eq!(prefs.background, Background::KameHouse);
        assert!(prefs.handle.is_none());
    }

    #[test]
    fn parses_stored_settings() {
        let prefs = Preferences::from_json(
            r#"{"player":"piccolo","background":"planet-frieza","coin":"dragonball","handle":"gohan"}"#,
        );
        assert_eq!(prefs.player, PlayerSkin::Piccolo);
        assert_eq!(prefs.background, Background::PlanetFrieza);
        assert_eq!(prefs.handle.as_deref(), Some("@gohan"));
    }

    #[test]
    fn unknown_values_fall_back_per_field() {
        let prefs = Preferences::from_json(r#"{"player":"krillin","background":"namek"}"#);
        assert_eq!(prefs.player, PlayerSkin::Goku);
        assert_eq!(prefs.background, Background::Namek);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        assert_eq!(Preferences::from_json("not json"), Preferences::default());
        assert_eq!(Preferences::from_json("[1,2]"), Preferences::default());
    }

    #[test]
    fn skin_ids_are_stable() {
        let ids: Vec<_> = PlayerSkin::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(ids, ["goku", "vegeta", "frieza", "piccolo"]);
    }
}
