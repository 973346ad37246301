//! Game records and request payloads.
//!
//! Field names on the wire are the store's column names (`nombre`,
//! `genero`, ...). The REST API exposes rows exactly as the store returns
//! them, so both sides share one serde representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Column used to order the catalog listing.
pub const RELEASE_YEAR_COLUMN: &str = "año_lanzamiento";

/// Primary key of a game row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl From<i64> for GameId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for GameId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored game.
///
/// The descriptive columns are nullable in the table and pass through as
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "genero", default)]
    pub genre: Option<String>,
    #[serde(rename = "plataforma", default)]
    pub platform: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "año_lanzamiento")]
    pub release_year: i32,
    #[serde(rename = "imagen_url", default)]
    pub image_url: Option<String>,
}

/// A validated game ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGame {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "genero")]
    pub genre: String,
    #[serde(rename = "plataforma")]
    pub platform: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "año_lanzamiento")]
    pub release_year: i32,
    #[serde(rename = "imagen_url")]
    pub image_url: Option<String>,
}

impl NewGame {
    pub fn into_game(self, id: GameId) -> Game {
        Game {
            id,
            name: self.name,
            genre: Some(self.genre),
            platform: Some(self.platform),
            description: Some(self.description),
            release_year: self.release_year,
            image_url: self.image_url,
        }
    }
}

/// Fields to change on an existing game. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GamePatch {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "genero", skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "plataforma", skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "año_lanzamiento", skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    /// `Some(None)` clears the image.
    #[serde(rename = "imagen_url", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
}

impl GamePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.genre.is_none()
            && self.platform.is_none()
            && self.description.is_none()
            && self.release_year.is_none()
            && self.image_url.is_none()
    }

    pub fn apply(self, game: &mut Game) {
        if let Some(name) = self.name {
            game.name = name;
        }
        if let Some(genre) = self.genre {
            game.genre = Some(genre);
        }
        if let Some(platform) = self.platform {
            game.platform = Some(platform);
        }
        if let Some(description) = self.description {
            game.description = Some(description);
        }
        if let Some(year) = self.release_year {
            game.release_year = year;
        }
        if let Some(image_url) = self.image_url {
            game.image_url = image_url;
        }
    }
}

/// Request body accepted by `POST` and `PUT /api/games`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "genero")]
    pub genre: Option<String>,
    #[serde(rename = "plataforma")]
    pub platform: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "año_lanzamiento")]
    pub release_year: Option<i32>,
    #[serde(rename = "imagen_url", default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Required fields absent from a create request, by wire name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<&'static str>);

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required fields: {}", self.0.join(", "))
    }
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl GameInput {
    /// Presence-check a create request.
    pub fn into_new_game(self) -> Result<NewGame, MissingFields> {
        let name = filled(self.name);
        let genre = filled(self.genre);
        let platform = filled(self.platform);
        let description = filled(self.description);
        let release_year = self.release_year.filter(|year| *year != 0);

        match (name, genre, platform, description, release_year) {
            (Some(name), Some(genre), Some(platform), Some(description), Some(release_year)) => {
                Ok(NewGame {
                    name,
                    genre,
                    platform,
                    description,
                    release_year,
                    image_url: filled(self.image_url.flatten()),
                })
            }
            (name, genre, platform, description, release_year) => {
                let missing = [
                    ("nombre", name.is_none()),
                    ("genero", genre.is_none()),
                    ("plataforma", platform.is_none()),
                    ("descripcion", description.is_none()),
                    (RELEASE_YEAR_COLUMN, release_year.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                Err(MissingFields(missing))
            }
        }
    }

    /// Keep every field the caller sent.
    pub fn into_patch(self) -> GamePatch {
        GamePatch {
            name: self.name,
            genre: self.genre,
            platform: self.platform,
            description: self.description,
            release_year: self.release_year,
            image_url: self.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> GameInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_game_uses_column_names() {
        let game: Game = serde_json::from_value(json!({
            "id": 7,
            "nombre": "Celeste",
            "genero": "Plataformas",
            "plataforma": "PC",
            "descripcion": "Escalar la montaña",
            "año_lanzamiento": 2018,
            "imagen_url": null,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(game.id, GameId(7));
        assert_eq!(game.release_year, 2018);
        assert_eq!(serde_json::to_value(&game).unwrap()["año_lanzamiento"], 2018);
    }

    #[test]
    fn test_null_descriptive_columns_pass_through() {
        let game: Game = serde_json::from_value(json!({
            "id": 3,
            "nombre": "Tetris",
            "genero": null,
            "plataforma": "Game Boy",
            "año_lanzamiento": 1989
        }))
        .unwrap();

        assert_eq!(game.genre, None);
        assert_eq!(game.description, None);
        assert_eq!(game.platform.as_deref(), Some("Game Boy"));
        assert_eq!(serde_json::to_value(&game).unwrap()["genero"], serde_json::Value::Null);
    }

    #[test]
    fn test_create_requires_all_fields() {
        let err = input(json!({"nombre": "Celeste", "genero": "", "año_lanzamiento": 0}))
            .into_new_game()
            .unwrap_err();
        assert_eq!(
            err.0,
            vec!["genero", "plataforma", "descripcion", "año_lanzamiento"]
        );
        assert!(err.to_string().starts_with("missing required fields: genero"));
    }

    #[test]
    fn test_create_blank_image_becomes_null() {
        let game = input(json!({
            "nombre": "Hades",
            "genero": "Roguelike",
            "plataforma": "Switch",
            "descripcion": "Escapar del inframundo",
            "año_lanzamiento": 2020,
            "imagen_url": ""
        }))
        .into_new_game()
        .unwrap();
        assert_eq!(game.image_url, None);
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let cleared = input(json!({"imagen_url": null})).into_patch();
        assert_eq!(cleared.image_url, Some(None));
        assert!(!cleared.is_empty());

        let untouched = input(json!({"nombre": "Nuevo"})).into_patch();
        assert_eq!(untouched.image_url, None);
        assert_eq!(
            serde_json::to_value(&untouched).unwrap(),
            json!({"nombre": "Nuevo"})
        );

        assert!(input(json!({})).into_patch().is_empty());
    }

    #[test]
    fn test_game_id_parsing() {
        assert_eq!(" 42 ".parse::<GameId>().unwrap(), GameId(42));
        assert!("abc".parse::<GameId>().is_err());
    }
}
