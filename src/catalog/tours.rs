//! Explore tours: ordered stops with up to two "go deeper" levels each.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const BUILTIN_TOURS: &str = include_str!("../../assets/tours.json");

/// Deepest level a stop can be explored to.
pub const MAX_DEPTH: u8 = 2;

/// Content of one deeper level of a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeeperLevel {
    pub title: String,
    pub description: String,
    pub image_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoDeeper {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level1: Option<DeeperLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level2: Option<DeeperLevel>,
}

/// A single stop on a tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreStop {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_prompt: String,
    pub soundscape_file: String,
    #[serde(default)]
    pub go_deeper: GoDeeper,
}

/// Title, description and prompt of a stop at a given depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopView<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image_prompt: &'a str,
}

impl ExploreStop {
    /// Content at `depth`: 0 is the stop itself, 1 and 2 its deeper levels.
    ///
    /// Returns `None` for depths past [`MAX_DEPTH`] or absent levels.
    pub fn at_depth(&self, depth: u8) -> Option<StopView<'_>> {
        let level = match depth {
            0 => {
                return Some(StopView {
                    title: &self.title,
                    description: &self.description,
                    image_prompt: &self.image_prompt,
                })
            }
            1 => self.go_deeper.level1.as_ref(),
            2 => self.go_deeper.level2.as_ref(),
            _ => None,
        }?;

        Some(StopView {
            title: &level.title,
            description: &level.description,
            image_prompt: &level.image_prompt,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub character_id: String,
    pub tour_id: String,
    pub title: String,
    pub stops: Vec<ExploreStop>,
}

impl Tour {
    pub fn stop(&self, stop_id: &str) -> Option<&ExploreStop> {
        self.stops.iter().find(|s| s.id == stop_id)
    }
}

/// All tours known to the service.
#[derive(Debug, Clone, Default)]
pub struct TourCatalog {
    tours: Vec<Tour>,
}

impl TourCatalog {
    pub fn new(tours: Vec<Tour>) -> Self {
        Self { tours }
    }

    /// Load the tours shipped with the binary.
    pub fn builtin() -> Result<Self, StoreError> {
        let tours = serde_json::from_str(BUILTIN_TOURS).map_err(|e| StoreError::Parse {
            path: "assets/tours.json".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(tours))
    }

    pub fn get(&self, character_id: &str, tour_id: &str) -> Option<&Tour> {
        self.tours
            .iter()
            .find(|t| t.character_id == character_id && t.tour_id == tour_id)
    }

    pub fn for_character<'a>(&'a self, character_id: &'a str) -> impl Iterator<Item = &'a Tour> {
        self.tours
            .iter()
            .filter(move |t| t.character_id == character_id)
    }
}
