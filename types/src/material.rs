//! Material library model (characters, scenes, props).

use crate::id::EntityId;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of auxiliary images a material carries.
pub const MAX_AUX_IMAGES: usize = 2;

/// Category a material belongs to.
///
/// Reclassification is not supported by the backend; moving a material
/// between categories means deleting and recreating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Characters,
    Scenes,
    Props,
    Others,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 4] = [
        MaterialKind::Characters,
        MaterialKind::Scenes,
        MaterialKind::Props,
        MaterialKind::Others,
    ];

    /// Path segment used by the materials endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Characters => "characters",
            MaterialKind::Scenes => "scenes",
            MaterialKind::Props => "props",
            MaterialKind::Others => "others",
        }
    }

    /// Section title shown above the material list.
    pub fn title(&self) -> &'static str {
        match self {
            MaterialKind::Characters => "Characters",
            MaterialKind::Scenes => "Scenes",
            MaterialKind::Props => "Props",
            MaterialKind::Others => "Others",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown material category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMaterialKind(pub String);

impl fmt::Display for UnknownMaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown material category '{}' (expected characters, scenes, props or others)",
            self.0
        )
    }
}

impl std::error::Error for UnknownMaterialKind {}

impl FromStr for MaterialKind {
    type Err = UnknownMaterialKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMaterialKind(s.to_string()))
    }
}

/// A stored material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Relative path of the main image inside the material's storage
    #[serde(default)]
    pub main_image: Option<String>,
    /// Up to [`MAX_AUX_IMAGES`] auxiliary image paths, in slot order
    #[serde(default, deserialize_with = "null_as_default")]
    pub aux_images: Vec<String>,
    /// Category the material was listed under. Filled in by the client when
    /// the backend omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MaterialKind>,
}

impl Material {
    /// Auxiliary image for the given slot (0 or 1).
    pub fn aux_image(&self, slot: usize) -> Option<&str> {
        self.aux_images.get(slot).map(String::as_str)
    }
}

/// Decode an explicit `null` as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
