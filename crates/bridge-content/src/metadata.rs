//! Step metadata vocabulary and validation
//!
//! Step-definition files carry two kinds of metadata blocks: the leading
//! group block (`@name`, `@description`, `@type`) and one block per step
//! template (`@name`, `@description`, `@icon`). Values of `@type` and `@icon`
//! come from closed sets.

use std::fmt;
use std::str::FromStr;

use bridge_blocks::MetadataBlock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether a step group performs actions or validations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    Action,
    Validation,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "ACTION",
            Self::Validation => "VALIDATION",
        }
    }

    /// The marker call that registers steps of this kind.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Action => "When",
            Self::Validation => "Then",
        }
    }

    /// Directory (under the steps root) holding files of this kind.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Action => "actions",
            Self::Validation => "validations",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "When" => Some(Self::Action),
            "Then" => Some(Self::Validation),
            _ => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTION" => Ok(Self::Action),
            "VALIDATION" => Ok(Self::Validation),
            _ => Err(Error::InvalidTagValue {
                tag: "type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! icons {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// Icon shown next to a step in the UI.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum StepIcon {
            $($variant),*
        }

        impl StepIcon {
            pub const ALL: &'static [StepIcon] = &[$(StepIcon::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),*
                }
            }
        }

        impl FromStr for StepIcon {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok(Self::$variant),)*
                    _ => Err(Error::InvalidTagValue {
                        tag: "icon".to_string(),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

icons! {
    Mouse => "MOUSE",
    Keyboard => "KEYBOARD",
    Navigation => "NAVIGATION",
    Eye => "EYE",
    Check => "CHECK",
    Clock => "CLOCK",
    Form => "FORM",
    Api => "API",
    Database => "DATABASE",
    Lock => "LOCK",
    Upload => "UPLOAD",
    Download => "DOWNLOAD",
    Code => "CODE",
}

impl Default for StepIcon {
    fn default() -> Self {
        Self::Code
    }
}

impl fmt::Display for StepIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated leading block of a step-definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMeta {
    pub name: String,
    pub description: String,
    pub kind: StepKind,
}

impl GroupMeta {
    pub fn from_block(block: &MetadataBlock) -> Result<Self> {
        Ok(Self {
            name: block.require("name")?.trim().to_string(),
            description: block.get("description").unwrap_or_default().trim().to_string(),
            kind: block.require("type")?.parse()?,
        })
    }

    pub fn to_block(&self) -> MetadataBlock {
        MetadataBlock::new()
            .with("name", &self.name)
            .with("description", &self.description)
            .with("type", self.kind.as_str())
    }
}

/// Validated block preceding a single step template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMeta {
    pub name: String,
    pub description: String,
    pub icon: StepIcon,
}

impl TemplateMeta {
    /// A missing `@icon` falls back to the default icon; an unknown one is an error.
    pub fn from_block(block: &MetadataBlock) -> Result<Self> {
        let icon = match block.get("icon").map(str::trim) {
            None | Some("") => StepIcon::default(),
            Some(value) => value.parse()?,
        };
        Ok(Self {
            name: block.require("name")?.trim().to_string(),
            description: block.get("description").unwrap_or_default().trim().to_string(),
            icon,
        })
    }

    pub fn to_block(&self) -> MetadataBlock {
        MetadataBlock::new()
            .with("name", &self.name)
            .with("description", &self.description)
            .with("icon", self.icon.as_str())
    }
}
