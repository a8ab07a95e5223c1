// ABOUTME: Container image reference parsing and validation.
// ABOUTME: Handles formats like nginx, user/repo:tag, registry.example.com:5000/repo:tag.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("image reference has an empty tag")]
    EmptyTag,
}

/// A parsed image reference. The tag defaults to `latest` when omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    repository: String,
    tag: String,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        if let Some(c) = input
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !"/:.-_@".contains(*c))
        {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        // A colon after the last slash separates the tag; a colon before it
        // belongs to a registry port (registry.example.com:5000/repo).
        let slash = input.rfind('/').map_or(0, |i| i + 1);
        let (repository, tag) = match input[slash..].find(':') {
            Some(offset) => {
                let at = slash + offset;
                (&input[..at], &input[at + 1..])
            }
            None => (input, "latest"),
        };

        if tag.is_empty() {
            return Err(ParseImageRefError::EmptyTag);
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The same repository with a different tag.
    pub fn with_tag(&self, tag: &str) -> Self {
        Self {
            repository: self.repository.clone(),
            tag: tag.to_string(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ImageRef::parse(&raw).map_err(serde::de::Error::custom)
    }
}
