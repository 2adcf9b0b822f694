//! Avatar URL construction and query options.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::identifier::{AvatarIdentifier, HashId};

/// Base URL avatars are served from.
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://gravatar.com/avatar/";

/// Largest size Gravatar will render, in pixels.
pub const MAX_AVATAR_SIZE: u32 = 2048;

/// Size requested when the caller does not specify one.
pub const DEFAULT_AVATAR_SIZE: u32 = 240;

/// Content rating of an avatar.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Suitable for all audiences.
    #[default]
    G,
    /// May contain rude gestures or mild violence.
    Pg,
    /// May contain harsh profanity or intense violence.
    R,
    /// May contain hardcore content.
    X,
}

impl Rating {
    /// Returns the query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::G => "g",
            Self::Pg => "pg",
            Self::R => "r",
            Self::X => "x",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "g" => Ok(Self::G),
            "pg" => Ok(Self::Pg),
            "r" => Ok(Self::R),
            "x" => Ok(Self::X),
            other => Err(format!("unknown rating: {other}")),
        }
    }
}

/// What Gravatar serves when no avatar exists for the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DefaultAvatarOption {
    /// Respond with HTTP 404 instead of an image.
    #[default]
    Status404,
    /// Generic silhouette.
    MysteryPerson,
    /// Geometric pattern derived from the hash.
    Identicon,
    /// Generated monster.
    MonsterId,
    /// Generated face.
    Wavatar,
    /// 8-bit arcade-style face.
    Retro,
    /// Generated robot.
    RoboHash,
    /// Transparent PNG.
    TransparentPng,
    /// Image served from a caller-provided URL.
    CustomUrl(Url),
}

impl DefaultAvatarOption {
    /// Returns the unencoded query value.
    #[must_use]
    pub fn query_value(&self) -> String {
        match self {
            Self::Status404 => "404".to_string(),
            Self::MysteryPerson => "mp".to_string(),
            Self::Identicon => "identicon".to_string(),
            Self::MonsterId => "monsterid".to_string(),
            Self::Wavatar => "wavatar".to_string(),
            Self::Retro => "retro".to_string(),
            Self::RoboHash => "robohash".to_string(),
            Self::TransparentPng => "blank".to_string(),
            Self::CustomUrl(url) => url.to_string(),
        }
    }
}

impl FromStr for DefaultAvatarOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "404" => Ok(Self::Status404),
            "mp" | "mm" => Ok(Self::MysteryPerson),
            "identicon" => Ok(Self::Identicon),
            "monsterid" => Ok(Self::MonsterId),
            "wavatar" => Ok(Self::Wavatar),
            "retro" => Ok(Self::Retro),
            "robohash" => Ok(Self::RoboHash),
            "blank" => Ok(Self::TransparentPng),
            other => Url::parse(other)
                .map(Self::CustomUrl)
                .map_err(|e| format!("unknown default avatar option {other:?}: {e}")),
        }
    }
}

impl fmt::Display for DefaultAvatarOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query_value())
    }
}

/// Query parameters appended to an avatar URL.
///
/// Unset fields are left out of the query and Gravatar applies its own
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AvatarQueryOptions {
    /// Requested edge length in pixels.
    pub preferred_size: Option<u32>,
    /// Maximum allowed rating.
    pub rating: Option<Rating>,
    /// Fallback when no avatar exists.
    pub default_avatar: Option<DefaultAvatarOption>,
    /// Always serve the default avatar.
    pub force_default: Option<bool>,
}

impl AvatarQueryOptions {
    /// Options sent by the image service unless overridden: `d=404&s=240&r=g`.
    #[must_use]
    pub fn service_defaults() -> Self {
        Self {
            preferred_size: Some(DEFAULT_AVATAR_SIZE),
            rating: Some(Rating::G),
            default_avatar: Some(DefaultAvatarOption::Status404),
            force_default: None,
        }
    }

    /// Sets the preferred size, clamped to what Gravatar accepts.
    #[must_use]
    pub fn with_preferred_size(mut self, size: u32) -> Self {
        self.preferred_size = Some(size.clamp(1, MAX_AVATAR_SIZE));
        self
    }

    /// Sets the rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Sets the default avatar option.
    #[must_use]
    pub fn with_default_avatar(mut self, option: DefaultAvatarOption) -> Self {
        self.default_avatar = Some(option);
        self
    }

    /// Sets whether the default avatar is always served.
    #[must_use]
    pub const fn with_force_default(mut self, force: bool) -> Self {
        self.force_default = Some(force);
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(default_avatar) = &self.default_avatar {
            pairs.push(("d", default_avatar.query_value()));
        }
        if let Some(size) = self.preferred_size {
            pairs.push(("s", size.clamp(1, MAX_AVATAR_SIZE).to_string()));
        }
        if let Some(rating) = self.rating {
            pairs.push(("r", rating.as_str().to_string()));
        }
        match self.force_default {
            Some(true) => pairs.push(("f", "y".to_string())),
            Some(false) => pairs.push(("f", "n".to_string())),
            None => {}
        }
        pairs
    }

    fn from_query(url: &Url) -> Self {
        let mut options = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "d" | "default" => options.default_avatar = value.parse().ok(),
                "s" | "size" => options.preferred_size = value.parse().ok(),
                "r" | "rating" => options.rating = value.parse().ok(),
                "f" | "forcedefault" => options.force_default = Some(value == "y"),
                _ => {}
            }
        }
        options
    }
}

/// A Gravatar avatar URL: identifier plus query options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUrl {
    canonical: Url,
    url: Url,
    options: AvatarQueryOptions,
}

impl AvatarUrl {
    /// Builds an avatar URL under [`DEFAULT_AVATAR_BASE_URL`].
    ///
    /// Returns `None` if the identifier is empty.
    #[must_use]
    pub fn new(identifier: &AvatarIdentifier, options: AvatarQueryOptions) -> Option<Self> {
        let base = Url::parse(DEFAULT_AVATAR_BASE_URL).ok()?;
        Self::with_base(&base, identifier, options)
    }

    /// Builds an avatar URL under a custom base, which must end with `/`.
    #[must_use]
    pub fn with_base(
        base: &Url,
        identifier: &AvatarIdentifier,
        options: AvatarQueryOptions,
    ) -> Option<Self> {
        if identifier.is_empty() {
            return None;
        }
        let canonical = base.join(&identifier.identifier()).ok()?;
        Some(Self::assemble(canonical, options))
    }

    /// Parses an existing avatar URL, keeping its query options.
    ///
    /// Returns `None` for URLs that are not Gravatar avatar URLs.
    #[must_use]
    pub fn parse(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        if host != "gravatar.com" && !host.ends_with(".gravatar.com") {
            return None;
        }
        let mut segments = url.path_segments()?;
        if segments.next()? != "avatar" {
            return None;
        }
        let hash = segments.next().filter(|s| !s.is_empty())?;

        let mut canonical = url.clone();
        canonical.set_query(None);
        canonical.set_fragment(None);
        canonical.set_path(&format!("/avatar/{hash}"));

        Some(Self::assemble(canonical, AvatarQueryOptions::from_query(url)))
    }

    /// Returns a copy with different query options.
    #[must_use]
    pub fn replacing(&self, options: AvatarQueryOptions) -> Self {
        Self::assemble(self.canonical.clone(), options)
    }

    /// Returns the full URL including the query.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the URL without any query.
    #[must_use]
    pub const fn canonical_url(&self) -> &Url {
        &self.canonical
    }

    /// Returns the query options.
    #[must_use]
    pub const fn options(&self) -> &AvatarQueryOptions {
        &self.options
    }

    /// Returns the hash path segment.
    #[must_use]
    pub fn hash_id(&self) -> Option<HashId> {
        self.canonical
            .path_segments()
            .and_then(|mut segments| segments.nth(1).map(HashId::new))
    }

    fn assemble(canonical: Url, options: AvatarQueryOptions) -> Self {
        let mut url = canonical.clone();
        let pairs = options.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Self {
            canonical,
            url,
            options,
        }
    }
}

impl fmt::Display for AvatarUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
