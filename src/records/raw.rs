//! Raw API payloads
//!
//! Every field is optional and kept as an untyped JSON value. A field that is
//! absent from the payload stays `None`; a field present with `null` becomes
//! `Some(Value::Null)`, so normalization can tell the two apart.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Keeps explicit nulls as `Some(Value::Null)` instead of collapsing them to `None`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

macro_rules! raw_payload {
    (
        $(#[$meta:meta])*
        pub struct $name:ident { $($field:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        pub struct $name {
            $(
                #[serde(default, deserialize_with = "present")]
                pub $field: Option<Value>,
            )+
        }
    };
}

raw_payload! {
    /// Profile lookup response
    pub struct RawProfile {
        id,
        name,
        screen_name,
        created_at,
        description,
        location,
        url,
        profile_image_url,
        protected,
        is_blue_verified,
        followers_count,
        statuses_count,
        listed_count,
        profile_banner_url,
        description_urls,
        urls,
        pinned_tweet_ids,
        verified,
        possibly_sensitive,
        can_dm,
        can_media_tag,
        want_retweets,
        default_profile,
        default_profile_image,
        has_custom_timelines,
        fast_followers_count,
        normal_followers_count,
        favourites_count,
        media_count,
        is_translator,
        translator_type,
        profile_interstitial_type,
        withheld_in_countries,
    }
}

raw_payload! {
    /// One timeline item inside a page
    pub struct RawItem {
        id,
        full_text,
        created_at,
        retweet_count,
        favorite_count,
        reply_count,
        quote_count,
        view_count,
        view_count_state,
        lang,
        is_quote_status,
        possibly_sensitive,
        is_edit_eligible,
        edits_remaining,
    }
}

impl RawProfile {
    /// Returns the internal identifier needed for timeline requests
    ///
    /// Numeric identifiers are accepted and rendered as decimal text.
    pub fn internal_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One page of timeline items
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page<T = RawItem> {
    #[serde(default)]
    pub items: Vec<T>,

    /// Continuation token; absence ends the stream
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Creates a page with the given items and continuation token
    pub fn new(items: Vec<T>, next_cursor: Option<&str>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.map(str::to_string),
        }
    }

    /// Returns the continuation token, treating an empty token as absent
    pub fn cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }

    /// Returns true if this page ends the stream
    pub fn is_last(&self) -> bool {
        self.items.is_empty() || self.cursor().is_none()
    }
}
