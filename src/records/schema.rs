//! Fixed-schema records
//!
//! Each category has one record type with a fixed, ordered field set. Records
//! are built field by field from raw payloads; a missing source field becomes
//! the "not available" sentinel rather than being omitted.

use crate::records::raw::{RawItem, RawProfile};
use crate::records::value::FieldValue;
use serde::Serialize;

/// Common view over fixed-schema records, used by tabular sinks
pub trait Record {
    /// Field names in column order
    const FIELDS: &'static [&'static str];

    /// Field values in the same order as `FIELDS`
    fn values(&self) -> Vec<&FieldValue>;
}

macro_rules! record_schema {
    (
        $(#[$meta:meta])*
        pub struct $name:ident { $($field:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct $name {
            $(pub $field: FieldValue,)+
        }

        impl Record for $name {
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn values(&self) -> Vec<&FieldValue> {
                vec![$(&self.$field),+]
            }
        }
    };
}

record_schema! {
    /// Normalized profile metadata for one entity
    pub struct ProfileRecord {
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

record_schema! {
    /// Normalized timeline item, shared by both content categories
    pub struct ContentRecord {
        tweet_id,
        user_id,
        text,
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

impl ProfileRecord {
    /// Normalizes a profile response
    pub fn from_raw(raw: &RawProfile) -> Self {
        let f = |value: &Option<serde_json::Value>| FieldValue::from_source(value.as_ref());

        Self {
            id: f(&raw.id),
            name: f(&raw.name),
            screen_name: f(&raw.screen_name),
            created_at: f(&raw.created_at),
            description: f(&raw.description),
            location: f(&raw.location),
            url: f(&raw.url),
            profile_image_url: f(&raw.profile_image_url),
            protected: f(&raw.protected),
            is_blue_verified: f(&raw.is_blue_verified),
            followers_count: f(&raw.followers_count),
            statuses_count: f(&raw.statuses_count),
            listed_count: f(&raw.listed_count),
            profile_banner_url: f(&raw.profile_banner_url),
            description_urls: f(&raw.description_urls),
            urls: f(&raw.urls),
            pinned_tweet_ids: f(&raw.pinned_tweet_ids),
            verified: f(&raw.verified),
            possibly_sensitive: f(&raw.possibly_sensitive),
            can_dm: f(&raw.can_dm),
            can_media_tag: f(&raw.can_media_tag),
            want_retweets: f(&raw.want_retweets),
            default_profile: f(&raw.default_profile),
            default_profile_image: f(&raw.default_profile_image),
            has_custom_timelines: f(&raw.has_custom_timelines),
            fast_followers_count: f(&raw.fast_followers_count),
            normal_followers_count: f(&raw.normal_followers_count),
            favourites_count: f(&raw.favourites_count),
            media_count: f(&raw.media_count),
            is_translator: f(&raw.is_translator),
            translator_type: f(&raw.translator_type),
            profile_interstitial_type: f(&raw.profile_interstitial_type),
            withheld_in_countries: f(&raw.withheld_in_countries),
        }
    }
}

impl ContentRecord {
    /// Normalizes one timeline item belonging to `user_id`
    pub fn from_raw(user_id: &str, raw: &RawItem) -> Self {
        let f = |value: &Option<serde_json::Value>| FieldValue::from_source(value.as_ref());

        Self {
            tweet_id: f(&raw.id),
            user_id: FieldValue::text(user_id),
            text: f(&raw.full_text),
            created_at: f(&raw.created_at),
            retweet_count: f(&raw.retweet_count),
            favorite_count: f(&raw.favorite_count),
            reply_count: f(&raw.reply_count),
            quote_count: f(&raw.quote_count),
            view_count: f(&raw.view_count),
            view_count_state: f(&raw.view_count_state),
            lang: f(&raw.lang),
            is_quote_status: f(&raw.is_quote_status),
            possibly_sensitive: f(&raw.possibly_sensitive),
            is_edit_eligible: f(&raw.is_edit_eligible),
            edits_remaining: f(&raw.edits_remaining),
        }
    }
}
