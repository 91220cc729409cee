//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility and admin commands
pub mod general;

/// Styling commands: suggestions, chat, preferences and quiz
pub mod style;

/// Wardrobe commands: items, outfits, wear logging and ratings
pub mod wardrobe;

use crate::{bot::BotData, errors::Error};

// Export commands
pub use general::*;
pub use style::*;
pub use wardrobe::*;

/// Every command the bot registers
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        daily_run(),
        premium(),
        item_add(),
        items(),
        item_remove(),
        outfit_create(),
        outfits(),
        wear(),
        history(),
        favorite(),
        rate(),
        suggest(),
        chat(),
        today(),
        accept(),
        weather(),
        insights(),
        prefs(),
        quiz(),
    ]
}
