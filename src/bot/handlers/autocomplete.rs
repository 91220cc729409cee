//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are always limited to the invoking user's own rows.

use crate::{bot::BotData, core::outfit, errors::Error};

/// Provides autocomplete suggestions for the user's outfit names.
///
/// Returns up to 25 names containing `partial` (case-insensitive), sorted
/// alphabetically.
pub async fn autocomplete_outfit_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let user_id = ctx.author().id.to_string();

    let Ok(outfits) = outfit::list_outfits(db, &user_id).await else {
        return Vec::new();
    };

    filter_names(outfits.into_iter().map(|o| o.name), partial)
}

/// Case-insensitive substring filter, at most 25 results (Discord's limit), sorted.
fn filter_names(names: impl Iterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    let mut matching: Vec<String> = names
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(25)
        .collect();

    matching.sort();
    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_names() {
        let names = ["Office Monday", "Beach day", "office casual", "Date night"]
            .into_iter()
            .map(String::from);
        assert_eq!(
            filter_names(names, "OFF"),
            vec!["Office Monday".to_string(), "office casual".to_string()]
        );

        let many = (0..40).map(|i| format!("Look {i:02}"));
        assert_eq!(filter_names(many, "").len(), 25);
    }
}
