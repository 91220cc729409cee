//! Style quiz - a fixed catalogue of questions whose answers carry style tags.

use crate::{
    core::{learning, preferences},
    entities::{TagList, user_preferences},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde_json::json;

/// Number of style tags kept from a quiz
pub const QUIZ_STYLE_COUNT: usize = 3;

/// One answer option and the styles it points to
#[derive(Debug, Clone, Copy)]
pub struct QuizOption {
    /// Answer text
    pub label: &'static str,
    /// Style tags credited when chosen
    pub styles: &'static [&'static str],
}

/// One quiz question
#[derive(Debug, Clone, Copy)]
pub struct QuizQuestion {
    /// Question text
    pub prompt: &'static str,
    /// Answer options, addressed by index
    pub options: &'static [QuizOption],
}

/// The style quiz
pub const QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        prompt: "Pick a weekend outfit",
        options: &[
            QuizOption { label: "Jeans and a crisp white tee", styles: &["classic", "minimal"] },
            QuizOption { label: "Flowy maxi dress", styles: &["boho", "romantic"] },
            QuizOption { label: "Oversized hoodie and sneakers", styles: &["streetwear", "sporty"] },
            QuizOption { label: "Tailored trousers and loafers", styles: &["classic", "elegant"] },
        ],
    },
    QuizQuestion {
        prompt: "Which colour palette feels most like you?",
        options: &[
            QuizOption { label: "Black, white and grey", styles: &["minimal", "edgy"] },
            QuizOption { label: "Earthy browns and greens", styles: &["boho", "casual"] },
            QuizOption { label: "Soft pastels", styles: &["romantic", "feminine"] },
            QuizOption { label: "Bold brights", styles: &["trendy", "streetwear"] },
        ],
    },
    QuizQuestion {
        prompt: "Your go-to shoes?",
        options: &[
            QuizOption { label: "White sneakers", styles: &["casual", "sporty"] },
            QuizOption { label: "Ankle boots", styles: &["edgy", "boho"] },
            QuizOption { label: "Ballet flats", styles: &["feminine", "classic"] },
            QuizOption { label: "Heeled pumps", styles: &["elegant", "feminine"] },
        ],
    },
    QuizQuestion {
        prompt: "What matters most when you get dressed?",
        options: &[
            QuizOption { label: "Comfort", styles: &["casual", "sporty"] },
            QuizOption { label: "Looking put-together", styles: &["classic", "elegant"] },
            QuizOption { label: "Standing out", styles: &["trendy", "edgy"] },
            QuizOption { label: "Expressing my mood", styles: &["boho", "romantic"] },
        ],
    },
    QuizQuestion {
        prompt: "Pick a statement piece",
        options: &[
            QuizOption { label: "Leather jacket", styles: &["edgy", "streetwear"] },
            QuizOption { label: "Camel coat", styles: &["classic", "minimal"] },
            QuizOption { label: "Embroidered blouse", styles: &["boho", "feminine"] },
            QuizOption { label: "Graphic bomber", styles: &["trendy", "streetwear"] },
        ],
    },
];

/// Tallies the style tags of the chosen options and returns the top three.
///
/// `choices[i]` is the option index picked for question `i`. Ties keep the order in
/// which the styles were first credited.
pub fn score_quiz(choices: &[usize]) -> Result<TagList> {
    if choices.len() != QUESTIONS.len() {
        return Err(Error::validation(format!(
            "Expected {} answers, got {}",
            QUESTIONS.len(),
            choices.len()
        )));
    }

    let mut tally: Vec<(&'static str, usize)> = Vec::new();
    for (question, &choice) in QUESTIONS.iter().zip(choices) {
        let option = question.options.get(choice).ok_or_else(|| {
            Error::validation(format!(
                "Answer {} is out of range for \"{}\"",
                choice + 1,
                question.prompt
            ))
        })?;

        for &style in option.styles {
            match tally.iter_mut().find(|(s, _)| *s == style) {
                Some((_, count)) => *count += 1,
                None => tally.push((style, 1)),
            }
        }
    }

    tally.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(TagList::normalized(
        tally.into_iter().take(QUIZ_STYLE_COUNT).map(|(s, _)| s),
    ))
}

/// Scores the quiz, stores the result on the owner's preferences and records a
/// `quiz_completed` learning datum.
pub async fn apply_quiz(
    db: &DatabaseConnection,
    user_id: &str,
    choices: &[usize],
) -> Result<user_preferences::Model> {
    let styles = score_quiz(choices)?;
    let prefs = preferences::set_quiz_styles(db, user_id, styles.clone()).await?;

    learning::record_interaction(
        db,
        learning::NewLearningDatum {
            user_id: user_id.to_string(),
            interaction_type: learning::QUIZ_COMPLETED.to_string(),
            rating: None,
            feedback: None,
            outfit_data: json!({ "styles": styles.0 }),
            context: json!({ "answers": choices }),
            success: true,
        },
    )
    .await?;

    tracing::info!(user_id, styles = ?styles.0, "Style quiz completed");
    Ok(prefs)
}
