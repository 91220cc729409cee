/// LLM, weather and limits shared by the generation pipelines
pub mod assistant;
/// Styling assistant chat
pub mod chat;
/// Daily suggestion batch
pub mod daily;
/// Instant outfit ideas
pub mod instant;
/// Interaction recording and preference analysis
pub mod learning;
/// Outfits, wear logs and ratings
pub mod outfit;
/// Per-owner preferences
pub mod preferences;
/// Style quiz
pub mod quiz;
/// Daily usage quotas
pub mod quota;
/// Weather bracket pre-selection
pub mod selection;
/// Daily suggestion persistence
pub mod suggestion;
/// Fashion trend catalogue
pub mod trend;
/// Clothing items
pub mod wardrobe;
