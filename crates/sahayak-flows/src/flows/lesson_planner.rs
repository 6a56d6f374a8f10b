//! Game and lesson plan generation.
//!
//! One call produces both a lesson plan and a matching educational game
//! description for the given topic and grade.

use serde::{Deserialize, Serialize};

use sahayak_model::{ModelClient, ModelRequest};

use crate::config::Config;
use crate::error::Result;
use crate::prompt;

use super::{generation_failure, require_non_empty};

const FLOW_NAME: &str = "gameAndLessonPlan";

const PROMPT_TEMPLATE: &str = r#"You are an experienced educator skilled in creating engaging and effective lesson plans and educational games.

Based on the following information, create a lesson plan and a game description:

Topic: {{{topic}}}
Grade Level: {{{gradeLevel}}}
Learning Objectives: {{{learningObjectives}}}
Game Type: {{{gameType}}}

Ensure that the lesson plan is comprehensive and includes activities, assessments, and resources.
The game description should detail the game's rules, objectives, and how it reinforces the learning objectives.

Respond with a single JSON object: {"lessonPlan": "<the lesson plan>", "gameDescription": "<the game description>"}"#;

/// Input for game and lesson plan generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlannerInput {
    /// The lesson topic.
    pub topic: String,
    /// The grade level the lesson is for.
    pub grade_level: String,
    /// What the students should learn.
    pub learning_objectives: String,
    /// The kind of game to design (e.g. quiz, puzzle, simulation).
    pub game_type: String,
}

impl LessonPlannerInput {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("topic", &self.topic)?;
        require_non_empty("gradeLevel", &self.grade_level)?;
        require_non_empty("learningObjectives", &self.learning_objectives)?;
        require_non_empty("gameType", &self.game_type)
    }
}

/// A lesson plan and its companion game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlannerOutput {
    /// The detailed lesson plan.
    pub lesson_plan: String,
    /// Rules and objectives of the educational game.
    pub game_description: String,
}

/// Runs the game and lesson plan flow.
///
/// # Errors
///
/// Returns a validation error for bad input (no model call is made) or a
/// generation error if the model call fails or the output does not match
/// the schema.
pub async fn run(
    client: &dyn ModelClient,
    config: &Config,
    input: LessonPlannerInput,
) -> Result<LessonPlannerOutput> {
    input.validate()?;

    let rendered = prompt::render(
        FLOW_NAME,
        PROMPT_TEMPLATE,
        &[
            ("topic", &input.topic),
            ("gradeLevel", &input.grade_level),
            ("learningObjectives", &input.learning_objectives),
            ("gameType", &input.game_type),
        ],
    )?;

    let response = client
        .generate(ModelRequest::text(&config.text_model, rendered))
        .await
        .map_err(|e| generation_failure(FLOW_NAME, e))?;
    response
        .structured_json()
        .map_err(|e| generation_failure(FLOW_NAME, e))
}
