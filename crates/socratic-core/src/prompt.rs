//! Prompt construction for one student inquiry

use socratic_ai::{GenerateRequest, HistoryEntry};

use crate::error::SubmitError;
use crate::message::{Message, StructuredInput};

/// Fixed instruction that shapes every tutor reply
pub const SYSTEM_INSTRUCTION: &str = r####"
You are a Socratic Tutor and Educational Evaluator.
Your goal is to help the user learn by evaluating their current understanding and guiding them deeper.

The user will provide two inputs:
1. A Topic or Question they are exploring.
2. Their current Perspective ("The way I see it is...").

Your response MUST follow this exact structure using Markdown Headers:

### Evaluation
Acknowledge the user's perspective. Evaluate it for accuracy, logic, and nuance. Point out what they got right and where there might be misconceptions. Be constructive and encouraging.

### Elaboration
Provide a structured explanation or deeper insight into the topic, addressing the gaps identified in the evaluation. Get at the crux (the one thing that most people don't intuitively get) behind this discussion.

### The Socratic Turn
*End your response with a single, thought-provoking question that targets the crux of the discussion to advance the user's understanding.*

STRICT FORMATTING RULES:
1. Use "### " (Markdown H3) for the section titles: **Evaluation**, **Elaboration**, and **The Socratic Turn**.
2. **Double Newline**: Ensure there is a full blank line (two newlines) before each header (especially "Elaboration" and "The Socratic Turn").
3. The content of the question in "The Socratic Turn" MUST be italicized.

Tone: Unbiased, educational, encouraging, and intellectual.
"####;

/// A validated inquiry, trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inquiry {
    pub topic: String,
    pub perspective: String,
}

impl Inquiry {
    /// Trim both fields and reject either one being empty
    pub fn parse(topic: &str, perspective: &str) -> Result<Self, SubmitError> {
        let topic = topic.trim();
        let perspective = perspective.trim();
        if topic.is_empty() {
            return Err(SubmitError::EmptyTopic);
        }
        if perspective.is_empty() {
            return Err(SubmitError::EmptyPerspective);
        }
        Ok(Self {
            topic: topic.to_string(),
            perspective: perspective.to_string(),
        })
    }

    /// Display string stored as the user turn's content
    pub fn display_text(&self) -> String {
        format!("Topic: {}\nPerspective: {}", self.topic, self.perspective)
    }

    /// Prompt sent to the model for this inquiry
    pub fn prompt(&self) -> String {
        format!(
            "\nTOPIC/QUESTION: {}\n\nUSER'S CURRENT PERSPECTIVE (The way I see it is...):\n{}\n",
            self.topic, self.perspective
        )
    }
}

/// Both artifacts produced for one submission
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    /// The user turn to append to the store
    pub message: Message,
    /// The request to hand to the generator
    pub request: GenerateRequest,
}

/// Build the user message and the request payload.
///
/// `history` is the store as it was before this turn; the new inquiry travels
/// as the prompt rather than as a history entry.
pub fn prepare_turn(
    inquiry: Inquiry,
    history: Vec<HistoryEntry>,
    timestamp: i64,
    model: &str,
    temperature: f32,
) -> PreparedTurn {
    let request = GenerateRequest {
        model: model.to_string(),
        history,
        prompt: inquiry.prompt(),
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        temperature,
    };

    let display_text = inquiry.display_text();
    let message = Message::user(
        StructuredInput {
            topic: inquiry.topic,
            perspective: inquiry.perspective,
        },
        display_text,
        timestamp,
    );

    PreparedTurn { message, request }
}
