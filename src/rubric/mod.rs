pub mod model;
pub mod types;
pub mod validation;

pub use model::{Group, Question, RubricModel, Section};
pub use types::{GroupDocument, Id, ModelInfo, QuestionDocument, RubricDocument, SectionDocument};
pub use validation::validate_rubric;
