pub mod engine;
pub mod normalize;
pub mod rating;
pub mod weights;

pub use engine::{
    group_score, questions_score, score_companies, section_score, CollisionPolicy, CompanyScore,
    ScoreRun, ScoringDiagnostics,
};
pub use normalize::{normalize_total, round4};
pub use rating::Rating;
pub use weights::{parse_weight_override, SectionWeights};
