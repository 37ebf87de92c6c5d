pub mod formatter;

pub use formatter::{
    format_industry_chart, format_json, format_model_list, format_rating_chart, format_score,
    format_score_table, format_summary, format_tsv, should_use_colors,
};
