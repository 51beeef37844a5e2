pub mod aggregator;
pub mod column_resolver;
pub mod frequency;
pub mod normalizer;
pub mod palette;
pub mod pipeline;

pub use aggregator::aggregate;
pub use column_resolver::{classify_header, resolve_columns};
pub use frequency::frequency_table;
pub use normalizer::{classify_row, normalize_row, normalize_rows, RowOutcome};
pub use palette::{assign_colors, generate_palette};
pub use pipeline::run_pipeline;
