//! Dataset preparation and post-processing around a labeling run.

pub mod ids;
pub mod sample;
pub mod split;
pub mod wordsets;

pub use ids::{IdOptions, assign_ids, assign_ids_file};
pub use sample::{DEFAULT_SAMPLE_SIZE, SampleOptions, SampleStats, sample_dir};
pub use split::{CATEGORY_COLUMN, SplitStats, category_file_name, split_by_category};
pub use wordsets::{MergeReport, merge_word_lists, read_word_set};
