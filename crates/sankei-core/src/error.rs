pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("column not found in dataset: {name}")]
    MissingColumn { name: String },

    #[error("at least two flow columns are required, got {count}")]
    InsufficientColumns { count: usize },

    #[error("palette exhausted: {needed} distinct values but only {available} colors")]
    PaletteExhausted { needed: usize, available: usize },

    #[error("column {name} has {len} cells, expected {expected}")]
    ColumnLengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },
}
