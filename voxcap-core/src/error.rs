/// Error types for voxelization and model loading
use thiserror::Error;

/// Errors raised by the voxelization pipeline and its configuration.
#[derive(Debug, Error)]
pub enum VoxelizeError {
    #[error("grid size {size} outside configured range [{min}, {max}]")]
    SizeOutOfRange { size: usize, min: usize, max: usize },

    #[error("size progress must lie in [0, 1], got {0}")]
    InvalidProgress(f32),

    #[error("unit template has no positions or no indices")]
    EmptyTemplate,

    #[error("unit template index {index} out of range for {vertex_count} vertices")]
    TemplateIndexOutOfRange { index: u32, vertex_count: usize },

    #[error("unit template needs {indices} indices but a batch holds at most {max}")]
    TemplateTooLarge { indices: usize, max: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing STL model files.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StlError {
    #[error("file too small to be a valid STL")]
    TooSmall,

    #[error("unexpected end of file in triangle {triangle}")]
    UnexpectedEof { triangle: usize },

    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}

pub type Result<T> = std::result::Result<T, VoxelizeError>;
