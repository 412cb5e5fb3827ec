use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidPhoneNumber { input: String },
    InvalidUrl { input: String },
    BrandTooLong { max: usize, actual: usize },
    UnserializableBody { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidUrl { input } => write!(f, "invalid url: {input}"),
            Self::BrandTooLong { max, actual } => {
                write!(f, "brand too long: {actual} characters (max {max})")
            }
            Self::UnserializableBody { message } => {
                write!(f, "request body could not be serialized: {message}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
