use thiserror::Error;

pub type MfResult<T> = Result<T, MfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: String, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_oob_display_names_bounds() {
        let err = MfError::IndexOob {
            what: "output slot",
            index: 7,
            len: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("output slot"));
        assert!(msg.contains("index=7"));
        assert!(msg.contains("len=3"));
    }
}
