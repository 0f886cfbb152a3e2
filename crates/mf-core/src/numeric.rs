use crate::MfError;

/// Floating point type used for every model variable.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: impl Into<String>) -> Result<Real, MfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MfError::NonFinite {
            what: what.into(),
            value: v,
        })
    }
}
