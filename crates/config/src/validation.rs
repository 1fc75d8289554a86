//! Field validation shared by the config sections

pub use crate::error::ValidationError;
use url::Url;

/// One `[table]` of the config file
///
/// Implemented by AppConfig, PlayerConfig and NetworkConfig.
pub trait ConfigSection: Default {
    /// Every failing field of the section, or `Ok` when all pass
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Takes every value from `other`
    fn merge(&mut self, other: Self);

    fn section_name(&self) -> &'static str;
}

/// Field checks; each returns the error for `field` or `Ok`
pub struct Validator;

impl Validator {
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ));
        }
        Ok(())
    }

    /// Accepts an absolute http(s) URL with a host, parsed the way the
    /// resolver will later parse it when building request URLs
    pub fn http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        let url = Url::parse(value)
            .map_err(|e| ValidationError::with_value(field, format!("is not a URL ({})", e), value))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::with_value(
                field,
                "must use http or https",
                value,
            ));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ValidationError::with_value(field, "must name a host", value));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ValidationError::with_value(
                field,
                "must not carry a query or fragment",
                value,
            ));
        }
        Ok(())
    }

    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "must not be empty"));
        }
        Ok(())
    }

    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
