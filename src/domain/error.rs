//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stockscope.
#[derive(Debug, thiserror::Error)]
pub enum StockscopeError {
    #[error("data load error in {origin}: {reason}")]
    DataLoad { origin: String, reason: String },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown asset: {asset}")]
    UnknownAsset { asset: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid value for --{flag}: {reason}")]
    InvalidArgument { flag: String, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockscopeError {
    pub fn data_load(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        StockscopeError::DataLoad {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

impl From<&StockscopeError> for std::process::ExitCode {
    fn from(err: &StockscopeError) -> Self {
        let code: u8 = match err {
            StockscopeError::Io(_) | StockscopeError::Report { .. } => 1,
            StockscopeError::ConfigParse { .. }
            | StockscopeError::ConfigMissing { .. }
            | StockscopeError::ConfigInvalid { .. }
            | StockscopeError::InvalidArgument { .. } => 2,
            StockscopeError::DataLoad { .. } => 3,
            StockscopeError::InvalidRange { .. } | StockscopeError::UnknownAsset { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_load_display_names_origin() {
        let err = StockscopeError::data_load("data/AAA.csv", "missing close column");
        assert_eq!(
            err.to_string(),
            "data load error in data/AAA.csv: missing close column"
        );
    }

    #[test]
    fn invalid_range_display() {
        let err = StockscopeError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "invalid date range: start 2024-03-01 is after end 2024-01-01"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StockscopeError = io.into();
        assert!(matches!(err, StockscopeError::Io(_)));
    }

    #[test]
    fn exit_codes_group_by_kind() {
        let code = |err: StockscopeError| format!("{:?}", std::process::ExitCode::from(&err));
        let expect = |n: u8| format!("{:?}", std::process::ExitCode::from(n));

        assert_eq!(code(StockscopeError::Report { reason: "x".into() }), expect(1));
        assert_eq!(
            code(StockscopeError::ConfigMissing {
                section: "data".into(),
                key: "dir".into()
            }),
            expect(2)
        );
        assert_eq!(
            code(StockscopeError::InvalidArgument {
                flag: "assets".into(),
                reason: "empty token in asset list".into()
            }),
            expect(2)
        );
        assert_eq!(code(StockscopeError::data_load("AAA", "bad row")), expect(3));
        assert_eq!(
            code(StockscopeError::UnknownAsset {
                asset: "ZZZ".into()
            }),
            expect(4)
        );
    }
}
