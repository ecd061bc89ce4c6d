//! Plugin wire format.
//!
//! ```text
//! <message>[|<perfdata>]
//! ```
//!
//! Perfdata is either newline-separated `key=value` pairs in insertion order
//! or a single JSON object. The whole blob is cut at the output limit and the
//! exit code carries the status.

use std::io::{self, Write};

use crate::result::CheckResult;
use crate::status::Status;

/// Default cap on the size of the emitted blob.
pub const DEFAULT_LIMIT: usize = 4096;

/// How a finished result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub json: bool,
    pub limit: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            json: false,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Serialized check output ready to be written to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub text: String,
    pub status: Status,
    pub exit_code: i32,
}

impl Output {
    /// Write the blob once, without a trailing newline.
    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_all(self.text.as_bytes())?;
        writer.flush()
    }
}

/// Serialize `result` and map its status to an exit code.
pub fn format(mut result: CheckResult, options: &OutputOptions) -> Output {
    result.apply_missing_message();

    let mut text = result.message().to_string();
    let perfdata = result.perfdata();
    if !perfdata.is_empty() {
        text.push('|');
        if options.json {
            // A map of strings, integers and finite reals always serializes.
            text.push_str(&serde_json::to_string(perfdata).unwrap_or_default());
        } else {
            let pairs: Vec<String> = perfdata
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            text.push_str(&pairs.join("\n"));
        }
    }
    truncate(&mut text, options.limit);

    let status = result.status();
    Output {
        text,
        status,
        exit_code: status.exit_code(),
    }
}

/// Cut `text` to at most `limit` bytes on a character boundary.
fn truncate(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::MISSING_MESSAGE;

    fn sample() -> CheckResult {
        let mut result = CheckResult::new();
        result.set_message("Load OK").unwrap();
        result.add_metric("loadavg_one", 0.5).unwrap();
        result.add_metric("procs", 12).unwrap();
        result.add_metric("note", "steady").unwrap();
        result
    }

    #[test]
    fn text_perfdata() {
        let output = format(sample(), &OutputOptions::default());
        assert_eq!(
            output.text,
            "Load OK|loadavg_one=0.5\nprocs=12\nnote=steady"
        );
        assert_eq!(output.exit_code, 0);
    }

    #[test]
    fn json_perfdata_keeps_insertion_order() {
        let options = OutputOptions {
            json: true,
            ..OutputOptions::default()
        };
        let output = format(sample(), &options);
        assert_eq!(
            output.text,
            r#"Load OK|{"loadavg_one":0.5,"procs":12,"note":"steady"}"#
        );
    }

    #[test]
    fn no_perfdata_means_no_delimiter() {
        let mut result = CheckResult::new();
        result.set_message("all good").unwrap();
        let output = format(result, &OutputOptions::default());
        assert_eq!(output.text, "all good");
    }

    #[test]
    fn missing_message_forces_critical() {
        let mut result = CheckResult::new();
        result.add_metric("x", 1).unwrap();
        let output = format(result, &OutputOptions::default());
        assert_eq!(output.text, format!("{MISSING_MESSAGE}|x=1"));
        assert_eq!(output.status, Status::Critical);
        assert_eq!(output.exit_code, 2);
    }

    #[test]
    fn missing_message_overrides_unknown() {
        let mut result = CheckResult::new();
        result.escalate(Status::Unknown);
        let output = format(result, &OutputOptions::default());
        assert_eq!(output.exit_code, 2);
    }

    #[test]
    fn exit_code_follows_status() {
        for (status, code) in [
            (Status::Ok, 0),
            (Status::Warn, 1),
            (Status::Critical, 2),
            (Status::Unknown, 3),
        ] {
            let mut result = CheckResult::new();
            result.set_message("m").unwrap();
            result.escalate(status);
            assert_eq!(format(result, &OutputOptions::default()).exit_code, code);
        }
    }

    #[test]
    fn whole_blob_is_truncated() {
        let mut result = CheckResult::new();
        result.set_message("x".repeat(30)).unwrap();
        result.add_metric("key", "y".repeat(30)).unwrap();
        let options = OutputOptions {
            json: false,
            limit: 40,
        };
        let output = format(result, &options);
        assert_eq!(output.text.len(), 40);
        assert_eq!(output.text, format!("{}|key={}", "x".repeat(30), "y".repeat(5)));
    }

    #[test]
    fn default_limit_is_4096() {
        let mut result = CheckResult::new();
        result.set_message("z".repeat(5000)).unwrap();
        let output = format(result, &OutputOptions::default());
        assert_eq!(output.text.len(), DEFAULT_LIMIT);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut text = "aé".to_string();
        truncate(&mut text, 2);
        assert_eq!(text, "a");
    }

    #[test]
    fn write_to_emits_text_verbatim() {
        let output = format(sample(), &OutputOptions::default());
        let mut buf = Vec::new();
        output.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), output.text);
    }
}
