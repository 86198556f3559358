//! CLI boundary: run the hunt, write the report or the failure, pick an exit code

use crate::azure::{ArmClient, DefaultCredentialChain, DiskPager};
use crate::config::{Config, OutputFormat};
use crate::error::{Result, ZombieError};
use crate::error_helpers::REMEDIATION_TIPS;
use crate::exit_codes::exit_code_for;
use crate::hunt::hunt;
use crate::provider::DiskSource;
use crate::validation::{validate_rate, validate_subscription_id};
use std::io::Write;
use std::sync::Arc;

/// Settings for a single run, resolved from CLI flags and config
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub rate_per_gb_month: f64,
    pub output: OutputFormat,
}

impl RunOptions {
    /// A flag beats the config file, which beats the built-in default
    pub fn resolve(
        cli_rate: Option<f64>,
        cli_output: Option<OutputFormat>,
        config: &Config,
    ) -> Result<Self> {
        let rate_per_gb_month = cli_rate.unwrap_or(config.report.rate_per_gb_month);
        validate_rate(rate_per_gb_month)?;
        Ok(Self {
            rate_per_gb_month,
            output: cli_output.unwrap_or(config.report.output),
        })
    }
}

/// Validate the subscription, then wire the credential chain and ARM client
///
/// Nothing goes over the network until the returned pager is first pulled.
pub fn open_listing(subscription_id: &str, config: &Config) -> Result<DiskPager> {
    validate_subscription_id(subscription_id)?;
    let credential = DefaultCredentialChain::from_config(&config.credential, &config.azure);
    let client = ArmClient::new(&config.azure, Arc::new(credential))?;
    Ok(client.list_disks(subscription_id.trim()))
}

/// Hunt for zombies and render the result in the requested format
pub async fn run<S>(source: &mut S, options: &RunOptions) -> Result<String>
where
    S: DiskSource + ?Sized,
{
    let outcome = hunt(source, options.rate_per_gb_month).await?;
    outcome.render(options.output)
}

/// Run and write the outcome; returns the process exit code
///
/// The report is only written once the whole listing succeeded, so a failed
/// run leaves stdout empty.
pub async fn execute<S>(
    source: &mut S,
    options: &RunOptions,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32
where
    S: DiskSource + ?Sized,
{
    let result = run(source, options).await;
    let result = match result {
        Ok(rendered) => {
            writeln!(stdout, "{}", rendered.trim_end_matches('\n')).map_err(ZombieError::from)
        }
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        report_failure(e, stderr);
    }
    exit_code_for(&result)
}

/// Write an error, its cause chain and, for Azure failures, the remediation tips
pub fn report_failure(error: &ZombieError, stderr: &mut dyn Write) {
    // stderr is the last resort; nothing useful to do if it is closed
    let _ = writeln!(stderr, "[ERROR] {}", error);
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  caused by: {}", cause);
        source = cause.source();
    }
    if error.is_collaborator() {
        let _ = write!(stderr, "{}", REMEDIATION_TIPS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_RATE_PER_GB_MONTH;
    use crate::error::CollaboratorStage;
    use crate::error_helpers::collaborator_error;
    use crate::provider::{RawDisk, StaticDiskSource};

    fn text_options(rate: f64) -> RunOptions {
        RunOptions {
            rate_per_gb_month: rate,
            output: OutputFormat::Text,
        }
    }

    fn config_with(rate: f64, output: OutputFormat) -> Config {
        let mut config = Config::default();
        config.report.rate_per_gb_month = rate;
        config.report.output = output;
        config
    }

    #[test]
    fn test_resolve_flags_beat_config() {
        let config = config_with(0.12, OutputFormat::Json);
        let options = RunOptions::resolve(Some(2.0), Some(OutputFormat::Csv), &config).unwrap();
        assert_eq!(options.rate_per_gb_month, 2.0);
        assert_eq!(options.output, OutputFormat::Csv);
    }

    #[test]
    fn test_resolve_config_beats_default() {
        let config = config_with(0.12, OutputFormat::Json);
        let options = RunOptions::resolve(None, None, &config).unwrap();
        assert_eq!(options.rate_per_gb_month, 0.12);
        assert_eq!(options.output, OutputFormat::Json);
    }

    #[test]
    fn test_resolve_defaults() {
        let options = RunOptions::resolve(None, None, &Config::default()).unwrap();
        assert_eq!(options.rate_per_gb_month, DEFAULT_RATE_PER_GB_MONTH);
        assert_eq!(options.output, OutputFormat::Text);
    }

    #[test]
    fn test_resolve_rejects_bad_rates() {
        for rate in [0.0, -1.0, f64::NAN] {
            let err = RunOptions::resolve(None, None, &config_with(rate, OutputFormat::Text))
                .unwrap_err();
            assert!(matches!(err, ZombieError::Validation { .. }), "{:?}", err);
        }
        // A valid flag overrides a bad config value
        let options =
            RunOptions::resolve(Some(1.0), None, &config_with(-1.0, OutputFormat::Text)).unwrap();
        assert_eq!(options.rate_per_gb_month, 1.0);
        assert!(RunOptions::resolve(Some(f64::INFINITY), None, &Config::default()).is_err());
    }

    #[test]
    fn test_open_listing_validates_subscription() {
        let err = open_listing("not-a-guid", &Config::default()).unwrap_err();
        assert!(matches!(err, ZombieError::Validation { .. }));
        assert!(!err.is_collaborator());
    }

    #[test]
    fn test_open_listing_is_lazy() {
        let pager =
            open_listing(" 3f2504e0-4f89-11d3-9a0c-0305e82c3301 ", &Config::default()).unwrap();
        assert_eq!(pager.pages_fetched(), 0);
    }

    #[tokio::test]
    async fn test_execute_success_writes_stdout_only() {
        let mut source = StaticDiskSource::new(vec![RawDisk::new(
            "/resourceGroups/rg1/d1",
            "d1",
            100,
            "Unattached",
        )]);
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = execute(&mut source, &text_options(1.5), &mut out, &mut err).await;
        assert_eq!(code, 0);
        assert!(err.is_empty());
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("| d1 "));
        assert!(out.ends_with("Total estimated monthly waste: $150.00 (rate: $1.50/GB-month)\n"));
    }

    #[tokio::test]
    async fn test_execute_failure_writes_stderr_only() {
        let mut source = StaticDiskSource::from_results(vec![Err(collaborator_error(
            CollaboratorStage::Authenticate,
            "AADSTS7000215: Invalid client secret provided",
        ))]);
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = execute(&mut source, &text_options(1.5), &mut out, &mut err).await;
        assert_eq!(code, 1);
        assert!(out.is_empty());
        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("[ERROR] "));
        assert!(err.contains("Invalid client secret"));
        assert!(err.contains("Tips:"));
    }

    #[test]
    fn test_report_failure_skips_tips_for_validation() {
        let mut err = Vec::new();
        report_failure(
            &ZombieError::Validation {
                field: "rate".to_string(),
                reason: "must be positive".to_string(),
            },
            &mut err,
        );
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("rate"));
        assert!(!err.contains("Tips:"));
    }
}
