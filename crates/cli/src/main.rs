//! `allyflow` - offline tools around the drafting pipeline.
//!
//! - `dates`: run the date-range resolver over a piece of text
//! - `extract`: clean a generated reply from stdin into JSON
//! - `config`: print the effective configuration, API key masked
//! - `inquiry`: draft an inquiry message with the configured generator
//! - `benefit`: draft a store's benefit post with the configured generator

use std::io::Read;
use std::path::PathBuf;

use allyflow_ai::{DraftSource, DraftingPipeline};
use allyflow_infra::drafting::{BenefitDraftKind, BenefitInput, InquiryDraftKind, InquiryInput};
use allyflow_infra::{GeminiClient, WorkflowConfig};
use allyflow_observability::LogFormat;
use allyflow_core::DateRange;
use allyflow_partnerships::{Keywords, OrganizationDescriptor, PeriodDescriptor};
use allyflow_text::PatternFamily;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "allyflow")]
#[command(about = "Partnership workflow drafting tools")]
#[command(version)]
struct Args {
    /// Log output format (json or text)
    #[arg(long, default_value = "text", env = "ALLYFLOW_LOG_FORMAT", global = true)]
    log_format: LogFormat,

    /// TOML configuration file
    #[arg(long, env = "ALLYFLOW_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a natural-language date range
    Dates {
        text: String,
        /// Year source for partial dates (defaults to today)
        #[arg(long)]
        reference: Option<NaiveDate>,
    },
    /// Read a generated reply from stdin and print the structured record
    Extract,
    /// Print the effective configuration
    Config,
    /// Draft an inquiry message
    Inquiry {
        #[arg(long)]
        purpose: String,
        #[arg(long, default_value = "CUSTOM")]
        period_type: String,
        #[arg(long)]
        period_value: String,
        #[arg(long, default_value = "STUDENT_COUNCIL")]
        org_type: String,
        #[arg(long, default_value = "")]
        org_value: String,
        #[arg(long)]
        detail: String,
        /// Comma-separated tone keywords
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,
    },
    /// Draft the body of a store's benefit post
    Benefit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        benefit: String,
        #[arg(long)]
        condition: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Mention the attached image in the copy
        #[arg(long)]
        image: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    allyflow_observability::tracing::init(
        args.log_format,
        allyflow_observability::tracing::DEFAULT_FILTER,
    );

    match args.command {
        Command::Dates { text, reference } => dates(&text, reference),
        Command::Extract => extract(),
        Command::Config => print_config(args.config),
        Command::Inquiry {
            purpose,
            period_type,
            period_value,
            org_type,
            org_value,
            detail,
            keywords,
        } => {
            let input = InquiryInput {
                purpose,
                period: PeriodDescriptor::new(period_type.parse()?, period_value),
                organization: OrganizationDescriptor::new(org_type.parse()?, org_value),
                detail,
                keywords: Keywords::parse(&keywords)?,
            };
            inquiry(args.config, input).await
        }
        Command::Benefit {
            title,
            target,
            benefit,
            condition,
            start,
            end,
            image,
        } => {
            let input = BenefitInput {
                title,
                target,
                benefit,
                condition,
                start_date: start,
                end_date: end,
                has_image: image,
            };
            benefit_post(args.config, input).await
        }
    }
}

fn dates(text: &str, reference: Option<NaiveDate>) -> Result<()> {
    let reference = reference.unwrap_or_else(|| Local::now().date_naive());
    let (family, range) = allyflow_text::detect(text, reference)
        .with_context(|| format!("no date range found in `{text}`"))?;
    debug!(?family, %reference, "date range resolved");
    println!("{}", serde_json::to_string_pretty(&range_json(family, range))?);
    Ok(())
}

fn range_json(family: PatternFamily, range: DateRange) -> serde_json::Value {
    serde_json::json!({
        "family": family.as_str(),
        "start": range.start(),
        "end": range.end(),
    })
}

fn extract() -> Result<()> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read stdin")?;
    let value = allyflow_text::extract_value(&raw)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_config(path: Option<PathBuf>) -> Result<()> {
    let config = WorkflowConfig::load(path.as_deref()).context("failed to load configuration")?;
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

async fn inquiry(path: Option<PathBuf>, input: InquiryInput) -> Result<()> {
    let config = WorkflowConfig::load(path.as_deref()).context("failed to load configuration")?;
    let client = GeminiClient::from_config(&config.generation)?;
    let pipeline = DraftingPipeline::new(client);

    let drafted = pipeline
        .draft(&InquiryDraftKind, &input, Local::now().date_naive())
        .await?;
    if drafted.source == DraftSource::Fallback {
        warn!("generated reply was unusable; printing the fallback message");
    }
    println!("{}", drafted.output);
    Ok(())
}

async fn benefit_post(path: Option<PathBuf>, input: BenefitInput) -> Result<()> {
    let config = WorkflowConfig::load(path.as_deref()).context("failed to load configuration")?;
    let client = GeminiClient::from_config(&config.generation)?;
    let pipeline = DraftingPipeline::new(client);

    let drafted = pipeline
        .draft(&BenefitDraftKind, &input, Local::now().date_naive())
        .await?;
    if drafted.source == DraftSource::Fallback {
        warn!("generated reply was unusable; printing the filled sample");
    }
    println!("{}", drafted.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accepts_a_reference_date() {
        let args = Args::try_parse_from([
            "allyflow",
            "dates",
            "9월 1일 ~ 14일",
            "--reference",
            "2025-03-01",
        ])
        .unwrap();
        match args.command {
            Command::Dates { text, reference } => {
                assert_eq!(text, "9월 1일 ~ 14일");
                assert_eq!(reference, NaiveDate::from_ymd_opt(2025, 3, 1));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(args.log_format, LogFormat::Text);
    }

    #[test]
    fn inquiry_splits_keywords() {
        let args = Args::try_parse_from([
            "allyflow",
            "--log-format",
            "json",
            "inquiry",
            "--purpose",
            "축제 제휴",
            "--period-value",
            "3개월",
            "--detail",
            "할인 요청",
            "--keywords",
            "친절함,간결함",
        ])
        .unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
        match args.command {
            Command::Inquiry { keywords, period_type, .. } => {
                assert_eq!(keywords, vec!["친절함", "간결함"]);
                assert_eq!(period_type, "CUSTOM");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn dates_output_uses_snake_case_family_names() {
        let reference = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let (family, range) = allyflow_text::detect("2025년 9월 1일 ~ 14일", reference).unwrap();
        let out = range_json(family, range);
        assert_eq!(out["family"], "korean_day_omitted");
        assert_eq!(out["start"], "2025-09-01");
        assert_eq!(out["end"], "2025-09-14");
    }

    #[test]
    fn benefit_takes_optional_dates_and_image_flag() {
        let args = Args::try_parse_from([
            "allyflow",
            "benefit",
            "--title",
            "축제 할인",
            "--target",
            "재학생",
            "--benefit",
            "10% 할인",
            "--condition",
            "학생증 제시",
            "--start",
            "2025-09-01",
            "--image",
        ])
        .unwrap();
        match args.command {
            Command::Benefit { start, end, image, .. } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2025, 9, 1));
                assert_eq!(end, None);
                assert!(image);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(Args::try_parse_from(["allyflow", "--log-format", "xml", "extract"]).is_err());
    }
}
