use clap::{Args, Parser, Subcommand};
use facematch::QualityFilter;

#[derive(Parser)]
#[command(
    name = "facematch",
    version,
    about = "Compare faces between two images using a remote comparison service"
)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare the face in the source image with the faces in the target image
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Source image: s3://bucket/key[?versionId=..] or a local file
    #[arg(long)]
    pub source: String,

    /// Target image: s3://bucket/key[?versionId=..] or a local file
    #[arg(long)]
    pub target: String,

    /// Service region, e.g. us-east-1
    #[arg(long, env = "FACEMATCH_REGION")]
    pub region: String,

    /// Endpoint override (e.g. a signing proxy)
    #[arg(long, env = "FACEMATCH_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Per-attempt timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Retries for transient failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Minimum similarity (0-100) for a face to count as a match
    #[arg(long)]
    pub similarity_threshold: Option<f32>,

    /// Service-side quality filter: none, auto, low, medium, high
    #[arg(long, value_parser = parse_quality_filter)]
    pub quality_filter: Option<QualityFilter>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_quality_filter(s: &str) -> Result<QualityFilter, String> {
    s.parse().map_err(|e: facematch::ComparisonError| e.to_string())
}
