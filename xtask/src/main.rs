use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Write a small sample documentation tree for manual runs
    Fixtures {
        #[arg(long, default_value = "fixtures/doc_source")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release)?,
        Commands::Fixtures { dir } => write_fixtures(dir)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run");
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

const SAMPLE_QUEUE_PAGE: &str = "# AWS::SQS::Queue<a name=\"aws-resource-sqs-queue\"></a>\n\n\
### Ref<a name=\"aws-resource-sqs-queue-ref\"></a>\n\n\
When you pass the logical ID of this resource to the intrinsic `Ref` function, `Ref` returns the queue URL\\.\n\n\
### Fn::GetAtt<a name=\"aws-resource-sqs-queue-fn::getatt\"></a>\n\n\
`Arn`  <a name=\"Arn-fn::getatt\"></a>\n\
`QueueName`  <a name=\"QueueName-fn::getatt\"></a>\n";

const SAMPLE_BUCKET_PAGE: &str = "# AWS::S3::Bucket<a name=\"aws-properties-s3-bucket\"></a>\n\n\
### Ref<a name=\"aws-properties-s3-bucket-ref\"></a>\n\n\
When you pass the logical ID of this resource to the intrinsic `Ref` function, `Ref` returns the bucket name\\.\n\n\
### Fn::GetAtt<a name=\"aws-properties-s3-bucket-fn::getatt\"></a>\n\n\
`Arn`  <a name=\"Arn-fn::getatt\"></a>\n";

fn write_fixtures(dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("aws-resource-sqs-queue.md"), SAMPLE_QUEUE_PAGE)?;
    fs::write(dir.join("aws-properties-s3-bucket.md"), SAMPLE_BUCKET_PAGE)?;
    println!("wrote sample pages to {}", dir.display());
    Ok(())
}
