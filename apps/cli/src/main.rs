use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{export, ResumeFile, WizardClient};
use tracing::info;

mod config;


#[derive(Parser, Debug)]
#[command(name = "r2ol", about = "Drives one resume-improvement wizard pass against the backend")]
struct Args {
    /// Backend base URL; defaults to r2ol.toml / R2OL_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Resume file to upload (PDF, DOC, DOCX or TXT).
    #[arg(long)]
    file: PathBuf,
    #[arg(long, default_value = "")]
    job_title: String,
    #[arg(long, default_value = "")]
    job_description: String,
    #[arg(long, default_value = "")]
    company_name: String,
    /// Where to write the combined plain-text export.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();
    let server_url = args.server_url.unwrap_or(settings.server_url);
    info!(server_url = %server_url, "starting wizard pass");

    let client = WizardClient::new(&server_url)?;

    let filename = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .context("resume path has no file name")?;
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    client.set_job_title(args.job_title.clone()).await;
    client.set_job_description(args.job_description).await;
    client.set_company_name(args.company_name.clone()).await;

    client
        .upload_resume(Some(ResumeFile::new(filename, bytes)))
        .await?;

    let snapshot = client.snapshot().await;
    if let Some(parsed) = &snapshot.parsed {
        if let Some(name) = parsed
            .personal_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
        {
            println!("Parsed name: {name}");
        }
        if !parsed.skills.is_empty() {
            println!("Parsed skills: {}", parsed.skills.join(", "));
        }
    }

    client.improve_resume().await?;
    let snapshot = client.snapshot().await;
    println!("\n=== Improved resume ===\n{}", snapshot.improved_resume);

    if !args.job_title.is_empty() && !args.company_name.is_empty() {
        client.generate_cover_letter().await?;
        let snapshot = client.snapshot().await;
        println!("\n=== Cover letter ===\n{}", snapshot.cover_letter);
    } else {
        info!("skipping cover letter: job title and company name are required");
    }

    let snapshot = client.snapshot().await;
    if let Some(body) = export::combined_document(&snapshot.improved_resume, &snapshot.cover_letter)
    {
        let out = args
            .out
            .unwrap_or_else(|| PathBuf::from(export::EXPORT_FILENAME));
        tokio::fs::write(&out, body)
            .await
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("\nWrote combined export to {}", out.display());
    }

    Ok(())
}
