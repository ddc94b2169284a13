use clap::{Parser, crate_version};
use dormouse::{
    cli::{AnalyzeArgs, Args, Command},
    prelude::*,
    report::{self, Assessment},
    session::{self, SessionLog},
    tables::build_assessment_table,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Analyze(args) => analyze(&args)?,
    }

    info!("done!");
    Ok(())
}

#[instrument(skip_all)]
fn analyze(args: &AnalyzeArgs) -> Result {
    let interval = args.interval()?;
    let log_path = match &args.log_path {
        Some(path) => path.clone(),
        None => session::find_latest_log(&args.log_dir)?,
    };
    info!(path = %log_path.display(), "reading the session log…");
    let log = SessionLog::load(&log_path)?;
    info!(active = log.active.len(), phantom = log.phantom.len(), "parsed");

    let assessment =
        Assessment::assemble(args.device(), &log, interval, args.profile(), args.rate)?;
    println!("{}", build_assessment_table(&assessment));

    report::write_text(&assessment, &args.report_path)?;
    info!(path = %args.report_path.display(), "report written");
    if let Some(json_path) = &args.json_path {
        report::write_json(&assessment, json_path)?;
        info!(path = %json_path.display(), "JSON bundle written");
    }
    Ok(())
}
