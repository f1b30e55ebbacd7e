use anyhow::{Result, anyhow};
use onboard_flow::{
    FlowConfig, HandoffContext, JobDescriptionTask, Navigator, OnboardingBackend,
    ResumeParseTask, Route, StepOutcome, StepRunner,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::files::load_dropped_file;

/// Walk the wizard from the landing page: resume, then (optionally) the job
/// description, ending on the analysis page.
pub async fn run_wizard(
    config: &FlowConfig,
    backend: Arc<dyn OnboardingBackend>,
    resume: &Path,
    job_description: Option<&Path>,
) -> Result<()> {
    let context = HandoffContext::new();
    let mut navigator = Navigator::default();
    navigator.navigate(Route::ResumeParser);
    println!("== {}", Route::ResumeParser.title());

    let resume_step = StepRunner::new(
        Arc::new(ResumeParseTask::new(backend, config.advance_delay())),
        config.validation_policy(),
        context.clone(),
    );

    expect_staged(resume_step.drop_files(vec![load_dropped_file(resume)?]).await?)?;
    print_status(&resume_step).await;

    match resume_step.process().await? {
        StepOutcome::Succeeded { parsed, ready } => {
            print_status(&resume_step).await;
            println!("{}", serde_json::to_string_pretty(&parsed)?);

            if let Some(signal) = ready {
                info!("Moving to {} in {:?}", signal.to.path(), signal.after);
                tokio::time::sleep(signal.after).await;
                navigator.navigate(signal.to);
            }
        }
        other => return Err(outcome_error(other)),
    }

    let Some(job_description) = job_description else {
        println!("Stopped at {}", navigator.current().path());
        return Ok(());
    };

    println!("== {}", Route::JobDescriptionParser.title());
    let job_step = StepRunner::new(
        Arc::new(JobDescriptionTask::simulated(config.simulated_upload_delay())),
        config.validation_policy(),
        context.clone(),
    );

    println!("Processing...");
    match job_step
        .drop_files(vec![load_dropped_file(job_description)?])
        .await?
    {
        StepOutcome::Succeeded { .. } => print_status(&job_step).await,
        other => return Err(outcome_error(other)),
    }

    let next = job_step.confirm(&mut navigator).await?;
    println!("== Arrived at {}", next.path());

    println!("Handoff context:");
    println!("{}", serde_json::to_string_pretty(&context.snapshot())?);
    Ok(())
}

fn expect_staged(outcome: StepOutcome) -> Result<()> {
    match outcome {
        StepOutcome::Staged => Ok(()),
        other => Err(outcome_error(other)),
    }
}

fn outcome_error(outcome: StepOutcome) -> anyhow::Error {
    match outcome {
        StepOutcome::Rejected(reason) | StepOutcome::Failed(reason) => anyhow!(reason.message()),
        other => anyhow!("Unexpected step outcome: {:?}", other),
    }
}

async fn print_status(step: &StepRunner) {
    if let Some(message) = step.snapshot().await.display_message() {
        println!("{}", message);
    }
}

/// Print every route and where the wizard goes from it.
pub fn print_routes() {
    for route in Route::ALL {
        match route.next() {
            Some(next) => println!("{:<26} -> {}  ({})", route.path(), next.path(), route.title()),
            None => println!("{:<26}     {}  ({})", route.path(), "", route.title()),
        }
    }
}
