use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use shopintel::admin::AdminConsole;
use shopintel::models::{Session, UploadFile, UserId};
use shopintel::report::{FileSystemSink, ReportFormat, TemplateReportRenderer};
use shopintel::services::WorkflowServices;
use shopintel::terms::TermsAgreement;
use shopintel::workflow::WorkflowEvent;
use shopintel::{AppContext, ClientConfig};
use shopintel_gateway::ApiClient;

use crate::output;
use crate::{AdminCommand, AnalyzeArgs, ConnectionArgs};

fn load_config(connection: &ConnectionArgs) -> Result<ClientConfig> {
    let mut values = ClientConfig::env_values();
    if let Some(url) = &connection.api_url {
        values.insert("SHOPINTEL_API_URL".to_string(), url.clone());
    }
    if let Some(token) = &connection.token {
        values.insert("SHOPINTEL_API_TOKEN".to_string(), token.clone());
    }
    ClientConfig::from_map(&values).context("Invalid client configuration")
}

/// Resolve the signed-in user from the token, falling back to a guest session.
async fn resolve_session(api: &ApiClient) -> Session {
    let Some(token) = api.config().api_token.clone() else {
        return Session::guest();
    };
    match api.current_user().await {
        Ok(user) => Session::new(user).with_token(token),
        Err(err) => {
            warn!("Could not load the current user: {}", err);
            Session::guest().with_token(token)
        }
    }
}

/// Backends authenticate with the session's token.
fn build_context(api: &ApiClient, session: Session, config: &ClientConfig) -> Result<AppContext> {
    let api = Arc::new(api.for_session(&session));
    let renderer = TemplateReportRenderer::new(config.report_format)
        .context("Failed to load report templates")?;
    let sink = FileSystemSink::new(config.report_dir.clone());
    let services = WorkflowServices::from_backend(api.clone(), Arc::new(renderer), Arc::new(sink));
    Ok(AppContext::new(session, services, api))
}

pub async fn analyze(connection: &ConnectionArgs, args: AnalyzeArgs) -> Result<()> {
    let mut terms = TermsAgreement::new();
    if !args.accept_terms {
        output::print_terms();
        bail!("The terms of service must be accepted; re-run with --accept-terms");
    }
    terms.acknowledge(true);
    terms.accept()?;

    let mut config = load_config(connection)?;
    if let Some(format) = &args.format {
        config.report_format = format.parse::<ReportFormat>()?;
    }
    if let Some(dir) = &args.report_dir {
        config.report_dir = dir.clone();
    }

    let api = ApiClient::new(config.clone())?;
    let session = resolve_session(&api).await;
    output::print_greeting(&session.user);

    let context = build_context(&api, session, &config)?;
    let controller = context.workflow_controller();
    let mut events = controller.subscribe();

    let file = UploadFile::load(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    info!("Uploading {} ({} bytes)", file.filename, file.len());

    let outcome = controller.submit_upload(file).await;
    while let Ok(event) = events.try_recv() {
        if let WorkflowEvent::StaleResultDiscarded { dataset_id, .. } = event {
            warn!("Discarded stale results for dataset {}", dataset_id);
        }
    }
    controller.set_view(args.view).await;

    match outcome {
        Ok(report) => output::print_analysis_report(&report),
        Err(err) => {
            output::print_dashboard(&controller.snapshot().await);
            return Err(err).context("Upload failed");
        }
    }
    output::print_dashboard(&controller.snapshot().await);

    if args.export {
        let saved = controller.export_report().await?;
        let location = saved
            .location
            .map(|path| path.display().to_string())
            .unwrap_or(saved.filename);
        println!("\nReport saved to {} ({} bytes)", location, saved.size_bytes);
    }

    if args.share {
        let link = controller.share_report().await?;
        println!("\nReport shared: {}", link.share_url);
        controller.dismiss_share().await;
    }

    Ok(())
}

pub async fn admin(connection: &ConnectionArgs, command: AdminCommand) -> Result<()> {
    let config = load_config(connection)?;
    let api = ApiClient::new(config.clone())?;
    let session = resolve_session(&api).await;
    let console = build_context(&api, session, &config)?.admin_console();

    let snapshot = console
        .refresh()
        .await
        .context("Failed to load admin data")?;

    match command {
        AdminCommand::Users => output::print_users(&snapshot),
        AdminCommand::Stats => output::print_stats(&snapshot),
        AdminCommand::Health => output::print_health(&snapshot),
        AdminCommand::Activate { user_id } => {
            let snapshot = console.activate_user(user_id).await?;
            println!("User {} activated", user_id);
            output::print_users(&snapshot);
        }
        AdminCommand::Deactivate { user_id, yes } => {
            deactivate(&console, user_id, yes).await?;
        }
    }

    Ok(())
}

async fn deactivate(console: &AdminConsole, user_id: UserId, yes: bool) -> Result<()> {
    let token = console.request_deactivation(user_id).await?;
    if !yes && !confirm(&format!("Deactivate user {}?", user_id))? {
        console.cancel_deactivation(token).await;
        println!("Cancelled");
        return Ok(());
    }
    let snapshot = console.confirm_deactivation(token).await?;
    println!("User {} deactivated", user_id);
    output::print_users(&snapshot);
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
