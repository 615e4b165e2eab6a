use std::process::ExitCode;

use projecthub::controllers::ProjectClick;
use projecthub::{AppContext, ClientConfig, Route};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: projecthub <login EMAIL PASSWORD | logout | whoami | projects | board PROJECT_ID | activity>";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "projecthub=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    match run(std::env::args().skip(1).collect()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::new_from_env()?;
    info!("using backend at {}", config.api_base);
    let ctx = AppContext::connect(config).await?;

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["login", email, password] => {
            let mut flow = ctx.auth_flow();
            match flow.submit_login(email, password).await {
                Ok(route) => println!("logged in, continue at {}", route),
                Err(e) => {
                    let message = flow
                        .server_error
                        .clone()
                        .unwrap_or_else(|| e.user_message("Login failed"));
                    return Err(message.into());
                }
            }
        }
        ["logout"] => {
            ctx.session.logout().await;
            println!("logged out");
        }
        ["whoami"] => {
            require_session(&ctx).await?;
            let user = ctx.session.refresh_identity().await?;
            println!("{} <{}> ({})", user.name, user.email, user.id);
        }
        ["projects"] => {
            require_session(&ctx).await?;
            ctx.session.refresh_identity().await?;
            let mut list = ctx.project_list();
            list.activate().await?;
            list.settle_stats().await;

            let projects = list.projects.clone();
            for project in &projects {
                let stats = list.stats_for(&project.id).unwrap_or_default();
                let access = match list.on_project_click(project) {
                    ProjectClick::Open(route) => route.to_string(),
                    ProjectClick::NotMember { owner_name } => format!("not a member (owner: {})", owner_name),
                };
                println!(
                    "{}  {}  [{}]  {}/{} done ({}%)  {}",
                    project.id,
                    project.name,
                    project.status.map(|s| s.label()).unwrap_or("-"),
                    stats.done,
                    stats.total,
                    stats.percentage(),
                    access
                );
            }
        }
        ["board", project_id] => {
            require_session(&ctx).await?;
            let mut board = ctx.task_board();
            board.activate(project_id).await?;
            if let Some(message) = &board.error_message {
                return Err(message.clone().into());
            }
            let name = board.project.as_ref().map(|p| p.name.as_str()).unwrap_or("-");
            println!("{} ({}% complete)", name, board.completion);
            for (label, tasks) in [
                ("todo", &board.buckets.todo),
                ("in progress", &board.buckets.in_progress),
                ("done", &board.buckets.done),
            ] {
                println!("{}:", label);
                for task in tasks {
                    println!(
                        "  - {} [{:?}] assignee: {} due: {}",
                        task.title,
                        task.priority,
                        board.assignee_name(task.assigned_to.as_ref()),
                        task.due_date.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        ["activity"] => {
            require_session(&ctx).await?;
            let mut feed = ctx.activity();
            feed.fetch().await?;
            for entry in &feed.entries {
                println!(
                    "{}  {} {} {}  by {}",
                    entry.timestamp.as_deref().unwrap_or("-"),
                    entry.icon(),
                    String::from(entry.action.clone()),
                    entry.target_name,
                    entry.actor_name
                );
            }
        }
        _ => return Err(USAGE.into()),
    }

    Ok(())
}

async fn require_session(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let authenticated = ctx.session.is_authenticated().await;
    match Route::Dashboard.guard(authenticated) {
        Route::Auth => Err("not logged in; run `projecthub login EMAIL PASSWORD` first".into()),
        _ => Ok(()),
    }
}
