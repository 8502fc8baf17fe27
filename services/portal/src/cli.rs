//! `jobby` sub-commands, each driving one view

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use auth::models::{AccountKind, LoginCredentials, SignupRequest};
use clap::{Args, Parser, Subcommand};
use common::config::ClientConfig;
use portal::models::{EmploymentType, JobPosting, Profile};
use portal::{
    AdminJobsView, AppState, ApplicationsView, ApplyOutcome, CatalogView, Confirm, Entry,
    JobDetailsView, JobEditor, JobForm, LoginOutcome, LoginView, Notice, Phase, ProfileView,
    RemoveOutcome, SaveOutcome, SignupOutcome, SubmitOutcome,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "jobby", about = "Browse and manage job postings from the terminal")]
struct Cli {
    /// TOML configuration file; defaults to $JOBBY_CONFIG or ./jobby.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Signup {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Sign in and remember the session
    Login {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Forget the session
    Logout,
    /// Show who is signed in
    Whoami,
    /// List postings, filtered locally
    Jobs {
        /// Employment type, may be repeated
        #[arg(long = "type")]
        types: Vec<EmploymentType>,
        /// Minimum package in LPA
        #[arg(long)]
        min_salary: Option<u64>,
        /// Text the title must contain
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show one posting
    Job { id: String },
    /// Apply to a posting
    Apply { id: String },
    /// List your applications
    Applications,
    /// Withdraw an application
    Withdraw {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Manage your postings as an admin
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Args)]
struct AccountArgs {
    /// Use the admin account endpoints
    #[arg(long)]
    admin: bool,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
}

impl AccountArgs {
    fn kind(&self) -> AccountKind {
        if self.admin {
            AccountKind::Admin
        } else {
            AccountKind::User
        }
    }
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Edit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    Dashboard,
    Jobs,
    Create {
        #[command(flatten)]
        fields: JobArgs,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: JobArgs,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

/// Job form fields; unset ones keep the form's current value
#[derive(Args)]
struct JobArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    rating: Option<String>,
    #[arg(long)]
    logo_url: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long = "type")]
    employment_type: Option<String>,
    #[arg(long)]
    package: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl JobArgs {
    fn apply_to(self, mut form: JobForm) -> JobForm {
        let fields = [
            (self.title, &mut form.title),
            (self.rating, &mut form.rating),
            (self.logo_url, &mut form.company_logo_url),
            (self.location, &mut form.location),
            (self.employment_type, &mut form.employment_type),
            (self.package, &mut form.package_per_annum),
            (self.description, &mut form.job_description),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        form
    }
}

/// Confirmation read from stdin, or skipped with `--yes`
struct Prompt {
    assume_yes: bool,
}

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!("{} [y/N] ", prompt);
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path),
        None => ClientConfig::from_env(),
    }
    .context("Failed to load configuration")?;

    let app = AppState::new(config)?;

    match cli.command {
        Command::Signup {
            account,
            email,
            name,
        } => {
            let view = entered(LoginView::open(&app, account.kind()))?;
            let request = SignupRequest {
                username: account.username,
                password: account.password,
                email,
                name,
            };
            match view.sign_up(&request).await {
                SignupOutcome::Registered(message) => println!("{}", message),
                SignupOutcome::Invalid(errors) => bail!("{}", errors),
                SignupOutcome::Failed(message) => bail!("{}", message),
            }
        }
        Command::Login { account } => {
            let view = entered(LoginView::open(&app, account.kind()))?;
            let credentials = LoginCredentials {
                username: account.username,
                password: account.password,
            };
            match view.sign_in(&credentials).await {
                LoginOutcome::SignedIn { redirect } => {
                    info!("Signed in, continuing at {}", redirect);
                    println!("Signed in as {}", view.kind());
                }
                LoginOutcome::Invalid(errors) => bail!("{}", errors),
                LoginOutcome::Failed(message) => bail!("{}", message),
            }
        }
        Command::Logout => {
            let next = portal::sign_out(&app);
            info!("Signed out, continuing at {}", next);
            println!("Signed out");
        }
        Command::Whoami => {
            let status = app.session.current();
            if status.authenticated {
                println!("Signed in as {}", status.role);
            } else {
                println!("Not signed in");
            }
        }
        Command::Jobs {
            types,
            min_salary,
            search,
        } => {
            let view = entered(CatalogView::open(&app))?;
            ready(view.load().await)?;

            match (view.profile(), view.profile_error()) {
                (Some(profile), _) => println!("{} | {}\n", profile.name, profile.short_bio),
                (None, Some(error)) => eprintln!("{}", error),
                (None, None) => {}
            }

            for employment_type in types {
                view.toggle_employment_type(employment_type);
            }
            view.set_min_salary(min_salary);
            view.set_search_text(search);

            let visible = view.visible();
            for job in &visible {
                print_job_line(job);
            }
            println!("\n{} of {} jobs", visible.len(), view.job_count());
        }
        Command::Job { id } => {
            let view = entered(JobDetailsView::open(&app, id))?;
            ready(view.load().await)?;
            if let Some(job) = view.job() {
                print_job(&job);
                println!(
                    "\n{}",
                    if view.has_applied() {
                        "You have applied to this job"
                    } else {
                        "Not applied yet"
                    }
                );
            }
        }
        Command::Apply { id } => {
            let view = entered(JobDetailsView::open(&app, id))?;
            ready(view.load().await)?;
            match view.apply().await {
                ApplyOutcome::Applied => print_notice(view.notice()),
                ApplyOutcome::AlreadyApplied => println!("You have already applied to this job"),
                ApplyOutcome::InFlight | ApplyOutcome::Discarded => {}
                ApplyOutcome::Failed(message) => bail!("{}", message),
            }
        }
        Command::Applications => {
            let view = entered(ApplicationsView::open(&app))?;
            ready(view.load().await)?;
            let applications = view.applications();
            if applications.is_empty() {
                println!("No applications yet");
            }
            for application in applications {
                let applied = application
                    .applied_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!("{}  {}  {}", application.id, application.title(), applied);
            }
        }
        Command::Withdraw { id, yes } => {
            let view = entered(ApplicationsView::open(&app))?;
            ready(view.load().await)?;
            let outcome = view.withdraw(&id, &Prompt { assume_yes: yes }).await;
            report_removal(outcome, "Application withdrawn")?;
        }
        Command::Profile { action } => {
            let view = entered(ProfileView::open(&app))?;
            ready(view.load().await)?;

            if let Some(ProfileAction::Edit {
                name,
                bio,
                image_url,
            }) = action
            {
                let Some(mut draft) = view.begin_edit() else {
                    bail!("Profile is not available");
                };
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(bio) = bio {
                    draft.short_bio = bio;
                }
                if let Some(image_url) = image_url {
                    draft.profile_image_url = image_url;
                }
                view.edit(draft);

                match view.save().await {
                    SaveOutcome::Saved => print_notice(view.notice()),
                    SaveOutcome::Failed(message) => bail!("{}", message),
                    _ => {}
                }
            }

            if let Some(profile) = view.profile() {
                print_profile(&profile);
            }
        }
        Command::Admin { action } => admin(&app, action).await?,
    }

    Ok(())
}

async fn admin(app: &AppState, action: AdminAction) -> Result<()> {
    match action {
        AdminAction::Dashboard => {
            let view = entered(AdminJobsView::open_dashboard(app))?;
            ready(view.load().await)?;
            let stats = view.stats();
            println!("Total jobs posted: {}\n", stats.total_jobs);
            if stats.recent_jobs.is_empty() {
                println!("No jobs posted yet. Create your first job!");
            }
            for job in &stats.recent_jobs {
                print_job_line(job);
            }
        }
        AdminAction::Jobs => {
            let view = entered(AdminJobsView::open(app))?;
            ready(view.load().await)?;
            for job in view.jobs() {
                print_job_line(&job);
            }
        }
        AdminAction::Create { fields } => {
            let editor = entered(JobEditor::open_create(app))?;
            editor.set_form(fields.apply_to(editor.form()));
            save_job(&editor).await?;
        }
        AdminAction::Edit { id, fields } => {
            let editor = entered(JobEditor::open_edit(app, id))?;
            ready(editor.load().await)?;
            editor.set_form(fields.apply_to(editor.form()));
            save_job(&editor).await?;
        }
        AdminAction::Delete { id, yes } => {
            let view = entered(AdminJobsView::open(app))?;
            ready(view.load().await)?;
            let outcome = view.delete(&id, &Prompt { assume_yes: yes }).await;
            report_removal(outcome, "Job deleted successfully")?;
        }
    }
    Ok(())
}

async fn save_job(editor: &JobEditor) -> Result<()> {
    match editor.submit().await {
        SubmitOutcome::Saved { message, redirect } => {
            println!("{}", message);
            let next = redirect.follow().await;
            info!("Continuing at {}", next);
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            for error in errors.errors() {
                eprintln!("{}: {}", error.field, error.message);
            }
            bail!("Job form has errors")
        }
        SubmitOutcome::Failed(message) => bail!("{}", message),
        SubmitOutcome::Busy | SubmitOutcome::Discarded => Ok(()),
    }
}

fn entered<V>(entry: Entry<V>) -> Result<V> {
    match entry {
        Entry::Entered(view) => Ok(view),
        Entry::Redirected("/") => bail!("Not signed in, run `jobby login` first"),
        Entry::Redirected(target) => bail!("Not available here, redirected to {}", target),
    }
}

fn ready(phase: Phase) -> Result<()> {
    match phase {
        Phase::Failed(message) => bail!("{}", message),
        _ => Ok(()),
    }
}

fn report_removal(outcome: RemoveOutcome, success: &str) -> Result<()> {
    match outcome {
        RemoveOutcome::Removed => println!("{}", success),
        RemoveOutcome::Cancelled => println!("Cancelled"),
        RemoveOutcome::NotFound => bail!("No such entry"),
        RemoveOutcome::Failed(message) => bail!("{}", message),
        RemoveOutcome::Busy | RemoveOutcome::Discarded => {}
    }
    Ok(())
}

fn print_notice(notice: Option<Notice>) {
    match notice {
        Some(Notice::Success(message)) => println!("{}", message),
        Some(Notice::Error(message)) => eprintln!("{}", message),
        None => {}
    }
}

fn print_job_line(job: &JobPosting) {
    println!(
        "{}  {}  [{}]  {}  {}  ★{}",
        job.id, job.title, job.employment_type, job.location, job.package_per_annum, job.rating
    );
}

fn print_job(job: &JobPosting) {
    println!("{}  ★{}", job.title, job.rating);
    println!("{} | {} | {}", job.location, job.employment_type, job.package_per_annum);
    if let Some(logo) = &job.company_logo_url {
        println!("Logo: {}", logo);
    }
    println!("\n{}", job.job_description);
}

fn print_profile(profile: &Profile) {
    println!("{}", profile.name);
    println!("{}", profile.short_bio);
    println!("{}", profile.image_or_default());
}
