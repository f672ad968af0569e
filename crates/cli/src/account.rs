use crate::{print_json, App};
use optiscope_core::backend::BackendApi;
use optiscope_core::domain::profile::{AccountType, PreferredView, ProfileUpdate};

#[derive(Debug, clap::Subcommand)]
pub enum ProfileCommand {
    /// Show the stored profile.
    Show,
    /// Create the backend account for the configured user.
    Register,
    /// Change preferences.
    Update {
        #[arg(long)]
        view: Option<PreferredView>,
        #[arg(long)]
        account: Option<AccountType>,
    },
    /// Record a login now.
    Touch,
}

pub async fn run(app: &App, cmd: ProfileCommand) -> anyhow::Result<()> {
    let session = app.require_session()?;
    let backend = app.backend.as_ref();

    match cmd {
        ProfileCommand::Show => {
            let profile = backend.user_profile(session).await?;
            if app.json {
                return print_json(&profile);
            }
            println!("Signed in as {}", session.greeting_name());
            println!("  view:       {:?}", profile.preferred_view);
            println!("  account:    {:?}", profile.account_type);
            println!(
                "  last login: {}",
                profile.last_login.as_deref().unwrap_or("never")
            );
        }
        ProfileCommand::Register => {
            app.settings.require_user_email()?;
            backend.register_user(session).await?;
            tracing::info!(uid = %session.uid, "user registered");
            println!("Registered {}.", session.greeting_name());
        }
        ProfileCommand::Update { view, account } => {
            let update = ProfileUpdate {
                preferred_view: view,
                account_type: account,
            };
            anyhow::ensure!(!update.is_empty(), "nothing to update: pass --view or --account");
            backend.update_user(session, &update).await?;
            println!("Profile updated.");
        }
        ProfileCommand::Touch => {
            backend.update_last_login(session).await?;
            println!("Last login recorded.");
        }
    }
    Ok(())
}
