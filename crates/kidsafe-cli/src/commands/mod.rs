//! Subcommands and the shared context they run against.

mod account;
mod alert;
mod simulate;
mod zone;

use anyhow::{Context as _, bail};
use clap::Subcommand;
use kidsafe_core::account::{Account, AccountService, Role};
use kidsafe_store_sqlite::SqliteStore;
use kidsafe_tracking::TrackingService;
use uuid::Uuid;

use crate::settings::Settings;

#[derive(Subcommand)]
pub enum Command {
  /// Create a parent or child account.
  Register {
    #[arg(long)]
    name:  String,
    #[arg(long)]
    email: String,
    /// `parent` or `child`.
    #[arg(long)]
    role:  Role,
  },
  /// Link a child account to a parent using the parent's pairing code.
  Pair {
    /// Email of the child account.
    #[arg(long)]
    child: String,
    /// Six-digit code shown to the parent.
    #[arg(long)]
    code:  String,
  },
  /// Show an account, its pairing code and who it is paired with.
  Whoami {
    #[arg(long)]
    email: String,
  },
  /// Manage safe zones.
  #[command(subcommand)]
  Zone(ZoneCommand),
  /// List alerts, newest first.
  Alerts {
    /// Only alerts nobody has acknowledged yet.
    #[arg(long)]
    unacknowledged: bool,
    /// Print JSON instead of a table.
    #[arg(long)]
    json:           bool,
  },
  /// Mark an alert as acknowledged.
  Ack { alert_id: Uuid },
  /// Raise an SOS alert for a child.
  Sos {
    #[arg(long)]
    child: String,
  },
  /// Share a simulated location for a child and print alerts as they fire.
  Simulate {
    #[arg(long)]
    child:   String,
    /// How long to run.
    #[arg(long, default_value_t = 30)]
    seconds: u64,
    /// Also connect a simulated band.
    #[arg(long)]
    band:    bool,
  },
}

#[derive(Subcommand)]
pub enum ZoneCommand {
  /// Add a circular safe zone.
  Add {
    #[arg(long)]
    name:   String,
    #[arg(long, allow_hyphen_values = true)]
    lat:    f64,
    #[arg(long, allow_hyphen_values = true)]
    lng:    f64,
    /// Radius in meters.
    #[arg(long)]
    radius: f64,
    /// Display color, e.g. `#22c55e`.
    #[arg(long)]
    color:  Option<String>,
  },
  /// List safe zones.
  List,
  /// Remove a safe zone. Alerts it raised are kept.
  Remove { zone_id: Uuid },
}

/// Everything a command needs: the store, accounts and the restored engine.
pub struct Context {
  pub store:    SqliteStore,
  pub accounts: AccountService<SqliteStore>,
  pub tracking: TrackingService,
}

impl Context {
  async fn open(settings: &Settings) -> anyhow::Result<Self> {
    let store = SqliteStore::open(&settings.store_path)
      .await
      .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
    let accounts = AccountService::new(store.clone());
    let roster = accounts.roster().await.context("failed to load accounts")?;
    let tracking = TrackingService::load(settings.tracking.clone(), roster, &store)
      .await
      .context("failed to restore engine state")?;

    Ok(Self {
      store,
      accounts,
      tracking,
    })
  }

  /// Persist zones, alerts and membership.
  async fn save(&self) -> anyhow::Result<()> {
    self
      .tracking
      .save(&self.store)
      .await
      .context("failed to save engine state")
  }

  async fn account_by_email(&self, email: &str) -> anyhow::Result<Account> {
    match self.accounts.find_by_email(email).await? {
      Some(account) => Ok(account),
      None => bail!("no account registered for {email}"),
    }
  }

  async fn child_by_email(&self, email: &str) -> anyhow::Result<Account> {
    let account = self.account_by_email(email).await?;
    if account.role != Role::Child {
      bail!("{email} is not a child account");
    }
    Ok(account)
  }
}

pub async fn run(settings: &Settings, command: Command) -> anyhow::Result<()> {
  let cx = Context::open(settings).await?;

  let mutated = match command {
    Command::Register { name, email, role } => {
      account::register(&cx, name, email, role).await?;
      false
    }
    Command::Pair { child, code } => {
      account::pair(&cx, &child, &code).await?;
      false
    }
    Command::Whoami { email } => {
      account::whoami(&cx, &email).await?;
      false
    }
    Command::Zone(cmd) => zone::run(&cx, cmd).await?,
    Command::Alerts {
      unacknowledged,
      json,
    } => {
      alert::list(&cx, unacknowledged, json).await?;
      false
    }
    Command::Ack { alert_id } => alert::acknowledge(&cx, alert_id).await?,
    Command::Sos { child } => {
      alert::sos(&cx, &child).await?;
      true
    }
    Command::Simulate {
      child,
      seconds,
      band,
    } => {
      simulate::run(&cx, &child, seconds, band).await?;
      true
    }
  };

  cx.tracking.shutdown().await;
  if mutated {
    cx.save().await?;
  }
  Ok(())
}
