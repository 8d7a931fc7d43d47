use kidsafe_core::alert::AlertRecord;
use uuid::Uuid;

use super::Context;

pub fn print_alert(alert: &AlertRecord) {
  let mark = if alert.acknowledged { ' ' } else { '*' };
  println!(
    "{mark} {}  {}  {:<12} {}",
    alert.raised_at.format("%Y-%m-%d %H:%M:%S"),
    alert.alert_id,
    alert.kind,
    alert.message
  );
}

pub async fn list(cx: &Context, unacknowledged: bool, json: bool) -> anyhow::Result<()> {
  let alerts: Vec<_> = cx
    .tracking
    .alerts()
    .await
    .into_iter()
    .filter(|a| !unacknowledged || !a.acknowledged)
    .collect();

  if json {
    println!("{}", serde_json::to_string_pretty(&alerts)?);
    return Ok(());
  }

  for alert in &alerts {
    print_alert(alert);
  }
  println!(
    "{} alerts, {} unacknowledged",
    cx.tracking.total_count().await,
    cx.tracking.unacknowledged_count().await
  );
  Ok(())
}

/// Returns whether the alert was found.
pub async fn acknowledge(cx: &Context, alert_id: Uuid) -> anyhow::Result<bool> {
  let found = cx.tracking.acknowledge(alert_id).await;
  if found {
    println!("acknowledged {alert_id}");
  } else {
    println!("no alert with id {alert_id}");
  }
  Ok(found)
}

pub async fn sos(cx: &Context, child_email: &str) -> anyhow::Result<()> {
  let child = cx.child_by_email(child_email).await?;
  let alert = cx
    .tracking
    .trigger_sos(&child.account_id.to_string(), &child.name)
    .await;
  print_alert(&alert);
  Ok(())
}
