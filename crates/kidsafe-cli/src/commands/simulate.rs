use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use super::{Context, alert::print_alert};

/// Share a simulated walk for `child_email` until `seconds` pass or Ctrl-C,
/// printing each alert as it is raised.
pub async fn run(cx: &Context, child_email: &str, seconds: u64, band: bool) -> anyhow::Result<()> {
  let child = cx.child_by_email(child_email).await?;
  let subject_id = child.account_id.to_string();

  let mut alerts = cx.tracking.subscribe();
  cx.tracking.start_sharing(&subject_id).await;
  if band {
    cx.tracking.connect_band(&subject_id).await;
  }
  println!("sharing location for {} for {seconds}s", child.name);

  let deadline = tokio::time::sleep(Duration::from_secs(seconds));
  let interrupted = tokio::signal::ctrl_c();
  tokio::pin!(deadline, interrupted);

  loop {
    tokio::select! {
      _ = &mut deadline => break,
      _ = &mut interrupted => break,
      received = alerts.recv() => match received {
        Ok(alert) => print_alert(&alert),
        Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "alert stream lagged"),
        Err(RecvError::Closed) => break,
      },
    }
  }

  cx.tracking.stop_sharing(&subject_id).await;
  cx.tracking.disconnect_band(&subject_id).await;

  if let Some(last) = cx.tracking.location(&subject_id).await {
    println!(
      "last position {} at {} ({} samples)",
      last.coordinate,
      last.captured_at.format("%H:%M:%S"),
      cx.tracking.history(&subject_id).await.len()
    );
  }
  Ok(())
}
