use kidsafe_core::account::{NewAccount, Role};

use super::Context;

pub async fn register(cx: &Context, name: String, email: String, role: Role) -> anyhow::Result<()> {
  let account = cx.accounts.register(NewAccount { name, email, role }).await?;
  println!("registered {} <{}> as {}", account.name, account.email, account.role);
  println!("account id: {}", account.account_id);
  if let Some(code) = &account.pairing_code {
    println!("pairing code: {code}");
  }
  Ok(())
}

pub async fn pair(cx: &Context, child_email: &str, code: &str) -> anyhow::Result<()> {
  let child = cx.account_by_email(child_email).await?;
  let parent = cx.accounts.pair(child.account_id, code).await?;
  println!("{} is now paired with {}", child.name, parent.name);
  Ok(())
}

pub async fn whoami(cx: &Context, email: &str) -> anyhow::Result<()> {
  let account = cx.account_by_email(email).await?;
  println!("{} <{}>", account.name, account.email);
  println!("  id:      {}", account.account_id);
  println!("  role:    {}", account.role);
  println!("  joined:  {}", account.created_at.format("%Y-%m-%d %H:%M"));
  if let Some(code) = &account.pairing_code {
    println!("  code:    {code}");
  }

  if account.paired_with.is_empty() {
    println!("  paired:  no");
    return Ok(());
  }
  for id in &account.paired_with {
    let other = cx.accounts.get(*id).await?;
    println!("  paired:  {} <{}>", other.name, other.email);
  }
  Ok(())
}
