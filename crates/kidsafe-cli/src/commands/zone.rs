use kidsafe_core::{geo::Coordinate, zone::NewZone};

use super::{Context, ZoneCommand};

/// Returns whether the engine state changed.
pub async fn run(cx: &Context, cmd: ZoneCommand) -> anyhow::Result<bool> {
  match cmd {
    ZoneCommand::Add {
      name,
      lat,
      lng,
      radius,
      color,
    } => {
      let mut new_zone = NewZone::new(name, Coordinate::new(lat, lng), radius);
      if let Some(color) = color {
        new_zone = new_zone.with_color(color);
      }
      let zone = cx.tracking.add_zone(new_zone).await?;
      println!("added zone {} ({})", zone.name, zone.zone_id);
      Ok(true)
    }
    ZoneCommand::List => {
      let zones = cx.tracking.zones().await;
      if zones.is_empty() {
        println!("no safe zones");
      }
      for zone in zones {
        println!(
          "{}  {:<16} {} r={:.0}m {}",
          zone.zone_id, zone.name, zone.center, zone.radius_meters, zone.color
        );
      }
      Ok(false)
    }
    ZoneCommand::Remove { zone_id } => match cx.tracking.remove_zone(zone_id).await {
      Some(zone) => {
        println!("removed zone {}", zone.name);
        Ok(true)
      }
      None => {
        println!("no zone with id {zone_id}");
        Ok(false)
      }
    },
  }
}
