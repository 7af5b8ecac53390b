use anyhow::{Result, anyhow};
use client::Route;

use super::Connection;

/// Run the guard for `target` (a route name or path) and report the outcome.
pub async fn run(connection: &Connection, target: &str) -> Result<()> {
    let route: Route = target.parse().map_err(|err: String| anyhow!(err))?;
    let navigation = connection.helpdesk().navigator().navigate(route).await;
    connection.save()?;

    if navigation.redirected() {
        println!(
            "{} -> redirected to {} ({})",
            navigation.requested,
            navigation.landed,
            navigation.landed.name()
        );
    } else {
        println!("{} ({})", navigation.landed, navigation.landed.name());
    }
    Ok(())
}
