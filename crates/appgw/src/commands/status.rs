use appgw_cloud::{CloudResourceClient, ProvisioningState};
use appgw_config::DeploymentConfig;
use appgw_core::{StatusReport, StatusReporter};
use colored::Colorize;

pub async fn handle<C>(client: &C, config: &DeploymentConfig, json: bool) -> anyhow::Result<()>
where
    C: CloudResourceClient + ?Sized,
{
    let report = StatusReporter::new(client).get_status(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report {
        Some(report) => print_report(&report),
        None => println!(
            "{} Application gateway '{}' does not exist in resource group '{}'",
            "•".yellow(),
            config.application_gateway.name.cyan(),
            config.resource_group.name
        ),
    }

    Ok(())
}

fn print_report(report: &StatusReport) {
    let state = match ProvisioningState::from_reported(&report.provisioning_state) {
        ProvisioningState::Succeeded => report.provisioning_state.green(),
        ProvisioningState::Failed => report.provisioning_state.red(),
        ProvisioningState::Pending => report.provisioning_state.yellow(),
    };

    println!();
    println!("{}", "Application gateway".bold());
    println!("  Name:               {}", report.name.cyan());
    println!("  Resource group:     {}", report.resource_group);
    println!("  Location:           {}", report.location);
    println!("  Provisioning state: {}", state);
    println!(
        "  Operational state:  {}",
        report.operational_state.as_deref().unwrap_or("unknown")
    );
    println!(
        "  Frontend IP:        {}",
        report
            .frontend_ip_address
            .as_deref()
            .unwrap_or("not allocated")
    );

    println!();
    println!("{}", "Backend health".bold());
    if report.backend_health.is_empty() {
        println!("  {}", "(no backend pools reported)".dimmed());
    }
    for pool in &report.backend_health {
        let counts = format!(
            "{} healthy, {} unhealthy",
            pool.healthy_servers, pool.unhealthy_servers
        );
        let counts = if pool.unhealthy_servers == 0 {
            counts.green()
        } else {
            counts.red()
        };
        println!("  {} ({})", pool.pool_name.cyan(), counts);

        for server in &pool.servers {
            let mark = if server.is_healthy() {
                "✓".green()
            } else {
                "✗".red()
            };
            println!(
                "    {} {:<24} {:<10} {}",
                mark,
                server.address,
                server.health,
                server.http_setting.as_deref().unwrap_or("").dimmed()
            );
        }
    }
}
