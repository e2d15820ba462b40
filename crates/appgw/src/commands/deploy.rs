use appgw_cloud::{CloudResourceClient, FrontendIpSource, GatewayCreateRequest};
use appgw_config::DeploymentConfig;
use appgw_core::{Deployer, DeploymentPlan, PollPolicy};
use colored::Colorize;
use std::time::Duration;

pub async fn handle<C>(
    client: &C,
    config: &DeploymentConfig,
    preview: bool,
    timeout_minutes: u64,
) -> anyhow::Result<()>
where
    C: CloudResourceClient + ?Sized,
{
    let timeout_secs = timeout_minutes
        .checked_mul(60)
        .ok_or_else(|| anyhow::anyhow!("--timeout-minutes {} is too large", timeout_minutes))?;
    let policy = PollPolicy::with_timeout(Duration::from_secs(timeout_secs));
    let deployer = Deployer::new(client).with_poll_policy(policy);
    let gateway = &config.application_gateway.name;

    if preview {
        println!("{}", "Resolving deployment plan (preview)...".blue().bold());
        let plan = deployer.plan(config).await?;
        print_plan(&plan);
        return Ok(());
    }

    println!(
        "{}",
        format!("Deploying application gateway '{}'...", gateway)
            .blue()
            .bold()
    );
    println!(
        "Resource group: {}  Timeout: {} min",
        config.resource_group.name.cyan(),
        timeout_minutes
    );

    let result = deployer.deploy(config).await?;

    println!();
    if result.created {
        println!("{}", "✓ Deployment complete".green().bold());
    } else {
        println!(
            "{}",
            "✓ Application gateway already exists; nothing to do".green().bold()
        );
    }
    println!("  Name:               {}", result.name.cyan());
    println!("  Resource group:     {}", result.resource_group);
    println!("  Location:           {}", result.location);
    println!("  Provisioning state: {}", result.provisioning_state.green());
    if result.created {
        println!(
            "  Duration:           {}m {}s",
            result.elapsed.as_secs() / 60,
            result.elapsed.as_secs() % 60
        );
    }

    Ok(())
}

fn print_plan(plan: &DeploymentPlan) {
    println!();
    match plan {
        DeploymentPlan::AlreadyExists(existing) => {
            println!(
                "{} Application gateway '{}' already exists (state: {}); deploy would not change it",
                "•".yellow(),
                existing.name.cyan(),
                existing.provisioning_state
            );
        }
        DeploymentPlan::Create {
            request,
            diagnostics,
        } => {
            print_request(request);
            match diagnostics {
                Some(sink) => println!(
                    "  Diagnostics: {} → event hub {}",
                    sink.name,
                    sink.event_hub_name.cyan()
                ),
                None => println!("  Diagnostics: {}", "disabled".dimmed()),
            }
            println!();
            println!("{}", "Preview only: nothing was created".yellow());
        }
    }
}

fn print_request(request: &GatewayCreateRequest) {
    let resources = &request.resources;

    println!(
        "{} {} in {} ({})",
        "Create application gateway".bold(),
        request.name.cyan(),
        request.resource_group,
        request.location
    );

    let sku = &resources.sku;
    match (&resources.autoscale, sku.capacity) {
        (Some(auto), _) => println!(
            "  SKU: {} / {} (autoscale {}..{})",
            sku.name,
            sku.tier,
            auto.min_capacity,
            auto.max_capacity
                .map(|m| m.to_string())
                .unwrap_or_else(|| "∞".to_string())
        ),
        (None, Some(capacity)) => {
            println!("  SKU: {} / {} (capacity {})", sku.name, sku.tier, capacity)
        }
        (None, None) => println!("  SKU: {} / {}", sku.name, sku.tier),
    }

    let frontend = &resources.frontend_ip_configuration;
    match &frontend.source {
        FrontendIpSource::PublicIp { id } => {
            println!("  Frontend: {} (public IP {})", frontend.name, id)
        }
        FrontendIpSource::Subnet {
            id,
            private_ip_address,
        } => println!(
            "  Frontend: {} (subnet {}, {})",
            frontend.name,
            id,
            private_ip_address.as_deref().unwrap_or("dynamic address")
        ),
    }

    println!("  Ports:");
    for port in &resources.frontend_ports {
        println!("    - {} ({})", port.name.cyan(), port.port);
    }
    println!("  Backend pools:");
    for pool in &resources.backend_address_pools {
        let addresses: Vec<String> = pool.addresses.iter().map(|a| a.to_string()).collect();
        println!("    - {} [{}]", pool.name.cyan(), addresses.join(", "));
    }
    if !resources.health_probes.is_empty() {
        println!("  Health probes:");
        for probe in &resources.health_probes {
            println!(
                "    - {} ({} {}, every {}s)",
                probe.name.cyan(),
                probe.protocol,
                probe.path,
                probe.interval
            );
        }
    }
    println!("  HTTP settings:");
    for settings in &resources.backend_http_settings {
        println!(
            "    - {} ({} :{}, probe: {})",
            settings.name.cyan(),
            settings.protocol,
            settings.port,
            settings.probe.as_deref().unwrap_or("none")
        );
    }
    println!("  Listeners:");
    for listener in &resources.http_listeners {
        println!(
            "    - {} ({} on {}{})",
            listener.name.cyan(),
            listener.protocol,
            listener.frontend_port,
            listener
                .host_name
                .as_deref()
                .map(|h| format!(", host {}", h))
                .unwrap_or_default()
        );
    }
    println!("  Routing rules:");
    for rule in &resources.request_routing_rules {
        println!(
            "    - {} [{}] {} → {} via {} (priority {})",
            rule.name.cyan(),
            rule.rule_type,
            rule.http_listener,
            rule.backend_address_pool,
            rule.backend_http_settings,
            rule.priority
        );
    }
    if !request.tags.is_empty() {
        let tags: Vec<String> = request
            .tags
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!("  Tags: {}", tags.join(", "));
    }
}
