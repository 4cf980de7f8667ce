//! List command - show all open ports.

use anyhow::Result;
use portman_core::{filter_ports, PortInfo, PortScanner, PortService};

use crate::text::truncate;

pub async fn run(port_filter: Option<u16>, text_filter: Option<String>, json: bool) -> Result<()> {
    let service = PortService::new(PortScanner::new()?);
    let ports = match port_filter {
        Some(port) => service.find_all_by_port(port).await?,
        None => service.scan().await?,
    };
    let ports = match text_filter {
        Some(ref text) => filter_ports(&ports, text),
        None => ports,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    print!("{}", render_table(&ports));
    Ok(())
}

fn render_table(ports: &[PortInfo]) -> String {
    if ports.is_empty() {
        return "No ports found.\n".to_string();
    }

    let mut out = format!(
        "{:<8} {:<10} {:<8} {:<20} COMMAND\n",
        "PORT", "PROTOCOL", "PID", "PROCESS"
    );
    out.push_str(&"-".repeat(80));
    out.push('\n');

    for port in ports {
        out.push_str(&format!(
            "{:<8} {:<10} {:<8} {:<20} {}\n",
            port.port,
            port.protocol,
            port.pid,
            truncate(&port.process_name, 20),
            truncate(&port.command, 40)
        ));
    }

    out.push_str(&format!("\nTotal: {} ports\n", ports.len()));
    out
}
