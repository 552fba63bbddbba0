// # lbsyncctl - reconciliation control tool
//
// Thin one-shot integration layer: reads device credentials from the
// environment, builds the adapter, runs exactly one reconciliation
// operation, and exits. All reconciliation logic lives in lbsync-core;
// do not add business logic, rollback logic, or retry logic here.
//
// ## Configuration
//
// All device configuration is done via environment variables:
//
// - `LBSYNC_DEVICE_ENDPOINT`: base URL of the device control API
// - `LBSYNC_DEVICE_USERNAME`: administrative user
// - `LBSYNC_DEVICE_PASSWORD`: administrative password
// - `LBSYNC_LOG_FILE_LOCATION`: remote path for connection logs
//   (default: /var/log/lb/%v.log)
// - `LBSYNC_LOG_LEVEL`: tracing level (default: info)
//
// ## Usage
//
// ```bash
// export LBSYNC_DEVICE_ENDPOINT=https://vtm1.example.net:9070
// export LBSYNC_DEVICE_USERNAME=admin
// export LBSYNC_DEVICE_PASSWORD=...
//
// lbsyncctl add-vips <account> <lb> <ipv4-ids|-> [<ipv6-ids|->]
// lbsyncctl delete-vips <account> <lb> <vip-ids>
// lbsyncctl update-access-list <account> <lb> <kind:address>...
// lbsyncctl delete-access-list <account> <lb>
// lbsyncctl update-logging <account> <lb> <on|off> <protocol>
// ```
//
// Id lists are comma-separated; `-` stands for an empty list. Access-list
// entries are written `allow:10.0.0.1` or `deny:192.0.2.0/24`.

use std::collections::BTreeSet;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use lbsync_core::{
    AccessListEntry, AccessListKind, AdapterConfig, DeviceConfig, LoadBalancer,
    VirtualServiceAdapter,
};
use lbsync_device_vtm::VtmClient;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum CtlExitCode {
    /// Operation applied
    Success = 0,
    /// Usage or configuration error
    UsageError = 1,
    /// The reconciliation operation failed
    OperationFailed = 2,
}

impl From<CtlExitCode> for ExitCode {
    fn from(code: CtlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Device configuration read from the environment
struct Config {
    endpoint: String,
    username: String,
    password: String,
    log_file_location: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: env::var("LBSYNC_DEVICE_ENDPOINT").context(
                "LBSYNC_DEVICE_ENDPOINT is required. \
                Set it via: export LBSYNC_DEVICE_ENDPOINT=https://vtm1.example.net:9070",
            )?,
            username: env::var("LBSYNC_DEVICE_USERNAME")
                .context("LBSYNC_DEVICE_USERNAME is required")?,
            password: env::var("LBSYNC_DEVICE_PASSWORD")
                .context("LBSYNC_DEVICE_PASSWORD is required")?,
            log_file_location: env::var("LBSYNC_LOG_FILE_LOCATION")
                .unwrap_or_else(|_| "/var/log/lb/%v.log".to_string()),
            log_level: env::var("LBSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            device: DeviceConfig::Rest {
                endpoint: self.endpoint.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                timeout_secs: None,
            },
            log_file_location: self.log_file_location.clone(),
        }
    }
}

/// One reconciliation operation parsed from the command line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    AddVips {
        account_id: u32,
        lb_id: u32,
        ipv4_ids: BTreeSet<u32>,
        ipv6_ids: BTreeSet<u32>,
    },
    DeleteVips {
        account_id: u32,
        lb_id: u32,
        vip_ids: Vec<u32>,
    },
    UpdateAccessList {
        account_id: u32,
        lb_id: u32,
        entries: Vec<AccessListEntry>,
    },
    DeleteAccessList {
        account_id: u32,
        lb_id: u32,
    },
    UpdateLogging {
        account_id: u32,
        lb_id: u32,
        enabled: bool,
        protocol: String,
    },
}

const USAGE: &str = "usage:
  lbsyncctl add-vips <account> <lb> <ipv4-ids|-> [<ipv6-ids|->]
  lbsyncctl delete-vips <account> <lb> <vip-ids>
  lbsyncctl update-access-list <account> <lb> <kind:address>...
  lbsyncctl delete-access-list <account> <lb>
  lbsyncctl update-logging <account> <lb> <on|off> <protocol>";

fn parse_command(args: &[String]) -> Result<Command> {
    let (op, rest) = args.split_first().with_context(|| USAGE.to_string())?;

    let ids = |rest: &[String]| -> Result<(u32, u32)> {
        match rest {
            [account, lb, ..] => Ok((
                account.parse().context("account id must be an integer")?,
                lb.parse().context("load balancer id must be an integer")?,
            )),
            _ => bail!("{USAGE}"),
        }
    };

    match op.as_str() {
        "add-vips" => {
            let (account_id, lb_id) = ids(rest)?;
            let ipv4 = rest.get(2).map(|s| s.as_str()).unwrap_or("-");
            let ipv6 = rest.get(3).map(|s| s.as_str()).unwrap_or("-");
            Ok(Command::AddVips {
                account_id,
                lb_id,
                ipv4_ids: parse_ids(ipv4)?.into_iter().collect(),
                ipv6_ids: parse_ids(ipv6)?.into_iter().collect(),
            })
        }
        "delete-vips" => {
            let (account_id, lb_id) = ids(rest)?;
            let list = rest.get(2).context("delete-vips requires a vip-id list")?;
            let vip_ids = parse_ids(list)?;
            if vip_ids.is_empty() {
                bail!("delete-vips requires at least one vip id");
            }
            Ok(Command::DeleteVips {
                account_id,
                lb_id,
                vip_ids,
            })
        }
        "update-access-list" => {
            let (account_id, lb_id) = ids(rest)?;
            let entries = rest[2..]
                .iter()
                .map(|raw| parse_entry(raw))
                .collect::<Result<Vec<_>>>()?;
            Ok(Command::UpdateAccessList {
                account_id,
                lb_id,
                entries,
            })
        }
        "delete-access-list" => {
            let (account_id, lb_id) = ids(rest)?;
            Ok(Command::DeleteAccessList { account_id, lb_id })
        }
        "update-logging" => {
            let (account_id, lb_id) = ids(rest)?;
            let enabled = parse_enabled(
                rest.get(2)
                    .context("update-logging requires on|off")?,
            )?;
            let protocol = rest
                .get(3)
                .context("update-logging requires a protocol")?
                .clone();
            Ok(Command::UpdateLogging {
                account_id,
                lb_id,
                enabled,
                protocol,
            })
        }
        other => bail!("unknown operation '{other}'\n{USAGE}"),
    }
}

/// Parse a comma-separated id list; `-` stands for an empty list
fn parse_ids(raw: &str) -> Result<Vec<u32>> {
    if raw == "-" {
        return Ok(Vec::new());
    }
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim()
                .parse()
                .with_context(|| format!("'{s}' is not a valid id"))
        })
        .collect()
}

/// Parse an access-list entry written `kind:address`
fn parse_entry(raw: &str) -> Result<AccessListEntry> {
    let (kind, address) = raw
        .split_once(':')
        .with_context(|| format!("'{raw}' is not of the form kind:address"))?;

    if address.is_empty() {
        bail!("'{raw}' is missing an address");
    }

    Ok(AccessListEntry {
        ip_address: address.to_string(),
        kind: AccessListKind::from_str(kind)?,
    })
}

fn parse_enabled(raw: &str) -> Result<bool> {
    match raw {
        "on" => Ok(true),
        "off" => Ok(false),
        other => bail!("expected on|off, got '{other}'"),
    }
}

async fn run(adapter: &VirtualServiceAdapter, command: Command) -> lbsync_core::Result<()> {
    match command {
        Command::AddVips {
            account_id,
            lb_id,
            ipv4_ids,
            ipv6_ids,
        } => {
            adapter
                .add_virtual_ips(account_id, lb_id, &ipv4_ids, &ipv6_ids)
                .await
        }
        Command::DeleteVips {
            account_id,
            lb_id,
            vip_ids,
        } => {
            let lb = LoadBalancer::new(account_id, lb_id);
            adapter.delete_virtual_ips(&lb, &vip_ids).await
        }
        Command::UpdateAccessList {
            account_id,
            lb_id,
            entries,
        } => adapter.update_access_list(account_id, lb_id, &entries).await,
        Command::DeleteAccessList { account_id, lb_id } => {
            adapter.delete_access_list(account_id, lb_id).await
        }
        Command::UpdateLogging {
            account_id,
            lb_id,
            enabled,
            protocol,
        } => {
            adapter
                .update_connection_logging(account_id, lb_id, enabled, &protocol)
                .await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e:#}");
            return CtlExitCode::UsageError.into();
        }
    };

    let level = Level::from_str(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to initialize logging: {e}");
        return CtlExitCode::UsageError.into();
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(e) => {
            error!("{e:#}");
            return CtlExitCode::UsageError.into();
        }
    };

    let adapter_config = config.adapter_config();
    let device = Box::new(VtmClient::new(
        &config.endpoint,
        &config.username,
        &config.password,
        None,
    ));

    let adapter = match VirtualServiceAdapter::new(device, &adapter_config) {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("configuration error: {e}");
            return CtlExitCode::UsageError.into();
        }
    };

    match run(&adapter, command).await {
        Ok(()) => {
            info!("operation applied");
            CtlExitCode::Success.into()
        }
        Err(e) => {
            error!("operation failed: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                error!("caused by: {cause}");
                source = cause.source();
            }
            CtlExitCode::OperationFailed.into()
        }
    }
}
