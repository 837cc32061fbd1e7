// dcss test application -- CLI tool for exercising the client against a
// live control bus.
//
// Usage:
//   dcss-test-app --addr bl31-control:14243 --session-id $SID watch
//   dcss-test-app --addr bl31-control:14243 --session-id $SID master
//   dcss-test-app --addr bl31-control:14243 --session-id $SID operation centerLoop
//   dcss-test-app --addr bl31-control:14243 --session-id $SID runs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dcss_client::{ClientOptions, DcssClient, Runs};
use dcss_transport::TcpTransport;

#[derive(Parser)]
#[command(name = "dcss-test-app", about = "Exercise the dcss client against a live bus")]
struct Cli {
    /// Bus address, host:port (the standard bus listens on 14243).
    #[arg(long)]
    addr: String,

    /// Session credential issued by the authentication service.
    #[arg(long)]
    session_id: String,

    /// User name to log in as.
    #[arg(long, default_value = "blctl")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and print every frame name as it arrives.
    Watch,
    /// Contend for master privilege and report the outcome.
    Master {
        /// Contend politely instead of forcing the takeover.
        #[arg(long)]
        noforce: bool,
    },
    /// Start a named operation and print its completion frame.
    Operation {
        name: String,
        args: Vec<String>,
    },
    /// Wait for the initial sync and print the run registry.
    Runs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut options = ClientOptions::new(cli.session_id.clone());
    options.user = cli.user.clone();

    let transport = TcpTransport::connect(&cli.addr)
        .await
        .with_context(|| format!("connecting to bus at {}", cli.addr))?;

    match cli.command {
        Command::Watch => {
            let mut client = DcssClient::new(transport, options);
            client.login().await.context("login failed")?;
            println!(
                "logged in as {}",
                client.session().client_id().unwrap_or("?")
            );

            let mut frames = client.frames();
            loop {
                println!("{}", frames.next().await?);
            }
        }
        Command::Master { noforce } => {
            let mut client = DcssClient::new(transport, options);
            client.login().await.context("login failed")?;
            if client.become_master(!noforce).await? {
                println!("master privilege acquired");
            } else {
                println!("master privilege held by another peer");
            }
            Ok(())
        }
        Command::Operation { name, args } => {
            let mut client = DcssClient::new(transport, options);
            client.login().await.context("login failed")?;
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let completion = client
                .run_operation(&name, &args)
                .await
                .with_context(|| format!("operation {name} failed"))?;
            println!("{completion}");
            Ok(())
        }
        Command::Runs => {
            let mut runs = Runs::new(transport, options);
            runs.login().await.context("login failed")?;
            runs.client_mut().ensure_ready().await?;

            let registry = runs.registry();
            let mut slots: Vec<_> = registry.records().iter().collect();
            slots.sort_by(|(a, _), (b, _)| a.cmp(b));
            println!("runs: {}", registry.meta().join(" "));
            for (slot, record) in slots {
                println!("{slot}: {}", record.serialize());
            }
            Ok(())
        }
    }
}
