pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "leadbox")]
#[command(about = "Leadbox CLI - operations tooling for the CRM backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve,

    #[command(about = "Populate demo companies, users and leads")]
    Seed {
        #[arg(long, default_value_t = 3, help = "Number of companies to create")]
        companies: usize,

        #[arg(long = "users-per-company", default_value_t = 2)]
        users_per_company: usize,

        #[arg(long = "leads-per-company", default_value_t = 5)]
        leads_per_company: usize,

        #[arg(long, help = "Remove existing demo data before seeding")]
        clear: bool,
    },

    #[command(about = "Company management")]
    Company {
        #[command(subcommand)]
        cmd: commands::company::CompanyCommands,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve => {
            crate::server::serve().await;
            Ok(())
        }
        Commands::Seed { companies, users_per_company, leads_per_company, clear } => {
            commands::seed::handle(companies, users_per_company, leads_per_company, clear).await
        }
        Commands::Company { cmd } => commands::company::handle(cmd, cli.json).await,
    }
}
